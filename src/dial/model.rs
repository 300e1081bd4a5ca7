use crate::config::DialConfig;
use crate::dial::emit::Update;
use crate::dial::sections::{Section, Sections};
use crate::geometry::{self, Measurement, Point, Polar};

/// Snapshot of the dial, replaced wholesale on every accepted move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialState {
    pub starting_angle: f64,
    pub starting_radius: f64,
    pub release_angle: f64,
    pub release_radius: f64,
    /// Raw angle of the last accepted sample, not wrapped.
    pub angle_x: f64,
    /// Rotation in [0, 360).
    pub angle_y: f64,
    pub radius: f64,
    pub section: Option<Section>,
}

impl DialState {
    pub fn initial(config: &DialConfig) -> Self {
        let angle = geometry::normalize_degrees(config.initial_angle);
        let radius = config.initial_radius;

        Self {
            starting_angle: angle,
            starting_radius: radius,
            release_angle: angle,
            release_radius: radius,
            angle_x: config.initial_angle,
            angle_y: angle,
            radius,
            section: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    pub rotation_degrees: f64,
    pub visual_scale: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Gesture {
    /// False until a sample could be measured; that sample becomes the gesture's origin.
    anchored: bool,
    committed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Tracking(Gesture),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Release {
    pub update: Option<Update>,
    /// The gesture ended without moving the dial.
    pub tapped: bool,
}

/// Gesture state machine for a single dial.
#[derive(Debug, Clone)]
pub struct Tracker {
    config: DialConfig,
    sections: Option<Sections>,
    state: DialState,
    measurement: Option<Measurement>,
    phase: Phase,
}

impl Tracker {
    pub fn new(config: DialConfig) -> Self {
        if let Err(e) = config.clone().validate() {
            log::warn!("Dial config is inconsistent: {}", e);
        }
        Self {
            sections: Sections::new(config.sections),
            state: DialState::initial(&config),
            measurement: None,
            phase: Phase::Idle,
            config,
        }
    }

    pub fn config(&self) -> &DialConfig {
        &self.config
    }

    pub fn state(&self) -> &DialState {
        &self.state
    }

    pub fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, Phase::Tracking(_))
    }

    pub fn set_measurement(&mut self, measurement: Option<Measurement>) {
        self.measurement = measurement;
    }

    /// Starts a gesture at `point`. Always claims it.
    pub fn capture(&mut self, point: Point) -> bool {
        let mut gesture = Gesture {
            anchored: false,
            committed: false,
        };

        match self.sample(point) {
            Some(polar) => {
                self.anchor(polar);
                gesture.anchored = true;
            }
            None => log::debug!("gesture captured before the dial was measured"),
        }

        self.phase = Phase::Tracking(gesture);
        true
    }

    pub fn track(&mut self, point: Point) -> Option<Update> {
        let Phase::Tracking(mut gesture) = self.phase else {
            log::trace!("ignoring move outside of a gesture");
            return None;
        };

        let update = match self.sample(point) {
            None => None,
            Some(polar) if !gesture.anchored => {
                self.anchor(polar);
                gesture.anchored = true;
                None
            }
            Some(polar) => self.apply(polar),
        };

        gesture.committed |= update.is_some();
        self.phase = Phase::Tracking(gesture);
        update
    }

    /// Ends the gesture, moving the release baseline to wherever the dial now rests.
    pub fn release(&mut self, point: Point) -> Release {
        let Phase::Tracking(gesture) = self.phase else {
            return Release::default();
        };

        let mut update = None;
        if self.state.angle_y != self.state.release_angle
            || self.state.radius != self.state.release_radius
        {
            update = self.track(point);
            self.state.release_angle = self.state.angle_y;
            self.state.release_radius = self.state.radius;
        }

        self.phase = Phase::Idle;
        Release {
            update,
            tapped: !gesture.committed && update.is_none(),
        }
    }

    pub fn reset(&mut self) {
        self.state = DialState::initial(&self.config);
        self.phase = Phase::Idle;
    }

    pub fn render(&self) -> RenderParams {
        RenderParams {
            rotation_degrees: if self.config.fixed {
                0.0
            } else {
                self.state.angle_y
            },
            visual_scale: if self.config.elastic {
                self.state.radius
            } else {
                1.0
            },
        }
    }

    fn sample(&self, point: Point) -> Option<Polar> {
        let Some(measurement) = self.measurement.as_ref() else {
            log::trace!("ignoring sample: dial not measured");
            return None;
        };
        geometry::polar(point, measurement, self.config.phase_shift)
    }

    fn anchor(&mut self, polar: Polar) {
        self.state.starting_angle = polar.angle;
        self.state.starting_radius = polar.radius;
    }

    fn apply(&mut self, polar: Polar) -> Option<Update> {
        let current = self.state;

        // raw displacement since capture, applied on top of where the last gesture left off;
        // wrapping only happens once, on the sum
        let candidate = geometry::normalize_degrees(
            current.release_angle + (polar.angle - current.starting_angle),
        );

        if geometry::angular_distance(current.angle_y, candidate) <= self.config.precision {
            return None;
        }

        let radius = self
            .config
            .clamp_radius(current.release_radius + (polar.radius - current.starting_radius));

        let (angle, section) = match self.sections {
            Some(sections) => {
                let (snapped, section) = sections.snap(candidate);
                (snapped, Some(section))
            }
            None => (candidate, None),
        };

        if angle == current.angle_y && radius == current.radius {
            return None;
        }

        self.state = DialState {
            angle_x: polar.angle,
            angle_y: angle,
            radius,
            section,
            ..current
        };

        log::debug!(
            "dial moved to {:.2} deg, radius {:.3}, section {:?}",
            angle,
            radius,
            section
        );

        Some(Update {
            angle,
            radius,
            angle_x: (polar.angle != current.angle_x).then_some(polar.angle),
            section: section.filter(|s| current.section != Some(*s)),
        })
    }
}
