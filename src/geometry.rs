use crate::config::PhaseShift;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Absolute on-screen box of the dial as reported by the layout side.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Screen-space center of the dial plus the half-width used to normalize drag distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub offset: Point,
    pub reference_radius: f64,
}

impl Measurement {
    pub fn new(offset: Point, reference_radius: f64) -> Option<Self> {
        (reference_radius.is_finite() && reference_radius > 0.0 && is_finite(offset)).then_some(
            Self {
                offset,
                reference_radius,
            },
        )
    }

    /// Returns `None` until the dial has a usable width.
    pub fn from_bounds(bounds: Bounds, screen_width: f64) -> Option<Self> {
        // x can be reported past the visible width on paged containers
        let x = if screen_width > 0.0 {
            bounds.x.rem_euclid(screen_width)
        } else {
            bounds.x
        };

        Self::new(
            Point::new(x + bounds.width / 2.0, bounds.y + bounds.height / 2.0),
            bounds.width / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    /// Degrees, shifted but not wrapped.
    pub angle: f64,
    /// Distance from the center as a multiple of the reference radius.
    pub radius: f64,
}

pub fn polar(pointer: Point, measurement: &Measurement, phase_shift: PhaseShift) -> Option<Polar> {
    let (dx, dy) = (
        pointer.x - measurement.offset.x,
        pointer.y - measurement.offset.y,
    );

    let angle = dy.atan2(dx).to_degrees() + phase_shift.degrees();
    let radius = dx.hypot(dy) / measurement.reference_radius;

    (angle.is_finite() && radius.is_finite()).then_some(Polar { angle, radius })
}

pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest distance between two angles, in [0, 180].
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let delta = (a - b).rem_euclid(360.0);
    delta.min(360.0 - delta)
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
