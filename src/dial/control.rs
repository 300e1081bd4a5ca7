use crate::config::DialConfig;
use crate::dial::emit::{self, RateLimit, Update};
use crate::dial::model::{DialState, RenderParams, Tracker};
use crate::dial::sections::Section;
use crate::geometry::{Bounds, Measurement, Point};
use derive_more::Display;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

/// Layout side of the dial: where it sits on screen and how wide the screen is.
pub trait Surface {
    fn measure(&self) -> Option<Bounds>;
    fn screen_width(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
struct SurfaceInfo {
    bounds: Option<Bounds>,
    screen_width: f64,
}

/// Surface handle the layout task can update while the dial reads it.
#[derive(Debug, Clone, Default)]
pub struct SharedSurface {
    inner: Arc<RwLock<SurfaceInfo>>,
}

impl SharedSurface {
    pub fn new(bounds: Option<Bounds>, screen_width: f64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SurfaceInfo {
                bounds,
                screen_width,
            })),
        }
    }

    pub fn set_bounds(&self, bounds: Bounds) {
        self.inner.write().bounds = Some(bounds);
    }

    pub fn set_screen_width(&self, width: f64) {
        self.inner.write().screen_width = width;
    }
}

impl Surface for SharedSurface {
    fn measure(&self) -> Option<Bounds> {
        self.inner.read().bounds
    }

    fn screen_width(&self) -> f64 {
        self.inner.read().screen_width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum Signal {
    #[display("value angle={angle:.2} radius={radius:.3}")]
    ValueChange { angle: f64, radius: f64 },
    #[display("angle_x {_0:.2}")]
    AngleXChange(f64),
    #[display("section {_0}")]
    SectionChange(Section),
    #[display("press")]
    Press,
}

pub trait DialListener {
    fn on_value_change(&mut self, _angle: f64, _radius: f64) {}
    fn on_angle_x_change(&mut self, _angle_x: f64) {}
    fn on_section_change(&mut self, _section: Section) {}
    fn on_press(&mut self) {}
}

impl DialListener for () {}

impl DialListener for Vec<Signal> {
    fn on_value_change(&mut self, angle: f64, radius: f64) {
        self.push(Signal::ValueChange { angle, radius });
    }

    fn on_angle_x_change(&mut self, angle_x: f64) {
        self.push(Signal::AngleXChange(angle_x));
    }

    fn on_section_change(&mut self, section: Section) {
        self.push(Signal::SectionChange(section));
    }

    fn on_press(&mut self) {
        self.push(Signal::Press);
    }
}

impl DialListener for async_channel::Sender<Signal> {
    fn on_value_change(&mut self, angle: f64, radius: f64) {
        forward(self, Signal::ValueChange { angle, radius });
    }

    fn on_angle_x_change(&mut self, angle_x: f64) {
        forward(self, Signal::AngleXChange(angle_x));
    }

    fn on_section_change(&mut self, section: Section) {
        forward(self, Signal::SectionChange(section));
    }

    fn on_press(&mut self) {
        forward(self, Signal::Press);
    }
}

fn forward(tx: &async_channel::Sender<Signal>, signal: Signal) {
    if let Err(e) = tx.try_send(signal) {
        log::warn!("Dropping dial signal: {}", e);
    }
}

/// A dial wired to its layout surface and listener.
pub struct Dial<S, L> {
    tracker: Tracker,
    limit: Box<dyn RateLimit>,
    surface: S,
    listener: L,
    // last values handed to the listener; held updates can revert to them
    delivered_angle_x: Option<f64>,
    delivered_section: Option<Section>,
}

impl<S: Surface, L: DialListener> Dial<S, L> {
    pub fn new(config: DialConfig, surface: S, listener: L) -> Self {
        let limit = emit::for_interval(config.throttle_interval());
        Self {
            tracker: Tracker::new(config),
            limit,
            surface,
            listener,
            delivered_angle_x: None,
            delivered_section: None,
        }
    }

    pub fn with_rate_limit(mut self, limit: Box<dyn RateLimit>) -> Self {
        self.limit = limit;
        self
    }

    /// Re-reads the surface; returns whether the dial is measured.
    pub fn on_layout(&mut self) -> bool {
        let measurement = self
            .surface
            .measure()
            .and_then(|b| Measurement::from_bounds(b, self.surface.screen_width()));

        if measurement.is_none() {
            log::debug!("dial has no usable layout yet");
        }
        self.tracker.set_measurement(measurement);
        measurement.is_some()
    }

    pub fn on_gesture_start(&mut self, point: Point, _now: Instant) -> bool {
        self.on_layout();
        self.tracker.capture(point)
    }

    pub fn on_gesture_move(&mut self, point: Point, now: Instant) {
        if let Some(update) = self.tracker.track(point)
            && let Some(out) = self.limit.offer(update, now)
        {
            self.deliver(out);
        }
    }

    pub fn on_gesture_end(&mut self, point: Point, now: Instant) {
        let release = self.tracker.release(point);

        if let Some(update) = release.update
            && let Some(out) = self.limit.offer(update, now)
        {
            self.deliver(out);
        }
        self.flush(now);

        if release.tapped {
            self.listener.on_press();
        }
    }

    /// Delivers a held update whose throttle window has closed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(out) = self.limit.poll(now) {
            self.deliver(out);
        }
    }

    pub fn flush(&mut self, now: Instant) {
        if let Some(out) = self.limit.flush(now) {
            self.deliver(out);
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.limit.deadline()
    }

    /// Back to the configured initial state. Listeners are not notified.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.limit.clear();
        self.delivered_angle_x = None;
        self.delivered_section = None;
    }

    pub fn state(&self) -> &DialState {
        self.tracker.state()
    }

    pub fn render(&self) -> RenderParams {
        self.tracker.render()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    fn deliver(&mut self, update: Update) {
        self.listener.on_value_change(update.angle, update.radius);
        if let Some(angle_x) = update.angle_x
            && self.delivered_angle_x != Some(angle_x)
        {
            self.delivered_angle_x = Some(angle_x);
            self.listener.on_angle_x_change(angle_x);
        }
        if let Some(section) = update.section
            && self.delivered_section != Some(section)
        {
            self.delivered_section = Some(section);
            self.listener.on_section_change(section);
        }
    }
}
