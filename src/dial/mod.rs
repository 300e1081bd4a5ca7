pub mod control;
pub mod emit;
pub mod model;
pub mod sections;

pub use control::{Dial, DialListener, SharedSurface, Signal, Surface};
pub use emit::{Immediate, RateLimit, Throttle, Update};
pub use model::{DialState, Release, RenderParams, Tracker};
pub use sections::{Section, Sections};
