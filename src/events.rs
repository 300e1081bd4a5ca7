use crate::geometry::{Bounds, Point};

/// Input the dial driver reacts to, as produced by the layout and gesture side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialEvent {
    Layout(Bounds),
    Screen(f64),
    Down(Point),
    Move(Point),
    Up(Point),
    Reset,
}
