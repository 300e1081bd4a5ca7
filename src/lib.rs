pub mod config;
pub mod dial;
pub mod events;
pub mod geometry;
pub mod sys;
