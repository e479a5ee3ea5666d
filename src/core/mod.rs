pub mod meter;
pub mod navigation;
pub mod sequencer;
pub mod session;
pub mod ticks;
pub mod unlock;
pub mod viewport;
