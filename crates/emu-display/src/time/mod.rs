//! Frame timing.
//!
//! One `FrameClock` per window; the runtime ticks it once per redraw and
//! hands the resulting delta to the update and render callbacks.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
