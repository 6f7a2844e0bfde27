//! Core engine-facing contracts.
//!
//! The stable interface between the runtime (platform loop) and the display
//! layer: the typed lifecycle listener table ([`App`]) and the contexts handed
//! to each callback.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, SurfaceCtx, WindowCtx};
