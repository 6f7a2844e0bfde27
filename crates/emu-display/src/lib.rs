//! emu-display.
//!
//! Renders one full-viewport textured quad through wgpu inside a winit window,
//! keeps it letterboxed to the configured aspect ratio, and relays raw key-down
//! events to external subscribers.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod display;

pub use display::{DisplayConfig, DisplaySurface};
pub use render::{Drawable, DrawableError, ShaderStage};
