//! The display surface: window lifecycle, the letterboxed viewport quad and
//! key-down relay.

mod config;
mod surface;

pub use config::DisplayConfig;
pub use surface::DisplaySurface;
