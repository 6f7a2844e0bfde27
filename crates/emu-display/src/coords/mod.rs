//! Coordinate and geometry types.
//!
//! Canonical space here is physical pixels with the origin at the
//! window's top-left corner, matching wgpu's viewport convention.

mod viewport;

pub use viewport::{aspect_ratio, ViewportRect};
