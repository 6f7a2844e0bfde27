//! Color model for the clear color and solid fills.

pub mod color;

pub use color::Color;
