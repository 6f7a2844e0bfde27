use std::path::PathBuf;

use crate::coords::aspect_ratio;
use crate::device::GpuInit;
use crate::paint::Color;
use crate::window::RuntimeConfig;

/// Everything a [`DisplaySurface`](super::DisplaySurface) is built from.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Title and initial logical size. The size also fixes the aspect ratio
    /// the quad is letterboxed to.
    pub window: RuntimeConfig,

    /// Background painted every frame, including the letterbox bars.
    pub clear_color: Color,

    /// Image shown on the quad. `None` draws it untextured.
    pub texture: Option<PathBuf>,

    pub gpu: GpuInit,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window: RuntimeConfig::default(),
            clear_color: Color::BLACK,
            texture: None,
            gpu: GpuInit::default(),
        }
    }
}

impl DisplayConfig {
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.window.initial_size = winit::dpi::LogicalSize::new(width, height);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    pub fn with_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// `width / height` of the configured window size.
    pub fn target_aspect(&self) -> f64 {
        let size = self.window.initial_size;
        aspect_ratio(size.width.round() as u32, size.height.round() as u32)
    }
}
