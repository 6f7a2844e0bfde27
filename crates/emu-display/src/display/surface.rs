use anyhow::Context;
use winit::dpi::PhysicalSize;

use crate::coords::ViewportRect;
use crate::core::{App, AppControl, FrameCtx, SurfaceCtx};
use crate::input::{InputContext, KeyDownEvent, KeyDownRelay};
use crate::paint::Color;
use crate::render::Drawable;
use crate::window::Runtime;

use super::config::DisplayConfig;

/// One window showing one full-viewport quad, letterboxed to the configured
/// aspect ratio, with raw key-downs relayed to external subscribers.
///
/// Construction does no window or GPU work; [`run`](Self::run) opens the
/// window and blocks until it closes.
pub struct DisplaySurface {
    config: DisplayConfig,
    target_aspect: f64,

    context_ready: bool,
    drawable: Option<Drawable>,
    viewport: Option<ViewportRect>,
    input: Option<InputContext>,

    key_down: KeyDownRelay,
}

impl DisplaySurface {
    /// Falls back to [`DisplayConfig::default`] when `config` is `None`.
    pub fn new(config: Option<DisplayConfig>) -> Self {
        let config = config.unwrap_or_default();
        let target_aspect = config.target_aspect();

        Self {
            config,
            target_aspect,
            context_ready: false,
            drawable: None,
            viewport: None,
            input: None,
            key_down: KeyDownRelay::new(),
        }
    }

    /// Opens the window and runs the frame loop until it closes.
    pub fn run(self) -> anyhow::Result<()> {
        let window = self.config.window.clone();
        let gpu = self.config.gpu.clone();

        log::info!(
            "opening '{}' at {}x{} (aspect {:.4})",
            window.title,
            window.initial_size.width,
            window.initial_size.height,
            self.target_aspect
        );

        Runtime::run(window, gpu, self)
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Configured `width / height`; fixed at construction.
    pub fn target_aspect(&self) -> f64 {
        self.target_aspect
    }

    pub fn clear_color(&self) -> Color {
        self.config.clear_color
    }

    /// Active drawing region, set by the latest resize.
    pub fn viewport(&self) -> Option<ViewportRect> {
        self.viewport
    }

    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }

    pub fn input(&self) -> Option<&InputContext> {
        self.input.as_ref()
    }

    /// The forwarded key-down event.
    pub fn key_down(&self) -> &KeyDownRelay {
        &self.key_down
    }

    /// Mutable access for `subscribe`/`unsubscribe`.
    pub fn key_down_mut(&mut self) -> &mut KeyDownRelay {
        &mut self.key_down
    }

    /// Re-emits one raw key-down to every external subscriber.
    ///
    /// Returns how many subscribers were reached.
    fn internal_input_handler(&mut self, event: KeyDownEvent) -> usize {
        log::trace!("key down {} (code {}) on {}", event.key, event.code, event.device);
        self.key_down.emit(&event)
    }

    /// Letterboxes the drawing region into `size`. No-op until the graphics
    /// context exists.
    fn fit_viewport(&mut self, size: PhysicalSize<u32>) -> Option<ViewportRect> {
        if !self.context_ready {
            return None;
        }

        let rect = ViewportRect::fit(self.target_aspect, size.width, size.height);
        if self.viewport != Some(rect) {
            log::debug!(
                "viewport {}x{} at ({}, {}) in {}x{} window",
                rect.width,
                rect.height,
                rect.x,
                rect.y,
                size.width,
                size.height
            );
        }
        self.viewport = Some(rect);
        self.viewport
    }
}

impl App for DisplaySurface {
    fn on_load(&mut self, ctx: &mut SurfaceCtx<'_, '_>) -> anyhow::Result<()> {
        self.context_ready = true;

        let info = ctx.gpu.adapter_info();
        log::info!(
            "graphics context ready on {} ({:?}), surface {:?}",
            info.name,
            info.backend,
            ctx.gpu.surface_format()
        );

        let mut quad = Drawable::viewport_quad(self.config.texture.clone());
        quad.load(&ctx.render_ctx())
            .context("failed to load the viewport quad")?;
        self.drawable = Some(quad);

        let mut input = InputContext::new();
        input.subscribe_key_down();
        self.input = Some(input);

        Ok(())
    }

    fn on_render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let (true, Some(drawable)) = (self.context_ready, self.drawable.as_ref()) else {
            return AppControl::Continue;
        };

        ctx.render_pass(self.config.clear_color, self.viewport, |pass| {
            drawable.render(pass);
        })
    }

    fn on_resize(&mut self, size: PhysicalSize<u32>) {
        self.fit_viewport(size);
    }

    fn on_key_down(&mut self, event: KeyDownEvent) {
        let Some(forward) = self.input.as_mut().and_then(|input| input.route(event)) else {
            return;
        };
        self.internal_input_handler(forward);
    }

    fn on_close(&mut self, _ctx: &mut SurfaceCtx<'_, '_>) {
        if let Some(input) = self.input.as_mut() {
            input.unsubscribe_key_down();
        }
        if let Some(mut drawable) = self.drawable.take() {
            drawable.dispose();
        }
        self.context_ready = false;
    }
}
