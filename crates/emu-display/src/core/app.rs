use winit::dpi::PhysicalSize;

use crate::input::KeyDownEvent;

use super::ctx::{FrameCtx, SurfaceCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
///
/// All callbacks run on the event-loop thread. `on_load` fires exactly once
/// and strictly before the first `on_resize`/`on_update`/`on_render`; resize
/// and key-down may interleave between any two frames.
pub trait App {
    /// The window and its graphics context exist. An error stops the runtime.
    fn on_load(&mut self, ctx: &mut SurfaceCtx<'_, '_>) -> anyhow::Result<()>;

    /// Per-frame logic that does not render. `dt` is in seconds.
    fn on_update(&mut self, dt: f32) {
        let _ = dt;
    }

    /// Records and presents one frame.
    fn on_render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Drawable area changed, in physical pixels. May be zero while minimized.
    fn on_resize(&mut self, size: PhysicalSize<u32>) {
        let _ = size;
    }

    /// One raw key press (repeats excluded).
    fn on_key_down(&mut self, event: KeyDownEvent) {
        let _ = event;
    }

    /// The window is about to close; the graphics context is still alive.
    fn on_close(&mut self, ctx: &mut SurfaceCtx<'_, '_>) {
        let _ = ctx;
    }
}
