use winit::dpi::PhysicalSize;
use winit::window::{Window, WindowId};

use crate::coords::ViewportRect;
use crate::device::Gpu;
use crate::paint::Color;
use crate::render::RenderCtx;
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Window handle and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Drawable area in physical pixels.
    pub fn inner_size(&self) -> PhysicalSize<u32> {
        self.window.inner_size()
    }
}

/// Context for load and close: the window plus its live graphics context.
pub struct SurfaceCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
}

impl<'a, 'w> SurfaceCtx<'a, 'w> {
    /// Device/queue view for Drawable load and dispose.
    pub fn render_ctx(&self) -> RenderCtx<'_> {
        self.gpu.render_ctx()
    }
}

/// Per-frame context passed to `core::App::on_render`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Records one render pass into the next surface frame and presents it.
    ///
    /// The whole surface is cleared to `clear`, then `viewport` (or the full
    /// surface when `None`) is set before `draw` runs, so everything drawn is
    /// mapped into that rectangle. Surface errors skip the frame; a fatal one
    /// returns [`AppControl::Exit`].
    pub fn render_pass<F>(&mut self, clear: Color, viewport: Option<ViewportRect>, draw: F) -> AppControl
    where
        F: FnOnce(&mut wgpu::RenderPass<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                log::debug!("frame {} skipped: {action:?}", self.time.frame_index);
                if action.is_fatal() {
                    log::error!("unrecoverable surface error; exiting");
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        // A viewport computed for a size the surface has not been configured
        // to (minimized window) would overrun the target.
        let target = self.gpu.target_size();
        let rect = viewport
            .filter(|r| r.x + r.width <= target.width && r.y + r.height <= target.height)
            .unwrap_or_else(|| ViewportRect::full(target.width, target.height));

        // The pass borrows frame.encoder; it must end before submit() takes frame.
        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("emu-display frame"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if !rect.is_empty() {
                pass.set_viewport(
                    rect.x as f32,
                    rect.y as f32,
                    rect.width as f32,
                    rect.height as f32,
                    0.0,
                    1.0,
                );
                draw(&mut pass);
            }
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
