use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, SurfaceCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_key_down;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl RuntimeConfig {
    pub const DEFAULT_TITLE: &'static str = "EmuDisplayRenderer";

    pub fn new(title: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            title: title.into(),
            initial_size: LogicalSize::new(width, height),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TITLE, 1280.0, 720.0)
    }
}

/// Runtime context passed to the application during a frame.
///
/// Requests are applied after the current callback returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    exit_requested: bool,
}

impl RuntimeCtx {
    /// Closes the window and stops the event loop after this frame.
    pub fn exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn is_exit_requested(&self) -> bool {
        self.exit_requested
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until the window closes.
    ///
    /// Blocks the calling thread, which must be the main thread on most
    /// platforms.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.load_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    loaded: bool,
    load_error: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            loaded: false,
            load_error: None,
            exit_requested: false,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
    }

    /// Runs `on_load`, then one `on_resize` with the current size.
    fn load(&mut self, entry: &mut WindowEntry) -> Result<()> {
        let app = &mut self.app;

        let mut result = Ok(());
        entry.with_mut(|fields| {
            let mut ctx = SurfaceCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
            };
            result = app.on_load(&mut ctx);
        });
        result.context("application load failed")?;

        let size = entry.with_window(|w| w.inner_size());
        app.on_resize(size);

        // Load time must not show up as the first frame delta.
        entry.with_clock_mut(|c| c.reset());
        entry.with_window(|w| w.request_redraw());
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        entry.with_gpu_mut(|gpu| gpu.resize(size));
        self.app.on_resize(size);
        entry.with_window(|w| w.request_redraw());
    }

    fn redraw(&mut self) -> bool {
        let (app, Some(entry)) = (&mut self.app, self.entry.as_mut()) else {
            return false;
        };

        let mut runtime_ctx = RuntimeCtx::default();
        let mut control = AppControl::Continue;

        entry.with_mut(|fields| {
            let time = fields.clock.tick();
            app.on_update(time.dt);

            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                },
                gpu: fields.gpu,
                time,
                runtime: &mut runtime_ctx,
            };
            control = app.on_render(&mut ctx);
        });

        control == AppControl::Exit || runtime_ctx.is_exit_requested()
    }

    /// Runs `on_close` while the graphics context is alive, then drops the
    /// window and its context and stops the loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut entry) = self.entry.take() {
            if self.loaded {
                let app = &mut self.app;
                entry.with_mut(|fields| {
                    let mut ctx = SurfaceCtx {
                        window: WindowCtx {
                            id: fields.window.id(),
                            window: fields.window,
                        },
                        gpu: fields.gpu,
                    };
                    app.on_close(&mut ctx);
                });
            }
            drop(entry);
            log::debug!("window closed");
        }

        self.loaded = false;
        self.exit_requested = true;
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        let mut entry = match self.create_window_entry(event_loop) {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("failed to create window: {e:#}");
                self.load_error = Some(e);
                self.shutdown(event_loop);
                return;
            }
        };

        if let Err(e) = self.load(&mut entry) {
            log::error!("{e:#}");
            self.load_error = Some(e);
            drop(entry);
            self.shutdown(event_loop);
            return;
        }

        self.entry = Some(entry);
        self.loaded = true;
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw at the presentation cadence.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(new_size) => self.resize(new_size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.entry.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.resize(size);
                }
            }

            // Synthetic presses are replayed on focus gain; they are not
            // physical key-downs.
            WindowEvent::KeyboardInput {
                device_id,
                event,
                is_synthetic: false,
            } => {
                if let Some(key_down) = translate_key_down(device_id, &event) {
                    self.app.on_key_down(key_down);
                }
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() {
                    self.shutdown(event_loop);
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            self.shutdown(event_loop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_renderer_title() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.title, "EmuDisplayRenderer");
        assert_eq!(cfg.initial_size, LogicalSize::new(1280.0, 720.0));
    }

    #[test]
    fn exit_request_is_sticky() {
        let mut ctx = RuntimeCtx::default();
        assert!(!ctx.is_exit_requested());
        ctx.exit();
        ctx.exit();
        assert!(ctx.is_exit_requested());
    }
}
