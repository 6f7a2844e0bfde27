use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use emu_display::logging::{init_logging, LoggingConfig};
use emu_display::{DisplayConfig, DisplaySurface};

#[derive(Parser, Debug, Clone)]
#[command(name = "emu-display-viewer")]
#[command(about = "Shows an emulator frame letterboxed in a window", long_about = None)]
struct Args {
    /// Window title
    #[arg(long, default_value = "EmuDisplayRenderer")]
    title: String,

    /// Initial window width; with --height it fixes the aspect ratio
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Initial window height
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Image drawn on the quad (png, jpeg, bmp, ...)
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Log filter in RUST_LOG syntax, e.g. "debug" or "emu_display=trace"
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn display_config(&self) -> DisplayConfig {
        let mut config = DisplayConfig::default()
            .with_title(self.title.clone())
            .with_size(self.width, self.height);
        if let Some(path) = &self.texture {
            config = config.with_texture(path.clone());
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let mut surface = DisplaySurface::new(Some(args.display_config()));
    surface.key_down_mut().subscribe(|e| {
        log::info!("{}: {} (code {})", e.device, e.key, e.code);
    });

    surface.run()
}
