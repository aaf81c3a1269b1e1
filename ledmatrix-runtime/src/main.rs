use std::path::PathBuf;

use clap::Parser;
use eyre::WrapErr;

use ledmatrix::{
    graphics::{Font, FontHandle, FontRegistry},
    host::{Cycle, MatrixLoop},
};

/// The demo scene drawn on the panel
mod demo;

/// Desktop window standing in for the physical panel, plus a headless driver
mod preview;

/// Drives an LED matrix from a virtual frame buffer, previewed in a desktop window.
#[derive(Debug, Parser)]
#[command(name = "ledmatrix", version)]
struct Settings {
    /// Panel height, in LEDs
    #[arg(long, env = "LEDMATRIX_ROWS", default_value_t = 32)]
    rows: i32,

    /// Panel width, in LEDs
    #[arg(long, env = "LEDMATRIX_COLS", default_value_t = 64)]
    cols: i32,

    /// Window pixels per LED
    #[arg(long, default_value_t = 12)]
    scale: u32,

    /// TrueType/OpenType font to rasterize; the built-in 3x5 font otherwise
    #[arg(long, env = "LEDMATRIX_FONT")]
    font: Option<PathBuf>,

    /// Pixel size to rasterize `--font` at
    #[arg(long, default_value_t = 8.0)]
    font_size: f32,

    /// Pixels between glyphs
    #[arg(long, default_value_t = 1)]
    spacing: i32,

    /// Log frames instead of opening a window
    #[arg(long)]
    headless: bool,

    /// Frames to draw when running headless
    #[arg(long, default_value_t = 6)]
    frames: usize,
}

/// Loads the requested font, falling back to the built-in one if it can't be loaded
fn load_font(settings: &Settings, fonts: &mut FontRegistry) -> FontHandle {
    let builtin = |fonts: &mut FontRegistry| {
        let mut font = Font::builtin();
        font.spacing = settings.spacing;
        fonts.insert("builtin", font)
    };

    let Some(path) = &settings.font else {
        return builtin(fonts);
    };
    let loaded = fonts.load_or_insert_with(&path.to_string_lossy(), || {
        Font::from_file(path, settings.font_size, settings.spacing)
    });
    match loaded {
        Ok(handle) => handle,
        Err(err) => {
            log::warn!("{err:?}");
            log::warn!("falling back to the built-in font");
            builtin(fonts)
        }
    }
}

fn main() -> eyre::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let settings = Settings::parse();
    log::debug!("{settings:?}");

    let mut fonts = FontRegistry::new();
    let font = load_font(&settings, &mut fonts);
    let scene = demo::Demo::new(fonts, font);

    let matrix = MatrixLoop::new(settings.rows, settings.cols).with_cycle(Cycle::new(0, demo::PANELS));
    log::info!("matrix initialized, {}x{}", settings.rows, settings.cols);

    if settings.headless {
        preview::run_headless(matrix, scene, settings.frames).wrap_err("running headless")?;
    } else {
        preview::run_window(matrix, scene, settings.scale).wrap_err("running preview window")?;
    }

    log::info!("matrix terminated");
    Ok(())
}
