// What you SEE:
// • The camera (or a still image) drawn as ASCII art inside the chosen shape.
// • H/V flip, G glitch, R strong row glitch, S scatter, M mouse avoid,
//   A pattern animation, B bright-only, N next shape, P next pattern.
// • Tab switches camera/image, E exports a PNG, C resets. ESC quits.

mod camera;
mod controls;
mod draw;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use anyhow::Context;
use ascii_mirror::export::export_file_name;
use ascii_mirror::raster::{FontMetrics, draw_grid, draw_text_5x7};
use ascii_mirror::scatter::scatter_margin;
use ascii_mirror::{
    Compositor, ExportStyle, FrameBuffer, FrameClock, FrameSource, GridSize, ImageFeed, ImageSlot, ParticleSet,
    PointerState, Settings, SettingsFile, SourceMode, export_png,
};
use camera::CameraCapture;
use clap::Parser;
use controls::{Action, action_for_key};
use draw::Drawer;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ascii-mirror", version, about = "Live camera or still image to animated ASCII art")]
struct Cli {
    /// JSON settings file (camelCase keys); re-read when it changes
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Start in image mode with this picture (an `imagePath` setting overrides it)
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,

    /// Camera index
    #[arg(long, default_value_t = 0)]
    camera: u32,

    /// Logical grid size
    #[arg(long, value_name = "WxH", default_value = "128x96", value_parser = parse_grid)]
    grid: GridSize,

    /// Seed for the random source
    #[arg(long)]
    seed: Option<u32>,

    /// Render a single frame without camera or window
    #[arg(long)]
    once: bool,

    /// With --once, write a PNG here instead of printing markup
    #[arg(long, value_name = "FILE", requires = "once")]
    export: Option<PathBuf>,
}

fn parse_grid(text: &str) -> Result<GridSize, String> {
    GridSize::parse(text).ok_or_else(|| format!("expected WxH with non-zero sides, got {text:?}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path).with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if cli.image.is_some() {
        settings.source = SourceMode::Image;
    }

    let compositor = match cli.seed {
        Some(seed) => Compositor::with_seed(cli.grid, seed),
        None => Compositor::new(cli.grid),
    };

    if cli.once {
        run_once(&cli, &settings, compositor)
    } else {
        run_window(&cli, settings, compositor)
    }
}

/* ------------------------------ Headless ------------------------------ */

fn run_once(cli: &Cli, settings: &Settings, mut compositor: Compositor) -> anyhow::Result<()> {
    let slot = ImageSlot::new();
    if let Some(path) = image_choice(cli, settings) {
        if let Err(e) = slot.load_blocking(path) {
            warn!(error = %e, "rendering blank placeholder");
        }
    }
    let source = slot.current();

    let markup = compositor.render(
        source.as_deref(),
        settings,
        PointerState::INACTIVE,
        &mut ParticleSet::new(),
        FrameClock::new(0, 0.0),
    );

    match &cli.export {
        Some(path) => {
            export_png(&markup, &ExportStyle::from_settings(settings), path)
                .with_context(|| format!("exporting to {}", path.display()))?;
        }
        None => print!("{markup}"),
    }
    Ok(())
}

/* ------------------------------ Window ------------------------------ */

/// Camera that is opened on first use. A failed open is not retried until
/// the source is switched away and back.
struct LazyCamera {
    index: u32,
    cam: Option<CameraCapture>,
    failed: bool,
}

impl LazyCamera {
    fn frame(&mut self) -> Option<FrameSource> {
        if self.cam.is_none() && !self.failed {
            match CameraCapture::new(self.index, 640, 480) {
                Ok(cam) => self.cam = Some(cam),
                Err(e) => {
                    warn!(error = %e, "no camera; showing blank placeholder");
                    self.failed = true;
                }
            }
        }
        let cam = self.cam.as_mut()?;
        match cam.next_frame() {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(error = %e, "camera frame dropped");
                None
            }
        }
    }
}

fn run_window(cli: &Cli, mut settings: Settings, mut compositor: Compositor) -> anyhow::Result<()> {
    let mut settings_file = cli.settings.as_ref().map(SettingsFile::new);
    if let Some(file) = settings_file.as_mut() {
        // Record the current mtime so the first frame doesn't reload.
        file.poll();
    }

    let mut images = ImageFeed::new(ImageSlot::new());
    let mut camera = LazyCamera { index: cli.camera, cam: None, failed: false };

    let grid = compositor.grid();
    let metrics = FontMetrics::from_settings(&settings);
    let (win_w, win_h) = metrics.block_size(grid.width, grid.height);
    let mut drawer = Drawer::new("ASCII Mirror", win_w, win_h).context("opening window")?;
    let mut screen = FrameBuffer::new(win_w, win_h, 0);

    let mut particles = ParticleSet::new();
    let start = Instant::now();
    let mut frame: u64 = 0;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Settings: file changes, then keys. */
        if let Some(fresh) = settings_file.as_mut().and_then(SettingsFile::poll) {
            settings = fresh;
        }
        let mut export_requested = false;
        for key in drawer.keys_pressed() {
            let Some(action) = action_for_key(key) else { continue };
            if action == Action::ToggleSource && settings.source == SourceMode::Image {
                camera.failed = false;
            }
            if !action.apply(&mut settings) {
                export_requested |= action == Action::Export;
            }
            debug!(?action, "key");
        }
        if !settings.scatter {
            particles.clear();
        }
        images.follow(image_choice(cli, &settings));

        /* 2) Source for this frame. */
        let live;
        let still;
        let source: Option<&FrameSource> = match settings.source {
            SourceMode::Camera => {
                live = camera.frame();
                live.as_ref()
            }
            SourceMode::Image => {
                still = images.slot().current();
                still.as_deref()
            }
        };

        /* 3) Pointer in grid cells (canvas pixels -> cells, minus the scatter margin). */
        let clean = settings.sanitized();
        let metrics = FontMetrics::from_settings(&clean);
        let margin = scatter_margin(&clean);
        let (canvas_w, canvas_h) = metrics.block_size(grid.width + 2 * margin, grid.height + 2 * margin);
        let pointer = pointer_in_grid(drawer.mouse_pos(), drawer.size(), (canvas_w, canvas_h), metrics, margin);

        /* 4) Compose and rasterize. */
        let clock = FrameClock::new(frame, start.elapsed().as_secs_f32());
        let cells = compositor.render_grid(source, &settings, pointer, &mut particles, clock);
        screen.resize(canvas_w, canvas_h, clean.background_rgb().to_u32());
        draw_grid(&mut screen, cells, metrics, clean.text_rgb(), 0, 0);

        if export_requested {
            export_frame(&compositor, &settings);
        }

        let mode = match settings.source {
            SourceMode::Camera => "CAMERA",
            SourceMode::Image => "IMAGE",
        };
        draw_text_5x7(&mut screen, 8, 8, &format!("{mode} | {hud_fps_text}"), 0x00_FF_FF_FF);

        /* 5) Present. */
        drawer.present(&screen).context("presenting frame")?;
        frame += 1;

        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            debug!(fps, "frame rate");
            hud_fps_text = format!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    info!(frames = frame, "window closed");
    Ok(())
}

/// The settings' image path wins over `--image`.
fn image_choice<'a>(cli: &'a Cli, settings: &'a Settings) -> Option<&'a Path> {
    settings.image_path().or(cli.image.as_deref())
}

/// Window pixels to grid cells. The buffer is stretched over the window, so
/// the mouse is first scaled into canvas pixels.
fn pointer_in_grid(
    mouse: Option<(f32, f32)>,
    window: (usize, usize),
    canvas: (usize, usize),
    metrics: FontMetrics,
    margin: usize,
) -> PointerState {
    let Some((mx, my)) = mouse else { return PointerState::INACTIVE };
    if window.0 == 0 || window.1 == 0 {
        return PointerState::INACTIVE;
    }
    let cx = mx * canvas.0 as f32 / window.0 as f32;
    let cy = my * canvas.1 as f32 / window.1 as f32;
    PointerState::at(
        cx / metrics.cell_w as f32 - margin as f32,
        cy / metrics.cell_h as f32 - margin as f32,
    )
}

fn export_frame(compositor: &Compositor, settings: &Settings) {
    let markup = compositor.last_grid().to_markup();
    let path = PathBuf::from(export_file_name(SystemTime::now()));
    if let Err(e) = export_png(&markup, &ExportStyle::from_settings(settings), &path) {
        warn!(error = %e, "export failed");
    }
}
