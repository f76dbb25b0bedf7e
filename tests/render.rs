use ascii_mirror::{
    Compositor, ExportStyle, FrameClock, FrameSource, GridSize, ParticleSet, PatternName, PointerState, Settings,
    SourceMode, export_png,
};

fn gradient(w: usize, h: usize) -> FrameSource {
    let mut rgba = Vec::with_capacity(w * h * 4);
    for y in 0..h {
        for x in 0..w {
            let v = ((x + y) * 255 / (w + h - 2)) as u8;
            rgba.extend_from_slice(&[v, v / 2, 255 - v, 255]);
        }
    }
    FrameSource::new(w, h, rgba).unwrap()
}

fn render(seed: u32, grid: GridSize, source: Option<&FrameSource>, settings: &Settings) -> String {
    Compositor::with_seed(grid, seed).render(
        source,
        settings,
        PointerState::INACTIVE,
        &mut ParticleSet::new(),
        FrameClock::new(3, 0.1),
    )
}

#[test]
fn image_mode_without_image_is_blank_placeholder() {
    let s = Settings { source: SourceMode::Image, ..Settings::default() };
    let out = render(1, GridSize::new(12, 5), None, &s);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().all(|l| *l == " ".repeat(12)));
}

#[test]
fn whitespace_custom_pattern_falls_back_to_standard() {
    let grid = GridSize::new(32, 16);
    let src = gradient(64, 48);
    let standard = render(5, grid, Some(&src), &Settings::default());
    let custom = Settings { pattern: PatternName::Custom, custom_pattern: "  \t ".into(), ..Settings::default() };
    assert_eq!(render(5, grid, Some(&src), &custom), standard);
    assert!(standard.chars().any(|c| !c.is_whitespace()));
}

#[test]
fn density_zero_is_all_blank() {
    let src = gradient(40, 40);
    let s = Settings { density: 0.0, ..Settings::default() };
    let out = render(9, GridSize::new(20, 10), Some(&src), &s);
    assert!(out.chars().all(|c| c == ' ' || c == '\n'));
    assert_eq!(out.lines().count(), 10);
}

#[test]
fn bright_only_at_threshold_zero_changes_nothing() {
    let grid = GridSize::new(24, 12);
    let src = gradient(48, 24);
    let off = render(4, grid, Some(&src), &Settings::default());
    let on = Settings { bright_only: true, bright_threshold: 0.0, ..Settings::default() };
    assert_eq!(render(4, grid, Some(&src), &on), off);
}

#[test]
fn plain_settings_render_the_same_frame_every_call() {
    let grid = GridSize::new(30, 20);
    let src = gradient(60, 40);
    let s = Settings::default();
    let mut c = Compositor::new(grid);
    let mut particles = ParticleSet::new();
    let first = c.render(Some(&src), &s, PointerState::INACTIVE, &mut particles, FrameClock::new(0, 0.0));
    for f in 1..5 {
        let again = c.render(Some(&src), &s, PointerState::INACTIVE, &mut particles, FrameClock::new(f, f as f32));
        assert_eq!(again, first);
    }
}

#[test]
fn rendered_frame_exports_to_png() {
    let dir = tempfile::tempdir().unwrap();
    let grid = GridSize::new(16, 8);
    let s = Settings { font_size: 10.0, line_height: 8.0, ..Settings::default() };
    let markup = render(2, grid, Some(&gradient(32, 16)), &s);

    let style = ExportStyle::from_settings(&s);
    let path = export_png(&markup, &style, &dir.path().join("frame.png")).unwrap();

    let img = image::open(&path).unwrap();
    // cell 6x8, padding max(8, round(7.5)) = 8
    assert_eq!((img.width(), img.height()), (16 * 6 + 16, 8 * 8 + 16));
}

#[test]
fn blank_frame_export_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let s = Settings { source: SourceMode::Image, ..Settings::default() };
    let markup = render(2, GridSize::new(8, 4), None, &s);
    let path = dir.path().join("blank.png");
    assert!(export_png(&markup, &ExportStyle::from_settings(&s), &path).is_err());
    assert!(!path.exists());
}

#[test]
fn malformed_frames_cannot_reach_the_compositor() {
    assert!(FrameSource::new(4, 4, vec![0; 8]).is_none());
    assert!(FrameSource::new(0, 0, Vec::new()).is_none());
    assert!(FrameSource::solid(0, 0, ascii_mirror::Rgb::WHITE).is_none());

    // What a host ends up passing for a rejected frame: no source, blank grid.
    let short = FrameSource::new(4, 4, vec![0; 8]);
    let out = render(1, GridSize::new(6, 3), short.as_ref(), &Settings::default());
    assert_eq!(out, "      \n      \n      \n");
}

#[test]
fn epoch_scale_clock_renders() {
    let grid = GridSize::new(16, 8);
    let src = gradient(32, 16);
    let s = Settings { pattern_animate: true, glitch: true, glitch_row: true, ..Settings::default() };
    let mut c = Compositor::with_seed(grid, 6);
    let out = c.render(Some(&src), &s, PointerState::INACTIVE, &mut ParticleSet::new(), FrameClock::new(0, 1.0e10));
    assert_eq!(out.lines().count(), 8);
}
