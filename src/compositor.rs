// The per-frame compositor: settings -> derived parameters -> per-cell
// decisions -> markup. One call renders one frame; the scatter particle set is
// the only state carried between calls and the caller owns it.

use crate::entropy::{Entropy, XorShiftEntropy};
use crate::glitch::GlitchTables;
use crate::glyph::{Glyph, GlyphMapper};
use crate::markup::GlyphGrid;
use crate::pattern::PatternSchedule;
use crate::sampler::{Fit, Sampler};
use crate::scatter::{ParticleSet, scatter_margin};
use crate::settings::{Settings, SourceMode};
use crate::shape::ShapeMask;
use crate::types::{FrameClock, FrameSource, GridSize, PointerState};

/// Frame compositor with its reusable scratch buffers.
pub struct Compositor<E: Entropy = XorShiftEntropy> {
    grid: GridSize,
    tables: GlitchTables,
    overlay: Vec<Option<char>>,
    cells: GlyphGrid,
    entropy: E,
}

impl Compositor<XorShiftEntropy> {
    pub fn new(grid: GridSize) -> Self {
        Self::with_entropy(grid, XorShiftEntropy::default())
    }

    pub fn with_seed(grid: GridSize, seed: u32) -> Self {
        Self::with_entropy(grid, XorShiftEntropy::from_seed(seed))
    }
}

impl<E: Entropy> Compositor<E> {
    pub fn with_entropy(grid: GridSize, entropy: E) -> Self {
        Self {
            grid,
            tables: GlitchTables::new(grid),
            overlay: Vec::new(),
            cells: GlyphGrid::new(grid.width, grid.height),
            entropy,
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn entropy_mut(&mut self) -> &mut E {
        &mut self.entropy
    }

    /// Glitch tables derived for the most recent frame.
    pub fn glitch_tables(&self) -> &GlitchTables {
        &self.tables
    }

    /// The last rendered frame.
    pub fn last_grid(&self) -> &GlyphGrid {
        &self.cells
    }

    /// Render one frame to markup.
    ///
    /// `source` is the active frame source for `settings.source`; `None`
    /// (camera not ready, no image loaded, failed decode) renders the
    /// silhouette blank.
    pub fn render(
        &mut self,
        source: Option<&FrameSource>,
        settings: &Settings,
        pointer: PointerState,
        particles: &mut ParticleSet,
        clock: FrameClock,
    ) -> String {
        self.render_grid(source, settings, pointer, particles, clock).to_markup()
    }

    /// Render one frame into the compositor's glyph grid.
    #[tracing::instrument(level = "trace", skip_all, fields(frame = clock.frame))]
    pub fn render_grid(
        &mut self,
        source: Option<&FrameSource>,
        settings: &Settings,
        pointer: PointerState,
        particles: &mut ParticleSet,
        clock: FrameClock,
    ) -> &GlyphGrid {
        let settings = settings.sanitized();
        let grid = self.grid;

        // 1) Derived parameters for this frame.
        let mask = ShapeMask::new(settings.shape, grid);
        let schedule = PatternSchedule::for_frame(&settings, clock.seconds);
        self.tables.regenerate(&settings, clock, &mut self.entropy);
        particles.step(&settings, grid, &mask, schedule.current(), &mut self.entropy);

        // 2) Extended canvas and scatter overlay.
        let margin = scatter_margin(&settings);
        let canvas_w = grid.width + 2 * margin;
        let canvas_h = grid.height + 2 * margin;
        self.overlay.resize(canvas_w * canvas_h, None);
        particles.overlay(canvas_w, canvas_h, margin, &mask, &mut self.overlay);
        self.cells.reset(canvas_w, canvas_h);

        // 3) Per-cell decisions.
        let fit = match settings.source {
            SourceMode::Camera => Fit::Stretch,
            SourceMode::Image => Fit::Letterbox,
        };
        let sampler = source.map(|frame| Sampler::new(frame, fit, grid, &settings, pointer, &self.tables));
        let mapper = GlyphMapper::new(&settings, &schedule);
        let m = margin as i32;

        for cj in 0..canvas_h {
            for ci in 0..canvas_w {
                let (i, j) = (ci as i32 - m, cj as i32 - m);
                let glyph = if mask.is_inside(i, j) {
                    sampler
                        .as_ref()
                        .and_then(|s| s.sample(i, j, ci, &mut self.entropy))
                        .map(|sampled| mapper.map(i, j, sampled.rgb, sampled.tint, &mut self.entropy))
                        .unwrap_or(Glyph::BLANK)
                } else {
                    self.overlay[cj * canvas_w + ci].map(Glyph::plain).unwrap_or(Glyph::BLANK)
                };
                self.cells.set(ci, cj, glyph);
            }
        }

        &self.cells
    }
}
