// Per-frame glitch parameters: a row-shift table and an artifact block map.
// Both live in scratch buffers sized to the grid, allocated once and refilled
// every frame.

use crate::entropy::Entropy;
use crate::settings::Settings;
use crate::types::{FrameClock, GridSize, Rgb};

/// Tints used by row glitches, artifacts and sparkle recoloring.
pub const GLITCH_PALETTE: [Rgb; 4] = [
    Rgb::new(0xFF, 0x2A, 0x6D), // magenta
    Rgb::new(0x05, 0xD9, 0xE8), // cyan
    Rgb::new(0xF9, 0xF8, 0x71), // yellow
    Rgb::new(0xFF, 0xFF, 0xFF), // white
];

/// Glitch state for one grid row, valid for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RowGlitch {
    /// Horizontal offset in grid cells (wraps modulo grid width).
    pub shift: i32,
    /// Selected for heavier effects this frame.
    pub glitchy: bool,
    /// Blank every `drop_period`-th canvas column.
    pub drop: bool,
    pub drop_period: u32,
    /// Strong row glitch: extra smear and optional tint.
    pub strong: bool,
    pub smear: i32,
    pub tint: Option<Rgb>,
}

impl RowGlitch {
    /// True when this row blanks canvas column `column`.
    #[inline]
    pub fn drops_column(&self, column: usize) -> bool {
        self.drop && self.drop_period > 0 && column % self.drop_period as usize == 0
    }
}

/// A rectangular block of displaced/dropped/tinted cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArtifactBlock {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub dx: i32,
    pub dy: i32,
    pub drop: bool,
    pub tint: Option<Rgb>,
}

pub struct GlitchTables {
    grid: GridSize,
    rows: Vec<RowGlitch>,
    blocks: Vec<ArtifactBlock>,
    cells: Vec<Option<u16>>, // grid-sized; index into `blocks`, later blocks win
}

impl GlitchTables {
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            rows: vec![RowGlitch::default(); grid.height],
            blocks: Vec::with_capacity(MAX_BLOCKS),
            cells: vec![None; grid.cells()],
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn rows(&self) -> &[RowGlitch] {
        &self.rows
    }

    pub fn blocks(&self) -> &[ArtifactBlock] {
        &self.blocks
    }

    /// Row entry for grid row `j`, if it is inside the grid.
    #[inline]
    pub fn row(&self, j: i32) -> Option<&RowGlitch> {
        if j < 0 {
            return None;
        }
        self.rows.get(j as usize)
    }

    /// Artifact block covering grid cell (i,j), if any.
    #[inline]
    pub fn artifact(&self, i: i32, j: i32) -> Option<&ArtifactBlock> {
        if i < 0 || j < 0 || i as usize >= self.grid.width || j as usize >= self.grid.height {
            return None;
        }
        let idx = self.cells[j as usize * self.grid.width + i as usize]?;
        self.blocks.get(idx as usize)
    }

    /// Refill both tables for this frame.
    pub fn regenerate(&mut self, settings: &Settings, clock: FrameClock, entropy: &mut dyn Entropy) {
        self.rows.fill(RowGlitch::default());
        self.blocks.clear();
        self.cells.fill(None);

        if !settings.glitch {
            return;
        }
        self.regenerate_rows(settings, clock, entropy);
        if settings.glitch_artifacts_amount > 0.0 {
            self.regenerate_artifacts(settings, entropy);
        }
    }

    fn regenerate_rows(&mut self, settings: &Settings, clock: FrameClock, entropy: &mut dyn Entropy) {
        let rate = settings.glitch_rate / 100.0;
        let k = settings.glitch_intensity / 100.0;
        let width = self.grid.width as f32;
        let t = clock.seconds;

        for (j, row) in self.rows.iter_mut().enumerate() {
            let jf = j as f32;
            let wave = (jf * 0.21 + t * 5.0).sin() * k * 2.0;
            let n = (entropy.noise(jf * 0.12, t * 1.5, 7.0) - 0.5) * 2.0;
            let glitchy = entropy.chance(rate * 0.35) || n.abs() > 1.0 - rate * 0.5;

            let burst = if glitchy && entropy.chance(0.15) {
                entropy.range(-1.0, 1.0) * width * 0.25 * k
            } else {
                0.0
            };
            row.shift = (wave + n * k * 6.0 + burst).round() as i32;
            row.glitchy = glitchy;

            if glitchy && entropy.chance(rate * 0.3) {
                row.drop = true;
                row.drop_period = if entropy.chance(0.5) { 3 } else { 7 };
            }

            if settings.glitch_row && glitchy && entropy.chance(0.5) {
                row.strong = true;
                row.smear = (entropy.range(-1.0, 1.0) * width * 0.15 * (0.5 + k)).round() as i32;
                if entropy.chance(0.4) {
                    row.tint = Some(GLITCH_PALETTE[entropy.index(GLITCH_PALETTE.len())]);
                }
            }
        }
    }

    fn regenerate_artifacts(&mut self, settings: &Settings, entropy: &mut dyn Entropy) {
        let amount = settings.glitch_artifacts_amount / 100.0;
        let k = settings.glitch_intensity / 100.0;
        let size = settings.artifact_size() as i32;
        let count = ((amount * MAX_BLOCKS as f32).round() as usize).min(MAX_BLOCKS);
        let (gw, gh) = (self.grid.width, self.grid.height);

        for _ in 0..count {
            let block = ArtifactBlock {
                x: entropy.index(gw) as i32,
                y: entropy.index(gh) as i32,
                w: size * (1 + entropy.index(3) as i32),
                h: (size * (1 + entropy.index(2) as i32) / 2).max(1),
                dx: (entropy.range(-1.0, 1.0) * size as f32 * 3.0 * (0.5 + k)).round() as i32,
                dy: (entropy.range(-1.0, 1.0) * size as f32 * (0.5 + k)).round() as i32,
                drop: entropy.chance(0.2),
                tint: if entropy.chance(0.35) {
                    Some(GLITCH_PALETTE[entropy.index(GLITCH_PALETTE.len())])
                } else {
                    None
                },
            };

            let idx = self.blocks.len() as u16;
            let x1 = ((block.x + block.w) as usize).min(gw);
            let y1 = ((block.y + block.h) as usize).min(gh);
            for y in block.y as usize..y1 {
                let row = &mut self.cells[y * gw..(y + 1) * gw];
                for cell in &mut row[block.x as usize..x1] {
                    *cell = Some(idx);
                }
            }
            self.blocks.push(block);
        }
    }
}

const MAX_BLOCKS: usize = 14;
