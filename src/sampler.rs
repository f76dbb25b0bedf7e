// Sampler: destination grid cell -> source pixel, through flip, pointer warp,
// glitch row shift, strong row smear, artifact displacement and image fit.
// Any stage may answer "no sample", which renders the cell blank.

use crate::entropy::Entropy;
use crate::glitch::GlitchTables;
use crate::settings::Settings;
use crate::types::{FrameSource, GridSize, PointerState, Rgb};

const WARP_RADIUS: f32 = 12.0;
const WARP_HOLE: f32 = 2.0;
const WARP_PUSH: f32 = 0.5;
const STRONG_BLANK_CHANCE: f32 = 0.12;

/// How a source maps onto the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fit {
    /// Camera: stretch to the whole grid.
    Stretch,
    /// Still image: scale to fit preserving aspect, centered; outside is blank.
    Letterbox,
}

/// A successful sample: the pixel plus any tint picked up on the way.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sampled {
    pub rgb: (u8, u8, u8),
    pub tint: Option<Rgb>,
}

/// Mirror `v` about an axis of `size` cells when `on`.
#[inline]
pub fn flip_axis(v: i32, size: usize, on: bool) -> i32 {
    if on { size as i32 - 1 - v } else { v }
}

#[derive(Clone, Copy, Debug)]
struct Warp {
    px: f32,
    py: f32,
    radius: f32,
    hole: f32,
}

pub struct Sampler<'a> {
    source: &'a FrameSource,
    fit: Fit,
    grid: GridSize,
    flip_h: bool,
    flip_v: bool,
    warp: Option<Warp>,
    tables: Option<&'a GlitchTables>,
    strong_rows: bool,
    strong_blank: f32,
}

impl<'a> Sampler<'a> {
    pub fn new(
        source: &'a FrameSource,
        fit: Fit,
        grid: GridSize,
        settings: &Settings,
        pointer: PointerState,
        tables: &'a GlitchTables,
    ) -> Self {
        let k = settings.glitch_intensity / 100.0;
        let strength = 1.0 + k;
        let warp = (settings.mouse_avoid && pointer.active).then_some(Warp {
            px: pointer.x,
            py: pointer.y,
            radius: WARP_RADIUS * strength,
            hole: WARP_HOLE * strength,
        });
        Self {
            source,
            fit,
            grid,
            flip_h: settings.flip_h,
            flip_v: settings.flip_v,
            warp,
            tables: settings.glitch.then_some(tables),
            strong_rows: settings.glitch && settings.glitch_row,
            strong_blank: STRONG_BLANK_CHANCE * k,
        }
    }

    /// Grid-space sample position for destination cell (i,j), or `None`.
    /// `column` is the cell's column on the extended canvas.
    pub fn locate(
        &self,
        i: i32,
        j: i32,
        column: usize,
        entropy: &mut dyn Entropy,
    ) -> Option<(f32, f32, Option<Rgb>)> {
        let mut x = flip_axis(i, self.grid.width, self.flip_h) as f32;
        let mut y = flip_axis(j, self.grid.height, self.flip_v) as f32;
        let mut tint = None;

        if let Some(w) = self.warp {
            let dx = i as f32 - w.px;
            let dy = j as f32 - w.py;
            let d = (dx * dx + dy * dy).sqrt();
            if d < w.hole {
                return None;
            }
            if d < w.radius {
                let push = (1.0 - d / w.radius) * w.radius * WARP_PUSH;
                let (ux, uy) = (dx / d, dy / d);
                // Offsets are in screen space; mirror them with the content.
                x += if self.flip_h { -ux * push } else { ux * push };
                y += if self.flip_v { -uy * push } else { uy * push };
            }
        }

        if let Some(tables) = self.tables {
            let width = self.grid.width as f32;
            if let Some(row) = tables.row(j) {
                if row.drops_column(column) {
                    return None;
                }
                x = (x + row.shift as f32).rem_euclid(width);

                if self.strong_rows && row.strong {
                    x = (x + row.smear as f32).rem_euclid(width);
                    tint = row.tint;
                    if entropy.chance(self.strong_blank) {
                        return None;
                    }
                }
            }

            if let Some(block) = tables.artifact(i, j) {
                if block.drop {
                    return None;
                }
                x += block.dx as f32;
                y += block.dy as f32;
                if block.tint.is_some() {
                    tint = block.tint;
                }
            }
        }

        Some((x, y, tint))
    }

    /// Map a grid-space position into source pixel space, clamped into bounds.
    pub fn to_source(&self, x: f32, y: f32) -> Option<(i64, i64)> {
        let (gw, gh) = (self.grid.width as f32, self.grid.height as f32);
        let (sw, sh) = (self.source.width() as f32, self.source.height() as f32);

        let (px, py) = match self.fit {
            Fit::Stretch => ((x * sw / gw).floor(), (y * sh / gh).floor()),
            Fit::Letterbox => {
                let scale = (gw / sw).min(gh / sh);
                let (dw, dh) = (sw * scale, sh * scale);
                let ox = (gw - dw) / 2.0;
                let oy = (gh - dh) / 2.0;
                if x < ox || x >= ox + dw || y < oy || y >= oy + dh {
                    return None;
                }
                (((x - ox) / scale).floor(), ((y - oy) / scale).floor())
            }
        };
        if !(px.is_finite() && py.is_finite()) {
            return None;
        }
        let px = (px as i64).clamp(0, self.source.width() as i64 - 1);
        let py = (py as i64).clamp(0, self.source.height() as i64 - 1);
        Some((px, py))
    }

    /// Full pipeline for one destination cell.
    #[inline]
    pub fn sample(&self, i: i32, j: i32, column: usize, entropy: &mut dyn Entropy) -> Option<Sampled> {
        let (x, y, tint) = self.locate(i, j, column, entropy)?;
        let (px, py) = self.to_source(x, y)?;
        Some(Sampled { rgb: self.source.rgb_clamped(px, py), tint })
    }
}
