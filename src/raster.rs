// Software text drawing: a glyph grid into a pixel buffer, plus the small HUD.
// Used by the window every frame and by the PNG export.

use crate::font::{glyph5x7, shade_level};
use crate::glyph::Glyph;
use crate::markup::GlyphGrid;
use crate::settings::Settings;
use crate::types::{FrameBuffer, Rgb};

/// 2x2 ordered-dither thresholds for the shade blocks.
const BAYER_2X2: [u8; 4] = [0, 2, 3, 1];

/// Pixel size of one character cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontMetrics {
    pub cell_w: usize,
    pub cell_h: usize,
}

impl FontMetrics {
    /// Monospace advance is ~0.6 em; the row pitch is the configured line height.
    pub fn from_settings(settings: &Settings) -> Self {
        let s = settings.sanitized();
        Self {
            cell_w: ((s.font_size * 0.6).round() as usize).max(3),
            cell_h: (s.line_height.round() as usize).max(2),
        }
    }

    /// Pixel size of a `cols` x `rows` text block.
    pub fn block_size(&self, cols: usize, rows: usize) -> (usize, usize) {
        (cols * self.cell_w, rows * self.cell_h)
    }
}

/// Paint `grid` at (x0,y0). Cells without their own color use `text`.
/// The background is not cleared here.
pub fn draw_grid(fb: &mut FrameBuffer, grid: &GlyphGrid, metrics: FontMetrics, text: Rgb, x0: i32, y0: i32) {
    for y in 0..grid.height() {
        for (x, glyph) in grid.row(y).iter().enumerate() {
            if glyph.is_blank() {
                continue;
            }
            let cx = x0 + (x * metrics.cell_w) as i32;
            let cy = y0 + (y * metrics.cell_h) as i32;
            draw_cell(fb, *glyph, metrics, text, cx, cy);
        }
    }
}

/// One glyph scaled nearest-neighbour into its cell (1px gap on the right).
fn draw_cell(fb: &mut FrameBuffer, glyph: Glyph, m: FontMetrics, text: Rgb, cx: i32, cy: i32) {
    let color = glyph.color.unwrap_or(text).to_u32();
    let gw = if m.cell_w > 3 { m.cell_w - 1 } else { m.cell_w };
    let gh = m.cell_h;

    if let Some(level) = shade_level(glyph.ch) {
        for py in 0..m.cell_h {
            for px in 0..m.cell_w {
                if BAYER_2X2[(py & 1) * 2 + (px & 1)] < level {
                    fb.put(cx + px as i32, cy + py as i32, color);
                }
            }
        }
        return;
    }

    match glyph5x7(glyph.ch) {
        Some(rows) => {
            for py in 0..gh {
                let bits = rows[py * 7 / gh];
                for px in 0..gw {
                    let col = px * 5 / gw;
                    if bits & (1 << (4 - col)) != 0 {
                        fb.put(cx + px as i32, cy + py as i32, color);
                    }
                }
            }
        }
        None => {
            // Unknown glyph: hollow box.
            for px in 0..gw {
                fb.put(cx + px as i32, cy, color);
                fb.put(cx + px as i32, cy + gh as i32 - 1, color);
            }
            for py in 0..gh {
                fb.put(cx, cy + py as i32, color);
                fb.put(cx + gw as i32 - 1, cy + py as i32, color);
            }
        }
    }
}

/// Draw a single 5x7 character at (x,y), unscaled.
/// A 1-pixel black shadow keeps it readable over the ASCII picture.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass first, then the glyph itself.
        for (offset, c) in [(1, 0x00000000), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        fb.put(x + rx + offset, y + ry as i32 + offset, c);
                    }
                }
            }
        }
    }
}

/// Draw a HUD string; each glyph is 5x7 with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(fb: &FrameBuffer, color: u32) -> usize {
        fb.pixels.iter().filter(|p| **p == color).count()
    }

    #[test]
    fn metrics_follow_font_settings() {
        let m = FontMetrics::from_settings(&Settings::default());
        assert_eq!(m, FontMetrics { cell_w: 10, cell_h: 6 });
        assert_eq!(m.block_size(128, 96), (1280, 576));
    }

    #[test]
    fn blank_grid_draws_nothing() {
        let mut fb = FrameBuffer::new(40, 20, 0);
        let grid = GlyphGrid::new(4, 3);
        draw_grid(&mut fb, &grid, FontMetrics { cell_w: 8, cell_h: 6 }, Rgb::WHITE, 0, 0);
        assert_eq!(lit(&fb, 0), 40 * 20);
    }

    #[test]
    fn glyph_stays_inside_its_cell_and_uses_its_color() {
        let m = FontMetrics { cell_w: 6, cell_h: 7 };
        let mut fb = FrameBuffer::new(18, 7, 0);
        let mut grid = GlyphGrid::new(3, 1);
        grid.set(1, 0, Glyph { ch: '@', color: Some(Rgb::new(255, 0, 0)) });
        draw_grid(&mut fb, &grid, m, Rgb::WHITE, 0, 0);
        let red = Rgb::new(255, 0, 0).to_u32();
        assert!(lit(&fb, red) > 0);
        for y in 0..7 {
            for x in (0..6).chain(12..18) {
                assert_eq!(fb.pixels[y * 18 + x], 0);
            }
        }
    }

    #[test]
    fn full_block_fills_the_cell_and_light_shade_a_quarter() {
        let m = FontMetrics { cell_w: 4, cell_h: 4 };
        let mut grid = GlyphGrid::new(1, 1);
        grid.set(0, 0, Glyph::plain('█'));
        let mut fb = FrameBuffer::new(4, 4, 0);
        draw_grid(&mut fb, &grid, m, Rgb::WHITE, 0, 0);
        assert_eq!(lit(&fb, Rgb::WHITE.to_u32()), 16);

        grid.set(0, 0, Glyph::plain('░'));
        let mut fb = FrameBuffer::new(4, 4, 0);
        draw_grid(&mut fb, &grid, m, Rgb::WHITE, 0, 0);
        assert_eq!(lit(&fb, Rgb::WHITE.to_u32()), 4);
    }

    #[test]
    fn unknown_glyph_is_a_box() {
        let m = FontMetrics { cell_w: 6, cell_h: 6 };
        let mut grid = GlyphGrid::new(1, 1);
        grid.set(0, 0, Glyph::plain('é'));
        let mut fb = FrameBuffer::new(6, 6, 0);
        draw_grid(&mut fb, &grid, m, Rgb::WHITE, 0, 0);
        // 5x6 outline
        assert_eq!(lit(&fb, Rgb::WHITE.to_u32()), 5 * 2 + 4 * 2);
    }

    #[test]
    fn hud_text_is_clipped_not_panicking() {
        let mut fb = FrameBuffer::new(10, 5, 0);
        draw_text_5x7(&mut fb, 6, 2, "FPS: 29.9", 0x00FFFFFF);
        assert!(lit(&fb, 0x00FFFFFF) > 0);
    }
}
