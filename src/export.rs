// PNG export of a rendered frame. Works from the markup string alone, so any
// frame the compositor produced can be exported after the fact.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{Rgba, RgbaImage};
use tracing::info;

use crate::error::{Error, Result};
use crate::markup::parse_markup;
use crate::raster::{FontMetrics, draw_grid};
use crate::settings::Settings;
use crate::types::{FrameBuffer, Rgb};

/// How an export looks: cell metrics, colors and the border around the text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportStyle {
    pub metrics: FontMetrics,
    pub text: Rgb,
    pub background: Rgb,
    pub padding: usize,
}

impl ExportStyle {
    pub fn from_settings(settings: &Settings) -> Self {
        let s = settings.sanitized();
        Self {
            metrics: FontMetrics::from_settings(&s),
            text: s.text_rgb(),
            background: s.background_rgb(),
            padding: ((s.font_size * 0.75).round() as usize).max(8),
        }
    }
}

/// Rasterize markup into an image. A frame with nothing visible is refused.
pub fn rasterize_markup(markup: &str, style: &ExportStyle) -> Result<RgbaImage> {
    let grid = parse_markup(markup);
    if grid.is_blank() {
        return Err(Error::export("nothing to export: frame is blank"));
    }

    let (tw, th) = style.metrics.block_size(grid.width(), grid.height());
    let (w, h) = (tw + 2 * style.padding, th + 2 * style.padding);
    let mut fb = FrameBuffer::new(w, h, style.background.to_u32());
    let pad = style.padding as i32;
    draw_grid(&mut fb, &grid, style.metrics, style.text, pad, pad);

    let img = RgbaImage::from_fn(w as u32, h as u32, |x, y| {
        let p = fb.pixels[y as usize * w + x as usize];
        Rgba([(p >> 16) as u8, (p >> 8) as u8, p as u8, 255])
    });
    Ok(img)
}

/// Rasterize and write a PNG to `path`.
pub fn export_png(markup: &str, style: &ExportStyle, path: &Path) -> Result<PathBuf> {
    let img = rasterize_markup(markup, style)?;
    img.save_with_format(path, image::ImageFormat::Png)?;
    info!(path = %path.display(), width = img.width(), height = img.height(), "export written");
    Ok(path.to_path_buf())
}

/// `ascii-export-<unix millis>.png`
pub fn export_file_name(now: SystemTime) -> String {
    let millis = now.duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
    format!("ascii-export-{millis}.png")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn blank_markup_is_refused() {
        let style = ExportStyle::from_settings(&Settings::default());
        assert!(matches!(rasterize_markup("   \n   \n", &style), Err(Error::Export(_))));
        assert!(rasterize_markup("", &style).is_err());
    }

    #[test]
    fn image_size_is_text_plus_padding() {
        let style = ExportStyle::from_settings(&Settings::default());
        assert_eq!(style.padding, 12);
        let img = rasterize_markup("@@\n..\n.@\n", &style).unwrap();
        assert_eq!((img.width(), img.height()), (2 * 10 + 24, 3 * 6 + 24));
    }

    #[test]
    fn background_and_span_colors_reach_the_image() {
        let settings = Settings { background_color: "#102030".into(), ..Settings::default() };
        let style = ExportStyle::from_settings(&settings);
        let img = rasterize_markup("<span style=\"color:#ff0000\">█</span>\n", &style).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [0x10, 0x20, 0x30, 255]);
        let p = style.padding as u32;
        assert_eq!(img.get_pixel(p, p).0, [255, 0, 0, 255]);
    }

    #[test]
    fn file_name_uses_epoch_millis() {
        let t = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(export_file_name(t), "ascii-export-1700000000123.png");
    }
}
