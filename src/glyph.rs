// Glyph mapper: pixel luminance -> character, then bright-only filter,
// density thinning and recoloring.

use crate::entropy::Entropy;
use crate::glitch::GLITCH_PALETTE;
use crate::pattern::PatternSchedule;
use crate::settings::Settings;
use crate::types::Rgb;

const SPARKLE_CHANCE: f32 = 0.04;

/// Rec. 709 luma, normalized to [0,1].
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    (0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32) / 255.0
}

/// One output cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    /// Overrides the default text color when set.
    pub color: Option<Rgb>,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph { ch: ' ', color: None };

    pub fn plain(ch: char) -> Self {
        Self { ch, color: None }
    }

    pub fn is_blank(&self) -> bool {
        self.ch == ' '
    }
}

pub struct GlyphMapper<'a> {
    schedule: &'a PatternSchedule,
    bright_threshold: Option<f32>,
    density: Option<f32>,
    sparkle: f32,
}

impl<'a> GlyphMapper<'a> {
    pub fn new(settings: &Settings, schedule: &'a PatternSchedule) -> Self {
        let density = settings.density / 100.0;
        Self {
            schedule,
            bright_threshold: settings.bright_only.then_some(settings.bright_threshold / 100.0),
            // Full density never consumes a draw, so it stays deterministic.
            density: (density < 1.0).then_some(density),
            sparkle: if settings.glitch {
                SPARKLE_CHANCE * settings.glitch_intensity / 100.0
            } else {
                0.0
            },
        }
    }

    /// Map the pixel sampled for grid cell (i,j).
    pub fn map(
        &self,
        i: i32,
        j: i32,
        rgb: (u8, u8, u8),
        tint: Option<Rgb>,
        entropy: &mut dyn Entropy,
    ) -> Glyph {
        let lum = luminance(rgb.0, rgb.1, rgb.2);
        if let Some(threshold) = self.bright_threshold {
            if lum < threshold {
                return Glyph::BLANK;
            }
        }

        let ch = self.schedule.glyph(i, j, lum, entropy);
        if let Some(density) = self.density {
            if entropy.uniform() >= density {
                return Glyph::BLANK;
            }
        }
        if ch.is_whitespace() {
            return Glyph::BLANK;
        }

        let mut color = tint;
        if color.is_none() && self.sparkle > 0.0 && entropy.chance((1.0 - lum) * self.sparkle) {
            color = Some(GLITCH_PALETTE[entropy.index(GLITCH_PALETTE.len())]);
        }
        Glyph { ch, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::{ScriptedEntropy, XorShiftEntropy};
    use crate::settings::PatternName;

    fn with<F: FnOnce(&GlyphMapper)>(settings: &Settings, f: F) {
        let sched = PatternSchedule::for_frame(settings, 0.0);
        let mapper = GlyphMapper::new(settings, &sched);
        f(&mapper);
    }

    #[test]
    fn luminance_bounds() {
        assert_eq!(luminance(0, 0, 0), 0.0);
        assert!((luminance(255, 255, 255) - 1.0).abs() < 1e-5);
        assert!(luminance(0, 255, 0) > luminance(255, 0, 0));
    }

    #[test]
    fn black_is_blank_with_three_step_ramp() {
        let s = Settings {
            pattern: PatternName::Custom,
            custom_pattern: " .#".into(),
            ..Settings::default()
        };
        with(&s, |m| {
            let mut e = ScriptedEntropy::constant(0.5);
            assert_eq!(m.map(0, 0, (0, 0, 0), None, &mut e), Glyph::BLANK);
            assert_eq!(m.map(0, 0, (255, 255, 255), None, &mut e).ch, '#');
        });
    }

    #[test]
    fn zero_density_blanks_everything() {
        let s = Settings { density: 0.0, ..Settings::default() };
        with(&s, |m| {
            let mut e = XorShiftEntropy::from_seed(4);
            for v in 0..=255u8 {
                assert!(m.map(1, 1, (v, v, v), None, &mut e).is_blank());
            }
        });
    }

    #[test]
    fn full_density_consumes_no_draws() {
        with(&Settings::default(), |m| {
            let mut e = ScriptedEntropy::constant(0.5);
            m.map(0, 0, (200, 200, 200), None, &mut e);
            assert_eq!(e.consumed(), 0);
        });
    }

    #[test]
    fn bright_only_threshold() {
        let s = Settings { bright_only: true, bright_threshold: 50.0, ..Settings::default() };
        with(&s, |m| {
            let mut e = ScriptedEntropy::constant(0.5);
            assert!(m.map(0, 0, (100, 100, 100), None, &mut e).is_blank());
            assert!(!m.map(0, 0, (200, 200, 200), None, &mut e).is_blank());
        });
    }

    #[test]
    fn tint_survives_and_sparkles_need_glitch() {
        let tint = Some(Rgb::new(1, 2, 3));
        with(&Settings::default(), |m| {
            let mut e = ScriptedEntropy::constant(0.0);
            assert_eq!(m.map(0, 0, (255, 255, 255), tint, &mut e).color, tint);
            assert_eq!(m.map(0, 0, (128, 128, 128), None, &mut e).color, None);
        });
        let s = Settings { glitch: true, glitch_intensity: 100.0, ..Settings::default() };
        with(&s, |m| {
            let mut e = ScriptedEntropy::constant(0.0);
            let g = m.map(0, 0, (128, 128, 128), None, &mut e);
            assert_eq!(g.color, Some(GLITCH_PALETTE[0]));
        });
    }

    #[test]
    fn blank_glyph_never_gets_a_color() {
        let s = Settings { glitch: true, glitch_intensity: 100.0, ..Settings::default() };
        with(&s, |m| {
            let mut e = ScriptedEntropy::constant(0.0);
            assert_eq!(m.map(0, 0, (0, 0, 0), Some(Rgb::WHITE), &mut e), Glyph::BLANK);
        });
    }
}
