// Glyph ramps (dimmest -> brightest) and the pattern animation schedule.

use crate::entropy::Entropy;
use crate::settings::{PatternName, Settings};

pub const STANDARD: &str = "   `.,_;^+*LTt1jZkAdGgDRNW@";
pub const SIMPLE: &str = " .:-=+*#%@";
pub const MINIMAL: &str = " .coCO";
pub const BLOCKS: &str = " ░▒▓█";
pub const MATRIX: &str = " 10";
pub const CRT: &str = "  _-.=≡";

/// Presets in cycling order.
pub const PRESETS: [PatternName; 6] = [
    PatternName::Standard,
    PatternName::Simple,
    PatternName::Minimal,
    PatternName::Blocks,
    PatternName::Matrix,
    PatternName::Crt,
];

const NOISE_SCALE: f32 = 0.06;
const NOISE_TIME_SCALE: f32 = 0.35;

pub fn preset(name: PatternName) -> &'static str {
    match name {
        PatternName::Standard | PatternName::Custom => STANDARD,
        PatternName::Simple => SIMPLE,
        PatternName::Minimal => MINIMAL,
        PatternName::Blocks => BLOCKS,
        PatternName::Matrix => MATRIX,
        PatternName::Crt => CRT,
    }
}

/// The user's ramp, when the custom pattern is selected and has something visible.
fn custom_ramp(settings: &Settings) -> Option<&str> {
    let ramp = settings.custom_pattern.as_str();
    (settings.pattern == PatternName::Custom && !ramp.trim().is_empty()).then_some(ramp)
}

/// An ordered glyph ramp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    chars: Vec<char>,
}

impl Pattern {
    pub fn new(ramp: &str) -> Self {
        Self { chars: ramp.chars().collect() }
    }

    /// The pattern the settings select. An empty or whitespace-only custom
    /// ramp falls back to `standard`.
    pub fn resolve(settings: &Settings) -> Self {
        match custom_ramp(settings) {
            Some(ramp) => Self::new(ramp),
            None => Self::new(preset(settings.pattern)),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// `floor(luminance * len)`, clamped to the ramp.
    #[inline]
    pub fn glyph(&self, luminance: f32) -> char {
        if self.chars.is_empty() {
            return ' ';
        }
        let idx = (luminance.clamp(0.0, 1.0) * self.chars.len() as f32).floor() as usize;
        self.chars[idx.min(self.chars.len() - 1)]
    }

    /// Glyphs with whitespace stripped (what scatter particles draw from).
    pub fn visible(&self) -> Vec<char> {
        self.chars.iter().copied().filter(|c| !c.is_whitespace()).collect()
    }
}

/// Which pattern(s) a frame draws from. With animation off this is just the
/// selected pattern; with animation on it cycles the presets and blends two
/// neighbours through a noise field.
#[derive(Clone, Debug)]
pub struct PatternSchedule {
    current: Pattern,
    next: Option<Pattern>,
    blend: f32,
    seconds: f32,
}

impl PatternSchedule {
    pub fn for_frame(settings: &Settings, seconds: f32) -> Self {
        let selected = Pattern::resolve(settings);
        if !settings.pattern_animate {
            return Self { current: selected, next: None, blend: 0.0, seconds };
        }

        let mut cycle: Vec<Pattern> = Vec::with_capacity(PRESETS.len() + 1);
        let start = if custom_ramp(settings).is_some() {
            // A custom ramp leads the cycle.
            cycle.push(selected);
            0
        } else {
            // Custom with a blank ramp cycles as standard.
            PRESETS.iter().position(|p| *p == settings.pattern).unwrap_or(0)
        };
        cycle.extend(PRESETS.iter().map(|p| Pattern::new(preset(*p))));

        let period = settings.pattern_speed.max(0.1);
        let phase = (seconds.max(0.0) / period).max(0.0);
        let n = cycle.len();
        let step = phase.floor().rem_euclid(n as f32) as usize;
        let current = cycle[(start + step) % n].clone();
        let next = cycle[(start + step + 1) % n].clone();

        Self { current, next: Some(next), blend: phase.fract(), seconds }
    }

    pub fn current(&self) -> &Pattern {
        &self.current
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }

    /// Glyph for cell (i,j) at this luminance.
    #[inline]
    pub fn glyph(&self, i: i32, j: i32, luminance: f32, entropy: &dyn Entropy) -> char {
        match &self.next {
            Some(next) if self.blend > 0.0 => {
                let n = entropy.noise(
                    i as f32 * NOISE_SCALE,
                    j as f32 * NOISE_SCALE,
                    self.seconds * NOISE_TIME_SCALE,
                );
                if n < self.blend { next.glyph(luminance) } else { self.current.glyph(luminance) }
            }
            _ => self.current.glyph(luminance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::ScriptedEntropy;

    #[test]
    fn black_selects_darkest_glyph() {
        let p = Pattern::new(" .#");
        assert_eq!(p.glyph(0.0), ' ');
        assert_eq!(p.glyph(0.5), '.');
        assert_eq!(p.glyph(1.0), '#');
    }

    #[test]
    fn whitespace_custom_falls_back_to_standard() {
        let s = Settings {
            pattern: PatternName::Custom,
            custom_pattern: "   \t ".into(),
            ..Settings::default()
        };
        assert_eq!(Pattern::resolve(&s), Pattern::new(STANDARD));
    }

    #[test]
    fn custom_keeps_leading_space() {
        let s = Settings {
            pattern: PatternName::Custom,
            custom_pattern: " xo".into(),
            ..Settings::default()
        };
        let p = Pattern::resolve(&s);
        assert_eq!(p.len(), 3);
        assert_eq!(p.glyph(0.0), ' ');
        assert_eq!(p.visible(), vec!['x', 'o']);
    }

    #[test]
    fn blocks_are_multibyte_safe() {
        let p = Pattern::new(BLOCKS);
        assert_eq!(p.len(), 5);
        assert_eq!(p.glyph(0.99), '█');
    }

    #[test]
    fn static_schedule_never_blends() {
        let s = Settings::default();
        let sched = PatternSchedule::for_frame(&s, 123.4);
        assert_eq!(sched.blend(), 0.0);
        let e = ScriptedEntropy::constant(0.0);
        assert_eq!(sched.glyph(0, 0, 1.0, &e), '@');
    }

    #[test]
    fn animation_advances_one_preset_per_period() {
        let s = Settings { pattern_animate: true, pattern_speed: 2.0, ..Settings::default() };
        let at = |t| PatternSchedule::for_frame(&s, t).current().clone();
        assert_eq!(at(0.5), Pattern::new(STANDARD));
        assert_eq!(at(2.5), Pattern::new(SIMPLE));
        assert_eq!(at(12.5), Pattern::new(STANDARD));
        assert!((PatternSchedule::for_frame(&s, 3.0).blend() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn blank_custom_ramp_cycles_like_standard() {
        let blank = Settings {
            pattern: PatternName::Custom,
            custom_pattern: "  ".into(),
            pattern_animate: true,
            pattern_speed: 1.0,
            ..Settings::default()
        };
        let standard = Settings { pattern: PatternName::Standard, ..blank.clone() };
        for t in [0.5, 1.5, 2.5, 6.5] {
            assert_eq!(
                PatternSchedule::for_frame(&blank, t).current(),
                PatternSchedule::for_frame(&standard, t).current(),
                "at {t}"
            );
        }
        assert_eq!(PatternSchedule::for_frame(&blank, 1.5).current(), &Pattern::new(SIMPLE));
    }

    #[test]
    fn custom_ramp_leads_then_presets_follow() {
        let s = Settings {
            pattern: PatternName::Custom,
            custom_pattern: " ox".into(),
            pattern_animate: true,
            pattern_speed: 1.0,
            ..Settings::default()
        };
        assert_eq!(PatternSchedule::for_frame(&s, 0.5).current(), &Pattern::new(" ox"));
        assert_eq!(PatternSchedule::for_frame(&s, 1.5).current(), &Pattern::new(STANDARD));
        assert_eq!(PatternSchedule::for_frame(&s, 7.5).current(), &Pattern::new(" ox"));
    }

    #[test]
    fn huge_clock_does_not_overflow_the_cycle() {
        let s = Settings { pattern_animate: true, pattern_speed: 0.1, ..Settings::default() };
        let sched = PatternSchedule::for_frame(&s, f32::MAX);
        assert!(PRESETS.iter().any(|p| sched.current() == &Pattern::new(preset(*p))));
        PatternSchedule::for_frame(&s, 1.0e10);
    }

    #[test]
    fn blend_picks_next_where_noise_is_below_ratio() {
        let s = Settings {
            pattern: PatternName::Matrix,
            pattern_animate: true,
            pattern_speed: 1.0,
            ..Settings::default()
        };
        let sched = PatternSchedule::for_frame(&s, 0.75);
        // matrix -> crt
        assert_eq!(sched.glyph(3, 3, 0.99, &ScriptedEntropy::constant(0.1)), '≡');
        assert_eq!(sched.glyph(3, 3, 0.99, &ScriptedEntropy::constant(0.9)), '0');
    }
}
