// The settings record: the only external input that governs effects.
// Read fresh every frame, never mutated by the compositor.
//
// Parsing is lenient: a garbage value for one key becomes that key's default
// and never fails the whole file.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::Rgb;

pub const DEFAULT_TEXT_COLOR: Rgb = Rgb::new(0x00, 0xFF, 0x41);
pub const DEFAULT_BACKGROUND_COLOR: Rgb = Rgb::BLACK;

// ----------------------------- enums ---------------------------------------------------

macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn from_name(name: &str) -> Option<Self> {
                match name.trim().to_ascii_lowercase().as_str() {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// The next variant, wrapping around (used for key cycling).
            pub fn next(self) -> Self {
                let pos = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
                Self::ALL[(pos + 1) % Self::ALL.len()]
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
                let v = Value::deserialize(d)?;
                Ok(v.as_str().and_then($name::from_name).unwrap_or_default())
            }
        }
    };
}

named_enum!(
    /// Silhouette the grid is masked to. The first variant is the default.
    Shape {
        Rectangle => "rectangle",
        Circle => "circle",
        Square => "square",
        Triangle => "triangle",
        Diamond => "diamond",
        Pentagon => "pentagon",
        Hexagon => "hexagon",
        Octagon => "octagon",
    }
);

named_enum!(
    /// Glyph ramp selection.
    PatternName {
        Standard => "standard",
        Simple => "simple",
        Minimal => "minimal",
        Blocks => "blocks",
        Matrix => "matrix",
        Crt => "crt",
        Custom => "custom",
    }
);

named_enum!(
    /// Which frame source feeds the compositor.
    SourceMode {
        Camera => "camera",
        Image => "image",
    }
);

// ----------------------------- record --------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    // Display only.
    #[serde(deserialize_with = "lenient_number")]
    pub font_size: f32,
    #[serde(deserialize_with = "lenient_number")]
    pub line_height: f32,
    #[serde(deserialize_with = "lenient_string")]
    pub text_color: String,
    #[serde(deserialize_with = "lenient_string")]
    pub background_color: String,

    pub source: SourceMode,
    /// Still image for image mode. A new path (or a newer file) replaces the
    /// current image.
    #[serde(deserialize_with = "lenient_string")]
    pub image_path: String,

    #[serde(deserialize_with = "lenient_bool")]
    pub flip_h: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub flip_v: bool,
    pub shape: Shape,

    pub pattern: PatternName,
    #[serde(deserialize_with = "lenient_string")]
    pub custom_pattern: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub pattern_animate: bool,
    /// Seconds per pattern cycle.
    #[serde(deserialize_with = "lenient_number")]
    pub pattern_speed: f32,

    #[serde(deserialize_with = "lenient_bool")]
    pub scatter: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub scatter_amount: f32,
    #[serde(deserialize_with = "lenient_number")]
    pub scatter_distance: f32,

    #[serde(deserialize_with = "lenient_bool")]
    pub bright_only: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub bright_threshold: f32,
    #[serde(deserialize_with = "lenient_number")]
    pub density: f32,

    #[serde(deserialize_with = "lenient_bool")]
    pub glitch: bool,
    #[serde(deserialize_with = "lenient_bool")]
    pub glitch_row: bool,
    #[serde(deserialize_with = "lenient_number")]
    pub glitch_rate: f32,
    #[serde(deserialize_with = "lenient_number")]
    pub glitch_intensity: f32,
    #[serde(deserialize_with = "lenient_number")]
    pub glitch_artifacts_amount: f32,
    #[serde(deserialize_with = "lenient_number")]
    pub glitch_artifacts_size: f32,

    #[serde(deserialize_with = "lenient_bool")]
    pub mouse_avoid: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: 6.0,
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            source: SourceMode::Camera,
            image_path: String::new(),
            flip_h: false,
            flip_v: false,
            shape: Shape::Rectangle,
            pattern: PatternName::Standard,
            custom_pattern: String::new(),
            pattern_animate: false,
            pattern_speed: 4.0,
            scatter: false,
            scatter_amount: 30.0,
            scatter_distance: 30.0,
            bright_only: false,
            bright_threshold: 20.0,
            density: 100.0,
            glitch: false,
            glitch_row: false,
            glitch_rate: 30.0,
            glitch_intensity: 50.0,
            glitch_artifacts_amount: 0.0,
            glitch_artifacts_size: 4.0,
            mouse_avoid: false,
        }
    }
}

/// Clamp `v` into `[lo, hi]`, replacing NaN/inf with `fallback`.
fn clamp_or(v: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if v.is_finite() { v.clamp(lo, hi) } else { fallback }
}

impl Settings {
    /// Every numeric field clamped into its documented interval.
    pub fn sanitized(&self) -> Settings {
        let d = Settings::default();
        let mut s = self.clone();
        s.font_size = clamp_or(s.font_size, 4.0, 64.0, d.font_size);
        s.line_height = clamp_or(s.line_height, 2.0, 64.0, d.line_height);
        s.pattern_speed = clamp_or(s.pattern_speed, 0.1, 60.0, d.pattern_speed);
        s.scatter_amount = clamp_or(s.scatter_amount, 0.0, 100.0, d.scatter_amount);
        s.scatter_distance = clamp_or(s.scatter_distance, 0.0, 100.0, d.scatter_distance);
        s.bright_threshold = clamp_or(s.bright_threshold, 0.0, 100.0, d.bright_threshold);
        s.density = clamp_or(s.density, 0.0, 100.0, d.density);
        s.glitch_rate = clamp_or(s.glitch_rate, 0.0, 100.0, d.glitch_rate);
        s.glitch_intensity = clamp_or(s.glitch_intensity, 0.0, 100.0, d.glitch_intensity);
        s.glitch_artifacts_amount =
            clamp_or(s.glitch_artifacts_amount, 0.0, 100.0, d.glitch_artifacts_amount);
        s.glitch_artifacts_size =
            clamp_or(s.glitch_artifacts_size, 1.0, 32.0, d.glitch_artifacts_size).round();
        if Rgb::from_hex(&s.text_color).is_none() {
            s.text_color = d.text_color;
        }
        if Rgb::from_hex(&s.background_color).is_none() {
            s.background_color = d.background_color;
        }
        s
    }

    pub fn text_rgb(&self) -> Rgb {
        Rgb::from_hex(&self.text_color).unwrap_or(DEFAULT_TEXT_COLOR)
    }

    pub fn background_rgb(&self) -> Rgb {
        Rgb::from_hex(&self.background_color).unwrap_or(DEFAULT_BACKGROUND_COLOR)
    }

    pub fn image_path(&self) -> Option<&Path> {
        let p = self.image_path.trim();
        (!p.is_empty()).then(|| Path::new(p))
    }

    /// Integer artifact block size, at least 1.
    pub fn artifact_size(&self) -> usize {
        clamp_or(self.glitch_artifacts_size, 1.0, 32.0, 4.0).round() as usize
    }

    /// Parse a JSON object. Unknown keys are ignored, missing keys take defaults.
    pub fn from_json_str(text: &str) -> Result<Settings> {
        let settings: Settings = serde_json::from_str(text)?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Settings> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| Error::SettingsRead { path: path.to_path_buf(), source })?;
        Self::from_json_str(&text)
    }
}

// ----------------------------- lenient field parsers -----------------------------------

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f32, D::Error> {
    // NaN marks "unusable"; sanitized() swaps it for the default.
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Number(n) => n.as_f64().map(|f| f as f32).unwrap_or(f32::NAN),
        Value::String(s) => s.trim().parse::<f32>().unwrap_or(f32::NAN),
        _ => f32::NAN,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<bool, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "on"),
        _ => false,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => s,
        _ => String::new(),
    })
}

// ----------------------------- file watching -------------------------------------------

/// A settings file re-read whenever its modification time changes.
pub struct SettingsFile {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), modified: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns new settings when the file changed since the last poll.
    /// A parse failure is logged and the previous settings stay in effect.
    pub fn poll(&mut self) -> Option<Settings> {
        let modified = std::fs::metadata(&self.path).and_then(|m| m.modified()).ok();
        if modified.is_none() || modified == self.modified {
            return None;
        }
        self.modified = modified;
        match Settings::load(&self.path) {
            Ok(settings) => {
                info!(path = %self.path.display(), "settings reloaded");
                Some(settings)
            }
            Err(e) => {
                warn!(error = %e, "keeping previous settings");
                None
            }
        }
    }
}
