//! Live camera or still image to animated ASCII art.
//!
//! Each frame is sampled into a grid of cells, masked to a silhouette,
//! mapped to glyphs by luminance and emitted as markup with optional color
//! spans. Glitch, scatter, pattern animation and cursor warp are all derived
//! per frame from [`Settings`].

pub mod compositor;
pub mod entropy;
pub mod error;
pub mod export;
pub mod font;
pub mod glitch;
pub mod glyph;
pub mod image_source;
pub mod markup;
pub mod pattern;
pub mod raster;
pub mod sampler;
pub mod scatter;
pub mod settings;
pub mod shape;
pub mod types;

pub use compositor::Compositor;
pub use entropy::{Entropy, ScriptedEntropy, XorShiftEntropy};
pub use error::{Error, Result};
pub use export::{ExportStyle, export_png};
pub use image_source::{ImageFeed, ImageSlot};
pub use markup::GlyphGrid;
pub use scatter::ParticleSet;
pub use settings::{PatternName, Settings, SettingsFile, Shape, SourceMode};
pub use types::{FrameBuffer, FrameClock, FrameSource, GridSize, PointerState, Rgb};
