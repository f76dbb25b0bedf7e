// Core value types shared by every stage of the compositor.

use std::fmt;

/// A dense RGBA frame: pixel (x,y) lives at bytes `[4*(x + y*width) .. +4)`.
/// Both the live camera and a decoded still image end up as one of these.
/// Only built through [`FrameSource::new`], so the buffer always matches the
/// (non-zero) dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSource {
    width: usize,
    height: usize,
    rgba: Vec<u8>, // length = width * height * 4
}

impl FrameSource {
    /// Wrap an RGBA buffer. Returns `None` when the buffer does not match the
    /// dimensions, so a bad frame degrades to "no source" instead of a bad read.
    pub fn new(width: usize, height: usize, rgba: Vec<u8>) -> Option<Self> {
        let expected = width.checked_mul(height)?.checked_mul(4)?;
        if width == 0 || height == 0 || rgba.len() != expected {
            return None;
        }
        Some(Self { width, height, rgba })
    }

    /// A frame filled with one color.
    pub fn solid(width: usize, height: usize, color: Rgb) -> Option<Self> {
        let pixels = width.checked_mul(height)?;
        let rgba = [color.r, color.g, color.b, 255].repeat(pixels);
        Self::new(width, height, rgba)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Read the RGB part of pixel (x,y). Coordinates are clamped into bounds.
    #[inline]
    pub fn rgb_clamped(&self, x: i64, y: i64) -> (u8, u8, u8) {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let idx = 4 * (x + y * self.width);
        (self.rgba[idx], self.rgba[idx + 1], self.rgba[idx + 2])
    }
}

/// Logical character grid, independent of the source resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub const DEFAULT: GridSize = GridSize { width: 128, height: 96 };

    pub fn new(width: usize, height: usize) -> Self {
        Self { width: width.max(1), height: height.max(1) }
    }

    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    /// Parse `WxH`, e.g. `128x96`.
    pub fn parse(text: &str) -> Option<Self> {
        let (w, h) = text.trim().split_once(['x', 'X'])?;
        let w: usize = w.trim().parse().ok()?;
        let h: usize = h.trim().parse().ok()?;
        if w == 0 || h == 0 {
            return None;
        }
        Some(Self { width: w, height: h })
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pointer in grid space, updated by the host from mouse events.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

impl PointerState {
    pub const INACTIVE: PointerState = PointerState { x: 0.0, y: 0.0, active: false };

    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y, active: true }
    }
}

/// Animation time for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    pub frame: u64,
    pub seconds: f32,
}

impl FrameClock {
    pub fn new(frame: u64, seconds: f32) -> Self {
        Self { frame, seconds }
    }
}

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Pack as 0x00RRGGBB for minifb.
    #[inline]
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Window pixels, each entry 0x00RRGGBB for minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, fill: u32) -> Self {
        Self { width, height, pixels: vec![fill; width * height] }
    }

    /// Resize in place, reusing the allocation when it is big enough.
    pub fn resize(&mut self, width: usize, height: usize, fill: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, fill);
    }

    /// Put a pixel if (x,y) is inside bounds.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        self.pixels[y * self.width + x] = color;
    }
}
