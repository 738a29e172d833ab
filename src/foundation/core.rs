use crate::foundation::error::{SlideFxError, SlideFxResult};

pub use kurbo::{Affine, Point, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> SlideFxResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlideFxError::validation("canvas dimensions must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Number of pixels covered by the canvas.
    pub fn pixel_count(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Width divided by height.
    pub fn aspect_ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Opaque black, the default fade colour.
    pub fn black() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 255,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Parse an opaque `#rrggbb` colour as used by slide metadata.
    pub fn from_hex(s: &str) -> SlideFxResult<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(SlideFxError::validation(format!(
                "colour '{s}' must have the form #rrggbb"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| SlideFxError::validation(format!("invalid hex digits in '{s}'")))
        };
        Ok(Self::from_straight_rgba(channel(0)?, channel(2)?, channel(4)?, 255))
    }

    /// Bytes in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Normalized premultiplied channels.
    pub fn to_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

/// A rendered bitmap as RGBA8 pixels.
///
/// Slide layers, shape bitmaps and presented frames all use **premultiplied alpha**. The
/// `premultiplied` flag keeps this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Allocate a bitmap filled with a single colour.
    pub fn filled(canvas: Canvas, color: Rgba8Premul) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: color.to_array().repeat(canvas.pixel_count()),
            premultiplied: true,
        }
    }

    /// Allocate a fully transparent bitmap.
    pub fn transparent(canvas: Canvas) -> Self {
        Self::filled(canvas, Rgba8Premul::transparent())
    }

    /// Wrap existing bytes, checking that they match `width * height * 4`.
    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> SlideFxResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| SlideFxError::evaluation("bitmap size overflow"))?;
        if data.len() != expected {
            return Err(SlideFxError::evaluation(format!(
                "bitmap data has {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    /// Canvas covered by this bitmap.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Read one pixel; out-of-range coordinates return `None`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
