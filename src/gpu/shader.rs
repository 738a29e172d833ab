use std::fmt;

use crate::foundation::core::Point;
use crate::foundation::transform3d::Mat4;

/// Number of texture units a context exposes.
pub const MAX_TEXTURE_UNITS: usize = 4;

/// Fixed texture unit assignment shared by all transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureUnit {
    /// Leaving slide or shape region.
    Leaving = 0,
    /// Entering slide or shape.
    Entering = 1,
}

impl TextureUnit {
    /// Unit index.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Per-program uniform state.
#[derive(Clone, Debug, PartialEq)]
pub struct Uniforms {
    /// Normalized transition progress.
    pub time: f32,
    /// Model transform applied to vertex positions.
    pub transform: Mat4,
    /// Apply the perspective divide after `transform`.
    pub perspective: bool,
    /// Alpha multiplied into the entering image (shape transitions).
    pub alpha: f32,
    /// Free colour slot (fade colour, spinner colour).
    pub color: [f32; 4],
    /// Viewport size in pixels.
    pub viewport: [f32; 2],
    /// Texture unit read by single-texture programs.
    pub sampler: TextureUnit,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            transform: Mat4::IDENTITY,
            perspective: false,
            alpha: 1.0,
            color: [0.0, 0.0, 0.0, 1.0],
            viewport: [1.0, 1.0],
            sampler: TextureUnit::Entering,
        }
    }
}

/// One uniform assignment on the current program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uniform {
    /// Set `time`.
    Time(f32),
    /// Set `transform`.
    Transform(Mat4),
    /// Set `perspective`.
    Perspective(bool),
    /// Set `alpha`.
    Alpha(f32),
    /// Set `color`.
    Color([f32; 4]),
    /// Set `sampler`.
    Sampler(TextureUnit),
}

impl Uniforms {
    pub(crate) fn apply(&mut self, u: Uniform) {
        match u {
            Uniform::Time(v) => self.time = v,
            Uniform::Transform(m) => self.transform = m,
            Uniform::Perspective(v) => self.perspective = v,
            Uniform::Alpha(v) => self.alpha = v,
            Uniform::Color(c) => self.color = c,
            Uniform::Sampler(unit) => self.sampler = unit,
        }
    }
}

/// Texture storage: premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes.
    pub data: Vec<u8>,
}

impl TextureData {
    fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            f32::from(self.data[i]) / 255.0,
            f32::from(self.data[i + 1]) / 255.0,
            f32::from(self.data[i + 2]) / 255.0,
            f32::from(self.data[i + 3]) / 255.0,
        ]
    }

    /// Bilinear sample with clamp-to-edge addressing.
    pub fn sample(&self, uv: Point) -> [f32; 4] {
        if self.width == 0 || self.height == 0 {
            return [0.0; 4];
        }
        let fx = (uv.x * f64::from(self.width) - 0.5).clamp(0.0, f64::from(self.width - 1));
        let fy = (uv.y * f64::from(self.height) - 0.5).clamp(0.0, f64::from(self.height - 1));
        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = (fx - f64::from(x0)) as f32;
        let ty = (fy - f64::from(y0)) as f32;

        let a = self.texel(x0, y0);
        let b = self.texel(x1, y0);
        let c = self.texel(x0, y1);
        let d = self.texel(x1, y1);
        let mut out = [0.0; 4];
        for i in 0..4 {
            let top = a[i] + (b[i] - a[i]) * tx;
            let bottom = c[i] + (d[i] - c[i]) * tx;
            out[i] = top + (bottom - top) * ty;
        }
        out
    }
}

/// Textures bound to the texture units for one draw call.
#[derive(Clone, Copy, Debug, Default)]
pub struct Samplers<'a> {
    pub(crate) units: [Option<&'a TextureData>; MAX_TEXTURE_UNITS],
}

impl<'a> Samplers<'a> {
    /// Build from explicit unit bindings (mostly useful in tests).
    pub fn new(units: [Option<&'a TextureData>; MAX_TEXTURE_UNITS]) -> Self {
        Self { units }
    }

    /// Whether a texture is bound to `unit`.
    pub fn has(&self, unit: TextureUnit) -> bool {
        self.units[unit.index()].is_some()
    }

    /// Sample `unit` at `uv`; unbound units read as transparent black.
    pub fn sample(&self, unit: TextureUnit, uv: Point) -> [f32; 4] {
        self.units[unit.index()].map_or([0.0; 4], |t| t.sample(uv))
    }
}

/// Inputs of one fragment invocation.
#[derive(Clone, Copy, Debug)]
pub struct Fragment<'a> {
    /// Interpolated texture coordinate, `(0, 0)` at the top-left.
    pub uv: Point,
    /// Uniforms of the current program.
    pub uniforms: &'a Uniforms,
    /// Bound textures.
    pub samplers: &'a Samplers<'a>,
}

/// A linked program's fragment stage. Outputs premultiplied RGBA in `[0, 1]`.
pub trait FragmentShader: Send + Sync + fmt::Debug {
    /// Shade one fragment.
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4];
}

/// Samples the `sampler` unit scaled by `alpha`; the program used for 3-D geometry.
#[derive(Debug, Default)]
pub struct TexturedShader;

impl FragmentShader for TexturedShader {
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4] {
        let c = frag.samplers.sample(frag.uniforms.sampler, frag.uv);
        let a = frag.uniforms.alpha;
        [c[0] * a, c[1] * a, c[2] * a, c[3] * a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/shader.rs"]
mod tests;
