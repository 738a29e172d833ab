//! Crossfade and fade-through-colour shaders.

use crate::gpu::shader::{Fragment, FragmentShader, TextureUnit};

fn lerp4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = crate::foundation::math::mix(a[i], b[i], t);
    }
    out
}

fn scale4(c: [f32; 4], s: f32) -> [f32; 4] {
    c.map(|v| v * s)
}

/// Entering image scaled by `alpha`, blended against the leaving image when one is bound.
pub(crate) fn blend_entering(frag: &Fragment<'_>, weight: f32) -> [f32; 4] {
    let entering = scale4(
        frag.samplers.sample(TextureUnit::Entering, frag.uv),
        frag.uniforms.alpha,
    );
    if frag.samplers.has(TextureUnit::Leaving) {
        let leaving = frag.samplers.sample(TextureUnit::Leaving, frag.uv);
        lerp4(leaving, entering, weight)
    } else {
        scale4(entering, weight)
    }
}

/// Linear blend from leaving to entering over the whole progress range.
#[derive(Debug, Default)]
pub struct CrossfadeShader;

impl FragmentShader for CrossfadeShader {
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4] {
        blend_entering(frag, frag.uniforms.time.clamp(0.0, 1.0))
    }
}

/// Shape exit: the shape image fades out over the whole progress range.
#[derive(Debug, Default)]
pub struct FadeOutShader;

impl FragmentShader for FadeOutShader {
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4] {
        blend_entering(frag, 1.0 - frag.uniforms.time.clamp(0.0, 1.0))
    }
}

/// Shows only the entering image.
#[derive(Debug, Default)]
pub struct EnteringShader;

impl FragmentShader for EnteringShader {
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4] {
        blend_entering(frag, 1.0)
    }
}

/// How a fade passes through the `color` uniform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FadeThrough {
    /// Leaving fades to the colour, then the colour fades to entering.
    Color,
    /// Leaving is cut to the colour, which then fades to entering.
    FromColor,
    /// Entering fades in over the colour while the leaving image fades out at the same time.
    OverColor,
}

/// Fade passing through a solid colour.
#[derive(Debug)]
pub struct FadeThroughColorShader {
    pub mode: FadeThrough,
}

impl FragmentShader for FadeThroughColorShader {
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4] {
        let t = frag.uniforms.time.clamp(0.0, 1.0);
        let color = frag.uniforms.color;
        let leaving = frag.samplers.sample(TextureUnit::Leaving, frag.uv);
        let entering = frag.samplers.sample(TextureUnit::Entering, frag.uv);
        match self.mode {
            FadeThrough::Color => {
                if t < 0.5 {
                    lerp4(leaving, color, t * 2.0)
                } else {
                    lerp4(color, entering, t * 2.0 - 1.0)
                }
            }
            FadeThrough::FromColor => lerp4(color, entering, t),
            FadeThrough::OverColor => {
                let out = (1.0 - t * 2.0).max(0.0);
                let inn = (t * 2.0 - 1.0).max(0.0);
                let mut c = [0.0; 4];
                for i in 0..4 {
                    c[i] = leaving[i] * out + entering[i] * inn + color[i] * (1.0 - out - inn);
                }
                c
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/fade.rs"]
mod tests;
