//! Masked wipes: a per-pixel mask decides how much of the entering slide shows.
//!
//! Direction and mode are folded into two flags once, at construction:
//!
//! - `forward_parameter_sweep` runs the mask's progress from 0 to 1 (or 1 to 0 when cleared);
//! - `invert_mask` swaps which side of the mask shows the entering slide.
//!
//! A reversed effect applies its [`ReverseMethod`]. `SubtractAndInvert` flips both flags,
//! the geometric methods mirror the texture coordinate inside the mask instead. An exit
//! ("out") effect flips the sweep when the effect inverts its sweep on exit, and the mask
//! otherwise.

use std::fmt;

use crate::animation::filter::TransitionFilterInfo;
use crate::foundation::core::{Affine, Canvas, Point};
use crate::foundation::math::mix;
use crate::gpu::shader::{Fragment, FragmentShader, TextureUnit};

/// How an effect plays in reverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReverseMethod {
    /// Reverse direction has no visible effect.
    Ignore,
    /// Run the sweep backwards and invert the mask.
    SubtractAndInvert,
    /// Rotate the geometry by 180°.
    Rotate180,
    /// Mirror horizontally.
    FlipX,
    /// Mirror vertically.
    FlipY,
}

impl ReverseMethod {
    /// Whether reversal is applied to the mask geometry rather than the sweep flags.
    pub fn is_geometric(self) -> bool {
        matches!(self, Self::Rotate180 | Self::FlipX | Self::FlipY)
    }
}

/// Static properties of a mask effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectTraits {
    pub reverse_method: ReverseMethod,
    /// On exit, flip the sweep instead of the mask.
    pub out_inverts_sweep: bool,
    /// Keep the geometry square on non-square viewports.
    pub scale_isotropically: bool,
}

/// A wipe's mask.
pub trait MaskFunction: Send + Sync + fmt::Debug {
    /// Blend weight in `[0, 1]` of the entering slide at `uv` for `progress`.
    fn mask_value(&self, uv: Point, progress: f64) -> f64;

    /// Mirror `uv` for a reversed effect.
    fn reverse_uv(&self, uv: Point, method: ReverseMethod) -> Point {
        match method {
            ReverseMethod::Rotate180 => Point::new(1.0 - uv.x, 1.0 - uv.y),
            ReverseMethod::FlipX => Point::new(1.0 - uv.x, uv.y),
            ReverseMethod::FlipY => Point::new(uv.x, 1.0 - uv.y),
            ReverseMethod::Ignore | ReverseMethod::SubtractAndInvert => uv,
        }
    }
}

/// Direction and mode folded into mask flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SweepFlags {
    pub forward_parameter_sweep: bool,
    pub invert_mask: bool,
    /// Geometric reversal applied to `uv` before the mask runs.
    pub geometric_reverse: Option<ReverseMethod>,
}

impl Default for SweepFlags {
    fn default() -> Self {
        Self {
            forward_parameter_sweep: true,
            invert_mask: false,
            geometric_reverse: None,
        }
    }
}

/// Fold the declared direction and mode into sweep flags.
pub fn compute_sweep_flags(info: &TransitionFilterInfo, traits: &EffectTraits) -> SweepFlags {
    let mut flags = SweepFlags::default();

    if !info.is_direction_forward {
        match traits.reverse_method {
            ReverseMethod::Ignore => {}
            ReverseMethod::SubtractAndInvert => {
                flags.forward_parameter_sweep = !flags.forward_parameter_sweep;
                flags.invert_mask = !flags.invert_mask;
            }
            m @ (ReverseMethod::Rotate180 | ReverseMethod::FlipX | ReverseMethod::FlipY) => {
                flags.geometric_reverse = Some(m);
            }
        }
    }

    if !info.is_mode_in {
        if traits.out_inverts_sweep {
            flags.forward_parameter_sweep = !flags.forward_parameter_sweep;
        } else {
            flags.invert_mask = !flags.invert_mask;
        }
    }

    flags
}

/// Map texture coordinates so the longer axis is stretched about the centre by its aspect ratio.
///
/// A unit distance along the shorter axis then matches a unit distance along the longer one.
pub fn isotropic_transform(canvas: Canvas) -> Affine {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let (sx, sy) = if w > h {
        (w / h, 1.0)
    } else if h > w {
        (1.0, h / w)
    } else {
        (1.0, 1.0)
    };
    Affine::translate((0.5, 0.5))
        * Affine::scale_non_uniform(sx, sy)
        * Affine::translate((-0.5, -0.5))
}

/// Fragment shader of every masked wipe.
#[derive(Debug)]
pub struct ClippingShader {
    mask: Box<dyn MaskFunction>,
    flags: SweepFlags,
    iso: Option<Affine>,
    is_slide: bool,
}

impl ClippingShader {
    pub fn new(
        mask: Box<dyn MaskFunction>,
        info: &TransitionFilterInfo,
        traits: &EffectTraits,
        canvas: Canvas,
        is_slide: bool,
    ) -> Self {
        Self {
            mask,
            flags: compute_sweep_flags(info, traits),
            iso: traits
                .scale_isotropically
                .then(|| isotropic_transform(canvas)),
            is_slide,
        }
    }

    pub fn flags(&self) -> SweepFlags {
        self.flags
    }

    /// Final mask value after isotropic scaling, reversal, sweep direction and inversion.
    ///
    /// Progress 0 and 1 map to exactly 0 and 1 before inversion, whatever the mask geometry.
    pub fn mask_at(&self, uv: Point, t: f64) -> f64 {
        let mut p = self.iso.map_or(uv, |a| a * uv);
        if let Some(m) = self.flags.geometric_reverse {
            p = self.mask.reverse_uv(p, m);
        }
        let progress = if self.flags.forward_parameter_sweep {
            t
        } else {
            1.0 - t
        };
        let mut v = if progress >= 1.0 {
            1.0
        } else if progress <= 0.0 {
            0.0
        } else {
            self.mask.mask_value(p, progress).clamp(0.0, 1.0)
        };
        if self.flags.invert_mask {
            v = 1.0 - v;
        }
        v
    }
}

impl FragmentShader for ClippingShader {
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4] {
        let t = f64::from(frag.uniforms.time.clamp(0.0, 1.0));
        let m = self.mask_at(frag.uv, t) as f32;
        let entering = frag.samplers.sample(TextureUnit::Entering, frag.uv);

        if self.is_slide {
            let leaving = frag.samplers.sample(TextureUnit::Leaving, frag.uv);
            let mut out = [0.0; 4];
            for i in 0..4 {
                out[i] = mix(leaving[i], entering[i], m);
            }
            return out;
        }

        let alpha = frag.uniforms.alpha;
        let has_leaving = frag.samplers.has(TextureUnit::Leaving);
        let leaving = frag.samplers.sample(TextureUnit::Leaving, frag.uv);
        let mut out = [0.0; 4];
        for i in 0..4 {
            let e = entering[i] * alpha;
            out[i] = if has_leaving {
                mix(leaving[i], e, m)
            } else {
                e * m
            };
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/clipping.rs"]
mod tests;
