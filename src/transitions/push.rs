//! Push, cover and uncover: slides translated across the viewport.

use crate::foundation::core::{Point, Vec2};
use crate::gpu::shader::{Fragment, FragmentShader, TextureUnit};

/// Which slide moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlideMotion {
    /// Entering pushes leaving out.
    Push,
    /// Entering slides in over a static leaving slide.
    Cover,
    /// Leaving slides out, revealing a static entering slide.
    Uncover,
}

/// Translating slides.
///
/// `from` is the offset, in slide sizes, where the entering slide starts; `(-1, 0)` enters from
/// the left. Uncover moves the leaving slide towards `-from`.
#[derive(Debug)]
pub struct PushShader {
    pub motion: SlideMotion,
    pub from: Vec2,
}

fn inside(uv: Point) -> bool {
    (0.0..1.0).contains(&uv.x) && (0.0..1.0).contains(&uv.y)
}

impl FragmentShader for PushShader {
    fn shade(&self, frag: &Fragment<'_>) -> [f32; 4] {
        let t = f64::from(frag.uniforms.time.clamp(0.0, 1.0));
        let uv = frag.uv;
        let sample = |unit, p: Point| frag.samplers.sample(unit, p);

        match self.motion {
            SlideMotion::Cover | SlideMotion::Push => {
                let e = uv - self.from * (1.0 - t);
                if inside(e) {
                    return sample(TextureUnit::Entering, e);
                }
                if self.motion == SlideMotion::Cover {
                    return sample(TextureUnit::Leaving, uv);
                }
                let l = uv + self.from * t;
                if inside(l) {
                    sample(TextureUnit::Leaving, l)
                } else {
                    [0.0, 0.0, 0.0, 1.0]
                }
            }
            SlideMotion::Uncover => {
                let l = uv + self.from * t;
                if inside(l) {
                    sample(TextureUnit::Leaving, l)
                } else {
                    sample(TextureUnit::Entering, uv)
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/push.rs"]
mod tests;
