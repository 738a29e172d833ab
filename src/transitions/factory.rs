//! Effect resolution: declared `(type, subtype, direction, mode)` onto a transition.

use std::sync::Arc;

use crate::animation::filter::{TransitionFilterInfo, TransitionSubType, TransitionType};
use crate::foundation::core::Vec2;
use crate::gpu::shader::FragmentShader;
use crate::transitions::clipping::ClippingShader;
use crate::transitions::fade::{
    CrossfadeShader, EnteringShader, FadeOutShader, FadeThrough, FadeThroughColorShader,
};
use crate::transitions::masks::{is_masked_wipe, mask_effect};
use crate::transitions::push::{PushShader, SlideMotion};
use crate::transitions::scenes3d;
use crate::transitions::simple3d::{Scene3d, SimpleTransition};
use crate::transitions::transition2d::Transition2d;
use crate::transitions::{Transition, TransitionParameters};

/// 3-D scenes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneKind {
    OutsideCube,
    InsideCube,
    Fall,
    TurnAround,
    Rochade,
    VenetianVertical,
    VenetianHorizontal,
    NewsFlash,
}

impl SceneKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::OutsideCube => "outside-cube",
            Self::InsideCube => "inside-cube",
            Self::Fall => "fall",
            Self::TurnAround => "turn-around",
            Self::Rochade => "rochade",
            Self::VenetianVertical => "venetian-3d-vertical",
            Self::VenetianHorizontal => "venetian-3d-horizontal",
            Self::NewsFlash => "news-flash",
        }
    }

    pub fn scene(self) -> Scene3d {
        match self {
            Self::OutsideCube => scenes3d::outside_cube(),
            Self::InsideCube => scenes3d::inside_cube(),
            Self::Fall => scenes3d::fall(),
            Self::TurnAround => scenes3d::turn_around(),
            Self::Rochade => scenes3d::rochade(),
            Self::VenetianVertical => scenes3d::venetian(true),
            Self::VenetianHorizontal => scenes3d::venetian(false),
            Self::NewsFlash => scenes3d::news_flash(),
        }
    }
}

/// Concrete transition an effect resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Show the entering image.
    NoTransition,
    /// Linear blend; also the fallback for unsupported effects.
    Crossfade,
    FadeThroughColor(FadeThrough),
    /// A masked wipe from the mask catalog.
    Mask,
    /// Translating slides. `from` is the entering slide's start offset in slide sizes.
    Slide { motion: SlideMotion, from: (i8, i8) },
    Scene(SceneKind),
}

impl TransitionKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::NoTransition => "none",
            Self::Crossfade => "crossfade",
            Self::FadeThroughColor(_) => "fade-through-color",
            Self::Mask => "mask",
            Self::Slide { motion: SlideMotion::Push, .. } => "push",
            Self::Slide { motion: SlideMotion::Cover, .. } => "cover",
            Self::Slide { motion: SlideMotion::Uncover, .. } => "uncover",
            Self::Scene(s) => s.name(),
        }
    }
}

fn is_slide_only(t: TransitionType) -> bool {
    matches!(
        t,
        TransitionType::Fade
            | TransitionType::SlideWipe
            | TransitionType::PushWipe
            | TransitionType::MiscShapeWipe
            | TransitionType::Zoom
    )
}

fn direction_offset(sub: TransitionSubType, diagonals: bool) -> Option<(i8, i8)> {
    use TransitionSubType as S;
    let off = match sub {
        S::FromLeft => (-1, 0),
        S::FromRight => (1, 0),
        S::FromTop => (0, -1),
        S::FromBottom => (0, 1),
        S::FromTopLeft if diagonals => (-1, -1),
        S::FromTopRight if diagonals => (1, -1),
        S::FromBottomLeft if diagonals => (-1, 1),
        S::FromBottomRight if diagonals => (1, 1),
        _ => return None,
    };
    Some(off)
}

/// Resolve with crossfade as the fallback.
pub fn resolve(info: &TransitionFilterInfo, is_slide: bool) -> TransitionKind {
    resolve_with_fallback(info, is_slide, TransitionKind::Crossfade)
}

/// Resolve an effect. Never fails: unsupported effects, and slide-only effects requested for a
/// shape, log a warning and resolve to `fallback`.
#[tracing::instrument(
    level = "debug",
    skip(info),
    fields(ty = info.transition_type.name(), sub = info.subtype.name())
)]
pub fn resolve_with_fallback(
    info: &TransitionFilterInfo,
    is_slide: bool,
    fallback: TransitionKind,
) -> TransitionKind {
    use TransitionSubType as S;
    use TransitionType as T;

    let ty = info.transition_type;
    if ty == T::None {
        return TransitionKind::NoTransition;
    }
    if is_slide_only(ty) && !is_slide {
        tracing::warn!(
            effect = ty.name(),
            fallback = fallback.name(),
            "slide-only effect requested for a shape"
        );
        return fallback;
    }

    let forward = info.is_direction_forward;
    let kind = match (ty, info.subtype) {
        (T::Fade, S::CrossFade | S::Default) => Some(TransitionKind::Crossfade),
        (T::Fade, S::FadeToColor) => Some(TransitionKind::FadeThroughColor(FadeThrough::Color)),
        (T::Fade, S::FadeFromColor) => {
            Some(TransitionKind::FadeThroughColor(FadeThrough::FromColor))
        }
        (T::Fade, S::FadeOverColor) => {
            Some(TransitionKind::FadeThroughColor(FadeThrough::OverColor))
        }
        (T::SlideWipe, sub) => direction_offset(sub, true).map(|from| TransitionKind::Slide {
            motion: if forward {
                SlideMotion::Cover
            } else {
                SlideMotion::Uncover
            },
            from,
        }),
        (T::PushWipe, sub) => direction_offset(sub, false).map(|(x, y)| TransitionKind::Slide {
            motion: SlideMotion::Push,
            from: if forward { (x, y) } else { (-x, -y) },
        }),
        (T::MiscShapeWipe, S::CornersOut) => Some(TransitionKind::Scene(SceneKind::OutsideCube)),
        (T::MiscShapeWipe, S::CornersIn) => Some(TransitionKind::Scene(SceneKind::InsideCube)),
        (T::MiscShapeWipe, S::TopToBottom) => Some(TransitionKind::Scene(SceneKind::Fall)),
        (T::MiscShapeWipe, S::LeftToRight) => Some(TransitionKind::Scene(SceneKind::TurnAround)),
        (T::MiscShapeWipe, S::Across) => Some(TransitionKind::Scene(SceneKind::Rochade)),
        (T::MiscShapeWipe, S::Vertical) => {
            Some(TransitionKind::Scene(SceneKind::VenetianVertical))
        }
        (T::MiscShapeWipe, S::Horizontal) => {
            Some(TransitionKind::Scene(SceneKind::VenetianHorizontal))
        }
        (T::Zoom, S::RotateIn) => Some(TransitionKind::Scene(SceneKind::NewsFlash)),
        _ if is_masked_wipe(info) => Some(TransitionKind::Mask),
        _ => None,
    };

    kind.unwrap_or_else(|| {
        tracing::warn!(
            effect = ty.name(),
            subtype = info.subtype.name(),
            fallback = fallback.name(),
            "unsupported effect"
        );
        fallback
    })
}

/// Resolve and build, falling back to a crossfade.
pub fn create_transition(
    info: &TransitionFilterInfo,
    params: TransitionParameters,
) -> Box<dyn Transition> {
    let kind = resolve(info, params.is_slide);
    build_transition(kind, info, params)
}

/// Crossfade, or a fade-out for shape exit effects.
fn crossfade_shader(info: &TransitionFilterInfo, is_slide: bool) -> Arc<dyn FragmentShader> {
    if !is_slide && !info.is_mode_in {
        Arc::new(FadeOutShader)
    } else {
        Arc::new(CrossfadeShader)
    }
}

/// Build the transition for an already resolved kind.
pub fn build_transition(
    kind: TransitionKind,
    info: &TransitionFilterInfo,
    mut params: TransitionParameters,
) -> Box<dyn Transition> {
    let canvas = params.context.canvas();
    if let Some(color) = info.fade_color {
        params.fade_color = color;
    }
    match kind {
        TransitionKind::NoTransition => {
            Box::new(Transition2d::new(kind.name(), Arc::new(EnteringShader), params))
        }
        TransitionKind::Crossfade => {
            let shader = crossfade_shader(info, params.is_slide);
            Box::new(Transition2d::new(kind.name(), shader, params))
        }
        TransitionKind::FadeThroughColor(mode) => Box::new(Transition2d::new(
            kind.name(),
            Arc::new(FadeThroughColorShader { mode }),
            params,
        )),
        TransitionKind::Mask => match mask_effect(info, canvas) {
            Some(effect) => {
                let shader =
                    ClippingShader::new(effect.mask, info, &effect.traits, canvas, params.is_slide);
                Box::new(Transition2d::new(effect.name, Arc::new(shader), params))
            }
            None => {
                tracing::warn!(
                    effect = info.transition_type.name(),
                    "no mask for effect, using crossfade"
                );
                let shader = crossfade_shader(info, params.is_slide);
                Box::new(Transition2d::new(
                    TransitionKind::Crossfade.name(),
                    shader,
                    params,
                ))
            }
        },
        TransitionKind::Slide { motion, from } => Box::new(Transition2d::new(
            kind.name(),
            Arc::new(PushShader {
                motion,
                from: Vec2::new(f64::from(from.0), f64::from(from.1)),
            }),
            params,
        )),
        TransitionKind::Scene(scene) => {
            Box::new(SimpleTransition::new(scene.name(), scene.scene(), params))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/factory.rs"]
mod tests;
