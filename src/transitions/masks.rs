//! Mask functions of the wipe catalog.
//!
//! Every mask takes texture coordinates with `(0, 0)` at the top-left and a progress in
//! `(0, 1)`, and returns 1 where the entering slide shows. The mask grows with progress and
//! reaches the slide corners as progress approaches 1. Isotropic masks receive coordinates already
//! stretched about the centre, so the longer axis exceeds `[0, 1]`; they carry the half extent
//! of that space to reach the corners at the end.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{BezPath, Shape};

use crate::animation::filter::{TransitionFilterInfo, TransitionSubType, TransitionType};
use crate::foundation::core::{Canvas, Point, Vec2};
use crate::foundation::math::cell_noise;
use crate::transitions::clipping::{EffectTraits, MaskFunction, ReverseMethod};

const DISSOLVE_SEED: u64 = 0x5eed_d155;
const RANDOM_BARS_SEED: u64 = 0x5eed_ba55;
const RANDOM_BARS: u32 = 64;
const CHECKER_CELLS: f64 = 8.0;
const BLINDS: f64 = 6.0;
const WATERFALL_STEPS: f64 = 8.0;
const DISSOLVE_CELL_PX: u32 = 16;

fn step_below(v: f64, edge: f64) -> f64 {
    if v < edge { 1.0 } else { 0.0 }
}

/// Half size of the mask coordinate space, `(0.5, 0.5)` unless stretched isotropically.
pub fn half_extent(canvas: Canvas, isotropic: bool) -> Vec2 {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    if !isotropic || w == h {
        Vec2::new(0.5, 0.5)
    } else if w > h {
        Vec2::new(0.5 * w / h, 0.5)
    } else {
        Vec2::new(0.5, 0.5 * h / w)
    }
}

fn centered(uv: Point) -> Vec2 {
    uv - Point::new(0.5, 0.5)
}

/// Straight edge crossing the slide.
#[derive(Debug)]
pub struct BarWipe {
    /// Sweep top to bottom instead of left to right.
    pub top_to_bottom: bool,
}

impl MaskFunction for BarWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let c = if self.top_to_bottom { uv.y } else { uv.x };
        step_below(c, progress)
    }
}

/// Clock hands sweeping around the centre.
#[derive(Debug)]
pub struct PinWheelWipe {
    pub blades: u32,
    /// Start angle as a fraction of a blade sector.
    pub phase: f64,
}

impl MaskFunction for PinWheelWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let d = centered(uv);
        // Clockwise from twelve o'clock with y pointing down.
        let turn = (d.x.atan2(-d.y) / TAU).rem_euclid(1.0);
        let f = (turn * f64::from(self.blades.max(1)) + self.phase).rem_euclid(1.0);
        step_below(f, progress)
    }

    fn reverse_uv(&self, uv: Point, method: ReverseMethod) -> Point {
        match method {
            // Counter-clockwise sweep.
            ReverseMethod::Rotate180 | ReverseMethod::FlipX => Point::new(1.0 - uv.x, uv.y),
            ReverseMethod::FlipY => Point::new(uv.x, 1.0 - uv.y),
            ReverseMethod::Ignore | ReverseMethod::SubtractAndInvert => uv,
        }
    }
}

/// Bars appearing in random order.
#[derive(Debug)]
pub struct RandomBarWipe {
    /// Vertical bars (split along x).
    pub vertical: bool,
}

impl MaskFunction for RandomBarWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let c = if self.vertical { uv.x } else { uv.y };
        let bar = (c * f64::from(RANDOM_BARS)).floor().clamp(0.0, f64::from(RANDOM_BARS - 1));
        step_below(cell_noise(RANDOM_BARS_SEED, bar as u32, 0), progress)
    }
}

/// Squares filling in a checker pattern, odd rows (or columns) offset by half a square.
#[derive(Debug)]
pub struct CheckerBoardWipe {
    /// Squares fill left to right; otherwise top to bottom.
    pub across: bool,
}

impl MaskFunction for CheckerBoardWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let (along, other) = if self.across {
            (uv.x, uv.y)
        } else {
            (uv.y, uv.x)
        };
        let lane = (other * CHECKER_CELLS).floor() as i64;
        let offset = if lane.rem_euclid(2) == 1 { 0.5 } else { 0.0 };
        let f = (along * CHECKER_CELLS + offset).rem_euclid(1.0);
        step_below(f, progress)
    }
}

/// Four boxes meeting in the centre, or a cross opening from it.
#[derive(Debug)]
pub struct FourBoxWipe {
    pub corners_out: bool,
}

impl MaskFunction for FourBoxWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let d = centered(uv);
        let qx = d.x.abs() * 2.0;
        let qy = d.y.abs() * 2.0;
        if self.corners_out {
            step_below(qx.min(qy), progress)
        } else {
            step_below(1.0 - qx.min(qy), progress)
        }
    }
}

/// Rectangle or diamond growing from the centre.
#[derive(Debug)]
pub struct IrisWipe {
    pub diamond: bool,
    pub half: Vec2,
}

impl MaskFunction for IrisWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let d = centered(uv);
        let nx = d.x.abs() / self.half.x;
        let ny = d.y.abs() / self.half.y;
        let r = if self.diamond {
            (nx + ny) * 0.5
        } else {
            nx.max(ny)
        };
        step_below(r, progress)
    }
}

/// Ellipse shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EllipseShape {
    Circle,
    Horizontal,
    Vertical,
}

/// Circle or ellipse growing from the centre, passing the corners at the end.
#[derive(Debug)]
pub struct EllipseWipe {
    radii: Vec2,
}

impl EllipseWipe {
    pub fn new(shape: EllipseShape, half: Vec2) -> Self {
        // Axis ratio 2:1, scaled so the ellipse passes through the corner `half`.
        let radii = match shape {
            EllipseShape::Circle => {
                let r = half.hypot();
                Vec2::new(r, r)
            }
            EllipseShape::Horizontal => {
                let k = (half.x * half.x / 4.0 + half.y * half.y).sqrt();
                Vec2::new(2.0 * k, k)
            }
            EllipseShape::Vertical => {
                let k = (half.x * half.x + half.y * half.y / 4.0).sqrt();
                Vec2::new(k, 2.0 * k)
            }
        };
        Self { radii }
    }
}

impl MaskFunction for EllipseWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let d = centered(uv);
        let ex = d.x / self.radii.x;
        let ey = d.y / self.radii.y;
        step_below((ex * ex + ey * ey).sqrt(), progress)
    }
}

/// Wedge opening downwards from the top centre.
#[derive(Debug)]
pub struct FanWipe {
    pub half: Vec2,
}

impl MaskFunction for FanWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let top = 0.5 - self.half.y;
        let dx = uv.x - 0.5;
        let dy = uv.y - top;
        let a = dx.atan2(dy).abs() / FRAC_PI_2;
        step_below(a, progress)
    }
}

/// Parallel slats opening together.
#[derive(Debug)]
pub struct BlindsWipe {
    /// Vertical slats (opening along x).
    pub vertical: bool,
}

impl MaskFunction for BlindsWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let c = if self.vertical { uv.x } else { uv.y };
        step_below((c * BLINDS).rem_euclid(1.0), progress)
    }
}

/// Random cells.
#[derive(Debug)]
pub struct Dissolve {
    pub cols: u32,
    pub rows: u32,
}

impl Dissolve {
    pub fn for_canvas(canvas: Canvas) -> Self {
        Self {
            cols: (canvas.width / DISSOLVE_CELL_PX).max(1),
            rows: (canvas.height / DISSOLVE_CELL_PX).max(1),
        }
    }
}

impl MaskFunction for Dissolve {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let cx = (uv.x * f64::from(self.cols)).floor().clamp(0.0, f64::from(self.cols - 1));
        let cy = (uv.y * f64::from(self.rows)).floor().clamp(0.0, f64::from(self.rows - 1));
        step_below(cell_noise(DISSOLVE_SEED, cx as u32, cy as u32), progress)
    }
}

/// Two doors opening from the centre line.
#[derive(Debug)]
pub struct BarnDoorWipe {
    /// Vertical door edges (opening along x).
    pub vertical: bool,
}

impl MaskFunction for BarnDoorWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let c = if self.vertical { uv.x } else { uv.y };
        step_below((c - 0.5).abs() * 2.0, progress)
    }
}

/// Staircase sweep: strips fill one after another with a lag.
#[derive(Debug)]
pub struct WaterfallWipe {
    /// Strips are columns filling downwards; otherwise rows filling sideways.
    pub vertical: bool,
    /// Start from the right (columns) or fill leftwards (rows).
    pub from_right: bool,
}

impl MaskFunction for WaterfallWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        let (strip_axis, fill_axis) = if self.vertical {
            let x = if self.from_right { 1.0 - uv.x } else { uv.x };
            (x, uv.y)
        } else {
            let x = if self.from_right { 1.0 - uv.x } else { uv.x };
            (uv.y, x)
        };
        let lag = (strip_axis * WATERFALL_STEPS).floor().clamp(0.0, WATERFALL_STEPS - 1.0)
            / WATERFALL_STEPS;
        step_below(fill_axis + lag, progress * 2.0)
    }
}

/// Heart growing from the centre.
#[derive(Debug)]
pub struct HeartWipe {
    path: BezPath,
    max_scale: f64,
}

/// Radius of the largest circle around the origin inside the unit heart, rounded down.
const HEART_INNER_RADIUS: f64 = 0.5;

impl HeartWipe {
    pub fn new(half: Vec2) -> Self {
        let mut path = BezPath::new();
        path.move_to((0.0, 1.0));
        path.curve_to((-0.6, 0.55), (-1.2, 0.1), (-1.0, -0.45));
        path.curve_to((-0.8, -1.0), (-0.15, -1.0), (0.0, -0.55));
        path.curve_to((0.15, -1.0), (0.8, -1.0), (1.0, -0.45));
        path.curve_to((1.2, 0.1), (0.6, 0.55), (0.0, 1.0));
        path.close_path();
        Self {
            path,
            max_scale: half.hypot() / HEART_INNER_RADIUS,
        }
    }
}

impl MaskFunction for HeartWipe {
    fn mask_value(&self, uv: Point, progress: f64) -> f64 {
        if progress <= 0.0 {
            return 0.0;
        }
        let d = centered(uv) / (progress * self.max_scale);
        if self.path.contains(d.to_point()) { 1.0 } else { 0.0 }
    }
}

/// A resolved mask effect.
#[derive(Debug)]
pub struct MaskEffect {
    pub name: &'static str,
    pub mask: Box<dyn MaskFunction>,
    pub traits: EffectTraits,
}

fn traits(reverse_method: ReverseMethod, out_inverts_sweep: bool, iso: bool) -> EffectTraits {
    EffectTraits {
        reverse_method,
        out_inverts_sweep,
        scale_isotropically: iso,
    }
}

/// Whether `(type, subtype)` names a masked wipe.
pub fn is_masked_wipe(info: &TransitionFilterInfo) -> bool {
    use TransitionSubType as S;
    use TransitionType as T;

    matches!(
        (info.transition_type, info.subtype),
        (T::BarWipe, S::LeftToRight | S::TopToBottom)
            | (
                T::PinWheelWipe,
                S::OneBlade
                    | S::TwoBladeVertical
                    | S::TwoBladeHorizontal
                    | S::ThreeBlade
                    | S::FourBlade
                    | S::EightBlade
            )
            | (T::RandomBarWipe, S::Vertical | S::Horizontal)
            | (T::CheckerBoardWipe, S::Across | S::Down)
            | (T::FourBoxWipe, S::CornersIn | S::CornersOut)
            | (T::IrisWipe, S::Rectangle | S::Diamond)
            | (T::EllipseWipe, S::Circle | S::Horizontal | S::Vertical)
            | (T::FanWipe, S::CenterTop)
            | (T::BlindsWipe, S::Vertical | S::Horizontal)
            | (T::Dissolve, S::Default)
            | (T::BarnDoorWipe, S::Vertical | S::Horizontal)
            | (
                T::WaterfallWipe,
                S::VerticalLeft | S::VerticalRight | S::HorizontalLeft | S::HorizontalRight
            )
            | (T::MiscShapeWipe, S::Heart | S::Diamond)
    )
}

/// Look up the mask of a wipe. `None` when `(type, subtype)` is not a masked wipe.
pub fn mask_effect(info: &TransitionFilterInfo, canvas: Canvas) -> Option<MaskEffect> {
    use TransitionSubType as S;
    use TransitionType as T;

    let effect = |name, mask: Box<dyn MaskFunction>, t: EffectTraits| MaskEffect {
        name,
        mask,
        traits: t,
    };

    let out = match (info.transition_type, info.subtype) {
        (T::BarWipe, S::LeftToRight) => effect(
            "bar-wipe",
            Box::new(BarWipe { top_to_bottom: false }),
            traits(ReverseMethod::FlipX, false, false),
        ),
        (T::BarWipe, S::TopToBottom) => effect(
            "bar-wipe",
            Box::new(BarWipe { top_to_bottom: true }),
            traits(ReverseMethod::FlipY, false, false),
        ),
        (T::PinWheelWipe, sub) => {
            let (blades, phase) = match sub {
                S::OneBlade => (1, 0.0),
                S::TwoBladeVertical => (2, 0.0),
                S::TwoBladeHorizontal => (2, 0.5),
                S::ThreeBlade => (3, 0.0),
                S::FourBlade => (4, 0.0),
                S::EightBlade => (8, 0.0),
                _ => return None,
            };
            effect(
                "pinwheel",
                Box::new(PinWheelWipe { blades, phase }),
                traits(ReverseMethod::Rotate180, false, true),
            )
        }
        (T::RandomBarWipe, sub @ (S::Vertical | S::Horizontal)) => effect(
            "random-bars",
            Box::new(RandomBarWipe {
                vertical: sub == S::Vertical,
            }),
            traits(ReverseMethod::Ignore, false, false),
        ),
        (T::CheckerBoardWipe, sub @ (S::Across | S::Down)) => effect(
            "checkerboard",
            Box::new(CheckerBoardWipe {
                across: sub == S::Across,
            }),
            traits(
                if sub == S::Across {
                    ReverseMethod::FlipX
                } else {
                    ReverseMethod::FlipY
                },
                false,
                true,
            ),
        ),
        (T::FourBoxWipe, sub @ (S::CornersIn | S::CornersOut)) => effect(
            "four-box",
            Box::new(FourBoxWipe {
                corners_out: sub == S::CornersOut,
            }),
            traits(ReverseMethod::SubtractAndInvert, true, false),
        ),
        (T::IrisWipe, sub @ (S::Rectangle | S::Diamond)) => effect(
            "iris",
            Box::new(IrisWipe {
                diamond: sub == S::Diamond,
                half: half_extent(canvas, false),
            }),
            traits(ReverseMethod::SubtractAndInvert, true, false),
        ),
        (T::EllipseWipe, sub @ (S::Circle | S::Horizontal | S::Vertical)) => {
            let shape = match sub {
                S::Circle => EllipseShape::Circle,
                S::Horizontal => EllipseShape::Horizontal,
                _ => EllipseShape::Vertical,
            };
            effect(
                "ellipse",
                Box::new(EllipseWipe::new(shape, half_extent(canvas, true))),
                traits(ReverseMethod::SubtractAndInvert, true, true),
            )
        }
        (T::FanWipe, S::CenterTop) => effect(
            "fan",
            Box::new(FanWipe {
                half: half_extent(canvas, true),
            }),
            traits(ReverseMethod::FlipY, false, true),
        ),
        (T::BlindsWipe, sub @ (S::Vertical | S::Horizontal)) => effect(
            "blinds",
            Box::new(BlindsWipe {
                vertical: sub == S::Vertical,
            }),
            traits(
                if sub == S::Vertical {
                    ReverseMethod::FlipX
                } else {
                    ReverseMethod::FlipY
                },
                false,
                false,
            ),
        ),
        (T::Dissolve, S::Default) => effect(
            "dissolve",
            Box::new(Dissolve::for_canvas(canvas)),
            traits(ReverseMethod::Ignore, false, false),
        ),
        (T::BarnDoorWipe, sub @ (S::Vertical | S::Horizontal)) => effect(
            "barn-door",
            Box::new(BarnDoorWipe {
                vertical: sub == S::Vertical,
            }),
            traits(ReverseMethod::SubtractAndInvert, true, false),
        ),
        (T::WaterfallWipe, sub) => {
            let (vertical, from_right) = match sub {
                S::VerticalLeft => (true, false),
                S::VerticalRight => (true, true),
                S::HorizontalLeft => (false, false),
                S::HorizontalRight => (false, true),
                _ => return None,
            };
            effect(
                "waterfall",
                Box::new(WaterfallWipe {
                    vertical,
                    from_right,
                }),
                traits(ReverseMethod::Rotate180, false, false),
            )
        }
        (T::MiscShapeWipe, S::Heart) => effect(
            "heart",
            Box::new(HeartWipe::new(half_extent(canvas, true))),
            traits(ReverseMethod::SubtractAndInvert, true, true),
        ),
        (T::MiscShapeWipe, S::Diamond) => effect(
            "diamond",
            Box::new(IrisWipe {
                diamond: true,
                half: half_extent(canvas, true),
            }),
            traits(ReverseMethod::SubtractAndInvert, true, true),
        ),
        _ => return None,
    };
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/masks.rs"]
mod tests;
