//! Scenes of the 3-D slide transitions.

use crate::transitions::simple3d::{Interval, Operation, Primitive, Scene3d};

const X: [f64; 3] = [1.0, 0.0, 0.0];
const Y: [f64; 3] = [0.0, 1.0, 0.0];
const Z: [f64; 3] = [0.0, 0.0, 1.0];
const ORIGIN: [f64; 3] = [0.0, 0.0, 0.0];

const VENETIAN_STRIPS: usize = 8;

/// Both slides on faces of a cube turning about its vertical axis.
///
/// `inside` puts the viewer inside the cube; the pivot then sits in front of the slide.
fn cube(inside: bool) -> Scene3d {
    let (pivot, angle) = if inside {
        ([0.0, 0.0, 1.0], -90.0)
    } else {
        ([0.0, 0.0, -1.0], 90.0)
    };
    let turn = Operation::rotate_depth_by_width(Y, pivot, angle, Interval::ramp(0.0, 1.0));
    let preset = Operation::rotate_depth_by_width(Y, pivot, -angle, Interval::ALWAYS);
    Scene3d {
        leaving: vec![Primitive::slide().with_operation(turn)],
        entering: vec![
            Primitive::slide()
                .with_operation(preset)
                .with_operation(turn),
        ],
        scene_ops: Vec::new(),
    }
}

pub fn outside_cube() -> Scene3d {
    cube(false)
}

pub fn inside_cube() -> Scene3d {
    cube(true)
}

/// The leaving slide tips forward around its bottom edge.
pub fn fall() -> Scene3d {
    Scene3d {
        leaving: vec![Primitive::slide().with_operation(Operation::rotate(
            X,
            [0.0, -1.0, 0.0],
            90.0,
            Interval::ramp(0.0, 1.0),
        ))],
        entering: vec![Primitive::slide()],
        scene_ops: Vec::new(),
    }
}

/// Half turn of a card holding one slide on each side, around a pivot behind the slide.
fn flip(pivot_depth: f64, angle: f64) -> Scene3d {
    let pivot = [0.0, 0.0, pivot_depth];
    let turn = Operation::rotate_depth_by_width(Y, pivot, angle, Interval::ramp(0.0, 1.0));
    Scene3d {
        leaving: vec![Primitive::slide().with_operation(turn)],
        entering: vec![
            Primitive::slide()
                .with_operation(Operation::rotate_depth_by_width(
                    Y,
                    pivot,
                    -angle,
                    Interval::ALWAYS,
                ))
                .with_operation(turn),
        ],
        scene_ops: Vec::new(),
    }
}

pub fn turn_around() -> Scene3d {
    flip(-1.0, 180.0)
}

/// The slides swap places, circling a shared axis far behind them.
pub fn rochade() -> Scene3d {
    flip(-1.5, -180.0)
}

/// Strips turning like louvres, each a small cube with the leaving slide in front and the
/// entering slide on its side.
pub fn venetian(vertical: bool) -> Scene3d {
    let n = VENETIAN_STRIPS;
    let mut scene = Scene3d::default();
    for i in 0..n {
        let lo = -1.0 + 2.0 * i as f64 / n as f64;
        let hi = -1.0 + 2.0 * (i + 1) as f64 / n as f64;
        let mid = (lo + hi) * 0.5;
        let half = (hi - lo) * 0.5;

        let (rect, turn, preset) = if vertical {
            let pivot = [mid, 0.0, -half];
            (
                Primitive::rect(lo, -1.0, hi, 1.0),
                Operation::rotate_depth_by_width(Y, pivot, 90.0, Interval::ramp(0.0, 1.0)),
                Operation::rotate_depth_by_width(Y, pivot, -90.0, Interval::ALWAYS),
            )
        } else {
            let pivot = [0.0, mid, -half];
            (
                Primitive::rect(-1.0, lo, 1.0, hi),
                Operation::rotate_depth_by_height(X, pivot, 90.0, Interval::ramp(0.0, 1.0)),
                Operation::rotate_depth_by_height(X, pivot, -90.0, Interval::ALWAYS),
            )
        };
        scene.leaving.push(rect.clone().with_operation(turn));
        scene
            .entering
            .push(rect.with_operation(preset).with_operation(turn));
    }
    scene
}

/// The leaving slide spins away to a point; the entering slide spins back out of it.
pub fn news_flash() -> Scene3d {
    let far = [100.0, 0.0, 0.0];
    let back = [-100.0, 0.0, 0.0];
    Scene3d {
        leaving: vec![
            Primitive::slide()
                .with_operation(Operation::rotate(Z, ORIGIN, 1080.0, Interval::ramp(0.0, 0.5)))
                .with_operation(Operation::scale(
                    [0.01, 0.01, 1.0],
                    ORIGIN,
                    Interval::ramp(0.0, 0.5),
                ))
                .with_operation(Operation::translate(far, Interval::after(0.5))),
        ],
        entering: vec![
            Primitive::slide()
                .with_operation(Operation::scale([0.01, 0.01, 1.0], ORIGIN, Interval::ALWAYS))
                .with_operation(Operation::scale(
                    [100.0, 100.0, 1.0],
                    ORIGIN,
                    Interval::ramp(0.5, 1.0),
                ))
                .with_operation(Operation::rotate(Z, ORIGIN, -1080.0, Interval::ramp(0.5, 1.0)))
                .with_operation(Operation::translate(far, Interval::ALWAYS))
                .with_operation(Operation::translate(back, Interval::after(0.5))),
        ],
        scene_ops: Vec::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transitions/scenes3d.rs"]
mod tests;
