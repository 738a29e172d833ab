use super::*;
use crate::foundation::transform3d::Mat4;

fn mat_close(a: Mat4, b: Mat4) -> bool {
    (0..4).all(|c| (0..4).all(|r| (a.cols[c][r] - b.cols[c][r]).abs() < 1e-6))
}

fn all_scenes() -> Vec<(&'static str, Scene3d)> {
    vec![
        ("outside cube", outside_cube()),
        ("inside cube", inside_cube()),
        ("fall", fall()),
        ("turn around", turn_around()),
        ("rochade", rochade()),
        ("venetian vertical", venetian(true)),
        ("venetian horizontal", venetian(false)),
        ("news flash", news_flash()),
    ]
}

#[test]
fn leaving_starts_and_entering_ends_in_place() {
    for (sx, sy) in [(1.0, 1.0), (1.0, 0.5625), (0.75, 1.0)] {
        for (name, scene) in all_scenes() {
            for p in &scene.leaving {
                assert!(mat_close(p.matrix(0.0, sx, sy), Mat4::IDENTITY), "{name} leaving");
            }
            for p in &scene.entering {
                assert!(mat_close(p.matrix(1.0, sx, sy), Mat4::IDENTITY), "{name} entering");
            }
        }
    }
}

#[test]
fn every_scene_has_matching_primitive_counts() {
    for (name, scene) in all_scenes() {
        assert!(!scene.leaving.is_empty(), "{name}");
        assert_eq!(scene.leaving.len(), scene.entering.len(), "{name}");
        assert!(scene.scene_ops.is_empty(), "{name}");
    }
}

#[test]
fn venetian_strips_tile_the_slide() {
    let scene = venetian(true);
    assert_eq!(scene.leaving.len(), VENETIAN_STRIPS);
    let width: f32 = scene
        .leaving
        .iter()
        .map(|p| {
            let xs = p.vertices().iter().map(|v| v[0]);
            let (lo, hi) = xs.fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
            hi - lo
        })
        .sum();
    assert!((width - 2.0).abs() < 1e-5);
}

#[test]
fn entering_cube_face_starts_turned_away() {
    let scene = outside_cube();
    let m = scene.entering[0].matrix(0.0, 1.0, 1.0);
    // The slide centre sits on the left face of the cube.
    let c = m.transform_point([0.0, 0.0, 0.0, 1.0]);
    assert!((c[0] + 1.0).abs() < 1e-9);
    assert!((c[2] + 1.0).abs() < 1e-9);
}

#[test]
fn news_flash_swaps_at_midpoint() {
    let scene = news_flash();
    let leaving = scene.leaving[0].matrix(0.75, 1.0, 1.0);
    let entering = scene.entering[0].matrix(0.25, 1.0, 1.0);
    // Both are parked far off to the side outside their half.
    assert!(leaving.transform_point([0.0, 0.0, 0.0, 1.0])[0] > 50.0);
    assert!(entering.transform_point([0.0, 0.0, 0.0, 1.0])[0] > 50.0);
}
