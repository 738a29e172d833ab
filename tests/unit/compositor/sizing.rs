use super::*;

#[test]
fn hd_slide_lands_on_the_720p_tier() {
    assert_eq!(compute_layer_resolution(1280, 720), [1280, 720]);
}

#[test]
fn tiers_follow_the_scaled_size() {
    assert_eq!(compute_layer_resolution(100, 100), [960, 540]);
    assert_eq!(compute_layer_resolution(1066, 600), [960, 540]);
    assert_eq!(compute_layer_resolution(1920, 1080), [1920, 1080]);
    assert_eq!(compute_layer_resolution(2000, 1500), [2560, 1440]);
    assert_eq!(compute_layer_resolution(4000, 10), [3840, 2160]);
    assert_eq!(compute_layer_resolution(10, 1900), [3840, 2160]);
}

#[test]
fn layer_size_keeps_the_slide_aspect() {
    assert_eq!(compute_layer_size(2000, 1500), [1920, 1440]);
    assert_eq!(compute_layer_size(1280, 720), [1280, 720]);
    // Wider than 16:9.
    assert_eq!(compute_layer_size(1000, 200), [960, 192]);
}

#[test]
fn layer_size_never_exceeds_its_tier() {
    for (w, h) in [(640, 480), (1024, 768), (3000, 1000), (500, 4000), (7, 3)] {
        let [tw, th] = compute_layer_resolution(w, h);
        let [lw, lh] = compute_layer_size(w, h);
        assert!(lw <= tw && lh <= th, "{w}x{h}");
    }
}

#[test]
fn degenerate_slides_get_the_tier() {
    assert_eq!(compute_layer_size(0, 0), [960, 540]);
}
