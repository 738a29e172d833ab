use super::*;
use crate::foundation::core::Canvas;
use crate::gpu::context::ContextOpts;

fn ctx() -> RenderContext {
    RenderContext::new(Canvas::new(64, 64).unwrap(), ContextOpts { parallel: false })
}

fn white() -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(255, 255, 255, 255)
}

fn lit_pixels(ctx: &RenderContext) -> usize {
    ctx.read_pixels()
        .data
        .chunks_exact(4)
        .filter(|p| p[0] > 0)
        .count()
}

#[test]
fn spinner_draws_a_ring_around_the_centre() {
    let ctx = ctx();
    let mut loader = GpuLoader::new(ctx.clone(), white());
    loader.start_loader(Duration::from_millis(100)).unwrap();
    assert!(loader.is_running());
    assert!(ctx.has_pending_frame());

    let frame = ctx.read_pixels();
    assert_eq!(frame.pixel(32, 32), Some([0, 0, 0, 255]));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
    assert!(lit_pixels(&ctx) > 0);
}

#[test]
fn every_frame_requests_the_next() {
    let ctx = ctx();
    let mut loader = GpuLoader::new(ctx.clone(), white());
    loader.start_loader(Duration::ZERO).unwrap();
    for ms in [16, 33, 50] {
        assert!(ctx.take_frame_request().is_some());
        assert!(loader.render_frame(Duration::from_millis(ms)));
    }
    assert!(ctx.has_pending_frame());
}

#[test]
fn spinner_turns_over_time() {
    let ctx = ctx();
    let mut loader = GpuLoader::new(ctx.clone(), white());
    loader.start_loader(Duration::ZERO).unwrap();
    let first = ctx.read_pixels();
    loader.render_frame(Duration::from_millis(300));
    assert_ne!(first, ctx.read_pixels());
}

#[test]
fn stop_releases_everything_and_silences_the_loader() {
    let ctx = ctx();
    let mut loader = GpuLoader::new(ctx.clone(), white());
    loader.start_loader(Duration::ZERO).unwrap();
    assert!(ctx.live_objects().total() > 0);

    loader.stop_loader();
    assert!(!loader.is_running());
    assert_eq!(ctx.live_objects().total(), 0);
    assert!(!ctx.has_pending_frame());

    let calls = ctx.call_count();
    assert!(!loader.render_frame(Duration::from_millis(16)));
    loader.stop_loader();
    assert_eq!(ctx.call_count(), calls);
}

#[test]
fn loader_can_restart_after_stop() {
    let ctx = ctx();
    let mut loader = GpuLoader::new(ctx.clone(), white());
    loader.start_loader(Duration::ZERO).unwrap();
    loader.stop_loader();
    loader.start_loader(Duration::from_secs(1)).unwrap();
    assert!(loader.render_frame(Duration::from_millis(1100)));
    loader.stop_loader();
    assert_eq!(ctx.live_objects().total(), 0);
}

#[test]
fn context_loss_stops_the_loader() {
    let ctx = ctx();
    let mut loader = GpuLoader::new(ctx.clone(), white());
    loader.start_loader(Duration::ZERO).unwrap();
    ctx.dispose();
    assert!(!loader.render_frame(Duration::from_millis(16)));
    assert!(!loader.is_running());
    loader.stop_loader();
    assert!(loader.start_loader(Duration::from_millis(32)).is_err());
}

#[test]
fn no_op_loader_only_tracks_state() {
    let mut loader = NoOpLoader::default();
    assert!(!loader.render_frame(Duration::ZERO));
    loader.start_loader(Duration::ZERO).unwrap();
    assert!(loader.is_running());
    assert!(loader.render_frame(Duration::from_millis(16)));
    loader.stop_loader();
    assert!(!loader.is_running());
}
