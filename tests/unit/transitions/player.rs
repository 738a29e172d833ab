use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::Canvas;
use crate::gpu::context::ContextOpts;
use crate::transitions::fade::CrossfadeShader;

fn ctx() -> RenderContext {
    RenderContext::new(Canvas::new(4, 2).unwrap(), ContextOpts { parallel: false })
}

fn crossfade(ctx: &RenderContext, ms: u64, fired: Rc<Cell<u32>>) -> Box<dyn Transition> {
    let canvas = ctx.canvas();
    let params = TransitionParameters::slide(
        ctx.clone(),
        FrameRGBA::filled(canvas, Rgba8Premul::from_straight_rgba(255, 0, 0, 255)),
        FrameRGBA::filled(canvas, Rgba8Premul::from_straight_rgba(0, 0, 255, 255)),
    )
    .with_animation_time(Duration::from_millis(ms))
    .on_complete(move || fired.set(fired.get() + 1));
    Box::new(Transition2d::new(
        "crossfade",
        std::sync::Arc::new(CrossfadeShader),
        params,
    ))
}

#[test]
fn clamp_progress_handles_out_of_range_and_nan() {
    assert_eq!(clamp_progress(-0.5), 0.0);
    assert_eq!(clamp_progress(1.5), 1.0);
    assert_eq!(clamp_progress(f64::NAN), 0.0);
    assert_eq!(clamp_progress(0.25), 0.25);
}

#[test]
fn completion_fires_at_most_once() {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let mut completion = Completion::new(Some(Box::new(move || c.set(c.get() + 1))));
    assert!(!completion.is_fired());
    completion.fire("test");
    completion.fire("test");
    assert!(completion.is_fired());
    assert_eq!(count.get(), 1);
}

#[test]
fn player_runs_frames_until_the_end() {
    let ctx = ctx();
    let fired = Rc::new(Cell::new(0));
    let mut player = TransitionPlayer::new(crossfade(&ctx, 100, fired.clone()));

    player.start(Duration::from_millis(1_000)).unwrap();
    assert!(ctx.take_frame_request().is_some());
    assert_eq!(ctx.read_pixels().pixel(0, 0), Some([255, 0, 0, 255]));

    assert!(player.on_frame(Duration::from_millis(1_050)));
    assert!((player.progress() - 0.5).abs() < 1e-9);
    assert!(ctx.take_frame_request().is_some());
    assert_eq!(fired.get(), 0);

    assert!(!player.on_frame(Duration::from_millis(1_200)));
    assert!(player.is_finished());
    assert_eq!(player.progress(), 1.0);
    assert!(!ctx.has_pending_frame());
    assert_eq!(fired.get(), 1);
    assert_eq!(ctx.read_pixels().pixel(3, 1), Some([0, 0, 255, 255]));

    assert!(!player.on_frame(Duration::from_millis(1_300)));
    assert_eq!(fired.get(), 1);
}

#[test]
fn player_progress_never_decreases() {
    let ctx = ctx();
    let mut player = TransitionPlayer::new(crossfade(&ctx, 100, Rc::new(Cell::new(0))));
    player.start(Duration::ZERO).unwrap();
    player.on_frame(Duration::from_millis(80));
    player.on_frame(Duration::from_millis(40));
    assert!((player.progress() - 0.8).abs() < 1e-9);
}

#[test]
fn zero_length_transition_completes_on_first_frame() {
    let ctx = ctx();
    let fired = Rc::new(Cell::new(0));
    let mut player = TransitionPlayer::new(crossfade(&ctx, 0, fired.clone()));
    player.start(Duration::ZERO).unwrap();
    assert!(!player.on_frame(Duration::ZERO));
    assert_eq!(fired.get(), 1);
}

#[test]
fn frames_before_start_are_ignored() {
    let ctx = ctx();
    let mut player = TransitionPlayer::new(crossfade(&ctx, 100, Rc::new(Cell::new(0))));
    assert!(!player.on_frame(Duration::from_millis(10)));
    assert_eq!(ctx.call_count(), 0);
}

#[test]
fn stop_disposes_without_completing() {
    let ctx = ctx();
    let fired = Rc::new(Cell::new(0));
    let mut player = TransitionPlayer::new(crossfade(&ctx, 100, fired.clone()));
    player.start(Duration::ZERO).unwrap();
    player.stop();
    assert!(!ctx.has_pending_frame());
    assert_eq!(ctx.live_objects().total(), 0);

    let calls = ctx.call_count();
    assert!(!player.on_frame(Duration::from_millis(50)));
    assert_eq!(ctx.call_count(), calls);
    assert_eq!(fired.get(), 0);
    assert!(!player.transition().is_complete());
}

#[test]
fn context_loss_stops_the_loop() {
    let ctx = ctx();
    let mut player = TransitionPlayer::new(crossfade(&ctx, 100, Rc::new(Cell::new(0))));
    player.start(Duration::ZERO).unwrap();
    ctx.dispose();
    assert!(!player.on_frame(Duration::from_millis(50)));
    assert!(player.is_finished());
}

#[test]
fn start_on_disposed_context_fails() {
    let ctx = ctx();
    let mut player = TransitionPlayer::new(crossfade(&ctx, 100, Rc::new(Cell::new(0))));
    ctx.dispose();
    assert!(player.start(Duration::ZERO).is_err());
}
