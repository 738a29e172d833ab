use super::*;
use crate::foundation::core::{Canvas, FrameRGBA, Rgba8Premul};
use crate::gpu::context::{ContextOpts, RenderContext};
use crate::timing::event_queue::{EventKind, TimerEventQueue};

fn ctx() -> RenderContext {
    RenderContext::new(Canvas::new(8, 4).unwrap(), ContextOpts { parallel: false })
}

fn blue(ctx: &RenderContext) -> FrameRGBA {
    FrameRGBA::filled(ctx.canvas(), Rgba8Premul::from_straight_rgba(0, 0, 255, 255))
}

#[test]
fn parses_the_consumed_fields() {
    let node = AnimationNode::from_json(
        r##"{
            "id": "n1", "type": "BarWipe", "subtype": "LeftToRight",
            "direction": "reverse", "mode": "out", "fadeColor": "#ffffff",
            "dur": "750ms", "accelerate": 0.25, "decelerate": 0.25,
            "repeatCount": "indefinite", "autoReverse": true,
            "targetElement": "shape-7", "fill": "freeze"
        }"##,
    )
    .unwrap();
    assert!(node.is_reverse());
    assert!(!node.is_mode_in());
    assert_eq!(node.repeat_count, RepeatCount::Indefinite);
    assert_eq!(node.duration().unwrap(), Duration::from_millis(750));

    let info = node.filter_info();
    assert!(!info.is_direction_forward);
    assert!(!info.is_mode_in);
    assert_eq!(info.fade_color, Some(Rgba8Premul::from_straight_rgba(255, 255, 255, 255)));

    let params = node.activity_params().unwrap();
    assert_eq!(params.repeat_count, 0.0);
    assert!(params.auto_reverse);
}

#[test]
fn defaults_apply_to_missing_fields() {
    let node = AnimationNode::from_json(r#"{ "type": "Fade" }"#).unwrap();
    assert_eq!(node.direction, Direction::Forward);
    assert_eq!(node.mode, Mode::In);
    assert_eq!(node.repeat_count, RepeatCount::Times(1.0));
    assert_eq!(node.duration().unwrap(), DEFAULT_ANIMATION_TIME);
}

#[test]
fn repeat_count_accepts_numbers_and_numeric_text() {
    let n = AnimationNode::from_json(r#"{ "type": "Fade", "repeatCount": 2.5 }"#).unwrap();
    assert_eq!(n.repeat_count, RepeatCount::Times(2.5));
    let n = AnimationNode::from_json(r#"{ "type": "Fade", "repeatCount": "3" }"#).unwrap();
    assert_eq!(n.repeat_count, RepeatCount::Times(3.0));
    assert!(AnimationNode::from_json(r#"{ "type": "Fade", "repeatCount": "often" }"#).is_err());
    assert!(AnimationNode::from_json(r#"{ "type": "Fade", "repeatCount": -1 }"#).is_err());
}

#[test]
fn clock_values() {
    assert_eq!(parse_clock_value("1.5s").unwrap(), Duration::from_millis(1500));
    assert_eq!(parse_clock_value(" 750ms ").unwrap(), Duration::from_millis(750));
    assert_eq!(parse_clock_value("2").unwrap(), Duration::from_secs(2));
    assert_eq!(parse_clock_value("0.5min").unwrap(), Duration::from_secs(30));
    assert_eq!(parse_clock_value("1h").unwrap(), Duration::from_secs(3600));
    assert_eq!(parse_clock_value("01:02.5").unwrap(), Duration::from_millis(62_500));
    assert_eq!(parse_clock_value("1:00:00").unwrap(), Duration::from_secs(3600));
    assert!(parse_clock_value("soon").is_err());
    assert!(parse_clock_value("-1s").is_err());
    assert!(parse_clock_value("1:2:3:4").is_err());
}

#[test]
fn activity_drives_the_transition_to_completion() {
    let ctx = ctx();
    let node = AnimationNode::from_json(
        r#"{ "type": "BarWipe", "subtype": "LeftToRight", "dur": "1s", "targetElement": "s1" }"#,
    )
    .unwrap();
    let mut activity = node
        .create_activity(TransitionParameters::shape(ctx.clone(), None, blue(&ctx), 1.0))
        .unwrap();
    assert_eq!(activity.target(), Some("s1"));

    let mut queue = TimerEventQueue::new();
    let event = queue.make_event(EventKind::EffectEnded {
        target: "s1".to_owned(),
    });
    activity.activate(event);

    assert!(activity.perform(Duration::ZERO, &mut queue));
    assert!(activity.perform(Duration::from_millis(500), &mut queue));
    let mid = ctx.read_pixels();
    assert_eq!(mid.pixel(0, 1), Some([0, 0, 255, 255]));
    assert_eq!(mid.pixel(7, 1), Some([0, 0, 0, 0]));

    assert!(!activity.perform(Duration::from_millis(1000), &mut queue));
    assert_eq!(ctx.read_pixels().pixel(7, 1), Some([0, 0, 255, 255]));
    assert_eq!(queue.len(), 1);
    assert!(!activity.perform(Duration::from_millis(1100), &mut queue));
    assert_eq!(queue.len(), 1);
}

#[test]
fn unknown_effect_still_yields_an_activity() {
    let ctx = ctx();
    let node = AnimationNode::from_json(r#"{ "type": "Sparkle", "subtype": "Twinkle" }"#).unwrap();
    let mut activity = node
        .create_activity(TransitionParameters::shape(ctx.clone(), None, blue(&ctx), 1.0))
        .unwrap();
    let mut queue = TimerEventQueue::new();
    let event = queue.make_event(EventKind::EffectEnded {
        target: "x".to_owned(),
    });
    activity.activate(event);
    activity.end(Duration::ZERO, &mut queue);
    assert_eq!(queue.len(), 1);
    assert_eq!(ctx.read_pixels().pixel(3, 3), Some([0, 0, 255, 255]));
}

#[test]
fn dispose_releases_without_end_event() {
    let ctx = ctx();
    let node = AnimationNode::from_json(r#"{ "type": "Fade", "subtype": "CrossFade" }"#).unwrap();
    let mut activity = node
        .create_activity(TransitionParameters::shape(ctx.clone(), None, blue(&ctx), 1.0))
        .unwrap();
    let mut queue = TimerEventQueue::new();
    let event = queue.make_event(EventKind::EffectEnded {
        target: "x".to_owned(),
    });
    activity.activate(event);
    activity.perform(Duration::ZERO, &mut queue);
    activity.dispose();
    assert!(queue.is_empty());
    assert_eq!(ctx.live_objects().total(), 0);
}

#[test]
fn auto_reverse_ends_on_the_first_frame() {
    let ctx = ctx();
    let node = AnimationNode::from_json(
        r#"{ "type": "Fade", "subtype": "CrossFade", "dur": "1s", "autoReverse": true }"#,
    )
    .unwrap();
    let mut activity = node
        .create_activity(TransitionParameters::shape(ctx.clone(), None, blue(&ctx), 1.0))
        .unwrap();
    let mut queue = TimerEventQueue::new();
    let event = queue.make_event(EventKind::EffectEnded {
        target: "x".to_owned(),
    });
    activity.activate(event);
    assert!(activity.perform(Duration::ZERO, &mut queue));
    assert!(activity.perform(Duration::from_millis(1000), &mut queue));
    assert_eq!(ctx.read_pixels().pixel(0, 0), Some([0, 0, 255, 255]));
    assert!(!activity.perform(Duration::from_millis(2000), &mut queue));
    assert_eq!(ctx.read_pixels().pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn fallback_kind_applies_to_unknown_effects() {
    let ctx = ctx();
    let node = AnimationNode::from_json(r#"{ "type": "Sparkle", "dur": "1s" }"#).unwrap();
    let mut activity = node
        .create_activity_with_fallback(
            TransitionParameters::shape(ctx.clone(), None, blue(&ctx), 1.0),
            TransitionKind::NoTransition,
        )
        .unwrap();
    let mut queue = TimerEventQueue::new();
    let event = queue.make_event(EventKind::EffectEnded {
        target: "x".to_owned(),
    });
    activity.activate(event);
    assert!(activity.perform(Duration::ZERO, &mut queue));
    assert_eq!(ctx.read_pixels().pixel(0, 0), Some([0, 0, 255, 255]));
}

#[test]
fn exit_effect_falling_back_to_crossfade_fades_the_shape_out() {
    let ctx = ctx();
    let node =
        AnimationNode::from_json(r#"{ "type": "Bogus", "mode": "out", "dur": "1s" }"#).unwrap();
    let mut activity = node
        .create_activity(TransitionParameters::shape(ctx.clone(), None, blue(&ctx), 1.0))
        .unwrap();
    let mut queue = TimerEventQueue::new();
    let event = queue.make_event(EventKind::EffectEnded {
        target: "x".to_owned(),
    });
    activity.activate(event);

    let alpha = |ctx: &RenderContext| ctx.read_pixels().pixel(3, 1).unwrap()[3];
    assert!(activity.perform(Duration::ZERO, &mut queue));
    let start = alpha(&ctx);
    assert!(activity.perform(Duration::from_millis(900), &mut queue));
    let late = alpha(&ctx);
    assert_eq!(start, 255);
    assert!(late < start, "alpha rose from {start} to {late}");

    activity.end(Duration::from_millis(900), &mut queue);
    assert_eq!(alpha(&ctx), 0);
}

#[test]
fn slide_only_exit_on_a_shape_fades_out() {
    let ctx = ctx();
    let node = AnimationNode::from_json(
        r#"{ "type": "Fade", "subtype": "CrossFade", "mode": "out", "dur": "1s" }"#,
    )
    .unwrap();
    let mut activity = node
        .create_activity(TransitionParameters::shape(ctx.clone(), None, blue(&ctx), 1.0))
        .unwrap();
    let mut queue = TimerEventQueue::new();
    let event = queue.make_event(EventKind::EffectEnded {
        target: "x".to_owned(),
    });
    activity.activate(event);
    assert!(activity.perform(Duration::ZERO, &mut queue));
    assert!(activity.perform(Duration::from_millis(500), &mut queue));
    let a = ctx.read_pixels().pixel(0, 0).unwrap()[3];
    assert!((120..=135).contains(&a), "half-faded alpha {a}");
}

#[test]
fn oversized_acceleration_still_yields_an_activity() {
    let ctx = ctx();
    let node = AnimationNode::from_json(
        r#"{ "type": "BarWipe", "subtype": "LeftToRight", "accelerate": 1.5, "decelerate": 0 }"#,
    )
    .unwrap();
    let activity = node
        .create_activity(TransitionParameters::shape(ctx.clone(), None, blue(&ctx), 1.0))
        .unwrap();
    assert_eq!(activity.params().acceleration, 0.0);
}
