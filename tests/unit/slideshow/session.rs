use super::*;
use crate::compositor::layers::{Layer, MemoryLayerSource};
use crate::slideshow::sink::InMemorySink;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

type Session = SlideShowSession<MemoryLayerSource, InMemorySink>;

fn opts() -> SlideShowOpts {
    SlideShowOpts {
        slide_width: 16,
        slide_height: 8,
        ..SlideShowOpts::default()
    }
}

fn solid(c: [u8; 4]) -> FrameRGBA {
    FrameRGBA::filled(
        opts().canvas().unwrap(),
        Rgba8Premul::from_straight_rgba(c[0], c[1], c[2], c[3]),
    )
}

fn slide(json: &str) -> SlideInfo {
    serde_json::from_str(json).unwrap()
}

fn plain_layers(colors: &[[u8; 4]]) -> MemoryLayerSource {
    let mut src = MemoryLayerSource::new();
    for (i, c) in colors.iter().enumerate() {
        src.insert(i, vec![Layer::new(LayerKind::Slide, "content", solid(*c))]);
    }
    src
}

fn session(opts: SlideShowOpts, slides: Vec<SlideInfo>, source: MemoryLayerSource) -> Session {
    SlideShowSession::new(opts, slides, source, InMemorySink::new()).unwrap()
}

fn centre(s: &Session) -> [u8; 4] {
    let c = s.canvas();
    s.presented().pixel(c.width / 2, c.height / 2).unwrap()
}

fn at(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

#[test]
fn empty_show_is_a_no_op() {
    let mut s = session(opts(), Vec::new(), MemoryLayerSource::new());
    s.start(at(0)).unwrap();
    assert!(!s.tick(at(16)));
    s.next(at(32));
    assert_eq!(s.current_slide(), None);
    assert_eq!(s.frames_presented(), 0);
    assert!(s.sink().config().is_none());
}

#[test]
fn canvas_follows_the_layer_size_rules() {
    let s = session(opts(), Vec::new(), MemoryLayerSource::new());
    assert_eq!((s.canvas().width, s.canvas().height), (960, 480));
}

#[test]
fn cuts_between_slides_without_transitions() {
    let slides = vec![slide(r#"{ "index": 0 }"#), slide(r#"{ "index": 1 }"#)];
    let mut s = session(opts(), slides, plain_layers(&[RED, BLUE]));
    s.start(at(0)).unwrap();
    assert_eq!(s.current_slide(), Some(0));
    assert!(!s.wants_frames());
    assert_eq!(centre(&s), RED);
    assert!(!s.tick(at(16)));

    s.next(at(100));
    assert_eq!(s.current_slide(), Some(1));
    assert_eq!(centre(&s), BLUE);
    assert_eq!(s.frames_presented(), 2);

    s.next(at(200));
    assert!(s.is_finished());
    assert!(!s.tick(at(216)));
    assert_eq!(s.context().live_objects().total(), 0);
}

#[test]
fn crossfade_plays_from_the_clear_colour() {
    let slides = vec![slide(
        r#"{ "index": 0, "transitionType": "Fade", "transitionSubtype": "CrossFade",
             "transitionDuration": 1000 }"#,
    )];
    let mut s = session(opts(), slides, plain_layers(&[RED]));
    s.start(at(0)).unwrap();
    assert!(s.is_transitioning());
    assert_eq!(centre(&s), BLACK);

    assert!(s.tick(at(500)));
    let mid = centre(&s);
    assert!((100..160).contains(&mid[0]), "{mid:?}");

    assert!(!s.tick(at(1000)));
    assert!(!s.is_transitioning());
    assert_eq!(centre(&s), RED);
    assert_eq!(s.context().live_objects().total(), 0);

    let indices: Vec<u64> = s.sink().frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn advancing_mid_transition_jumps_to_its_end() {
    let slides = vec![slide(
        r#"{ "index": 0, "transitionType": "BarWipe", "transitionSubtype": "LeftToRight" }"#,
    )];
    let mut s = session(opts(), slides, plain_layers(&[RED]));
    s.start(at(0)).unwrap();
    s.next(at(100));
    assert!(!s.wants_frames());
    assert_eq!(s.current_slide(), Some(0));
    assert_eq!(centre(&s), RED);
}

#[test]
fn unsupported_effects_use_the_configured_fallback() {
    let declared = || {
        vec![slide(
            r#"{ "index": 0, "transitionType": "Sparkle", "transitionDuration": 500 }"#,
        )]
    };

    let mut s = session(opts(), declared(), plain_layers(&[RED]));
    s.start(at(0)).unwrap();
    assert!(s.is_transitioning());

    let cut = SlideShowOpts {
        fallback_to_crossfade: false,
        ..opts()
    };
    let mut s = session(cut, declared(), plain_layers(&[RED]));
    s.start(at(0)).unwrap();
    assert!(!s.is_transitioning());
    assert_eq!(centre(&s), RED);
}

#[test]
fn missing_layers_show_the_loader_until_they_arrive() {
    let slides = vec![slide(r#"{ "index": 0 }"#)];
    let mut s = session(opts(), slides, MemoryLayerSource::new());
    s.start(at(0)).unwrap();
    assert_eq!(s.current_slide(), Some(0));
    assert!(s.wants_frames());
    assert_eq!(s.frames_presented(), 1);
    assert!(s.tick(at(16)));
    assert_eq!(s.frames_presented(), 2);
    assert!(s.context().live_objects().total() > 0);

    s.next(at(20));
    assert_eq!(s.current_slide(), Some(0));

    s.source_mut()
        .insert(0, vec![Layer::new(LayerKind::Slide, "content", solid(GREEN))]);
    assert!(!s.tick(at(32)));
    assert_eq!(centre(&s), GREEN);
    assert_eq!(s.context().live_objects().total(), 0);
}

#[test]
fn disabled_loader_presents_nothing_while_waiting() {
    let slides = vec![slide(r#"{ "index": 0 }"#)];
    let no_loader = SlideShowOpts {
        loader: false,
        ..opts()
    };
    let mut s = session(no_loader, slides, MemoryLayerSource::new());
    s.start(at(0)).unwrap();
    assert!(s.tick(at(16)));
    assert_eq!(s.frames_presented(), 0);
}

fn shape_slide(mode: &str) -> (Vec<SlideInfo>, MemoryLayerSource) {
    let slides = vec![slide(&format!(
        r#"{{ "index": 0, "animations": [
            {{ "type": "BarWipe", "subtype": "LeftToRight", "mode": "{mode}",
               "dur": "1s", "targetElement": "s1" }}
        ] }}"#
    ))];
    let source = MemoryLayerSource::new().with_slide(
        0,
        vec![
            Layer::new(LayerKind::Slide, "content", solid(RED)),
            Layer::new(LayerKind::Shape, "s1", solid(GREEN)),
        ],
    );
    (slides, source)
}

#[test]
fn entrance_effect_reveals_a_hidden_shape() {
    let (slides, source) = shape_slide("in");
    let mut s = session(opts(), slides, source);
    s.start(at(0)).unwrap();
    assert_eq!(centre(&s), RED);

    s.next(at(100));
    assert!(s.wants_frames());
    assert_eq!(centre(&s), RED);

    assert!(s.tick(at(600)));
    let h = s.canvas().height / 2;
    assert_eq!(s.presented().pixel(10, h), Some(GREEN));
    assert_eq!(s.presented().pixel(950, h), Some(RED));

    assert!(!s.tick(at(1100)));
    assert_eq!(centre(&s), GREEN);

    s.next(at(1200));
    assert!(s.is_finished());
}

#[test]
fn exit_effect_hides_a_visible_shape() {
    let (slides, source) = shape_slide("out");
    let mut s = session(opts(), slides, source);
    s.start(at(0)).unwrap();
    assert_eq!(centre(&s), GREEN);

    s.next(at(100));
    s.next(at(200));
    assert!(!s.wants_frames());
    assert_eq!(centre(&s), RED);
}

#[test]
fn effects_on_missing_shapes_are_skipped() {
    let slides = vec![
        slide(
            r#"{ "index": 0, "animations": [
                { "type": "BarWipe", "targetElement": "ghost" },
                { "type": "BarWipe" }
            ] }"#,
        ),
        slide(r#"{ "index": 1 }"#),
    ];
    let mut s = session(opts(), slides, plain_layers(&[RED, BLUE]));
    s.start(at(0)).unwrap();
    s.next(at(100));
    assert_eq!(s.current_slide(), Some(1));
    assert_eq!(centre(&s), BLUE);
}

#[test]
fn stop_releases_everything() {
    let slides = vec![slide(
        r#"{ "index": 0, "transitionType": "MiscShapeWipe", "transitionSubtype": "CornersOut" }"#,
    )];
    let mut s = session(opts(), slides, plain_layers(&[RED]));
    s.start(at(0)).unwrap();
    assert!(s.tick(at(300)));
    assert!(s.context().live_objects().total() > 0);

    s.stop();
    assert_eq!(s.context().live_objects().total(), 0);
    assert!(s.context().is_disposed());
    assert!(s.sink().is_ended());
    assert!(!s.tick(at(400)));
    assert!(s.start(at(500)).is_err());
}
