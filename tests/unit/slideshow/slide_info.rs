use super::*;
use crate::animation::filter::{TransitionSubType, TransitionType};

const SLIDES: &str = r##"[
  {
    "hash": "a1", "index": 0, "masterPage": "Default",
    "background": { "isCustom": true, "fillColor": "#102030" }
  },
  {
    "hash": "b2", "index": 1,
    "transitionType": "BarWipe", "transitionSubtype": "TopToBottom",
    "transitionDuration": 750, "transitionDirection": false,
    "animations": [ { "type": "Fade", "subtype": "CrossFade", "targetElement": "shape-1" } ]
  }
]"##;

#[test]
fn parses_camel_case_metadata() {
    let slides = SlideInfo::list_from_json(SLIDES).unwrap();
    assert_eq!(slides.len(), 2);
    assert_eq!(slides[0].master_page.as_deref(), Some("Default"));
    assert_eq!(
        slides[0].background_color(),
        Some(Rgba8Premul::from_straight_rgba(0x10, 0x20, 0x30, 255))
    );
    assert_eq!(slides[1].animations.len(), 1);
    assert_eq!(slides[1].animations[0].target_element.as_deref(), Some("shape-1"));
}

#[test]
fn transition_fields_resolve_into_filter_info() {
    let slides = SlideInfo::list_from_json(SLIDES).unwrap();
    let info = slides[1].transition_info();
    assert_eq!(info.transition_type, TransitionType::BarWipe);
    assert_eq!(info.subtype, TransitionSubType::TopToBottom);
    assert!(!info.is_direction_forward);
    assert!(info.is_mode_in);

    let none = slides[0].transition_info();
    assert_eq!(none.transition_type, TransitionType::None);
}

#[test]
fn duration_falls_back_when_missing_or_invalid() {
    let default = Duration::from_millis(2000);
    let mut slide = SlideInfo {
        transition_duration: Some(750.0),
        ..SlideInfo::default()
    };
    assert_eq!(slide.transition_duration_or(default), Duration::from_millis(750));
    slide.transition_duration = Some(-5.0);
    assert_eq!(slide.transition_duration_or(default), default);
    slide.transition_duration = None;
    assert_eq!(slide.transition_duration_or(default), default);
}

#[test]
fn bad_background_colour_is_ignored() {
    let slide = SlideInfo {
        background: Some(Background {
            is_custom: true,
            fill_color: Some("teal".to_owned()),
        }),
        ..SlideInfo::default()
    };
    assert_eq!(slide.background_color(), None);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = SlideInfo::list_from_json("{").unwrap_err();
    assert!(matches!(err, SlideFxError::Serde(_)));
}
