use super::*;
use crate::foundation::core::{Canvas, Rgba8Premul};

#[test]
fn in_memory_sink_records_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        width: 2,
        height: 2,
    })
    .unwrap();
    let frame = FrameRGBA::filled(Canvas::new(2, 2).unwrap(), Rgba8Premul::black());
    sink.push_frame(0, &frame).unwrap();
    sink.push_frame(1, &frame).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.config().map(|c| c.width), Some(2));
    assert_eq!(
        sink.frames().iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert!(sink.is_ended());
}

#[test]
fn unpremultiply_restores_straight_alpha() {
    let data = [0, 0, 128, 128, 10, 20, 30, 255, 9, 9, 9, 0];
    assert_eq!(
        unpremultiply(&data),
        vec![0, 0, 255, 128, 10, 20, 30, 255, 0, 0, 0, 0]
    );
}

#[test]
fn png_sink_writes_numbered_files() {
    let dir = std::env::temp_dir().join(format!("slidefx-png-sink-{}", std::process::id()));
    let mut sink = PngSequenceSink::new(&dir, "frame_");
    sink.begin(SinkConfig {
        width: 3,
        height: 2,
    })
    .unwrap();
    let frame = FrameRGBA::filled(
        Canvas::new(3, 2).unwrap(),
        Rgba8Premul::from_straight_rgba(0, 0, 255, 255),
    );
    sink.push_frame(7, &frame).unwrap();
    sink.end().unwrap();

    let path = sink.frame_path(7);
    assert!(path.ends_with("frame_00007.png"));
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, [0, 0, 255, 255]);
    assert_eq!(sink.written(), 1);
    std::fs::remove_dir_all(&dir).unwrap();
}
