use super::*;

fn frame(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

fn out_dir(name: &str) -> PathBuf {
    let dir = std::env::current_dir()
        .unwrap()
        .join("target")
        .join("unit_png")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn writes_one_straight_alpha_png_per_frame() {
    let dir = out_dir("sequence");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(SinkConfig {
        width: 4,
        height: 2,
        fps: 30,
    })
    .unwrap();
    sink.push_frame(0, &frame(4, 2, [0x1F, 0x05, 0x0A, 255]))
        .unwrap();
    sink.push_frame(1, &frame(4, 2, [64, 0, 0, 128])).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.written(), 2);

    let first = image::open(sink.frame_path(0)).unwrap().to_rgba8();
    assert_eq!(first.dimensions(), (4, 2));
    assert_eq!(first.get_pixel(0, 0).0, [0x1F, 0x05, 0x0A, 255]);

    let second = image::open(dir.join("frame_00001.png")).unwrap().to_rgba8();
    let px = second.get_pixel(3, 1).0;
    assert_eq!(px[3], 128);
    assert!((127..=128).contains(&px[0]));
}

#[test]
fn rejects_mismatched_frames_and_unstarted_use() {
    let dir = out_dir("mismatch");
    let mut sink = PngSequenceSink::new(&dir);
    assert!(sink.push_frame(0, &frame(2, 2, [0; 4])).is_err());
    assert!(sink.end().is_err());

    sink.begin(SinkConfig {
        width: 2,
        height: 2,
        fps: 30,
    })
    .unwrap();
    let err = sink.push_frame(0, &frame(3, 2, [0; 4])).unwrap_err();
    assert!(err.to_string().contains("frame size mismatch"));
}
