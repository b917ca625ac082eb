use super::*;

fn sized(w: u32, h: u32, dpr: f64) -> CpuSurface {
    let mut s = CpuSurface::new();
    s.resize(BackingSize {
        width: w,
        height: h,
        dpr,
    })
    .unwrap();
    s
}

fn alpha(frame: &FrameRGBA, x: u32, y: u32) -> u8 {
    frame.pixel(x, y).unwrap()[3]
}

#[test]
fn frame_before_resize_is_an_error() {
    assert!(CpuSurface::new().frame().is_err());
}

#[test]
fn resize_rejects_zero_and_oversized_backings() {
    let mut s = CpuSurface::new();
    let zero = BackingSize {
        width: 0,
        height: 10,
        dpr: 1.0,
    };
    assert!(s.resize(zero).unwrap_err().to_string().contains("render error:"));
    let huge = BackingSize {
        width: 70_000,
        height: 10,
        dpr: 1.0,
    };
    assert!(s.resize(huge).is_err());
    assert!(s.backing().is_none());

    let ok = BackingSize {
        width: 30,
        height: 20,
        dpr: 1.5,
    };
    s.resize(ok).unwrap();
    assert!(s.resize(huge).is_err());
    assert_eq!(s.backing(), Some(ok));
}

#[test]
fn background_fill_covers_backing_at_device_ratio() {
    let mut s = sized(30, 15, 1.5);
    s.begin_frame();
    s.clear();
    s.fill_rect(Rect::new(0.0, 0.0, 20.0, 10.0), Rgba8::rgb(0x1F, 0x05, 0x0A));
    s.end_frame();
    let f = s.frame().unwrap();
    assert_eq!((f.width, f.height), (30, 15));
    assert!(f.premultiplied);
    assert_eq!(f.pixel(0, 0), Some([0x1F, 0x05, 0x0A, 255]));
    assert_eq!(f.pixel(29, 14), Some([0x1F, 0x05, 0x0A, 255]));
}

#[test]
fn begin_frame_discards_previous_content() {
    let mut s = sized(8, 8, 1.0);
    s.begin_frame();
    s.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Rgba8::WHITE);
    s.end_frame();
    s.begin_frame();
    s.end_frame();
    assert_eq!(alpha(&s.frame().unwrap(), 4, 4), 0);
}

#[test]
fn circle_is_filled_around_center_only() {
    let mut s = sized(40, 40, 1.0);
    s.begin_frame();
    s.fill_circle(Point::new(20.0, 20.0), 5.0, Rgba8::WHITE);
    s.end_frame();
    let f = s.frame().unwrap();
    assert_eq!(f.pixel(20, 20), Some([255, 255, 255, 255]));
    assert_eq!(alpha(&f, 2, 2), 0);
    assert_eq!(alpha(&f, 20, 30), 0);
}

#[test]
fn gradient_streak_fades_from_head_to_tail() {
    let mut s = sized(100, 100, 1.0);
    s.begin_frame();
    s.stroke_gradient_line(
        Point::new(10.0, 50.0),
        Point::new(90.0, 50.0),
        4.0,
        Rgba8::WHITE,
        Rgba8::rgba(255, 255, 255, 0),
    );
    s.end_frame();
    let f = s.frame().unwrap();
    let head = alpha(&f, 12, 50);
    let tail = alpha(&f, 85, 50);
    assert!(head > 128, "head alpha {head}");
    assert!(head > tail);
    assert_eq!(alpha(&f, 50, 10), 0);
    assert_eq!(alpha(&f, 5, 50), 0);
}

#[test]
fn image_is_clipped_to_rounded_rect() {
    let red = PreparedImage::from_premul_bytes(2, 2, [255, 0, 0, 255].repeat(4)).unwrap();
    let mut s = sized(60, 60, 1.0);
    s.begin_frame();
    s.draw_image_rounded(
        AssetId(3),
        &red,
        Rect::new(10.0, 10.0, 50.0, 50.0),
        10.0,
        1.0,
        None,
    );
    s.end_frame();
    let f = s.frame().unwrap();
    assert_eq!(f.pixel(30, 30), Some([255, 0, 0, 255]));
    assert_eq!(alpha(&f, 10, 10), 0);
    assert_eq!(alpha(&f, 5, 30), 0);
}

#[test]
fn shadow_spills_outside_the_image() {
    let red = PreparedImage::from_premul_bytes(1, 1, vec![255, 0, 0, 255]).unwrap();
    let mut s = sized(60, 60, 1.0);
    s.begin_frame();
    s.draw_image_rounded(
        AssetId(0),
        &red,
        Rect::new(20.0, 20.0, 40.0, 40.0),
        0.0,
        1.0,
        Some(Shadow {
            color: Rgba8::rgba(244, 63, 94, 102),
            blur: 8.0,
        }),
    );
    s.end_frame();
    let f = s.frame().unwrap();
    assert!(alpha(&f, 30, 17) > 0);
    assert_eq!(alpha(&f, 30, 5), 0);
}

#[test]
fn canvas_effect_fades_everything_inside_it() {
    let mut s = sized(10, 10, 1.0);
    s.begin_frame();
    s.push_canvas_effect(CanvasEffect {
        opacity: 0.5,
        scale: 1.0,
    });
    s.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Rgba8::WHITE);
    s.pop_canvas_effect();
    s.end_frame();
    let a = alpha(&s.frame().unwrap(), 5, 5);
    assert!((126..=129).contains(&a), "alpha {a}");
}

#[test]
fn text_without_font_is_skipped() {
    let mut s = sized(10, 10, 1.0);
    s.begin_frame();
    s.fill_text("hello", Point::new(5.0, 5.0), 12.0, Rgba8::WHITE);
    s.fill_text("again", Point::new(5.0, 5.0), 12.0, Rgba8::WHITE);
    s.end_frame();
    assert!(s.frame().unwrap().data.iter().all(|b| *b == 0));
}

#[test]
fn invalid_font_bytes_are_rejected() {
    assert!(CpuSurface::with_font(b"not a font").is_err());
}
