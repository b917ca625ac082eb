use super::*;

#[test]
fn device_class_threshold_is_exclusive() {
    let narrow = Viewport::new(767.0, 900.0).unwrap();
    let wide = Viewport::new(768.0, 900.0).unwrap();
    assert_eq!(DeviceClass::classify(narrow, 768.0), DeviceClass::Mobile);
    assert_eq!(DeviceClass::classify(wide, 768.0), DeviceClass::Desktop);
}

#[test]
fn viewport_rejects_non_finite() {
    assert!(Viewport::new(f64::NAN, 10.0).is_err());
    assert!(Viewport::new(10.0, -1.0).is_err());
    assert!(HostEnv::new(10.0, 10.0, 0.0).is_err());
}

#[test]
fn backing_size_scales_by_ratio() {
    let vp = Viewport::new(800.0, 600.0).unwrap();
    let b = BackingSize::for_viewport(vp, 1.5);
    assert_eq!((b.width, b.height), (1200, 900));
}

#[test]
fn lerp_endpoints_are_exact() {
    let a = Rgba8::rgb(0xFF, 0xD7, 0x00);
    let b = Rgba8::rgb(0xFF, 0xA5, 0x00);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert_eq!(a.lerp(b, 0.5), Rgba8::rgb(0xFF, 0xBE, 0x00));
}

#[test]
fn premul_halves_channels_at_half_alpha() {
    let c = Rgba8::rgba(200, 100, 0, 128);
    assert_eq!(c.to_premul_array(), [100, 50, 0, 128]);
}
