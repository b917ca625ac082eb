use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    let mut px = vec![200u8, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
}

#[test]
fn unpremultiply_recovers_opaque_and_half() {
    let mut px = vec![10u8, 20, 30, 255, 100, 50, 0, 128];
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[10, 20, 30, 255]);
    assert!((px[4] as i32 - 199).abs() <= 1);
    assert!((px[5] as i32 - 100).abs() <= 1);
    assert_eq!(px[6], 0);
}
