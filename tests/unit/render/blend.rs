use super::*;

fn repeat_px(px: [u8; 4], n: usize) -> Vec<u8> {
    let mut out = vec![0u8; n * 4];
    fill(&mut out, px);
    out
}

#[test]
fn plus_saturates_and_accumulates_crossings() {
    let mut dst = repeat_px([100, 0, 200, 120], 4);
    let src = repeat_px([100, 10, 100, 200], 4);
    plus_in_place(&mut dst, &src).unwrap();
    assert_eq!(&dst[0..4], &[200, 10, 255, 255]);
}

#[test]
fn plus_with_transparent_is_identity() {
    let mut dst = repeat_px([1, 2, 3, 4], 3);
    let before = dst.clone();
    plus_in_place(&mut dst, &repeat_px([0, 0, 0, 0], 3)).unwrap();
    assert_eq!(dst, before);
}

#[test]
fn over_opaque_replaces_and_half_blends() {
    let mut dst = repeat_px([0, 0, 255, 255], 1);
    over_in_place(&mut dst, &repeat_px([255, 0, 0, 255], 1)).unwrap();
    assert_eq!(dst, vec![255, 0, 0, 255]);

    let mut dst = repeat_px([0, 0, 255, 255], 1);
    over_in_place(&mut dst, &repeat_px([128, 0, 0, 128], 1)).unwrap();
    assert_eq!(dst, vec![128, 0, 127, 255]);
}

#[test]
fn mismatched_buffers_are_rejected() {
    let mut dst = vec![0u8; 8];
    assert!(plus_in_place(&mut dst, &[0u8; 4]).is_err());
    assert!(over_in_place(&mut dst, &[0u8; 5]).is_err());
}

#[test]
fn grain_is_faint_and_deterministic() {
    let mut a = repeat_px([0, 0, 0, 255], 64);
    let mut b = a.clone();
    grain_over_in_place(&mut a, 8, 5, 0.035);
    grain_over_in_place(&mut b, 8, 5, 0.035);
    assert_eq!(a, b);
    assert!(a.chunks_exact(4).all(|px| px[0] <= 3 && px[3] == 255));

    let mut untouched = repeat_px([0, 0, 0, 255], 4);
    grain_over_in_place(&mut untouched, 2, 5, 0.0);
    assert_eq!(untouched, repeat_px([0, 0, 0, 255], 4));
}

#[test]
fn unpremultiply_restores_straight_color() {
    let mut px = vec![64, 32, 0, 128, 10, 10, 10, 0, 9, 8, 7, 255];
    unpremultiply_in_place(&mut px);
    assert_eq!(&px[0..4], &[128, 64, 0, 128]);
    assert_eq!(&px[4..8], &[0, 0, 0, 0]);
    assert_eq!(&px[8..12], &[9, 8, 7, 255]);
}
