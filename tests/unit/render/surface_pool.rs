use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn pool_honors_bucket_cap() {
    let mut p = SurfacePool::new(SurfacePoolOpts {
        max_pool_bytes: 1 << 30,
        max_surfaces_per_bucket: 1,
    });
    let c = canvas(8, 8);

    let a = p.borrow(c).unwrap();
    let b = p.borrow(c).unwrap();
    p.release(c, a);
    p.release(c, b);

    let st = p.stats();
    assert_eq!(st.retained_surfaces, 1);
    assert_eq!(st.alloc_surfaces, 2);
    assert_eq!(st.dropped_on_release, 1);
}

#[test]
fn pool_honors_global_byte_cap() {
    let c = canvas(8, 8);
    let mut p = SurfacePool::new(SurfacePoolOpts {
        max_pool_bytes: c.byte_len(),
        max_surfaces_per_bucket: 8,
    });

    let a = p.borrow(c).unwrap();
    let b = p.borrow(c).unwrap();
    p.release(c, a);
    p.release(c, b);

    let st = p.stats();
    assert_eq!(st.retained_bytes, c.byte_len());
    assert_eq!(st.retained_surfaces, 1);
    assert!(st.dropped_on_release >= 1);
}

#[test]
fn reused_pixmaps_come_back_cleared() {
    let c = canvas(4, 4);
    let mut p = SurfacePool::new(SurfacePoolOpts::default());
    let mut a = p.borrow(c).unwrap();
    a.data_as_u8_slice_mut().fill(200);
    p.release(c, a);

    let b = p.borrow(c).unwrap();
    assert!(b.data_as_u8_slice().iter().all(|&v| v == 0));
    assert_eq!(p.stats().alloc_surfaces, 1);
}

#[test]
fn clear_drops_retained_surfaces() {
    let c = canvas(4, 4);
    let mut p = SurfacePool::new(SurfacePoolOpts::default());
    let a = p.borrow(c).unwrap();
    p.release(c, a);
    p.clear();
    let st = p.stats();
    assert_eq!(st.retained_surfaces, 0);
    assert_eq!(st.retained_bytes, 0);
    assert_eq!(st.alloc_surfaces, 1);
}
