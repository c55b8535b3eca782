use super::*;

fn frame(w: u32, h: u32) -> FrameRGBA {
    let mut data = vec![0u8; (w * h * 4) as usize];
    data[..4].copy_from_slice(&[64, 32, 0, 128]);
    FrameRGBA::from_premul(w, h, data).unwrap()
}

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Fps::new(30, 1).unwrap(),
    }
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("glowtrace_{name}_{}", std::process::id()))
}

#[test]
fn in_memory_sink_captures_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &frame(2, 2)).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.config(), Some(cfg(2, 2)));
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.frames()[1].0, FrameIndex(1));
    assert!(sink.is_finished());

    sink.begin(cfg(2, 2)).unwrap();
    assert!(sink.frames().is_empty());
}

#[test]
fn png_sink_writes_straight_alpha_files() {
    let dir = temp_dir("png_sink");
    let mut sink = PngSequenceSink::new(&dir, "loader");
    sink.begin(cfg(3, 2)).unwrap();
    sink.push_frame(FrameIndex(7), &frame(3, 2)).unwrap();
    sink.end().unwrap();

    let path = dir.join("loader_00007.png");
    assert_eq!(sink.written(), &[path.clone()]);
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(0, 0).0, [128, 64, 0, 128]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn png_sink_rejects_misuse() {
    let dir = temp_dir("png_sink_misuse");
    let mut sink = PngSequenceSink::new(&dir, "f");
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2)).is_err());
    sink.begin(cfg(4, 4)).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2)).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
