use super::*;
use crate::config::ScaleMode;

/// Writes the image's first red value so tests can see which frame produced which text.
struct TagRenderer {
    fail_on_red: Option<u8>,
}

impl TagRenderer {
    fn new(fail_on_red: Option<u8>) -> Self {
        Self { fail_on_red }
    }
}

impl Renderer for TagRenderer {
    fn cell_size(&self) -> (u32, u32) {
        (2, 3)
    }

    fn render(&self, image: &RgbaImage, opts: &RenderOpts) -> GiftermResult<String> {
        let red = image.get_pixel(0, 0).0[0];
        if self.fail_on_red == Some(red) {
            return Err(GiftermError::render("boom"));
        }
        // Uneven work so completion order differs from input order.
        std::thread::sleep(std::time::Duration::from_millis(u64::from(red % 5)));
        Ok(format!("{red}@{}x{}", opts.width_px, opts.height_px))
    }
}

fn frames(n: u8) -> Vec<CompositedFrame> {
    (0..n)
        .map(|i| CompositedFrame {
            image: RgbaImage::from_pixel(1, 1, image::Rgba([i, 0, 0, 255])),
            delay_cs: u32::from(i) * 10,
        })
        .collect()
}

fn cfg(threads: Option<usize>) -> RenderConfig {
    RenderConfig {
        columns: 30,
        rows: 9,
        threads,
        ..RenderConfig::default()
    }
}

#[test]
fn grid_is_translated_through_cell_size() {
    let adapter = FrameRenderer::new(Arc::new(TagRenderer::new(None)), &cfg(Some(1))).unwrap();
    assert_eq!(adapter.opts().width_px, 60);
    assert_eq!(adapter.opts().height_px, 27);
    assert_eq!(adapter.opts().background, [0, 0, 0, 255]);
    assert_eq!(adapter.opts().scale, ScaleMode::Fit);

    let ansi = FrameRenderer::ansi(&cfg(Some(1))).unwrap();
    assert_eq!((ansi.opts().width_px, ansi.opts().height_px), (120, 72));
}

#[test]
fn parallel_render_preserves_order_and_delays() {
    let adapter = FrameRenderer::new(Arc::new(TagRenderer::new(None)), &cfg(Some(4))).unwrap();
    let out = adapter.render_all(&frames(40)).unwrap();
    assert_eq!(out.len(), 40);
    for (i, f) in out.iter().enumerate() {
        assert_eq!(f.text, format!("{i}@60x27"));
        assert_eq!(f.delay_cs, i as u32 * 10);
    }
}

#[test]
fn one_failing_frame_fails_the_animation() {
    let adapter = FrameRenderer::new(Arc::new(TagRenderer::new(Some(7))), &cfg(Some(2))).unwrap();
    assert!(matches!(
        adapter.render_all(&frames(10)),
        Err(GiftermError::Render(_))
    ));
}

#[test]
fn still_has_zero_delay() {
    let adapter = FrameRenderer::new(Arc::new(TagRenderer::new(None)), &cfg(None)).unwrap();
    let img = RgbaImage::from_pixel(1, 1, image::Rgba([3, 0, 0, 255]));
    let f = adapter.render_still(&img).unwrap();
    assert_eq!(f.delay_cs, 0);
    assert_eq!(f.text, "3@60x27");
}

#[test]
fn renderer_emitting_cursor_moves_is_a_render_error() {
    struct Bad;
    impl Renderer for Bad {
        fn cell_size(&self) -> (u32, u32) {
            (1, 1)
        }
        fn render(&self, _: &RgbaImage, _: &RenderOpts) -> GiftermResult<String> {
            Ok("\x1b[2Jhi".to_string())
        }
    }
    let adapter = FrameRenderer::new(Arc::new(Bad), &cfg(Some(1))).unwrap();
    assert!(matches!(
        adapter.render_all(&frames(1)),
        Err(GiftermError::Render(_))
    ));
}

#[test]
fn zero_threads_is_rejected() {
    assert!(FrameRenderer::ansi(&cfg(Some(0))).is_err());
}

#[test]
fn ansi_render_twice_is_identical() {
    let adapter = FrameRenderer::ansi(&cfg(Some(2))).unwrap();
    let mut img = RgbaImage::new(5, 5);
    for (x, y, px) in img.enumerate_pixels_mut() {
        px.0 = [(x * 50) as u8, (y * 50) as u8, 7, 255];
    }
    let input = vec![
        CompositedFrame {
            image: img.clone(),
            delay_cs: 4,
        },
        CompositedFrame {
            image: img,
            delay_cs: 8,
        },
    ];
    assert_eq!(
        adapter.render_all(&input).unwrap(),
        adapter.render_all(&input).unwrap()
    );
}
