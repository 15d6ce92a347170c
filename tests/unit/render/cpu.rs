use super::*;

fn solid_image(w: u32, h: u32, px: [u8; 4]) -> Arc<DecodedImage> {
    Arc::new(DecodedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(px.repeat((w * h) as usize)),
    })
}

fn surface(w: u32, h: u32) -> CpuSurface {
    CpuSurface::new(SurfaceDesc::new(w, h).unwrap(), None)
}

#[test]
fn blank_surface_is_transparent() {
    let frame = surface(3, 2).finish();
    assert_eq!((frame.width, frame.height), (3, 2));
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 3 * 2 * 4);
    assert!(frame.data.iter().all(|&b| b == 0));
}

#[test]
fn later_fills_cover_earlier_ones() {
    let mut s = surface(10, 10);
    s.paint_all(&[
        PaintOp::FillRect {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            color: Rgba8::WHITE,
        },
        PaintOp::FillRect {
            rect: Rect::new(0.0, 0.0, 5.0, 10.0),
            color: Rgba8::opaque(255, 0, 0),
        },
    ]);
    let frame = s.finish();
    assert_eq!(frame.pixel(2, 5), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(7, 5), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(10, 5), None);
}

#[test]
fn images_stretch_to_their_rect() {
    let mut s = surface(20, 20);
    s.paint(&PaintOp::Image {
        image: solid_image(2, 1, [0, 0, 255, 255]),
        rect: Rect::new(5.0, 5.0, 15.0, 15.0),
    });
    let frame = s.finish();
    assert_eq!(frame.pixel(10, 10), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(6, 14), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(2, 2), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(17, 17), Some([0, 0, 0, 0]));
}

#[test]
fn inconsistent_image_buffers_are_skipped() {
    let broken = Arc::new(DecodedImage {
        width: 4,
        height: 4,
        rgba8_premul: Arc::new(vec![255; 7]),
    });
    let mut s = surface(4, 4);
    s.paint(&PaintOp::Image {
        image: broken,
        rect: Rect::new(0.0, 0.0, 4.0, 4.0),
    });
    assert!(s.finish().data.iter().all(|&b| b == 0));
}

#[test]
fn text_without_font_is_skipped() {
    let mut s = surface(8, 8);
    s.paint(&PaintOp::Text {
        text: "Hello".to_owned(),
        placement: TextPlacement::TopLeft(Point::new(0.0, 0.0)),
        font_size: 16.0,
        color: Rgba8::BLACK,
        backdrop: None,
    });
    assert!(s.finish().data.iter().all(|&b| b == 0));
}

fn shaper() -> Option<TextShaper> {
    // Hosts without any fonts installed cannot place glyphs.
    let face = crate::assets::font::discover_font(crate::assets::font::DEFAULT_FONT_FAMILY, &[])?;
    TextShaper::new(&face).ok()
}

fn white_surface(w: u32, h: u32, text: Option<TextShaper>) -> CpuSurface {
    let mut s = CpuSurface::new(SurfaceDesc::new(w, h).unwrap(), text);
    s.paint(&PaintOp::FillRect {
        rect: Rect::new(0.0, 0.0, f64::from(w), f64::from(h)),
        color: Rgba8::WHITE,
    });
    s
}

/// Bounding box `(x0, y0, x1, y1)` of pixels matching `is_ink`, inclusive.
fn ink_bounds(
    frame: &FrameRGBA,
    area: (u32, u32, u32, u32),
    is_ink: impl Fn([u8; 4]) -> bool,
) -> Option<(u32, u32, u32, u32)> {
    let (ax0, ay0, ax1, ay1) = area;
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in ay0..ay1 {
        for x in ax0..ax1 {
            if frame.pixel(x, y).is_some_and(&is_ink) {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
    }
    bounds
}

#[test]
fn top_left_text_sits_between_y_and_the_baseline() {
    let Some(text) = shaper() else {
        return;
    };
    let mut s = white_surface(200, 100, Some(text));
    s.paint(&PaintOp::Text {
        text: "HHH".to_owned(),
        placement: TextPlacement::TopLeft(Point::new(10.0, 20.0)),
        font_size: 40.0,
        color: Rgba8::BLACK,
        backdrop: None,
    });
    let frame = s.finish();

    let (x0, y0, _, y1) =
        ink_bounds(&frame, (0, 0, 200, 100), |px| px[0] < 128).expect("glyphs drawn");
    assert!(x0 >= 10, "ink starts at x={x0}");
    assert!(y0 >= 20, "ink starts at y={y0}");
    assert!(y1 <= 60, "ink ends at y={y1}, past the baseline");
    // Cap height of any sans face is well over a third of the em.
    assert!(y1 - y0 >= 14, "ink only {}px tall", y1 - y0);
}

#[test]
fn fallback_label_is_centered_in_its_box() {
    let Some(text) = shaper() else {
        return;
    };
    let mut s = white_surface(100, 100, Some(text));
    crate::render::fallback::draw_fallback(
        &mut s,
        Rect::new(20.0, 20.0, 80.0, 80.0),
        "LOGO",
        16.0,
    );
    let frame = s.finish();

    // Label ink is much darker than the fill and the border.
    let (x0, y0, x1, y1) =
        ink_bounds(&frame, (22, 22, 78, 78), |px| px[0] < 180).expect("label drawn");
    let cx = f64::from(x0 + x1) / 2.0;
    let cy = f64::from(y0 + y1) / 2.0;
    assert!((cx - 50.0).abs() <= 3.0, "label centered at x={cx}");
    assert!((cy - 50.0).abs() <= 4.0, "label centered at y={cy}");
}

#[test]
fn finish_with_text_returns_the_shaper() {
    let Some(text) = shaper() else {
        return;
    };
    let (frame, back) = white_surface(4, 4, Some(text)).finish_with_text();
    assert_eq!(frame.pixel(0, 0), Some([255, 255, 255, 255]));
    assert!(back.is_some());
    assert!(surface(2, 2).finish_with_text().1.is_none());
}
