use super::*;

#[test]
fn surface_limits() {
    assert!(SurfaceDesc::new(300, 250).is_ok());
    assert!(SurfaceDesc::new(65_535, 1).is_ok());

    assert!(SurfaceDesc::new(8_000, 5_000).is_ok());

    for (w, h) in [(0, 10), (10, 0), (65_536, 10), (60_000, 60_000), (8_001, 5_000)] {
        let err = SurfaceDesc::new(w, h).unwrap_err();
        assert_eq!(err.kind(), crate::foundation::error::ErrorKind::Canvas);
    }

    let b = SurfaceDesc::new(4, 3).unwrap().bounds();
    assert_eq!((b.width(), b.height()), (4.0, 3.0));
}

#[test]
fn has_text_tracks_ops() {
    let mut plan = PaintPlan::new(SurfaceDesc::new(2, 2).unwrap());
    plan.push(PaintOp::FillRect {
        rect: Rect::new(0.0, 0.0, 2.0, 2.0),
        color: Rgba8::WHITE,
    });
    assert!(!plan.has_text());
    plan.push(PaintOp::Text {
        text: "Hi".to_owned(),
        placement: TextPlacement::TopLeft(Point::new(0.0, 0.0)),
        font_size: 16.0,
        color: Rgba8::BLACK,
        backdrop: None,
    });
    assert!(plan.has_text());
}
