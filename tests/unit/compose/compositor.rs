use std::time::Duration;

use super::*;
use crate::assets::fetch::{FetchError, ImageFetcher};
use crate::model::template::{AdSize, Alignment, ElementStyle, Position};

struct RefusingFetcher;

impl ImageFetcher for RefusingFetcher {
    fn fetch(&self, _url: &url::Url) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Failed("offline".to_owned()))
    }
}

fn compositor(config: CompositorConfig) -> Compositor {
    let resolver = ImageResolver::new(Arc::new(RefusingFetcher), Duration::from_secs(1));
    Compositor::with_resolver(config, resolver)
}

fn element(id: &str, kind: ElementKind, x: f64, y: f64) -> AdElement {
    AdElement {
        id: id.to_owned(),
        kind,
        content: id.to_owned(),
        image_url: None,
        is_visible: true,
        position: Position { x, y },
        style: ElementStyle::default(),
    }
}

fn template(w: u32, h: u32, elements: Vec<AdElement>, background: Background) -> AdTemplate {
    AdTemplate {
        id: "t".to_owned(),
        name: "T".to_owned(),
        size: AdSize {
            id: format!("s-{w}x{h}"),
            width: w,
            height: h,
            name: "S".to_owned(),
            platform: "Test".to_owned(),
            description: String::new(),
            aspect_ratio: String::new(),
        },
        elements,
        background,
        alignment: Alignment::Center,
    }
}

#[test]
fn color_background_fills_surface() {
    let t = template(30, 20, vec![], Background::Color("#ff0000".to_owned()));
    let plan = compositor(CompositorConfig::default()).plan(&t).unwrap();
    assert_eq!(
        plan.ops,
        vec![PaintOp::FillRect {
            rect: Rect::new(0.0, 0.0, 30.0, 20.0),
            color: Rgba8::opaque(255, 0, 0),
        }]
    );
}

#[test]
fn unresolved_background_image_is_white() {
    let t = template(
        10,
        10,
        vec![],
        Background::Image("https://cdn.example.com/bg.png".to_owned()),
    );
    let plan = compositor(CompositorConfig::default()).plan(&t).unwrap();
    assert_eq!(
        plan.ops[0],
        PaintOp::FillRect {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            color: Rgba8::WHITE,
        }
    );
}

#[test]
fn unresolved_logo_becomes_fallback_box() {
    let mut logo = element("LOGO", ElementKind::Logo, 10.0, 10.0);
    logo.image_url = Some("https://cdn.example.com/logo.png".to_owned());
    logo.style.font_size = Some(12.0);
    let t = template(100, 100, vec![logo], Background::default());

    let plan = compositor(CompositorConfig::default()).plan(&t).unwrap();
    let expected = fallback_ops(Rect::new(10.0, 10.0, 70.0, 70.0), "LOGO", 12.0);
    assert_eq!(&plan.ops[1..], expected.as_slice());
}

#[test]
fn text_elements_use_style_defaults() {
    let mut title = element("title", ElementKind::Title, 50.0, 50.0);
    title.style.font_size = Some(24.0);
    title.style.color = Some("#666666".to_owned());
    let plain = element("subtitle", ElementKind::Subtitle, 5.0, 6.0);
    let t = template(200, 100, vec![title, plain], Background::default());

    let plan = compositor(CompositorConfig::default()).plan(&t).unwrap();
    assert_eq!(plan.ops.len(), 3);
    assert_eq!(
        plan.ops[1],
        PaintOp::Text {
            text: "title".to_owned(),
            placement: TextPlacement::TopLeft(Point::new(50.0, 50.0)),
            font_size: 24.0,
            color: Rgba8::opaque(0x66, 0x66, 0x66),
            backdrop: None,
        }
    );
    assert!(matches!(
        &plan.ops[2],
        PaintOp::Text { font_size, color, .. } if *font_size == 16.0 && *color == Rgba8::BLACK
    ));
}

#[test]
fn hidden_and_background_elements_paint_nothing() {
    let mut hidden = element("hidden", ElementKind::Title, 0.0, 0.0);
    hidden.is_visible = false;
    let legacy = element("bg", ElementKind::Background, 0.0, 0.0);
    let t = template(10, 10, vec![hidden, legacy], Background::default());

    let plan = compositor(CompositorConfig::default()).plan(&t).unwrap();
    assert_eq!(plan.ops.len(), 1);
}

#[test]
fn bad_color_paints_black() {
    let mut title = element("title", ElementKind::Title, 0.0, 0.0);
    title.style.color = Some("not-a-color".to_owned());
    let t = template(10, 10, vec![title], Background::Color("nope".to_owned()));

    let plan = compositor(CompositorConfig::default()).plan(&t).unwrap();
    assert!(matches!(plan.ops[0], PaintOp::FillRect { color, .. } if color == Rgba8::BLACK));
    assert!(matches!(&plan.ops[1], PaintOp::Text { color, .. } if *color == Rgba8::BLACK));
}

#[test]
fn button_chrome_is_opt_in() {
    let mut button = element("button", ElementKind::Button, 50.0, 130.0);
    button.style.background_color = Some("#3b82f6".to_owned());
    let t = template(300, 250, vec![button], Background::default());

    let off = compositor(CompositorConfig::default()).plan(&t).unwrap();
    assert!(matches!(&off.ops[1], PaintOp::Text { backdrop: None, .. }));

    let on = compositor(CompositorConfig {
        button_chrome: true,
        ..CompositorConfig::default()
    })
    .plan(&t)
    .unwrap();
    assert!(matches!(
        &on.ops[1],
        PaintOp::Text { backdrop: Some(b), .. }
            if b.color == Rgba8::opaque(0x3b, 0x82, 0xf6) && b.padding_x == 16.0 && b.padding_y == 8.0
    ));
}

#[test]
fn zero_size_is_the_only_fatal_error() {
    let t = template(0, 250, vec![], Background::default());
    let c = compositor(CompositorConfig::default());
    assert_eq!(c.plan(&t).unwrap_err().kind(), ErrorKind::Canvas);
    assert!(c.composite(&t).is_err());
}

#[test]
fn unresolved_reasons_have_friendly_reports() {
    let timeout = ErrorReport::from(&UnresolvedReason::Timeout);
    assert_eq!(timeout.kind, ErrorKind::Image);
    assert!(timeout.message.contains("too long"));

    let cors = ErrorReport::from(&UnresolvedReason::CrossOrigin("403".to_owned()));
    assert!(cors.message.contains("cross-origin"));

    let net = ErrorReport::from(&UnresolvedReason::Fetch("dns".to_owned()));
    assert_eq!(net.kind, ErrorKind::Network);
    assert_eq!(net.context["cause"], "image fetch failed: dns");
}

#[test]
fn text_shapers_are_reused_between_renders() {
    let Some(face) = discover_font(crate::assets::font::DEFAULT_FONT_FAMILY, &[]) else {
        return;
    };
    let c = compositor(CompositorConfig::default()).with_font(Some(face));
    let t = template(
        120,
        60,
        vec![element("title", ElementKind::Title, 4.0, 4.0)],
        Background::Color("#ffffff".to_owned()),
    );
    assert_eq!(c.idle_shapers(), 0);
    let first = c.render(&t).unwrap();
    assert_eq!(c.idle_shapers(), 1);
    let second = c.render(&t).unwrap();
    assert_eq!(c.idle_shapers(), 1);
    assert_eq!(first.data, second.data);
}

#[test]
fn text_free_renders_do_not_build_shapers() {
    let Some(face) = discover_font(crate::assets::font::DEFAULT_FONT_FAMILY, &[]) else {
        return;
    };
    let c = compositor(CompositorConfig::default()).with_font(Some(face));
    let t = template(10, 10, vec![], Background::Color("#ffffff".to_owned()));
    c.render(&t).unwrap();
    assert_eq!(c.idle_shapers(), 0);
}
