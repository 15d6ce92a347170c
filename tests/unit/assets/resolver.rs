use std::io::Cursor;
use std::time::{Duration, Instant};

use base64::Engine as _;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

struct FakeFetcher {
    delay: Duration,
    result: Result<Vec<u8>, FetchError>,
}

impl ImageFetcher for FakeFetcher {
    fn fetch(&self, _url: &url::Url) -> Result<Vec<u8>, FetchError> {
        std::thread::sleep(self.delay);
        self.result.clone()
    }
}

fn resolver_with(fetcher: FakeFetcher, timeout: Duration) -> ImageResolver {
    ImageResolver::new(Arc::new(fetcher), timeout)
}

#[test]
fn resolves_base64_png_data_url() {
    let url = DataUrl::encode("image/png", &png_bytes(3, 2, [255, 0, 0, 255]));
    let res = ImageResolver::default().resolve(&url);
    let img = res.image().expect("resolved");
    assert_eq!((img.width, img.height), (3, 2));
    assert_eq!(&img.rgba8_premul[..4], &[255, 0, 0, 255]);
}

#[test]
fn mislabelled_data_url_recovers_on_fallback() {
    // Declared as JPEG but the payload is PNG: strict decode fails, sniffing succeeds.
    let payload = base64::engine::general_purpose::STANDARD.encode(png_bytes(1, 1, [0, 0, 255, 255]));
    let url = format!("data:image/jpeg;base64,{payload}");
    assert!(ImageResolver::default().resolve(&url).is_resolved());

    // Whitespace-wrapped payload is also re-materialized.
    let (head, tail) = payload.split_at(8);
    let wrapped = format!("data:image/png;base64,{head}\n  {tail}");
    assert!(ImageResolver::default().resolve(&wrapped).is_resolved());
}

#[test]
fn broken_data_url_reports_first_failure() {
    let res = ImageResolver::default().resolve("data:image/png;base64,bm90IGFuIGltYWdl");
    assert!(matches!(
        res,
        ImageResolution::Unresolved(UnresolvedReason::Decode(_))
    ));
}

#[test]
fn empty_and_malformed_references_are_unresolved() {
    let r = ImageResolver::default();
    assert_eq!(
        r.resolve(""),
        ImageResolution::Unresolved(UnresolvedReason::Empty)
    );
    assert!(matches!(
        r.resolve("blob:https://example.com/1"),
        ImageResolution::Unresolved(UnresolvedReason::Malformed(_))
    ));
}

#[test]
fn slow_fetch_times_out_promptly() {
    let fetcher = FakeFetcher {
        delay: Duration::from_millis(600),
        result: Ok(png_bytes(1, 1, [0, 0, 0, 255])),
    };
    let r = resolver_with(fetcher, Duration::from_millis(50));
    let start = Instant::now();
    let res = r.resolve("https://slow.example.com/logo.png");
    assert_eq!(res, ImageResolution::Unresolved(UnresolvedReason::Timeout));
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[test]
fn forbidden_fetch_is_cross_origin() {
    let fetcher = FakeFetcher {
        delay: Duration::ZERO,
        result: Err(FetchError::Blocked("server answered HTTP 403".to_owned())),
    };
    let res = resolver_with(fetcher, Duration::from_secs(1)).resolve("https://cdn.example.com/a.png");
    assert!(matches!(
        res,
        ImageResolution::Unresolved(UnresolvedReason::CrossOrigin(_))
    ));
}

#[test]
fn fetched_bytes_are_decoded() {
    let fetcher = FakeFetcher {
        delay: Duration::ZERO,
        result: Ok(png_bytes(5, 4, [0, 255, 0, 255])),
    };
    let res = resolver_with(fetcher, Duration::from_secs(1)).resolve("https://cdn.example.com/a.png");
    let img = res.image().expect("resolved");
    assert_eq!((img.width, img.height), (5, 4));

    let junk = FakeFetcher {
        delay: Duration::ZERO,
        result: Ok(b"<html>nope</html>".to_vec()),
    };
    let res = resolver_with(junk, Duration::from_secs(1)).resolve("https://cdn.example.com/a.png");
    assert!(matches!(
        res,
        ImageResolution::Unresolved(UnresolvedReason::Decode(_))
    ));
}
