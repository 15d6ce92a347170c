use std::sync::Arc;

use crate::foundation::error::{AdError, AdResult};

/// Largest edge accepted for decoded images and rasterized SVGs.
pub const MAX_IMAGE_DIM: u32 = u16::MAX as u32;
const MAX_SVG_DIM: u32 = 8_192;

/// Decoded raster image, premultiplied RGBA8, row-major without padding.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba8_premul.len())
            .finish()
    }
}

impl DecodedImage {
    fn from_straight_rgba(width: u32, height: u32, mut rgba: Vec<u8>) -> AdResult<Self> {
        check_dims(width, height)?;
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }
}

/// Decode encoded image bytes, sniffing the container format from content.
pub fn decode_image(bytes: &[u8]) -> AdResult<DecodedImage> {
    if looks_like_svg(bytes) {
        return rasterize_svg(bytes);
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| AdError::image(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_straight_rgba(width, height, rgba.into_raw())
}

/// Decode bytes strictly as the declared MIME type.
pub fn decode_image_as(bytes: &[u8], mime: &str) -> AdResult<DecodedImage> {
    if mime.eq_ignore_ascii_case("image/svg+xml") {
        return rasterize_svg(bytes);
    }
    let format = image::ImageFormat::from_mime_type(mime)
        .ok_or_else(|| AdError::image(format!("unsupported image mime type '{mime}'")))?;
    let dyn_img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| AdError::image(format!("decode {mime} image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_straight_rgba(width, height, rgba.into_raw())
}

/// Rasterize an SVG document at its intrinsic size.
pub fn rasterize_svg(bytes: &[u8]) -> AdResult<DecodedImage> {
    fn to_px(v: f32) -> AdResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(AdError::image("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| AdError::image(format!("parse svg tree: {e}")))?;

    let size = tree.size();
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(AdError::image(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| AdError::image("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.take()),
    })
}

/// Cheap content sniff for SVG/XML documents.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head).or_else(|e| {
        std::str::from_utf8(&head[..e.valid_up_to()])
    }) else {
        return false;
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn check_dims(width: u32, height: u32) -> AdResult<()> {
    if width == 0 || height == 0 {
        return Err(AdError::image("decoded image has zero size"));
    }
    if width > MAX_IMAGE_DIM || height > MAX_IMAGE_DIM {
        return Err(AdError::image(format!(
            "decoded image too large: {width}x{height} (max {MAX_IMAGE_DIM})"
        )));
    }
    Ok(())
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
