use image::ImageEncoder as _;

use crate::assets::reference::DataUrl;
use crate::foundation::error::{AdError, AdResult};
use crate::render::FrameRGBA;

/// JPEG quality used when nothing else is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Encoded output container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum OutputFormat {
    /// Opaque JPEG; transparent pixels come out black.
    Jpeg { quality: u8 },
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl OutputFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg { .. } => "jpg",
            Self::Png => "png",
        }
    }
}

/// Encoded image bytes plus their format.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl EncodedImage {
    /// `data:<mime>;base64,...` form used for generated ads.
    pub fn to_data_url(&self) -> String {
        DataUrl::encode(self.format.mime(), &self.bytes)
    }
}

#[tracing::instrument(skip(frame), fields(width = frame.width, height = frame.height))]
pub fn encode_frame(frame: &FrameRGBA, format: OutputFormat) -> AdResult<EncodedImage> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(AdError::canvas(format!(
            "frame byte length {} does not match {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut bytes = Vec::new();
    match format {
        OutputFormat::Jpeg { quality } => {
            let rgb = flatten_over_black(frame);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
                .encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
                .map_err(|e| AdError::canvas(format!("jpeg encode: {e}")))?;
        }
        OutputFormat::Png => {
            let rgba = straight_rgba(frame);
            image::codecs::png::PngEncoder::new(&mut bytes)
                .write_image(
                    &rgba,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| AdError::canvas(format!("png encode: {e}")))?;
        }
    }

    Ok(EncodedImage { format, bytes })
}

/// Premultiplied color channels are already the color composited over black.
fn flatten_over_black(frame: &FrameRGBA) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.data.len() / 4 * 3);
    for px in frame.data.chunks_exact(4) {
        if frame.premultiplied {
            out.extend_from_slice(&px[..3]);
        } else {
            let a = u16::from(px[3]);
            out.extend(px[..3].iter().map(|&c| ((u16::from(c) * a + 127) / 255) as u8));
        }
    }
    out
}

fn straight_rgba(frame: &FrameRGBA) -> Vec<u8> {
    if !frame.premultiplied {
        return frame.data.clone();
    }
    let mut out = frame.data.clone();
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/encode.rs"]
mod tests;
