use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};

use crate::assets::resolver::UnresolvedReason;

/// A parsed, syntactically valid image reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageRef {
    /// Self-contained `data:image/...` payload.
    Data(DataUrl),
    /// `http` or `https` URL.
    Remote(url::Url),
    /// `file` URL on the local filesystem.
    File(url::Url),
}

impl ImageRef {
    /// Parse a template image reference.
    ///
    /// Blank input is [`UnresolvedReason::Empty`]; anything that is not a `data:image/...`,
    /// `http(s)` or `file` URL is [`UnresolvedReason::Malformed`].
    pub fn parse(reference: &str) -> Result<Self, UnresolvedReason> {
        let s = reference.trim();
        if s.is_empty() {
            return Err(UnresolvedReason::Empty);
        }
        if has_data_scheme(s) {
            return DataUrl::parse(s).map(Self::Data);
        }
        let url = url::Url::parse(s)
            .map_err(|e| UnresolvedReason::Malformed(format!("invalid url: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Remote(url)),
            "file" => Ok(Self::File(url)),
            other => Err(UnresolvedReason::Malformed(format!(
                "unsupported url scheme '{other}'"
            ))),
        }
    }

    /// `true` for embedded data references (eligible for the re-materialization fallback).
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}

/// RFC 2397 `data:` URL carrying an image.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Declared MIME type, lowercased (always `image/...`).
    pub mime: String,
    /// Whether the payload is base64 encoded.
    pub base64: bool,
    /// Raw payload after the first comma.
    pub payload: String,
}

impl std::fmt::Debug for DataUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataUrl")
            .field("mime", &self.mime)
            .field("base64", &self.base64)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl DataUrl {
    /// Parse a `data:` URL; only image MIME types are accepted.
    pub fn parse(s: &str) -> Result<Self, UnresolvedReason> {
        let rest = s
            .get(5..)
            .filter(|_| has_data_scheme(s))
            .ok_or_else(|| UnresolvedReason::Malformed("not a data url".to_owned()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| UnresolvedReason::Malformed("data url has no payload".to_owned()))?;

        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(UnresolvedReason::Malformed(format!(
                "data url is not an image (mime '{mime}')"
            )));
        }
        let base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        Ok(Self {
            mime,
            base64,
            payload: payload.to_owned(),
        })
    }

    /// Build a base64 data URL string.
    pub fn encode(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    /// Payload bytes decoded exactly as declared.
    pub fn strict_bytes(&self) -> Result<Vec<u8>, String> {
        if self.base64 {
            STANDARD
                .decode(self.payload.as_bytes())
                .map_err(|e| format!("invalid base64 payload: {e}"))
        } else {
            percent_decode(&self.payload)
        }
    }

    /// Payload re-materialized leniently: whitespace stripped, percent-escapes undone, and
    /// both base64 alphabets tried with and without padding.
    pub fn lenient_bytes(&self) -> Result<Vec<u8>, String> {
        let unescaped = percent_decode(&self.payload)?;
        if !self.base64 {
            return Ok(unescaped);
        }
        let compact: Vec<u8> = unescaped
            .into_iter()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        for engine in [&STANDARD, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD] {
            if let Ok(bytes) = engine.decode(&compact) {
                return Ok(bytes);
            }
        }
        Err("payload is not decodable base64 in any alphabet".to_owned())
    }
}

fn has_data_scheme(s: &str) -> bool {
    s.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:"))
}

fn percent_decode(s: &str) -> Result<Vec<u8>, String> {
    fn hex(b: u8) -> Option<u8> {
        (b as char).to_digit(16).map(|d| d as u8)
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).copied().and_then(hex);
            let lo = bytes.get(i + 2).copied().and_then(hex);
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push(hi * 16 + lo);
                    i += 3;
                    continue;
                }
                _ => return Err(format!("broken percent escape at byte {i}")),
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    Ok(out)
}

/// Shorten a reference for log output; data URLs can be megabytes long.
pub(crate) fn describe_reference(reference: &str) -> String {
    const MAX: usize = 64;
    if reference.len() <= MAX {
        return reference.to_owned();
    }
    let mut end = MAX;
    while !reference.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes)", &reference[..end], reference.len())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/reference.rs"]
mod tests;
