use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::reference::DataUrl;
use crate::compose::batch::GeneratedAd;
use crate::foundation::error::{AdError, AdResult};
use crate::model::template::AdTemplate;
use crate::render::encode::OutputFormat;

/// Pretty-printed exchange JSON.
pub fn export_json(template: &AdTemplate) -> AdResult<String> {
    serde_json::to_string_pretty(template)
        .map_err(|e| AdError::serde(format!("encode template: {e}")))
}

/// `ad-template-<name>-<timestamp_ms>.json`
pub fn export_file_name(template: &AdTemplate, timestamp_ms: u128) -> String {
    format!(
        "ad-template-{}-{timestamp_ms}.json",
        file_component(&template.name)
    )
}

/// Write the template into `dir` under a timestamped name.
pub fn export_to_dir(template: &AdTemplate, dir: &Path) -> AdResult<PathBuf> {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let path = dir.join(export_file_name(template, now_ms));
    std::fs::create_dir_all(dir).with_context(|| format!("create '{}'", dir.display()))?;
    std::fs::write(&path, export_json(template)?)
        .with_context(|| format!("write '{}'", path.display()))?;
    Ok(path)
}

/// Parse exchange JSON.
///
/// The document must carry truthy `id`, `name`, `size` and `elements` members before it is
/// decoded into a template.
pub fn import_json(text: &str) -> AdResult<AdTemplate> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| AdError::serde(format!("Failed to parse template file: {e}")))?;

    let present = ["id", "name", "size", "elements"]
        .iter()
        .all(|field| value.get(field).is_some_and(is_truthy));
    if !present {
        return Err(AdError::validation("Invalid template format"));
    }

    serde_json::from_value(value)
        .map_err(|e| AdError::serde(format!("Failed to parse template file: {e}")))
}

pub fn import_file(path: &Path) -> AdResult<AdTemplate> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template file '{}'", path.display()))?;
    import_json(&text)
}

/// Check the template invariants; same rules as [`AdTemplate::validate`].
pub fn validate_template(template: &AdTemplate) -> AdResult<()> {
    template.validate()
}

/// `ad-<name>-<w>x<h>.<ext>` for a single exported image.
pub fn single_export_file_name(template: &AdTemplate, format: OutputFormat) -> String {
    format!(
        "ad-{}-{}.{}",
        file_component(&template.name),
        template.dimensions_label(),
        format.extension()
    )
}

/// `ad-<name>-<size>-<index+1>.<ext>` for one image of a batch.
pub fn batch_export_file_name(ad: &GeneratedAd, index: usize) -> String {
    let ext = DataUrl::parse(&ad.image_url)
        .ok()
        .map(|d| if d.mime == "image/png" { "png" } else { "jpg" })
        .unwrap_or("jpg");
    format!(
        "ad-{}-{}-{}.{ext}",
        file_component(&ad.name),
        ad.size,
        index + 1
    )
}

/// Decode and write every generated ad that has an image. Returns the written paths.
#[tracing::instrument(skip(ads), fields(ads = ads.len()))]
pub fn write_generated_ads(dir: &Path, ads: &[GeneratedAd]) -> AdResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("create '{}'", dir.display()))?;
    let mut written = Vec::new();
    for (index, ad) in ads.iter().enumerate() {
        if !ad.has_image() {
            tracing::warn!(ad = %ad.name, "no image to write");
            continue;
        }
        let bytes = DataUrl::parse(&ad.image_url)
            .map_err(|e| AdError::image(e.to_string()))?
            .strict_bytes()
            .map_err(AdError::image)?;
        let path = dir.join(batch_export_file_name(ad, index));
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

fn is_truthy(v: &serde_json::Value) -> bool {
    match v {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

/// Keep names usable as a single path component.
fn file_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '-',
            c => c,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/storage/exchange.rs"]
mod tests;
