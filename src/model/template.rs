use crate::foundation::error::{AdError, AdResult};

/// Default font size in pixels when an element style leaves it unset.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;
/// Default text color when an element style leaves it unset.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One ad format offered by a platform (for example a 300x250 medium rectangle).
pub struct AdSize {
    /// Catalog-unique identifier, e.g. `google-search-300x250`.
    pub id: String,
    /// Width in pixels, > 0.
    pub width: u32,
    /// Height in pixels, > 0.
    pub height: u32,
    /// Display name.
    pub name: String,
    /// Platform label (`"Google Ads"`, `"Facebook"`, ...). Used by the generator filter.
    pub platform: String,
    /// Short placement description.
    pub description: String,
    /// Display-only aspect ratio label.
    pub aspect_ratio: String,
}

impl AdSize {
    /// `"<width>x<height>"` label used in generated file names.
    pub fn dimensions_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of a visual element.
pub enum ElementKind {
    /// Logo image (or its text stand-in).
    Logo,
    /// Headline text.
    Title,
    /// Secondary text.
    Subtitle,
    /// Call-to-action text.
    Button,
    /// Legacy kind; never painted. The template-level [`Background`] is authoritative.
    Background,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Offset of an element's top-left corner in unscaled template pixels.
pub struct Position {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Horizontal text alignment (preview metadata).
pub enum TextAlign {
    /// Left.
    Left,
    /// Center.
    Center,
    /// Right.
    Right,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Per-element style record. Every field is optional.
pub struct ElementStyle {
    /// Font size in pixels; defaults to [`DEFAULT_FONT_SIZE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    /// CSS text color; defaults to black.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// CSS color of the button chrome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// CSS font weight (preview only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    /// Text alignment (preview only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
}

impl ElementStyle {
    /// Effective font size.
    pub fn font_size_or_default(&self) -> f32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Effective CSS text color.
    pub fn color_or_default(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_TEXT_COLOR)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// One positioned visual unit within a template.
pub struct AdElement {
    /// Identifier, unique within its template.
    pub id: String,
    /// Element kind.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Text content (label of the logo fallback for logos).
    pub content: String,
    /// Optional image reference (logos only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Hidden elements produce no paint at all.
    pub is_visible: bool,
    /// Top-left offset.
    pub position: Position,
    /// Style record.
    #[serde(default)]
    pub style: ElementStyle,
}

impl AdElement {
    /// Non-blank image reference, if any.
    pub fn image_ref(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
/// Template background: a solid CSS color or an image reference.
pub enum Background {
    /// Solid fill with a CSS color.
    Color(String),
    /// Image stretched over the whole canvas.
    Image(String),
}

impl Default for Background {
    fn default() -> Self {
        Self::Color("#ffffff".to_owned())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Template alignment label. Metadata only; does not change rendered pixels.
pub enum Alignment {
    /// Left.
    Left,
    /// Center.
    #[default]
    Center,
    /// Right.
    Right,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A complete, serializable ad composition.
///
/// Element order is paint order: later elements occlude earlier ones.
pub struct AdTemplate {
    /// Template identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Output format.
    pub size: AdSize,
    /// Elements in paint order.
    pub elements: Vec<AdElement>,
    /// Background.
    pub background: Background,
    /// Alignment label.
    #[serde(default)]
    pub alignment: Alignment,
}

impl AdTemplate {
    /// Check the template invariants.
    ///
    /// Requires a non-blank name, a positive size, at least one visible element, and
    /// non-negative finite positions and font sizes.
    pub fn validate(&self) -> AdResult<()> {
        if self.name.trim().is_empty() {
            return Err(AdError::validation("Ad name is required."));
        }
        if self.size.width == 0 || self.size.height == 0 {
            return Err(AdError::validation("Valid ad size is required."));
        }
        if !self.elements.iter().any(|e| e.is_visible) {
            return Err(AdError::validation(
                "At least one visible element is required.",
            ));
        }
        for e in &self.elements {
            let Position { x, y } = e.position;
            if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
                return Err(AdError::validation(format!(
                    "element '{}' position must be finite and non-negative",
                    e.id
                )));
            }
            if let Some(fs) = e.style.font_size
                && (!fs.is_finite() || fs < 0.0)
            {
                return Err(AdError::validation(format!(
                    "element '{}' fontSize must be finite and non-negative",
                    e.id
                )));
            }
        }
        Ok(())
    }

    /// `"<width>x<height>"` of the template size.
    pub fn dimensions_label(&self) -> String {
        self.size.dimensions_label()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/template.rs"]
mod tests;
