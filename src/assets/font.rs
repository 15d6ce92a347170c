use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{AdError, AdResult};

/// Font family requested by default for template text.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Raw font face selected for text rendering.
#[derive(Clone)]
pub struct FontFace {
    pub family: String,
    pub data: Arc<Vec<u8>>,
    pub index: u32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("index", &self.index)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Common sans-serif families tried, in order, when the preferred one is missing.
pub const SANS_FALLBACK_FAMILIES: &[&str] = &[
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
    "Roboto",
    "Open Sans",
    "FreeSans",
];

/// Find a face for `preferred_family` among system fonts and `font_dirs`.
///
/// Falls back to [`SANS_FALLBACK_FAMILIES`], the generic sans-serif family, then to the first
/// upright non-monospaced face. `None` means the machine has no usable fonts.
#[tracing::instrument(skip(font_dirs))]
pub fn discover_font(preferred_family: &str, font_dirs: &[PathBuf]) -> Option<FontFace> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for dir in font_dirs {
        load_fonts_from_dir(&mut db, dir);
    }

    let id = select_face(&db, preferred_family)?;
    let family = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_else(|| preferred_family.to_owned());
    let (data, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;

    tracing::debug!(%family, faces = db.len(), "font selected");
    Some(FontFace {
        family,
        data: Arc::new(data),
        index,
    })
}

fn select_face(db: &usvg::fontdb::Database, preferred_family: &str) -> Option<usvg::fontdb::ID> {
    use usvg::fontdb::{Family, Query, Style};

    let families: Vec<Family<'_>> = std::iter::once(preferred_family)
        .chain(SANS_FALLBACK_FAMILIES.iter().copied())
        .map(Family::Name)
        .chain(std::iter::once(Family::SansSerif))
        .collect();
    db.query(&Query {
        families: &families,
        ..Default::default()
    })
    .or_else(|| {
        db.faces()
            .find(|f| !f.monospaced && f.style == Style::Normal)
            .or_else(|| db.faces().next())
            .map(|f| f.id)
    })
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

/// Stateful helper that shapes single-line labels with Parley.
pub struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl TextShaper {
    /// Register `face` with a fresh Parley font context.
    pub fn new(face: &FontFace) -> AdResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.data.as_ref().clone()),
            None,
        );
        let family_id = families
            .iter()
            .map(|(id, _)| *id)
            .find(|id| font_ctx.collection.family_name(*id) == Some(face.family.as_str()))
            .or_else(|| families.first().map(|(id, _)| *id))
            .ok_or_else(|| AdError::canvas("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| AdError::canvas("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.data.as_ref().clone()),
            face.index,
        );

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `text` without wrapping.
    pub fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: Rgba8,
    ) -> AdResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(AdError::validation("font size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
