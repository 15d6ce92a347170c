use serde::{Deserialize, Serialize};

use crate::model::catalog::Catalog;
use crate::model::template::{
    AdElement, AdSize, AdTemplate, Alignment, Background, ElementKind, ElementStyle, Position,
};

/// Campaign settings expanded into one template per ad size.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdConfig {
    pub name: String,
    pub title: String,
    pub subtitle: String,
    pub button_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Size platform labels to include; empty means every size.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Size ids to keep after the platform filter; empty or absent means no filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
}

/// Expand `config` into templates, one per matching catalog size, in catalog order.
#[tracing::instrument(skip_all, fields(campaign = %config.name))]
pub fn generate(config: &AdConfig, catalog: &Catalog) -> Vec<AdTemplate> {
    let size_filter = config.sizes.as_deref().filter(|s| !s.is_empty());
    let templates: Vec<AdTemplate> = catalog
        .all_sizes()
        .filter(|size| config.platforms.is_empty() || config.platforms.contains(&size.platform))
        .filter(|size| size_filter.is_none_or(|ids| ids.contains(&size.id)))
        .enumerate()
        .map(|(i, size)| build_template(config, size, i))
        .collect();
    tracing::debug!(count = templates.len(), "templates generated");
    templates
}

/// Templates for every platform label present in the catalog.
pub fn generate_all_platforms(config: &AdConfig, catalog: &Catalog) -> Vec<AdTemplate> {
    let platforms = catalog
        .platform_labels()
        .into_iter()
        .map(str::to_owned)
        .collect();
    generate(
        &AdConfig {
            platforms,
            ..config.clone()
        },
        catalog,
    )
}

/// Templates for an explicit list of platform labels.
pub fn generate_for_platforms(
    config: &AdConfig,
    platforms: &[&str],
    catalog: &Catalog,
) -> Vec<AdTemplate> {
    generate(
        &AdConfig {
            platforms: platforms.iter().map(|p| (*p).to_owned()).collect(),
            ..config.clone()
        },
        catalog,
    )
}

/// Templates for an explicit list of size ids.
pub fn generate_for_sizes(config: &AdConfig, size_ids: &[&str], catalog: &Catalog) -> Vec<AdTemplate> {
    generate(
        &AdConfig {
            sizes: Some(size_ids.iter().map(|s| (*s).to_owned()).collect()),
            ..config.clone()
        },
        catalog,
    )
}

/// A ready-to-run example campaign.
pub fn sample_config() -> AdConfig {
    AdConfig {
        name: "Sample Ad Campaign".to_owned(),
        title: "Amazing Product".to_owned(),
        subtitle: "Discover the best features and benefits".to_owned(),
        button_text: "Learn More".to_owned(),
        logo_image: None,
        background_image: None,
        background_color: Some("#00A0FF".to_owned()),
        platforms: vec!["Google Ads".to_owned(), "Facebook".to_owned()],
        sizes: Some(vec![
            "google-search-300x250".to_owned(),
            "fb-feed-1200x628".to_owned(),
        ]),
    }
}

fn build_template(config: &AdConfig, size: &AdSize, index: usize) -> AdTemplate {
    let background = match non_empty(config.background_image.as_deref()) {
        Some(url) => Background::Image(url.to_owned()),
        None => Background::Color(
            non_empty(config.background_color.as_deref())
                .unwrap_or("#ffffff")
                .to_owned(),
        ),
    };

    AdTemplate {
        id: format!("generated-{}", index + 1),
        name: format!("{} - {}", config.name, size.name),
        size: size.clone(),
        elements: vec![
            AdElement {
                image_url: non_empty(config.logo_image.as_deref()).map(str::to_owned),
                ..element("logo-1", ElementKind::Logo, "LOGO", (10.0, 10.0), style(16.0, "#000000"))
            },
            element(
                "title-1",
                ElementKind::Title,
                &config.title,
                (50.0, 50.0),
                ElementStyle {
                    font_weight: Some("bold".to_owned()),
                    ..style(24.0, "#000000")
                },
            ),
            element(
                "subtitle-1",
                ElementKind::Subtitle,
                &config.subtitle,
                (50.0, 90.0),
                style(16.0, "#666666"),
            ),
            element(
                "button-1",
                ElementKind::Button,
                &config.button_text,
                (50.0, 130.0),
                ElementStyle {
                    background_color: Some("#3b82f6".to_owned()),
                    ..style(14.0, "#ffffff")
                },
            ),
        ],
        background,
        alignment: Alignment::Center,
    }
}

fn element(
    id: &str,
    kind: ElementKind,
    content: &str,
    (x, y): (f64, f64),
    style: ElementStyle,
) -> AdElement {
    AdElement {
        id: id.to_owned(),
        kind,
        content: content.to_owned(),
        image_url: None,
        is_visible: true,
        position: Position { x, y },
        style,
    }
}

fn style(font_size: f32, color: &str) -> ElementStyle {
    ElementStyle {
        font_size: Some(font_size),
        color: Some(color.to_owned()),
        ..ElementStyle::default()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/generate/generator.rs"]
mod tests;
