use crate::model::template::AdSize;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// An advertising platform and the formats it accepts.
pub struct Platform {
    /// Stable identifier (`google`, `facebook`, ...).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short icon glyph for listings.
    pub icon: String,
    /// Offered ad sizes, in catalog order.
    pub sizes: Vec<AdSize>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Read-only table of platforms and sizes consumed by the template generator.
pub struct Catalog {
    /// Platforms in display order.
    pub platforms: Vec<Platform>,
}

struct SizeRow {
    id: &'static str,
    width: u32,
    height: u32,
    name: &'static str,
    platform: &'static str,
    description: &'static str,
    aspect_ratio: &'static str,
}

struct PlatformRow {
    id: &'static str,
    name: &'static str,
    icon: &'static str,
    sizes: &'static [SizeRow],
}

const fn row(
    id: &'static str,
    width: u32,
    height: u32,
    name: &'static str,
    platform: &'static str,
    description: &'static str,
    aspect_ratio: &'static str,
) -> SizeRow {
    SizeRow {
        id,
        width,
        height,
        name,
        platform,
        description,
        aspect_ratio,
    }
}

const BUILTIN: &[PlatformRow] = &[
    PlatformRow {
        id: "google",
        name: "Google Ads",
        icon: "🔍",
        sizes: &[
            row("google-search-300x250", 300, 250, "Medium Rectangle", "Google Ads", "Search & Display", "6:5"),
            row("google-display-728x90", 728, 90, "Leaderboard", "Google Ads", "Display Network", "8:1"),
            row("google-display-300x600", 300, 600, "Half Page", "Google Ads", "Display Network", "1:2"),
            row("google-display-160x600", 160, 600, "Wide Skyscraper", "Google Ads", "Display Network", "4:15"),
            row("google-display-320x50", 320, 50, "Mobile Banner", "Google Ads", "Mobile Display", "32:5"),
        ],
    },
    PlatformRow {
        id: "facebook",
        name: "Facebook & Instagram",
        icon: "📘",
        sizes: &[
            row("fb-feed-1200x628", 1200, 628, "Feed Image", "Facebook", "News Feed", "1.91:1"),
            row("fb-square-1080x1080", 1080, 1080, "Square", "Facebook", "Feed & Stories", "1:1"),
            row("fb-stories-1080x1920", 1080, 1920, "Stories", "Facebook", "Instagram Stories", "9:16"),
        ],
    },
    PlatformRow {
        id: "linkedin",
        name: "LinkedIn",
        icon: "💼",
        sizes: &[
            row("li-sponsored-1200x627", 1200, 627, "Sponsored Content", "LinkedIn", "Feed Ads", "1.91:1"),
            row("li-message-300x250", 300, 250, "Message Ads", "LinkedIn", "InMail", "6:5"),
        ],
    },
    PlatformRow {
        id: "twitter",
        name: "Twitter/X",
        icon: "🐦",
        sizes: &[row("tw-promoted-1200x675", 1200, 675, "Promoted Tweet", "Twitter", "Timeline", "16:9")],
    },
    PlatformRow {
        id: "tiktok",
        name: "TikTok",
        icon: "🎵",
        sizes: &[row("tt-infeed-1080x1920", 1080, 1920, "In-Feed", "TikTok", "For You Page", "9:16")],
    },
];

impl Catalog {
    /// The built-in platform table.
    pub fn builtin() -> Self {
        let platforms = BUILTIN
            .iter()
            .map(|p| Platform {
                id: p.id.to_owned(),
                name: p.name.to_owned(),
                icon: p.icon.to_owned(),
                sizes: p
                    .sizes
                    .iter()
                    .map(|s| AdSize {
                        id: s.id.to_owned(),
                        width: s.width,
                        height: s.height,
                        name: s.name.to_owned(),
                        platform: s.platform.to_owned(),
                        description: s.description.to_owned(),
                        aspect_ratio: s.aspect_ratio.to_owned(),
                    })
                    .collect(),
            })
            .collect();
        Self { platforms }
    }

    /// Every size of every platform, in catalog order.
    pub fn all_sizes(&self) -> impl Iterator<Item = &AdSize> {
        self.platforms.iter().flat_map(|p| p.sizes.iter())
    }

    /// Sizes of the platform with id `platform_id`; empty when unknown.
    pub fn sizes_by_platform(&self, platform_id: &str) -> &[AdSize] {
        self.platforms
            .iter()
            .find(|p| p.id == platform_id)
            .map(|p| p.sizes.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a size by id.
    pub fn find_size(&self, size_id: &str) -> Option<&AdSize> {
        self.all_sizes().find(|s| s.id == size_id)
    }

    /// Distinct size platform labels in catalog order.
    pub fn platform_labels(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for s in self.all_sizes() {
            if !out.contains(&s.platform.as_str()) {
                out.push(s.platform.as_str());
            }
        }
        out
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/catalog.rs"]
mod tests;
