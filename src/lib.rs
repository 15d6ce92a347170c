//! adforge turns ad templates into raster images.
//!
//! An [`AdTemplate`] is a fixed-size canvas with a background and an ordered list of
//! elements (logo, title, subtitle, button). The [`Compositor`] paints it into a JPEG (or PNG)
//! without ever failing on bad images: unresolvable backgrounds become solid white and
//! unresolvable logos become a labelled placeholder box.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: every image reference of a template (background + logos) is fetched and
//!    decoded concurrently by the [`ImageResolver`], each under its own timeout.
//! 2. **Plan**: resolutions are folded, in element order, into a [`PaintPlan`] of
//!    [`PaintOp`]s.
//! 3. **Paint**: the plan is executed on a [`CpuSurface`] (`vello_cpu`, text via `parley`).
//! 4. **Encode**: the frame becomes an [`EncodedImage`] (`data:` URL on demand).
//!
//! Around that core sit the [`BatchCompositor`] (sequential multi-template export with
//! progress events), the template [`generate()`] function over the built-in platform
//! [`Catalog`], the best-effort [`TemplateStore`], and JSON import/export helpers.
#![forbid(unsafe_code)]

mod assets;
mod compose;
mod foundation;
mod generate;
mod model;
mod render;
mod storage;

/// Runtime configuration loaded from JSON settings files.
pub mod config;
/// `tracing-subscriber` setup for binaries.
pub mod logging;

pub use assets::decode::{DecodedImage, MAX_IMAGE_DIM, decode_image, decode_image_as, rasterize_svg};
pub use assets::fetch::{FetchError, ImageFetcher, UrlFetcher};
pub use assets::font::{
    DEFAULT_FONT_FAMILY, FontFace, SANS_FALLBACK_FAMILIES, TextShaper, discover_font,
};
pub use assets::reference::{DataUrl, ImageRef};
pub use assets::resolver::{
    DEFAULT_IMAGE_TIMEOUT, ImageResolution, ImageResolver, UnresolvedReason,
};
pub use compose::batch::{BatchCompositor, BatchEvent, BatchProgress, BatchRun, GeneratedAd};
pub use compose::compositor::{Composite, Compositor, LOGO_BOX_SIZE};
pub use config::{AdforgeConfig, CompositorConfig, LoggingConfig, StorageConfig};
pub use foundation::color::parse_css_color;
pub use foundation::core::{Affine, Point, Rect, Rgba8, Vec2};
pub use foundation::error::{AdError, AdResult, ErrorKind, ErrorReport};
pub use foundation::retry::{RetryPolicy, retry_with_backoff};
pub use generate::generator::{
    AdConfig, generate, generate_all_platforms, generate_for_platforms, generate_for_sizes,
    sample_config,
};
pub use model::catalog::{Catalog, Platform};
pub use model::template::{
    AdElement, AdSize, AdTemplate, Alignment, Background, DEFAULT_FONT_SIZE, DEFAULT_TEXT_COLOR,
    ElementKind, ElementStyle, Position, TextAlign,
};
pub use render::FrameRGBA;
pub use render::cpu::CpuSurface;
pub use render::encode::{DEFAULT_JPEG_QUALITY, EncodedImage, OutputFormat, encode_frame};
pub use render::fallback::{
    FALLBACK_BORDER, FALLBACK_FILL, FALLBACK_FONT_SIZE, FALLBACK_LABEL, draw_fallback,
    fallback_ops,
};
pub use render::plan::{Backdrop, PaintOp, PaintPlan, SurfaceDesc, TextPlacement};
pub use storage::backend::{FileStorage, MemoryStorage, StorageBackend};
pub use storage::exchange::{
    batch_export_file_name, export_file_name, export_json, export_to_dir, import_file,
    import_json, single_export_file_name, validate_template, write_generated_ads,
};
pub use storage::store::TemplateStore;
