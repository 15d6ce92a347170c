use std::sync::{Arc, Mutex};

use rayon::prelude::*;

use crate::assets::font::{FontFace, TextShaper, discover_font};
use crate::assets::resolver::{ImageResolution, ImageResolver, UnresolvedReason};
use crate::config::CompositorConfig;
use crate::foundation::color::parse_css_color;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{AdResult, ErrorKind, ErrorReport};
use crate::model::template::{AdElement, AdTemplate, Background, ElementKind};
use crate::render::FrameRGBA;
use crate::render::cpu::CpuSurface;
use crate::render::encode::{EncodedImage, encode_frame};
use crate::render::fallback::fallback_ops;
use crate::render::plan::{Backdrop, PaintOp, PaintPlan, SurfaceDesc, TextPlacement};

/// Side of the square box a logo image is drawn into.
pub const LOGO_BOX_SIZE: f64 = 60.0;
const BUTTON_PADDING_X: f64 = 16.0;
const BUTTON_PADDING_Y: f64 = 8.0;

/// Anything that can turn a template into encoded image bytes.
pub trait Composite {
    fn composite(&self, template: &AdTemplate) -> AdResult<EncodedImage>;
}

/// Single-template compositor.
///
/// Image references are resolved concurrently, then painted strictly in element order on a
/// fresh surface. Image and color problems are recovered locally; only surface allocation
/// fails the call.
pub struct Compositor {
    config: CompositorConfig,
    resolver: ImageResolver,
    font: Option<FontFace>,
    /// Idle shapers for `font`, reused across renders.
    shapers: Mutex<Vec<TextShaper>>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("font", &self.font)
            .finish()
    }
}

impl Compositor {
    /// Compositor with the default fetcher and a font discovered on this machine.
    pub fn new(config: CompositorConfig) -> Self {
        let resolver =
            ImageResolver::with_default_fetcher(config.image_timeout(), config.allow_remote_images);
        let font = discover_font(&config.font_family, &config.font_dirs);
        if font.is_none() {
            tracing::warn!(family = %config.font_family, "no usable font found, text will be skipped");
        }
        Self {
            config,
            resolver,
            font,
            shapers: Mutex::new(Vec::new()),
        }
    }

    /// Compositor with an explicit resolver; no font until [`Compositor::with_font`].
    pub fn with_resolver(config: CompositorConfig, resolver: ImageResolver) -> Self {
        Self {
            config,
            resolver,
            font: None,
            shapers: Mutex::new(Vec::new()),
        }
    }

    pub fn with_font(mut self, font: Option<FontFace>) -> Self {
        self.font = font;
        self.shapers = Mutex::new(Vec::new());
        self
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn font(&self) -> Option<&FontFace> {
        self.font.as_ref()
    }

    /// Resolve every image the template needs and build the ordered paint plan.
    #[tracing::instrument(skip(self, template), fields(template = %template.id))]
    pub fn plan(&self, template: &AdTemplate) -> AdResult<PaintPlan> {
        let surface = SurfaceDesc::new(template.size.width, template.size.height)?;

        let mut refs: Vec<Option<&str>> = Vec::with_capacity(template.elements.len() + 1);
        refs.push(match &template.background {
            Background::Image(url) => Some(url.as_str()),
            Background::Color(_) => None,
        });
        refs.extend(template.elements.iter().map(logo_reference));

        let resolve = |r: &Option<&str>| r.map(|r| self.resolver.resolve(r));
        let resolutions: Vec<Option<ImageResolution>> = if self.config.parallel_resolve {
            refs.par_iter().map(resolve).collect()
        } else {
            refs.iter().map(resolve).collect()
        };
        let mut resolutions = resolutions.into_iter();

        let mut plan = PaintPlan::new(surface);
        let bounds = surface.bounds();
        match (&template.background, resolutions.next().flatten()) {
            (Background::Color(color), _) => plan.push(PaintOp::FillRect {
                rect: bounds,
                color: color_or_black(color),
            }),
            (Background::Image(_), Some(ImageResolution::Resolved(image))) => {
                plan.push(PaintOp::Image {
                    image,
                    rect: bounds,
                })
            }
            (Background::Image(url), resolution) => {
                if let Some(ImageResolution::Unresolved(reason)) = resolution {
                    report_unresolved("background", url, &reason);
                }
                plan.push(PaintOp::FillRect {
                    rect: bounds,
                    color: Rgba8::WHITE,
                });
            }
        }

        for (element, resolution) in template.elements.iter().zip(resolutions) {
            if !element.is_visible {
                continue;
            }
            if element.kind == ElementKind::Background {
                tracing::trace!(element = %element.id, "background element is inert");
                continue;
            }

            let font_size = element.style.font_size_or_default();
            if let Some(resolution) = resolution {
                let rect = Rect::from_origin_size(
                    (element.position.x, element.position.y),
                    (LOGO_BOX_SIZE, LOGO_BOX_SIZE),
                );
                match resolution {
                    ImageResolution::Resolved(image) => plan.push(PaintOp::Image { image, rect }),
                    ImageResolution::Unresolved(reason) => {
                        report_unresolved(&element.id, element.image_ref().unwrap_or(""), &reason);
                        plan.ops
                            .extend(fallback_ops(rect, &element.content, font_size));
                    }
                }
                continue;
            }

            plan.push(PaintOp::Text {
                text: element.content.clone(),
                placement: TextPlacement::TopLeft(Point::new(
                    element.position.x,
                    element.position.y,
                )),
                font_size,
                color: color_or_black(element.style.color_or_default()),
                backdrop: self.backdrop_for(element),
            });
        }

        Ok(plan)
    }

    /// Render the template to a premultiplied RGBA frame.
    pub fn render(&self, template: &AdTemplate) -> AdResult<FrameRGBA> {
        let plan = self.plan(template)?;
        let shaper = if plan.has_text() {
            self.checkout_shaper()
        } else {
            None
        };

        let mut surface = CpuSurface::new(plan.surface, shaper);
        surface.paint_all(&plan.ops);
        let (frame, shaper) = surface.finish_with_text();
        if let Some(shaper) = shaper {
            self.return_shaper(shaper);
        }
        Ok(frame)
    }

    /// Render and encode with the configured output format.
    #[tracing::instrument(skip(self, template), fields(template = %template.id, size = %template.dimensions_label()))]
    pub fn composite(&self, template: &AdTemplate) -> AdResult<EncodedImage> {
        let frame = self.render(template)?;
        let encoded = encode_frame(&frame, self.config.output)?;
        tracing::debug!(bytes = encoded.bytes.len(), "template composited");
        Ok(encoded)
    }

    fn checkout_shaper(&self) -> Option<TextShaper> {
        let idle = self.shapers.lock().ok().and_then(|mut pool| pool.pop());
        if idle.is_some() {
            return idle;
        }
        let face = self.font.as_ref()?;
        TextShaper::new(face)
            .map_err(|e| tracing::warn!(error = %e, "font unusable, text will be skipped"))
            .ok()
    }

    fn return_shaper(&self, shaper: TextShaper) {
        if let Ok(mut pool) = self.shapers.lock() {
            pool.push(shaper);
        }
    }

    /// Number of text shapers kept for reuse.
    pub fn idle_shapers(&self) -> usize {
        self.shapers.lock().map(|pool| pool.len()).unwrap_or(0)
    }

    fn backdrop_for(&self, element: &AdElement) -> Option<Backdrop> {
        if !self.config.button_chrome || element.kind != ElementKind::Button {
            return None;
        }
        let color = element.style.background_color.as_deref()?;
        Some(Backdrop {
            color: parse_css_color(color).ok()?,
            padding_x: BUTTON_PADDING_X,
            padding_y: BUTTON_PADDING_Y,
        })
    }
}

impl Composite for Compositor {
    fn composite(&self, template: &AdTemplate) -> AdResult<EncodedImage> {
        Compositor::composite(self, template)
    }
}

impl<C: Composite + ?Sized> Composite for Arc<C> {
    fn composite(&self, template: &AdTemplate) -> AdResult<EncodedImage> {
        (**self).composite(template)
    }
}

fn logo_reference(element: &AdElement) -> Option<&str> {
    if element.is_visible && element.kind == ElementKind::Logo {
        element.image_ref()
    } else {
        None
    }
}

fn color_or_black(input: &str) -> Rgba8 {
    parse_css_color(input).unwrap_or_else(|e| {
        tracing::warn!(color = input, error = %e, "unparseable color, painting black");
        Rgba8::BLACK
    })
}

fn report_unresolved(slot: &str, reference: &str, reason: &UnresolvedReason) {
    let report = ErrorReport::from(reason)
        .with_context("slot", slot)
        .with_context("reference", crate::assets::reference::describe_reference(reference));
    tracing::warn!(kind = ?report.kind, "{}", report.user_message());
}

impl From<&UnresolvedReason> for ErrorReport {
    fn from(reason: &UnresolvedReason) -> Self {
        let (kind, message) = match reason {
            UnresolvedReason::Timeout => (
                ErrorKind::Image,
                "Image took too long to load. Please try a different image.",
            ),
            UnresolvedReason::CrossOrigin(_) => (
                ErrorKind::Image,
                "Image blocked by cross-origin policy. Please upload the image directly.",
            ),
            UnresolvedReason::Fetch(_) => (
                ErrorKind::Network,
                "Failed to download image. Please check the URL and try again.",
            ),
            UnresolvedReason::Empty
            | UnresolvedReason::Malformed(_)
            | UnresolvedReason::Decode(_) => (
                ErrorKind::Image,
                "Failed to load image. Please check the URL and try again.",
            ),
        };
        ErrorReport::new(kind, message).with_context("cause", reason.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
