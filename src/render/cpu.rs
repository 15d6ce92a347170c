use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::assets::font::TextShaper;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{AdError, AdResult};
use crate::render::FrameRGBA;
use crate::render::plan::{Backdrop, PaintOp, SurfaceDesc, TextPlacement};

/// CPU drawing surface backed by `vello_cpu`.
///
/// Painting never fails: ops that cannot be drawn (text without a font, images with
/// inconsistent buffers) are skipped with a warning.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    text: Option<TextShaper>,
    image_cache: HashMap<*const Vec<u8>, vello_cpu::Image>,
    warned_no_font: bool,
}

impl CpuSurface {
    /// `SurfaceDesc` guarantees both sides fit the rasterizer.
    pub fn new(desc: SurfaceDesc, text: Option<TextShaper>) -> Self {
        let width = u16::try_from(desc.width).unwrap_or(u16::MAX);
        let height = u16::try_from(desc.height).unwrap_or(u16::MAX);
        Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            text,
            image_cache: HashMap::new(),
            warned_no_font: false,
        }
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub fn paint_all<'a>(&mut self, ops: impl IntoIterator<Item = &'a PaintOp>) {
        for op in ops {
            self.paint(op);
        }
    }

    pub fn paint(&mut self, op: &PaintOp) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            PaintOp::FillRect { rect, color } => {
                self.ctx.set_paint(color_to_cpu(*color));
                self.ctx.fill_rect(&rect_to_cpu(*rect));
            }
            PaintOp::StrokeRect { rect, color, width } => {
                let half = width / 2.0;
                let inner = rect.inset(-half);
                if inner.width() <= 0.0 || inner.height() <= 0.0 {
                    return;
                }
                self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
                self.ctx.set_paint(color_to_cpu(*color));
                self.ctx.stroke_rect(&rect_to_cpu(inner));
            }
            PaintOp::Image { image, rect } => self.paint_image(image, *rect),
            PaintOp::Text {
                text,
                placement,
                font_size,
                color,
                backdrop,
            } => self.paint_text(text, *placement, *font_size, *color, backdrop.as_ref()),
        }
    }

    fn paint_image(&mut self, image: &Arc<DecodedImage>, rect: Rect) {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let key = Arc::as_ptr(&image.rgba8_premul);
        let paint = match self.image_cache.get(&key) {
            Some(paint) => paint.clone(),
            None => match image_paint(image) {
                Ok(paint) => {
                    self.image_cache.insert(key, paint.clone());
                    paint
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undrawable image");
                    return;
                }
            },
        };

        let (iw, ih) = (f64::from(image.width), f64::from(image.height));
        let transform = vello_cpu::kurbo::Affine::translate((rect.x0, rect.y0))
            * vello_cpu::kurbo::Affine::scale_non_uniform(rect.width() / iw, rect.height() / ih);
        self.ctx.set_transform(transform);
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
    }

    fn paint_text(
        &mut self,
        text: &str,
        placement: TextPlacement,
        font_size: f32,
        color: Rgba8,
        backdrop: Option<&Backdrop>,
    ) {
        if text.is_empty() {
            return;
        }
        let Self {
            ctx,
            text: shaper,
            warned_no_font,
            ..
        } = self;
        let Some(shaper) = shaper.as_mut() else {
            if !*warned_no_font {
                tracing::warn!("no font available, text is not drawn");
                *warned_no_font = true;
            }
            return;
        };
        let layout = match shaper.layout(text, font_size, color) {
            Ok(layout) => layout,
            Err(e) => {
                tracing::warn!(error = %e, text, "text layout failed");
                return;
            }
        };

        let (w, h) = (f64::from(layout.width()), f64::from(layout.height()));
        let origin = match placement {
            TextPlacement::TopLeft(p) => {
                let first_baseline = layout
                    .lines()
                    .next()
                    .map(|line| f64::from(line.metrics().baseline))
                    .unwrap_or(f64::from(font_size));
                Point::new(p.x, p.y + f64::from(font_size) - first_baseline)
            }
            TextPlacement::CenteredIn(r) => {
                let c = r.center();
                Point::new(c.x - w / 2.0, c.y - h / 2.0)
            }
        };

        if let Some(bd) = backdrop {
            let rect = Rect::new(
                origin.x - bd.padding_x,
                origin.y - bd.padding_y,
                origin.x + w + bd.padding_x,
                origin.y + h + bd.padding_y,
            );
            ctx.set_paint(color_to_cpu(bd.color));
            ctx.fill_rect(&rect_to_cpu(rect));
        }

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        ctx.set_paint(color_to_cpu(color));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(shaper.font())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    /// Rasterize everything painted so far.
    pub fn finish(self) -> FrameRGBA {
        self.finish_with_text().0
    }

    /// Like [`CpuSurface::finish`], handing the text shaper back for reuse.
    pub fn finish_with_text(mut self) -> (FrameRGBA, Option<TextShaper>) {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        let frame = FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        };
        (frame, self.text)
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn image_paint(image: &DecodedImage) -> AdResult<vello_cpu::Image> {
    let pixmap =
        image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> AdResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| AdError::canvas("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| AdError::canvas("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(AdError::canvas("decoded image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
