use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{AdError, AdResult};

/// Validated drawing surface size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
}

impl SurfaceDesc {
    /// Largest side the CPU rasterizer can allocate.
    pub const MAX_DIM: u32 = u16::MAX as u32;
    /// Pixel budget for one surface (about 160 MB of RGBA).
    pub const MAX_PIXELS: u64 = 40_000_000;

    pub fn new(width: u32, height: u32) -> AdResult<Self> {
        if width == 0 || height == 0 {
            return Err(AdError::canvas(format!(
                "cannot allocate a {width}x{height} surface"
            )));
        }
        if width > Self::MAX_DIM || height > Self::MAX_DIM {
            return Err(AdError::canvas(format!(
                "surface {width}x{height} exceeds {max}x{max}",
                max = Self::MAX_DIM
            )));
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > Self::MAX_PIXELS {
            return Err(AdError::canvas(format!(
                "surface {width}x{height} needs {pixels} pixels, budget is {}",
                Self::MAX_PIXELS
            )));
        }
        Ok(Self { width, height })
    }

    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Where a text op is anchored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextPlacement {
    /// Left edge at `x`, first baseline at `y + font_size`.
    TopLeft(Point),
    /// Centered both ways inside the rect.
    CenteredIn(Rect),
}

/// Solid box painted behind a text run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backdrop {
    pub color: Rgba8,
    pub padding_x: f64,
    pub padding_y: f64,
}

/// One drawing operation. Ops are painted in order; later ops cover earlier ones.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintOp {
    FillRect {
        rect: Rect,
        color: Rgba8,
    },
    /// Stroke centered on the inside of `rect` so the border stays within it.
    StrokeRect {
        rect: Rect,
        color: Rgba8,
        width: f64,
    },
    /// Image stretched to `rect` (aspect ratio not preserved).
    Image {
        image: Arc<DecodedImage>,
        rect: Rect,
    },
    Text {
        text: String,
        placement: TextPlacement,
        font_size: f32,
        color: Rgba8,
        backdrop: Option<Backdrop>,
    },
}

/// Ordered paint operations for one surface.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintPlan {
    pub surface: SurfaceDesc,
    pub ops: Vec<PaintOp>,
}

impl PaintPlan {
    pub fn new(surface: SurfaceDesc) -> Self {
        Self {
            surface,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: PaintOp) {
        self.ops.push(op);
    }

    pub fn has_text(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, PaintOp::Text { .. }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
