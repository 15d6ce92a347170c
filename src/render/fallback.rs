use crate::foundation::core::{Rect, Rgba8};
use crate::render::cpu::CpuSurface;
use crate::render::plan::{PaintOp, TextPlacement};

/// Placeholder fill (`#f3f4f6`).
pub const FALLBACK_FILL: Rgba8 = Rgba8::opaque(0xf3, 0xf4, 0xf6);
/// Placeholder border (`#d1d5db`).
pub const FALLBACK_BORDER: Rgba8 = Rgba8::opaque(0xd1, 0xd5, 0xdb);
/// Placeholder label color (`#6b7280`).
pub const FALLBACK_LABEL: Rgba8 = Rgba8::opaque(0x6b, 0x72, 0x80);
pub const FALLBACK_FONT_SIZE: f32 = 16.0;
const BORDER_WIDTH: f64 = 1.0;

/// Paint ops for an image placeholder: filled box, 1 px border, centered label.
pub fn fallback_ops(rect: Rect, label: &str, font_size: f32) -> Vec<PaintOp> {
    let mut ops = vec![
        PaintOp::FillRect {
            rect,
            color: FALLBACK_FILL,
        },
        PaintOp::StrokeRect {
            rect,
            color: FALLBACK_BORDER,
            width: BORDER_WIDTH,
        },
    ];
    if !label.is_empty() {
        ops.push(PaintOp::Text {
            text: label.to_owned(),
            placement: TextPlacement::CenteredIn(rect),
            font_size,
            color: FALLBACK_LABEL,
            backdrop: None,
        });
    }
    ops
}

/// Draw a placeholder straight onto `surface`.
pub fn draw_fallback(surface: &mut CpuSurface, rect: Rect, label: &str, font_size: f32) {
    for op in fallback_ops(rect, label, font_size) {
        surface.paint(&op);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fallback.rs"]
mod tests;
