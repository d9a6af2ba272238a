use std::cell::RefCell;
use std::collections::HashMap;

use egui::{Color32, Context, FontId};
use layout::{FontMetrics, TextMeasurer, TextStyle};

/// `egui`-backed measurer used while a window is up: widths come from the
/// live font atlas so layout agrees with what the painter draws.
///
/// egui ships a single proportional face, so weight and slant do not change
/// advances; only the pixel size matters, which is why caches key on the
/// rounded size alone.
pub struct EguiMeasurer {
    ctx: Context,
    space_widths: RefCell<HashMap<u32, f32>>,
}

impl EguiMeasurer {
    pub fn new(ctx: &Context) -> Self {
        Self {
            ctx: ctx.clone(),
            space_widths: RefCell::new(HashMap::new()),
        }
    }

    fn size_key(style: &TextStyle) -> u32 {
        style.px().round() as u32
    }

    fn space_width(&self, style: &TextStyle) -> f32 {
        let key = Self::size_key(style);
        if let Some(width) = self.space_widths.borrow().get(&key).copied() {
            return width;
        }

        let px = style.px();
        let font_id = FontId::proportional(px);
        // NBSP measures reliably where a plain space can collapse to zero.
        let nbsp = "\u{00A0}";
        let measured = self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(nbsp.to_owned(), font_id, Color32::WHITE)
                .rect
                .width()
        });
        let width = if measured.is_finite() && measured > 0.0 {
            measured
        } else {
            (px * 0.33).max(1.0)
        };

        self.space_widths.borrow_mut().insert(key, width);
        width
    }
}

impl TextMeasurer for EguiMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        if text == " " {
            return self.space_width(style);
        }
        let font_id = FontId::proportional(style.px());
        // Color does not affect text metrics.
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_owned(), font_id, Color32::WHITE)
                .rect
                .width()
        })
    }

    fn metrics(&self, style: &TextStyle) -> FontMetrics {
        // egui does not expose ascent/descent; derive them from the pixel
        // size with the usual 80/20 split and the 1.2 line factor.
        let px = style.px();
        FontMetrics {
            ascent: px * 0.8,
            descent: px * 0.2,
            line_space: px * 1.2,
        }
    }
}
