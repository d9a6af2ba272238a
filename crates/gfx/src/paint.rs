//! Draws a display list into an `egui::Painter`.
//!
//! The painter owns scrolling: entries fully above or fully below the
//! visible band are skipped here, not during layout. egui's built-in fonts
//! carry one weight and no italic face, so bold is a double draw offset by
//! half a pixel and italic uses egui's synthetic slant.

use egui::text::{LayoutJob, TextFormat};
use egui::{Align2, Color32, FontId, Painter, Pos2};
use layout::{DisplayItem, FontSlant, FontWeight};

pub fn paint_display_list(
    painter: &Painter,
    origin: Pos2,
    items: &[DisplayItem],
    scroll: f32,
    viewport_height: f32,
    color: Color32,
) {
    for item in items {
        let line_space = item.style.px() * 1.2;
        if item.y - scroll > viewport_height {
            continue;
        }
        if item.y - scroll + line_space < 0.0 {
            continue;
        }
        let pos = Pos2::new(origin.x + item.x, origin.y + item.y - scroll);
        draw_word(painter, pos, item, color);
    }
}

fn draw_word(painter: &Painter, pos: Pos2, item: &DisplayItem, color: Color32) {
    let font_id = FontId::proportional(item.style.px());
    let bold = item.style.weight == FontWeight::Bold;

    if item.style.slant == FontSlant::Italic {
        let mut job = LayoutJob::default();
        job.append(
            &item.text,
            0.0,
            TextFormat {
                font_id,
                color,
                italics: true,
                ..Default::default()
            },
        );
        let galley = painter.ctx().fonts(|fonts| fonts.layout_job(job));
        if bold {
            painter.galley(pos + egui::vec2(0.5, 0.0), galley.clone(), color);
        }
        painter.galley(pos, galley, color);
    } else {
        if bold {
            painter.text(
                pos + egui::vec2(0.5, 0.0),
                Align2::LEFT_TOP,
                &item.text,
                font_id.clone(),
                color,
            );
        }
        painter.text(pos, Align2::LEFT_TOP, &item.text, font_id, color);
    }
}
