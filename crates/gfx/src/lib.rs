mod egui_measurer;
mod font_book;
mod paint;

pub use crate::egui_measurer::EguiMeasurer;
pub use crate::font_book::FontBook;
pub use crate::paint::paint_display_list;
