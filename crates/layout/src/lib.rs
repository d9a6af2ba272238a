mod display;
mod flow;
mod measure;
mod style;
pub mod test_support;

pub use crate::display::DisplayItem;
pub use crate::flow::{LEADING, Viewport, layout};
pub use crate::measure::TextMeasurer;
pub use crate::style::{FontMetrics, FontSlant, FontWeight, TextStyle};
