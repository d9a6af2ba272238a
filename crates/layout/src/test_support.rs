//! Deterministic measurer for unit tests: every character advances half the
//! font size, ascent/descent split 80/20. Keeps expected positions easy to
//! compute by hand without any font machinery.

use crate::measure::TextMeasurer;
use crate::style::{FontMetrics, TextStyle};

pub struct FixedMeasurer;

impl TextMeasurer for FixedMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        text.chars().count() as f32 * style.px() * 0.5
    }

    fn metrics(&self, style: &TextStyle) -> FontMetrics {
        let px = style.px();
        FontMetrics {
            ascent: px * 0.8,
            descent: px * 0.2,
            line_space: px,
        }
    }
}
