//! System-font measurer for headless runs: real per-glyph advances and real
//! ascent/descent from fontdue, one face per (weight, slant) when the
//! platform has one. Everything degrades to size-derived numbers when no
//! face loads, so metrics lookups never fail.

use std::cell::RefCell;
use std::collections::HashMap;

use fontdue::{Font, FontSettings};
use layout::{FontMetrics, FontSlant, FontWeight, TextMeasurer, TextStyle};

const REGULAR_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/noto/NotoSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

const ITALIC_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/noto/NotoSans-Italic.ttf",
    "/System/Library/Fonts/Supplemental/Arial Italic.ttf",
    "C:\\Windows\\Fonts\\ariali.ttf",
];

const BOLD_ITALIC_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-BoldItalic.ttf",
    "/usr/share/fonts/liberation/LiberationSans-BoldItalic.ttf",
    "/usr/share/fonts/noto/NotoSans-BoldItalic.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold Italic.ttf",
    "C:\\Windows\\Fonts\\arialbi.ttf",
];

pub struct FontBook {
    regular: Option<Font>,
    bold: Option<Font>,
    italic: Option<Font>,
    bold_italic: Option<Font>,
    metrics_cache: RefCell<HashMap<TextStyle, FontMetrics>>,
}

impl FontBook {
    /// Loads one face per style from well-known system locations. Missing
    /// faces fall back toward the regular face, then to derived metrics.
    pub fn from_system_fonts() -> Self {
        Self {
            regular: load_first(REGULAR_PATHS, "regular"),
            bold: load_first(BOLD_PATHS, "bold"),
            italic: load_first(ITALIC_PATHS, "italic"),
            bold_italic: load_first(BOLD_ITALIC_PATHS, "bold-italic"),
            metrics_cache: RefCell::new(HashMap::new()),
        }
    }

    /// A book with no faces at all; measurement runs purely on the
    /// size-derived fallback. Deterministic on every machine.
    pub fn empty() -> Self {
        Self {
            regular: None,
            bold: None,
            italic: None,
            bold_italic: None,
            metrics_cache: RefCell::new(HashMap::new()),
        }
    }

    fn face(&self, style: &TextStyle) -> Option<&Font> {
        match (style.weight, style.slant) {
            (FontWeight::Bold, FontSlant::Italic) => self
                .bold_italic
                .as_ref()
                .or(self.bold.as_ref())
                .or(self.italic.as_ref())
                .or(self.regular.as_ref()),
            (FontWeight::Bold, FontSlant::Roman) => self.bold.as_ref().or(self.regular.as_ref()),
            (FontWeight::Normal, FontSlant::Italic) => {
                self.italic.as_ref().or(self.regular.as_ref())
            }
            (FontWeight::Normal, FontSlant::Roman) => self.regular.as_ref(),
        }
    }
}

impl TextMeasurer for FontBook {
    fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        let px = style.px();
        match self.face(style) {
            Some(font) => text
                .chars()
                .filter(|ch| !ch.is_control())
                .map(|ch| font.metrics(ch, px).advance_width)
                .sum(),
            None => text.chars().count() as f32 * px * 0.5,
        }
    }

    fn metrics(&self, style: &TextStyle) -> FontMetrics {
        if let Some(metrics) = self.metrics_cache.borrow().get(style).copied() {
            return metrics;
        }
        let px = style.px();
        let metrics = self
            .face(style)
            .and_then(|font| font.horizontal_line_metrics(px))
            .map(|line| FontMetrics {
                ascent: line.ascent,
                // fontdue reports descent as a negative offset below the
                // baseline; layout wants the magnitude.
                descent: line.descent.abs(),
                line_space: line.new_line_size,
            })
            .unwrap_or(FontMetrics {
                ascent: px * 0.8,
                descent: px * 0.2,
                line_space: px * 1.2,
            });
        self.metrics_cache.borrow_mut().insert(*style, metrics);
        metrics
    }
}

fn load_first(paths: &[&str], label: &str) -> Option<Font> {
    for path in paths {
        if let Ok(data) = std::fs::read(path)
            && let Ok(font) = Font::from_bytes(data, FontSettings::default())
        {
            log::debug!("loaded {label} face from {path}");
            return Some(font);
        }
    }
    log::warn!("no {label} face found; using size-derived metrics");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_book_measures_deterministically() {
        let book = FontBook::empty();
        let style = TextStyle::default();
        assert_eq!(book.measure("abcd", &style), 32.0);
        let metrics = book.metrics(&style);
        assert_eq!(metrics.ascent, 12.8);
        assert_eq!(metrics.descent, 3.2);
    }

    #[test]
    fn metrics_are_cached_per_style() {
        let book = FontBook::empty();
        let style = TextStyle::default();
        let first = book.metrics(&style);
        let second = book.metrics(&style);
        assert_eq!(first, second);
        assert_eq!(book.metrics_cache.borrow().len(), 1);
    }

    #[test]
    fn system_book_still_answers_without_fonts() {
        // Whatever the host has installed, metrics must come back positive.
        let book = FontBook::from_system_fonts();
        let style = TextStyle::default();
        let metrics = book.metrics(&style);
        assert!(metrics.ascent > 0.0);
        assert!(metrics.descent >= 0.0);
        assert!(book.measure("hello", &style) > 0.0);
    }
}
