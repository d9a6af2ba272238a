/// Font weight tracked by the inline flow. Only two steps, toggled by
/// `<b>`/`</b>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Normal,
    Bold,
}

/// Font slant tracked by the inline flow, toggled by `<i>`/`</i>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontSlant {
    Roman,
    Italic,
}

/// The rendering style of a run of text.
///
/// The three fields are plain scalars mutated in place by tag open/close
/// events; they are deliberately not scoped per subtree, so an unbalanced
/// `<b>` affects everything after it. `size` can transiently dip to zero or
/// below through nested `<small>`; [`TextStyle::px`] clamps at measurement
/// time so the open/close deltas stay symmetric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextStyle {
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub size: i32,
}

impl TextStyle {
    pub const DEFAULT_SIZE: i32 = 16;

    /// Pixel size to measure and render at, never below 1.
    pub fn px(&self) -> f32 {
        self.size.max(1) as f32
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            weight: FontWeight::Normal,
            slant: FontSlant::Roman,
            size: Self::DEFAULT_SIZE,
        }
    }
}

/// Vertical metrics of a font at one style. `descent` is a magnitude
/// (distance below the baseline, positive).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_space: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_clamps_non_positive_sizes() {
        let style = TextStyle {
            size: -3,
            ..TextStyle::default()
        };
        assert_eq!(style.px(), 1.0);
        assert_eq!(style.size, -3, "the stored delta stays untouched");
    }
}
