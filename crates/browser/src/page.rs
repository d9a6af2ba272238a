use html::Node;
use layout::{DisplayItem, TextMeasurer, Viewport};

/// Vertical distance of one arrow-key scroll.
pub const SCROLL_STEP: f32 = 100.0;

/// State of the single page the shell shows: the parsed document, its
/// current display list and the scroll position. Cleared wholesale on every
/// navigation.
pub struct Page {
    pub url: String,
    pub dom: Option<Node>,
    pub display_list: Vec<DisplayItem>,
    pub scroll: f32,
    pub error: Option<String>,
    laid_out_width: Option<f32>,
    content_height: f32,
}

impl Page {
    pub fn new() -> Self {
        Self {
            url: String::new(),
            dom: None,
            display_list: Vec::new(),
            scroll: 0.0,
            error: None,
            laid_out_width: None,
            content_height: 0.0,
        }
    }

    /// Resets all state for a new navigation target.
    pub fn start_nav(&mut self, url: &str) {
        self.url = url.to_string();
        self.dom = None;
        self.display_list.clear();
        self.scroll = 0.0;
        self.error = None;
        self.laid_out_width = None;
        self.content_height = 0.0;
    }

    pub fn set_body(&mut self, body: &str) {
        self.dom = Some(html::parse(body));
        self.error = None;
        self.laid_out_width = None;
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
        self.dom = None;
        self.display_list.clear();
        self.laid_out_width = None;
        self.content_height = 0.0;
    }

    /// Re-runs layout when the document changed or the viewport width moved
    /// noticeably; otherwise the cached display list stands.
    pub fn ensure_layout(&mut self, measurer: &dyn TextMeasurer, width: f32) {
        let Some(dom) = &self.dom else {
            return;
        };
        let unchanged = self
            .laid_out_width
            .map(|laid| (laid - width).abs() <= 0.5)
            .unwrap_or(false);
        if unchanged {
            return;
        }
        let viewport = Viewport {
            width,
            ..Viewport::default()
        };
        self.display_list = layout::layout(dom, measurer, viewport);
        self.laid_out_width = Some(width);
        self.content_height = self
            .display_list
            .iter()
            .map(|item| item.y + item.style.px() * 1.2)
            .fold(0.0, f32::max);
    }

    /// Scrolls by `delta` pixels, clamped so the content cannot be dragged
    /// past either end.
    pub fn scroll_by(&mut self, delta: f32, viewport_height: f32) {
        let max = (self.content_height - viewport_height).max(0.0);
        self.scroll = (self.scroll + delta).clamp(0.0, max);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout::test_support::FixedMeasurer;

    #[test]
    fn layout_is_cached_until_width_changes() {
        let mut page = Page::new();
        page.set_body("<p>hello world</p>");
        page.ensure_layout(&FixedMeasurer, 800.0);
        let first = page.display_list.clone();
        assert!(!first.is_empty());

        // Sub-pixel jitter keeps the cached list.
        page.ensure_layout(&FixedMeasurer, 800.3);
        assert_eq!(page.display_list, first);

        page.ensure_layout(&FixedMeasurer, 400.0);
        assert_eq!(page.display_list.len(), first.len(), "same words either way");
    }

    #[test]
    fn scroll_clamps_to_content() {
        let mut page = Page::new();
        page.set_body("<p>one</p><p>two</p><p>three</p>");
        page.ensure_layout(&FixedMeasurer, 200.0);

        page.scroll_by(-50.0, 100.0);
        assert_eq!(page.scroll, 0.0, "cannot scroll above the top");

        page.scroll_by(10_000.0, 10.0);
        assert!(
            page.scroll <= page.content_height,
            "cannot scroll past the end, got {} of {}",
            page.scroll,
            page.content_height
        );
    }

    #[test]
    fn navigation_resets_previous_document() {
        let mut page = Page::new();
        page.set_body("<p>old</p>");
        page.ensure_layout(&FixedMeasurer, 300.0);
        page.scroll_by(40.0, 10.0);

        page.start_nav("http://example.org/");
        assert!(page.dom.is_none());
        assert!(page.display_list.is_empty());
        assert_eq!(page.scroll, 0.0);
    }
}
