//! Greedy inline flow: a single forward pass over the document tree that
//! wraps words at the viewport edge and aligns each finished line on a
//! common baseline.
//!
//! Wrapping decisions use only the current word's measured advance, so the
//! pass is linear and never backtracks. Words are held in a pending line
//! buffer without a vertical position until the line breaks; the flush
//! computes one baseline from the tallest ascent on the line, which is what
//! keeps mixed font sizes visually aligned instead of top-edge aligned.

use html::Node;

use crate::display::DisplayItem;
use crate::measure::TextMeasurer;
use crate::style::{FontSlant, FontWeight, TextStyle};

/// Fixed leading factor applied above the ascent and below the descent of
/// every line.
pub const LEADING: f32 = 1.25;

/// Horizontal extent and outer margins of the flow area.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub width: f32,
    pub h_margin: f32,
    pub v_margin: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            h_margin: 13.0,
            v_margin: 18.0,
        }
    }
}

/// Lays out the inline text of `root` into a display list.
///
/// Deterministic: the same tree and measurer produce the same list.
pub fn layout(root: &Node, measurer: &dyn TextMeasurer, viewport: Viewport) -> Vec<DisplayItem> {
    let mut flow = Flow::new(measurer, viewport);
    flow.node(root);
    flow.flush();
    log::debug!(
        "laid out {} words into {:.0}px wide flow",
        flow.display_list.len(),
        viewport.width
    );
    flow.display_list
}

struct PendingWord {
    x: f32,
    text: String,
    style: TextStyle,
}

struct Flow<'a> {
    measurer: &'a dyn TextMeasurer,
    viewport: Viewport,
    cursor_x: f32,
    cursor_y: f32,
    style: TextStyle,
    line: Vec<PendingWord>,
    display_list: Vec<DisplayItem>,
}

impl<'a> Flow<'a> {
    fn new(measurer: &'a dyn TextMeasurer, viewport: Viewport) -> Self {
        Self {
            measurer,
            viewport,
            cursor_x: viewport.h_margin,
            cursor_y: viewport.v_margin,
            style: TextStyle::default(),
            line: Vec::new(),
            display_list: Vec::new(),
        }
    }

    // Pre-order walk with an explicit stack, open effects on the way down
    // and close effects once a subtree is exhausted. Mirrors the parser's
    // iterative traversal so pathologically deep trees cannot overflow.
    fn node(&mut self, root: &Node) {
        enum Visit<'t> {
            Open(&'t Node),
            Close(&'t str),
        }

        let mut stack = vec![Visit::Open(root)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Open(Node::Text { text }) => self.text(text),
                Visit::Open(Node::Element { name, children, .. }) => {
                    self.open_tag(name);
                    stack.push(Visit::Close(name));
                    for child in children.iter().rev() {
                        stack.push(Visit::Open(child));
                    }
                }
                Visit::Close(name) => self.close_tag(name),
            }
        }
    }

    fn text(&mut self, text: &str) {
        // Any run of whitespace collapses to a single word break.
        for word in text.split_whitespace() {
            self.word(word);
        }
    }

    fn word(&mut self, word: &str) {
        let width = self.measurer.measure(word, &self.style);
        if self.cursor_x + width >= self.viewport.width - self.viewport.h_margin {
            // The word starts a new line; an oversized word still gets
            // placed, on a line of its own.
            self.flush();
        }
        self.line.push(PendingWord {
            x: self.cursor_x,
            text: word.to_string(),
            style: self.style,
        });
        let space = self.measurer.measure(" ", &self.style);
        self.cursor_x += width + space;
    }

    // Style and control effects, applied before descending into children.
    fn open_tag(&mut self, name: &str) {
        match name {
            "i" => self.style.slant = FontSlant::Italic,
            "b" => self.style.weight = FontWeight::Bold,
            "small" => self.style.size -= 2,
            "big" => self.style.size += 4,
            "br" => self.flush(),
            _ => {}
        }
    }

    // Inverse effects, applied after the children; `p` also drops a full
    // line-step of vertical margin below the flushed line.
    fn close_tag(&mut self, name: &str) {
        match name {
            "i" => self.style.slant = FontSlant::Roman,
            "b" => self.style.weight = FontWeight::Normal,
            "small" => self.style.size += 2,
            "big" => self.style.size -= 4,
            "p" => {
                self.flush();
                self.cursor_y += self.viewport.v_margin;
            }
            _ => {}
        }
    }

    // Finalizes the pending line: one baseline for all buffered words,
    // computed from the tallest ascent among their styles.
    fn flush(&mut self) {
        if self.line.is_empty() {
            return;
        }
        let mut max_ascent: f32 = 0.0;
        let mut max_descent: f32 = 0.0;
        for word in &self.line {
            let metrics = self.measurer.metrics(&word.style);
            max_ascent = max_ascent.max(metrics.ascent);
            max_descent = max_descent.max(metrics.descent);
        }
        let baseline = self.cursor_y + LEADING * max_ascent;
        for word in std::mem::take(&mut self.line) {
            let ascent = self.measurer.metrics(&word.style).ascent;
            self.display_list.push(DisplayItem {
                x: word.x,
                y: baseline - ascent,
                text: word.text,
                style: word.style,
            });
        }
        self.cursor_x = self.viewport.h_margin;
        self.cursor_y = baseline + LEADING * max_descent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FixedMeasurer;
    use html::parse;

    const MEASURER: FixedMeasurer = FixedMeasurer;

    fn run(markup: &str, viewport: Viewport) -> Vec<DisplayItem> {
        layout(&parse(markup), &MEASURER, viewport)
    }

    fn narrow() -> Viewport {
        // With FixedMeasurer a default-size character advances 8px, so the
        // usable band (x in [10, 90)) fits nine characters and change.
        Viewport {
            width: 100.0,
            h_margin: 10.0,
            v_margin: 18.0,
        }
    }

    #[test]
    fn words_flow_left_to_right_with_spaces() {
        let items = run("<p>aa bb</p>", narrow());
        assert_eq!(items.len(), 2, "got: {items:?}");
        assert_eq!(items[0].x, 10.0);
        // 2 chars at 8px plus one 8px space.
        assert_eq!(items[1].x, 34.0);
        assert_eq!(items[0].y, items[1].y, "same line shares one y");
    }

    #[test]
    fn wrap_flushes_before_the_word_that_overflows() {
        let items = run("<p>aaaaa bbbbb</p>", narrow());
        assert_eq!(items.len(), 2, "got: {items:?}");
        assert_eq!(items[0].text, "aaaaa");
        assert_eq!(items[1].text, "bbbbb");
        assert_eq!(items[1].x, 10.0, "second word starts a fresh line");
        assert!(
            items[1].y > items[0].y,
            "second word sits on a lower line, got: {items:?}"
        );
    }

    #[test]
    fn oversized_word_is_still_placed() {
        let items = run("<p>aaaaaaaaaaaaaaaaaaaa</p>", narrow());
        assert_eq!(items.len(), 1, "the word is never dropped, got: {items:?}");
        assert_eq!(items[0].x, 10.0);
    }

    #[test]
    fn mixed_sizes_share_one_baseline() {
        let items = run("<p>aa <big>bb</big> cc</p>", narrow());
        assert_eq!(items.len(), 3, "got: {items:?}");
        let baselines: Vec<f32> = items
            .iter()
            .map(|item| item.y + MEASURER.metrics(&item.style).ascent)
            .collect();
        assert!(
            (baselines[0] - baselines[1]).abs() < 1e-3,
            "got: {baselines:?}"
        );
        assert!(
            (baselines[1] - baselines[2]).abs() < 1e-3,
            "got: {baselines:?}"
        );
        assert!(
            items[1].y < items[0].y,
            "the bigger word's top edge sits higher, got: {items:?}"
        );
    }

    #[test]
    fn line_height_follows_the_tallest_style() {
        let small = run("<p>aa</p><p>bb</p>", narrow());
        let tall = run("<p><big><big>aa</big></big></p><p>bb</p>", narrow());
        let gap = |items: &[DisplayItem]| items[1].y - items[0].y;
        assert!(
            gap(&tall) > gap(&small),
            "a taller first line pushes the next one further down"
        );
    }

    #[test]
    fn styles_track_open_and_close_tags() {
        let items = run("<p>a <b>c</b> <i>e</i> <small>g</small> i</p>", narrow());
        let by_text = |t: &str| {
            items
                .iter()
                .find(|item| item.text == t)
                .unwrap_or_else(|| panic!("missing word {t}, got: {items:?}"))
        };
        assert_eq!(by_text("c").style.weight, FontWeight::Bold);
        assert_eq!(by_text("e").style.slant, FontSlant::Italic);
        assert_eq!(by_text("g").style.size, 14);
        let last = by_text("i");
        assert_eq!(last.style.weight, FontWeight::Normal);
        assert_eq!(last.style.slant, FontSlant::Roman);
        assert_eq!(last.style.size, 16);
    }

    #[test]
    fn unbalanced_bold_leaks_to_later_siblings() {
        // The </b> pops the <i> off the parser stack, so the bold close
        // fires only when the whole <b> subtree ends; the trailing text is
        // bold and no longer italic. Quirk preserved on purpose.
        let items = run("<b>bold<i>both</b>only italic</i>", narrow());
        let by_text = |t: &str| {
            items
                .iter()
                .find(|item| item.text == t)
                .unwrap_or_else(|| panic!("missing word {t}, got: {items:?}"))
        };
        assert_eq!(by_text("both").style.weight, FontWeight::Bold);
        assert_eq!(by_text("both").style.slant, FontSlant::Italic);
        assert_eq!(by_text("italic").style.weight, FontWeight::Bold);
        assert_eq!(by_text("italic").style.slant, FontSlant::Roman);
    }

    #[test]
    fn br_breaks_the_line_without_extra_margin() {
        let with_br = run("<p>aa<br>bb</p>", narrow());
        assert_eq!(with_br.len(), 2);
        assert_eq!(with_br[1].x, 10.0);
        let with_p = run("<p>aa</p><p>bb</p>", narrow());
        let br_gap = with_br[1].y - with_br[0].y;
        let p_gap = with_p[1].y - with_p[0].y;
        assert!(
            p_gap > br_gap,
            "a paragraph close adds vertical margin, a <br> does not"
        );
    }

    #[test]
    fn paragraph_close_adds_one_line_step() {
        let viewport = narrow();
        let one = run("<p>aa</p><p>bb</p>", viewport);
        let two = run("<p>aa<br>bb</p>", viewport);
        let extra = (one[1].y - two[1].y) - viewport.v_margin;
        assert!(extra.abs() < 1e-3, "got: {one:?} vs {two:?}");
    }

    #[test]
    fn whitespace_only_markup_emits_nothing() {
        let items = run("<p>   \n\t  </p><div>  </div>", narrow());
        assert!(items.is_empty(), "got: {items:?}");
    }

    #[test]
    fn unknown_tags_have_no_style_effect() {
        let items = run("<p><span><u>aa</u></span></p>", narrow());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].style, TextStyle::default());
    }

    #[test]
    fn layout_is_idempotent() {
        let root = parse("<p>some <b>words</b> to <i>lay</i> out again</p>");
        let first = layout(&root, &MEASURER, narrow());
        let second = layout(&root, &MEASURER, narrow());
        assert_eq!(first, second);
    }

    #[test]
    fn nested_small_never_measures_below_one_pixel() {
        let many_small = "<small>".repeat(12);
        let items = run(&format!("<p>{many_small}x</p>"), narrow());
        assert_eq!(items.len(), 1);
        assert!(items[0].style.size < 0, "got: {:?}", items[0].style);
        assert_eq!(items[0].style.px(), 1.0);
    }
}
