//! Tolerant tree construction over the token stream.
//!
//! The builder never fails: unmatched closing tags, unclosed elements,
//! stray text and empty tags all degrade into a single well-formed tree.
//! Nesting rules are not validated: a close tag pops whatever is on top of
//! the open-element stack, which is how the mis-nested
//! `<b>bold<i>both</b>` ends up closing the `<i>` first.

use std::collections::HashMap;

use crate::tokenizer::tokenize;
use crate::types::{Node, Token};

/// Elements that never have a closing tag and are never pushed onto the
/// open-element stack.
pub fn is_void_tag(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Parses markup into a document tree rooted at a single `html` element.
///
/// Terminates on every input and never panics; see the module docs for the
/// recovery rules.
pub fn parse(markup: &str) -> Node {
    let mut builder = TreeBuilder::new();
    for token in tokenize(markup) {
        match token {
            Token::Text(text) => builder.add_text(text),
            Token::Tag(raw) => builder.add_tag(&raw),
        }
    }
    builder.finish()
}

// Nodes live in a flat arena and refer to each other by index; the open
// stack holds arena indices of not-yet-closed elements, top = innermost.
// Children are attached to their parent when the element is closed (or at
// finish), which preserves document order relative to sibling text.
enum ArenaNode {
    Text {
        text: String,
    },
    Element {
        name: String,
        attributes: HashMap<String, String>,
        children: Vec<usize>,
    },
}

struct TreeBuilder {
    arena: Vec<ArenaNode>,
    open: Vec<usize>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            arena: Vec::new(),
            open: Vec::new(),
        }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        let index = self.arena.len();
        self.arena.push(node);
        index
    }

    fn attach(&mut self, parent: usize, child: usize) {
        match &mut self.arena[parent] {
            ArenaNode::Element { children, .. } => children.push(child),
            ArenaNode::Text { .. } => unreachable!("text nodes are never on the open stack"),
        }
    }

    // Content arriving before any element implicitly opens the `html` root,
    // so that every document ends up rooted the same way.
    fn ensure_root(&mut self) {
        if self.open.is_empty() {
            let index = self.push(ArenaNode::Element {
                name: "html".to_string(),
                attributes: HashMap::new(),
                children: Vec::new(),
            });
            self.open.push(index);
        }
    }

    fn add_text(&mut self, text: String) {
        if text.chars().all(char::is_whitespace) {
            return;
        }
        self.ensure_root();
        let Some(&parent) = self.open.last() else {
            unreachable!("ensure_root leaves the stack non-empty");
        };
        let index = self.push(ArenaNode::Text { text });
        self.attach(parent, index);
    }

    fn add_tag(&mut self, raw: &str) {
        let Some((name, attributes)) = split_tag(raw) else {
            return;
        };
        if name.starts_with('!') {
            // Comment or doctype: discarded, stack untouched.
            return;
        }
        if name.starts_with('/') {
            // The outermost element is only ever closed by finish(); a close
            // with nothing else open is ignored.
            if self.open.len() <= 1 {
                return;
            }
            if let Some(index) = self.open.pop()
                && let Some(&parent) = self.open.last()
            {
                self.attach(parent, index);
            }
            return;
        }
        if is_void_tag(&name) {
            self.ensure_root();
            let Some(&parent) = self.open.last() else {
                unreachable!("ensure_root leaves the stack non-empty");
            };
            let index = self.push(ArenaNode::Element {
                name,
                attributes,
                children: Vec::new(),
            });
            self.attach(parent, index);
            return;
        }
        if name != "html" {
            self.ensure_root();
        }
        let index = self.push(ArenaNode::Element {
            name,
            attributes,
            children: Vec::new(),
        });
        self.open.push(index);
    }

    fn finish(mut self) -> Node {
        if self.open.is_empty() {
            // Nothing ever opened the root (empty input, comments only,
            // stray closes); replay the open logic for `html`.
            self.add_tag("html");
        }
        while self.open.len() > 1 {
            if let Some(index) = self.open.pop()
                && let Some(&parent) = self.open.last()
            {
                self.attach(parent, index);
            }
        }
        let root = self
            .open
            .pop()
            .expect("tree builder always ends with one open element");
        self.into_node(root)
    }

    // Iterative post-order over the arena: when a node is seen the second
    // time all of its descendants are already on `built`, and its direct
    // children are the last `child_count` entries in original order.
    fn into_node(mut self, root: usize) -> Node {
        let mut built: Vec<Node> = Vec::with_capacity(self.arena.len());
        let mut stack: Vec<(usize, bool)> = vec![(root, false)];

        while let Some((index, visited)) = stack.pop() {
            if !visited {
                stack.push((index, true));
                if let ArenaNode::Element { children, .. } = &self.arena[index] {
                    // Reverse push so children are visited in original order.
                    for &child in children.iter().rev() {
                        stack.push((child, false));
                    }
                }
                continue;
            }

            let node = match &mut self.arena[index] {
                ArenaNode::Text { text } => Node::Text {
                    text: std::mem::take(text),
                },
                ArenaNode::Element {
                    name,
                    attributes,
                    children,
                } => {
                    let child_count = children.len();
                    children.clear();
                    let mut taken = Vec::with_capacity(child_count);
                    for _ in 0..child_count {
                        taken.push(built.pop().expect("children are built before their parent"));
                    }
                    taken.reverse();
                    Node::Element {
                        name: std::mem::take(name),
                        attributes: std::mem::take(attributes),
                        children: taken,
                    }
                }
            };
            built.push(node);
        }

        debug_assert_eq!(built.len(), 1, "post-order build leaves exactly the root");
        built.pop().expect("root node built")
    }
}

// Splits raw tag text into a lower-cased name and its attribute map.
// Returns None for an empty tag body (`<>`).
fn split_tag(raw: &str) -> Option<(String, HashMap<String, String>)> {
    let mut parts = raw.split_whitespace();
    let name = parts.next()?.to_ascii_lowercase();
    let mut attributes = HashMap::new();
    for part in parts {
        if let Some((key, value)) = part.split_once('=') {
            attributes.insert(key.to_ascii_lowercase(), unquote(value).to_string());
        } else {
            attributes.insert(part.to_ascii_lowercase(), String::new());
        }
    }
    Some((name, attributes))
}

// Strips one pair of quotes when both ends carry the same quote character.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if value.len() > 2 && (bytes[0] == b'\'' || bytes[0] == b'"') && bytes[value.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element<'a>(node: &'a Node, name: &str) -> &'a Node {
        assert!(
            node.is_element_named(name),
            "expected <{name}>, got: {node:?}"
        );
        node
    }

    #[test]
    fn parse_roots_simple_document_at_html() {
        let root = parse("<p>a</p>");
        let html = element(&root, "html");
        let p = element(&html.children()[0], "p");
        assert_eq!(
            p.children(),
            &[Node::Text {
                text: "a".to_string()
            }]
        );
    }

    #[test]
    fn parse_keeps_bare_text_under_implicit_root() {
        let root = parse("just words, no markup");
        let html = element(&root, "html");
        assert_eq!(
            html.children(),
            &[Node::Text {
                text: "just words, no markup".to_string()
            }]
        );
    }

    #[test]
    fn parse_synthesizes_html_root_for_empty_input() {
        let root = parse("");
        assert!(root.is_element_named("html"), "got: {root:?}");
        assert!(root.children().is_empty());
    }

    #[test]
    fn parse_does_not_double_wrap_explicit_html() {
        let root = parse("<html><p>a</p></html>");
        let html = element(&root, "html");
        assert_eq!(html.children().len(), 1, "got: {html:?}");
        assert!(html.children()[0].is_element_named("p"));
    }

    #[test]
    fn parse_closes_unclosed_elements_innermost_first() {
        let root = parse("<html><body><div>deep");
        let body = element(&root.children()[0], "body");
        let div = element(&body.children()[0], "div");
        assert_eq!(
            div.children(),
            &[Node::Text {
                text: "deep".to_string()
            }]
        );
    }

    #[test]
    fn parse_misnested_close_pops_stack_top() {
        // </b> closes the innermost open element (the <i>), so the trailing
        // text lands back inside <b>; stack order wins over tag names.
        let root = parse("<b>bold<i>both</b>only italic</i>");
        let b = element(&element(&root, "html").children()[0], "b");
        assert_eq!(b.children().len(), 3, "got: {b:?}");
        assert_eq!(
            b.children()[0],
            Node::Text {
                text: "bold".to_string()
            }
        );
        let i = element(&b.children()[1], "i");
        assert_eq!(
            i.children(),
            &[Node::Text {
                text: "both".to_string()
            }]
        );
        assert_eq!(
            b.children()[2],
            Node::Text {
                text: "only italic".to_string()
            }
        );
    }

    #[test]
    fn parse_extra_close_tags_are_ignored() {
        let root = parse("<p>a</p></p></div>");
        let html = element(&root, "html");
        assert_eq!(html.children().len(), 1, "got: {html:?}");
        let p = element(&html.children()[0], "p");
        assert_eq!(p.children().len(), 1);
    }

    #[test]
    fn parse_void_element_is_not_pushed() {
        let root = parse("<img src='x'>after");
        let html = element(&root, "html");
        assert_eq!(html.children().len(), 2, "got: {html:?}");
        let img = element(&html.children()[0], "img");
        assert!(img.children().is_empty());
        assert_eq!(img.attr("src"), Some("x"));
        assert_eq!(
            html.children()[1],
            Node::Text {
                text: "after".to_string()
            },
            "text after a void element is its sibling, not its child"
        );
    }

    #[test]
    fn parse_discards_comments_and_doctype() {
        let root = parse("<!DOCTYPE html><html><!-- note -->x</html>");
        let html = element(&root, "html");
        assert_eq!(
            html.children(),
            &[Node::Text {
                text: "x".to_string()
            }]
        );
    }

    #[test]
    fn parse_drops_whitespace_only_text() {
        let root = parse("<html>  \n\t  <p>a</p>  \n  </html>");
        let html = element(&root, "html");
        assert_eq!(html.children().len(), 1, "got: {html:?}");
        assert!(html.children()[0].is_element_named("p"));
    }

    #[test]
    fn parse_ignores_empty_tag() {
        let root = parse("<p><>a</p>");
        let p = element(&element(&root, "html").children()[0], "p");
        assert_eq!(
            p.children(),
            &[Node::Text {
                text: "a".to_string()
            }]
        );
    }

    #[test]
    fn parse_deep_nesting_does_not_overflow() {
        let depth = 10_000;
        let mut input = String::with_capacity(depth * 5);
        input.push_str("<html>");
        for _ in 0..depth {
            input.push_str("<div>");
        }
        let root = parse(&input);
        let mut current = &element(&root, "html").children()[0];
        let mut seen = 0;
        while let Node::Element { name, children, .. } = current {
            assert_eq!(name, "div");
            seen += 1;
            match children.first() {
                Some(child) => current = child,
                None => break,
            }
        }
        assert_eq!(seen, depth);
    }

    #[test]
    fn attributes_split_on_first_equals_only() {
        let root = parse("<a href=\"a=b\">x</a>");
        let a = element(&element(&root, "html").children()[0], "a");
        assert_eq!(a.attr("href"), Some("a=b"));
    }

    #[test]
    fn attributes_without_value_are_boolean() {
        let root = parse("<input disabled>x");
        let html = element(&root, "html");
        let input = element(&html.children()[0], "input");
        assert_eq!(input.attr("disabled"), Some(""));
    }

    #[test]
    fn attribute_names_are_lowercased() {
        let root = parse("<a HREF=x CLASS='y'>t</a>");
        let a = element(&element(&root, "html").children()[0], "a");
        assert_eq!(a.attr("href"), Some("x"));
        assert_eq!(a.attr("class"), Some("y"));
    }

    #[test]
    fn attribute_quotes_require_a_matching_pair() {
        let root = parse("<a one='x' two=\"y\" three='z\" four='q>t</a>");
        let a = element(&element(&root, "html").children()[0], "a");
        assert_eq!(a.attr("one"), Some("x"));
        assert_eq!(a.attr("two"), Some("y"));
        assert_eq!(a.attr("three"), Some("'z\""), "mismatched quotes stay put");
        assert_eq!(a.attr("four"), Some("'q"), "lone leading quote stays put");
    }

    #[test]
    fn tag_names_are_lowercased() {
        let root = parse("<DIV><P>a</P></DIV>");
        let div = element(&element(&root, "html").children()[0], "div");
        assert!(div.children()[0].is_element_named("p"));
    }
}
