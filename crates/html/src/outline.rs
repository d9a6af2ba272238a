use crate::types::Node;

const INDENT_STEP: &str = "  ";
const PREVIEW_CHARS: usize = 40;

/// Renders the tree as indented outline lines, one node per line. Text is
/// previewed with newlines flattened and long runs truncated.
pub fn outline(root: &Node) -> Vec<String> {
    let mut out = Vec::new();
    walk(root, 0, &mut out);
    out
}

fn walk(node: &Node, depth: usize, out: &mut Vec<String>) {
    let mut line = String::with_capacity(depth * INDENT_STEP.len() + 48);
    for _ in 0..depth {
        line.push_str(INDENT_STEP);
    }
    match node {
        Node::Element { name, children, .. } => {
            line.push('<');
            line.push_str(name);
            line.push('>');
            out.push(line);
            for child in children {
                walk(child, depth + 1, out);
            }
        }
        Node::Text { text } => {
            line.push('"');
            push_preview(&mut line, text.trim());
            line.push('"');
            out.push(line);
        }
    }
}

fn push_preview(out: &mut String, text: &str) {
    let mut truncated = false;
    for (i, ch) in text.chars().enumerate() {
        if i == PREVIEW_CHARS {
            truncated = true;
            break;
        }
        out.push(if ch == '\n' { ' ' } else { ch });
    }
    if truncated {
        out.push('…');
    }
}
