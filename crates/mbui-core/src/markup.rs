//! Compact XML rendering of descriptor subtrees.
//!
//! Output has no indentation or line breaks, attributes keep their source
//! order and runs of whitespace in character data collapse to one space.

use crate::ast::{DescriptorTree, NodeId, NodeKind};

/// Render the subtree rooted at `id`.
pub fn render(tree: &DescriptorTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

/// Render only the start tag of an element, for quoting it in diagnostics.
pub fn render_start_tag(tree: &DescriptorTree, id: NodeId) -> String {
    let Some(node) = tree.node(id) else {
        return String::new();
    };
    let mut out = String::from("<");
    out.push_str(&node.name);
    write_attributes(node, &mut out);
    out.push_str(if node.children.is_empty() { " />" } else { ">" });
    out
}

fn write_attributes(node: &crate::ast::Node, out: &mut String) {
    for (name, value) in &node.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attribute(value));
        out.push('"');
    }
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Subtrees are written with an explicit work list, so depth is bounded by
/// memory rather than by the call stack.
fn write_node(tree: &DescriptorTree, id: NodeId, out: &mut String) {
    let mut steps = vec![Step::Open(id)];
    while let Some(step) = steps.pop() {
        match step {
            Step::Open(id) => {
                let Some(node) = tree.node(id) else {
                    continue;
                };
                if node.kind == NodeKind::Text {
                    if let Some(text) = &node.text {
                        out.push_str(&escape_text(&normalize_whitespace(text)));
                    }
                    continue;
                }

                out.push('<');
                out.push_str(&node.name);
                write_attributes(node, out);
                if node.children.is_empty() {
                    out.push_str(" />");
                    continue;
                }
                out.push('>');
                steps.push(Step::Close(id));
                steps.extend(node.children.iter().rev().map(|&child| Step::Open(child)));
            }
            Step::Close(id) => {
                if let Some(node) = tree.node(id) {
                    out.push_str("</");
                    out.push_str(&node.name);
                    out.push('>');
                }
            }
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape character data.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape an attribute value for a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#xA;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;
    use indexmap::IndexMap;

    #[test]
    fn test_render_nested_markup() {
        let mut tree = DescriptorTree::new();
        let mut attrs = IndexMap::new();
        attrs.insert("class".to_string(), "intro".to_string());
        let div = tree.add_element(None, "div", attrs, Span::default());
        let h1 = tree.add_element(Some(div), "h1", IndexMap::new(), Span::default());
        tree.add_text(h1, "  Data\n   Sources ", Span::default());
        tree.add_element(Some(div), "hr", IndexMap::new(), Span::default());

        assert_eq!(
            render(&tree, div),
            r#"<div class="intro"><h1>Data Sources</h1><hr /></div>"#
        );
    }

    #[test]
    fn test_render_start_tag_only() {
        let mut tree = DescriptorTree::new();
        let mut attrs = IndexMap::new();
        attrs.insert("id".to_string(), "ds".to_string());
        let item = tree.add_element(None, "item", attrs, Span::default());
        tree.add_element(Some(item), "p", IndexMap::new(), Span::default());

        assert_eq!(render_start_tag(&tree, item), r#"<item id="ds">"#);
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attribute(r#"say "hi""#), "say &quot;hi&quot;");
    }

    #[test]
    fn test_render_deep_subtree() {
        let mut tree = DescriptorTree::new();
        let root = tree.add_element(None, "div", IndexMap::new(), Span::default());
        let mut parent = root;
        for _ in 0..50_000 {
            parent = tree.add_element(Some(parent), "div", IndexMap::new(), Span::default());
        }
        tree.add_text(parent, "x", Span::default());

        let markup = render(&tree, root);
        assert!(markup.starts_with("<div><div>"));
        assert!(markup.contains("<div>x</div>"));
        assert_eq!(markup.matches("</div>").count(), 50_001);
    }
}
