//! CSS selectors for descriptors.
//!
//! The short form is preferred. When it would also match another node of
//! the same tree, it is anchored under its parent with `:nth-of-type`.
use glance_drivers::{NodeKey, RenderNode, RenderTree};

const KEY_ATTRIBUTES: [&str; 4] = ["type", "name", "placeholder", "role"];

/// `#id` when the node has an id, otherwise `tag.class1.class2[attr="v"]…`.
pub fn css_selector(node: &RenderNode) -> String {
    if let Some(id) = node.attr("id").filter(|id| !id.is_empty()) {
        return format!("#{}", escape_ident(id));
    }

    let mut selector = node.tag.clone();
    for class in node.classes().take(2) {
        selector.push('.');
        selector.push_str(&escape_ident(class));
    }
    for name in KEY_ATTRIBUTES {
        if let Some(value) = node.attr(name).filter(|v| !v.is_empty()) {
            selector.push_str(&format!("[{name}=\"{}\"]", escape_string(value)));
        }
    }
    selector
}

/// Selector that matches only `key` within `tree`.
pub fn unique_selector(tree: &RenderTree, key: NodeKey) -> String {
    let mut steps = Vec::new();
    let mut cur = key;
    for _ in 0..tree.nodes.len() {
        let Some(node) = tree.node(cur) else { break };
        let short = css_selector(node);
        let parent = node.parent.and_then(|p| tree.node(p).map(|n| (p, n)));
        match parent {
            Some((p, parent)) if !has_id(node) && matching(tree, node) > 1 => {
                steps.push(format!("{short}:nth-of-type({})", nth_of_type(tree, parent, cur)));
                cur = p;
            }
            _ => {
                steps.push(short);
                break;
            }
        }
    }
    steps.reverse();
    steps.join(" > ")
}

fn has_id(node: &RenderNode) -> bool {
    node.attr("id").is_some_and(|id| !id.is_empty())
}

/// Nodes of `tree` the short selector of `node` would match.
fn matching(tree: &RenderTree, node: &RenderNode) -> usize {
    let classes: Vec<&str> = node.classes().take(2).collect();
    let attrs: Vec<(&str, &str)> = KEY_ATTRIBUTES
        .iter()
        .filter_map(|&name| node.attr(name).filter(|v| !v.is_empty()).map(|v| (name, v)))
        .collect();
    tree.nodes
        .iter()
        .filter(|other| {
            other.tag == node.tag
                && classes.iter().all(|c| other.classes().any(|o| o == *c))
                && attrs.iter().all(|(name, v)| other.attr(name) == Some(*v))
        })
        .count()
}

/// 1-based position of `key` among its parent's children with the same tag.
fn nth_of_type(tree: &RenderTree, parent: &RenderNode, key: NodeKey) -> usize {
    let tag = tree.node(key).map(|n| n.tag.as_str()).unwrap_or_default();
    1 + parent
        .children
        .iter()
        .take_while(|&&child| child != key)
        .filter(|&&child| tree.node(child).is_some_and(|n| n.tag == tag))
        .count()
}

/// Escape an identifier the way `CSS.escape` does.
pub fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let chars: Vec<char> = ident.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        let leading_digit = c.is_ascii_digit() && (i == 0 || (i == 1 && chars[0] == '-'));
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\{:x} ", c as u32)),
            _ if leading_digit => out.push_str(&format!("\\{:x} ", c as u32)),
            '-' if i == 0 && chars.len() == 1 => out.push_str("\\-"),
            _ if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => {
                out.push(c)
            }
            _ => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

/// Escape a double-quoted string value; control characters become hex escapes.
fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\u{1}'..='\u{1f}' | '\u{7f}' => out.push_str(&format!("\\{:x} ", c as u32)),
            '\\' | '"' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
