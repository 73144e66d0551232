//! Semantic classification of render nodes.
//!
//! Classification is an ordered table of rules; the first rule that returns
//! a type wins. Keep the order in [`RULES`] as the single source of
//! precedence.
use super::SemanticType;
use glance_drivers::{NodeKey, RenderNode, RenderTree};

const FORM_CONTROL_TAGS: [&str; 5] = ["a", "button", "input", "select", "textarea"];
const CONTENT_TAGS: [&str; 5] = ["div", "span", "p", "section", "article"];
const HEADER_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Per-tree facts that need a subtree walk, computed once per extraction.
#[derive(Debug, Clone)]
pub struct TreeFacts {
    control_below: Vec<bool>,
    text_below: Vec<bool>,
}

impl TreeFacts {
    pub fn compute(tree: &RenderTree) -> Self {
        let len = tree.nodes.len();
        let mut control_below = vec![false; len];
        let mut text_below = vec![false; len];

        let order = preorder(tree, tree.root);
        for &key in order.iter().rev() {
            let node = &tree.nodes[key];
            let mut control = false;
            let mut text = !node.own_text.trim().is_empty();
            for &child in &node.children {
                if child >= len {
                    continue;
                }
                control |= control_below[child]
                    || FORM_CONTROL_TAGS.contains(&tree.nodes[child].tag.as_str());
                text |= text_below[child];
            }
            control_below[key] = control;
            text_below[key] = text;
        }

        Self {
            control_below,
            text_below,
        }
    }

    fn has_control_descendant(&self, key: NodeKey) -> bool {
        self.control_below.get(key).copied().unwrap_or(false)
    }

    fn has_text(&self, key: NodeKey) -> bool {
        self.text_below.get(key).copied().unwrap_or(false)
    }
}

/// Reachable keys from `root` in document order, each at most once.
pub(crate) fn preorder(tree: &RenderTree, root: NodeKey) -> Vec<NodeKey> {
    let mut seen = vec![false; tree.nodes.len()];
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(key) = stack.pop() {
        let Some(node) = tree.node(key) else { continue };
        if std::mem::replace(&mut seen[key], true) {
            continue;
        }
        out.push(key);
        stack.extend(node.children.iter().rev().copied());
    }
    out
}

/// A node together with the context its rules need.
pub struct NodeView<'a> {
    pub tree: &'a RenderTree,
    pub key: NodeKey,
    pub node: &'a RenderNode,
    pub facts: &'a TreeFacts,
}

impl<'a> NodeView<'a> {
    fn tag(&self) -> &str {
        &self.node.tag
    }

    fn attr_lower(&self, name: &str) -> Option<String> {
        self.node.attr(name).map(|v| v.trim().to_ascii_lowercase())
    }

    fn pointable(&self) -> bool {
        self.node.style.cursor == "pointer"
    }

    fn has_click_handler(&self) -> bool {
        self.node.has_click_handler || self.node.attributes.contains_key("onclick")
    }

    fn has_class(&self, class: &str) -> bool {
        self.node.classes().any(|c| c == class)
    }

    fn parent_tag(&self) -> Option<&str> {
        self.node
            .parent
            .and_then(|p| self.tree.node(p))
            .map(|p| p.tag.as_str())
    }
}

pub type Rule = fn(&NodeView<'_>) -> Option<SemanticType>;

/// Precedence table, evaluated top to bottom.
pub const RULES: &[(&str, Rule)] = &[
    ("tag", by_tag),
    ("input-type", by_input_type),
    ("role", by_role),
    ("clickable-block", clickable_block),
    ("generic-interactive", generic_interactive),
    ("label", label),
    ("list-item", list_item),
    ("image", image),
    ("header", header),
    ("container", container),
    ("content", content),
];

pub fn classify(view: &NodeView<'_>) -> Option<SemanticType> {
    RULES.iter().find_map(|(_, rule)| rule(view))
}

fn by_tag(v: &NodeView<'_>) -> Option<SemanticType> {
    match v.tag() {
        "a" => Some(SemanticType::Link),
        "button" => Some(SemanticType::Button),
        "select" => Some(SemanticType::Dropdown),
        "textarea" => Some(SemanticType::Textarea),
        _ => None,
    }
}

fn by_input_type(v: &NodeView<'_>) -> Option<SemanticType> {
    if v.tag() != "input" {
        return None;
    }
    let kind = v.attr_lower("type").unwrap_or_default();
    Some(match kind.as_str() {
        "submit" | "button" | "reset" => SemanticType::Button,
        "checkbox" => SemanticType::Checkbox,
        "radio" => SemanticType::Radio,
        _ => SemanticType::Input,
    })
}

fn by_role(v: &NodeView<'_>) -> Option<SemanticType> {
    match v.attr_lower("role")?.as_str() {
        "button" => Some(SemanticType::Button),
        "link" => Some(SemanticType::Link),
        "checkbox" => Some(SemanticType::Checkbox),
        "radio" => Some(SemanticType::Radio),
        "textbox" | "searchbox" => Some(SemanticType::Input),
        "combobox" | "listbox" => Some(SemanticType::Dropdown),
        "tab" => Some(SemanticType::Tab),
        _ => None,
    }
}

fn clickable_block(v: &NodeView<'_>) -> Option<SemanticType> {
    if !matches!(v.tag(), "div" | "span") || !(v.pointable() || v.has_click_handler()) {
        return None;
    }
    if v.attr_lower("aria-haspopup").as_deref() == Some("true") {
        return Some(SemanticType::Dropdown);
    }
    if v.has_class("btn") || v.has_class("button") {
        return Some(SemanticType::Button);
    }
    if v.node.attr("href").is_some() || v.node.attr("url").is_some() {
        return Some(SemanticType::Link);
    }
    Some(SemanticType::Button)
}

fn generic_interactive(v: &NodeView<'_>) -> Option<SemanticType> {
    let focusable = v.node.attr("tabindex").map(str::trim) == Some("0");
    (v.has_click_handler() || focusable || v.pointable()).then_some(SemanticType::Interactive)
}

fn label(v: &NodeView<'_>) -> Option<SemanticType> {
    (v.tag() == "label").then_some(SemanticType::Label)
}

fn list_item(v: &NodeView<'_>) -> Option<SemanticType> {
    (v.tag() == "li" && (v.pointable() || v.has_click_handler())).then_some(SemanticType::ListItem)
}

fn image(v: &NodeView<'_>) -> Option<SemanticType> {
    let linked = v.parent_tag() == Some("a");
    (v.tag() == "img" && (v.pointable() || v.has_click_handler() || linked))
        .then_some(SemanticType::Image)
}

fn header(v: &NodeView<'_>) -> Option<SemanticType> {
    (HEADER_TAGS.contains(&v.tag()) && (v.pointable() || v.has_click_handler()))
        .then_some(SemanticType::Header)
}

fn container(v: &NodeView<'_>) -> Option<SemanticType> {
    v.facts
        .has_control_descendant(v.key)
        .then_some(SemanticType::Container)
}

fn content(v: &NodeView<'_>) -> Option<SemanticType> {
    (CONTENT_TAGS.contains(&v.tag()) && v.facts.has_text(v.key)).then_some(SemanticType::Content)
}
