use super::classify::{classify, NodeView, TreeFacts};
use super::report::{pack, ContentItem};
use super::selector::unique_selector;
use super::{clean_text, ElementDescriptor, Geometry, ParentInfo, SemanticType, Snapshot};
use glance_common::{GlanceError, Result};
use glance_drivers::{NodeKey, RenderNode, RenderTree, Viewport};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

const TEXT_ATTRIBUTES: [&str; 5] = ["placeholder", "name", "aria-label", "title", "alt"];
const KEPT_ATTRIBUTES: [&str; 12] = [
    "id",
    "class",
    "name",
    "type",
    "role",
    "aria-label",
    "href",
    "value",
    "placeholder",
    "title",
    "alt",
    "for",
];
const POPUP_CLASSES: [&str; 8] = [
    "modal",
    "dialog",
    "popup",
    "overlay",
    "pop-up",
    "ant-modal",
    "MuiDialog-root",
    "ReactModal__Content",
];
const POPUP_CLASS_FRAGMENTS: [&str; 4] = ["modal", "dialog", "popup", "overlay"];
const POPUP_MIN_Z_INDEX: i64 = 100;
const PARENT_TEXT_LIMIT: usize = 50;

/// Walk `tree` and build the snapshot for `generation`.
///
/// Main-flow content comes first in document order; popup regions follow,
/// each wrapped in sentinel lines. Popups with no visible content are left
/// out of the report.
pub fn extract(tree: &RenderTree, generation: u64) -> Result<Snapshot> {
    if tree.node(tree.root).is_none() {
        return Err(GlanceError::Extraction(format!(
            "render tree has no root node (root={}, nodes={})",
            tree.root,
            tree.nodes.len()
        )));
    }

    let facts = TreeFacts::compute(tree);
    let popups = find_popups(tree);
    let mut ex = Extractor {
        tree,
        facts: &facts,
        popup_roots: popups.iter().copied().collect(),
        visited: vec![false; tree.nodes.len()],
        items: Vec::new(),
        elements: Vec::new(),
        parent_text: HashMap::new(),
    };

    ex.walk(tree.root);
    let mut reported_popups = 0;
    for root in popups {
        let mark = ex.items.len();
        ex.items.push(ContentItem::PopupStart);
        ex.walk(root);
        if ex.items.len() == mark + 1 {
            ex.items.truncate(mark);
        } else {
            ex.items.push(ContentItem::PopupEnd);
            reported_popups += 1;
        }
    }

    let content_lines = pack(&ex.items);
    debug!(
        target: "glance.snapshot",
        generation,
        elements = ex.elements.len(),
        lines = content_lines.len(),
        popups = reported_popups,
        location = %tree.location,
        "snapshot extracted"
    );

    Ok(Snapshot {
        generation,
        location: tree.location.clone(),
        viewport: tree.viewport,
        content_lines,
        elements: ex.elements,
    })
}

struct Extractor<'a> {
    tree: &'a RenderTree,
    facts: &'a TreeFacts,
    popup_roots: HashSet<NodeKey>,
    visited: Vec<bool>,
    items: Vec<ContentItem>,
    elements: Vec<ElementDescriptor>,
    parent_text: HashMap<NodeKey, String>,
}

impl<'a> Extractor<'a> {
    /// Depth-first, document-order walk from `start`. Popup roots other than
    /// `start` are left for their own pass.
    fn walk(&mut self, start: NodeKey) {
        let mut stack = vec![start];
        while let Some(key) = stack.pop() {
            let Some(node) = self.tree.node(key) else {
                continue;
            };
            if self.visited[key] || (key != start && self.popup_roots.contains(&key)) {
                continue;
            }
            self.visited[key] = true;
            if !is_visible(node) {
                continue;
            }

            self.visit(key, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    fn visit(&mut self, key: NodeKey, node: &'a RenderNode) {
        let own_text = clean_text(&node.own_text);
        let view = NodeView {
            tree: self.tree,
            key,
            node,
            facts: self.facts,
        };

        match classify(&view) {
            Some(semantic_type) => {
                let text = display_text(node, &own_text);
                if text.is_none() && !semantic_type.is_actionable() {
                    return;
                }
                let text = text.unwrap_or_else(|| semantic_type.label().to_string());
                let descriptor = self.describe(key, node, semantic_type, text);
                self.items.push(ContentItem::Element {
                    token: descriptor.token(),
                    redundant: descriptor.is_unlabelled(),
                });
                self.elements.push(descriptor);
            }
            None if own_text.chars().count() > 1 => self.items.push(ContentItem::Text(own_text)),
            None => {}
        }
    }

    fn describe(
        &mut self,
        key: NodeKey,
        node: &RenderNode,
        semantic_type: SemanticType,
        text: String,
    ) -> ElementDescriptor {
        let tree = self.tree;
        let vp = &tree.viewport;
        let rect = node.rect;
        let geometry = Geometry {
            x: rect.x + vp.scroll_x,
            y: rect.y + vp.scroll_y,
            width: rect.width,
            height: rect.height,
            center: vp_page_point(vp, rect.center()),
            in_viewport: rect.x >= 0.0
                && rect.y >= 0.0
                && rect.x + rect.width <= vp.width
                && rect.y + rect.height <= vp.height,
        };

        let attributes: BTreeMap<String, String> = node
            .attributes
            .iter()
            .filter(|(name, _)| KEPT_ATTRIBUTES.contains(&name.as_str()) || name.starts_with("data-"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let parent_info = node.parent.and_then(|p| {
            let parent = tree.node(p)?;
            Some(ParentInfo {
                tag: parent.tag.clone(),
                id: parent.attr("id").filter(|s| !s.is_empty()).map(str::to_string),
                class: parent.attr("class").filter(|s| !s.is_empty()).map(str::to_string),
                text: self.parent_text(p),
            })
        });

        ElementDescriptor {
            id: self.elements.len(),
            tag_kind: node.tag.clone(),
            semantic_type,
            text,
            geometry,
            attributes,
            css_selector: unique_selector(tree, key),
            parent_info,
            is_disabled: node.disabled
                || node.attributes.contains_key("disabled")
                || node.attr("aria-disabled") == Some("true"),
            z_index: node.style.z_index.unwrap_or(0),
        }
    }

    /// First [`PARENT_TEXT_LIMIT`] characters of the cleaned subtree text.
    fn parent_text(&mut self, key: NodeKey) -> String {
        if let Some(text) = self.parent_text.get(&key) {
            return text.clone();
        }

        let mut text = String::new();
        let mut seen = HashSet::new();
        let mut stack = vec![key];
        'walk: while let Some(k) = stack.pop() {
            let Some(node) = self.tree.node(k) else {
                continue;
            };
            if !seen.insert(k) || node.style.display == "none" {
                continue;
            }
            for word in node.own_text.split_whitespace() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(word);
                if text.chars().count() >= PARENT_TEXT_LIMIT {
                    break 'walk;
                }
            }
            stack.extend(node.children.iter().rev().copied());
        }

        let text: String = text.chars().take(PARENT_TEXT_LIMIT).collect();
        self.parent_text.insert(key, text.clone());
        text
    }
}

fn vp_page_point(vp: &Viewport, client: glance_drivers::Point) -> glance_drivers::Point {
    client.offset(vp.scroll_x, vp.scroll_y)
}

fn is_visible(node: &RenderNode) -> bool {
    !node.rect.is_empty()
        && node.style.display != "none"
        && node.style.visibility != "hidden"
        && node.style.opacity > 0.1
}

/// Own text, then the first non-empty text-bearing attribute.
fn display_text(node: &RenderNode, own_text: &str) -> Option<String> {
    if !own_text.is_empty() {
        return Some(own_text.to_string());
    }
    TEXT_ATTRIBUTES
        .iter()
        .filter_map(|name| node.attr(name))
        .map(clean_text)
        .find(|t| !t.is_empty())
}

/// Outermost visible popup roots in document order.
fn find_popups(tree: &RenderTree) -> Vec<NodeKey> {
    let mut roots = Vec::new();
    let mut seen = vec![false; tree.nodes.len()];
    let mut stack = vec![tree.root];
    while let Some(key) = stack.pop() {
        let Some(node) = tree.node(key) else { continue };
        if std::mem::replace(&mut seen[key], true) {
            continue;
        }
        if node.style.display == "none" {
            continue;
        }
        if key != tree.root && is_visible(node) && is_popup(tree, key, node) {
            roots.push(key);
            continue;
        }
        stack.extend(node.children.iter().rev().copied());
    }
    roots
}

fn is_popup(tree: &RenderTree, key: NodeKey, node: &RenderNode) -> bool {
    let attr_is = |name: &str, value: &str| {
        node.attr(name)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
    };
    if attr_is("role", "dialog") || attr_is("aria-modal", "true") || attr_is("data-modal", "true")
    {
        return true;
    }

    let class = node.attr("class").unwrap_or_default();
    if node.classes().any(|c| POPUP_CLASSES.contains(&c))
        || POPUP_CLASS_FRAGMENTS.iter().any(|f| class.contains(f))
    {
        return true;
    }

    is_floating_panel(tree, key, node)
}

/// Positioned above the page and either centred in the viewport or sitting
/// next to a full-viewport backdrop.
fn is_floating_panel(tree: &RenderTree, key: NodeKey, node: &RenderNode) -> bool {
    let vp = &tree.viewport;
    if !matches!(node.style.position.as_str(), "fixed" | "absolute")
        || node.style.z_index.unwrap_or(0) < POPUP_MIN_Z_INDEX
        || covers_viewport(node, vp)
    {
        return false;
    }

    let center = node.rect.center();
    let centred = (center.x - vp.width / 2.0).abs() <= vp.width * 0.1
        && (center.y - vp.height / 2.0).abs() <= vp.height * 0.1;
    if centred {
        return true;
    }

    node.parent
        .and_then(|p| tree.node(p))
        .is_some_and(|parent| {
            parent.children.iter().any(|&sibling| {
                sibling != key
                    && tree.node(sibling).is_some_and(|s| {
                        s.style.position == "fixed" && is_visible(s) && covers_viewport(s, vp)
                    })
            })
        })
}

fn covers_viewport(node: &RenderNode, vp: &Viewport) -> bool {
    node.rect.width >= vp.width * 0.9 && node.rect.height >= vp.height * 0.9
}
