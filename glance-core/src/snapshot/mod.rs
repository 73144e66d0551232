//! Document snapshots: the flat, addressable view of a rendered page.
//!
//! A [`Snapshot`] is produced by [`extract`] from a raw
//! [`RenderTree`](glance_drivers::RenderTree). Element ids are indices into
//! [`Snapshot::elements`] and mean nothing outside the generation that
//! produced them.
use glance_drivers::{Point, Viewport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod classify;
mod extract;
pub mod report;
pub mod selector;

pub use classify::classify;
pub use extract::extract;

/// Message returned by `analyze_page` when nothing visible was found.
pub const EMPTY_REPORT: &str = "No visible content found on the page.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Link,
    Button,
    Input,
    Checkbox,
    Radio,
    Dropdown,
    Textarea,
    Tab,
    Label,
    ListItem,
    Image,
    Header,
    Container,
    Content,
    Interactive,
}

impl SemanticType {
    pub fn label(self) -> &'static str {
        match self {
            SemanticType::Link => "link",
            SemanticType::Button => "button",
            SemanticType::Input => "input",
            SemanticType::Checkbox => "checkbox",
            SemanticType::Radio => "radio",
            SemanticType::Dropdown => "dropdown",
            SemanticType::Textarea => "textarea",
            SemanticType::Tab => "tab",
            SemanticType::Label => "label",
            SemanticType::ListItem => "listitem",
            SemanticType::Image => "image",
            SemanticType::Header => "header",
            SemanticType::Container => "container",
            SemanticType::Content => "content",
            SemanticType::Interactive => "interactive",
        }
    }

    /// Types that get an id even when they carry no text. Images only
    /// classify as such when they are clickable.
    pub fn is_actionable(self) -> bool {
        matches!(
            self,
            SemanticType::Image
                | SemanticType::Link
                | SemanticType::Button
                | SemanticType::Input
                | SemanticType::Checkbox
                | SemanticType::Radio
                | SemanticType::Dropdown
                | SemanticType::Textarea
                | SemanticType::Tab
                | SemanticType::Interactive
        )
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Page-relative box of an element at extraction time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub center: Point,
    /// Entirely inside the viewport when the snapshot was taken.
    pub in_viewport: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentInfo {
    pub tag: String,
    pub id: Option<String>,
    pub class: Option<String>,
    /// Cleaned parent text, at most 50 characters.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub id: usize,
    pub tag_kind: String,
    pub semantic_type: SemanticType,
    pub text: String,
    pub geometry: Geometry,
    pub attributes: BTreeMap<String, String>,
    pub css_selector: String,
    pub parent_info: Option<ParentInfo>,
    pub is_disabled: bool,
    pub z_index: i64,
}

impl ElementDescriptor {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// No display text of its own; `text` is only the type label.
    pub fn is_unlabelled(&self) -> bool {
        self.text.trim().is_empty() || self.text == self.semantic_type.label()
    }

    /// The `[id][type]text` token used in reports.
    pub fn token(&self) -> String {
        format!("[{}][{}]{}", self.id, self.semantic_type, self.text)
    }

    /// Equal in everything but the id.
    pub fn same_element(&self, other: &ElementDescriptor) -> bool {
        self.tag_kind == other.tag_kind
            && self.semantic_type == other.semantic_type
            && self.text == other.text
            && self.geometry == other.geometry
            && self.attributes == other.attributes
            && self.css_selector == other.css_selector
            && self.parent_info == other.parent_info
            && self.is_disabled == other.is_disabled
            && self.z_index == other.z_index
    }
}

/// One extraction pass over a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub generation: u64,
    pub location: String,
    pub viewport: Viewport,
    pub content_lines: Vec<String>,
    pub elements: Vec<ElementDescriptor>,
}

impl Snapshot {
    pub fn element(&self, id: usize) -> Option<&ElementDescriptor> {
        self.elements.get(id)
    }

    /// The line-oriented report handed back by `analyze_page`.
    pub fn report(&self) -> String {
        let text = self.content_lines.join("\n");
        let text = text.trim();
        if text.is_empty() {
            EMPTY_REPORT.to_string()
        } else {
            text.to_string()
        }
    }
}

/// Collapse whitespace runs into single spaces and trim.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
