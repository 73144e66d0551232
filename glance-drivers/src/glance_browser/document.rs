//! The document-access contract and the values that cross it.
//!
//! Everything the core knows about a page arrives through [`DocumentAccess`]:
//! a raw render tree to classify, viewport geometry, a ready-state probe, and
//! a small set of input primitives. Coordinates handed to the input
//! primitives are viewport-relative (client) coordinates.
use async_trait::async_trait;
use glance_common::GlanceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index of a node inside [`RenderTree::nodes`].
pub type NodeKey = usize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// The subset of computed style the extractor looks at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: f64,
    pub cursor: String,
    pub position: String,
    /// `None` for `auto`.
    pub z_index: Option<i64>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".into(),
            visibility: "visible".into(),
            opacity: 1.0,
            cursor: "auto".into(),
            position: "static".into(),
            z_index: None,
        }
    }
}

/// One element of the rendered document, as reported by the browser.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderNode {
    /// Lower-case tag name.
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Concatenated direct text-node children.
    pub own_text: String,
    /// Bounding box relative to the viewport.
    pub rect: Rect,
    pub style: ComputedStyle,
    pub has_click_handler: bool,
    pub disabled: bool,
    pub content_editable: bool,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
}

impl RenderNode {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub content_width: f64,
    pub content_height: f64,
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn at_top(&self) -> bool {
        self.scroll_y <= 0.5
    }

    pub fn at_bottom(&self) -> bool {
        self.scroll_y + self.height >= self.content_height - 1.0
    }

    /// Whether a client point lies inside the visible area.
    pub fn contains_client(&self, p: Point) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// Convert a page-relative point into client coordinates.
    pub fn to_client(&self, page: Point) -> Point {
        page.offset(-self.scroll_x, -self.scroll_y)
    }
}

/// Arena snapshot of the rendered document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderTree {
    pub nodes: Vec<RenderNode>,
    pub root: NodeKey,
    pub viewport: Viewport,
    pub location: String,
}

impl RenderTree {
    pub fn node(&self, key: NodeKey) -> Option<&RenderNode> {
        self.nodes.get(key)
    }

    /// Walk the parent chain of `key`, nearest ancestor first.
    pub fn ancestors(&self, key: NodeKey) -> impl Iterator<Item = (NodeKey, &RenderNode)> {
        let mut cur = self.node(key).and_then(|n| n.parent);
        let mut guard = self.nodes.len();
        std::iter::from_fn(move || {
            let k = cur?;
            if guard == 0 {
                return None;
            }
            guard -= 1;
            let node = self.node(k)?;
            cur = node.parent;
            Some((k, node))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// The topmost element under a point at dispatch time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTarget {
    pub tag: String,
    pub id: Option<String>,
    pub class: Option<String>,
    pub is_form_control: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Point),
    Down(Point),
    Up(Point),
    Wheel { at: Point, delta_x: f64, delta_y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Idle,
    Pressed,
}

/// How a selector's element accepts text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tag", rename_all = "snake_case")]
pub enum FieldKind {
    /// `input` or `textarea`.
    TextEntry,
    ContentEditable,
    /// Any other element; carries its lower-case tag.
    Other(String),
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Press,
    Up,
}

impl KeyPhase {
    pub fn event_name(self) -> &'static str {
        match self {
            KeyPhase::Down => "keydown",
            KeyPhase::Press => "keypress",
            KeyPhase::Up => "keyup",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntheticEvent {
    Input,
    Change,
    Key { phase: KeyPhase, key: String },
}

/// Editing commands for content-editable hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    SelectAll,
    Delete,
    InsertText(String),
    InsertParagraph,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionQuery {
    Label(String),
    Value(String),
    Index(usize),
}

/// A rendered option-like node (`li`, `[role=option]`, `option`, `.dropdown-item`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionNode {
    pub text: String,
    pub value: Option<String>,
    /// Client coordinates of the node's centre.
    pub center: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollOp {
    By { dx: f64, dy: f64 },
    To { x: f64, y: f64 },
    ToBottom,
    /// Centre the given page-relative point in the viewport.
    IntoView(Point),
}

#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    #[error("Could not start a WebDriver session: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    #[error("Invalid WebDriver endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Unexpected script result: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Element not found with selector {0}")]
    MissingElement(String),
}

impl From<DriverError> for GlanceError {
    fn from(err: DriverError) -> Self {
        GlanceError::Driver(err.to_string())
    }
}

/// Async access to one live document.
#[async_trait]
pub trait DocumentAccess: Send + Sync {
    /// Capture the current render tree, viewport and location.
    async fn render_tree(&self) -> Result<RenderTree, DriverError>;

    async fn viewport(&self) -> Result<Viewport, DriverError>;

    async fn ready_state(&self) -> Result<ReadyState, DriverError>;

    /// Topmost element at a client point, if any.
    async fn hit_test(&self, at: Point) -> Result<Option<HitTarget>, DriverError>;

    async fn dispatch_pointer(&self, event: PointerEvent) -> Result<(), DriverError>;

    /// Programmatic click on whatever lies under `at`.
    async fn click_at(&self, at: Point) -> Result<(), DriverError>;

    async fn focus_at(&self, at: Point) -> Result<(), DriverError>;

    /// Move the visible cursor overlay.
    async fn show_cursor(&self, at: Point, state: CursorState) -> Result<(), DriverError>;

    async fn field_kind(&self, selector: &str) -> Result<FieldKind, DriverError>;

    /// Clear the field, focus it and set `value` through the native value setter.
    async fn set_native_value(&self, selector: &str, value: &str) -> Result<(), DriverError>;

    async fn dispatch_events(
        &self,
        selector: &str,
        events: &[SyntheticEvent],
    ) -> Result<(), DriverError>;

    /// Focus the element and run editing commands against it.
    async fn edit(&self, selector: &str, commands: &[EditCommand]) -> Result<(), DriverError>;

    /// Last-resort plain value assignment.
    async fn assign_value(&self, selector: &str, value: &str) -> Result<(), DriverError>;

    /// Select an option of a native `select`. `Ok(false)` when nothing matched.
    async fn select_native(&self, selector: &str, query: &OptionQuery)
        -> Result<bool, DriverError>;

    async fn option_nodes(&self) -> Result<Vec<OptionNode>, DriverError>;

    async fn scroll(&self, op: ScrollOp) -> Result<(), DriverError>;
}
