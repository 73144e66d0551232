#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use glance_common::observability::{LogConfig, LogFormat};
use glance_config::InteractionConfig;
use glance_core::PageSession;
use glance_drivers::{
    BehavioralEngine, ComputedStyle, CursorState, DocumentAccess, DriverError, EditCommand,
    FieldKind, HitTarget, NodeKey, OptionNode, OptionQuery, Point, PointerEvent, ReadyState,
    Rect, RenderNode, RenderTree, ScrollOp, SyntheticEvent, Viewport,
};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "glance-tests".to_string(),
            log_dir: Some(std::env::temp_dir().join("glance-tests")),
            emit_stderr: true,
            format: if std::env::var("GLANCE_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        glance_common::observability::init_logging(config).unwrap_or_default()
    });
}

pub const WIDTH: f64 = 1000.0;
pub const HEIGHT: f64 = 800.0;

/// Page-coordinate arena under construction. Node 0 is the body.
pub struct Page {
    nodes: Vec<RenderNode>,
    content_height: f64,
}

impl Page {
    pub fn new(content_height: f64) -> Self {
        let body = RenderNode {
            tag: "body".into(),
            rect: Rect::new(0.0, 0.0, WIDTH, content_height),
            ..Default::default()
        };
        Self {
            nodes: vec![body],
            content_height,
        }
    }

    pub fn add(&mut self, parent: NodeKey, tag: &str, text: &str, rect: Rect) -> NodeKey {
        let key = self.nodes.len();
        self.nodes.push(RenderNode {
            tag: tag.into(),
            own_text: text.into(),
            rect,
            parent: Some(parent),
            ..Default::default()
        });
        self.nodes[parent].children.push(key);
        key
    }

    pub fn attr(&mut self, key: NodeKey, name: &str, value: &str) -> &mut Self {
        self.nodes[key]
            .attributes
            .insert(name.into(), value.into());
        self
    }

    pub fn style(&mut self, key: NodeKey, style: ComputedStyle) -> &mut Self {
        self.nodes[key].style = style;
        self
    }

    pub fn node_mut(&mut self, key: NodeKey) -> &mut RenderNode {
        &mut self.nodes[key]
    }
}

/// Row `n` of a simple vertical layout.
pub fn row(n: usize) -> Rect {
    Rect::new(200.0, 100.0 + n as f64 * 50.0, 160.0, 30.0)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    HitTest(Point),
    Pointer(PointerEvent),
    Cursor(Point, CursorState),
    ClickAt(Point),
    FocusAt(Point),
    SetValue(String, String),
    Events(String, Vec<SyntheticEvent>),
    Edit(String, Vec<EditCommand>),
    Assign(String, String),
    Select(String, OptionQuery),
    Scroll(ScrollOp),
}

#[derive(Default)]
pub struct FakeState {
    pub nodes: Vec<RenderNode>,
    pub content_height: f64,
    pub scroll_y: f64,
    /// Replaces `nodes` on the first scroll, as lazy-loading pages do.
    pub after_scroll: Option<Page>,
    pub log: Vec<Recorded>,
    pub render_calls: usize,
    pub ready_states: VecDeque<ReadyState>,
    pub field_kinds: HashMap<String, FieldKind>,
    /// `(label, value)` pairs of every native select on the page.
    pub native_options: Vec<(String, String)>,
    pub option_nodes: Vec<OptionNode>,
    pub fail_render: bool,
    pub fail_pointer: bool,
    pub fail_scroll: bool,
    pub fail_field: bool,
    pub fail_assign: bool,
    /// Hit tests find nothing, as when an overlay swallows the point.
    pub hit_nothing: bool,
}

/// In-memory document that records every primitive it is asked to run.
pub struct FakeDocument {
    state: Mutex<FakeState>,
}

impl FakeDocument {
    pub fn new(page: Page) -> Self {
        Self {
            state: Mutex::new(FakeState {
                nodes: page.nodes,
                content_height: page.content_height,
                ..Default::default()
            }),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn log(&self) -> Vec<Recorded> {
        self.state().log.clone()
    }

    pub fn pointer_events(&self) -> Vec<PointerEvent> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Pointer(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn scrolls(&self) -> Vec<ScrollOp> {
        self.log()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::Scroll(op) => Some(op),
                _ => None,
            })
            .collect()
    }
}

impl FakeState {
    fn viewport(&self) -> Viewport {
        Viewport {
            width: WIDTH,
            height: HEIGHT,
            scroll_x: 0.0,
            scroll_y: self.scroll_y,
            content_width: WIDTH,
            content_height: self.content_height,
        }
    }

    fn scroll_to(&mut self, y: f64) {
        let max = (self.content_height - HEIGHT).max(0.0);
        self.scroll_y = y.clamp(0.0, max);
        if let Some(page) = self.after_scroll.take() {
            self.nodes = page.nodes;
            self.content_height = page.content_height;
        }
    }

    fn client_rect(&self, node: &RenderNode) -> Rect {
        Rect::new(
            node.rect.x,
            node.rect.y - self.scroll_y,
            node.rect.width,
            node.rect.height,
        )
    }
}

fn disabled(what: &str) -> DriverError {
    DriverError::Script(format!("{what} disabled"))
}

#[async_trait]
impl DocumentAccess for FakeDocument {
    async fn render_tree(&self) -> Result<RenderTree, DriverError> {
        let mut state = self.state();
        state.render_calls += 1;
        if state.fail_render {
            return Err(disabled("render tree"));
        }
        let nodes = state
            .nodes
            .iter()
            .map(|n| RenderNode {
                rect: state.client_rect(n),
                ..n.clone()
            })
            .collect();
        Ok(RenderTree {
            nodes,
            root: 0,
            viewport: state.viewport(),
            location: "https://shop.test/".into(),
        })
    }

    async fn viewport(&self) -> Result<Viewport, DriverError> {
        Ok(self.state().viewport())
    }

    async fn ready_state(&self) -> Result<ReadyState, DriverError> {
        Ok(self
            .state()
            .ready_states
            .pop_front()
            .unwrap_or(ReadyState::Complete))
    }

    async fn hit_test(&self, at: Point) -> Result<Option<HitTarget>, DriverError> {
        let mut state = self.state();
        state.log.push(Recorded::HitTest(at));
        if state.hit_nothing || !state.viewport().contains_client(at) {
            return Ok(None);
        }
        let hit = state
            .nodes
            .iter()
            .rev()
            .find(|n| {
                let r = state.client_rect(n);
                at.x >= r.x && at.x <= r.x + r.width && at.y >= r.y && at.y <= r.y + r.height
            })
            .map(|n| HitTarget {
                tag: n.tag.clone(),
                id: n.attr("id").map(str::to_string),
                class: n.attr("class").map(str::to_string),
                is_form_control: matches!(n.tag.as_str(), "input" | "select" | "textarea"),
            });
        Ok(hit)
    }

    async fn dispatch_pointer(&self, event: PointerEvent) -> Result<(), DriverError> {
        let mut state = self.state();
        if state.fail_pointer {
            return Err(disabled("pointer dispatch"));
        }
        state.log.push(Recorded::Pointer(event));
        if let PointerEvent::Wheel { delta_y, .. } = event {
            let y = state.scroll_y + delta_y;
            state.scroll_to(y);
        }
        Ok(())
    }

    async fn click_at(&self, at: Point) -> Result<(), DriverError> {
        self.state().log.push(Recorded::ClickAt(at));
        Ok(())
    }

    async fn focus_at(&self, at: Point) -> Result<(), DriverError> {
        self.state().log.push(Recorded::FocusAt(at));
        Ok(())
    }

    async fn show_cursor(&self, at: Point, cursor: CursorState) -> Result<(), DriverError> {
        self.state().log.push(Recorded::Cursor(at, cursor));
        Ok(())
    }

    async fn field_kind(&self, selector: &str) -> Result<FieldKind, DriverError> {
        let state = self.state();
        if state.fail_field {
            return Err(disabled("field access"));
        }
        Ok(state
            .field_kinds
            .get(selector)
            .cloned()
            .unwrap_or(FieldKind::TextEntry))
    }

    async fn set_native_value(&self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.state()
            .log
            .push(Recorded::SetValue(selector.into(), value.into()));
        Ok(())
    }

    async fn dispatch_events(
        &self,
        selector: &str,
        events: &[SyntheticEvent],
    ) -> Result<(), DriverError> {
        self.state()
            .log
            .push(Recorded::Events(selector.into(), events.to_vec()));
        Ok(())
    }

    async fn edit(&self, selector: &str, commands: &[EditCommand]) -> Result<(), DriverError> {
        self.state()
            .log
            .push(Recorded::Edit(selector.into(), commands.to_vec()));
        Ok(())
    }

    async fn assign_value(&self, selector: &str, value: &str) -> Result<(), DriverError> {
        let mut state = self.state();
        if state.fail_assign {
            return Err(disabled("value assignment"));
        }
        state
            .log
            .push(Recorded::Assign(selector.into(), value.into()));
        Ok(())
    }

    async fn select_native(
        &self,
        selector: &str,
        query: &OptionQuery,
    ) -> Result<bool, DriverError> {
        let mut state = self.state();
        state
            .log
            .push(Recorded::Select(selector.into(), query.clone()));
        let options = &state.native_options;
        Ok(match query {
            OptionQuery::Label(label) => options.iter().any(|(l, _)| l == label),
            OptionQuery::Value(value) => options.iter().any(|(_, v)| v == value),
            OptionQuery::Index(i) => *i < options.len(),
        })
    }

    async fn option_nodes(&self) -> Result<Vec<OptionNode>, DriverError> {
        Ok(self.state().option_nodes.clone())
    }

    async fn scroll(&self, op: ScrollOp) -> Result<(), DriverError> {
        let mut state = self.state();
        if state.fail_scroll {
            return Err(disabled("scrolling"));
        }
        state.log.push(Recorded::Scroll(op));
        let y = match op {
            ScrollOp::By { dy, .. } => state.scroll_y + dy,
            ScrollOp::To { y, .. } => y,
            ScrollOp::ToBottom => state.content_height,
            ScrollOp::IntoView(p) => p.y - HEIGHT / 2.0,
        };
        state.scroll_to(y);
        Ok(())
    }
}

/// Session over `doc` with zero delays and a fixed seed.
pub fn session(doc: FakeDocument) -> PageSession<FakeDocument> {
    init_test_tracing();
    PageSession::with_engine(doc, InteractionConfig::instant(), BehavioralEngine::seeded(7))
}
