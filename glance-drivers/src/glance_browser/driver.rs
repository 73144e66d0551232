use crate::glance_browser::{
    document::{
        CursorState, DocumentAccess, DriverError, EditCommand, FieldKind, HitTarget, OptionNode,
        OptionQuery, Point, PointerEvent, ReadyState, RenderTree, ScrollOp, SyntheticEvent,
        Viewport,
    },
    scripts,
};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use glance_config::WebDriverConfig;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;
use webdriver::capabilities::Capabilities;

/// Status object returned by the mutating scripts.
#[derive(Debug, Deserialize)]
struct ScriptStatus {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    selected: bool,
}

/// [`DocumentAccess`] over a `fantoccini` WebDriver client.
///
/// All inspection and input goes through in-page scripts, so the same
/// implementation works against any W3C WebDriver endpoint.
pub struct WebDriverDocument {
    client: Client,
}

impl WebDriverDocument {
    /// Open a new browser session on the configured WebDriver endpoint.
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, DriverError> {
        let endpoint = Url::parse(&config.endpoint)?;
        let caps = build_capabilities(config);

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(endpoint.as_str())
            .await?;
        info!(target: "glance.driver", endpoint = %endpoint, headless = config.headless, "webdriver session started");

        Ok(Self { client })
    }

    /// Wrap a client whose session is managed elsewhere.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await?;
        Ok(())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<(), DriverError> {
        self.client.close().await?;
        Ok(())
    }

    async fn run<T: DeserializeOwned>(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<T, DriverError> {
        let value = self.client.execute(script, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn run_status(&self, script: &str, args: Vec<Value>) -> Result<ScriptStatus, DriverError> {
        let status: ScriptStatus = self.run(script, args).await?;
        if status.ok {
            Ok(status)
        } else {
            let message = status.error.unwrap_or_else(|| "script reported failure".into());
            Err(DriverError::Script(message))
        }
    }

    async fn run_on(&self, script: &str, selector: &str, args: Vec<Value>) -> Result<(), DriverError> {
        let mut all = vec![json!(selector)];
        all.extend(args);
        match self.run_status(script, all).await {
            Err(DriverError::Script(msg)) if msg.starts_with("Element not found") => {
                Err(DriverError::MissingElement(selector.to_string()))
            }
            other => other.map(|_| ()),
        }
    }
}

fn build_capabilities(config: &WebDriverConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    let mut args = config.args.clone();
    if config.headless {
        args.push("--headless".into());
        args.push("--disable-gpu".into());
    }

    let mut browser_opts = HashMap::new();
    browser_opts.insert("args".to_string(), json!(args));

    #[cfg(feature = "chromium")]
    caps.insert("goog:chromeOptions".to_string(), json!(browser_opts));
    #[cfg(not(feature = "chromium"))]
    caps.insert("moz:firefoxOptions".to_string(), json!(browser_opts));

    caps
}

fn encode_events(events: &[SyntheticEvent]) -> Value {
    Value::Array(
        events
            .iter()
            .map(|ev| match ev {
                SyntheticEvent::Input => json!({ "type": "input" }),
                SyntheticEvent::Change => json!({ "type": "change" }),
                SyntheticEvent::Key { phase, key } => {
                    json!({ "type": phase.event_name(), "key": key })
                }
            })
            .collect(),
    )
}

fn encode_commands(commands: &[EditCommand]) -> Value {
    Value::Array(
        commands
            .iter()
            .map(|c| match c {
                EditCommand::SelectAll => json!({ "cmd": "selectAll" }),
                EditCommand::Delete => json!({ "cmd": "delete" }),
                EditCommand::InsertText(text) => json!({ "cmd": "insertText", "text": text }),
                EditCommand::InsertParagraph => json!({ "cmd": "insertParagraph" }),
            })
            .collect(),
    )
}

#[async_trait]
impl DocumentAccess for WebDriverDocument {
    async fn render_tree(&self) -> Result<RenderTree, DriverError> {
        let tree: RenderTree = self.run(scripts::RENDER_TREE, vec![]).await?;
        debug!(target: "glance.driver", nodes = tree.nodes.len(), location = %tree.location, "render tree captured");
        Ok(tree)
    }

    async fn viewport(&self) -> Result<Viewport, DriverError> {
        self.run(scripts::VIEWPORT, vec![]).await
    }

    async fn ready_state(&self) -> Result<ReadyState, DriverError> {
        self.run(scripts::READY_STATE, vec![]).await
    }

    async fn hit_test(&self, at: Point) -> Result<Option<HitTarget>, DriverError> {
        self.run(scripts::HIT_TEST, vec![json!(at.x), json!(at.y)])
            .await
    }

    async fn dispatch_pointer(&self, event: PointerEvent) -> Result<(), DriverError> {
        let (kind, at, dx, dy) = match event {
            PointerEvent::Move(p) => ("move", p, 0.0, 0.0),
            PointerEvent::Down(p) => ("down", p, 0.0, 0.0),
            PointerEvent::Up(p) => ("up", p, 0.0, 0.0),
            PointerEvent::Wheel {
                at,
                delta_x,
                delta_y,
            } => ("wheel", at, delta_x, delta_y),
        };
        let args = vec![json!(kind), json!(at.x), json!(at.y), json!(dx), json!(dy)];
        self.run_status(scripts::DISPATCH_POINTER, args).await?;
        Ok(())
    }

    async fn click_at(&self, at: Point) -> Result<(), DriverError> {
        self.run_status(scripts::CLICK_AT, vec![json!(at.x), json!(at.y)])
            .await?;
        Ok(())
    }

    async fn focus_at(&self, at: Point) -> Result<(), DriverError> {
        self.run_status(scripts::FOCUS_AT, vec![json!(at.x), json!(at.y)])
            .await?;
        Ok(())
    }

    async fn show_cursor(&self, at: Point, state: CursorState) -> Result<(), DriverError> {
        let pressed = state == CursorState::Pressed;
        self.run_status(
            scripts::SHOW_CURSOR,
            vec![json!(at.x), json!(at.y), json!(pressed)],
        )
        .await?;
        Ok(())
    }

    async fn field_kind(&self, selector: &str) -> Result<FieldKind, DriverError> {
        self.run(scripts::FIELD_KIND, vec![json!(selector)]).await
    }

    async fn set_native_value(&self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.run_on(scripts::SET_NATIVE_VALUE, selector, vec![json!(value)])
            .await
    }

    async fn dispatch_events(
        &self,
        selector: &str,
        events: &[SyntheticEvent],
    ) -> Result<(), DriverError> {
        self.run_on(scripts::DISPATCH_EVENTS, selector, vec![encode_events(events)])
            .await
    }

    async fn edit(&self, selector: &str, commands: &[EditCommand]) -> Result<(), DriverError> {
        self.run_on(scripts::EDIT, selector, vec![encode_commands(commands)])
            .await
    }

    async fn assign_value(&self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.run_on(scripts::ASSIGN_VALUE, selector, vec![json!(value)])
            .await
    }

    async fn select_native(
        &self,
        selector: &str,
        query: &OptionQuery,
    ) -> Result<bool, DriverError> {
        let (mode, needle) = match query {
            OptionQuery::Label(label) => ("label", json!(label)),
            OptionQuery::Value(value) => ("value", json!(value)),
            OptionQuery::Index(index) => ("index", json!(index)),
        };
        let args = vec![json!(selector), json!(mode), needle];
        match self.run_status(scripts::SELECT_NATIVE, args).await {
            Ok(status) => Ok(status.selected),
            Err(DriverError::Script(msg)) if msg.starts_with("Element not found") => {
                Err(DriverError::MissingElement(selector.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    async fn option_nodes(&self) -> Result<Vec<OptionNode>, DriverError> {
        self.run(scripts::OPTION_NODES, vec![]).await
    }

    async fn scroll(&self, op: ScrollOp) -> Result<(), DriverError> {
        let (kind, x, y) = match op {
            ScrollOp::By { dx, dy } => ("by", dx, dy),
            ScrollOp::To { x, y } => ("to", x, y),
            ScrollOp::ToBottom => ("bottom", 0.0, 0.0),
            ScrollOp::IntoView(p) => ("into_view", p.x, p.y),
        };
        self.run_status(scripts::SCROLL, vec![json!(kind), json!(x), json!(y)])
            .await?;
        Ok(())
    }
}
