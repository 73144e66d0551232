//! The action surface: one session per live document.
use crate::interact::Executor;
use crate::pointer::VirtualPointer;
use crate::resolve::{resolve, search, DefaultScorer, Scorer};
use crate::snapshot::{extract, ElementDescriptor, Snapshot};
use crate::target::{ActionRequest, TargetDescriptor};
use crate::viewport::{Boundaries, ScrollController, ScrollDirection};
use glance_common::{GlanceError, Operation, Result};
use glance_config::{GlanceConfig, InteractionConfig};
use glance_drivers::{
    pause, BehavioralEngine, DocumentAccess, Point, ReadyState, WebDriverDocument,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Perceive, resolve and act on one document.
///
/// The session owns the latest [`Snapshot`] and the virtual pointer. Both
/// are replaced, never merged, and every action takes `&mut self`, so at
/// most one action runs against a session at a time.
pub struct PageSession<D> {
    id: Uuid,
    doc: D,
    config: InteractionConfig,
    pointer: VirtualPointer,
    scorer: Box<dyn Scorer>,
    snapshot: Option<Snapshot>,
    generation: u64,
}

impl<D: DocumentAccess> PageSession<D> {
    pub fn new(doc: D, config: InteractionConfig) -> Self {
        Self::with_engine(doc, config, BehavioralEngine::new())
    }

    /// Session with a caller-supplied engine, typically a seeded one.
    pub fn with_engine(doc: D, config: InteractionConfig, engine: BehavioralEngine) -> Self {
        let pointer = VirtualPointer::new(engine, config.pointer.clone());
        let id = Uuid::new_v4();
        debug!(target: "glance.session", %id, "session created");
        Self {
            id,
            doc,
            config,
            pointer,
            scorer: Box::new(DefaultScorer),
            snapshot: None,
            generation: 0,
        }
    }

    pub fn with_scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// The snapshot ids currently refer to, if any.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn pointer_position(&self) -> Point {
        self.pointer.position()
    }

    /// Extract a fresh snapshot, replacing the previous one. On failure the
    /// cached snapshot is dropped.
    pub async fn refresh(&mut self) -> Result<&Snapshot> {
        self.generation += 1;
        let extracted = match self.doc.render_tree().await {
            Ok(tree) => extract(&tree, self.generation),
            Err(err) => Err(err.into()),
        };
        match extracted {
            Ok(snapshot) => Ok(&*self.snapshot.insert(snapshot)),
            Err(err) => {
                self.snapshot = None;
                warn!(target: "glance.snapshot", session = %self.id, error = %err, "extraction failed");
                Err(err)
            }
        }
    }

    /// Extract the page and render the line-oriented report.
    pub async fn analyze_page(&mut self) -> String {
        match self.refresh().await {
            Ok(snapshot) => {
                info!(
                    target: "glance.snapshot",
                    generation = snapshot.generation,
                    elements = snapshot.elements.len(),
                    "page analyzed"
                );
                snapshot.report()
            }
            Err(err) => Operation::AnalyzePage.report(&err),
        }
    }

    pub async fn click(&mut self, target: &str) -> String {
        self.click_target(&TargetDescriptor::parse(target)).await
    }

    pub async fn click_target(&mut self, target: &TargetDescriptor) -> String {
        let outcome = match self.locate(target, Operation::Click).await {
            Ok(element) => self.executor().click(&element).await,
            Err(err) => Err(err),
        };
        finish(Operation::Click, outcome)
    }

    pub async fn fill_input(&mut self, target: &str, value: &str) -> String {
        self.fill_target(&TargetDescriptor::parse(target), value).await
    }

    pub async fn fill_target(&mut self, target: &TargetDescriptor, value: &str) -> String {
        let outcome = match self.locate(target, Operation::FillInput).await {
            Ok(element) => self.executor().fill(&element, value).await,
            Err(err) => Err(err),
        };
        finish(Operation::FillInput, outcome)
    }

    /// `fill_input` driven by a `{"id"|"type"|"text", "value"}` JSON request.
    pub async fn fill_input_request(&mut self, request: &str) -> String {
        match ActionRequest::parse(request) {
            Ok(req) => self.fill_target(&req.target, &req.value).await,
            Err(err) => err.to_string(),
        }
    }

    pub async fn select_option(&mut self, target: &str, value: &str) -> String {
        self.select_target(&TargetDescriptor::parse(target), value)
            .await
    }

    pub async fn select_target(&mut self, target: &TargetDescriptor, value: &str) -> String {
        let outcome = match self.locate(target, Operation::SelectOption).await {
            Ok(element) => self.executor().select(&element, value).await,
            Err(err) => Err(err),
        };
        finish(Operation::SelectOption, outcome)
    }

    /// `select_option` driven by a `{"id"|"type"|"text", "value"}` JSON request.
    pub async fn select_option_request(&mut self, request: &str) -> String {
        match ActionRequest::parse(request) {
            Ok(req) => self.select_target(&req.target, &req.value).await,
            Err(err) => err.to_string(),
        }
    }

    pub async fn scroll(&mut self, direction: &str) -> String {
        ScrollController::new(&self.doc, &mut self.pointer, &self.config.scroll)
            .scroll(direction)
            .await
    }

    pub async fn boundaries(&mut self) -> Result<Boundaries> {
        let boundaries = ScrollController::new(&self.doc, &mut self.pointer, &self.config.scroll)
            .boundaries()
            .await?;
        Ok(boundaries)
    }

    fn executor(&mut self) -> Executor<'_, D> {
        Executor::new(&self.doc, &mut self.pointer, &self.config)
    }

    /// Resolve against the cached snapshot, then once more after scrolling
    /// one unit down and re-extracting.
    async fn locate(&mut self, target: &TargetDescriptor, op: Operation) -> Result<ElementDescriptor> {
        if self.snapshot.is_none() {
            self.refresh().await?;
        }
        if let Some(snapshot) = &self.snapshot {
            if let Some(element) = resolve(snapshot, target, self.scorer.as_ref()) {
                return Ok(element.clone());
            }
        }

        info!(target: "glance.resolve", session = %self.id, %target, "no match, scrolling and rescanning");
        let scrolled = self.scroll(ScrollDirection::Down.label()).await;
        debug!(target: "glance.resolve", outcome = %scrolled, "retry scroll");
        pause(self.config.settle.after_retry_scroll_ms).await;
        self.wait_until_ready().await;

        self.refresh().await?;
        self.snapshot
            .as_ref()
            .and_then(|snapshot| search(snapshot, target, self.scorer.as_ref()))
            .cloned()
            .ok_or_else(|| GlanceError::NotFound {
                subject: op.subject(),
                criteria: target.criteria(),
            })
    }

    /// Poll the ready state while the document reports it is still loading.
    async fn wait_until_ready(&self) {
        let settle = &self.config.settle;
        for _ in 0..settle.ready_poll_attempts {
            match self.doc.ready_state().await {
                Ok(ReadyState::Complete) => return,
                Ok(state) => {
                    debug!(target: "glance.resolve", ?state, "waiting for document");
                    pause(settle.ready_poll_ms).await;
                }
                Err(err) => {
                    warn!(target: "glance.resolve", error = %err, "ready state unavailable");
                    return;
                }
            }
        }
    }
}

impl PageSession<WebDriverDocument> {
    /// Open a WebDriver session at the configured endpoint.
    pub async fn connect(config: &GlanceConfig) -> Result<Self> {
        let doc = WebDriverDocument::connect(&config.webdriver).await?;
        Ok(Self::new(doc, config.interaction.clone()))
    }
}

fn finish(op: Operation, outcome: Result<String>) -> String {
    outcome.unwrap_or_else(|err| op.report(&err))
}
