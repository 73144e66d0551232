//! The session's virtual pointer.
use glance_config::PointerConfig;
use glance_drivers::{
    BehavioralEngine, CursorState, DocumentAccess, DriverError, HitTarget, Point,
    PointerEvent,
};
use tracing::{debug, warn};

/// Pointer position and the randomness that drives its movement.
///
/// Positions are client coordinates. The pointer starts at the configured
/// origin and only moves through [`VirtualPointer::glide_to`].
#[derive(Debug)]
pub struct VirtualPointer {
    engine: BehavioralEngine,
    config: PointerConfig,
    position: Point,
}

impl VirtualPointer {
    pub fn new(engine: BehavioralEngine, config: PointerConfig) -> Self {
        let position = Point::new(config.origin_x, config.origin_y);
        Self {
            engine,
            config,
            position,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn engine(&mut self) -> &mut BehavioralEngine {
        &mut self.engine
    }

    /// Move along a curved path to `to`, updating the cursor overlay and
    /// emitting a move event at every step.
    pub async fn glide_to<D>(&mut self, doc: &D, to: Point) -> Result<(), DriverError>
    where
        D: DocumentAccess + ?Sized,
    {
        let path = self.engine.plan_path(self.position, to, &self.config);
        debug!(
            target: "glance.interact",
            from = ?self.position,
            to = ?to,
            steps = path.len(),
            "pointer glide"
        );

        for point in path {
            overlay(doc, point, CursorState::Idle).await;
            doc.dispatch_pointer(PointerEvent::Move(point)).await?;
            self.position = point;

            self.engine.random_delay(self.config.step_delay).await;
            if self.engine.chance(self.config.hesitation_probability) {
                self.engine.random_delay(self.config.hesitation).await;
            }
        }
        self.position = to;
        Ok(())
    }

    /// Press and release at the current position. Returns what was under the
    /// pointer when the button went down; nothing is pressed when the hit
    /// test comes back empty.
    pub async fn press_and_release<D>(&mut self, doc: &D) -> Result<Option<HitTarget>, DriverError>
    where
        D: DocumentAccess + ?Sized,
    {
        let at = self.position;
        let Some(hit) = doc.hit_test(at).await? else {
            return Ok(None);
        };
        overlay(doc, at, CursorState::Pressed).await;
        doc.dispatch_pointer(PointerEvent::Down(at)).await?;
        self.engine.random_delay(self.config.hold).await;
        doc.dispatch_pointer(PointerEvent::Up(at)).await?;
        overlay(doc, at, CursorState::Idle).await;
        Ok(Some(hit))
    }
}

async fn overlay<D: DocumentAccess + ?Sized>(doc: &D, at: Point, state: CursorState) {
    if let Err(err) = doc.show_cursor(at, state).await {
        warn!(target: "glance.interact", error = %err, "cursor overlay update failed");
    }
}
