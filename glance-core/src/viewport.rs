//! Viewport scrolling and boundary detection.
use crate::pointer::VirtualPointer;
use glance_config::ScrollConfig;
use glance_drivers::{pause, DocumentAccess, DriverError, PointerEvent, ScrollOp, Viewport};
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Down,
    Up,
    Top,
    Bottom,
}

impl ScrollDirection {
    /// Case-insensitive, surrounding quotes ignored. Empty input means down.
    pub fn parse(raw: &str) -> Option<Self> {
        match clean_direction(raw).as_str() {
            "" | "down" => Some(Self::Down),
            "up" => Some(Self::Up),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    fn blocked_by(self, boundaries: Boundaries) -> bool {
        match self {
            Self::Down | Self::Bottom => boundaries.at_bottom,
            Self::Up | Self::Top => boundaries.at_top,
        }
    }

    fn done_message(self) -> &'static str {
        match self {
            Self::Down => "Scrolled down",
            Self::Up => "Scrolled up",
            Self::Top => "Scrolled to top",
            Self::Bottom => "Scrolled to bottom",
        }
    }

    fn boundary_message(self) -> &'static str {
        match self {
            Self::Down | Self::Bottom => "Already at the bottom of the page",
            Self::Up | Self::Top => "Already at the top of the page",
        }
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn clean_direction(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

/// Whether the viewport already touches either end of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundaries {
    pub at_top: bool,
    pub at_bottom: bool,
}

impl From<&Viewport> for Boundaries {
    fn from(vp: &Viewport) -> Self {
        Self {
            at_top: vp.at_top(),
            at_bottom: vp.at_bottom(),
        }
    }
}

enum Outcome {
    Moved,
    AtBoundary,
}

/// Scrolls one document with the session pointer.
pub struct ScrollController<'a, D: ?Sized> {
    doc: &'a D,
    pointer: &'a mut VirtualPointer,
    config: &'a ScrollConfig,
}

impl<'a, D: DocumentAccess + ?Sized> ScrollController<'a, D> {
    pub fn new(doc: &'a D, pointer: &'a mut VirtualPointer, config: &'a ScrollConfig) -> Self {
        Self {
            doc,
            pointer,
            config,
        }
    }

    pub async fn boundaries(&self) -> Result<Boundaries, DriverError> {
        let vp = self.doc.viewport().await?;
        Ok(Boundaries::from(&vp))
    }

    /// Scroll by a raw direction string and describe what happened.
    pub async fn scroll(&mut self, raw: &str) -> String {
        let requested = ScrollDirection::parse(raw);
        let direction = requested.unwrap_or(ScrollDirection::Down);

        match self.perform(direction).await {
            Ok(Outcome::AtBoundary) => {
                info!(target: "glance.scroll", %direction, "already at boundary");
                direction.boundary_message().to_string()
            }
            Ok(Outcome::Moved) => {
                info!(target: "glance.scroll", %direction, "scrolled");
                match requested {
                    Some(_) => direction.done_message().to_string(),
                    None => format!(
                        "Invalid direction '{}', defaulted to scrolling down",
                        clean_direction(raw)
                    ),
                }
            }
            Err(err) => {
                warn!(target: "glance.scroll", %direction, error = %err, "scroll failed, using fallback");
                match self.doc.scroll(self.fallback_op(direction)).await {
                    Ok(()) => format!("Emergency scroll fallback used for direction: {direction}"),
                    Err(fallback) => {
                        format!("Error scrolling: {err} - Fallback also failed: {fallback}")
                    }
                }
            }
        }
    }

    async fn perform(&mut self, direction: ScrollDirection) -> Result<Outcome, DriverError> {
        let vp = self.doc.viewport().await?;
        if direction.blocked_by(Boundaries::from(&vp)) {
            return Ok(Outcome::AtBoundary);
        }

        match direction {
            ScrollDirection::Down | ScrollDirection::Up => {
                let at = vp.center();
                self.pointer.glide_to(self.doc, at).await?;
                pause(self.config.pre_scroll_pause_ms).await;

                let delta = match direction {
                    ScrollDirection::Up => -self.config.wheel_delta,
                    _ => self.config.wheel_delta,
                };
                for _ in 0..self.config.wheel_steps {
                    self.doc
                        .dispatch_pointer(PointerEvent::Wheel {
                            at,
                            delta_x: 0.0,
                            delta_y: delta,
                        })
                        .await?;
                    self.pointer
                        .engine()
                        .random_delay(self.config.wheel_pause)
                        .await;
                }
            }
            ScrollDirection::Top => self.doc.scroll(ScrollOp::To { x: 0.0, y: 0.0 }).await?,
            ScrollDirection::Bottom => self.doc.scroll(ScrollOp::ToBottom).await?,
        }
        Ok(Outcome::Moved)
    }

    fn fallback_op(&self, direction: ScrollDirection) -> ScrollOp {
        let delta = self.config.fallback_delta;
        match direction {
            ScrollDirection::Down => ScrollOp::By { dx: 0.0, dy: delta },
            ScrollDirection::Up => ScrollOp::By { dx: 0.0, dy: -delta },
            ScrollDirection::Top => ScrollOp::To { x: 0.0, y: 0.0 },
            ScrollDirection::Bottom => ScrollOp::ToBottom,
        }
    }
}
