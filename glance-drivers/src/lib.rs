//! Driver layer between the Glance core and a live browser.
//!
//! This crate defines the document-access contract the core is written
//! against, the timing/pointer model used to drive it like an operator would,
//! and a WebDriver-backed implementation of the contract.
//!
//! - [`glance_browser::document::DocumentAccess`]: async contract + value types
//! - [`glance_browser::driver::WebDriverDocument`]: fantoccini implementation
//! - [`glance_browser::behavioral::BehavioralEngine`]: human-like timings and pointer paths
//! - [`glance_browser::scripts`]: in-page scripts used by the WebDriver implementation
pub mod glance_browser;

pub use glance_browser::behavioral::{pause, plan_pointer_path, BehavioralEngine};
pub use glance_browser::document::{
    ComputedStyle, CursorState, DocumentAccess, DriverError, EditCommand, FieldKind, HitTarget,
    KeyPhase, NodeKey, OptionNode, OptionQuery, Point, PointerEvent, ReadyState, Rect,
    RenderNode, RenderTree, ScrollOp, SyntheticEvent, Viewport,
};
pub use glance_browser::driver::WebDriverDocument;
