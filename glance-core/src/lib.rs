//! Perceive, resolve and act over a live web document.
//!
//! - [`snapshot`]: render tree → addressable element list and text report
//! - [`target`]: loose target descriptions (ids, report tokens, JSON, free text)
//! - [`resolve`]: direct id lookup and strict/relaxed scored search
//! - [`interact`]: click, fill and select through the virtual pointer
//! - [`viewport`]: scrolling and boundary detection
//! - [`session`]: [`PageSession`], the string-returning action surface
//!
//! # Examples
//!
//! ```rust
//! use glance_core::{TargetDescriptor, resolve::{resolve, DefaultScorer}};
//! use glance_core::snapshot::extract;
//! use glance_drivers::{Rect, RenderNode, RenderTree, Viewport};
//!
//! let body = RenderNode {
//!     tag: "body".into(),
//!     rect: Rect::new(0.0, 0.0, 800.0, 600.0),
//!     children: vec![1],
//!     ..Default::default()
//! };
//! let button = RenderNode {
//!     tag: "button".into(),
//!     own_text: "Sign in".into(),
//!     rect: Rect::new(300.0, 200.0, 120.0, 32.0),
//!     parent: Some(0),
//!     ..Default::default()
//! };
//! let tree = RenderTree {
//!     nodes: vec![body, button],
//!     root: 0,
//!     viewport: Viewport { width: 800.0, height: 600.0, content_height: 600.0, ..Default::default() },
//!     location: "https://example.test/login".into(),
//! };
//!
//! let snapshot = extract(&tree, 1).unwrap();
//! assert_eq!(snapshot.report(), "[0][button]Sign in");
//!
//! let target = TargetDescriptor::parse("sign in");
//! let element = resolve(&snapshot, &target, &DefaultScorer).unwrap();
//! assert_eq!(element.id, 0);
//! ```
pub mod interact;
pub mod pointer;
pub mod resolve;
pub mod session;
pub mod snapshot;
pub mod target;
pub mod viewport;

pub use resolve::{DefaultScorer, Pass, Scorer};
pub use session::PageSession;
pub use snapshot::{ElementDescriptor, SemanticType, Snapshot};
pub use target::{ActionRequest, RequestError, TargetDescriptor};
pub use viewport::{Boundaries, ScrollDirection};
