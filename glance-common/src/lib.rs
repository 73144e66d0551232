//! Common types and utilities shared across Glance crates.
//!
//! This crate defines the shared error type, the result alias, and the
//! observability helpers used throughout the Glance workspace. It is
//! intentionally lightweight so that every crate can depend on it without
//! introducing heavy transitive costs.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`GlanceError`] and [`Result`]: Shared error handling
//! - [`Operation`]: The public actions, used to prefix failure reports
//!
//! # Examples
//!
//! Rendering an error the way the action surface reports it:
//!
//! ```rust
//! use glance_common::{GlanceError, Operation};
//!
//! let err = GlanceError::Interaction("pointer dispatch failed".into());
//! assert_eq!(
//!     Operation::Click.report(&err),
//!     "Error clicking on element: Interaction error: pointer dispatch failed"
//! );
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// The actions exposed to the calling agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    AnalyzePage,
    Click,
    FillInput,
    SelectOption,
    Scroll,
}

impl Operation {
    /// Prefix used when a failure is turned into an outcome string.
    pub fn error_prefix(self) -> &'static str {
        match self {
            Operation::AnalyzePage => "Error analyzing page",
            Operation::Click => "Error clicking on element",
            Operation::FillInput => "Error filling input field",
            Operation::SelectOption => "Error selecting option from dropdown",
            Operation::Scroll => "Error scrolling",
        }
    }

    /// What a failed lookup says it was looking for.
    pub fn subject(self) -> &'static str {
        match self {
            Operation::FillInput => "input field",
            Operation::SelectOption => "dropdown",
            _ => "elements",
        }
    }

    /// Format `err` as the outcome string returned to the agent.
    ///
    /// A failed lookup is an ordinary outcome and is reported without the
    /// operation prefix.
    pub fn report(self, err: &GlanceError) -> String {
        match err {
            GlanceError::NotFound { .. } => err.to_string(),
            _ => format!("{}: {}", self.error_prefix(), err),
        }
    }
}

/// Error types used across the Glance system.
#[derive(thiserror::Error, Debug)]
pub enum GlanceError {
    /// The document-access collaborator reported an error.
    #[error("Driver error: {0}")]
    Driver(String),

    /// No element matched the target, even after the rescan. `subject`
    /// names what was looked for ("elements", "input field", "dropdown").
    #[error("No {subject} matching {criteria} found, even after scrolling.")]
    NotFound {
        subject: &'static str,
        criteria: String,
    },

    /// The render tree could not be turned into a snapshot.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A resolved element could not be acted upon.
    #[error("Interaction error: {0}")]
    Interaction(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`GlanceError`].
pub type Result<T> = std::result::Result<T, GlanceError>;
