//! Client-side orchestration for the candidacy promotion workflow.
//!
//! Wraps the backend's REST interface in typed async traits and drives the
//! stateful flows a UI shell needs: the candidate wizard (guarded
//! navigation, debounced autosave, submission), the commission notes editor,
//! the président result finalization, and abortable document previews.
//!
//! The server is the single source of truth for all multi-actor state; this
//! crate only holds optimistic copies that are reconciled by re-fetching
//! after successful mutations.

pub mod api;
pub mod config;
pub mod documents;
pub mod error;
pub mod evaluation;
pub mod finalization;
pub mod session;
pub mod wizard;

pub use error::{ApiError, ApiResult};
