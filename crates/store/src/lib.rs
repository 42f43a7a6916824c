//! Local draft persistence for the candidature wizard.
//!
//! A best-effort recovery cache, never a durability guarantee: form state is
//! shadowed locally between server round-trips and reconciled under fresh
//! server data on load. Server data always wins on overlapping keys.

pub mod debounce;
pub mod draft;
pub mod error;
pub mod reconcile;

pub use debounce::Debouncer;
pub use draft::{DraftEntry, DraftStore, FileDraftStore, MemoryDraftStore, DRAFT_PREFIX};
pub use error::StoreError;
pub use reconcile::merge_remote_over_local;
