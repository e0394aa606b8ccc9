#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Blog composer editing core.
//!
//! This crate provides the in-browser-style editing history behind the blog
//! composer: a bounded, debounced undo/redo manager that coexists with an
//! asynchronous rewrite service without corrupting its own ordering.
//!
//! # Main Types
//!
//! - [`ComposerSession`] - Per-session owner of all state below
//! - [`History`] - Past/future snapshot stacks with bounded capacity
//! - [`Coalescer`] - Quiet-period gate turning edit bursts into one checkpoint
//! - [`RewriteBridge`] - Single-flight rewrite calls applied as one undo step
//! - [`validate`] - Submission preconditions
//!
//! # Flow
//!
//! ```text
//! edit ──► DocumentModel ──► Coalescer (re-arm) ──quiet period──► History::checkpoint(burst start)
//! undo/redo ──► History ──► DocumentModel (EditOrigin::History, never re-coalesced)
//! rewrite ok ──► flush Coalescer ──► checkpoint(present) ──► replace present
//! ```

pub mod bridge;
pub mod coalescer;
pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod msg;
pub mod service;
pub mod session;
pub mod snapshot;
pub mod submit;
mod validate;

#[cfg(test)]
mod test_support;

pub use bridge::{RewriteBridge, RewriteCandidate, RewriteTicket};
pub use coalescer::{Coalescer, DEFAULT_QUIET_PERIOD};
pub use config::{ComposerConfig, EmptyUndoPolicy};
pub use document::{DocumentModel, EditNotice};
pub use error::{ComposerError, Result};
pub use history::{CheckpointOutcome, DEFAULT_HISTORY_CAPACITY, History};
pub use service::{Instruction, RewriteRequest, RewriteResponse, RewriteService, ServiceError};
pub use session::{ComposerEvent, ComposerSession};
pub use snapshot::{DocumentSnapshot, EditOrigin, HistoryKind};
pub use submit::{BlogSubmission, ImageRef, SubmitError, SubmitReceipt, Submitter};
pub use validate::{Rule, SubmissionDraft, Violations, validate};
