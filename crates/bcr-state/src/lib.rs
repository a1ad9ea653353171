//! # bcr-state: Project Lifecycle and Access Rules
//!
//! Pure rules for the registry, with no I/O:
//!
//! - [`project`]: the status machine, the transition log, and the
//!   [`Project`] aggregate.
//! - [`access`]: the access control evaluator. Role, ownership and status
//!   in; a [`Decision`] out.
//! - [`provenance`]: content kinds, their attachment windows, and the
//!   trail digest linking attached references.
//!
//! The registry crate wraps these in locking and persistence; the HTTP
//! crate never calls them directly.

pub mod access;
pub mod project;
pub mod provenance;

pub use access::{evaluate, read_projection, Caller, Concealment, Decision, Operation, Projection, Target};
pub use project::{
    AttachOutcome, LifecycleError, LifecycleEvent, Project, ProjectAttributes, ProjectPatch,
    ProjectStatus, TransitionRecord,
};
pub use provenance::{evaluate_attach, AttachDecision, ContentKind, ContentReference};
