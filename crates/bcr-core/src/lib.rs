#![deny(missing_docs)]

//! # bcr-core: Foundational Types for the Blue Carbon Registry
//!
//! This crate defines the primitives every other crate in the workspace
//! depends on. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** A [`PrincipalId`] cannot be
//!    passed where a [`ProjectId`] is expected.
//!
//! 2. **Normalized identities.** [`Identity`] is trimmed and lowercased at
//!    construction, so `Alice@Example.com` and `alice@example.com` are the
//!    same principal everywhere downstream.
//!
//! 3. **One [`Role`] enum.** Four variants, exhaustive `match` everywhere.
//!
//! 4. **[`ValidationError`] hierarchy.** Structured errors with `thiserror`,
//!    no `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod role;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{Identity, PrincipalId, ProjectId};
pub use role::Role;
pub use temporal::Timestamp;
