//! # API Route Modules
//!
//! - `auth`: registration, login, introspection, and credential refresh.
//! - `projects`: authenticated project lifecycle: create, read, edit,
//!   transition, attach content, review queue.
//! - `public`: the unauthenticated catalogue of verified and tokenized
//!   projects.

pub mod auth;
pub mod projects;
pub mod public;
