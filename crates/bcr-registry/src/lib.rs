//! # bcr-registry: Registry of Record
//!
//! The stateful half of the registry core:
//!
//! - [`CredentialStore`]: principals, secret verification, authentication.
//! - [`LifecycleManager`]: project creation, reads with per-caller
//!   projection, edits, transitions, listings.
//! - [`ProvenanceLinker`]: append-only content references, optionally
//!   uploading the content first.
//!
//! All three are cheap to clone and share their state. No process-wide
//! globals: whoever builds them owns them.
//!
//! ## Concurrency
//!
//! Each project sits behind its own mutex in a [`KeyedStore`]. Mutations
//! run read-validate-write under that lock, so two concurrent `submit`
//! calls on one draft yield exactly one success. Locks are synchronous and
//! never held across an await.

pub mod error;
pub mod principals;
pub mod projects;
pub mod provenance;
pub mod store;

pub use error::RegistryError;
pub use principals::{CredentialStore, Principal, PrincipalView, Profile, Registration};
pub use projects::{
    LifecycleManager, Page, ProjectRead, PublicContent, PublicOwner, PublicProject,
    DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
pub use provenance::ProvenanceLinker;
pub use store::KeyedStore;
