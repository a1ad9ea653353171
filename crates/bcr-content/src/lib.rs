//! # bcr-content -- Content-addressed document store client
//!
//! Pins JSON documents (monitoring evidence, verification reports, credit
//! metadata) to an external IPFS pinning service and returns their
//! content identifiers. The registry stores only the identifiers.
//!
//! Every upload is bounded by an overall timeout and retried with
//! exponential backoff on transport errors and 5xx responses.

pub mod client;
pub mod config;
pub mod error;
pub(crate) mod retry;

pub use client::{ContentStore, ContentStoreClient};
pub use config::ContentStoreConfig;
pub use error::ContentStoreError;
