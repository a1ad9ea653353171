//! # Registry Roles
//!
//! The fixed set of actor roles. A principal's role is chosen at
//! registration and never changes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The role a principal acts under.
///
/// Legacy role names are accepted on input (`developer`, `verifier`,
/// `admin`, `buyer`) and always serialized in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Creates projects and submits them for review.
    #[serde(alias = "developer")]
    Submitter,
    /// Reviews submitted projects and records the outcome.
    #[serde(alias = "verifier")]
    Reviewer,
    /// Full read access; may review and tokenize.
    #[serde(alias = "admin")]
    Administrator,
    /// Reads public (verified or tokenized) projects only. The default
    /// for new registrations.
    #[default]
    #[serde(alias = "buyer")]
    Consumer,
}

impl Role {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitter => "submitter",
            Self::Reviewer => "reviewer",
            Self::Administrator => "administrator",
            Self::Consumer => "consumer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "submitter" | "developer" => Ok(Self::Submitter),
            "reviewer" | "verifier" => Ok(Self::Reviewer),
            "administrator" | "admin" => Ok(Self::Administrator),
            "consumer" | "buyer" => Ok(Self::Consumer),
            _ => Err(ValidationError::UnknownRole(s.to_string())),
        }
    }
}
