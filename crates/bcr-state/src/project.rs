//! # Project Lifecycle State Machine
//!
//! Models the approval lifecycle of a blue-carbon restoration project.
//!
//! ## States
//!
//! ```text
//! Draft ──submit──▶ Submitted ──begin_review──▶ UnderReview ──approve──▶ Verified ──tokenize──▶ Tokenized
//!                                                    │
//!                                                    └──reject──▶ Rejected (terminal)
//! ```
//!
//! The table in [`ProjectStatus::apply`] is the only source of edges.
//! Who may fire an event is decided by [`crate::access`]; this module
//! only knows which edges exist.
//!
//! A [`Project`] keeps an append-only transition log and an append-only
//! list of content references. Neither is exposed mutably.

use bcr_core::{PrincipalId, ProjectId, Role, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provenance::{trail_digest, validate_content_ref, ContentKind, ContentReference};

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Being prepared by its owner. Only state in which edits are allowed.
    Draft,
    /// Handed in, waiting for a reviewer.
    Submitted,
    /// A reviewer is evaluating it.
    UnderReview,
    /// Approved. Publicly listed.
    Verified,
    /// Turned down. Terminal.
    Rejected,
    /// Credits issued. Publicly listed.
    Tokenized,
}

impl ProjectStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [ProjectStatus; 6] = [
        Self::Draft,
        Self::Submitted,
        Self::UnderReview,
        Self::Verified,
        Self::Rejected,
        Self::Tokenized,
    ];

    /// Canonical lowercase name, as stored and serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Tokenized => "tokenized",
        }
    }

    /// Parse a stored status name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Whether the project appears in public listings.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Verified | Self::Tokenized)
    }

    /// Whether no further transition exists.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Tokenized)
    }

    /// The status `event` leads to from here, if that edge exists.
    pub fn apply(&self, event: LifecycleEvent) -> Option<ProjectStatus> {
        use LifecycleEvent as E;
        match (self, event) {
            (Self::Draft, E::Submit) => Some(Self::Submitted),
            (Self::Submitted, E::BeginReview) => Some(Self::UnderReview),
            (Self::UnderReview, E::Approve) => Some(Self::Verified),
            (Self::UnderReview, E::Reject) => Some(Self::Rejected),
            (Self::Verified, E::Tokenize) => Some(Self::Tokenized),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Events ──────────────────────────────────────────────────────────

/// An event that moves a project along the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Owner hands in a draft.
    Submit,
    /// Reviewer picks up a submission.
    BeginReview,
    /// Reviewer approves.
    Approve,
    /// Reviewer rejects.
    Reject,
    /// Administrator issues credits against a verified project.
    Tokenize,
}

impl LifecycleEvent {
    /// All events.
    pub const ALL: [LifecycleEvent; 5] = [
        Self::Submit,
        Self::BeginReview,
        Self::Approve,
        Self::Reject,
        Self::Tokenize,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::BeginReview => "begin_review",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Tokenize => "tokenize",
        }
    }
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from mutating a [`Project`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// No edge for `event` leaves `from`.
    #[error("cannot {event} a project in status {from}")]
    InvalidTransition {
        /// Current status.
        from: ProjectStatus,
        /// Attempted event.
        event: LifecycleEvent,
    },

    /// Attributes can only change while the project is a draft.
    #[error("project is {status}; attributes are locked after submission")]
    Locked {
        /// Current status.
        status: ProjectStatus,
    },

    /// Content of this kind cannot be attached in the current status.
    #[error("{kind} cannot be attached while the project is {status}")]
    OutsideWindow {
        /// Attempted content kind.
        kind: ContentKind,
        /// Current status.
        status: ProjectStatus,
    },

    /// Attribute or content reference validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// ─── Attributes ──────────────────────────────────────────────────────

const MAX_TITLE_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 10_000;

/// Descriptive attributes of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAttributes {
    /// Human-readable title. Required.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Site address or coordinates.
    #[serde(default)]
    pub location_address: String,
    /// Habitat, e.g. `mangrove`, `seagrass`, `salt_marsh`.
    #[serde(default)]
    pub ecosystem_type: String,
    /// Restored area in hectares.
    #[serde(default)]
    pub project_area: Option<f64>,
    /// Estimated sequestration in tonnes of CO2 equivalent.
    #[serde(default)]
    pub estimated_co2_sequestration: Option<f64>,
    /// Free-form additional attributes.
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProjectAttributes {
    /// Attributes with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            location_address: String::new(),
            ecosystem_type: String::new(),
            project_area: None,
            estimated_co2_sequestration: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Check field constraints. Trims the title in place.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        let trimmed = self.title.trim();
        if trimmed.len() != self.title.len() {
            self.title = trimmed.to_string();
        }
        if self.title.is_empty() {
            return Err(ValidationError::TooShort {
                field: "title",
                min: 1,
            });
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }
        for (field, value) in [
            ("description", &self.description),
            ("location_address", &self.location_address),
            ("ecosystem_type", &self.ecosystem_type),
        ] {
            if value.chars().count() > MAX_TEXT_LEN {
                return Err(ValidationError::TooLong {
                    field,
                    max: MAX_TEXT_LEN,
                });
            }
        }
        for (field, value) in [
            ("project_area", self.project_area),
            ("estimated_co2_sequestration", self.estimated_co2_sequestration),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ValidationError::InvalidValue {
                        field,
                        reason: "must be a non-negative number",
                    });
                }
            }
        }
        Ok(())
    }
}

/// A partial update to [`ProjectAttributes`]. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New location.
    pub location_address: Option<String>,
    /// New ecosystem type.
    pub ecosystem_type: Option<String>,
    /// New area.
    pub project_area: Option<f64>,
    /// New sequestration estimate.
    pub estimated_co2_sequestration: Option<f64>,
    /// Keys merged into `extra`.
    pub extra: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ProjectPatch {
    fn apply_to(self, attrs: &mut ProjectAttributes) {
        if let Some(v) = self.title {
            attrs.title = v;
        }
        if let Some(v) = self.description {
            attrs.description = v;
        }
        if let Some(v) = self.location_address {
            attrs.location_address = v;
        }
        if let Some(v) = self.ecosystem_type {
            attrs.ecosystem_type = v;
        }
        if let Some(v) = self.project_area {
            attrs.project_area = Some(v);
        }
        if let Some(v) = self.estimated_co2_sequestration {
            attrs.estimated_co2_sequestration = Some(v);
        }
        if let Some(extra) = self.extra {
            attrs.extra.extend(extra);
        }
    }
}

// ─── Transition Log ──────────────────────────────────────────────────

/// Record of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Status before.
    pub from: ProjectStatus,
    /// Status after.
    pub to: ProjectStatus,
    /// Event that caused it.
    pub event: LifecycleEvent,
    /// Principal that fired the event.
    pub actor: PrincipalId,
    /// When.
    pub at: Timestamp,
}

// ─── Project ─────────────────────────────────────────────────────────

/// Whether an attach appended a new reference or found an identical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// A new reference was appended.
    Appended,
    /// The same `(kind, content_ref)` pair was already present.
    AlreadyPresent,
}

/// A restoration project with its lifecycle state and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Principal who created the project.
    pub owner: PrincipalId,
    /// Owner's role at creation. Captured, never re-checked.
    pub owner_role: Role,
    status: ProjectStatus,
    /// Descriptive attributes.
    pub attributes: ProjectAttributes,
    content: Vec<ContentReference>,
    transitions: Vec<TransitionRecord>,
    /// When the project was created.
    pub created_at: Timestamp,
    /// When the project last changed.
    pub updated_at: Timestamp,
    /// Incremented by every mutation that changes the record.
    #[serde(default)]
    version: u64,
}

impl Project {
    /// Create a draft. Validates attributes.
    pub fn new(
        id: ProjectId,
        owner: PrincipalId,
        owner_role: Role,
        mut attributes: ProjectAttributes,
        now: Timestamp,
    ) -> Result<Self, LifecycleError> {
        attributes.validate()?;
        Ok(Self {
            id,
            owner,
            owner_role,
            status: ProjectStatus::Draft,
            attributes,
            content: Vec::new(),
            transitions: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    /// Current status.
    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Attached content references, oldest first.
    pub fn content(&self) -> &[ContentReference] {
        &self.content
    }

    /// Status changes, oldest first.
    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Monotonic revision number. A newer record always has a larger
    /// version, even when both changed within the same clock tick.
    pub fn version(&self) -> u64 {
        self.version
    }

    fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
        self.version += 1;
    }

    /// Fire `event`. Fails without side effects if no edge exists.
    pub fn transition(
        &mut self,
        event: LifecycleEvent,
        actor: PrincipalId,
        now: Timestamp,
    ) -> Result<ProjectStatus, LifecycleError> {
        let to = self
            .status
            .apply(event)
            .ok_or(LifecycleError::InvalidTransition {
                from: self.status,
                event,
            })?;
        self.transitions.push(TransitionRecord {
            from: self.status,
            to,
            event,
            actor,
            at: now,
        });
        self.status = to;
        self.touch(now);
        Ok(to)
    }

    /// Apply a partial attribute update. Draft only.
    ///
    /// Validation runs on a copy, so a rejected patch leaves the project
    /// unchanged.
    pub fn edit(&mut self, patch: ProjectPatch, now: Timestamp) -> Result<(), LifecycleError> {
        if self.status != ProjectStatus::Draft {
            return Err(LifecycleError::Locked {
                status: self.status,
            });
        }
        let mut next = self.attributes.clone();
        patch.apply_to(&mut next);
        next.validate()?;
        self.attributes = next;
        self.touch(now);
        Ok(())
    }

    /// Append a content reference if `kind`'s window is open.
    ///
    /// Re-attaching an identical `(kind, content_ref)` pair is a no-op.
    pub fn attach(
        &mut self,
        kind: ContentKind,
        content_ref: &str,
        actor: PrincipalId,
        now: Timestamp,
    ) -> Result<AttachOutcome, LifecycleError> {
        let content_ref = validate_content_ref(content_ref)?;
        if !kind.window().contains(&self.status) {
            return Err(LifecycleError::OutsideWindow {
                kind,
                status: self.status,
            });
        }
        if self
            .content
            .iter()
            .any(|c| c.kind == kind && c.content_ref == content_ref)
        {
            return Ok(AttachOutcome::AlreadyPresent);
        }
        let previous = self.content.last().map(|c| c.trail_digest.as_str());
        let digest = trail_digest(previous, kind, content_ref);
        self.content.push(ContentReference {
            kind,
            content_ref: content_ref.to_string(),
            attached_by: actor,
            attached_at: now,
            trail_digest: digest,
        });
        self.touch(now);
        Ok(AttachOutcome::Appended)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
