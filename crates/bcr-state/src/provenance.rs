//! # Content Attachment Windows
//!
//! Which kinds of content-addressed document may be attached to a project,
//! by whom, and during which statuses.
//!
//! | Kind | Window | Who |
//! |---|---|---|
//! | documentation | draft, submitted | owner, administrator |
//! | monitoring_evidence | submitted, under_review | owner, reviewer, administrator |
//! | verification_report | under_review | reviewer, administrator |
//! | credit_metadata | tokenized | administrator |
//! | retirement_certificate | tokenized | administrator |
//!
//! Every appended reference carries a trail digest chaining it to the
//! previous one: `sha256(previous_digest || kind || content_ref)`.

use bcr_core::{PrincipalId, Role, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::access::{read_projection, Caller, Concealment, Target};
use crate::project::ProjectStatus;

const MAX_CONTENT_REF_LEN: usize = 512;

/// Kind of externally stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Project design documents.
    Documentation,
    /// Field monitoring data.
    MonitoringEvidence,
    /// Reviewer's report.
    VerificationReport,
    /// Metadata for issued credits.
    CreditMetadata,
    /// Proof that credits were retired.
    RetirementCertificate,
}

impl ContentKind {
    /// All kinds.
    pub const ALL: [ContentKind; 5] = [
        Self::Documentation,
        Self::MonitoringEvidence,
        Self::VerificationReport,
        Self::CreditMetadata,
        Self::RetirementCertificate,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Documentation => "documentation",
            Self::MonitoringEvidence => "monitoring_evidence",
            Self::VerificationReport => "verification_report",
            Self::CreditMetadata => "credit_metadata",
            Self::RetirementCertificate => "retirement_certificate",
        }
    }

    /// Statuses during which this kind may be attached.
    pub fn window(&self) -> &'static [ProjectStatus] {
        use ProjectStatus as S;
        match self {
            Self::Documentation => &[S::Draft, S::Submitted],
            Self::MonitoringEvidence => &[S::Submitted, S::UnderReview],
            Self::VerificationReport => &[S::UnderReview],
            Self::CreditMetadata | Self::RetirementCertificate => &[S::Tokenized],
        }
    }

    /// Whether `caller` holds a position that may attach this kind to a
    /// project owned by `owner`. Ignores status.
    pub fn permits(&self, caller: &Caller, owner: PrincipalId) -> bool {
        let is_owner = caller.id == owner;
        match self {
            Self::Documentation => is_owner || caller.role == Role::Administrator,
            Self::MonitoringEvidence => {
                is_owner || matches!(caller.role, Role::Reviewer | Role::Administrator)
            }
            Self::VerificationReport => {
                matches!(caller.role, Role::Reviewer | Role::Administrator)
            }
            Self::CreditMetadata | Self::RetirementCertificate => {
                caller.role == Role::Administrator
            }
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content identifier attached to a project. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentReference {
    /// What the document is.
    pub kind: ContentKind,
    /// Opaque identifier in the external content store (e.g. a CID).
    pub content_ref: String,
    /// Who attached it.
    pub attached_by: PrincipalId,
    /// When.
    pub attached_at: Timestamp,
    /// Hex SHA-256 chaining this reference to the previous one.
    pub trail_digest: String,
}

/// Result of checking an attach request against access and window rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachDecision {
    /// Caller may attach now.
    Permit,
    /// Caller cannot see the project at all.
    Hidden(Concealment),
    /// Caller sees the project but may not attach this kind.
    Forbidden,
    /// Caller may attach this kind, but not in the current status.
    OutsideWindow,
}

/// Decide an attach request. Checks run in order: visibility, role, window.
pub fn evaluate_attach(caller: &Caller, target: &Target, kind: ContentKind) -> AttachDecision {
    if read_projection(caller, target).is_none() {
        return AttachDecision::Hidden(Concealment::for_status(target.status));
    }
    if !kind.permits(caller, target.owner) {
        return AttachDecision::Forbidden;
    }
    if !kind.window().contains(&target.status) {
        return AttachDecision::OutsideWindow;
    }
    AttachDecision::Permit
}

/// Trim and bound a content identifier.
pub fn validate_content_ref(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::TooShort {
            field: "content_ref",
            min: 1,
        });
    }
    if trimmed.len() > MAX_CONTENT_REF_LEN {
        return Err(ValidationError::TooLong {
            field: "content_ref",
            max: MAX_CONTENT_REF_LEN,
        });
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidValue {
            field: "content_ref",
            reason: "must not contain whitespace",
        });
    }
    Ok(trimmed)
}

/// Digest linking a new reference to its predecessor.
pub fn trail_digest(previous: Option<&str>, kind: ContentKind, content_ref: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous.unwrap_or("").as_bytes());
    hasher.update(b"\n");
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(content_ref.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: Role) -> Caller {
        Caller {
            id: PrincipalId::new(),
            role,
        }
    }

    fn target(owner: PrincipalId, status: ProjectStatus) -> Target {
        Target { owner, status }
    }

    #[test]
    fn owner_may_attach_documentation_to_draft() {
        let owner = caller(Role::Submitter);
        let t = target(owner.id, ProjectStatus::Draft);
        assert_eq!(
            evaluate_attach(&owner, &t, ContentKind::Documentation),
            AttachDecision::Permit
        );
    }

    #[test]
    fn owner_cannot_attach_verification_report() {
        let owner = caller(Role::Submitter);
        let t = target(owner.id, ProjectStatus::UnderReview);
        assert_eq!(
            evaluate_attach(&owner, &t, ContentKind::VerificationReport),
            AttachDecision::Forbidden
        );
    }

    #[test]
    fn reviewer_report_outside_window() {
        let reviewer = caller(Role::Reviewer);
        let t = target(PrincipalId::new(), ProjectStatus::Submitted);
        assert_eq!(
            evaluate_attach(&reviewer, &t, ContentKind::VerificationReport),
            AttachDecision::OutsideWindow
        );
    }

    #[test]
    fn reviewer_cannot_see_draft() {
        let reviewer = caller(Role::Reviewer);
        let t = target(PrincipalId::new(), ProjectStatus::Draft);
        assert_eq!(
            evaluate_attach(&reviewer, &t, ContentKind::MonitoringEvidence),
            AttachDecision::Hidden(Concealment::NotFound)
        );
    }

    #[test]
    fn consumer_sees_tokenized_but_cannot_attach() {
        let consumer = caller(Role::Consumer);
        let t = target(PrincipalId::new(), ProjectStatus::Tokenized);
        assert_eq!(
            evaluate_attach(&consumer, &t, ContentKind::CreditMetadata),
            AttachDecision::Forbidden
        );
    }

    #[test]
    fn admin_attaches_credit_metadata_only_when_tokenized() {
        let admin = caller(Role::Administrator);
        let owner = PrincipalId::new();
        assert_eq!(
            evaluate_attach(&admin, &target(owner, ProjectStatus::Tokenized), ContentKind::CreditMetadata),
            AttachDecision::Permit
        );
        assert_eq!(
            evaluate_attach(&admin, &target(owner, ProjectStatus::Verified), ContentKind::CreditMetadata),
            AttachDecision::OutsideWindow
        );
    }

    #[test]
    fn windows_cover_only_listed_statuses() {
        assert_eq!(ContentKind::Documentation.window().len(), 2);
        assert!(!ContentKind::Documentation
            .window()
            .contains(&ProjectStatus::UnderReview));
        for kind in ContentKind::ALL {
            assert!(!kind.window().contains(&ProjectStatus::Rejected));
        }
    }

    #[test]
    fn content_ref_validation() {
        assert_eq!(validate_content_ref("  bafy  ").unwrap(), "bafy");
        assert!(validate_content_ref("").is_err());
        assert!(validate_content_ref("a b").is_err());
        assert!(validate_content_ref(&"x".repeat(513)).is_err());
    }

    #[test]
    fn trail_digest_depends_on_every_input() {
        let base = trail_digest(None, ContentKind::Documentation, "a");
        assert_eq!(base.len(), 64);
        assert_ne!(base, trail_digest(Some(&base), ContentKind::Documentation, "a"));
        assert_ne!(base, trail_digest(None, ContentKind::MonitoringEvidence, "a"));
        assert_ne!(base, trail_digest(None, ContentKind::Documentation, "b"));
    }
}
