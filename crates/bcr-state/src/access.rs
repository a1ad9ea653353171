//! # Access Control Evaluator
//!
//! A pure function of the caller's role and id, the project's owner and
//! status, and the requested operation. No I/O, no locks; the lifecycle
//! manager calls it while holding the project lock.
//!
//! Rules, first match wins:
//!
//! 1. administrator: any read; begin_review, approve, reject, tokenize
//!    where the edge exists.
//! 2. owner: read always; edit and submit while draft.
//! 3. reviewer: read submitted, under_review, verified, rejected;
//!    begin_review, approve, reject where the edge exists.
//! 4. consumer: read verified and tokenized, restricted projection.
//! 5. deny.

use bcr_core::{PrincipalId, Role};

use crate::project::{LifecycleEvent, ProjectStatus};

/// Who is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Principal id.
    pub id: PrincipalId,
    /// Role the principal registered with.
    pub role: Role,
}

impl Caller {
    /// The automated trigger, acting with administrator privilege.
    pub fn system() -> Self {
        Self {
            id: PrincipalId::SYSTEM,
            role: Role::Administrator,
        }
    }
}

/// What is being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// Project owner.
    pub owner: PrincipalId,
    /// Current project status.
    pub status: ProjectStatus,
}

/// Requested operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Read the project.
    Read,
    /// Change descriptive attributes.
    Edit,
    /// Fire a lifecycle event.
    Transition(LifecycleEvent),
}

/// How much of a project a reader sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Everything, including owner contact details and history.
    Full,
    /// Public fields only.
    Restricted,
}

/// Outcome of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Edit or transition allowed.
    Permit,
    /// Read allowed with the given projection.
    PermitRead(Projection),
    /// Not allowed.
    Deny,
}

impl Decision {
    /// Whether the decision allows the operation.
    pub fn is_permit(&self) -> bool {
        !matches!(self, Self::Deny)
    }
}

/// How a denied read is reported.
///
/// Public projects are known to exist, so denying them is `Forbidden`.
/// Anything else is reported as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concealment {
    /// Existence is knowable; report 403.
    Forbidden,
    /// Existence is hidden; report 404.
    NotFound,
}

impl Concealment {
    /// Concealment for a project in `status`.
    pub fn for_status(status: ProjectStatus) -> Self {
        if status.is_public() {
            Self::Forbidden
        } else {
            Self::NotFound
        }
    }
}

/// Evaluate `op` for `caller` against `target`.
pub fn evaluate(caller: &Caller, target: &Target, op: Operation) -> Decision {
    let edge_exists = |event: LifecycleEvent| target.status.apply(event).is_some();

    if caller.role == Role::Administrator {
        return match op {
            Operation::Read => Decision::PermitRead(Projection::Full),
            Operation::Edit => Decision::Deny,
            Operation::Transition(event) => permit_if(
                matches!(
                    event,
                    LifecycleEvent::BeginReview
                        | LifecycleEvent::Approve
                        | LifecycleEvent::Reject
                        | LifecycleEvent::Tokenize
                ) && edge_exists(event),
            ),
        };
    }

    if caller.id == target.owner {
        let is_draft = target.status == ProjectStatus::Draft;
        return match op {
            Operation::Read => Decision::PermitRead(Projection::Full),
            Operation::Edit => permit_if(is_draft),
            Operation::Transition(event) => {
                permit_if(event == LifecycleEvent::Submit && is_draft)
            }
        };
    }

    match (caller.role, op) {
        (Role::Reviewer, Operation::Read) => {
            if matches!(
                target.status,
                ProjectStatus::Submitted
                    | ProjectStatus::UnderReview
                    | ProjectStatus::Verified
                    | ProjectStatus::Rejected
            ) {
                Decision::PermitRead(Projection::Full)
            } else {
                Decision::Deny
            }
        }
        (Role::Reviewer, Operation::Transition(event)) => permit_if(
            matches!(
                event,
                LifecycleEvent::BeginReview | LifecycleEvent::Approve | LifecycleEvent::Reject
            ) && edge_exists(event),
        ),
        (Role::Consumer, Operation::Read) if target.status.is_public() => {
            Decision::PermitRead(Projection::Restricted)
        }
        _ => Decision::Deny,
    }
}

/// The projection `caller` reads `target` with, or `None` if hidden.
pub fn read_projection(caller: &Caller, target: &Target) -> Option<Projection> {
    match evaluate(caller, target, Operation::Read) {
        Decision::PermitRead(projection) => Some(projection),
        _ => None,
    }
}

fn permit_if(allowed: bool) -> Decision {
    if allowed {
        Decision::Permit
    } else {
        Decision::Deny
    }
}
