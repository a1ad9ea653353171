//! # Resource Lifecycle Manager
//!
//! Creates, reads, edits and transitions projects. Every mutation runs
//! read-validate-write under that project's lock in the [`KeyedStore`],
//! consulting the pure access evaluator in `bcr_state::access` before
//! touching the record.
//!
//! ## Error precedence
//!
//! 1. Unknown id: `NotFound`.
//! 2. Caller cannot read the project: `Forbidden` if it is public,
//!    `NotFound` otherwise.
//! 3. Operation-specific denial (`InvalidTransition`, `ResourceLocked`,
//!    `Forbidden`).
//!
//! Transitions differ at step 2 for public projects: an unreadable public
//! project reports `InvalidTransition` rather than `Forbidden`.

use bcr_core::{PrincipalId, ProjectId, Role, Timestamp};
use bcr_state::{
    evaluate, read_projection, Caller, ContentKind, Decision, LifecycleEvent, Operation, Project,
    ProjectAttributes, ProjectPatch, ProjectStatus, Projection, Target,
};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::principals::CredentialStore;
use crate::store::KeyedStore;

/// Default page size for public listings.
pub const DEFAULT_PER_PAGE: u32 = 10;
/// Largest accepted page size.
pub const MAX_PER_PAGE: u32 = 100;

// ─── Views ───────────────────────────────────────────────────────────

/// Owner details safe to show publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicOwner {
    /// Display name.
    pub display_name: String,
    /// Affiliation, if given.
    pub organization: Option<String>,
}

/// A content reference without the attaching principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicContent {
    /// Kind of document.
    pub kind: ContentKind,
    /// External identifier.
    pub content_ref: String,
    /// When it was attached.
    pub attached_at: Timestamp,
}

/// The restricted projection of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProject {
    /// Project id.
    pub id: ProjectId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Location.
    pub location_address: String,
    /// Ecosystem type.
    pub ecosystem_type: String,
    /// Area in hectares.
    pub project_area: Option<f64>,
    /// Estimated sequestration in tCO2e.
    pub estimated_co2_sequestration: Option<f64>,
    /// Status.
    pub status: ProjectStatus,
    /// Creation time.
    pub created_at: Timestamp,
    /// Owner's public details. `None` if the owner record is missing.
    pub owner: Option<PublicOwner>,
    /// Attached documents.
    pub content: Vec<PublicContent>,
}

/// A project as seen by a particular caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProjectRead {
    /// Everything.
    Full(Project),
    /// Public fields only.
    Restricted(PublicProject),
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub per_page: u32,
    /// Total items across all pages.
    pub total: usize,
}

// ─── Manager ─────────────────────────────────────────────────────────

/// Owns the project records. Clone-friendly.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    projects: KeyedStore<ProjectId, Project>,
    principals: CredentialStore,
}

impl LifecycleManager {
    /// Create an empty manager. `principals` supplies owner details for
    /// public projections.
    pub fn new(principals: CredentialStore) -> Self {
        Self {
            projects: KeyedStore::new(),
            principals,
        }
    }

    pub(crate) fn store(&self) -> &KeyedStore<ProjectId, Project> {
        &self.projects
    }

    /// Create a draft owned by `caller`. Only submitters may create.
    pub fn create(
        &self,
        caller: &Caller,
        attributes: ProjectAttributes,
    ) -> Result<Project, RegistryError> {
        if caller.role != Role::Submitter {
            return Err(RegistryError::Forbidden(format!(
                "role {} cannot create projects",
                caller.role
            )));
        }
        let project = Project::new(
            ProjectId::new(),
            caller.id,
            caller.role,
            attributes,
            Timestamp::now(),
        )?;
        if !self.projects.insert_new(project.id, project.clone()) {
            return Err(RegistryError::Conflict(format!("project {} exists", project.id)));
        }
        tracing::info!(project = %project.id, owner = %caller.id, "project created");
        Ok(project)
    }

    /// Read one project with the projection the caller is entitled to.
    pub fn get(&self, id: ProjectId, caller: &Caller) -> Result<ProjectRead, RegistryError> {
        let project = self.snapshot(id)?;
        match read_projection(caller, &target_of(&project)) {
            Some(Projection::Full) => Ok(ProjectRead::Full(project)),
            Some(Projection::Restricted) => Ok(ProjectRead::Restricted(self.publicize(&project))),
            None => Err(RegistryError::concealed(
                bcr_state::Concealment::for_status(project.status()),
                project_label(id),
            )),
        }
    }

    /// Apply a partial attribute update.
    ///
    /// Owner only, draft only. The owner gets `ResourceLocked` after
    /// submission; any other caller who can see the project gets
    /// `Forbidden`.
    pub fn edit(
        &self,
        id: ProjectId,
        caller: &Caller,
        patch: ProjectPatch,
    ) -> Result<Project, RegistryError> {
        self.projects
            .try_update(&id, |project| {
                let target = ensure_visible(caller, project)?;
                match evaluate(caller, &target, Operation::Edit) {
                    Decision::Deny if caller.id == project.owner => {
                        Err(RegistryError::ResourceLocked(format!(
                            "{} is {}; attributes are locked after submission",
                            project_label(id),
                            project.status()
                        )))
                    }
                    Decision::Deny => Err(RegistryError::Forbidden(format!(
                        "only the owner may edit {}",
                        project_label(id)
                    ))),
                    _ => {
                        project.edit(patch, Timestamp::now())?;
                        Ok(project.clone())
                    }
                }
            })
            .ok_or_else(|| RegistryError::NotFound(project_label(id)))?
    }

    /// Fire a lifecycle event.
    ///
    /// A caller who may not fire `event` in the project's current status
    /// gets `InvalidTransition`. Non-public projects the caller cannot
    /// read are `NotFound`.
    pub fn transition(
        &self,
        id: ProjectId,
        caller: &Caller,
        event: LifecycleEvent,
    ) -> Result<Project, RegistryError> {
        let updated = self
            .projects
            .try_update(&id, |project| {
                // Existence of a public project is never concealed.
                let target = match ensure_visible(caller, project) {
                    Err(RegistryError::Forbidden(_)) => target_of(project),
                    other => other?,
                };
                if !evaluate(caller, &target, Operation::Transition(event)).is_permit() {
                    let status = project.status();
                    return Err(RegistryError::InvalidTransition(if status.is_terminal() {
                        format!("{} is {status} and accepts no further events", project_label(id))
                    } else {
                        format!("{} cannot {event} a project in status {status}", caller.role)
                    }));
                }
                project.transition(event, caller.id, Timestamp::now())?;
                Ok(project.clone())
            })
            .ok_or_else(|| RegistryError::NotFound(project_label(id)))??;
        tracing::info!(
            project = %id,
            actor = %caller.id,
            event = %event,
            status = %updated.status(),
            "project transitioned"
        );
        Ok(updated)
    }

    /// Projects owned by `owner`, newest first.
    pub fn list_owned_by(&self, owner: PrincipalId) -> Vec<Project> {
        let mut owned: Vec<Project> = self
            .projects
            .snapshot_all()
            .into_iter()
            .filter(|p| p.owner == owner)
            .collect();
        sort_newest_first(&mut owned);
        owned
    }

    /// One page of public (verified or tokenized) projects, newest first.
    ///
    /// `page` is 1-based. Absent arguments default to page 1 and
    /// [`DEFAULT_PER_PAGE`]. An empty registry yields an empty page.
    pub fn list_public(
        &self,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<Page<PublicProject>, RegistryError> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE);
        if page == 0 {
            return Err(bcr_core::ValidationError::InvalidValue {
                field: "page",
                reason: "must be at least 1",
            }
            .into());
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(bcr_core::ValidationError::InvalidValue {
                field: "per_page",
                reason: "must be between 1 and 100",
            }
            .into());
        }

        let mut public: Vec<Project> = self
            .projects
            .snapshot_all()
            .into_iter()
            .filter(|p| p.status().is_public())
            .collect();
        sort_newest_first(&mut public);

        let total = public.len();
        let skip = (page as usize - 1).saturating_mul(per_page as usize);
        let items = public
            .iter()
            .skip(skip)
            .take(per_page as usize)
            .map(|p| self.publicize(p))
            .collect();
        Ok(Page {
            items,
            page,
            per_page,
            total,
        })
    }

    /// Restricted projection of a public project. Anything not public is
    /// `NotFound`.
    pub fn get_public(&self, id: ProjectId) -> Result<PublicProject, RegistryError> {
        let project = self.snapshot(id)?;
        if !project.status().is_public() {
            return Err(RegistryError::NotFound(project_label(id)));
        }
        Ok(self.publicize(&project))
    }

    /// Projects awaiting or under review, oldest first. Reviewers and
    /// administrators only.
    pub fn review_queue(&self, caller: &Caller) -> Result<Vec<Project>, RegistryError> {
        if !matches!(caller.role, Role::Reviewer | Role::Administrator) {
            return Err(RegistryError::Forbidden(format!(
                "role {} has no review queue",
                caller.role
            )));
        }
        let mut queue: Vec<Project> = self
            .projects
            .snapshot_all()
            .into_iter()
            .filter(|p| {
                matches!(
                    p.status(),
                    ProjectStatus::Submitted | ProjectStatus::UnderReview
                )
            })
            .collect();
        queue.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(queue)
    }

    /// Insert a project loaded from storage.
    pub fn restore(&self, project: Project) {
        self.projects.upsert(project.id, project);
    }

    /// Undo the mutation that turned `previous` into `applied`.
    ///
    /// Applies only while `applied` is still the current record and
    /// directly succeeded `previous`. Returns whether the record was
    /// restored.
    pub fn revert(&self, previous: Project, applied: &Project) -> bool {
        if previous.id != applied.id || previous.version() + 1 != applied.version() {
            return false;
        }
        let reverted = self
            .projects
            .try_update(&applied.id, |current| {
                if current.version() != applied.version() {
                    return Err(());
                }
                *current = previous;
                Ok(())
            })
            .is_some_and(|r| r.is_ok());
        if reverted {
            tracing::warn!(project = %applied.id, version = applied.version(), "project change reverted");
        }
        reverted
    }

    /// Remove a freshly created project that nothing has changed since.
    /// Returns whether it was removed.
    pub fn discard(&self, created: &Project) -> bool {
        let removed = self
            .projects
            .remove_if(&created.id, |current| current.version() == created.version());
        if removed {
            tracing::warn!(project = %created.id, "project creation reverted");
        }
        removed
    }

    /// Number of projects.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Whether there are no projects.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Copy of one project without access checks, for internal
    /// bookkeeping. Never hand it to a caller.
    pub fn snapshot(&self, id: ProjectId) -> Result<Project, RegistryError> {
        self.projects
            .get(&id)
            .ok_or_else(|| RegistryError::NotFound(project_label(id)))
    }

    fn publicize(&self, project: &Project) -> PublicProject {
        let owner = self
            .principals
            .resolve_id(project.owner)
            .ok()
            .map(|p| PublicOwner {
                display_name: p.display_name,
                organization: p.profile.organization,
            });
        let attrs = &project.attributes;
        PublicProject {
            id: project.id,
            title: attrs.title.clone(),
            description: attrs.description.clone(),
            location_address: attrs.location_address.clone(),
            ecosystem_type: attrs.ecosystem_type.clone(),
            project_area: attrs.project_area,
            estimated_co2_sequestration: attrs.estimated_co2_sequestration,
            status: project.status(),
            created_at: project.created_at,
            owner,
            content: project
                .content()
                .iter()
                .map(|c| PublicContent {
                    kind: c.kind,
                    content_ref: c.content_ref.clone(),
                    attached_at: c.attached_at,
                })
                .collect(),
        }
    }
}

pub(crate) fn target_of(project: &Project) -> Target {
    Target {
        owner: project.owner,
        status: project.status(),
    }
}

pub(crate) fn project_label(id: ProjectId) -> String {
    format!("project {id}")
}

/// The visibility gate every mutation passes first.
pub(crate) fn ensure_visible(caller: &Caller, project: &Project) -> Result<Target, RegistryError> {
    let target = target_of(project);
    if read_projection(caller, &target).is_none() {
        return Err(RegistryError::concealed(
            bcr_state::Concealment::for_status(project.status()),
            project_label(project.id),
        ));
    }
    Ok(target)
}

fn sort_newest_first(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcr_crypto::SecretHasher;

    use crate::principals::{Profile, Registration};

    struct Fixture {
        principals: CredentialStore,
        projects: LifecycleManager,
    }

    impl Fixture {
        fn new() -> Self {
            let principals =
                CredentialStore::new(SecretHasher::with_params(8, 1).unwrap()).unwrap();
            let projects = LifecycleManager::new(principals.clone());
            Self {
                principals,
                projects,
            }
        }

        fn principal(&self, name: &str, role: Role) -> Caller {
            let p = self
                .principals
                .register(Registration {
                    identity: format!("{name}@example.com"),
                    secret: "secret-1".into(),
                    display_name: name.into(),
                    role: Some(role),
                    profile: Profile {
                        organization: Some(format!("{name} org")),
                        phone: Some("+1 555 0100".into()),
                        ..Profile::default()
                    },
                })
                .unwrap();
            Caller {
                id: p.id,
                role: p.role,
            }
        }

        fn draft(&self, owner: &Caller, title: &str) -> Project {
            self.projects
                .create(owner, ProjectAttributes::titled(title))
                .unwrap()
        }

        fn verified(&self, owner: &Caller, reviewer: &Caller, title: &str) -> Project {
            let p = self.draft(owner, title);
            self.projects.transition(p.id, owner, LifecycleEvent::Submit).unwrap();
            self.projects.transition(p.id, reviewer, LifecycleEvent::BeginReview).unwrap();
            self.projects.transition(p.id, reviewer, LifecycleEvent::Approve).unwrap()
        }
    }

    #[test]
    fn only_submitters_create() {
        let f = Fixture::new();
        for role in [Role::Reviewer, Role::Administrator, Role::Consumer] {
            let c = f.principal(role.as_str(), role);
            assert!(matches!(
                f.projects.create(&c, ProjectAttributes::titled("x")),
                Err(RegistryError::Forbidden(_))
            ));
        }
        let alice = f.principal("alice", Role::Submitter);
        let p = f.draft(&alice, "Mangroves");
        assert_eq!(p.status(), ProjectStatus::Draft);
        assert_eq!(p.owner_role, Role::Submitter);
    }

    #[test]
    fn create_rejects_empty_title() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        assert!(matches!(
            f.projects.create(&alice, ProjectAttributes::titled("")),
            Err(RegistryError::Validation(_))
        ));
    }

    #[test]
    fn hidden_drafts_are_not_found() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let bob = f.principal("bob", Role::Submitter);
        let reviewer = f.principal("rita", Role::Reviewer);
        let p = f.draft(&alice, "Seagrass");
        for c in [&bob, &reviewer] {
            assert!(matches!(f.projects.get(p.id, c), Err(RegistryError::NotFound(_))));
            assert!(matches!(
                f.projects.transition(p.id, c, LifecycleEvent::Submit),
                Err(RegistryError::NotFound(_))
            ));
        }
    }

    #[test]
    fn public_project_denied_to_other_submitter_is_forbidden() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let bob = f.principal("bob", Role::Submitter);
        let rita = f.principal("rita", Role::Reviewer);
        let p = f.verified(&alice, &rita, "Salt marsh");
        assert!(matches!(f.projects.get(p.id, &bob), Err(RegistryError::Forbidden(_))));
    }

    #[test]
    fn consumer_gets_restricted_projection() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let rita = f.principal("rita", Role::Reviewer);
        let carl = f.principal("carl", Role::Consumer);
        let p = f.verified(&alice, &rita, "Kelp");
        match f.projects.get(p.id, &carl).unwrap() {
            ProjectRead::Restricted(view) => {
                let owner = view.owner.unwrap();
                assert_eq!(owner.display_name, "alice");
                assert_eq!(owner.organization.as_deref(), Some("alice org"));
            }
            other => panic!("expected restricted projection, got {other:?}"),
        }
        let json = serde_json::to_string(&f.projects.get(p.id, &carl).unwrap()).unwrap();
        assert!(!json.contains("+1 555 0100"));
        assert!(!json.contains("transitions"));
    }

    #[test]
    fn edit_rules() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let admin = f.principal("ada", Role::Administrator);
        let p = f.draft(&alice, "Mangroves");

        let patch = || ProjectPatch {
            description: Some("updated".into()),
            ..ProjectPatch::default()
        };
        assert_eq!(
            f.projects.edit(p.id, &alice, patch()).unwrap().attributes.description,
            "updated"
        );
        assert!(matches!(
            f.projects.edit(p.id, &admin, patch()),
            Err(RegistryError::Forbidden(_))
        ));

        f.projects.transition(p.id, &alice, LifecycleEvent::Submit).unwrap();
        assert!(matches!(
            f.projects.edit(p.id, &alice, patch()),
            Err(RegistryError::ResourceLocked(_))
        ));
    }

    #[test]
    fn reviewer_cannot_tokenize_but_system_can() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let rita = f.principal("rita", Role::Reviewer);
        let p = f.verified(&alice, &rita, "Mangroves");
        assert!(matches!(
            f.projects.transition(p.id, &rita, LifecycleEvent::Tokenize),
            Err(RegistryError::InvalidTransition(_))
        ));
        let tokenized = f
            .projects
            .transition(p.id, &Caller::system(), LifecycleEvent::Tokenize)
            .unwrap();
        assert_eq!(tokenized.status(), ProjectStatus::Tokenized);
        assert_eq!(tokenized.transitions().last().unwrap().actor, PrincipalId::SYSTEM);
    }

    #[test]
    fn unknown_project_is_not_found() {
        let f = Fixture::new();
        let admin = f.principal("ada", Role::Administrator);
        let id = ProjectId::new();
        assert!(matches!(f.projects.get(id, &admin), Err(RegistryError::NotFound(_))));
        assert!(matches!(
            f.projects.transition(id, &admin, LifecycleEvent::Approve),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(f.projects.get_public(id), Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn list_owned_newest_first() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let bob = f.principal("bob", Role::Submitter);
        let a1 = f.draft(&alice, "first");
        let a2 = f.draft(&alice, "second");
        f.draft(&bob, "bobs");
        let owned = f.projects.list_owned_by(alice.id);
        assert_eq!(owned.len(), 2);
        assert!(owned[0].created_at >= owned[1].created_at);
        let ids: Vec<_> = owned.iter().map(|p| p.id).collect();
        assert!(ids.contains(&a1.id) && ids.contains(&a2.id));
    }

    #[test]
    fn empty_public_listing_is_an_empty_page() {
        let f = Fixture::new();
        let page = f.projects.list_public(None, None).unwrap();
        assert!(page.items.is_empty());
        assert_eq!((page.page, page.per_page, page.total), (1, DEFAULT_PER_PAGE, 0));
    }

    #[test]
    fn public_listing_paginates_public_projects_only() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let rita = f.principal("rita", Role::Reviewer);
        for i in 0..5 {
            f.verified(&alice, &rita, &format!("verified {i}"));
        }
        f.draft(&alice, "hidden draft");

        let first = f.projects.list_public(Some(1), Some(2)).unwrap();
        let third = f.projects.list_public(Some(3), Some(2)).unwrap();
        let beyond = f.projects.list_public(Some(4), Some(2)).unwrap();
        assert_eq!(first.total, 5);
        assert_eq!(first.items.len(), 2);
        assert_eq!(third.items.len(), 1);
        assert!(beyond.items.is_empty());
        assert!(first.items.iter().all(|p| p.status.is_public()));
        assert!(first.items[0].created_at >= first.items[1].created_at);
    }

    #[test]
    fn public_listing_bounds() {
        let f = Fixture::new();
        assert!(matches!(f.projects.list_public(Some(0), None), Err(RegistryError::Validation(_))));
        assert!(matches!(f.projects.list_public(None, Some(101)), Err(RegistryError::Validation(_))));
        assert!(f.projects.list_public(None, Some(100)).is_ok());
    }

    #[test]
    fn get_public_hides_unpublished() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let p = f.draft(&alice, "draft");
        assert!(matches!(f.projects.get_public(p.id), Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn review_queue_oldest_first_for_reviewers() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let rita = f.principal("rita", Role::Reviewer);
        let carl = f.principal("carl", Role::Consumer);
        let first = f.draft(&alice, "one");
        let second = f.draft(&alice, "two");
        f.draft(&alice, "still a draft");
        f.projects.transition(first.id, &alice, LifecycleEvent::Submit).unwrap();
        f.projects.transition(second.id, &alice, LifecycleEvent::Submit).unwrap();
        f.projects.transition(second.id, &rita, LifecycleEvent::BeginReview).unwrap();

        let queue = f.projects.review_queue(&rita).unwrap();
        assert_eq!(queue.len(), 2);
        assert!(queue[0].created_at <= queue[1].created_at);
        assert!(matches!(f.projects.review_queue(&carl), Err(RegistryError::Forbidden(_))));
        assert!(matches!(f.projects.review_queue(&alice), Err(RegistryError::Forbidden(_))));
    }

    #[test]
    fn revert_restores_the_previous_record() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let before = f.draft(&alice, "Mudflat");
        let after = f.projects.transition(before.id, &alice, LifecycleEvent::Submit).unwrap();

        assert!(f.projects.revert(before.clone(), &after));
        assert_eq!(f.projects.snapshot(before.id).unwrap(), before);
        // The draft can be submitted again.
        f.projects.transition(before.id, &alice, LifecycleEvent::Submit).unwrap();
    }

    #[test]
    fn revert_refuses_when_the_record_moved_on() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let rita = f.principal("rita", Role::Reviewer);
        let before = f.draft(&alice, "Mudflat");
        let submitted = f.projects.transition(before.id, &alice, LifecycleEvent::Submit).unwrap();
        let reviewing = f
            .projects
            .transition(before.id, &rita, LifecycleEvent::BeginReview)
            .unwrap();

        assert!(!f.projects.revert(before.clone(), &submitted));
        assert!(!f.projects.revert(before, &reviewing));
        assert_eq!(
            f.projects.snapshot(reviewing.id).unwrap().status(),
            ProjectStatus::UnderReview
        );
    }

    #[test]
    fn discard_removes_only_untouched_creations() {
        let f = Fixture::new();
        let alice = f.principal("alice", Role::Submitter);
        let kept = f.draft(&alice, "Kept");
        let dropped = f.draft(&alice, "Dropped");
        f.projects.transition(kept.id, &alice, LifecycleEvent::Submit).unwrap();

        assert!(!f.projects.discard(&kept));
        assert!(f.projects.discard(&dropped));
        assert!(matches!(f.projects.snapshot(dropped.id), Err(RegistryError::NotFound(_))));
        assert_eq!(f.projects.len(), 1);
    }
}
