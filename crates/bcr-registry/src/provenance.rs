//! # Provenance Linker
//!
//! Attaches content identifiers to projects. References are append-only;
//! an identical `(kind, content_ref)` pair is accepted once and silently
//! ignored thereafter.
//!
//! [`ProvenanceLinker::attach_uploaded`] first pins the payload in the
//! external store, then appends the resulting identifier. The upload is
//! the only await point and runs with no lock held; the window is
//! re-checked under the project lock afterwards.

use bcr_content::ContentStore;
use bcr_core::{ProjectId, Timestamp};
use bcr_state::{evaluate_attach, AttachDecision, AttachOutcome, Caller, ContentKind, Project};

use crate::error::RegistryError;
use crate::projects::{project_label, target_of, LifecycleManager};

/// Links content-addressed documents to projects. Clone-friendly.
#[derive(Debug, Clone)]
pub struct ProvenanceLinker {
    projects: LifecycleManager,
}

impl ProvenanceLinker {
    /// Create a linker over `projects`.
    pub fn new(projects: LifecycleManager) -> Self {
        Self { projects }
    }

    /// Attach an existing content identifier.
    pub fn attach(
        &self,
        id: ProjectId,
        kind: ContentKind,
        content_ref: &str,
        caller: &Caller,
    ) -> Result<Project, RegistryError> {
        let (project, outcome) = self
            .projects
            .store()
            .try_update(&id, |project| {
                check(caller, project, kind)?;
                let outcome = project.attach(kind, content_ref, caller.id, Timestamp::now())?;
                Ok::<_, RegistryError>((project.clone(), outcome))
            })
            .ok_or_else(|| RegistryError::NotFound(project_label(id)))??;

        match outcome {
            AttachOutcome::Appended => tracing::info!(
                project = %id,
                kind = %kind,
                content_ref = %content_ref.trim(),
                actor = %caller.id,
                "content attached"
            ),
            AttachOutcome::AlreadyPresent => tracing::debug!(
                project = %id,
                kind = %kind,
                "content already attached; nothing to do"
            ),
        }
        Ok(project)
    }

    /// Pin `payload` in `store`, then attach the returned identifier.
    ///
    /// Authorization and window are checked before the upload so a doomed
    /// request never reaches the store. Upload failure leaves the project
    /// untouched and surfaces as `UpstreamUnavailable`.
    pub async fn attach_uploaded<S: ContentStore>(
        &self,
        id: ProjectId,
        kind: ContentKind,
        payload: &serde_json::Value,
        caller: &Caller,
        store: &S,
    ) -> Result<Project, RegistryError> {
        let cid = self.upload(id, kind, payload, caller, store).await?;
        self.attach(id, kind, &cid, caller)
    }

    /// The upload half of [`Self::attach_uploaded`]: pre-check, pin, and
    /// return the content identifier without touching the project.
    pub async fn upload<S: ContentStore>(
        &self,
        id: ProjectId,
        kind: ContentKind,
        payload: &serde_json::Value,
        caller: &Caller,
        store: &S,
    ) -> Result<String, RegistryError> {
        let snapshot = self.projects.snapshot(id)?;
        check(caller, &snapshot, kind)?;

        let name = format!("{}-{}", kind.as_str(), id);
        store.pin_json(&name, payload).await.map_err(|e| {
            tracing::warn!(project = %id, kind = %kind, error = %e, "content upload failed");
            RegistryError::from(e)
        })
    }
}

fn check(caller: &Caller, project: &Project, kind: ContentKind) -> Result<(), RegistryError> {
    match evaluate_attach(caller, &target_of(project), kind) {
        AttachDecision::Permit => Ok(()),
        AttachDecision::Hidden(concealment) => Err(RegistryError::concealed(
            concealment,
            project_label(project.id),
        )),
        AttachDecision::Forbidden => Err(RegistryError::Forbidden(format!(
            "{} may not attach {kind} to {}",
            caller.role,
            project_label(project.id)
        ))),
        AttachDecision::OutsideWindow => Err(RegistryError::InvalidAttachmentPoint(format!(
            "{kind} cannot be attached while the project is {}",
            project.status()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use bcr_content::ContentStoreError;
    use bcr_core::Role;
    use bcr_crypto::SecretHasher;
    use bcr_state::{LifecycleEvent, ProjectAttributes, ProjectStatus};

    use crate::principals::{CredentialStore, Profile, Registration};

    /// In-process content store.
    #[derive(Default)]
    struct FakeStore {
        fail: bool,
        calls: AtomicU32,
    }

    impl ContentStore for FakeStore {
        async fn pin_json(
            &self,
            name: &str,
            _payload: &serde_json::Value,
        ) -> Result<String, ContentStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ContentStoreError::Disabled)
            } else {
                Ok(format!("bafy-{name}"))
            }
        }
    }

    struct Fixture {
        principals: CredentialStore,
        projects: LifecycleManager,
        linker: ProvenanceLinker,
    }

    impl Fixture {
        fn new() -> Self {
            let principals =
                CredentialStore::new(SecretHasher::with_params(8, 1).unwrap()).unwrap();
            let projects = LifecycleManager::new(principals.clone());
            let linker = ProvenanceLinker::new(projects.clone());
            Self {
                principals,
                projects,
                linker,
            }
        }

        fn caller(&self, name: &str, role: Role) -> Caller {
            let p = self
                .principals
                .register(Registration {
                    identity: format!("{name}@example.com"),
                    secret: "secret-1".into(),
                    display_name: name.into(),
                    role: Some(role),
                    profile: Profile::default(),
                })
                .unwrap();
            Caller {
                id: p.id,
                role: p.role,
            }
        }
    }

    #[test]
    fn check_order_visibility_then_role_then_window() {
        let f = Fixture::new();
        let alice = f.caller("alice", Role::Submitter);
        let rita = f.caller("rita", Role::Reviewer);
        let p = f
            .projects
            .create(&alice, ProjectAttributes::titled("Mangroves"))
            .unwrap();

        // Reviewer cannot see a draft.
        assert!(matches!(
            f.linker.attach(p.id, ContentKind::VerificationReport, "bafy1", &rita),
            Err(RegistryError::NotFound(_))
        ));
        // Owner sees it but may never attach a verification report.
        assert!(matches!(
            f.linker.attach(p.id, ContentKind::VerificationReport, "bafy1", &alice),
            Err(RegistryError::Forbidden(_))
        ));
        // Owner may attach monitoring evidence, just not yet.
        assert!(matches!(
            f.linker.attach(p.id, ContentKind::MonitoringEvidence, "bafy1", &alice),
            Err(RegistryError::InvalidAttachmentPoint(_))
        ));
    }

    #[test]
    fn reattaching_identical_pair_is_idempotent() {
        let f = Fixture::new();
        let alice = f.caller("alice", Role::Submitter);
        let p = f
            .projects
            .create(&alice, ProjectAttributes::titled("Mangroves"))
            .unwrap();
        f.linker.attach(p.id, ContentKind::Documentation, "bafy1", &alice).unwrap();
        let again = f
            .linker
            .attach(p.id, ContentKind::Documentation, "bafy1", &alice)
            .unwrap();
        assert_eq!(again.content().len(), 1);
    }

    #[tokio::test]
    async fn attach_uploaded_appends_returned_cid() {
        let f = Fixture::new();
        let alice = f.caller("alice", Role::Submitter);
        let p = f
            .projects
            .create(&alice, ProjectAttributes::titled("Mangroves"))
            .unwrap();
        let store = FakeStore::default();
        let updated = f
            .linker
            .attach_uploaded(
                p.id,
                ContentKind::Documentation,
                &serde_json::json!({"design": "v1"}),
                &alice,
                &store,
            )
            .await
            .unwrap();
        assert_eq!(
            updated.content()[0].content_ref,
            format!("bafy-documentation-{}", p.id)
        );
    }

    #[tokio::test]
    async fn attach_uploaded_prechecks_before_upload() {
        let f = Fixture::new();
        let alice = f.caller("alice", Role::Submitter);
        let p = f
            .projects
            .create(&alice, ProjectAttributes::titled("Mangroves"))
            .unwrap();
        let store = FakeStore::default();
        let err = f
            .linker
            .attach_uploaded(p.id, ContentKind::CreditMetadata, &serde_json::json!({}), &alice, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Forbidden(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upload_failure_leaves_project_untouched() {
        let f = Fixture::new();
        let alice = f.caller("alice", Role::Submitter);
        let p = f
            .projects
            .create(&alice, ProjectAttributes::titled("Mangroves"))
            .unwrap();
        let store = FakeStore {
            fail: true,
            ..FakeStore::default()
        };
        let err = f
            .linker
            .attach_uploaded(p.id, ContentKind::Documentation, &serde_json::json!({}), &alice, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::UpstreamUnavailable(_)));
        let after = f.projects.list_owned_by(alice.id);
        assert!(after[0].content().is_empty());
    }

    #[test]
    fn admin_attaches_credit_metadata_after_tokenize() {
        let f = Fixture::new();
        let alice = f.caller("alice", Role::Submitter);
        let ada = f.caller("ada", Role::Administrator);
        let p = f
            .projects
            .create(&alice, ProjectAttributes::titled("Mangroves"))
            .unwrap();
        for (who, event) in [
            (&alice, LifecycleEvent::Submit),
            (&ada, LifecycleEvent::BeginReview),
            (&ada, LifecycleEvent::Approve),
            (&ada, LifecycleEvent::Tokenize),
        ] {
            f.projects.transition(p.id, who, event).unwrap();
        }
        let updated = f
            .linker
            .attach(p.id, ContentKind::CreditMetadata, "bafycredits", &ada)
            .unwrap();
        assert_eq!(updated.status(), ProjectStatus::Tokenized);
        assert_eq!(updated.content().len(), 1);
    }
}
