//! End-to-end registry scenarios: the reviewer workflow, concurrent
//! submission, and property tests over random operation sequences.

use std::sync::Arc;

use bcr_core::{Role, Timestamp};
use bcr_crypto::{SecretHasher, SigningKeyPair, TokenService};
use bcr_registry::{
    CredentialStore, LifecycleManager, Profile, ProjectRead, ProvenanceLinker, Registration,
    RegistryError,
};
use bcr_state::{Caller, ContentKind, LifecycleEvent, ProjectAttributes, ProjectStatus};
use proptest::prelude::*;

struct Registry {
    principals: CredentialStore,
    projects: LifecycleManager,
    linker: ProvenanceLinker,
}

fn registry() -> Registry {
    let principals = CredentialStore::new(SecretHasher::with_params(8, 1).unwrap()).unwrap();
    let projects = LifecycleManager::new(principals.clone());
    let linker = ProvenanceLinker::new(projects.clone());
    Registry {
        principals,
        projects,
        linker,
    }
}

fn register(r: &Registry, name: &str, role: Role) -> Caller {
    let p = r
        .principals
        .register(Registration {
            identity: format!("{name}@example.com"),
            secret: "password1".into(),
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

#[test]
fn alice_and_bob_review_workflow() {
    let r = registry();
    let alice = register(&r, "alice", Role::Submitter);
    let bob = register(&r, "bob", Role::Reviewer);

    let project = r
        .projects
        .create(&alice, ProjectAttributes::titled("Sundarbans mangroves"))
        .unwrap();
    assert_eq!(project.status(), ProjectStatus::Draft);

    // Owner cannot approve their own draft.
    assert!(matches!(
        r.projects.transition(project.id, &alice, LifecycleEvent::Approve),
        Err(RegistryError::InvalidTransition(_))
    ));
    // Bob cannot see it yet.
    assert!(matches!(
        r.projects.get(project.id, &bob),
        Err(RegistryError::NotFound(_))
    ));

    r.projects
        .transition(project.id, &alice, LifecycleEvent::Submit)
        .unwrap();
    r.projects
        .transition(project.id, &bob, LifecycleEvent::BeginReview)
        .unwrap();
    let rejected = r
        .projects
        .transition(project.id, &bob, LifecycleEvent::Reject)
        .unwrap();
    assert_eq!(rejected.status(), ProjectStatus::Rejected);

    for event in LifecycleEvent::ALL {
        match r.projects.transition(project.id, &bob, event) {
            Err(RegistryError::InvalidTransition(msg)) => {
                assert!(msg.contains("accepts no further events"), "{msg}")
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    let log: Vec<_> = rejected.transitions().iter().map(|t| (t.from, t.to)).collect();
    assert_eq!(
        log,
        vec![
            (ProjectStatus::Draft, ProjectStatus::Submitted),
            (ProjectStatus::Submitted, ProjectStatus::UnderReview),
            (ProjectStatus::UnderReview, ProjectStatus::Rejected),
        ]
    );
    assert_eq!(rejected.transitions()[0].actor, alice.id);
    assert_eq!(rejected.transitions()[2].actor, bob.id);
}

#[test]
fn credential_round_trip_resolves_same_principal() {
    let r = registry();
    register(&r, "alice", Role::Submitter);
    let tokens = TokenService::new(
        SigningKeyPair::generate(),
        std::time::Duration::from_secs(60),
    );

    let authed = r.principals.authenticate("alice@example.com", "password1").unwrap();
    let credential = tokens.issue(authed.id, tokens.default_ttl());
    let principal_id = tokens.verify(&credential).unwrap();
    let introspected = r.principals.resolve_id(principal_id).unwrap();
    assert_eq!(introspected, authed);

    let later = Timestamp::now().plus_secs(120);
    assert!(tokens.verify_at(&credential, later).is_err());
    let refreshed = tokens.refresh_at(&credential, later).unwrap();
    assert_eq!(tokens.verify_at(&refreshed, later).unwrap(), authed.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submits_yield_exactly_one_success() {
    for _ in 0..25 {
        let r = registry();
        let alice = register(&r, "alice", Role::Submitter);
        let project = r
            .projects
            .create(&alice, ProjectAttributes::titled("race"))
            .unwrap();

        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let projects = r.projects.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    projects.transition(project.id, &alice, LifecycleEvent::Submit)
                })
            })
            .collect();

        let mut ok = 0;
        let mut invalid = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(RegistryError::InvalidTransition(_)) => invalid += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!((ok, invalid), (1, 1));

        let stored = match r.projects.get(project.id, &alice).unwrap() {
            ProjectRead::Full(p) => p,
            ProjectRead::Restricted(_) => panic!("owner must get the full projection"),
        };
        assert_eq!(stored.transitions().len(), 1);
    }
}

#[test]
fn consumers_never_see_unpublished_projects() {
    let r = registry();
    let alice = register(&r, "alice", Role::Submitter);
    let rita = register(&r, "rita", Role::Reviewer);
    let carl = register(&r, "carl", Role::Consumer);
    let p = r
        .projects
        .create(&alice, ProjectAttributes::titled("Kelp forest"))
        .unwrap();

    let steps = [
        (&alice, LifecycleEvent::Submit),
        (&rita, LifecycleEvent::BeginReview),
        (&rita, LifecycleEvent::Approve),
    ];
    for (who, event) in steps {
        assert!(r.projects.get(p.id, &carl).is_err());
        assert!(r.projects.list_public(None, None).unwrap().items.is_empty());
        r.projects.transition(p.id, who, event).unwrap();
    }
    assert!(matches!(
        r.projects.get(p.id, &carl).unwrap(),
        ProjectRead::Restricted(_)
    ));
    assert_eq!(r.projects.list_public(None, None).unwrap().total, 1);
}

#[test]
fn disallowed_events_on_public_projects_are_invalid_transitions() {
    let r = registry();
    let alice = register(&r, "alice", Role::Submitter);
    let sam = register(&r, "sam", Role::Submitter);
    let rita = register(&r, "rita", Role::Reviewer);
    let ada = register(&r, "ada", Role::Administrator);
    let p = r
        .projects
        .create(&alice, ProjectAttributes::titled("Eelgrass beds"))
        .unwrap();
    r.projects.transition(p.id, &alice, LifecycleEvent::Submit).unwrap();
    r.projects.transition(p.id, &rita, LifecycleEvent::BeginReview).unwrap();
    r.projects.transition(p.id, &rita, LifecycleEvent::Approve).unwrap();

    // Another submitter cannot read a verified project it does not own.
    assert!(matches!(
        r.projects.transition(p.id, &sam, LifecycleEvent::Tokenize),
        Err(RegistryError::InvalidTransition(_))
    ));

    r.projects.transition(p.id, &ada, LifecycleEvent::Tokenize).unwrap();
    // Reviewers do not read tokenized projects.
    assert!(matches!(
        r.projects.transition(p.id, &rita, LifecycleEvent::Approve),
        Err(RegistryError::InvalidTransition(_))
    ));
    assert_eq!(r.projects.get_public(p.id).unwrap().status, ProjectStatus::Tokenized);

    // A hidden draft stays hidden.
    let draft = r
        .projects
        .create(&alice, ProjectAttributes::titled("Salt marsh"))
        .unwrap();
    assert!(matches!(
        r.projects.transition(draft.id, &sam, LifecycleEvent::Submit),
        Err(RegistryError::NotFound(_))
    ));
}

// ── Properties ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Transition(usize, LifecycleEvent),
    Attach(usize, ContentKind, u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let actor = 0usize..4;
    prop_oneof![
        (actor.clone(), prop::sample::select(LifecycleEvent::ALL.to_vec()))
            .prop_map(|(a, e)| Op::Transition(a, e)),
        (
            actor,
            prop::sample::select(ContentKind::ALL.to_vec()),
            0u8..6
        )
            .prop_map(|(a, k, n)| Op::Attach(a, k, n)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_operations_preserve_history(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let r = registry();
        let actors = [
            register(&r, "alice", Role::Submitter),
            register(&r, "rita", Role::Reviewer),
            register(&r, "ada", Role::Administrator),
            register(&r, "carl", Role::Consumer),
        ];
        let project = r
            .projects
            .create(&actors[0], ProjectAttributes::titled("prop"))
            .unwrap();

        let mut seen_refs: Vec<(ContentKind, String)> = Vec::new();
        let mut seen_transitions = 0usize;

        for op in ops {
            match op {
                Op::Transition(a, event) => {
                    let _ = r.projects.transition(project.id, &actors[a], event);
                }
                Op::Attach(a, kind, n) => {
                    let _ = r.linker.attach(project.id, kind, &format!("bafy{n}"), &actors[a]);
                }
            }

            let current = match r.projects.get(project.id, &actors[2]).unwrap() {
                ProjectRead::Full(p) => p,
                ProjectRead::Restricted(_) => unreachable!(),
            };

            // Earlier content is never removed or rewritten.
            let now_refs: Vec<(ContentKind, String)> = current
                .content()
                .iter()
                .map(|c| (c.kind, c.content_ref.clone()))
                .collect();
            prop_assert!(now_refs.len() >= seen_refs.len());
            prop_assert_eq!(&now_refs[..seen_refs.len()], &seen_refs[..]);
            seen_refs = now_refs;

            // The transition log only grows, and forms a path from draft.
            prop_assert!(current.transitions().len() >= seen_transitions);
            seen_transitions = current.transitions().len();
            let mut status = ProjectStatus::Draft;
            for t in current.transitions() {
                prop_assert_eq!(t.from, status);
                prop_assert_eq!(status.apply(t.event), Some(t.to));
                status = t.to;
            }
            prop_assert_eq!(status, current.status());
        }
    }
}
