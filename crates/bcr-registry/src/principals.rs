//! # Credential Store
//!
//! Registered principals, keyed by id and by normalized identity. Both
//! indexes live under one lock so identity uniqueness is enforced
//! atomically.
//!
//! Secret hashing is Argon2id and deliberately slow. Callers on an async
//! runtime should run [`CredentialStore::register`] and
//! [`CredentialStore::authenticate`] on a blocking thread.

use std::collections::HashMap;
use std::sync::Arc;

use bcr_core::{Identity, PrincipalId, Role, Timestamp, ValidationError};
use bcr_crypto::{CryptoError, SecretHasher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

const MIN_SECRET_LEN: usize = 6;
const MIN_DISPLAY_NAME_LEN: usize = 2;
const MAX_PROFILE_FIELD_LEN: usize = 200;

/// A registered participant. Never hard-deleted.
///
/// Carries the secret hash, so it is not `Serialize`. Use
/// [`PrincipalView`] for anything leaving the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique id.
    pub id: PrincipalId,
    /// Normalized login identity.
    pub identity: Identity,
    /// Argon2id PHC string.
    pub secret_hash: String,
    /// Name shown to other participants.
    pub display_name: String,
    /// Fixed at registration.
    pub role: Role,
    /// Profile attributes.
    pub profile: Profile,
    /// Registration time.
    pub created_at: Timestamp,
    /// Last profile change.
    pub updated_at: Timestamp,
}

/// Optional profile attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Employer or affiliation.
    pub organization: Option<String>,
    /// Country of operation.
    pub country: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
}

/// A principal without its secret hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalView {
    /// Unique id.
    pub id: PrincipalId,
    /// Normalized login identity.
    pub identity: Identity,
    /// Display name.
    pub display_name: String,
    /// Role.
    pub role: Role,
    /// Employer or affiliation.
    pub organization: Option<String>,
    /// Country of operation.
    pub country: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Registration time.
    pub created_at: Timestamp,
}

impl From<&Principal> for PrincipalView {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id,
            identity: p.identity.clone(),
            display_name: p.display_name.clone(),
            role: p.role,
            organization: p.profile.organization.clone(),
            country: p.profile.country.clone(),
            phone: p.profile.phone.clone(),
            created_at: p.created_at,
        }
    }
}

/// Everything needed to register a principal.
#[derive(Clone)]
pub struct Registration {
    /// Raw identity; normalized during registration.
    pub identity: String,
    /// Plaintext secret; hashed during registration and then dropped.
    pub secret: String,
    /// Display name.
    pub display_name: String,
    /// Requested role. Consumer when absent.
    pub role: Option<Role>,
    /// Profile attributes.
    pub profile: Profile,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("role", &self.role)
            .finish()
    }
}

#[derive(Debug, Default)]
struct Indexes {
    by_id: HashMap<PrincipalId, Principal>,
    by_identity: HashMap<Identity, PrincipalId>,
}

/// In-memory principal registry. Clone-friendly.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    inner: Arc<RwLock<Indexes>>,
    hasher: SecretHasher,
    // Verified against when the identity is unknown, so both failure paths
    // cost one Argon2 evaluation.
    dummy_hash: Arc<str>,
}

impl CredentialStore {
    /// Create an empty store hashing with `hasher`.
    pub fn new(hasher: SecretHasher) -> Result<Self, CryptoError> {
        let dummy_hash: Arc<str> = hasher.hash("registry-dummy-secret")?.into();
        Ok(Self {
            inner: Arc::new(RwLock::new(Indexes::default())),
            hasher,
            dummy_hash,
        })
    }

    /// Store a principal with an already-hashed secret.
    ///
    /// Fails with `Conflict` if the identity is taken.
    pub fn create(
        &self,
        identity: Identity,
        secret_hash: String,
        display_name: String,
        role: Role,
        profile: Profile,
    ) -> Result<Principal, RegistryError> {
        let now = Timestamp::now();
        let principal = Principal {
            id: PrincipalId::new(),
            identity,
            secret_hash,
            display_name,
            role,
            profile,
            created_at: now,
            updated_at: now,
        };

        let mut guard = self.inner.write();
        if guard.by_identity.contains_key(&principal.identity) {
            return Err(RegistryError::Conflict(format!(
                "identity {} is already registered",
                principal.identity
            )));
        }
        guard
            .by_identity
            .insert(principal.identity.clone(), principal.id);
        guard.by_id.insert(principal.id, principal.clone());
        drop(guard);

        tracing::info!(principal = %principal.id, role = %principal.role, "principal registered");
        Ok(principal)
    }

    /// Validate, hash, and store a new principal.
    pub fn register(&self, registration: Registration) -> Result<Principal, RegistryError> {
        let identity = Identity::new(&registration.identity)?;
        if registration.secret.chars().count() < MIN_SECRET_LEN {
            return Err(ValidationError::TooShort {
                field: "secret",
                min: MIN_SECRET_LEN,
            }
            .into());
        }
        let display_name = registration.display_name.trim().to_string();
        if display_name.chars().count() < MIN_DISPLAY_NAME_LEN {
            return Err(ValidationError::TooShort {
                field: "display_name",
                min: MIN_DISPLAY_NAME_LEN,
            }
            .into());
        }
        let profile = normalize_profile(registration.profile)?;

        // Cheap pre-check so a duplicate does not pay for hashing. `create`
        // re-checks under the write lock.
        if self.inner.read().by_identity.contains_key(&identity) {
            return Err(RegistryError::Conflict(format!(
                "identity {identity} is already registered"
            )));
        }

        let secret_hash = self.hasher.hash(&registration.secret)?;
        self.create(
            identity,
            secret_hash,
            display_name,
            registration.role.unwrap_or_default(),
            profile,
        )
    }

    /// Look up by identity.
    pub fn resolve(&self, identity: &Identity) -> Result<Principal, RegistryError> {
        let guard = self.inner.read();
        guard
            .by_identity
            .get(identity)
            .and_then(|id| guard.by_id.get(id))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("principal {identity}")))
    }

    /// Look up by id.
    pub fn resolve_id(&self, id: PrincipalId) -> Result<Principal, RegistryError> {
        self.inner
            .read()
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("principal {id}")))
    }

    /// Constant-time check of a candidate secret.
    pub fn verify_secret(&self, principal: &Principal, candidate: &str) -> bool {
        self.hasher.verify(&principal.secret_hash, candidate)
    }

    /// Resolve and verify in one step.
    ///
    /// Unknown identities (including unparseable ones) and wrong secrets
    /// both yield `InvalidCredentials` after one hash verification.
    pub fn authenticate(&self, identity: &str, secret: &str) -> Result<Principal, RegistryError> {
        let found = Identity::new(identity)
            .ok()
            .and_then(|id| self.resolve(&id).ok());
        match found {
            Some(principal) if self.verify_secret(&principal, secret) => {
                tracing::debug!(principal = %principal.id, "authenticated");
                Ok(principal)
            }
            Some(principal) => {
                tracing::info!(principal = %principal.id, "authentication failed: wrong secret");
                Err(RegistryError::InvalidCredentials)
            }
            None => {
                let _ = self.hasher.verify(&self.dummy_hash, secret);
                tracing::info!("authentication failed: unknown identity");
                Err(RegistryError::InvalidCredentials)
            }
        }
    }

    /// Insert a principal loaded from storage. Replaces any existing entry
    /// with the same id.
    pub fn restore(&self, principal: Principal) {
        let mut guard = self.inner.write();
        guard
            .by_identity
            .insert(principal.identity.clone(), principal.id);
        guard.by_id.insert(principal.id, principal);
    }

    /// Remove a principal whose registration could not be recorded, so
    /// the identity can register again. Returns whether it was removed.
    pub fn discard(&self, id: PrincipalId) -> bool {
        let mut guard = self.inner.write();
        let Some(principal) = guard.by_id.remove(&id) else {
            return false;
        };
        guard.by_identity.remove(&principal.identity);
        drop(guard);
        tracing::warn!(principal = %id, "principal registration reverted");
        true
    }

    /// Number of registered principals.
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    /// Whether no principal is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize_profile(profile: Profile) -> Result<Profile, ValidationError> {
    fn field(value: Option<String>, name: &'static str) -> Result<Option<String>, ValidationError> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if v.is_empty() => Ok(None),
            Some(v) if v.chars().count() > MAX_PROFILE_FIELD_LEN => Err(ValidationError::TooLong {
                field: name,
                max: MAX_PROFILE_FIELD_LEN,
            }),
            other => Ok(other),
        }
    }
    Ok(Profile {
        organization: field(profile.organization, "organization")?,
        country: field(profile.country, "country")?,
        phone: field(profile.phone, "phone")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new(SecretHasher::with_params(8, 1).unwrap()).unwrap()
    }

    fn registration(identity: &str) -> Registration {
        Registration {
            identity: identity.into(),
            secret: "correct horse".into(),
            display_name: "Alice".into(),
            role: Some(Role::Submitter),
            profile: Profile::default(),
        }
    }

    #[test]
    fn register_then_authenticate() {
        let s = store();
        let p = s.register(registration("Alice@Example.com")).unwrap();
        assert_eq!(p.identity.as_str(), "alice@example.com");
        let authed = s.authenticate("  ALICE@example.com", "correct horse").unwrap();
        assert_eq!(authed.id, p.id);
    }

    #[test]
    fn authenticate_then_introspect_matches_resolve() {
        let s = store();
        s.register(registration("alice@example.com")).unwrap();
        let authed = s.authenticate("alice@example.com", "correct horse").unwrap();
        let introspected = s.resolve_id(authed.id).unwrap();
        let resolved = s.resolve(&Identity::new("alice@example.com").unwrap()).unwrap();
        assert_eq!(PrincipalView::from(&introspected), PrincipalView::from(&resolved));
    }

    #[test]
    fn wrong_secret_and_unknown_identity_look_the_same() {
        let s = store();
        s.register(registration("alice@example.com")).unwrap();
        let wrong = s.authenticate("alice@example.com", "nope nope").unwrap_err();
        let unknown = s.authenticate("mallory@example.com", "correct horse").unwrap_err();
        let garbage = s.authenticate("not an email", "x").unwrap_err();
        assert!(matches!(wrong, RegistryError::InvalidCredentials));
        assert!(matches!(unknown, RegistryError::InvalidCredentials));
        assert!(matches!(garbage, RegistryError::InvalidCredentials));
    }

    #[test]
    fn duplicate_identity_conflicts_case_insensitively() {
        let s = store();
        s.register(registration("alice@example.com")).unwrap();
        let err = s.register(registration("ALICE@EXAMPLE.COM")).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn discarded_identity_can_register_again() {
        let s = store();
        let first = s.register(registration("alice@example.com")).unwrap();
        assert!(s.discard(first.id));
        assert!(!s.discard(first.id));
        assert!(s.is_empty());
        assert!(matches!(
            s.authenticate("alice@example.com", "correct horse"),
            Err(RegistryError::InvalidCredentials)
        ));

        let second = s.register(registration("alice@example.com")).unwrap();
        assert_ne!(second.id, first.id);
    }

    #[test]
    fn concurrent_create_admits_one() {
        let s = store();
        let id = Identity::new("race@example.com").unwrap();
        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let s = s.clone();
                    let id = id.clone();
                    scope.spawn(move || {
                        s.create(id, "h".into(), "Racer".into(), Role::Consumer, Profile::default())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    }

    #[test]
    fn registration_validation() {
        let s = store();
        let mut short_secret = registration("a@example.com");
        short_secret.secret = "12345".into();
        assert!(matches!(s.register(short_secret), Err(RegistryError::Validation(_))));

        let mut short_name = registration("b@example.com");
        short_name.display_name = " A ".into();
        assert!(matches!(s.register(short_name), Err(RegistryError::Validation(_))));

        let bad_identity = registration("not-an-email");
        assert!(matches!(s.register(bad_identity), Err(RegistryError::Validation(_))));
    }

    #[test]
    fn role_defaults_to_consumer() {
        let s = store();
        let mut r = registration("c@example.com");
        r.role = None;
        assert_eq!(s.register(r).unwrap().role, Role::Consumer);
    }

    #[test]
    fn blank_profile_fields_become_none() {
        let s = store();
        let mut r = registration("d@example.com");
        r.profile.organization = Some("  ".into());
        r.profile.country = Some(" Kenya ".into());
        let p = s.register(r).unwrap();
        assert_eq!(p.profile.organization, None);
        assert_eq!(p.profile.country.as_deref(), Some("Kenya"));
    }

    #[test]
    fn view_omits_secret_hash() {
        let s = store();
        let p = s.register(registration("e@example.com")).unwrap();
        let json = serde_json::to_string(&PrincipalView::from(&p)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn registration_debug_redacts_secret() {
        let dbg = format!("{:?}", registration("f@example.com"));
        assert!(!dbg.contains("correct horse"));
    }
}
