//! # Application State
//!
//! Everything a handler needs, built once at startup and cloned per
//! request. Each component shares its state through `Arc` internals, so a
//! clone is cheap and all clones see the same registry.

use std::collections::HashMap;
use std::sync::Arc;

use bcr_content::ContentStoreClient;
use bcr_core::ProjectId;
use bcr_crypto::{CryptoError, SecretHasher, SigningKeyPair, TokenService};
use bcr_registry::{CredentialStore, LifecycleManager, Principal, ProvenanceLinker};
use bcr_state::Project;
use parking_lot::Mutex;
use sqlx::PgPool;
use tokio::sync::OwnedMutexGuard;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::middleware::metrics::ApiMetrics;

/// Shared application state accessible to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    // -- Registry --
    pub principals: CredentialStore,
    pub projects: LifecycleManager,
    pub provenance: ProvenanceLinker,

    // -- Credentials --
    pub tokens: TokenService,

    // -- External content store --
    pub content: ContentStoreClient,

    // -- Database persistence (optional) --
    /// When `Some`, principals and projects are written through to
    /// Postgres after every successful mutation.
    pub db_pool: Option<PgPool>,
    pub write_gates: WriteGates,

    pub metrics: ApiMetrics,
    pub config: AppConfig,
}

impl AppState {
    /// Build the state from configuration.
    ///
    /// Returns `Err` if `REGISTRY_SIGNING_KEY_HEX` is set but malformed.
    pub fn try_with_config(
        config: AppConfig,
        hasher: SecretHasher,
        content: ContentStoreClient,
        db_pool: Option<PgPool>,
    ) -> Result<Self, CryptoError> {
        let signing_key = load_or_generate_signing_key(&config)?;
        tracing::info!(
            verifying_key = %signing_key.verifying_key_hex().0,
            "credential signing key loaded"
        );
        let tokens = TokenService::new(signing_key, config.token_ttl);

        let principals = CredentialStore::new(hasher)?;
        let projects = LifecycleManager::new(principals.clone());
        let provenance = ProvenanceLinker::new(projects.clone());

        Ok(Self {
            principals,
            projects,
            provenance,
            tokens,
            content,
            db_pool,
            write_gates: WriteGates::default(),
            metrics: ApiMetrics::new(),
            config,
        })
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available.
    /// Principals load first so public projections can resolve owners.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let principals = crate::db::principals::load_all(pool).await?;
        let principal_count = principals.len();
        for principal in principals {
            self.principals.restore(principal);
        }

        let projects = crate::db::projects::load_all(pool).await?;
        let project_count = projects.len();
        for project in projects {
            self.projects.restore(project);
        }

        tracing::info!(
            principals = principal_count,
            projects = project_count,
            "Hydrated in-memory stores from database"
        );
        Ok(())
    }

    /// Write a new principal through to the database, if one is
    /// configured. On failure the registration is dropped from memory too,
    /// so the identity can retry.
    pub async fn persist_principal(&self, principal: &Principal) -> Result<(), AppError> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };
        if let Err(e) = crate::db::principals::upsert(pool, principal).await {
            tracing::error!(principal = %principal.id, error = %e, "failed to persist principal");
            self.principals.discard(principal.id);
            return Err(AppError::Internal("failed to record principal".into()));
        }
        Ok(())
    }

    /// Write a newly created project through to the database. On failure
    /// the project is removed from memory.
    pub async fn persist_new_project(&self, project: &Project) -> Result<(), AppError> {
        if let Err(e) = self.write_project(project).await {
            self.projects.discard(project);
            return Err(e);
        }
        Ok(())
    }

    /// Write the result of a mutation through to the database. On failure
    /// the in-memory record is rolled back to `before`.
    ///
    /// Callers hold the project's write gate from before taking `before`
    /// until this returns, so no other request can commit in between.
    pub async fn persist_project_change(
        &self,
        before: Project,
        after: &Project,
    ) -> Result<(), AppError> {
        if before.version() == after.version() {
            return Ok(());
        }
        if let Err(e) = self.write_project(after).await {
            if !self.projects.revert(before, after) {
                tracing::error!(
                    project = %after.id,
                    version = after.version(),
                    "could not roll back unpersisted project change"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    async fn write_project(&self, project: &Project) -> Result<(), AppError> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };
        crate::db::projects::upsert(pool, project).await.map_err(|e| {
            tracing::error!(project = %project.id, error = %e, "failed to persist project");
            AppError::Internal("failed to record project".into())
        })
    }
}

/// Per-project async locks that keep mutating requests on one project
/// from interleaving across the database write.
#[derive(Debug, Clone, Default)]
pub struct WriteGates {
    gates: Arc<Mutex<HashMap<ProjectId, Arc<tokio::sync::Mutex<()>>>>>,
}

impl WriteGates {
    /// Wait for exclusive write access to `id`. Held until the guard drops.
    pub async fn acquire(&self, id: ProjectId) -> OwnedMutexGuard<()> {
        let gate = Arc::clone(self.gates.lock().entry(id).or_default());
        gate.lock_owned().await
    }
}

/// Load the credential signing key from configuration, or generate one
/// for development.
///
/// In production, `REGISTRY_SIGNING_KEY_HEX` provides the 64-character
/// hex-encoded Ed25519 seed. Without it a fresh key is generated and every
/// credential issued becomes unverifiable after restart.
fn load_or_generate_signing_key(config: &AppConfig) -> Result<SigningKeyPair, CryptoError> {
    match &config.signing_key_hex {
        Some(hex) => SigningKeyPair::from_hex(hex),
        None => {
            tracing::warn!(
                "REGISTRY_SIGNING_KEY_HEX not set; generating ephemeral key. \
                 Issued credentials will not survive a restart."
            );
            Ok(SigningKeyPair::generate())
        }
    }
}
