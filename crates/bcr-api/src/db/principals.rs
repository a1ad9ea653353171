//! Principal persistence. Operates on the `principals` table.

use bcr_core::{Identity, PrincipalId, Role, Timestamp};
use bcr_registry::{Principal, Profile};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_error;

/// Insert or update a principal. An older snapshot never overwrites a
/// newer row.
pub async fn upsert(pool: &PgPool, principal: &Principal) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO principals
            (id, identity, secret_hash, display_name, role, organization, country, phone, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (id) DO UPDATE SET
            secret_hash = EXCLUDED.secret_hash,
            display_name = EXCLUDED.display_name,
            organization = EXCLUDED.organization,
            country = EXCLUDED.country,
            phone = EXCLUDED.phone,
            updated_at = EXCLUDED.updated_at
         WHERE principals.updated_at <= EXCLUDED.updated_at",
    )
    .bind(*principal.id.as_uuid())
    .bind(principal.identity.as_str())
    .bind(&principal.secret_hash)
    .bind(&principal.display_name)
    .bind(principal.role.as_str())
    .bind(&principal.profile.organization)
    .bind(&principal.profile.country)
    .bind(&principal.profile.phone)
    .bind(*principal.created_at.as_datetime())
    .bind(*principal.updated_at.as_datetime())
    .execute(pool)
    .await?;
    Ok(())
}

/// Load all principals on startup.
///
/// A row whose identity or role no longer parses fails the whole load
/// rather than being skipped.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Principal>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PrincipalRow>(
        "SELECT id, identity, secret_hash, display_name, role, organization, country, phone, created_at, updated_at
         FROM principals ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(PrincipalRow::into_principal).collect()
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    identity: String,
    secret_hash: String,
    display_name: String,
    role: String,
    organization: Option<String>,
    country: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PrincipalRow {
    fn into_principal(self) -> Result<Principal, sqlx::Error> {
        let identity = Identity::new(&self.identity).map_err(|e| {
            tracing::error!(id = %self.id, error = %e, "stored identity is invalid");
            decode_error(e)
        })?;
        let role: Role = self.role.parse().map_err(|e| {
            tracing::error!(id = %self.id, role = %self.role, "stored role is unknown");
            decode_error(e)
        })?;
        Ok(Principal {
            id: PrincipalId::from_uuid(self.id),
            identity,
            secret_hash: self.secret_hash,
            display_name: self.display_name,
            role,
            profile: Profile {
                organization: self.organization,
                country: self.country,
                phone: self.phone,
            },
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
        })
    }
}
