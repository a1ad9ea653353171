//! Project persistence. Operates on the `projects` table.
//!
//! The full project, transition log and content references included, is
//! stored as one JSONB document. `owner_id` and `status` are copied into
//! columns for operators; the application never queries by them. The
//! `version` column orders writes.

use bcr_state::Project;
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_error;

/// Insert or update a project. A row is only replaced by a strictly
/// newer version, so an older snapshot never overwrites a newer row.
pub async fn upsert(pool: &PgPool, project: &Project) -> Result<(), sqlx::Error> {
    let document = serde_json::to_value(project).map_err(|e| {
        tracing::error!(project = %project.id, error = %e, "failed to serialize project");
        sqlx::Error::Encode(Box::new(e))
    })?;
    let version = i64::try_from(project.version()).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let result = sqlx::query(
        "INSERT INTO projects (id, owner_id, status, document, created_at, updated_at, version)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            document = EXCLUDED.document,
            updated_at = EXCLUDED.updated_at,
            version = EXCLUDED.version
         WHERE projects.version < EXCLUDED.version",
    )
    .bind(*project.id.as_uuid())
    .bind(*project.owner.as_uuid())
    .bind(project.status().as_str())
    .bind(&document)
    .bind(*project.created_at.as_datetime())
    .bind(*project.updated_at.as_datetime())
    .bind(version)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::debug!(project = %project.id, version, "stored project is already newer");
    }
    Ok(())
}

/// Load all projects on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        "SELECT id, document FROM projects ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row.document).map_err(|e| {
                tracing::error!(project = %row.id, error = %e, "stored project document is invalid");
                decode_error(e)
            })
        })
        .collect()
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    document: serde_json::Value,
}
