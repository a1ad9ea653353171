//! # Database Persistence Layer
//!
//! Optional PostgreSQL persistence via SQLx.
//!
//! When `DATABASE_URL` is set, every successful in-memory mutation is
//! written through to Postgres and the in-memory stores are hydrated from
//! it at startup. When absent, the API runs in-memory only (development
//! and tests).
//!
//! The registry stays the source of truth for rules. Rows are written
//! with a conditional upsert that never replaces a newer `updated_at`,
//! so two racing write-throughs for one project settle on the later
//! state.

pub mod principals;
pub mod projects;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect to `url` and run migrations.
///
/// Returns `None` if no URL is configured (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool(url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let url = match url {
        Some(url) => url,
        None => {
            tracing::warn!(
                "DATABASE_URL not set; running in-memory only. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Wrap a domain decode failure as an SQLx decode error.
pub(crate) fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}
