use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::models::{BusinessType, Region};

use super::{ReferenceStore, StoreError};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

impl From<PostgresError> for StoreError {
    fn from(value: PostgresError) -> Self {
        match value {
            PostgresError::SqlxError(err) => match err {
                sqlx::Error::PoolTimedOut => StoreError::Timeout("postgres pool acquire".into()),
                sqlx::Error::Io(e) => StoreError::Unavailable(format!("postgres io: {}", e)),
                sqlx::Error::Tls(e) => StoreError::Unavailable(format!("postgres tls: {}", e)),
                sqlx::Error::PoolClosed => StoreError::Unavailable("postgres pool closed".into()),
                sqlx::Error::WorkerCrashed => StoreError::Unavailable("postgres worker crashed".into()),
                sqlx::Error::Database(e) => {
                    if is_transient_sqlstate(e.code().as_deref()) {
                        StoreError::Unavailable(format!("postgres: {}", e))
                    } else {
                        StoreError::Malformed(format!("postgres: {}", e))
                    }
                }
                other => StoreError::Malformed(format!("postgres: {}", other)),
            },
            PostgresError::MigrateError(e) => StoreError::Unavailable(format!("postgres migration: {}", e)),
        }
    }
}

/// SQLSTATE classes that describe the server or connection rather than the
/// query: connection exceptions (08), rollbacks such as deadlocks (40),
/// insufficient resources (53) and operator intervention (57)
fn is_transient_sqlstate(code: Option<&str>) -> bool {
    matches!(
        code.and_then(|c| c.get(..2)),
        Some("08") | Some("40") | Some("53") | Some("57")
    )
}

/// PostgreSQL-backed reference store
///
/// Holds the region hierarchy and the business-type taxonomy. Every read is
/// a single indexed query; hierarchy expansion happens one level at a time in
/// the engine.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL reference store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5).max(1)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Create the reference tables if they do not exist yet
    pub async fn run_migrations(&self) -> Result<(), PostgresError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn fetch_region(&self, id: &str) -> Result<Option<Region>, PostgresError> {
        let query = r#"
            SELECT id, name, parent_region_id, center_latitude, center_longitude, created_at, updated_at
            FROM regions
            WHERE id = $1
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| region_from_row(&r)).transpose()
    }

    async fn fetch_region_children(&self, id: &str) -> Result<Vec<Region>, PostgresError> {
        let query = r#"
            SELECT id, name, parent_region_id, center_latitude, center_longitude, created_at, updated_at
            FROM regions
            WHERE parent_region_id = $1
            ORDER BY id
        "#;

        let rows = sqlx::query(query).bind(id).fetch_all(&self.pool).await?;
        rows.iter().map(region_from_row).collect()
    }

    async fn fetch_regions(&self) -> Result<Vec<Region>, PostgresError> {
        let query = r#"
            SELECT id, name, parent_region_id, center_latitude, center_longitude, created_at, updated_at
            FROM regions
            ORDER BY name
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        let regions: Vec<Region> = rows.iter().map(region_from_row).collect::<Result<_, _>>()?;

        tracing::debug!("Loaded {} regions", regions.len());
        Ok(regions)
    }

    async fn fetch_business_type(&self, id: &str) -> Result<Option<BusinessType>, PostgresError> {
        let query = r#"
            SELECT id, name, description, created_at, updated_at
            FROM business_types
            WHERE id = $1
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| business_type_from_row(&r)).transpose()
    }

    async fn fetch_business_types(&self) -> Result<Vec<BusinessType>, PostgresError> {
        let query = r#"
            SELECT id, name, description, created_at, updated_at
            FROM business_types
            ORDER BY name
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        rows.iter().map(business_type_from_row).collect()
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn region_from_row(row: &PgRow) -> Result<Region, PostgresError> {
    Ok(Region {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        parent_region_id: row.try_get("parent_region_id")?,
        center_latitude: row.try_get("center_latitude")?,
        center_longitude: row.try_get("center_longitude")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn business_type_from_row(row: &PgRow) -> Result<BusinessType, PostgresError> {
    Ok(BusinessType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ReferenceStore for PostgresClient {
    async fn get_region(&self, id: &str) -> Result<Option<Region>, StoreError> {
        Ok(self.fetch_region(id).await?)
    }

    async fn get_region_children(&self, id: &str) -> Result<Vec<Region>, StoreError> {
        Ok(self.fetch_region_children(id).await?)
    }

    async fn get_business_type(&self, id: &str) -> Result<Option<BusinessType>, StoreError> {
        Ok(self.fetch_business_type(id).await?)
    }

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError> {
        Ok(self.fetch_regions().await?)
    }

    async fn list_business_types(&self) -> Result<Vec<BusinessType>, StoreError> {
        Ok(self.fetch_business_types().await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.health_check().await?;
        Ok(())
    }
}
