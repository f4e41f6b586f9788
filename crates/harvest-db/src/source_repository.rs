use harvest_core::error::AppError;
use harvest_core::models::{NewSource, Source, SourceKind};
use harvest_core::traits::SourceStore;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

/// Repository for configured sources in PostgreSQL.
#[derive(Clone)]
pub struct SourceRepository {
    pool: Pool<Postgres>,
}

impl SourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SourceRow {
    id: Uuid,
    name: String,
    url: String,
    selector: Option<String>,
    #[sqlx(rename = "type")]
    kind: String,
}

impl From<SourceRow> for Source {
    fn from(row: SourceRow) -> Self {
        Source {
            id: row.id,
            name: row.name,
            url: row.url,
            selector: row.selector,
            kind: SourceKind::from(row.kind),
        }
    }
}

impl SourceStore for SourceRepository {
    async fn list_all(&self) -> Result<Vec<Source>, AppError> {
        let rows = sqlx::query_as::<_, SourceRow>(
            r#"
            SELECT id, name, url, selector, type
            FROM sources
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Source>, AppError> {
        let row = sqlx::query_as::<_, SourceRow>(
            r#"SELECT id, name, url, selector, type FROM sources WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, source: &NewSource) -> Result<Source, AppError> {
        let row = sqlx::query_as::<_, SourceRow>(
            r#"
            INSERT INTO sources (name, url, selector, type)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, url, selector, type
            "#,
        )
        .bind(&source.name)
        .bind(&source.url)
        .bind(&source.selector)
        .bind(source.kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.into())
    }

    async fn count(&self) -> Result<u64, AppError> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM sources"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(count.max(0) as u64)
    }
}
