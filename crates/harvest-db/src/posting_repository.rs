use chrono::{DateTime, Utc};
use harvest_core::error::AppError;
use harvest_core::models::{NewPosting, StoredPosting};
use harvest_core::traits::PostingStore;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

/// Repository for harvested postings in PostgreSQL.
///
/// URL lookups go through the unique `lower(url)` index instead of scanning
/// every row.
#[derive(Clone)]
pub struct PostingRepository {
    pool: Pool<Postgres>,
}

impl PostingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recently fetched postings first.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<StoredPosting>, AppError> {
        let rows = sqlx::query_as::<_, PostingRow>(
            r#"
            SELECT id, source, title, company, location, description, url, posted_at, fetched_at
            FROM postings
            ORDER BY fetched_at DESC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM postings"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(count)
    }
}

#[derive(sqlx::FromRow)]
struct PostingRow {
    id: Uuid,
    source: String,
    title: String,
    company: String,
    location: Option<String>,
    description: String,
    url: String,
    posted_at: DateTime<Utc>,
    fetched_at: DateTime<Utc>,
}

impl From<PostingRow> for StoredPosting {
    fn from(row: PostingRow) -> Self {
        StoredPosting {
            id: row.id,
            source: row.source,
            title: row.title,
            company: row.company,
            location: row.location,
            description: row.description,
            url: row.url,
            posted_at: row.posted_at,
            fetched_at: row.fetched_at,
        }
    }
}

impl PostingStore for PostingRepository {
    async fn list_all(&self) -> Result<Vec<StoredPosting>, AppError> {
        let rows = sqlx::query_as::<_, PostingRow>(
            r#"
            SELECT id, source, title, company, location, description, url, posted_at, fetched_at
            FROM postings
            ORDER BY fetched_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredPosting>, AppError> {
        let row = sqlx::query_as::<_, PostingRow>(
            r#"
            SELECT id, source, title, company, location, description, url, posted_at, fetched_at
            FROM postings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn save(&self, posting: &NewPosting) -> Result<StoredPosting, AppError> {
        let row = sqlx::query_as::<_, PostingRow>(
            r#"
            INSERT INTO postings (source, title, company, location, description, url, posted_at, fetched_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, source, title, company, location, description, url, posted_at, fetched_at
            "#,
        )
        .bind(&posting.source)
        .bind(&posting.title)
        .bind(&posting.company)
        .bind(&posting.location)
        .bind(&posting.description)
        .bind(&posting.url)
        .bind(posting.posted_at)
        .bind(posting.fetched_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(row.into())
    }

    async fn contains_url(&self, url: &str) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM postings WHERE lower(url) = lower($1))"#)
                .bind(url)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(exists)
    }
}
