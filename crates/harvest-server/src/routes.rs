use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use chrono::Utc;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use harvest_core::AppError;
use harvest_core::dedup::normalize_url;
use harvest_core::models::{NewPosting, NewSource, SourceKind};
use harvest_core::traits::{PostingStore, SourceStore};

use crate::dto::{
    CreatePostingRequest, CreateSourceRequest, HealthResponse, ListPostingsQuery,
    PostingListResponse, PostingResponse, ScrapeResponse, SourceListResponse, SourceResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

const DEFAULT_POSTING_LIMIT: usize = 50;
const MAX_POSTING_LIMIT: usize = 500;

/// Build the full router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/sources", get(list_sources).post(create_source))
        .route("/v1/sources/{id}/scrape", post(scrape_source))
        .route("/v1/postings", get(list_postings).post(create_posting))
        .route("/v1/postings/{id}", get(get_posting))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/v1/sources",
    responses(
        (status = 200, description = "Configured sources in sweep order", body = SourceListResponse),
    ),
    tag = "sources"
)]
pub async fn list_sources(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let sources = state.db.source_repo().list_all().await?;
    let total = sources.len();

    Ok(axum::Json(SourceListResponse {
        sources: sources.into_iter().map(SourceResponse::from).collect(),
        total,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/sources",
    request_body = CreateSourceRequest,
    responses(
        (status = 201, description = "Source created", body = SourceResponse),
        (status = 400, description = "Invalid URL", body = crate::dto::ErrorResponse),
    ),
    tag = "sources"
)]
pub async fn create_source(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<CreateSourceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let url = body.url.trim().to_string();
    let parsed = Url::parse(&url).map_err(|e| AppError::InvalidUrl(format!("{url}: {e}")))?;
    if parsed.host_str().is_none() {
        return Err(AppError::InvalidUrl(format!("{url}: missing host")).into());
    }

    let new_source = NewSource {
        name: body.name.trim().to_string(),
        url,
        selector: body.selector.filter(|s| !s.trim().is_empty()),
        kind: SourceKind::from_declared(body.kind.as_deref()),
    };
    let created = state.db.source_repo().create(&new_source).await?;
    tracing::info!(id = %created.id, name = %created.name, kind = %created.kind, "Source created");

    Ok((StatusCode::CREATED, axum::Json(SourceResponse::from(created))))
}

#[utoipa::path(
    post,
    path = "/v1/sources/{id}/scrape",
    params(
        ("id" = Uuid, Path, description = "Source ID")
    ),
    responses(
        (status = 200, description = "Scrape outcome", body = ScrapeResponse),
        (status = 404, description = "Unknown source", body = crate::dto::ErrorResponse),
        (status = 502, description = "Scrape failed", body = crate::dto::ErrorResponse),
    ),
    tag = "sources"
)]
pub async fn scrape_source(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let source = state
        .db
        .source_repo()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Source not found: {id}")))?;

    let outcome = state.scraper.scrape_one(&source).await?;
    Ok(axum::Json(ScrapeResponse::from(outcome)))
}

// ---------------------------------------------------------------------------
// Postings
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/v1/postings",
    description = "Newest postings first. Returns 50 postings unless `limit` is given; `limit` is capped at 500.",
    params(ListPostingsQuery),
    responses(
        (status = 200, description = "Most recently fetched postings", body = PostingListResponse),
    ),
    tag = "postings"
)]
pub async fn list_postings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPostingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = effective_limit(query.limit);
    let postings = state.db.posting_repo().list_recent(limit).await?;
    let total = postings.len();

    Ok(axum::Json(PostingListResponse {
        postings: postings.into_iter().map(PostingResponse::from).collect(),
        total,
    }))
}

fn effective_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_POSTING_LIMIT)
        .min(MAX_POSTING_LIMIT)
}

#[utoipa::path(
    get,
    path = "/v1/postings/{id}",
    params(
        ("id" = Uuid, Path, description = "Posting ID")
    ),
    responses(
        (status = 200, description = "Posting details", body = PostingResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "postings"
)]
pub async fn get_posting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let posting = state
        .db
        .posting_repo()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Posting not found: {id}")))?;

    Ok(axum::Json(PostingResponse::from(posting)))
}

#[utoipa::path(
    post,
    path = "/v1/postings",
    request_body = CreatePostingRequest,
    responses(
        (status = 201, description = "Posting stored", body = PostingResponse),
        (status = 400, description = "Blank URL", body = crate::dto::ErrorResponse),
        (status = 409, description = "URL already stored", body = crate::dto::ErrorResponse),
    ),
    tag = "postings"
)]
pub async fn create_posting(
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<CreatePostingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let url = normalize_url(&body.url)
        .ok_or_else(|| AppError::InvalidUrl("posting url must not be blank".into()))?;

    let repo = state.db.posting_repo();
    if repo.contains_url(&url).await? {
        return Err(ApiError::Conflict(format!("Posting already stored: {url}")));
    }

    let now = Utc::now();
    let posting = NewPosting {
        source: body.source,
        title: body.title,
        company: body.company,
        location: body.location,
        description: body.description,
        url,
        posted_at: body.posted_at.unwrap_or(now),
        fetched_at: now,
    };
    let stored = repo.save(&posting).await?;

    Ok((StatusCode::CREATED, axum::Json(PostingResponse::from(stored))))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let healthy = state.db.health_check().await.is_ok();

    let (status, response) = if healthy {
        (
            StatusCode::OK,
            HealthResponse {
                status: "healthy",
                database: "ok",
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "unhealthy",
                database: "error",
            },
        )
    };

    (status, axum::Json(response))
}
