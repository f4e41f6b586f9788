use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Harvest API",
        version = "0.1.0",
        description = "Multi-source job-posting harvester: sources, manual scrapes and stored postings."
    ),
    paths(
        crate::routes::list_sources,
        crate::routes::create_source,
        crate::routes::scrape_source,
        crate::routes::list_postings,
        crate::routes::get_posting,
        crate::routes::create_posting,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::CreateSourceRequest,
        crate::dto::SourceResponse,
        crate::dto::SourceListResponse,
        crate::dto::CreatePostingRequest,
        crate::dto::PostingResponse,
        crate::dto::PostingListResponse,
        crate::dto::ScrapeResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "sources", description = "Configured sources and manual scrapes"),
        (name = "postings", description = "Harvested job postings"),
        (name = "system", description = "Health and system status"),
    )
)]
pub struct ApiDoc;
