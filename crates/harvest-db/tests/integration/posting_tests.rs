use std::time::Duration;

use chrono::Utc;
use harvest_core::error::AppError;
use harvest_core::models::{NewPosting, NewSource, SourceKind};
use harvest_core::scheduler::{Scheduler, TracingSweepReporter};
use harvest_core::traits::{FetchKind, Fetcher, PostingStore, SourceStore};
use harvest_db::{PostingRepository, SourceRepository};

use crate::integration::common::setup_test_db;

const FEED_URL: &str = "https://feeds.example/jobs.rss";
const FEED: &str = r#"<rss version="2.0"><channel>
    <item><title>Rust Engineer</title><link>https://feeds.example/jobs/1</link></item>
    <item><title>SRE</title><link>https://feeds.example/jobs/2#apply</link></item>
</channel></rss>"#;

/// Serves the canned feed; everything else is a 404.
#[derive(Clone)]
struct FeedFetcher;

impl Fetcher for FeedFetcher {
    async fn fetch(&self, url: &str, _kind: FetchKind) -> Result<String, AppError> {
        if url == FEED_URL {
            Ok(FEED.to_string())
        } else {
            Err(AppError::HttpError(format!("HTTP 404 for {url}")))
        }
    }
}

fn new_posting(url: &str) -> NewPosting {
    let now = Utc::now();
    NewPosting {
        source: "Acme".into(),
        title: "Backend Engineer".into(),
        company: "Acme".into(),
        location: None,
        description: "Rust and Postgres".into(),
        url: url.into(),
        posted_at: now,
        fetched_at: now,
    }
}

#[tokio::test]
async fn save_and_retrieve_posting() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostingRepository::new(pool);

    let saved = repo.save(&new_posting("https://acme.example/jobs/1")).await.unwrap();
    assert!(!saved.id.is_nil());

    let fetched = repo.get(saved.id).await.unwrap().expect("Should find the posting");
    assert_eq!(fetched.url, "https://acme.example/jobs/1");
    assert_eq!(fetched.title, "Backend Engineer");
    assert_eq!(fetched.location, None);
    assert_eq!(repo.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn contains_url_ignores_case() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostingRepository::new(pool);
    repo.save(&new_posting("https://acme.example/Jobs/1")).await.unwrap();

    assert!(repo.contains_url("HTTPS://ACME.EXAMPLE/jobs/1").await.unwrap());
    assert!(!repo.contains_url("https://acme.example/jobs/2").await.unwrap());
}

#[tokio::test]
async fn unique_index_rejects_case_variant() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostingRepository::new(pool);
    repo.save(&new_posting("https://acme.example/jobs/1")).await.unwrap();

    let err = repo
        .save(&new_posting("https://ACME.example/jobs/1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DatabaseError(_)));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn list_recent_is_newest_first() {
    let (pool, _container) = setup_test_db().await;
    let repo = PostingRepository::new(pool);

    repo.save(&new_posting("https://acme.example/jobs/old")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    repo.save(&new_posting("https://acme.example/jobs/new")).await.unwrap();

    let recent = repo.list_recent(1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].url, "https://acme.example/jobs/new");
}

#[tokio::test]
async fn repeated_sweeps_store_each_posting_once() {
    let (pool, _container) = setup_test_db().await;
    let sources = SourceRepository::new(pool.clone());
    let postings = PostingRepository::new(pool);
    sources
        .create(&NewSource::new("Feed", FEED_URL, SourceKind::Rss))
        .await
        .unwrap();

    let scheduler = Scheduler::new(
        FeedFetcher,
        sources,
        postings.clone(),
        Duration::from_secs(60),
    );

    let first = scheduler.run_sweep(&TracingSweepReporter).await;
    let second = scheduler.run_sweep(&TracingSweepReporter).await;

    assert_eq!(first.saved, 2);
    assert_eq!(second.saved, 0);
    let urls: Vec<_> = postings
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.url)
        .collect();
    assert_eq!(
        urls,
        vec!["https://feeds.example/jobs/1", "https://feeds.example/jobs/2"]
    );
}
