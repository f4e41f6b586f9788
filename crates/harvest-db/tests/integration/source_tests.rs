use harvest_core::models::{NewSource, SourceKind};
use harvest_core::seed::seed_default_sources;
use harvest_core::traits::SourceStore;
use harvest_db::SourceRepository;

use crate::integration::common::setup_test_db;

#[tokio::test]
async fn create_and_get_source() {
    let (pool, _container) = setup_test_db().await;
    let repo = SourceRepository::new(pool);

    let created = repo
        .create(
            &NewSource::new("Acme", "https://acme.example/team", SourceKind::SelectorOrJsonLd)
                .with_selector(".openings a"),
        )
        .await
        .unwrap();
    assert!(!created.id.is_nil());

    let fetched = repo
        .get(created.id)
        .await
        .unwrap()
        .expect("Should find the source");
    assert_eq!(fetched, created);
    assert_eq!(fetched.selector.as_deref(), Some(".openings a"));
    assert_eq!(fetched.kind, SourceKind::SelectorOrJsonLd);
}

#[tokio::test]
async fn list_preserves_insertion_order() {
    let (pool, _container) = setup_test_db().await;
    let repo = SourceRepository::new(pool);

    for (name, kind) in [
        ("first", SourceKind::Rss),
        ("second", SourceKind::Links),
        ("third", SourceKind::JsonLd),
    ] {
        repo.create(&NewSource::new(name, format!("https://{name}.example/"), kind))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let names: Vec<_> = repo
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|s| (s.name, s.kind))
        .collect();
    assert_eq!(
        names,
        vec![
            ("first".to_string(), SourceKind::Rss),
            ("second".to_string(), SourceKind::Links),
            ("third".to_string(), SourceKind::JsonLd),
        ]
    );
}

#[tokio::test]
async fn unknown_stored_type_reads_as_default() {
    let (pool, _container) = setup_test_db().await;
    sqlx::query("INSERT INTO sources (name, url, type) VALUES ('legacy', 'https://legacy.example', 'sitemap')")
        .execute(&pool)
        .await
        .unwrap();
    let repo = SourceRepository::new(pool);

    let sources = repo.list_all().await.unwrap();
    assert_eq!(sources[0].kind, SourceKind::SelectorOrJsonLd);
}

#[tokio::test]
async fn get_unknown_returns_none() {
    let (pool, _container) = setup_test_db().await;
    let repo = SourceRepository::new(pool);

    assert!(repo.get(uuid::Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn seeding_only_fills_an_empty_table() {
    let (pool, _container) = setup_test_db().await;
    let repo = SourceRepository::new(pool);

    assert_eq!(seed_default_sources(&repo).await.unwrap(), 3);
    assert_eq!(seed_default_sources(&repo).await.unwrap(), 0);
    assert_eq!(repo.count().await.unwrap(), 3);
}
