//! Store integration tests
//!
//! Exercise the repository, cache and backend together without external
//! services.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use ara_template_service::config::StoreConfig;
use ara_template_service::sheet::TemplateTable;
use ara_template_service::store::{
    create_template_backend, MemoryTemplateBackend, TemplateBackend, TemplateCache,
    TemplateRepository,
};
use ara_template_service::template::{SaveOutcome, Template, TemplateError};

fn shared_backend() -> Arc<MemoryTemplateBackend> {
    Arc::new(MemoryTemplateBackend::new())
}

#[tokio::test(start_paused = true)]
async fn test_out_of_band_writes_visible_after_ttl() {
    let backend = shared_backend();
    let repo = TemplateRepository::new(
        backend.clone(),
        TemplateCache::new(true, Duration::from_secs(60)),
        false,
    );

    repo.save("welcome", "v1").await.unwrap();
    assert_eq!(repo.get("welcome").await.unwrap().body, "v1");

    // Another writer edits the shared table directly
    backend
        .upsert(&Template::new("welcome", "v2"))
        .await
        .unwrap();
    assert_eq!(repo.get("welcome").await.unwrap().body, "v1");

    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(repo.get("welcome").await.unwrap().body, "v2");
}

#[tokio::test]
async fn test_refresh_drops_stale_snapshot() {
    let backend = shared_backend();
    let repo = TemplateRepository::new(
        backend.clone(),
        TemplateCache::new(true, Duration::from_secs(3600)),
        false,
    );

    assert!(repo.list().await.unwrap().is_empty());
    backend.upsert(&Template::new("late", "x")).await.unwrap();
    assert!(repo.list().await.unwrap().is_empty());

    repo.refresh().await;
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_disabled_cache_reads_through() {
    let backend = shared_backend();
    let repo = TemplateRepository::new(backend.clone(), TemplateCache::disabled(), false);

    assert!(repo.list().await.unwrap().is_empty());
    backend.upsert(&Template::new("now", "x")).await.unwrap();
    assert_eq!(repo.get("now").await.unwrap().body, "x");
}

#[tokio::test]
async fn test_factory_backend_round_trip() {
    let backend = create_template_backend(&StoreConfig::default(), None, None)
        .await
        .unwrap();
    let repo = TemplateRepository::new(backend, TemplateCache::disabled(), false);

    assert_eq!(
        repo.save("greeting", "Hi {{name}}").await.unwrap(),
        SaveOutcome::Created
    );

    let rendered = repo
        .render("greeting", &json!({"name": "Li", "count": 3}))
        .await
        .unwrap();
    assert_eq!(rendered.output, "Hi Li");
    assert!(rendered.missing.is_empty());

    assert!(matches!(
        repo.render("absent", &json!({})).await,
        Err(TemplateError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_seed_from_rows_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"values": [["Name", "Template"], ["a", "{{{{x}}}}"], ["b", "plain"], ["", "skipped"]]}}"#
    )
    .unwrap();

    let repo = TemplateRepository::new(shared_backend(), TemplateCache::disabled(), false);
    repo.save("b", "existing").await.unwrap();

    let table = TemplateTable::load_rows_file(file.path()).unwrap();
    assert_eq!(repo.seed(table).await.unwrap(), 1);

    let names: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(repo.get("b").await.unwrap().body, "existing");
    assert_eq!(repo.variables("a").await.unwrap(), vec!["x"]);
}
