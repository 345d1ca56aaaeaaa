//! Integration tests for the enrichment orchestrator.
//!
//! These run the full generate / batch / analyze-tags paths against the
//! in-memory store and scripted mock providers: no network, no real LLM.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use enrichment::{
    stores::memory::MemoryStore,
    testing::{MockCompletion, MockProvider, MockResponse},
    ArtifactKind, ContentItem, ContentStore, EnrichConfig, EnrichError, Enricher,
    EnrichmentStatus, GenerateOptions, ProviderRegistry,
};

const PROVIDER: &str = "mock";

/// Build an enricher around a scripted provider, keeping handles to the
/// provider and completion mocks for assertions.
fn setup(
    items: Vec<ContentItem>,
    provider: MockProvider,
    llm_output: &str,
) -> (
    Enricher<MemoryStore, Arc<MockCompletion>>,
    Arc<MockProvider>,
    Arc<MockCompletion>,
) {
    let store = MemoryStore::new();
    for item in items {
        store.insert_item(item);
    }
    let provider = Arc::new(provider);
    let llm = Arc::new(MockCompletion::new(llm_output));
    let mut registry = ProviderRegistry::new();
    registry.register(provider.clone());
    let enricher = Enricher::with_registry(store, llm.clone(), EnrichConfig::default(), registry);
    (enricher, provider, llm)
}

/// Serve `bytes` as a PNG over one HTTP request on an ephemeral local
/// port, returning the URL a provider would hand back.
async fn serve_image_once(bytes: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 1024];
        let _ = socket.read(&mut request).await;
        let header = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            bytes.len()
        );
        socket.write_all(header.as_bytes()).await.unwrap();
        socket.write_all(&bytes).await.unwrap();
        socket.shutdown().await.ok();
    });
    format!("http://{addr}/generated.png")
}

fn news_item(id: u64) -> ContentItem {
    ContentItem::new(id, format!("Story {id}"))
        .with_body("A longer body describing the story in detail.")
        .with_excerpt("A short excerpt.")
}

#[tokio::test]
async fn test_completed_writes_exactly_one_artifact_slot() {
    let provider = MockProvider::new(PROVIDER).with_default(MockResponse::inline(vec![9, 9, 9]));
    let (enricher, _, _) = setup(vec![news_item(1)], provider, "");

    let outcome = enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap();

    let artifact = outcome.artifact.expect("artifact attached");
    assert!(!outcome.skipped);
    let store = enricher.store();
    assert_eq!(store.slot_write_count(1, ArtifactKind::Featured), 1);
    assert_eq!(store.slot_write_count(1, ArtifactKind::Og), 0);
    assert_eq!(
        store.get_status(1, ArtifactKind::Featured).await.unwrap(),
        EnrichmentStatus::Generated
    );
    // The stored bytes are exactly what the provider produced.
    let media = store.media(artifact.id).expect("media registered");
    assert_eq!(media.bytes, vec![9, 9, 9]);
    assert_eq!(media.item_id, 1);
    assert_eq!(store.item(1).unwrap().featured, Some(artifact));
}

#[tokio::test]
async fn test_remote_url_round_trip_stores_served_bytes() {
    let image = vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4];
    let url = serve_image_once(image.clone()).await;
    let provider = MockProvider::new(PROVIDER).with_default(MockResponse::remote(url));
    let (enricher, _, _) = setup(vec![news_item(1)], provider, "");

    let outcome = enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap();

    // The fetcher downloaded exactly the URL the provider returned: the
    // stored bytes are the ones the server put behind it.
    let artifact = outcome.artifact.expect("artifact attached");
    let store = enricher.store();
    let media = store.media(artifact.id).expect("media registered");
    assert_eq!(media.bytes, image);
    assert_eq!(media.content_type, "image/png");
    assert_eq!(media.item_id, 1);
    assert_eq!(store.item(1).unwrap().featured, Some(artifact));
    assert_eq!(
        store.get_status(1, ArtifactKind::Featured).await.unwrap(),
        EnrichmentStatus::Generated
    );
}

#[tokio::test]
async fn test_og_generation_fills_og_slot_only() {
    let provider = MockProvider::new(PROVIDER).with_default(MockResponse::inline(vec![1]));
    let (enricher, _, _) = setup(vec![news_item(5)], provider, "");

    enricher.generate_og(5, PROVIDER).await.unwrap();

    let store = enricher.store();
    assert_eq!(store.slot_write_count(5, ArtifactKind::Og), 1);
    assert_eq!(store.slot_write_count(5, ArtifactKind::Featured), 0);
    assert!(store.item(5).unwrap().og.is_some());
    assert!(store.item(5).unwrap().featured.is_none());
}

#[tokio::test]
async fn test_failed_generation_touches_no_slots() {
    let provider = MockProvider::new(PROVIDER)
        .with_default(MockResponse::Protocol("missing image_url".to_string()));
    let (enricher, _, _) = setup(vec![news_item(1)], provider, "");

    let err = enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichError::ProviderProtocol { .. }));
    let store = enricher.store();
    assert_eq!(store.slot_write_count(1, ArtifactKind::Featured), 0);
    assert_eq!(store.media_count(), 0);
    assert_eq!(
        store.get_status(1, ArtifactKind::Featured).await.unwrap(),
        EnrichmentStatus::Failed
    );
}

#[tokio::test]
async fn test_missing_item_is_not_found() {
    let provider = MockProvider::new(PROVIDER);
    let (enricher, provider, _) = setup(vec![], provider, "");

    let err = enricher
        .generate(99, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichError::NotFound { item_id: 99 }));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_provider_fails_fast() {
    let provider = MockProvider::new(PROVIDER);
    let (enricher, provider, _) = setup(vec![news_item(1)], provider, "");

    let err = enricher
        .generate(1, ArtifactKind::Featured, "midjourney", GenerateOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, EnrichError::UnknownProvider(name) if name == "midjourney"));
    assert_eq!(provider.call_count(), 0);
    // Status untouched: the call never started.
    assert_eq!(
        enricher
            .store()
            .get_status(1, ArtifactKind::Featured)
            .await
            .unwrap(),
        EnrichmentStatus::Unset
    );
}

#[tokio::test]
async fn test_generated_is_terminal_until_explicit_overwrite() {
    let provider = MockProvider::new(PROVIDER).with_default(MockResponse::inline(vec![7]));
    let (enricher, provider, _) = setup(vec![news_item(1)], provider, "");

    let first = enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(provider.call_count(), 1);

    // A plain retry skips: no provider call, prior artifact returned.
    let second = enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap();
    assert!(second.skipped);
    assert_eq!(second.artifact, first.artifact);
    assert_eq!(provider.call_count(), 1);
    assert_eq!(
        enricher
            .store()
            .get_status(1, ArtifactKind::Featured)
            .await
            .unwrap(),
        EnrichmentStatus::Generated
    );

    // An explicit overwrite regenerates.
    let third = enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::overwrite())
        .await
        .unwrap();
    assert!(!third.skipped);
    assert_ne!(third.artifact, first.artifact);
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_pending_provider_surfaces_job_id() {
    let provider = MockProvider::new(PROVIDER)
        .with_default(MockResponse::Pending("job-42".to_string()));
    let (enricher, _, _) = setup(vec![news_item(1)], provider, "");

    let outcome = enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.pending_job.as_deref(), Some("job-42"));
    assert!(outcome.artifact.is_none());
    let store = enricher.store();
    assert_eq!(store.slot_write_count(1, ArtifactKind::Featured), 0);
    assert_eq!(
        store.get_status(1, ArtifactKind::Featured).await.unwrap(),
        EnrichmentStatus::Pending
    );
}

#[tokio::test]
async fn test_fetch_failure_leaves_slot_unchanged_and_allows_retry() {
    let provider = MockProvider::new(PROVIDER).with_default(MockResponse::inline(vec![3]));
    let (enricher, _, _) = setup(vec![news_item(1)], provider, "");
    enricher.store().set_media_failure(true);

    let err = enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EnrichError::Fetch { .. }));

    let store = enricher.store();
    assert_eq!(store.slot_write_count(1, ArtifactKind::Featured), 0);
    assert!(store.item(1).unwrap().featured.is_none());
    assert_eq!(
        store.get_status(1, ArtifactKind::Featured).await.unwrap(),
        EnrichmentStatus::Failed
    );

    // Failed is not terminal: a retry may proceed once storage recovers.
    enricher.store().set_media_failure(false);
    let outcome = enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap();
    assert!(outcome.artifact.is_some());
    assert_eq!(
        enricher
            .store()
            .get_status(1, ArtifactKind::Featured)
            .await
            .unwrap(),
        EnrichmentStatus::Generated
    );
}

#[tokio::test]
async fn test_batch_isolates_failures_and_preserves_order() {
    let provider = MockProvider::new(PROVIDER)
        .with_default(MockResponse::inline(vec![1]))
        .with_response(2, MockResponse::Unreachable);
    let (enricher, provider, _) = setup(
        vec![news_item(1), news_item(2), news_item(3)],
        provider,
        "",
    );

    let entries = enricher
        .batch_generate(&[1, 2, 3], ArtifactKind::Featured, PROVIDER)
        .await;

    assert_eq!(entries.len(), 3);
    assert_eq!(
        entries.iter().map(|e| e.item_id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(entries[0].outcome.is_ok());
    assert!(matches!(
        entries[1].outcome,
        Err(EnrichError::Unreachable { .. })
    ));
    // Item 3 was still attempted after item 2 failed.
    assert!(entries[2].outcome.is_ok());
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_prompt_is_deterministic_across_calls() {
    let provider = MockProvider::new(PROVIDER).with_default(MockResponse::inline(vec![1]));
    let (enricher, provider, _) = setup(vec![news_item(1)], provider, "");

    enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::default())
        .await
        .unwrap();
    enricher
        .generate(1, ArtifactKind::Featured, PROVIDER, GenerateOptions::overwrite())
        .await
        .unwrap();

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, calls[1].1);
    assert!(calls[0].1.contains("Story 1"));
    assert!(calls[0].1.contains("A short excerpt."));
}

#[tokio::test]
async fn test_analyze_tags_merges_case_insensitively() {
    let provider = MockProvider::new(PROVIDER);
    let (enricher, _, _) = setup(
        vec![news_item(1).with_tags(["Existing"])],
        provider,
        r#"Here are tags: ["Drones","dji","existing"]"#,
    );

    let merged = enricher.analyze_tags(1).await.unwrap();
    // "existing" is already present (case-insensitively); extracted tags
    // arrive lowercased.
    assert_eq!(merged, vec!["Existing", "drones", "dji"]);
    assert_eq!(enricher.store().item(1).unwrap().tags, merged);
}

#[tokio::test]
async fn test_analyze_tags_is_idempotent() {
    let provider = MockProvider::new(PROVIDER);
    let (enricher, _, _) = setup(
        vec![news_item(1)],
        provider,
        r#"["drones","dji","review"]"#,
    );

    let first = enricher.analyze_tags(1).await.unwrap();
    let second = enricher.analyze_tags(1).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second, vec!["drones", "dji", "review"]);
}

#[tokio::test]
async fn test_analyze_tags_unparseable_leaves_item_untouched() {
    let provider = MockProvider::new(PROVIDER);
    let (enricher, _, llm) = setup(
        vec![news_item(1).with_tags(["keep-me"])],
        provider,
        "I'm sorry, I cannot produce tags for this article.",
    );

    let err = enricher.analyze_tags(1).await.unwrap_err();
    assert!(matches!(err, EnrichError::Unparseable));
    assert_eq!(enricher.store().item(1).unwrap().tags, vec!["keep-me"]);
    assert_eq!(llm.calls().len(), 1);
}

#[tokio::test]
async fn test_stats_counts_missing_artifacts() {
    let provider = MockProvider::new(PROVIDER).with_default(MockResponse::inline(vec![1]));
    let (enricher, _, _) = setup(
        vec![news_item(1), news_item(2)],
        provider,
        "",
    );

    enricher.generate_featured(1, PROVIDER).await.unwrap();

    let stats = enricher.stats().await.unwrap();
    assert_eq!(stats.missing_featured, 1);
    assert_eq!(stats.missing_og, 2);
}
