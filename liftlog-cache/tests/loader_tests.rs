use chrono::Utc;
use liftlog_cache::{
    AssetManifest, CacheConfig, CacheError, CacheStore, CachedResponse, RequestKey, ResourceLoader,
};
use liftlog_types::TrainingData;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn loader_with_store() -> (ResourceLoader, CacheStore) {
    let store = CacheStore::open_in_memory().unwrap();
    let loader = ResourceLoader::new(CacheConfig::for_build("test"), store.clone());
    (loader, store)
}

fn canned(body: &str) -> CachedResponse {
    CachedResponse {
        status: 200,
        content_type: Some("application/json".into()),
        body: body.as_bytes().to_vec(),
        stored_at: Utc::now(),
    }
}

// A local port with nothing listening, so sends fail at the transport.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

// ── Cache-first ──────────────────────────────────────────────────

#[tokio::test]
async fn cache_first_hit_never_touches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (loader, store) = loader_with_store();
    let key = RequestKey::get(format!("{}/style.css", server.uri()));
    store
        .store(&loader.config().static_generation, &key, &canned("body{}"))
        .unwrap();

    let served = loader.fetch_cache_first(&key).await.unwrap();
    assert_eq!(served.text(), "body{}");
    // Mock expectations (zero calls) are verified on drop.
}

#[tokio::test]
async fn cache_first_checks_static_before_dynamic() {
    let (loader, store) = loader_with_store();
    let key = RequestKey::get("https://example.com/index.html");
    store
        .store(&loader.config().static_generation, &key, &canned("installed"))
        .unwrap();
    store
        .store(&loader.config().dynamic_generation, &key, &canned("live"))
        .unwrap();

    let served = loader.fetch_cache_first(&key).await.unwrap();
    assert_eq!(served.text(), "installed");
}

#[tokio::test]
async fn cache_first_dynamic_hit_counts() {
    let (loader, store) = loader_with_store();
    let key = RequestKey::get("https://example.com/banner.png");
    store
        .store(&loader.config().dynamic_generation, &key, &canned("pixels"))
        .unwrap();

    let served = loader.fetch_cache_first(&key).await.unwrap();
    assert_eq!(served.text(), "pixels");
}

#[tokio::test]
async fn cache_first_miss_fetches_without_storing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/icon.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fresh"))
        .expect(1)
        .mount(&server)
        .await;

    let (loader, store) = loader_with_store();
    let key = RequestKey::get(format!("{}/icon.png", server.uri()));

    let served = loader.fetch_cache_first(&key).await.unwrap();
    assert_eq!(served.text(), "fresh");
    // Best-effort semantics: the miss is not written back.
    assert!(store.lookup(&loader.config().static_generation, &key).unwrap().is_none());
    assert!(store.lookup(&loader.config().dynamic_generation, &key).unwrap().is_none());
}

// ── Network-first ────────────────────────────────────────────────

#[tokio::test]
async fn network_first_mirrors_success_into_dynamic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exec"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"exercises":[]}"#))
        .mount(&server)
        .await;

    let (loader, store) = loader_with_store();
    let key = RequestKey::get(format!("{}/exec", server.uri()));

    let served = loader.fetch_network_first(&key).await.unwrap();
    assert_eq!(served.status, 200);

    let mirrored = store
        .lookup(&loader.config().dynamic_generation, &key)
        .unwrap()
        .unwrap();
    assert_eq!(mirrored.text(), r#"{"exercises":[]}"#);
}

#[tokio::test]
async fn network_first_overwrites_older_mirror() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("newer"))
        .mount(&server)
        .await;

    let (loader, store) = loader_with_store();
    let key = RequestKey::get(format!("{}/exec", server.uri()));
    store
        .store(&loader.config().dynamic_generation, &key, &canned("older"))
        .unwrap();

    loader.fetch_network_first(&key).await.unwrap();
    let mirrored = store
        .lookup(&loader.config().dynamic_generation, &key)
        .unwrap()
        .unwrap();
    assert_eq!(mirrored.text(), "newer");
}

#[tokio::test]
async fn network_first_falls_back_to_dynamic_on_transport_failure() {
    let (loader, store) = loader_with_store();
    let key = RequestKey::get(format!("{DEAD_ENDPOINT}/exec"));
    store
        .store(&loader.config().dynamic_generation, &key, &canned("stale copy"))
        .unwrap();

    let served = loader.fetch_network_first(&key).await.unwrap();
    assert_eq!(served.text(), "stale copy");
}

#[tokio::test]
async fn network_first_without_fallback_is_unreachable() {
    let (loader, _store) = loader_with_store();
    let key = RequestKey::get(format!("{DEAD_ENDPOINT}/exec"));

    let err = loader.fetch_network_first(&key).await.unwrap_err();
    assert!(matches!(err, CacheError::Unreachable { .. }));
}

#[tokio::test]
async fn network_first_treats_http_errors_as_reachable() {
    // A 500 is still a response; it serves and mirrors like any other.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (loader, store) = loader_with_store();
    let key = RequestKey::get(format!("{}/exec", server.uri()));

    let served = loader.fetch_network_first(&key).await.unwrap();
    assert_eq!(served.status, 500);
    assert!(store
        .lookup(&loader.config().dynamic_generation, &key)
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn cached_hydration_document_stays_decodable() {
    let server = MockServer::start().await;
    let body = r#"{"exercises":[{"Name":"Squat","Type":"Gym"}],"logs":[],"bodyweight":[]}"#;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let (loader, store) = loader_with_store();
    let key = RequestKey::get(format!("{}/exec", server.uri()));
    loader.fetch_network_first(&key).await.unwrap();

    let mirrored = store
        .lookup(&loader.config().dynamic_generation, &key)
        .unwrap()
        .unwrap();
    let data: TrainingData = serde_json::from_slice(&mirrored.body).unwrap();
    assert_eq!(data.exercises[0].name, "Squat");
}

// ── Static install ───────────────────────────────────────────────

#[tokio::test]
async fn install_populates_the_static_generation() {
    let server = MockServer::start().await;
    for asset in ["/index.html", "/style.css", "/app.js"] {
        Mock::given(method("GET"))
            .and(path(asset))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("content of {asset}")))
            .mount(&server)
            .await;
    }

    let (loader, store) = loader_with_store();
    let manifest = AssetManifest::new(
        ["/index.html", "/style.css", "/app.js"]
            .iter()
            .map(|asset| format!("{}{asset}", server.uri())),
    );

    let installed = loader.install_static(&manifest).await.unwrap();
    assert_eq!(installed, 3);
    assert_eq!(
        store.generation_len(&loader.config().static_generation).unwrap(),
        3
    );

    // Installed assets now serve cache-first with no network.
    let key = RequestKey::get(format!("{}/style.css", server.uri()));
    let served = loader.fetch_cache_first(&key).await.unwrap();
    assert_eq!(served.text(), "content of /style.css");
}

#[tokio::test]
async fn install_fails_whole_batch_on_missing_asset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.css"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (loader, store) = loader_with_store();
    let manifest = AssetManifest::new([
        format!("{}/index.html", server.uri()),
        format!("{}/missing.css", server.uri()),
    ]);

    let err = loader.install_static(&manifest).await.unwrap_err();
    assert!(matches!(err, CacheError::Install { .. }));
    // Fail-fast: nothing from the failed install was activated.
    assert_eq!(
        store.generation_len(&loader.config().static_generation).unwrap(),
        0
    );
}

// ── Generation retirement ────────────────────────────────────────

#[tokio::test]
async fn retiring_removes_previous_build_generations() {
    let (_, store) = loader_with_store();
    let key = RequestKey::get("https://example.com/app.js");
    store.store("liftlog-static-old", &key, &canned("old")).unwrap();
    store.store("liftlog-dynamic-old", &key, &canned("old")).unwrap();

    let loader = ResourceLoader::new(CacheConfig::for_build("new"), store.clone());
    store
        .store(&loader.config().static_generation, &key, &canned("new"))
        .unwrap();

    let removed = loader.retire_stale_generations().unwrap();
    assert_eq!(removed, 2);
    assert!(store.lookup("liftlog-static-old", &key).unwrap().is_none());
    assert!(store
        .lookup(&loader.config().static_generation, &key)
        .unwrap()
        .is_some());
}
