//! End-to-end tests for the song API, driven through the router with an
//! in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use failing::FailingStore;
use http_body_util::BodyExt;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use server::config::{ServerConfig, StoreBackend};
use server::{build_router, ServerState};
use songbook::{InMemoryStore, Song, SongStore};
use tower::ServiceExt;

const SEEDED: i64 = 5;

fn test_config() -> ServerConfig {
    ServerConfig {
        backend: StoreBackend::Memory,
        metrics_enabled: false,
        ..ServerConfig::default()
    }
}

async fn seeded_router() -> Router {
    let store = Arc::new(InMemoryStore::new());
    let songs = (1..=SEEDED)
        .map(|id| Song::new(id, format!("Track {id}"), format!("verse {id}")))
        .collect();
    store.seed_collection(songs).await.unwrap();

    build_router(Arc::new(ServerState::new(test_config(), store)))
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let router = seeded_router().await;
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "OK" }));
}

#[tokio::test]
async fn metrics_route_absent_when_disabled() {
    let router = seeded_router().await;
    let (status, body) = send(&router, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
}

#[tokio::test]
async fn metrics_render_request_counters() {
    // Only test in this binary that installs the global recorder.
    let handle = PrometheusBuilder::new().install_recorder().unwrap();
    let store = Arc::new(InMemoryStore::new());
    let config = ServerConfig {
        metrics_enabled: true,
        ..test_config()
    };
    let router = build_router(Arc::new(ServerState::new(config, store).with_metrics(handle)));

    let (status, _) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
}

#[tokio::test]
async fn count_and_list_reflect_seed() {
    let router = seeded_router().await;

    let (status, body) = send(&router, "GET", "/count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "count": SEEDED }));

    let (status, body) = send(&router, "GET", "/song", None).await;
    assert_eq!(status, StatusCode::OK);
    let songs = body["songs"].as_array().unwrap();
    assert_eq!(songs.len(), SEEDED as usize);
    assert!(songs.iter().all(|s| s.get("_id").is_none()));
}

#[tokio::test]
async fn get_song_by_id() {
    let router = seeded_router().await;

    let (status, body) = send(&router, "GET", "/song/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 1, "title": "Track 1", "lyrics": "verse 1" }));

    let (status, body) = send(&router, "GET", "/song/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Song with ID 404 not found" }));
}

#[tokio::test]
async fn non_integer_id_does_not_match_a_route() {
    let router = seeded_router().await;

    let (status, body) = send(&router, "GET", "/song/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));

    let (status, _) = send(&router, "GET", "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn song_lifecycle_scenario() {
    let router = seeded_router().await;

    let (status, body) = send(
        &router,
        "POST",
        "/song",
        Some(json!({ "id": 1, "title": "x", "lyrics": "y" })),
    )
    .await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(body, json!({ "message": "Song with id 1 already present" }));

    let (status, body) = send(
        &router,
        "POST",
        "/song",
        Some(json!({ "id": 9999, "title": "New", "lyrics": "L" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["inserted_id"].as_str().unwrap().len(), 24);

    let (status, body) = send(
        &router,
        "PUT",
        "/song/9999",
        Some(json!({ "title": "New2", "lyrics": "L" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "id": 9999, "title": "New2", "lyrics": "L" }));

    let (status, body) = send(&router, "DELETE", "/song/9999", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&router, "GET", "/song/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_create_does_not_modify_existing_song() {
    let router = seeded_router().await;

    send(
        &router,
        "POST",
        "/song",
        Some(json!({ "id": 2, "title": "Overwritten?", "lyrics": "no" })),
    )
    .await;

    let (_, body) = send(&router, "GET", "/song/2", None).await;
    assert_eq!(body["title"], "Track 2");
    let (_, body) = send(&router, "GET", "/count", None).await;
    assert_eq!(body["count"], SEEDED);
}

#[tokio::test]
async fn create_rejects_incomplete_or_malformed_bodies() {
    let router = seeded_router().await;
    let invalid = json!({ "error": "Invalid request format" });

    for body in [
        json!({ "title": "t", "lyrics": "l" }),
        json!({ "id": 10, "lyrics": "l" }),
        json!({ "id": 10, "title": "t" }),
        json!({ "id": "ten", "title": "t", "lyrics": "l" }),
        json!("just a string"),
    ] {
        let (status, response) = send(&router, "POST", "/song", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, invalid);
    }

    let (status, response) = send(&router, "POST", "/song", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, invalid);

    let (_, body) = send(&router, "GET", "/count", None).await;
    assert_eq!(body["count"], SEEDED);
}

#[tokio::test]
async fn update_outcomes() {
    let router = seeded_router().await;

    let (status, body) = send(
        &router,
        "PUT",
        "/song/3",
        Some(json!({ "title": "Track 3", "lyrics": "verse 3" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "song found, but nothing updated" }));

    let (status, body) = send(
        &router,
        "PUT",
        "/song/777",
        Some(json!({ "title": "a", "lyrics": "b" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Song not found" }));

    let (status, body) = send(&router, "PUT", "/song/3", Some(json!({ "title": "a" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid request format" }));
}

#[tokio::test]
async fn delete_unknown_song() {
    let router = seeded_router().await;
    let (status, body) = send(&router, "DELETE", "/song/12345", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "song not found" }));
}

#[tokio::test]
async fn count_tracks_creates_and_deletes() {
    let router = seeded_router().await;

    for id in 100..104 {
        let (status, _) = send(
            &router,
            "POST",
            "/song",
            Some(json!({ "id": id, "title": "t", "lyrics": "l" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send(&router, "DELETE", "/song/1", None).await;
    send(&router, "DELETE", "/song/100", None).await;

    let (_, body) = send(&router, "GET", "/count", None).await;
    assert_eq!(body["count"], SEEDED + 4 - 2);
}

#[tokio::test]
async fn api_info_lists_endpoints() {
    let router = seeded_router().await;
    let (status, body) = send(&router, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Songbook Server");
    assert!(body["endpoints"].as_array().unwrap().len() >= 7);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let router = seeded_router().await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

mod failing {
    use songbook::{
        DeleteOutcome, Filter, InsertOutcome, Song, SongFields, SongStore, StoreError,
        UpdateOutcome,
    };

    /// A store whose every call fails, as if the database were gone.
    pub struct FailingStore;

    fn down() -> StoreError {
        StoreError::backend("connection refused")
    }

    #[async_trait::async_trait]
    impl SongStore for FailingStore {
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
        async fn seed_collection(&self, _songs: Vec<Song>) -> Result<(), StoreError> {
            Err(down())
        }
        async fn find_all(&self) -> Result<Vec<Song>, StoreError> {
            Err(down())
        }
        async fn find_one(&self, _filter: Filter) -> Result<Option<Song>, StoreError> {
            Err(down())
        }
        async fn insert_one(&self, _song: &Song) -> Result<InsertOutcome, StoreError> {
            Err(down())
        }
        async fn update_one(
            &self,
            _filter: Filter,
            _fields: &SongFields,
        ) -> Result<UpdateOutcome, StoreError> {
            Err(down())
        }
        async fn delete_one(&self, _filter: Filter) -> Result<DeleteOutcome, StoreError> {
            Err(down())
        }
        async fn count_all(&self) -> Result<u64, StoreError> {
            Err(down())
        }
    }
}

fn failing_router() -> Router {
    build_router(Arc::new(ServerState::new(
        test_config(),
        Arc::new(FailingStore),
    )))
}

#[tokio::test]
async fn store_failures_become_generic_500s() {
    let router = failing_router();

    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "status": "UNAVAILABLE" }));

    let cases = [
        ("GET", "/count", None, "Unable to fetch count"),
        ("GET", "/song", None, "Unable to fetch songs"),
        ("GET", "/song/1", None, "Unable to fetch song"),
        (
            "POST",
            "/song",
            Some(json!({ "id": 1, "title": "t", "lyrics": "l" })),
            "Unable to create song",
        ),
        (
            "PUT",
            "/song/1",
            Some(json!({ "title": "t", "lyrics": "l" })),
            "Unable to update song",
        ),
        ("DELETE", "/song/1", None, "Unable to delete song"),
    ];

    for (method, uri, body, message) in cases {
        let (status, response) = send(&router, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(response, json!({ "error": message }), "{method} {uri}");
    }
}

#[tokio::test]
async fn validation_happens_before_store_access() {
    let router = failing_router();
    let (status, _) = send(&router, "POST", "/song", Some(json!({ "id": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
