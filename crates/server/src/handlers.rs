//! HTTP routes.
//!
//! - `GET /api/character/{id}` - cached character lookup
//! - `GET /health` - liveness probe
//! - `GET /` - usage banner

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::service::CharacterService;

const USAGE: &str = "FF14 Character Data API Server
Usage: GET /api/character/{id}
Health: GET /health
";

#[derive(Debug, Serialize)]
pub struct CharacterResponse {
    pub data: Value,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: String,
}

/// Build the application router around a shared service.
pub fn router(service: Arc<CharacterService>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/character/{id}", get(get_character))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Ids are a non-empty run of ASCII digits that fits in a `u32`.
fn parse_character_id(raw: &str) -> Result<u32, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidId(raw.to_string()));
    }
    raw.parse().map_err(|_| ApiError::InvalidId(raw.to_string()))
}

async fn get_character(
    State(service): State<Arc<CharacterService>>, Path(raw_id): Path<String>,
) -> Result<Json<CharacterResponse>, ApiError> {
    let id = parse_character_id(&raw_id)?;
    let lookup = service.get_character(id).await?;

    Ok(Json(CharacterResponse { data: lookup.data, cached: lookup.cached, timestamp: Utc::now() }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true) })
}

async fn index() -> &'static str {
    USAGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFetcher, closed_db};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use charcache_core::{CacheDb, CharacterStore};
    use serde_json::json;
    use tower::ServiceExt;

    async fn send(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = send(app, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn test_app(store: Arc<dyn CharacterStore>, fetcher: Arc<FakeFetcher>) -> Router {
        router(Arc::new(CharacterService::new(store, fetcher)))
    }

    #[test]
    fn test_parse_character_id() {
        assert_eq!(parse_character_id("123456").unwrap(), 123456);
        assert_eq!(parse_character_id("0").unwrap(), 0);
        assert_eq!(parse_character_id("4294967295").unwrap(), u32::MAX);

        for bad in ["", "abc", "12a", "+5", "-1", " 1", "4294967296"] {
            assert!(parse_character_id(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_end_to_end_cache_aside() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let fetcher = Arc::new(FakeFetcher::default().with_record(123456, json!({ "name": "Test Character" })));
        let app = test_app(Arc::new(db.clone()), fetcher.clone());

        let (status, first) = send_json(&app, "/api/character/123456").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["cached"], false);
        assert_eq!(first["data"]["name"], "Test Character");
        assert!(DateTime::parse_from_rfc3339(first["timestamp"].as_str().unwrap()).is_ok());
        assert!(db.get_record(123456).await.unwrap().is_some());

        let (status, second) = send_json(&app, "/api/character/123456").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["cached"], true);
        assert_eq!(second["data"], first["data"]);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_id_never_reaches_fetcher() {
        let fetcher = Arc::new(FakeFetcher::default());
        // a closed store fails every call, so any store access would surface as a 500
        let app = test_app(Arc::new(closed_db().await), fetcher.clone());

        for uri in ["/api/character/abc", "/api/character/12x", "/api/character/99999999999"] {
            let (status, body) = send_json(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({ "error": "Invalid character ID" }));
        }
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_404() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let app = test_app(Arc::new(db.clone()), Arc::new(FakeFetcher::default()));

        let (status, body) = send_json(&app, "/api/character/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Character not found or fetch failed" }));
        assert!(db.get_record(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_stale_row() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let stale = Utc::now() - chrono::Duration::hours(25);
        db.put_character_at(77, &json!({ "name": "Old Name" }), stale).await.unwrap();
        let before = db.get_record(77).await.unwrap().unwrap();
        let app = test_app(Arc::new(db.clone()), Arc::new(FakeFetcher::default()));

        let (status, body) = send_json(&app, "/api/character/77").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Character not found or fetch failed" }));

        let after = db.get_record(77).await.unwrap().unwrap();
        assert_eq!(after.cached_at, before.cached_at);
        assert_eq!(after.payload, before.payload);
    }

    #[tokio::test]
    async fn test_stale_undecodable_row_is_refetched() {
        let (db, _dir) = crate::testing::db_with_stale_garbage(3).await;
        let fetcher = Arc::new(FakeFetcher::default().with_record(3, json!({ "name": "Recovered" })));
        let app = test_app(Arc::new(db), fetcher.clone());

        let (status, body) = send_json(&app, "/api/character/3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cached"], false);
        assert_eq!(body["data"]["name"], "Recovered");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let app = test_app(Arc::new(closed_db().await), Arc::new(FakeFetcher::default()));

        let (status, body) = send_json(&app, "/api/character/1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Database error" }));
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_500() {
        let app = test_app(Arc::new(crate::testing::CorruptStore), Arc::new(FakeFetcher::default()));

        let (status, body) = send_json(&app, "/api/character/1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to process cached data" }));
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(Arc::new(closed_db().await), Arc::new(FakeFetcher::default()));

        let (status, body) = send_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(DateTime::parse_from_rfc3339(body["time"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_index_banner() {
        let app = test_app(Arc::new(closed_db().await), Arc::new(FakeFetcher::default()));

        let (status, body) = send(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("Usage: GET /api/character/{id}"));
        assert!(text.contains("Health: GET /health"));
    }
}
