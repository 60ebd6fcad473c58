use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use folio_core::share::{render_not_found_page, render_shared_page, SharedNote};
use folio_core::store::RestStore;
use folio_core::NoteId;
use http::header::CACHE_CONTROL;
use http::StatusCode;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::AppError;

/// Where shared notes are read from
pub trait SharedNoteSource: Clone + Send + Sync + 'static {
    fn fetch_shared(
        &self,
        id: NoteId,
    ) -> impl Future<Output = folio_core::Result<Option<SharedNote>>> + Send;
}

impl SharedNoteSource for RestStore {
    fn fetch_shared(
        &self,
        id: NoteId,
    ) -> impl Future<Output = folio_core::Result<Option<SharedNote>>> + Send {
        let store = self.clone();
        async move { SharedNote::fetch(&store, &id).await }
    }
}

#[derive(Clone)]
pub struct AppState<S> {
    pub config: Arc<AppConfig>,
    source: S,
}

impl AppState<RestStore> {
    /// Anonymous backend access: the row policies decide what is shared.
    pub fn from_config(config: Arc<AppConfig>) -> Result<Self, AppError> {
        let source = RestStore::anonymous(&config.backend)?;
        Ok(Self { config, source })
    }
}

impl<S> AppState<S> {
    fn cache_control(&self) -> String {
        format!("public, max-age={}", self.config.cache_max_age_secs)
    }
}

pub fn app_router<S: SharedNoteSource>(state: AppState<S>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/shared/{note_id}", get(shared_page::<S>))
        .route("/api/shared/{note_id}", get(shared_note_json::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
    })
}

/// The public page. Anything that is not a readable note renders the 404
/// page, backend failures included.
async fn shared_page<S: SharedNoteSource>(
    State(state): State<AppState<S>>,
    Path(note_id): Path<String>,
) -> Response {
    match load_shared_note(&state, &note_id).await {
        Ok(note) => (
            [(CACHE_CONTROL, state.cache_control())],
            Html(render_shared_page(&note)),
        )
            .into_response(),
        Err(error) => {
            if let AppError::External(message) = &error {
                tracing::warn!(note_id = %note_id, "Failed to load shared note: {}", message);
            }
            (StatusCode::NOT_FOUND, Html(render_not_found_page())).into_response()
        }
    }
}

async fn shared_note_json<S: SharedNoteSource>(
    State(state): State<AppState<S>>,
    Path(note_id): Path<String>,
) -> Result<Response, AppError> {
    let note = load_shared_note(&state, &note_id).await?;
    Ok(([(CACHE_CONTROL, state.cache_control())], Json(note)).into_response())
}

async fn load_shared_note<S: SharedNoteSource>(
    state: &AppState<S>,
    raw_id: &str,
) -> Result<SharedNote, AppError> {
    let id = raw_id.parse::<NoteId>().map_err(|_| AppError::NotFound)?;
    let note = state
        .source
        .fetch_shared(id)
        .await?
        .ok_or(AppError::NotFound)?;
    tracing::info!(note_id = %id, "Served shared note");
    Ok(note)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use folio_core::config::BackendConfig;
    use folio_core::models::{NewNote, NotePatch};
    use folio_core::store::{MemoryStore, NoteStore, StoreOperation};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    impl SharedNoteSource for MemoryStore {
        fn fetch_shared(
            &self,
            id: NoteId,
        ) -> impl Future<Output = folio_core::Result<Option<SharedNote>>> + Send {
            let store = self.clone();
            async move { SharedNote::fetch(&store, &id).await }
        }
    }

    fn test_state(store: MemoryStore) -> AppState<MemoryStore> {
        AppState {
            config: Arc::new(AppConfig {
                bind_addr: "127.0.0.1:0".to_string(),
                backend: BackendConfig::new("https://project.supabase.co", "anon", None).unwrap(),
                cache_max_age_secs: 60,
            }),
            source: store,
        }
    }

    async fn seeded_store() -> (MemoryStore, NoteId) {
        let store = MemoryStore::new();
        let note = store
            .insert_note(&NewNote::untitled("user-1", 1, None).with_title("Plan <draft>"))
            .await
            .unwrap();
        store
            .update_note(&note.id, &NotePatch::content("<p><strong>Ship</strong> it</p>"))
            .await
            .unwrap();
        (store, note.id)
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let cache_control = response
            .headers()
            .get(CACHE_CONTROL)
            .map(|value| value.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cache_control, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let router = app_router(test_state(MemoryStore::new()));
        let (status, _, body) = get(router, "/healthz").await;

        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert!(value["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn shared_page_renders_note_with_cache_header() {
        let (store, id) = seeded_store().await;
        let router = app_router(test_state(store));

        let (status, cache_control, body) = get(router, &format!("/shared/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some("public, max-age=60"));
        assert!(body.contains("<h1>Plan &lt;draft&gt;</h1>"));
        assert!(body.contains("<p><strong>Ship</strong> it</p>"));
        assert!(body.contains("Last Edited Time"));
    }

    #[tokio::test]
    async fn shared_page_and_api_serve_cleaned_content() {
        let (store, id) = seeded_store().await;
        store
            .update_note(
                &id,
                &NotePatch::content(
                    "<p>Hi</p><img src=x onerror=alert(document.cookie)><script>steal()</script>",
                ),
            )
            .await
            .unwrap();

        let (status, _, body) = get(app_router(test_state(store.clone())), &format!("/shared/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<p>Hi</p>"));
        assert!(!body.contains("<script>"));
        assert!(!body.contains("onerror"));

        let (_, _, body) = get(app_router(test_state(store)), &format!("/api/shared/{id}")).await;
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["content"], "<p>Hi</p><img src=\"x\">");
    }

    #[tokio::test]
    async fn shared_page_renders_not_found_for_unknown_or_invalid_ids() {
        let (store, _) = seeded_store().await;

        for uri in [
            format!("/shared/{}", NoteId::new()),
            "/shared/not-a-note".to_string(),
        ] {
            let (status, cache_control, body) = get(app_router(test_state(store.clone())), &uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(cache_control, None);
            assert!(body.contains("Note not found"));
            assert!(body.contains("Return to Home"));
        }
    }

    #[tokio::test]
    async fn shared_page_hides_backend_failures_behind_not_found() {
        let (store, id) = seeded_store().await;
        store.fail_next(StoreOperation::GetNote, "boom").await;

        let (status, _, body) = get(app_router(test_state(store)), &format!("/shared/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Note not found"));
    }

    #[tokio::test]
    async fn api_returns_shared_fields_only() {
        let (store, id) = seeded_store().await;
        let router = app_router(test_state(store));

        let (status, cache_control, body) = get(router, &format!("/api/shared/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some("public, max-age=60"));

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["id"], id.to_string());
        assert_eq!(value["title"], "Plan <draft>");
        assert_eq!(value["type"], "doc");
        assert!(value.get("user_id").is_none());
        assert!(value.get("folder_id").is_none());
    }

    #[tokio::test]
    async fn api_maps_missing_and_failing_notes_to_status_codes() {
        let (store, id) = seeded_store().await;

        let (status, _, body) = get(
            app_router(test_state(store.clone())),
            &format!("/api/shared/{}", NoteId::new()),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"Note not found"}"#);

        store.fail_next(StoreOperation::GetNote, "boom").await;
        let (status, _, body) =
            get(app_router(test_state(store)), &format!("/api/shared/{id}")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("boom"));
    }
}
