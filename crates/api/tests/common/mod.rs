//! Shared helpers for API integration tests.
//!
//! [`test_app`] wires a fully in-memory server: `MemoryStore`, a manual
//! clock pinned to a fixed instant, a prober that always answers
//! reachable, and the same router + middleware stack production uses via
//! [`build_app_router`].

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;

use folio_api::config::ServerConfig;
use folio_api::router::build_app_router;
use folio_api::state::AppState;
use folio_core::ids::ManualClock;
use folio_core::model::{Block, HeaderMode, Page, PageStatus, Seo, Site};
use folio_events::{EffectQueue, EffectWorker, EventBus};
use folio_publish::gate::{BasicBlockValidator, ProbeError, UrlProber};
use folio_publish::invalidation::LoggingPurger;
use folio_publish::pipeline::PipelineDeps;
use folio_publish::PublishPipeline;
use folio_store::MemoryStore;

/// Workspace the default test identity belongs to.
pub const WORKSPACE: &str = "ws_1";
/// Acting user of the default test identity.
pub const ACTOR: &str = "user_1";

/// Prober that always answers reachable, so gate outcomes depend only on
/// page content.
struct AlwaysReachable;

#[async_trait::async_trait]
impl UrlProber for AlwaysReachable {
    async fn probe(&self, _url: &str) -> Result<bool, ProbeError> {
        Ok(true)
    }
}

/// A test server instance plus handles into its internals.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    // Keeps the effect queue's receiver alive so enqueues succeed.
    _worker: EffectWorker,
}

impl TestApp {
    /// Run one request through the full middleware stack.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request should produce a response")
    }

    /// GET with the default identity headers.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(
            authed(Method::GET, uri)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
    }

    /// POST with the default identity headers and no body.
    pub async fn post(&self, uri: &str) -> Response<Body> {
        self.send(
            authed(Method::POST, uri)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
    }

    /// POST a JSON body with the default identity headers.
    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.send(
            authed(Method::POST, uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("valid request"),
        )
        .await
    }

    /// DELETE with the default identity headers.
    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(
            authed(Method::DELETE, uri)
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
    }
}

/// Request builder pre-populated with the default identity headers.
pub fn authed(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-workspace-id", WORKSPACE)
        .header("x-actor-id", ACTOR)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        probe_timeout_secs: 5,
        effect_queue_capacity: 64,
    }
}

/// Build the full application with an empty in-memory store.
pub fn test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 8, 22, 12, 0, 0).unwrap(),
    ));
    let (effects, worker) = EffectQueue::bounded(config.effect_queue_capacity);

    let pipeline = PublishPipeline::new(PipelineDeps {
        content: store.clone(),
        counters: store.clone(),
        alerts: store.clone(),
        prober: Arc::new(AlwaysReachable),
        blocks: Arc::new(BasicBlockValidator),
        purger: Arc::new(LoggingPurger),
        effects,
        bus: Arc::new(EventBus::new(64)),
        clock: clock.clone(),
    });

    let state = AppState {
        pipeline: Arc::new(pipeline),
        content: store.clone(),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        clock,
        _worker: worker,
    }
}

/// [`test_app`] with the default site and one publishable page seeded.
pub fn seeded_app() -> TestApp {
    let app = test_app();
    app.store.insert_site(site_fixture());
    app.store.insert_page(page_fixture("page_1", "about"));
    app
}

/// The default test site: `site_1` in workspace `ws_1`, slug `acme`.
pub fn site_fixture() -> Site {
    Site {
        id: "site_1".to_string(),
        workspace_id: WORKSPACE.to_string(),
        name: "Acme".to_string(),
        slug: "acme".to_string(),
        template_id: None,
        theme: serde_json::json!({}),
        published_snapshot_id: None,
        published_at: None,
        published_by: None,
        has_unpublished_changes: true,
        updated_at: Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
    }
}

/// A root-level draft page that passes every pre-publish check.
pub fn page_fixture(id: &str, slug: &str) -> Page {
    Page {
        id: id.to_string(),
        site_id: "site_1".to_string(),
        workspace_id: WORKSPACE.to_string(),
        slug: slug.to_string(),
        path: format!("/{slug}"),
        parent_page_id: None,
        order: 0,
        title: format!("The {slug} page"),
        seo: Seo {
            meta_title: Some(format!("{slug} title")),
            meta_description: Some("A fine description.".to_string()),
            og_image_url: Some("https://cdn.example.com/og.png".to_string()),
            og_image_asset_id: None,
        },
        header_mode: HeaderMode::Default,
        header_preset_id: None,
        blocks: vec![Block {
            id: format!("blk_{id}"),
            block_type: "hero".to_string(),
            props: serde_json::json!({"heading": slug}),
        }],
        status: PageStatus::Draft,
        has_unpublished_changes: true,
        draft_version: 1,
        published_version_id: None,
        published_snapshot_id: None,
        published_at: None,
        published_by: None,
        updated_at: Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
        updated_by: None,
    }
}
