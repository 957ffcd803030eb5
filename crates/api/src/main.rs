use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::config::ServerConfig;
use folio_api::router::build_app_router;
use folio_api::state::AppState;
use folio_core::ids::{Clock, SystemClock};
use folio_core::model::{Block, HeaderMode, Page, PageStatus, Seo, Site};
use folio_events::{EffectQueue, EventBus};
use folio_publish::gate::{BasicBlockValidator, HttpProber};
use folio_publish::invalidation::LoggingPurger;
use folio_publish::pipeline::PipelineDeps;
use folio_publish::PublishPipeline;
use folio_store::MemoryStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "folio_api=debug,folio_publish=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Content store ---
    let store = Arc::new(MemoryStore::new());
    tracing::info!("In-memory content store initialized");

    // Optional demo content, so a fresh server has something to publish.
    if std::env::var("SEED_DEMO").is_ok_and(|v| v == "1" || v == "true") {
        seed_demo_content(&store);
        tracing::info!("Demo workspace seeded");
    }

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn the audit logger (writes all domain events to the log).
    let mut audit_rx = event_bus.subscribe();
    let audit_handle = tokio::spawn(async move {
        loop {
            match audit_rx.recv().await {
                Ok(event) => {
                    tracing::info!(
                        event_type = %event.event_type,
                        workspace_id = %event.workspace_id,
                        site_id = %event.site_id,
                        page_id = ?event.page_id,
                        actor_user_id = ?event.actor_user_id,
                        "Domain event"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Audit logger lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // --- Effect queue ---
    let (effects, worker) = EffectQueue::bounded(config.effect_queue_capacity);
    let worker_cancel = CancellationToken::new();
    let worker_handle = tokio::spawn(worker.run(worker_cancel.clone()));
    tracing::info!(
        capacity = config.effect_queue_capacity,
        "Effect worker started"
    );

    // --- Publishing pipeline ---
    let pipeline = PublishPipeline::new(PipelineDeps {
        content: store.clone(),
        counters: store.clone(),
        alerts: store.clone(),
        prober: Arc::new(HttpProber::with_timeout(Duration::from_secs(
            config.probe_timeout_secs,
        ))),
        blocks: Arc::new(BasicBlockValidator),
        purger: Arc::new(LoggingPurger),
        effects,
        bus: Arc::clone(&event_bus),
        clock: Arc::new(SystemClock),
    });

    // --- App state ---
    let state = AppState {
        pipeline: Arc::new(pipeline),
        content: store,
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Stop the effect worker; cancellation lets it drain queued purges first.
    worker_cancel.cancel();
    let _ = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        worker_handle,
    )
    .await;
    tracing::info!("Effect worker stopped");

    // Drop the event bus sender to close the broadcast channel.
    // This signals the audit logger to shut down.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), audit_handle).await;
    tracing::info!("Audit logger stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Seed a small demo workspace into the in-memory store.
///
/// The store has no draft-editing surface of its own (that belongs to the
/// content editor service), so without a seed a fresh server has nothing
/// to publish. Enabled by `SEED_DEMO=1`.
fn seed_demo_content(store: &MemoryStore) {
    let now = SystemClock.now();

    store.insert_site(Site {
        id: "site_demo".to_string(),
        workspace_id: "ws_demo".to_string(),
        name: "Demo Site".to_string(),
        slug: "demo".to_string(),
        template_id: None,
        theme: serde_json::json!({}),
        published_snapshot_id: None,
        published_at: None,
        published_by: None,
        has_unpublished_changes: true,
        updated_at: now,
    });

    for (order, (id, slug, title)) in [
        ("page_home", "home", "Home"),
        ("page_about", "about", "About Us"),
    ]
    .into_iter()
    .enumerate()
    {
        store.insert_page(Page {
            id: id.to_string(),
            site_id: "site_demo".to_string(),
            workspace_id: "ws_demo".to_string(),
            slug: slug.to_string(),
            path: format!("/{slug}"),
            parent_page_id: None,
            order: order as i32,
            title: title.to_string(),
            seo: Seo {
                meta_title: Some(title.to_string()),
                meta_description: Some(format!("The {slug} page of the demo site.")),
                og_image_url: Some("https://placehold.co/1200x630/png".to_string()),
                og_image_asset_id: None,
            },
            header_mode: HeaderMode::Default,
            header_preset_id: None,
            blocks: vec![Block {
                id: format!("blk_{slug}"),
                block_type: "hero".to_string(),
                props: serde_json::json!({"heading": title}),
            }],
            status: PageStatus::Draft,
            has_unpublished_changes: true,
            draft_version: 1,
            published_version_id: None,
            published_snapshot_id: None,
            published_at: None,
            published_by: None,
            updated_at: now,
            updated_by: None,
        });
    }
}
