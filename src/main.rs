use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chat_relay_service::{
    config::Config,
    db,
    error::AppError,
    logging, routes,
    services::{
        push::PushDispatcher,
        push_client::HttpPushClient,
        relay::RelayEngine,
        upload_service::UploadService,
    },
    state::AppState,
    storage::PgRelayStore,
    websocket::SessionRegistry,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    logging::init_tracing();
    let cfg = Arc::new(Config::from_env()?);

    let pool = db::init_pool(&cfg.database_url)
        .await
        .map_err(|e| AppError::StartServer(format!("db: {e}")))?;

    // Embedded migrations are idempotent; a schema mismatch is fatal.
    db::MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| AppError::StartServer(format!("database migrations failed: {e}")))?;

    let uploads = match cfg.s3.as_ref() {
        Some(s3_cfg) => {
            let aws_cfg = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let client = aws_sdk_s3::Client::new(&aws_cfg);
            Some(Arc::new(UploadService::new(client, s3_cfg.clone())))
        }
        None => {
            tracing::info!("S3_BUCKET not set; file upload endpoint disabled");
            None
        }
    };

    let registry = SessionRegistry::new();
    let store = Arc::new(PgRelayStore::new(pool.clone()));
    let push_client = Arc::new(HttpPushClient::new(cfg.push_ttl_secs));
    let dispatcher = Arc::new(PushDispatcher::new(
        store.clone(),
        push_client,
        cfg.public_base_url.clone(),
        cfg.push_concurrency,
        Duration::from_secs(cfg.push_timeout_secs),
    ));
    let relay = Arc::new(RelayEngine::new(
        store,
        registry.clone(),
        dispatcher,
    ));

    let state = AppState {
        db: pool,
        registry,
        relay,
        config: cfg.clone(),
        uploads,
    };

    let app = routes::build_router().with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("chat-relay-service listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::StartServer(format!("failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::StartServer(format!("server error: {e}")))?;

    Ok(())
}
