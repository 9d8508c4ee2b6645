use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub mod messages;
pub mod sessions;
pub mod subscriptions;
pub mod uploads;
pub mod users;

use crate::websocket::handlers::ws_handler;
use messages::get_message_history;
use sessions::{create_session, delete_session, list_sessions};
use subscriptions::register_subscription;
use uploads::presign_upload;
use users::{create_user, delete_user, list_users};

pub fn build_router() -> Router<AppState> {
    // Service introspection endpoints (no API version prefix)
    let introspection = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/metrics", get(crate::metrics::metrics_handler));

    // API v1 endpoints
    let api_v1 = Router::new()
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/:id", delete(delete_session))
        .route("/sessions/:id/messages", get(get_message_history))
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", delete(delete_user))
        .route("/push/subscriptions", post(register_subscription))
        .route("/uploads", post(presign_upload))
        .route("/ws", get(ws_handler));

    let router = introspection.merge(Router::new().nest("/api/v1", api_v1));

    crate::middleware::with_defaults(router)
}
