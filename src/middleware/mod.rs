pub mod logging;

use crate::state::AppState;
use axum::Router;

/// Apply default middleware layers (request logging, HTTP metrics).
pub fn with_defaults(router: Router<AppState>) -> Router<AppState> {
    logging::add_tracing(router).layer(axum::middleware::from_fn(crate::metrics::track_http_metrics))
}
