use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::config::Config;
use crate::services::relay::RelayEngine;
use crate::services::upload_service::UploadService;
use crate::websocket::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Postgres>,
    pub registry: SessionRegistry,
    pub relay: Arc<RelayEngine>,
    pub config: Arc<Config>,
    /// Present only when object storage is configured.
    pub uploads: Option<Arc<UploadService>>,
}
