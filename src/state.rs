use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::AppConfig, db::OrmConn};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(orm: OrmConn, config: AppConfig) -> Self {
        Self {
            orm,
            config: Arc::new(config),
        }
    }
}
