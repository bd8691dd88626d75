use axum::extract::FromRef;

use crate::catalogue::CatalogueQuery;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCatalogueQuery = Arc<CatalogueQuery>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalogue: GuardedCatalogueQuery,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedCatalogueQuery {
    fn from_ref(input: &ServerState) -> Self {
        input.catalogue.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
