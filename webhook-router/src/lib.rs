//! Webhook-driven geospatial project provisioning service.
//!
//! Listens for feature-service webhooks and a handful of direct API
//! endpoints, orchestrates change extraction and raster catalog queries
//! against the imagery platform, provisions projects, and notifies
//! downstream integrations. The admin listener serves liveness and
//! readiness probes separately from the API surface.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod metrics_defs;
pub mod notify;
pub mod pipeline;
pub mod provision;
pub mod service;

#[cfg(test)]
pub(crate) mod testutils;

pub use config::Config;
pub use errors::{Result, RouterError};

use service::{AppState, RouterService};
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;

/// Run the API and admin listeners until one of them fails.
pub async fn run(config: Config) -> Result<()> {
    let api = config.listener.clone();
    let admin = config.admin_listener.clone();

    let state = Arc::new(AppState::new(config)?);
    let api_service = RouterService::new(state);
    let admin_service = AdminService::<_, RouterError>::new(|| true);

    tokio::try_join!(
        run_http_service(&api.host, api.port, api_service),
        run_http_service(&admin.host, admin.port, admin_service),
    )?;
    Ok(())
}
