//! Ad-hoc raster catalog lookup by Web Mercator point.

use super::param;
use super::response::ApiResponse;
use crate::service::AppState;
use http::request::Parts;

pub(super) async fn handle(state: &AppState, parts: &Parts, body: &[u8]) -> ApiResponse {
    let x = param(parts, body, "x").and_then(|raw| raw.parse::<f64>().ok());
    let y = param(parts, body, "y").and_then(|raw| raw.parse::<f64>().ok());

    match state.catalog.query_raster_ids(x, y).await {
        Ok(ids) => ApiResponse::success_only().with_field("rasterIds", serde_json::json!(ids)),
        Err(e) => ApiResponse::failure(e.to_string()),
    }
}
