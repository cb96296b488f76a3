//! Direct project creation, guarded by the shared secret.

use super::param;
use super::response::ApiResponse;
use crate::provision::ProjectOutcome;
use crate::service::AppState;
use http::request::Parts;

const BAD_SECRET_MESSAGE: &str = "missing or incorrect super-duper secret key";

pub(super) async fn handle(state: &AppState, parts: &Parts, body: &[u8]) -> ApiResponse {
    let presented = param(parts, body, "secret");
    if presented.as_deref() != Some(state.config.webhook_secret.expose()) {
        tracing::warn!("project creation rejected: bad or missing secret");
        return ApiResponse::failure(BAD_SECRET_MESSAGE);
    }

    // Absent rasterIds provisions a project with an empty focus list.
    let raster_ids = match param(parts, body, "rasterIds") {
        Some(raw) => match parse_raster_ids(&raw) {
            Ok(ids) => ids,
            Err(bad) => return ApiResponse::failure(format!("invalid raster id: {bad}")),
        },
        None => Vec::new(),
    };

    let title = param(parts, body, "projectName").unwrap_or_else(|| {
        format!(
            "Generic Project Name - {}",
            chrono::Utc::now().timestamp()
        )
    });

    match state
        .direct_provisioner
        .provision(raster_ids, Some(&title), false)
        .await
    {
        ProjectOutcome::Success {
            item_id,
            item_link: _,
            project_link,
        } => ApiResponse::ok(format!("Project successfully created. Item ID is: {item_id}"))
            .with_field("projectId", item_id)
            .with_field("excaliburProjectLink", project_link),
        ProjectOutcome::Failure { message } => ApiResponse::failure(message),
    }
}

fn parse_raster_ids(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.parse::<i64>().map_err(|_| piece.to_string()))
        .collect()
}
