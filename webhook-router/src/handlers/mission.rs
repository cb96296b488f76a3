//! Mission project creation.
//!
//! Available only when the mission variable group is configured. Unlike
//! the excalibur flow there is no item definition document; the platform's
//! mission endpoint takes a flat form and returns the new mission id.

use super::param;
use super::response::ApiResponse;
use crate::provision::Provisioner;
use crate::service::AppState;
use http::request::Parts;
use portal::session::Session;
use serde::Deserialize;

#[derive(Deserialize)]
struct MissionCreateResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<MissionErrorBody>,
}

#[derive(Deserialize)]
struct MissionErrorBody {
    #[serde(default)]
    message: String,
}

pub(super) async fn handle(state: &AppState, parts: &Parts, body: &[u8]) -> ApiResponse {
    let Some(mission) = &state.config.mission else {
        return ApiResponse::failure("mission provisioning is not configured");
    };

    let session = match Session::connect(
        &state.http,
        &state.config.org_url,
        &state.config.provisioning_user,
        state.config.provisioning_password.expose(),
    )
    .await
    {
        Ok(session) => session,
        Err(e) => return ApiResponse::failure(e.to_string()),
    };

    let title = param(parts, body, "projectName").unwrap_or_else(|| {
        format!("Mission Project {}", Provisioner::timestamp_label())
    });
    tracing::info!(title = %title, "creating mission project");

    let payload: MissionCreateResponse = match state
        .http
        .post(mission.add_url.clone())
        .form(&[
            ("title", title.as_str()),
            ("extent", mission.extent.as_str()),
            ("templateWebMapId", mission.template_webmap.as_str()),
            ("async", "false"),
            ("f", "json"),
            ("token", session.token()),
        ])
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
    {
        Ok(response) => match response.json().await {
            Ok(payload) => payload,
            Err(e) => return ApiResponse::failure(format!("Error creating project: {e}")),
        },
        Err(e) => return ApiResponse::failure(format!("Error creating project: {e}")),
    };

    if let Some(error) = payload.error {
        return ApiResponse::failure(format!("Error creating project: {}", error.message));
    }
    let Some(mission_id) = payload.id else {
        return ApiResponse::failure("Error creating project: mission id missing from response");
    };

    let org = state.config.org_url.as_str().trim_end_matches('/');
    let links = serde_json::json!({
        "missionProjectLink": format!("{org}/apps/mission/app.html#missionanalyst/{mission_id}"),
        "missionItemLink": format!("{org}/home/item.html?id={mission_id}"),
    });

    match state
        .notifier
        .notify(&mission.notification_url, &links)
        .await
    {
        Ok(ack) => ApiResponse::message_only(ack),
        Err(e) => {
            tracing::error!(error = %e, %mission_id, "mission created but notification failed");
            ApiResponse::failure(e.to_string())
        }
    }
}
