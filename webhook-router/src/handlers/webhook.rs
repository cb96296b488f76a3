//! Feature-service webhook endpoint: runs the full extraction and
//! provisioning pipeline and relays the integration's acknowledgement.

use super::response::ApiResponse;
use crate::metrics_defs::PIPELINE_ABORTS;
use crate::pipeline;
use crate::service::AppState;
use shared::counter;

pub(super) async fn handle(state: &AppState, body: &[u8]) -> ApiResponse {
    match pipeline::run(state, body).await {
        Ok(ack) => ApiResponse::message_only(ack),
        Err(e) => {
            counter!(PIPELINE_ABORTS).increment(1);
            tracing::error!(error = %e, "webhook pipeline aborted");
            ApiResponse::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::state_for;
    use super::*;
    use crate::testutils::start_mock_server;
    use http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn missing_body_reports_the_legacy_message() {
        let port =
            start_mock_server(|_, _| (StatusCode::OK, json!({"message": "unused"}))).await;
        let state = state_for(port);

        let response = handle(&state, b"").await;
        assert_eq!(response.success(), Some(false));
        assert_eq!(response.message(), "missing request body");
    }

    #[tokio::test]
    async fn acknowledgement_has_no_success_marker() {
        let port = start_mock_server(|port, path| {
            let body = if path.contains("generateToken") {
                json!({"token": "tok"})
            } else if path.starts_with("/extractChanges") {
                json!({"statusUrl": format!("http://127.0.0.1:{port}/jobstatus")})
            } else if path.starts_with("/jobstatus") {
                json!({
                    "status": "Completed",
                    "resultUrl": format!("http://127.0.0.1:{port}/jobresult"),
                })
            } else if path.starts_with("/jobresult") {
                json!({"edits": [{"features": {"adds": [{
                    "geometry": {"x": 1.0, "y": 2.0},
                    "attributes": {}
                }]}}]})
            } else if path.starts_with("/catalog/query") {
                json!({"features": [{"attributes": {"OBJECTID": 3}}]})
            } else if path.contains("/addItem") {
                json!({"success": true, "id": "item-1"})
            } else if path.starts_with("/notify") {
                json!({"message": "Accepted"})
            } else {
                json!({"error": {"message": "unexpected"}})
            };
            (StatusCode::OK, body)
        })
        .await;
        let state = state_for(port);

        let changes_url = format!("http://127.0.0.1:{port}/extractChanges")
            .replace(':', "%3A")
            .replace('/', "%2F");
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("payload", &json!([{"changesUrl": changes_url}]).to_string())
            .finish();

        let response = handle(&state, body.as_bytes()).await;
        assert_eq!(response.success(), None);
        assert_eq!(response.message(), "Accepted");
    }
}
