//! The webhook-driven change-extraction and provisioning pipeline.
//!
//! One invocation runs the whole sequence to completion: decode the change
//! notification, authenticate, resolve and poll the extract-changes job,
//! take the edited feature's location, query the raster catalog, provision
//! a project, and post the resulting links to the outbound webhook. Every
//! stage failure aborts the run with a `PipelineError` whose text becomes
//! the caller-visible message.

use crate::errors::PipelineError;
use crate::provision::ProjectOutcome;
use crate::service::AppState;
use percent_encoding::percent_decode_str;
use portal::PortalError;
use portal::changes;
use portal::session::Session;
use portal::types::{ChangeDescriptor, ChangeNotification};
use serde::Serialize;

/// Links posted to the outbound webhook after provisioning.
#[derive(Debug, Serialize)]
pub struct NotificationPayload {
    #[serde(rename = "excaliburProjectLink")]
    pub project_link: String,
    #[serde(rename = "excaliburItemLink")]
    pub item_link: String,
}

/// Decode the webhook body. Feature-service webhooks deliver a form-style
/// `payload=<url-encoded JSON array>`; a bare JSON array is accepted too.
pub fn decode_envelope(body: &[u8]) -> Result<ChangeNotification, PipelineError> {
    if body.is_empty() {
        return Err(PipelineError::MissingInput);
    }
    if let Ok(notification) = serde_json::from_slice::<ChangeNotification>(body) {
        return Ok(notification);
    }

    let payload = url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())
        .ok_or(PipelineError::MissingInput)?;
    serde_json::from_str(&payload).map_err(|_| PipelineError::MissingInput)
}

pub async fn run(state: &AppState, body: &[u8]) -> Result<String, PipelineError> {
    let notification = decode_envelope(body)?;
    // Only the first descriptor is processed; an empty sequence is the
    // same terminal condition as a missing body.
    let descriptor = notification
        .into_iter()
        .next()
        .ok_or(PipelineError::MissingInput)?;
    run_for_descriptor(state, descriptor).await
}

async fn run_for_descriptor(
    state: &AppState,
    descriptor: ChangeDescriptor,
) -> Result<String, PipelineError> {
    let config = &state.config;

    tracing::info!(
        service = descriptor.service_name.as_deref().unwrap_or("<unknown>"),
        events = ?descriptor.events,
        "processing change notification"
    );

    let session = Session::connect(
        &state.http,
        &config.auth_url,
        &config.service_user,
        config.service_pass.expose(),
    )
    .await
    .map_err(|e| PipelineError::Auth(e.to_string()))?;

    let changes_url = percent_decode_str(&descriptor.changes_url)
        .decode_utf8()
        .map_err(|e| PipelineError::Resolve(e.to_string()))?
        .into_owned();

    let handle = changes::resolve_changes(&state.http, &changes_url, session.token())
        .await
        .map_err(|e| PipelineError::Resolve(e.to_string()))?;

    let result = changes::await_completion(&state.http, &handle, session.token(), config.poll_policy)
        .await
        .map_err(|e| match e {
            PortalError::JobTimeout { .. } => PipelineError::Timeout(e.to_string()),
            other => PipelineError::Resolve(other.to_string()),
        })?;

    let feature = result
        .first_added_feature()
        .ok_or(PipelineError::NoChanges)?;
    let (x, y) = (feature.geometry.x, feature.geometry.y);
    tracing::info!(x, y, "extracted edited feature location");

    let raster_ids = state
        .catalog
        .query_raster_ids(Some(x), Some(y))
        .await
        .map_err(|e| PipelineError::Query(e.to_string()))?;
    if raster_ids.is_empty() {
        tracing::warn!(x, y, "no rasters intersect the edited feature");
        return Err(PipelineError::EmptyRasterSet);
    }

    let outcome = state.provisioner.provision(raster_ids, None, true).await;
    let (item_id, item_link, project_link) = match outcome {
        ProjectOutcome::Success {
            item_id,
            item_link,
            project_link,
        } => (item_id, item_link, project_link),
        ProjectOutcome::Failure { message } => return Err(PipelineError::Provisioning(message)),
    };
    tracing::info!(%item_id, "project provisioned from webhook");

    let payload = NotificationPayload {
        project_link,
        item_link,
    };
    state
        .notifier
        .notify(&config.project_notification_url, &payload)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::state_for;
    use crate::testutils::start_mock_server;
    use http::StatusCode;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn percent_encode(url: &str) -> String {
        url.replace(':', "%3A")
            .replace('/', "%2F")
            .replace('?', "%3F")
            .replace('=', "%3D")
            .replace('&', "%26")
    }

    fn form_body(notification: serde_json::Value) -> Vec<u8> {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("payload", &notification.to_string())
            .finish()
            .into_bytes()
    }

    /// One server standing in for every collaborator, routed by path.
    async fn start_platform(
        catalog_features: serde_json::Value,
        hits: Arc<Mutex<Vec<String>>>,
    ) -> u16 {
        start_mock_server(move |port, path| {
            hits.lock().unwrap().push(path.to_string());
            let body = if path.starts_with("/sharing/rest/generateToken")
                || path.starts_with("/provision/generateToken")
            {
                json!({"token": "tok"})
            } else if path.starts_with("/extractChanges") {
                json!({"statusUrl": format!("http://127.0.0.1:{port}/jobstatus")})
            } else if path.starts_with("/jobstatus") {
                json!({
                    "status": "Completed",
                    "resultUrl": format!("http://127.0.0.1:{port}/jobresult"),
                })
            } else if path.starts_with("/jobresult") {
                json!({
                    "edits": [{
                        "features": {
                            "adds": [{
                                "geometry": {"x": -6393834.6, "y": -1998152.7},
                                "attributes": {"CONFIDENCE": "high"}
                            }]
                        }
                    }]
                })
            } else if path.starts_with("/catalog/query") {
                catalog_features.clone()
            } else if path.contains("/content/users/ge/addItem") {
                // Webhook provisioning signs in as the GE account.
                json!({"success": true, "id": "proj-77"})
            } else if path.starts_with("/notify") {
                json!({"message": "links sent"})
            } else {
                json!({"error": {"message": format!("unexpected path {path}")}})
            };
            (StatusCode::OK, body)
        })
        .await
    }

    fn webhook_body(port: u16) -> Vec<u8> {
        let changes_url =
            percent_encode(&format!("http://127.0.0.1:{port}/extractChanges?async=true"));
        form_body(json!([{
            "name": "workforce",
            "serviceName": "VIIRS_Alerts",
            "changesUrl": changes_url,
            "events": ["FeaturesCreated"]
        }]))
    }

    #[tokio::test]
    async fn full_pipeline_relays_the_acknowledgement() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let port = start_platform(
            json!({"features": [{"attributes": {"OBJECTID": 5}}, {"attributes": {"OBJECTID": 9}}]}),
            hits.clone(),
        )
        .await;

        let state = state_for(port);
        let ack = run(&state, &webhook_body(port)).await.unwrap();
        assert_eq!(ack, "links sent");

        let hits = hits.lock().unwrap();
        assert!(hits.iter().any(|p| p.contains("/addItem")));
        assert!(hits.iter().any(|p| p.starts_with("/notify")));
    }

    #[tokio::test]
    async fn empty_raster_set_stops_before_provisioning() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let port = start_platform(json!({"features": []}), hits.clone()).await;

        let state = state_for(port);
        let err = run(&state, &webhook_body(port)).await.unwrap_err();
        assert!(matches!(err, PipelineError::EmptyRasterSet));
        assert_eq!(
            err.to_string(),
            "no raster ids found. don't wanna query the entire landsat catalog..."
        );

        let hits = hits.lock().unwrap();
        assert!(!hits.iter().any(|p| p.contains("/addItem")));
        assert!(!hits.iter().any(|p| p.starts_with("/notify")));
    }

    #[tokio::test]
    async fn empty_body_aborts_without_contacting_anyone() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let port = start_platform(json!({"features": []}), hits.clone()).await;

        let state = state_for(port);
        let err = run(&state, b"").await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput));
        assert_eq!(err.to_string(), "missing request body");
        assert!(hits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_change_list_is_missing_input() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let port = start_platform(json!({"features": []}), hits.clone()).await;

        let state = state_for(port);
        let err = run(&state, &form_body(json!([]))).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput));
        assert!(hits.lock().unwrap().is_empty());
    }

    #[test]
    fn envelope_decodes_both_shapes() {
        let raw = br#"[{"changesUrl": "https%3A%2F%2Fx%2FextractChanges"}]"#;
        let notification = decode_envelope(raw).unwrap();
        assert_eq!(notification.len(), 1);

        let form = form_body(json!([{"changesUrl": "https%3A%2F%2Fx%2FextractChanges"}]));
        let notification = decode_envelope(&form).unwrap();
        assert_eq!(notification.len(), 1);

        assert!(matches!(
            decode_envelope(b"payload="),
            Err(PipelineError::MissingInput)
        ));
        assert!(matches!(
            decode_envelope(b"definitely not json"),
            Err(PipelineError::MissingInput)
        ));
    }
}
