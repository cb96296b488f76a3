//! Endpoint dispatch.
//!
//! Four routes, one per operation the service exposes. Anything else is
//! answered in the same always-200 envelope with `success: false`.

mod create_project;
mod mission;
mod query_rasters;
pub mod response;
mod webhook;

use crate::metrics_defs::REQUESTS;
use crate::service::AppState;
use http::request::Parts;
use response::ApiResponse;
use shared::counter;

pub async fn route(state: &AppState, parts: &Parts, body: &[u8]) -> ApiResponse {
    counter!(REQUESTS).increment(1);
    tracing::info!(method = %parts.method, path = %parts.uri.path(), "handling request");

    match parts.uri.path() {
        "/api/FeatureServiceWebhook" => webhook::handle(state, body).await,
        "/api/CreateExcaliburProject" => create_project::handle(state, parts, body).await,
        "/api/CreateMissionProject" => mission::handle(state, parts, body).await,
        "/api/QueryLandsatForRasterIds" => query_rasters::handle(state, parts, body).await,
        other => {
            tracing::warn!(path = other, "no such endpoint");
            ApiResponse::failure("not found")
        }
    }
}

/// Request parameter lookup: query string first, then a top-level field of
/// a JSON body. Numbers are stringified so both transports look the same
/// to handlers.
pub(crate) fn param(parts: &Parts, body: &[u8], key: &str) -> Option<String> {
    if let Some(query) = parts.uri.query() {
        let found = url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned());
        if found.is_some() {
            return found;
        }
    }

    let json: serde_json::Value = serde_json::from_slice(body).ok()?;
    match json.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{parts_for, state_for};
    use super::*;
    use crate::testutils::start_mock_server;
    use http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn unknown_paths_answer_in_the_envelope() {
        let port =
            start_mock_server(|_, _| (StatusCode::OK, json!({"message": "unused"}))).await;
        let state = state_for(port);

        let parts = parts_for("/api/NoSuchFunction");
        let response = route(&state, &parts, b"").await;
        assert_eq!(response.success(), Some(false));
        assert_eq!(response.message(), "not found");
    }

    #[test]
    fn param_prefers_the_query_string() {
        let parts = parts_for("/api/X?secret=from-query");
        let body = br#"{"secret": "from-body"}"#;
        assert_eq!(param(&parts, body, "secret").as_deref(), Some("from-query"));
    }

    #[test]
    fn param_falls_back_to_json_body_fields() {
        let parts = parts_for("/api/X");
        let body = br#"{"x": -6393834.69, "name": "n"}"#;
        assert_eq!(param(&parts, body, "name").as_deref(), Some("n"));
        assert_eq!(param(&parts, body, "x").as_deref(), Some("-6393834.69"));
        assert_eq!(param(&parts, body, "missing"), None);
    }
}
