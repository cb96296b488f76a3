//! Hyper service wiring: one shared application state, one tower-less
//! service struct handed to the accept loop.

use crate::config::Config;
use crate::errors::{Result, RouterError};
use crate::handlers;
use crate::notify::Notifier;
use crate::provision::Provisioner;
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::service::Service;
use hyper::{Request, Response};
use portal::catalog::{CatalogClient, LANDSAT_QUERY_URL};
use portal::items::SharingRestClient;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Everything the handlers need, built once at startup and shared across
/// connections.
pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
    pub catalog: CatalogClient,
    /// Webhook provisioning, signed in as the GE account.
    pub provisioner: Provisioner,
    /// Direct-endpoint provisioning, signed in as the service account.
    pub direct_provisioner: Provisioner,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| RouterError::HttpClient(e.to_string()))?;

        let query_url = Url::parse(LANDSAT_QUERY_URL)
            .map_err(|e| RouterError::Internal(e.to_string()))?;
        let catalog = CatalogClient::new(http.clone(), query_url);

        let creator = SharingRestClient::new(
            http.clone(),
            config.sharing_url.clone(),
            config.provisioning_user.clone(),
            config.provisioning_password.expose().to_string(),
        );
        let provisioner = Provisioner::new(
            Arc::new(creator),
            config.org_url.clone(),
            config.provisioning_user.clone(),
            config.provisioning_password.expose().to_string(),
            config.share_with_org,
        );

        let direct_creator = SharingRestClient::new(
            http.clone(),
            config.sharing_url.clone(),
            config.service_user.clone(),
            config.service_pass.expose().to_string(),
        );
        let direct_provisioner = Provisioner::new(
            Arc::new(direct_creator),
            config.org_url.clone(),
            config.service_user.clone(),
            config.service_pass.expose().to_string(),
            config.share_with_org,
        );

        let notifier = Notifier::new(http.clone());

        Ok(Self {
            config,
            http,
            catalog,
            provisioner,
            direct_provisioner,
            notifier,
        })
    }
}

#[derive(Clone)]
pub struct RouterService {
    state: Arc<AppState>,
}

impl RouterService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

impl Service<Request<Incoming>> for RouterService {
    type Response = Response<BoxBody<Bytes, RouterError>>;
    type Error = RouterError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let state = self.state.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| RouterError::RequestBody(e.to_string()))?
                .to_bytes();

            let response = handlers::route(&state, &parts, &body).await;
            response.into_http()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::state_for;
    use crate::testutils::start_mock_server;
    use http::StatusCode;
    use serde_json::json;

    /// End to end over a real socket: request in, envelope out.
    #[tokio::test]
    async fn service_answers_in_the_envelope_over_http() {
        let upstream =
            start_mock_server(|_, _| (StatusCode::OK, json!({"message": "unused"}))).await;
        let state = Arc::new(state_for(upstream));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = shared::http::run_http_service_on(listener, RouterService::new(state)).await;
        });

        let response = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/FeatureServiceWebhook"))
            .body("")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["message"], json!("missing request body"));
    }

    #[tokio::test]
    async fn unknown_endpoint_is_still_http_200() {
        let upstream =
            start_mock_server(|_, _| (StatusCode::OK, json!({"message": "unused"}))).await;
        let state = Arc::new(state_for(upstream));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let _ = shared::http::run_http_service_on(listener, RouterService::new(state)).await;
        });

        let response = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/Nope"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["success"], json!(false));
    }
}
