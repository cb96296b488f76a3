//! Outbound webhook notification.
//!
//! Posts a flat payload of named links and relays the integration's
//! acknowledgement message. Delivery failures are terminal; nothing is
//! retried.

use crate::errors::PipelineError;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Deserialize)]
struct AckResponse {
    message: String,
}

#[derive(Clone)]
pub struct Notifier {
    http: reqwest::Client,
}

impl Notifier {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn notify<T: Serialize>(
        &self,
        webhook_url: &Url,
        payload: &T,
    ) -> Result<String, PipelineError> {
        let response = self
            .http
            .post(webhook_url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| PipelineError::Delivery(e.to_string()))?
            .error_for_status()
            .map_err(|e| PipelineError::Delivery(e.to_string()))?;

        let ack: AckResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Delivery(e.to_string()))?;
        Ok(ack.message)
    }
}
