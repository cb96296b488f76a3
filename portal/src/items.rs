//! Item creation through the portal sharing REST API.

use crate::error::{PortalError, Result};
use crate::session::fetch_token;
use crate::types::ProjectDefinition;
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

const PROJECT_ITEM_TYPE: &str = "Excalibur Imagery Project";

/// Collaborator that turns a project definition into a portal item.
///
/// The provisioner depends on this trait so tests can substitute a mock;
/// the platform always creates a new item per call, so submitting the same
/// definition twice yields two distinct ids.
#[async_trait]
pub trait ItemCreator: Send + Sync {
    async fn create_item(
        &self,
        definition: &ProjectDefinition,
        share_with_org: bool,
    ) -> Result<String>;
}

/// `ItemCreator` backed by the sharing REST endpoints under a portal's
/// `/sharing/rest` base.
pub struct SharingRestClient {
    http: reqwest::Client,
    sharing_url: Url,
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct AddItemResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

impl SharingRestClient {
    pub fn new(http: reqwest::Client, sharing_url: Url, username: String, password: String) -> Self {
        Self {
            http,
            sharing_url,
            username,
            password,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.sharing_url.as_str().trim_end_matches('/'))
    }
}

#[async_trait]
impl ItemCreator for SharingRestClient {
    async fn create_item(
        &self,
        definition: &ProjectDefinition,
        share_with_org: bool,
    ) -> Result<String> {
        let token = fetch_token(
            &self.http,
            &self.endpoint("generateToken"),
            &self.username,
            &self.password,
            self.sharing_url.as_str(),
        )
        .await?;

        let text = serde_json::to_string(definition)?;
        let payload: AddItemResponse = self
            .http
            .post(self.endpoint(&format!("content/users/{}/addItem", self.username)))
            .form(&[
                ("f", "json"),
                ("token", token.as_str()),
                ("title", definition.title.as_str()),
                ("type", PROJECT_ITEM_TYPE),
                ("text", text.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = payload.error {
            return Err(PortalError::ItemRejected(error.message));
        }
        let item_id = match payload.id {
            Some(id) if payload.success => id,
            _ => {
                return Err(PortalError::ItemRejected(
                    "portal did not return an item id".into(),
                ));
            }
        };

        if share_with_org {
            tracing::info!(%item_id, "sharing item with organization");
            self.http
                .post(self.endpoint(&format!(
                    "content/users/{}/items/{item_id}/share",
                    self.username
                )))
                .form(&[("f", "json"), ("token", token.as_str()), ("org", "true")])
                .send()
                .await?
                .error_for_status()?;
        }

        Ok(item_id)
    }
}
