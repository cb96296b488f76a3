//! Authenticated session against the platform's token endpoint.
//!
//! One session is established per invocation; tokens are never cached or
//! reused across requests.

use crate::error::{PortalError, Result};
use serde::Deserialize;
use url::Url;

/// Opaque authenticated session exposing the current bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    error: Option<TokenErrorBody>,
}

#[derive(Deserialize)]
struct TokenErrorBody {
    #[serde(default)]
    message: String,
}

impl Session {
    /// Exchange credentials for a bearer token at
    /// `{portal_base}/sharing/rest/generateToken`.
    ///
    /// Failure aborts the caller's pipeline; there is no retry.
    pub async fn connect(
        http: &reqwest::Client,
        portal_base: &Url,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let token_url = format!(
            "{}/sharing/rest/generateToken",
            portal_base.as_str().trim_end_matches('/')
        );
        let token = fetch_token(http, &token_url, username, password, portal_base.as_str()).await?;
        Ok(Session { token })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// POST a generateToken request and unwrap the platform's in-band error
/// envelope. Also used by the sharing REST item client, whose token
/// endpoint lives under a different base path.
pub(crate) async fn fetch_token(
    http: &reqwest::Client,
    token_url: &str,
    username: &str,
    password: &str,
    referer: &str,
) -> Result<String> {
    if username.is_empty() || password.is_empty() {
        return Err(PortalError::Auth(
            "username and password must be non-empty".into(),
        ));
    }

    let response = http
        .post(token_url)
        .form(&[
            ("username", username),
            ("password", password),
            ("client", "referer"),
            ("referer", referer),
            ("expiration", "60"),
            ("f", "json"),
        ])
        .send()
        .await?;

    let payload: TokenResponse = response.json().await?;
    if let Some(error) = payload.error {
        return Err(PortalError::Auth(error.message));
    }
    match payload.token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(PortalError::Auth("token missing from response".into())),
    }
}
