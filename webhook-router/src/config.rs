//! Service configuration.
//!
//! All settings come from environment variables (the deployment contract
//! this service inherits), but they are read exactly once into an explicit
//! struct that is validated eagerly and passed by reference afterwards.
//! `from_lookup` exists so tests can inject variables without touching
//! process-wide state.

use portal::changes::PollPolicy;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Last-resort portal sharing endpoint when neither `SHARING_URL` nor a
/// URL derived from `ORG_URL` is usable.
pub const FALLBACK_SHARING_URL: &str =
    "https://geospatialcenter.bd.esri.com/portal/sharing/rest";

const DEFAULT_AUTH_URL: &str = "https://www.arcgis.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid url in {name}: {detail}")]
    InvalidUrl { name: &'static str, detail: String },

    #[error("invalid number in {name}: {detail}")]
    InvalidNumber { name: &'static str, detail: String },

    #[error("port cannot be 0")]
    InvalidPort,

    #[error(
        "incomplete mission configuration: set all of MISSION_ADD_URL, MISSION_EXTENT, \
         MISSION_TEMPLATE_WEBMAP and INTEGROMAT_URL, or none of them"
    )]
    PartialMissionConfig,
}

/// Secret string whose value never appears in Debug output.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: String) -> Self {
        Secret(value)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"<redacted>\"")
    }
}

/// Network listener configuration
#[derive(Clone, Debug)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(())
    }
}

/// Mission project provisioning, enabled only when its whole variable
/// group is present.
#[derive(Clone, Debug)]
pub struct MissionConfig {
    pub add_url: Url,
    pub extent: String,
    pub template_webmap: String,
    pub notification_url: Url,
}

#[derive(Clone, Debug)]
pub struct StatsdConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Main listener for the API endpoints
    pub listener: Listener,
    /// Admin listener for health/readiness probes
    pub admin_listener: Listener,
    /// Platform base used by the webhook pipeline's session
    pub auth_url: Url,
    /// Organization portal; link templates are rooted here
    pub org_url: Url,
    /// Credentials for the webhook pipeline's session
    pub service_user: String,
    pub service_pass: Secret,
    /// Credentials the item-creation collaborator signs in with
    pub provisioning_user: String,
    pub provisioning_password: Secret,
    /// Resolved sharing REST base for item creation
    pub sharing_url: Url,
    pub share_with_org: bool,
    /// Shared secret guarding the direct project-creation endpoint
    pub webhook_secret: Secret,
    /// Outbound webhook receiving the excalibur project links
    pub project_notification_url: Url,
    pub mission: Option<MissionConfig>,
    /// Connect/read budget applied to every outbound HTTP call
    pub http_timeout: Duration,
    pub poll_policy: PollPolicy,
    pub statsd: Option<StatsdConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.is_empty() => Ok(value),
                _ => Err(ConfigError::MissingVar(name)),
            }
        };
        let optional = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let org_url = parse_url("ORG_URL", &required("ORG_URL")?)?;
        let auth_url = match optional("AUTH_URL") {
            Some(raw) => parse_url("AUTH_URL", &raw)?,
            None => parse_url("AUTH_URL", DEFAULT_AUTH_URL)?,
        };

        // Sharing URL: explicit override, else derived from the org portal,
        // else the hardcoded fallback.
        let sharing_url = match optional("SHARING_URL") {
            Some(raw) => parse_url("SHARING_URL", &raw)?,
            None => {
                let derived = format!("{}/sharing/rest", org_url.as_str().trim_end_matches('/'));
                Url::parse(&derived)
                    .or_else(|_| Url::parse(FALLBACK_SHARING_URL))
                    .map_err(|e| ConfigError::InvalidUrl {
                        name: "SHARING_URL",
                        detail: e.to_string(),
                    })?
            }
        };

        let mission = match (
            optional("MISSION_ADD_URL"),
            optional("MISSION_EXTENT"),
            optional("MISSION_TEMPLATE_WEBMAP"),
            optional("INTEGROMAT_URL"),
        ) {
            (None, None, None, None) => None,
            (Some(add_url), Some(extent), Some(template_webmap), Some(notification_url)) => {
                Some(MissionConfig {
                    add_url: parse_url("MISSION_ADD_URL", &add_url)?,
                    extent,
                    template_webmap,
                    notification_url: parse_url("INTEGROMAT_URL", &notification_url)?,
                })
            }
            _ => return Err(ConfigError::PartialMissionConfig),
        };

        let statsd = match optional("STATSD_HOST") {
            Some(host) => Some(StatsdConfig {
                host,
                port: parse_number(&optional("STATSD_PORT").unwrap_or_else(|| "8125".into()), "STATSD_PORT")?,
            }),
            None => None,
        };

        let config = Config {
            listener: Listener {
                host: optional("LISTEN_HOST").unwrap_or_else(|| "0.0.0.0".into()),
                port: parse_number(&optional("LISTEN_PORT").unwrap_or_else(|| "8080".into()), "LISTEN_PORT")?,
            },
            admin_listener: Listener {
                host: optional("ADMIN_HOST").unwrap_or_else(|| "127.0.0.1".into()),
                port: parse_number(&optional("ADMIN_PORT").unwrap_or_else(|| "8081".into()), "ADMIN_PORT")?,
            },
            auth_url,
            org_url,
            service_user: required("SERVICE_USER")?,
            service_pass: Secret::new(required("SERVICE_PASS")?),
            provisioning_user: required("GE_USER")?,
            provisioning_password: Secret::new(required("GE_PASSWORD")?),
            sharing_url,
            share_with_org: optional("ORG_SHARE")
                .map(|value| value.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            webhook_secret: Secret::new(required("SECRET")?),
            project_notification_url: parse_url(
                "INTEGROMAT_URL_EXC",
                &required("INTEGROMAT_URL_EXC")?,
            )?,
            mission,
            http_timeout: Duration::from_secs(parse_number(
                &optional("HTTP_TIMEOUT_SECS").unwrap_or_else(|| "30".into()),
                "HTTP_TIMEOUT_SECS",
            )?),
            poll_policy: PollPolicy {
                interval: Duration::from_secs(parse_number(
                    &optional("POLL_INTERVAL_SECS").unwrap_or_else(|| "2".into()),
                    "POLL_INTERVAL_SECS",
                )?),
                max_attempts: parse_number(
                    &optional("POLL_MAX_ATTEMPTS").unwrap_or_else(|| "150".into()),
                    "POLL_MAX_ATTEMPTS",
                )?,
            },
            statsd,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        Ok(())
    }
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        name,
        detail: e.to_string(),
    })
}

fn parse_number<T: std::str::FromStr>(raw: &str, name: &'static str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidNumber {
        name,
        detail: e.to_string(),
    })
}
