//! Resolution and polling of the asynchronous extract-changes job.
//!
//! A webhook delivers a percent-encoded changes URL. Dereferencing it once
//! yields a status URL; the status URL is polled at a fixed interval until
//! the job reports `Completed`, at which point the result URL is fetched
//! once to obtain the edits. The poll loop is bounded: exhausting
//! `PollPolicy::max_attempts` is a `JobTimeout`, never an endless wait.

use crate::error::{PortalError, Result};
use crate::metrics_defs::{JOB_POLLS, JOB_TIMEOUTS};
use crate::types::EditedFeature;
use serde::Deserialize;
use shared::counter;
use std::time::Duration;
use url::Url;

const STATUS_COMPLETED: &str = "Completed";

/// Bounds for the fixed-interval status poll.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        // 150 polls at 2s is a five minute ceiling per job.
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 150,
        }
    }
}

/// One in-flight extraction job, created by dereferencing the changes URL.
#[derive(Debug, Clone)]
pub struct JobHandle {
    status_url: Url,
}

#[derive(Deserialize)]
struct ChangesResponse {
    #[serde(rename = "statusUrl")]
    status_url: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: String,
    #[serde(rename = "resultUrl")]
    result_url: Option<String>,
}

/// Completed extraction payload: `{edits: [{features: {adds: [...]}}]}`.
#[derive(Debug, Deserialize)]
pub struct ExtractResult {
    #[serde(default)]
    edits: Vec<Edit>,
}

#[derive(Debug, Deserialize)]
struct Edit {
    #[serde(default)]
    features: FeatureEdits,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureEdits {
    #[serde(default)]
    adds: Vec<EditedFeature>,
}

impl ExtractResult {
    /// First added feature of the first edit: the record the pipeline acts on.
    pub fn first_added_feature(&self) -> Option<&EditedFeature> {
        self.edits.first().and_then(|edit| edit.features.adds.first())
    }
}

/// Dereference an already-decoded changes URL once to obtain the job's
/// status URL.
pub async fn resolve_changes(
    http: &reqwest::Client,
    changes_url: &str,
    token: &str,
) -> Result<JobHandle> {
    let mut url =
        Url::parse(changes_url).map_err(|e| PortalError::InvalidChangesUrl(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("f", "json")
        .append_pair("token", token);

    let payload: ChangesResponse = http.get(url).send().await?.json().await?;
    let status_url = payload
        .status_url
        .ok_or_else(|| PortalError::malformed("extractChanges", "statusUrl missing"))?;
    let status_url = Url::parse(&status_url)
        .map_err(|e| PortalError::malformed("extractChanges", e.to_string()))?;

    Ok(JobHandle { status_url })
}

/// Poll the job's status URL until it reports `Completed`, then fetch the
/// result payload once.
pub async fn await_completion(
    http: &reqwest::Client,
    handle: &JobHandle,
    token: &str,
    policy: PollPolicy,
) -> Result<ExtractResult> {
    let mut status_url = handle.status_url.clone();
    status_url
        .query_pairs_mut()
        .append_pair("token", token)
        .append_pair("f", "json");

    let mut attempts = 0u32;
    let raw_result_url = loop {
        attempts += 1;
        counter!(JOB_POLLS).increment(1);

        let payload: StatusResponse = http.get(status_url.clone()).send().await?.json().await?;
        if payload.status == STATUS_COMPLETED {
            break payload
                .result_url
                .ok_or_else(|| PortalError::malformed("job status", "resultUrl missing"))?;
        }

        tracing::debug!(status = %payload.status, attempts, "changes job not complete yet");
        if attempts >= policy.max_attempts {
            counter!(JOB_TIMEOUTS).increment(1);
            return Err(PortalError::JobTimeout { attempts });
        }
        tokio::time::sleep(policy.interval).await;
    };

    let mut result_url = Url::parse(&raw_result_url)
        .map_err(|e| PortalError::malformed("job status", e.to_string()))?;
    result_url
        .query_pairs_mut()
        .append_pair("f", "json")
        .append_pair("token", token);

    let result: ExtractResult = http.get(result_url).send().await?.json().await?;
    Ok(result)
}
