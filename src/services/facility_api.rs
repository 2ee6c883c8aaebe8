// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Facility API client.
//!
//! Three read-only resources:
//! - `GET {base}/facilities` - standard facilities
//! - `GET {base}/facility-types` - `[{ "facility_type": ... }]`
//! - `GET {base}/uploaded-facilities` - user-uploaded facilities

use crate::error::{AppError, Result};
use crate::models::{Facility, FacilityTypeRecord};
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Source of facility data. Implemented over HTTP by [`HttpFacilityApi`].
pub trait FacilityApi: Send + Sync + 'static {
    fn facilities(&self) -> impl Future<Output = Result<Vec<Facility>>> + Send;
    fn facility_types(&self) -> impl Future<Output = Result<Vec<String>>> + Send;
    fn uploaded_facilities(&self) -> impl Future<Output = Result<Vec<Facility>>> + Send;
}

/// The facility API resources, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacilityResource {
    Facilities,
    FacilityTypes,
    UploadedFacilities,
}

impl FacilityResource {
    pub fn path(&self) -> &'static str {
        match self {
            FacilityResource::Facilities => "facilities",
            FacilityResource::FacilityTypes => "facility-types",
            FacilityResource::UploadedFacilities => "uploaded-facilities",
        }
    }
}

impl fmt::Display for FacilityResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Bounded retry with linear backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Delay before attempt `n + 1` after attempt `n` (1-based) failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

/// Run `fetch` until it succeeds or the policy's attempts are used up.
///
/// Returns the last error once every attempt has failed.
pub async fn fetch_with_retry<T, F, Fut>(
    resource: FacilityResource,
    policy: RetryPolicy,
    mut fetch: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match fetch().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => {
                tracing::error!(resource = %resource, attempts, error = %e, "Fetch failed, giving up");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    resource = %resource,
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// HTTP implementation of [`FacilityApi`].
#[derive(Clone)]
pub struct HttpFacilityApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFacilityApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, resource: FacilityResource) -> Result<T> {
        let url = format!("{}/{}", self.base_url, resource.path());

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::FacilityApi(format!("{}: {}", resource, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::FacilityApi(format!(
                "{}: HTTP {}: {}",
                resource, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::FacilityApi(format!("{}: JSON parse error: {}", resource, e)))
    }
}

impl FacilityApi for HttpFacilityApi {
    async fn facilities(&self) -> Result<Vec<Facility>> {
        self.get_json(FacilityResource::Facilities).await
    }

    async fn facility_types(&self) -> Result<Vec<String>> {
        let records: Vec<FacilityTypeRecord> =
            self.get_json(FacilityResource::FacilityTypes).await?;
        Ok(records.into_iter().map(|r| r.facility_type).collect())
    }

    async fn uploaded_facilities(&self) -> Result<Vec<Facility>> {
        self.get_json(FacilityResource::UploadedFacilities).await
    }
}
