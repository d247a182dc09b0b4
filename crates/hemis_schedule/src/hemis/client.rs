//! HTTP client for the HEMIS schedule endpoint.

use super::types::ScheduleResponse;
use crate::config::HemisConfig;
use crate::error::ScheduleError;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{info, warn};

const USER_AGENT: &str = concat!("hemis_schedule/", env!("CARGO_PKG_VERSION"));

/// Client for fetching one week of a semester's schedule from HEMIS.
pub struct HemisClient {
    client: Client,
    config: HemisConfig,
}

impl HemisClient {
    /// Creates a client bound to the given endpoint and token.
    pub fn new(config: HemisConfig) -> Result<Self, ScheduleError> {
        // No explicit timeouts; transport defaults apply
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ScheduleError::RemoteUnavailable {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// Fetches the raw schedule entries for `week` of `semester`.
    ///
    /// Issues a single request with no retries.
    ///
    /// # Returns
    /// * `Ok(entries)` - The `data` array of the response body
    /// * `Ok(vec![])` - On a non-200 status when `legacy_empty_on_error` is set
    /// * `Err(RemoteStatus)` - On a non-200 status otherwise
    /// * `Err(RemoteUnavailable)` - If the request could not be sent or the body not read
    /// * `Err(UnexpectedResponse)` - If a 200 body has no `data` array
    pub async fn fetch(&self, week: i64, semester: i64) -> Result<Vec<Value>, ScheduleError> {
        info!(
            url = %self.config.base_url,
            week = week,
            semester = semester,
            "Requesting schedule from HEMIS"
        );

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("week", week), ("semester", semester)])
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            if self.config.legacy_empty_on_error {
                warn!(
                    status = status.as_u16(),
                    week = week,
                    semester = semester,
                    "HEMIS request failed, treating as empty schedule"
                );
                return Ok(Vec::new());
            }
            return Err(ScheduleError::RemoteStatus {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let body: ScheduleResponse =
            serde_json::from_str(&text).map_err(|e| ScheduleError::UnexpectedResponse {
                message: format!("schedule body has no usable `data` array: {}", e),
            })?;

        info!(
            week = week,
            semester = semester,
            count = body.data.len(),
            "Received schedule entries"
        );

        Ok(body.data)
    }
}
