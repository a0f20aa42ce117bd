//! Async HTTP client for the backend data source.
//!
//! Thin JSON layer over the REST endpoints the dashboard consumes. The
//! one piece of behavior that matters here is error mapping: a 401 from
//! any endpoint becomes [`RadarError::AuthExpired`] so session handling
//! above this crate can react, every other non-2xx becomes
//! [`RadarError::Status`] with the response body as the message. No
//! retries, no timeouts beyond transport defaults.

use crate::error::RadarError;
use crate::policy::sanitize_for_save;
use crate::types::{LogRecord, RiskInsights, Rule, StatsSummary, TimeRange};
use log::debug;
use serde::de::DeserializeOwned;

/// Client for the rule/log/insight endpoints.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl ApiClient {
    /// Client rooted at `base_url` (e.g. `https://host/rest`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient {
            http: reqwest::Client::new(),
            base_url,
            bearer_token: None,
        }
    }

    /// Attach a bearer token sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Ordered rule collection for the current tenant.
    pub async fn fetch_rules(&self) -> Result<Vec<Rule>, RadarError> {
        self.get_json("/firewall", None).await
    }

    /// Replace the stored rule collection with `rules`.
    ///
    /// The backend has replace semantics, not per-row patch, so the whole
    /// list goes over the wire. Sanitization happens here so a stale
    /// quota/fee/redirect can never reach storage regardless of caller.
    pub async fn replace_rules(&self, rules: &[Rule]) -> Result<(), RadarError> {
        let payload = sanitize_for_save(rules.iter());
        debug!("replacing rule collection ({} rules)", payload.len());

        let mut request = self.http.put(self.endpoint("/firewall")).json(&payload);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Log records for the given range.
    pub async fn fetch_logs(&self, range: TimeRange) -> Result<Vec<LogRecord>, RadarError> {
        self.get_json("/logs", Some(range)).await
    }

    /// Backend-computed outcome summary for the given range.
    pub async fn fetch_stats(&self, range: TimeRange) -> Result<StatsSummary, RadarError> {
        self.get_json("/logs/stats", Some(range)).await
    }

    /// Externally computed risk/protection classification.
    pub async fn fetch_insights(&self, range: TimeRange) -> Result<RiskInsights, RadarError> {
        self.get_json("/logs/insights", Some(range)).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        range: Option<TimeRange>,
    ) -> Result<T, RadarError> {
        let mut request = self.http.get(self.endpoint(path));
        if let Some(range) = range {
            request = request.query(&[("range", range.as_str())]);
        }
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        debug!("GET {}{}", self.base_url, path);
        let response = request.send().await?;
        let response = Self::check(response).await?;
        let value = response.json::<T>().await?;
        Ok(value)
    }

    /// Map response status to the crate taxonomy.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RadarError> {
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(RadarError::AuthExpired);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RadarError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining_trims_trailing_slash() {
        let client = ApiClient::new("https://example.com/rest/");
        assert_eq!(
            client.endpoint("/logs/stats"),
            "https://example.com/rest/logs/stats"
        );
    }
}
