//! Space-Track HTTP client with session auth and request pacing.

use crate::spacetrack::query::candidate_queries;
use crate::traits::UpstreamProvider;
use async_trait::async_trait;
use orbsync_core::{DatasetType, ProviderError, ProviderSettings, RecordSet, ScopeKey};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;
use tokio::sync::Mutex;

/// Upstream login credentials.
#[derive(Clone, Deserialize)]
pub struct SpaceTrackCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SpaceTrackCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceTrackCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Default)]
struct SessionState {
    authenticated_at: Option<Instant>,
    last_request: Option<Instant>,
}

/// Client for the Space-Track `basicspacedata` API.
///
/// Authentication is a cookie session established by a form login; the
/// session is re-established when older than `session_max_age` or when the
/// upstream answers 401 mid-query. Requests are paced by
/// `min_request_interval` as upstream etiquette.
pub struct SpaceTrackClient {
    client: Client,
    credentials: SpaceTrackCredentials,
    settings: ProviderSettings,
    session: Mutex<SessionState>,
}

impl SpaceTrackClient {
    pub fn new(
        credentials: SpaceTrackCredentials,
        settings: ProviderSettings,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| ProviderError::ClientInit {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            credentials,
            settings,
            session: Mutex::new(SessionState::default()),
        })
    }

    /// Form-post login; replaces the session cookie on success.
    async fn login(&self) -> Result<(), ProviderError> {
        if self.credentials.username.is_empty() || self.credentials.password.is_empty() {
            return Err(ProviderError::AuthFailed {
                reason: "credentials not configured".to_string(),
            });
        }

        let url = format!("{}/ajaxauth/login", self.settings.base_url);
        let response = self
            .client
            .post(&url)
            .form(&[
                ("identity", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::AuthFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::AuthFailed {
                reason: format!("login returned status {}", response.status()),
            });
        }
        Ok(())
    }

    /// Re-login when the session is missing or stale, and wait out the
    /// minimum spacing since the previous request.
    async fn prepare_request(&self) -> Result<(), ProviderError> {
        let mut session = self.session.lock().await;

        let needs_login = match session.authenticated_at {
            None => true,
            Some(at) => at.elapsed() > self.settings.session_max_age,
        };
        if needs_login {
            self.login().await?;
            session.authenticated_at = Some(Instant::now());
            tracing::debug!("upstream session (re)established");
        }

        if let Some(last) = session.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.settings.min_request_interval {
                tokio::time::sleep(self.settings.min_request_interval - elapsed).await;
            }
        }
        session.last_request = Some(Instant::now());
        Ok(())
    }

    /// Execute one query path, re-authenticating once on 401.
    async fn query(&self, path: &str) -> Result<Vec<Value>, ProviderError> {
        self.prepare_request().await?;

        let url = format!("{}/basicspacedata/query/{}", self.settings.base_url, path);
        let mut response = self.send(&url, path).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!(endpoint = path, "session expired mid-query, re-authenticating");
            {
                let mut session = self.session.lock().await;
                self.login().await?;
                session.authenticated_at = Some(Instant::now());
            }
            response = self.send(&url, path).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::EndpointFailed {
                endpoint: path.to_string(),
                status: status.as_u16(),
                message: truncate(&message, 200),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse {
                endpoint: path.to_string(),
                reason: e.to_string(),
            })?;

        match body {
            Value::Array(records) => Ok(records),
            Value::Object(_) => Ok(vec![body]),
            other => Err(ProviderError::InvalidResponse {
                endpoint: path.to_string(),
                reason: format!("expected array or object, got {}", json_kind(&other)),
            }),
        }
    }

    async fn send(&self, url: &str, path: &str) -> Result<reqwest::Response, ProviderError> {
        self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    endpoint: path.to_string(),
                    timeout_ms: self.settings.request_timeout.as_millis() as u64,
                }
            } else {
                ProviderError::EndpointFailed {
                    endpoint: path.to_string(),
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    message: e.to_string(),
                }
            }
        })
    }
}

#[async_trait]
impl UpstreamProvider for SpaceTrackClient {
    async fn fetch(
        &self,
        dataset_type: DatasetType,
        scope_key: &ScopeKey,
    ) -> Result<RecordSet, ProviderError> {
        let candidates = candidate_queries(dataset_type, scope_key);
        let attempted = candidates.len();
        let mut last_error: Option<ProviderError> = None;

        for path in &candidates {
            match self.query(path).await {
                Ok(records) => {
                    let records = match (dataset_type, scope_key) {
                        (DatasetType::ConjunctionMessage, ScopeKey::Object(id)) => {
                            filter_conjunctions(records, id)
                        }
                        _ => records,
                    };
                    tracing::info!(
                        dataset = %dataset_type,
                        scope = %scope_key,
                        endpoint = path.as_str(),
                        records = records.len(),
                        "upstream fetch succeeded"
                    );
                    return Ok(RecordSet::new(dataset_type, records));
                }
                Err(err) => {
                    tracing::warn!(
                        dataset = %dataset_type,
                        endpoint = path.as_str(),
                        error = %err,
                        "endpoint failed, advancing to next candidate"
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(ProviderError::AllEndpointsExhausted {
            dataset_type,
            attempted,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no candidate endpoints".to_string()),
        })
    }
}

impl std::fmt::Debug for SpaceTrackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceTrackClient")
            .field("base_url", &self.settings.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Keep only conjunction messages naming the object on either side.
fn filter_conjunctions(records: Vec<Value>, object_id: &str) -> Vec<Value> {
    records
        .into_iter()
        .filter(|record| {
            ["OBJECT1_NORAD_CAT_ID", "OBJECT2_NORAD_CAT_ID"]
                .iter()
                .any(|field| match record.get(*field) {
                    Some(Value::String(s)) => s == object_id,
                    Some(Value::Number(n)) => n.to_string() == object_id,
                    _ => false,
                })
        })
        .collect()
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
