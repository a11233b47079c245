//! HTTP transport for the cover-letter endpoints.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` so the async
//! runtime is never blocked. One request per call, no automatic retries.

use std::io::ErrorKind;
use std::time::Duration;

use async_trait::async_trait;
use gms_core::Role;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::{ApiError, CoverLetterApi};

/// [`CoverLetterApi`] over HTTP with a bearer token.
#[derive(Clone)]
pub struct HttpCoverLetterApi {
    base_url: Url,
    token: Option<String>,
    agent: ureq::Agent,
}

impl std::fmt::Debug for HttpCoverLetterApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCoverLetterApi")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
}

impl HttpCoverLetterApi {
    /// Build a client from configuration. Requires an `http` or `https`
    /// `api.base_url`.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let raw = config
            .api
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::Config {
                message: format!(
                    "no API base URL; set [api] base_url or {}",
                    crate::config::ENV_BASE_URL
                ),
            })?;
        let base_url = Url::parse(raw).map_err(|e| ApiError::Config {
            message: format!("invalid API base URL '{}': {}", raw, e),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ApiError::Config {
                message: format!("API base URL must be http or https: '{}'", raw),
            });
        }

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(config.api.timeout_secs)))
            .build()
            .into();

        Ok(HttpCoverLetterApi {
            base_url,
            token: config.api.token.clone(),
            agent,
        })
    }

    /// `{base}/api/{role}/cover-letters[/{entry_id}[/{action}]]`
    ///
    /// The entry ID is percent-encoded as a single path segment, so `/`, `?`
    /// and `#` inside it never change which resource is addressed.
    pub fn endpoint(&self, role: Role, entry_id: Option<&str>, action: Option<&str>) -> String {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so segments are always editable.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", role.api_segment(), "cover-letters"]);
            if let Some(id) = entry_id {
                segments.push(id);
                if let Some(action) = action {
                    segments.push(action);
                }
            }
        }
        url.into()
    }

    async fn execute(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let token = self.token.clone().ok_or_else(|| ApiError::Unauthenticated {
            message: "Authentication required: no API token configured".to_string(),
        })?;
        let agent = self.agent.clone();

        tracing::debug!(?method, %url, "cover-letter request");

        tokio::task::spawn_blocking(move || {
            let auth = format!("Bearer {}", token);
            let result = match method {
                Method::Get => agent
                    .get(&url)
                    .header("Accept", "application/json")
                    .header("Authorization", &auth)
                    .call(),
                Method::Post => {
                    let request = agent
                        .post(&url)
                        .header("Accept", "application/json")
                        .header("Authorization", &auth);
                    match body {
                        Some(ref json) => request.send_json(json),
                        None => request.send_empty(),
                    }
                }
            };

            let response = result.map_err(transport_error)?;
            let status = response.status().as_u16();
            let text = response.into_body().read_to_string().map_err(|e| {
                match transport_error(e) {
                    ApiError::InvalidRequest { message } => ApiError::MalformedResponse {
                        message: format!("failed to read response body: {}", message),
                    },
                    other => other,
                }
            })?;

            tracing::debug!(status, %url, "cover-letter response");
            classify_response(status, &text)
        })
        .await
        .map_err(|e| ApiError::Network {
            message: format!("task join error: {}", e),
        })?
    }
}

#[async_trait]
impl CoverLetterApi for HttpCoverLetterApi {
    async fn list(&self, role: Role) -> Result<Value, ApiError> {
        self.execute(Method::Get, self.endpoint(role, None, None), None)
            .await
    }

    async fn fetch(&self, role: Role, entry_id: &str) -> Result<Value, ApiError> {
        self.execute(Method::Get, self.endpoint(role, Some(entry_id), None), None)
            .await
    }

    async fn sign(&self, role: Role, entry_id: &str) -> Result<Value, ApiError> {
        self.execute(
            Method::Post,
            self.endpoint(role, Some(entry_id), Some("sign")),
            None,
        )
        .await
    }

    async fn reject(&self, role: Role, entry_id: &str, reason: &str) -> Result<Value, ApiError> {
        self.execute(
            Method::Post,
            self.endpoint(role, Some(entry_id), Some("reject")),
            Some(serde_json::json!({ "reason": reason })),
        )
        .await
    }
}

/// Sort a `ureq` failure by what the caller can do about it.
///
/// Only failures to reach the backend or to get a complete answer are
/// `Network`. Requests that could not be built are `InvalidRequest`; answers
/// that arrived but cannot be used are `MalformedResponse`.
fn transport_error(e: ureq::Error) -> ApiError {
    use ureq::Error as E;

    let message = e.to_string();
    match e {
        E::Io(ref err) if err.kind() == ErrorKind::InvalidData => {
            ApiError::MalformedResponse { message }
        }
        E::Io(_)
        | E::Timeout(_)
        | E::HostNotFound
        | E::ConnectionFailed
        | E::ConnectProxyFailed(_) => ApiError::Network { message },
        E::Protocol(_)
        | E::BodyExceedsLimit(_)
        | E::RedirectFailed
        | E::TooManyRedirects => ApiError::MalformedResponse { message },
        E::StatusCode(status) => ApiError::Backend { status, message },
        _ => ApiError::InvalidRequest { message },
    }
}

/// Turn a status code and raw body into a JSON value or a typed error.
///
/// A 2xx body that is not JSON, or that says `"success": false`, is never
/// treated as success.
pub fn classify_response(status: u16, body: &str) -> Result<Value, ApiError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(body_message)
        .unwrap_or_else(|| default_message(status, body));

    match status {
        200..=299 => {
            let value = parsed.ok_or_else(|| ApiError::MalformedResponse {
                message: format!("response is not JSON: {}", snippet(body)),
            })?;
            match gms_interchange::backend_failure(&value) {
                Some(failure) => Err(ApiError::from_failure_message(status, &failure)),
                None => Ok(value),
            }
        }
        401 => Err(ApiError::Unauthenticated { message }),
        403 => Err(ApiError::Forbidden { message }),
        404 => Err(ApiError::NotFound { message }),
        _ => Err(ApiError::Backend { status, message }),
    }
}

fn body_message(value: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

fn default_message(status: u16, body: &str) -> String {
    match status {
        401 => "Authentication required".to_string(),
        403 => "You do not have permission to perform this action".to_string(),
        404 => "Cover letter not found".to_string(),
        _ if body.trim().is_empty() => format!("HTTP {}", status),
        _ => snippet(body),
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 120;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
