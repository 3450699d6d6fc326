// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP backend client for the Murshid chat application.
//!
//! [`ApiClient`] implements the three collaborator traits the session core
//! consumes: [`murshid_core::PromptStreamer`] (chunked completion stream),
//! [`murshid_core::ChatStore`] (chat records), and
//! [`murshid_core::BookmarkStore`]. All requests carry the bearer token of
//! the signed-in session; a 401 from any endpoint maps to
//! [`MurshidError::Unauthorized`].
//!
//! Response bodies follow the backend's `{ success, data }` envelope and
//! are unwrapped tolerantly: `data` when present, the bare body otherwise,
//! and the whole envelope for paginated lists.

pub mod bookmarks;
pub mod chats;
pub mod stream;

use std::time::Duration;

use murshid_config::model::ApiConfig;
use murshid_core::MurshidError;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub use chats::{ChatDetail, ChatListItem, ChatPage, PersistedMessage};

/// HTTP client for the Murshid REST backend.
///
/// Cheap to clone; connection pooling is handled by the inner
/// `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client from the `[api]` config section.
    ///
    /// # Token Resolution
    /// 1. `config.api.token` if set and non-empty
    /// 2. `MURSHID_API_TOKEN` environment variable
    /// 3. No token: requests go out unauthenticated and the backend
    ///    answers 401, which the session surfaces as the unauthorized flag.
    pub fn new(config: &ApiConfig) -> Result<Self, MurshidError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("MURSHID_API_TOKEN").ok());
        Self::from_parts(config.base_url.clone(), token)
    }

    /// Creates a client from explicit parts.
    pub fn from_parts(base_url: String, token: Option<String>) -> Result<Self, MurshidError> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                MurshidError::Config(format!("invalid API token header value: {e}"))
            })?;
            headers.insert("authorization", value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| MurshidError::Api {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the configured base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, MurshidError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode_response(response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, MurshidError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        Self::decode_response(response).await
    }

    pub(crate) async fn delete_resource(&self, path: &str) -> Result<(), MurshidError> {
        let response = self
            .http
            .delete(self.url(path))
            .send()
            .await
            .map_err(transport_error)?;
        Self::ensure_success(response).await.map(|_| ())
    }

    async fn decode_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, MurshidError> {
        let body = Self::ensure_success(response).await?;
        decode_body(&body)
    }

    /// Maps 401 to [`MurshidError::Unauthorized`] and any other non-success
    /// status to an API error carrying the backend's `message` when one is
    /// present in the body.
    async fn ensure_success(response: reqwest::Response) -> Result<String, MurshidError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(MurshidError::Unauthorized);
        }
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            debug!(status = %status, "backend request failed");
            return Err(MurshidError::api(error_message(&body, status)));
        }
        Ok(body)
    }
}

/// Unwraps the backend's response envelope: `data` when present, the whole
/// body for pagination envelopes (`data` array plus `total`/`limit`), and
/// the bare body otherwise.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, MurshidError> {
    let value: Value = serde_json::from_str(body).map_err(|e| MurshidError::Api {
        message: format!("failed to parse response body: {e}"),
        source: Some(Box::new(e)),
    })?;

    let unwrapped = if let Value::Object(obj) = &value {
        let paginated = obj.get("data").is_some_and(Value::is_array)
            && (obj.contains_key("total") || obj.contains_key("limit"));
        if paginated {
            None
        } else {
            // A null `data` falls back to the bare body, like the envelope
            // contract's `data ?? body`.
            obj.get("data").filter(|d| !d.is_null()).cloned()
        }
    } else {
        None
    };
    let picked = unwrapped.unwrap_or(value);

    serde_json::from_value(picked).map_err(|e| MurshidError::Api {
        message: format!("failed to decode response body: {e}"),
        source: Some(Box::new(e)),
    })
}

fn error_message(body: &str, status: StatusCode) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| format!("request failed with status {status}"))
}

fn transport_error(e: reqwest::Error) -> MurshidError {
    MurshidError::Api {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}
