// Authenticated request executor for the Tealium API

use anyhow::anyhow;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::auth::Authenticator;
use crate::error::ApiError;
use crate::store::CredentialStore;

/// Maximum attempts per external call: the initial attempt plus one
/// credential-refresh retry.
const MAX_ATTEMPTS: u32 = 2;

/// A single Tealium API request: method, path relative to the resolved host,
/// query parameters and an optional JSON body. Built fresh per call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn get(path: String) -> Self {
        Self {
            method: Method::GET,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn patch(path: String, body: Value) -> Self {
        Self {
            method: Method::PATCH,
            path,
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// HTTP client for the Tealium API with credential caching and a single
/// bounded refresh-and-retry cycle on 401.
///
/// Token lifetime upstream is short relative to session length and
/// re-authentication is cheap, so one retry covers the dominant failure mode
/// (token expired mid-session) while persistent auth failures fail fast.
pub struct TealiumClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Per-profile credential cache, shared with the authenticator
    store: CredentialStore,

    /// Token exchange against the platform auth endpoint
    authenticator: Authenticator,

    /// Tealium account all operations are scoped to
    account: String,

    /// Fixed delay before the single 401-triggered retry
    retry_backoff: Duration,
}

impl TealiumClient {
    pub fn new(
        client: Client,
        store: CredentialStore,
        authenticator: Authenticator,
        account: String,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            client,
            store,
            authenticator,
            account,
            retry_backoff,
        }
    }

    /// Path of the iQ profile resource all four operations address
    pub(crate) fn profile_path(&self, profile: &str) -> String {
        format!("/v3/tiq/accounts/{}/profiles/{}", self.account, profile)
    }

    /// Execute a request against the given profile, authenticating on demand.
    ///
    /// The loop runs at most `MAX_ATTEMPTS` times. A 401 response evicts the
    /// cached credential, waits a fixed backoff and retries once; the retry
    /// re-authenticates via the cache-miss path at the top of the loop. Any
    /// other failure terminates immediately.
    pub async fn execute(
        &self,
        profile: &str,
        descriptor: RequestDescriptor,
    ) -> Result<Value, ApiError> {
        let mut attempt = 0;

        loop {
            // Cache miss and expiry share the authentication path. An
            // authenticator failure propagates as-is: without a credential
            // there is nothing meaningful to retry.
            let credential = match self.store.get(profile) {
                Some(credential) => credential,
                None => self.authenticator.authenticate(profile).await?,
            };

            let url = format!("{}{}", base_url(&credential.host), descriptor.path);

            tracing::debug!(
                method = %descriptor.method,
                url = %url,
                attempt = attempt + 1,
                max_attempts = MAX_ATTEMPTS,
                "Sending Tealium API request"
            );

            let mut request = self
                .client
                .request(descriptor.method.clone(), &url)
                .bearer_auth(&credential.token);

            if !descriptor.query.is_empty() {
                request = request.query(&descriptor.query);
            }
            if let Some(ref body) = descriptor.body {
                request = request.json(body);
            }

            // Transport failures are never retried; only 401 is.
            let response = request
                .send()
                .await
                .map_err(|e| ApiError::Internal(anyhow!("Tealium request failed: {}", e)))?;

            let status = response.status();

            if status.is_success() {
                return response.json().await.map_err(|e| {
                    ApiError::Internal(anyhow!("Invalid Tealium response body: {}", e))
                });
            }

            if status == StatusCode::UNAUTHORIZED && attempt + 1 < MAX_ATTEMPTS {
                tracing::warn!(
                    profile = profile,
                    "Received 401, refreshing credential and retrying"
                );
                self.store.evict(profile);
                tokio::time::sleep(self.retry_backoff).await;
                attempt += 1;
                continue;
            }

            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                url = %url,
                attempt = attempt + 1,
                response_body = %message,
                "Tealium API request failed"
            );
            return Err(ApiError::TealiumApiError {
                status: status.as_u16(),
                message,
            });
        }
    }
}

/// Build the base URL for a resolved host.
///
/// The auth endpoint returns a bare hostname; mock servers in tests hand
/// back a full URL, which is used verbatim.
fn base_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", host)
    }
}
