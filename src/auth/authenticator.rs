// Token exchange against the Tealium auth endpoint

use reqwest::Client;
use std::time::Duration;

use super::types::{AccountCredentials, AuthResponse};
use crate::error::ApiError;
use crate::store::{Credential, CredentialStore};

/// Exchanges account credentials for per-profile bearer tokens and caches
/// them in the credential store.
///
/// Never retries internally; retry policy lives in the request executor. On
/// any failure the store is left untouched, so the profile stays
/// unauthenticated from the caller's point of view.
pub struct Authenticator {
    /// Shared HTTP client
    client: Client,

    /// Credential cache populated on successful exchange
    store: CredentialStore,

    /// Account credentials sent with every exchange
    credentials: AccountCredentials,

    /// Base URL of the platform auth endpoint
    platform_url: String,

    /// TTL assigned to cached credentials
    token_ttl: Duration,
}

impl Authenticator {
    pub fn new(
        client: Client,
        store: CredentialStore,
        credentials: AccountCredentials,
        platform_url: String,
        token_ttl: Duration,
    ) -> Self {
        Self {
            client,
            store,
            credentials,
            platform_url: platform_url.trim_end_matches('/').to_string(),
            token_ttl,
        }
    }

    /// Exchange the account credentials for a bearer token scoped to
    /// `profile`, cache it, and return it.
    ///
    /// Any transport failure or non-2xx response maps to an auth error,
    /// regardless of the upstream status code.
    pub async fn authenticate(&self, profile: &str) -> Result<Credential, ApiError> {
        let url = format!(
            "{}/v3/auth/accounts/{}/profiles/{}",
            self.platform_url, self.credentials.account, profile
        );

        tracing::debug!(
            profile = profile,
            account = %self.credentials.account,
            "Requesting bearer token"
        );

        let form = [
            ("username", self.credentials.username.as_str()),
            ("key", self.credentials.api_key.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::AuthError(format!("Token exchange request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                profile = profile,
                status = status.as_u16(),
                body = %body,
                "Token exchange rejected"
            );
            return Err(ApiError::AuthError(format!(
                "Token exchange failed with status {}",
                status.as_u16()
            )));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| ApiError::AuthError(format!("Invalid token exchange response: {}", e)))?;

        if auth.token.is_empty() || auth.host.is_empty() {
            return Err(ApiError::AuthError(
                "Token exchange response missing token or host".to_string(),
            ));
        }

        self.store
            .put(profile, &auth.token, &auth.host, self.token_ttl);

        tracing::info!(profile = profile, host = %auth.host, "Authenticated profile");

        // The freshly cached credential is also handed back so the caller
        // does not need a second store lookup.
        Ok(Credential {
            token: auth.token,
            host: auth.host,
            expires_at: chrono::Utc::now()
                + chrono::Duration::from_std(self.token_ttl)
                    .unwrap_or_else(|_| chrono::Duration::seconds(0)),
        })
    }
}
