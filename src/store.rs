// Per-profile credential cache

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// A short-lived bearer credential for one Tealium profile
#[derive(Debug, Clone)]
pub struct Credential {
    /// Bearer token returned by the auth endpoint
    pub token: String,

    /// Host all subsequent calls for this profile must be directed to
    pub host: String,

    /// Instant after which the credential must not be used
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// A credential is usable only strictly before its expiry instant
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Thread-safe cache mapping profile name to its current credential.
///
/// Shared by every in-flight request via cheap clones. Expiry is enforced
/// lazily on `get`; a per-`put` eviction task additionally bounds memory by
/// removing entries once their TTL elapses.
pub struct CredentialStore {
    entries: Arc<DashMap<String, Credential>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Get the current credential for a profile, or None if absent or expired.
    ///
    /// An expired entry is treated as absent but not removed here; the
    /// eviction task armed by `put` reclaims it.
    pub fn get(&self, profile: &str) -> Option<Credential> {
        self.entries
            .get(profile)
            .filter(|entry| entry.is_valid())
            .map(|entry| entry.value().clone())
    }

    /// Store a credential for a profile with the given TTL.
    ///
    /// Overwrites any previous credential (last write wins) and arms a
    /// one-shot eviction task firing once the TTL elapses. The task only
    /// removes the entry if the stored token is still the one it was armed
    /// for, so a timer left over from a superseded credential is a no-op.
    pub fn put(&self, profile: &str, token: &str, host: &str, ttl: std::time::Duration) {
        let expires_at =
            Utc::now() + Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(3650));

        self.entries.insert(
            profile.to_string(),
            Credential {
                token: token.to_string(),
                host: host.to_string(),
                expires_at,
            },
        );

        tracing::debug!(
            profile = profile,
            expires_at = %expires_at.to_rfc3339(),
            "Cached credential"
        );

        let entries = Arc::clone(&self.entries);
        let profile = profile.to_string();
        let token = token.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let removed = entries
                .remove_if(&profile, |_, credential| credential.token == token)
                .is_some();
            if removed {
                tracing::debug!(profile = %profile, "Evicted expired credential");
            }
        });
    }

    /// Unconditionally remove the credential for a profile if present
    pub fn evict(&self, profile: &str) {
        if self.entries.remove(profile).is_some() {
            tracing::debug!(profile = profile, "Evicted credential");
        }
    }

    /// Number of cached entries, including not-yet-reclaimed expired ones
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for CredentialStore {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}
