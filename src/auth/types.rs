// Authentication types

use serde::Deserialize;

/// Long-lived account credentials used for the token exchange
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    /// Tealium API key
    pub api_key: String,

    /// Username (email) the API key belongs to
    pub username: String,

    /// Tealium account identifier
    pub account: String,
}

/// Response from the Tealium auth endpoint
///
/// Carries more fields upstream; only the token and the host the profile is
/// served from matter here.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub host: String,
}
