// Authentication module
// Exchanges long-lived account credentials for short-lived bearer tokens

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::AccountCredentials;
