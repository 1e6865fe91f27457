use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Tealium Gateway
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value = "8000")]
    pub port: u16,

    /// Gateway API key for client authentication
    #[arg(short = 'k', long, env = "PROXY_API_KEY")]
    pub proxy_api_key: Option<String>,

    /// Tealium account identifier
    #[arg(short = 'a', long, env = "TEALIUM_ACCOUNT")]
    pub account: Option<String>,

    /// Username (email) the Tealium API key belongs to
    #[arg(short = 'u', long, env = "USER_EMAIL")]
    pub username: Option<String>,

    /// Tealium API key
    #[arg(long, env = "TEALIUM_API_KEY")]
    pub api_key: Option<String>,

    /// Path to a file holding the Tealium API key (takes precedence)
    #[arg(long, env = "API_KEY_FILE")]
    pub api_key_file: Option<PathBuf>,

    /// Base URL of the Tealium platform auth endpoint
    #[arg(
        long,
        env = "TEALIUM_PLATFORM_URL",
        default_value = "https://platform.tealiumapis.com"
    )]
    pub platform_url: String,

    /// Bearer token TTL in seconds
    #[arg(long, env = "TOKEN_TTL", default_value = "1800")]
    pub token_ttl: u64,

    /// Delay in milliseconds before the single 401-triggered retry
    #[arg(long, env = "RETRY_BACKOFF_MS", default_value = "1000")]
    pub retry_backoff_ms: u64,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "30")]
    pub http_connect_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "60")]
    pub http_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Gateway authentication
    pub proxy_api_key: String,

    // Tealium credentials
    pub tealium_account: String,
    pub tealium_username: String,
    pub tealium_api_key: String,
    pub platform_url: String,

    // Credential cache
    pub token_ttl_secs: u64,
    pub retry_backoff_ms: u64,

    // HTTP client
    pub http_max_connections: usize,
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,

    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        Self::from_args(args)
    }

    /// Build a Config from parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let tealium_api_key = read_api_key(args.api_key_file.as_deref(), args.api_key)?;

        let config = Config {
            server_host: args.host,
            server_port: args.port,

            proxy_api_key: args
                .proxy_api_key
                .context("PROXY_API_KEY is required (use -k or set PROXY_API_KEY env var)")?,

            tealium_account: args
                .account
                .context("TEALIUM_ACCOUNT is required (use -a or set TEALIUM_ACCOUNT env var)")?,

            tealium_username: args
                .username
                .context("USER_EMAIL is required (use -u or set USER_EMAIL env var)")?,

            tealium_api_key,
            platform_url: args.platform_url,

            token_ttl_secs: args.token_ttl,
            retry_backoff_ms: args.retry_backoff_ms,

            http_max_connections: std::env::var("HTTP_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),

            http_connect_timeout: args.http_connect_timeout,
            http_request_timeout: args.http_timeout,

            log_level: args.log_level,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tealium_api_key.is_empty() {
            anyhow::bail!("Tealium API key must not be empty");
        }
        if self.token_ttl_secs == 0 {
            anyhow::bail!("TOKEN_TTL must be greater than zero");
        }
        if !self.platform_url.starts_with("http") {
            anyhow::bail!(
                "TEALIUM_PLATFORM_URL must be an absolute URL, got: {}",
                self.platform_url
            );
        }
        Ok(())
    }
}

/// Resolve the Tealium API key: a key file takes precedence over the
/// environment value, matching how deployments mount the key as a secret.
fn read_api_key(key_file: Option<&std::path::Path>, inline_key: Option<String>) -> Result<String> {
    if let Some(path) = key_file {
        let key = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read API key file: {}", path.display()))?;
        let key = key.trim().to_string();
        if key.is_empty() {
            anyhow::bail!("API key file is empty: {}", path.display());
        }
        return Ok(key);
    }

    inline_key.context("Tealium API key is required (set TEALIUM_API_KEY or API_KEY_FILE)")
}
