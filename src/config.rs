//! Configuration for the client components.
//!
//! No ambient environment lookups inside the protocol: everything is
//! read once at startup, validated, and passed down explicitly. A
//! missing required field is a startup failure, not a latent runtime
//! surprise.

use anyhow::{bail, Context, Result};

/// Environment variable naming the storage service root.
pub const BASE_URL_VAR: &str = "BLINDLINK_BASE_URL";
/// Optional override for record lifetime, in days.
pub const EXPIRY_DAYS_VAR: &str = "BLINDLINK_EXPIRY_DAYS";

#[derive(Debug, Clone)]
pub struct Config {
    /// Storage service root, e.g. `https://prv.ec`.
    pub base_url: String,
    /// Record lifetime override; `None` means the protocol default.
    pub expiry_days: Option<i64>,
}

impl Config {
    /// Build and validate a configuration directly.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            bail!("storage base URL must not be empty");
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("storage base URL must start with http:// or https://, got '{}'", base_url);
        }
        Ok(Self { base_url, expiry_days: None })
    }

    /// Read configuration from the environment, failing at startup if
    /// required fields are absent or malformed.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_VAR)
            .with_context(|| format!("{BASE_URL_VAR} must be set to the storage service root"))?;
        let mut config = Self::new(base_url)?;

        if let Ok(days) = std::env::var(EXPIRY_DAYS_VAR) {
            let days: i64 = days
                .parse()
                .with_context(|| format!("{EXPIRY_DAYS_VAR} must be a whole number of days"))?;
            if days <= 0 {
                bail!("{EXPIRY_DAYS_VAR} must be positive, got {days}");
            }
            config.expiry_days = Some(days);
        }

        Ok(config)
    }
}
