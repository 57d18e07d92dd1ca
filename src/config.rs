use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{anyhow, Result};
use tracing::info;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

pub struct Config {
    pub identity: IdentityConfig,
}

pub struct IdentityConfig {
    /// Account commands refuse to run without it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub idp_request_uri: String,
    pub timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs: u64 = try_load(&lookup, "GREEN_NEST_HTTP_TIMEOUT_SECS", "10")?;

        Ok(Self {
            identity: IdentityConfig {
                api_key: lookup("GREEN_NEST_API_KEY").filter(|k| !k.trim().is_empty()),
                base_url: try_load(&lookup, "GREEN_NEST_IDENTITY_URL", DEFAULT_IDENTITY_URL)?,
                idp_request_uri: try_load(&lookup, "GREEN_NEST_IDP_REQUEST_URI", "http://localhost")?,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T>
where
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value: {e}"))
}
