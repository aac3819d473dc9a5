//! Shared helpers for CLI commands.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use qpass_core::IbmCredentials;

/// Secondary variable consulted when `API_Key` is unset.
pub const TOKEN_FALLBACK_ENV: &str = "IBM_QUANTUM_TOKEN";

/// IBM Quantum connection arguments.
#[derive(Args, Clone, Default)]
pub struct IbmArgs {
    /// IBM Cloud API key (falls back to IBM_QUANTUM_TOKEN)
    #[arg(long, env = "API_Key", hide_env_values = true)]
    pub api_key: Option<String>,

    /// IBM Cloud service CRN (default: first Quantum instance on the account)
    #[arg(long, env = "IBM_SERVICE_CRN")]
    pub instance: Option<String>,

    /// IBM Quantum API base URL
    #[arg(long, env = "IBM_QUANTUM_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Send the key as a bearer token to the legacy API instead of using IAM
    #[arg(long)]
    pub direct_token: bool,
}

impl IbmArgs {
    /// Credentials from the arguments, or `None` when no token is set.
    pub fn credentials(&self) -> Option<IbmCredentials> {
        self.credentials_with(std::env::var(TOKEN_FALLBACK_ENV).ok())
    }

    fn credentials_with(&self, fallback: Option<String>) -> Option<IbmCredentials> {
        let token = self
            .api_key
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or(fallback.filter(|t| !t.trim().is_empty()))?;

        let mut credentials = IbmCredentials::new(token);
        if let Some(instance) = &self.instance {
            credentials = credentials.with_instance(instance);
        }
        if let Some(endpoint) = &self.endpoint {
            credentials = credentials.with_endpoint(endpoint);
        }
        if self.direct_token {
            credentials = credentials.with_direct_token();
        }
        Some(credentials)
    }
}

/// Whether a backend name selects hardware.
pub fn is_hardware(backend: &str) -> Result<bool> {
    match backend.to_lowercase().as_str() {
        "simulator" | "sim" | "local" => Ok(false),
        "ibm" | "hardware" | "quantum" => Ok(true),
        other => anyhow::bail!("Unknown backend: '{other}'. Available: simulator, ibm"),
    }
}

/// A steady-ticking spinner.
pub fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}
