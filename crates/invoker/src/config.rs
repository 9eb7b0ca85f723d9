// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::Parser;

/// Authenticating reverse proxy for private Cloud Run services.
#[derive(Debug, Clone, Parser)]
#[command(name = "cloud-run-invoker", version, about)]
pub struct Config {
    /// Host address to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Log format (json or text).
    #[arg(long, env = "LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub credentials: AdcConfig,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.log_format.as_str() {
            "json" | "text" => Ok(()),
            other => anyhow::bail!("invalid log format: {other} (expected json or text)"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where Application Default Credentials are looked up.
///
/// These mirror the environment variables the Google client libraries read,
/// so a deployment configures the proxy the same way as any other workload.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AdcConfig {
    /// Path to a service account key or `authorized_user` credentials file.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub credentials_file: Option<PathBuf>,

    /// gcloud configuration directory holding the well-known ADC file.
    #[arg(long, env = "CLOUDSDK_CONFIG")]
    pub gcloud_config_dir: Option<PathBuf>,

    /// Metadata server host. When set, the process is assumed to run on GCP.
    #[arg(long, env = "GCE_METADATA_HOST")]
    pub metadata_host: Option<String>,
}

impl AdcConfig {
    /// Path of the file written by `gcloud auth application-default login`.
    pub fn well_known_file(&self) -> Option<PathBuf> {
        let dir = match self.gcloud_config_dir {
            Some(ref dir) => dir.clone(),
            None => PathBuf::from(std::env::var_os("HOME")?).join(".config/gcloud"),
        };
        Some(dir.join("application_default_credentials.json"))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
