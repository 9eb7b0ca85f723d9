// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application Default Credentials discovery.

use std::path::Path;

use serde::Deserialize;

use crate::config::AdcConfig;
use crate::credential::metadata::MetadataClient;
use crate::credential::CredentialError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

/// Where the ambient credentials come from.
#[derive(Debug, Clone)]
pub enum Adc {
    File(CredentialsFile),
    Metadata(MetadataClient),
}

/// Contents of a credentials JSON file, keyed by its `type` field.
#[derive(Debug, Clone)]
pub enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
    /// Any type this proxy does not handle (e.g. `external_account`).
    Other(String),
}

/// A downloaded service account key.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

/// End-user credentials written by `gcloud auth application-default login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl CredentialsFile {
    pub fn parse(contents: &str) -> Result<Self, CredentialError> {
        let value: serde_json::Value = serde_json::from_str(contents)?;
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| CredentialError::Parse("credentials file has no \"type\" field".to_owned()))?
            .to_owned();

        match kind.as_str() {
            "service_account" => Ok(Self::ServiceAccount(serde_json::from_value(value)?)),
            "authorized_user" => Ok(Self::AuthorizedUser(serde_json::from_value(value)?)),
            _ => Ok(Self::Other(kind)),
        }
    }

    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|source| CredentialError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&contents)
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::ServiceAccount(_) => "service_account",
            Self::AuthorizedUser(_) => "authorized_user",
            Self::Other(kind) => kind,
        }
    }
}

impl Adc {
    /// Look for credentials in the usual order: the explicit credentials
    /// file, the gcloud well-known file, then the metadata server.
    pub async fn discover(config: &AdcConfig, http: &reqwest::Client) -> Result<Self, CredentialError> {
        if let Some(ref path) = config.credentials_file {
            return Ok(Self::File(CredentialsFile::load(path)?));
        }

        if let Some(path) = config.well_known_file() {
            if path.is_file() {
                return Ok(Self::File(CredentialsFile::load(&path)?));
            }
        }

        match MetadataClient::detect(config, http).await {
            Some(client) => Ok(Self::Metadata(client)),
            None => Err(CredentialError::NotFound),
        }
    }
}

#[cfg(test)]
#[path = "adc_tests.rs"]
mod tests;
