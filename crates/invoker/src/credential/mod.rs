// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity token acquisition for an audience.
//!
//! Service account credentials (a key file or the metadata server) can mint
//! identity tokens for any audience directly. End-user credentials from
//! `gcloud auth application-default login` cannot, so for those the refresh
//! grant is used and the `id_token` it returns alongside the access token is
//! taken as the bearer instead.

pub mod adc;
pub mod identity;
pub mod metadata;
pub mod oauth;
pub mod refresh;
pub mod reuse;
pub mod service_account;

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::audience::Audience;
use crate::config::AdcConfig;
use crate::credential::adc::Adc;
use crate::credential::identity::IdentitySource;
use crate::credential::reuse::ReuseTokenSource;

/// Tokens are treated as expired this many seconds before their expiry.
const EXPIRY_DELTA_SECS: u64 = 10;

/// A bearer token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    /// Expiry as epoch seconds. `None` never expires.
    pub expires_at: Option<u64>,
}

impl Token {
    pub fn is_valid_at(&self, now: u64) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(exp) => now + EXPIRY_DELTA_SECS <= exp,
            None => true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(epoch_secs())
    }
}

/// Anything that can hand out a bearer token on demand.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> impl Future<Output = Result<Token, CredentialError>> + Send;
}

/// Errors from locating credentials or fetching tokens.
#[derive(Debug)]
pub enum CredentialError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(String),
    Transport(reqwest::Error),
    /// Token endpoint answered with a non-success status.
    Status { status: u16, body: String },
    Jwt(jsonwebtoken::errors::Error),
    Unsupported(String),
    NotFound,
    MissingIdToken,
    /// The default-credentials fallback could not be set up.
    DefaultSource(Box<CredentialError>),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "read {}: {source}", path.display()),
            Self::Parse(msg) => f.write_str(msg),
            Self::Transport(e) => write!(f, "token request failed: {e}"),
            Self::Status { status, body } => {
                write!(f, "cannot fetch token: {status}\nresponse: {body}")
            }
            Self::Jwt(e) => write!(f, "jwt: {e}"),
            Self::Unsupported(kind) => write!(f, "unsupported credentials type: {kind}"),
            Self::NotFound => f.write_str("could not find default credentials"),
            Self::MissingIdToken => f.write_str("missing id_token"),
            Self::DefaultSource(e) => write!(f, "failed to get default token source: {e}"),
        }
    }
}

impl std::error::Error for CredentialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Transport(e) => Some(e),
            Self::Jwt(e) => Some(e),
            Self::DefaultSource(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CredentialError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<jsonwebtoken::errors::Error> for CredentialError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

impl From<serde_json::Error> for CredentialError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(format!("invalid credentials json: {e}"))
    }
}

/// Build a token source for `audience`.
///
/// Tries an identity token source first and, if the ambient credentials
/// cannot mint identity tokens directly, adapts the default token source.
/// The result caches its token for the lifetime of the returned value only.
pub async fn find_token_source(
    config: &AdcConfig,
    audience: &Audience,
) -> Result<ReuseTokenSource<IdentitySource>, CredentialError> {
    let http = reqwest::Client::builder().build()?;
    let adc = Adc::discover(config, &http)
        .await
        .map_err(|e| CredentialError::DefaultSource(Box::new(e)))?;

    let source = match IdentitySource::primary(&adc, &http, audience) {
        Ok(source) => source,
        Err(e) => {
            tracing::debug!(audience = %audience, err = %e, "identity token source unavailable, using default credentials");
            IdentitySource::fallback(&adc, &http)
                .map_err(|e| CredentialError::DefaultSource(Box::new(e)))?
        }
    };

    Ok(ReuseTokenSource::new(source))
}

/// Current time as epoch seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
