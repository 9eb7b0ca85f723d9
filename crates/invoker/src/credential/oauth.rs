// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth helper types and utilities.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::credential::CredentialError;

/// Standard OAuth2 token response, keeping unknown fields (such as
/// `id_token`) as extension data.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenResponse {
    /// Look up an extension field by name.
    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    /// Absolute expiry for a response received at `now`.
    pub fn expires_at(&self, now: u64) -> Option<u64> {
        (self.expires_in > 0).then(|| now.saturating_add(self.expires_in))
    }
}

/// Turn a non-success response into [`CredentialError::Status`].
pub async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, CredentialError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(CredentialError::Status { status: status.as_u16(), body })
}

#[derive(Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<u64>,
}

/// Read the `exp` claim of a JWT without verifying its signature.
///
/// The token was just received from the issuer over TLS; the proxy only needs
/// to know when to stop reusing it.
pub fn jwt_expiry(token: &str) -> Result<Option<u64>, CredentialError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims.exp)
}

#[cfg(test)]
#[path = "oauth_tests.rs"]
mod tests;
