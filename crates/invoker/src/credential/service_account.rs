// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity tokens from a service account key via the JWT bearer grant.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::audience::Audience;
use crate::credential::adc::ServiceAccountKey;
use crate::credential::oauth::{check_status, jwt_expiry};
use crate::credential::{epoch_secs, CredentialError, Token};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Claims of the self-signed assertion exchanged for an identity token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub aud: String,
    pub target_audience: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Deserialize)]
struct IdTokenResponse {
    id_token: String,
}

pub struct ServiceAccountIdentity {
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    audience: String,
    signing_key: EncodingKey,
    http: reqwest::Client,
}

impl std::fmt::Debug for ServiceAccountIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountIdentity")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountIdentity {
    /// Parses the private key up front so a malformed key fails construction.
    pub fn new(
        key: &ServiceAccountKey,
        audience: &Audience,
        http: reqwest::Client,
    ) -> Result<Self, CredentialError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            client_email: key.client_email.clone(),
            key_id: key.private_key_id.clone(),
            token_uri: key.token_uri.clone(),
            audience: audience.as_str().to_owned(),
            signing_key,
            http,
        })
    }

    /// Sign the assertion for the token endpoint.
    pub fn assertion(&self, now: u64) -> Result<String, CredentialError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key_id.clone();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            aud: self.token_uri.clone(),
            target_audience: self.audience.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        Ok(jsonwebtoken::encode(&header, &claims, &self.signing_key)?)
    }

    pub async fn token(&self) -> Result<Token, CredentialError> {
        let assertion = self.assertion(epoch_secs())?;
        let resp = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let body: IdTokenResponse = check_status(resp).await?.json().await?;
        let expires_at = jwt_expiry(&body.id_token)?;
        Ok(Token { access_token: body.id_token, expires_at })
    }
}

#[cfg(test)]
#[path = "service_account_tests.rs"]
mod tests;
