// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth refresh-token grant for `authorized_user` credentials.

use crate::credential::adc::AuthorizedUser;
use crate::credential::oauth::{check_status, TokenResponse};
use crate::credential::CredentialError;

/// Perform a single token refresh request.
pub async fn do_refresh(
    client: &reqwest::Client,
    creds: &AuthorizedUser,
) -> Result<TokenResponse, CredentialError> {
    let resp = client
        .post(&creds.token_uri)
        .form(&[
            ("grant_type", "refresh_token"),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", creds.refresh_token.as_str()),
        ])
        .send()
        .await?;

    let token: TokenResponse = check_status(resp).await?.json().await?;
    if token.access_token.is_empty() {
        return Err(CredentialError::Parse("server response missing access_token".to_owned()));
    }
    Ok(token)
}

/// Standard tokens for an end user, refreshed on every call.
#[derive(Debug)]
pub struct RefreshTokenSource {
    creds: AuthorizedUser,
    http: reqwest::Client,
}

impl RefreshTokenSource {
    pub fn new(creds: AuthorizedUser, http: reqwest::Client) -> Self {
        Self { creds, http }
    }

    pub async fn token_response(&self) -> Result<TokenResponse, CredentialError> {
        do_refresh(&self.http, &self.creds).await
    }
}
