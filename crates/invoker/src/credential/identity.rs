// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The concrete token sources and the rules for picking one.

use crate::audience::Audience;
use crate::credential::adc::{Adc, CredentialsFile};
use crate::credential::metadata::{MetadataClient, MetadataIdentity};
use crate::credential::oauth::TokenResponse;
use crate::credential::refresh::RefreshTokenSource;
use crate::credential::service_account::ServiceAccountIdentity;
use crate::credential::{epoch_secs, CredentialError, Token, TokenSource};

/// A source of identity tokens for one audience.
#[derive(Debug)]
pub enum IdentitySource {
    /// Minted by the metadata server.
    Metadata(MetadataIdentity),
    /// Exchanged from a signed service account assertion.
    ServiceAccount(ServiceAccountIdentity),
    /// `id_token` pulled out of a default-credentials token response.
    Adapted(IdTokenFromDefault),
}

impl IdentitySource {
    /// Sources that mint identity tokens scoped to `audience` directly.
    pub fn primary(
        adc: &Adc,
        http: &reqwest::Client,
        audience: &Audience,
    ) -> Result<Self, CredentialError> {
        match adc {
            Adc::Metadata(client) => Ok(Self::Metadata(MetadataIdentity::new(client.clone(), audience))),
            Adc::File(CredentialsFile::ServiceAccount(key)) => {
                Ok(Self::ServiceAccount(ServiceAccountIdentity::new(key, audience, http.clone())?))
            }
            Adc::File(other) => Err(CredentialError::Unsupported(other.kind().to_owned())),
        }
    }

    /// Default credentials adapted to yield the `id_token` extension field.
    ///
    /// The resulting token is not scoped to any particular audience.
    pub fn fallback(adc: &Adc, http: &reqwest::Client) -> Result<Self, CredentialError> {
        let inner = match adc {
            Adc::File(CredentialsFile::AuthorizedUser(creds)) => {
                DefaultSource::AuthorizedUser(RefreshTokenSource::new(creds.clone(), http.clone()))
            }
            Adc::Metadata(client) => DefaultSource::Metadata(client.clone()),
            Adc::File(other) => return Err(CredentialError::Unsupported(other.kind().to_owned())),
        };
        Ok(Self::Adapted(IdTokenFromDefault { inner }))
    }
}

impl TokenSource for IdentitySource {
    async fn token(&self) -> Result<Token, CredentialError> {
        match self {
            Self::Metadata(source) => source.token().await,
            Self::ServiceAccount(source) => source.token().await,
            Self::Adapted(source) => source.token().await,
        }
    }
}

/// Standard OAuth2 token source from default credentials.
#[derive(Debug)]
pub enum DefaultSource {
    AuthorizedUser(RefreshTokenSource),
    Metadata(MetadataClient),
}

impl DefaultSource {
    async fn token_response(&self) -> Result<TokenResponse, CredentialError> {
        match self {
            Self::AuthorizedUser(source) => source.token_response().await,
            Self::Metadata(client) => client.access_token().await,
        }
    }
}

#[derive(Debug)]
pub struct IdTokenFromDefault {
    inner: DefaultSource,
}

impl IdTokenFromDefault {
    /// Fetch a standard token and return its `id_token` with the standard
    /// token's expiry.
    pub async fn token(&self) -> Result<Token, CredentialError> {
        let now = epoch_secs();
        let resp = self.inner.token_response().await?;
        let id_token = resp
            .extra("id_token")
            .and_then(|v| v.as_str())
            .ok_or(CredentialError::MissingIdToken)?;
        Ok(Token { access_token: id_token.to_owned(), expires_at: resp.expires_at(now) })
    }
}
