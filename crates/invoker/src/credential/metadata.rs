// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GCE/Cloud Run metadata server client.

use std::time::Duration;

use reqwest::Url;

use crate::audience::Audience;
use crate::config::AdcConfig;
use crate::credential::oauth::{check_status, jwt_expiry, TokenResponse};
use crate::credential::{CredentialError, Token};

const DEFAULT_METADATA_HOST: &str = "169.254.169.254";
const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
const METADATA_FLAVOR: &str = "Google";

/// Off-platform the link-local address usually blackholes, so the probe gets
/// its own short deadline.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client for the metadata server.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    base_url: String,
    http: reqwest::Client,
}

impl MetadataClient {
    pub fn new(host: &str, http: reqwest::Client) -> Self {
        Self { base_url: format!("http://{host}/computeMetadata/v1"), http }
    }

    /// Return a client if the process runs on the platform.
    ///
    /// An explicitly configured metadata host is trusted without probing.
    pub async fn detect(config: &AdcConfig, http: &reqwest::Client) -> Option<Self> {
        if let Some(ref host) = config.metadata_host {
            return Some(Self::new(host, http.clone()));
        }

        let probe = reqwest::Client::builder()
            .connect_timeout(PROBE_TIMEOUT)
            .timeout(PROBE_TIMEOUT)
            .build()
            .ok()?;
        match probe.get(format!("http://{DEFAULT_METADATA_HOST}")).send().await {
            Ok(resp) => {
                let flavor = resp.headers().get(METADATA_FLAVOR_HEADER).and_then(|v| v.to_str().ok());
                (flavor == Some(METADATA_FLAVOR))
                    .then(|| Self::new(DEFAULT_METADATA_HOST, http.clone()))
            }
            Err(e) => {
                tracing::debug!(err = %e, "metadata server not reachable");
                None
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, url: impl reqwest::IntoUrl) -> Result<reqwest::Response, CredentialError> {
        let resp =
            self.http.get(url).header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR).send().await?;
        check_status(resp).await
    }

    /// Fetch an identity token for `audience` for the default service account.
    pub async fn identity_token(&self, audience: &str) -> Result<Token, CredentialError> {
        let url = Url::parse_with_params(
            &self.url("/instance/service-accounts/default/identity"),
            &[("audience", audience), ("format", "full")],
        )
        .map_err(|e| CredentialError::Parse(format!("metadata url: {e}")))?;

        let body = self.get(url).await?.text().await?;
        let id_token = body.trim().to_owned();
        let expires_at = jwt_expiry(&id_token)?;
        Ok(Token { access_token: id_token, expires_at })
    }

    /// Fetch an OAuth2 access token for the default service account.
    pub async fn access_token(&self) -> Result<TokenResponse, CredentialError> {
        let resp = self.get(self.url("/instance/service-accounts/default/token")).await?;
        Ok(resp.json().await?)
    }
}

/// Identity tokens minted by the metadata server for one audience.
#[derive(Debug)]
pub struct MetadataIdentity {
    client: MetadataClient,
    audience: String,
}

impl MetadataIdentity {
    pub fn new(client: MetadataClient, audience: &Audience) -> Self {
        Self { client, audience: audience.as_str().to_owned() }
    }

    pub async fn token(&self) -> Result<Token, CredentialError> {
        self.client.identity_token(&self.audience).await
    }
}
