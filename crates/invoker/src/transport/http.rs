// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the invoker.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::audience::{self, Audience};
use crate::credential::{self, TokenSource};
use crate::error::ProxyError;
use crate::state::AppState;
use crate::transport::forward::{destination_url, Forwarder};

/// `GET /`
pub async fn root() -> &'static str {
    "cloud run invoker"
}

/// `GET /favicon.ico`
pub async fn favicon() -> &'static str {
    ""
}

/// Everything else: resolve the audience, mint a token, forward.
pub async fn proxy(State(s): State<Arc<AppState>>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let resolution = audience::resolve(&parts.headers, parts.uri.path());

    let mut response = match forward(&s, &resolution.audience, parts, body).await {
        Ok(resp) => resp,
        Err(e) => e.into_response(),
    };
    if let Some(marker) = resolution.marker {
        response.headers_mut().append(SET_COOKIE, marker);
    }
    response
}

async fn forward(
    s: &AppState,
    audience: &Audience,
    parts: Parts,
    body: Body,
) -> Result<Response, ProxyError> {
    let url = destination_url(audience, parts.uri.path(), parts.uri.query());
    tracing::info!(url = %url, method = %parts.method, "forwarding request");

    let source = credential::find_token_source(&s.credentials, audience).await?;
    let token = source.token().await?;

    let forwarder = Forwarder::new(s.upstream_timeout)?;
    Ok(forwarder.send(parts.method, &url, &token, body).await?)
}
