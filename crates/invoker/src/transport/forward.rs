// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound request construction and response relay.

use std::time::Duration;

use axum::body::{Body, HttpBody};
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::response::Response;

use crate::audience::Audience;
use crate::credential::Token;

/// Rebuild the origin URL from the inbound path and query.
///
/// Requests routed through the audience prefix (`/backend-a/hello`) carry the
/// backend host in the path; the first occurrence of `/<host>` and then of the
/// full audience are removed before appending the rest to the audience.
pub fn destination_url(audience: &Audience, path: &str, query: Option<&str>) -> String {
    let stripped = path.replacen(&format!("/{}", audience.host()), "", 1);
    let stripped = stripped.replacen(audience.as_str(), "", 1);

    let mut url = format!("{audience}{stripped}");
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// HTTP client for one proxied request.
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Send `body` to `url` with the bearer token and relay the response.
    ///
    /// Only the method, URL and body of the inbound request are carried over.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        token: &Token,
        body: Body,
    ) -> anyhow::Result<Response> {
        let mut req = self.client.request(method, url).bearer_auth(&token.access_token);
        if body.size_hint().exact() != Some(0) {
            req = req.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = req.send().await?;
        Ok(relay(upstream))
    }
}

/// Status, `Content-Type` and a streamed body; other origin headers are dropped.
fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    response
}

#[cfg(test)]
#[path = "forward_tests.rs"]
mod tests;
