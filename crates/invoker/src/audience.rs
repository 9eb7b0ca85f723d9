// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audience resolution and cookie stickiness.
//!
//! The audience is the origin URL a request is proxied to and the audience an
//! identity token is minted for. The first request of a session derives it
//! from the leading path segment (`/my-service/...` → `https://my-service`)
//! and pins it in a cookie, so follow-up requests issued by the backend's own
//! pages (which do not carry the prefix) still reach the same origin.

use std::fmt;

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

/// Name of this service, used as the stickiness cookie name.
pub const SERVICE_NAME: &str = "cloud-run-invoker";

const HTTPS_SCHEME: &str = "https://";

/// Backend origin URL (scheme + host, no path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience(String);

impl Audience {
    /// Build an audience from a bare host segment.
    pub fn from_segment(segment: &str) -> Self {
        Self(format!("{HTTPS_SCHEME}{segment}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The audience with a leading `https://` removed, if present.
    pub fn host(&self) -> &str {
        self.0.strip_prefix(HTTPS_SCHEME).unwrap_or(&self.0)
    }
}

impl From<String> for Audience {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of resolving the audience for one request.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub audience: Audience,
    /// `Set-Cookie` value to attach to the response, when a new marker is issued.
    pub marker: Option<HeaderValue>,
}

/// Resolve the audience from the stickiness cookie, falling back to the first
/// path segment.
pub fn resolve(headers: &HeaderMap, path: &str) -> Resolution {
    if let Some(value) = marker_value(headers) {
        return Resolution { audience: Audience::from(value.to_owned()), marker: None };
    }

    let audience = Audience::from_segment(first_segment(path));
    let marker = set_cookie(&audience);
    if marker.is_none() {
        tracing::warn!(audience = %audience, "audience is not a valid cookie value; marker not issued");
    }
    Resolution { audience, marker }
}

/// First non-empty stickiness cookie among all `Cookie` headers.
fn marker_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| *name == SERVICE_NAME)
        .map(|(_, value)| value.trim_matches('"'))
        .find(|value| !value.is_empty())
}

/// The path component between the leading `/` and the next `/`.
pub fn first_segment(path: &str) -> &str {
    let rest = path.strip_prefix('/').unwrap_or(path);
    rest.split('/').next().unwrap_or_default()
}

/// Session-scoped, HTTPS-only cookie not readable from page scripts.
fn set_cookie(audience: &Audience) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{SERVICE_NAME}={audience}; HttpOnly; Secure")).ok()
}

#[cfg(test)]
#[path = "audience_tests.rs"]
mod tests;
