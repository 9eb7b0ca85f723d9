// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failure while proxying a request.
///
/// Every failure before the upstream response starts streaming is reported
/// the same way: a 500 whose body is the error text.
#[derive(Debug)]
pub struct ProxyError(anyhow::Error);

impl ProxyError {
    /// The error text followed by any cause whose text is not already part
    /// of it.
    pub fn message(&self) -> String {
        let mut message = self.0.to_string();
        for cause in self.0.chain().skip(1) {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
        }
        message
    }
}

impl<E> From<E> for ProxyError
where
    E: Into<anyhow::Error>,
{
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = self.message();
        tracing::error!(err = %message, "proxy request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
