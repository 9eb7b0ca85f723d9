// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tokio::sync::Mutex;

use crate::credential::{CredentialError, Token, TokenSource};

/// Hands out the last token until it expires, then asks `inner` again.
///
/// Concurrent callers wait on the same acquisition instead of racing.
#[derive(Debug)]
pub struct ReuseTokenSource<S> {
    inner: S,
    cached: Mutex<Option<Token>>,
}

impl<S: TokenSource> ReuseTokenSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, cached: Mutex::new(None) }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: TokenSource> TokenSource for ReuseTokenSource<S> {
    async fn token(&self) -> Result<Token, CredentialError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.clone());
        }

        let fresh = self.inner.token().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}

#[cfg(test)]
#[path = "reuse_tests.rs"]
mod tests;
