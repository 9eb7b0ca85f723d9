// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use crate::config::AdcConfig;

/// Upper bound on one upstream call, from connect to the end of the body.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only settings shared by all request handlers.
///
/// Deliberately holds no caches: every request discovers credentials and
/// builds its own clients.
#[derive(Debug, Clone)]
pub struct AppState {
    pub credentials: AdcConfig,
    pub upstream_timeout: Duration,
}

impl AppState {
    pub fn new(credentials: AdcConfig) -> Self {
        Self { credentials, upstream_timeout: UPSTREAM_TIMEOUT }
    }
}
