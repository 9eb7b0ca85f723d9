// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the invoker.

pub mod forward;
pub mod http;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the axum `Router`: two static routes, everything else proxied.
///
/// Failed requests are logged once by [`crate::error::ProxyError`], so the
/// trace layer does not report them again.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(http::root).fallback(http::proxy))
        .route("/favicon.ico", get(http::favicon).fallback(http::proxy))
        .fallback(http::proxy)
        .layer(TraceLayer::new_for_http().on_failure(()))
        .with_state(state)
}
