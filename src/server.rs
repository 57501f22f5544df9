// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Admin HTTP endpoint for the editor.
//!
//! Exposes `POST /midea-hvac/discover`. The body is a JSON
//! [`DiscoveryRequest`]; the response is always `200 OK` with either the
//! device list, `null`, or `{"error": "..."}`. A missing or unparsable body
//! is treated as a plain cache read.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::discovery::{Discoverer, DiscoveryRequest, DiscoveryResponse, DiscoveryService};

/// Path of the discovery endpoint.
pub const DISCOVER_PATH: &str = "/midea-hvac/discover";

/// Builds the admin router around a discovery service.
///
/// # Examples
///
/// ```no_run
/// # use std::sync::Arc;
/// # use midea_hvac::discovery::{Discoverer, DiscoveryService};
/// # async fn example<D: Discoverer + 'static>(service: DiscoveryService<D>) -> std::io::Result<()> {
/// let app = midea_hvac::server::admin_router(Arc::new(service));
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:1880").await?;
/// axum::serve(listener, app).await
/// # }
/// ```
pub fn admin_router<D>(service: Arc<DiscoveryService<D>>) -> Router
where
    D: Discoverer + 'static,
{
    Router::new()
        .route(DISCOVER_PATH, post(discover::<D>))
        .with_state(service)
}

async fn discover<D>(
    State(service): State<Arc<DiscoveryService<D>>>,
    body: Option<Json<DiscoveryRequest>>,
) -> Json<DiscoveryResponse>
where
    D: Discoverer + 'static,
{
    let request = body.map(|Json(request)| request).unwrap_or_default();
    tracing::debug!(refresh = request.refresh, "Discovery request received");
    Json(service.handle(request).await)
}
