// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery service: cache lookup, refresh and password recovery.

use std::future::Future;
use std::sync::Arc;

use crate::cache::{DEVICES_KEY, DeviceCache};
use crate::error::DiscoveryError;

use super::{DiscoveredDevice, DiscoveryRequest, DiscoveryResponse};

/// Scans a cloud account for appliances.
pub trait Discoverer: Send + Sync {
    /// Returns the appliances registered to the account.
    fn discover(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Vec<DiscoveredDevice>, DiscoveryError>> + Send;
}

/// Looks up the password stored for a config node.
pub trait CredentialLookup: Send + Sync {
    /// Returns the stored password of `node_id`, if the node is known.
    fn stored_password(&self, node_id: &str) -> Option<String>;
}

/// Serves discovery requests from the cache or a new scan.
///
/// A request with `refresh` set runs the [`Discoverer`] and overwrites the
/// cached list; any other request returns what is cached. Failures are
/// returned as [`DiscoveryResponse::Error`] rather than propagated.
pub struct DiscoveryService<D> {
    cache: DeviceCache,
    discoverer: D,
    credentials: Arc<dyn CredentialLookup>,
}

impl<D: Discoverer> DiscoveryService<D> {
    /// Creates a service.
    pub fn new(cache: DeviceCache, discoverer: D, credentials: Arc<dyn CredentialLookup>) -> Self {
        Self {
            cache,
            discoverer,
            credentials,
        }
    }

    /// Returns the cache.
    #[must_use]
    pub fn cache(&self) -> &DeviceCache {
        &self.cache
    }

    /// Handles one request.
    pub async fn handle(&self, request: DiscoveryRequest) -> DiscoveryResponse {
        match self.resolve(request).await {
            Ok(devices) => DiscoveryResponse::Devices(devices),
            Err(e) => {
                tracing::warn!(error = %e, "Discovery request failed");
                DiscoveryResponse::Error {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn resolve(
        &self,
        request: DiscoveryRequest,
    ) -> Result<Option<Vec<DiscoveredDevice>>, DiscoveryError> {
        self.cache.init().await?;

        if !request.refresh {
            return Ok(self.cache.get(DEVICES_KEY).await?);
        }

        let password = if request.password_is_redacted() {
            request
                .node_id
                .as_deref()
                .and_then(|id| self.credentials.stored_password(id))
        } else {
            request.password
        };

        let username = request
            .username
            .filter(|u| !u.is_empty())
            .ok_or(DiscoveryError::MissingCredentials)?;
        let password = password.ok_or(DiscoveryError::MissingCredentials)?;

        tracing::info!(user = %username, "Scanning cloud account for appliances");
        let devices = self.discoverer.discover(&username, &password).await?;
        tracing::info!(count = devices.len(), "Discovery finished");

        self.cache.set(DEVICES_KEY, &devices).await?;
        Ok(Some(devices))
    }
}

impl<D> std::fmt::Debug for DiscoveryService<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
