// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-facing config node.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::config::{ApplianceConnectionConfig, NodeConfig, NodeCredentials};
use crate::coordinator::{ConnectionState, Coordinator};
use crate::event::NodeEvent;
use crate::status::ConnectionStatus;
use crate::transport::ApplianceTransport;

use super::NodeRegistry;

/// A `midea-hvac-config` node as instantiated by the host.
///
/// Mirrors the host lifecycle: [`start`](Self::start) is the create hook and
/// [`close`](Self::close) the close hook. Between [`new`](Self::new) and
/// `start` callers can subscribe to events so the first status update is not
/// missed.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use midea_hvac::config::{NodeConfig, NodeCredentials};
/// use midea_hvac::node::{ConfigNode, NodeRegistry};
/// # use midea_hvac::transport::ApplianceTransport;
///
/// # async fn example<T: ApplianceTransport>(transport: T) {
/// let registry = Arc::new(NodeRegistry::new());
/// let config = NodeConfig::from_json(
///     r#"{"method":"serialbridge","shost":"10.0.0.5","sport":23}"#,
/// ).unwrap();
///
/// let mut node = ConfigNode::new("a1b2", &config, NodeCredentials::default(), transport, registry);
/// let mut events = node.subscribe();
///
/// node.start().await;
/// // ...
/// node.close().await;
/// # }
/// ```
pub struct ConfigNode<T: ApplianceTransport> {
    id: String,
    connection: ApplianceConnectionConfig,
    coordinator: Coordinator<T>,
    registry: Arc<NodeRegistry>,
}

impl<T: ApplianceTransport> ConfigNode<T> {
    /// Builds the node and registers its credentials.
    ///
    /// No connection is attempted until [`start`](Self::start).
    pub fn new(
        id: impl Into<String>,
        config: &NodeConfig,
        credentials: NodeCredentials,
        transport: T,
        registry: Arc<NodeRegistry>,
    ) -> Self {
        let id = id.into();
        let connection = ApplianceConnectionConfig::from_node(config, &credentials);
        let label = config
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&id)
            .to_string();

        registry.register(id.clone(), credentials);

        Self {
            id,
            connection,
            coordinator: Coordinator::with_label(transport, label),
            registry,
        }
    }

    /// Builds and starts the node in one step.
    pub async fn create(
        id: impl Into<String>,
        config: &NodeConfig,
        credentials: NodeCredentials,
        transport: T,
        registry: Arc<NodeRegistry>,
    ) -> Self {
        let mut node = Self::new(id, config, credentials, transport, registry);
        node.start().await;
        node
    }

    /// Connects to the appliance and starts monitoring it.
    pub async fn start(&mut self) -> ConnectionState {
        self.coordinator.initialize(&self.connection).await
    }

    /// Tears down polling and the transport, then unregisters the node.
    ///
    /// Safe to call more than once.
    pub async fn close(&mut self) {
        self.coordinator.shutdown().await;
        self.registry.unregister(&self.id);
    }

    /// Returns the node id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the derived connection configuration.
    #[must_use]
    pub fn connection(&self) -> &ApplianceConnectionConfig {
        &self.connection
    }

    /// Returns the coordinator.
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator<T> {
        &self.coordinator
    }

    /// Subscribes to the node's events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.coordinator.subscribe()
    }

    /// Creates a watch receiver for the status indicator.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<Option<ConnectionStatus>> {
        self.coordinator.watch_status()
    }

    /// Returns the current status indicator.
    #[must_use]
    pub fn status(&self) -> Option<ConnectionStatus> {
        self.coordinator.status()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.coordinator.state()
    }
}

impl<T: ApplianceTransport> std::fmt::Debug for ConfigNode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigNode")
            .field("id", &self.id)
            .field("connection", &self.connection)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}
