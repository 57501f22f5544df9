// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of active config nodes and their stored credentials.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::config::NodeCredentials;
use crate::discovery::CredentialLookup;

/// Credentials of the config nodes that are currently active.
///
/// Config nodes register on start and unregister on close. The discovery
/// endpoint uses the registry to recover a password the editor redacted.
///
/// # Examples
///
/// ```
/// use midea_hvac::config::NodeCredentials;
/// use midea_hvac::discovery::CredentialLookup;
/// use midea_hvac::node::NodeRegistry;
///
/// let registry = NodeRegistry::new();
/// registry.register("a1b2", NodeCredentials::default().with_account("user", "secret"));
///
/// assert_eq!(registry.stored_password("a1b2"), Some("secret".to_string()));
/// assert_eq!(registry.stored_password("other"), None);
/// ```
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: RwLock<HashMap<String, NodeCredentials>>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node, replacing any earlier credentials for the same id.
    pub fn register(&self, node_id: impl Into<String>, credentials: NodeCredentials) {
        let node_id = node_id.into();
        tracing::debug!(node = %node_id, "Registering config node");
        self.nodes.write().insert(node_id, credentials);
    }

    /// Removes a node. Returns true if it was registered.
    pub fn unregister(&self, node_id: &str) -> bool {
        let removed = self.nodes.write().remove(node_id).is_some();
        if removed {
            tracing::debug!(node = %node_id, "Unregistered config node");
        }
        removed
    }

    /// Returns the credentials stored for a node.
    #[must_use]
    pub fn credentials(&self, node_id: &str) -> Option<NodeCredentials> {
        self.nodes.read().get(node_id).cloned()
    }

    /// Returns true if the node is registered.
    #[must_use]
    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.read().contains_key(node_id)
    }

    /// Returns the number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Returns true if no node is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }
}

impl CredentialLookup for NodeRegistry {
    fn stored_password(&self, node_id: &str) -> Option<String> {
        self.nodes
            .read()
            .get(node_id)
            .and_then(|creds| creds.password.clone())
    }
}
