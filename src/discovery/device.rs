// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovered appliance records.

use serde::{Deserialize, Serialize};

/// An appliance found by a discovery scan.
///
/// Only `id` is required. Fields this crate does not know about are kept in
/// [`extra`](Self::extra) and survive a round trip through the cache.
///
/// # Examples
///
/// ```
/// use midea_hvac::discovery::DiscoveredDevice;
///
/// let device: DiscoveredDevice = serde_json::from_str(
///     r#"{"id":"A","name":"Bedroom","type":"ac","firmware":"1.2"}"#,
/// ).unwrap();
///
/// assert_eq!(device.id, "A");
/// assert_eq!(device.appliance_type.as_deref(), Some("ac"));
/// assert_eq!(device.extra["firmware"], "1.2");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Appliance id.
    pub id: String,
    /// Serial number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sn: Option<String>,
    /// Name given in the vendor app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Appliance type.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub appliance_type: Option<String>,
    /// Local address of the appliance or its dongle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Local port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Appliance key for the cloud gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Appliance token for the cloud gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Any other fields reported by the scan.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DiscoveredDevice {
    /// Creates a record with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sn: None,
            name: None,
            appliance_type: None,
            host: None,
            port: None,
            key: None,
            token: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the local address.
    #[must_use]
    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self
    }

    /// Sets the cloud gateway key and token.
    #[must_use]
    pub fn with_keys(mut self, key: impl Into<String>, token: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self.token = Some(token.into());
        self
    }
}
