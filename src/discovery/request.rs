// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discovery request and response payloads.

use serde::{Deserialize, Deserializer, Serialize};

use super::DiscoveredDevice;

/// Placeholder the editor sends instead of a stored password.
pub const REDACTED_PASSWORD: &str = "__PWRD__";

/// Values of `refresh` that request a new scan (case-insensitive).
const TRUTHY: [&str; 4] = ["1", "yes", "true", "on"];

/// Returns true if `value` is one of `1`, `yes`, `true`, `on`, ignoring case.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    TRUTHY.iter().any(|t| value.eq_ignore_ascii_case(t))
}

/// Body of a discovery request.
///
/// # Examples
///
/// ```
/// use midea_hvac::discovery::DiscoveryRequest;
///
/// let request: DiscoveryRequest = serde_json::from_str(
///     r#"{"nodeId":"a1b2","username":"u","password":"__PWRD__","refresh":"YES"}"#,
/// ).unwrap();
///
/// assert!(request.refresh);
/// assert!(request.password_is_redacted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRequest {
    /// Config node whose stored password may be reused.
    #[serde(default)]
    pub node_id: Option<String>,
    /// Cloud account user name.
    #[serde(default)]
    pub username: Option<String>,
    /// Cloud account password, possibly [`REDACTED_PASSWORD`].
    #[serde(default)]
    pub password: Option<String>,
    /// Whether to run a new scan instead of reading the cache.
    #[serde(default, deserialize_with = "refresh_flag")]
    pub refresh: bool,
}

impl DiscoveryRequest {
    /// Creates a request that reads the cached list.
    #[must_use]
    pub fn cached() -> Self {
        Self::default()
    }

    /// Creates a request that runs a new scan with the given account.
    #[must_use]
    pub fn refresh(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            node_id: None,
            username: Some(username.into()),
            password: Some(password.into()),
            refresh: true,
        }
    }

    /// Sets the node whose stored password may be reused.
    #[must_use]
    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// Returns true if the password is absent, empty, or the placeholder.
    #[must_use]
    pub fn password_is_redacted(&self) -> bool {
        self.password
            .as_deref()
            .is_none_or(|p| p.is_empty() || p == REDACTED_PASSWORD)
    }
}

/// Accepts a truthy string or a JSON boolean; anything else is false.
fn refresh_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => is_truthy(&s),
        Some(serde_json::Value::Bool(b)) => b,
        _ => false,
    })
}

/// Result of a discovery request, as returned to the editor.
///
/// Serializes to the device list (or `null` when nothing is cached) on
/// success and to `{"error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiscoveryResponse {
    /// The cached or freshly discovered devices.
    Devices(Option<Vec<DiscoveredDevice>>),
    /// The request failed.
    Error {
        /// Error message.
        error: String,
    },
}

impl DiscoveryResponse {
    /// Returns the devices, if the request succeeded and a list exists.
    #[must_use]
    pub fn devices(&self) -> Option<&[DiscoveredDevice]> {
        match self {
            Self::Devices(devices) => devices.as_deref(),
            Self::Error { .. } => None,
        }
    }

    /// Returns true if the request failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
