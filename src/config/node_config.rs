// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw configuration documents as supplied by the host runtime.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Configuration fields of a `midea-hvac-config` node.
///
/// Field names follow the host's editor form, so `shost`/`sport` belong to the
/// serial bridge and `chost`/`cport` to the cloud gateway. Numeric fields are
/// accepted either as JSON numbers or as numeric strings; anything that does
/// not parse is treated as absent.
///
/// # Examples
///
/// ```
/// use midea_hvac::config::NodeConfig;
///
/// let config = NodeConfig::from_json(
///     r#"{"method":"serialbridge","shost":"10.0.0.5","sport":"23","polling":30}"#,
/// ).unwrap();
///
/// assert_eq!(config.sport, Some(23));
/// assert_eq!(config.polling, Some(30));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Communication method selector (`serialbridge`, `osk103`, ...).
    #[serde(default)]
    pub method: Option<String>,
    /// Serial bridge host.
    #[serde(default)]
    pub shost: Option<String>,
    /// Serial bridge port.
    #[serde(default, deserialize_with = "lenient_number")]
    pub sport: Option<u16>,
    /// Cloud gateway host.
    #[serde(default)]
    pub chost: Option<String>,
    /// Cloud gateway port.
    #[serde(default, deserialize_with = "lenient_number")]
    pub cport: Option<u16>,
    /// Polling interval in seconds.
    #[serde(default, deserialize_with = "lenient_number")]
    pub polling: Option<u64>,
}

impl NodeConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON object of the expected
    /// shape.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Credentials stored by the host alongside a config node.
///
/// The host keeps these apart from the regular configuration and redacts
/// `password` when sending it back to the editor.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCredentials {
    /// Cloud account user name, used for discovery.
    #[serde(default)]
    pub username: Option<String>,
    /// Cloud account password, used for discovery.
    #[serde(default)]
    pub password: Option<String>,
    /// Appliance id for the cloud gateway.
    #[serde(default)]
    pub id: Option<String>,
    /// Appliance key for the cloud gateway.
    #[serde(default)]
    pub key: Option<String>,
    /// Appliance token for the cloud gateway.
    #[serde(default)]
    pub token: Option<String>,
}

impl NodeCredentials {
    /// Parses a credentials document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the cloud account user name and password.
    #[must_use]
    pub fn with_account(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets the appliance id, key and token used by the cloud gateway.
    #[must_use]
    pub fn with_appliance_keys(
        mut self,
        id: impl Into<String>,
        key: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        self.id = Some(id.into());
        self.key = Some(key.into());
        self.token = Some(token.into());
        self
    }
}

impl fmt::Debug for NodeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("NodeCredentials")
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("id", &self.id)
            .field("key", &redact(&self.key))
            .field("token", &redact(&self.token))
            .finish()
    }
}

/// Accepts `23`, `"23"`, `""` or `null`.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64> + std::str::FromStr,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
        Other(serde_json::Value),
    }

    let parsed = match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => T::try_from(n).ok(),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        Some(Raw::Other(_)) | None => None,
    };
    Ok(parsed)
}
