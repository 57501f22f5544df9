// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection status indicator and appliance status payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Color of the status indicator shown by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    /// The appliance answered the last status check.
    Green,
    /// Creation or the last status check failed.
    Red,
}

/// Connection health as shown to the user.
///
/// Serializes to the host's status shape, e.g.
/// `{"color":"green","text":"connected"}`.
///
/// # Examples
///
/// ```
/// use midea_hvac::status::{ConnectionStatus, StatusColor};
///
/// let status = ConnectionStatus::connected();
/// assert_eq!(status.color, StatusColor::Green);
/// assert_eq!(status.text, "connected");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Indicator color.
    pub color: StatusColor,
    /// Short label.
    pub text: String,
}

impl ConnectionStatus {
    /// `{green, "connected"}`.
    #[must_use]
    pub fn connected() -> Self {
        Self {
            color: StatusColor::Green,
            text: "connected".to_string(),
        }
    }

    /// `{red, "error"}`.
    #[must_use]
    pub fn error() -> Self {
        Self {
            color: StatusColor::Red,
            text: "error".to_string(),
        }
    }

    /// Returns true for a green indicator.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.color == StatusColor::Green
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = match self.color {
            StatusColor::Green => "green",
            StatusColor::Red => "red",
        };
        write!(f, "{color}: {}", self.text)
    }
}

/// Status document reported by the appliance.
///
/// The content is defined by the transport; it is relayed to the host
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusPayload(serde_json::Value);

impl StatusPayload {
    /// Wraps a status document.
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Returns the status document.
    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Returns a top-level field of the document.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.0.get(field)
    }

    /// Consumes the payload, returning the document.
    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for StatusPayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
