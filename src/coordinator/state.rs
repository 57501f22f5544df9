// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lifecycle state of a coordinator.

/// Connection lifecycle of a coordinator.
///
/// ```text
/// Uninitialized -> Connecting -> Connected { healthy } <-> Connected { degraded }
///                            \-> Failed
/// any -> Closed
/// ```
///
/// `Failed` and `Closed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No configuration received yet.
    Uninitialized,
    /// The session is being created.
    Connecting,
    /// A session exists. `healthy` follows the last status check.
    Connected {
        /// Whether the last status check succeeded.
        healthy: bool,
    },
    /// Session creation failed with the given message.
    Failed(String),
    /// The coordinator was shut down.
    Closed,
}

impl ConnectionState {
    /// Returns true if a session exists, healthy or not.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    /// Returns true if a session exists and the last status check succeeded.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Connected { healthy: true })
    }

    /// Returns true if session creation failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns true if no further transition is possible except to `Closed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Closed)
    }
}
