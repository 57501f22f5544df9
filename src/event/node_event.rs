// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events emitted by a config node to the host.

use std::fmt;

use serde::Serialize;

use crate::status::{ConnectionStatus, StatusPayload};

/// Where a reported error originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The session could not be created. Terminal.
    Creation,
    /// A status check (initial or periodic) failed. Recoverable.
    HealthCheck,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creation => f.write_str("creation"),
            Self::HealthCheck => f.write_str("health check"),
        }
    }
}

/// A non-fatal error handed to the host's error channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    /// Where the error originated.
    pub kind: ErrorKind,
    /// Human readable message.
    pub message: String,
    /// Additional detail (the error's debug rendering).
    pub details: String,
}

impl ReportedError {
    pub(crate) fn new<E: std::error::Error>(kind: ErrorKind, error: &E) -> Self {
        Self {
            kind,
            message: error.to_string(),
            details: format!("{error:?}"),
        }
    }
}

/// Events emitted by a coordinator.
///
/// These map onto the host's event names: `updateStatus` for
/// [`StatusChanged`](Self::StatusChanged), `updateMessage` for
/// [`Message`](Self::Message), and the error report channel for
/// [`Error`](Self::Error).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum NodeEvent {
    /// The connection status indicator changed.
    #[serde(rename = "updateStatus")]
    StatusChanged(ConnectionStatus),

    /// The appliance pushed a status update.
    #[serde(rename = "updateMessage")]
    Message(StatusPayload),

    /// An appliance error was caught and reported.
    #[serde(rename = "error")]
    Error(ReportedError),
}

impl NodeEvent {
    /// Returns the host event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StatusChanged(_) => "updateStatus",
            Self::Message(_) => "updateMessage",
            Self::Error(_) => "error",
        }
    }

    /// Returns `true` if this is a status indicator update.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, Self::StatusChanged(_))
    }

    /// Returns `true` if this is a relayed push message.
    #[must_use]
    pub fn is_message(&self) -> bool {
        matches!(self, Self::Message(_))
    }

    /// Returns `true` if this is a reported error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
