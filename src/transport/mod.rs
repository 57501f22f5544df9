// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seam between the coordinator and the appliance protocol library.
//!
//! The wire protocol lives outside this crate. A protocol library plugs in by
//! implementing [`ApplianceTransport`] (session factory) and
//! [`ApplianceSession`] (one live connection).

mod session_handle;

pub(crate) use session_handle::SessionHandle;

use std::future::Future;

use tokio::sync::broadcast;

use crate::config::TransportOptions;
use crate::error::TransportError;
use crate::status::StatusPayload;

/// A live connection to one appliance.
pub trait ApplianceSession: Send + Sync + 'static {
    /// Requests the current appliance status.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the appliance cannot be reached or answers
    /// with something unexpected.
    fn get_status(&self) -> impl Future<Output = Result<StatusPayload, TransportError>> + Send;

    /// Subscribes to unsolicited status pushes.
    ///
    /// The channel must close once the session is destroyed.
    fn subscribe(&self) -> broadcast::Receiver<StatusPayload>;

    /// Returns true while the underlying connection is open.
    fn is_connected(&self) -> bool;

    /// Closes the underlying connection and stops push delivery.
    fn destroy(&self);
}

/// Factory for appliance sessions.
pub trait ApplianceTransport: Send + Sync {
    /// Session type produced by this transport.
    type Session: ApplianceSession;

    /// Creates a session from the given options.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the options are incomplete or the session
    /// cannot be established.
    fn create(
        &self,
        options: &TransportOptions,
    ) -> impl Future<Output = Result<Self::Session, TransportError>> + Send;
}
