// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session wrapper that serializes status requests.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, broadcast};

use crate::error::TransportError;
use crate::status::StatusPayload;

use super::ApplianceSession;

/// Owns a session and lets at most one status request run at a time.
///
/// The initial health check and the poll task share the session; overlapping
/// requests wait on the gate in FIFO order instead of reaching the transport
/// together.
pub(crate) struct SessionHandle<S> {
    session: S,
    request_gate: Mutex<()>,
    released: AtomicBool,
}

impl<S: ApplianceSession> SessionHandle<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            request_gate: Mutex::new(()),
            released: AtomicBool::new(false),
        }
    }

    /// Requests the appliance status, waiting for any request in flight.
    pub async fn query_status(&self) -> Result<StatusPayload, TransportError> {
        let _guard = self.request_gate.lock().await;
        self.session.get_status().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusPayload> {
        self.session.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Destroys the session unless it was already released.
    ///
    /// The link state does not matter: a session whose connection dropped on
    /// its own is still destroyed. Returns true if a destroy was issued.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.session.destroy();
        true
    }
}
