// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted appliance transport shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use midea_hvac::config::TransportOptions;
use midea_hvac::error::TransportError;
use midea_hvac::event::NodeEvent;
use midea_hvac::status::StatusPayload;
use midea_hvac::transport::{ApplianceSession, ApplianceTransport};
use tokio::sync::broadcast;

/// Counters and switches shared between a test and its transport.
#[derive(Default)]
pub struct Script {
    pub create_attempts: AtomicUsize,
    pub creates: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub destroys: AtomicUsize,
    pub fail_create: AtomicBool,
    pub fail_status: AtomicBool,
    pub link_down: AtomicBool,
    pub last_options: Mutex<Option<TransportOptions>>,
    push_tx: Mutex<Option<broadcast::Sender<StatusPayload>>>,
}

impl Script {
    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn create_attempts(&self) -> usize {
        self.create_attempts.load(Ordering::SeqCst)
    }

    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    pub fn set_fail_status(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    /// Simulates the appliance link dropping without a destroy.
    pub fn drop_link(&self) {
        self.link_down.store(true, Ordering::SeqCst);
    }

    /// Sends an unsolicited status update. Returns false if nobody listens.
    pub fn push(&self, payload: serde_json::Value) -> bool {
        self.push_tx
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|tx| tx.send(StatusPayload::new(payload)).is_ok())
    }
}

#[derive(Clone, Default)]
pub struct MockTransport {
    pub script: Arc<Script>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let transport = Self::default();
        transport.script.fail_create.store(true, Ordering::SeqCst);
        transport
    }
}

impl ApplianceTransport for MockTransport {
    type Session = MockSession;

    async fn create(&self, options: &TransportOptions) -> Result<MockSession, TransportError> {
        let script = &self.script;
        script.create_attempts.fetch_add(1, Ordering::SeqCst);
        *script.last_options.lock().unwrap() = Some(options.clone());

        if options.is_empty() {
            return Err(TransportError::MissingParameter("communication method"));
        }
        if script.fail_create.load(Ordering::SeqCst) {
            return Err(TransportError::Creation("appliance refused".to_string()));
        }

        let (tx, _) = broadcast::channel(16);
        *script.push_tx.lock().unwrap() = Some(tx);
        script.link_down.store(false, Ordering::SeqCst);
        script.creates.fetch_add(1, Ordering::SeqCst);

        Ok(MockSession {
            script: Arc::clone(script),
            destroyed: AtomicBool::new(false),
        })
    }
}

pub struct MockSession {
    script: Arc<Script>,
    destroyed: AtomicBool,
}

impl ApplianceSession for MockSession {
    async fn get_status(&self) -> Result<StatusPayload, TransportError> {
        self.script.status_calls.fetch_add(1, Ordering::SeqCst);

        if self.script.fail_status.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout(5000));
        }

        Ok(StatusPayload::new(serde_json::json!({
            "powerOn": true,
            "mode": "cool",
            "indoorTemperature": 22.5,
        })))
    }

    fn subscribe(&self) -> broadcast::Receiver<StatusPayload> {
        match self.script.push_tx.lock().unwrap().as_ref() {
            Some(tx) => tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    fn is_connected(&self) -> bool {
        !self.destroyed.load(Ordering::SeqCst) && !self.script.link_down.load(Ordering::SeqCst)
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        self.script.destroys.fetch_add(1, Ordering::SeqCst);
        // Dropping the only sender closes every push receiver.
        self.script.push_tx.lock().unwrap().take();
    }
}

/// Collects every event already queued on `rx`.
pub fn drain(rx: &mut broadcast::Receiver<NodeEvent>) -> Vec<NodeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
