// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan-out of node events to the host.

use tokio::sync::broadcast;

use crate::status::{ConnectionStatus, StatusPayload};

use super::{NodeEvent, ReportedError};

const CAPACITY: usize = 256;

/// Delivers [`NodeEvent`]s to every subscriber.
///
/// Events published while nobody subscribes are dropped. A subscriber more
/// than the capacity behind skips the oldest events (`RecvError::Lagged`).
///
/// # Examples
///
/// ```
/// use midea_hvac::event::EventBus;
/// use midea_hvac::status::ConnectionStatus;
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// assert_eq!(bus.emit_status(ConnectionStatus::connected()), 1);
/// assert!(rx.try_recv().unwrap().is_status());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<NodeEvent>,
}

impl EventBus {
    /// Creates a bus holding up to 256 undelivered events per subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(CAPACITY)
    }

    /// Creates a bus with a custom backlog.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity).0,
        }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publishes an event and returns how many subscribers it reached.
    pub fn publish(&self, event: NodeEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Publishes an `updateStatus` event.
    pub fn emit_status(&self, status: ConnectionStatus) -> usize {
        self.publish(NodeEvent::StatusChanged(status))
    }

    /// Publishes an `updateMessage` event.
    pub fn emit_message(&self, payload: StatusPayload) -> usize {
        self.publish(NodeEvent::Message(payload))
    }

    /// Publishes an error report.
    pub fn emit_error(&self, error: ReportedError) -> usize {
        self.publish(NodeEvent::Error(error))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::event::ErrorKind;

    #[test]
    fn unobserved_events_are_dropped() {
        let bus = EventBus::new();
        assert_eq!(bus.receiver_count(), 0);
        assert_eq!(bus.emit_status(ConnectionStatus::error()), 0);

        // A late subscriber does not see earlier events.
        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn every_subscriber_gets_each_event() {
        let bus = EventBus::new();
        let mut status_rx = bus.subscribe();
        let mut other_rx = bus.clone().subscribe();

        let payload = StatusPayload::new(serde_json::json!({"mode": "cool"}));
        assert_eq!(bus.emit_message(payload.clone()), 2);

        assert_eq!(status_rx.try_recv().unwrap(), NodeEvent::Message(payload.clone()));
        assert_eq!(other_rx.try_recv().unwrap(), NodeEvent::Message(payload));
    }

    #[test]
    fn emit_error_wraps_report() {
        let bus = EventBus::with_capacity(4);
        let mut rx = bus.subscribe();

        let report = ReportedError::new(ErrorKind::HealthCheck, &TransportError::Closed);
        bus.emit_error(report.clone());

        assert_eq!(rx.try_recv().unwrap(), NodeEvent::Error(report));
    }

    #[test]
    fn slow_subscriber_lags() {
        let bus = EventBus::with_capacity(2);
        let mut rx = bus.subscribe();

        for _ in 0..3 {
            bus.emit_status(ConnectionStatus::connected());
        }

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
    }
}
