// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the connection coordinator using a scripted
//! transport and paused time.

mod common;

use std::time::Duration;

use common::{MockTransport, drain};
use midea_hvac::config::{ApplianceConnectionConfig, TransportOptions};
use midea_hvac::coordinator::{ConnectionState, Coordinator};
use midea_hvac::event::{ErrorKind, NodeEvent};
use midea_hvac::status::{ConnectionStatus, StatusColor};
use tokio::time::sleep;

fn serial_config(polling_secs: u64) -> ApplianceConnectionConfig {
    ApplianceConnectionConfig::serial_bridge("192.168.1.20", 23)
        .with_polling_interval(Duration::from_secs(polling_secs))
}

// ============================================================================
// Initialization
// ============================================================================

mod initialize {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn connects_and_reports_green() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        let mut events = coordinator.subscribe();

        let state = coordinator.initialize(&serial_config(30)).await;

        assert_eq!(state, ConnectionState::Connected { healthy: true });
        assert_eq!(coordinator.status(), Some(ConnectionStatus::connected()));
        assert!(coordinator.is_polling());
        assert!(coordinator.is_listening());
        assert_eq!(script.creates(), 1);
        assert_eq!(script.status_calls(), 1);

        let events = drain(&mut events);
        assert_eq!(
            events,
            vec![NodeEvent::StatusChanged(ConnectionStatus::connected())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn passes_serial_bridge_options_to_transport() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);

        coordinator.initialize(&serial_config(30)).await;

        let options = script.last_options.lock().unwrap().clone();
        assert_eq!(
            options,
            Some(TransportOptions::SerialBridge {
                host: Some("192.168.1.20".to_string()),
                port: Some(23),
            })
        );
        assert_eq!(
            options.unwrap().communication_method(),
            Some("serialbridge")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unset_method_fails_creation() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        let mut events = coordinator.subscribe();

        let state = coordinator
            .initialize(&ApplianceConnectionConfig::unset())
            .await;

        assert!(state.is_failed());
        assert_eq!(coordinator.status(), Some(ConnectionStatus::error()));
        assert!(!coordinator.is_polling());
        assert!(!coordinator.is_listening());
        assert_eq!(script.creates(), 0);

        let events = drain(&mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            NodeEvent::StatusChanged(ConnectionStatus::error())
        );
        match &events[1] {
            NodeEvent::Error(error) => assert_eq!(error.kind, ErrorKind::Creation),
            other => panic!("expected creation error, got {other:?}"),
        }

        sleep(Duration::from_secs(300)).await;
        assert_eq!(script.status_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn creation_failure_is_terminal() {
        let transport = MockTransport::failing();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);

        let first = coordinator.initialize(&serial_config(30)).await;
        let second = coordinator.initialize(&serial_config(30)).await;

        assert!(first.is_failed());
        assert_eq!(first, second);
        assert_eq!(script.create_attempts(), 1);
        assert_eq!(coordinator.status().map(|s| s.color), Some(StatusColor::Red));
    }

    #[tokio::test(start_paused = true)]
    async fn second_initialize_keeps_live_session() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);

        coordinator.initialize(&serial_config(30)).await;
        coordinator.initialize(&serial_config(30)).await;

        assert_eq!(script.creates(), 1);
        assert_eq!(script.status_calls(), 1);
        assert_eq!(script.destroys(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn replaces_session_after_link_loss() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);

        coordinator.initialize(&serial_config(30)).await;
        script.drop_link();
        let state = coordinator.initialize(&serial_config(30)).await;

        assert_eq!(state, ConnectionState::Connected { healthy: true });
        assert_eq!(script.creates(), 2);
        // The replaced session is destroyed even though its link was down.
        assert_eq!(script.destroys(), 1);
        assert!(coordinator.is_polling());

        // Only the new poll task ticks.
        sleep(Duration::from_secs(31)).await;
        assert_eq!(script.status_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_first_health_check_keeps_monitoring() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        script.set_fail_status(true);
        let mut coordinator = Coordinator::new(transport);
        let mut events = coordinator.subscribe();

        let state = coordinator.initialize(&serial_config(30)).await;

        assert_eq!(state, ConnectionState::Connected { healthy: false });
        assert_eq!(coordinator.status(), Some(ConnectionStatus::error()));
        assert!(coordinator.is_polling());
        assert!(coordinator.is_listening());

        let events = drain(&mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            NodeEvent::StatusChanged(ConnectionStatus::error())
        );
        match &events[1] {
            NodeEvent::Error(error) => assert_eq!(error.kind, ErrorKind::HealthCheck),
            other => panic!("expected health check error, got {other:?}"),
        }

        script.set_fail_status(false);
        sleep(Duration::from_secs(31)).await;

        assert_eq!(coordinator.status(), Some(ConnectionStatus::connected()));
        assert_eq!(
            coordinator.state(),
            ConnectionState::Connected { healthy: true }
        );
    }
}

// ============================================================================
// Health checks and polling
// ============================================================================

mod polling {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn check_health_without_session_is_noop() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let coordinator = Coordinator::new(transport);

        assert!(!coordinator.check_health().await);
        assert_eq!(coordinator.status(), None);
        assert_eq!(script.status_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn check_health_reports_failure_and_keeps_session() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(60)).await;
        let mut events = coordinator.subscribe();

        script.set_fail_status(true);
        assert!(!coordinator.check_health().await);

        assert_eq!(coordinator.status(), Some(ConnectionStatus::error()));
        assert_eq!(
            coordinator.state(),
            ConnectionState::Connected { healthy: false }
        );
        assert!(coordinator.is_polling());

        let events = drain(&mut events);
        assert_eq!(events.len(), 2);
        assert!(events[0].is_status());
        match &events[1] {
            NodeEvent::Error(error) => {
                assert_eq!(error.kind, ErrorKind::HealthCheck);
                assert!(error.message.contains("timed out"));
            }
            other => panic!("expected health check error, got {other:?}"),
        }

        script.set_fail_status(false);
        assert!(coordinator.check_health().await);
        assert_eq!(
            coordinator.state(),
            ConnectionState::Connected { healthy: true }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn polls_once_per_interval() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);

        coordinator.initialize(&serial_config(30)).await;
        assert_eq!(script.status_calls(), 1);

        sleep(Duration::from_secs(29)).await;
        assert_eq!(script.status_calls(), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(script.status_calls(), 2);

        // t = 95s: checks at 30, 60 and 90 plus the initial check.
        sleep(Duration::from_secs(64)).await;
        assert_eq!(script.status_calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_polls_every_minute() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);

        coordinator.initialize(&serial_config(0)).await;

        sleep(Duration::from_secs(59)).await;
        assert_eq!(script.status_calls(), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(script.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_interval_keeps_poll_task_alive() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(30)).await;

        coordinator.start_polling(Duration::MAX);
        sleep(Duration::from_millis(50)).await;
        assert!(coordinator.is_polling());

        // Clamped to one day.
        sleep(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(script.status_calls(), 2);
        assert!(coordinator.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_polling_replaces_timer() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(30)).await;

        sleep(Duration::from_secs(20)).await;
        coordinator.start_polling(Duration::from_secs(5));

        // t = 31s: only the 5s timer has fired (25s and 30s).
        sleep(Duration::from_secs(11)).await;
        assert_eq!(script.status_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_check_does_not_stop_polling() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(10)).await;
        let mut events = coordinator.subscribe();

        script.set_fail_status(true);
        sleep(Duration::from_secs(35)).await;

        assert_eq!(script.status_calls(), 4);
        assert!(coordinator.is_polling());
        assert_eq!(coordinator.status(), Some(ConnectionStatus::error()));

        let events = drain(&mut events);
        let status_changes = events.iter().filter(|e| e.is_status()).count();
        let errors = events.iter().filter(|e| e.is_error()).count();
        assert_eq!(status_changes, 1);
        assert_eq!(errors, 3);

        script.set_fail_status(false);
        sleep(Duration::from_secs(10)).await;
        assert_eq!(coordinator.status(), Some(ConnectionStatus::connected()));
    }

    #[tokio::test(start_paused = true)]
    async fn late_subscriber_reads_unchanged_status_from_watch() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(10)).await;

        let mut events = coordinator.subscribe();
        sleep(Duration::from_secs(35)).await;

        // Three green ticks repeat the current status: nothing is re-sent.
        assert_eq!(script.status_calls(), 4);
        assert!(drain(&mut events).is_empty());
        assert_eq!(
            *coordinator.watch_status().borrow(),
            Some(ConnectionStatus::connected())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn watch_status_follows_checks() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        let mut status = coordinator.watch_status();

        coordinator.initialize(&serial_config(10)).await;
        assert_eq!(
            *status.borrow_and_update(),
            Some(ConnectionStatus::connected())
        );

        script.set_fail_status(true);
        status.changed().await.unwrap();
        assert_eq!(*status.borrow(), Some(ConnectionStatus::error()));
    }
}

// ============================================================================
// Push relay
// ============================================================================

mod push {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn relays_pushes_without_touching_status() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(60)).await;
        let mut events = coordinator.subscribe();

        assert!(script.push(serde_json::json!({"indoorTemperature": 21.0})));
        assert!(script.push(serde_json::json!({"indoorTemperature": 21.5})));
        sleep(Duration::from_millis(10)).await;

        let events = drain(&mut events);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(NodeEvent::is_message));
        match &events[1] {
            NodeEvent::Message(payload) => {
                assert_eq!(payload.get("indoorTemperature"), Some(&serde_json::json!(21.5)));
            }
            other => panic!("expected message, got {other:?}"),
        }
        assert_eq!(coordinator.status(), Some(ConnectionStatus::connected()));
        assert_eq!(script.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn attaching_twice_relays_once() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(60)).await;
        coordinator.attach_push_listener();
        let mut events = coordinator.subscribe();

        script.push(serde_json::json!({"mode": "heat"}));
        sleep(Duration::from_millis(10)).await;

        assert_eq!(drain(&mut events).len(), 1);
    }
}

// ============================================================================
// Shutdown
// ============================================================================

mod shutdown {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stops_polling_and_destroys_transport() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(30)).await;

        coordinator.shutdown().await;

        assert_eq!(coordinator.state(), ConnectionState::Closed);
        assert!(!coordinator.is_polling());
        assert!(!coordinator.is_listening());
        assert_eq!(script.destroys(), 1);

        sleep(Duration::from_secs(300)).await;
        assert_eq!(script.status_calls(), 1);
        assert!(!script.push(serde_json::json!({"mode": "dry"})));
    }

    #[tokio::test(start_paused = true)]
    async fn is_idempotent() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(30)).await;

        coordinator.shutdown().await;
        coordinator.shutdown().await;

        assert_eq!(script.destroys(), 1);
        assert_eq!(coordinator.state(), ConnectionState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn before_initialize_is_safe() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);

        coordinator.shutdown().await;

        assert_eq!(coordinator.state(), ConnectionState::Closed);
        assert_eq!(script.destroys(), 0);

        // Closed is terminal.
        coordinator.initialize(&serial_config(30)).await;
        assert_eq!(script.create_attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn destroys_session_whose_link_dropped() {
        let transport = MockTransport::new();
        let script = transport.script.clone();
        let mut coordinator = Coordinator::new(transport);
        coordinator.initialize(&serial_config(30)).await;

        script.drop_link();
        coordinator.shutdown().await;
        coordinator.shutdown().await;

        assert_eq!(script.destroys(), 1);
        assert_eq!(coordinator.state(), ConnectionState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn after_failed_creation_ends_closed() {
        let mut coordinator = Coordinator::new(MockTransport::failing());
        coordinator.initialize(&serial_config(30)).await;

        coordinator.shutdown().await;

        assert_eq!(coordinator.state(), ConnectionState::Closed);
    }
}
