// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection coordinator for a single appliance.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::{ApplianceConnectionConfig, normalize_polling_interval};
use crate::error::TransportError;
use crate::event::{ErrorKind, EventBus, NodeEvent, ReportedError};
use crate::status::ConnectionStatus;
use crate::transport::{ApplianceSession, ApplianceTransport, SessionHandle};

use super::ConnectionState;

/// Owns one appliance session and keeps its status current.
///
/// The coordinator creates the session, checks it once, then runs two
/// background tasks until [`shutdown`](Self::shutdown):
///
/// - a poll task querying the appliance at the configured interval,
/// - a push relay republishing unsolicited status updates as
///   [`NodeEvent::Message`].
///
/// Appliance failures never escape: they set the status to
/// `{red, "error"}` and are published as [`NodeEvent::Error`]. Only a failed
/// session creation is terminal.
///
/// All methods must be called from within a tokio runtime.
///
/// # Examples
///
/// ```no_run
/// use midea_hvac::config::ApplianceConnectionConfig;
/// use midea_hvac::coordinator::Coordinator;
/// # use midea_hvac::transport::ApplianceTransport;
///
/// # async fn example<T: ApplianceTransport>(transport: T) {
/// let mut coordinator = Coordinator::new(transport);
/// let mut events = coordinator.subscribe();
///
/// let config = ApplianceConnectionConfig::serial_bridge("10.0.0.5", 23);
/// let state = coordinator.initialize(&config).await;
/// println!("state after initialize: {state:?}");
///
/// tokio::spawn(async move {
///     while let Ok(event) = events.recv().await {
///         println!("{}: {:?}", event.name(), event);
///     }
/// });
///
/// coordinator.shutdown().await;
/// # }
/// ```
pub struct Coordinator<T: ApplianceTransport> {
    transport: T,
    shared: Arc<Shared>,
    lifecycle: Lifecycle<T::Session>,
}

/// State visible to the background tasks.
struct Shared {
    label: String,
    events: EventBus,
    status_tx: watch::Sender<Option<ConnectionStatus>>,
    state_tx: watch::Sender<ConnectionState>,
}

/// Internal lifecycle. The session only exists in `Connected`.
enum Lifecycle<S: ApplianceSession> {
    Uninitialized,
    Failed,
    Connected(LiveSession<S>),
    Closed,
}

struct LiveSession<S: ApplianceSession> {
    session: Arc<SessionHandle<S>>,
    poll_task: Option<JoinHandle<()>>,
    push_task: Option<JoinHandle<()>>,
}

impl<T: ApplianceTransport> Coordinator<T> {
    /// Creates an uninitialized coordinator.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_label(transport, "midea-hvac")
    }

    /// Creates an uninitialized coordinator whose log lines carry `label`.
    #[must_use]
    pub fn with_label(transport: T, label: impl Into<String>) -> Self {
        let (status_tx, _) = watch::channel(None);
        let (state_tx, _) = watch::channel(ConnectionState::Uninitialized);

        Self {
            transport,
            shared: Arc::new(Shared {
                label: label.into(),
                events: EventBus::new(),
                status_tx,
                state_tx,
            }),
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Subscribes to status, message and error events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.shared.events.subscribe()
    }

    /// Returns the current status indicator, if one has been computed.
    #[must_use]
    pub fn status(&self) -> Option<ConnectionStatus> {
        self.shared.status_tx.borrow().clone()
    }

    /// Creates a watch receiver for the status indicator.
    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<Option<ConnectionStatus>> {
        self.shared.status_tx.subscribe()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state_tx.borrow().clone()
    }

    /// Creates a watch receiver for the lifecycle state.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Returns true while the poll task is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        match &self.lifecycle {
            Lifecycle::Connected(live) => live
                .poll_task
                .as_ref()
                .is_some_and(|task| !task.is_finished()),
            _ => false,
        }
    }

    /// Returns true while the push relay is running.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        match &self.lifecycle {
            Lifecycle::Connected(live) => live
                .push_task
                .as_ref()
                .is_some_and(|task| !task.is_finished()),
            _ => false,
        }
    }

    /// Returns the transport this coordinator creates sessions with.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Creates the appliance session and starts monitoring it.
    ///
    /// Runs the initial [`check_health`](Self::check_health), then starts
    /// polling at the configured interval and attaches the push listener.
    ///
    /// If a session with an open transport already exists, nothing happens.
    /// A session whose transport has gone away is torn down and replaced.
    /// `Failed` and `Closed` are terminal: no new session is created.
    ///
    /// On creation failure the status becomes `{red, "error"}`, the error is
    /// reported and the coordinator ends in [`ConnectionState::Failed`].
    ///
    /// Returns the resulting state.
    pub async fn initialize(&mut self, config: &ApplianceConnectionConfig) -> ConnectionState {
        let transport_open = match &self.lifecycle {
            Lifecycle::Uninitialized => None,
            Lifecycle::Connected(live) => Some(live.session.is_connected()),
            Lifecycle::Failed | Lifecycle::Closed => {
                tracing::warn!(
                    node = %self.shared.label,
                    state = ?self.state(),
                    "Coordinator is in a terminal state, ignoring initialize"
                );
                return self.state();
            }
        };

        match transport_open {
            Some(true) => {
                tracing::debug!(node = %self.shared.label, "Session already live, not recreating");
                return self.state();
            }
            Some(false) => {
                tracing::info!(node = %self.shared.label, "Transport gone, replacing session");
                if let Lifecycle::Connected(live) =
                    std::mem::replace(&mut self.lifecycle, Lifecycle::Uninitialized)
                {
                    live.close(&self.shared.label).await;
                }
            }
            None => {}
        }

        self.shared.set_state(ConnectionState::Connecting);
        tracing::debug!(
            node = %self.shared.label,
            method = ?config.method(),
            host = ?config.options().host(),
            port = ?config.options().port(),
            "Creating appliance session"
        );

        let session = match self.transport.create(config.options()).await {
            Ok(session) => session,
            Err(e) => {
                self.shared.set_status(ConnectionStatus::error());
                self.shared.report(ErrorKind::Creation, &e);
                self.shared.set_state(ConnectionState::Failed(e.to_string()));
                self.lifecycle = Lifecycle::Failed;
                return self.state();
            }
        };

        tracing::info!(node = %self.shared.label, "Appliance session created");
        self.lifecycle = Lifecycle::Connected(LiveSession::new(session));
        self.shared
            .set_state(ConnectionState::Connected { healthy: true });

        self.check_health().await;
        self.start_polling(config.polling_interval());
        self.attach_push_listener();

        self.state()
    }

    /// Queries the appliance status once.
    ///
    /// Success sets `{green, "connected"}`. Failure sets `{red, "error"}` and
    /// reports the error; the session stays alive. Returns whether the check
    /// succeeded. Without a session this does nothing and returns false.
    pub async fn check_health(&self) -> bool {
        let Lifecycle::Connected(live) = &self.lifecycle else {
            tracing::debug!(node = %self.shared.label, "No session, skipping health check");
            return false;
        };

        self.shared.health_check(&*live.session).await
    }

    /// Starts querying the appliance every `interval`.
    ///
    /// The first check runs one interval after this call. A zero interval
    /// falls back to 60 seconds and anything longer than a day is clamped to
    /// a day. Failed checks never stop the timer. Calling
    /// this again replaces the running poll task. Without a session this does
    /// nothing.
    pub fn start_polling(&mut self, interval: Duration) {
        let Lifecycle::Connected(live) = &mut self.lifecycle else {
            tracing::debug!(node = %self.shared.label, "No session, not polling");
            return;
        };

        let interval = normalize_polling_interval(interval);

        if let Some(previous) = live.poll_task.take() {
            previous.abort();
        }

        let session = Arc::clone(&live.session);
        let shared = Arc::clone(&self.shared);

        live.poll_task = Some(tokio::spawn(async move {
            tracing::debug!(node = %shared.label, ?interval, "Starting poll task");

            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tracing::trace!(node = %shared.label, "Polling appliance status");
                shared.health_check(&*session).await;
            }
        }));
    }

    /// Relays appliance status pushes as [`NodeEvent::Message`].
    ///
    /// Subscribes once; later calls are no-ops. Pushes do not change the
    /// status indicator. The relay ends when the transport closes the push
    /// channel. Without a session this does nothing.
    pub fn attach_push_listener(&mut self) {
        let Lifecycle::Connected(live) = &mut self.lifecycle else {
            tracing::debug!(node = %self.shared.label, "No session, not listening");
            return;
        };

        if live.push_task.is_some() {
            tracing::debug!(node = %self.shared.label, "Push listener already attached");
            return;
        }

        let mut rx = live.session.subscribe();
        let shared = Arc::clone(&self.shared);

        live.push_task = Some(tokio::spawn(async move {
            tracing::debug!(node = %shared.label, "Starting push listener");

            loop {
                match rx.recv().await {
                    Ok(payload) => {
                        tracing::trace!(node = %shared.label, "Relaying status push");
                        shared.events.emit_message(payload);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(node = %shared.label, skipped, "Push listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            tracing::debug!(node = %shared.label, "Push listener stopped");
        }));
    }

    /// Stops polling and releases the transport.
    ///
    /// Waits for the poll task and push relay to finish. Safe to call any
    /// number of times and in any state; the coordinator ends `Closed`.
    pub async fn shutdown(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Closed) {
            Lifecycle::Connected(live) => live.close(&self.shared.label).await,
            Lifecycle::Closed => {
                tracing::debug!(node = %self.shared.label, "Already closed");
                return;
            }
            Lifecycle::Uninitialized | Lifecycle::Failed => {}
        }

        self.shared.set_state(ConnectionState::Closed);
        tracing::info!(node = %self.shared.label, "Coordinator closed");
    }
}

impl<T: ApplianceTransport> std::fmt::Debug for Coordinator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("label", &self.shared.label)
            .field("state", &self.state())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }

    /// Stores the status; publishes `updateStatus` only when it changed.
    ///
    /// Repeating the current status is silent, so a subscriber that joins
    /// later never receives it as an event; read it from the watch channel
    /// instead.
    fn set_status(&self, status: ConnectionStatus) {
        let healthy = status.is_healthy();

        let changed = self.status_tx.send_if_modified(|current| {
            if current.as_ref() == Some(&status) {
                false
            } else {
                *current = Some(status.clone());
                true
            }
        });

        self.state_tx.send_if_modified(|state| match state {
            ConnectionState::Connected { healthy: h } if *h != healthy => {
                *h = healthy;
                true
            }
            _ => false,
        });

        if changed {
            tracing::debug!(node = %self.label, %status, "Status changed");
            self.events.emit_status(status);
        }
    }

    fn report(&self, kind: ErrorKind, error: &TransportError) {
        tracing::error!(node = %self.label, %kind, error = %error, "Appliance error");
        self.events.emit_error(ReportedError::new(kind, error));
    }

    async fn health_check<S: ApplianceSession>(&self, session: &SessionHandle<S>) -> bool {
        match session.query_status().await {
            Ok(_) => {
                self.set_status(ConnectionStatus::connected());
                true
            }
            Err(e) => {
                self.set_status(ConnectionStatus::error());
                self.report(ErrorKind::HealthCheck, &e);
                false
            }
        }
    }
}

impl<S: ApplianceSession> LiveSession<S> {
    fn new(session: S) -> Self {
        Self {
            session: Arc::new(SessionHandle::new(session)),
            poll_task: None,
            push_task: None,
        }
    }

    /// Cancels the poll task, destroys the session once whatever its link
    /// state, and joins both tasks.
    async fn close(mut self, label: &str) {
        if let Some(poll) = self.poll_task.take() {
            poll.abort();
            let _ = poll.await;
            tracing::debug!(node = %label, "Poll task stopped");
        }

        if self.session.release() {
            tracing::debug!(node = %label, "Transport destroyed");
        }

        if let Some(push) = self.push_task.take() {
            push.abort();
            let _ = push.await;
        }
    }
}

impl<S: ApplianceSession> Drop for LiveSession<S> {
    fn drop(&mut self) {
        for task in [self.poll_task.take(), self.push_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
        self.session.release();
    }
}
