// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection lifecycle and polling coordinator.
//!
//! A [`Coordinator`] owns exactly one appliance session for the lifetime of a
//! config node. It reconciles two independent sources of status change:
//!
//! - **Polling**: a background task queries the appliance at a fixed interval
//!   and flips the status indicator between `{green, "connected"}` and
//!   `{red, "error"}`.
//! - **Pushes**: unsolicited status updates from the appliance are relayed to
//!   the host unchanged, without touching the indicator.
//!
//! Status updates from both sources are last-writer-wins. Shutdown cancels the
//! poll task, destroys the transport and waits for both tasks to finish.
//!
//! # Watching the Status Indicator
//!
//! ```no_run
//! use midea_hvac::config::ApplianceConnectionConfig;
//! use midea_hvac::coordinator::Coordinator;
//! # use midea_hvac::transport::ApplianceTransport;
//!
//! # async fn example<T: ApplianceTransport>(transport: T) {
//! let mut coordinator = Coordinator::new(transport);
//! let mut status_rx = coordinator.watch_status();
//!
//! tokio::spawn(async move {
//!     while status_rx.changed().await.is_ok() {
//!         if let Some(status) = status_rx.borrow().as_ref() {
//!             println!("status: {status}");
//!         }
//!     }
//! });
//!
//! coordinator
//!     .initialize(&ApplianceConnectionConfig::serial_bridge("10.0.0.5", 23))
//!     .await;
//! # }
//! ```

mod connection_coordinator;
mod state;

pub use connection_coordinator::Coordinator;
pub use state::ConnectionState;
