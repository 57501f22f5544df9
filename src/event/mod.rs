// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events flowing from a coordinator to the host.
//!
//! Status indicator changes, relayed appliance pushes and reported errors are
//! published as [`NodeEvent`]s on an [`EventBus`].
//!
//! # Examples
//!
//! ```
//! use midea_hvac::event::{EventBus, NodeEvent};
//! use midea_hvac::status::ConnectionStatus;
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(NodeEvent::StatusChanged(ConnectionStatus::error()));
//! assert!(rx.try_recv().unwrap().is_status());
//! ```

mod event_bus;
mod node_event;

pub use event_bus::EventBus;
pub use node_event::{ErrorKind, NodeEvent, ReportedError};
