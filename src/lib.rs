// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `midea_hvac` - connection coordination and discovery for Midea HVAC
//! appliances.
//!
//! The crate sits between a flow-based host and an appliance transport. It
//! owns the appliance session for one config node, keeps its health visible
//! through a status indicator, and relays what the appliance pushes.
//!
//! # Features
//!
//! - **Connection coordination**: create the session, check health, poll on
//!   an interval and shut down cleanly ([`Coordinator`])
//! - **Push relay**: unsolicited appliance updates become [`NodeEvent::Message`]
//! - **Discovery cache**: cloud scans are cached on disk and served to the
//!   editor ([`discovery`])
//! - **Admin endpoint**: `POST /midea-hvac/discover` with the `http-server`
//!   feature ([`server`])
//!
//! # Quick Start
//!
//! ```no_run
//! use midea_hvac::{ApplianceConnectionConfig, Coordinator, NodeEvent};
//! # use midea_hvac::transport::ApplianceTransport;
//!
//! # async fn example<T: ApplianceTransport>(transport: T) {
//! let config = ApplianceConnectionConfig::serial_bridge("192.168.1.20", 23);
//!
//! let mut coordinator = Coordinator::new(transport);
//! let mut events = coordinator.subscribe();
//!
//! coordinator.initialize(&config).await;
//!
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         NodeEvent::StatusChanged(status) => println!("status: {status}"),
//!         NodeEvent::Message(payload) => println!("push: {}", payload.as_value()),
//!         NodeEvent::Error(error) => eprintln!("{}: {}", error.kind, error.message),
//!     }
//! }
//! # }
//! ```
//!
//! The transport itself is supplied by the caller through the
//! [`ApplianceTransport`] and [`ApplianceSession`] traits.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod event;
pub mod node;
#[cfg(feature = "http-server")]
pub mod server;
pub mod status;
pub mod transport;

pub use cache::DeviceCache;
pub use config::{ApplianceConnectionConfig, ConnectionMethod, NodeConfig, NodeCredentials};
pub use coordinator::{ConnectionState, Coordinator};
pub use discovery::{DiscoveredDevice, DiscoveryRequest, DiscoveryResponse, DiscoveryService};
pub use error::{CacheError, ConfigError, DiscoveryError, Error, Result, TransportError};
pub use event::{ErrorKind, EventBus, NodeEvent, ReportedError};
pub use node::{ConfigNode, NodeRegistry};
pub use status::{ConnectionStatus, StatusColor, StatusPayload};
pub use transport::{ApplianceSession, ApplianceTransport};
