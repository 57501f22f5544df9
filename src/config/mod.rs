// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configuration types.
//!
//! The host hands over two loosely typed documents per config node: the
//! editor fields ([`NodeConfig`]) and the stored secrets
//! ([`NodeCredentials`]). [`ApplianceConnectionConfig::from_node`] turns them
//! into the typed configuration the coordinator works with.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use midea_hvac::config::{ApplianceConnectionConfig, NodeConfig, NodeCredentials};
//!
//! let node = NodeConfig::from_json(
//!     r#"{"method":"serialbridge","shost":"10.0.0.5","sport":23,"polling":30}"#,
//! ).unwrap();
//! let config = ApplianceConnectionConfig::from_node(&node, &NodeCredentials::default());
//!
//! assert_eq!(config.options().host(), Some("10.0.0.5"));
//! assert_eq!(config.options().port(), Some(23));
//! assert_eq!(config.polling_interval(), Duration::from_secs(30));
//! ```

mod connection;
mod node_config;

pub use connection::{
    ApplianceConnectionConfig, ConnectionMethod, DEFAULT_POLLING_INTERVAL, MAX_POLLING_INTERVAL,
    TransportOptions,
};
pub(crate) use connection::normalize_polling_interval;
pub use node_config::{NodeConfig, NodeCredentials};
