// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud appliance discovery with an on-disk cache.
//!
//! The editor asks for the appliances registered to a cloud account so the
//! user can pick one. Scans are slow, so the last result is cached and only
//! replaced when the request sets `refresh`.
//!
//! # Password recovery
//!
//! The editor never sees stored passwords; it sends [`REDACTED_PASSWORD`]
//! instead. When a refresh arrives with that placeholder (or no password at
//! all) the password stored for `nodeId` is looked up through a
//! [`CredentialLookup`], normally the [`NodeRegistry`](crate::node::NodeRegistry).
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use midea_hvac::cache::DeviceCache;
//! use midea_hvac::discovery::{
//!     DiscoveredDevice, Discoverer, DiscoveryRequest, DiscoveryService,
//! };
//! use midea_hvac::error::DiscoveryError;
//! use midea_hvac::node::NodeRegistry;
//!
//! struct Cloud;
//!
//! impl Discoverer for Cloud {
//!     async fn discover(
//!         &self,
//!         _username: &str,
//!         _password: &str,
//!     ) -> Result<Vec<DiscoveredDevice>, DiscoveryError> {
//!         Ok(vec![DiscoveredDevice::new("A")])
//!     }
//! }
//!
//! # async fn example() {
//! let service = DiscoveryService::new(
//!     DeviceCache::new("/tmp/midea-hvac"),
//!     Cloud,
//!     Arc::new(NodeRegistry::new()),
//! );
//!
//! let response = service.handle(DiscoveryRequest::refresh("u", "p")).await;
//! assert_eq!(response.devices().map(<[_]>::len), Some(1));
//! # }
//! ```

mod device;
mod request;
mod service;

pub use device::DiscoveredDevice;
pub use request::{DiscoveryRequest, DiscoveryResponse, REDACTED_PASSWORD, is_truthy};
pub use service::{CredentialLookup, Discoverer, DiscoveryService};
