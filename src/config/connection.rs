// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed appliance connection configuration.

use std::time::Duration;

use super::{NodeConfig, NodeCredentials};

/// Default polling interval when none (or zero) is configured.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(60);

/// Longest accepted polling interval; larger values are clamped to it.
pub const MAX_POLLING_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Maps zero to the default and caps the interval at one day.
pub(crate) fn normalize_polling_interval(interval: Duration) -> Duration {
    if interval.is_zero() {
        DEFAULT_POLLING_INTERVAL
    } else {
        interval.min(MAX_POLLING_INTERVAL)
    }
}

/// How the appliance is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionMethod {
    /// Local serial-to-network bridge.
    SerialBridge,
    /// Cloud-mediated gateway (OSK103 dongle).
    CloudGateway,
    /// No usable method was configured.
    Unset,
}

impl ConnectionMethod {
    /// Maps the host's method selector to a connection method.
    ///
    /// Matching is case-insensitive. `osk103` is the selector the host editor
    /// writes for the cloud gateway; `cloudGateway` is accepted as well.
    #[must_use]
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector.map(str::to_ascii_lowercase).as_deref() {
            Some("serialbridge") => Self::SerialBridge,
            Some("osk103" | "cloudgateway") => Self::CloudGateway,
            _ => Self::Unset,
        }
    }
}

/// Parameters handed to the appliance transport when creating a session.
///
/// Exactly one parameter set exists per connection method. [`Empty`] is what
/// an unset method produces; transports are expected to reject it.
///
/// [`Empty`]: TransportOptions::Empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOptions {
    /// Serial bridge parameters.
    SerialBridge {
        /// Bridge host or IP address.
        host: Option<String>,
        /// Bridge TCP port.
        port: Option<u16>,
    },
    /// Cloud gateway parameters.
    CloudGateway {
        /// Gateway host or IP address.
        host: Option<String>,
        /// Gateway TCP port.
        port: Option<u16>,
        /// Appliance id.
        id: Option<String>,
        /// Appliance key.
        key: Option<String>,
        /// Appliance token.
        token: Option<String>,
    },
    /// No parameters.
    Empty,
}

impl TransportOptions {
    /// Returns the transport's name for this communication method.
    #[must_use]
    pub fn communication_method(&self) -> Option<&'static str> {
        match self {
            Self::SerialBridge { .. } => Some("serialbridge"),
            Self::CloudGateway { .. } => Some("sk103"),
            Self::Empty => None,
        }
    }

    /// Returns true if no parameter set is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the configured host, if any.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::SerialBridge { host, .. } | Self::CloudGateway { host, .. } => host.as_deref(),
            Self::Empty => None,
        }
    }

    /// Returns the configured port, if any.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        match self {
            Self::SerialBridge { port, .. } | Self::CloudGateway { port, .. } => *port,
            Self::Empty => None,
        }
    }
}

/// Immutable connection configuration for one appliance.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use midea_hvac::config::{ApplianceConnectionConfig, ConnectionMethod};
///
/// let config = ApplianceConnectionConfig::serial_bridge("10.0.0.5", 23)
///     .with_polling_interval(Duration::from_secs(30));
///
/// assert_eq!(config.method(), ConnectionMethod::SerialBridge);
/// assert_eq!(config.polling_interval(), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplianceConnectionConfig {
    method: ConnectionMethod,
    options: TransportOptions,
    polling_interval: Duration,
}

impl ApplianceConnectionConfig {
    /// Creates a configuration for a serial bridge.
    #[must_use]
    pub fn serial_bridge(host: impl Into<String>, port: u16) -> Self {
        Self {
            method: ConnectionMethod::SerialBridge,
            options: TransportOptions::SerialBridge {
                host: Some(host.into()),
                port: Some(port),
            },
            polling_interval: DEFAULT_POLLING_INTERVAL,
        }
    }

    /// Creates a configuration for a cloud gateway.
    #[must_use]
    pub fn cloud_gateway(
        host: impl Into<String>,
        port: u16,
        id: impl Into<String>,
        key: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            method: ConnectionMethod::CloudGateway,
            options: TransportOptions::CloudGateway {
                host: Some(host.into()),
                port: Some(port),
                id: Some(id.into()),
                key: Some(key.into()),
                token: Some(token.into()),
            },
            polling_interval: DEFAULT_POLLING_INTERVAL,
        }
    }

    /// Creates a configuration without a connection method.
    ///
    /// Session creation from this configuration is expected to fail.
    #[must_use]
    pub fn unset() -> Self {
        Self {
            method: ConnectionMethod::Unset,
            options: TransportOptions::Empty,
            polling_interval: DEFAULT_POLLING_INTERVAL,
        }
    }

    /// Derives the configuration from the host's node configuration and
    /// stored credentials.
    #[must_use]
    pub fn from_node(config: &NodeConfig, credentials: &NodeCredentials) -> Self {
        let method = ConnectionMethod::from_selector(config.method.as_deref());
        let options = match method {
            ConnectionMethod::SerialBridge => TransportOptions::SerialBridge {
                host: config.shost.clone(),
                port: config.sport,
            },
            ConnectionMethod::CloudGateway => TransportOptions::CloudGateway {
                host: config.chost.clone(),
                port: config.cport,
                id: credentials.id.clone(),
                key: credentials.key.clone(),
                token: credentials.token.clone(),
            },
            ConnectionMethod::Unset => TransportOptions::Empty,
        };

        Self {
            method,
            options,
            polling_interval: polling_interval_from_secs(config.polling),
        }
    }

    /// Sets the polling interval.
    ///
    /// A zero interval falls back to the default of 60 seconds; anything
    /// above [`MAX_POLLING_INTERVAL`] is clamped to it.
    #[must_use]
    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = normalize_polling_interval(interval);
        self
    }

    /// Returns the connection method.
    #[must_use]
    pub fn method(&self) -> ConnectionMethod {
        self.method
    }

    /// Returns the transport parameters.
    #[must_use]
    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Returns the polling interval.
    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }
}

fn polling_interval_from_secs(secs: Option<u64>) -> Duration {
    normalize_polling_interval(Duration::from_secs(secs.unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(json: &str) -> NodeConfig {
        NodeConfig::from_json(json).unwrap()
    }

    #[test]
    fn serial_bridge_from_node() {
        let config = ApplianceConnectionConfig::from_node(
            &node(r#"{"method":"serialbridge","shost":"10.0.0.5","sport":23,"polling":30}"#),
            &NodeCredentials::default(),
        );

        assert_eq!(config.method(), ConnectionMethod::SerialBridge);
        assert_eq!(
            config.options(),
            &TransportOptions::SerialBridge {
                host: Some("10.0.0.5".to_string()),
                port: Some(23),
            }
        );
        assert_eq!(config.options().communication_method(), Some("serialbridge"));
        assert_eq!(config.polling_interval(), Duration::from_secs(30));
    }

    #[test]
    fn cloud_gateway_takes_keys_from_credentials() {
        let credentials = NodeCredentials::default().with_appliance_keys("1234", "k", "t");
        let config = ApplianceConnectionConfig::from_node(
            &node(r#"{"method":"osk103","chost":"192.168.1.20","cport":6444,"shost":"ignored"}"#),
            &credentials,
        );

        assert_eq!(config.method(), ConnectionMethod::CloudGateway);
        assert_eq!(config.options().communication_method(), Some("sk103"));
        assert_eq!(config.options().host(), Some("192.168.1.20"));
        assert_eq!(config.options().port(), Some(6444));
        if let TransportOptions::CloudGateway { id, key, token, .. } = config.options() {
            assert_eq!(id.as_deref(), Some("1234"));
            assert_eq!(key.as_deref(), Some("k"));
            assert_eq!(token.as_deref(), Some("t"));
        } else {
            panic!("Expected cloud gateway options");
        }
    }

    #[test]
    fn huge_polling_value_is_clamped() {
        let config = ApplianceConnectionConfig::from_node(
            &node(r#"{"method":"serialbridge","polling":"18446744073709551615"}"#),
            &NodeCredentials::default(),
        );
        assert_eq!(config.polling_interval(), MAX_POLLING_INTERVAL);

        let config = ApplianceConnectionConfig::serial_bridge("h", 23)
            .with_polling_interval(Duration::MAX);
        assert_eq!(config.polling_interval(), MAX_POLLING_INTERVAL);
    }

    #[test]
    fn zero_polling_falls_back_to_default() {
        let config = ApplianceConnectionConfig::serial_bridge("h", 23)
            .with_polling_interval(Duration::ZERO);
        assert_eq!(config.polling_interval(), DEFAULT_POLLING_INTERVAL);
        assert_eq!(
            normalize_polling_interval(Duration::from_secs(90)),
            Duration::from_secs(90)
        );
    }

    #[test]
    fn unknown_method_yields_empty_options() {
        for json in [r#"{"method":"bluetooth"}"#, "{}", r#"{"method":""}"#] {
            let config = ApplianceConnectionConfig::from_node(&node(json), &NodeCredentials::default());
            assert_eq!(config.method(), ConnectionMethod::Unset);
            assert!(config.options().is_empty());
            assert_eq!(config.options().communication_method(), None);
        }
    }

    #[test]
    fn selector_is_case_insensitive() {
        assert_eq!(
            ConnectionMethod::from_selector(Some("SerialBridge")),
            ConnectionMethod::SerialBridge
        );
        assert_eq!(
            ConnectionMethod::from_selector(Some("cloudGateway")),
            ConnectionMethod::CloudGateway
        );
        assert_eq!(ConnectionMethod::from_selector(None), ConnectionMethod::Unset);
    }

    #[test]
    fn polling_defaults_to_sixty_seconds() {
        let absent = ApplianceConnectionConfig::from_node(
            &node(r#"{"method":"serialbridge"}"#),
            &NodeCredentials::default(),
        );
        let zero = ApplianceConnectionConfig::from_node(
            &node(r#"{"method":"serialbridge","polling":0}"#),
            &NodeCredentials::default(),
        );

        assert_eq!(absent.polling_interval(), DEFAULT_POLLING_INTERVAL);
        assert_eq!(zero.polling_interval(), DEFAULT_POLLING_INTERVAL);
        assert_eq!(
            ApplianceConnectionConfig::unset()
                .with_polling_interval(Duration::ZERO)
                .polling_interval(),
            DEFAULT_POLLING_INTERVAL
        );
    }
}
