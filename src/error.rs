// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `midea_hvac` library.
//!
//! The connection coordinator never returns these to its caller: appliance
//! failures are turned into a status update and a reported error. They are
//! surfaced directly only by the discovery path and by configuration parsing.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error raised by the appliance transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error raised by the on-disk device cache.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error raised while discovering appliances.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Error raised while reading host configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors reported by an appliance transport implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The session could not be created from the given options.
    #[error("cannot create session: {0}")]
    Creation(String),

    /// The transport options are missing a required parameter.
    #[error("missing transport parameter: {0}")]
    MissingParameter(&'static str),

    /// Connection to the appliance failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The appliance did not answer in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The session has already been destroyed.
    #[error("session is closed")]
    Closed,

    /// The appliance answered with something that could not be understood.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Errors related to the persisted device cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The path being accessed.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A stored entry could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The key cannot be used as a file name.
    #[error("invalid cache key: {0}")]
    InvalidKey(String),
}

impl CacheError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Errors raised by a discovery scan.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The cloud account rejected the credentials.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// No credentials were supplied or recoverable.
    #[error("missing credentials")]
    MissingCredentials,

    /// The scan itself failed.
    #[error("scan failed: {0}")]
    ScanFailed(String),

    /// The cache could not be read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Errors related to host configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is malformed.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
