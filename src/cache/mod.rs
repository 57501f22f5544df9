// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persisted cache for discovered device lists.
//!
//! The cache lives in a `midea-hvac` directory under the host's user
//! directory. Discovered devices are stored under the single key
//! [`DEVICES_KEY`].

mod store;

use std::path::{Path, PathBuf};

pub use store::DeviceCache;

/// Key under which the discovered device list is stored.
pub const DEVICES_KEY: &str = "devices";

/// Name of the cache directory inside the user directory.
pub const CACHE_DIR_NAME: &str = "midea-hvac";

/// Host user directory used when none is configured, relative to home.
const DEFAULT_USER_DIR: &str = ".node-red";

/// Resolves the cache directory.
///
/// Uses `<user_dir>/midea-hvac` when the host provides a user directory,
/// otherwise `~/.node-red/midea-hvac`. Without a home directory the path is
/// relative to the working directory.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use midea_hvac::cache::resolve_cache_dir;
///
/// assert_eq!(
///     resolve_cache_dir(Some(Path::new("/data"))),
///     PathBuf::from("/data/midea-hvac")
/// );
/// ```
#[must_use]
pub fn resolve_cache_dir(user_dir: Option<&Path>) -> PathBuf {
    let user_dir = match user_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::home_dir().map_or_else(
            || PathBuf::from(DEFAULT_USER_DIR),
            |home| home.join(DEFAULT_USER_DIR),
        ),
    };
    user_dir.join(CACHE_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_configured_user_dir() {
        let dir = resolve_cache_dir(Some(Path::new("/srv/node-red")));
        assert_eq!(dir, PathBuf::from("/srv/node-red/midea-hvac"));
    }

    #[test]
    fn falls_back_to_home() {
        let dir = resolve_cache_dir(None);

        assert!(dir.ends_with(".node-red/midea-hvac"));
        if let Some(home) = dirs::home_dir() {
            assert!(dir.starts_with(home));
        }
    }
}
