// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host fallback resolution for specifiers outside the bundle

use crate::module_system::cache::{HostModule, HostModuleCache};
use anyhow::anyhow;

/// The embedding runtime's own module loader.
///
/// Called only for specifiers a module did not declare as local
/// dependencies. The loader never retries a failed request.
pub trait HostResolver: Send + Sync {
    /// Load `specifier` from the host
    fn require(&self, specifier: &str) -> anyhow::Result<HostModule>;
}

impl<F> HostResolver for F
where
    F: Fn(&str) -> anyhow::Result<HostModule> + Send + Sync,
{
    fn require(&self, specifier: &str) -> anyhow::Result<HostModule> {
        self(specifier)
    }
}

/// Host without a module system; every request fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl HostResolver for NoHost {
    fn require(&self, specifier: &str) -> anyhow::Result<HostModule> {
        Err(anyhow!("Could not resolve module name: {}", specifier))
    }
}

impl HostResolver for HostModuleCache {
    fn require(&self, specifier: &str) -> anyhow::Result<HostModule> {
        self.get(specifier)
            .ok_or_else(|| anyhow!("Could not resolve module name: {}", specifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_no_host_fails() {
        let err = NoHost.require("fs").unwrap_err();
        assert_eq!(err.to_string(), "Could not resolve module name: fs");
    }

    #[test]
    fn test_cache_as_host() {
        let host = HostModuleCache::new();
        host.set("os", Value::from("linux"));

        assert_eq!(host.require("os").unwrap().exports, Value::from("linux"));
        assert!(host.require("net").is_err());
    }

    #[test]
    fn test_closure_host() {
        let host = |specifier: &str| -> anyhow::Result<HostModule> {
            Ok(HostModule::new(Value::from(specifier)))
        };
        assert_eq!(host.require("x").unwrap().exports, Value::from("x"));
    }
}
