// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Table of host-level modules, keyed by filename or package name

use crate::module_system::esm::InteropKind;
use crate::value::{Object, Value};
use dashmap::DashMap;

/// A module materialized outside the bundle
#[derive(Debug, Clone)]
pub struct HostModule {
    /// The module's exports
    pub exports: Value,
    /// Export shape, as declared by whoever produced the module
    pub interop: InteropKind,
}

impl HostModule {
    /// A plain CommonJS-shaped module
    pub fn new(exports: impl Into<Value>) -> Self {
        Self {
            exports: exports.into(),
            interop: InteropKind::CommonJs,
        }
    }

    /// A module whose exports already carry a `default` member
    pub fn es_module(exports: impl Into<Value>) -> Self {
        Self {
            exports: exports.into(),
            interop: InteropKind::EsModule,
        }
    }
}

impl From<Value> for HostModule {
    fn from(exports: Value) -> Self {
        Self::new(exports)
    }
}

impl From<Object> for HostModule {
    fn from(exports: Object) -> Self {
        Self::new(exports)
    }
}

/// Thread-safe table of host modules
#[derive(Debug, Default)]
pub struct HostModuleCache {
    cache: DashMap<String, HostModule>,
}

impl HostModuleCache {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Get a module by key
    pub fn get(&self, key: &str) -> Option<HostModule> {
        self.cache.get(key).map(|entry| entry.clone())
    }

    /// Check if a module is present
    pub fn has(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Add a module to the table
    pub fn set(&self, key: impl Into<String>, module: impl Into<HostModule>) {
        self.cache.insert(key.into(), module.into());
    }

    /// Get all keys
    pub fn keys(&self) -> Vec<String> {
        self.cache.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of modules
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object;

    #[test]
    fn test_set_and_get() {
        let cache = HostModuleCache::new();
        assert!(cache.is_empty());

        let exports = object! { "sep" => "/" };
        cache.set("path", Value::from(exports.clone()));

        assert!(cache.has("path"));
        assert!(!cache.has("fs"));
        let module = cache.get("path").unwrap();
        assert!(module.exports.as_object().unwrap().ptr_eq(&exports));
        assert_eq!(module.interop, InteropKind::CommonJs);
        assert_eq!(cache.keys(), vec!["path".to_string()]);
    }

    #[test]
    fn test_es_module_flag() {
        let cache = HostModuleCache::new();
        cache.set("esm-lib", HostModule::es_module(object! { "default" => 1 }));
        assert_eq!(cache.get("esm-lib").unwrap().interop, InteropKind::EsModule);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_object_converts_to_host_module() {
        let exports = object! { "platform" => "linux" };
        let cache = HostModuleCache::new();
        cache.set("os", exports.clone());

        let module = cache.get("os").unwrap();
        assert_eq!(module.exports, Value::from(exports));
        assert_eq!(module.interop, InteropKind::CommonJs);
    }
}
