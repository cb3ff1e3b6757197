// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! An installed bundle and its entry point

use crate::config::BundleConfig;
use crate::error::Result;
use crate::manifest::BundleManifest;
use crate::module_system::{BundleTable, ModuleFactory, ModuleRecord, Registry, ScopedRequire};
use crate::value::Value;
use std::sync::Arc;
use tracing::{info, instrument};

/// A bundle: the linked registry plus the entry require.
///
/// Independent bundles share no state. Dropping the bundle releases every
/// module record it created.
///
/// Export objects are reference counted handles. Objects that point at each
/// other, such as two modules storing each other's exports, keep one another
/// alive after the bundle is gone; break such links by hand if that matters.
pub struct Bundle {
    /// Linked module table
    registry: Arc<Registry>,
    /// Require for the entry context
    entry: ScopedRequire,
}

impl Bundle {
    /// Install a bundle table
    pub fn install(table: BundleTable) -> Result<Self> {
        let registry = Registry::install(table)?;
        let entry = ScopedRequire::entry(&registry);
        Ok(Self { registry, entry })
    }

    /// Install from a JSON manifest and the factory bodies it names
    pub fn from_manifest<I, K>(json: &str, bodies: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Arc<dyn ModuleFactory>)>,
        K: Into<String>,
    {
        let table = BundleManifest::from_json(json)?.into_table(bodies)?;
        Self::install(table)
    }

    /// Run the entry module and return its record.
    ///
    /// The entry module runs once; later calls return the cached record,
    /// complete or not.
    #[instrument(skip_all, fields(main = %self.registry.main().key()))]
    pub fn run(&self) -> Result<Arc<ModuleRecord>> {
        let fresh = self.registry.main().module().is_none();
        let module = self.entry.module(self.registry.main().key())?;
        if fresh {
            info!("Bundle entry {} loaded", module.filename());
        }
        Ok(module)
    }

    /// Run the entry module and return its exports
    pub fn exports(&self) -> Result<Value> {
        Ok(self.run()?.exports().clone())
    }

    /// The entry require
    pub fn entry_require(&self) -> &ScopedRequire {
        &self.entry
    }

    /// The entry module record, if it has been instantiated
    pub fn main_module(&self) -> Option<Arc<ModuleRecord>> {
        self.registry.main().module()
    }

    /// The cached record for a bundle key, if instantiated
    pub fn module(&self, key: &str) -> Option<Arc<ModuleRecord>> {
        self.registry.lookup(key).and_then(|descriptor| descriptor.module())
    }

    /// The linked registry
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &BundleConfig {
        self.registry.config()
    }
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("main", &self.registry.main().key())
            .field("modules", &self.registry.len())
            .field("config", self.registry.config())
            .finish()
    }
}
