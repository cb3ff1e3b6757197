// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS require() implementation
//!
//! Every module record owns a [`ScopedRequire`] bound to the dependency map
//! of its descriptor. The bundle itself owns one more, the entry require,
//! which always loads the main module.

use crate::error::{LoaderError, Result};
use crate::module_system::descriptor::DescriptorId;
use crate::module_system::esm::EsModule;
use crate::module_system::loader;
use crate::module_system::record::ModuleRecord;
use crate::module_system::registry::Registry;
use crate::module_system::resolver;
use crate::value::Value;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;

enum Scope {
    /// Bundle entry: every request loads the main module
    Entry,
    /// Require owned by a module record
    Module {
        owner: Weak<ModuleRecord>,
        descriptor: DescriptorId,
        main: Weak<ModuleRecord>,
    },
}

/// A require function closed over one module's dependencies
pub struct ScopedRequire {
    registry: Weak<Registry>,
    scope: Scope,
    /// Host modules already fetched by this owner, by specifier
    foreign: Mutex<FxHashMap<String, Arc<ModuleRecord>>>,
}

impl ScopedRequire {
    /// Require for the entry context
    pub(crate) fn entry(registry: &Arc<Registry>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            scope: Scope::Entry,
            foreign: Mutex::new(FxHashMap::default()),
        }
    }

    pub(crate) fn for_module(
        registry: Weak<Registry>,
        owner: Weak<ModuleRecord>,
        descriptor: DescriptorId,
        main: Weak<ModuleRecord>,
    ) -> Self {
        Self {
            registry,
            scope: Scope::Module {
                owner,
                descriptor,
                main,
            },
            foreign: Mutex::new(FxHashMap::default()),
        }
    }

    fn registry(&self) -> Result<Arc<Registry>> {
        self.registry.upgrade().ok_or(LoaderError::BundleUnloaded)
    }

    /// `require(specifier)`: the exports of the resolved module
    pub fn require(&self, specifier: &str) -> Result<Value> {
        Ok(self.module(specifier)?.exports().clone())
    }

    /// `require._module(specifier)`: the module record itself, loading it on
    /// first use
    pub fn module(&self, specifier: &str) -> Result<Arc<ModuleRecord>> {
        let registry = self.registry()?;

        let (owner, descriptor, main) = match &self.scope {
            Scope::Entry => return loader::instantiate(&registry, registry.main_id(), None, None),
            Scope::Module {
                owner,
                descriptor,
                main,
            } => (
                owner.upgrade().ok_or(LoaderError::BundleUnloaded)?,
                *descriptor,
                main,
            ),
        };

        if let Some(&target) = registry.descriptor(descriptor).deps().get(specifier) {
            return loader::instantiate(&registry, target, Some(&owner), Some(main.clone()));
        }

        self.foreign_module(&registry, &owner, specifier)
    }

    fn foreign_module(
        &self,
        registry: &Registry,
        owner: &ModuleRecord,
        specifier: &str,
    ) -> Result<Arc<ModuleRecord>> {
        if let Some(module) = self.foreign.lock().get(specifier) {
            trace!("Foreign cache hit for '{}' in {}", specifier, owner.filename());
            return Ok(Arc::clone(module));
        }

        let host_module = loader::resolve_foreign(registry, owner.filename(), specifier)?;
        let module = ModuleRecord::foreign(specifier, host_module);

        let mut foreign = self.foreign.lock();
        Ok(Arc::clone(
            foreign.entry(specifier.to_string()).or_insert(module),
        ))
    }

    /// `require._esModule(specifier)`: default-import view of a module
    pub fn es_module(&self, specifier: &str) -> Result<EsModule> {
        Ok(EsModule::from_record(self.module(specifier)?))
    }

    /// `require.main`: the entry module record, once it exists
    pub fn main(&self) -> Option<Arc<ModuleRecord>> {
        match &self.scope {
            Scope::Entry => self.registry.upgrade()?.main().module(),
            Scope::Module { main, .. } => main.upgrade(),
        }
    }

    /// `require.resolve(specifier)`: the key a specifier maps to, without
    /// loading anything
    pub fn resolve(&self, specifier: &str) -> Result<String> {
        let registry = self.registry()?;

        let (owner, descriptor) = match &self.scope {
            Scope::Entry => return Ok(registry.main().filename().to_string()),
            Scope::Module {
                owner, descriptor, ..
            } => (owner.upgrade().ok_or(LoaderError::BundleUnloaded)?, *descriptor),
        };

        if let Some(&target) = registry.descriptor(descriptor).deps().get(specifier) {
            return Ok(registry.descriptor(target).filename().to_string());
        }
        if resolver::is_relative(specifier) {
            return Ok(resolver::resolve(owner.filename(), specifier));
        }
        Ok(specifier.to_string())
    }

    /// Specifiers this require resolves inside the bundle
    pub fn dependencies(&self) -> Vec<String> {
        let Scope::Module { descriptor, .. } = &self.scope else {
            return Vec::new();
        };
        let Some(registry) = self.registry.upgrade() else {
            return Vec::new();
        };
        let mut specifiers: Vec<String> = registry
            .descriptor(*descriptor)
            .deps()
            .keys()
            .cloned()
            .collect();
        specifiers.sort();
        specifiers
    }

    /// Whether this is the bundle's entry require
    pub fn is_entry(&self) -> bool {
        matches!(self.scope, Scope::Entry)
    }
}

impl fmt::Debug for ScopedRequire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = match &self.scope {
            Scope::Entry => None,
            Scope::Module { owner, .. } => owner.upgrade().map(|o| o.filename().to_string()),
        };
        f.debug_struct("ScopedRequire")
            .field("entry", &self.is_entry())
            .field("owner", &owner)
            .field("foreign", &self.foreign.try_lock().map(|cache| cache.len()))
            .finish()
    }
}
