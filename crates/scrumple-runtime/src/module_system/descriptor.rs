// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Factory descriptors: one per bundled source module

use crate::module_system::esm::{ImportMeta, InteropKind};
use crate::module_system::record::ModuleRecord;
use crate::module_system::require::ScopedRequire;
use crate::value::Object;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Index of a descriptor inside its registry
pub type DescriptorId = usize;

/// Everything a module body receives when it runs
pub struct FactoryScope<'a> {
    /// The module's own record
    pub module: &'a Arc<ModuleRecord>,
    /// The module's exports object
    pub exports: &'a Object,
    /// The module's scoped require
    pub require: &'a ScopedRequire,
    /// Module filename (`__filename`)
    pub filename: &'a str,
    /// Containing directory (`__dirname`)
    pub dirname: &'a str,
    /// import.meta
    pub meta: &'a ImportMeta,
}

/// Executable body of a bundled module
pub trait ModuleFactory: Send + Sync {
    /// Run the body once, populating `scope.exports`
    fn call(&self, scope: &FactoryScope<'_>) -> anyhow::Result<()>;
}

impl<F> ModuleFactory for F
where
    F: Fn(&FactoryScope<'_>) -> anyhow::Result<()> + Send + Sync,
{
    fn call(&self, scope: &FactoryScope<'_>) -> anyhow::Result<()> {
        self(scope)
    }
}

/// Box a closure as a shareable factory
pub fn factory<F>(body: F) -> Arc<dyn ModuleFactory>
where
    F: Fn(&FactoryScope<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(body)
}

/// Factory that leaves its exports empty
pub(crate) fn noop_factory() -> Arc<dyn ModuleFactory> {
    factory(|_| Ok(()))
}

/// A linked module entry.
///
/// Dependencies point at other descriptors of the same registry by index.
/// The `module` slot is the per-descriptor initialization guard: it is
/// written once, by the first require that reaches this descriptor.
pub struct FactoryDescriptor {
    id: DescriptorId,
    key: String,
    filename: String,
    deps: FxHashMap<String, DescriptorId>,
    body: Arc<dyn ModuleFactory>,
    interop: InteropKind,
    module: Mutex<Option<Arc<ModuleRecord>>>,
}

impl FactoryDescriptor {
    pub(crate) fn new(
        id: DescriptorId,
        key: String,
        filename: String,
        deps: FxHashMap<String, DescriptorId>,
        body: Arc<dyn ModuleFactory>,
        interop: InteropKind,
    ) -> Self {
        Self {
            id,
            key,
            filename,
            deps,
            body,
            interop,
            module: Mutex::new(None),
        }
    }

    /// Registry index
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    /// Bundle key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Module filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Local dependency map (specifier to descriptor index)
    pub fn deps(&self) -> &FxHashMap<String, DescriptorId> {
        &self.deps
    }

    /// Export shape chosen by the bundler
    pub fn interop(&self) -> InteropKind {
        self.interop
    }

    /// The cached record, if this descriptor has been instantiated
    pub fn module(&self) -> Option<Arc<ModuleRecord>> {
        self.module.lock().clone()
    }

    pub(crate) fn body(&self) -> &Arc<dyn ModuleFactory> {
        &self.body
    }

    pub(crate) fn slot(&self) -> &Mutex<Option<Arc<ModuleRecord>>> {
        &self.module
    }
}

impl fmt::Debug for FactoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryDescriptor")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("filename", &self.filename)
            .field("deps", &self.deps)
            .field("interop", &self.interop)
            .field("instantiated", &self.module.try_lock().map(|slot| slot.is_some()))
            .finish()
    }
}
