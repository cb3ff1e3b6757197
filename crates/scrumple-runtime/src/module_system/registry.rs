// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module registry: the installed bundle table

use crate::config::BundleConfig;
use crate::error::{LoaderError, Result};
use crate::module_system::cache::{HostModule, HostModuleCache};
use crate::module_system::descriptor::{
    factory, noop_factory, DescriptorId, FactoryDescriptor, FactoryScope, ModuleFactory,
};
use crate::module_system::esm::InteropKind;
use crate::module_system::host::{HostResolver, NoHost};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Target of a dependency edge in the input table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// Another module of the table, by key
    Module(String),
    /// Replaced by an empty module
    Ignored,
}

/// One module of the input table, before linking
pub struct ModuleDef {
    filename: String,
    deps: Vec<(String, Dependency)>,
    body: Arc<dyn ModuleFactory>,
    interop: InteropKind,
}

impl ModuleDef {
    /// Define a module from a closure body
    pub fn new<F>(filename: impl Into<String>, body: F) -> Self
    where
        F: Fn(&FactoryScope<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::from_factory(filename, factory(body))
    }

    /// Define a module from a shared factory
    pub fn from_factory(filename: impl Into<String>, body: Arc<dyn ModuleFactory>) -> Self {
        Self {
            filename: filename.into(),
            deps: Vec::new(),
            body,
            interop: InteropKind::CommonJs,
        }
    }

    /// Declare a local dependency
    pub fn dep(mut self, specifier: impl Into<String>, target: impl Into<String>) -> Self {
        self.deps
            .push((specifier.into(), Dependency::Module(target.into())));
        self
    }

    /// Declare a specifier that resolves to the empty module
    pub fn ignored_dep(mut self, specifier: impl Into<String>) -> Self {
        self.deps.push((specifier.into(), Dependency::Ignored));
        self
    }

    /// Set the export shape
    pub fn interop(mut self, interop: InteropKind) -> Self {
        self.interop = interop;
        self
    }

    /// Mark the exports as ES module shaped
    pub fn es_module(self) -> Self {
        self.interop(InteropKind::EsModule)
    }

    pub(crate) fn push_dependency(&mut self, specifier: String, target: Dependency) {
        self.deps.push((specifier, target));
    }
}

/// The externally generated bundle table
pub struct BundleTable {
    modules: Vec<(String, ModuleDef)>,
    main: Option<String>,
    files: HostModuleCache,
    config: BundleConfig,
    host: Arc<dyn HostResolver>,
}

impl Default for BundleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            main: None,
            files: HostModuleCache::new(),
            config: BundleConfig::default(),
            host: Arc::new(NoHost),
        }
    }

    /// Add a module under `key`
    pub fn module(mut self, key: impl Into<String>, def: ModuleDef) -> Self {
        self.modules.push((key.into(), def));
        self
    }

    /// Designate the entry module
    pub fn main(mut self, key: impl Into<String>) -> Self {
        self.main = Some(key.into());
        self
    }

    /// Provide an already materialized module under a filename
    pub fn file(self, filename: impl Into<String>, module: impl Into<HostModule>) -> Self {
        self.files.set(filename, module);
        self
    }

    /// Replace the configuration
    pub fn config(mut self, config: BundleConfig) -> Self {
        self.config = config;
        self
    }

    /// Install the host fallback resolver
    pub fn host<H>(mut self, host: H) -> Self
    where
        H: HostResolver + 'static,
    {
        self.host = Arc::new(host);
        self
    }

    /// Install a closure as the host fallback resolver
    pub fn host_fn<F>(self, host: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<HostModule> + Send + Sync + 'static,
    {
        self.host(host)
    }
}

/// Linked, immutable module table.
///
/// Only the per-descriptor record slots change after installation.
pub struct Registry {
    descriptors: Vec<FactoryDescriptor>,
    keys: FxHashMap<String, DescriptorId>,
    main: DescriptorId,
    files: HostModuleCache,
    config: BundleConfig,
    host: Arc<dyn HostResolver>,
}

impl Registry {
    /// Link a table into a registry
    pub fn install(table: BundleTable) -> Result<Arc<Self>> {
        let BundleTable {
            modules,
            main,
            files,
            config,
            host,
        } = table;

        let mut keys = FxHashMap::default();
        for (id, (key, _)) in modules.iter().enumerate() {
            if keys.insert(key.clone(), id).is_some() {
                return Err(LoaderError::DuplicateModule(key.clone()));
            }
        }

        let main_key = main.ok_or(LoaderError::NoEntry)?;
        let main = *keys
            .get(&main_key)
            .ok_or_else(|| LoaderError::UnknownModule(main_key.clone()))?;

        // The shared empty module goes after every table entry
        let ignored_id = modules.len();
        let mut uses_ignored = false;
        let mut descriptors = Vec::with_capacity(modules.len() + 1);

        for (id, (key, def)) in modules.into_iter().enumerate() {
            let mut deps = FxHashMap::default();
            for (specifier, target) in def.deps {
                match target {
                    Dependency::Module(target) => match keys.get(&target) {
                        Some(&target_id) => {
                            deps.insert(specifier, target_id);
                        }
                        None if config.strict_dependencies => {
                            return Err(LoaderError::DanglingDependency {
                                module: key,
                                specifier,
                                target,
                            });
                        }
                        None => {
                            warn!(
                                "Dropping dependency '{}' of {}: unknown module '{}'",
                                specifier, key, target
                            );
                        }
                    },
                    Dependency::Ignored => {
                        uses_ignored = true;
                        deps.insert(specifier, ignored_id);
                    }
                }
            }
            descriptors.push(FactoryDescriptor::new(
                id,
                key,
                def.filename,
                deps,
                def.body,
                def.interop,
            ));
        }

        if uses_ignored {
            descriptors.push(FactoryDescriptor::new(
                ignored_id,
                String::new(),
                String::new(),
                FxHashMap::default(),
                noop_factory(),
                InteropKind::CommonJs,
            ));
        }

        debug!(
            "Installed bundle with {} modules, entry {}",
            keys.len(),
            main_key
        );

        Ok(Arc::new(Self {
            descriptors,
            keys,
            main,
            files,
            config,
            host,
        }))
    }

    /// Descriptor by index
    pub fn descriptor(&self, id: DescriptorId) -> &FactoryDescriptor {
        &self.descriptors[id]
    }

    /// Descriptor by bundle key
    pub fn lookup(&self, key: &str) -> Option<&FactoryDescriptor> {
        self.keys.get(key).map(|&id| &self.descriptors[id])
    }

    /// The entry descriptor
    pub fn main(&self) -> &FactoryDescriptor {
        &self.descriptors[self.main]
    }

    pub(crate) fn main_id(&self) -> DescriptorId {
        self.main
    }

    /// All bundle keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Number of table entries
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the table is empty (never true for an installed bundle)
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Host modules reachable by filename
    pub fn files(&self) -> &HostModuleCache {
        &self.files
    }

    /// Active configuration
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// The host fallback resolver
    pub fn host(&self) -> &dyn HostResolver {
        self.host.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty(filename: &str) -> ModuleDef {
        ModuleDef::new(filename, |_| Ok(()))
    }

    #[test]
    fn test_install_links_dependencies() {
        let table = BundleTable::new()
            .module("/a.js", empty("/a.js").dep("./b", "/b.js"))
            .module("/b.js", empty("/b.js"))
            .main("/a.js");
        let registry = Registry::install(table).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.main().key(), "/a.js");
        let b = registry.lookup("/b.js").unwrap();
        assert_eq!(registry.main().deps().get("./b"), Some(&b.id()));
        assert!(b.module().is_none());
    }

    #[test]
    fn test_missing_main() {
        let table = BundleTable::new().module("/a.js", empty("/a.js"));
        assert!(matches!(
            Registry::install(table),
            Err(LoaderError::NoEntry)
        ));

        let table = BundleTable::new()
            .module("/a.js", empty("/a.js"))
            .main("/nope.js");
        assert!(matches!(
            Registry::install(table),
            Err(LoaderError::UnknownModule(key)) if key == "/nope.js"
        ));
    }

    #[test]
    fn test_duplicate_key() {
        let table = BundleTable::new()
            .module("/a.js", empty("/a.js"))
            .module("/a.js", empty("/a.js"))
            .main("/a.js");
        assert!(matches!(
            Registry::install(table),
            Err(LoaderError::DuplicateModule(key)) if key == "/a.js"
        ));
    }

    #[test]
    fn test_dangling_dependency_strict() {
        let table = BundleTable::new()
            .module("/a.js", empty("/a.js").dep("./gone", "/gone.js"))
            .main("/a.js");
        match Registry::install(table) {
            Err(LoaderError::DanglingDependency {
                module,
                specifier,
                target,
            }) => {
                assert_eq!(module, "/a.js");
                assert_eq!(specifier, "./gone");
                assert_eq!(target, "/gone.js");
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_dangling_dependency_lenient() {
        let table = BundleTable::new()
            .module("/a.js", empty("/a.js").dep("./gone", "/gone.js"))
            .main("/a.js")
            .config(BundleConfig::default().strict_dependencies(false));
        let registry = Registry::install(table).unwrap();
        assert!(registry.main().deps().is_empty());
    }

    #[test]
    fn test_ignored_descriptor_is_shared() {
        let table = BundleTable::new()
            .module(
                "/a.js",
                empty("/a.js").ignored_dep("fs").dep("./b", "/b.js"),
            )
            .module("/b.js", empty("/b.js").ignored_dep("net"))
            .main("/a.js");
        let registry = Registry::install(table).unwrap();

        let a_fs = registry.main().deps()["fs"];
        let b_net = registry.lookup("/b.js").unwrap().deps()["net"];
        assert_eq!(a_fs, b_net);
        assert_eq!(registry.descriptor(a_fs).filename(), "");
        // The empty module is not addressable by key
        assert_eq!(registry.len(), 2);
    }
}
