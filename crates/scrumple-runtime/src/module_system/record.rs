// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module records: the runtime identity of a loaded module

use crate::module_system::cache::HostModule;
use crate::module_system::descriptor::FactoryDescriptor;
use crate::module_system::esm::InteropKind;
use crate::module_system::registry::Registry;
use crate::module_system::require::ScopedRequire;
use crate::value::{Object, Value};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// One loaded module instance
pub struct ModuleRecord {
    /// The module's filename
    filename: String,
    /// The module's id (same as filename)
    id: String,
    /// Whether the body ran to completion
    loaded: AtomicBool,
    /// Module that first required this one
    parent: Weak<ModuleRecord>,
    /// Modules first required by this one, in require order
    children: Mutex<Vec<Arc<ModuleRecord>>>,
    /// Exports; the handle never changes after creation
    exports: Value,
    /// Export shape
    interop: InteropKind,
    /// Scoped require, set right after creation; foreign wrappers have none
    require: OnceLock<Arc<ScopedRequire>>,
}

impl ModuleRecord {
    /// Create the record for a bundled module.
    ///
    /// Returns the exports handle and the scoped require alongside the record
    /// so the caller can pass them to the body. `main` is `None` only for the
    /// entry module, which then becomes its own main.
    pub(crate) fn local(
        registry: Weak<Registry>,
        descriptor: &FactoryDescriptor,
        parent: Option<&Arc<ModuleRecord>>,
        main: Option<Weak<ModuleRecord>>,
    ) -> (Arc<Self>, Object, Arc<ScopedRequire>) {
        let exports = Object::new();
        let record = Arc::new(Self {
            filename: descriptor.filename().to_string(),
            id: descriptor.filename().to_string(),
            loaded: AtomicBool::new(false),
            parent: parent.map(Arc::downgrade).unwrap_or_default(),
            children: Mutex::new(Vec::new()),
            exports: Value::Object(exports.clone()),
            interop: descriptor.interop(),
            require: OnceLock::new(),
        });

        let owner = Arc::downgrade(&record);
        let main = main.unwrap_or_else(|| owner.clone());
        let require = Arc::new(ScopedRequire::for_module(
            registry,
            owner,
            descriptor.id(),
            main,
        ));
        // Fresh lock, nothing else can have set it
        let _ = record.require.set(Arc::clone(&require));

        (record, exports, require)
    }

    /// Wrap a module produced by the host.
    ///
    /// Foreign wrappers are complete on creation and take no part in the
    /// parent/child graph.
    pub(crate) fn foreign(specifier: &str, module: HostModule) -> Arc<Self> {
        Arc::new(Self {
            filename: specifier.to_string(),
            id: specifier.to_string(),
            loaded: AtomicBool::new(true),
            parent: Weak::new(),
            children: Mutex::new(Vec::new()),
            exports: module.exports,
            interop: module.interop,
            require: OnceLock::new(),
        })
    }

    /// The module's filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The module's id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the module body finished without error
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// The module that first required this one
    pub fn parent(&self) -> Option<Arc<ModuleRecord>> {
        self.parent.upgrade()
    }

    /// Snapshot of child modules in first-require order
    pub fn children(&self) -> Vec<Arc<ModuleRecord>> {
        self.children.lock().clone()
    }

    /// The module's exports
    pub fn exports(&self) -> &Value {
        &self.exports
    }

    /// Export shape
    pub fn interop(&self) -> InteropKind {
        self.interop
    }

    /// The module's scoped require
    pub fn require(&self) -> Option<&ScopedRequire> {
        self.require.get().map(Arc::as_ref)
    }

    /// Whether this record wraps a host module
    pub fn is_foreign(&self) -> bool {
        self.require.get().is_none()
    }

    pub(crate) fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::Release);
    }

    pub(crate) fn add_child(&self, child: Arc<ModuleRecord>) {
        self.children.lock().push(child);
    }
}

// Parent and children form cycles; print names only.
impl fmt::Debug for ModuleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<String> = self
            .children
            .lock()
            .iter()
            .map(|child| child.filename.clone())
            .collect();
        f.debug_struct("ModuleRecord")
            .field("filename", &self.filename)
            .field("loaded", &self.is_loaded())
            .field("parent", &self.parent.upgrade().map(|p| p.filename.clone()))
            .field("children", &children)
            .field("interop", &self.interop)
            .finish()
    }
}
