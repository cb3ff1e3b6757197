// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! ES module interop
//!
//! Bundled code performs "default imports" against CommonJS-shaped exports.
//! The bundler decides per module whether its exports already have the
//! ES module shape; this file turns that decision into a uniform view.

use crate::module_system::record::ModuleRecord;
use crate::module_system::resolver;
use crate::value::{Object, Value};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shape of a module's exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteropKind {
    /// Plain `module.exports` object
    #[default]
    CommonJs,
    /// Compiled from an ES module; `default` is already an own export
    EsModule,
}

impl InteropKind {
    /// Build from the manifest's `esModule` boolean
    pub fn from_flag(es_module: bool) -> Self {
        if es_module {
            InteropKind::EsModule
        } else {
            InteropKind::CommonJs
        }
    }

    /// Whether exports already have the native default shape
    pub fn is_es_module(self) -> bool {
        self == InteropKind::EsModule
    }
}

/// import.meta object handed to every factory body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportMeta {
    /// The `file://` URL of the current module
    pub url: String,
}

impl ImportMeta {
    /// Create import.meta for a module filename
    pub fn new(filename: &str) -> Self {
        Self {
            url: resolver::file_url(filename),
        }
    }

    /// Convert to a runtime value
    pub fn to_value(&self) -> Value {
        let obj = Object::new();
        obj.set("url", self.url.as_str());
        Value::Object(obj)
    }
}

/// Default-import view over a loaded module
#[derive(Debug, Clone)]
pub enum EsModule {
    /// Exports returned as-is
    Native(Value),
    /// Synthetic namespace whose `default` is the module's exports
    Wrapped(Arc<ModuleRecord>),
}

impl EsModule {
    /// View a loaded module according to its interop kind
    pub fn from_record(module: Arc<ModuleRecord>) -> Self {
        if module.interop().is_es_module() {
            EsModule::Native(module.exports().clone())
        } else {
            EsModule::Wrapped(module)
        }
    }

    /// The default export.
    ///
    /// For wrapped modules this is read on every call, so it always reflects
    /// the module's exports object, including while that module is still
    /// executing.
    pub fn default_export(&self) -> Value {
        match self {
            EsModule::Native(exports) => exports.get("default"),
            EsModule::Wrapped(module) => module.exports().clone(),
        }
    }

    /// Named member lookup (`import { name }`)
    pub fn get(&self, name: &str) -> Value {
        match self {
            EsModule::Native(exports) => exports.get(name),
            EsModule::Wrapped(module) if name == "default" => module.exports().clone(),
            EsModule::Wrapped(_) => Value::Undefined,
        }
    }

    /// Whether the exports were passed through unchanged
    pub fn is_native(&self) -> bool {
        matches!(self, EsModule::Native(_))
    }

    /// Materialize as a value
    pub fn to_value(&self) -> Value {
        match self {
            EsModule::Native(exports) => exports.clone(),
            EsModule::Wrapped(module) => {
                let namespace = Object::new();
                namespace.set("default", module.exports().clone());
                Value::Object(namespace)
            }
        }
    }
}
