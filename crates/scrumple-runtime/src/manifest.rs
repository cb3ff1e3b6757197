// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! JSON bundle manifest
//!
//! The bundler describes the module graph as data. Bodies are code, so
//! they are paired with the manifest by key when building the table.

use crate::config::BundleConfig;
use crate::error::{LoaderError, Result};
use crate::module_system::{BundleTable, Dependency, InteropKind, ModuleDef, ModuleFactory};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::Arc;
use tracing::warn;

/// Parsed bundle manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    /// Key of the entry module
    pub main: String,
    /// Installation options
    #[serde(default)]
    pub config: BundleConfig,
    /// Modules by bundle key
    pub modules: IndexMap<String, ManifestEntry>,
}

/// One module in the manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Module filename; defaults to the bundle key
    pub filename: Option<String>,
    /// Local dependencies by specifier
    pub deps: IndexMap<String, DepTarget>,
    /// Whether exports already have the ES module shape
    pub es_module: bool,
}

/// Dependency target: a bundle key, or `false` for an ignored module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDepTarget", into = "RawDepTarget")]
pub enum DepTarget {
    /// Another module, by key
    Module(String),
    /// Empty module substitute
    Ignored,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawDepTarget {
    Key(String),
    Flag(bool),
}

impl TryFrom<RawDepTarget> for DepTarget {
    type Error = String;

    fn try_from(raw: RawDepTarget) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawDepTarget::Key(key) => Ok(DepTarget::Module(key)),
            RawDepTarget::Flag(false) => Ok(DepTarget::Ignored),
            RawDepTarget::Flag(true) => {
                Err("dependency target must be a module key or false".to_string())
            }
        }
    }
}

impl From<DepTarget> for RawDepTarget {
    fn from(target: DepTarget) -> Self {
        match target {
            DepTarget::Module(key) => RawDepTarget::Key(key),
            DepTarget::Ignored => RawDepTarget::Flag(false),
        }
    }
}

impl From<DepTarget> for Dependency {
    fn from(target: DepTarget) -> Self {
        match target {
            DepTarget::Module(key) => Dependency::Module(key),
            DepTarget::Ignored => Dependency::Ignored,
        }
    }
}

impl BundleManifest {
    /// Parse a manifest from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a manifest from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serialize back to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Pair every module with its body and build the input table
    pub fn into_table<I, K>(self, bodies: I) -> Result<BundleTable>
    where
        I: IntoIterator<Item = (K, Arc<dyn ModuleFactory>)>,
        K: Into<String>,
    {
        let mut bodies: FxHashMap<String, Arc<dyn ModuleFactory>> = bodies
            .into_iter()
            .map(|(key, body)| (key.into(), body))
            .collect();

        let mut table = BundleTable::new().main(self.main).config(self.config);

        for (key, entry) in self.modules {
            let body = bodies
                .remove(&key)
                .ok_or_else(|| LoaderError::MissingBody(key.clone()))?;
            let filename = entry.filename.unwrap_or_else(|| key.clone());

            let mut def = ModuleDef::from_factory(filename, body)
                .interop(InteropKind::from_flag(entry.es_module));
            for (specifier, target) in entry.deps {
                def.push_dependency(specifier, target.into());
            }
            table = table.module(key, def);
        }

        for key in bodies.keys() {
            warn!("Factory body for '{}' has no manifest entry", key);
        }

        Ok(table)
    }
}
