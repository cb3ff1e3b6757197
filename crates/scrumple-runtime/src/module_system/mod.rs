// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bundle module system
//!
//! Implements CommonJS `require()` over a pre-linked table of factories.
//!
//! - Each factory runs at most once, on first require
//! - Records are cached before their body runs, so cycles see partial exports
//! - Specifiers outside a module's dependency map go to the host resolver
//! - `_esModule`-style default-import views over CommonJS exports

mod cache;
mod descriptor;
pub mod esm;
mod host;
mod loader;
mod record;
mod registry;
mod require;
pub mod resolver;

pub use cache::{HostModule, HostModuleCache};
pub use descriptor::{factory, DescriptorId, FactoryDescriptor, FactoryScope, ModuleFactory};
pub use esm::{EsModule, ImportMeta, InteropKind};
pub use host::{HostResolver, NoHost};
pub use record::ModuleRecord;
pub use registry::{BundleTable, Dependency, ModuleDef, Registry};
pub use require::ScopedRequire;
pub use resolver::{dirname, file_url, resolve};
