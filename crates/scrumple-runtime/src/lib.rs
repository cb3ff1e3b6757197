// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # scrumple-runtime
//!
//! The runtime module loader for Scrumple bundles.
//!
//! A bundle is a table of module factories produced ahead of time by the
//! bundler. At run time this crate makes every factory behave like an
//! independently loaded CommonJS module:
//!
//! - Each module body runs at most once and is cached as a [`ModuleRecord`]
//! - Circular requires observe the same, partially filled exports object
//! - `parent` / `children` / `require.main` are tracked like Node.js does
//! - Specifiers outside the bundle are handed to a host [`HostResolver`]
//! - [`EsModule`] gives default-import views over CommonJS exports
//!
//! ## Quick Start
//!
//! ```
//! use scrumple_runtime::{Bundle, BundleTable, ModuleDef, Value};
//!
//! let table = BundleTable::new()
//!     .module(
//!         "/src/index.js",
//!         ModuleDef::new("/src/index.js", |scope| {
//!             let greeting = scope.require.require("./greeting")?;
//!             scope.exports.set("message", greeting.get("text"));
//!             Ok(())
//!         })
//!         .dep("./greeting", "/src/greeting.js"),
//!     )
//!     .module(
//!         "/src/greeting.js",
//!         ModuleDef::new("/src/greeting.js", |scope| {
//!             scope.exports.set("text", "hello");
//!             Ok(())
//!         }),
//!     )
//!     .main("/src/index.js");
//!
//! let bundle = Bundle::install(table)?;
//! let exports = bundle.exports()?;
//! assert_eq!(exports.get("message"), Value::from("hello"));
//! # Ok::<(), scrumple_runtime::LoaderError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

#[macro_use]
mod macros;

pub mod config;
pub mod error;
pub mod manifest;
pub mod module_system;
pub mod runtime;
pub mod value;

// Re-exports
pub use config::BundleConfig;
pub use error::{LoaderError, Result};
pub use manifest::{BundleManifest, DepTarget, ManifestEntry};
pub use module_system::{
    factory, BundleTable, Dependency, EsModule, FactoryScope, HostModule, HostModuleCache,
    HostResolver, ImportMeta, InteropKind, ModuleDef, ModuleFactory, ModuleRecord, NoHost,
    ScopedRequire,
};
pub use runtime::Bundle;
pub use value::{NativeFunction, Object, Value};

/// Version of the scrumple runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
