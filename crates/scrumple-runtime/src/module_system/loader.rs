// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loader - instantiates descriptors and delegates foreign requests

use crate::error::{LoaderError, Result};
use crate::module_system::cache::HostModule;
use crate::module_system::descriptor::{DescriptorId, FactoryDescriptor, FactoryScope};
use crate::module_system::esm::ImportMeta;
use crate::module_system::record::ModuleRecord;
use crate::module_system::registry::Registry;
use crate::module_system::require::ScopedRequire;
use crate::module_system::resolver;
use crate::value::Object;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// Return the record for a descriptor, running its body on first use.
///
/// The record is cached before the body runs, so a require that comes back
/// around a cycle gets the in-progress record and its live exports. A body
/// that fails leaves the record cached but never loaded; it is not re-run.
pub(crate) fn instantiate(
    registry: &Arc<Registry>,
    id: DescriptorId,
    owner: Option<&Arc<ModuleRecord>>,
    main: Option<Weak<ModuleRecord>>,
) -> Result<Arc<ModuleRecord>> {
    let descriptor = registry.descriptor(id);

    let (module, exports, require) = {
        let mut slot = descriptor.slot().lock();
        if let Some(module) = slot.as_ref() {
            trace!("Cache hit for {}", descriptor.filename());
            return Ok(Arc::clone(module));
        }
        let (module, exports, require) =
            ModuleRecord::local(Arc::downgrade(registry), descriptor, owner, main);
        *slot = Some(Arc::clone(&module));
        (module, exports, require)
    };

    if let Some(owner) = owner {
        owner.add_child(Arc::clone(&module));
    }

    debug!(
        "Instantiating {} (required by {})",
        descriptor.filename(),
        owner.map(|o| o.filename()).unwrap_or("<entry>")
    );

    execute(descriptor, &module, &exports, &require)?;
    Ok(module)
}

fn execute(
    descriptor: &FactoryDescriptor,
    module: &Arc<ModuleRecord>,
    exports: &Object,
    require: &ScopedRequire,
) -> Result<()> {
    let filename = descriptor.filename();
    let meta = ImportMeta::new(filename);

    let scope = FactoryScope {
        module,
        exports,
        require,
        filename,
        dirname: resolver::dirname(filename),
        meta: &meta,
    };

    match descriptor.body().call(&scope) {
        Ok(()) => {
            module.mark_loaded();
            Ok(())
        }
        Err(err) => {
            warn!("Module {} did not finish loading: {}", filename, err);
            Err(LoaderError::from_factory(filename, err))
        }
    }
}

/// Find a module for a specifier that is not a local dependency.
///
/// Relative specifiers are first looked up in the registry's `files` table
/// under their resolved key; everything else goes to the host.
pub(crate) fn resolve_foreign(registry: &Registry, from: &str, specifier: &str) -> Result<HostModule> {
    if resolver::is_relative(specifier) {
        let key = resolver::resolve(from, specifier);
        if let Some(module) = registry.files().get(&key) {
            debug!("Resolved '{}' from {} to provided file {}", specifier, from, key);
            return Ok(module);
        }
    }

    if !registry.config().host_fallback {
        return Err(LoaderError::unresolvable(
            specifier,
            from,
            "host fallback is disabled",
        ));
    }

    debug!("Delegating '{}' from {} to host resolver", specifier, from);
    registry
        .host()
        .require(specifier)
        .map_err(|err| LoaderError::unresolvable(specifier, from, err.to_string()))
}
