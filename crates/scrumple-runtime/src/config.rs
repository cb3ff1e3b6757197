// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bundle configuration.

use serde::{Deserialize, Serialize};

/// Configuration applied when a bundle table is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleConfig {
    /// Reject dependency edges whose target key is missing from the table.
    ///
    /// When disabled the edge is dropped and the specifier is treated as
    /// foreign at run time.
    pub strict_dependencies: bool,

    /// Consult the host resolver for foreign specifiers
    pub host_fallback: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            strict_dependencies: true,
            host_fallback: true,
        }
    }
}

impl BundleConfig {
    /// Set dependency strictness
    pub fn strict_dependencies(mut self, strict: bool) -> Self {
        self.strict_dependencies = strict;
        self
    }

    /// Enable or disable host fallback
    pub fn host_fallback(mut self, enabled: bool) -> Self {
        self.host_fallback = enabled;
        self
    }
}
