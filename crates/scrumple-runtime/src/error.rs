// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the bundle runtime

use thiserror::Error;

/// Result type for loader operations
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Errors that can occur while installing or running a bundle
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Foreign specifier the host could not resolve either
    #[error("Cannot find module '{specifier}' required from '{from}': {reason}")]
    UnresolvableSpecifier {
        /// Module specifier
        specifier: String,
        /// Filename of the requiring module (empty in the entry context)
        from: String,
        /// Reason reported by the host
        reason: String,
    },

    /// A module body failed during its only execution
    #[error("Error while executing module '{filename}': {source}")]
    FactoryFailed {
        /// Filename of the failing module
        filename: String,
        /// Underlying failure raised by the body
        #[source]
        source: anyhow::Error,
    },

    /// The bundle table does not designate an entry module
    #[error("Bundle has no entry module")]
    NoEntry,

    /// A key is not present in the bundle table
    #[error("Module '{0}' is not in the bundle table")]
    UnknownModule(String),

    /// A key was registered twice
    #[error("Module '{0}' is registered more than once")]
    DuplicateModule(String),

    /// A dependency edge points at a key missing from the table
    #[error("Dependency '{specifier}' of '{module}' points at unknown module '{target}'")]
    DanglingDependency {
        /// Key of the declaring module
        module: String,
        /// Specifier used by the declaring module
        specifier: String,
        /// Missing target key
        target: String,
    },

    /// A manifest entry has no factory body
    #[error("No factory body registered for module '{0}'")]
    MissingBody(String),

    /// Manifest could not be parsed
    #[error("Manifest parse error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// The owning bundle was dropped
    #[error("Bundle has been unloaded")]
    BundleUnloaded,
}

impl LoaderError {
    /// Create an unresolvable specifier error
    pub fn unresolvable(
        specifier: impl Into<String>,
        from: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnresolvableSpecifier {
            specifier: specifier.into(),
            from: from.into(),
            reason: reason.into(),
        }
    }

    /// Classify an error raised by a module body.
    ///
    /// Loader errors bubbling out of a nested require pass through untouched;
    /// anything else is attributed to `filename`.
    pub fn from_factory(filename: &str, err: anyhow::Error) -> Self {
        match err.downcast::<LoaderError>() {
            Ok(loader_err) => loader_err,
            Err(source) => Self::FactoryFailed {
                filename: filename.to_string(),
                source,
            },
        }
    }

    /// Whether this is an unresolvable specifier error
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Self::UnresolvableSpecifier { .. })
    }

    /// Whether this is a factory execution failure
    pub fn is_factory_failure(&self) -> bool {
        matches!(self, Self::FactoryFailed { .. })
    }
}
