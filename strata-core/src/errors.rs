use std::path::PathBuf;

use thiserror::Error;

use crate::config::Scope;

/// Error taxonomy for scope selection, document I/O, profile lookup, and
/// parameter coercion.
///
/// `ScopeConfig` and write-path `DocumentIo`/`DocumentFormat` are fatal to
/// the invocation. `ProfileNotFound` only fails profile-sourced lookups.
/// `ParamType` is always recovered inside the resolver by skipping the
/// offending source.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot locate {scope} scope: {reason}")]
    ScopeConfig { scope: Scope, reason: String },

    #[error("profile `{name}` of type `{profile_type}` not found in any active scope")]
    ProfileNotFound { profile_type: String, name: String },

    #[error("cannot coerce parameter `{param}` to {expected}: {reason}")]
    ParamType {
        param: String,
        expected: &'static str,
        reason: String,
    },

    #[error("failed to {action} {}: {source}", path.display())]
    DocumentIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config document at {}: {reason}", path.display())]
    DocumentFormat { path: PathBuf, reason: String },
}

impl ConfigError {
    pub fn profile_not_found(profile_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ProfileNotFound {
            profile_type: profile_type.into(),
            name: name.into(),
        }
    }
}
