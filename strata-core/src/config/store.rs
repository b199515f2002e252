use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{ConfigDocument, Scope, ScopeSelection};
use crate::errors::ConfigError;

#[derive(Copy, Clone)]
enum FileFormat {
    Json,
    Toml,
}

/// Loads and persists the backing document of each active scope.
///
/// Paths are fixed at construction: global from the user configuration
/// directory, local from the selection's discovered (or defaulted) project
/// path, file from the explicit path when one was given.
#[derive(Clone, Debug)]
pub struct ScopedDocumentStore {
    paths: BTreeMap<Scope, PathBuf>,
}

impl ScopedDocumentStore {
    pub fn for_selection(selection: &ScopeSelection) -> Self {
        let mut paths = BTreeMap::new();
        if let Some(path) = global_config_path() {
            paths.insert(Scope::Global, path);
        }
        paths.insert(Scope::Local, selection.local_path().to_path_buf());
        if let Some(path) = selection.file_path() {
            paths.insert(Scope::File, path.to_path_buf());
        }
        Self { paths }
    }

    /// Store over explicit per-scope paths; used by tests and by callers
    /// that manage their own layout.
    pub fn with_paths(paths: BTreeMap<Scope, PathBuf>) -> Self {
        Self { paths }
    }

    pub fn locate(&self, scope: Scope) -> Result<&Path, ConfigError> {
        self.paths
            .get(&scope)
            .map(PathBuf::as_path)
            .ok_or_else(|| ConfigError::ScopeConfig {
                scope,
                reason: match scope {
                    Scope::File => "no explicit file path was supplied".to_string(),
                    Scope::Global => "no user configuration directory could be determined".to_string(),
                    Scope::Local => "no local path was selected".to_string(),
                },
            })
    }

    /// Strict load. A missing backing file is an error for every scope
    /// except `local`, which defaults to an empty document.
    pub fn load(&self, scope: Scope) -> Result<ConfigDocument, ConfigError> {
        let path = self.locate(scope)?;
        if !path.exists() {
            if scope == Scope::Local {
                return Ok(ConfigDocument::default());
            }
            return Err(ConfigError::DocumentIo {
                action: "read",
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        read_document(path)
    }

    /// Resolution-path load: any failure degrades to an empty document so a
    /// broken scope never aborts parameter resolution.
    pub fn load_or_empty(&self, scope: Scope) -> ConfigDocument {
        let Ok(path) = self.locate(scope) else {
            debug!(scope = %scope, "scope has no backing location; treating as empty");
            return ConfigDocument::default();
        };

        if !path.exists() {
            debug!(scope = %scope, path = %path.display(), "no config document; treating as empty");
            return ConfigDocument::default();
        }

        match read_document(path) {
            Ok(document) => document,
            Err(err) => {
                warn!(scope = %scope, path = %path.display(), error = %err,
                    "unreadable config document; treating scope as empty");
                ConfigDocument::default()
            }
        }
    }

    /// Write-path load: a missing file starts from an empty document, but a
    /// present-yet-unreadable one aborts rather than getting clobbered.
    pub fn load_for_update(&self, scope: Scope) -> Result<ConfigDocument, ConfigError> {
        let path = self.locate(scope)?;
        if !path.exists() {
            return Ok(ConfigDocument::default());
        }
        read_document(path)
    }

    /// Persists atomically: the document is written to a temporary file in
    /// the target directory and renamed over the destination, so a reader
    /// never observes a truncated document.
    pub fn save(&self, scope: Scope, document: &ConfigDocument) -> Result<(), ConfigError> {
        let path = self.locate(scope)?;

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|source| ConfigError::DocumentIo {
            action: "create directory for",
            path: path.to_path_buf(),
            source,
        })?;

        let contents = serialize_document(path, document)?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|source| ConfigError::DocumentIo {
            action: "stage write for",
            path: path.to_path_buf(),
            source,
        })?;
        temp.write_all(contents.as_bytes())
            .map_err(|source| ConfigError::DocumentIo {
                action: "write",
                path: path.to_path_buf(),
                source,
            })?;
        temp.persist(path).map_err(|err| ConfigError::DocumentIo {
            action: "replace",
            path: path.to_path_buf(),
            source: err.error,
        })?;

        Ok(())
    }
}

fn format_for_path(path: &Path) -> Option<FileFormat> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("json") => Some(FileFormat::Json),
        Some("toml") => Some(FileFormat::Toml),
        _ => None,
    }
}

fn read_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::DocumentIo {
        action: "read",
        path: path.to_path_buf(),
        source,
    })?;

    match format_for_path(path) {
        Some(format) => parse_document(path, &contents, format),
        None => parse_document(path, &contents, FileFormat::Toml)
            .or_else(|_| parse_document(path, &contents, FileFormat::Json)),
    }
}

fn parse_document(
    path: &Path,
    contents: &str,
    format: FileFormat,
) -> Result<ConfigDocument, ConfigError> {
    match format {
        FileFormat::Json => {
            serde_json::from_str(contents).map_err(|err| ConfigError::DocumentFormat {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
        }
        FileFormat::Toml => toml::from_str(contents).map_err(|err| ConfigError::DocumentFormat {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }),
    }
}

fn serialize_document(path: &Path, document: &ConfigDocument) -> Result<String, ConfigError> {
    let format = format_for_path(path).unwrap_or(FileFormat::Toml);
    match format {
        FileFormat::Json => serde_json::to_string_pretty(document)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|err| ConfigError::DocumentFormat {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }),
        FileFormat::Toml => {
            toml::to_string_pretty(document).map_err(|err| ConfigError::DocumentFormat {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })
        }
    }
}

/// Base user configuration directory, honoring `STRATA_CONFIG_DIR` and the
/// platform conventions in that order.
pub fn base_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("STRATA_CONFIG_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    if let Ok(dir) = std::env::var("APPDATA") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join(".config"));
        }
    }

    if let Ok(profile) = std::env::var("USERPROFILE") {
        let trimmed = profile.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed).join("AppData").join("Roaming"));
        }
    }

    None
}

/// The user-global config path (`~/.config/strata/config.toml` on Unix).
pub fn global_config_path() -> Option<PathBuf> {
    let base_dir = base_config_dir()?;
    Some(base_dir.join("strata").join("config.toml"))
}
