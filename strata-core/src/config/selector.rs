use std::path::{Path, PathBuf};

use super::Scope;

/// Directory marker that anchors the local scope of a project tree.
pub const LOCAL_DIR_NAME: &str = ".strata";

const CONFIG_TOML: &str = "config.toml";
const CONFIG_JSON: &str = "config.json";

/// The scopes in play for one invocation, in merge precedence order
/// (lowest first), plus the single authoritative write target.
#[derive(Clone, Debug)]
pub struct ScopeSelection {
    active: Vec<Scope>,
    write_target: Scope,
    local_path: PathBuf,
    file_path: Option<PathBuf>,
}

impl ScopeSelection {
    pub fn active_scopes(&self) -> &[Scope] {
        &self.active
    }

    pub fn write_target(&self) -> Scope {
        self.write_target
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

/// Decides the active scopes and write target from the explicit scope flags
/// and the working directory.
///
/// An explicit file path activates `[global, local, file]` and writes to the
/// file; `--global` keeps both standing scopes active but writes globally;
/// otherwise writes land in the local scope.
pub fn select(use_global: bool, file_path: Option<PathBuf>, cwd: &Path) -> ScopeSelection {
    let local_path =
        find_local_config(cwd).unwrap_or_else(|| cwd.join(LOCAL_DIR_NAME).join(CONFIG_TOML));

    if let Some(path) = file_path {
        return ScopeSelection {
            active: vec![Scope::Global, Scope::Local, Scope::File],
            write_target: Scope::File,
            local_path,
            file_path: Some(path),
        };
    }

    ScopeSelection {
        active: vec![Scope::Global, Scope::Local],
        write_target: if use_global { Scope::Global } else { Scope::Local },
        local_path,
        file_path: None,
    }
}

/// Walks parent directories from `cwd` upward looking for a `.strata/`
/// marker. Returns the config file inside the first marker found, preferring
/// `config.toml` over `config.json`; a marker directory with neither still
/// anchors the local scope so writes land there.
pub fn find_local_config(cwd: &Path) -> Option<PathBuf> {
    for dir in cwd.ancestors() {
        let marker = dir.join(LOCAL_DIR_NAME);
        if !marker.is_dir() {
            continue;
        }

        let toml_path = marker.join(CONFIG_TOML);
        if toml_path.is_file() {
            return Some(toml_path);
        }
        let json_path = marker.join(CONFIG_JSON);
        if json_path.is_file() {
            return Some(json_path);
        }
        return Some(toml_path);
    }

    None
}
