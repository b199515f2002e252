use std::path::{Path, PathBuf};

use super::{
    CliValues, CommandSignature, ConfigDocument, EffectiveConfig, ParameterResolver,
    ProfileAccessor, ResolvedParameters, Scope, ScopeSelection, ScopedDocumentStore, select,
};
use crate::errors::ConfigError;

/// Everything one invocation needs to read and write configuration: the
/// scope selection, the store, and the loaded documents in precedence
/// order. Threaded explicitly through callers; there is no process-wide
/// configuration state.
pub struct ConfigContext {
    selection: ScopeSelection,
    store: ScopedDocumentStore,
    documents: Vec<(Scope, ConfigDocument)>,
}

impl ConfigContext {
    /// Selects scopes from the invocation flags, then loads each active
    /// scope's document. Read failures degrade to empty documents so
    /// resolution stays available; an explicitly requested but unlocatable
    /// scope is fatal here, before resolution begins.
    pub fn load(
        use_global: bool,
        file_path: Option<PathBuf>,
        cwd: &Path,
    ) -> Result<Self, ConfigError> {
        let selection = select(use_global, file_path, cwd);
        let store = ScopedDocumentStore::for_selection(&selection);

        if selection.active_scopes().contains(&Scope::File) {
            store.locate(Scope::File)?;
        }

        let documents = selection
            .active_scopes()
            .iter()
            .map(|scope| (*scope, store.load_or_empty(*scope)))
            .collect();

        Ok(Self {
            selection,
            store,
            documents,
        })
    }

    pub fn selection(&self) -> &ScopeSelection {
        &self.selection
    }

    pub fn store(&self) -> &ScopedDocumentStore {
        &self.store
    }

    pub fn write_target(&self) -> Scope {
        self.selection.write_target()
    }

    pub fn documents(&self) -> &[(Scope, ConfigDocument)] {
        &self.documents
    }

    pub fn effective(&self) -> EffectiveConfig {
        EffectiveConfig::from_documents(self.documents.iter().map(|(_, document)| document))
    }

    pub fn profiles(&self) -> ProfileAccessor<'_> {
        ProfileAccessor::new(&self.documents)
    }

    /// Runs the five-source resolution for one command invocation.
    pub fn resolve(&self, signature: &CommandSignature, cli: &CliValues) -> ResolvedParameters {
        let effective = self.effective();
        ParameterResolver::new(&effective, self.profiles()).resolve(signature, cli)
    }

    /// Re-reads the active scope documents, picking up writes made through
    /// the store within the same process run.
    pub fn reload(&mut self) {
        for (scope, document) in &mut self.documents {
            *document = self.store.load_or_empty(*scope);
        }
    }
}
