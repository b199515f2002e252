use std::collections::BTreeMap;

use tracing::debug;

use super::{ConfigDocument, ProfileRecord, Scope, ScopedDocumentStore};
use crate::errors::ConfigError;

/// First-match lookup order for reads: the local copy is the one most
/// likely intended, then global, then an explicit file scope if active.
const PROFILE_SEARCH_ORDER: [Scope; 3] = [Scope::Local, Scope::Global, Scope::File];

/// A profile record tagged with the scope it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopedProfile {
    pub scope: Scope,
    pub record: ProfileRecord,
}

/// Read-side profile lookup across the active scope documents.
pub struct ProfileAccessor<'a> {
    documents: &'a [(Scope, ConfigDocument)],
}

impl<'a> ProfileAccessor<'a> {
    pub fn new(documents: &'a [(Scope, ConfigDocument)]) -> Self {
        Self { documents }
    }

    fn document(&self, scope: Scope) -> Option<&'a ConfigDocument> {
        self.documents
            .iter()
            .find(|(candidate, _)| *candidate == scope)
            .map(|(_, document)| document)
    }

    pub fn get_profile(
        &self,
        profile_type: &str,
        name: &str,
    ) -> Result<&'a ProfileRecord, ConfigError> {
        for scope in PROFILE_SEARCH_ORDER {
            if let Some(document) = self.document(scope)
                && let Some(record) = document.profile(profile_type, name)
            {
                return Ok(record);
            }
        }
        Err(ConfigError::profile_not_found(profile_type, name))
    }

    pub fn get_default_profile_name(&self, profile_type: &str) -> Option<&'a str> {
        for scope in PROFILE_SEARCH_ORDER {
            if let Some(document) = self.document(scope)
                && let Some(name) = document.default_profile(profile_type)
            {
                return Some(name);
            }
        }
        None
    }

    /// Profiles of one type, either from a single scope or as a union of
    /// all active scopes. On a name collision in the union the local copy
    /// wins over global, global over file.
    pub fn list_profiles(
        &self,
        profile_type: &str,
        scope: Option<Scope>,
    ) -> BTreeMap<String, ScopedProfile> {
        let mut listed = BTreeMap::new();

        let scopes: Vec<Scope> = match scope {
            Some(only) => vec![only],
            None => PROFILE_SEARCH_ORDER.iter().rev().copied().collect(),
        };

        for scope in scopes {
            let Some(document) = self.document(scope) else {
                continue;
            };
            let Some(records) = document.profiles.get(profile_type) else {
                continue;
            };
            for (name, record) in records {
                listed.insert(
                    name.clone(),
                    ScopedProfile {
                        scope,
                        record: record.clone(),
                    },
                );
            }
        }

        listed
    }
}

/// Creates (or replaces) a profile in one explicit scope.
pub fn create_profile(
    store: &ScopedDocumentStore,
    scope: Scope,
    profile_type: &str,
    name: &str,
    record: ProfileRecord,
) -> Result<(), ConfigError> {
    let mut document = store.load_for_update(scope)?;
    document
        .profiles
        .entry(profile_type.to_string())
        .or_default()
        .insert(name.to_string(), record);
    store.save(scope, &document)
}

/// Merges the supplied fields into an existing profile. Unlike scope
/// merging, record fields are independent attributes, so this is the one
/// per-field merge in the system.
pub fn edit_profile(
    store: &ScopedDocumentStore,
    scope: Scope,
    profile_type: &str,
    name: &str,
    updates: &ProfileRecord,
) -> Result<(), ConfigError> {
    let mut document = store.load_for_update(scope)?;
    let Some(record) = document.profile_mut(profile_type, name) else {
        return Err(ConfigError::profile_not_found(profile_type, name));
    };

    for (field, value) in updates {
        record.insert(field.clone(), value.clone());
    }
    store.save(scope, &document)
}

pub fn delete_profile(
    store: &ScopedDocumentStore,
    scope: Scope,
    profile_type: &str,
    name: &str,
) -> Result<(), ConfigError> {
    let mut document = store.load_for_update(scope)?;

    let Some(records) = document.profiles.get_mut(profile_type) else {
        return Err(ConfigError::profile_not_found(profile_type, name));
    };
    if records.remove(name).is_none() {
        return Err(ConfigError::profile_not_found(profile_type, name));
    }
    if records.is_empty() {
        document.profiles.remove(profile_type);
    }

    // Drop a default that names the deleted profile in the same scope.
    if document.default_profile(profile_type) == Some(name) {
        document.defaults.remove(profile_type);
        debug!(profile_type, name, scope = %scope, "cleared default naming a deleted profile");
    }

    store.save(scope, &document)
}

/// Records the default profile name for a type. The name may refer to a
/// profile stored in another scope, so no existence check is made here.
pub fn set_default_profile(
    store: &ScopedDocumentStore,
    scope: Scope,
    profile_type: &str,
    name: &str,
) -> Result<(), ConfigError> {
    let mut document = store.load_for_update(scope)?;
    document
        .defaults
        .insert(profile_type.to_string(), name.to_string());
    store.save(scope, &document)
}
