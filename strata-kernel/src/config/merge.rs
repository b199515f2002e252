use std::collections::BTreeMap;

use serde_json::Value;

use super::{ConfigDocument, ProfileRecord};

/// The read-only merged view of the active scope documents for one
/// invocation.
///
/// Merge is shallow per top-level `settings` key (a higher-precedence scope
/// replaces the whole value), and one level deeper for `commands` and
/// `profiles`: per-parameter within a command, per-name within a profile
/// type. A higher-precedence profile record still replaces the lower one
/// wholesale.
#[derive(Clone, Debug, Default)]
pub struct EffectiveConfig {
    settings: BTreeMap<String, Value>,
    commands: BTreeMap<String, BTreeMap<String, Value>>,
    profiles: BTreeMap<String, BTreeMap<String, ProfileRecord>>,
    defaults: BTreeMap<String, String>,
}

impl EffectiveConfig {
    /// Builds the effective view from documents ordered lowest precedence
    /// first; later documents override earlier ones.
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a ConfigDocument>,
    {
        let mut effective = Self::default();
        for document in documents {
            effective.apply_document(document);
        }
        effective
    }

    pub fn apply_document(&mut self, document: &ConfigDocument) {
        for (key, value) in &document.settings {
            self.settings.insert(key.clone(), value.clone());
        }

        for (command_path, params) in &document.commands {
            let merged = self.commands.entry(command_path.clone()).or_default();
            for (param, value) in params {
                merged.insert(param.clone(), value.clone());
            }
        }

        for (profile_type, records) in &document.profiles {
            let merged = self.profiles.entry(profile_type.clone()).or_default();
            for (name, record) in records {
                merged.insert(name.clone(), record.clone());
            }
        }

        for (profile_type, name) in &document.defaults {
            self.defaults.insert(profile_type.clone(), name.clone());
        }
    }

    pub fn settings(&self) -> &BTreeMap<String, Value> {
        &self.settings
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub fn command_config(&self, command_path: &str) -> Option<&BTreeMap<String, Value>> {
        self.commands.get(command_path)
    }

    pub fn command_value(&self, command_path: &str, param: &str) -> Option<&Value> {
        self.commands.get(command_path)?.get(param)
    }

    pub fn profiles(&self, profile_type: &str) -> Option<&BTreeMap<String, ProfileRecord>> {
        self.profiles.get(profile_type)
    }

    pub fn default_profile(&self, profile_type: &str) -> Option<&str> {
        self.defaults.get(profile_type).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> ConfigDocument {
        serde_json::from_value(value).expect("build document")
    }

    #[test]
    fn local_overrides_global_for_same_key() {
        let global = document(json!({ "settings": { "temperature": 0.5 } }));
        let local = document(json!({ "settings": { "temperature": 0.9 } }));

        let effective = EffectiveConfig::from_documents([&global, &local]);
        assert_eq!(effective.setting("temperature"), Some(&json!(0.9)));
    }

    #[test]
    fn global_only_keys_survive_local_overlay() {
        let global = document(json!({ "settings": { "temperature": 0.5, "seed": 7 } }));
        let local = document(json!({ "settings": { "verbose": true } }));

        let effective = EffectiveConfig::from_documents([&global, &local]);
        assert_eq!(effective.setting("temperature"), Some(&json!(0.5)));
        assert_eq!(effective.setting("seed"), Some(&json!(7)));
        assert_eq!(effective.setting("verbose"), Some(&json!(true)));
    }

    #[test]
    fn settings_merge_is_shallow_per_key() {
        // A nested settings value is replaced wholesale, not field-merged.
        let global = document(json!({ "settings": { "retry": { "count": 3, "delay": 10 } } }));
        let local = document(json!({ "settings": { "retry": { "count": 5 } } }));

        let effective = EffectiveConfig::from_documents([&global, &local]);
        assert_eq!(effective.setting("retry"), Some(&json!({ "count": 5 })));
    }

    #[test]
    fn command_merge_is_per_parameter() {
        let global = document(json!({ "commands": { "x": { "p": 1 } } }));
        let local = document(json!({ "commands": { "x": { "q": 2 } } }));

        let effective = EffectiveConfig::from_documents([&global, &local]);
        let merged = effective.command_config("x").expect("command config");
        assert_eq!(merged.get("p"), Some(&json!(1)));
        assert_eq!(merged.get("q"), Some(&json!(2)));
    }

    #[test]
    fn profile_records_replace_wholesale_per_name() {
        let global = document(json!({
            "profiles": { "llm": {
                "fast": { "model": "small-1", "temperature": 0.2 },
                "smart": { "model": "big-1" }
            } }
        }));
        let local = document(json!({
            "profiles": { "llm": { "fast": { "model": "small-2" } } }
        }));

        let effective = EffectiveConfig::from_documents([&global, &local]);
        let llm = effective.profiles("llm").expect("llm profiles");

        // Local record wins entirely; the global-only field does not survive.
        assert_eq!(llm["fast"], serde_json::from_value(json!({ "model": "small-2" })).unwrap());
        // Global-only names are still visible.
        assert!(llm.contains_key("smart"));
    }

    #[test]
    fn file_scope_overrides_both_when_last() {
        let global = document(json!({ "settings": { "temperature": 0.5 } }));
        let local = document(json!({ "settings": { "temperature": 0.9 } }));
        let file = document(json!({ "settings": { "temperature": 0.1 }, "defaults": { "llm": "smart" } }));

        let effective = EffectiveConfig::from_documents([&global, &local, &file]);
        assert_eq!(effective.setting("temperature"), Some(&json!(0.1)));
        assert_eq!(effective.default_profile("llm"), Some("smart"));
    }

    #[test]
    fn missing_sections_are_treated_as_empty() {
        let global = document(json!({ "settings": { "seed": 7 } }));
        let local = ConfigDocument::default();

        let effective = EffectiveConfig::from_documents([&global, &local]);
        assert_eq!(effective.setting("seed"), Some(&json!(7)));
        assert!(effective.command_config("x").is_none());
    }
}
