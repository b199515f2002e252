use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The field mapping of one named profile. A record carries no identity of
/// its own beyond the (type, name, scope) triple it is stored under.
pub type ProfileRecord = BTreeMap<String, Value>;

/// The nested key-value document backing one scope.
///
/// Sections are `BTreeMap`s so a reloaded document serializes to the same
/// bytes regardless of insertion history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// General key -> value settings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, Value>,

    /// Dotted command path -> parameter-name -> override value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, BTreeMap<String, Value>>,

    /// Profile type -> profile name -> record.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, BTreeMap<String, ProfileRecord>>,

    /// Profile type -> name of its default profile.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, String>,
}

impl ConfigDocument {
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
            && self.commands.is_empty()
            && self.profiles.is_empty()
            && self.defaults.is_empty()
    }

    pub fn command_config(&self, command_path: &str) -> Option<&BTreeMap<String, Value>> {
        self.commands.get(command_path)
    }

    pub fn profile(&self, profile_type: &str, name: &str) -> Option<&ProfileRecord> {
        self.profiles.get(profile_type)?.get(name)
    }

    pub fn profile_mut(&mut self, profile_type: &str, name: &str) -> Option<&mut ProfileRecord> {
        self.profiles.get_mut(profile_type)?.get_mut(name)
    }

    pub fn default_profile(&self, profile_type: &str) -> Option<&str> {
        self.defaults.get(profile_type).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_all_sections() {
        let doc: ConfigDocument = serde_json::from_value(json!({
            "settings": { "temperature": 0.5, "verbose": true },
            "commands": { "chat.ask": { "max_tokens": 1024 } },
            "profiles": { "llm": { "fast": { "model": "small-1" } } },
            "defaults": { "llm": "fast" }
        }))
        .expect("parse document");

        assert_eq!(doc.settings.get("temperature"), Some(&json!(0.5)));
        assert_eq!(
            doc.command_config("chat.ask").and_then(|c| c.get("max_tokens")),
            Some(&json!(1024))
        );
        assert_eq!(
            doc.profile("llm", "fast").and_then(|p| p.get("model")),
            Some(&json!("small-1"))
        );
        assert_eq!(doc.default_profile("llm"), Some("fast"));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let doc: ConfigDocument = serde_json::from_value(json!({
            "settings": { "temperature": 0.9 }
        }))
        .expect("parse document");

        assert!(doc.commands.is_empty());
        assert!(doc.profiles.is_empty());
        assert!(doc.defaults.is_empty());
        assert!(!doc.is_empty());
    }

    #[test]
    fn serialization_is_order_independent() {
        let mut a = ConfigDocument::default();
        a.settings.insert("zeta".into(), json!(1));
        a.settings.insert("alpha".into(), json!(2));

        let mut b = ConfigDocument::default();
        b.settings.insert("alpha".into(), json!(2));
        b.settings.insert("zeta".into(), json!(1));

        let a_text = serde_json::to_string(&a).expect("serialize");
        let b_text = serde_json::to_string(&b).expect("serialize");
        assert_eq!(a_text, b_text);
    }

    #[test]
    fn empty_sections_are_omitted_on_save() {
        let doc = ConfigDocument::default();
        assert_eq!(serde_json::to_string(&doc).expect("serialize"), "{}");
    }
}
