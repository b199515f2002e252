use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Value, json};
use tempfile::tempdir;

use strata_core::config::{
    CliValues, CommandSignature, ConfigContext, ParamType, ParameterSpec, Scope, create_profile,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    fn set(key: &'static str, value: &Path) -> Self {
        let original = std::env::var(key).ok();
        unsafe { std::env::set_var(key, value) };
        Self { key, original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.original.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}

fn write_global_config(config_home: &Path, contents: &str) {
    let dir = config_home.join("strata");
    fs::create_dir_all(&dir).expect("create global config dir");
    fs::write(dir.join("config.toml"), contents).expect("write global config");
}

fn project_with_local_config(root: &Path, contents: &str) -> PathBuf {
    let marker = root.join(".strata");
    fs::create_dir_all(&marker).expect("create local marker");
    fs::write(marker.join("config.toml"), contents).expect("write local config");

    let nested = root.join("src").join("deep");
    fs::create_dir_all(&nested).expect("create nested working dir");
    nested
}

fn cli(pairs: &[(&str, Value)]) -> CliValues {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

#[test]
fn resolution_spans_global_local_and_cli_layers() {
    let _lock = ENV_LOCK.lock().unwrap();
    let config_home = tempdir().expect("create config home");
    let _env = EnvGuard::set("STRATA_CONFIG_DIR", config_home.path());

    write_global_config(
        config_home.path(),
        r#"
[settings]
temperature = 0.5
seed = 7

[profiles.llm.smart]
model = "big-1"
max_tokens = 4096

[defaults]
llm = "smart"
"#,
    );

    let project = tempdir().expect("create project dir");
    let cwd = project_with_local_config(
        project.path(),
        r#"
[settings]
temperature = 0.9

[commands."chat.ask"]
max_tokens = 1024
"#,
    );

    let context = ConfigContext::load(false, None, &cwd).expect("load context");
    assert_eq!(context.write_target(), Scope::Local);

    let signature = CommandSignature::new("chat.ask")
        .with_profile_type("llm")
        .param(ParameterSpec::new("temperature").typed(ParamType::Float))
        .param(ParameterSpec::new("seed").typed(ParamType::Int))
        .param(ParameterSpec::new("model").from_profile("model"))
        .param(ParameterSpec::new("max_tokens").typed(ParamType::Int).from_profile("max_tokens"));

    let resolved = context.resolve(&signature, &CliValues::new());
    // Local overrides global; global-only keys survive.
    assert_eq!(resolved.get("temperature"), Some(&json!(0.9)));
    assert_eq!(resolved.get("seed"), Some(&json!(7)));
    // Command config outranks the profile field.
    assert_eq!(resolved.get("max_tokens"), Some(&json!(1024)));
    // The default profile serves the linked field.
    assert_eq!(resolved.get("model"), Some(&json!("big-1")));

    // An explicit CLI value outranks everything, including falsy ones.
    let resolved = context.resolve(&signature, &cli(&[("max_tokens", json!(0))]));
    assert_eq!(resolved.get("max_tokens"), Some(&json!(0)));
}

#[test]
fn explicit_file_scope_overrides_and_receives_writes() {
    let _lock = ENV_LOCK.lock().unwrap();
    let config_home = tempdir().expect("create config home");
    let _env = EnvGuard::set("STRATA_CONFIG_DIR", config_home.path());

    write_global_config(config_home.path(), "[settings]\ntemperature = 0.5\n");

    let project = tempdir().expect("create project dir");
    let cwd = project_with_local_config(project.path(), "[settings]\ntemperature = 0.9\n");

    let override_path = project.path().join("override.toml");
    fs::write(&override_path, "[settings]\ntemperature = 0.1\n").expect("write override");

    let context =
        ConfigContext::load(false, Some(override_path.clone()), &cwd).expect("load context");
    assert_eq!(context.write_target(), Scope::File);
    assert_eq!(
        context.effective().setting("temperature"),
        Some(&json!(0.1))
    );

    // Writes land in the file scope and survive a reload.
    create_profile(
        context.store(),
        context.write_target(),
        "llm",
        "fast",
        serde_json::from_value(json!({ "model": "small-1" })).unwrap(),
    )
    .expect("create profile");

    let mut context = context;
    context.reload();
    let profile = context.profiles().get_profile("llm", "fast").expect("profile");
    assert_eq!(profile.get("model"), Some(&json!("small-1")));
}

#[test]
fn broken_global_document_degrades_instead_of_aborting() {
    let _lock = ENV_LOCK.lock().unwrap();
    let config_home = tempdir().expect("create config home");
    let _env = EnvGuard::set("STRATA_CONFIG_DIR", config_home.path());

    let dir = config_home.path().join("strata");
    fs::create_dir_all(&dir).expect("create global config dir");
    fs::write(dir.join("config.toml"), "{[ not a document").expect("write junk");

    let project = tempdir().expect("create project dir");
    let cwd = project_with_local_config(project.path(), "[settings]\nretries = 2\n");

    let context = ConfigContext::load(false, None, &cwd).expect("load context");
    let signature = CommandSignature::new("x")
        .param(ParameterSpec::new("retries"))
        .param(ParameterSpec::new("ghost"));

    let resolved = context.resolve(&signature, &CliValues::new());
    assert_eq!(resolved.get("retries"), Some(&json!(2)));
    assert!(!resolved.contains_key("ghost"));
}
