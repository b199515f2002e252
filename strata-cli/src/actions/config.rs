use strata_core::config::ConfigContext;

use crate::ConfigAction;
use crate::actions::shared::parse_value;

pub(crate) fn run_config(
    context: &ConfigContext,
    action: &ConfigAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key, command } => {
            let effective = context.effective();
            let value = match command.as_deref() {
                Some(command_path) => effective.command_value(command_path, key),
                None => effective.setting(key),
            };
            let Some(value) = value else {
                return Err(match command.as_deref() {
                    Some(command_path) => {
                        format!("no effective value for `{key}` under command `{command_path}`")
                    }
                    None => format!("no effective setting named `{key}`"),
                }
                .into());
            };
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }

        ConfigAction::Set {
            key,
            value,
            command,
        } => {
            let scope = context.write_target();
            let store = context.store();
            let mut document = store.load_for_update(scope)?;

            let parsed = parse_value(value);
            match command.as_deref() {
                Some(command_path) => {
                    document
                        .commands
                        .entry(command_path.to_string())
                        .or_default()
                        .insert(key.clone(), parsed);
                }
                None => {
                    document.settings.insert(key.clone(), parsed);
                }
            }
            store.save(scope, &document)?;
            Ok(())
        }

        ConfigAction::Unset { key, command } => {
            let scope = context.write_target();
            let store = context.store();
            let mut document = store.load_for_update(scope)?;

            let removed = match command.as_deref() {
                Some(command_path) => {
                    let params = document.commands.get_mut(command_path);
                    let removed = params
                        .as_ref()
                        .map(|params| params.contains_key(key))
                        .unwrap_or(false);
                    if let Some(params) = params {
                        params.remove(key);
                        if params.is_empty() {
                            document.commands.remove(command_path);
                        }
                    }
                    removed
                }
                None => document.settings.remove(key).is_some(),
            };

            if !removed {
                return Err(format!("`{key}` is not set in the {scope} scope").into());
            }
            store.save(scope, &document)?;
            Ok(())
        }

        ConfigAction::List { command } => {
            let effective = context.effective();
            let empty = Default::default();
            let text = match command.as_deref() {
                Some(command_path) => serde_json::to_string_pretty(
                    effective.command_config(command_path).unwrap_or(&empty),
                )?,
                None => serde_json::to_string_pretty(effective.settings())?,
            };
            println!("{text}");
            Ok(())
        }
    }
}
