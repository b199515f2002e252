use serde_json::json;
use strata_core::config::{
    ConfigContext, Scope, create_profile, delete_profile, edit_profile, set_default_profile,
};

use crate::ProfileAction;
use crate::actions::shared::parse_field_assignments;

pub(crate) fn run_profile(
    context: &ConfigContext,
    action: &ProfileAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProfileAction::Create {
            profile_type,
            name,
            fields,
        } => {
            let record = parse_field_assignments(fields)?;
            create_profile(
                context.store(),
                context.write_target(),
                profile_type,
                name,
                record,
            )?;
            Ok(())
        }

        ProfileAction::Edit {
            profile_type,
            name,
            fields,
        } => {
            let updates = parse_field_assignments(fields)?;
            if updates.is_empty() {
                return Err("profile edit requires at least one --set FIELD=VALUE".into());
            }
            edit_profile(
                context.store(),
                context.write_target(),
                profile_type,
                name,
                &updates,
            )?;
            Ok(())
        }

        ProfileAction::Delete { profile_type, name } => {
            delete_profile(context.store(), context.write_target(), profile_type, name)?;
            Ok(())
        }

        ProfileAction::Show { profile_type, name } => {
            let profiles = context.profiles();
            let record = profiles.get_profile(profile_type, name)?;
            println!("{}", serde_json::to_string_pretty(record)?);
            Ok(())
        }

        ProfileAction::List {
            profile_type,
            scope,
        } => {
            let scope = match scope.as_deref() {
                Some(raw) => Some(
                    Scope::parse(raw)
                        .ok_or_else(|| format!("unknown scope `{raw}` (expected global|local|file)"))?,
                ),
                None => None,
            };

            let listed = context.profiles().list_profiles(profile_type, scope);
            let mut output = serde_json::Map::new();
            for (name, profile) in listed {
                output.insert(
                    name,
                    json!({
                        "scope": profile.scope.as_str(),
                        "fields": profile.record,
                    }),
                );
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }

        ProfileAction::SetDefault { profile_type, name } => {
            set_default_profile(context.store(), context.write_target(), profile_type, name)?;
            Ok(())
        }
    }
}
