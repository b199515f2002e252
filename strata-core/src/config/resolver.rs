use serde_json::Value;
use tracing::debug;

use super::{
    CliValues, CommandSignature, EffectiveConfig, ParameterSpec, ProfileAccessor, ProfileRecord,
    ResolvedParameters, coerce_value,
};
use crate::errors::ConfigError;

/// Reserved parameter that selects the active profile by name.
pub const PROFILE_PARAM: &str = "profile";

/// Computes the final value of every declared parameter by consulting, in
/// strict order: the explicitly supplied CLI value, the command's effective
/// config, the linked field of the active profile, the effective general
/// settings, and the declared default.
///
/// Resolution is a pure read; it never writes configuration. An uncoercible
/// value in any non-CLI source is skipped in favor of the next source, and a
/// parameter with no value anywhere is omitted from the result.
pub struct ParameterResolver<'a> {
    effective: &'a EffectiveConfig,
    profiles: ProfileAccessor<'a>,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(effective: &'a EffectiveConfig, profiles: ProfileAccessor<'a>) -> Self {
        Self {
            effective,
            profiles,
        }
    }

    pub fn resolve(&self, signature: &CommandSignature, cli: &CliValues) -> ResolvedParameters {
        let active_profile = self.active_profile(signature, cli);

        let mut resolved = ResolvedParameters::new();
        for spec in &signature.params {
            if let Some(value) = self.resolve_param(signature, spec, cli, active_profile) {
                resolved.insert(spec.name.clone(), value);
            }
        }
        resolved
    }

    /// The record backing profile-linked parameters for this invocation.
    /// The profile name itself resolves through the CLI and command-config
    /// layers of the reserved `profile` parameter before falling back to
    /// the type's default name.
    fn active_profile(&self, signature: &CommandSignature, cli: &CliValues) -> Option<&'a ProfileRecord> {
        let profile_type = signature.profile_type.as_deref()?;

        let name = cli
            .get(PROFILE_PARAM)
            .and_then(value_as_profile_name)
            .or_else(|| {
                self.effective
                    .command_value(&signature.path, PROFILE_PARAM)
                    .and_then(value_as_profile_name)
            })
            .or_else(|| {
                self.profiles
                    .get_default_profile_name(profile_type)
                    .map(str::to_string)
            })?;

        match self.profiles.get_profile(profile_type, &name) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!(error = %err, command = %signature.path,
                    "active profile unavailable; profile-linked parameters fall through");
                None
            }
        }
    }

    fn resolve_param(
        &self,
        signature: &CommandSignature,
        spec: &ParameterSpec,
        cli: &CliValues,
        profile: Option<&ProfileRecord>,
    ) -> Option<Value> {
        // Presence, not value, marks a CLI parameter as supplied: an
        // explicit null/false/zero wins here and is never coerced.
        if let Some(value) = cli.get(&spec.name) {
            return Some(value.clone());
        }

        if let Some(value) = self.effective.command_value(&signature.path, &spec.name)
            && let Some(coerced) = coerce_checked(spec, value, "command config")
        {
            return Some(coerced);
        }

        if let Some(field) = spec.profile_field.as_deref()
            && let Some(record) = profile
            && let Some(value) = record.get(field)
            && let Some(coerced) = coerce_checked(spec, value, "profile")
        {
            return Some(coerced);
        }

        if let Some(value) = self.effective.setting(&spec.name)
            && let Some(coerced) = coerce_checked(spec, value, "settings")
        {
            return Some(coerced);
        }

        if let Some(default) = spec.default.as_ref()
            && let Some(coerced) = coerce_checked(spec, default, "declared default")
        {
            return Some(coerced);
        }

        None
    }
}

fn value_as_profile_name(value: &Value) -> Option<String> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(name.clone()),
        _ => None,
    }
}

fn coerce_checked(spec: &ParameterSpec, value: &Value, source: &str) -> Option<Value> {
    let Some(ty) = spec.ty else {
        return Some(value.clone());
    };

    match coerce_value(value, ty) {
        Ok(coerced) => Some(coerced),
        Err(reason) => {
            let err = ConfigError::ParamType {
                param: spec.name.clone(),
                expected: ty.as_str(),
                reason,
            };
            debug!(source, error = %err, "skipping uncoercible value");
            None
        }
    }
}
