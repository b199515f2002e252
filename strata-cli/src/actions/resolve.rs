use strata_core::config::{CliValues, CommandSignature, ConfigContext, ParamType, ParameterSpec};

use crate::ResolveCmd;
use crate::actions::shared::{parse_value, split_assignment};

pub(crate) fn run_resolve(
    context: &ConfigContext,
    cmd: &ResolveCmd,
) -> Result<(), Box<dyn std::error::Error>> {
    let (signature, cli_values) = resolve_invocation(cmd)?;
    let resolved = context.resolve(&signature, &cli_values);
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

/// Builds the command signature and the explicitly supplied value map from
/// the raw `resolve` flags.
pub(crate) fn resolve_invocation(
    cmd: &ResolveCmd,
) -> Result<(CommandSignature, CliValues), Box<dyn std::error::Error>> {
    let mut signature = CommandSignature::new(&cmd.command_path);
    if let Some(profile_type) = cmd.profile_type.as_ref() {
        signature = signature.with_profile_type(profile_type);
    }

    for raw in &cmd.params {
        signature.params.push(parse_param_spec(raw)?);
    }

    for raw in &cmd.profile_params {
        let (name, field) = split_assignment(raw)?;
        if field.trim().is_empty() {
            return Err(format!("expected NAME=FIELD, got `{raw}`").into());
        }
        match signature.params.iter_mut().find(|spec| spec.name == name) {
            Some(spec) => spec.profile_field = Some(field.to_string()),
            None => signature
                .params
                .push(ParameterSpec::new(name).from_profile(field)),
        }
    }

    let mut cli_values = CliValues::new();
    for raw in &cmd.args {
        let (name, value) = split_assignment(raw)?;
        cli_values.insert(name, parse_value(value));
    }

    Ok((signature, cli_values))
}

/// Parses one `NAME[:TYPE][=DEFAULT]` declaration.
fn parse_param_spec(raw: &str) -> Result<ParameterSpec, Box<dyn std::error::Error>> {
    let (head, default) = match raw.split_once('=') {
        Some((head, default)) => (head, Some(default)),
        None => (raw, None),
    };

    let (name, ty) = match head.split_once(':') {
        Some((name, ty)) => {
            let parsed = ParamType::parse(ty)
                .ok_or_else(|| format!("unknown parameter type `{ty}` in `{raw}`"))?;
            (name, Some(parsed))
        }
        None => (head, None),
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("expected NAME[:TYPE][=DEFAULT], got `{raw}`").into());
    }

    let mut spec = ParameterSpec::new(name);
    spec.ty = ty;
    spec.default = default.map(parse_value);
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cmd(
        params: &[&str],
        args: &[&str],
        profile_type: Option<&str>,
        profile_params: &[&str],
    ) -> ResolveCmd {
        ResolveCmd {
            command_path: "chat.ask".to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            params: params.iter().map(|s| s.to_string()).collect(),
            profile_type: profile_type.map(|s| s.to_string()),
            profile_params: profile_params.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn param_declarations_parse_name_type_and_default() {
        let spec = parse_param_spec("temperature:float=0.7").expect("parse");
        assert_eq!(spec.name, "temperature");
        assert_eq!(spec.ty, Some(ParamType::Float));
        assert_eq!(spec.default, Some(json!(0.7)));

        let spec = parse_param_spec("model").expect("parse");
        assert_eq!(spec.name, "model");
        assert_eq!(spec.ty, None);
        assert_eq!(spec.default, None);

        let spec = parse_param_spec("tag=latest").expect("parse");
        assert_eq!(spec.default, Some(json!("latest")));

        assert!(parse_param_spec("count:decimal").is_err());
        assert!(parse_param_spec(":int").is_err());
    }

    #[test]
    fn profile_params_link_or_declare_parameters() {
        let cmd = cmd(
            &["model"],
            &[],
            Some("llm"),
            &["model=model", "max_tokens=max_tokens"],
        );
        let (signature, _) = resolve_invocation(&cmd).expect("build invocation");

        assert_eq!(signature.profile_type.as_deref(), Some("llm"));
        assert_eq!(signature.params.len(), 2);
        assert_eq!(signature.params[0].profile_field.as_deref(), Some("model"));
        assert_eq!(signature.params[1].name, "max_tokens");
        assert_eq!(
            signature.params[1].profile_field.as_deref(),
            Some("max_tokens")
        );
    }

    #[test]
    fn cli_args_keep_json_types_and_track_presence() {
        let cmd = cmd(&["count:int"], &["count=0", "note=null"], None, &[]);
        let (_, cli_values) = resolve_invocation(&cmd).expect("build invocation");

        assert_eq!(cli_values.get("count"), Some(&json!(0)));
        assert!(cli_values.contains("note"));
        assert_eq!(cli_values.get("note"), Some(&serde_json::Value::Null));
    }
}
