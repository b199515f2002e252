use serde_json::Value;
use strata_core::config::ProfileRecord;

/// Parses a raw command-line value: valid JSON is taken as-is so numbers,
/// booleans, and null survive; anything else is stored as a bare string.
pub(crate) fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Splits a `NAME=VALUE` assignment, keeping the value raw.
pub(crate) fn split_assignment(raw: &str) -> Result<(&str, &str), Box<dyn std::error::Error>> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(format!("expected NAME=VALUE, got `{raw}`").into());
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("expected NAME=VALUE, got `{raw}`").into());
    }
    Ok((name, value))
}

/// Builds a profile record from repeated `FIELD=VALUE` flags.
pub(crate) fn parse_field_assignments(
    raw_fields: &[String],
) -> Result<ProfileRecord, Box<dyn std::error::Error>> {
    let mut record = ProfileRecord::new();
    for raw in raw_fields {
        let (field, value) = split_assignment(raw)?;
        record.insert(field.to_string(), parse_value(value));
    }
    Ok(record)
}
