use std::collections::BTreeMap;

use serde_json::Value;

/// Declared parameter type, used for best-effort coercion of values sourced
/// from configuration layers. CLI-supplied values are never coerced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    Float,
    Str,
}

const TRUTHY_TOKENS: &[&str] = &["true", "yes", "1", "y"];
const FALSY_TOKENS: &[&str] = &["false", "no", "0", "n"];

impl ParamType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "str" | "string" => Some(Self::Str),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Bool => "bool",
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Str => "str",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ParamType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| format!("unknown parameter type `{value}`"))
    }
}

/// Coerces a raw configuration value to the declared type.
///
/// Returns the reason text on failure so the caller can log the skipped
/// source before falling through to the next one.
pub fn coerce_value(value: &Value, ty: ParamType) -> Result<Value, String> {
    match ty {
        ParamType::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(text) => {
                let token = text.trim().to_ascii_lowercase();
                if TRUTHY_TOKENS.contains(&token.as_str()) {
                    Ok(Value::Bool(true))
                } else if FALSY_TOKENS.contains(&token.as_str()) {
                    Ok(Value::Bool(false))
                } else {
                    Err(format!("`{text}` is not a recognized boolean token"))
                }
            }
            other => Err(format!("expected bool, found {}", kind_of(other))),
        },
        ParamType::Int => match value {
            Value::Number(num) if num.is_i64() || num.is_u64() => Ok(value.clone()),
            Value::String(text) => text
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|err| format!("`{text}` is not an integer: {err}")),
            other => Err(format!("expected int, found {}", kind_of(other))),
        },
        ParamType::Float => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(text) => text
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .map_err(|err| format!("`{text}` is not a float: {err}")),
            other => Err(format!("expected float, found {}", kind_of(other))),
        },
        ParamType::Str => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Bool(inner) => Ok(Value::String(inner.to_string())),
            Value::Number(num) => Ok(Value::String(num.to_string())),
            other => Err(format!("expected string, found {}", kind_of(other))),
        },
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One declared parameter of a command. Constructed once per invocation from
/// command metadata and discarded after resolution.
#[derive(Clone, Debug)]
pub struct ParameterSpec {
    pub name: String,
    /// `None` is the no-default sentinel.
    pub default: Option<Value>,
    pub ty: Option<ParamType>,
    /// Field of the active profile this parameter draws from. Linkage is
    /// always an explicit declaration, never inferred from the name.
    pub profile_field: Option<String>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            ty: None,
            profile_field: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn typed(mut self, ty: ParamType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn from_profile(mut self, field: impl Into<String>) -> Self {
        self.profile_field = Some(field.into());
        self
    }
}

/// A command's declared parameter set plus the profile type its
/// profile-linked parameters draw from.
#[derive(Clone, Debug, Default)]
pub struct CommandSignature {
    /// Dot-joined group/subcommand path.
    pub path: String,
    pub profile_type: Option<String>,
    pub params: Vec<ParameterSpec>,
}

impl CommandSignature {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            profile_type: None,
            params: Vec::new(),
        }
    }

    pub fn with_profile_type(mut self, profile_type: impl Into<String>) -> Self {
        self.profile_type = Some(profile_type.into());
        self
    }

    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.params.push(spec);
        self
    }
}

/// Explicitly supplied invocation values. Key presence is what marks a
/// parameter as supplied, so an explicit null/false/zero still counts as
/// provided and must win over every configuration layer.
#[derive(Clone, Debug, Default)]
pub struct CliValues {
    values: BTreeMap<String, Value>,
}

impl CliValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for CliValues {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Final parameter map handed to the command body. Parameters with no value
/// from any source are omitted entirely.
pub type ResolvedParameters = BTreeMap<String, Value>;
