//! Serde mirror of the YAML schema emitted by `moose-app --yaml`.
//!
//! The dump is loosely typed: defaults may be numbers, `required` may be a
//! boolean or `Yes`/`No`, and empty `subblocks:` keys are `null`. Everything is
//! captured as [`serde_yaml::Value`] here and normalized in [`super`].

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Read a list of named entries: either a YAML sequence whose items carry a
/// `name` key, or a mapping keyed by name. `null`, as well as a mapping entry
/// without a body, counts as empty. `location` names the key in error messages.
pub fn named_entries<T>(value: Value, location: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned + Default + Named,
{
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| entry(item, &format!("{}, entry {}", location, i + 1)))
            .collect(),
        Value::Mapping(map) => map
            .into_iter()
            .map(|(key, item)| {
                let Value::String(key) = key else {
                    return Err(Error::schema(format!(
                        "{}: keys must be strings, found {}",
                        location,
                        kind(&key)
                    )));
                };
                let mut parsed: T = entry(item, &format!("{}, entry '{}'", location, key))?;
                if parsed.name().is_none() {
                    parsed.set_name(key);
                }
                Ok(parsed)
            })
            .collect(),
        Value::Tagged(tagged) => named_entries(tagged.value, location),
        other => Err(Error::schema(format!(
            "{}: expected a sequence or mapping, found {}",
            location,
            kind(&other)
        ))),
    }
}

fn entry<T: DeserializeOwned + Default>(value: Value, location: &str) -> Result<T> {
    match value {
        Value::Null => Ok(T::default()),
        Value::Mapping(_) => {
            serde_yaml::from_value(value).map_err(|e| Error::schema(format!("{}: {}", location, e)))
        }
        other => Err(Error::schema(format!(
            "{}: expected a mapping, found {}",
            location,
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

pub trait Named {
    fn name(&self) -> Option<&str>;
    fn set_name(&mut self, name: String);
}

/// One block entry. `parameters` and `subblocks` are kept as raw values and
/// read with [`named_entries`] so that errors can name the offending block.
#[derive(Debug, Default, Deserialize)]
pub struct RawBlock {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Value,
    #[serde(rename = "type", default)]
    pub block_type: Value,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub subblocks: Value,
}

impl Named for RawBlock {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawParameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cpp_type: Value,
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default)]
    pub group_name: Value,
    #[serde(default)]
    pub required: Value,
    /// Space separated list of allowed values for enumerations.
    #[serde(default)]
    pub options: Value,
}

impl Named for RawParameter {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }
}

/// Render a scalar YAML value as the text MOOSE would print for it.
/// Sequences are joined with spaces, the way vector defaults are written in
/// input files.
pub fn scalar_text(value: &Value, key: &str) -> Result<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Sequence(items) => {
            let parts = items
                .iter()
                .map(|v| scalar_text(v, key))
                .collect::<Result<Vec<_>>>()?;
            Ok(parts.join(" "))
        }
        Value::Tagged(tagged) => scalar_text(&tagged.value, key),
        Value::Mapping(_) => Err(Error::schema(format!(
            "expected a scalar for '{}', found a mapping",
            key
        ))),
    }
}

/// Interpret the `required` flag. MOOSE writes `Yes`/`No`; hand-written
/// schemas use booleans.
pub fn required_flag(value: &Value, param: &str) -> Result<bool> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" | "" => Ok(false),
            other => Err(Error::schema(format!(
                "parameter '{}': invalid required flag '{}'",
                param, other
            ))),
        },
        other => Err(Error::schema(format!(
            "parameter '{}': invalid required flag {:?}",
            param, other
        ))),
    }
}
