//! Selection of the active environment's sub-document.

use serde_yaml::{Mapping, Value};

use super::ConfigError;

const MERGE_KEY: &str = "<<";

/// Parses `expanded` as a mapping of environment names and returns the
/// sub-document for `environment`.
///
/// Aliases are resolved by the parser and `<<` merge keys are applied
/// before the lookup, so an environment can inherit from a shared anchor (or
/// from another environment that inherits itself) and override individual
/// keys. Scalar keys such as `1:` or `true:` match by their string form.
pub fn select(expanded: &str, environment: &str) -> Result<Value, ConfigError> {
    let mut document: Value = serde_yaml::from_str(expanded).map_err(ConfigError::ParseError)?;
    apply_merges(&mut document)?;

    let mut environments = match document {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        other => return Err(ConfigError::NotAMapping(kind(&other))),
    };

    let key = environments
        .keys()
        .find(|key| key_name(key).as_deref() == Some(environment))
        .cloned();

    key.and_then(|key| environments.shift_remove(&key))
        .ok_or_else(|| ConfigError::MissingEnvironment {
            name: environment.to_string(),
            available: available(&environments),
        })
}

/// Resolves `<<` merge keys bottom-up.
///
/// Merged-in mappings have their own merges applied first, so inheritance
/// chains of any depth flatten completely. Explicit keys win over merged
/// ones, and earlier entries of a merge sequence win over later ones.
fn apply_merges(value: &mut Value) -> Result<(), ConfigError> {
    match value {
        Value::Mapping(mapping) => {
            for (_, child) in mapping.iter_mut() {
                apply_merges(child)?;
            }

            if let Some(merge) = mapping.shift_remove(MERGE_KEY) {
                for parent in merge_sources(merge)? {
                    for (key, value) in parent {
                        if !mapping.contains_key(&key) {
                            mapping.insert(key, value);
                        }
                    }
                }
            }
            Ok(())
        }
        Value::Sequence(items) => items.iter_mut().try_for_each(apply_merges),
        Value::Tagged(tagged) => apply_merges(&mut tagged.value),
        _ => Ok(()),
    }
}

fn merge_sources(merge: Value) -> Result<Vec<Mapping>, ConfigError> {
    match merge {
        Value::Mapping(mapping) => Ok(vec![mapping]),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Mapping(mapping) => Ok(mapping),
                other => Err(ConfigError::InvalidMerge(kind(&other))),
            })
            .collect(),
        other => Err(ConfigError::InvalidMerge(kind(&other))),
    }
}

/// String form of a scalar key; `None` for null and collection keys.
fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Scalar keys of the top-level mapping, in document order.
fn available(environments: &Mapping) -> Vec<String> {
    environments.keys().filter_map(key_name).collect()
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
