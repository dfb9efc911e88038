use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::Value;

use super::ConfigError;

/// Writes the selected sub-document into `destination`.
///
/// The destination's current value is used as the base. Every top-level key
/// present in `selected` replaces the matching field as a whole, nested
/// structs and maps included; fields absent from `selected` keep their
/// existing values. The merged tree is bound into a new `T` before anything
/// is written, so a failure leaves the destination untouched.
pub fn assign<T>(selected: Value, destination: &mut T) -> Result<(), ConfigError>
where
    T: Serialize + DeserializeOwned,
{
    if selected.is_null() {
        return Ok(());
    }

    let mut merged = serde_yaml::to_value(&*destination).map_err(ConfigError::NotAssignable)?;
    overlay_fields(&mut merged, selected);

    *destination = serde_yaml::from_value(merged).map_err(ConfigError::NotAssignable)?;
    Ok(())
}

/// Binds the selected sub-document into a fresh `T`.
///
/// An empty sub-document binds like an empty mapping.
pub fn bind<T: DeserializeOwned>(selected: Value) -> Result<T, ConfigError> {
    let selected = match selected {
        Value::Null => Value::Mapping(Default::default()),
        other => other,
    };
    serde_yaml::from_value(selected).map_err(ConfigError::NotAssignable)
}

fn overlay_fields(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                base.insert(key, value);
            }
        }
        (base, overlay) => *base = overlay,
    }
}
