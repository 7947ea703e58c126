//! YAML input support.
//!
//! YAML documents are converted into the JSON value model before
//! validation. Scalar mapping keys (numbers, booleans, `~`) are spelled
//! the way a JSON object key would carry them, so dict key schemas coerce
//! them back. Tags are dropped.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as Yaml;
use thiserror::Error;

/// Why a YAML document could not enter the JSON value model.
#[derive(Error, Debug)]
pub enum YamlError {
    #[error("{0}")]
    Syntax(#[from] serde_yaml::Error),

    /// `.nan` and `.inf` have no JSON form.
    #[error("number {number} at {at} has no JSON representation")]
    NonFinite { number: String, at: String },

    /// Sequence and mapping keys have no JSON form.
    #[error("mapping key at {at} is not a scalar")]
    ComplexKey { at: String },
}

/// Parse YAML text into a JSON value.
pub fn parse_yaml(text: &str) -> Result<Value, YamlError> {
    let yaml: Yaml = serde_yaml::from_str(text)?;
    yaml_to_json_value(&yaml)
}

/// Convert a parsed YAML tree into a JSON value.
pub fn yaml_to_json_value(yaml: &Yaml) -> Result<Value, YamlError> {
    convert(yaml, "")
}

fn convert(yaml: &Yaml, at: &str) -> Result<Value, YamlError> {
    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => i.into(),
            (None, Some(u)) => u.into(),
            (None, None) => n
                .as_f64()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| YamlError::NonFinite {
                    number: n.to_string(),
                    at: location(at),
                })?,
        },
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| convert(item, &format!("{at}/{i}")))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (k, v) in mapping {
                let key = match k {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Null => "null".to_owned(),
                    Yaml::Tagged(tagged) => match &tagged.value {
                        Yaml::String(s) => s.clone(),
                        _ => return Err(YamlError::ComplexKey { at: location(at) }),
                    },
                    Yaml::Sequence(_) | Yaml::Mapping(_) => {
                        return Err(YamlError::ComplexKey { at: location(at) })
                    }
                };
                let child = format!("{at}/{}", key.replace('~', "~0").replace('/', "~1"));
                let value = convert(v, &child)?;
                object.insert(key, value);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => convert(&tagged.value, at)?,
    })
}

fn location(at: &str) -> String {
    if at.is_empty() {
        "(root)".to_owned()
    } else {
        at.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_converts() {
        let value = parse_yaml("a_float: 1\nflags: [yes, 'no']\nname: foo\nmissing: ~\n").unwrap();
        assert_eq!(value["a_float"], 1);
        assert_eq!(value["flags"], json!(["yes", "no"]));
        assert_eq!(value["name"], "foo");
        assert!(value["missing"].is_null());
    }

    #[test]
    fn test_scalar_keys_become_strings() {
        let value = parse_yaml("1: 123\ntrue: x\n~: y\n").unwrap();
        assert_eq!(value, json!({"1": 123, "true": "x", "null": "y"}));
    }

    #[test]
    fn test_non_finite_float_located() {
        let err = parse_yaml("x: [1, .nan]").unwrap_err();
        assert!(matches!(err, YamlError::NonFinite { ref at, .. } if at == "/x/1"), "{err}");
    }

    #[test]
    fn test_sequence_key_rejected() {
        let err = parse_yaml("outer:\n  ? [1, 2]\n  : x\n").unwrap_err();
        assert!(matches!(err, YamlError::ComplexKey { ref at } if at == "/outer"), "{err}");
    }

    #[test]
    fn test_syntax_error_reported() {
        assert!(matches!(parse_yaml("a: [1, 2"), Err(YamlError::Syntax(_))));
    }
}
