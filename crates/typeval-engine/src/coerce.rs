//! # Leaf Coercion
//!
//! Lax conversion of a JSON input into a scalar [`Instance`]:
//!
//! | Leaf    | Accepts                                                        |
//! |---------|----------------------------------------------------------------|
//! | `int`   | integers, floats with zero fraction, integer strings           |
//! | `float` | any number, float strings                                      |
//! | `bool`  | booleans, `0`/`1`, `true/false/yes/no/on/off/t/f/y/n/1/0`      |
//! | `str`   | strings                                                        |
//! | `none`  | `null`                                                         |
//! | `any`   | any scalar, unchanged                                          |
//!
//! Booleans are never numbers.

use serde_json::{Number, Value};
use typeval_core::{Num, Violation, ViolationKind};

use crate::instance::Instance;

/// A coercion or check failure before it is located in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub kind: ViolationKind,
    pub message: String,
}

impl Rejection {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Attach the JSON Pointer of the offending value.
    pub fn at(self, path: &str) -> Violation {
        Violation::new(path, self.kind, self.message)
    }
}

pub fn int(value: &Value) -> Result<Instance, Rejection> {
    match value {
        Value::Number(n) => int_from_number(n),
        Value::String(s) => s.trim().parse::<i64>().map(Instance::Int).map_err(|_| {
            Rejection::new(
                ViolationKind::IntParsing,
                "Input should be a valid integer, unable to parse string as an integer",
            )
        }),
        other => Err(Rejection::new(
            ViolationKind::IntType,
            format!("Input should be a valid integer, got {}", type_name(other)),
        )),
    }
}

fn int_from_number(n: &Number) -> Result<Instance, Rejection> {
    if let Some(i) = n.as_i64() {
        return Ok(Instance::Int(i));
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Ok(Instance::Int(f as i64));
    }
    let message = if f.is_finite() && f.fract() != 0.0 {
        "Input should be a valid integer, got a number with a fractional part"
    } else {
        "Input should be a valid integer, number out of range"
    };
    Err(Rejection::new(ViolationKind::IntParsing, message))
}

pub fn float(value: &Value) -> Result<Instance, Rejection> {
    match value {
        Value::Number(n) => Ok(Instance::Float(n.as_f64().unwrap_or(f64::NAN))),
        Value::String(s) => s.trim().parse::<f64>().map(Instance::Float).map_err(|_| {
            Rejection::new(
                ViolationKind::FloatParsing,
                "Input should be a valid number, unable to parse string as a number",
            )
        }),
        other => Err(Rejection::new(
            ViolationKind::FloatType,
            format!("Input should be a valid number, got {}", type_name(other)),
        )),
    }
}

pub fn boolean(value: &Value) -> Result<Instance, Rejection> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
            "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    };
    parsed.map(Instance::Bool).ok_or_else(|| {
        Rejection::new(
            ViolationKind::BoolParsing,
            "Input should be a valid boolean, unable to interpret input",
        )
    })
}

pub fn string(value: &Value) -> Result<Instance, Rejection> {
    match value {
        Value::String(s) => Ok(Instance::Str(s.clone())),
        other => Err(Rejection::new(
            ViolationKind::StringType,
            format!("Input should be a valid string, got {}", type_name(other)),
        )),
    }
}

pub fn none(value: &Value) -> Result<Instance, Rejection> {
    match value {
        Value::Null => Ok(Instance::None),
        other => Err(Rejection::new(
            ViolationKind::NoneRequired,
            format!("Input should be null, got {}", type_name(other)),
        )),
    }
}

pub fn any(value: &Value) -> Result<Instance, Rejection> {
    match value {
        Value::Array(_) | Value::Object(_) => Err(Rejection::new(
            ViolationKind::AnyScalar,
            format!("Input should be a single scalar value, got {}", type_name(value)),
        )),
        scalar => Ok(Instance::from_json(scalar)),
    }
}

/// Match `value` against the accepted literals; numbers compare by value.
pub fn literal(value: &Value, expected: &[Value]) -> Result<Instance, Rejection> {
    expected
        .iter()
        .find(|candidate| literal_eq(value, candidate))
        .map(Instance::from_json)
        .ok_or_else(|| {
            let accepted: Vec<String> = expected.iter().map(Value::to_string).collect();
            Rejection::new(
                ViolationKind::LiteralError,
                format!("Input should be {}", accepted.join(" or ")),
            )
        })
}

fn literal_eq(value: &Value, candidate: &Value) -> bool {
    match (value, candidate) {
        (Value::Number(a), Value::Number(b)) => match (Num::from_json(a), Num::from_json(b)) {
            (Some(a), Some(b)) => a.compare(b) == Some(std::cmp::Ordering::Equal),
            _ => false,
        },
        (a, b) => a == b,
    }
}

/// JSON type name for messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_accepts_integral_inputs() {
        assert_eq!(int(&json!(7)), Ok(Instance::Int(7)));
        assert_eq!(int(&json!(7.0)), Ok(Instance::Int(7)));
        assert_eq!(int(&json!(" 42 ")), Ok(Instance::Int(42)));
    }

    #[test]
    fn test_int_rejections() {
        assert_eq!(int(&json!(1.5)).unwrap_err().kind, ViolationKind::IntParsing);
        assert_eq!(int(&json!("1.5")).unwrap_err().kind, ViolationKind::IntParsing);
        assert_eq!(int(&json!(true)).unwrap_err().kind, ViolationKind::IntType);
        assert_eq!(int(&json!([1])).unwrap_err().kind, ViolationKind::IntType);
        assert_eq!(int(&json!(1e300)).unwrap_err().kind, ViolationKind::IntParsing);
    }

    #[test]
    fn test_float_widens_integers() {
        assert_eq!(float(&json!(1)), Ok(Instance::Float(1.0)));
        assert_eq!(float(&json!("2.5")), Ok(Instance::Float(2.5)));
        assert_eq!(float(&json!(false)).unwrap_err().kind, ViolationKind::FloatType);
        assert_eq!(float(&json!("abc")).unwrap_err().kind, ViolationKind::FloatParsing);
    }

    #[test]
    fn test_bool_lax_forms() {
        for truthy in [json!(true), json!(1), json!("True"), json!("yes"), json!("ON"), json!("t")] {
            assert_eq!(boolean(&truthy), Ok(Instance::Bool(true)), "{truthy}");
        }
        for falsy in [json!(false), json!(0), json!("False"), json!("no"), json!("off"), json!("0")] {
            assert_eq!(boolean(&falsy), Ok(Instance::Bool(false)), "{falsy}");
        }
        assert!(boolean(&json!(2)).is_err());
        assert!(boolean(&json!("maybe")).is_err());
        assert!(boolean(&json!(null)).is_err());
    }

    #[test]
    fn test_string_is_strict() {
        assert_eq!(string(&json!("x")), Ok(Instance::Str("x".into())));
        assert_eq!(string(&json!(1)).unwrap_err().kind, ViolationKind::StringType);
    }

    #[test]
    fn test_none_only_accepts_null() {
        assert_eq!(none(&json!(null)), Ok(Instance::None));
        assert_eq!(none(&json!(0)).unwrap_err().kind, ViolationKind::NoneRequired);
    }

    #[test]
    fn test_any_rejects_containers() {
        assert_eq!(any(&json!("o")), Ok(Instance::Str("o".into())));
        assert_eq!(any(&json!(null)), Ok(Instance::None));
        assert_eq!(any(&json!([1])).unwrap_err().kind, ViolationKind::AnyScalar);
        assert_eq!(any(&json!({})).unwrap_err().kind, ViolationKind::AnyScalar);
    }

    #[test]
    fn test_literal_compares_numbers_by_value() {
        let expected = [json!("a"), json!(1)];
        assert_eq!(literal(&json!(1.0), &expected), Ok(Instance::Int(1)));
        assert_eq!(literal(&json!("a"), &expected), Ok(Instance::Str("a".into())));
        let err = literal(&json!(true), &expected).unwrap_err();
        assert_eq!(err.kind, ViolationKind::LiteralError);
        assert_eq!(err.message, r#"Input should be "a" or 1"#);
    }

    #[test]
    fn test_rejection_located() {
        let v = Rejection::new(ViolationKind::Missing, "Field required").at("/a/0");
        assert_eq!(v.instance_path, "/a/0");
        assert_eq!(v.kind, ViolationKind::Missing);
    }
}
