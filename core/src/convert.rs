//! `Converter` — Pluggable coercion of parameter values to declared types
//!
//! Bindings declare the parameter types of the methods they call; the session's converter turns
//! attribute and body text into those types just before invocation. [`ParamType::from_name`] is a
//! constant table, so configuration can name types without any shared lookup state.

use crate::{BindError, Value};
use std::fmt::Debug;

/// A declared parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParamType {
    /// Pass the value through unchanged.
    Any,
    /// Text.
    String,
    /// 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// Single character.
    Char,
    /// A domain object (or a pending construction).
    Object,
}

/// Type names accepted by [`ParamType::from_name`].
const TYPE_NAMES: &[(&str, ParamType)] = &[
    ("any", ParamType::Any),
    ("string", ParamType::String),
    ("str", ParamType::String),
    ("int", ParamType::Int),
    ("integer", ParamType::Int),
    ("long", ParamType::Int),
    ("short", ParamType::Int),
    ("byte", ParamType::Int),
    ("i8", ParamType::Int),
    ("i16", ParamType::Int),
    ("i32", ParamType::Int),
    ("i64", ParamType::Int),
    ("float", ParamType::Float),
    ("double", ParamType::Float),
    ("f32", ParamType::Float),
    ("f64", ParamType::Float),
    ("bool", ParamType::Bool),
    ("boolean", ParamType::Bool),
    ("char", ParamType::Char),
    ("object", ParamType::Object),
];

impl ParamType {
    /// Look up a type by name (case-insensitive).
    ///
    /// ```
    /// use xbind::ParamType;
    ///
    /// assert_eq!(ParamType::from_name("boolean"), Some(ParamType::Bool));
    /// assert_eq!(ParamType::from_name("I64"), Some(ParamType::Int));
    /// assert_eq!(ParamType::from_name("widget"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        TYPE_NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, t)| *t)
    }

    /// Canonical name of the type.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Object => "object",
        }
    }
}

/// Converts a value to a declared parameter type.
///
/// Implementations must be `Send + Sync`: one converter is shared by every session of a
/// [`Binder`](crate::Binder).
pub trait Converter: Send + Sync + Debug {
    /// Convert `value` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Conversion`] when the value has no representation in the target type.
    fn convert(&self, value: &Value, to: ParamType) -> Result<Value, BindError>;
}

/// The default converter.
///
/// - `None` stays `None` for every target type
/// - Text is parsed into numbers, booleans (`true/false`, `yes/no`, `on/off`, `1/0`) and chars
/// - Scalars render to text for `String`
/// - Objects pass through for `Object` and `Any`
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardConverter;

impl Converter for StandardConverter {
    fn convert(&self, value: &Value, to: ParamType) -> Result<Value, BindError> {
        let fail = || BindError::Conversion {
            value: format!("{value:?}"),
            target: to.name(),
        };

        if value.is_none() || to == ParamType::Any {
            return Ok(value.clone());
        }

        match to {
            ParamType::Any => Ok(value.clone()),
            ParamType::String => value.to_text().map(Value::String).ok_or_else(fail),
            ParamType::Int => match value {
                Value::Int(_) => Ok(value.clone()),
                Value::String(s) => s.trim().parse().map(Value::Int).map_err(|_| fail()),
                _ => Err(fail()),
            },
            ParamType::Float => match value {
                Value::Float(_) => Ok(value.clone()),
                Value::String(s) => s.trim().parse().map(Value::Float).map_err(|_| fail()),
                _ => value.as_float().map(Value::Float).ok_or_else(fail),
            },
            ParamType::Bool => match value {
                Value::Bool(_) => Ok(value.clone()),
                Value::String(s) => parse_bool(s.trim()).map(Value::Bool).ok_or_else(fail),
                _ => Err(fail()),
            },
            ParamType::Char => match value {
                Value::Char(_) => Ok(value.clone()),
                Value::String(s) => s.chars().next().map(Value::Char).ok_or_else(fail),
                _ => Err(fail()),
            },
            ParamType::Object => match value {
                Value::Object(_) | Value::Pending(_) => Ok(value.clone()),
                _ => Err(fail()),
            },
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    const TRUE: &[&str] = &["true", "yes", "on", "1", "y"];
    const FALSE: &[&str] = &["false", "no", "off", "0", "n"];
    if TRUE.iter().any(|t| t.eq_ignore_ascii_case(text)) {
        Some(true)
    } else if FALSE.iter().any(|f| f.eq_ignore_ascii_case(text)) {
        Some(false)
    } else {
        None
    }
}

/// Convert each argument to its declared type. Arguments beyond the declared types pass through.
pub(crate) fn convert_args(
    converter: &dyn Converter,
    types: &[ParamType],
    args: Vec<Value>,
) -> Result<Vec<Value>, BindError> {
    if types.is_empty() {
        return Ok(args);
    }
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| match types.get(i) {
            Some(ty) => converter.convert(&arg, *ty),
            None => Ok(arg),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(value: impl Into<Value>, to: ParamType) -> Result<Value, BindError> {
        StandardConverter.convert(&value.into(), to)
    }

    #[test]
    fn text_to_scalars() {
        assert_eq!(convert(" 42 ", ParamType::Int).unwrap(), Value::Int(42));
        assert_eq!(convert("2.5", ParamType::Float).unwrap(), Value::Float(2.5));
        assert_eq!(convert("Yes", ParamType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(convert("off", ParamType::Bool).unwrap(), Value::Bool(false));
        assert_eq!(convert("xyz", ParamType::Char).unwrap(), Value::Char('x'));
    }

    #[test]
    fn scalars_to_text() {
        assert_eq!(
            convert(7_i64, ParamType::String).unwrap(),
            Value::String("7".into())
        );
        assert_eq!(
            convert(true, ParamType::String).unwrap(),
            Value::String("true".into())
        );
    }

    #[test]
    fn none_passes_through() {
        for ty in [ParamType::Int, ParamType::String, ParamType::Object] {
            assert_eq!(StandardConverter.convert(&Value::None, ty).unwrap(), Value::None);
        }
    }

    #[test]
    fn unconvertible_values_fail() {
        assert!(matches!(
            convert("abc", ParamType::Int),
            Err(BindError::Conversion { target: "int", .. })
        ));
        assert!(convert("maybe", ParamType::Bool).is_err());
        assert!(convert("", ParamType::Char).is_err());
        assert!(convert("text", ParamType::Object).is_err());
        assert!(StandardConverter
            .convert(&Value::object(1_u8), ParamType::String)
            .is_err());
    }

    #[test]
    fn int_widens_to_float() {
        assert_eq!(convert(3_i64, ParamType::Float).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn convert_args_only_touches_declared_positions() {
        let args = vec![Value::from("1"), Value::from("2")];
        let out = convert_args(&StandardConverter, &[ParamType::Int], args).unwrap();
        assert_eq!(out, vec![Value::Int(1), Value::String("2".into())]);
    }
}
