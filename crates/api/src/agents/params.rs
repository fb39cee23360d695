//! Tool parameters.
//!
//! Parameters arrive as a JSON object, often from form fields or CLI flags
//! where every value is a string. [`ToolParams::coerce`] normalizes those:
//! all-digit strings become integers, digit strings with dots become floats,
//! `true`/`false` in any case become booleans, and nulls are dropped.

use std::str::FromStr;

use serde_json::{Map, Value};

use super::ToolError;

/// A tool's named arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolParams(Map<String, Value>);

fn coerce_value(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(coerce_str(s)),
        other => Some(other),
    }
}

fn coerce_str(s: String) -> Value {
    let is_digits = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());

    if is_digits(&s) {
        if let Ok(n) = s.parse::<i64>() {
            return Value::from(n);
        }
    } else if is_digits(&s.replace('.', "")) {
        if let Ok(f) = s.parse::<f64>() {
            return Value::from(f);
        }
    } else if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    } else if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(s)
}

impl ToolParams {
    /// Empty parameter set; every tool falls back to its defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a JSON object as-is. `null` is treated as no parameters.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if `value` is neither an object
    /// nor null.
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(ToolError::invalid(
                "parameters",
                format!("expected a JSON object, got {other}"),
            )),
        }
    }

    /// Like [`Self::from_value`], with string coercion applied to every entry.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if `value` is neither an object
    /// nor null.
    pub fn coerce(value: Value) -> Result<Self, ToolError> {
        let Self(map) = Self::from_value(value)?;
        Ok(Self(
            map.into_iter()
                .filter_map(|(k, v)| coerce_value(v).map(|v| (k, v)))
                .collect(),
        ))
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// The parameters as a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Optional integer. Whole floats are accepted.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` for any other type.
    #[allow(clippy::cast_possible_truncation)]
    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>, ToolError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        if let Some(n) = value.as_i64() {
            return Ok(Some(n));
        }
        match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(Some(f as i64)),
            _ => Err(ToolError::invalid(key, format!("expected an integer, got {value}"))),
        }
    }

    /// Integer with a default.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if present and not an integer.
    pub fn i64_or(&self, key: &str, default: i64) -> Result<i64, ToolError> {
        Ok(self.opt_i64(key)?.unwrap_or(default))
    }

    /// A window length in days: an integer that is not negative.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if not an integer or negative.
    pub fn days_or(&self, key: &str, default: i64) -> Result<i64, ToolError> {
        let days = self.i64_or(key, default)?;
        if days < 0 {
            return Err(ToolError::invalid(key, "must not be negative"));
        }
        Ok(days)
    }

    /// Optional 32-bit database ID.
    ///
    /// Zero counts as absent, matching how the tools treat a blank ID field.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if not an integer or out of range.
    pub fn opt_id(&self, key: &str) -> Result<Option<i32>, ToolError> {
        match self.opt_i64(key)? {
            None | Some(0) => Ok(None),
            Some(n) => i32::try_from(n)
                .map(Some)
                .map_err(|_| ToolError::invalid(key, format!("{n} is out of range"))),
        }
    }

    /// Boolean with a default.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if present and not a boolean.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ToolError> {
        self.get(key).map_or(Ok(default), |value| {
            value
                .as_bool()
                .ok_or_else(|| ToolError::invalid(key, format!("expected a boolean, got {value}")))
        })
    }

    /// Optional string.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if present and not a string.
    pub fn opt_str(&self, key: &str) -> Result<Option<&str>, ToolError> {
        self.get(key)
            .map(|value| {
                value
                    .as_str()
                    .ok_or_else(|| ToolError::invalid(key, format!("expected a string, got {value}")))
            })
            .transpose()
    }

    /// String with a default.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if present and not a string.
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, ToolError> {
        Ok(self.opt_str(key)?.unwrap_or(default))
    }

    /// Optional string parsed into a vocabulary type.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::InvalidParameter` if present and unparseable.
    pub fn opt_parse<T>(&self, key: &str) -> Result<Option<T>, ToolError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.opt_str(key)?
            .map(|raw| raw.parse::<T>().map_err(|e| ToolError::invalid(key, e.to_string())))
            .transpose()
    }
}
