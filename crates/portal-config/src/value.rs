//! The untyped value cell stored in every configuration slot.
//!
//! Values are stored as a small sum type and coerced on every typed read,
//! never at write time.  This mirrors how configuration data actually flows:
//! the file layer produces strings, the default layer produces whatever type
//! the registering code used, and the read side decides what it needs.
//!
//! # Coercion rules
//!
//! | accessor | `Str`                | `Int`        | `Bool`      | `Null` |
//! |----------|----------------------|--------------|-------------|--------|
//! | string   | as-is                | base-10 text | true/false  | fail   |
//! | integer  | base-10 parse        | as-is        | 0 / 1       | fail   |
//! | boolean  | yes/true/1, no/false/0 (case-insensitive) on the stringified value | fail |
//!
//! The boolean mapping is deliberately asymmetric: both recognised outcomes
//! report success, an unrecognised string reports failure so the caller's
//! default wins.  Getter callers see failure as `(default, false)`, never as
//! an error.

/// A configuration value: string, integer, boolean, or explicitly null.
///
/// `Null` models a key that is registered (so it shows up in the save
/// manifest with its comment) but has no usable value yet; every typed read
/// of a `Null` reports not-found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Bool(bool),
    Null,
}

impl Value {
    /// Returns the textual form of the value, or `None` for [`Value::Null`].
    ///
    /// This is the form written to disk and the form the boolean coercion
    /// lower-cases before comparing.
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
            Value::Null => None,
        }
    }

    /// String coercion: stringify unconditionally, fail only on `Null`.
    pub fn as_str_coerced(&self) -> Option<String> {
        self.render()
    }

    /// Integer coercion: base-10 parse for strings, pass-through for
    /// integers, 0/1 for booleans, failure for `Null` and unparsable text.
    pub fn as_int_coerced(&self) -> Option<i64> {
        match self {
            Value::Str(s) => s.trim().parse::<i64>().ok(),
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Null => None,
        }
    }

    /// Boolean coercion over the stringified value.
    ///
    /// `yes`/`true`/`1` (any letter case) → `Some(true)`,
    /// `no`/`false`/`0` → `Some(false)`, anything else → `None`.  Note that
    /// a recognised *false* is a successful read; only unrecognised text
    /// fails.
    pub fn as_bool_coerced(&self) -> Option<bool> {
        let text = self.render()?;
        match text.to_lowercase().as_str() {
            "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
