//! Type-exact coercion of raw values into Rust primitives
//!
//! A [`Primitive`] knows how to take itself out of a dynamic [`Value`], how to
//! parse itself from text, and how to put itself back into a [`Value`].
//! Coercion never guesses: an integer field rejects `"5"` and `3.5`, a string
//! field rejects `5`. Text parsing is only used for text-based sources
//! (string maps, environment variables, files, prompts).

use std::time::Duration;

use crate::duration::{format_duration, parse_duration};
use crate::error::{Error, Result};
use crate::value::Value;

/// A type that rule sets can be written for
pub trait Primitive: Clone + PartialEq + PartialOrd + Send + Sync + 'static {
    /// Name used in type-mismatch errors (e.g. `"int"`)
    const TYPE_NAME: &'static str;

    /// Take a value of exactly this type out of a dynamic value
    fn from_value(value: &Value) -> Option<Self>;

    /// Parse the canonical text form
    fn parse_str(text: &str) -> Option<Self>;

    /// Convert back into a dynamic value
    fn into_value(self) -> Value;

    /// Render for error messages
    fn describe(&self) -> String;
}

/// Coerce a dynamic value, failing with a type-mismatch error
pub fn coerce_value<T: Primitive>(value: &Value) -> Result<T> {
    T::from_value(value).ok_or_else(|| Error::invalid_primitive_type(value.describe(), T::TYPE_NAME))
}

/// Parse text, failing with a type-mismatch error
pub fn coerce_str<T: Primitive>(text: &str) -> Result<T> {
    T::parse_str(text).ok_or_else(|| Error::invalid_primitive_type(format!("{:?}", text), T::TYPE_NAME))
}

/// Whole floats (`3.0`) are accepted as integers; fractional ones are not.
fn whole_float(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl Primitive for $ty {
                const TYPE_NAME: &'static str = "int";

                fn from_value(value: &Value) -> Option<Self> {
                    let wide = match value {
                        Value::Integer(i) => *i,
                        Value::Float(f) => whole_float(*f)?,
                        _ => return None,
                    };
                    <$ty>::try_from(wide).ok()
                }

                fn parse_str(text: &str) -> Option<Self> {
                    text.parse().ok()
                }

                fn into_value(self) -> Value {
                    Value::Integer(self as i64)
                }

                fn describe(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer!(i64, i32, u32, u16);

impl Primitive for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64().filter(|f| f.is_finite())
    }

    fn parse_str(text: &str) -> Option<Self> {
        text.parse::<f64>().ok().filter(|f| f.is_finite())
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn describe(&self) -> String {
        // Debug keeps the fraction: 1.0, not 1
        format!("{:?}", self)
    }
}

impl Primitive for f32 {
    const TYPE_NAME: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value)
            .map(|f| f as f32)
            .filter(|f| f.is_finite())
    }

    fn parse_str(text: &str) -> Option<Self> {
        text.parse::<f32>().ok().filter(|f| f.is_finite())
    }

    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }

    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

impl Primitive for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }

    fn parse_str(text: &str) -> Option<Self> {
        match text {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl Primitive for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn parse_str(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

impl Primitive for Duration {
    const TYPE_NAME: &'static str = "duration";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().and_then(parse_duration)
    }

    fn parse_str(text: &str) -> Option<Self> {
        parse_duration(text)
    }

    fn into_value(self) -> Value {
        Value::String(format_duration(self))
    }

    fn describe(&self) -> String {
        format_duration(*self)
    }
}
