//! confval-core: typed configuration values with declarative rules
//!
//! A value comes from a source (an already-parsed document, a string, an
//! environment variable, a file or an interactive prompt), is coerced to a
//! primitive type and then checked against a [`Rules`] set: required,
//! default, nullability, an allowed set, ordering bounds and a custom
//! validator. Absent values fall back to the default, and the default is
//! validated like any other value.
//!
//! # Example
//!
//! ```rust
//! use confval_core::{from_value_map, Rules, Value};
//!
//! let document: Value = serde_json::from_str(r#"{"replicas": 3}"#).unwrap();
//! let map = document.as_mapping().unwrap();
//!
//! let replicas = from_value_map("replicas", map, &Rules::<i64>::new().greater_than(0)).unwrap();
//! assert_eq!(replicas, Some(3));
//!
//! let err = from_value_map("cpu", map, &Rules::<f64>::new().required()).unwrap_err();
//! assert_eq!(err.to_string(), "cpu: must be defined");
//! ```

pub mod composite;
pub mod duration;
pub mod environment;
pub mod error;
pub mod primitive;
pub mod prompt;
pub mod rules;
pub mod source;
pub mod validate;
pub mod value;

pub use composite::{FieldRules, ListRules, MapRules, StructRules};
pub use environment::{Environment, MapEnvironment, SystemEnvironment};
pub use error::{Error, ErrorKind, Result, Source};
pub use primitive::{coerce_str, coerce_value, Primitive};
pub use prompt::{PromptOptions, Prompter, ScriptedPrompter, TerminalPrompter};
pub use rules::{BoundKind, Rules, Validator};
pub use source::{from_str, from_str_map, from_value, from_value_map, Sources};
pub use validate::{require, validate, validate_missing};
pub use value::{Value, ValueMap};
