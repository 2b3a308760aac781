//! Composite validation: maps, lists and structs
//!
//! [`FieldRules`] erases the value type of a rule set so that structs can hold
//! fields of any type, including nested maps, lists and structs. A struct
//! validates its fields one at a time in declaration order and stops at the
//! first failure, which comes back wrapped with the field name. Nesting adds
//! one layer of context per level, so a deep failure reads like
//! `inputs.features.kind: must be defined`.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::primitive::Primitive;
use crate::rules::Rules;
use crate::source;
use crate::validate::{require, validate, validate_missing};
use crate::value::{Value, ValueMap};

/// A rule set for one field, whatever its type
pub trait FieldRules: Send + Sync {
    /// Resolve the field's raw value. `None` means the key is absent.
    fn resolve(&self, value: Option<&Value>) -> Result<Value>;

    /// Name of the accepted type, for diagnostics
    fn type_name(&self) -> &'static str;
}

impl<T: Primitive> FieldRules for Rules<T> {
    fn resolve(&self, value: Option<&Value>) -> Result<Value> {
        let resolved = match value {
            Some(value) => source::from_value(value, self)?,
            None => validate_missing(self)?,
        };
        Ok(resolved.map(T::into_value).unwrap_or(Value::Null))
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }
}

/// Resolve `key` from a map of dynamic values with any field rule set
pub fn from_value_map(key: &str, map: &ValueMap, rules: &dyn FieldRules) -> Result<Value> {
    rules.resolve(map.get(key)).map_err(|e| e.with_key(key))
}

/// Validates a whole mapping after its structure has been checked
pub type MapValidator = Arc<dyn Fn(ValueMap) -> Result<ValueMap> + Send + Sync>;

/// Rules for a free-form mapping of dynamic values
#[derive(Clone, Default)]
pub struct MapRules {
    pub required: bool,
    pub default: Option<ValueMap>,
    pub disallow_null: bool,
    pub allow_empty: bool,
    pub validator: Option<MapValidator>,
}

impl fmt::Debug for MapRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapRules")
            .field("required", &self.required)
            .field("default", &self.default)
            .field("disallow_null", &self.disallow_null)
            .field("allow_empty", &self.allow_empty)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl MapRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: ValueMap) -> Self {
        self.default = Some(default);
        self
    }

    pub fn disallow_null(mut self) -> Self {
        self.disallow_null = true;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(ValueMap) -> Result<ValueMap> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Resolve a mapping. `None` or a null value is absent.
    pub fn resolve_map(&self, value: Option<&Value>) -> Result<Option<ValueMap>> {
        let map = match value {
            None | Some(Value::Null) => {
                if self.required {
                    return Err(Error::must_be_defined());
                }
                self.default.clone()
            }
            Some(Value::Mapping(map)) => Some(map.clone()),
            Some(other) => return Err(Error::invalid_primitive_type(other.describe(), "map")),
        };

        let Some(map) = map else {
            if self.disallow_null {
                return Err(Error::cannot_be_null());
            }
            return Ok(None);
        };
        if map.is_empty() && !self.allow_empty {
            return Err(Error::empty_not_allowed());
        }
        match &self.validator {
            Some(validator) => validator(map).map(Some),
            None => Ok(Some(map)),
        }
    }
}

impl FieldRules for MapRules {
    fn resolve(&self, value: Option<&Value>) -> Result<Value> {
        Ok(self.resolve_map(value)?.map(Value::Mapping).unwrap_or(Value::Null))
    }

    fn type_name(&self) -> &'static str {
        "map"
    }
}

/// Validates a whole list after every element has been validated
pub type ListValidator<T> = Arc<dyn Fn(Vec<T>) -> Result<Vec<T>> + Send + Sync>;

/// Rules for a list of primitives. Each element is validated against
/// `element`; element errors are wrapped with their index.
#[derive(Clone)]
pub struct ListRules<T> {
    pub required: bool,
    pub default: Option<Vec<T>>,
    pub disallow_null: bool,
    pub allow_empty: bool,
    pub element: Rules<T>,
    pub validator: Option<ListValidator<T>>,
}

impl<T> Default for ListRules<T> {
    fn default() -> Self {
        Self {
            required: false,
            default: None,
            disallow_null: false,
            allow_empty: false,
            element: Rules::default(),
            validator: None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ListRules<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListRules")
            .field("required", &self.required)
            .field("default", &self.default)
            .field("disallow_null", &self.disallow_null)
            .field("allow_empty", &self.allow_empty)
            .field("element", &self.element)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl<T: Primitive> ListRules<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Vec<T>) -> Self {
        self.default = Some(default);
        self
    }

    pub fn disallow_null(mut self) -> Self {
        self.disallow_null = true;
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    pub fn with_element(mut self, element: Rules<T>) -> Self {
        self.element = element;
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(Vec<T>) -> Result<Vec<T>> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Resolve a list. `None` or a null value is absent; default elements are
    /// validated like supplied ones.
    pub fn resolve_list(&self, value: Option<&Value>) -> Result<Option<Vec<T>>> {
        let list = match value {
            None | Some(Value::Null) => {
                if self.required {
                    return Err(Error::must_be_defined());
                }
                match &self.default {
                    Some(default) => Some(self.validate_defaults(default)?),
                    None => None,
                }
            }
            Some(Value::Sequence(items)) => Some(self.resolve_elements(items)?),
            Some(other) => return Err(Error::invalid_primitive_type(other.describe(), "list")),
        };

        let Some(list) = list else {
            if self.disallow_null {
                return Err(Error::cannot_be_null());
            }
            return Ok(None);
        };
        if list.is_empty() && !self.allow_empty {
            return Err(Error::empty_not_allowed());
        }
        match &self.validator {
            Some(validator) => validator(list).map(Some),
            None => Ok(Some(list)),
        }
    }

    fn resolve_elements(&self, items: &[Value]) -> Result<Vec<T>> {
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                source::from_value(item, &self.element)
                    .and_then(require)
                    .map_err(|e| e.with_index(idx))
            })
            .collect()
    }

    fn validate_defaults(&self, default: &[T]) -> Result<Vec<T>> {
        default
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                validate(Some(item.clone()), &self.element)
                    .and_then(require)
                    .map_err(|e| e.with_index(idx))
            })
            .collect()
    }
}

impl<T: Primitive> FieldRules for ListRules<T> {
    fn resolve(&self, value: Option<&Value>) -> Result<Value> {
        let resolved = self.resolve_list(value)?;
        Ok(resolved
            .map(|list| Value::Sequence(list.into_iter().map(T::into_value).collect()))
            .unwrap_or(Value::Null))
    }

    fn type_name(&self) -> &'static str {
        "list"
    }
}

/// One declared struct field
#[derive(Clone)]
pub struct StructField {
    pub name: String,
    pub rules: Arc<dyn FieldRules>,
}

impl fmt::Debug for StructField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructField")
            .field("name", &self.name)
            .field("type", &self.rules.type_name())
            .finish()
    }
}

/// Rules for a mapping with a fixed, ordered set of named fields
///
/// ```rust
/// use confval_core::{Rules, StructRules, Value, ValueMap};
///
/// let compute = StructRules::new()
///     .field("cpu", Rules::<f64>::new().with_default(1.0).greater_than(0.0))
///     .field("replicas", Rules::<i64>::new().required());
///
/// let err = compute.resolve_struct(Some(&Value::Mapping(ValueMap::new()))).unwrap_err();
/// assert_eq!(err.to_string(), "replicas: must be defined");
/// ```
#[derive(Clone, Default)]
pub struct StructRules {
    /// The struct itself must be present
    pub required: bool,
    /// When absent and not required, resolve to null instead of filling in
    /// every field's default
    pub default_null: bool,
    /// Accept keys that no field declares (they are dropped from the output)
    pub allow_extra_keys: bool,
    pub fields: Vec<StructField>,
    /// Cross-field checks, run after every field has resolved
    pub validator: Option<MapValidator>,
}

impl fmt::Debug for StructRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructRules")
            .field("required", &self.required)
            .field("default_null", &self.default_null)
            .field("allow_extra_keys", &self.allow_extra_keys)
            .field("fields", &self.fields)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl StructRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_null(mut self) -> Self {
        self.default_null = true;
        self
    }

    pub fn allow_extra_keys(mut self) -> Self {
        self.allow_extra_keys = true;
        self
    }

    /// Declare the next field
    pub fn field(mut self, name: impl Into<String>, rules: impl FieldRules + 'static) -> Self {
        self.fields.push(StructField {
            name: name.into(),
            rules: Arc::new(rules),
        });
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(ValueMap) -> Result<ValueMap> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|field| field.name == key)
    }

    /// Resolve a struct. The output holds exactly the declared fields, in
    /// declaration order.
    pub fn resolve_struct(&self, value: Option<&Value>) -> Result<Option<ValueMap>> {
        let empty = ValueMap::new();
        let input = match value {
            None | Some(Value::Null) => {
                if self.required {
                    return Err(Error::must_be_defined());
                }
                if self.default_null {
                    return Ok(None);
                }
                &empty
            }
            Some(Value::Mapping(map)) => map,
            Some(other) => return Err(Error::invalid_primitive_type(other.describe(), "map")),
        };

        if !self.allow_extra_keys {
            if let Some(key) = input.keys().find(|key| !self.declares(key)) {
                return Err(Error::unsupported_key(key.as_str()));
            }
        }

        let mut output = ValueMap::with_capacity(self.fields.len());
        for field in &self.fields {
            log::trace!("Validating field '{}' ({})", field.name, field.rules.type_name());
            let resolved = from_value_map(&field.name, input, field.rules.as_ref())?;
            output.insert(field.name.clone(), resolved);
        }

        match &self.validator {
            Some(validator) => validator(output).map(Some),
            None => Ok(Some(output)),
        }
    }

    /// Resolve and decode into a caller-defined type
    ///
    /// Duration fields come out as strings such as `"1m30s"`, so decode them
    /// into a `String` (or a type with a matching `Deserialize` impl).
    pub fn resolve_into<D: DeserializeOwned>(&self, value: &Value) -> Result<D> {
        let resolved = self.resolve_struct(Some(value))?;
        let json = resolved
            .map(|map| Value::Mapping(map).to_json())
            .unwrap_or(serde_json::Value::Null);
        serde_json::from_value(json).map_err(|e| Error::decode(e.to_string()))
    }
}

impl FieldRules for StructRules {
    fn resolve(&self, value: Option<&Value>) -> Result<Value> {
        Ok(self.resolve_struct(value)?.map(Value::Mapping).unwrap_or(Value::Null))
    }

    fn type_name(&self) -> &'static str {
        "struct"
    }
}
