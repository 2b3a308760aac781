//! Validation rule sets
//!
//! A [`Rules`] value describes everything a field accepts: whether it must be
//! present, what to substitute when it is not, whether null is allowed, the
//! allowed values, ordering bounds and an optional custom validator. Rule sets
//! are built once per field definition and never mutated afterwards.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// A custom validator. Runs after all structural checks and may replace or
/// reject the value.
pub type Validator<T> = Arc<dyn Fn(Option<T>) -> Result<Option<T>> + Send + Sync>;

/// Which ordering bound a value violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundKind {
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
}

impl BoundKind {
    /// Whether `value` satisfies this bound against `limit`
    pub fn holds<T: PartialOrd>(self, value: &T, limit: &T) -> bool {
        match self {
            BoundKind::GreaterThan => value > limit,
            BoundKind::GreaterThanOrEqualTo => value >= limit,
            BoundKind::LessThan => value < limit,
            BoundKind::LessThanOrEqualTo => value <= limit,
        }
    }
}

impl fmt::Display for BoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phrase = match self {
            BoundKind::GreaterThan => "greater than",
            BoundKind::GreaterThanOrEqualTo => "greater than or equal to",
            BoundKind::LessThan => "less than",
            BoundKind::LessThanOrEqualTo => "less than or equal to",
        };
        f.write_str(phrase)
    }
}

/// Validation rule set for a single typed field
///
/// ```rust
/// use confval_core::Rules;
///
/// let replicas = Rules::<i64>::new()
///     .with_default(1)
///     .greater_than(0)
///     .less_than_or_equal_to(100);
/// assert_eq!(replicas.default, Some(1));
/// ```
#[derive(Clone)]
pub struct Rules<T> {
    /// Absence is an error; `default` is never used
    pub required: bool,
    /// Substituted when the value is absent and not required
    pub default: Option<T>,
    /// Reject a resolved null
    pub disallow_null: bool,
    /// If non-empty, the value must be one of these
    pub allowed_values: Vec<T>,
    pub greater_than: Option<T>,
    pub greater_than_or_equal_to: Option<T>,
    pub less_than: Option<T>,
    pub less_than_or_equal_to: Option<T>,
    /// Runs last
    pub validator: Option<Validator<T>>,
}

impl<T> Default for Rules<T> {
    fn default() -> Self {
        Self {
            required: false,
            default: None,
            disallow_null: false,
            allowed_values: Vec::new(),
            greater_than: None,
            greater_than_or_equal_to: None,
            less_than: None,
            less_than_or_equal_to: None,
            validator: None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Rules<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("required", &self.required)
            .field("default", &self.default)
            .field("disallow_null", &self.disallow_null)
            .field("allowed_values", &self.allowed_values)
            .field("greater_than", &self.greater_than)
            .field("greater_than_or_equal_to", &self.greater_than_or_equal_to)
            .field("less_than", &self.less_than)
            .field("less_than_or_equal_to", &self.less_than_or_equal_to)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl<T> Rules<T> {
    /// An empty rule set: optional, no default, null allowed, unconstrained
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: T) -> Self {
        self.default = Some(value);
        self
    }

    pub fn disallow_null(mut self) -> Self {
        self.disallow_null = true;
        self
    }

    pub fn allowed_values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.allowed_values = values.into_iter().collect();
        self
    }

    pub fn greater_than(mut self, limit: T) -> Self {
        self.greater_than = Some(limit);
        self
    }

    pub fn greater_than_or_equal_to(mut self, limit: T) -> Self {
        self.greater_than_or_equal_to = Some(limit);
        self
    }

    pub fn less_than(mut self, limit: T) -> Self {
        self.less_than = Some(limit);
        self
    }

    pub fn less_than_or_equal_to(mut self, limit: T) -> Self {
        self.less_than_or_equal_to = Some(limit);
        self
    }

    /// Attach a custom validator
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(Option<T>) -> Result<Option<T>> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// The configured bounds, in the order they are checked
    pub fn bounds(&self) -> impl Iterator<Item = (BoundKind, &T)> {
        [
            (BoundKind::GreaterThan, self.greater_than.as_ref()),
            (BoundKind::GreaterThanOrEqualTo, self.greater_than_or_equal_to.as_ref()),
            (BoundKind::LessThan, self.less_than.as_ref()),
            (BoundKind::LessThanOrEqualTo, self.less_than_or_equal_to.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, limit)| limit.map(|l| (kind, l)))
    }
}
