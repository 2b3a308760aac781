//! Core validation and missing-value resolution
//!
//! [`validate`] applies a [`Rules`] to an already-coerced value:
//!
//! 1. null check (`disallow_null`)
//! 2. membership in `allowed_values`
//! 3. each configured ordering bound
//! 4. the custom validator
//!
//! The first violated constraint wins. [`validate_missing`] handles absence:
//! required fields fail, others get their default, and the default goes
//! through [`validate`] like any other value.

use crate::error::{Error, Result};
use crate::primitive::Primitive;
use crate::rules::Rules;

/// Validate a coerced (possibly null) value against a rule set
pub fn validate<T: Primitive>(value: Option<T>, rules: &Rules<T>) -> Result<Option<T>> {
    if rules.disallow_null && value.is_none() {
        return Err(Error::cannot_be_null());
    }

    if let Some(v) = &value {
        validate_present(v, rules)?;
    }

    match &rules.validator {
        Some(validator) => validator(value),
        None => Ok(value),
    }
}

/// Resolve an absent value: fail if required, otherwise validate the default
pub fn validate_missing<T: Primitive>(rules: &Rules<T>) -> Result<Option<T>> {
    if rules.required {
        return Err(Error::must_be_defined());
    }
    if let Some(default) = &rules.default {
        log::debug!("Value absent, substituting default {}", default.describe());
    }
    validate(rules.default.clone(), rules)
}

/// Membership and bound checks for a non-null value
fn validate_present<T: Primitive>(value: &T, rules: &Rules<T>) -> Result<()> {
    if !rules.allowed_values.is_empty() && !rules.allowed_values.contains(value) {
        return Err(Error::not_in_allowed_set(
            value.describe(),
            rules.allowed_values.iter().map(|v| v.describe()).collect(),
        ));
    }

    for (bound, limit) in rules.bounds() {
        if !bound.holds(value, limit) {
            return Err(Error::out_of_bounds(value.describe(), bound, limit.describe()));
        }
    }
    Ok(())
}

/// Unwrap a resolved value for callers that need a non-nullable type
pub fn require<T>(value: Option<T>) -> Result<T> {
    value.ok_or_else(Error::cannot_be_null)
}
