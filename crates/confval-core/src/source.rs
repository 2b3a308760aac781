//! Source adapters
//!
//! Every adapter follows the same template: decide whether the source holds a
//! value, then either coerce and validate it or hand absence to
//! [`validate_missing`]. Keyed sources attach their key, environment variable
//! name or file path to any error before returning it.
//!
//! | Source | Present when |
//! |---|---|
//! | [`from_value`] | the value is not null |
//! | [`from_value_map`] | the key exists and its value is not null |
//! | [`from_str`] | the text is non-empty |
//! | [`from_str_map`] | the key exists and its text is non-empty |
//! | [`Sources::env`] | the variable is set and non-empty |
//! | [`Sources::file`] | the file is readable and its trimmed contents are non-empty |
//! | [`Sources::env_or_file`] | the variable is set and non-empty, otherwise as [`Sources::file`] |
//! | [`Sources::prompt`] | the user enters text (or the prompt has a default string) |
//!
//! Empty text counts as absent everywhere, so an explicitly empty variable and
//! an unset one resolve the same way.

use std::collections::HashMap;
use std::hash::BuildHasher;
use std::path::Path;
use std::sync::Arc;

use crate::environment::{Environment, SystemEnvironment};
use crate::error::{Error, Result};
use crate::primitive::{coerce_str, coerce_value, Primitive};
use crate::prompt::{ask, PromptOptions, Prompter, TerminalPrompter};
use crate::rules::Rules;
use crate::validate::{validate, validate_missing};
use crate::value::{Value, ValueMap};

/// Resolve an already-parsed dynamic value
pub fn from_value<T: Primitive>(value: &Value, rules: &Rules<T>) -> Result<Option<T>> {
    if value.is_null() {
        log::trace!("Null {} value, resolving as absent", T::TYPE_NAME);
        return validate_missing(rules);
    }
    log::trace!("Resolving {} from dynamic value", T::TYPE_NAME);
    let coerced = coerce_value(value)?;
    validate(Some(coerced), rules)
}

/// Resolve `key` from a map of dynamic values
pub fn from_value_map<T: Primitive>(key: &str, map: &ValueMap, rules: &Rules<T>) -> Result<Option<T>> {
    log::trace!("Resolving {} from map key '{}'", T::TYPE_NAME, key);
    let result = match map.get(key) {
        Some(value) => from_value(value, rules),
        None => validate_missing(rules),
    };
    result.map_err(|e| e.with_key(key))
}

/// Resolve text using the type's canonical grammar
pub fn from_str<T: Primitive>(text: &str, rules: &Rules<T>) -> Result<Option<T>> {
    if text.is_empty() {
        log::trace!("Empty {} text, resolving as absent", T::TYPE_NAME);
        return validate_missing(rules);
    }
    log::trace!("Resolving {} from text", T::TYPE_NAME);
    let coerced = coerce_str(text)?;
    validate(Some(coerced), rules)
}

/// Resolve `key` from a map of strings (e.g. parsed command-line flags)
pub fn from_str_map<T: Primitive, S: BuildHasher>(
    key: &str,
    map: &HashMap<String, String, S>,
    rules: &Rules<T>,
) -> Result<Option<T>> {
    log::trace!("Resolving {} from string map key '{}'", T::TYPE_NAME, key);
    let text = map.get(key).map(String::as_str).unwrap_or_default();
    from_str(text, rules).map_err(|e| e.with_key(key))
}

/// Sources that need the outside world: environment variables, files and
/// prompts
///
/// ```rust
/// use confval_core::{MapEnvironment, Rules, Sources};
///
/// let sources = Sources::system().with_environment(MapEnvironment::new().with_var("PORT", "8080"));
/// let port = sources.env("PORT", &Rules::<u16>::new().required()).unwrap();
/// assert_eq!(port, Some(8080));
/// ```
#[derive(Clone)]
pub struct Sources {
    environment: Arc<dyn Environment>,
    prompter: Arc<dyn Prompter>,
}

impl Default for Sources {
    fn default() -> Self {
        Self::system()
    }
}

impl Sources {
    pub fn new(environment: Arc<dyn Environment>, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            environment,
            prompter,
        }
    }

    /// The process environment, the real file system and a terminal prompt
    pub fn system() -> Self {
        Self::new(Arc::new(SystemEnvironment), Arc::new(TerminalPrompter))
    }

    /// Replace the environment
    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Arc::new(environment);
        self
    }

    /// Replace the prompter
    pub fn with_prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Arc::new(prompter);
        self
    }

    /// Resolve an environment variable
    pub fn env<T: Primitive>(&self, name: &str, rules: &Rules<T>) -> Result<Option<T>> {
        log::trace!("Resolving {} from environment variable {}", T::TYPE_NAME, name);
        let text = self.environment.var(name).unwrap_or_default();
        from_str(&text, rules).map_err(|e| e.with_env_var(name))
    }

    /// Resolve the trimmed contents of a file
    pub fn file<T: Primitive>(&self, path: impl AsRef<Path>, rules: &Rules<T>) -> Result<Option<T>> {
        let path = path.as_ref();
        log::trace!("Resolving {} from file {}", T::TYPE_NAME, path.display());
        let contents = self.environment.read_file(path).unwrap_or_default();
        from_str(contents.trim(), rules).map_err(|e| e.with_file(path))
    }

    /// Resolve an environment variable, falling back to a file when the
    /// variable is unset or empty. The file is not read when the variable is set.
    pub fn env_or_file<T: Primitive>(
        &self,
        name: &str,
        path: impl AsRef<Path>,
        rules: &Rules<T>,
    ) -> Result<Option<T>> {
        match self.environment.var(name) {
            Some(text) if !text.is_empty() => {
                log::trace!("Resolving {} from environment variable {}", T::TYPE_NAME, name);
                from_str(&text, rules).map_err(|e| e.with_env_var(name))
            }
            _ => self.file(path, rules),
        }
    }

    /// Ask the user. Errors about a secret answer carry `********` in place
    /// of the answer.
    pub fn prompt<T: Primitive>(&self, options: &PromptOptions, rules: &Rules<T>) -> Result<Option<T>> {
        log::trace!("Resolving {} from prompt '{}'", T::TYPE_NAME, options.prompt);
        let text = ask(self.prompter.as_ref(), options)?;
        let result = from_str(&text, rules);
        if options.is_secret() {
            return result.map_err(Error::masked);
        }
        result
    }
}
