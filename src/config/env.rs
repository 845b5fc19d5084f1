//! Environment integration: importing variables and exporting values.
//!
//! Exports go through [`EnvironmentSink`], so the loader never touches process
//! globals directly. [`ProcessEnvironment`] writes to the real process
//! environment; [`MemoryEnvironment`] keeps everything in maps for tests and
//! embedding.

use std::collections::HashMap;
use std::ffi::OsString;
use std::sync::{LazyLock, Mutex, PoisonError};

use super::value::Value;

/// Target for exported configuration values.
///
/// A sink holds two namespaces: variables, which can be overwritten, and
/// constants, which are defined once and never change afterwards.
pub trait EnvironmentSink {
    /// Returns `true` if `name` exists as a variable or a constant.
    fn is_set(&self, name: &str) -> bool;

    /// Defines the constant `name` unless it is already defined.
    ///
    /// Returns `true` if the constant was defined by this call.
    fn set_if_absent(&mut self, name: &str, value: &Value) -> bool;

    /// Sets the variable `name`, replacing any previous value.
    fn set_always(&mut self, name: &str, value: &str);
}

static PROCESS_CONSTANTS: LazyLock<Mutex<HashMap<String, Value>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Sink backed by the process environment and a process-wide constant table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl ProcessEnvironment {
    /// Returns the process-wide constant `name`, if defined.
    pub fn constant(name: &str) -> Option<Value> {
        PROCESS_CONSTANTS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl EnvironmentSink for ProcessEnvironment {
    fn is_set(&self, name: &str) -> bool {
        Self::constant(name).is_some() || std::env::var_os(name).is_some()
    }

    fn set_if_absent(&mut self, name: &str, value: &Value) -> bool {
        let mut constants = PROCESS_CONSTANTS
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if constants.contains_key(name) {
            return false;
        }
        constants.insert(name.to_string(), value.clone());
        true
    }

    fn set_always(&mut self, name: &str, value: &str) {
        std::env::set_var(name, value);
    }
}

/// In-memory sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryEnvironment {
    vars: HashMap<String, String>,
    constants: HashMap<String, Value>,
}

impl MemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink with pre-existing variables.
    pub fn with_vars(
        vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            constants: HashMap::new(),
        }
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }

    pub fn vars(&self) -> &HashMap<String, String> {
        &self.vars
    }
}

impl EnvironmentSink for MemoryEnvironment {
    fn is_set(&self, name: &str) -> bool {
        self.vars.contains_key(name) || self.constants.contains_key(name)
    }

    fn set_if_absent(&mut self, name: &str, value: &Value) -> bool {
        if self.constants.contains_key(name) {
            return false;
        }
        self.constants.insert(name.to_string(), value.clone());
        true
    }

    fn set_always(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }
}

/// Returns `true` if `name` can be stored in the process environment.
pub fn is_exportable_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=') && !name.contains('\0')
}

/// Returns the UTF-8 variables of the process environment.
pub(crate) fn process_vars() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(k, v): (OsString, OsString)| {
        Some((k.into_string().ok()?, v.into_string().ok()?))
    })
}
