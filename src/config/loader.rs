use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use super::builder::{LoaderBuilder, LoaderOptions};
use super::coerce::coerce_scalar;
use super::env::{is_exportable_name, process_vars, EnvironmentSink, ProcessEnvironment};
use super::format::{self, Format};
use super::resolve::resolve_references;
use super::store::NestedStore;
use super::value::{Table, Value};
use super::ConfigError;

/// A configuration store fed from files, directories, mappings and the environment.
///
/// Every source is parsed into a mapping, its `${NAME}` references are resolved
/// and its top-level keys are written into the store as flat keys, replacing
/// earlier values. Lookups use the separator from [`LoaderOptions`] (empty by
/// default, so keys are not split).
///
/// While [locked](Self::lock), every mutating call fails with
/// [`ConfigError::Locked`] and leaves the store untouched.
///
/// ## Example
///
/// ```no_run
/// use layered_config::ConfigLoader;
///
/// let mut config = ConfigLoader::new();
/// config
///     .load_file("config/app.ini")?
///     .load_dir("config/conf.d", false)?;
/// config.lock();
///
/// let port = config.get_int("PORT", 8080);
/// # Ok::<(), layered_config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    store: NestedStore,
    locked: bool,
    options: LoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader whose store starts out as `defaults`.
    pub fn with_defaults(defaults: Table) -> Self {
        Self {
            store: NestedStore::from_table(defaults),
            ..Self::default()
        }
    }

    pub fn with_options(options: LoaderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Creates a builder that applies sources in registration order.
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::default()
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    pub fn store(&self) -> &NestedStore {
        &self.store
    }

    pub fn as_table(&self) -> &Table {
        self.store.as_table()
    }

    /// Returns an owned snapshot of all values.
    pub fn to_table(&self) -> Table {
        self.store.to_table()
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.store.get(path, &self.options.separator)
    }

    pub fn get_in(&self, path: &str, separator: &str) -> Option<&Value> {
        self.store.get(path, separator)
    }

    pub fn get_or(&self, path: &str, default: impl Into<Value>) -> Value {
        self.store.get_or(path, default, &self.options.separator)
    }

    /// Present, non-null values, for the typed getters.
    fn get_present(&self, path: &str, separator: &str) -> Option<&Value> {
        self.get_in(path, separator).filter(|v| !v.is_null())
    }

    /// Returns the value at `path` as a string, or `default` when absent or null.
    pub fn get_string(&self, path: &str, default: &str) -> String {
        self.get_string_in(path, default, &self.options.separator)
    }

    pub fn get_string_in(&self, path: &str, default: &str, separator: &str) -> String {
        self.get_present(path, separator)
            .map_or_else(|| default.to_string(), Value::to_string)
    }

    /// Returns the value at `path` as an integer, or `default` when absent or null.
    pub fn get_int(&self, path: &str, default: i64) -> i64 {
        self.get_int_in(path, default, &self.options.separator)
    }

    pub fn get_int_in(&self, path: &str, default: i64, separator: &str) -> i64 {
        self.get_present(path, separator)
            .map_or(default, Value::coerce_int)
    }

    pub fn get_float(&self, path: &str, default: f64) -> f64 {
        self.get_float_in(path, default, &self.options.separator)
    }

    pub fn get_float_in(&self, path: &str, default: f64, separator: &str) -> f64 {
        self.get_present(path, separator)
            .map_or(default, Value::coerce_float)
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        self.get_bool_in(path, default, &self.options.separator)
    }

    pub fn get_bool_in(&self, path: &str, default: bool, separator: &str) -> bool {
        self.get_present(path, separator)
            .map_or(default, Value::coerce_bool)
    }

    /// Deserializes the whole configuration into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let value = Value::Table(self.store.to_table()).to_json();
        serde_json::from_value(value).map_err(ConfigError::DeserializeError)
    }

    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<&Value, ConfigError> {
        self.ensure_unlocked()?;
        Ok(self.store.set(path, value, &self.options.separator))
    }

    pub fn set_in(
        &mut self,
        path: &str,
        value: impl Into<Value>,
        separator: &str,
    ) -> Result<&Value, ConfigError> {
        self.ensure_unlocked()?;
        Ok(self.store.set(path, value, separator))
    }

    /// Removes the value at `path`, returning it, or `None` if it did not exist.
    pub fn delete(&mut self, path: &str) -> Result<Option<Value>, ConfigError> {
        self.ensure_unlocked()?;
        Ok(self.store.delete(path, &self.options.separator))
    }

    pub fn delete_in(&mut self, path: &str, separator: &str) -> Result<Option<Value>, ConfigError> {
        self.ensure_unlocked()?;
        Ok(self.store.delete(path, separator))
    }

    pub fn lock(&mut self) {
        debug!("locking configuration");
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        debug!("unlocking configuration");
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    fn ensure_unlocked(&self) -> Result<(), ConfigError> {
        if self.locked {
            return Err(ConfigError::Locked);
        }
        Ok(())
    }

    /// Parses a supported file and resolves its references without merging it.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Table, ConfigError> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        self.parse_file_as(path, format, self.options.ini_sections)
    }

    fn parse_file_as(
        &self,
        path: &Path,
        format: Format,
        ini_sections: bool,
    ) -> Result<Table, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let parsed = format::parse(format, &contents, path, ini_sections)?;

        let canonical = path.canonicalize().map_err(|e| ConfigError::io(path, e))?;
        let dir = canonical
            .parent()
            .map(|p| p.to_string_lossy().into_owned());

        debug!(path = %path.display(), %format, keys = parsed.len(), "parsed config file");
        Ok(resolve_references(parsed, &self.store, dir.as_deref()))
    }

    /// Loads a file, choosing the parser from its extension.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, ConfigError> {
        self.ensure_unlocked()?;
        let table = self.parse_file(path)?;
        self.merge(table);
        Ok(self)
    }

    /// Loads a file with an explicit format, ignoring its extension.
    pub fn load_file_as(
        &mut self,
        path: impl AsRef<Path>,
        format: Format,
    ) -> Result<&mut Self, ConfigError> {
        self.ensure_unlocked()?;
        let table = self.parse_file_as(path.as_ref(), format, self.options.ini_sections)?;
        self.merge(table);
        Ok(self)
    }

    /// Loads an INI file, turning `[section]` headers into nested mappings when
    /// `sections` is set.
    pub fn load_ini_file(
        &mut self,
        path: impl AsRef<Path>,
        sections: bool,
    ) -> Result<&mut Self, ConfigError> {
        self.ensure_unlocked()?;
        let table = self.parse_file_as(path.as_ref(), Format::Ini, sections)?;
        self.merge(table);
        Ok(self)
    }

    /// Loads every regular file in a directory, descending into subdirectories
    /// when `deep` is set.
    ///
    /// Entries are visited in the order the filesystem returns them unless
    /// [`LoaderOptions::sort_dir_entries`] is set. Later files override earlier
    /// ones. A missing directory is skipped; an unsupported file aborts the scan,
    /// keeping whatever was merged before it.
    pub fn load_dir(
        &mut self,
        path: impl AsRef<Path>,
        deep: bool,
    ) -> Result<&mut Self, ConfigError> {
        self.ensure_unlocked()?;
        let root = path.as_ref();
        if !root.is_dir() {
            debug!(path = %root.display(), "config directory does not exist, skipping");
            return Ok(self);
        }

        let mut walker = WalkDir::new(root).min_depth(1).follow_links(true);
        if !deep {
            walker = walker.max_depth(1);
        }
        if self.options.sort_dir_entries {
            walker = walker.sort_by_file_name();
        }

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if entry.file_type().is_file() {
                self.load_file(entry.path())?;
            } else {
                trace!(path = %entry.path().display(), "skipping non-file entry");
            }
        }

        Ok(self)
    }

    /// Merges `table` into the store as flat top-level keys. Values are taken as-is.
    pub fn load_table(&mut self, table: Table) -> Result<&mut Self, ConfigError> {
        self.ensure_unlocked()?;
        self.merge(table);
        Ok(self)
    }

    /// Imports the process environment. See [`load_vars`](Self::load_vars).
    pub fn load_environment(&mut self, only_existing: bool) -> Result<&mut Self, ConfigError> {
        self.ensure_unlocked()?;
        self.load_vars(process_vars(), only_existing)
    }

    /// Imports name/value pairs, coercing values like unquoted `.env` entries.
    ///
    /// With `only_existing`, only names already present at the top level are updated.
    pub fn load_vars<K, V>(
        &mut self,
        vars: impl IntoIterator<Item = (K, V)>,
        only_existing: bool,
    ) -> Result<&mut Self, ConfigError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.ensure_unlocked()?;
        let mut imported = 0usize;
        for (name, value) in vars {
            let name = name.as_ref();
            if only_existing && !self.store.contains(name, "") {
                continue;
            }
            self.store.set(name, coerce_scalar(value.as_ref()), "");
            imported += 1;
        }
        debug!(imported, only_existing, "imported environment variables");
        Ok(self)
    }

    /// Exports every top-level value into `sink`, returning how many were written.
    ///
    /// Unless `overwrite` is set, names the sink already knows are skipped. Values
    /// always update the sink's variables; constants are only defined the first time.
    pub fn export(&self, sink: &mut impl EnvironmentSink, overwrite: bool) -> usize {
        let mut exported = 0;

        for (name, value) in self.store.as_table() {
            let text = value.to_string();
            if !is_exportable_name(name) || text.contains('\0') {
                warn!(name = %name, "skipping export of value the environment cannot hold");
                continue;
            }
            if !overwrite && sink.is_set(name) {
                trace!(name = %name, "already set, not overwriting");
                continue;
            }

            sink.set_always(name, &text);
            sink.set_if_absent(name, value);
            exported += 1;
        }

        debug!(exported, overwrite, "exported configuration");
        exported
    }

    /// Exports into the process environment.
    pub fn export_to_process(&self, overwrite: bool) -> usize {
        self.export(&mut ProcessEnvironment, overwrite)
    }

    fn merge(&mut self, table: Table) {
        for (key, value) in table {
            self.store.set(&key, value, "");
        }
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> ConfigError {
    let path = err.path().unwrap_or(root).to_path_buf();
    match err.into_io_error() {
        Some(source) => ConfigError::io(path, source),
        None => ConfigError::ReadError {
            path,
            source: io::Error::other("filesystem loop detected"),
        },
    }
}
