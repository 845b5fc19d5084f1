use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::loader::ConfigLoader;
use super::value::Table;
use super::ConfigError;

/// Behavior switches for a [`ConfigLoader`].
///
/// Deserializable, so it can itself come from a config file:
///
/// ```
/// use layered_config::LoaderOptions;
///
/// let options: LoaderOptions = serde_json::from_str(r#"{"separator": "."}"#).unwrap();
/// assert_eq!(options.separator, ".");
/// assert!(!options.ini_sections);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Path separator used by the loader's get/set/delete. Empty means keys are
    /// never split.
    pub separator: String,
    /// Turn INI `[section]` headers into nested mappings.
    pub ini_sections: bool,
    /// Visit directory entries sorted by file name instead of filesystem order.
    pub sort_dir_entries: bool,
}

/// A source registered on the builder.
#[derive(Debug)]
enum ConfigSource {
    Defaults(Table),
    File(PathBuf),
    Dir { path: PathBuf, deep: bool },
    Env { only_existing: bool },
}

/// Builder for a [`ConfigLoader`] fed from several sources.
///
/// Sources are applied in registration order, so later sources override
/// earlier ones:
///
/// ```no_run
/// use layered_config::ConfigLoader;
///
/// let config = ConfigLoader::builder()
///     .sort_dir_entries(true)
///     .with_file("config/default.ini")
///     .with_dir("config/conf.d", true)
///     .with_env(true)
///     .locked(true)
///     .build()?;
/// # Ok::<(), layered_config::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct LoaderBuilder {
    options: LoaderOptions,
    sources: Vec<ConfigSource>,
    locked: bool,
}

impl LoaderBuilder {
    pub fn options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.options.separator = separator.into();
        self
    }

    pub fn ini_sections(mut self, enabled: bool) -> Self {
        self.options.ini_sections = enabled;
        self
    }

    pub fn sort_dir_entries(mut self, enabled: bool) -> Self {
        self.options.sort_dir_entries = enabled;
        self
    }

    /// Merges a mapping as-is.
    pub fn with_defaults(mut self, defaults: Table) -> Self {
        self.sources.push(ConfigSource::Defaults(defaults));
        self
    }

    /// Adds a file. A missing file fails the build.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(ConfigSource::File(path.as_ref().to_path_buf()));
        self
    }

    /// Adds every file of a directory. A missing directory is skipped.
    pub fn with_dir(mut self, path: impl AsRef<Path>, deep: bool) -> Self {
        self.sources.push(ConfigSource::Dir {
            path: path.as_ref().to_path_buf(),
            deep,
        });
        self
    }

    /// Adds the process environment.
    pub fn with_env(mut self, only_existing: bool) -> Self {
        self.sources.push(ConfigSource::Env { only_existing });
        self
    }

    /// Locks the loader once every source has been applied.
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn build(self) -> Result<ConfigLoader, ConfigError> {
        let mut loader = ConfigLoader::with_options(self.options);

        for source in self.sources {
            match source {
                ConfigSource::Defaults(table) => {
                    loader.load_table(table)?;
                }
                ConfigSource::File(path) => {
                    loader.load_file(&path)?;
                }
                ConfigSource::Dir { path, deep } => {
                    loader.load_dir(&path, deep)?;
                }
                ConfigSource::Env { only_existing } => {
                    loader.load_environment(only_existing)?;
                }
            }
        }

        if self.locked {
            loader.lock();
        }
        Ok(loader)
    }
}
