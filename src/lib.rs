//! A layered configuration store.
//!
//! Values are loaded from INI, `.env`, JSON, YAML and TOML files, merged into a
//! single tree, and read back through separator-addressed paths. String values
//! may reference earlier keys with `${NAME}`.

pub mod config;

pub use config::{
    ConfigError, ConfigLoader, EnvironmentSink, Format, LoaderBuilder, LoaderOptions,
    MemoryEnvironment, NestedStore, ProcessEnvironment, Table, Value,
};
