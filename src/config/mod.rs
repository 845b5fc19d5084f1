//! Configuration loading and management.

mod builder;
mod coerce;
mod env;
mod error;
mod format;
mod loader;
mod resolve;
mod store;
mod value;

pub use builder::{LoaderBuilder, LoaderOptions};
pub use coerce::{coerce_scalar, is_numeric};
pub use env::{is_exportable_name, EnvironmentSink, MemoryEnvironment, ProcessEnvironment};
pub use error::ConfigError;
pub use format::Format;
pub use loader::ConfigLoader;
pub use resolve::DIR_VARIABLE;
pub use store::NestedStore;
pub use value::{Table, Value};
