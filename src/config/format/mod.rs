//! File format detection and parsing.
//!
//! Every parser hands back a [`Table`] of typed values. INI and `.env` values are
//! coerced from strings; JSON, YAML and TOML keep the types of the document.

mod dotenv;
mod ini;

use std::fmt;
use std::path::Path;

use super::value::{Table, Value};
use super::ConfigError;

pub use dotenv::parse_dotenv;
pub use ini::parse_ini;

/// A supported configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ini,
    Env,
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Selects a format from the file extension, case-insensitively.
    ///
    /// A file named exactly `.env` is treated as having the `env` extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_lowercase(),
            None if path.file_name().is_some_and(|name| name == ".env") => "env".to_string(),
            None => String::new(),
        };

        Self::from_extension(&extension).ok_or_else(|| ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        })
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ini" => Some(Format::Ini),
            "env" => Some(Format::Env),
            "json" => Some(Format::Json),
            "yml" | "yaml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Ini => write!(f, "ini"),
            Format::Env => write!(f, "env"),
            Format::Json => write!(f, "json"),
            Format::Yaml => write!(f, "yaml"),
            Format::Toml => write!(f, "toml"),
        }
    }
}

/// Parses `contents` as `format`. `path` is only used for error reporting.
pub fn parse(
    format: Format,
    contents: &str,
    path: &Path,
    ini_sections: bool,
) -> Result<Table, ConfigError> {
    match format {
        Format::Ini => {
            parse_ini(contents, ini_sections).map_err(|e| ConfigError::malformed(path, e))
        }
        Format::Env => Ok(parse_dotenv(contents)),
        Format::Json => parse_json(contents, path),
        Format::Yaml => parse_yaml(contents, path),
        Format::Toml => parse_toml(contents, path),
    }
}

fn parse_json(contents: &str, path: &Path) -> Result<Table, ConfigError> {
    let parsed: serde_json::Value =
        serde_json::from_str(contents).map_err(|e| ConfigError::malformed(path, e))?;
    match Value::from(parsed) {
        Value::Table(table) => Ok(table),
        _ => Err(ConfigError::malformed(path, "document root is not an object")),
    }
}

fn parse_yaml(contents: &str, path: &Path) -> Result<Table, ConfigError> {
    let parsed: serde_yaml::Value =
        serde_yaml::from_str(contents).map_err(|e| ConfigError::malformed(path, e))?;
    match from_yaml(parsed).map_err(|e| ConfigError::malformed(path, e))? {
        Value::Table(table) => Ok(table),
        // an empty document
        Value::Null => Ok(Table::new()),
        _ => Err(ConfigError::malformed(path, "document root is not a mapping")),
    }
}

fn parse_toml(contents: &str, path: &Path) -> Result<Table, ConfigError> {
    let parsed: toml::Table =
        toml::from_str(contents).map_err(|e| ConfigError::malformed(path, e))?;
    Ok(parsed
        .into_iter()
        .map(|(k, v)| (k, Value::from(v)))
        .collect())
}

fn from_yaml(value: serde_yaml::Value) -> Result<Value, String> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(from_yaml).collect::<Result<_, _>>()?)
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut table = Table::with_capacity(mapping.len());
            for (key, value) in mapping {
                table.insert(yaml_key(key)?, from_yaml(value)?);
            }
            Value::Table(table)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        other => Err(format!("unsupported mapping key: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_str(format: Format, contents: &str) -> Result<Table, ConfigError> {
        parse(format, contents, Path::new("test"), false)
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.INI")).unwrap(), Format::Ini);
        assert_eq!(Format::from_path(Path::new("test.env")).unwrap(), Format::Env);
        assert_eq!(Format::from_path(Path::new(".env")).unwrap(), Format::Env);
        assert_eq!(Format::from_path(Path::new("x.yml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("x.Yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("x.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("x.toml")).unwrap(), Format::Toml);
    }

    #[test]
    fn test_unsupported_format() {
        let err = Format::from_path(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedFormat { ref extension, .. } if extension == "txt"
        ));
        assert!(matches!(
            Format::from_path(Path::new("Makefile")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_json_keeps_types() {
        let table = parse_str(
            Format::Json,
            r#"{"TEST": "config", "TESTINT1": 1, "TESTINT2": "1", "TESTBOOL1": true}"#,
        )
        .unwrap();
        assert_eq!(table["TESTINT1"], Value::Integer(1));
        assert_eq!(table["TESTINT2"], Value::from("1"));
        assert_eq!(table["TESTBOOL1"], Value::Bool(true));
    }

    #[test]
    fn test_json_root_must_be_object() {
        let result = parse_str(Format::Json, "[1, 2, 3]");
        assert!(matches!(result, Err(ConfigError::MalformedContent { .. })));
        let result = parse_str(Format::Json, "{not json");
        assert!(matches!(result, Err(ConfigError::MalformedContent { .. })));
    }

    #[test]
    fn test_yaml_block_and_flow() {
        let table = parse_str(
            Format::Yaml,
            "server:\n  host: localhost\n  ports: [80, 443]\n1: one\nenabled: yes\n",
        )
        .unwrap();
        let server = table["server"].as_table().unwrap();
        assert_eq!(server["host"], Value::from("localhost"));
        assert_eq!(server["ports"], Value::from(vec![80, 443]));
        assert_eq!(table["1"], Value::from("one"));
        assert_eq!(table["enabled"], Value::from("yes"));
    }

    #[test]
    fn test_yaml_tagged_value_is_unwrapped() {
        let table = parse_str(Format::Yaml, "port: !custom 8080\n").unwrap();
        assert_eq!(table["port"], Value::Integer(8080));
    }

    #[test]
    fn test_yaml_root_must_be_mapping() {
        let result = parse_str(Format::Yaml, "- a\n- b\n");
        assert!(matches!(result, Err(ConfigError::MalformedContent { .. })));
        assert!(parse_str(Format::Yaml, "").unwrap().is_empty());
    }

    #[test]
    fn test_toml() {
        let table = parse_str(Format::Toml, "name = \"demo\"\n[db]\nport = 5432\n").unwrap();
        assert_eq!(table["name"], Value::from("demo"));
        assert_eq!(table["db"].as_table().unwrap()["port"], Value::Integer(5432));
    }
}
