use tracing::trace;

use crate::config::coerce::coerce_scalar;
use crate::config::value::{Table, Value};

/// Parses `.env` style `KEY=value` lines.
///
/// Blank lines, `#` comments, lines without `=` and keys outside
/// `[a-zA-Z0-9_.]` are skipped. Double-quoted values keep their contents as a
/// string; unquoted values are coerced.
pub fn parse_dotenv(contents: &str) -> Table {
    let mut table = Table::new();

    for (index, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            trace!(line = index + 1, "skipping .env line without '='");
            continue;
        };

        let key = key.trim();
        if !is_valid_key(key) {
            trace!(line = index + 1, key, "skipping .env line with invalid key");
            continue;
        }

        table.insert(key.to_string(), parse_value(value.trim()));
    }

    table
}

fn parse_value(value: &str) -> Value {
    match value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    {
        Some(quoted) => Value::String(quoted.to_string()),
        None => coerce_scalar(value),
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'.')
}
