//! Variable interpolation for freshly parsed configuration.
//!
//! String values may reference top-level keys with `${NAME}`, where `NAME`
//! matches `[a-zA-Z0-9_]+`. A reference resolves against the keys that precede
//! it in the same file, then against the values already in the store. Unknown
//! references are kept verbatim. `${__DIR__}` expands to the directory of the
//! file being loaded. References to the key itself or to later keys of the same
//! file never see those keys, so they resolve from the store or stay literal.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use super::store::NestedStore;
use super::value::{Table, Value};

/// Name of the pseudo-variable holding the loaded file's directory.
pub const DIR_VARIABLE: &str = "__DIR__";

static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([a-zA-Z0-9_]+)\}").expect("reference pattern is valid"));

/// Resolves every `${NAME}` reference in `parsed`, key by key in file order.
///
/// Each key sees the already-resolved values of the keys before it; its own key
/// and later keys are not visible, so those names fall through to `store`.
pub fn resolve_references(parsed: Table, store: &NestedStore, dir: Option<&str>) -> Table {
    let mut resolved = Table::with_capacity(parsed.len());

    for (key, mut value) in parsed {
        resolve_value(&mut value, &|name: &str| lookup(name, &resolved, store, dir));
        resolved.insert(key, value);
    }

    resolved
}

/// Resolves references in a single value, recursing into lists and mappings.
fn resolve_value(value: &mut Value, lookup: &dyn Fn(&str) -> Option<String>) {
    match value {
        Value::String(s) => resolve_string(s, lookup),
        Value::Table(t) => {
            for item in t.values_mut() {
                resolve_value(item, lookup);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                resolve_value(item, lookup);
            }
        }
        _ => {}
    }
}

fn resolve_string(s: &mut String, lookup: &dyn Fn(&str) -> Option<String>) {
    let replaced = REFERENCE_RE.replace_all(s.as_str(), |caps: &Captures| match lookup(&caps[1]) {
        Some(text) => text,
        None => {
            trace!(name = &caps[1], "leaving unresolved reference");
            caps[0].to_string()
        }
    });

    if let Cow::Owned(new) = replaced {
        *s = new;
    }
}

fn lookup(name: &str, current: &Table, store: &NestedStore, dir: Option<&str>) -> Option<String> {
    if name == DIR_VARIABLE {
        if let Some(dir) = dir {
            return Some(dir.to_string());
        }
    }

    current
        .get(name)
        .and_then(scalar_text)
        .or_else(|| store.get(name, "").and_then(scalar_text))
}

/// Null and collection values never satisfy a reference.
fn scalar_text(value: &Value) -> Option<String> {
    value.is_scalar().then(|| value.to_string())
}
