use crate::config::coerce::coerce_scalar;
use crate::config::value::{Table, Value};

/// Parses INI content in raw mode.
///
/// Section headers are ignored unless `sections` is set, in which case every
/// section becomes a nested mapping. `key[] = v` appends to a list and
/// `key[sub] = v` sets an entry of a nested mapping. Values are coerced after
/// their quotes are removed. Only unquoted values may carry a trailing `;` comment.
pub fn parse_ini(contents: &str, sections: bool) -> Result<Table, String> {
    let mut root = Table::new();
    let mut section: Option<String> = None;

    for (index, raw_line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if sections {
                let name = name.trim().to_string();
                if !matches!(root.get(&name), Some(Value::Table(_))) {
                    root.insert(name.clone(), Value::Table(Table::new()));
                }
                section = Some(name);
            }
            continue;
        }

        let (key, raw_value) = line
            .split_once('=')
            .ok_or_else(|| format!("line {line_no}: expected 'key = value'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("line {line_no}: empty key"));
        }
        let value = parse_value(raw_value.trim()).map_err(|e| format!("line {line_no}: {e}"))?;

        match section
            .as_deref()
            .and_then(|name| root.get_mut(name))
            .and_then(Value::as_table_mut)
        {
            Some(table) => insert_entry(table, key, value),
            None => insert_entry(&mut root, key, value),
        }
    }

    Ok(root)
}

fn parse_value(raw: &str) -> Result<Value, String> {
    if let Some(rest) = raw.strip_prefix('"') {
        let end = rest
            .find('"')
            .ok_or_else(|| "unterminated quoted value".to_string())?;
        return Ok(coerce_scalar(&rest[..end]));
    }

    let unquoted = match raw.split_once(';') {
        Some((value, _comment)) => value.trim_end(),
        None => raw,
    };
    Ok(coerce_scalar(unquoted))
}

/// Inserts `key`, honoring the `name[]` and `name[sub]` forms.
fn insert_entry(table: &mut Table, key: &str, value: Value) {
    let bracketed = key
        .strip_suffix(']')
        .and_then(|k| k.split_once('['))
        .filter(|(base, _)| !base.is_empty());

    let Some((base, sub)) = bracketed else {
        table.insert(key.to_string(), value);
        return;
    };

    let slot = table.entry(base.trim().to_string()).or_default();
    if sub.is_empty() {
        if !matches!(slot, Value::Array(_)) {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            items.push(value);
        }
    } else {
        if !matches!(slot, Value::Table(_)) {
            *slot = Value::Table(Table::new());
        }
        if let Value::Table(entries) = slot {
            entries.insert(sub.to_string(), value);
        }
    }
}
