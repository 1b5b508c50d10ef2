use indexmap::IndexMap;

use crate::error::{CohortError, Result};

/// Split manifest text into headers keyed by lowercased name.
///
/// A line starting with a single space continues the previous header and is
/// appended without the space. Blank lines and `#` comments are skipped.
pub fn parse_headers(content: &str, origin: &str) -> Result<IndexMap<String, String>> {
    let mut headers: IndexMap<String, String> = IndexMap::new();
    let mut current: Option<String> = None;

    for (index, line) in content.lines().enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if let Some(continued) = line.strip_prefix(' ') {
            let Some(key) = &current else {
                return Err(CohortError::invalid_manifest(
                    origin,
                    format!("line {}: continuation without a header", index + 1),
                ));
            };
            if let Some(value) = headers.get_mut(key) {
                value.push_str(continued);
            }
            continue;
        }

        if line.trim().is_empty() || line.starts_with('#') {
            current = None;
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(CohortError::invalid_manifest(
                origin,
                format!("line {}: expected 'Name: value', got '{}'", index + 1, line),
            ));
        };
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(CohortError::invalid_manifest(
                origin,
                format!("line {}: invalid header name '{}'", index + 1, name),
            ));
        }

        let key = name.to_ascii_lowercase();
        headers.insert(key.clone(), value.trim_start().to_string());
        current = Some(key);
    }

    Ok(headers)
}

/// One comma separated entry of an OSGi header such as `Subsystem-Content`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause {
    pub name: String,
    /// `key=value` pairs
    pub attributes: IndexMap<String, String>,
    /// `key:=value` pairs
    pub directives: IndexMap<String, String>,
}

impl Clause {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn directive(&self, key: &str) -> Option<&str> {
        self.directives.get(key).map(String::as_str)
    }
}

/// Parse a clause list, honouring double quotes around values.
pub fn parse_clauses(value: &str, origin: &str) -> Result<Vec<Clause>> {
    let mut clauses = Vec::new();

    for raw in split_unquoted(value, ',', origin)? {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let mut parts = split_unquoted(raw, ';', origin)?.into_iter();
        let name = parts.next().unwrap_or_default().trim().to_string();
        if name.is_empty() || name.contains('=') {
            return Err(CohortError::invalid_manifest(
                origin,
                format!("clause '{}' does not start with a name", raw),
            ));
        }

        let mut clause = Clause { name, ..Clause::default() };
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((key, value)) = part.split_once(":=") {
                clause.directives.insert(key.trim().to_string(), unquote(value));
            } else if let Some((key, value)) = part.split_once('=') {
                clause.attributes.insert(key.trim().to_string(), unquote(value));
            } else {
                return Err(CohortError::invalid_manifest(
                    origin,
                    format!("malformed parameter '{}' in clause '{}'", part, clause.name),
                ));
            }
        }
        clauses.push(clause);
    }

    Ok(clauses)
}

fn split_unquoted<'v>(value: &'v str, separator: char, origin: &str) -> Result<Vec<&'v str>> {
    let mut pieces = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (index, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                pieces.push(&value[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }

    if in_quotes {
        return Err(CohortError::invalid_manifest(origin, format!("unterminated quote in '{}'", value)));
    }
    pieces.push(&value[start..]);
    Ok(pieces)
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}
