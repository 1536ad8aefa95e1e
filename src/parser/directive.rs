use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::parser::enum_info::{BaseKind, BaseType, EnumValue};

static MEMBER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Parses a directive payload (the text after `enum:`) into the ordered
/// member list, applying the value-derivation policy.
///
/// Entries are separated by `|`; each entry is `Name` or `Name=Value`.
/// Whitespace-only entries (doubled or trailing separators) are dropped.
///
/// Derivation rules, with a single auto-increment counter per enum:
/// - textual base: the value is always re-quoted, with one layer of
///   user-supplied surrounding quotes stripped first; a bare entry yields `""`
/// - integral base with no supplied value: the counter value, then the
///   counter advances; an explicit value is used verbatim and the counter
///   does NOT advance, so a later bare entry reuses the next unclaimed index
/// - floating/boolean bases and all explicit values: verbatim
pub fn parse_payload(
    type_name: &str,
    base_type: &BaseType,
    payload: &str,
    strict: bool,
) -> Result<Vec<EnumValue>> {
    let mut values = Vec::new();
    let mut counter: u64 = 0;

    for entry in payload.split('|') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (name, supplied) = match entry.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (entry, None),
        };

        if strict {
            validate_member_name(type_name, name, &values)?;
        }

        let value = match base_type.kind {
            BaseKind::Textual => {
                let inner = supplied.map(strip_surrounding_quotes).unwrap_or("");
                format!("\"{}\"", inner)
            }
            BaseKind::Integral => match supplied {
                Some(value) => value.to_string(),
                None => {
                    let value = counter.to_string();
                    counter += 1;
                    value
                }
            },
            BaseKind::Floating | BaseKind::Boolean => {
                supplied.unwrap_or("").to_string()
            }
        };

        values.push(EnumValue {
            name: name.to_string(),
            value,
        });
    }

    Ok(values)
}

/// Strips at most one leading and one trailing double quote.
fn strip_surrounding_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

fn validate_member_name(type_name: &str, name: &str, seen: &[EnumValue]) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidMember {
            type_name: type_name.to_string(),
            detail: "empty member name".to_string(),
        });
    }
    if !MEMBER_NAME_RE.is_match(name) {
        return Err(Error::InvalidMember {
            type_name: type_name.to_string(),
            detail: format!("`{}` is not a valid identifier", name),
        });
    }
    if seen.iter().any(|v| v.name == name) {
        return Err(Error::InvalidMember {
            type_name: type_name.to_string(),
            detail: format!("duplicate member name `{}`", name),
        });
    }
    Ok(())
}
