//! Bean naming conventions.
//!
//! Maps accessor method names to property names: `getUserName` and `setUserName`
//! become `userName`, `isActive` becomes `active`. A name whose remainder starts
//! with two upper-case characters keeps its case (`getURL` → `URL`).

use crate::{Error, Result};

/// Convert an accessor method name into its property name
///
/// ## Arguments
/// * 'name' - A method name starting with `is`, `get` or `set`
///
/// # Errors
/// Returns [`Error::InvalidPropertyName`] if `name` has none of the prefixes.
pub fn method_to_property(name: &str) -> Result<String> {
    let stripped = if let Some(rest) = name.strip_prefix("is") {
        rest
    } else if let Some(rest) = name
        .strip_prefix("get")
        .or_else(|| name.strip_prefix("set"))
    {
        rest
    } else {
        return Err(Error::InvalidPropertyName(name.to_string()));
    };

    Ok(decapitalize(stripped))
}

/// Lower-case the first character unless the name starts with an acronym
#[must_use]
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    match chars.next() {
        Some(second) if second.is_uppercase() => name.to_string(),
        _ => first.to_lowercase().chain(name[first.len_utf8()..].chars()).collect(),
    }
}

/// Returns `true` if `name` looks like any accessor
#[must_use]
pub fn is_property(name: &str) -> bool {
    is_getter(name) || is_setter(name)
}

/// Returns `true` for `get<Name>` and `is<Name>` with a non-empty remainder
#[must_use]
pub fn is_getter(name: &str) -> bool {
    (name.starts_with("get") && name.len() > 3) || (name.starts_with("is") && name.len() > 2)
}

/// Returns `true` for `set<Name>` with a non-empty remainder
#[must_use]
pub fn is_setter(name: &str) -> bool {
    name.starts_with("set") && name.len() > 3
}

/// Returns `false` for names never exposed as properties
///
/// Excluded are names starting with `$` (compiler-generated members), `class`
/// and `serialVersionUID`.
#[must_use]
pub fn is_valid_property_name(name: &str) -> bool {
    !(name.starts_with('$') || name == "serialVersionUID" || name == "class")
}
