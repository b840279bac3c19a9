//! Field naming helpers.
//!
//! Context descriptors use Rust-style `snake_case` names. The default namer
//! exposes them as `lowerCamelCase`, which is what GraphQL clients expect.

use std::sync::Arc;

/// Maps a source field name to the name exposed in the schema.
pub type FieldNamer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Returns the default field namer (lower camel case).
#[must_use]
pub fn default_namer() -> FieldNamer {
    Arc::new(to_lower_camel_case)
}

/// Returns a namer that keeps source names unchanged.
#[must_use]
pub fn preserve_namer() -> FieldNamer {
    Arc::new(str::to_string)
}

/// Converts `snake_case` or `PascalCase` into `lowerCamelCase`.
///
/// Leading underscores are kept so names such as `_count` survive intact.
#[must_use]
pub fn to_lower_camel_case(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    let mut out = String::with_capacity(name.len());
    out.push_str(&name[..name.len() - trimmed.len()]);

    let mut first = true;
    let mut upper_next = false;
    for ch in trimmed.chars() {
        if ch == '_' {
            upper_next = true;
            continue;
        }
        if first {
            out.extend(ch.to_lowercase());
            first = false;
        } else if upper_next {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        upper_next = false;
    }
    out
}

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("people", "person"),
    ("children", "child"),
    ("women", "woman"),
    ("men", "man"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("teeth", "tooth"),
    ("feet", "foot"),
];

/// Returns the singular form of an English plural.
///
/// Used to derive `person(id: ...)` from a `people` collection. Words that
/// do not look plural come back unchanged.
#[must_use]
pub fn singularize(word: &str) -> String {
    if !word.is_ascii() {
        return word.to_string();
    }
    let lower = word.to_ascii_lowercase();

    for (plural, singular) in IRREGULAR_PLURALS {
        if lower.ends_with(plural) {
            let split = word.len() - plural.len();
            let (stem, tail) = word.split_at(split);
            let mut singular = singular.to_string();
            if tail.starts_with(|c: char| c.is_ascii_uppercase()) {
                singular[..1].make_ascii_uppercase();
            }
            return format!("{stem}{singular}");
        }
    }

    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if ["sses", "xes", "ches", "shes", "zzes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return word[..word.len() - 2].to_string();
    }
    // statuses, buses; but not houses or causes
    if let Some(stem) = lower.strip_suffix("uses") {
        if stem.ends_with(|c: char| !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')) {
            return word[..word.len() - 2].to_string();
        }
    }
    if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        return word.to_string();
    }
    if lower.len() > 1 && lower.ends_with('s') {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Returns whether `name` matches `[_A-Za-z][_0-9A-Za-z]*`.
#[must_use]
pub fn is_valid_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
