//! Rust identifiers for declared names

use convert_case::{Case, Casing};

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

// Keywords that cannot be written as raw identifiers
const RESERVED: &[&str] = &["crate", "self", "super", "Self"];

/// Field identifier for a declared field name. Names that already are
/// snake_case identifiers are kept as they are.
pub(crate) fn field_ident(name: &str) -> String {
    let ident = if is_snake_case(name) {
        name.to_string()
    } else {
        let rest = name.trim_start_matches('_');
        let leading = &name[..name.len() - rest.len()];
        sanitize(&format!("{}{}", leading, rest.to_case(Case::Snake)), '_')
    };

    let ident = match ident.as_str() {
        "" | "_" => "field".to_string(),
        _ if ident.starts_with(|c: char| c.is_ascii_digit()) => format!("_{}", ident),
        _ => ident,
    };

    if RESERVED.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{}", ident)
    } else {
        ident
    }
}

/// Whether the identifier needs a serde rename to map back to `name`
pub(crate) fn needs_rename(ident: &str, name: &str) -> bool {
    ident.trim_start_matches("r#") != name
}

/// PascalCase type name fragment
pub(crate) fn type_ident(name: &str) -> String {
    let ident = sanitize(&name.to_case(Case::Pascal), '\0');
    match ident.chars().next() {
        None => "Field".to_string(),
        Some(c) if c.is_ascii_digit() => format!("T{}", ident),
        Some(_) => ident,
    }
}

/// SCREAMING_SNAKE constant name
pub(crate) fn const_ident(name: &str) -> String {
    let ident = sanitize(&name.to_case(Case::Constant), '_');
    match ident.chars().next() {
        None => "FUNCTION".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", ident),
        Some(_) => ident,
    }
}

fn is_snake_case(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Keeps ASCII alphanumerics and `_`; anything else becomes `replacement`
/// (`'\0'` drops it).
fn sanitize(s: &str, replacement: char) -> String {
    s.chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                Some(c)
            } else if replacement == '\0' {
                None
            } else {
                Some(replacement)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ident() {
        assert_eq!(field_ident("win_count"), "win_count");
        assert_eq!(field_ident("_id"), "_id");
        assert_eq!(field_ident("_int64"), "_int64");
        assert_eq!(field_ident("isActive"), "is_active");
        assert_eq!(field_ident("first name"), "first_name");
        assert_eq!(field_ident("type"), "r#type");
        assert_eq!(field_ident("self"), "self_");
    }

    #[test]
    fn test_needs_rename() {
        assert!(!needs_rename("r#type", "type"));
        assert!(!needs_rename("win_count", "win_count"));
        assert!(needs_rename("is_active", "isActive"));
    }

    #[test]
    fn test_type_ident() {
        assert_eq!(type_ident("games"), "Games");
        assert_eq!(type_ident("complexQuery"), "ComplexQuery");
        assert_eq!(type_ident("_nested_object"), "NestedObject");
        assert_eq!(type_ident(""), "Field");
    }

    #[test]
    fn test_const_ident() {
        assert_eq!(const_ident("winGame"), "WIN_GAME");
        assert_eq!(const_ident("getGame"), "GET_GAME");
    }
}
