//! Rust-specific naming conventions.

use pgrepo_codegen::language::NamingConvention;
use pgrepo_core::{to_pascal_case, to_snake_case};

/// Keywords that cannot be raw identifiers.
const NOT_RAW: &[&str] = &["crate", "self", "Self", "super"];

fn escape_rust_reserved(name: &str) -> String {
    if NOT_RAW.contains(&name) {
        format!("{}_", name)
    } else {
        format!("r#{}", name)
    }
}

/// Snake case that always yields a valid identifier start.
fn to_member(name: &str) -> String {
    let snake = to_snake_case(name);
    if snake.chars().next().is_none_or(|c| c.is_ascii_digit()) {
        format!("_{}", snake)
    } else {
        snake
    }
}

/// Rust naming conventions.
pub const RUST_NAMING: NamingConvention = NamingConvention {
    to_type: to_pascal_case,
    to_member,
    reserved_words: &[
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
        "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super",
        "trait", "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box",
        "do", "final", "macro", "override", "priv", "try", "typeof", "unsized", "virtual",
        "yield",
    ],
    escape_reserved: escape_rust_reserved,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_naming_type() {
        assert_eq!(RUST_NAMING.type_name("user_roles"), "UserRoles");
        assert_eq!(RUST_NAMING.type_name("GetUser"), "GetUser");
        assert_eq!(RUST_NAMING.entity_name("categories"), "Category");
    }

    #[test]
    fn test_rust_naming_member() {
        assert_eq!(RUST_NAMING.member_name("createdAt"), "created_at");
        assert_eq!(RUST_NAMING.member_name("GetUserByEmail"), "get_user_by_email");
        assert_eq!(RUST_NAMING.member_name("2fa_secret"), "_2fa_secret");
    }

    #[test]
    fn test_rust_reserved_words() {
        assert!(RUST_NAMING.is_reserved("type"));
        assert!(RUST_NAMING.is_reserved("async"));
        assert!(!RUST_NAMING.is_reserved("email"));
    }

    #[test]
    fn test_rust_escape_reserved() {
        assert_eq!(RUST_NAMING.member_name("type"), "r#type");
        assert_eq!(RUST_NAMING.member_name("self"), "self_");
        assert_eq!(RUST_NAMING.member_name("email"), "email");
        // file names are never escaped
        assert_eq!(RUST_NAMING.file_stem("type"), "type");
    }
}
