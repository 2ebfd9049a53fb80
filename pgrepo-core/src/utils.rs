//! Shared naming functions for code generation.

/// Convert a string to PascalCase (e.g., "hello_world" -> "HelloWorld")
///
/// Dashes, spaces and dots are treated like underscores.
pub fn to_pascal_case(s: &str) -> String {
    s.split(['_', '-', ' ', '.'])
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Convert a string to snake_case (e.g., "HelloWorld" -> "hello_world")
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_lower = false;
    for c in s.chars() {
        if c == '-' || c == ' ' || c == '.' {
            result.push('_');
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            result.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    result
}

/// Naive English singular form of a table name (e.g., "categories" -> "category").
///
/// Only the last `_`-separated word is changed.
pub fn singularize(s: &str) -> String {
    let (head, word) = match s.rfind('_') {
        Some(idx) => s.split_at(idx + 1),
        None => ("", s),
    };

    let single = if let Some(stem) = word.strip_suffix("ies").filter(|stem| !stem.is_empty()) {
        format!("{stem}y")
    } else if ["sses", "shes", "ches", "xes", "zes"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && word.len() > 1
    {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    };

    format!("{head}{single}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("hello"), "Hello");
        assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
        assert_eq!(to_pascal_case("user-roles"), "UserRoles");
        assert_eq!(to_pascal_case("GetUserByEmail"), "GetUserByEmail");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Hello"), "hello");
        assert_eq!(to_snake_case("GetUserByEmail"), "get_user_by_email");
        assert_eq!(to_snake_case("hello-world"), "hello_world");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("ListV2Users"), "list_v2_users");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("user_roles"), "user_role");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("access"), "access");
        assert_eq!(singularize("person"), "person");
    }
}
