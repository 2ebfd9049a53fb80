//! Naming conventions of a target language.

use pgrepo_core::singularize;

/// How catalog and query names become identifiers.
#[derive(Debug, Clone, Copy)]
pub struct NamingConvention {
    /// `user_accounts` -> `UserAccounts`
    pub to_type: fn(&str) -> String,
    /// `createdAt` -> `created_at`, also used for methods and modules
    pub to_member: fn(&str) -> String,
    /// Words that need escaping when used as identifiers
    pub reserved_words: &'static [&'static str],
    /// `type` -> `r#type`
    pub escape_reserved: fn(&str) -> String,
}

impl NamingConvention {
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words.contains(&name)
    }

    /// Escape `name` if it is reserved.
    pub fn safe_name(&self, name: &str) -> String {
        if self.is_reserved(name) {
            (self.escape_reserved)(name)
        } else {
            name.to_string()
        }
    }

    pub fn type_name(&self, name: &str) -> String {
        self.safe_name(&(self.to_type)(name))
    }

    /// Record type for a table: the singular of its name.
    pub fn entity_name(&self, table: &str) -> String {
        self.type_name(&singularize(table))
    }

    /// Field or method identifier, escaped.
    pub fn member_name(&self, name: &str) -> String {
        self.safe_name(&(self.to_member)(name))
    }

    /// Module file stem; never escaped.
    pub fn file_stem(&self, name: &str) -> String {
        (self.to_member)(name)
    }
}
