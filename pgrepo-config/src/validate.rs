//! Post-parse validation of pgrepo.toml.

use miette::SourceSpan;

use crate::{Config, Result, error::SourceContext};

/// Rust reserved keywords that cannot be used as module names
/// Source: https://doc.rust-lang.org/reference/keywords.html
pub(crate) const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield", "union",
];

/// Validate a parsed configuration against its source.
pub(crate) fn validate_config(config: &Config, ctx: &SourceContext) -> Result<()> {
    let package = &config.output.package;
    if let Some(reason) = validate_module_name(package) {
        return Err(ctx.invalid_identifier_error(
            package,
            reason,
            find_string_span(ctx.src(), package),
        ));
    }

    for table in &config.tables.include {
        if config.tables.exclude.contains(table) {
            return Err(ctx.conflicting_filter_error(table, find_last_string_span(ctx.src(), table)));
        }
    }

    let retry = &config.retry;
    if retry.max_attempts == 0 {
        return Err(ctx.validation_error(
            "retry.max_attempts must be at least 1",
            find_key_span(ctx.src(), "max_attempts"),
        ));
    }
    if retry.base_delay_ms > retry.max_delay_ms {
        return Err(ctx.validation_error(
            format!(
                "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
                retry.base_delay_ms, retry.max_delay_ms
            ),
            find_key_span(ctx.src(), "base_delay_ms"),
        ));
    }

    if config.database.schema.trim().is_empty() {
        return Err(ctx.validation_error(
            "database.schema cannot be empty",
            find_key_span(ctx.src(), "schema"),
        ));
    }

    Ok(())
}

/// Returns None if valid, Some(reason) if invalid
pub(crate) fn validate_module_name(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Some("name cannot be empty"),
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        Some(_) => return Some("name must start with a lowercase letter or underscore"),
    }

    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Some("name must contain only lowercase letters, digits and underscores");
    }

    if RUST_KEYWORDS.contains(&name) {
        return Some("name is a Rust reserved keyword");
    }

    None
}

/// Span of the first `"value"` or `'value'` occurrence.
fn find_string_span(src: &str, value: &str) -> Option<SourceSpan> {
    [format!("\"{}\"", value), format!("'{}'", value)]
        .iter()
        .filter_map(|pattern| src.find(pattern.as_str()))
        .min()
        .map(|pos| SourceSpan::from((pos + 1, value.len())))
}

/// Span of the last `"value"` occurrence, for values listed twice.
fn find_last_string_span(src: &str, value: &str) -> Option<SourceSpan> {
    let pattern = format!("\"{}\"", value);
    src.rfind(&pattern)
        .map(|pos| SourceSpan::from((pos + 1, value.len())))
}

/// Span of a `key =` assignment.
fn find_key_span(src: &str, key: &str) -> Option<SourceSpan> {
    src.lines()
        .scan(0usize, |offset, line| {
            let start = *offset;
            *offset += line.len() + 1;
            Some((start, line))
        })
        .find_map(|(start, line)| {
            let trimmed = line.trim_start();
            let rest = trimmed.strip_prefix(key)?;
            rest.trim_start().starts_with('=').then(|| {
                let indent = line.len() - trimmed.len();
                SourceSpan::from((start + indent, key.len()))
            })
        })
}
