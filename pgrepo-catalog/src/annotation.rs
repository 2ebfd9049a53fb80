//! Parsing of `-- name: <Identifier> :<mode>` query blocks.
//!
//! A block runs from its marker line to the next marker or the end of the
//! file. Text before the first marker is ignored. Parameters are positional
//! only: the highest `$N` placeholder in the body is the parameter count.

use std::path::Path;

use pgrepo_ir::QueryMode;

use crate::{CatalogError, Result};

const MARKER: &str = "name:";

/// A query block as written in a `.sql` file, before the server describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedQuery {
    pub name: String,
    pub mode: QueryMode,
    /// Body with surrounding whitespace and trailing semicolons removed.
    pub sql: String,
    /// 1-based line of the marker.
    pub line: usize,
    /// Highest placeholder index used in the body.
    pub param_count: usize,
}

/// Split a query file into annotated blocks.
///
/// `path` is only used for error locations. A file with no markers yields an
/// empty list.
pub fn parse_annotations(path: &Path, source: &str) -> Result<Vec<AnnotatedQuery>> {
    let mut queries = Vec::new();
    let mut current: Option<(String, QueryMode, usize)> = None;
    let mut body = String::new();

    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;

        match annotation_payload(line) {
            Some(payload) => {
                let (name, mode) = parse_marker(path, line_no, payload)?;
                if let Some(header) = current.take() {
                    queries.push(finish(path, header, &body)?);
                }
                body.clear();
                current = Some((name, mode, line_no));
            }
            None if current.is_some() => {
                body.push_str(line);
                body.push('\n');
            }
            None => {}
        }
    }

    if let Some(header) = current {
        queries.push(finish(path, header, &body)?);
    }

    Ok(queries)
}

/// The text after `name:` when the line is a marker.
fn annotation_payload(line: &str) -> Option<&str> {
    let comment = line.trim_start().strip_prefix("--")?;
    comment.trim_start().strip_prefix(MARKER)
}

fn parse_marker(path: &Path, line: usize, payload: &str) -> Result<(String, QueryMode)> {
    let syntax = |message: String| CatalogError::QuerySyntax {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut tokens = payload.split_whitespace();

    let name = tokens
        .next()
        .ok_or_else(|| syntax("annotation is missing a query name".to_string()))?;
    if !is_identifier(name) {
        return Err(syntax(format!("'{}' is not a valid query name", name)));
    }

    let mode = tokens
        .next()
        .ok_or_else(|| syntax(format!("query '{}' is missing a :mode", name)))?;
    let mode = mode.strip_prefix(':').ok_or_else(|| {
        syntax(format!(
            "expected ':mode' after query name '{}', found '{}'",
            name, mode
        ))
    })?;

    if let Some(extra) = tokens.next() {
        return Err(syntax(format!("unexpected '{}' after query mode", extra)));
    }

    let mode = mode
        .parse::<QueryMode>()
        .map_err(|err| CatalogError::UnsupportedMode {
            path: path.to_path_buf(),
            line,
            mode: err.0,
        })?;

    Ok((name.to_string(), mode))
}

fn finish(
    path: &Path,
    (name, mode, line): (String, QueryMode, usize),
    body: &str,
) -> Result<AnnotatedQuery> {
    let sql = body.trim().trim_end_matches(';').trim_end().to_string();
    if sql.is_empty() {
        return Err(CatalogError::QuerySyntax {
            path: path.to_path_buf(),
            line,
            message: format!("query '{}' has no SQL body", name),
        });
    }

    let param_count = placeholder_count(&sql);

    Ok(AnnotatedQuery {
        name,
        mode,
        sql,
        line,
        param_count,
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Highest `$N` placeholder index in `sql`, or 0 if there are none.
///
/// String literals, quoted identifiers, comments and dollar-quoted bodies are
/// skipped.
pub fn placeholder_count(sql: &str) -> usize {
    let bytes = sql.as_bytes();
    let mut max = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b'$' if i > 0 && is_ident_byte(bytes[i - 1]) => i += 1,
            b'$' => {
                let digits = bytes[i + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_digit())
                    .count();
                if digits > 0 {
                    if let Ok(n) = sql[i + 1..i + 1 + digits].parse::<usize>() {
                        max = max.max(n);
                    }
                    i += 1 + digits;
                } else {
                    i = skip_dollar_quoted(bytes, i);
                }
            }
            _ => i += 1,
        }
    }

    max
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Skip a `'...'` or `"..."` run starting at `start`. Doubled quotes close and
/// reopen, which has the same effect as an escape.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    bytes[start + 1..]
        .iter()
        .position(|&b| b == quote)
        .map_or(bytes.len(), |end| start + 1 + end + 1)
}

fn skip_line(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |end| start + end + 1)
}

/// Block comments nest in PostgreSQL.
fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut depth = 0;
    let mut i = start;

    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return i;
                }
            }
            _ => i += 1,
        }
    }

    bytes.len()
}

/// Skip `$tag$ ... $tag$`. A lone `$` that does not open a tag is stepped over.
fn skip_dollar_quoted(bytes: &[u8], start: usize) -> usize {
    let tag_len = bytes[start + 1..]
        .iter()
        .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'_')
        .count();
    let open_end = start + 1 + tag_len;
    if bytes.get(open_end) != Some(&b'$') {
        return start + 1;
    }

    let delimiter = &bytes[start..=open_end];
    let body = open_end + 1;
    bytes[body..]
        .windows(delimiter.len())
        .position(|w| w == delimiter)
        .map_or(bytes.len(), |pos| body + pos + delimiter.len())
}
