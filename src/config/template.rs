//! Placeholder expansion for raw config documents.
//!
//! Actions are delimited by `{{` and `}}`:
//!
//! - `{{.NAME}}` is replaced with the variable `NAME` from the snapshot
//! - `{{"text"}}` and ``{{`text`}}`` emit the literal text (use `{{"{{"}}`
//!   for a literal `{{`)
//! - `{{/* comment */}}` emits nothing
//!
//! `{{- ` and ` -}}` trim the whitespace before and after an action.
//! Referencing a variable that is not in the snapshot is an error.

use super::env::Snapshot;
use super::ConfigError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Text(&'a str),
    Literal(String),
    Field { name: &'a str, line: usize },
}

/// Expands every action in `raw` against `snapshot`.
///
/// The whole template is parsed before anything is substituted, so a syntax
/// error is reported even when an earlier reference is undefined.
pub fn expand(raw: &str, snapshot: &Snapshot) -> Result<String, ConfigError> {
    let segments = parse(raw)?;
    let mut result = String::with_capacity(raw.len());

    for segment in segments {
        match segment {
            Segment::Text(text) => result.push_str(text),
            Segment::Literal(text) => result.push_str(&text),
            Segment::Field { name, line } => {
                let value = snapshot
                    .get(name)
                    .ok_or_else(|| ConfigError::UndefinedVariable {
                        name: name.to_string(),
                        line,
                    })?;
                result.push_str(value);
            }
        }
    }

    Ok(result)
}

fn parse(raw: &str) -> Result<Vec<Segment<'_>>, ConfigError> {
    let mut segments = Vec::new();
    let mut pos = 0;
    let mut trim_next = false;
    let mut line = 1;
    let mut counted = 0;

    while let Some(found) = raw[pos..].find(OPEN) {
        let open = pos + found;
        line += raw[counted..open].matches('\n').count();
        counted = open;

        let mut text = &raw[pos..open];
        if trim_next {
            text = text.trim_start_matches(is_space);
        }

        let mut body_start = open + OPEN.len();
        if has_left_trim(&raw[body_start..]) {
            text = text.trim_end_matches(is_space);
            body_start += 1;
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        let close = find_close(raw, body_start).ok_or_else(|| syntax(line, "unclosed action"))?;
        let mut body = &raw[body_start..close];
        trim_next = has_right_trim(body);
        if trim_next {
            body = &body[..body.len() - 1];
        }

        if let Some(segment) = parse_action(body.trim_matches(is_space), line)? {
            segments.push(segment);
        }
        pos = close + CLOSE.len();
    }

    let mut text = &raw[pos..];
    if trim_next {
        text = text.trim_start_matches(is_space);
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }

    Ok(segments)
}

/// Parses the inside of an action. Comments produce no segment.
fn parse_action(body: &str, line: usize) -> Result<Option<Segment<'_>>, ConfigError> {
    if body.is_empty() {
        return Err(syntax(line, "missing value for action"));
    }

    if let Some(comment) = body.strip_prefix("/*") {
        return if comment.ends_with("*/") {
            Ok(None)
        } else {
            Err(syntax(line, "unclosed comment"))
        };
    }

    if body.starts_with('"') {
        return unquote(body, line).map(|text| Some(Segment::Literal(text)));
    }

    if let Some(inner) = body.strip_prefix('`') {
        return match inner.strip_suffix('`') {
            Some(text) if !text.contains('`') => Ok(Some(Segment::Literal(text.to_string()))),
            _ => Err(syntax(line, "unterminated raw string")),
        };
    }

    if let Some(name) = body.strip_prefix('.') {
        if name.is_empty() {
            return Err(syntax(
                line,
                "`{{.}}` refers to the whole environment; reference a variable by name",
            ));
        }
        if !is_identifier(name) {
            return Err(syntax(line, format!("invalid variable reference '.{name}'")));
        }
        return Ok(Some(Segment::Field { name, line }));
    }

    Err(syntax(
        line,
        format!("unsupported action '{body}'; expected '.NAME', a string literal or a comment"),
    ))
}

/// Finds the `}}` closing an action, skipping over quoted strings and
/// comments.
fn find_close(raw: &str, from: usize) -> Option<usize> {
    let bytes = raw.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(b'"') if b == b'\\' => {
                i += 2;
                continue;
            }
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'"' || b == b'`' {
                    quote = Some(b);
                } else if bytes[i..].starts_with(b"/*") {
                    let end = raw[i + 2..].find("*/")?;
                    i += 2 + end + 2;
                    continue;
                } else if bytes[i..].starts_with(CLOSE.as_bytes()) {
                    return Some(i);
                }
            }
        }
        i += 1;
    }

    None
}

fn unquote(body: &str, line: usize) -> Result<String, ConfigError> {
    let inner = body
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| syntax(line, "unterminated quoted string"))?;

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    return Err(syntax(line, format!("invalid escape sequence '\\{other}'")))
                }
                None => return Err(syntax(line, "unterminated quoted string")),
            },
            '"' => return Err(syntax(line, "unexpected quote in string literal")),
            '\n' => return Err(syntax(line, "newline in string literal")),
            _ => result.push(ch),
        }
    }

    Ok(result)
}

fn has_left_trim(after_open: &str) -> bool {
    after_open
        .strip_prefix('-')
        .and_then(|rest| rest.chars().next())
        .is_some_and(is_space)
}

fn has_right_trim(body: &str) -> bool {
    body.strip_suffix('-')
        .and_then(|rest| rest.chars().next_back())
        .is_some_and(is_space)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn syntax(line: usize, message: impl Into<String>) -> ConfigError {
    ConfigError::TemplateSyntax {
        line,
        message: message.into(),
    }
}
