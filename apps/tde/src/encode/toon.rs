//! Line-oriented table notation.
//!
//! A block is a header `[N,]{field,...}:` followed by `N` rows, each row
//! indented by one space and holding comma-separated values in header order.
//! Values that could be mistaken for structure are double-quoted with
//! backslash escapes, so every row splits back into exactly its values.

pub const DELIMITER: char = ',';
pub const ROW_INDENT: &str = " ";

/// `[N,]{a,b,c}:`
pub fn header(count: usize, fields: &[&str]) -> String {
    format!("[{}{}]{}:", count, DELIMITER, schema(fields))
}

/// `{a,b,c}`
pub fn schema(fields: &[&str]) -> String {
    format!("{{{}}}", fields.join(","))
}

/// A single inline record: `{a,b}: x,y`.
pub fn inline_record(fields: &[&str], values: &[String]) -> String {
    format!("{}: {}", schema(fields), join_values(values))
}

/// One indented row.
pub fn row(values: &[String]) -> String {
    format!("{}{}", ROW_INDENT, join_values(values))
}

/// Header plus rows as lines.
pub fn block(fields: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header(rows.len(), fields));
    lines.extend(rows.iter().map(|r| row(r)));
    lines
}

fn join_values(values: &[String]) -> String {
    values
        .iter()
        .map(|v| encode_value(v))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string())
}

fn needs_quotes(v: &str) -> bool {
    v.is_empty()
        || v.trim() != v
        || v.starts_with('[')
        || v.starts_with('{')
        || v.chars()
            .any(|c| c == DELIMITER || c == '"' || c == '\\' || c.is_control())
}

/// Encode one value, quoting and escaping when needed.
pub fn encode_value(v: &str) -> String {
    if !needs_quotes(v) {
        return v.to_string();
    }
    let mut out = String::with_capacity(v.len() + 2);
    out.push('"');
    for c in v.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Parse failure with the offending line for context.
pub struct DecodeError {
    pub line: String,
    pub reason: &'static str,
}

/// Split a row (with or without its indent) back into values.
pub fn decode_row(line: &str) -> Result<Vec<String>, DecodeError> {
    let err = |reason| DecodeError {
        line: line.to_string(),
        reason,
    };
    let body = line.strip_prefix(ROW_INDENT).unwrap_or(line);
    let mut values = Vec::new();
    let mut chars = body.chars().peekable();
    loop {
        let mut cur = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some('"') => cur.push('"'),
                        Some('\\') => cur.push('\\'),
                        Some('n') => cur.push('\n'),
                        Some('r') => cur.push('\r'),
                        Some('t') => cur.push('\t'),
                        Some('u') => cur.push(
                            decode_unicode_escape(&mut chars)
                                .ok_or_else(|| err("bad unicode escape"))?,
                        ),
                        _ => return Err(err("bad escape")),
                    },
                    Some(c) => cur.push(c),
                    None => return Err(err("unterminated quote")),
                }
            }
            match chars.next() {
                None => {
                    values.push(cur);
                    return Ok(values);
                }
                Some(c) if c == DELIMITER => values.push(cur),
                Some(_) => return Err(err("text after closing quote")),
            }
        } else {
            loop {
                match chars.next() {
                    None => {
                        values.push(cur);
                        return Ok(values);
                    }
                    Some(c) if c == DELIMITER => break,
                    Some(c) => cur.push(c),
                }
            }
            values.push(cur);
        }
    }
}

fn decode_unicode_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    if chars.next()? != '{' {
        return None;
    }
    let mut hex = String::new();
    loop {
        match chars.next()? {
            '}' => break,
            c => hex.push(c),
        }
    }
    char::from_u32(u32::from_str_radix(&hex, 16).ok()?)
}

/// Parse a `[N,]{a,b}:` header into its count and field names.
pub fn decode_header(line: &str) -> Result<(usize, Vec<String>), DecodeError> {
    let err = |reason| DecodeError {
        line: line.to_string(),
        reason,
    };
    let rest = line.strip_prefix('[').ok_or_else(|| err("missing '['"))?;
    let (count, rest) = rest.split_once(']').ok_or_else(|| err("missing ']'"))?;
    let count = count
        .strip_suffix(DELIMITER)
        .unwrap_or(count)
        .parse::<usize>()
        .map_err(|_| err("bad count"))?;
    let fields = rest
        .strip_prefix('{')
        .and_then(|r| r.strip_suffix("}:"))
        .ok_or_else(|| err("bad schema"))?;
    let fields = if fields.is_empty() {
        Vec::new()
    } else {
        fields.split(',').map(str::to_string).collect()
    };
    Ok((count, fields))
}

/// Parse one block (header followed by its rows) from the front of `lines`.
/// Returns the fields, the rows, and how many lines were consumed.
pub fn decode_block(lines: &[&str]) -> Result<(Vec<String>, Vec<Vec<String>>, usize), DecodeError> {
    let first = lines.first().ok_or(DecodeError {
        line: String::new(),
        reason: "empty input",
    })?;
    let (count, fields) = decode_header(first)?;
    let mut rows = Vec::with_capacity(count);
    for line in lines.iter().skip(1).take(count) {
        if !line.starts_with(ROW_INDENT) {
            return Err(DecodeError {
                line: line.to_string(),
                reason: "expected an indented row",
            });
        }
        let values = decode_row(line)?;
        if values.len() != fields.len() {
            return Err(DecodeError {
                line: line.to_string(),
                reason: "row width does not match header",
            });
        }
        rows.push(values);
    }
    if rows.len() != count {
        return Err(DecodeError {
            line: first.to_string(),
            reason: "fewer rows than declared",
        });
    }
    Ok((fields, rows, count + 1))
}
