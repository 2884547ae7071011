//! Value parser: jdb tokens to [`TypedValue`]
//!
//! The checks in [`parse_value`] run in a fixed order because the forms
//! overlap: `instance of int[] (id=4)` must stay an object reference even
//! though it contains digits, and `'1'` is a char, not an integer.

use crate::trace::value::{TypedValue, Variables};

/// Convert one token printed by jdb into a typed value.
///
/// Never fails: text that matches no other form is returned as a string.
pub fn parse_value(token: &str) -> TypedValue {
    if token == "<void value>" {
        return TypedValue::Null;
    }

    // Objects are not expanded
    if token.starts_with("instance") {
        return TypedValue::ObjectReference(token.to_string());
    }

    if token.len() >= 2 && token.starts_with('{') && token.ends_with('}') {
        let body = token[1..token.len() - 1].trim();
        return TypedValue::Array(split_elements(body).into_iter().map(parse_value).collect());
    }

    if token == "null" {
        return TypedValue::Null;
    }

    if let Some(text) = unquote(token) {
        return TypedValue::String(text.to_string());
    }

    match token {
        "true" => return TypedValue::Bool(true),
        "false" => return TypedValue::Bool(false),
        _ => {}
    }

    if let Ok(n) = token.parse::<i64>() {
        return TypedValue::Int(n);
    }
    if let Ok(x) = token.parse::<f64>() {
        return TypedValue::Float(x);
    }

    TypedValue::String(token.to_string())
}

/// Strip matching single or double quotes (no escape processing)
fn unquote(token: &str) -> Option<&str> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if first == last && (first == '\'' || first == '"') {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}

/// Split the inside of an array literal at top-level commas.
///
/// Commas inside quotes or nested braces do not split. Pieces are trimmed and
/// empty pieces dropped.
pub fn split_elements(body: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in body.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    pieces.push(&body[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    pieces.push(&body[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Parse a `name = value` block such as the output of `locals`.
///
/// Lines without `=` are skipped; the first `=` separates name from value.
pub fn parse_values(block: &str) -> Variables {
    let text = block.replace("\r\n", "\n");
    let mut variables = Variables::default();

    for line in text.trim().lines() {
        let Some((name, value)) = line.split_once('=') else {
            continue;
        };
        variables.insert(name.trim().to_string(), parse_value(value.trim()));
    }

    variables
}
