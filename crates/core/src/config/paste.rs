//! Tolerant parsing of hand-pasted remote-store configuration.
//!
//! Cloud consoles hand out a source-code object literal, not JSON:
//!
//! ```text
//! // Your web app's Firebase configuration
//! const firebaseConfig = {
//!   apiKey: 'AIza...',
//!   projectId: "demo-project",
//! };
//! ```
//!
//! This module normalizes that shape into strict JSON: comments are
//! stripped (quote-aware), the declaration prefix and statement terminator
//! fall away with the outermost-brace slice, known keys are quoted,
//! single-quoted strings become double-quoted, trailing commas are
//! dropped, and the result must survive a strict `serde_json` parse.
//! Anything the normalizer cannot make sense of yields `None`.

/// Keys that may appear unquoted in a pasted config object.
const KNOWN_KEYS: [&str; 7] = [
    "apiKey",
    "authDomain",
    "projectId",
    "storageBucket",
    "messagingSenderId",
    "appId",
    "measurementId",
];

/// Parse strict JSON or a pasted config object literal into a JSON object.
pub fn parse_pasted_config(input: &str) -> Option<serde_json::Value> {
    // Strict JSON first: the common case once a blob has been re-saved by
    // this app.
    if let Ok(value @ serde_json::Value::Object(_)) = serde_json::from_str(input) {
        return Some(value);
    }

    let stripped = strip_comments(input);
    let body = outermost_braces(&stripped)?;
    let keyed = quote_known_keys(body);
    let requoted = normalize_single_quotes(&keyed);
    let cleaned = strip_trailing_commas(&requoted);

    match serde_json::from_str(&cleaned) {
        Ok(value @ serde_json::Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Remove `//` line comments and `/* */` block comments outside strings.
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
            }
            '/' => match chars.peek() {
                Some('/') => {
                    while let Some(&next) = chars.peek() {
                        if next == '\n' {
                            break;
                        }
                        chars.next();
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut prev = '\0';
                    for next in chars.by_ref() {
                        if prev == '*' && next == '/' {
                            break;
                        }
                        prev = next;
                    }
                }
                _ => out.push(c),
            },
            _ => out.push(c),
        }
    }
    out
}

/// Slice from the first `{` to the last `}`, discarding any declaration
/// prefix (`const x =`) and trailing terminator (`;`).
fn outermost_braces(input: &str) -> Option<&str> {
    let start = input.find('{')?;
    let end = input.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&input[start..=end])
}

/// Quote known configuration keys that appear as bare identifiers before a
/// colon.
fn quote_known_keys(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                out.push(c);
                i += 1;
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                let mut lookahead = i;
                while lookahead < chars.len() && chars[lookahead].is_whitespace() {
                    lookahead += 1;
                }
                let is_key = lookahead < chars.len()
                    && chars[lookahead] == ':'
                    && KNOWN_KEYS.contains(&ident.as_str());
                if is_key {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Rewrite single-quoted strings as double-quoted JSON strings.
fn normalize_single_quotes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    let mut in_double = false;

    while let Some(c) = chars.next() {
        if in_double {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == '"' {
                in_double = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_double = true;
                out.push(c);
            }
            '\'' => {
                out.push('"');
                while let Some(next) = chars.next() {
                    match next {
                        '\\' => match chars.next() {
                            // \' has no meaning in JSON; emit the bare quote.
                            Some('\'') => out.push('\''),
                            Some(other) => {
                                out.push('\\');
                                out.push(other);
                            }
                            None => break,
                        },
                        '\'' => break,
                        '"' => out.push_str("\\\""),
                        _ => out.push(next),
                    }
                }
                out.push('"');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Drop commas whose next significant character closes an object or array.
fn strip_trailing_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            ',' => {
                let mut lookahead = i + 1;
                while lookahead < chars.len() && chars[lookahead].is_whitespace() {
                    lookahead += 1;
                }
                if lookahead < chars.len() && matches!(chars[lookahead], '}' | ']') {
                    i += 1;
                } else {
                    out.push(c);
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}
