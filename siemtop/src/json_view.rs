//! Pretty-printed JSON split into classed tokens for the event detail view.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Object key, including the trailing colon.
    Key,
    String,
    Number,
    Boolean,
    Null,
    /// Braces, commas, indentation.
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

pub type TokenLine = Vec<Token>;

/// Pretty-print `value` (two-space indent) and tokenize it line by line.
pub fn highlight(value: &Value) -> Vec<TokenLine> {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    // Pretty output only breaks lines between tokens; string newlines stay escaped.
    pretty.lines().map(tokenize_line).collect()
}

pub fn tokenize_line(line: &str) -> TokenLine {
    let chars: Vec<char> = line.chars().collect();
    let mut out: TokenLine = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;
        let kind = if c == '"' {
            i = scan_string(&chars, i);
            // A string followed by optional spaces and ':' is a key; keep the colon with it.
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == ':' {
                i = j + 1;
                TokenKind::Key
            } else {
                TokenKind::String
            }
        } else if c.is_ascii_digit()
            || (c == '-' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()))
        {
            i += 1;
            while i < chars.len() && matches!(chars[i], '0'..='9' | '.' | 'e' | 'E' | '+' | '-') {
                i += 1;
            }
            TokenKind::Number
        } else if let Some((len, kind)) = keyword_at(&chars, i) {
            i += len;
            kind
        } else {
            plain.push(c);
            i += 1;
            continue;
        };

        if !plain.is_empty() {
            out.push(Token {
                kind: TokenKind::Plain,
                text: std::mem::take(&mut plain),
            });
        }
        out.push(Token {
            kind,
            text: chars[start..i].iter().collect(),
        });
    }
    if !plain.is_empty() {
        out.push(Token {
            kind: TokenKind::Plain,
            text: plain,
        });
    }
    out
}

// Index just past the closing quote (or end of line for a truncated string).
fn scan_string(chars: &[char], open: usize) -> usize {
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

fn keyword_at(chars: &[char], i: usize) -> Option<(usize, TokenKind)> {
    for (word, kind) in [
        ("true", TokenKind::Boolean),
        ("false", TokenKind::Boolean),
        ("null", TokenKind::Null),
    ] {
        let n = word.len();
        if i + n <= chars.len() && chars[i..i + n].iter().copied().eq(word.chars()) {
            let before_ok = i == 0 || !chars[i - 1].is_alphanumeric();
            let after_ok = chars.get(i + n).map_or(true, |c| !c.is_alphanumeric());
            if before_ok && after_ok {
                return Some((n, kind));
            }
        }
    }
    None
}
