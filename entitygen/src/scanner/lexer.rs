//! Minimal PHP tokenizer feeding the declaration scanner.
//!
//! Only declaration sites matter, so the token set is a flat tag enum:
//! keywords the scanner reacts to, identifiers, `$variables`, and raw
//! punctuation. Whitespace, comments, string literals, heredoc bodies,
//! and numbers are consumed and never emitted.

/// A significant PHP token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Namespace,
    Class,
    Function,
    Var,
    /// `public`, `protected`, or `private`
    Visibility,
    Static,
    Const,
    /// Bare word: type names, class names, method names, other keywords
    Identifier(String),
    /// `$name`, with the leading `$` stripped
    Variable(String),
    /// `\` between namespace segments
    NsSeparator,
    Ampersand,
    /// Any other significant single character
    Punct(char),
}

/// Tokenize PHP source. Never fails; unrecognized bytes become punctuation
/// or are skipped, so malformed input still yields a usable stream.
pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];

        match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
            }
            b'#' => {
                // line comment; PHP 8 attributes also start with `#` and
                // must not be misread as property declarations
                i = skip_line(bytes, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line(bytes, i);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i + 2);
            }
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(bytes, i + 1, c);
            }
            b'<' if bytes[i..].starts_with(b"<<<") => {
                i = skip_heredoc(source, i + 3);
            }
            b'$' => {
                let start = i + 1;
                let end = scan_word(bytes, start);
                if end > start {
                    tokens.push(Token::Variable(source[start..end].to_string()));
                    i = end;
                } else {
                    tokens.push(Token::Punct('$'));
                    i += 1;
                }
            }
            b'\\' => {
                tokens.push(Token::NsSeparator);
                i += 1;
            }
            b'&' => {
                tokens.push(Token::Ampersand);
                i += 1;
            }
            _ if c.is_ascii_digit() => {
                i = skip_number(bytes, i);
            }
            _ if is_word_start(c) => {
                let end = scan_word(bytes, i);
                tokens.push(keyword_or_identifier(&source[i..end]));
                i = end;
            }
            _ => {
                if c.is_ascii() {
                    tokens.push(Token::Punct(c as char));
                }
                i += 1;
            }
        }
    }

    tokens
}

fn keyword_or_identifier(word: &str) -> Token {
    // PHP keywords are case-insensitive
    match word.to_ascii_lowercase().as_str() {
        "namespace" => Token::Namespace,
        "class" => Token::Class,
        "function" => Token::Function,
        "var" => Token::Var,
        "public" | "protected" | "private" => Token::Visibility,
        "static" => Token::Static,
        "const" => Token::Const,
        _ => Token::Identifier(word.to_string()),
    }
}

fn is_word_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c >= 0x80
}

fn scan_word(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && is_word_char(bytes[i]) {
        i += 1;
    }
    i
}

fn skip_line(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_number(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.' || bytes[i] == b'_') {
        i += 1;
    }
    i
}

/// Skip a heredoc/nowdoc body: read the label after `<<<`, then advance
/// past the first line that starts with it. Best effort on malformed input.
fn skip_heredoc(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut i = start;

    while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
        i += 1;
    }
    let quoted = i < bytes.len() && (bytes[i] == b'\'' || bytes[i] == b'"');
    if quoted {
        i += 1;
    }
    let label_start = i;
    let label_end = scan_word(bytes, label_start);
    let label = &source[label_start..label_end];
    if label.is_empty() {
        return label_end;
    }

    let mut pos = label_end;
    while let Some(newline) = source[pos..].find('\n') {
        let line_start = pos + newline + 1;
        let line = source[line_start..].trim_start_matches([' ', '\t']);
        if line.starts_with(label) {
            let offset = line_start + (source[line_start..].len() - line.len());
            return offset + label.len();
        }
        pos = line_start;
    }

    source.len()
}
