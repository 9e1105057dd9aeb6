//! Lexical scanner for mapping files.
//!
//! A mapping file names the directory to sort on its first line and then lists
//! one rule per line:
//!
//! ```text
//! /home/user/Downloads
//! # documents go together
//! .txt, .md -> Texts
//! .py -> Coding Files
//! ```
//!
//! The scanner never fails. Characters it cannot classify become
//! [`TokenKind::Error`] tokens and the parser decides what to do with them.
//!
//! # Examples
//!
//! ```
//! use dirsort::lexer::{tokenize, TokenKind};
//!
//! let tokens = tokenize("/dest\n.png, .jpg -> Photos\n");
//! let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
//! assert_eq!(kinds[0], TokenKind::Path("/dest".to_string()));
//! assert_eq!(kinds[2], TokenKind::Extension(".png".to_string()));
//! assert_eq!(kinds[5], TokenKind::Arrow);
//! assert_eq!(kinds[6], TokenKind::Identifier("Photos".to_string()));
//! ```

use std::fmt;

/// The classification of a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// The destination directory line, taken verbatim (comments stripped, trimmed).
    Path(String),
    /// A file extension including its leading dot, e.g. `.tar.gz`.
    Extension(String),
    /// The `->` separator between extensions and a folder name.
    Arrow,
    /// The `,` separator between extensions.
    Comma,
    /// A bare word; right of an arrow it may contain inner spaces.
    Identifier(String),
    /// Comment text after `#`.
    Comment(String),
    /// End of a line.
    Newline,
    /// End of input.
    Eof,
    /// Text the scanner could not classify.
    Error {
        /// The offending text.
        text: String,
        /// What was wrong with it.
        message: String,
    },
}

impl TokenKind {
    /// Short human-readable description used in "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Path(path) => format!("path '{}'", path),
            TokenKind::Extension(ext) => format!("extension '{}'", ext),
            TokenKind::Arrow => "'->'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Identifier(word) => format!("'{}'", word),
            TokenKind::Comment(_) => "comment".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Error { text, .. } => format!("'{}'", text),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// A classified lexical unit with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}

/// Scans mapping-file text into tokens.
///
/// The returned sequence always ends with a `Newline` followed by `Eof`, so
/// every rule line is terminated even when the text lacks a final newline.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut seen_content = false;
    let lines: Vec<&str> = text.split('\n').collect();
    let last_index = lines.len() - 1;

    for (index, raw_line) in lines.iter().enumerate() {
        let line_no = index + 1;
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let before = tokens.len();

        if !seen_content && has_content(line) {
            seen_content = true;
            if !line.contains("->") {
                scan_path_line(line, line_no, &mut tokens);
            } else {
                scan_line(line, line_no, &mut tokens);
            }
        } else {
            scan_line(line, line_no, &mut tokens);
        }

        let column = line.chars().count() + 1;
        if index < last_index || tokens.len() > before {
            tokens.push(Token::new(TokenKind::Newline, line_no, column));
        }
    }

    let (line, column) = match tokens.last() {
        Some(last) if last.kind == TokenKind::Newline => (last.line + 1, 1),
        Some(last) => (last.line, last.column + 1),
        None => (1, 1),
    };
    tokens.push(Token::new(TokenKind::Eof, line, column));
    tokens
}

/// True if the line holds anything besides whitespace and a comment.
fn has_content(line: &str) -> bool {
    !strip_comment(line).trim().is_empty()
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => &line[..index],
        None => line,
    }
}

fn scan_path_line(line: &str, line_no: usize, tokens: &mut Vec<Token>) {
    let content = strip_comment(line);
    let leading = content.chars().take_while(|c| c.is_whitespace()).count();
    tokens.push(Token::new(
        TokenKind::Path(content.trim().to_string()),
        line_no,
        leading + 1,
    ));

    if let Some(hash) = line.find('#') {
        let column = line[..hash].chars().count() + 1;
        let text = line[hash + 1..].trim().to_string();
        tokens.push(Token::new(TokenKind::Comment(text), line_no, column));
    }
}

fn scan_line(line: &str, line_no: usize, tokens: &mut Vec<Token>) {
    let chars: Vec<char> = line.chars().collect();
    let mut pos = 0;
    let mut after_arrow = false;

    while pos < chars.len() {
        let column = pos + 1;
        match chars[pos] {
            ' ' | '\t' | '\r' => pos += 1,
            '#' => {
                let text: String = chars[pos + 1..].iter().collect();
                tokens.push(Token::new(
                    TokenKind::Comment(text.trim().to_string()),
                    line_no,
                    column,
                ));
                break;
            }
            ',' => {
                tokens.push(Token::new(TokenKind::Comma, line_no, column));
                pos += 1;
            }
            '-' if chars.get(pos + 1) == Some(&'>') => {
                tokens.push(Token::new(TokenKind::Arrow, line_no, column));
                after_arrow = true;
                pos += 2;
            }
            '.' => {
                let end = extension_end(&chars, pos + 1);
                if end == pos + 1 {
                    tokens.push(Token::new(
                        TokenKind::Error {
                            text: ".".to_string(),
                            message: "expected an extension name after '.'".to_string(),
                        },
                        line_no,
                        column,
                    ));
                    break;
                }
                let ext: String = chars[pos..end].iter().collect();
                tokens.push(Token::new(TokenKind::Extension(ext), line_no, column));
                pos = end;
            }
            c if is_identifier_start(c) => {
                let end = identifier_end(&chars, pos, after_arrow);
                let word: String = chars[pos..end].iter().collect();
                tokens.push(Token::new(TokenKind::Identifier(word), line_no, column));
                pos = end;
            }
            other => {
                tokens.push(Token::new(
                    TokenKind::Error {
                        text: other.to_string(),
                        message: format!("unexpected character '{}'", other.escape_default()),
                    },
                    line_no,
                    column,
                ));
                // Resume on the next line.
                break;
            }
        }
    }
}

/// A `-` only continues a word when it does not start an arrow.
fn is_hyphen_in_word(chars: &[char], pos: usize) -> bool {
    chars[pos] == '-' && chars.get(pos + 1) != Some(&'>')
}

fn extension_end(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() {
        let c = chars[end];
        if c.is_alphanumeric() || matches!(c, '.' | '_' | '+' | '~') || is_hyphen_in_word(chars, end)
        {
            end += 1;
        } else {
            break;
        }
    }
    end
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_identifier_char(chars: &[char], pos: usize) -> bool {
    let c = chars[pos];
    c.is_alphanumeric()
        || matches!(c, '_' | '.' | '(' | ')' | '&' | '\'' | '+')
        || is_hyphen_in_word(chars, pos)
}

/// Right of an arrow a folder name may span inner spaces; trailing blanks are
/// left for the caller to skip.
fn identifier_end(chars: &[char], start: usize, allow_spaces: bool) -> usize {
    let mut end = start;
    let mut last_word_char = start;
    while end < chars.len() {
        if is_identifier_char(chars, end) {
            end += 1;
            last_word_char = end;
        } else if allow_spaces && matches!(chars[end], ' ' | '\t') {
            end += 1;
        } else {
            break;
        }
    }
    last_word_char
}
