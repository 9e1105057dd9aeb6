//! Recursive-descent parser for mapping files.
//!
//! Grammar:
//!
//! ```text
//! file          := pathLine NEWLINE rule*
//! pathLine      := PATH | IDENTIFIER
//! rule          := extensionList ARROW folderName NEWLINE
//! extensionList := EXTENSION (COMMA EXTENSION)*
//! folderName    := IDENTIFIER
//! ```
//!
//! Blank and comment-only lines are skipped anywhere. The parser does not stop
//! at the first error: it records the error, skips to the next line and keeps
//! going, so a single run reports every broken line. [`parse`] turns any
//! recorded error into a failure; [`parse_partial`] hands back the rules that
//! did parse together with the diagnostics.

use crate::defaults::normalize_extension;
use crate::lexer::{Token, TokenKind, tokenize};
use std::fmt;

/// One `EXT[, EXT...] -> FOLDER` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRule {
    /// Lowercased extensions with a leading dot, unique within the rule, in file order.
    pub extensions: Vec<String>,
    /// Folder name exactly as written.
    pub folder: String,
    /// 1-based line the rule was declared on.
    pub line: usize,
}

/// The destination directory and the rules of a mapping file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMapping {
    /// Destination directory as written; `None` if the file did not start with one.
    pub destination: Option<String>,
    /// Rules in declaration order.
    pub rules: Vec<MappingRule>,
}

/// What went wrong on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The file has no destination directory line before its rules.
    MissingDestination,
    /// Extensions were not followed by `->`.
    MissingArrow { found: String },
    /// An arrow with nothing on its left.
    MissingExtensions,
    /// An arrow with nothing on its right.
    MissingFolderName,
    /// A word where an extension (starting with `.`) was expected.
    InvalidExtension { found: String },
    /// Any other out-of-place token.
    Unexpected { expected: &'static str, found: String },
    /// Text the scanner could not classify.
    Lex { text: String, message: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::MissingDestination => write!(
                f,
                "missing destination directory: the first line must name the directory to sort"
            ),
            ParseErrorKind::MissingArrow { found } => {
                write!(f, "expected '->' after the extension list, found {}", found)
            }
            ParseErrorKind::MissingExtensions => {
                write!(f, "expected at least one extension before '->'")
            }
            ParseErrorKind::MissingFolderName => {
                write!(f, "expected a folder name after '->'")
            }
            ParseErrorKind::InvalidExtension { found } => {
                write!(f, "extensions must start with '.', found '{}'", found)
            }
            ParseErrorKind::Unexpected { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            ParseErrorKind::Lex { message, .. } => write!(f, "{}", message),
        }
    }
}

/// A syntax or lexical error with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.column, self.kind)
    }
}

impl std::error::Error for ParseError {}

/// Every error found in one parse. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(Vec<ParseError>);

impl ParseErrors {
    pub fn errors(&self) -> &[ParseError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<ParseError> {
        self.0
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

/// Parses a token sequence, failing with every error found.
///
/// # Examples
///
/// ```
/// use dirsort::lexer::tokenize;
/// use dirsort::parser::parse;
///
/// let parsed = parse(&tokenize("/dest\n.png, .JPG -> Photos\n")).unwrap();
/// assert_eq!(parsed.destination.as_deref(), Some("/dest"));
/// assert_eq!(parsed.rules[0].extensions, vec![".png", ".jpg"]);
///
/// let errors = parse(&tokenize("/dest\n.txt Texts\n")).unwrap_err();
/// assert_eq!(errors.errors()[0].line, 2);
/// ```
pub fn parse(tokens: &[Token]) -> Result<ParsedMapping, ParseErrors> {
    let (parsed, errors) = parse_partial(tokens);
    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(ParseErrors(errors))
    }
}

/// Parses a token sequence, returning the well-formed rules and all diagnostics.
pub fn parse_partial(tokens: &[Token]) -> (ParsedMapping, Vec<ParseError>) {
    let owned;
    let tokens = match tokens.last() {
        Some(last) if last.kind == TokenKind::Eof => tokens,
        _ => {
            let line = tokens.last().map_or(1, |t| t.line);
            let mut with_eof = tokens.to_vec();
            with_eof.push(Token::new(TokenKind::Eof, line, 1));
            owned = with_eof;
            &owned
        }
    };

    let mut parser = Parser::new(tokens);
    let parsed = parser.parse_file();
    tracing::debug!(
        tokens = tokens.len(),
        rules = parsed.rules.len(),
        errors = parser.errors.len(),
        "parsed mapping"
    );
    (parsed, parser.errors)
}

/// Scans and parses mapping-file text in one step.
pub fn parse_mapping_file(text: &str) -> (ParsedMapping, Vec<ParseError>) {
    parse_partial(&tokenize(text))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    /// `tokens` must end with `Eof`.
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> &'a Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn error_at(token: &Token, kind: ParseErrorKind) -> ParseError {
        ParseError {
            line: token.line,
            column: token.column,
            kind,
        }
    }

    fn lex_error(token: &Token) -> Option<ParseError> {
        match &token.kind {
            TokenKind::Error { text, message } => Some(Self::error_at(
                token,
                ParseErrorKind::Lex {
                    text: text.clone(),
                    message: message.clone(),
                },
            )),
            _ => None,
        }
    }

    fn parse_file(&mut self) -> ParsedMapping {
        let destination = self.parse_path_line();
        let mut rules = Vec::new();

        loop {
            self.skip_trivia();
            if self.at_eof() {
                break;
            }
            match self.parse_rule() {
                Ok(rule) => rules.push(rule),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
        }

        ParsedMapping { destination, rules }
    }

    /// Skips newlines and comments.
    fn skip_trivia(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline | TokenKind::Comment(_)) {
            self.advance();
        }
    }

    /// Skips the rest of the current line, including its newline.
    fn synchronize(&mut self) {
        loop {
            match self.peek().kind {
                TokenKind::Eof => return,
                TokenKind::Newline => {
                    self.advance();
                    return;
                }
                _ => self.advance(),
            }
        }
    }

    fn parse_path_line(&mut self) -> Option<String> {
        self.skip_trivia();
        let token = self.peek();
        let destination = match &token.kind {
            TokenKind::Path(path) => path.clone(),
            TokenKind::Identifier(word) if self.is_line_end(self.pos + 1) => word.clone(),
            _ => {
                // Leave the tokens in place so the line still parses as a rule.
                self.errors
                    .push(Self::error_at(token, ParseErrorKind::MissingDestination));
                return None;
            }
        };

        self.advance();
        if let Err(error) = self.expect_line_end() {
            self.errors.push(error);
            self.synchronize();
        }
        Some(destination)
    }

    fn is_line_end(&self, index: usize) -> bool {
        self.tokens.get(index).is_none_or(|token| {
            matches!(
                token.kind,
                TokenKind::Newline | TokenKind::Eof | TokenKind::Comment(_)
            )
        })
    }

    fn parse_rule(&mut self) -> Result<MappingRule, ParseError> {
        let line = self.peek().line;
        let extensions = self.parse_extension_list()?;
        self.expect_arrow()?;
        let folder = self.parse_folder_name()?;
        self.expect_line_end()?;

        Ok(MappingRule {
            extensions,
            folder,
            line,
        })
    }

    fn parse_extension_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut extensions: Vec<String> = Vec::new();

        loop {
            let token = self.peek();
            match &token.kind {
                TokenKind::Extension(ext) => {
                    let ext = normalize_extension(ext);
                    if extensions.contains(&ext) {
                        tracing::warn!(
                            line = token.line,
                            extension = %ext,
                            "extension listed twice in one rule"
                        );
                    } else {
                        extensions.push(ext);
                    }
                    self.advance();
                }
                TokenKind::Identifier(word) => {
                    return Err(Self::error_at(
                        token,
                        ParseErrorKind::InvalidExtension {
                            found: word.clone(),
                        },
                    ));
                }
                TokenKind::Arrow if extensions.is_empty() => {
                    return Err(Self::error_at(token, ParseErrorKind::MissingExtensions));
                }
                TokenKind::Error { .. } => {
                    return Err(Self::lex_error(token).unwrap_or_else(|| {
                        Self::error_at(token, ParseErrorKind::MissingExtensions)
                    }));
                }
                other => {
                    let expected = if extensions.is_empty() {
                        "an extension"
                    } else {
                        "an extension after ','"
                    };
                    return Err(Self::error_at(
                        token,
                        ParseErrorKind::Unexpected {
                            expected,
                            found: other.describe(),
                        },
                    ));
                }
            }

            if self.peek().kind == TokenKind::Comma {
                self.advance();
            } else {
                return Ok(extensions);
            }
        }
    }

    fn expect_arrow(&mut self) -> Result<(), ParseError> {
        let token = self.peek();
        if token.kind == TokenKind::Arrow {
            self.advance();
            return Ok(());
        }
        Err(Self::lex_error(token).unwrap_or_else(|| {
            Self::error_at(
                token,
                ParseErrorKind::MissingArrow {
                    found: token.kind.describe(),
                },
            )
        }))
    }

    fn parse_folder_name(&mut self) -> Result<String, ParseError> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name.clone())
            }
            TokenKind::Newline | TokenKind::Eof | TokenKind::Comment(_) => {
                Err(Self::error_at(token, ParseErrorKind::MissingFolderName))
            }
            TokenKind::Error { .. } => Err(Self::lex_error(token)
                .unwrap_or_else(|| Self::error_at(token, ParseErrorKind::MissingFolderName))),
            other => Err(Self::error_at(
                token,
                ParseErrorKind::Unexpected {
                    expected: "a folder name",
                    found: other.describe(),
                },
            )),
        }
    }

    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        if matches!(self.peek().kind, TokenKind::Comment(_)) {
            self.advance();
        }
        let token = self.peek();
        match &token.kind {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            TokenKind::Error { .. } => Err(Self::lex_error(token).unwrap_or_else(|| {
                Self::error_at(
                    token,
                    ParseErrorKind::Unexpected {
                        expected: "end of line",
                        found: token.kind.describe(),
                    },
                )
            })),
            other => Err(Self::error_at(
                token,
                ParseErrorKind::Unexpected {
                    expected: "end of line",
                    found: other.describe(),
                },
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_text(text: &str) -> Result<ParsedMapping, ParseErrors> {
        parse(&tokenize(text))
    }

    fn rule(extensions: &[&str], folder: &str, line: usize) -> MappingRule {
        MappingRule {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            folder: folder.to_string(),
            line,
        }
    }

    #[test]
    fn test_parse_destination_and_rules() {
        let parsed = parse_text("/dest\n.txt -> Texts\n.png, .jpg -> Photos\n").unwrap();
        assert_eq!(parsed.destination.as_deref(), Some("/dest"));
        assert_eq!(
            parsed.rules,
            vec![
                rule(&[".txt"], "Texts", 2),
                rule(&[".png", ".jpg"], "Photos", 3)
            ]
        );
    }

    #[test]
    fn test_parse_lowercases_extensions() {
        let parsed = parse_text("/dest\n.PNG, .Jpeg -> Photos\n").unwrap();
        assert_eq!(parsed.rules[0].extensions, vec![".png", ".jpeg"]);
    }

    #[test]
    fn test_parse_collapses_duplicate_extensions_in_rule() {
        let parsed = parse_text("/dest\n.txt, .TXT, .md -> Texts\n").unwrap();
        assert_eq!(parsed.rules[0].extensions, vec![".txt", ".md"]);
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let text = "# my rules\n\n/dest  # target\n\n# docs\n.txt -> Texts # plain\n\n\n.mp3 -> Music\n";
        let parsed = parse_text(text).unwrap();
        assert_eq!(parsed.destination.as_deref(), Some("/dest"));
        assert_eq!(
            parsed.rules,
            vec![rule(&[".txt"], "Texts", 6), rule(&[".mp3"], "Music", 9)]
        );
    }

    #[test]
    fn test_parse_multi_word_folder() {
        let parsed = parse_text("/dest\n.py, .rs -> Coding Files\n").unwrap();
        assert_eq!(parsed.rules[0].folder, "Coding Files");
    }

    #[test]
    fn test_parse_destination_only() {
        let parsed = parse_text("/dest").unwrap();
        assert_eq!(parsed.destination.as_deref(), Some("/dest"));
        assert!(parsed.rules.is_empty());
    }

    #[test]
    fn test_empty_file_reports_missing_destination() {
        let errors = parse_text("").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].line, 1);
        assert_eq!(errors.errors()[0].kind, ParseErrorKind::MissingDestination);
    }

    #[test]
    fn test_comment_only_file_reports_missing_destination() {
        let errors = parse_text("# nothing here\n\n").unwrap_err();
        assert_eq!(errors.errors()[0].kind, ParseErrorKind::MissingDestination);
    }

    #[test]
    fn test_rule_on_first_line_reports_missing_destination_but_keeps_rule() {
        let (parsed, errors) = parse_mapping_file(".txt -> Texts\n.md -> Notes\n");
        assert_eq!(parsed.destination, None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ParseErrorKind::MissingDestination);
        assert_eq!(errors[0].line, 1);
        assert_eq!(parsed.rules.len(), 2);
    }

    #[test]
    fn test_missing_arrow_reports_line() {
        let errors = parse_text("/dest\n.md -> Notes\n.txt Texts\n").unwrap_err();
        assert_eq!(errors.len(), 1);
        let error = &errors.errors()[0];
        assert_eq!(error.line, 3);
        assert_eq!(
            error.kind,
            ParseErrorKind::MissingArrow {
                found: "'Texts'".to_string()
            }
        );
        assert!(error.to_string().starts_with("line 3, column 6:"));
    }

    #[test]
    fn test_extensions_without_anything_else() {
        let errors = parse_text("/dest\n.txt, .md\n").unwrap_err();
        assert_eq!(
            errors.errors()[0].kind,
            ParseErrorKind::MissingArrow {
                found: "end of line".to_string()
            }
        );
    }

    #[test]
    fn test_arrow_without_extensions() {
        let errors = parse_text("/dest\n-> Texts\n").unwrap_err();
        assert_eq!(errors.errors()[0].kind, ParseErrorKind::MissingExtensions);
        assert_eq!(errors.errors()[0].line, 2);
    }

    #[test]
    fn test_arrow_without_folder() {
        let errors = parse_text("/dest\n.txt ->   # nothing\n").unwrap_err();
        assert_eq!(errors.errors()[0].kind, ParseErrorKind::MissingFolderName);
    }

    #[test]
    fn test_extension_without_dot() {
        let errors = parse_text("/dest\ntxt -> Texts\n").unwrap_err();
        assert_eq!(
            errors.errors()[0].kind,
            ParseErrorKind::InvalidExtension {
                found: "txt".to_string()
            }
        );
    }

    #[test]
    fn test_trailing_comma() {
        let errors = parse_text("/dest\n.txt, -> Texts\n").unwrap_err();
        assert_eq!(
            errors.errors()[0].kind,
            ParseErrorKind::Unexpected {
                expected: "an extension after ','",
                found: "'->'".to_string()
            }
        );
    }

    #[test]
    fn test_extra_tokens_after_folder() {
        let errors = parse_text("/dest\n.txt -> Texts, Notes\n").unwrap_err();
        assert!(matches!(
            errors.errors()[0].kind,
            ParseErrorKind::Unexpected {
                expected: "end of line",
                ..
            }
        ));
    }

    #[test]
    fn test_lex_error_is_reported_with_position() {
        let errors = parse_text("/dest\n.txt -> Te*xts\n").unwrap_err();
        let error = &errors.errors()[0];
        assert_eq!((error.line, error.column), (2, 11));
        assert!(matches!(error.kind, ParseErrorKind::Lex { .. }));
    }

    #[test]
    fn test_errors_accumulate_across_lines() {
        let text = "/dest\n.txt Texts\n.md -> Notes\n-> Music\n.png -> \n.jpg -> Photos\n";
        let (parsed, errors) = parse_mapping_file(text);
        let lines: Vec<usize> = errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4, 5]);
        assert_eq!(
            parsed.rules,
            vec![rule(&[".md"], "Notes", 3), rule(&[".jpg"], "Photos", 6)]
        );
    }

    #[test]
    fn test_parse_errors_display_lists_all() {
        let errors = parse_text("/dest\n.txt Texts\n-> Music\n").unwrap_err();
        let message = errors.to_string();
        assert_eq!(message.lines().count(), 2);
        assert!(message.contains("line 2"));
        assert!(message.contains("line 3"));
    }

    #[test]
    fn test_parse_without_eof_token() {
        let tokens = vec![
            Token::new(TokenKind::Identifier("dest".to_string()), 1, 1),
            Token::new(TokenKind::Newline, 1, 5),
            Token::new(TokenKind::Extension(".txt".to_string()), 2, 1),
            Token::new(TokenKind::Arrow, 2, 6),
            Token::new(TokenKind::Identifier("Texts".to_string()), 2, 9),
        ];
        let parsed = parse(&tokens).unwrap();
        assert_eq!(parsed.destination.as_deref(), Some("dest"));
        assert_eq!(parsed.rules, vec![rule(&[".txt"], "Texts", 2)]);
    }

    #[test]
    fn test_parse_empty_token_slice() {
        let errors = parse(&[]).unwrap_err();
        assert_eq!(errors.errors()[0].kind, ParseErrorKind::MissingDestination);
    }
}
