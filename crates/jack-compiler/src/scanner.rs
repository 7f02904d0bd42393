//! Byte stream -> token stream.
//!
//! `tokenize` runs the whole lexical pass up front; [`Scanner`] is then a
//! cursor over the resulting vector exposing `advance`/`peek`. EOF is the
//! distinguished terminal state `None` from `peek`.

use std::path::Path;

use n2t_diagnostics::{SourceLocation, ToolchainError, ToolchainResult};

use crate::token::{Keyword, Symbol, Token, TokenKind};

const MAX_INT_CONST: u32 = 32767;

/// Lex an entire Jack source file into tokens, or fail on the first bad
/// byte, unterminated string/comment, or integer overflow.
pub fn tokenize(source: &str, file: &Path) -> ToolchainResult<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    let mut line = 1usize;

    loop {
        skip_whitespace_and_comments(bytes, &mut pos, &mut line, file)?;
        if pos >= bytes.len() {
            break;
        }

        let start_line = line;
        let b = bytes[pos];

        if let Some(sym) = Symbol::from_byte(b) {
            tokens.push(Token::new(TokenKind::Symbol(sym), start_line));
            pos += 1;
            continue;
        }

        if b == b'"' {
            let (text, new_pos) = scan_string_const(bytes, pos, line, file)?;
            tokens.push(Token::new(TokenKind::StringConst(text), start_line));
            pos = new_pos;
            continue;
        }

        let word_start = pos;
        while pos < bytes.len() && !is_boundary(bytes[pos]) {
            pos += 1;
        }
        let word = &source[word_start..pos];
        tokens.push(classify_word(word, start_line, file)?);
    }

    Ok(tokens)
}

fn is_boundary(b: u8) -> bool {
    b.is_ascii_whitespace() || Symbol::from_byte(b).is_some() || b == b'"'
}

fn skip_whitespace_and_comments(
    bytes: &[u8],
    pos: &mut usize,
    line: &mut usize,
    file: &Path,
) -> ToolchainResult<()> {
    loop {
        if *pos >= bytes.len() {
            return Ok(());
        }
        let b = bytes[*pos];
        if b == b'\n' {
            *line += 1;
            *pos += 1;
        } else if b.is_ascii_whitespace() {
            *pos += 1;
        } else if bytes[*pos..].starts_with(b"//") {
            while *pos < bytes.len() && bytes[*pos] != b'\n' {
                *pos += 1;
            }
        } else if bytes[*pos..].starts_with(b"/*") {
            let comment_start_line = *line;
            let rest = &bytes[*pos + 2..];
            match find_subslice(rest, b"*/") {
                Some(offset) => {
                    *line += count_newlines(&rest[..offset]);
                    *pos += 2 + offset + 2;
                }
                None => {
                    return Err(ToolchainError::Lex {
                        at: SourceLocation::new(file.to_path_buf(), comment_start_line),
                        message: "unterminated block comment".to_string(),
                    });
                }
            }
        } else {
            return Ok(());
        }
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

fn scan_string_const(
    bytes: &[u8],
    pos: usize,
    line: usize,
    file: &Path,
) -> ToolchainResult<(String, usize)> {
    debug_assert_eq!(bytes[pos], b'"');
    let rest = &bytes[pos + 1..];
    match rest.iter().position(|&b| b == b'"' || b == b'\n') {
        Some(offset) if rest[offset] == b'"' => {
            let text = String::from_utf8_lossy(&rest[..offset]).into_owned();
            Ok((text, pos + 1 + offset + 1))
        }
        _ => Err(ToolchainError::Lex {
            at: SourceLocation::new(file.to_path_buf(), line),
            message: "unterminated string constant".to_string(),
        }),
    }
}

fn classify_word(word: &str, line: usize, file: &Path) -> ToolchainResult<Token> {
    if word.is_empty() {
        return Err(ToolchainError::Lex {
            at: SourceLocation::new(file.to_path_buf(), line),
            message: "empty token".to_string(),
        });
    }

    if let Some(kw) = Keyword::from_str(word) {
        return Ok(Token::new(TokenKind::Keyword(kw), line));
    }

    let first = word.as_bytes()[0];
    if first.is_ascii_digit() {
        if !word.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ToolchainError::Lex {
                at: SourceLocation::new(file.to_path_buf(), line),
                message: format!("malformed numeric literal `{word}`"),
            });
        }
        let value: u32 = word.parse().map_err(|_| ToolchainError::Lex {
            at: SourceLocation::new(file.to_path_buf(), line),
            message: format!("integer constant `{word}` does not fit in a usize"),
        })?;
        if value > MAX_INT_CONST {
            return Err(ToolchainError::Lex {
                at: SourceLocation::new(file.to_path_buf(), line),
                message: format!(
                    "integer constant {value} exceeds the maximum of {MAX_INT_CONST}"
                ),
            });
        }
        return Ok(Token::new(TokenKind::IntConst(value as u16), line));
    }

    if (first.is_ascii_alphabetic() || first == b'_')
        && word
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
    {
        return Ok(Token::new(TokenKind::Identifier(word.to_string()), line));
    }

    Err(ToolchainError::Lex {
        at: SourceLocation::new(file.to_path_buf(), line),
        message: format!("invalid token `{word}`"),
    })
}

/// A cursor over an already-lexed token stream.
///
/// `advance` consumes the current token; `peek` reveals it without
/// consuming. Reaching the end of the stream is EOF, the distinguished
/// terminal state.
pub struct Scanner {
    tokens: Vec<Token>,
    pos: usize,
    file: std::path::PathBuf,
}

impl Scanner {
    pub fn new(tokens: Vec<Token>, file: std::path::PathBuf) -> Self {
        Scanner {
            tokens,
            pos: 0,
            file,
        }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Line of the current (or last, at EOF) token, for error reporting.
    pub fn current_line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.file.clone(), self.current_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn toks(src: &str) -> Vec<Token> {
        tokenize(src, &PathBuf::from("Test.jack")).unwrap()
    }

    #[test]
    fn skips_whitespace_and_all_three_comment_styles() {
        let tokens = toks(
            "// line comment\nclass /* block */ Foo /** doc\nspanning */ { }",
        );
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword(Keyword::Class),
                TokenKind::Identifier("Foo".to_string()),
                TokenKind::Symbol(Symbol::LBrace),
                TokenKind::Symbol(Symbol::RBrace),
            ]
        );
    }

    #[test]
    fn string_constant_has_no_escape_processing() {
        let tokens = toks(r#""hello world""#);
        assert_eq!(
            tokens[0].kind,
            TokenKind::StringConst("hello world".to_string())
        );
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let err = tokenize(r#""oops"#, &PathBuf::from("Test.jack")).unwrap_err();
        assert!(matches!(err, ToolchainError::Lex { .. }));
    }

    #[test]
    fn string_constant_cannot_span_lines() {
        let err = tokenize("\"oops\nstill open\"", &PathBuf::from("Test.jack")).unwrap_err();
        assert!(matches!(err, ToolchainError::Lex { .. }));
    }

    #[test]
    fn integer_overflow_is_fatal() {
        let err = tokenize("32768", &PathBuf::from("Test.jack")).unwrap_err();
        assert!(matches!(err, ToolchainError::Lex { .. }));
    }

    #[test]
    fn integer_at_max_is_accepted() {
        let tokens = toks("32767");
        assert_eq!(tokens[0].kind, TokenKind::IntConst(32767));
    }

    #[test]
    fn leading_digit_identifier_is_fatal() {
        let err = tokenize("1abc", &PathBuf::from("Test.jack")).unwrap_err();
        assert!(matches!(err, ToolchainError::Lex { .. }));
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        let err = tokenize("/* never closes", &PathBuf::from("Test.jack")).unwrap_err();
        assert!(matches!(err, ToolchainError::Lex { .. }));
    }

    #[test]
    fn scanner_cursor_advances_and_reports_eof() {
        let mut scanner = Scanner::new(toks("x;"), PathBuf::from("Test.jack"));
        assert!(!scanner.is_eof());
        assert_eq!(
            scanner.advance().unwrap().kind,
            TokenKind::Identifier("x".to_string())
        );
        assert_eq!(
            scanner.advance().unwrap().kind,
            TokenKind::Symbol(Symbol::Semicolon)
        );
        assert!(scanner.advance().is_none());
        assert!(scanner.is_eof());
    }
}
