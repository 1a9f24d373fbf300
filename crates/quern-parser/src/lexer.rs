//! Character-level SQL lexer.
//!
//! Produces a flat token stream with 1-based line/column positions, or a
//! position-tagged [`Error::Syntax`] on the first unlexable character.
//! Comments (`-- ...` and `/* ... */`) and whitespace are skipped.

use quern_error::{Error, Result};
use tracing::trace;

use crate::token::{Token, TokenKind};

/// Tokenize an SQL script.
///
/// The returned stream always ends with a single [`TokenKind::Eof`] token.
///
/// # Errors
///
/// Returns [`Error::Syntax`] for an unexpected character, an unterminated
/// string literal, or an unterminated block comment.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    trace!(count = tokens.len(), "tokenized input");
    Ok(tokens)
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('-') if self.peek_at(1) == Some('-') => {
                    while let Some(ch) = self.peek() {
                        if ch == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                            None => {
                                return Err(Error::syntax(
                                    line,
                                    column,
                                    "unterminated block comment",
                                ));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);

        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", line, column));
        };

        if ch.is_ascii_digit() {
            return Ok(self.lex_number(line, column));
        }
        if ch.is_alphabetic() || ch == '_' {
            return Ok(self.lex_word(line, column));
        }
        if ch == '\'' || ch == '"' {
            return self.lex_string(ch, line, column);
        }

        self.bump();
        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            '=' => TokenKind::Equal,
            '<' => match self.peek() {
                Some('=') => {
                    self.bump();
                    return Ok(Token::new(TokenKind::LessEqual, "<=", line, column));
                }
                Some('>') => {
                    self.bump();
                    return Ok(Token::new(TokenKind::NotEqual, "<>", line, column));
                }
                _ => TokenKind::LessThan,
            },
            '>' => {
                if self.peek() == Some('=') {
                    self.bump();
                    return Ok(Token::new(TokenKind::GreaterEqual, ">=", line, column));
                }
                TokenKind::GreaterThan
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.bump();
                    return Ok(Token::new(TokenKind::NotEqual, "!=", line, column));
                }
                return Err(Error::syntax(line, column, "unexpected character `!`"));
            }
            other => {
                return Err(Error::syntax(
                    line,
                    column,
                    format!("unexpected character `{other}`"),
                ));
            }
        };
        Ok(Token::new(kind, ch.to_string(), line, column))
    }

    fn lex_number(&mut self, line: u32, column: u32) -> Token {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        // A dot followed by a digit makes this a decimal literal; a bare
        // trailing dot stays with the next token.
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.bump();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    text.push(ch);
                    self.bump();
                } else {
                    break;
                }
            }
            return Token::new(TokenKind::DecimalLiteral, text, line, column);
        }
        Token::new(TokenKind::IntegerLiteral, text, line, column)
    }

    fn lex_word(&mut self, line: u32, column: u32) -> Token {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, line, column)
    }

    /// Lex a quoted string. The token text keeps both quote characters;
    /// quote stripping is the lowering builder's job.
    fn lex_string(&mut self, quote: char, line: u32, column: u32) -> Result<Token> {
        let mut text = String::new();
        text.push(quote);
        self.bump();
        loop {
            match self.peek() {
                Some(ch) if ch == quote => {
                    text.push(ch);
                    self.bump();
                    return Ok(Token::new(TokenKind::StringLiteral, text, line, column));
                }
                Some(ch) => {
                    text.push(ch);
                    self.bump();
                }
                None => {
                    return Err(Error::syntax(line, column, "unterminated string literal"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_simple_select() {
        assert_eq!(
            kinds("SELECT * FROM t"),
            vec![
                TokenKind::Select,
                TokenKind::Star,
                TokenKind::From,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_comparison_operators() {
        assert_eq!(
            kinds("a <> b != c <= d >= e"),
            vec![
                TokenKind::Identifier,
                TokenKind::NotEqual,
                TokenKind::Identifier,
                TokenKind::NotEqual,
                TokenKind::Identifier,
                TokenKind::LessEqual,
                TokenKind::Identifier,
                TokenKind::GreaterEqual,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn integer_and_decimal_literals_are_distinct() {
        let tokens = tokenize("42 3.14").expect("tokenize");
        assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
        assert_eq!(tokens[0].text, "42");
        assert_eq!(tokens[1].kind, TokenKind::DecimalLiteral);
        assert_eq!(tokens[1].text, "3.14");
    }

    #[test]
    fn string_token_keeps_quotes() {
        let tokens = tokenize("'hello world'").expect("tokenize");
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].text, "'hello world'");
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("SELECT a\nFROM t\nWHERE @").expect_err("lex error");
        assert_eq!(
            tokens,
            Error::syntax(3, 7, "unexpected character `@`"),
            "error position must point at the offending character"
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(
            kinds("SELECT -- projection\n1 /* the\nanswer */ ;"),
            vec![
                TokenKind::Select,
                TokenKind::IntegerLiteral,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_a_syntax_error() {
        let err = tokenize("SELECT 'oops").expect_err("must fail");
        assert!(matches!(err, Error::Syntax { line: 1, .. }));
    }

    proptest::proptest! {
        #[test]
        fn integers_keep_their_source_text(value in 0u64..u64::MAX) {
            let tokens = tokenize(&value.to_string()).expect("tokenize");
            proptest::prop_assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
            proptest::prop_assert_eq!(&tokens[0].text, &value.to_string());
        }

        #[test]
        fn non_keyword_words_lex_as_one_identifier(word in "[a-z_][a-z0-9_]{0,16}") {
            proptest::prop_assume!(TokenKind::keyword(&word).is_none());
            let tokens = tokenize(&word).expect("tokenize");
            proptest::prop_assert_eq!(tokens.len(), 2, "identifier plus Eof");
            proptest::prop_assert_eq!(tokens[0].kind, TokenKind::Identifier);
            proptest::prop_assert_eq!(&tokens[0].text, &word);
        }
    }
}
