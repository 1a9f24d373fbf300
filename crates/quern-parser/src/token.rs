//! SQL tokens.

use std::fmt;

/// The kind of a lexed token.
///
/// Keywords are recognized case-insensitively; the token keeps the original
/// source spelling in [`Token::text`] so placeholder statements can
/// reconstruct their source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Select,
    Distinct,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    Asc,
    Desc,
    Limit,
    Offset,
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Create,
    Drop,
    Alter,
    Table,
    Index,
    Database,
    If,
    Exists,
    Not,
    Null,
    And,
    Or,
    Like,
    Is,
    As,
    On,
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    Natural,
    Primary,
    Key,
    Unique,
    Check,
    Default,
    Foreign,
    References,
    AutoIncrement,
    Constraint,
    Begin,
    Transaction,
    Commit,
    Rollback,
    Case,
    When,
    Then,
    Else,
    End,
    True,
    False,

    // Literals and names
    Identifier,
    IntegerLiteral,
    DecimalLiteral,
    /// Quoted string; `text` keeps the surrounding quote characters.
    StringLiteral,

    // Symbols
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    LeftParen,
    RightParen,
    Comma,
    Dot,
    Semicolon,

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Keyword lookup for an identifier-shaped lexeme, case-insensitive.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        let upper = word.to_ascii_uppercase();
        let kind = match upper.as_str() {
            "SELECT" => Self::Select,
            "DISTINCT" => Self::Distinct,
            "FROM" => Self::From,
            "WHERE" => Self::Where,
            "GROUP" => Self::Group,
            "BY" => Self::By,
            "HAVING" => Self::Having,
            "ORDER" => Self::Order,
            "ASC" => Self::Asc,
            "DESC" => Self::Desc,
            "LIMIT" => Self::Limit,
            "OFFSET" => Self::Offset,
            "INSERT" => Self::Insert,
            "INTO" => Self::Into,
            "VALUES" => Self::Values,
            "UPDATE" => Self::Update,
            "SET" => Self::Set,
            "DELETE" => Self::Delete,
            "CREATE" => Self::Create,
            "DROP" => Self::Drop,
            "ALTER" => Self::Alter,
            "TABLE" => Self::Table,
            "INDEX" => Self::Index,
            "DATABASE" => Self::Database,
            "IF" => Self::If,
            "EXISTS" => Self::Exists,
            "NOT" => Self::Not,
            "NULL" => Self::Null,
            "AND" => Self::And,
            "OR" => Self::Or,
            "LIKE" => Self::Like,
            "IS" => Self::Is,
            "AS" => Self::As,
            "ON" => Self::On,
            "JOIN" => Self::Join,
            "INNER" => Self::Inner,
            "LEFT" => Self::Left,
            "RIGHT" => Self::Right,
            "FULL" => Self::Full,
            "OUTER" => Self::Outer,
            "CROSS" => Self::Cross,
            "NATURAL" => Self::Natural,
            "PRIMARY" => Self::Primary,
            "KEY" => Self::Key,
            "UNIQUE" => Self::Unique,
            "CHECK" => Self::Check,
            "DEFAULT" => Self::Default,
            "FOREIGN" => Self::Foreign,
            "REFERENCES" => Self::References,
            "AUTO_INCREMENT" | "AUTOINCREMENT" => Self::AutoIncrement,
            "CONSTRAINT" => Self::Constraint,
            "BEGIN" => Self::Begin,
            "TRANSACTION" => Self::Transaction,
            "COMMIT" => Self::Commit,
            "ROLLBACK" => Self::Rollback,
            "CASE" => Self::Case,
            "WHEN" => Self::When,
            "THEN" => Self::Then,
            "ELSE" => Self::Else,
            "END" => Self::End,
            "TRUE" => Self::True,
            "FALSE" => Self::False,
            _ => return None,
        };
        Some(kind)
    }
}

/// A single lexed token with its source position (1-based line and column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Original source text of the token.
    pub text: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::Eof {
            f.write_str("end of input")
        } else {
            write!(f, "`{}`", self.text)
        }
    }
}
