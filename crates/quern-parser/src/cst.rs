//! The generic concrete parse tree.
//!
//! The parser emits rule-tagged interior nodes over token leaves, the same
//! shape a grammar-generated parser would hand to an AST builder. Operator
//! precedence and associativity are fully resolved before this tree is built:
//! a [`RuleKind::BinaryExpr`] node always has exactly `[left, operator-leaf,
//! right]` children, so the lowering builder never reasons about precedence.

use crate::token::{Token, TokenKind};

/// Grammar rule tags for interior parse tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Root: a batch of statements.
    Script,

    // Statement alternatives
    SelectStatement,
    InsertStatement,
    UpdateStatement,
    DeleteStatement,
    CreateTableStatement,
    /// DROP/ALTER TABLE, CREATE/DROP INDEX, CREATE/DROP DATABASE: recognized,
    /// kept as a raw token run for placeholder lowering.
    GenericDdlStatement,
    TransactionStatement,

    // Clause rules
    SelectElements,
    SelectElement,
    ColumnAlias,
    TableSource,
    TableName,
    TableAlias,
    JoinClause,
    OnCondition,
    WhereClause,
    GroupByItem,
    HavingClause,
    OrderByItem,
    LimitClause,
    OffsetClause,
    ColumnName,
    ValuesRow,
    ColumnDefinition,
    DataType,
    ColumnConstraint,
    TableConstraint,
    ConstraintName,
    ReferencedColumn,

    // Expression alternatives
    BinaryExpr,
    UnaryExpr,
    IsNullExpr,
    FunctionCall,
    CaseExpr,
    WhenClause,
    ElseClause,
    ParenExpr,
    Literal,
    ColumnReference,
    SubqueryExpr,
}

/// A node of the concrete parse tree: either a rule over children or a
/// single token leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    Rule {
        kind: RuleKind,
        children: Vec<ParseTree>,
    },
    Leaf(Token),
}

impl ParseTree {
    /// Construct a rule node.
    #[must_use]
    pub fn rule(kind: RuleKind, children: Vec<ParseTree>) -> Self {
        Self::Rule { kind, children }
    }

    /// Construct a token leaf.
    #[must_use]
    pub fn leaf(token: Token) -> Self {
        Self::Leaf(token)
    }

    /// The rule tag, if this is an interior node.
    #[must_use]
    pub fn kind(&self) -> Option<RuleKind> {
        match self {
            Self::Rule { kind, .. } => Some(*kind),
            Self::Leaf(_) => None,
        }
    }

    /// Direct children (empty for leaves).
    #[must_use]
    pub fn children(&self) -> &[ParseTree] {
        match self {
            Self::Rule { children, .. } => children,
            Self::Leaf(_) => &[],
        }
    }

    /// The token, if this is a leaf.
    #[must_use]
    pub fn token(&self) -> Option<&Token> {
        match self {
            Self::Rule { .. } => None,
            Self::Leaf(token) => Some(token),
        }
    }

    /// First direct child with the given rule tag.
    #[must_use]
    pub fn child(&self, kind: RuleKind) -> Option<&ParseTree> {
        self.children().iter().find(|c| c.kind() == Some(kind))
    }

    /// All direct children with the given rule tag, in order.
    pub fn children_of(&self, kind: RuleKind) -> impl Iterator<Item = &ParseTree> {
        self.children().iter().filter(move |c| c.kind() == Some(kind))
    }

    /// First direct leaf child with the given token kind.
    #[must_use]
    pub fn leaf_of(&self, kind: TokenKind) -> Option<&Token> {
        self.children()
            .iter()
            .filter_map(ParseTree::token)
            .find(|t| t.kind == kind)
    }

    /// Whether a direct leaf child with the given token kind exists.
    #[must_use]
    pub fn has_leaf(&self, kind: TokenKind) -> bool {
        self.leaf_of(kind).is_some()
    }

    /// All direct leaf tokens, in order.
    pub fn leaves(&self) -> impl Iterator<Item = &Token> {
        self.children().iter().filter_map(ParseTree::token)
    }

    /// The single token under a rule that wraps exactly one leaf
    /// (e.g. `TableName`, `ColumnName`, `ConstraintName`).
    #[must_use]
    pub fn sole_token(&self) -> Option<&Token> {
        match self.children() {
            [ParseTree::Leaf(token)] => Some(token),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str) -> Token {
        Token::new(TokenKind::Identifier, text, 1, 1)
    }

    #[test]
    fn child_lookup_by_rule_kind() {
        let tree = ParseTree::rule(
            RuleKind::TableSource,
            vec![
                ParseTree::rule(RuleKind::TableName, vec![ParseTree::leaf(ident("users"))]),
                ParseTree::rule(RuleKind::TableAlias, vec![ParseTree::leaf(ident("u"))]),
            ],
        );
        let name = tree.child(RuleKind::TableName).expect("table name");
        assert_eq!(name.sole_token().expect("token").text, "users");
        assert!(tree.child(RuleKind::JoinClause).is_none());
    }

    #[test]
    fn leaf_lookup_by_token_kind() {
        let tree = ParseTree::rule(
            RuleKind::SelectElements,
            vec![ParseTree::leaf(Token::new(TokenKind::Star, "*", 1, 8))],
        );
        assert!(tree.has_leaf(TokenKind::Star));
        assert!(!tree.has_leaf(TokenKind::Comma));
        assert_eq!(tree.leaves().count(), 1);
    }
}
