//! Recursive descent SQL parser.
//!
//! Consumes the token stream from [`crate::lexer`] and produces the generic
//! [`ParseTree`]. Expression parsing uses precedence climbing, so the emitted
//! tree already encodes operator precedence and associativity; downstream
//! lowering never re-derives either.
//!
//! Grammar-only validation happens here: any malformed input fails fast with
//! a line/column-tagged [`Error::Syntax`] before lowering starts. The
//! recognized-only DDL heads (DROP/ALTER TABLE, CREATE/DROP INDEX,
//! CREATE/DROP DATABASE) are deliberately kept as raw token runs.

use quern_error::{Error, Result};
use tracing::debug;

use crate::cst::{ParseTree, RuleKind};
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Parse an SQL script into a concrete parse tree rooted at
/// [`RuleKind::Script`].
///
/// # Errors
///
/// Returns [`Error::Syntax`] on the first lexical or grammatical error.
pub fn parse(input: &str) -> Result<ParseTree> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let script = parser.parse_script()?;
    debug!(
        statements = script.children().len(),
        "parsed statement batch"
    );
    Ok(script)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token stream always ends with Eof, which is never consumed.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek_kind() == kind {
            Some(self.bump())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.peek_kind() == kind {
            Ok(self.bump())
        } else {
            Err(self.err_here(format!("expected {what}, found {}", self.peek())))
        }
    }

    fn err_here(&self, message: String) -> Error {
        let token = self.peek();
        Error::syntax(token.line, token.column, message)
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn parse_script(&mut self) -> Result<ParseTree> {
        let mut statements = Vec::new();
        while self.eat(TokenKind::Semicolon).is_some() {}
        while self.peek_kind() != TokenKind::Eof {
            statements.push(self.parse_statement()?);
            if self.peek_kind() != TokenKind::Eof {
                self.expect(TokenKind::Semicolon, "`;` between statements")?;
                while self.eat(TokenKind::Semicolon).is_some() {}
            }
        }
        Ok(ParseTree::rule(RuleKind::Script, statements))
    }

    fn parse_statement(&mut self) -> Result<ParseTree> {
        match self.peek_kind() {
            TokenKind::Select => self.parse_select_statement(),
            TokenKind::Insert => self.parse_insert(),
            TokenKind::Update => self.parse_update(),
            TokenKind::Delete => self.parse_delete(),
            TokenKind::Create => {
                if self.peek_kind_at(1) == TokenKind::Table {
                    self.parse_create_table()
                } else {
                    self.parse_generic_ddl()
                }
            }
            TokenKind::Drop | TokenKind::Alter => self.parse_generic_ddl(),
            TokenKind::Begin | TokenKind::Commit | TokenKind::Rollback => {
                self.parse_transaction()
            }
            _ => Err(self.err_here(format!("expected a statement, found {}", self.peek()))),
        }
    }

    /// A recognized-but-unlowered DDL head: swallow the raw token run up to
    /// the next statement separator.
    fn parse_generic_ddl(&mut self) -> Result<ParseTree> {
        let mut leaves = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::Semicolon | TokenKind::Eof) {
            leaves.push(ParseTree::leaf(self.bump()));
        }
        Ok(ParseTree::rule(RuleKind::GenericDdlStatement, leaves))
    }

    fn parse_transaction(&mut self) -> Result<ParseTree> {
        let mut leaves = vec![ParseTree::leaf(self.bump())];
        if leaves[0].token().map(|t| t.kind) == Some(TokenKind::Begin) {
            if let Some(txn) = self.eat(TokenKind::Transaction) {
                leaves.push(ParseTree::leaf(txn));
            }
        }
        Ok(ParseTree::rule(RuleKind::TransactionStatement, leaves))
    }

    // -----------------------------------------------------------------------
    // SELECT
    // -----------------------------------------------------------------------

    fn parse_select_statement(&mut self) -> Result<ParseTree> {
        self.expect(TokenKind::Select, "SELECT")?;
        let mut children = Vec::new();

        if let Some(distinct) = self.eat(TokenKind::Distinct) {
            children.push(ParseTree::leaf(distinct));
        }

        children.push(self.parse_select_elements()?);

        if self.eat(TokenKind::From).is_some() {
            children.push(self.parse_table_source()?);
            while self.eat(TokenKind::Comma).is_some() {
                children.push(self.parse_table_source()?);
            }
            while self.at_join_head() {
                children.push(self.parse_join_clause()?);
            }
        }

        if self.eat(TokenKind::Where).is_some() {
            let predicate = self.parse_expression()?;
            children.push(ParseTree::rule(RuleKind::WhereClause, vec![predicate]));
        }

        if self.eat(TokenKind::Group).is_some() {
            self.expect(TokenKind::By, "BY after GROUP")?;
            loop {
                let item = self.parse_expression()?;
                children.push(ParseTree::rule(RuleKind::GroupByItem, vec![item]));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        if self.eat(TokenKind::Having).is_some() {
            let predicate = self.parse_expression()?;
            children.push(ParseTree::rule(RuleKind::HavingClause, vec![predicate]));
        }

        if self.eat(TokenKind::Order).is_some() {
            self.expect(TokenKind::By, "BY after ORDER")?;
            loop {
                let mut item = vec![self.parse_expression()?];
                if let Some(direction) = self.eat(TokenKind::Asc) {
                    item.push(ParseTree::leaf(direction));
                } else if let Some(direction) = self.eat(TokenKind::Desc) {
                    item.push(ParseTree::leaf(direction));
                }
                children.push(ParseTree::rule(RuleKind::OrderByItem, item));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        if self.eat(TokenKind::Limit).is_some() {
            let count = self.expect(TokenKind::IntegerLiteral, "integer after LIMIT")?;
            children.push(ParseTree::rule(
                RuleKind::LimitClause,
                vec![ParseTree::leaf(count)],
            ));
        }

        if self.eat(TokenKind::Offset).is_some() {
            let count = self.expect(TokenKind::IntegerLiteral, "integer after OFFSET")?;
            children.push(ParseTree::rule(
                RuleKind::OffsetClause,
                vec![ParseTree::leaf(count)],
            ));
        }

        Ok(ParseTree::rule(RuleKind::SelectStatement, children))
    }

    fn parse_select_elements(&mut self) -> Result<ParseTree> {
        if let Some(star) = self.eat(TokenKind::Star) {
            return Ok(ParseTree::rule(
                RuleKind::SelectElements,
                vec![ParseTree::leaf(star)],
            ));
        }
        let mut elements = Vec::new();
        loop {
            let mut element = vec![self.parse_expression()?];
            if self.eat(TokenKind::As).is_some() {
                let alias = self.expect(TokenKind::Identifier, "alias after AS")?;
                element.push(ParseTree::rule(
                    RuleKind::ColumnAlias,
                    vec![ParseTree::leaf(alias)],
                ));
            } else if self.peek_kind() == TokenKind::Identifier {
                let alias = self.bump();
                element.push(ParseTree::rule(
                    RuleKind::ColumnAlias,
                    vec![ParseTree::leaf(alias)],
                ));
            }
            elements.push(ParseTree::rule(RuleKind::SelectElement, element));
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(ParseTree::rule(RuleKind::SelectElements, elements))
    }

    fn parse_table_source(&mut self) -> Result<ParseTree> {
        let mut children = Vec::new();
        if self.peek_kind() == TokenKind::LeftParen
            && self.peek_kind_at(1) == TokenKind::Select
        {
            self.bump();
            children.push(self.parse_select_statement()?);
            self.expect(TokenKind::RightParen, "`)` closing subquery")?;
        } else {
            let name = self.expect(TokenKind::Identifier, "table name")?;
            children.push(ParseTree::rule(
                RuleKind::TableName,
                vec![ParseTree::leaf(name)],
            ));
        }
        if self.eat(TokenKind::As).is_some() {
            let alias = self.expect(TokenKind::Identifier, "alias after AS")?;
            children.push(ParseTree::rule(
                RuleKind::TableAlias,
                vec![ParseTree::leaf(alias)],
            ));
        } else if self.peek_kind() == TokenKind::Identifier {
            let alias = self.bump();
            children.push(ParseTree::rule(
                RuleKind::TableAlias,
                vec![ParseTree::leaf(alias)],
            ));
        }
        Ok(ParseTree::rule(RuleKind::TableSource, children))
    }

    fn at_join_head(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Join
                | TokenKind::Inner
                | TokenKind::Left
                | TokenKind::Right
                | TokenKind::Full
                | TokenKind::Cross
                | TokenKind::Natural
        )
    }

    fn parse_join_clause(&mut self) -> Result<ParseTree> {
        let mut children = Vec::new();
        match self.peek_kind() {
            TokenKind::Inner | TokenKind::Cross | TokenKind::Natural => {
                children.push(ParseTree::leaf(self.bump()));
            }
            TokenKind::Left | TokenKind::Right | TokenKind::Full => {
                children.push(ParseTree::leaf(self.bump()));
                if let Some(outer) = self.eat(TokenKind::Outer) {
                    children.push(ParseTree::leaf(outer));
                }
            }
            _ => {}
        }
        children.push(ParseTree::leaf(self.expect(TokenKind::Join, "JOIN")?));
        children.push(self.parse_table_source()?);
        if self.eat(TokenKind::On).is_some() {
            let condition = self.parse_expression()?;
            children.push(ParseTree::rule(RuleKind::OnCondition, vec![condition]));
        }
        Ok(ParseTree::rule(RuleKind::JoinClause, children))
    }

    // -----------------------------------------------------------------------
    // INSERT / UPDATE / DELETE
    // -----------------------------------------------------------------------

    fn parse_insert(&mut self) -> Result<ParseTree> {
        self.expect(TokenKind::Insert, "INSERT")?;
        self.expect(TokenKind::Into, "INTO after INSERT")?;
        let name = self.expect(TokenKind::Identifier, "table name")?;
        let mut children = vec![ParseTree::rule(
            RuleKind::TableName,
            vec![ParseTree::leaf(name)],
        )];

        if self.eat(TokenKind::LeftParen).is_some() {
            loop {
                let column = self.expect(TokenKind::Identifier, "column name")?;
                children.push(ParseTree::rule(
                    RuleKind::ColumnName,
                    vec![ParseTree::leaf(column)],
                ));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightParen, "`)` closing column list")?;
        }

        self.expect(TokenKind::Values, "VALUES")?;
        loop {
            self.expect(TokenKind::LeftParen, "`(` opening value row")?;
            let mut row = Vec::new();
            loop {
                row.push(self.parse_expression()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::RightParen, "`)` closing value row")?;
            children.push(ParseTree::rule(RuleKind::ValuesRow, row));
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(ParseTree::rule(RuleKind::InsertStatement, children))
    }

    /// UPDATE keeps the grammar's flat shape: column names and value
    /// expressions as siblings, with the WHERE predicate (if any) as the
    /// last expression following a WHERE leaf.
    fn parse_update(&mut self) -> Result<ParseTree> {
        self.expect(TokenKind::Update, "UPDATE")?;
        let name = self.expect(TokenKind::Identifier, "table name")?;
        let mut children = vec![ParseTree::rule(
            RuleKind::TableName,
            vec![ParseTree::leaf(name)],
        )];
        self.expect(TokenKind::Set, "SET")?;
        loop {
            let column = self.expect(TokenKind::Identifier, "column name")?;
            children.push(ParseTree::rule(
                RuleKind::ColumnName,
                vec![ParseTree::leaf(column)],
            ));
            self.expect(TokenKind::Equal, "`=` in assignment")?;
            children.push(self.parse_expression()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        if let Some(where_token) = self.eat(TokenKind::Where) {
            children.push(ParseTree::leaf(where_token));
            children.push(self.parse_expression()?);
        }
        Ok(ParseTree::rule(RuleKind::UpdateStatement, children))
    }

    fn parse_delete(&mut self) -> Result<ParseTree> {
        self.expect(TokenKind::Delete, "DELETE")?;
        self.expect(TokenKind::From, "FROM after DELETE")?;
        let name = self.expect(TokenKind::Identifier, "table name")?;
        let mut children = vec![ParseTree::rule(
            RuleKind::TableName,
            vec![ParseTree::leaf(name)],
        )];
        if let Some(where_token) = self.eat(TokenKind::Where) {
            children.push(ParseTree::leaf(where_token));
            children.push(self.parse_expression()?);
        }
        Ok(ParseTree::rule(RuleKind::DeleteStatement, children))
    }

    // -----------------------------------------------------------------------
    // CREATE TABLE
    // -----------------------------------------------------------------------

    fn parse_create_table(&mut self) -> Result<ParseTree> {
        let mut children = Vec::new();
        self.expect(TokenKind::Create, "CREATE")?;
        self.expect(TokenKind::Table, "TABLE")?;
        if let Some(if_token) = self.eat(TokenKind::If) {
            children.push(ParseTree::leaf(if_token));
            children.push(ParseTree::leaf(
                self.expect(TokenKind::Not, "NOT after IF")?,
            ));
            children.push(ParseTree::leaf(
                self.expect(TokenKind::Exists, "EXISTS after IF NOT")?,
            ));
        }
        let name = self.expect(TokenKind::Identifier, "table name")?;
        children.push(ParseTree::rule(
            RuleKind::TableName,
            vec![ParseTree::leaf(name)],
        ));

        self.expect(TokenKind::LeftParen, "`(` opening table body")?;
        loop {
            let element = match self.peek_kind() {
                TokenKind::Constraint
                | TokenKind::Primary
                | TokenKind::Unique
                | TokenKind::Foreign
                | TokenKind::Check => self.parse_table_constraint()?,
                _ => self.parse_column_definition()?,
            };
            children.push(element);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightParen, "`)` closing table body")?;
        Ok(ParseTree::rule(RuleKind::CreateTableStatement, children))
    }

    fn parse_column_definition(&mut self) -> Result<ParseTree> {
        let name = self.expect(TokenKind::Identifier, "column name")?;
        let mut children = vec![ParseTree::rule(
            RuleKind::ColumnName,
            vec![ParseTree::leaf(name)],
        )];
        children.push(self.parse_data_type()?);
        loop {
            let constraint = match self.peek_kind() {
                TokenKind::Not => {
                    let not = self.bump();
                    let null = self.expect(TokenKind::Null, "NULL after NOT")?;
                    vec![ParseTree::leaf(not), ParseTree::leaf(null)]
                }
                TokenKind::Null
                | TokenKind::Unique
                | TokenKind::AutoIncrement => vec![ParseTree::leaf(self.bump())],
                TokenKind::Primary => {
                    let primary = self.bump();
                    let key = self.expect(TokenKind::Key, "KEY after PRIMARY")?;
                    vec![ParseTree::leaf(primary), ParseTree::leaf(key)]
                }
                TokenKind::Default => {
                    let default = self.bump();
                    let value = self.parse_expression()?;
                    vec![ParseTree::leaf(default), value]
                }
                TokenKind::References => {
                    let references = self.bump();
                    let mut parts = vec![ParseTree::leaf(references)];
                    let table = self.expect(TokenKind::Identifier, "referenced table")?;
                    parts.push(ParseTree::rule(
                        RuleKind::TableName,
                        vec![ParseTree::leaf(table)],
                    ));
                    if self.eat(TokenKind::LeftParen).is_some() {
                        loop {
                            let column =
                                self.expect(TokenKind::Identifier, "referenced column")?;
                            parts.push(ParseTree::rule(
                                RuleKind::ReferencedColumn,
                                vec![ParseTree::leaf(column)],
                            ));
                            if self.eat(TokenKind::Comma).is_none() {
                                break;
                            }
                        }
                        self.expect(TokenKind::RightParen, "`)` closing reference")?;
                    }
                    parts
                }
                _ => break,
            };
            children.push(ParseTree::rule(RuleKind::ColumnConstraint, constraint));
        }
        Ok(ParseTree::rule(RuleKind::ColumnDefinition, children))
    }

    fn parse_data_type(&mut self) -> Result<ParseTree> {
        let name = self.expect(TokenKind::Identifier, "data type")?;
        let mut children = vec![ParseTree::leaf(name)];
        if self.eat(TokenKind::LeftParen).is_some() {
            let first = self.expect(TokenKind::IntegerLiteral, "type length")?;
            children.push(ParseTree::leaf(first));
            if self.eat(TokenKind::Comma).is_some() {
                let second = self.expect(TokenKind::IntegerLiteral, "type scale")?;
                children.push(ParseTree::leaf(second));
            }
            self.expect(TokenKind::RightParen, "`)` closing type argument")?;
        }
        Ok(ParseTree::rule(RuleKind::DataType, children))
    }

    fn parse_table_constraint(&mut self) -> Result<ParseTree> {
        let mut children = Vec::new();
        if self.eat(TokenKind::Constraint).is_some() {
            let name = self.expect(TokenKind::Identifier, "constraint name")?;
            children.push(ParseTree::rule(
                RuleKind::ConstraintName,
                vec![ParseTree::leaf(name)],
            ));
        }
        match self.peek_kind() {
            TokenKind::Primary => {
                children.push(ParseTree::leaf(self.bump()));
                children.push(ParseTree::leaf(
                    self.expect(TokenKind::Key, "KEY after PRIMARY")?,
                ));
                self.parse_constraint_columns(RuleKind::ColumnName, &mut children)?;
            }
            TokenKind::Unique => {
                children.push(ParseTree::leaf(self.bump()));
                self.parse_constraint_columns(RuleKind::ColumnName, &mut children)?;
            }
            TokenKind::Foreign => {
                children.push(ParseTree::leaf(self.bump()));
                children.push(ParseTree::leaf(
                    self.expect(TokenKind::Key, "KEY after FOREIGN")?,
                ));
                self.parse_constraint_columns(RuleKind::ColumnName, &mut children)?;
                children.push(ParseTree::leaf(self.expect(
                    TokenKind::References,
                    "REFERENCES in FOREIGN KEY",
                )?));
                let table = self.expect(TokenKind::Identifier, "referenced table")?;
                children.push(ParseTree::rule(
                    RuleKind::TableName,
                    vec![ParseTree::leaf(table)],
                ));
                self.parse_constraint_columns(RuleKind::ReferencedColumn, &mut children)?;
            }
            TokenKind::Check => {
                children.push(ParseTree::leaf(self.bump()));
                self.expect(TokenKind::LeftParen, "`(` opening CHECK")?;
                children.push(self.parse_expression()?);
                self.expect(TokenKind::RightParen, "`)` closing CHECK")?;
            }
            _ => {
                return Err(
                    self.err_here(format!("expected a table constraint, found {}", self.peek()))
                );
            }
        }
        Ok(ParseTree::rule(RuleKind::TableConstraint, children))
    }

    fn parse_constraint_columns(
        &mut self,
        kind: RuleKind,
        children: &mut Vec<ParseTree>,
    ) -> Result<()> {
        self.expect(TokenKind::LeftParen, "`(` opening column list")?;
        loop {
            let column = self.expect(TokenKind::Identifier, "column name")?;
            children.push(ParseTree::rule(kind, vec![ParseTree::leaf(column)]));
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightParen, "`)` closing column list")?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Expressions (precedence climbing; lowest binds loosest)
    // -----------------------------------------------------------------------

    fn parse_expression(&mut self) -> Result<ParseTree> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<ParseTree> {
        let mut left = self.parse_and()?;
        while self.peek_kind() == TokenKind::Or {
            let op = self.bump();
            let right = self.parse_and()?;
            left = ParseTree::rule(
                RuleKind::BinaryExpr,
                vec![left, ParseTree::leaf(op), right],
            );
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<ParseTree> {
        let mut left = self.parse_not()?;
        while self.peek_kind() == TokenKind::And {
            let op = self.bump();
            let right = self.parse_not()?;
            left = ParseTree::rule(
                RuleKind::BinaryExpr,
                vec![left, ParseTree::leaf(op), right],
            );
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<ParseTree> {
        if self.peek_kind() == TokenKind::Not {
            let op = self.bump();
            let operand = self.parse_not()?;
            return Ok(ParseTree::rule(
                RuleKind::UnaryExpr,
                vec![ParseTree::leaf(op), operand],
            ));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<ParseTree> {
        let mut left = self.parse_additive()?;
        loop {
            match self.peek_kind() {
                TokenKind::Equal
                | TokenKind::NotEqual
                | TokenKind::LessThan
                | TokenKind::LessEqual
                | TokenKind::GreaterThan
                | TokenKind::GreaterEqual
                | TokenKind::Like => {
                    let op = self.bump();
                    let right = self.parse_additive()?;
                    left = ParseTree::rule(
                        RuleKind::BinaryExpr,
                        vec![left, ParseTree::leaf(op), right],
                    );
                }
                TokenKind::Is => {
                    let is = self.bump();
                    let mut leaves = vec![left, ParseTree::leaf(is)];
                    if let Some(not) = self.eat(TokenKind::Not) {
                        leaves.push(ParseTree::leaf(not));
                    }
                    leaves.push(ParseTree::leaf(
                        self.expect(TokenKind::Null, "NULL after IS")?,
                    ));
                    left = ParseTree::rule(RuleKind::IsNullExpr, leaves);
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_additive(&mut self) -> Result<ParseTree> {
        let mut left = self.parse_multiplicative()?;
        while matches!(self.peek_kind(), TokenKind::Plus | TokenKind::Minus) {
            let op = self.bump();
            let right = self.parse_multiplicative()?;
            left = ParseTree::rule(
                RuleKind::BinaryExpr,
                vec![left, ParseTree::leaf(op), right],
            );
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<ParseTree> {
        let mut left = self.parse_unary()?;
        while matches!(
            self.peek_kind(),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent
        ) {
            let op = self.bump();
            let right = self.parse_unary()?;
            left = ParseTree::rule(
                RuleKind::BinaryExpr,
                vec![left, ParseTree::leaf(op), right],
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<ParseTree> {
        if self.peek_kind() == TokenKind::Minus {
            let op = self.bump();
            let operand = self.parse_unary()?;
            return Ok(ParseTree::rule(
                RuleKind::UnaryExpr,
                vec![ParseTree::leaf(op), operand],
            ));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ParseTree> {
        match self.peek_kind() {
            TokenKind::IntegerLiteral
            | TokenKind::DecimalLiteral
            | TokenKind::StringLiteral
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => Ok(ParseTree::rule(
                RuleKind::Literal,
                vec![ParseTree::leaf(self.bump())],
            )),
            TokenKind::Case => self.parse_case(),
            TokenKind::LeftParen => {
                if self.peek_kind_at(1) == TokenKind::Select {
                    self.bump();
                    let select = self.parse_select_statement()?;
                    self.expect(TokenKind::RightParen, "`)` closing subquery")?;
                    return Ok(ParseTree::rule(RuleKind::SubqueryExpr, vec![select]));
                }
                self.bump();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "`)` closing expression")?;
                Ok(ParseTree::rule(RuleKind::ParenExpr, vec![inner]))
            }
            TokenKind::Identifier => {
                if self.peek_kind_at(1) == TokenKind::LeftParen {
                    return self.parse_function_call();
                }
                let first = self.bump();
                if let Some(dot) = self.eat(TokenKind::Dot) {
                    let column = self.expect(TokenKind::Identifier, "column after `.`")?;
                    return Ok(ParseTree::rule(
                        RuleKind::ColumnReference,
                        vec![
                            ParseTree::leaf(first),
                            ParseTree::leaf(dot),
                            ParseTree::leaf(column),
                        ],
                    ));
                }
                Ok(ParseTree::rule(
                    RuleKind::ColumnReference,
                    vec![ParseTree::leaf(first)],
                ))
            }
            _ => Err(self.err_here(format!("expected an expression, found {}", self.peek()))),
        }
    }

    fn parse_function_call(&mut self) -> Result<ParseTree> {
        let name = self.bump();
        let mut children = vec![ParseTree::leaf(name)];
        self.expect(TokenKind::LeftParen, "`(` opening argument list")?;
        if let Some(star) = self.eat(TokenKind::Star) {
            children.push(ParseTree::leaf(star));
        } else if self.peek_kind() != TokenKind::RightParen {
            if let Some(distinct) = self.eat(TokenKind::Distinct) {
                children.push(ParseTree::leaf(distinct));
            }
            loop {
                children.push(self.parse_expression()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, "`)` closing argument list")?;
        Ok(ParseTree::rule(RuleKind::FunctionCall, children))
    }

    fn parse_case(&mut self) -> Result<ParseTree> {
        self.expect(TokenKind::Case, "CASE")?;
        let mut children = Vec::new();
        if self.peek_kind() != TokenKind::When {
            children.push(self.parse_expression()?);
        }
        while self.eat(TokenKind::When).is_some() {
            let condition = self.parse_expression()?;
            self.expect(TokenKind::Then, "THEN after WHEN condition")?;
            let result = self.parse_expression()?;
            children.push(ParseTree::rule(
                RuleKind::WhenClause,
                vec![condition, result],
            ));
        }
        if children.iter().all(|c| c.kind() != Some(RuleKind::WhenClause)) {
            return Err(self.err_here("CASE requires at least one WHEN arm".to_owned()));
        }
        if self.eat(TokenKind::Else).is_some() {
            let fallback = self.parse_expression()?;
            children.push(ParseTree::rule(RuleKind::ElseClause, vec![fallback]));
        }
        self.expect(TokenKind::End, "END closing CASE")?;
        Ok(ParseTree::rule(RuleKind::CaseExpr, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(sql: &str) -> ParseTree {
        let script = parse(sql).expect("parse");
        assert_eq!(script.children().len(), 1, "expected one statement");
        script.children()[0].clone()
    }

    #[test]
    fn script_splits_statements_on_semicolons() {
        let script = parse("SELECT 1; SELECT 2;; SELECT 3").expect("parse");
        assert_eq!(script.kind(), Some(RuleKind::Script));
        assert_eq!(script.children().len(), 3);
    }

    #[test]
    fn empty_script_parses_to_zero_statements() {
        let script = parse("  ;; -- nothing here\n").expect("parse");
        assert_eq!(script.children().len(), 0);
    }

    #[test]
    fn select_star_elements_hold_a_star_leaf() {
        let select = parse_one("SELECT * FROM t");
        assert_eq!(select.kind(), Some(RuleKind::SelectStatement));
        let elements = select.child(RuleKind::SelectElements).expect("elements");
        assert!(elements.has_leaf(TokenKind::Star));
    }

    #[test]
    fn binary_expr_encodes_precedence() {
        // 1 + 2 * 3 must parse as 1 + (2 * 3).
        let select = parse_one("SELECT 1 + 2 * 3");
        let elements = select.child(RuleKind::SelectElements).expect("elements");
        let element = elements.children()[0].clone();
        let expr = &element.children()[0];
        assert_eq!(expr.kind(), Some(RuleKind::BinaryExpr));
        let op = expr.children()[1].token().expect("operator leaf");
        assert_eq!(op.kind, TokenKind::Plus);
        let right = &expr.children()[2];
        assert_eq!(right.kind(), Some(RuleKind::BinaryExpr));
        assert_eq!(
            right.children()[1].token().expect("operator").kind,
            TokenKind::Star
        );
    }

    #[test]
    fn comparison_is_left_associative() {
        let select = parse_one("SELECT a = b");
        let elements = select.child(RuleKind::SelectElements).expect("elements");
        let expr = &elements.children()[0].children()[0];
        assert_eq!(expr.kind(), Some(RuleKind::BinaryExpr));
    }

    #[test]
    fn join_clauses_are_collected() {
        let select =
            parse_one("SELECT * FROM a INNER JOIN b ON a.x = b.y LEFT OUTER JOIN c ON a.x = c.z");
        let joins: Vec<_> = select.children_of(RuleKind::JoinClause).collect();
        assert_eq!(joins.len(), 2);
        assert!(joins[0].has_leaf(TokenKind::Inner));
        assert!(joins[1].has_leaf(TokenKind::Left));
        assert!(joins[1].has_leaf(TokenKind::Outer));
        assert!(joins[0].child(RuleKind::OnCondition).is_some());
    }

    #[test]
    fn update_keeps_flat_assignment_shape() {
        let update = parse_one("UPDATE t SET a = 1, b = 2 WHERE c = 3");
        let columns = update.children_of(RuleKind::ColumnName).count();
        assert_eq!(columns, 2);
        assert!(update.has_leaf(TokenKind::Where));
        // Three flat expressions: two assignment values plus the predicate.
        let exprs = update
            .children()
            .iter()
            .filter(|c| {
                matches!(
                    c.kind(),
                    Some(RuleKind::Literal | RuleKind::BinaryExpr | RuleKind::ParenExpr)
                )
            })
            .count();
        assert_eq!(exprs, 3);
    }

    #[test]
    fn create_table_collects_columns_and_constraints() {
        let create = parse_one(
            "CREATE TABLE t (id INT PRIMARY KEY NOT NULL, name VARCHAR(10), \
             CONSTRAINT pk PRIMARY KEY (id), FOREIGN KEY (a, b) REFERENCES u (c, d))",
        );
        assert_eq!(create.kind(), Some(RuleKind::CreateTableStatement));
        assert_eq!(create.children_of(RuleKind::ColumnDefinition).count(), 2);
        assert_eq!(create.children_of(RuleKind::TableConstraint).count(), 2);
    }

    #[test]
    fn generic_ddl_keeps_raw_tokens() {
        let drop = parse_one("DROP TABLE users");
        assert_eq!(drop.kind(), Some(RuleKind::GenericDdlStatement));
        let texts: Vec<_> = drop.leaves().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["DROP", "TABLE", "users"]);
    }

    #[test]
    fn create_index_is_generic_ddl() {
        let stmt = parse_one("CREATE INDEX idx ON t (a)");
        assert_eq!(stmt.kind(), Some(RuleKind::GenericDdlStatement));
    }

    #[test]
    fn transaction_statements_parse_to_marker_rules() {
        for sql in ["BEGIN", "BEGIN TRANSACTION", "COMMIT", "ROLLBACK"] {
            let stmt = parse_one(sql);
            assert_eq!(
                stmt.kind(),
                Some(RuleKind::TransactionStatement),
                "statement: {sql}"
            );
        }
    }

    #[test]
    fn case_expression_arms_in_order() {
        let select = parse_one("SELECT CASE x WHEN 1 THEN 'a' WHEN 2 THEN 'b' ELSE 'c' END");
        let elements = select.child(RuleKind::SelectElements).expect("elements");
        let case = &elements.children()[0].children()[0];
        assert_eq!(case.kind(), Some(RuleKind::CaseExpr));
        assert_eq!(case.children_of(RuleKind::WhenClause).count(), 2);
        assert!(case.child(RuleKind::ElseClause).is_some());
        // Subject expression precedes the arms.
        assert_eq!(case.children()[0].kind(), Some(RuleKind::ColumnReference));
    }

    #[test]
    fn syntax_error_carries_token_position() {
        let err = parse("SELECT a\nFROM").expect_err("must fail");
        match err {
            quern_error::Error::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn scalar_subquery_parses_in_expression_position() {
        let select = parse_one("SELECT (SELECT 1) FROM t");
        let elements = select.child(RuleKind::SelectElements).expect("elements");
        let expr = &elements.children()[0].children()[0];
        assert_eq!(expr.kind(), Some(RuleKind::SubqueryExpr));
    }
}
