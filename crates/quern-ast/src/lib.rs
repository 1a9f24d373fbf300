//! SQL abstract syntax tree node types.
//!
//! The statement is the root of the tree. Trees are built in a single pass by
//! the lowering builder in `quern-lower`, are immutable once constructed, and
//! are strictly owned top-down: no node is shared between two parents and
//! subqueries are owned by the node that embeds them.
//!
//! The variant set is closed. Operations over the tree are written as
//! exhaustive `match`es (see [`render`]) rather than a visitor hierarchy, so
//! adding a new read-only pass never touches these type definitions.

use std::fmt;

pub mod render;

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A top-level SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTableStatement),
    DropTable(DropTableStatement),
    AlterTable(AlterTableStatement),
    CreateIndex(CreateIndexStatement),
    DropIndex(DropIndexStatement),
    CreateDatabase(CreateDatabaseStatement),
    DropDatabase(DropDatabaseStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Select(SelectStatement),
    /// `BEGIN [TRANSACTION]` — recognized as a no-op marker.
    BeginTransaction,
    /// `COMMIT` — recognized as a no-op marker.
    Commit,
    /// `ROLLBACK` — recognized as a no-op marker.
    Rollback,
    /// Wrapper for a script containing two or more top-level statements,
    /// in source order. A single-statement script is never wrapped.
    StatementList(Vec<Statement>),
    /// Stand-in for a statement kind whose lowering is not yet implemented.
    /// Carries the original source text for diagnostics.
    Placeholder(String),
}

/// Discriminant tag of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    CreateTable,
    DropTable,
    AlterTable,
    CreateIndex,
    DropIndex,
    CreateDatabase,
    DropDatabase,
    Insert,
    Update,
    Delete,
    Select,
    BeginTransaction,
    Commit,
    Rollback,
    StatementList,
    Placeholder,
}

impl Statement {
    /// The tag of this statement node.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        match self {
            Self::CreateTable(_) => StatementKind::CreateTable,
            Self::DropTable(_) => StatementKind::DropTable,
            Self::AlterTable(_) => StatementKind::AlterTable,
            Self::CreateIndex(_) => StatementKind::CreateIndex,
            Self::DropIndex(_) => StatementKind::DropIndex,
            Self::CreateDatabase(_) => StatementKind::CreateDatabase,
            Self::DropDatabase(_) => StatementKind::DropDatabase,
            Self::Insert(_) => StatementKind::Insert,
            Self::Update(_) => StatementKind::Update,
            Self::Delete(_) => StatementKind::Delete,
            Self::Select(_) => StatementKind::Select,
            Self::BeginTransaction => StatementKind::BeginTransaction,
            Self::Commit => StatementKind::Commit,
            Self::Rollback => StatementKind::Rollback,
            Self::StatementList(_) => StatementKind::StatementList,
            Self::Placeholder(_) => StatementKind::Placeholder,
        }
    }
}

// ---------------------------------------------------------------------------
// SELECT
// ---------------------------------------------------------------------------

/// A `SELECT` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub distinct: bool,
    /// Ordered projection list. A bare `*` is a single element whose
    /// expression is the wildcard column reference.
    pub elements: Vec<SelectElement>,
    /// Ordered `FROM` sources.
    pub from: Vec<TableSource>,
    /// Ordered `JOIN` clauses, in source order.
    pub joins: Vec<JoinClause>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByElement>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// One projection in a SELECT list: an expression plus an optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectElement {
    pub expr: Expr,
    pub alias: Option<String>,
}

/// A `FROM` or `JOIN` source: a named table or a derived (subquery) table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table {
        name: String,
        alias: Option<String>,
    },
    Subquery {
        query: Box<SelectStatement>,
        alias: Option<String>,
    },
}

/// The flavour of a `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Natural,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Cross => "CROSS",
            Self::Natural => "NATURAL",
        })
    }
}

/// One `JOIN` clause: type, joined source, and optional `ON` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub source: TableSource,
    pub on: Option<Expr>,
}

/// One `ORDER BY` term. `ascending` defaults to true unless `DESC` appears.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByElement {
    pub expr: Expr,
    pub ascending: bool,
}

// ---------------------------------------------------------------------------
// DML
// ---------------------------------------------------------------------------

/// An `INSERT` statement. Value rows are positionally aligned with the
/// optional explicit column list; no arity cross-check happens at this layer.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub rows: Vec<Vec<Expr>>,
}

/// An `UPDATE` statement. Assignments preserve declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: String,
    pub assignments: Vec<(String, Expr)>,
    pub where_clause: Option<Expr>,
}

/// A `DELETE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub where_clause: Option<Expr>,
}

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

/// A `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub name: String,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
}

/// A column definition inside `CREATE TABLE`: name, data type, and the
/// constraint list in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

/// A SQL data type. The size argument is either a single length or a
/// precision/scale pair — never both, by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    pub name: String,
    pub size: TypeSize,
}

/// The parenthesized size argument of a [`DataType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSize {
    /// No argument, e.g. `INT`.
    None,
    /// A single length, e.g. `VARCHAR(255)`.
    Length(u32),
    /// A precision/scale pair, e.g. `DECIMAL(10, 2)`.
    Precision { precision: u32, scale: u32 },
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.size {
            TypeSize::None => write!(f, "{}", self.name),
            TypeSize::Length(len) => write!(f, "{}({len})", self.name),
            TypeSize::Precision { precision, scale } => {
                write!(f, "{}({precision}, {scale})", self.name)
            }
        }
    }
}

/// A constraint attached to a single column definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    NotNull,
    Null,
    PrimaryKey,
    Unique,
    AutoIncrement,
    Default(Expr),
    /// Inline `REFERENCES` clause, kept as the raw reference string
    /// (e.g. `other(id)`).
    ForeignKey(String),
}

/// A table-level constraint inside `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraint {
    /// Optional `CONSTRAINT <name>` prefix.
    pub name: Option<String>,
    pub kind: TableConstraintKind,
}

/// The body of a [`TableConstraint`].
#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraintKind {
    PrimaryKey {
        columns: Vec<String>,
    },
    Unique {
        columns: Vec<String>,
    },
    ForeignKey {
        columns: Vec<String>,
        referenced_table: String,
        referenced_columns: Vec<String>,
    },
    Check(Expr),
}

/// A `DROP TABLE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    pub names: Vec<String>,
    pub if_exists: bool,
}

/// An `ALTER TABLE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    pub table: String,
    pub actions: Vec<AlterAction>,
}

/// One action inside `ALTER TABLE`.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    AddColumn(ColumnDef),
    DropColumn(String),
    ModifyColumn(ColumnDef),
    AddConstraint(TableConstraint),
    DropConstraint(String),
}

/// A `CREATE INDEX` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// A `DROP INDEX` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStatement {
    pub name: String,
    pub table: Option<String>,
}

/// A `CREATE DATABASE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDatabaseStatement {
    pub name: String,
    pub if_not_exists: bool,
}

/// A `DROP DATABASE` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DropDatabaseStatement {
    pub name: String,
    pub if_exists: bool,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Column(ColumnRef),
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expr>,
        distinct: bool,
    },
    Case {
        /// Optional subject of a simple `CASE <expr> WHEN ...`.
        operand: Option<Box<Expr>>,
        /// Ordered `(condition, result)` arms.
        whens: Vec<(Expr, Expr)>,
        else_expr: Option<Box<Expr>>,
    },
    /// A scalar `(SELECT ...)` subquery, owned by this node.
    Subquery(Box<SelectStatement>),
}

/// Discriminant tag of an [`Expr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Literal,
    Column,
    BinaryOp,
    UnaryOp,
    FunctionCall,
    Case,
    Subquery,
}

impl Expr {
    /// The tag of this expression node.
    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        match self {
            Self::Literal(_) => ExprKind::Literal,
            Self::Column(_) => ExprKind::Column,
            Self::BinaryOp { .. } => ExprKind::BinaryOp,
            Self::UnaryOp { .. } => ExprKind::UnaryOp,
            Self::FunctionCall { .. } => ExprKind::FunctionCall,
            Self::Case { .. } => ExprKind::Case,
            Self::Subquery(_) => ExprKind::Subquery,
        }
    }
}

/// A column reference with an optional table qualifier. The projection
/// wildcard `*` is represented as an unqualified reference to `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    /// An unqualified reference.
    #[must_use]
    pub fn bare(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    /// The projection wildcard `*`.
    #[must_use]
    pub fn wildcard() -> Self {
        Self::bare("*")
    }

    /// Whether this reference is the projection wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.table.is_none() && self.column == "*"
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{table}.{}", self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// A typed literal value. The value and its type tag are carried together,
/// so a literal can never disagree with its tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Decimal(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// Type tag of a [`Literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Decimal,
    String,
    Boolean,
    Null,
}

impl Literal {
    /// The type tag of this literal.
    #[must_use]
    pub const fn kind(&self) -> LiteralKind {
        match self {
            Self::Integer(_) => LiteralKind::Integer,
            Self::Decimal(_) => LiteralKind::Decimal,
            Self::String(_) => LiteralKind::String,
            Self::Boolean(_) => LiteralKind::Boolean,
            Self::Null => LiteralKind::Null,
        }
    }
}

/// A binary operator, resolved from its source lexeme during lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
    And,
    Or,
    Like,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::LessThan => "<",
            Self::LessEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterEqual => ">=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Like => "LIKE",
        })
    }
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
    IsNull,
    IsNotNull,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Not => "NOT",
            Self::Negate => "-",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_kind_matches_variant() {
        assert_eq!(Statement::Commit.kind(), StatementKind::Commit);
        assert_eq!(
            Statement::Placeholder("DROP TABLE t".to_owned()).kind(),
            StatementKind::Placeholder
        );
        let list = Statement::StatementList(vec![Statement::BeginTransaction, Statement::Commit]);
        assert_eq!(list.kind(), StatementKind::StatementList);
    }

    #[test]
    fn literal_kind_matches_variant() {
        assert_eq!(Literal::Integer(7).kind(), LiteralKind::Integer);
        assert_eq!(Literal::Decimal(1.5).kind(), LiteralKind::Decimal);
        assert_eq!(Literal::String("x".to_owned()).kind(), LiteralKind::String);
        assert_eq!(Literal::Boolean(true).kind(), LiteralKind::Boolean);
        assert_eq!(Literal::Null.kind(), LiteralKind::Null);
    }

    #[test]
    fn wildcard_column_ref() {
        let star = ColumnRef::wildcard();
        assert!(star.is_wildcard());
        assert_eq!(star.to_string(), "*");

        let qualified = ColumnRef {
            table: Some("t".to_owned()),
            column: "*".to_owned(),
        };
        assert!(!qualified.is_wildcard());
        assert_eq!(qualified.to_string(), "t.*");
    }

    #[test]
    fn data_type_display_forms() {
        let plain = DataType {
            name: "INT".to_owned(),
            size: TypeSize::None,
        };
        assert_eq!(plain.to_string(), "INT");

        let sized = DataType {
            name: "VARCHAR".to_owned(),
            size: TypeSize::Length(255),
        };
        assert_eq!(sized.to_string(), "VARCHAR(255)");

        let decimal = DataType {
            name: "DECIMAL".to_owned(),
            size: TypeSize::Precision {
                precision: 10,
                scale: 2,
            },
        };
        assert_eq!(decimal.to_string(), "DECIMAL(10, 2)");
    }

    #[test]
    fn operator_display_is_canonical_lexeme() {
        assert_eq!(BinaryOp::NotEqual.to_string(), "<>");
        assert_eq!(BinaryOp::And.to_string(), "AND");
        assert_eq!(UnaryOp::IsNotNull.to_string(), "IS NOT NULL");
    }
}
