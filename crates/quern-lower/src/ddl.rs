//! DDL and transaction-control lowering.
//!
//! Only `CREATE TABLE` gets a fully shaped node. The remaining DDL heads
//! (DROP/ALTER TABLE, CREATE/DROP INDEX, CREATE/DROP DATABASE) are recognized
//! by the grammar but lowered to [`Statement::Placeholder`] carrying their
//! source text, so a dump of the batch still shows what was said.

use quern_ast::{
    ColumnConstraint, ColumnDef, CreateTableStatement, DataType, Statement, TableConstraint,
    TableConstraintKind, TypeSize,
};
use quern_error::{Error, Result};
use quern_parser::{ParseTree, RuleKind, Token, TokenKind};

use crate::dml::rule_name;
use crate::expr::{is_expr_rule, lower_expr};

/// Lower a `CreateTableStatement` rule.
///
/// # Errors
///
/// Returns [`Error::ForeignKeyColumnMismatch`] when a table-level FOREIGN KEY
/// lists differing local and referenced column counts, plus any expression
/// lowering error from DEFAULT and CHECK clauses.
pub fn lower_create_table(node: &ParseTree) -> Result<CreateTableStatement> {
    let name = rule_name(node, RuleKind::TableName, "CREATE TABLE")?;
    let columns = node
        .children_of(RuleKind::ColumnDefinition)
        .map(lower_column_def)
        .collect::<Result<Vec<_>>>()?;
    let constraints = node
        .children_of(RuleKind::TableConstraint)
        .map(lower_table_constraint)
        .collect::<Result<Vec<_>>>()?;
    Ok(CreateTableStatement {
        name,
        if_not_exists: node.has_leaf(TokenKind::If),
        columns,
        constraints,
    })
}

fn lower_column_def(node: &ParseTree) -> Result<ColumnDef> {
    let name = rule_name(node, RuleKind::ColumnName, "column definition")?;
    let data_type = node
        .child(RuleKind::DataType)
        .ok_or_else(|| {
            Error::UnsupportedConstruct(format!("column `{name}` without a data type"))
        })
        .and_then(lower_data_type)?;
    let constraints = node
        .children_of(RuleKind::ColumnConstraint)
        .map(lower_column_constraint)
        .collect::<Result<Vec<_>>>()?;
    Ok(ColumnDef {
        name,
        data_type,
        constraints,
    })
}

fn lower_data_type(node: &ParseTree) -> Result<DataType> {
    let name = node
        .leaf_of(TokenKind::Identifier)
        .ok_or_else(|| Error::UnsupportedConstruct("data type without a name".to_owned()))?
        .text
        .to_ascii_uppercase();
    let args: Vec<&Token> = node
        .leaves()
        .filter(|t| t.kind == TokenKind::IntegerLiteral)
        .collect();
    let size = match args.as_slice() {
        [] => TypeSize::None,
        [length] => TypeSize::Length(parse_u32(length)?),
        [precision, scale] => TypeSize::Precision {
            precision: parse_u32(precision)?,
            scale: parse_u32(scale)?,
        },
        _ => {
            return Err(Error::UnsupportedConstruct(format!(
                "data type `{name}` with more than two size arguments"
            )));
        }
    };
    Ok(DataType { name, size })
}

fn parse_u32(token: &Token) -> Result<u32> {
    token.text.parse::<u32>().map_err(|_| {
        Error::syntax(token.line, token.column, "type size out of range")
    })
}

fn lower_column_constraint(node: &ParseTree) -> Result<ColumnConstraint> {
    let head = node.leaves().next().map(|t| t.kind);
    let constraint = match head {
        Some(TokenKind::Not) => ColumnConstraint::NotNull,
        Some(TokenKind::Null) => ColumnConstraint::Null,
        Some(TokenKind::Primary) => ColumnConstraint::PrimaryKey,
        Some(TokenKind::Unique) => ColumnConstraint::Unique,
        Some(TokenKind::AutoIncrement) => ColumnConstraint::AutoIncrement,
        Some(TokenKind::Default) => {
            let value = node
                .children()
                .iter()
                .find(|c| c.kind().is_some_and(is_expr_rule))
                .ok_or_else(|| {
                    Error::UnsupportedConstruct("DEFAULT without a value".to_owned())
                })?;
            ColumnConstraint::Default(lower_expr(value)?)
        }
        Some(TokenKind::References) => {
            ColumnConstraint::ForeignKey(inline_reference_text(node)?)
        }
        _ => {
            return Err(Error::UnsupportedConstruct(
                "unrecognized column constraint".to_owned(),
            ));
        }
    };
    Ok(constraint)
}

/// Reassemble an inline `REFERENCES` clause as `table` or `table(c1, c2)`.
fn inline_reference_text(node: &ParseTree) -> Result<String> {
    let table = rule_name(node, RuleKind::TableName, "REFERENCES")?;
    let columns: Vec<String> = node
        .children_of(RuleKind::ReferencedColumn)
        .filter_map(ParseTree::sole_token)
        .map(|t| t.text.clone())
        .collect();
    if columns.is_empty() {
        Ok(table)
    } else {
        Ok(format!("{table}({})", columns.join(", ")))
    }
}

fn lower_table_constraint(node: &ParseTree) -> Result<TableConstraint> {
    let name = node
        .child(RuleKind::ConstraintName)
        .and_then(ParseTree::sole_token)
        .map(|t| t.text.clone());
    let columns = || -> Vec<String> {
        node.children_of(RuleKind::ColumnName)
            .filter_map(ParseTree::sole_token)
            .map(|t| t.text.clone())
            .collect()
    };
    let head = node.leaves().next().map(|t| t.kind);
    let kind = match head {
        Some(TokenKind::Primary) => TableConstraintKind::PrimaryKey { columns: columns() },
        Some(TokenKind::Unique) => TableConstraintKind::Unique { columns: columns() },
        Some(TokenKind::Foreign) => {
            let local = columns();
            let referenced_table = rule_name(node, RuleKind::TableName, "FOREIGN KEY")?;
            let referenced: Vec<String> = node
                .children_of(RuleKind::ReferencedColumn)
                .filter_map(ParseTree::sole_token)
                .map(|t| t.text.clone())
                .collect();
            if local.len() != referenced.len() {
                return Err(Error::ForeignKeyColumnMismatch {
                    local: local.len(),
                    referenced: referenced.len(),
                });
            }
            TableConstraintKind::ForeignKey {
                columns: local,
                referenced_table,
                referenced_columns: referenced,
            }
        }
        Some(TokenKind::Check) => {
            let predicate = node
                .children()
                .iter()
                .find(|c| c.kind().is_some_and(is_expr_rule))
                .ok_or_else(|| {
                    Error::UnsupportedConstruct("CHECK without a predicate".to_owned())
                })?;
            TableConstraintKind::Check(lower_expr(predicate)?)
        }
        _ => {
            return Err(Error::UnsupportedConstruct(
                "unrecognized table constraint".to_owned(),
            ));
        }
    };
    Ok(TableConstraint { name, kind })
}

/// Lower a recognized-but-unshaped DDL head to a placeholder carrying its
/// source text: the raw token texts joined with single spaces.
pub fn lower_generic_ddl(node: &ParseTree) -> Statement {
    let text = node
        .leaves()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Statement::Placeholder(text)
}

/// Lower a transaction-control marker.
pub fn lower_transaction(node: &ParseTree) -> Result<Statement> {
    match node.leaves().next().map(|t| t.kind) {
        Some(TokenKind::Begin) => Ok(Statement::BeginTransaction),
        Some(TokenKind::Commit) => Ok(Statement::Commit),
        Some(TokenKind::Rollback) => Ok(Statement::Rollback),
        _ => Err(Error::UnsupportedConstruct(
            "unrecognized transaction statement".to_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quern_ast::{Expr, Literal};
    use quern_parser::parse;

    fn parse_one(sql: &str) -> ParseTree {
        let script = parse(sql).expect("parse");
        script.children()[0].clone()
    }

    #[test]
    fn create_table_columns_in_declaration_order() {
        let create = lower_create_table(&parse_one(
            "CREATE TABLE t (id INT PRIMARY KEY AUTO_INCREMENT, \
             name VARCHAR(255) NOT NULL, price DECIMAL(10, 2) DEFAULT 0)",
        ))
        .expect("lower");
        assert_eq!(create.name, "t");
        assert!(!create.if_not_exists);
        let names: Vec<&str> = create.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "price"]);
        assert_eq!(create.columns[0].data_type.size, TypeSize::None);
        assert_eq!(create.columns[1].data_type.size, TypeSize::Length(255));
        assert_eq!(
            create.columns[2].data_type.size,
            TypeSize::Precision {
                precision: 10,
                scale: 2,
            }
        );
        assert_eq!(
            create.columns[0].constraints,
            vec![ColumnConstraint::PrimaryKey, ColumnConstraint::AutoIncrement]
        );
        assert_eq!(
            create.columns[2].constraints,
            vec![ColumnConstraint::Default(Expr::Literal(Literal::Integer(0)))]
        );
    }

    #[test]
    fn if_not_exists_flag() {
        let create =
            lower_create_table(&parse_one("CREATE TABLE IF NOT EXISTS t (id INT)"))
                .expect("lower");
        assert!(create.if_not_exists);
    }

    #[test]
    fn data_type_name_is_uppercased() {
        let create = lower_create_table(&parse_one("CREATE TABLE t (id int)")).expect("lower");
        assert_eq!(create.columns[0].data_type.name, "INT");
    }

    #[test]
    fn inline_references_keeps_raw_reference_text() {
        let create = lower_create_table(&parse_one(
            "CREATE TABLE t (owner INT REFERENCES users (id))",
        ))
        .expect("lower");
        assert_eq!(
            create.columns[0].constraints,
            vec![ColumnConstraint::ForeignKey("users(id)".to_owned())]
        );
    }

    #[test]
    fn named_table_constraint() {
        let create = lower_create_table(&parse_one(
            "CREATE TABLE t (a INT, b INT, CONSTRAINT pk PRIMARY KEY (a, b))",
        ))
        .expect("lower");
        assert_eq!(create.constraints.len(), 1);
        assert_eq!(create.constraints[0].name.as_deref(), Some("pk"));
        assert_eq!(
            create.constraints[0].kind,
            TableConstraintKind::PrimaryKey {
                columns: vec!["a".to_owned(), "b".to_owned()],
            }
        );
    }

    #[test]
    fn foreign_key_column_counts_must_agree() {
        let err = lower_create_table(&parse_one(
            "CREATE TABLE t (a INT, b INT, FOREIGN KEY (a, b) REFERENCES u (c))",
        ))
        .expect_err("mismatch");
        assert_eq!(
            err,
            Error::ForeignKeyColumnMismatch {
                local: 2,
                referenced: 1,
            }
        );
    }

    #[test]
    fn matching_foreign_key_lowers() {
        let create = lower_create_table(&parse_one(
            "CREATE TABLE t (a INT, b INT, FOREIGN KEY (a, b) REFERENCES u (c, d))",
        ))
        .expect("lower");
        assert_eq!(
            create.constraints[0].kind,
            TableConstraintKind::ForeignKey {
                columns: vec!["a".to_owned(), "b".to_owned()],
                referenced_table: "u".to_owned(),
                referenced_columns: vec!["c".to_owned(), "d".to_owned()],
            }
        );
    }

    #[test]
    fn column_constraints_keep_declaration_order() {
        let create = lower_create_table(&parse_one(
            "CREATE TABLE t (id INT PRIMARY KEY NOT NULL AUTO_INCREMENT)",
        ))
        .expect("lower");
        assert_eq!(
            create.columns[0].constraints,
            vec![
                ColumnConstraint::PrimaryKey,
                ColumnConstraint::NotNull,
                ColumnConstraint::AutoIncrement,
            ]
        );
    }

    #[test]
    fn check_constraint_carries_its_predicate() {
        let create = lower_create_table(&parse_one(
            "CREATE TABLE t (a INT, CHECK (a > 0))",
        ))
        .expect("lower");
        assert!(matches!(
            create.constraints[0].kind,
            TableConstraintKind::Check(Expr::BinaryOp { .. })
        ));
    }

    #[test]
    fn generic_ddl_placeholder_joins_tokens_with_spaces() {
        let stmt = lower_generic_ddl(&parse_one("DROP   TABLE\n  users"));
        assert_eq!(stmt, Statement::Placeholder("DROP TABLE users".to_owned()));
    }

    #[test]
    fn transaction_markers() {
        assert_eq!(
            lower_transaction(&parse_one("BEGIN TRANSACTION")).expect("lower"),
            Statement::BeginTransaction
        );
        assert_eq!(
            lower_transaction(&parse_one("COMMIT")).expect("lower"),
            Statement::Commit
        );
        assert_eq!(
            lower_transaction(&parse_one("ROLLBACK")).expect("lower"),
            Statement::Rollback
        );
    }
}
