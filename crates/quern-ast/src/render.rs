//! Deterministic text dump of an AST, for debugging and test assertions.
//!
//! The traversal is stateless and read-only. Child enumeration order per node
//! kind is a fixed contract: for SELECT, projection elements, then FROM
//! sources, then joins, then WHERE, HAVING, GROUP BY and ORDER BY, then the
//! LIMIT/OFFSET scalars; for binary operations, left before right. Tests
//! compare rendered output verbatim, so any reordering is a breaking change.

use crate::{
    AlterAction, ColumnConstraint, ColumnDef, Expr, JoinClause, Literal, SelectStatement,
    Statement, TableConstraint, TableConstraintKind, TableSource,
};

/// Render a statement tree as an indented text dump.
///
/// Each line is two spaces per depth level followed by a node label; the
/// result ends with a trailing newline.
#[must_use]
pub fn render(stmt: &Statement) -> String {
    let mut out = String::new();
    render_statement(stmt, 0, &mut out);
    out
}

/// Render a single expression subtree. Same format as [`render`].
#[must_use]
pub fn render_expr(expr: &Expr) -> String {
    let mut out = String::new();
    render_expression(expr, 0, &mut out);
    out
}

fn line(depth: usize, label: &str, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(label);
    out.push('\n');
}

fn render_statement(stmt: &Statement, depth: usize, out: &mut String) {
    match stmt {
        Statement::Select(select) => render_select(select, depth, out),
        Statement::Insert(insert) => {
            line(depth, &format!("INSERT INTO {}", insert.table), out);
            if let Some(columns) = &insert.columns {
                line(depth + 1, &format!("[COLUMNS {}]", columns.join(", ")), out);
            }
            for row in &insert.rows {
                line(depth + 1, "[ROW]", out);
                for value in row {
                    render_expression(value, depth + 2, out);
                }
            }
        }
        Statement::Update(update) => {
            line(depth, &format!("UPDATE {}", update.table), out);
            line(depth + 1, "[SET]", out);
            for (column, value) in &update.assignments {
                line(depth + 2, &format!("Assign({column})"), out);
                render_expression(value, depth + 3, out);
            }
            if let Some(predicate) = &update.where_clause {
                line(depth + 1, "[WHERE]", out);
                render_expression(predicate, depth + 2, out);
            }
        }
        Statement::Delete(delete) => {
            line(depth, &format!("DELETE FROM {}", delete.table), out);
            if let Some(predicate) = &delete.where_clause {
                line(depth + 1, "[WHERE]", out);
                render_expression(predicate, depth + 2, out);
            }
        }
        Statement::CreateTable(create) => {
            let label = if create.if_not_exists {
                format!("CREATE TABLE IF NOT EXISTS {}", create.name)
            } else {
                format!("CREATE TABLE {}", create.name)
            };
            line(depth, &label, out);
            for column in &create.columns {
                render_column_def(column, depth + 1, out);
            }
            for constraint in &create.constraints {
                render_table_constraint(constraint, depth + 1, out);
            }
        }
        Statement::DropTable(drop) => {
            let label = if drop.if_exists {
                format!("DROP TABLE IF EXISTS {}", drop.names.join(", "))
            } else {
                format!("DROP TABLE {}", drop.names.join(", "))
            };
            line(depth, &label, out);
        }
        Statement::AlterTable(alter) => {
            line(depth, &format!("ALTER TABLE {}", alter.table), out);
            for action in &alter.actions {
                render_alter_action(action, depth + 1, out);
            }
        }
        Statement::CreateIndex(index) => {
            let unique = if index.unique { "UNIQUE " } else { "" };
            line(
                depth,
                &format!(
                    "CREATE {unique}INDEX {} ON {} ({})",
                    index.name,
                    index.table,
                    index.columns.join(", ")
                ),
                out,
            );
        }
        Statement::DropIndex(index) => match &index.table {
            Some(table) => line(depth, &format!("DROP INDEX {} ON {table}", index.name), out),
            None => line(depth, &format!("DROP INDEX {}", index.name), out),
        },
        Statement::CreateDatabase(db) => {
            let label = if db.if_not_exists {
                format!("CREATE DATABASE IF NOT EXISTS {}", db.name)
            } else {
                format!("CREATE DATABASE {}", db.name)
            };
            line(depth, &label, out);
        }
        Statement::DropDatabase(db) => {
            let label = if db.if_exists {
                format!("DROP DATABASE IF EXISTS {}", db.name)
            } else {
                format!("DROP DATABASE {}", db.name)
            };
            line(depth, &label, out);
        }
        Statement::BeginTransaction => line(depth, "BEGIN TRANSACTION", out),
        Statement::Commit => line(depth, "COMMIT", out),
        Statement::Rollback => line(depth, "ROLLBACK", out),
        Statement::StatementList(statements) => {
            line(depth, "STATEMENT LIST", out);
            for statement in statements {
                render_statement(statement, depth + 1, out);
            }
        }
        Statement::Placeholder(text) => line(depth, &format!("Placeholder({text})"), out),
    }
}

fn render_select(select: &SelectStatement, depth: usize, out: &mut String) {
    let head = if select.distinct {
        "SELECT DISTINCT"
    } else {
        "SELECT"
    };
    line(depth, head, out);

    line(depth + 1, "[ELEMENTS]", out);
    for element in &select.elements {
        match &element.alias {
            Some(alias) => {
                line(depth + 2, &format!("As({alias})"), out);
                render_expression(&element.expr, depth + 3, out);
            }
            None => render_expression(&element.expr, depth + 2, out),
        }
    }

    if !select.from.is_empty() {
        line(depth + 1, "[FROM]", out);
        for source in &select.from {
            render_table_source(source, depth + 2, out);
        }
    }

    if !select.joins.is_empty() {
        line(depth + 1, "[JOINS]", out);
        for join in &select.joins {
            render_join(join, depth + 2, out);
        }
    }

    if let Some(predicate) = &select.where_clause {
        line(depth + 1, "[WHERE]", out);
        render_expression(predicate, depth + 2, out);
    }

    if let Some(predicate) = &select.having {
        line(depth + 1, "[HAVING]", out);
        render_expression(predicate, depth + 2, out);
    }

    if !select.group_by.is_empty() {
        line(depth + 1, "[GROUP BY]", out);
        for expr in &select.group_by {
            render_expression(expr, depth + 2, out);
        }
    }

    if !select.order_by.is_empty() {
        line(depth + 1, "[ORDER BY]", out);
        for term in &select.order_by {
            let direction = if term.ascending { "ASC" } else { "DESC" };
            line(depth + 2, &format!("OrderBy({direction})"), out);
            render_expression(&term.expr, depth + 3, out);
        }
    }

    if let Some(limit) = select.limit {
        line(depth + 1, &format!("[LIMIT {limit}]"), out);
    }
    if let Some(offset) = select.offset {
        line(depth + 1, &format!("[OFFSET {offset}]"), out);
    }
}

fn render_table_source(source: &TableSource, depth: usize, out: &mut String) {
    match source {
        TableSource::Table { name, alias } => match alias {
            Some(alias) => line(depth, &format!("Table({name} AS {alias})"), out),
            None => line(depth, &format!("Table({name})"), out),
        },
        TableSource::Subquery { query, alias } => {
            match alias {
                Some(alias) => line(depth, &format!("Subquery(AS {alias})"), out),
                None => line(depth, "Subquery", out),
            }
            render_select(query, depth + 1, out);
        }
    }
}

fn render_join(join: &JoinClause, depth: usize, out: &mut String) {
    line(depth, &format!("Join({})", join.join_type), out);
    render_table_source(&join.source, depth + 1, out);
    if let Some(condition) = &join.on {
        line(depth + 1, "[ON]", out);
        render_expression(condition, depth + 2, out);
    }
}

fn render_column_def(column: &ColumnDef, depth: usize, out: &mut String) {
    line(
        depth,
        &format!("Column({} {})", column.name, column.data_type),
        out,
    );
    for constraint in &column.constraints {
        match constraint {
            ColumnConstraint::NotNull => line(depth + 1, "NOT NULL", out),
            ColumnConstraint::Null => line(depth + 1, "NULL", out),
            ColumnConstraint::PrimaryKey => line(depth + 1, "PRIMARY KEY", out),
            ColumnConstraint::Unique => line(depth + 1, "UNIQUE", out),
            ColumnConstraint::AutoIncrement => line(depth + 1, "AUTO_INCREMENT", out),
            ColumnConstraint::Default(value) => {
                line(depth + 1, "DEFAULT", out);
                render_expression(value, depth + 2, out);
            }
            ColumnConstraint::ForeignKey(reference) => {
                line(depth + 1, &format!("REFERENCES {reference}"), out);
            }
        }
    }
}

fn render_table_constraint(constraint: &TableConstraint, depth: usize, out: &mut String) {
    let prefix = match &constraint.name {
        Some(name) => format!("{name}: "),
        None => String::new(),
    };
    match &constraint.kind {
        TableConstraintKind::PrimaryKey { columns } => line(
            depth,
            &format!("Constraint({prefix}PRIMARY KEY {})", columns.join(", ")),
            out,
        ),
        TableConstraintKind::Unique { columns } => line(
            depth,
            &format!("Constraint({prefix}UNIQUE {})", columns.join(", ")),
            out,
        ),
        TableConstraintKind::ForeignKey {
            columns,
            referenced_table,
            referenced_columns,
        } => line(
            depth,
            &format!(
                "Constraint({prefix}FOREIGN KEY {} REFERENCES {referenced_table}({}))",
                columns.join(", "),
                referenced_columns.join(", ")
            ),
            out,
        ),
        TableConstraintKind::Check(expr) => {
            line(depth, &format!("Constraint({prefix}CHECK)"), out);
            render_expression(expr, depth + 1, out);
        }
    }
}

fn render_alter_action(action: &AlterAction, depth: usize, out: &mut String) {
    match action {
        AlterAction::AddColumn(column) => {
            line(depth, "ADD COLUMN", out);
            render_column_def(column, depth + 1, out);
        }
        AlterAction::DropColumn(name) => line(depth, &format!("DROP COLUMN {name}"), out),
        AlterAction::ModifyColumn(column) => {
            line(depth, "MODIFY COLUMN", out);
            render_column_def(column, depth + 1, out);
        }
        AlterAction::AddConstraint(constraint) => {
            line(depth, "ADD CONSTRAINT", out);
            render_table_constraint(constraint, depth + 1, out);
        }
        AlterAction::DropConstraint(name) => line(depth, &format!("DROP CONSTRAINT {name}"), out),
    }
}

fn render_expression(expr: &Expr, depth: usize, out: &mut String) {
    match expr {
        Expr::Literal(literal) => line(depth, &literal_label(literal), out),
        Expr::Column(column) => line(depth, &format!("Column({column})"), out),
        Expr::BinaryOp { left, op, right } => {
            line(depth, &format!("BinaryOp({op})"), out);
            render_expression(left, depth + 1, out);
            render_expression(right, depth + 1, out);
        }
        Expr::UnaryOp { op, operand } => {
            line(depth, &format!("UnaryOp({op})"), out);
            render_expression(operand, depth + 1, out);
        }
        Expr::FunctionCall {
            name,
            args,
            distinct,
        } => {
            let label = if *distinct {
                format!("FunctionCall({name} DISTINCT)")
            } else {
                format!("FunctionCall({name})")
            };
            line(depth, &label, out);
            for arg in args {
                render_expression(arg, depth + 1, out);
            }
        }
        Expr::Case {
            operand,
            whens,
            else_expr,
        } => {
            line(depth, "CASE", out);
            if let Some(subject) = operand {
                line(depth + 1, "[OPERAND]", out);
                render_expression(subject, depth + 2, out);
            }
            for (condition, result) in whens {
                line(depth + 1, "[WHEN]", out);
                render_expression(condition, depth + 2, out);
                render_expression(result, depth + 2, out);
            }
            if let Some(fallback) = else_expr {
                line(depth + 1, "[ELSE]", out);
                render_expression(fallback, depth + 2, out);
            }
        }
        Expr::Subquery(select) => {
            line(depth, "Subquery", out);
            render_select(select, depth + 1, out);
        }
    }
}

fn literal_label(literal: &Literal) -> String {
    match literal {
        Literal::Integer(value) => format!("Literal(Integer {value})"),
        Literal::Decimal(value) => format!("Literal(Decimal {value})"),
        Literal::String(value) => format!("Literal(String '{value}')"),
        Literal::Boolean(value) => format!("Literal(Boolean {value})"),
        Literal::Null => "Literal(Null)".to_owned(),
    }
}
