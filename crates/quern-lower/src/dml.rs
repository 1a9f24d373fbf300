//! DML lowering: SELECT, INSERT, UPDATE, DELETE.

use quern_ast::{
    ColumnRef, DeleteStatement, Expr, InsertStatement, JoinClause, JoinType, OrderByElement,
    SelectElement, SelectStatement, TableSource, UpdateStatement,
};
use quern_error::{Error, Result};
use quern_parser::{ParseTree, RuleKind, Token, TokenKind};

use crate::expr::{is_expr_rule, lower_expr};

/// Lower a `SelectStatement` rule.
///
/// # Errors
///
/// Propagates expression lowering errors and rejects malformed clause shapes
/// with [`Error::UnsupportedConstruct`].
pub fn lower_select(node: &ParseTree) -> Result<SelectStatement> {
    let elements_node = node
        .child(RuleKind::SelectElements)
        .ok_or_else(|| Error::UnsupportedConstruct("SELECT without a projection".to_owned()))?;

    let elements = if elements_node.has_leaf(TokenKind::Star) {
        vec![SelectElement {
            expr: Expr::Column(ColumnRef::wildcard()),
            alias: None,
        }]
    } else {
        elements_node
            .children_of(RuleKind::SelectElement)
            .map(lower_select_element)
            .collect::<Result<Vec<_>>>()?
    };

    let from = node
        .children_of(RuleKind::TableSource)
        .map(lower_table_source)
        .collect::<Result<Vec<_>>>()?;

    let joins = node
        .children_of(RuleKind::JoinClause)
        .map(lower_join_clause)
        .collect::<Result<Vec<_>>>()?;

    let where_clause = node
        .child(RuleKind::WhereClause)
        .map(|c| lower_clause_expr(c, "WHERE"))
        .transpose()?;

    let group_by = node
        .children_of(RuleKind::GroupByItem)
        .map(|c| lower_clause_expr(c, "GROUP BY"))
        .collect::<Result<Vec<_>>>()?;

    let having = node
        .child(RuleKind::HavingClause)
        .map(|c| lower_clause_expr(c, "HAVING"))
        .transpose()?;

    let order_by = node
        .children_of(RuleKind::OrderByItem)
        .map(lower_order_by_item)
        .collect::<Result<Vec<_>>>()?;

    let limit = node
        .child(RuleKind::LimitClause)
        .map(|c| lower_count(c, "LIMIT"))
        .transpose()?;

    let offset = node
        .child(RuleKind::OffsetClause)
        .map(|c| lower_count(c, "OFFSET"))
        .transpose()?;

    Ok(SelectStatement {
        distinct: node.has_leaf(TokenKind::Distinct),
        elements,
        from,
        joins,
        where_clause,
        group_by,
        having,
        order_by,
        limit,
        offset,
    })
}

fn lower_select_element(node: &ParseTree) -> Result<SelectElement> {
    let expr_node = node.children().first().ok_or_else(|| {
        Error::UnsupportedConstruct("empty projection element".to_owned())
    })?;
    let alias = node
        .child(RuleKind::ColumnAlias)
        .and_then(ParseTree::sole_token)
        .map(|t| t.text.clone());
    Ok(SelectElement {
        expr: lower_expr(expr_node)?,
        alias,
    })
}

fn lower_table_source(node: &ParseTree) -> Result<TableSource> {
    let alias = node
        .child(RuleKind::TableAlias)
        .and_then(ParseTree::sole_token)
        .map(|t| t.text.clone());
    if let Some(select) = node.child(RuleKind::SelectStatement) {
        return Ok(TableSource::Subquery {
            query: Box::new(lower_select(select)?),
            alias,
        });
    }
    let name = rule_name(node, RuleKind::TableName, "table source")?;
    Ok(TableSource::Table { name, alias })
}

fn lower_join_clause(node: &ParseTree) -> Result<JoinClause> {
    // A bare JOIN is an inner join.
    let join_type = node
        .leaves()
        .find_map(|t| match t.kind {
            TokenKind::Inner => Some(JoinType::Inner),
            TokenKind::Left => Some(JoinType::Left),
            TokenKind::Right => Some(JoinType::Right),
            TokenKind::Full => Some(JoinType::Full),
            TokenKind::Cross => Some(JoinType::Cross),
            TokenKind::Natural => Some(JoinType::Natural),
            _ => None,
        })
        .unwrap_or(JoinType::Inner);
    let source = node
        .child(RuleKind::TableSource)
        .ok_or_else(|| Error::UnsupportedConstruct("JOIN without a source".to_owned()))?;
    let on = node
        .child(RuleKind::OnCondition)
        .map(|c| lower_clause_expr(c, "ON"))
        .transpose()?;
    Ok(JoinClause {
        join_type,
        source: lower_table_source(source)?,
        on,
    })
}

fn lower_order_by_item(node: &ParseTree) -> Result<OrderByElement> {
    let expr_node = node.children().first().ok_or_else(|| {
        Error::UnsupportedConstruct("empty ORDER BY term".to_owned())
    })?;
    Ok(OrderByElement {
        expr: lower_expr(expr_node)?,
        // Ascending unless DESC appears; a bare term sorts ascending.
        ascending: !node.has_leaf(TokenKind::Desc),
    })
}

fn lower_count(node: &ParseTree, clause: &str) -> Result<u64> {
    let token = node.sole_token().ok_or_else(|| {
        Error::UnsupportedConstruct(format!("{clause} without an integer"))
    })?;
    parse_u64(token)
}

fn parse_u64(token: &Token) -> Result<u64> {
    token.text.parse::<u64>().map_err(|_| {
        Error::syntax(token.line, token.column, "integer literal out of range")
    })
}

/// Lower an `InsertStatement` rule.
///
/// Value rows are kept positionally; arity against the column list is not
/// checked at this layer.
pub fn lower_insert(node: &ParseTree) -> Result<InsertStatement> {
    let table = rule_name(node, RuleKind::TableName, "INSERT")?;
    let columns: Vec<String> = node
        .children_of(RuleKind::ColumnName)
        .filter_map(ParseTree::sole_token)
        .map(|t| t.text.clone())
        .collect();
    let rows = node
        .children_of(RuleKind::ValuesRow)
        .map(|row| row.children().iter().map(lower_expr).collect::<Result<Vec<_>>>())
        .collect::<Result<Vec<_>>>()?;
    Ok(InsertStatement {
        table,
        columns: if columns.is_empty() { None } else { Some(columns) },
        rows,
    })
}

/// Lower an `UpdateStatement` rule.
///
/// The grammar hands over a flat sibling list: SET column names, their value
/// expressions, and (when a WHERE token is present) a trailing predicate
/// expression. The split is positional: the predicate is the final expression
/// if and only if the WHERE leaf exists. After the split the column and value
/// counts must agree.
///
/// # Errors
///
/// Returns [`Error::MalformedUpdate`] when the counts disagree.
pub fn lower_update(node: &ParseTree) -> Result<UpdateStatement> {
    let table = rule_name(node, RuleKind::TableName, "UPDATE")?;
    let columns: Vec<String> = node
        .children_of(RuleKind::ColumnName)
        .filter_map(ParseTree::sole_token)
        .map(|t| t.text.clone())
        .collect();
    let mut exprs = node
        .children()
        .iter()
        .filter(|c| c.kind().is_some_and(is_expr_rule))
        .map(lower_expr)
        .collect::<Result<Vec<_>>>()?;

    let where_clause = if node.has_leaf(TokenKind::Where) {
        exprs.pop()
    } else {
        None
    };

    if columns.len() != exprs.len() {
        return Err(Error::MalformedUpdate {
            columns: columns.len(),
            expressions: exprs.len(),
        });
    }
    Ok(UpdateStatement {
        table,
        assignments: columns.into_iter().zip(exprs).collect(),
        where_clause,
    })
}

/// Lower a `DeleteStatement` rule.
pub fn lower_delete(node: &ParseTree) -> Result<DeleteStatement> {
    let table = rule_name(node, RuleKind::TableName, "DELETE")?;
    let where_clause = if node.has_leaf(TokenKind::Where) {
        node.children()
            .iter()
            .rev()
            .find(|c| c.kind().is_some_and(is_expr_rule))
            .map(lower_expr)
            .transpose()?
    } else {
        None
    };
    Ok(DeleteStatement {
        table,
        where_clause,
    })
}

fn lower_clause_expr(node: &ParseTree, clause: &str) -> Result<Expr> {
    match node.children() {
        [child] => lower_expr(child),
        _ => Err(Error::UnsupportedConstruct(format!(
            "{clause} without exactly one expression"
        ))),
    }
}

pub(crate) fn rule_name(node: &ParseTree, kind: RuleKind, context: &str) -> Result<String> {
    node.child(kind)
        .and_then(ParseTree::sole_token)
        .map(|t| t.text.clone())
        .ok_or_else(|| Error::UnsupportedConstruct(format!("{context} without a {kind:?}")))
}
