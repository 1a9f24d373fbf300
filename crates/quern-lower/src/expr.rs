//! Expression lowering.
//!
//! The parse tree arrives with precedence and associativity already encoded,
//! so this module is a pure shape translation: every `BinaryExpr` node has
//! exactly `[left, operator-leaf, right]` children and is lowered without any
//! precedence reasoning. Parenthesized expressions are transparent; grouping
//! survives only through tree shape.

use quern_ast::{BinaryOp, ColumnRef, Expr, Literal, UnaryOp};
use quern_error::{Error, Result};
use quern_parser::{ParseTree, RuleKind, Token, TokenKind};

use crate::dml;

/// Whether a rule tag denotes an expression alternative.
#[must_use]
pub(crate) fn is_expr_rule(kind: RuleKind) -> bool {
    matches!(
        kind,
        RuleKind::BinaryExpr
            | RuleKind::UnaryExpr
            | RuleKind::IsNullExpr
            | RuleKind::FunctionCall
            | RuleKind::CaseExpr
            | RuleKind::ParenExpr
            | RuleKind::Literal
            | RuleKind::ColumnReference
            | RuleKind::SubqueryExpr
    )
}

/// Resolve a binary operator from its source lexeme.
///
/// The table is canonical: word operators match case-insensitively, and an
/// unlisted lexeme is an error rather than a silent default.
///
/// # Errors
///
/// Returns [`Error::UnknownOperator`] for a lexeme outside the table.
pub fn binary_op(lexeme: &str) -> Result<BinaryOp> {
    let op = match lexeme.to_ascii_uppercase().as_str() {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Subtract,
        "*" => BinaryOp::Multiply,
        "/" => BinaryOp::Divide,
        "%" => BinaryOp::Modulo,
        "=" => BinaryOp::Equal,
        "<>" | "!=" => BinaryOp::NotEqual,
        "<" => BinaryOp::LessThan,
        "<=" => BinaryOp::LessEqual,
        ">" => BinaryOp::GreaterThan,
        ">=" => BinaryOp::GreaterEqual,
        "AND" => BinaryOp::And,
        "OR" => BinaryOp::Or,
        "LIKE" => BinaryOp::Like,
        _ => return Err(Error::UnknownOperator(lexeme.to_owned())),
    };
    Ok(op)
}

/// Lower one expression node of the parse tree.
///
/// # Errors
///
/// Returns [`Error::UnknownOperator`] for an operator lexeme outside the
/// canonical table, [`Error::Syntax`] for an out-of-range numeric literal,
/// and [`Error::UnsupportedConstruct`] for a node shape lowering has no case
/// for.
pub fn lower_expr(node: &ParseTree) -> Result<Expr> {
    let Some(kind) = node.kind() else {
        return Err(Error::UnsupportedConstruct(
            "bare token in expression position".to_owned(),
        ));
    };
    match kind {
        RuleKind::Literal => lower_literal(node),
        RuleKind::ColumnReference => lower_column_reference(node),
        RuleKind::BinaryExpr => lower_binary(node),
        RuleKind::UnaryExpr => lower_unary(node),
        RuleKind::IsNullExpr => lower_is_null(node),
        RuleKind::FunctionCall => lower_function_call(node),
        RuleKind::CaseExpr => lower_case(node),
        // Parentheses are transparent: grouping survives only as tree shape.
        RuleKind::ParenExpr => lower_sole_child(node),
        RuleKind::SubqueryExpr => {
            let select = node
                .child(RuleKind::SelectStatement)
                .ok_or_else(|| Error::UnsupportedConstruct("subquery without SELECT".to_owned()))?;
            Ok(Expr::Subquery(Box::new(dml::lower_select(select)?)))
        }
        other => Err(Error::UnsupportedConstruct(format!(
            "{other:?} in expression position"
        ))),
    }
}

fn lower_sole_child(node: &ParseTree) -> Result<Expr> {
    match node.children() {
        [child] => lower_expr(child),
        _ => Err(Error::UnsupportedConstruct(
            "expected exactly one inner expression".to_owned(),
        )),
    }
}

fn lower_literal(node: &ParseTree) -> Result<Expr> {
    let token = node.sole_token().ok_or_else(|| {
        Error::UnsupportedConstruct("literal without a token".to_owned())
    })?;
    let literal = match token.kind {
        TokenKind::IntegerLiteral => Literal::Integer(parse_i64(token)?),
        TokenKind::DecimalLiteral => {
            let value = token.text.parse::<f64>().map_err(|_| {
                Error::syntax(token.line, token.column, "malformed decimal literal")
            })?;
            Literal::Decimal(value)
        }
        TokenKind::StringLiteral => Literal::String(strip_quotes(&token.text)),
        TokenKind::True => Literal::Boolean(true),
        TokenKind::False => Literal::Boolean(false),
        TokenKind::Null => Literal::Null,
        _ => {
            return Err(Error::UnsupportedConstruct(format!(
                "literal token {token}"
            )));
        }
    };
    Ok(Expr::Literal(literal))
}

fn parse_i64(token: &Token) -> Result<i64> {
    token.text.parse::<i64>().map_err(|_| {
        Error::syntax(token.line, token.column, "integer literal out of range")
    })
}

/// Strip exactly one layer of outer quotes. Interior characters pass through
/// untouched; there is no escape handling.
fn strip_quotes(text: &str) -> String {
    let mut chars = text.chars();
    if chars.next().is_some() && chars.next_back().is_some() {
        chars.as_str().to_owned()
    } else {
        String::new()
    }
}

fn lower_column_reference(node: &ParseTree) -> Result<Expr> {
    let idents: Vec<&Token> = node
        .leaves()
        .filter(|t| t.kind == TokenKind::Identifier)
        .collect();
    let column = match idents.as_slice() {
        [column] => ColumnRef::bare(column.text.clone()),
        [table, column] => ColumnRef {
            table: Some(table.text.clone()),
            column: column.text.clone(),
        },
        _ => {
            return Err(Error::UnsupportedConstruct(
                "column reference with unexpected qualifier depth".to_owned(),
            ));
        }
    };
    Ok(Expr::Column(column))
}

fn lower_binary(node: &ParseTree) -> Result<Expr> {
    let [left, op, right] = node.children() else {
        return Err(Error::UnsupportedConstruct(
            "binary expression without [left, operator, right] shape".to_owned(),
        ));
    };
    let op_token = op.token().ok_or_else(|| {
        Error::UnsupportedConstruct("binary expression operator is not a token".to_owned())
    })?;
    Ok(Expr::BinaryOp {
        left: Box::new(lower_expr(left)?),
        op: binary_op(&op_token.text)?,
        right: Box::new(lower_expr(right)?),
    })
}

fn lower_unary(node: &ParseTree) -> Result<Expr> {
    let [op, operand] = node.children() else {
        return Err(Error::UnsupportedConstruct(
            "unary expression without [operator, operand] shape".to_owned(),
        ));
    };
    let op = match op.token().map(|t| t.kind) {
        Some(TokenKind::Not) => UnaryOp::Not,
        Some(TokenKind::Minus) => UnaryOp::Negate,
        _ => {
            return Err(Error::UnsupportedConstruct(
                "unrecognized unary operator".to_owned(),
            ));
        }
    };
    Ok(Expr::UnaryOp {
        op,
        operand: Box::new(lower_expr(operand)?),
    })
}

fn lower_is_null(node: &ParseTree) -> Result<Expr> {
    let operand = node.children().first().ok_or_else(|| {
        Error::UnsupportedConstruct("IS NULL without an operand".to_owned())
    })?;
    let op = if node.has_leaf(TokenKind::Not) {
        UnaryOp::IsNotNull
    } else {
        UnaryOp::IsNull
    };
    Ok(Expr::UnaryOp {
        op,
        operand: Box::new(lower_expr(operand)?),
    })
}

fn lower_function_call(node: &ParseTree) -> Result<Expr> {
    let name = node
        .leaf_of(TokenKind::Identifier)
        .ok_or_else(|| Error::UnsupportedConstruct("function call without a name".to_owned()))?
        .text
        .clone();
    // `count(*)` carries the wildcard as a single column-reference argument.
    let args = if node.has_leaf(TokenKind::Star) {
        vec![Expr::Column(ColumnRef::wildcard())]
    } else {
        node.children()
            .iter()
            .filter(|c| c.kind().is_some_and(is_expr_rule))
            .map(lower_expr)
            .collect::<Result<Vec<_>>>()?
    };
    Ok(Expr::FunctionCall {
        name,
        args,
        distinct: node.has_leaf(TokenKind::Distinct),
    })
}

fn lower_case(node: &ParseTree) -> Result<Expr> {
    let mut operand = None;
    let mut whens = Vec::new();
    let mut else_expr = None;
    for child in node.children() {
        match child.kind() {
            Some(RuleKind::WhenClause) => {
                let [condition, result] = child.children() else {
                    return Err(Error::UnsupportedConstruct(
                        "WHEN arm without [condition, result] shape".to_owned(),
                    ));
                };
                whens.push((lower_expr(condition)?, lower_expr(result)?));
            }
            Some(RuleKind::ElseClause) => {
                else_expr = Some(Box::new(lower_sole_child(child)?));
            }
            Some(kind) if is_expr_rule(kind) => {
                operand = Some(Box::new(lower_expr(child)?));
            }
            _ => {
                return Err(Error::UnsupportedConstruct(
                    "unexpected node inside CASE".to_owned(),
                ));
            }
        }
    }
    Ok(Expr::Case {
        operand,
        whens,
        else_expr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quern_parser::parse;

    fn lower_select_expr(sql: &str) -> Expr {
        let script = parse(sql).expect("parse");
        let select = &script.children()[0];
        let elements = select
            .child(RuleKind::SelectElements)
            .expect("select elements");
        let element = &elements.children()[0];
        lower_expr(&element.children()[0]).expect("lower")
    }

    #[test]
    fn operator_table_is_total_over_grammar_lexemes() {
        for lexeme in [
            "+", "-", "*", "/", "%", "=", "<>", "!=", "<", "<=", ">", ">=", "AND", "OR", "LIKE",
        ] {
            binary_op(lexeme).unwrap_or_else(|_| panic!("lexeme `{lexeme}` must resolve"));
        }
        assert_eq!(binary_op("<>"), Ok(BinaryOp::NotEqual));
        assert_eq!(binary_op("!="), Ok(BinaryOp::NotEqual));
        assert_eq!(binary_op("and"), Ok(BinaryOp::And));
    }

    #[test]
    fn unknown_operator_is_rejected_not_defaulted() {
        assert_eq!(
            binary_op("<=>"),
            Err(Error::UnknownOperator("<=>".to_owned()))
        );
    }

    #[test]
    fn string_literal_loses_outer_quotes_only() {
        let expr = lower_select_expr("SELECT 'hello world'");
        assert_eq!(
            expr,
            Expr::Literal(Literal::String("hello world".to_owned()))
        );
        let expr = lower_select_expr("SELECT \"double\"");
        assert_eq!(expr, Expr::Literal(Literal::String("double".to_owned())));
    }

    #[test]
    fn numeric_literals_coerce_by_token_kind() {
        assert_eq!(
            lower_select_expr("SELECT 42"),
            Expr::Literal(Literal::Integer(42))
        );
        assert_eq!(
            lower_select_expr("SELECT 3.5"),
            Expr::Literal(Literal::Decimal(3.5))
        );
    }

    #[test]
    fn boolean_and_null_literals() {
        assert_eq!(
            lower_select_expr("SELECT TRUE"),
            Expr::Literal(Literal::Boolean(true))
        );
        assert_eq!(
            lower_select_expr("SELECT false"),
            Expr::Literal(Literal::Boolean(false))
        );
        assert_eq!(
            lower_select_expr("SELECT NULL"),
            Expr::Literal(Literal::Null)
        );
    }

    #[test]
    fn integer_overflow_is_a_positioned_error() {
        let script = parse("SELECT 99999999999999999999").expect("parse");
        let select = &script.children()[0];
        let elements = select.child(RuleKind::SelectElements).expect("elements");
        let err = lower_expr(&elements.children()[0].children()[0]).expect_err("overflow");
        assert!(matches!(err, Error::Syntax { line: 1, .. }));
    }

    #[test]
    fn parentheses_are_transparent() {
        assert_eq!(
            lower_select_expr("SELECT (((7)))"),
            Expr::Literal(Literal::Integer(7))
        );
    }

    #[test]
    fn grouping_survives_as_tree_shape() {
        // (a + b) * c keeps the addition as the left operand.
        let expr = lower_select_expr("SELECT (a + b) * c");
        let Expr::BinaryOp { left, op, .. } = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(op, BinaryOp::Multiply);
        assert!(matches!(
            *left,
            Expr::BinaryOp {
                op: BinaryOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn count_star_becomes_wildcard_argument() {
        let expr = lower_select_expr("SELECT count(*)");
        assert_eq!(
            expr,
            Expr::FunctionCall {
                name: "count".to_owned(),
                args: vec![Expr::Column(ColumnRef::wildcard())],
                distinct: false,
            }
        );
    }

    #[test]
    fn distinct_function_argument() {
        let expr = lower_select_expr("SELECT count(DISTINCT city)");
        assert_eq!(
            expr,
            Expr::FunctionCall {
                name: "count".to_owned(),
                args: vec![Expr::Column(ColumnRef::bare("city"))],
                distinct: true,
            }
        );
    }

    #[test]
    fn is_null_variants_lower_to_unary_ops() {
        let expr = lower_select_expr("SELECT a IS NULL");
        assert!(matches!(
            expr,
            Expr::UnaryOp {
                op: UnaryOp::IsNull,
                ..
            }
        ));
        let expr = lower_select_expr("SELECT a IS NOT NULL");
        assert!(matches!(
            expr,
            Expr::UnaryOp {
                op: UnaryOp::IsNotNull,
                ..
            }
        ));
    }

    #[test]
    fn case_with_operand_and_else() {
        let expr = lower_select_expr("SELECT CASE x WHEN 1 THEN 'one' ELSE 'other' END");
        let Expr::Case {
            operand,
            whens,
            else_expr,
        } = expr
        else {
            panic!("expected CASE expression");
        };
        assert_eq!(operand, Some(Box::new(Expr::Column(ColumnRef::bare("x")))));
        assert_eq!(whens.len(), 1);
        assert_eq!(
            else_expr,
            Some(Box::new(Expr::Literal(Literal::String("other".to_owned()))))
        );
    }

    #[test]
    fn searched_case_has_no_operand() {
        let expr = lower_select_expr("SELECT CASE WHEN a > 1 THEN 1 END");
        let Expr::Case { operand, whens, .. } = expr else {
            panic!("expected CASE expression");
        };
        assert!(operand.is_none());
        assert_eq!(whens.len(), 1);
    }

    #[test]
    fn qualified_column_reference() {
        assert_eq!(
            lower_select_expr("SELECT t.c"),
            Expr::Column(ColumnRef {
                table: Some("t".to_owned()),
                column: "c".to_owned(),
            })
        );
    }
}
