//! Lowering from the concrete parse tree to the typed AST.
//!
//! One pass, top-down. The builder trusts the parse tree's shape for
//! precedence and associativity and only translates structure; anything it
//! cannot translate is a hard error, never a silent skip.
//!
//! Batch semantics: a script of one statement lowers to that statement
//! unwrapped, two or more wrap in [`Statement::StatementList`] in source
//! order, and zero is [`Error::EmptyBatch`].

pub mod ddl;
pub mod dml;
pub mod expr;

use quern_ast::Statement;
use quern_error::{Error, Result};
use quern_parser::{ParseTree, RuleKind};
use tracing::debug;

pub use expr::{binary_op, lower_expr};

/// Parse and lower a whole SQL script in one call.
///
/// # Errors
///
/// Propagates any parse or lowering error.
pub fn lower_sql(input: &str) -> Result<Statement> {
    lower_script(&quern_parser::parse(input)?)
}

/// Lower a `Script` rule into a single [`Statement`].
///
/// # Errors
///
/// Returns [`Error::EmptyBatch`] for a script with no statements, plus any
/// per-statement lowering error.
pub fn lower_script(script: &ParseTree) -> Result<Statement> {
    let mut statements = script
        .children()
        .iter()
        .map(lower_statement)
        .collect::<Result<Vec<_>>>()?;
    debug!(count = statements.len(), "lowered statement batch");
    match statements.len() {
        0 => Err(Error::EmptyBatch),
        1 => Ok(statements.remove(0)),
        _ => Ok(Statement::StatementList(statements)),
    }
}

/// Lower one statement rule.
///
/// # Errors
///
/// Returns [`Error::UnsupportedConstruct`] for a rule with no statement
/// lowering, plus any error from the per-statement lowerings.
pub fn lower_statement(node: &ParseTree) -> Result<Statement> {
    let Some(kind) = node.kind() else {
        return Err(Error::UnsupportedConstruct(
            "bare token in statement position".to_owned(),
        ));
    };
    match kind {
        RuleKind::SelectStatement => Ok(Statement::Select(dml::lower_select(node)?)),
        RuleKind::InsertStatement => Ok(Statement::Insert(dml::lower_insert(node)?)),
        RuleKind::UpdateStatement => Ok(Statement::Update(dml::lower_update(node)?)),
        RuleKind::DeleteStatement => Ok(Statement::Delete(dml::lower_delete(node)?)),
        RuleKind::CreateTableStatement => {
            Ok(Statement::CreateTable(ddl::lower_create_table(node)?))
        }
        RuleKind::GenericDdlStatement => Ok(ddl::lower_generic_ddl(node)),
        RuleKind::TransactionStatement => ddl::lower_transaction(node),
        other => Err(Error::UnsupportedConstruct(format!(
            "{other:?} in statement position"
        ))),
    }
}
