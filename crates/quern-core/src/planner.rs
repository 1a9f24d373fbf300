//! Stub query planner.

use quern_ast::{Statement, StatementKind};
use tracing::info;

/// A plan is currently the statement itself plus its tag; no rewriting or
/// optimization happens.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    pub kind: StatementKind,
    pub statement: Statement,
}

/// Wraps statements into [`ExecutionPlan`]s.
#[derive(Debug, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Produce the (trivial) plan for a statement.
    #[must_use]
    pub fn plan(&self, statement: &Statement) -> ExecutionPlan {
        let kind = statement.kind();
        info!(?kind, "planned statement");
        ExecutionPlan {
            kind,
            statement: statement.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_carries_the_statement_tag() {
        let planner = QueryPlanner::new();
        let plan = planner.plan(&Statement::Commit);
        assert_eq!(plan.kind, StatementKind::Commit);
        assert_eq!(plan.statement, Statement::Commit);
    }
}
