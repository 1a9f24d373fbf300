//! Stub query executor.

use tracing::info;

use crate::planner::ExecutionPlan;

/// The result of executing a plan. Execution is not implemented, so the set
/// is always empty; the shape exists so callers are written against it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Executes [`ExecutionPlan`]s.
#[derive(Debug, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Execute a plan. Always returns an empty result set.
    #[must_use]
    pub fn execute(&self, plan: &ExecutionPlan) -> ResultSet {
        info!(kind = ?plan.kind, "executed plan");
        ResultSet::default()
    }
}
