//! Engine layers behind the SQL frontend.
//!
//! Everything here is a deliberate stub: the storage engine keeps table
//! definitions in memory, the planner wraps the AST opaquely, the executor
//! returns empty result sets, and the server logs and returns. The value is
//! in the seams: the frontend hands a finished [`Statement`] across each of
//! these boundaries, and none of them reach back into parsing.

pub mod executor;
pub mod planner;
pub mod server;
pub mod storage;

pub use executor::{QueryExecutor, ResultSet};
pub use planner::{ExecutionPlan, QueryPlanner};
pub use server::Server;
pub use storage::{StorageEngine, Table};
