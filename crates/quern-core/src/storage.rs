//! In-memory table registry.

use std::collections::HashMap;

use quern_ast::CreateTableStatement;
use quern_error::{Error, Result};
use tracing::info;

/// A registered table definition. Rows are not stored; only the shape from
/// `CREATE TABLE` is retained.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub definition: CreateTableStatement,
}

/// The table registry. Owned per instance: two engines never share state,
/// and dropping the engine drops everything it registered.
#[derive(Debug, Default)]
pub struct StorageEngine {
    tables: HashMap<String, Table>,
}

impl StorageEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table from its `CREATE TABLE` definition.
    ///
    /// With `IF NOT EXISTS` a duplicate name is a logged no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableExists`] when the name is already registered
    /// and the definition does not carry `IF NOT EXISTS`.
    pub fn create_table(&mut self, definition: CreateTableStatement) -> Result<()> {
        let name = definition.name.clone();
        if self.tables.contains_key(&name) {
            if definition.if_not_exists {
                info!(table = %name, "table exists, IF NOT EXISTS skips creation");
                return Ok(());
            }
            return Err(Error::TableExists(name));
        }
        info!(table = %name, columns = definition.columns.len(), "created table");
        self.tables.insert(name, Table { definition });
        Ok(())
    }

    /// Remove a table. Unknown names are ignored; `DROP` is idempotent here.
    pub fn drop_table(&mut self, name: &str) {
        if self.tables.remove(name).is_some() {
            info!(table = %name, "dropped table");
        }
    }

    /// Look up a registered table.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Number of registered tables.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}
