use tracing::info;

use crate::domain::{DashError, Result};
use crate::table::SalesTable;

/// Holds the table of the current session. The loader is the only writer,
/// views borrow it read-only.
#[derive(Debug, Default)]
pub struct Session {
    table: Option<SalesTable>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current table.
    pub fn load(&mut self, table: SalesTable) {
        info!(
            "Session table replaced with {} ({} rows)",
            table.name(),
            table.height()
        );
        self.table = Some(table);
    }

    pub fn table(&self) -> Option<&SalesTable> {
        self.table.as_ref()
    }

    pub fn require_table(&self) -> Result<&SalesTable> {
        self.table.as_ref().ok_or(DashError::MissingTable)
    }
}
