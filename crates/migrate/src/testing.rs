//! In-memory executor for tests and dry runs
//!
//! [`MemoryExecutor`] understands just enough of the SQL this crate
//! generates to keep a faithful model of the database: it tracks created
//! tables, applies history-table inserts/deletes, and records every batch
//! it was asked to run. Batches are atomic, and a one-shot failure can be
//! injected to exercise partial-failure behavior.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{MigrateError, MigrateResult};
use crate::executor::MigrationExecutor;
use crate::history::{HistoryRow, HISTORY_TABLE};

#[derive(Default)]
struct MemoryState {
    tables: HashSet<String>,
    history: Vec<HistoryRow>,
    batches: Vec<Vec<String>>,
    fail_on: Option<String>,
}

/// In-memory [`MigrationExecutor`]
#[derive(Default)]
pub struct MemoryExecutor {
    state: Mutex<MemoryState>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next batch containing `needle` in any statement fail
    /// without applying anything (one-shot).
    pub fn fail_next_containing(&self, needle: impl Into<String>) {
        self.state.lock().fail_on = Some(needle.into());
    }

    /// Every batch executed so far, in order
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.state.lock().batches.clone()
    }

    /// Number of batches executed so far
    pub fn batch_count(&self) -> usize {
        self.state.lock().batches.len()
    }

    /// All executed statements, flattened in execution order
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().batches.iter().flatten().cloned().collect()
    }

    /// Current contents of the simulated history table
    pub fn history_rows(&self) -> Vec<HistoryRow> {
        self.state.lock().history.clone()
    }

    /// Pre-seed a history row, as if applied by an earlier process
    pub fn seed_history(&self, row: HistoryRow) {
        let mut state = self.state.lock();
        state.tables.insert(HISTORY_TABLE.to_string());
        state.history.push(row);
    }

    fn apply(state: &mut MemoryState, statement: &str) {
        if let Some(rest) = statement.strip_prefix("CREATE TABLE ") {
            if let Some(name) = parse_quoted_identifier(rest) {
                state.tables.insert(name);
            }
        } else if let Some(rest) = statement.strip_prefix("DROP TABLE ") {
            if let Some(name) = parse_quoted_identifier(rest) {
                state.tables.remove(&name);
            }
        } else if statement.starts_with(&format!("INSERT INTO \"{}\"", HISTORY_TABLE)) {
            let literals = parse_quoted_literals(statement);
            if let [plugin, migration_id, product_version] = literals.as_slice() {
                state.history.push(HistoryRow {
                    plugin: plugin.clone(),
                    migration_id: migration_id.clone(),
                    product_version: product_version.clone(),
                });
            }
        } else if statement.starts_with(&format!("DELETE FROM \"{}\"", HISTORY_TABLE)) {
            let literals = parse_quoted_literals(statement);
            if let [plugin, migration_id] = literals.as_slice() {
                state
                    .history
                    .retain(|row| !(row.plugin == *plugin && row.migration_id == *migration_id));
            }
        }
    }
}

#[async_trait]
impl MigrationExecutor for MemoryExecutor {
    async fn table_exists(&self, table: &str) -> MigrateResult<bool> {
        Ok(self.state.lock().tables.contains(table))
    }

    async fn run_batch(&self, statements: &[String]) -> MigrateResult<()> {
        let mut state = self.state.lock();
        if let Some(needle) = state.fail_on.clone() {
            if statements.iter().any(|statement| statement.contains(&needle)) {
                state.fail_on = None;
                return Err(MigrateError::Execution(Box::new(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("injected failure on '{}'", needle),
                ))));
            }
        }
        for statement in statements {
            Self::apply(&mut state, statement);
        }
        state.batches.push(statements.to_vec());
        Ok(())
    }

    async fn fetch_history(&self, query: &str) -> MigrateResult<Vec<HistoryRow>> {
        let plugin = parse_quoted_literals(query).into_iter().next();
        let state = self.state.lock();
        let mut rows: Vec<HistoryRow> = state
            .history
            .iter()
            .filter(|row| plugin.as_deref().map_or(true, |p| row.plugin == p))
            .cloned()
            .collect();
        // raw string ordering, exactly like the real table's ORDER BY
        rows.sort_by(|a, b| a.migration_id.cmp(&b.migration_id));
        Ok(rows)
    }
}

/// Extract a leading `"quoted"` identifier, unescaping doubled quotes
fn parse_quoted_identifier(text: &str) -> Option<String> {
    let rest = text.strip_prefix('"')?;
    let mut name = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
                name.push('"');
            } else {
                return Some(name);
            }
        } else {
            name.push(c);
        }
    }
    None
}

/// Extract every `'quoted'` literal in order, unescaping doubled quotes
fn parse_quoted_literals(sql: &str) -> Vec<String> {
    let mut literals = Vec::new();
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' {
            continue;
        }
        let mut literal = String::new();
        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    literal.push('\'');
                } else {
                    break;
                }
            } else {
                literal.push(c);
            }
        }
        literals.push(literal);
    }
    literals
}
