use crate::models::db_operations::DbError;
use redb::{Database, ReadableTable, TableDefinition};
use std::collections::HashMap;

/// Work id -> number of recorded reads.
pub const VIEW_COUNTS: TableDefinition<&str, u64> = TableDefinition::new("view_counts");

/// Adds one view to a work and returns the new total.
/// redb admits a single write transaction at a time, so concurrent increments never lose an update.
pub fn increment_view_count(db: &Database, work_id: &str) -> Result<u64, DbError> {
    let write_txn = db.begin_write()?;
    let new_count = {
        let mut table = write_txn.open_table(VIEW_COUNTS)?;
        let current = table.get(work_id)?.map(|guard| guard.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(work_id, next)?;
        next
    };
    write_txn.commit()?;
    Ok(new_count)
}

pub fn read_view_count(db: &Database, work_id: &str) -> Result<u64, DbError> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(VIEW_COUNTS)?;
    let count = table.get(work_id)?.map(|guard| guard.value()).unwrap_or(0);
    Ok(count)
}

pub fn read_view_counts(db: &Database, work_ids: &[&str]) -> Result<HashMap<String, u64>, DbError> {
    let read_txn = db.begin_read()?;
    let table = read_txn.open_table(VIEW_COUNTS)?;

    let mut counts = HashMap::with_capacity(work_ids.len());
    for work_id in work_ids {
        if let Some(guard) = table.get(*work_id)? {
            counts.insert(work_id.to_string(), guard.value());
        }
    }
    Ok(counts)
}
