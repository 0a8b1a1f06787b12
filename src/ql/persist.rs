use std::fs;
use std::io::Write;
use std::path::Path;

use crate::ql::prelude::{QlError, Result};
use crate::ql::table::QTable;

/// Durable storage for the Q-value table.
///
/// One JSON document holds the nested state -> action -> value mapping; the
/// empty table is `{}`. Values round-trip exactly (serde_json prints f64 with
/// shortest round-trip precision).
///
/// Writes land in a temporary file next to the target and are renamed into
/// place, so a reader never observes a partially written table.
pub fn save(table: &QTable, path: &Path) -> Result<()> {
    let document = serde_json::to_string(table)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(document.as_bytes())?;
    file.persist(path).map_err(|e| QlError::Storage(e.error))?;

    log::debug!("saved Q-table ({} states) to {}", table.len(), path.display());
    Ok(())
}

/// Reads a table back from `path`.
///
/// A missing file is the valid first-run condition: an empty-table document
/// is created at `path` and an empty table returned. A file that exists but
/// does not parse yields [`QlError::Decode`]; the caller's table is never
/// partially replaced because the result is built fresh before being handed
/// over.
pub fn load(path: &Path) -> Result<QTable> {
    if !path.exists() {
        let empty = QTable::new();
        save(&empty, path)?;
        log::debug!("no Q-table at {}, starting empty", path.display());
        return Ok(empty);
    }

    let document = fs::read_to_string(path)?;
    let table: QTable = serde_json::from_str(&document)?;
    log::debug!("loaded Q-table ({} states) from {}", table.len(), path.display());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::{load, save};
    use crate::ql::table::QTable;

    #[test]
    fn empty_table_serializes_to_an_empty_document() {
        let table = QTable::new();
        assert_eq!(serde_json::to_string(&table).unwrap(), "{}");
    }

    #[test]
    fn save_then_load_reproduces_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json");

        let mut table = QTable::new();
        table.set_value("s1", "a", 1.25);
        table.set_value("s1", "b", -0.5);
        table.set_value("s2", "a", 1e-12);

        save(&table, &path).unwrap();
        assert_eq!(load(&path).unwrap(), table);
    }
}
