//! Item synonym table loaded from a `variant,canonical` CSV file at start-up.

use std::path::Path;

use mto_core::SynonymTable;

use crate::import::ImportError;

/// Load the synonym table.
///
/// A missing file yields an empty table (names are then only whitespace-normalized).
/// The first two columns are used whatever their header says; rows with a blank cell are ignored.
pub fn load_synonyms(path: &Path) -> Result<SynonymTable, ImportError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "synonym file not found, item names will not be mapped");
        return Ok(SynonymTable::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ImportError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let mut table = SynonymTable::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed synonym record");
                continue;
            }
        };
        if let (Some(variant), Some(canonical)) = (record.get(0), record.get(1)) {
            table.insert(variant.trim_start_matches('\u{FEFF}'), canonical);
        }
    }

    tracing::info!(path = %path.display(), entries = table.len(), "loaded item synonyms");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mto_core::canonicalize_item;
    use std::io::Write;

    #[test]
    fn loads_variant_canonical_pairs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "variant,canonical").unwrap();
        writeln!(file, "ПК,Персональный компьютер").unwrap();
        writeln!(file, "  Ноутбук  ,Портативный компьютер").unwrap();
        writeln!(file, "пустой,").unwrap();
        file.flush().unwrap();

        let table = load_synonyms(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(canonicalize_item("пк", &table), "Персональный компьютер");
        assert_eq!(canonicalize_item("Ноутбук", &table), "Портативный компьютер");
    }

    #[test]
    fn missing_file_is_an_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_synonyms(&dir.path().join("absent.csv")).unwrap();
        assert!(table.is_empty());
    }
}
