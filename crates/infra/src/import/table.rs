//! Header-addressed view over an uploaded CSV file.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::ImportError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parsed CSV with case-insensitive column lookup.
///
/// Records that cannot be decoded are counted in `malformed` and dropped.
#[derive(Debug)]
pub(crate) struct CsvTable {
    columns: HashMap<String, usize>,
    pub(crate) records: Vec<StringRecord>,
    pub(crate) malformed: usize,
}

impl CsvTable {
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self, ImportError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| ImportError::Malformed(format!("failed to read CSV header: {e}")))?
            .clone();

        let mut columns = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            let key = name.trim_start_matches('\u{FEFF}').trim().to_lowercase();
            if !key.is_empty() {
                columns.entry(key).or_insert(idx);
            }
        }

        let mut records = Vec::new();
        let mut malformed = 0usize;
        for (line, result) in reader.records().enumerate() {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    malformed += 1;
                    tracing::warn!(record = line + 1, error = %e, "skipping malformed CSV record");
                }
            }
        }

        Ok(Self {
            columns,
            records,
            malformed,
        })
    }

    /// Fail with the full list of absent columns, in the order given.
    pub(crate) fn require(&self, required: &[&str]) -> Result<(), ImportError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|c| !self.columns.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::MissingColumns(missing))
        }
    }

    /// Trimmed field value; absent column or short record gives `None`.
    pub(crate) fn field<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
        let idx = *self.columns.get(column)?;
        record.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive_and_bom_is_stripped() {
        let table = CsvTable::parse("\u{FEFF}Item_Name, LOCATION ,qty_available\nПК,201В,5\n".as_bytes())
            .unwrap();
        table.require(&["item_name", "location", "qty_available"]).unwrap();
        let rec = &table.records[0];
        assert_eq!(table.field(rec, "item_name"), Some("ПК"));
        assert_eq!(table.field(rec, "location"), Some("201В"));
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let table = CsvTable::parse(b"item_name,extra\nA,1\n").unwrap();
        let err = table.require(&["item_name", "location", "qty_available"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"CSV missing required columns: ["location", "qty_available"]"#
        );
    }

    #[test]
    fn empty_input_has_no_columns() {
        let table = CsvTable::parse(b"").unwrap();
        assert!(table.require(&["item_name"]).is_err());
        assert!(table.records.is_empty());
    }

    #[test]
    fn short_records_yield_none_for_missing_fields() {
        let table = CsvTable::parse(b"item_name,qty_required,lab\nA,3\n").unwrap();
        let rec = &table.records[0];
        assert_eq!(table.field(rec, "lab"), None);
        assert_eq!(table.field(rec, "discipline"), None);
    }

    #[test]
    fn invalid_utf8_record_is_counted_as_malformed() {
        let mut bytes = b"item_name,location,qty_available\nA,l,1\n".to_vec();
        bytes.extend_from_slice(b"\xFF\xFE,l,2\n");
        bytes.extend_from_slice(b"B,l,3\n");
        let table = CsvTable::parse(&bytes).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.malformed, 1);
    }
}
