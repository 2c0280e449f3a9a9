//! CSV rendering of coverage results.

use thiserror::Error;

use mto_coverage::CoverageRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to finish CSV report: {0}")]
    Flush(String),
}

/// Downloadable coverage reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReportKind {
    /// Equipment procurement list.
    Procurement,
    SoftwareCoverage,
}

impl ReportKind {
    pub fn filename(self) -> &'static str {
        match self {
            ReportKind::Procurement => "procurement.csv",
            ReportKind::SoftwareCoverage => "software_coverage.csv",
        }
    }

    pub fn header(self) -> [&'static str; 4] {
        match self {
            ReportKind::Procurement => ["item_name", "qty_required", "qty_available", "deficit"],
            ReportKind::SoftwareCoverage => {
                ["software_name", "seats_required", "seats_available", "deficit"]
            }
        }
    }

    pub fn content_disposition(self) -> String {
        format!("attachment; filename=\"{}\"", self.filename())
    }
}

/// Header plus one line per row, prefixed with a UTF-8 BOM.
pub fn render_coverage_csv(kind: ReportKind, rows: &[CoverageRow]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(kind.header())?;
    for row in rows {
        let required = row.required.to_string();
        let available = row.available.to_string();
        let deficit = row.deficit.to_string();
        writer.write_record([
            row.name.as_str(),
            required.as_str(),
            available.as_str(),
            deficit.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::Flush(e.error().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procurement_report_has_bom_header_and_rows() {
        let rows = vec![
            CoverageRow::new("Маршрутизатор", 6, 0),
            CoverageRow::new("Персональный компьютер, офисный", 12, 8),
        ];
        let bytes = render_coverage_csv(ReportKind::Procurement, &rows).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(
            text,
            "item_name,qty_required,qty_available,deficit\n\
             Маршрутизатор,6,0,6\n\
             \"Персональный компьютер, офисный\",12,8,4\n"
        );
    }

    #[test]
    fn empty_software_report_is_just_the_header() {
        let bytes = render_coverage_csv(ReportKind::SoftwareCoverage, &[]).unwrap();
        assert_eq!(
            &bytes[UTF8_BOM.len()..],
            b"software_name,seats_required,seats_available,deficit\n"
        );
        assert_eq!(
            ReportKind::SoftwareCoverage.content_disposition(),
            "attachment; filename=\"software_coverage.csv\""
        );
    }
}
