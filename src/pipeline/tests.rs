#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;
    use std::sync::Arc;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::tempdir;
    use uuid::Uuid;
    use crate::constants::*;
    use crate::pipeline::{filter, PipelineRunner, Record, RecordReader};
    use crate::tasks::{TaskRegistry, TaskState};

    const HEADER: &str = "invoice_creation_date,payee_name,primary_vendor_code,barcode,invoice_status,header_po,invoice_no,invoice_date,invoice_source_name,invoice_quantity,invoice_amount,ignored_column";

    fn sample_rows() -> Vec<String> {
        let statuses = ["Active", "cancelled", "CANCELLED", "Paid"];
        let sources = ["EDI", "DROPSHIP", "Portal", "dropship"];
        let suffixes = ["", "SCR", "scr", "-A"];
        (0..64)
            .map(|i| {
                format!(
                    "2022-01-{:02},Payee {},V{},BC{},{},PO{},INV{}{},2022-07-{:02}T00:00:00.000Z,{},1,{}.{:02},junk",
                    i % 28 + 1,
                    i,
                    i % 3,
                    i,
                    statuses[i % 4],
                    i % 5,
                    i,
                    suffixes[(i / 4) % 4],
                    i % 2 + 1,
                    sources[(i / 16) % 4],
                    100 + (i % 6),
                    i % 100,
                )
            })
            .collect()
    }

    fn write_gzip(path: &Path, rows: &[String]) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        writeln!(encoder, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(encoder, "{}", row).unwrap();
        }
        std::fs::write(path, encoder.finish().unwrap()).unwrap();
    }

    fn run_once(input: &Path, output: &Path) -> TaskState {
        let registry = Arc::new(TaskRegistry::new());
        let id = Uuid::new_v4();
        PipelineRunner::new(8).execute(registry.create(id), input, output);
        registry.get(id).unwrap().status
    }

    #[test]
    fn test_output_contains_exactly_accepted_records() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("in.csv.gz");
        let output = temp_dir.path().join("out.csv");
        let rows = sample_rows();
        write_gzip(&input, &rows);

        assert_eq!(run_once(&input, &output), TaskState::Completed);

        let expected: Vec<String> = RecordReader::open(&input)
            .unwrap()
            .map(|r| r.unwrap())
            .filter(filter::accept)
            .map(|r| r.get(FIELD_INVOICE_NO).to_string())
            .collect();

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let written: Vec<String> = reader
            .deserialize::<std::collections::HashMap<String, String>>()
            .map(|row| row.unwrap()[FIELD_INVOICE_NO].clone())
            .collect();

        assert!(!expected.is_empty());
        assert_eq!(written, expected);
        for invoice_no in &written {
            assert!(!invoice_no.to_lowercase().ends_with("scr"));
        }
    }

    #[test]
    fn test_output_header_order_and_unknown_columns_dropped() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("in.csv.gz");
        let output = temp_dir.path().join("out.csv");
        write_gzip(&input, &sample_rows());

        assert_eq!(run_once(&input, &output), TaskState::Completed);

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect::<Vec<_>>());
        assert!(!headers.contains(&"ignored_column".to_string()));
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("in.csv.gz");
        let first = temp_dir.path().join("first.csv");
        let second = temp_dir.path().join("second.csv");
        write_gzip(&input, &sample_rows());

        assert_eq!(run_once(&input, &first), TaskState::Completed);
        assert_eq!(run_once(&input, &second), TaskState::Completed);

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    }

    #[test]
    fn test_remarks_agree_with_summary() {
        let temp_dir = tempdir().unwrap();
        let input = temp_dir.path().join("in.csv.gz");
        let output = temp_dir.path().join("out.csv");
        write_gzip(&input, &sample_rows());

        let registry = Arc::new(TaskRegistry::new());
        let id = Uuid::new_v4();
        PipelineRunner::default().execute(registry.create(id), &input, &output);
        let summary = registry.get(id).unwrap().summary.unwrap();

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let rows: Vec<std::collections::HashMap<String, String>> =
            reader.deserialize().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), summary.lines_processed);

        for (remark_column, expected) in [
            (KEY_A_REMARK_COLUMN, summary.duplicates.header_po_date_amount),
            (KEY_B_REMARK_COLUMN, summary.duplicates.vendor_year_amount),
            (KEY_C_REMARK_COLUMN, summary.duplicates.header_po_amount),
        ] {
            let duplicates = rows.iter().filter(|r| r[remark_column] == REMARK_DUPLICATE).count();
            let unique = rows.iter().filter(|r| r[remark_column] == REMARK_NON_DUPLICATE).count();
            assert_eq!(duplicates, expected);
            assert_eq!(duplicates + unique, rows.len());
        }
    }

    #[test]
    fn test_required_fields_always_present_after_projection() {
        let record = Record::from_pairs([(FIELD_INVOICE_NO, "INV-9")]);
        let projected = record.project(&REQUIRED_FIELDS);
        for field in REQUIRED_FIELDS {
            assert!(projected.contains(field), "missing {}", field);
        }
        assert_eq!(projected.len(), REQUIRED_FIELDS.len());
    }
}
