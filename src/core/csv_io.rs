use crate::domain::model::RawTable;
use crate::utils::error::{EdaError, Result};
use serde::Serialize;

/// Parse CSV bytes with a header row. Ragged rows are padded with empty cells.
pub fn read_table(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(EdaError::ProcessingError {
            message: "CSV input has no header row".to_string(),
        });
    }

    let width = headers.len();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    tracing::debug!("Parsed CSV: {} columns, {} rows", width, rows.len());
    Ok(RawTable::new(headers, rows))
}

pub fn write_table(table: &RawTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    into_bytes(writer)
}

/// Serialize typed rows; the header comes from the struct field names.
pub fn write_records<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    into_bytes(writer)
}

fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| EdaError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::YearCount;

    #[test]
    fn test_read_table_pads_short_rows() {
        let csv = "name,id,year\nAachen,1,1880\nAarhus,2\n";
        let table = read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["name", "id", "year"]);
        assert_eq!(table.rows[1], vec!["Aarhus", "2", ""]);
    }

    #[test]
    fn test_read_table_handles_quoted_geolocation() {
        let csv = "id,GeoLocation\n1,\"(50.775, 6.08333)\"\n";
        let table = read_table(csv.as_bytes()).unwrap();
        assert_eq!(table.cell(0, 1), "(50.775, 6.08333)");
    }

    #[test]
    fn test_write_records_uses_field_names() {
        let rows = vec![YearCount {
            year: 1880,
            num_fell_found: 3,
        }];
        let bytes = write_records(&rows).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "year,num_fell_found\n1880,3\n");
    }

    #[test]
    fn test_write_table_quotes_commas() {
        let table = RawTable::new(
            vec!["id".into(), "GeoLocation".into()],
            vec![vec!["1".into(), "(1.0, 2.0)".into()]],
        );
        let text = String::from_utf8(write_table(&table).unwrap()).unwrap();
        assert_eq!(text, "id,GeoLocation\n1,\"(1.0, 2.0)\"\n");
    }
}
