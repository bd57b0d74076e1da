use crate::analysis::year::parse_year;
use crate::domain::model::{FallKind, FallSplit, RawTable, YearCount};
use crate::domain::ports::FilterOptions;
use crate::utils::error::{EdaError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub original: usize,
    pub with_valid_year: usize,
    pub after_fall_filter: usize,
    pub after_dedup: usize,
    pub after_year_window: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleaningOutcome {
    pub yearly: Vec<YearCount>,
    pub fall_split: Vec<FallSplit>,
    pub rows: RowCounts,
}

impl CleaningOutcome {
    pub fn distinct_years(&self) -> usize {
        self.yearly.len()
    }
}

struct CleanRow<'a> {
    year: i32,
    fall: Option<FallKind>,
    cells: &'a [String],
}

/// Reduce the raw landings table to one count per calendar year.
///
/// Order matters: invalid years go first, then the Fell/Found filter,
/// then exact duplicates, then the year window.
pub fn clean_landings(table: &RawTable, options: &FilterOptions) -> Result<CleaningOutcome> {
    let year_col = table.column_index("year");
    let fall_col = table.column_index("fall");

    let mut missing = Vec::new();
    if year_col.is_none() {
        missing.push("year");
    }
    if options.require_fall_kind && fall_col.is_none() {
        missing.push("fall");
    }
    if !missing.is_empty() {
        return Err(EdaError::missing_columns(&missing, &table.headers));
    }
    let year_col = year_col.unwrap_or_default();

    let mut counts = RowCounts {
        original: table.len(),
        ..RowCounts::default()
    };

    let mut rows: Vec<CleanRow> = table
        .rows
        .iter()
        .filter_map(|cells| {
            let year = parse_year(cells.get(year_col).map(String::as_str).unwrap_or(""))?;
            let fall = fall_col
                .and_then(|c| cells.get(c))
                .and_then(|v| FallKind::parse(v));
            Some(CleanRow { year, fall, cells })
        })
        .collect();
    counts.with_valid_year = rows.len();

    if options.require_fall_kind {
        rows.retain(|r| r.fall.is_some());
    }
    counts.after_fall_filter = rows.len();

    let mut seen = std::collections::HashSet::with_capacity(rows.len());
    rows.retain(|r| seen.insert(r.cells));
    counts.after_dedup = rows.len();

    rows.retain(|r| {
        options.min_year.map_or(true, |min| r.year >= min)
            && options.max_year.map_or(true, |max| r.year <= max)
    });
    counts.after_year_window = rows.len();

    let mut per_year: BTreeMap<i32, FallSplit> = BTreeMap::new();
    for row in &rows {
        let entry = per_year.entry(row.year).or_insert(FallSplit {
            year: row.year,
            ..FallSplit::default()
        });
        match row.fall {
            Some(FallKind::Fell) => entry.fell += 1,
            Some(FallKind::Found) => entry.found += 1,
            None => {}
        }
    }

    let mut yearly = Vec::with_capacity(per_year.len());
    let mut year_totals: BTreeMap<i32, u64> = BTreeMap::new();
    for row in &rows {
        *year_totals.entry(row.year).or_insert(0) += 1;
    }
    for (year, total) in year_totals {
        yearly.push(YearCount {
            year,
            num_fell_found: total,
        });
    }

    tracing::info!(
        "Cleaning: {} rows -> {} valid year -> {} fell/found -> {} unique -> {} in window ({} years)",
        counts.original,
        counts.with_valid_year,
        counts.after_fall_filter,
        counts.after_dedup,
        counts.after_year_window,
        yearly.len()
    );

    Ok(CleaningOutcome {
        yearly,
        fall_split: per_year.into_values().collect(),
        rows: counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landings() -> RawTable {
        let rows = [
            ["Aachen", "1", "Fell", "1880-01-01T00:00:00.000"],
            ["Aarhus", "2", "Fell", "1951-01-01T00:00:00.000"],
            ["Abee", "6", "Found", "1951-01-01T00:00:00.000"],
            ["Abee", "6", "Found", "1951-01-01T00:00:00.000"],
            ["Acapulco", "10", "fell ", "1976"],
            ["Achiras", "370", "Unknown", "1902"],
            ["Adhi Kot", "379", "Fell", ""],
            ["Agen", "392", "Found", "2015-01-01T00:00:00.000"],
        ];
        RawTable::new(
            vec!["name".into(), "id".into(), "fall".into(), "year".into()],
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_clean_landings_default_filters() {
        let outcome = clean_landings(&landings(), &FilterOptions::default()).unwrap();

        assert_eq!(outcome.rows.original, 8);
        assert_eq!(outcome.rows.with_valid_year, 7);
        assert_eq!(outcome.rows.after_fall_filter, 6);
        assert_eq!(outcome.rows.after_dedup, 5);
        assert_eq!(outcome.rows.after_year_window, 4);

        let years: Vec<(i32, u64)> = outcome
            .yearly
            .iter()
            .map(|y| (y.year, y.num_fell_found))
            .collect();
        assert_eq!(years, vec![(1880, 1), (1951, 2), (1976, 1)]);

        let split_1951 = outcome.fall_split.iter().find(|s| s.year == 1951).unwrap();
        assert_eq!(split_1951.fell, 1);
        assert_eq!(split_1951.found, 1);
    }

    #[test]
    fn test_clean_landings_year_window_and_all_falls() {
        let options = FilterOptions {
            min_year: Some(1900),
            max_year: Some(2013),
            require_fall_kind: false,
        };
        let outcome = clean_landings(&landings(), &options).unwrap();
        let years: Vec<i32> = outcome.yearly.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![1902, 1951, 1976]);
    }

    #[test]
    fn test_clean_landings_missing_columns() {
        let table = RawTable::new(vec!["name".into(), "id".into()], vec![]);
        let err = clean_landings(&table, &FilterOptions::default()).unwrap_err();
        match err {
            EdaError::MissingColumnError { columns, found } => {
                assert_eq!(columns, vec!["year", "fall"]);
                assert_eq!(found, vec!["name", "id"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
