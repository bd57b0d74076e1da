//! Per-column overview of the raw landings table (Table 1).

use crate::analysis::year::parse_year;
use crate::domain::model::RawTable;
use serde::Serialize;
use std::collections::HashSet;

pub const NO_DESCRIPTION: &str = "No description available.";

const DESCRIPTIONS: [(&str, &str); 10] = [
    ("name", "Name of the meteorite as recorded in the catalog."),
    ("id", "Unique numeric identifier assigned to each meteorite record."),
    (
        "nametype",
        "Indicates valid meteorite names ('Valid') or paired/duplicate names ('Relict').",
    ),
    ("recclass", "Classification based on chemical and petrological type."),
    ("mass (g)", "Reported mass of the meteorite in grams."),
    (
        "fall",
        "Indicates whether the meteorite was 'Fell' (observed fall) or 'Found'.",
    ),
    ("year", "Year the meteorite was found or fell."),
    ("reclat", "Latitude of the recovery site."),
    ("reclong", "Longitude of the recovery site."),
    (
        "GeoLocation",
        "Coordinate pair representing the recovery location (latitude, longitude).",
    ),
];

pub fn describe(column: &str) -> &'static str {
    DESCRIPTIONS
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, d)| *d)
        .unwrap_or(NO_DESCRIPTION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDtype {
    Int64,
    Float64,
    Datetime,
    Object,
}

impl ColumnDtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnDtype::Int64 => "int64",
            ColumnDtype::Float64 => "float64",
            ColumnDtype::Datetime => "datetime",
            ColumnDtype::Object => "object",
        }
    }

    pub fn is_numerical(&self) -> bool {
        !matches!(self, ColumnDtype::Object)
    }

    pub fn kind(&self) -> &'static str {
        if self.is_numerical() {
            "Numerical"
        } else {
            "Categorical"
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: ColumnDtype,
    pub unique: usize,
    pub pct_missing: f64,
    pub description: &'static str,
}

pub fn profile_columns(table: &RawTable) -> Vec<ColumnProfile> {
    table
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| profile_column(table, idx, name))
        .collect()
}

fn profile_column(table: &RawTable, idx: usize, name: &str) -> ColumnProfile {
    let values: Vec<&str> = table
        .column_values(idx)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();

    // Year strings that cannot be read as a date count as missing.
    let (dtype, present) = if name == "year" && looks_like_timestamps(&values) {
        let parsed: Vec<&str> = values
            .iter()
            .copied()
            .filter(|v| parse_year(v).is_some())
            .collect();
        (ColumnDtype::Datetime, parsed)
    } else {
        (infer_dtype(&values, values.len() < table.len()), values)
    };

    let unique = present.iter().collect::<HashSet<_>>().len();
    let pct_missing = if table.is_empty() {
        0.0
    } else {
        (table.len() - present.len()) as f64 / table.len() as f64 * 100.0
    };

    ColumnProfile {
        name: name.to_string(),
        dtype,
        unique,
        pct_missing,
        description: describe(name),
    }
}

fn looks_like_timestamps(values: &[&str]) -> bool {
    !values.is_empty()
        && values
            .iter()
            .any(|v| parse_year(v).is_some() && (v.contains('-') || v.contains('/')))
}

/// Integer columns with gaps widen to float64, the way a dataframe stores NaN.
fn infer_dtype(values: &[&str], has_missing: bool) -> ColumnDtype {
    if values.is_empty() {
        return ColumnDtype::Float64;
    }
    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        if has_missing {
            ColumnDtype::Float64
        } else {
            ColumnDtype::Int64
        }
    } else if values.iter().all(|v| v.parse::<f64>().is_ok()) {
        ColumnDtype::Float64
    } else {
        ColumnDtype::Object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landings() -> RawTable {
        let headers = ["name", "id", "mass (g)", "fall", "year", "comment"];
        let rows = [
            ["Aachen", "1", "21", "Fell", "1880-01-01T00:00:00.000", "x"],
            ["Aarhus", "2", "720", "Fell", "1951-01-01T00:00:00.000", ""],
            ["Abee", "6", "", "Found", "", "y"],
            ["Acapulco", "10", "1914.5", "Found", "1976-01-01T00:00:00.000", "x"],
        ];
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_profile_infers_dtypes() {
        let profile = profile_columns(&landings());
        let dtypes: Vec<&str> = profile.iter().map(|p| p.dtype.as_str()).collect();
        assert_eq!(
            dtypes,
            vec!["object", "int64", "float64", "object", "datetime", "object"]
        );
        assert_eq!(profile[3].dtype.kind(), "Categorical");
        assert_eq!(profile[4].dtype.kind(), "Numerical");
    }

    #[test]
    fn test_profile_counts_unique_and_missing() {
        let profile = profile_columns(&landings());
        assert_eq!(profile[3].unique, 2);
        assert_eq!(profile[2].pct_missing, 25.0);
        assert_eq!(profile[4].pct_missing, 25.0);
        assert_eq!(profile[5].unique, 2);
        assert_eq!(profile[0].pct_missing, 0.0);
    }

    #[test]
    fn test_descriptions() {
        let profile = profile_columns(&landings());
        assert_eq!(profile[2].description, "Reported mass of the meteorite in grams.");
        assert_eq!(profile[5].description, NO_DESCRIPTION);
        assert_eq!(describe("GeoLocation"), DESCRIPTIONS[9].1);
    }

    #[test]
    fn test_integer_column_with_gap_is_float() {
        assert_eq!(infer_dtype(&["1", "2"], true), ColumnDtype::Float64);
        assert_eq!(infer_dtype(&["1", "2"], false), ColumnDtype::Int64);
        assert_eq!(infer_dtype(&["1", "a"], false), ColumnDtype::Object);
    }
}
