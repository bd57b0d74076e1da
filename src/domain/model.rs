use crate::utils::error::{EdaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// CSV contents with every cell kept as text; an empty cell means missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive exact header lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EdaError::missing_columns(&[name], &self.headers))
    }

    /// First header (lowercased) accepted by `pred`.
    pub fn find_column<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.headers
            .iter()
            .position(|h| pred(&h.trim().to_lowercase()))
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |r| r.get(column).map(String::as_str).unwrap_or(""))
    }

    /// Keep only `indices`, renaming headers when `new_headers` is given.
    pub fn project(&self, indices: &[usize], new_headers: Option<&[&str]>) -> RawTable {
        let headers = match new_headers {
            Some(names) => names.iter().map(|s| s.to_string()).collect(),
            None => indices
                .iter()
                .map(|&i| self.headers.get(i).cloned().unwrap_or_default())
                .collect(),
        };

        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        RawTable { headers, rows }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FallKind {
    Fell,
    Found,
}

impl FallKind {
    /// Accepts any casing and surrounding whitespace ("  fell " -> Fell).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("fell") {
            Some(FallKind::Fell)
        } else if trimmed.eq_ignore_ascii_case("found") {
            Some(FallKind::Found)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FallKind::Fell => "Fell",
            FallKind::Found => "Found",
        }
    }
}

impl fmt::Display for FallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub num_fell_found: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FallSplit {
    pub year: i32,
    pub fell: u64,
    pub found: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Csv,
    Html,
    Json,
    Text,
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub contents: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, kind: ArtifactKind, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            kind,
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub artifacts: Vec<Artifact>,
    /// Rows that made it through cleaning.
    pub records_processed: usize,
    /// One-line findings echoed to the console after a run.
    pub highlights: Vec<String>,
}

impl AnalysisResult {
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }
}
