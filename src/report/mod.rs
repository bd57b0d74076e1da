//! Turns an [`Analysis`] into the files a run leaves behind.

pub mod html;
pub mod text;

use crate::analysis::charts::CHART_DATA_FILE;
use crate::analysis::cleaning::RowCounts;
use crate::analysis::frequency::FrequencyReport;
use crate::analysis::normality::{NormalityReport, Transform};
use crate::analysis::outliers::OUTLIER_FILE;
use crate::analysis::profile::ColumnProfile;
use crate::analysis::regression::{RegressionChecks, FINAL_DATA_FILE};
use crate::analysis::stats::{SummaryStats, TukeyFence};
use crate::analysis::{Analysis, YEARLY_COUNTS_FILE};
use crate::core::csv_io;
use crate::domain::model::{Artifact, ArtifactKind, YearCount};
use crate::utils::error::Result;
use chrono::Utc;
use serde::Serialize;

pub const REPORT_JSON_FILE: &str = "analysis_report.json";
pub const REPORT_TEXT_FILE: &str = "analysis_report.txt";
pub const PROFILE_TABLE_FILE: &str = "EDA_table_1.html";
pub const SUMMARY_TABLE_FILE: &str = "EDA_phase2_table.html";
pub const TRANSFORM_TABLE_FILE: &str = "transform_table.html";

#[derive(Debug, Clone, Serialize)]
pub struct OutlierSummary {
    pub fence: TukeyFence,
    pub original_rows: usize,
    pub kept_rows: usize,
    pub removed: Vec<YearCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a> {
    pub generated_at: String,
    pub source: &'a str,
    pub rows: RowCounts,
    pub profile: &'a [ColumnProfile],
    pub summary: &'a SummaryStats,
    pub frequency: &'a FrequencyReport,
    pub outliers: OutlierSummary,
    pub normality: &'a NormalityReport,
    pub final_transform: Transform,
    pub regression: &'a RegressionChecks,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(analysis: &'a Analysis, source: &'a str) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            source,
            rows: analysis.cleaning.rows,
            profile: &analysis.profile,
            summary: &analysis.summary,
            frequency: &analysis.frequency,
            outliers: OutlierSummary {
                fence: analysis.outliers.fence,
                original_rows: analysis.outliers.original_rows(),
                kept_rows: analysis.outliers.kept.len(),
                removed: analysis.outliers.removed.clone(),
            },
            normality: &analysis.normality,
            final_transform: analysis.final_data.transform,
            regression: &analysis.regression,
        }
    }
}

/// Render every output file of a run, CSVs first.
pub fn render_artifacts(analysis: &Analysis, source: &str) -> Result<Vec<Artifact>> {
    let report = AnalysisReport::new(analysis, source);

    let artifacts = vec![
        Artifact::new(
            YEARLY_COUNTS_FILE,
            ArtifactKind::Csv,
            csv_io::write_records(&analysis.cleaning.yearly)?,
        ),
        Artifact::new(
            OUTLIER_FILE,
            ArtifactKind::Csv,
            csv_io::write_records(&analysis.outliers.kept)?,
        ),
        Artifact::new(
            FINAL_DATA_FILE,
            ArtifactKind::Csv,
            analysis.final_data.to_csv()?,
        ),
        Artifact::new(
            PROFILE_TABLE_FILE,
            ArtifactKind::Html,
            html::profile_table(&analysis.profile),
        ),
        Artifact::new(
            SUMMARY_TABLE_FILE,
            ArtifactKind::Html,
            html::summary_table(&analysis.summary),
        ),
        Artifact::new(
            TRANSFORM_TABLE_FILE,
            ArtifactKind::Html,
            html::transform_table(&analysis.normality),
        ),
        Artifact::new(
            CHART_DATA_FILE,
            ArtifactKind::Json,
            serde_json::to_vec_pretty(&analysis.charts)?,
        ),
        Artifact::new(
            REPORT_JSON_FILE,
            ArtifactKind::Json,
            serde_json::to_vec_pretty(&report)?,
        ),
        Artifact::new(REPORT_TEXT_FILE, ArtifactKind::Text, text::render(analysis)),
    ];

    tracing::debug!("Rendered {} artifacts", artifacts.len());
    Ok(artifacts)
}

/// Short findings echoed after a run.
pub fn highlights(analysis: &Analysis) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} distinct years, {} kept after the Tukey filter",
            analysis.cleaning.distinct_years(),
            analysis.outliers.kept.len()
        ),
        format!(
            "Recommended transform: {} (score {:.4} vs {:.4} original)",
            analysis.normality.recommended,
            analysis.normality.best_score,
            analysis.normality.original_score
        ),
        format!(
            "Trend on {}: slope {:.6} per year, R^2 {:.4}",
            analysis.final_data.transform.name(),
            analysis.regression.slope,
            analysis.regression.r_squared
        ),
    ];
    if let Some(sw) = analysis.regression.shapiro {
        lines.push(format!(
            "Residual Shapiro-Wilk W {:.4} (p = {})",
            sw.w,
            format_general(sw.p_value, 4)
        ));
    }
    lines
}

/// `1234567.891` -> `"1,234,567.89"` for `decimals = 2`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Roughly printf's `%.Ng`: scientific notation for very small or large values.
pub fn format_general(value: f64, significant: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let exponent = value.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= significant as i32 {
        format!("{:.*e}", significant.saturating_sub(1), value)
    } else {
        let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
        let fixed = format!("{:.*}", decimals, value);
        if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            fixed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_thousands(999.0, 0), "999");
        assert_eq!(format_thousands(1000.0, 0), "1,000");
        assert_eq!(format_thousands(-45210.5, 2), "-45,210.50");
        assert_eq!(format_thousands(-0.001, 2), "0.00");
        assert_eq!(format_thousands(56.25, 2), "56.25");
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(0.04567, 4), "0.04567");
        assert_eq!(format_general(0.5, 4), "0.5");
        assert_eq!(format_general(1.234e-7, 4), "1.234e-7");
        assert_eq!(format_general(12.0, 4), "12");
    }
}
