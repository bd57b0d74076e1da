pub mod charts;
pub mod cleaning;
pub mod frequency;
pub mod normality;
pub mod outliers;
pub mod profile;
pub mod projection;
pub mod regression;
pub mod stats;
pub mod year;

use crate::domain::model::{RawTable, YearCount};
use crate::domain::ports::{ConfigProvider, FilterOptions, HistogramBins};
use crate::utils::error::{EdaError, Result};
use charts::{ChartData, ChartInputs};
use cleaning::CleaningOutcome;
use frequency::FrequencyReport;
use normality::{NormalityReport, Transform};
use outliers::OutlierOutcome;
use profile::ColumnProfile;
use regression::{FinalDataset, RegressionChecks};
use stats::SummaryStats;

pub const YEARLY_COUNTS_FILE: &str = "yearly_counts.csv";
pub const RECOMMENDED: &str = "recommended";
pub const MAX_HISTOGRAM_BINS: usize = 10_000;
pub const MAX_KDE_GRID_SIZE: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub filter: FilterOptions,
    pub iqr_multiplier: f64,
    pub kde_grid_size: usize,
    pub histogram_bins: HistogramBins,
    /// A transform name or `"recommended"`.
    pub final_transform: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            filter: FilterOptions::default(),
            iqr_multiplier: 1.5,
            kde_grid_size: 512,
            histogram_bins: HistogramBins::Fixed(20),
            final_transform: "sqrt".to_string(),
        }
    }
}

impl AnalysisSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            filter: config.filter_options(),
            iqr_multiplier: config.iqr_multiplier(),
            kde_grid_size: config.kde_grid_size(),
            histogram_bins: config.histogram_bins(),
            final_transform: config.final_transform().to_string(),
        }
    }
}

/// Every intermediate result of one run, in stage order.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub profile: Vec<ColumnProfile>,
    pub cleaning: CleaningOutcome,
    pub summary: SummaryStats,
    pub frequency: FrequencyReport,
    pub outliers: OutlierOutcome,
    pub normality: NormalityReport,
    pub final_data: FinalDataset,
    pub regression: RegressionChecks,
    pub charts: ChartData,
}

fn count_values(rows: &[YearCount]) -> Vec<f64> {
    rows.iter().map(|r| r.num_fell_found as f64).collect()
}

/// Resolve the configured final transform against the outlier-filtered counts.
pub fn resolve_final_transform(
    name: &str,
    values: &[f64],
    recommended: Transform,
) -> Result<Transform> {
    if name.trim().eq_ignore_ascii_case(RECOMMENDED) {
        return Ok(recommended);
    }
    if let Some(transform) = Transform::from_name(name, values) {
        return Ok(transform);
    }
    if name.trim().eq_ignore_ascii_case("boxcox") {
        tracing::warn!("Box-Cox lambda could not be fitted; falling back to sqrt");
        return Ok(Transform::Sqrt);
    }
    Err(EdaError::InvalidConfigValueError {
        field: "final_transform".to_string(),
        value: name.to_string(),
        reason: format!(
            "expected one of {} or {}",
            Transform::NAMES.join(", "),
            RECOMMENDED
        ),
    })
}

pub fn run_analysis(table: &RawTable, settings: &AnalysisSettings) -> Result<Analysis> {
    let profile = profile::profile_columns(table);

    let cleaning = cleaning::clean_landings(table, &settings.filter)?;
    if cleaning.yearly.is_empty() {
        return Err(EdaError::insufficient(
            "cleaning",
            "no rows left after year and fall filtering",
        ));
    }
    let yearly_values = count_values(&cleaning.yearly);
    let summary = SummaryStats::compute(&yearly_values)?;
    let frequency = FrequencyReport::compute(&cleaning.yearly, settings.iqr_multiplier)?;

    let outliers = outliers::remove_outliers(&cleaning.yearly, settings.iqr_multiplier)?;
    let filtered_values = count_values(&outliers.kept);
    let normality = NormalityReport::compute(&filtered_values, settings.kde_grid_size)?;
    tracing::info!(
        "Recommended transform: {} (score {:.4})",
        normality.recommended,
        normality.best_score
    );

    let transform = resolve_final_transform(
        &settings.final_transform,
        &filtered_values,
        normality.recommended,
    )?;
    let final_data = regression::final_transform(&outliers.kept, transform);
    let final_years = final_data.years();
    let final_values = final_data.transformed_values();
    let regression = regression::regression_checks(&final_years, &final_values)?;

    let charts = ChartData::build(ChartInputs {
        fall_split: &cleaning.fall_split,
        yearly: &cleaning.yearly,
        filtered: &outliers.kept,
        transformed: &normality.transformed,
        transform_name: normality.recommended.name(),
        final_years: &final_years,
        final_values: &final_values,
        bins: settings.histogram_bins,
    });

    Ok(Analysis {
        profile,
        cleaning,
        summary,
        frequency,
        outliers,
        normality,
        final_data,
        regression,
        charts,
    })
}
