use crate::analysis::normality::{shapiro_wilk, ShapeMetrics, ShapiroWilk, Transform};
use crate::analysis::stats;
use crate::domain::model::YearCount;
use crate::utils::error::{EdaError, Result};
use serde::Serialize;

pub const FINAL_DATA_FILE: &str = "final_data_tx.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRow {
    pub year: i32,
    pub num_fell_found: u64,
    pub transformed: f64,
}

#[derive(Debug, Clone)]
pub struct FinalDataset {
    pub transform: Transform,
    pub rows: Vec<TransformedRow>,
}

impl FinalDataset {
    pub fn column_name(&self) -> String {
        format!("num_fell_found_{}", self.transform.name())
    }

    pub fn years(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.year as f64).collect()
    }

    pub fn transformed_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.transformed).collect()
    }

    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["year", "num_fell_found", self.column_name().as_str()])?;
        for row in &self.rows {
            writer.write_record([
                row.year.to_string(),
                row.num_fell_found.to_string(),
                row.transformed.to_string(),
            ])?;
        }
        writer
            .into_inner()
            .map_err(|e| EdaError::IoError(e.into_error()))
    }
}

/// Sort by year and append the transformed count. Counts are clipped at 0
/// first, so rows whose transform is undefined at 0 (log-type) are dropped.
pub fn final_transform(rows: &[YearCount], transform: Transform) -> FinalDataset {
    let mut sorted = rows.to_vec();
    sorted.sort_by_key(|r| r.year);

    let rows = sorted
        .into_iter()
        .filter_map(|r| {
            let x = r.num_fell_found as f64;
            let transformed = transform.apply_one(x.max(0.0));
            transformed.is_finite().then_some(TransformedRow {
                year: r.year,
                num_fell_found: r.num_fell_found,
                transformed,
            })
        })
        .collect();

    FinalDataset { transform, rows }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegressionChecks {
    pub n: usize,
    pub y_min: f64,
    pub y_max: f64,
    pub y_mean: f64,
    pub y_std: f64,
    pub year_mean: f64,
    pub intercept: f64,
    pub slope: f64,
    pub r_squared: f64,
    pub shapiro: Option<ShapiroWilk>,
    pub residual_metrics: ShapeMetrics,
    pub durbin_watson: f64,
    pub abs_residual_fitted_corr: f64,
}

impl RegressionChecks {
    /// Summary of `y` only, for inputs with no spread in year.
    fn without_fit(y: &[f64], year_mean: f64) -> Self {
        Self {
            n: y.len(),
            y_min: stats::min(y),
            y_max: stats::max(y),
            y_mean: stats::mean(y),
            y_std: stats::std_dev(y, 1),
            year_mean,
            intercept: f64::NAN,
            slope: f64::NAN,
            r_squared: f64::NAN,
            shapiro: None,
            residual_metrics: ShapeMetrics {
                skew: f64::NAN,
                kurtosis: f64::NAN,
            },
            durbin_watson: f64::NAN,
            abs_residual_fitted_corr: f64::NAN,
        }
    }
}

/// OLS of `y` on centered year plus the usual residual diagnostics.
/// Fewer than two distinct years yields NaN fit statistics instead of an error.
pub fn regression_checks(years: &[f64], y: &[f64]) -> Result<RegressionChecks> {
    if years.len() != y.len() {
        return Err(EdaError::ProcessingError {
            message: format!(
                "regression inputs differ in length ({} vs {})",
                years.len(),
                y.len()
            ),
        });
    }

    let year_mean = stats::mean(years);
    let centered: Vec<f64> = years.iter().map(|t| t - year_mean).collect();
    let Some((slope, intercept)) = stats::linear_fit(&centered, y) else {
        tracing::warn!(
            "Trend fit skipped: {} point(s) spanning fewer than 2 distinct years",
            y.len()
        );
        return Ok(RegressionChecks::without_fit(y, year_mean));
    };

    let fitted: Vec<f64> = centered.iter().map(|t| intercept + slope * t).collect();
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(a, b)| a - b).collect();

    let y_mean = stats::mean(y);
    let ss_tot: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let ss_res: f64 = residuals.iter().map(|e| e * e).sum();
    let r_squared = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        f64::NAN
    };

    let shapiro = match shapiro_wilk(&residuals) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!("Shapiro-Wilk test failed: {}", e);
            None
        }
    };

    let dw_num: f64 = residuals.windows(2).map(|w| (w[1] - w[0]).powi(2)).sum();
    let durbin_watson = if ss_res > 0.0 {
        dw_num / ss_res
    } else {
        f64::NAN
    };

    let abs_residuals: Vec<f64> = residuals.iter().map(|e| e.abs()).collect();

    Ok(RegressionChecks {
        n: y.len(),
        y_min: stats::min(y),
        y_max: stats::max(y),
        y_mean,
        y_std: stats::std_dev(y, 1),
        year_mean,
        intercept,
        slope,
        r_squared,
        shapiro,
        residual_metrics: ShapeMetrics::compute(&residuals),
        durbin_watson,
        abs_residual_fitted_corr: stats::pearson_correlation(&abs_residuals, &fitted),
    })
}
