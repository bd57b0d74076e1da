use crate::analysis::stats::{self, TukeyFence};
use crate::domain::model::YearCount;
use crate::utils::error::{EdaError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkewLevel {
    NearlySymmetric,
    Moderate,
    Strong,
}

impl SkewLevel {
    pub fn classify(skew: f64) -> Self {
        let s = skew.abs();
        if s < 0.5 {
            SkewLevel::NearlySymmetric
        } else if s < 1.0 {
            SkewLevel::Moderate
        } else {
            SkewLevel::Strong
        }
    }

    pub fn recommends_log(&self) -> bool {
        !matches!(self, SkewLevel::NearlySymmetric)
    }

    pub fn comment(&self) -> &'static str {
        match self {
            SkewLevel::NearlySymmetric => "Nearly symmetric, transform not really needed.",
            SkewLevel::Moderate => "Moderately skewed, log transform could help.",
            SkewLevel::Strong => "Strongly skewed, log transform recommended.",
        }
    }
}

/// Exploration of the per-year counts: how many years saw k landings,
/// population moments, a Tukey trim and the log1p skew check.
#[derive(Debug, Clone, Serialize)]
pub struct FrequencyReport {
    pub count_frequency: BTreeMap<u64, usize>,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std: f64,
    pub modes: Vec<u64>,
    pub mode_frequency: usize,
    pub fence: TukeyFence,
    pub years_kept: usize,
    pub years_total: usize,
    pub trimmed_frequency: BTreeMap<u64, usize>,
    pub trimmed_skew: f64,
    pub skew_level: SkewLevel,
    pub log1p_skew: f64,
}

impl FrequencyReport {
    pub fn compute(yearly: &[YearCount], multiplier: f64) -> Result<Self> {
        if yearly.is_empty() {
            return Err(EdaError::insufficient(
                "frequency report",
                "no yearly counts after cleaning",
            ));
        }

        let counts: Vec<u64> = yearly.iter().map(|y| y.num_fell_found).collect();
        let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
        let (modes, mode_frequency) = stats::modes(&counts);

        let fence = TukeyFence::from_values(&values, multiplier)?;
        let trimmed: Vec<u64> = counts
            .iter()
            .copied()
            .filter(|&c| fence.contains(c as f64))
            .collect();
        let trimmed_values: Vec<f64> = trimmed.iter().map(|&c| c as f64).collect();

        let trimmed_skew = zero_if_nan(stats::skewness(&trimmed_values, true));
        let log_values: Vec<f64> = trimmed_values.iter().map(|v| v.ln_1p()).collect();
        let log1p_skew = zero_if_nan(stats::skewness(&log_values, true));

        Ok(Self {
            count_frequency: stats::count_frequency(&counts),
            mean: stats::mean(&values),
            median: stats::median(&values),
            variance: stats::variance(&values, 0),
            std: stats::std_dev(&values, 0),
            modes,
            mode_frequency,
            fence,
            years_kept: trimmed.len(),
            years_total: counts.len(),
            trimmed_frequency: stats::count_frequency(&trimmed),
            trimmed_skew,
            skew_level: SkewLevel::classify(trimmed_skew),
            log1p_skew,
        })
    }
}

// A flat series has no skew to speak of; report it as 0 rather than NaN.
fn zero_if_nan(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yearly(counts: &[u64]) -> Vec<YearCount> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &c)| YearCount {
                year: 1900 + i as i32,
                num_fell_found: c,
            })
            .collect()
    }

    #[test]
    fn test_frequency_report_trims_extreme_year() {
        let report = FrequencyReport::compute(&yearly(&[1, 2, 2, 3, 3, 3, 4, 250]), 1.5).unwrap();
        assert_eq!(report.years_total, 8);
        assert_eq!(report.years_kept, 7);
        assert_eq!(report.modes, vec![3]);
        assert_eq!(report.mode_frequency, 3);
        assert_eq!(report.count_frequency.get(&2), Some(&2));
        assert!(!report.trimmed_frequency.contains_key(&250));
        // the trimmed counts lean left; log1p stretches that tail further
        assert!(report.trimmed_skew < 0.0);
        assert!(report.log1p_skew < report.trimmed_skew);
    }

    #[test]
    fn test_flat_counts_have_zero_skew() {
        let report = FrequencyReport::compute(&yearly(&[5, 5, 5, 5]), 1.5).unwrap();
        assert_eq!(report.trimmed_skew, 0.0);
        assert_eq!(report.skew_level, SkewLevel::NearlySymmetric);
        assert!(!report.skew_level.recommends_log());
        assert_eq!(report.variance, 0.0);
    }

    #[test]
    fn test_skew_level_thresholds() {
        assert_eq!(SkewLevel::classify(0.49), SkewLevel::NearlySymmetric);
        assert_eq!(SkewLevel::classify(-0.7), SkewLevel::Moderate);
        assert_eq!(SkewLevel::classify(1.0), SkewLevel::Strong);
        assert!(SkewLevel::Strong.recommends_log());
    }

    #[test]
    fn test_empty_counts_error() {
        assert!(FrequencyReport::compute(&[], 1.5).is_err());
    }
}
