use crate::analysis::stats::TukeyFence;
use crate::domain::model::YearCount;
use crate::utils::error::Result;
use serde::Serialize;

pub const OUTLIER_FILE: &str = "outlier_filtered.csv";

#[derive(Debug, Clone, Serialize)]
pub struct OutlierOutcome {
    pub kept: Vec<YearCount>,
    pub removed: Vec<YearCount>,
    pub fence: TukeyFence,
}

impl OutlierOutcome {
    pub fn original_rows(&self) -> usize {
        self.kept.len() + self.removed.len()
    }
}

/// Tukey filter on `num_fell_found`; rows on a fence are kept.
pub fn remove_outliers(rows: &[YearCount], multiplier: f64) -> Result<OutlierOutcome> {
    let values: Vec<f64> = rows.iter().map(|r| r.num_fell_found as f64).collect();
    let fence = TukeyFence::from_values(&values, multiplier)?;

    let (kept, removed): (Vec<YearCount>, Vec<YearCount>) = rows
        .iter()
        .copied()
        .partition(|r| fence.contains(r.num_fell_found as f64));

    tracing::info!(
        "Tukey {}xIQR filter: bounds [{:.4}, {:.4}], kept {} of {} years",
        multiplier,
        fence.lower,
        fence.upper,
        kept.len(),
        rows.len()
    );
    if !removed.is_empty() {
        tracing::debug!(
            "Removed years: {:?}",
            removed.iter().map(|r| r.year).collect::<Vec<_>>()
        );
    }

    Ok(OutlierOutcome {
        kept,
        removed,
        fence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_outliers_keeps_order_and_fence_values() {
        let rows: Vec<YearCount> = [(1990, 10), (1991, 12), (1992, 11), (1993, 13), (1994, 400)]
            .iter()
            .map(|&(year, n)| YearCount {
                year,
                num_fell_found: n,
            })
            .collect();

        let outcome = remove_outliers(&rows, 1.5).unwrap();
        assert_eq!(outcome.original_rows(), 5);
        assert_eq!(
            outcome.kept.iter().map(|r| r.year).collect::<Vec<_>>(),
            vec![1990, 1991, 1992, 1993]
        );
        assert_eq!(outcome.removed[0].year, 1994);
        assert_eq!(outcome.fence.q1, 11.0);
        assert_eq!(outcome.fence.q3, 13.0);
    }

    #[test]
    fn test_remove_outliers_empty_input() {
        assert!(remove_outliers(&[], 1.5).is_err());
    }
}
