//! Plot-ready series for every figure of the analysis. Nothing is rendered
//! here; the JSON is meant for whatever front-end draws the charts.

use crate::analysis::normality::{qq_points, QqPlot};
use crate::analysis::stats;
use crate::analysis::MAX_HISTOGRAM_BINS;
use crate::domain::model::{FallSplit, YearCount};
use crate::domain::ports::HistogramBins;
use serde::Serialize;

pub const CHART_DATA_FILE: &str = "chart_data.json";
pub const LOG_HISTOGRAM_EDGES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `counts.len() + 1` edges; the last bin is closed on the right.
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Bin count for the `auto` rule: the narrower of the Sturges and
/// Freedman-Diaconis widths, Sturges alone when the IQR is 0.
pub fn auto_bin_count(values: &[f64]) -> usize {
    let n = values.len();
    if n == 0 {
        return 1;
    }
    let range = stats::max(values) - stats::min(values);
    if range <= 0.0 {
        return 1;
    }

    let sturges = range / ((n as f64).log2() + 1.0);
    let iqr = stats::percentile(values, 75.0) - stats::percentile(values, 25.0);
    let fd = 2.0 * iqr * (n as f64).powf(-1.0 / 3.0);
    let width = if fd > 0.0 { fd.min(sturges) } else { sturges };

    ((range / width).ceil() as usize).max(1)
}

pub fn histogram(values: &[f64], bins: HistogramBins) -> Histogram {
    let n_bins = match bins {
        HistogramBins::Fixed(n) => n.clamp(1, MAX_HISTOGRAM_BINS),
        HistogramBins::Auto => auto_bin_count(values),
    };

    let (mut lo, mut hi) = if values.is_empty() {
        (0.0, 1.0)
    } else {
        (stats::min(values), stats::max(values))
    };
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let edges = stats::linspace(lo, hi, n_bins + 1);
    let width = (hi - lo) / n_bins as f64;
    let mut counts = vec![0u64; n_bins];
    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(n_bins - 1);
        counts[idx] += 1;
    }

    Histogram { edges, counts }
}

pub fn geomspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    stats::linspace(start.log10(), end.log10(), num)
        .into_iter()
        .map(|e| 10f64.powf(e))
        .collect()
}

/// Histogram over log-spaced edges between the smallest positive value and
/// the maximum. `None` when nothing is positive.
pub fn log_histogram(values: &[f64], num_edges: usize) -> Option<Histogram> {
    let positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
    if positive.is_empty() || num_edges < 2 {
        return None;
    }
    let (lo, hi) = (stats::min(&positive), stats::max(&positive));
    let mut edges = geomspace(lo, hi, num_edges);
    if lo == hi {
        edges = vec![lo * 0.9, hi * 1.1];
    } else {
        // pin the ends so round-off in powf cannot drop min or max
        edges[0] = lo;
        let last = edges.len() - 1;
        edges[last] = hi;
    }

    let n_bins = edges.len() - 1;
    let mut counts = vec![0u64; n_bins];
    for v in positive {
        let idx = edges.partition_point(|e| *e <= v).saturating_sub(1);
        counts[idx.min(n_bins - 1)] += 1;
    }

    Some(Histogram { edges, counts })
}

/// Box-plot geometry with whiskers at the furthest points inside 1.5 IQR.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = stats::sorted(values);
        let q1 = stats::percentile_sorted(&sorted, 25.0);
        let median = stats::percentile_sorted(&sorted, 50.0);
        let q3 = stats::percentile_sorted(&sorted, 75.0);
        let iqr = q3 - q1;
        let (lower, upper) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| *v >= lower && *v <= upper)
            .collect();
        let whisker_low = inside.first().copied().unwrap_or(q1);
        let whisker_high = inside.last().copied().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lower || *v > upper)
            .collect();

        Some(Self {
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scatter {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Scatter {
    pub fn from_years(rows: &[YearCount]) -> Self {
        Self {
            x: rows.iter().map(|r| r.year as f64).collect(),
            y: rows.iter().map(|r| r.num_fell_found as f64).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    pub histogram: Histogram,
    #[serde(rename = "box")]
    pub box_stats: Option<BoxStats>,
    pub qq: QqPlot,
}

impl Distribution {
    pub fn of(values: &[f64], bins: HistogramBins) -> Self {
        Self {
            histogram: histogram(values, bins),
            box_stats: BoxStats::compute(values),
            qq: qq_points(values),
        }
    }
}

/// Inputs for [`ChartData::build`], one field per analysis stage.
pub struct ChartInputs<'a> {
    pub fall_split: &'a [FallSplit],
    pub yearly: &'a [YearCount],
    pub filtered: &'a [YearCount],
    pub transformed: &'a [f64],
    pub transform_name: &'a str,
    pub final_years: &'a [f64],
    pub final_values: &'a [f64],
    pub bins: HistogramBins,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub fall_split: Vec<FallSplit>,
    pub yearly_log_histogram: Option<Histogram>,
    pub yearly_scatter: Scatter,
    pub original: Distribution,
    pub outlier_filtered: Distribution,
    pub filtered_scatter: Scatter,
    pub transform_name: String,
    pub transformed: Distribution,
    pub final_scatter: Scatter,
    #[serde(rename = "final")]
    pub final_distribution: Distribution,
}

impl ChartData {
    pub fn build(inputs: ChartInputs<'_>) -> Self {
        let counts = |rows: &[YearCount]| -> Vec<f64> {
            rows.iter().map(|r| r.num_fell_found as f64).collect()
        };
        let original = counts(inputs.yearly);
        let filtered = counts(inputs.filtered);

        Self {
            fall_split: inputs.fall_split.to_vec(),
            yearly_log_histogram: log_histogram(&original, LOG_HISTOGRAM_EDGES),
            yearly_scatter: Scatter::from_years(inputs.yearly),
            original: Distribution::of(&original, inputs.bins),
            outlier_filtered: Distribution::of(&filtered, inputs.bins),
            filtered_scatter: Scatter::from_years(inputs.filtered),
            transform_name: inputs.transform_name.to_string(),
            transformed: Distribution::of(inputs.transformed, inputs.bins),
            final_scatter: Scatter {
                x: inputs.final_years.to_vec(),
                y: inputs.final_values.to_vec(),
            },
            final_distribution: Distribution::of(inputs.final_values, inputs.bins),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_histogram_closes_last_bin() {
        let h = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], HistogramBins::Fixed(4));
        assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
        assert_eq!(h.total(), 5);
    }

    #[test]
    fn test_fixed_bin_count_is_capped() {
        let hist = histogram(&[1.0, 2.0, 3.0], HistogramBins::Fixed(usize::MAX));
        assert_eq!(hist.counts.len(), MAX_HISTOGRAM_BINS);
        assert_eq!(hist.edges.len(), MAX_HISTOGRAM_BINS + 1);
        assert_eq!(hist.total(), 3);
    }

    #[test]
    fn test_histogram_of_constant_values() {
        let h = histogram(&[7.0, 7.0], HistogramBins::Fixed(2));
        assert_eq!(h.edges, vec![6.5, 7.0, 7.5]);
        assert_eq!(h.counts, vec![0, 2]);
    }

    #[test]
    fn test_auto_bins() {
        // 16 values: Sturges gives range/5, FD gives 2*IQR/16^(1/3)
        let values: Vec<f64> = (1..=16).map(|v| v as f64).collect();
        assert_eq!(auto_bin_count(&values), 5);
        assert_eq!(auto_bin_count(&[3.0, 3.0, 3.0]), 1);
        let h = histogram(&values, HistogramBins::Auto);
        assert_eq!(h.counts.len(), 5);
        assert_eq!(h.total(), 16);
    }

    #[test]
    fn test_log_histogram() {
        let values = [0.0, 1.0, 10.0, 100.0, 1000.0];
        let h = log_histogram(&values, 4).unwrap();
        assert_eq!(h.edges.len(), 4);
        assert!((h.edges[1] - 10.0).abs() < 1e-9);
        assert_eq!(h.counts, vec![1, 1, 2]);
        assert!(log_histogram(&[0.0, -1.0], 20).is_none());
    }

    #[test]
    fn test_box_stats_whiskers_and_outliers() {
        let b = BoxStats::compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 30.0]).unwrap();
        assert_eq!(b.q1, 2.25);
        assert_eq!(b.median, 3.5);
        assert_eq!(b.q3, 4.75);
        assert_eq!(b.whisker_low, 1.0);
        assert_eq!(b.whisker_high, 5.0);
        assert_eq!(b.outliers, vec![30.0]);
        assert_eq!(b.max, 30.0);
        assert!(BoxStats::compute(&[]).is_none());
    }

    #[test]
    fn test_chart_data_serializes_every_series() {
        let yearly: Vec<YearCount> = [(2000, 3), (2001, 5), (2002, 4), (2003, 40)]
            .iter()
            .map(|&(year, n)| YearCount {
                year,
                num_fell_found: n,
            })
            .collect();
        let finals = [3f64.sqrt(), 5f64.sqrt(), 2.0];
        let data = ChartData::build(ChartInputs {
            fall_split: &[],
            yearly: &yearly,
            filtered: &yearly[..3],
            transformed: &finals,
            transform_name: "sqrt",
            final_years: &[2000.0, 2001.0, 2002.0],
            final_values: &finals,
            bins: HistogramBins::Fixed(20),
        });

        let json = serde_json::to_value(&data).unwrap();
        for key in [
            "fall_split",
            "yearly_log_histogram",
            "yearly_scatter",
            "original",
            "outlier_filtered",
            "transformed",
            "final_scatter",
            "final",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert!(json["original"]["box"]["outliers"].is_array());
        assert_eq!(json["final_scatter"]["x"][2], 2002.0);
    }
}
