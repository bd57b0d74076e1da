//! Descriptive statistics over `f64` samples.
//!
//! Percentiles interpolate linearly between closest ranks. Kurtosis is
//! Pearson (Normal = 3). The "unbiased" shape estimators are the G1/G2
//! sample adjustments.

use crate::utils::error::{EdaError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Variance with `ddof` delta degrees of freedom; NaN when `n <= ddof`.
pub fn variance(values: &[f64], ddof: usize) -> f64 {
    let n = values.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    ss / (n - ddof) as f64
}

pub fn std_dev(values: &[f64], ddof: usize) -> f64 {
    variance(values, ddof).sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// `p` in [0, 100] over an already sorted slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn percentile(values: &[f64], p: f64) -> f64 {
    percentile_sorted(&sorted(values), p)
}

pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

/// Every count tied for the highest frequency (ascending) and that frequency.
pub fn modes(values: &[u64]) -> (Vec<u64>, usize) {
    let freq = count_frequency(values);
    let top = freq.values().copied().max().unwrap_or(0);
    let modes = freq
        .into_iter()
        .filter(|&(_, f)| f == top)
        .map(|(k, _)| k)
        .collect();
    (modes, top)
}

/// k -> number of samples equal to k, sorted by k.
pub fn count_frequency(values: &[u64]) -> BTreeMap<u64, usize> {
    let mut freq = BTreeMap::new();
    for &v in values {
        *freq.entry(v).or_insert(0) += 1;
    }
    freq
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TukeyFence {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    pub multiplier: f64,
}

impl TukeyFence {
    pub fn from_values(values: &[f64], multiplier: f64) -> Result<Self> {
        if values.is_empty() {
            return Err(EdaError::insufficient("Tukey fence", "no values"));
        }
        let s = sorted(values);
        let q1 = percentile_sorted(&s, 25.0);
        let q3 = percentile_sorted(&s, 75.0);
        let iqr = q3 - q1;
        Ok(Self {
            q1,
            q3,
            iqr,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
            multiplier,
        })
    }

    /// Inclusive on both bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub n: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub pct_within_iqr: f64,
    pub tukey_outliers: usize,
}

impl SummaryStats {
    pub fn compute(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(EdaError::insufficient("summary statistics", "no values"));
        }
        let s = sorted(values);
        let fence = TukeyFence::from_values(&s, 1.5)?;
        let within = s.iter().filter(|&&v| v >= fence.q1 && v <= fence.q3).count();

        Ok(Self {
            n: s.len(),
            mean: mean(&s),
            std: std_dev(&s, 1),
            min: s[0],
            q1: fence.q1,
            median: percentile_sorted(&s, 50.0),
            q3: fence.q3,
            max: s[s.len() - 1],
            pct_within_iqr: within as f64 / s.len() as f64 * 100.0,
            tukey_outliers: s.iter().filter(|&&v| !fence.contains(v)).count(),
        })
    }
}

fn central_moment(values: &[f64], m: f64, order: i32) -> f64 {
    values.iter().map(|v| (v - m).powi(order)).sum::<f64>() / values.len() as f64
}

fn is_degenerate(m2: f64, m: f64) -> bool {
    m2 <= (f64::EPSILON * m).powi(2)
}

/// Sample skewness; `bias = false` applies the G1 adjustment.
pub fn skewness(values: &[f64], bias: bool) -> f64 {
    let n = values.len();
    if n == 0 || (!bias && n < 3) {
        return f64::NAN;
    }
    let m = mean(values);
    let m2 = central_moment(values, m, 2);
    if is_degenerate(m2, m) {
        return f64::NAN;
    }
    let g1 = central_moment(values, m, 3) / m2.powf(1.5);
    if bias {
        g1
    } else {
        let n = n as f64;
        g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
    }
}

/// Pearson kurtosis (Normal = 3); `bias = false` applies the G2 adjustment.
pub fn kurtosis_pearson(values: &[f64], bias: bool) -> f64 {
    let n = values.len();
    if n == 0 || (!bias && n < 4) {
        return f64::NAN;
    }
    let m = mean(values);
    let m2 = central_moment(values, m, 2);
    if is_degenerate(m2, m) {
        return f64::NAN;
    }
    let ratio = central_moment(values, m, 4) / (m2 * m2);
    if bias {
        ratio
    } else {
        let n = n as f64;
        let excess =
            ((n * n - 1.0) * ratio - 3.0 * (n - 1.0).powi(2)) / ((n - 2.0) * (n - 3.0));
        excess + 3.0
    }
}

pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let (mx, my) = (mean(x), mean(y));
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    sxy / (sxx * syy).sqrt()
}

/// Least-squares line `y = slope * x + intercept`.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let (mx, my) = (mean(x), mean(y));
    let sxx: f64 = x.iter().map(|a| (a - mx).powi(2)).sum();
    if sxx <= 0.0 {
        return None;
    }
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    let slope = sxy / sxx;
    Some((slope, my - slope * mx))
}

pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Complementary error function, fractional error below 1.2e-7.
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.26551223
        + t * (1.00002368
            + t * (0.37409196
                + t * (0.09678418
                    + t * (-0.18628806
                        + t * (0.27886807
                            + t * (-1.13520398
                                + t * (1.48851587 + t * (-0.82215223 + t * 0.17087277))))))));
    let ans = t * poly.exp();
    if x >= 0.0 {
        ans
    } else {
        2.0 - ans
    }
}

pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard Normal quantile (Acklam's rational approximation).
pub fn normal_ppf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    }
}
