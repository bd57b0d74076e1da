//! How far the yearly counts are from Normal, and which monotone transform
//! brings them closest.

use crate::analysis::stats::{self, linear_fit, normal_cdf, normal_ppf, pearson_correlation};
use crate::analysis::MAX_KDE_GRID_SIZE;
use crate::utils::error::{EdaError, Result};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapeMetrics {
    pub skew: f64,
    /// Pearson kurtosis, Normal = 3.
    pub kurtosis: f64,
}

impl ShapeMetrics {
    pub fn compute(values: &[f64]) -> Self {
        Self {
            skew: stats::skewness(values, false),
            kurtosis: stats::kurtosis_pearson(values, false),
        }
    }

    /// `|skew| + |kurtosis - 3|`; non-finite results rank last.
    pub fn score(&self) -> f64 {
        let s = self.skew.abs() + (self.kurtosis - 3.0).abs();
        if s.is_finite() {
            s
        } else {
            f64::INFINITY
        }
    }
}

pub fn interpret_skew(skew: f64) -> &'static str {
    if skew.abs() < 0.5 {
        "approximately symmetric"
    } else if (0.5..1.0).contains(&skew) {
        "moderately right-skewed"
    } else if skew >= 1.0 {
        "strongly right-skewed (heavy right tail)"
    } else if skew > -1.0 {
        "moderately left-skewed"
    } else {
        "strongly left-skewed (heavy left tail)"
    }
}

pub fn interpret_kurtosis(kurtosis: f64) -> &'static str {
    if (kurtosis - 3.0).abs() < 0.3 {
        "close to mesokurtic (similar tails to Normal)"
    } else if kurtosis > 3.0 {
        "leptokurtic (heavier tails, more extreme values)"
    } else {
        "platykurtic (lighter tails, fewer extremes)"
    }
}

pub fn interpret_modes(mode_count: usize) -> String {
    match mode_count {
        0 | 1 => "approximately unimodal (single main peak)".to_string(),
        2 => "likely bimodal (two prominent peaks)".to_string(),
        n => format!("multimodal (about {} peaks detected)", n),
    }
}

/// Peaks of a Gaussian KDE (Scott's bandwidth) sampled on `grid_size`
/// evenly spaced points between min and max.
pub fn estimate_mode_count(values: &[f64], grid_size: usize) -> usize {
    let n = values.len();
    let spread = stats::std_dev(values, 1);
    if n < 2 || !(spread > 0.0) {
        return 1;
    }

    let bandwidth = spread * (n as f64).powf(-0.2);
    let grid = stats::linspace(
        stats::min(values),
        stats::max(values),
        grid_size.min(MAX_KDE_GRID_SIZE),
    );
    let density: Vec<f64> = grid
        .iter()
        .map(|g| {
            values
                .iter()
                .map(|x| (-0.5 * ((g - x) / bandwidth).powi(2)).exp())
                .sum()
        })
        .collect();

    density
        .windows(3)
        .filter(|w| w[1] > w[0] && w[1] > w[2])
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Transform {
    Identity,
    Log1p,
    Sqrt,
    CubeRoot,
    BoxCox { lambda: f64 },
}

impl Transform {
    pub const NAMES: [&'static str; 5] = ["identity", "log1p", "sqrt", "cuberoot", "boxcox"];

    pub fn name(&self) -> &'static str {
        match self {
            Transform::Identity => "identity",
            Transform::Log1p => "log1p",
            Transform::Sqrt => "sqrt",
            Transform::CubeRoot => "cuberoot",
            Transform::BoxCox { .. } => "boxcox",
        }
    }

    /// Box-Cox needs the data to fit lambda, so resolution takes the values.
    pub fn from_name(name: &str, values: &[f64]) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "identity" => Some(Transform::Identity),
            "log1p" => Some(Transform::Log1p),
            "sqrt" => Some(Transform::Sqrt),
            "cuberoot" | "cbrt" => Some(Transform::CubeRoot),
            "boxcox" => {
                let positive: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
                boxcox_mle(&positive).map(|lambda| Transform::BoxCox { lambda })
            }
            _ => None,
        }
    }

    pub fn apply_one(&self, x: f64) -> f64 {
        match self {
            Transform::Identity => x,
            Transform::Log1p => x.ln_1p(),
            Transform::Sqrt => x.sqrt(),
            Transform::CubeRoot => x.cbrt(),
            Transform::BoxCox { lambda } => boxcox(x, *lambda),
        }
    }

    /// Everything but identity drops non-positive values first.
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        match self {
            Transform::Identity => values.to_vec(),
            _ => values
                .iter()
                .filter(|v| **v > 0.0)
                .map(|&v| self.apply_one(v))
                .collect(),
        }
    }

    pub fn note(&self) -> &'static str {
        match self {
            Transform::Identity => "Original shape, no transform applied.",
            Transform::Log1p => "Strong skew reduction; compresses the right tail hardest.",
            Transform::Sqrt => "Gentle variance-stabilizing transform for count data.",
            Transform::CubeRoot => "Reduces skew while preserving more spread than log.",
            Transform::BoxCox { .. } => "Power transform with lambda fitted by maximum likelihood.",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Transform::Identity => {
                "The outlier-filtered data are already relatively close to Normal by this metric."
            }
            Transform::Log1p => {
                "A log1p transform is especially common for right-skewed count data with heavy tails."
            }
            Transform::Sqrt => {
                "A square-root transform is a gentler alternative for count data with moderate skew."
            }
            Transform::CubeRoot => {
                "A cube-root transform can help with strong skew while preserving spread more than log."
            }
            Transform::BoxCox { .. } => {
                "Box-Cox can be tuned (via lambda) to pull both skewness and kurtosis toward Normal."
            }
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::BoxCox { lambda } => write!(f, "boxcox(lambda={:.3})", lambda),
            other => f.write_str(other.name()),
        }
    }
}

pub fn boxcox(x: f64, lambda: f64) -> f64 {
    if lambda.abs() < 1e-12 {
        x.ln()
    } else {
        (x.powf(lambda) - 1.0) / lambda
    }
}

/// Profile log-likelihood of the Box-Cox model at `lambda`.
pub fn boxcox_llf(values: &[f64], lambda: f64) -> f64 {
    let n = values.len() as f64;
    let log_sum: f64 = values.iter().map(|x| x.ln()).sum();
    let transformed: Vec<f64> = values.iter().map(|&x| boxcox(x, lambda)).collect();
    let var = stats::variance(&transformed, 0);
    if !(var > 0.0) {
        return f64::NAN;
    }
    (lambda - 1.0) * log_sum - n / 2.0 * var.ln()
}

/// Maximum-likelihood lambda on [-5, 5]; `None` for empty, non-positive
/// or constant data.
pub fn boxcox_mle(values: &[f64]) -> Option<f64> {
    if values.len() < 2 || values.iter().any(|v| *v <= 0.0) {
        return None;
    }
    if !(stats::variance(values, 0) > 0.0) {
        return None;
    }

    let f = |lambda: f64| boxcox_llf(values, lambda);
    let ratio = (5f64.sqrt() - 1.0) / 2.0;
    let (mut a, mut b) = (-5.0_f64, 5.0_f64);
    let mut c = b - ratio * (b - a);
    let mut d = a + ratio * (b - a);
    let (mut fc, mut fd) = (f(c), f(d));

    for _ in 0..200 {
        if (b - a).abs() < 1e-9 {
            break;
        }
        if fc > fd {
            b = d;
            d = c;
            fd = fc;
            c = b - ratio * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + ratio * (b - a);
            fd = f(d);
        }
    }

    let lambda = (a + b) / 2.0;
    lambda.is_finite().then_some(lambda)
}

#[derive(Debug, Clone, Serialize)]
pub struct TransformCandidate {
    pub transform: Transform,
    pub metrics: ShapeMetrics,
    pub score: f64,
}

/// Score every candidate transform, best (lowest score) first.
pub fn evaluate_transforms(values: &[f64]) -> Vec<TransformCandidate> {
    let mut transforms = vec![Transform::Identity];
    if values.iter().any(|v| *v > 0.0) {
        transforms.extend([Transform::Log1p, Transform::Sqrt, Transform::CubeRoot]);
        match Transform::from_name("boxcox", values) {
            Some(bc) => transforms.push(bc),
            None => tracing::warn!("Box-Cox lambda could not be fitted; skipping candidate"),
        }
    }

    let mut candidates: Vec<TransformCandidate> = transforms
        .into_iter()
        .map(|transform| {
            let metrics = ShapeMetrics::compute(&transform.apply(values));
            TransformCandidate {
                transform,
                metrics,
                score: metrics.score(),
            }
        })
        .collect();

    candidates.sort_by(|a, b| a.score.total_cmp(&b.score));
    candidates
}

#[derive(Debug, Clone, Serialize)]
pub struct QqPlot {
    pub theoretical: Vec<f64>,
    pub ordered: Vec<f64>,
    pub slope: f64,
    pub intercept: f64,
    pub r: f64,
}

/// Normal probability plot: Filliben order-statistic medians against the
/// sorted sample, with a least-squares reference line.
pub fn qq_points(values: &[f64]) -> QqPlot {
    let ordered = stats::sorted(values);
    let n = ordered.len();
    let mut uniform = vec![0.0; n];
    if n > 0 {
        let last = 0.5f64.powf(1.0 / n as f64);
        uniform[n - 1] = last;
        uniform[0] = 1.0 - last;
        for (i, u) in uniform.iter_mut().enumerate().take(n.saturating_sub(1)).skip(1) {
            *u = ((i + 1) as f64 - 0.3175) / (n as f64 + 0.365);
        }
    }
    let theoretical: Vec<f64> = uniform.iter().map(|&p| normal_ppf(p)).collect();

    let (slope, intercept) = linear_fit(&theoretical, &ordered).unwrap_or((f64::NAN, f64::NAN));
    let r = pearson_correlation(&theoretical, &ordered);

    QqPlot {
        theoretical,
        ordered,
        slope,
        intercept,
        r,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    pub w: f64,
    pub p_value: f64,
}

fn poly(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Shapiro-Wilk W and p-value via Royston's approximation (3 <= n <= 5000).
pub fn shapiro_wilk(values: &[f64]) -> Result<ShapiroWilk> {
    let n = values.len();
    if !(3..=5000).contains(&n) {
        return Err(EdaError::insufficient(
            "Shapiro-Wilk",
            format!("needs 3..=5000 observations, got {}", n),
        ));
    }
    let x = stats::sorted(values);
    let mean = stats::mean(&x);
    let ss: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    if !(ss > 0.0) || x[n - 1] - x[0] < 1e-19 {
        return Err(EdaError::insufficient("Shapiro-Wilk", "all values are identical"));
    }

    let nf = n as f64;
    let mut a = vec![0.0; n];
    if n == 3 {
        let h = 0.5f64.sqrt();
        a[0] = -h;
        a[2] = h;
    } else {
        let m: Vec<f64> = (1..=n)
            .map(|i| normal_ppf((i as f64 - 0.375) / (nf + 0.25)))
            .collect();
        let mm: f64 = m.iter().map(|v| v * v).sum();
        let u = 1.0 / nf.sqrt();

        let a_n = m[n - 1] / mm.sqrt()
            + poly(&[0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056], u);

        let (phi, ends) = if n > 5 {
            let a_n1 = m[n - 2] / mm.sqrt()
                + poly(&[0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633], u);
            let phi = (mm - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
                / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
            a[n - 2] = a_n1;
            a[1] = -a_n1;
            (phi, 2)
        } else {
            let phi = (mm - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
            (phi, 1)
        };
        a[n - 1] = a_n;
        a[0] = -a_n;
        for i in ends..n - ends {
            a[i] = m[i] / phi.sqrt();
        }
    }

    let numerator: f64 = a.iter().zip(&x).map(|(ai, xi)| ai * xi).sum();
    let w = (numerator * numerator / ss).min(1.0);

    let p_value = if n == 3 {
        let p = 6.0 / std::f64::consts::PI * (w.sqrt().asin() - 0.75f64.sqrt().asin());
        p.max(0.0)
    } else {
        let y = (1.0 - w).ln();
        let (z_input, mu, sigma) = if n <= 11 {
            let gamma = poly(&[-2.273, 0.459], nf);
            if y >= gamma {
                return Ok(ShapiroWilk { w, p_value: 1e-99 });
            }
            (
                -(gamma - y).ln(),
                poly(&[0.5440, -0.39978, 0.025054, -6.714e-4], nf),
                poly(&[1.3822, -0.77857, 0.062767, -0.0020322], nf).exp(),
            )
        } else {
            let ln_n = nf.ln();
            (
                y,
                poly(&[-1.5861, -0.31082, -0.083751, 0.0038915], ln_n),
                poly(&[-0.4803, -0.082676, 0.0030302], ln_n).exp(),
            )
        };
        1.0 - normal_cdf((z_input - mu) / sigma)
    };

    Ok(ShapiroWilk {
        w,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ZSummary {
    /// False when the transformed data had zero spread.
    pub applied: bool,
    pub min: f64,
    pub max: f64,
    pub metrics: ShapeMetrics,
    #[serde(skip)]
    pub values: Vec<f64>,
}

impl ZSummary {
    pub fn compute(values: &[f64]) -> Self {
        let mean = stats::mean(values);
        let sd = stats::std_dev(values, 1);
        let (applied, z) = if sd > 0.0 {
            (true, values.iter().map(|v| (v - mean) / sd).collect())
        } else {
            (false, values.to_vec())
        };
        Self {
            applied,
            min: stats::min(&z),
            max: stats::max(&z),
            metrics: ShapeMetrics::compute(&z),
            values: z,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalityReport {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub mode_count: usize,
    pub original: ShapeMetrics,
    pub candidates: Vec<TransformCandidate>,
    pub recommended: Transform,
    pub original_score: f64,
    pub best_score: f64,
    /// Percent reduction in distance from Normal.
    pub improvement_pct: Option<f64>,
    pub transformed_metrics: ShapeMetrics,
    pub z: ZSummary,
    #[serde(skip)]
    pub transformed: Vec<f64>,
}

impl NormalityReport {
    pub fn compute(values: &[f64], kde_grid_size: usize) -> Result<Self> {
        if values.is_empty() {
            return Err(EdaError::insufficient(
                "normality check",
                "no yearly counts left after outlier removal",
            ));
        }

        let original = ShapeMetrics::compute(values);
        let candidates = evaluate_transforms(values);
        let original_score = original.score();
        let (recommended, best_score) = candidates
            .first()
            .map(|c| (c.transform, c.score))
            .unwrap_or((Transform::Identity, original_score));

        let improvement_pct = (original_score > 0.0
            && original_score.is_finite()
            && best_score.is_finite())
        .then(|| 100.0 * (original_score - best_score) / original_score);

        let transformed = recommended.apply(values);
        let transformed_metrics = ShapeMetrics::compute(&transformed);
        let z = ZSummary::compute(&transformed);

        Ok(Self {
            n: values.len(),
            min: stats::min(values),
            max: stats::max(values),
            mean: stats::mean(values),
            std: stats::std_dev(values, 1),
            mode_count: estimate_mode_count(values, kde_grid_size),
            original,
            candidates,
            recommended,
            original_score,
            best_score,
            improvement_pct,
            transformed_metrics,
            z,
            transformed,
        })
    }
}
