use crate::analysis::normality::{interpret_kurtosis, interpret_modes, interpret_skew, Transform};
use crate::analysis::Analysis;
use crate::report::{format_general, format_thousands};
use std::fmt::Write;

const RULE: &str = "=============================================================";

/// Plain-text rendition of every console section of a run.
pub fn render(analysis: &Analysis) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, analysis);
    out
}

fn write_report(out: &mut String, a: &Analysis) -> std::fmt::Result {
    let rows = &a.cleaning.rows;
    writeln!(out, "=== Cleaning ===")?;
    writeln!(out, "Original rows            : {}", rows.original)?;
    writeln!(out, "Rows with a valid year   : {}", rows.with_valid_year)?;
    writeln!(out, "Rows that Fell or Found  : {}", rows.after_fall_filter)?;
    writeln!(out, "Rows after de-duplication: {}", rows.after_dedup)?;
    writeln!(out, "Rows in the year window  : {}", rows.after_year_window)?;
    writeln!(out, "Distinct years in output : {}", a.cleaning.distinct_years())?;

    let f = &a.frequency;
    writeln!(out, "\nCOUNT -> FREQUENCY (k : years_with_k) [first 15]:")?;
    for (k, years) in f.count_frequency.iter().take(15) {
        writeln!(out, "{}: {}", k, years)?;
    }
    if f.count_frequency.len() > 15 {
        writeln!(out, "...")?;
    }

    writeln!(out, "\n=== Summary statistics (original counts) ===")?;
    writeln!(out, "Mean     : {:.3}", f.mean)?;
    writeln!(out, "Median   : {:.3}", f.median)?;
    writeln!(out, "Variance : {:.3}", f.variance)?;
    writeln!(out, "Std dev  : {:.3}", f.std)?;
    writeln!(
        out,
        "Mode(s)  : {:?} (each appears in {} year(s))",
        f.modes, f.mode_frequency
    )?;

    writeln!(out, "\n=== IQR outlier reduction ===")?;
    writeln!(out, "Q1         : {:.3}", f.fence.q1)?;
    writeln!(out, "Q3         : {:.3}", f.fence.q3)?;
    writeln!(out, "IQR        : {:.3}", f.fence.iqr)?;
    writeln!(out, "Lower bd   : {:.3}", f.fence.lower)?;
    writeln!(out, "Upper bd   : {:.3}", f.fence.upper)?;
    writeln!(out, "Years kept : {} / {}", f.years_kept, f.years_total)?;

    writeln!(out, "\n=== Skewness (after IQR trimming) ===")?;
    writeln!(out, "Skewness(trimmed counts): {:.3}", f.trimmed_skew)?;
    writeln!(out, "Interpretation: {}", f.skew_level.comment())?;
    writeln!(out, "\n=== Skewness after log1p(transform) ===")?;
    writeln!(out, "Skewness(log1p(trimmed counts)): {:.3}", f.log1p_skew)?;
    if f.skew_level.recommends_log() {
        writeln!(out, "Log1p transform is recommended / helpful based on skewness.")?;
    } else {
        writeln!(out, "Log1p transform flattens skew but may be optional.")?;
    }

    let o = &a.outliers;
    writeln!(out, "\n=== Outlier removal (Tukey {} * IQR) ===", o.fence.multiplier)?;
    writeln!(out, "Q1 (25%)          : {}", format_thousands(o.fence.q1, 4))?;
    writeln!(out, "Q3 (75%)          : {}", format_thousands(o.fence.q3, 4))?;
    writeln!(out, "IQR               : {}", format_thousands(o.fence.iqr, 4))?;
    writeln!(out, "Lower bound       : {}", format_thousands(o.fence.lower, 4))?;
    writeln!(out, "Upper bound       : {}", format_thousands(o.fence.upper, 4))?;
    writeln!(out, "Original rows     : {}", o.original_rows())?;
    writeln!(out, "Rows after filter : {}", o.kept.len())?;
    writeln!(out, "Rows removed      : {}", o.removed.len())?;

    let n = &a.normality;
    writeln!(out, "\n=== Normality Check on num_fell_found ===")?;
    writeln!(
        out,
        "Number of yearly observations (after outlier removal): {}",
        n.n
    )?;
    writeln!(out, "Min / Max: {:.4} / {:.4}", n.min, n.max)?;
    writeln!(out, "Mean / Std: {:.4} / {:.4}", n.mean, n.std)?;
    writeln!(out, "\n--- Shape Metrics (Original, Outlier-Filtered Data) ---")?;
    writeln!(
        out,
        "Multimodality (KDE mode count): {} -> {}",
        n.mode_count,
        interpret_modes(n.mode_count)
    )?;
    writeln!(
        out,
        "Skewness: {:.4} -> {}",
        n.original.skew,
        interpret_skew(n.original.skew)
    )?;
    writeln!(
        out,
        "Kurtosis (Pearson): {:.4} -> {}",
        n.original.kurtosis,
        interpret_kurtosis(n.original.kurtosis)
    )?;
    writeln!(
        out,
        "\nNote: For a perfectly Normal distribution, skewness is about 0 and kurtosis about 3 (mesokurtic)."
    )?;

    writeln!(out, "\n=== Candidate Transforms: Skewness & Kurtosis ===")?;
    writeln!(out, "Score = |skew| + |kurtosis - 3|  (lower is closer to Normal)")?;
    for c in &n.candidates {
        write!(
            out,
            "- {:<8}: skew = {:>8.4}, kurtosis = {:>8.4}, score = {:>8.4}",
            c.transform.name(),
            c.metrics.skew,
            c.metrics.kurtosis,
            c.score
        )?;
        if let Transform::BoxCox { lambda } = c.transform {
            write!(out, " (lambda = {:.3})", lambda)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "\n>>> Recommended transform (numeric normality heuristic):")?;
    writeln!(
        out,
        "    '{}': skew = {:.4}, kurtosis = {:.4}, closest to Normal (skew 0, kurtosis 3).",
        n.recommended.name(),
        n.transformed_metrics.skew,
        n.transformed_metrics.kurtosis
    )?;
    writeln!(out, "    {}", n.recommended.advice())?;

    writeln!(out, "\n--- Before vs After (Distance from Normal) ---")?;
    writeln!(
        out,
        "Original score:   |skew| + |kurt-3| = {:.4}",
        n.original_score
    )?;
    writeln!(
        out,
        "Transformed score (using {}): {:.4}",
        n.recommended.name(),
        n.best_score
    )?;
    if let Some(pct) = n.improvement_pct {
        writeln!(
            out,
            "Relative improvement: {:.2}% reduction in distance from Normal.",
            pct
        )?;
    }
    writeln!(out, "Transformed skewness:  {:.4}", n.transformed_metrics.skew)?;
    writeln!(out, "Transformed kurtosis:  {:.4}", n.transformed_metrics.kurtosis)?;

    if n.z.applied {
        writeln!(out, "\n--- Z-Transform of Transformed Data ---")?;
        writeln!(
            out,
            "Z = ({}(num_fell_found) - mean) / std",
            n.recommended.name()
        )?;
        writeln!(out, "Z min / max: {:.4} / {:.4}", n.z.min, n.z.max)?;
        writeln!(out, "Z skewness:  {:.4}", n.z.metrics.skew)?;
        writeln!(out, "Z kurtosis:  {:.4}", n.z.metrics.kurtosis)?;
        writeln!(
            out,
            "Note: Z-scoring rescales and recenters the data but does not change its shape."
        )?;
    } else {
        writeln!(
            out,
            "\nZ-transform could not be computed: standard deviation is zero."
        )?;
    }

    let name = a.final_data.transform.name();
    let r = &a.regression;
    writeln!(out, "\n=== {}-Transformed Data Summary ===", name)?;
    writeln!(out, "n (years): {}", r.n)?;
    writeln!(
        out,
        "{}(num_fell_found): min = {:.4}, max = {:.4}",
        name, r.y_min, r.y_max
    )?;
    writeln!(
        out,
        "{}(num_fell_found): mean = {:.4}, std = {:.4}\n",
        name, r.y_mean, r.y_std
    )?;
    writeln!(
        out,
        "--- Linear Regression ({}(num_fell_found) ~ year_centered) ---",
        name
    )?;
    writeln!(out, "beta0 (intercept): {:.4}", r.intercept)?;
    writeln!(out, "beta1 (slope)    : {:.6} per year", r.slope)?;
    writeln!(out, "R^2              : {:.4}\n", r.r_squared)?;

    writeln!(out, "--- Residual Normality ---")?;
    match r.shapiro {
        Some(sw) => {
            writeln!(out, "Shapiro-Wilk W   : {:.4}", sw.w)?;
            writeln!(out, "Shapiro p-value  : {}", format_general(sw.p_value, 4))?;
        }
        None => writeln!(out, "Shapiro-Wilk test could not be computed.")?,
    }
    writeln!(
        out,
        "  (p > 0.05: cannot reject normality; p < 0.05: evidence of non-normal residuals)"
    )?;
    writeln!(out, "Residual skewness: {:.4}", r.residual_metrics.skew)?;
    writeln!(
        out,
        "Residual kurtosis (Pearson): {:.4}",
        r.residual_metrics.kurtosis
    )?;
    writeln!(out, "  (For ideal Normal residuals, skew 0, kurtosis 3)\n")?;

    writeln!(out, "--- Residual Independence / Autocorrelation ---")?;
    writeln!(out, "Durbin-Watson statistic: {:.4}", r.durbin_watson)?;
    writeln!(
        out,
        "  (DW near 2 suggests little autocorrelation; < 1 or > 3 can indicate strong autocorrelation.)\n"
    )?;

    writeln!(out, "--- Residual Homoscedasticity (rough check) ---")?;
    writeln!(
        out,
        "Corr(|residuals|, fitted): {:.4}",
        r.abs_residual_fitted_corr
    )?;
    writeln!(
        out,
        "  (Correlation near 0 suggests no strong trend in spread with fitted values; large |corr| hints at heteroscedasticity.)"
    )?;
    writeln!(out, "{}", RULE)?;
    Ok(())
}
