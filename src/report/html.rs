use crate::analysis::normality::{NormalityReport, Transform};
use crate::analysis::profile::ColumnProfile;
use crate::analysis::stats::SummaryStats;
use crate::report::format_thousands;

const STYLE: &str = r#"    body {
      font-family: Arial, sans-serif;
      background: #ffffff;
      margin: 24px;
    }
    h2 {
      text-align: center;
      margin-bottom: 6px;
    }
    p.subtitle {
      text-align: left;
      margin-top: 16px;
      margin-bottom: 0;
      font-size: 14px;
      max-width: 98%;
    }
    .table-wrapper {
      margin-top: 8px;
      border: 4px solid #000000;
      border-radius: 10px;
      padding: 0;
      overflow: hidden;
    }
    .eda-table {
      width: 100%;
      border-collapse: collapse;
      background: #f5f4e8;
    }
    .eda-table th {
      background: #4ade80;
      color: black;
      font-weight: bold;
      padding: 10px;
      border-bottom: 2px solid black;
      border-right: 1px solid black;
      text-align: center;
    }
    .eda-table th:last-child {
      border-right: none;
    }
    .eda-table td {
      padding: 8px;
      border-bottom: 1px solid black;
      border-right: 1px solid black;
      text-align: center;
    }
    .eda-table tr:last-child td {
      border-bottom: none;
    }
    .eda-table td:last-child {
      border-right: none;
    }
    code {
      font-family: "Courier New", monospace;
      font-size: 13px;
    }
"#;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Cells are inserted as-is; callers escape text content.
struct Table<'a> {
    title: &'a str,
    heading: &'a str,
    columns: &'a [&'a str],
    rows: Vec<Vec<String>>,
    caption: &'a str,
}

impl Table<'_> {
    fn render(&self) -> String {
        let header: String = self
            .columns
            .iter()
            .map(|c| format!("        <th>{}</th>\n", c))
            .collect();

        let body: String = self
            .rows
            .iter()
            .map(|row| {
                let cells: String = row
                    .iter()
                    .map(|cell| format!("        <td>{}</td>\n", cell))
                    .collect();
                format!("      <tr>\n{}      </tr>\n", cells)
            })
            .collect();

        format!(
            "<!doctype html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  \
             <title>{title}</title>\n  <style>\n{style}  </style>\n</head>\n<body>\n\n  \
             <h2>{heading}</h2>\n\n  <div class=\"table-wrapper\">\n    \
             <table class=\"eda-table\">\n      <tr>\n{header}      </tr>\n{body}    \
             </table>\n  </div>\n\n  <p class=\"subtitle\">\n    {caption}\n  </p>\n\n\
             </body>\n</html>\n",
            title = self.title,
            style = STYLE,
            heading = self.heading,
            header = header,
            body = body,
            caption = self.caption,
        )
    }
}

/// Table 1: one row per raw column.
pub fn profile_table(profile: &[ColumnProfile]) -> String {
    let rows = profile
        .iter()
        .map(|p| {
            vec![
                escape(&p.name),
                p.dtype.as_str().to_string(),
                p.dtype.kind().to_string(),
                p.unique.to_string(),
                format!("{:.2}%", p.pct_missing),
                escape(p.description),
            ]
        })
        .collect();

    Table {
        title: "Meteorite Landings &mdash; EDA Table",
        heading: "Table 1. Initial EDA Exploration",
        columns: &[
            "Feature Name",
            "Inferred dtype",
            "Categorical / Numerical",
            "# Unique",
            "% Missing",
            "Description",
        ],
        rows,
        caption: "Table 1. Summary of the primary features in the NASA Meteorite Landings \
                  dataset, including inferred data types, feature type, cardinality, \
                  missingness, and brief semantic descriptions used for subsequent \
                  exploratory analysis.",
    }
    .render()
}

/// Table 2: the yearly count summary.
pub fn summary_table(summary: &SummaryStats) -> String {
    let row = vec![
        "num_fell_found".to_string(),
        summary.n.to_string(),
        format_thousands(summary.mean, 2),
        format_thousands(summary.std, 2),
        format_thousands(summary.min, 0),
        format_thousands(summary.q1, 2),
        format_thousands(summary.median, 2),
        format_thousands(summary.q3, 2),
        format_thousands(summary.max, 0),
        format!("{}%", format_thousands(summary.pct_within_iqr, 2)),
        summary.tukey_outliers.to_string(),
    ];

    Table {
        title: "Meteorite Landings &mdash; Yearly Count Summary",
        heading: "Table 2. Yearly Count Summary",
        columns: &[
            "Feature",
            "Total count (N)",
            "Mean",
            "Std. Dev.",
            "Min",
            "25% (Q1)",
            "50% (Median)",
            "75% (Q3)",
            "Max",
            "% of data within IQR",
            "# of Tukey outliers",
        ],
        rows: vec![row],
        caption: "Table 2. Summary statistics for yearly meteorite counts \
                  (<code>num_fell_found</code>) after filtering and aggregation. \
                  Outliers follow Tukey's rule: values below \
                  Q1&nbsp;&minus;&nbsp;1.5&nbsp;&times;&nbsp;IQR or above \
                  Q3&nbsp;&plus;&nbsp;1.5&nbsp;&times;&nbsp;IQR. \
                  Total count (N) is the number of distinct years.",
    }
    .render()
}

fn transform_note(transform: &Transform) -> String {
    match transform {
        Transform::BoxCox { lambda } => format!("{} (lambda = {:.3})", transform.note(), lambda),
        other => other.note().to_string(),
    }
}

/// Table 3: candidate transforms, recommended one in bold.
pub fn transform_table(normality: &NormalityReport) -> String {
    let rows = normality
        .candidates
        .iter()
        .map(|c| {
            let name = escape(c.transform.name());
            let name = if c.transform == normality.recommended {
                format!("<strong>{}</strong>", name)
            } else {
                name
            };
            vec![
                name,
                format!("{:.4}", c.metrics.skew),
                format!("{:.4}", c.metrics.kurtosis),
                format!("{:.4}", c.score),
                escape(&transform_note(&c.transform)),
            ]
        })
        .collect();

    Table {
        title: "Meteorite Landings &mdash; Skewness &amp; Kurtosis Transform Summary",
        heading: "Table 3. Skewness &amp; Kurtosis Transform Summary",
        columns: &[
            "Transform",
            "Skewness",
            "Kurtosis<br>(Pearson)",
            "Score<br><span style=\"font-size:12px;\">|skew| + |kurtosis &minus; 3|</span>",
            "Notes",
        ],
        rows,
        caption: "<b>Table 3.</b> For a perfectly Normal distribution, skewness is 0 and \
                  kurtosis is 3 (mesokurtic). The score \
                  <code>|skew| + |kurtosis &minus; 3|</code> is a simple heuristic: smaller \
                  values indicate a distribution closer to Normal in both asymmetry and \
                  tailedness. The bold row is the recommended transform.",
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normality::NormalityReport;
    use crate::analysis::profile::{profile_columns, NO_DESCRIPTION};
    use crate::domain::model::RawTable;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href='x'>&</a>"), "&lt;a href=&#x27;x&#x27;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_profile_table_escapes_headers() {
        let table = RawTable::new(
            vec!["<b>weird</b>".into(), "fall".into()],
            vec![vec!["1".into(), "Fell".into()]],
        );
        let html = profile_table(&profile_columns(&table));
        assert!(html.contains("<td>&lt;b&gt;weird&lt;/b&gt;</td>"));
        assert!(html.contains(NO_DESCRIPTION));
        assert!(html.contains("<td>0.00%</td>"));
        assert!(html.contains("#4ade80"));
        assert!(html.contains("Table 1. Initial EDA Exploration"));
    }

    #[test]
    fn test_summary_table_formats_numbers() {
        let summary = SummaryStats::compute(&[1000.0, 2000.0, 3000.0, 4000.0]).unwrap();
        let html = summary_table(&summary);
        assert!(html.contains("<td>2,500.00</td>"));
        assert!(html.contains("<td>1,000</td>"));
        assert!(html.contains("<td>4,000</td>"));
        assert!(html.contains("<td>50.00%</td>"));
    }

    #[test]
    fn test_transform_table_bolds_recommended() {
        let values = [1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 5.0, 7.0, 9.0, 12.0, 18.0, 30.0];
        let report = NormalityReport::compute(&values, 128).unwrap();
        let html = transform_table(&report);
        let bold = format!("<strong>{}</strong>", report.recommended.name());
        assert_eq!(html.matches("<strong>").count(), 1);
        assert!(html.contains(&bold));
        assert_eq!(html.matches("      <tr>\n").count(), report.candidates.len() + 1);
    }
}
