use crate::analysis::normality::Transform;
use crate::analysis::{MAX_HISTOGRAM_BINS, MAX_KDE_GRID_SIZE, RECOMMENDED};
use crate::core::layout::{DATA_DIR, DOCS_DIR, IMAGES_DIR};
use crate::core::ConfigProvider;
use crate::domain::ports::{DataSource, FilterOptions, HistogramBins};
use crate::utils::error::{EdaError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// `file` or `http`.
    pub r#type: String,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Absent fields fall back to [`FilterOptions::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    /// Drop the upper year bound entirely; conflicts with `max_year`.
    pub no_max_year: Option<bool>,
    pub require_fall_kind: Option<bool>,
}

/// `histogram_bins = 20` or `histogram_bins = "auto"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinsSetting {
    Count(usize),
    Rule(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub iqr_multiplier: Option<f64>,
    pub kde_grid_size: Option<usize>,
    pub histogram_bins: Option<BinsSetting>,
    pub final_transform: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub data_dir: Option<String>,
    pub tables_dir: Option<String>,
    pub charts_dir: Option<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EdaError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EdaError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// `${VAR}` is replaced from the environment; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EdaError::ConfigError {
            message: format!("env var pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_one_of("source.type", &self.source.r#type, &["file", "http"])?;
        if self.is_http_source() {
            let endpoint =
                validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
            validation::validate_url("source.endpoint", endpoint)?;
        } else {
            let path = validation::validate_required_field("source.path", &self.source.path)?;
            validation::validate_path("source.path", path)?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_path("load.data_dir", self.data_dir())?;
        validation::validate_path("load.tables_dir", self.tables_dir())?;
        validation::validate_path("load.charts_dir", self.charts_dir())?;
        if let Some(compression) = self.load.compression.as_ref().filter(|c| c.enabled) {
            validation::validate_path("load.compression.filename", &compression.filename)?;
        }

        if self.filter.no_max_year.unwrap_or(false) && self.filter.max_year.is_some() {
            return Err(EdaError::ConfigValidationError {
                field: "filter.no_max_year".to_string(),
                message: "cannot be combined with filter.max_year".to_string(),
            });
        }
        let filter = self.filter_options();
        validation::validate_year_window(filter.min_year, filter.max_year)?;

        validation::validate_positive_float("analysis.iqr_multiplier", self.iqr_multiplier())?;
        validation::validate_number_range(
            "analysis.kde_grid_size",
            self.kde_grid_size(),
            3,
            MAX_KDE_GRID_SIZE,
        )?;
        match &self.analysis.histogram_bins {
            Some(BinsSetting::Count(n)) => {
                validation::validate_number_range("analysis.histogram_bins", *n, 1, MAX_HISTOGRAM_BINS)?
            }
            Some(BinsSetting::Rule(rule)) => {
                validation::validate_one_of("analysis.histogram_bins", rule, &["auto"])?
            }
            None => {}
        }

        let mut transforms = Transform::NAMES.to_vec();
        transforms.push(RECOMMENDED);
        validation::validate_one_of(
            "analysis.final_transform",
            self.final_transform(),
            &transforms,
        )?;

        Ok(())
    }

    pub fn is_http_source(&self) -> bool {
        self.source.r#type.trim().eq_ignore_ascii_case("http")
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn source(&self) -> DataSource {
        if self.is_http_source() {
            DataSource::Http {
                url: self.source.endpoint.clone().unwrap_or_default(),
                timeout_seconds: self
                    .source
                    .timeout_seconds
                    .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            }
        } else {
            DataSource::File(self.source.path.clone().unwrap_or_default())
        }
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn data_dir(&self) -> &str {
        self.load.data_dir.as_deref().unwrap_or(DATA_DIR)
    }

    fn tables_dir(&self) -> &str {
        self.load.tables_dir.as_deref().unwrap_or(DOCS_DIR)
    }

    fn charts_dir(&self) -> &str {
        self.load.charts_dir.as_deref().unwrap_or(IMAGES_DIR)
    }

    fn filter_options(&self) -> FilterOptions {
        let defaults = FilterOptions::default();
        FilterOptions {
            min_year: self.filter.min_year.or(defaults.min_year),
            max_year: if self.filter.no_max_year.unwrap_or(false) {
                None
            } else {
                self.filter.max_year.or(defaults.max_year)
            },
            require_fall_kind: self
                .filter
                .require_fall_kind
                .unwrap_or(defaults.require_fall_kind),
        }
    }

    fn iqr_multiplier(&self) -> f64 {
        self.analysis.iqr_multiplier.unwrap_or(1.5)
    }

    fn kde_grid_size(&self) -> usize {
        self.analysis.kde_grid_size.unwrap_or(512)
    }

    fn histogram_bins(&self) -> HistogramBins {
        match &self.analysis.histogram_bins {
            Some(BinsSetting::Count(n)) => HistogramBins::Fixed(*n),
            Some(BinsSetting::Rule(_)) => HistogramBins::Auto,
            None => HistogramBins::Fixed(20),
        }
    }

    fn final_transform(&self) -> &str {
        self.analysis.final_transform.as_deref().unwrap_or("sqrt")
    }

    fn bundle_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[pipeline]
name = "meteor-eda"
description = "Meteorite landings EDA"
version = "1.0.0"

[source]
type = "file"
path = "Data_/Meteorite_Landings.csv"

[load]
output_path = "."
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.pipeline.name, "meteor-eda");
        assert_eq!(
            config.source(),
            DataSource::File("Data_/Meteorite_Landings.csv".to_string())
        );
        assert_eq!(config.filter_options(), FilterOptions::default());
        assert_eq!(config.iqr_multiplier(), 1.5);
        assert_eq!(config.kde_grid_size(), 512);
        assert_eq!(config.histogram_bins(), HistogramBins::Fixed(20));
        assert_eq!(config.final_transform(), "sqrt");
        assert_eq!(config.data_dir(), "Data_");
        assert_eq!(config.tables_dir(), "Docs_");
        assert_eq!(config.charts_dir(), "Images_");
        assert_eq!(config.bundle_name(), None);
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pipeline]
name = "meteor-eda"
description = "Meteorite landings EDA"
version = "1.0.0"

[source]
type = "http"
endpoint = "https://data.nasa.gov/api/views/gh4g-9sfh/rows.csv"
timeout_seconds = 60

[filter]
min_year = 1800
max_year = 2010
require_fall_kind = false

[analysis]
iqr_multiplier = 3.0
kde_grid_size = 256
histogram_bins = "auto"
final_transform = "recommended"

[load]
output_path = "./out"
tables_dir = "tables"
compression = { enabled = true, filename = "bundle.zip" }

[monitoring]
enabled = true
log_level = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.source(),
            DataSource::Http {
                url: "https://data.nasa.gov/api/views/gh4g-9sfh/rows.csv".to_string(),
                timeout_seconds: 60
            }
        );
        let filter = config.filter_options();
        assert_eq!(filter.min_year, Some(1800));
        assert_eq!(filter.max_year, Some(2010));
        assert!(!filter.require_fall_kind);
        assert_eq!(config.histogram_bins(), HistogramBins::Auto);
        assert_eq!(config.final_transform(), "recommended");
        assert_eq!(config.tables_dir(), "tables");
        assert_eq!(config.bundle_name(), Some("bundle.zip"));
        assert_eq!(config.log_level(), Some("json"));
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_no_max_year_removes_upper_bound() {
        let content = format!("{}\n[filter]\nmin_year = 2020\nno_max_year = true\n", MINIMAL);
        let config = TomlConfig::from_toml_str(&content).unwrap();
        let filter = config.filter_options();
        assert_eq!(filter.min_year, Some(2020));
        assert_eq!(filter.max_year, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("METEOR_EDA_TEST_INPUT", "/data/landings.csv");

        let content = MINIMAL.replace(
            "Data_/Meteorite_Landings.csv",
            "${METEOR_EDA_TEST_INPUT}",
        );
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.source.path.as_deref(), Some("/data/landings.csv"));

        std::env::remove_var("METEOR_EDA_TEST_INPUT");
    }

    #[test]
    fn test_unknown_env_var_is_left_alone() {
        let content = MINIMAL.replace("\".\"", "\"${METEOR_EDA_SURELY_UNSET}\"");
        let config = TomlConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.load.output_path, "${METEOR_EDA_SURELY_UNSET}");
    }

    #[test]
    fn test_config_validation_errors() {
        let cases = [
            MINIMAL.replace("type = \"file\"", "type = \"s3\""),
            MINIMAL.replace("type = \"file\"", "type = \"http\""),
            MINIMAL.replace("path = \"Data_/Meteorite_Landings.csv\"", ""),
            format!("{}\n[analysis]\niqr_multiplier = 0.0\n", MINIMAL),
            format!("{}\n[analysis]\nkde_grid_size = 2\n", MINIMAL),
            format!("{}\n[analysis]\nkde_grid_size = 1000000\n", MINIMAL),
            format!("{}\n[analysis]\nhistogram_bins = 1000000000000\n", MINIMAL),
            format!("{}\n[analysis]\nhistogram_bins = \"fd\"\n", MINIMAL),
            format!("{}\n[analysis]\nhistogram_bins = 0\n", MINIMAL),
            format!("{}\n[analysis]\nfinal_transform = \"exp\"\n", MINIMAL),
            format!("{}\n[filter]\nmin_year = 2020\n", MINIMAL),
            format!("{}\n[filter]\nmax_year = 2000\nno_max_year = true\n", MINIMAL),
        ];
        for content in cases {
            let config = TomlConfig::from_toml_str(&content).unwrap();
            assert!(config.validate().is_err(), "accepted:\n{}", content);
        }
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[pipeline\nname=").unwrap_err();
        assert!(matches!(err, EdaError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "meteor-eda");
    }
}
