pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::{CliConfig, Command, RunArgs};

#[cfg(feature = "cli")]
mod cli_args {
    use crate::analysis::normality::Transform;
    use crate::analysis::{MAX_HISTOGRAM_BINS, RECOMMENDED};
    use crate::config::toml_config::DEFAULT_TIMEOUT_SECONDS;
    use crate::core::layout::{DATA_DIR, DOCS_DIR, IMAGES_DIR};
    use crate::core::ConfigProvider;
    use crate::domain::ports::{DataSource, FilterOptions, HistogramBins};
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::{Args, Parser, Subcommand};

    pub const DEFAULT_INPUT: &str = "Data_/Meteorite_Landings.csv";
    pub const DEFAULT_BUNDLE: &str = "meteor_eda_bundle.zip";

    #[derive(Debug, Clone, Parser)]
    #[command(name = "meteor-eda")]
    #[command(about = "Exploratory analysis of the NASA Meteorite Landings dataset")]
    pub struct CliConfig {
        /// Landings CSV, relative to the output path unless absolute
        #[arg(long, global = true, default_value = DEFAULT_INPUT)]
        pub input: String,

        /// Project root; artifacts go under Data_/, Docs_/ and Images_/ here
        #[arg(long, global = true, default_value = ".")]
        pub output_path: String,

        /// Download the CSV from this URL instead of reading --input
        #[arg(long, global = true)]
        pub source_url: Option<String>,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Log system stats for each phase")]
        pub monitor: bool,

        #[command(subcommand)]
        pub command: Option<Command>,
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// Full analysis: cleaning, outliers, normality, transform, regression
        Run(RunArgs),
        /// Column projections (filter_round_1.csv, geo_id_mass.csv)
        Project,
        /// Check the Data_/Docs_/Images_/Scripts_ layout
        Layout {
            /// Create missing directories
            #[arg(long)]
            create: bool,
        },
    }

    #[derive(Debug, Clone, PartialEq, Args)]
    pub struct RunArgs {
        #[arg(long)]
        pub min_year: Option<i32>,

        #[arg(long, default_value = "2013")]
        pub max_year: Option<i32>,

        /// No upper year bound
        #[arg(long, conflicts_with = "max_year")]
        pub no_max_year: bool,

        /// Keep rows whose fall value is neither Fell nor Found
        #[arg(long)]
        pub all_falls: bool,

        #[arg(long, default_value = "1.5")]
        pub iqr_multiplier: f64,

        /// Histogram bin count, or "auto"
        #[arg(long, default_value = "20", value_parser = parse_bins)]
        pub bins: HistogramBins,

        /// identity, log1p, sqrt, cuberoot, boxcox or recommended
        #[arg(long, default_value = "sqrt")]
        pub final_transform: String,

        /// Also write a ZIP bundle of every artifact
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_BUNDLE)]
        pub bundle: Option<String>,
    }

    impl Default for RunArgs {
        fn default() -> Self {
            Self {
                min_year: None,
                max_year: FilterOptions::default().max_year,
                no_max_year: false,
                all_falls: false,
                iqr_multiplier: 1.5,
                bins: HistogramBins::Fixed(20),
                final_transform: "sqrt".to_string(),
                bundle: None,
            }
        }
    }

    fn parse_bins(value: &str) -> std::result::Result<HistogramBins, String> {
        if value.trim().eq_ignore_ascii_case("auto") {
            return Ok(HistogramBins::Auto);
        }
        value
            .trim()
            .parse::<usize>()
            .map(HistogramBins::Fixed)
            .map_err(|_| format!("expected a bin count or \"auto\", got '{}'", value))
    }

    impl CliConfig {
        /// `run` is the default subcommand.
        pub fn command(&self) -> Command {
            self.command
                .clone()
                .unwrap_or_else(|| Command::Run(RunArgs::default()))
        }

        pub fn run_args(&self) -> Option<&RunArgs> {
            match &self.command {
                Some(Command::Run(args)) => Some(args),
                _ => None,
            }
        }

        fn with_run_args<T>(&self, f: impl FnOnce(&RunArgs) -> T) -> T {
            match self.run_args() {
                Some(args) => f(args),
                None => f(&RunArgs::default()),
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn source(&self) -> DataSource {
            match &self.source_url {
                Some(url) => DataSource::Http {
                    url: url.clone(),
                    timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
                },
                None => DataSource::File(self.input.clone()),
            }
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn data_dir(&self) -> &str {
            DATA_DIR
        }

        fn tables_dir(&self) -> &str {
            DOCS_DIR
        }

        fn charts_dir(&self) -> &str {
            IMAGES_DIR
        }

        fn filter_options(&self) -> FilterOptions {
            self.with_run_args(|args| FilterOptions {
                min_year: args.min_year,
                max_year: if args.no_max_year { None } else { args.max_year },
                require_fall_kind: !args.all_falls,
            })
        }

        fn iqr_multiplier(&self) -> f64 {
            self.with_run_args(|args| args.iqr_multiplier)
        }

        fn kde_grid_size(&self) -> usize {
            512
        }

        fn histogram_bins(&self) -> HistogramBins {
            self.with_run_args(|args| args.bins)
        }

        fn final_transform(&self) -> &str {
            self.run_args()
                .map(|args| args.final_transform.as_str())
                .unwrap_or("sqrt")
        }

        fn bundle_name(&self) -> Option<&str> {
            self.run_args().and_then(|args| args.bundle.as_deref())
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            match &self.source_url {
                Some(url) => validation::validate_url("source_url", url)?,
                None => validation::validate_path("input", &self.input)?,
            }
            validation::validate_path("output_path", &self.output_path)?;

            if let Some(args) = self.run_args() {
                let filter = self.filter_options();
                validation::validate_year_window(filter.min_year, filter.max_year)?;
                validation::validate_positive_float("iqr_multiplier", args.iqr_multiplier)?;
                if let HistogramBins::Fixed(n) = args.bins {
                    validation::validate_number_range("bins", n, 1, MAX_HISTOGRAM_BINS)?;
                }
                let mut transforms = Transform::NAMES.to_vec();
                transforms.push(RECOMMENDED);
                validation::validate_one_of("final_transform", &args.final_transform, &transforms)?;
                if let Some(bundle) = &args.bundle {
                    validation::validate_path("bundle", bundle)?;
                }
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults_without_subcommand() {
            let config = CliConfig::try_parse_from(["meteor-eda"]).unwrap();
            assert!(matches!(config.command(), Command::Run(_)));
            assert_eq!(config.source(), DataSource::File(DEFAULT_INPUT.to_string()));
            assert_eq!(config.filter_options(), FilterOptions::default());
            assert_eq!(config.final_transform(), "sqrt");
            assert_eq!(config.histogram_bins(), HistogramBins::Fixed(20));
            assert_eq!(config.bundle_name(), None);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_run_flags() {
            let config = CliConfig::try_parse_from([
                "meteor-eda",
                "run",
                "--min-year",
                "1900",
                "--max-year",
                "2000",
                "--all-falls",
                "--final-transform",
                "recommended",
                "--bins",
                "auto",
                "--bundle",
                "--output-path",
                "/tmp/out",
            ])
            .unwrap();

            let filter = config.filter_options();
            assert_eq!(filter.min_year, Some(1900));
            assert_eq!(filter.max_year, Some(2000));
            assert!(!filter.require_fall_kind);
            assert_eq!(config.final_transform(), "recommended");
            assert_eq!(config.histogram_bins(), HistogramBins::Auto);
            assert_eq!(config.bundle_name(), Some(DEFAULT_BUNDLE));
            assert_eq!(config.output_path(), "/tmp/out");
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_no_max_year_flag() {
            let config =
                CliConfig::try_parse_from(["meteor-eda", "run", "--min-year", "2020", "--no-max-year"])
                    .unwrap();
            let filter = config.filter_options();
            assert_eq!(filter.min_year, Some(2020));
            assert_eq!(filter.max_year, None);
            assert!(config.validate().is_ok());

            assert!(CliConfig::try_parse_from([
                "meteor-eda",
                "run",
                "--max-year",
                "2000",
                "--no-max-year"
            ])
            .is_err());
        }

        #[test]
        fn test_source_url_and_layout() {
            let config = CliConfig::try_parse_from([
                "meteor-eda",
                "--source-url",
                "https://example.com/landings.csv",
                "layout",
                "--create",
            ])
            .unwrap();
            assert!(matches!(config.command(), Command::Layout { create: true }));
            assert!(matches!(config.source(), DataSource::Http { .. }));
        }

        #[test]
        fn test_validation_rejects_bad_values() {
            let bad = [
                vec!["meteor-eda", "run", "--final-transform", "exp"],
                vec!["meteor-eda", "run", "--min-year", "2020"],
                vec!["meteor-eda", "run", "--iqr-multiplier", "0"],
                vec!["meteor-eda", "run", "--bins", "0"],
                vec!["meteor-eda", "run", "--bins", "18446744073709551615"],
                vec!["meteor-eda", "--source-url", "ftp://example.com/x.csv"],
            ];
            for args in bad {
                let config = CliConfig::try_parse_from(args.clone()).unwrap();
                assert!(config.validate().is_err(), "accepted {:?}", args);
            }
            assert!(CliConfig::try_parse_from(["meteor-eda", "run", "--bins", "many"]).is_err());
        }
    }
}
