use crate::domain::model::{AnalysisResult, RawTable};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Path relative to the storage base.
    File(String),
    /// CSV export downloaded over HTTP(S).
    Http { url: String, timeout_seconds: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistogramBins {
    Fixed(usize),
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOptions {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub require_fall_kind: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_year: None,
            max_year: Some(2013),
            require_fall_kind: true,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn source(&self) -> DataSource;
    fn output_path(&self) -> &str;
    fn data_dir(&self) -> &str;
    fn tables_dir(&self) -> &str;
    fn charts_dir(&self) -> &str;
    fn filter_options(&self) -> FilterOptions;
    fn iqr_multiplier(&self) -> f64;
    fn kde_grid_size(&self) -> usize;
    fn histogram_bins(&self) -> HistogramBins;
    /// Transform name, or "recommended" to use the best-scoring candidate.
    fn final_transform(&self) -> &str;
    /// ZIP bundle file name when compression is on.
    fn bundle_name(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawTable>;
    async fn transform(&self, data: RawTable) -> Result<AnalysisResult>;
    async fn load(&self, result: AnalysisResult) -> Result<String>;
}
