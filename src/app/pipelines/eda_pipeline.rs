use crate::analysis::charts::CHART_DATA_FILE;
use crate::analysis::{run_analysis, AnalysisSettings};
use crate::core::{csv_io, AnalysisResult, ConfigProvider, Pipeline, RawTable, Storage};
use crate::domain::model::{Artifact, ArtifactKind};
use crate::domain::ports::DataSource;
use crate::report;
use crate::utils::error::{EdaError, Result};
use reqwest::Client;
use std::io::Write;
use std::time::Duration;
use zip::write::{FileOptions, ZipWriter};

/// Fetch the landings CSV from whatever the config points at.
pub(crate) async fn fetch_table<S: Storage>(
    storage: &S,
    client: &Client,
    source: &DataSource,
) -> Result<RawTable> {
    let bytes = match source {
        DataSource::File(path) => {
            tracing::debug!("Reading dataset from {}", path);
            storage.read_file(path).await?
        }
        DataSource::Http {
            url,
            timeout_seconds,
        } => {
            tracing::debug!("Downloading dataset from {}", url);
            let response = client
                .get(url)
                .timeout(Duration::from_secs(*timeout_seconds))
                .send()
                .await?;

            tracing::debug!("Download response status: {}", response.status());
            if !response.status().is_success() {
                return Err(EdaError::DownloadError {
                    url: url.clone(),
                    status: response.status().as_u16(),
                });
            }
            response.bytes().await?.to_vec()
        }
    };

    let table = csv_io::read_table(&bytes)?;
    tracing::info!(
        "Loaded {} rows x {} columns",
        table.len(),
        table.headers.len()
    );
    Ok(table)
}

pub(crate) fn source_label(source: &DataSource) -> &str {
    match source {
        DataSource::File(path) => path,
        DataSource::Http { url, .. } => url,
    }
}

pub struct EdaPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: Client,
}

impl<S: Storage, C: ConfigProvider> EdaPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    /// Destination of an artifact relative to the storage base.
    pub fn artifact_path(&self, artifact: &Artifact) -> String {
        let dir = match artifact.kind {
            ArtifactKind::Html => self.config.tables_dir(),
            _ if artifact.name == CHART_DATA_FILE => self.config.charts_dir(),
            _ => self.config.data_dir(),
        };
        format!("{}/{}", dir, artifact.name)
    }

    fn bundle(&self, artifacts: &[(String, &Artifact)]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for (path, artifact) in artifacts {
            zip.start_file::<_, ()>(path.as_str(), FileOptions::default())?;
            zip.write_all(&artifact.contents)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for EdaPipeline<S, C> {
    async fn extract(&self) -> Result<RawTable> {
        fetch_table(&self.storage, &self.client, &self.config.source()).await
    }

    async fn transform(&self, data: RawTable) -> Result<AnalysisResult> {
        let settings = AnalysisSettings::from_config(&self.config);
        tracing::debug!("Analysis settings: {:?}", settings);

        let analysis = run_analysis(&data, &settings)?;
        let source = self.config.source();
        let artifacts = report::render_artifacts(&analysis, source_label(&source))?;

        Ok(AnalysisResult {
            artifacts,
            records_processed: analysis.cleaning.rows.after_year_window,
            highlights: report::highlights(&analysis),
        })
    }

    async fn load(&self, result: AnalysisResult) -> Result<String> {
        let placed: Vec<(String, &Artifact)> = result
            .artifacts
            .iter()
            .map(|artifact| (self.artifact_path(artifact), artifact))
            .collect();

        for (path, artifact) in &placed {
            self.storage.write_file(path, &artifact.contents).await?;
        }
        tracing::info!("Wrote {} artifacts", placed.len());

        if let Some(name) = self.config.bundle_name() {
            tracing::debug!("Creating ZIP bundle with {} files", placed.len());
            let zip_data = self.bundle(&placed)?;
            let bundle_path = format!("{}/{}", self.config.data_dir(), name);

            tracing::debug!("Writing ZIP bundle ({} bytes)", zip_data.len());
            self.storage.write_file(&bundle_path, &zip_data).await?;
            return Ok(format!("{}/{}", self.config.output_path(), bundle_path));
        }

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FilterOptions, HistogramBins};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStorage {
        files: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl Storage for MemoryStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| {
                    EdaError::IoError(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        path.to_string(),
                    ))
                })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct TestConfig {
        bundle: Option<String>,
    }

    impl ConfigProvider for TestConfig {
        fn source(&self) -> DataSource {
            DataSource::File("landings.csv".to_string())
        }
        fn output_path(&self) -> &str {
            "out"
        }
        fn data_dir(&self) -> &str {
            "Data_"
        }
        fn tables_dir(&self) -> &str {
            "Docs_"
        }
        fn charts_dir(&self) -> &str {
            "Images_"
        }
        fn filter_options(&self) -> FilterOptions {
            FilterOptions::default()
        }
        fn iqr_multiplier(&self) -> f64 {
            1.5
        }
        fn kde_grid_size(&self) -> usize {
            128
        }
        fn histogram_bins(&self) -> HistogramBins {
            HistogramBins::Fixed(10)
        }
        fn final_transform(&self) -> &str {
            "sqrt"
        }
        fn bundle_name(&self) -> Option<&str> {
            self.bundle.as_deref()
        }
    }

    fn landings_csv() -> Vec<u8> {
        let mut csv = String::from("name,id,nametype,recclass,mass (g),fall,year,GeoLocation\n");
        let mut id = 1;
        for (year, count) in [
            (1990, 5),
            (1991, 7),
            (1992, 6),
            (1993, 9),
            (1994, 8),
            (1995, 11),
            (1996, 10),
            (1997, 12),
            (1998, 9),
            (1999, 13),
            (2000, 14),
            (2001, 12),
        ] {
            for i in 0..count {
                let fall = if i % 3 == 0 { "Fell" } else { "Found" };
                csv.push_str(&format!(
                    "Rock {id},{id},Valid,L6,{mass},{fall},{year}-01-01T00:00:00.000,\"(1.0, 2.0)\"\n",
                    mass = id * 10,
                ));
                id += 1;
            }
        }
        csv.into_bytes()
    }

    #[tokio::test]
    async fn test_artifacts_are_routed_by_kind() {
        let storage = MemoryStorage::default();
        storage
            .write_file("landings.csv", &landings_csv())
            .await
            .unwrap();
        let pipeline = EdaPipeline::new(storage, TestConfig { bundle: None });

        let table = pipeline.extract().await.unwrap();
        let result = pipeline.transform(table).await.unwrap();
        assert!(result.records_processed > 0);
        assert!(!result.highlights.is_empty());

        let location = pipeline.load(result).await.unwrap();
        assert_eq!(location, "out");

        let files = pipeline.storage.files.lock().unwrap();
        assert!(files.contains_key("Data_/yearly_counts.csv"));
        assert!(files.contains_key("Data_/final_data_tx.csv"));
        assert!(files.contains_key("Docs_/EDA_table_1.html"));
        assert!(files.contains_key("Images_/chart_data.json"));
        assert!(!files.contains_key("Data_/chart_data.json"));
    }

    #[tokio::test]
    async fn test_bundle_written_under_data_dir() {
        let storage = MemoryStorage::default();
        storage
            .write_file("landings.csv", &landings_csv())
            .await
            .unwrap();
        let pipeline = EdaPipeline::new(
            storage,
            TestConfig {
                bundle: Some("bundle.zip".to_string()),
            },
        );

        let table = pipeline.extract().await.unwrap();
        let result = pipeline.transform(table).await.unwrap();
        let location = pipeline.load(result).await.unwrap();
        assert_eq!(location, "out/Data_/bundle.zip");

        let files = pipeline.storage.files.lock().unwrap();
        let zip_data = files.get("Data_/bundle.zip").unwrap();
        assert_eq!(&zip_data[..2], b"PK");
    }

    #[tokio::test]
    async fn test_missing_input_is_io_error() {
        let pipeline = EdaPipeline::new(MemoryStorage::default(), TestConfig { bundle: None });
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EdaError::IoError(_)));
    }
}
