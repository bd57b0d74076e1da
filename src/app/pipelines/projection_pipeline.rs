use super::eda_pipeline::fetch_table;
use crate::analysis::projection::{project_geo_mass, project_id_year, GEO_MASS_FILE, ID_YEAR_FILE};
use crate::core::{csv_io, AnalysisResult, ConfigProvider, Pipeline, RawTable, Storage};
use crate::domain::model::{Artifact, ArtifactKind};
use crate::utils::error::Result;
use reqwest::Client;

/// Writes the `id,year` and `id,mass,GeoLocation` projections of the catalog.
pub struct ProjectionPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) client: Client,
}

impl<S: Storage, C: ConfigProvider> ProjectionPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ProjectionPipeline<S, C> {
    async fn extract(&self) -> Result<RawTable> {
        fetch_table(&self.storage, &self.client, &self.config.source()).await
    }

    async fn transform(&self, data: RawTable) -> Result<AnalysisResult> {
        let id_year = project_id_year(&data)?;
        let geo_mass = project_geo_mass(&data)?;

        Ok(AnalysisResult {
            records_processed: data.len(),
            highlights: vec![
                format!("{}: {} columns", ID_YEAR_FILE, id_year.headers.len()),
                format!("{}: {} rows", GEO_MASS_FILE, geo_mass.len()),
            ],
            artifacts: vec![
                Artifact::new(ID_YEAR_FILE, ArtifactKind::Csv, csv_io::write_table(&id_year)?),
                Artifact::new(GEO_MASS_FILE, ArtifactKind::Csv, csv_io::write_table(&geo_mass)?),
            ],
        })
    }

    async fn load(&self, result: AnalysisResult) -> Result<String> {
        for artifact in &result.artifacts {
            let path = format!("{}/{}", self.config.data_dir(), artifact.name);
            self.storage.write_file(&path, &artifact.contents).await?;
        }
        Ok(format!(
            "{}/{}",
            self.config.output_path(),
            self.config.data_dir()
        ))
    }
}
