use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting ETL process...");
        self.monitor.log_stats("start");

        tracing::info!("Extracting data...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} rows with {} columns",
            raw_data.len(),
            raw_data.headers.len()
        );
        self.monitor.log_stats("extract");

        tracing::info!("Transforming data...");
        let result = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Processed {} records into {} artifacts",
            result.records_processed,
            result.artifacts.len()
        );
        for line in &result.highlights {
            tracing::info!("📊 {}", line);
        }
        self.monitor.log_stats("transform");

        tracing::info!("Loading data...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AnalysisResult, Artifact, ArtifactKind, RawTable};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPipeline {
        phases: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl Pipeline for RecordingPipeline {
        async fn extract(&self) -> Result<RawTable> {
            self.phases.lock().unwrap().push("extract");
            Ok(RawTable::new(vec!["year".into()], vec![vec!["2000".into()]]))
        }

        async fn transform(&self, data: RawTable) -> Result<AnalysisResult> {
            self.phases.lock().unwrap().push("transform");
            Ok(AnalysisResult {
                artifacts: vec![Artifact::new("a.txt", ArtifactKind::Text, "x")],
                records_processed: data.len(),
                highlights: vec![],
            })
        }

        async fn load(&self, result: AnalysisResult) -> Result<String> {
            self.phases.lock().unwrap().push("load");
            Ok(format!("{} artifacts", result.artifacts.len()))
        }
    }

    #[tokio::test]
    async fn test_engine_runs_phases_in_order() {
        let engine = EtlEngine::new(RecordingPipeline::default());
        let output = engine.run().await.unwrap();
        assert_eq!(output, "1 artifacts");
        assert_eq!(
            *engine.pipeline.phases.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }
}
