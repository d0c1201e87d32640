use crate::core::{MapReport, Pipeline, WriteOutcome};
use crate::utils::error::Result;

pub struct MapEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> MapEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Fetch, decode and write one map. Only fetch errors abort the run;
    /// per-file problems end up in the returned report.
    pub async fn run(&self) -> Result<MapReport> {
        tracing::info!("Starting map download...");

        let body = self.pipeline.extract().await?;
        tracing::info!("Received map payload ({} bytes)", body.len());

        let artifacts = self.pipeline.transform(body).await?;

        let report = self.pipeline.load(artifacts).await?;
        log_outcome("image", &report.raster);
        log_outcome("metadata", &report.metadata);

        Ok(report)
    }
}

fn log_outcome(artifact: &str, outcome: &WriteOutcome) {
    match outcome {
        WriteOutcome::Written(path) => tracing::debug!("{} written to {}", artifact, path),
        // pipeline already logged these at info/error
        WriteOutcome::Absent => tracing::debug!("{} skipped", artifact),
        WriteOutcome::EncodeFailed(_) | WriteOutcome::WriteFailed(_) => {
            tracing::debug!("{} failed", artifact)
        }
    }
}
