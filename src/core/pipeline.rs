use crate::core::metadata::rewrite_metadata;
use crate::core::multipart::extract_map_parts;
use crate::core::raster::encode_raster;
use crate::core::session::DomainSession;
use crate::core::{
    Artifact, ConfigProvider, Extracted, MapArtifacts, MapReport, Pipeline, Storage, WriteOutcome,
};
use crate::domain::model::METADATA_FILE_NAME;
use crate::utils::error::Result;

/// Fetches one map for an authenticated session and writes it through `S`.
pub struct MapPipeline<S: Storage, C: ConfigProvider> {
    session: DomainSession,
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> MapPipeline<S, C> {
    pub fn new(session: DomainSession, storage: S, config: C) -> Self {
        Self {
            session,
            storage,
            config,
        }
    }

    fn output_location(&self, file_name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), file_name)
    }

    async fn write_artifact(&self, file_name: &str, data: &[u8]) -> WriteOutcome {
        match self.storage.write_file(file_name, data).await {
            Ok(()) => WriteOutcome::Written(self.output_location(file_name)),
            Err(e) => WriteOutcome::WriteFailed(e.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MapPipeline<S, C> {
    async fn extract(&self) -> Result<String> {
        self.session
            .fetch_map(self.config.image_format(), self.config.resolution())
            .await
    }

    async fn transform(&self, body: String) -> Result<MapArtifacts> {
        let format = self.config.image_format();
        let payload = extract_map_parts(&body);

        let raster = match payload.image {
            Extracted::Found(bytes) => match encode_raster(&bytes, format) {
                Ok(raster) => Artifact::Ready(raster),
                Err(e) => {
                    tracing::error!("❌ Failed to save image in {} format: {}", format, e);
                    Artifact::Failed(e.to_string())
                }
            },
            Extracted::Invalid(reason) => {
                tracing::error!("❌ Failed to save image in {} format: {}", format, reason);
                Artifact::Failed(reason)
            }
            Extracted::Missing => {
                tracing::info!("Image data not found in map response");
                Artifact::Absent
            }
        };

        let metadata = match payload.yaml {
            Extracted::Found(text) => match rewrite_metadata(&text, &format.file_name()) {
                Ok(yaml) => Artifact::Ready(yaml),
                Err(e) => {
                    tracing::error!("❌ Failed to update map metadata: {}", e);
                    Artifact::Failed(e.to_string())
                }
            },
            Extracted::Invalid(reason) => Artifact::Failed(reason),
            Extracted::Missing => {
                tracing::info!("YAML data not found in map response");
                Artifact::Absent
            }
        };

        Ok(MapArtifacts { raster, metadata })
    }

    async fn load(&self, artifacts: MapArtifacts) -> Result<MapReport> {
        let raster = match artifacts.raster {
            Artifact::Ready(raster) => {
                let outcome = self.write_artifact(&raster.file_name, &raster.bytes).await;
                match &outcome {
                    WriteOutcome::Written(path) => tracing::info!(
                        "🖼️ Image saved as {} ({}x{})",
                        path,
                        raster.width,
                        raster.height
                    ),
                    WriteOutcome::WriteFailed(e) => {
                        tracing::error!("❌ Failed to write {}: {}", raster.file_name, e)
                    }
                    _ => {}
                }
                outcome
            }
            Artifact::Failed(reason) => WriteOutcome::EncodeFailed(reason),
            Artifact::Absent => WriteOutcome::Absent,
        };

        let metadata = match artifacts.metadata {
            Artifact::Ready(yaml) => {
                let outcome = self.write_artifact(METADATA_FILE_NAME, yaml.as_bytes()).await;
                match &outcome {
                    WriteOutcome::Written(path) => {
                        tracing::info!("📝 Updated YAML saved as {}", path)
                    }
                    WriteOutcome::WriteFailed(e) => {
                        tracing::error!("❌ Failed to write {}: {}", METADATA_FILE_NAME, e)
                    }
                    _ => {}
                }
                outcome
            }
            Artifact::Failed(reason) => WriteOutcome::EncodeFailed(reason),
            Artifact::Absent => WriteOutcome::Absent,
        };

        Ok(MapReport { raster, metadata })
    }
}
