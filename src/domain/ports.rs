use crate::domain::model::{ImageFormat, MapArtifacts, MapReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn image_format(&self) -> ImageFormat;
    fn resolution(&self) -> f64;
    fn output_path(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Fetches the raw multipart body.
    async fn extract(&self) -> Result<String>;
    async fn transform(&self, body: String) -> Result<MapArtifacts>;
    async fn load(&self, artifacts: MapArtifacts) -> Result<MapReport>;
}
