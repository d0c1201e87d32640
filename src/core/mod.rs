pub mod engine;
pub mod metadata;
pub mod multipart;
pub mod pipeline;
pub mod raster;
pub mod session;

pub use crate::domain::model::{
    Artifact, EncodedRaster, Extracted, ImageFormat, MapArtifacts, MapPayload, MapReport,
    WriteOutcome,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
