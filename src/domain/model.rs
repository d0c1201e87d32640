use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Height of the horizontal slice the service renders, in meters.
pub const MAP_SLICE_HEIGHT: f64 = 0.1;

pub const METADATA_FILE_NAME: &str = "map.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Bmp,
    Pgm,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Pgm => "pgm",
        }
    }

    pub fn file_name(&self) -> String {
        format!("map.{}", self.extension())
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "bmp" => Ok(ImageFormat::Bmp),
            "pgm" => Ok(ImageFormat::Pgm),
            other => Err(format!(
                "Unsupported image format '{}'. Valid formats: png, bmp, pgm",
                other
            )),
        }
    }
}

/// Domain auth response. Fields beyond the token and server URL are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainInfo {
    pub access_token: String,
    pub domain_server: DomainServer,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainServer {
    pub url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequest {
    pub domain_id: String,
    pub domain_server_url: String,
    pub height: f64,
    pub pixels_per_meter: f64,
}

/// One field pulled out of the multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted<T> {
    Found(T),
    /// The field marker never appeared in the body.
    Missing,
    /// The marker was there but its payload was unusable.
    Invalid(String),
}

impl<T> Extracted<T> {
    pub fn found(&self) -> Option<&T> {
        match self {
            Extracted::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Extracted::Missing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPayload {
    pub image: Extracted<Vec<u8>>,
    pub yaml: Extracted<String>,
}

#[derive(Debug, Clone)]
pub struct EncodedRaster {
    pub format: ImageFormat,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

/// An output file after the transform phase, before anything touches disk.
#[derive(Debug, Clone)]
pub enum Artifact<T> {
    Ready(T),
    Absent,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct MapArtifacts {
    pub raster: Artifact<EncodedRaster>,
    pub metadata: Artifact<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(String),
    /// The response carried no such part.
    Absent,
    /// The part was present but could not be decoded or re-encoded.
    EncodeFailed(String),
    /// Encoding succeeded but storage rejected the write.
    WriteFailed(String),
}

impl WriteOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            WriteOutcome::EncodeFailed(_) | WriteOutcome::WriteFailed(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapReport {
    pub raster: WriteOutcome,
    pub metadata: WriteOutcome,
}

impl MapReport {
    pub fn has_failures(&self) -> bool {
        self.raster.is_failure() || self.metadata.is_failure()
    }

    pub fn written_files(&self) -> Vec<&str> {
        [&self.raster, &self.metadata]
            .into_iter()
            .filter_map(|outcome| match outcome {
                WriteOutcome::Written(path) => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }
}
