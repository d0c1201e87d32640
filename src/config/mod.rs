pub mod domain_config;

use crate::core::ConfigProvider;
use crate::domain::model::ImageFormat;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use domain_config::DomainConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "posemesh-map")]
#[command(about = "Download a domain occupancy map from posemesh and save it locally")]
pub struct CliConfig {
    /// Path to the domain configuration file
    #[arg(short, long, default_value = "domain.toml")]
    pub config: String,

    /// Raster format to write (overrides [output].format)
    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Map resolution in pixels per meter (overrides [output].resolution)
    #[arg(long)]
    pub resolution: Option<f64>,

    /// Directory for map.<format> and map.yaml (overrides [output].directory)
    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Command line values win over the file's `[output]` section.
    pub fn resolve(&self, domain: &DomainConfig) -> MapSettings {
        let defaults = MapSettings::from_domain_config(domain);
        MapSettings {
            image_format: self.format.unwrap_or(defaults.image_format),
            resolution: self.resolution.unwrap_or(defaults.resolution),
            output_path: self.output_dir.clone().unwrap_or(defaults.output_path),
        }
    }
}

/// Per-run map options after merging the config file and command line.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub image_format: ImageFormat,
    pub resolution: f64,
    pub output_path: String,
}

impl MapSettings {
    pub fn from_domain_config(domain: &DomainConfig) -> Self {
        Self {
            image_format: domain.image_format(),
            resolution: domain.resolution(),
            output_path: domain.output_directory().to_string(),
        }
    }
}

impl Validate for MapSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_positive("resolution", self.resolution)?;
        validation::validate_path("output_dir", &self.output_path)?;
        Ok(())
    }
}

impl ConfigProvider for MapSettings {
    fn image_format(&self) -> ImageFormat {
        self.image_format
    }

    fn resolution(&self) -> f64 {
        self.resolution
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}
