pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::HttpTransport, storage::LocalStorage};
pub use config::{domain_config::DomainConfig, MapSettings};
pub use core::{engine::MapEngine, pipeline::MapPipeline, session::DomainSession};
pub use domain::model::{ImageFormat, MapReport, WriteOutcome};
pub use utils::error::{MapError, Result};
