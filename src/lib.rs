pub mod analysis;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

pub use config::cli::LocalStorage;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::{EdaPipeline, ProjectionPipeline};
pub use core::etl::EtlEngine;
pub use utils::error::{EdaError, Result};
