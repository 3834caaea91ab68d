pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{pdf::PdfTextExtractor, storage::LocalStorage};
pub use app::pipelines::CompliancePipeline;
pub use config::{AuditSettings, Regulation, TomlConfig};
pub use crate::core::etl::AuditEngine;
pub use utils::error::{AuditError, Result};
