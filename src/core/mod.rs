pub mod etl;

pub use crate::domain::model::{AuditResult, ProductRecord, RunSummary};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TextExtractor};
pub use crate::utils::error::Result;
