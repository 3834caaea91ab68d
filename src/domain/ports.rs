use crate::domain::model::{AuditResult, ExtractedText, OcrSettings, ProductRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Files or directories to scan for PDFs.
    fn inputs(&self) -> &[String];
    fn regulation_file(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn compress_output(&self) -> bool;
    fn concurrent_files(&self) -> usize;
    fn ocr_settings(&self) -> OcrSettings;
}

/// Turns one document into plain text. Blocking; callers run it off the async runtime.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<ExtractedText>;
}

/// Normalización → Análisis → Reporte.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<ProductRecord>>;
    async fn transform(&self, products: Vec<ProductRecord>) -> Result<AuditResult>;
    async fn load(&self, result: AuditResult) -> Result<String>;
}
