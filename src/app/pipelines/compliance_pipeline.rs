use crate::app::discovery::discover_inputs;
use crate::config::regulation::Regulation;
use crate::domain::model::{AuditResult, ProductRecord};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TextExtractor};
use crate::domain::services::{analysis, ingredients::IngredientParser, report};
use crate::utils::error::{AuditError, Result};
use chrono::Utc;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_ARCHIVE: &str = "compliance_report.zip";

/// Normalización → Análisis → Reporte over a set of PDF files.
pub struct CompliancePipeline<S: Storage, C: ConfigProvider, E: TextExtractor> {
    storage: S,
    config: C,
    extractor: Arc<E>,
    parser: Arc<IngredientParser>,
    regulation: Option<Regulation>,
}

impl<S: Storage, C: ConfigProvider, E: TextExtractor + 'static> CompliancePipeline<S, C, E> {
    /// Loads the regulation file named by the config, if any.
    pub fn new(storage: S, config: C, extractor: E) -> Result<Self> {
        let regulation = config
            .regulation_file()
            .map(Regulation::from_file)
            .transpose()?;

        Ok(Self {
            storage,
            config,
            extractor: Arc::new(extractor),
            parser: Arc::new(IngredientParser::new()?),
            regulation,
        })
    }

    pub fn with_regulation(mut self, regulation: Regulation) -> Self {
        self.regulation = Some(regulation);
        self
    }

    pub fn regulation(&self) -> Option<&Regulation> {
        self.regulation.as_ref()
    }
}

fn record_names(path: &Path) -> (String, String) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    (file_name, path.display().to_string())
}

fn normalize_file<E: TextExtractor>(
    extractor: &E,
    parser: &IngredientParser,
    path: &Path,
) -> ProductRecord {
    let (file_name, source_path) = record_names(path);

    tracing::info!("📄 Processing: {}", file_name);

    match extractor.extract_text(path) {
        Ok(extracted) => parser.normalize_document(file_name, source_path, extracted),
        Err(e) => {
            tracing::warn!("⚠️ Skipping {}: {}", file_name, e);
            ProductRecord::failed(file_name, source_path, e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl<S, C, E> Pipeline for CompliancePipeline<S, C, E>
where
    S: Storage,
    C: ConfigProvider,
    E: TextExtractor + 'static,
{
    async fn extract(&self) -> Result<Vec<ProductRecord>> {
        let paths = discover_inputs(self.config.inputs())?;
        tracing::debug!(
            "Normalizing {} documents with up to {} workers",
            paths.len(),
            self.config.concurrent_files()
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrent_files().max(1)));
        let mut handles = Vec::with_capacity(paths.len());

        for path in paths {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| AuditError::ProcessingError {
                    message: format!("Worker pool closed: {}", e),
                })?;
            let extractor = Arc::clone(&self.extractor);
            let parser = Arc::clone(&self.parser);
            let names = record_names(&path);

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                normalize_file(extractor.as_ref(), &parser, &path)
            });
            handles.push((names, handle));
        }

        // 依輸入順序收集結果；單一檔案的 panic 只影響該檔案
        let mut products = Vec::with_capacity(handles.len());
        for ((file_name, source_path), handle) in handles {
            match handle.await {
                Ok(product) => products.push(product),
                Err(join_error) => {
                    tracing::warn!("⚠️ Worker for {} died: {}", file_name, join_error);
                    products.push(ProductRecord::failed(
                        file_name,
                        source_path,
                        join_error.to_string(),
                    ));
                }
            }
        }

        Ok(products)
    }

    async fn transform(&self, products: Vec<ProductRecord>) -> Result<AuditResult> {
        Ok(analysis::analyze(products, self.regulation.as_ref()))
    }

    async fn load(&self, result: AuditResult) -> Result<String> {
        let files = report::render_report(&result, self.config.output_formats(), Utc::now())?;

        if !self.config.compress_output() {
            for file in &files {
                tracing::debug!("Writing {} ({} bytes)", file.name, file.contents.len());
                self.storage.write_file(&file.name, &file.contents).await?;
            }
            return Ok(self.config.output_path().to_string());
        }

        tracing::debug!("Creating ZIP file with {} files", files.len());

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for file in &files {
                zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
                zip.write_all(&file.contents)?;
            }

            // 完成並取回底層 Vec<u8>
            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(REPORT_ARCHIVE, &zip_data).await?;

        Ok(format!("{}/{}", self.config.output_path(), REPORT_ARCHIVE))
    }
}
