//! OCR for scanned documents: `pdftoppm` renders pages, `tesseract` reads them.

use crate::domain::model::OcrSettings;
use crate::utils::error::{AuditError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Turns a scanned document into text.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, path: &Path) -> Result<OcrOutput>;
}

#[derive(Debug, Clone)]
pub struct OcrEngine {
    settings: OcrSettings,
}

#[derive(Debug, Clone)]
pub struct OcrOutput {
    pub text: String,
    pub page_count: usize,
}

impl OcrEngine {
    pub fn new(settings: OcrSettings) -> Self {
        Self { settings }
    }

    pub fn pdftoppm_binary(&self) -> PathBuf {
        let exe = if cfg!(windows) { "pdftoppm.exe" } else { "pdftoppm" };
        match &self.settings.poppler_path {
            Some(dir) => Path::new(dir).join(exe),
            None => PathBuf::from(exe),
        }
    }

    pub fn tesseract_binary(&self) -> PathBuf {
        self.settings
            .tesseract_cmd
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("tesseract"))
    }

    /// Both tools respond to a version query.
    pub fn is_available(&self) -> bool {
        let pdftoppm = Command::new(self.pdftoppm_binary()).arg("-v").output().is_ok();
        let tesseract = Command::new(self.tesseract_binary())
            .arg("--version")
            .output()
            .is_ok();

        if !pdftoppm {
            tracing::debug!("pdftoppm not found - install poppler-utils for OCR support");
        }
        if !tesseract {
            tracing::debug!("tesseract not found - install tesseract-ocr for OCR support");
        }

        pdftoppm && tesseract
    }

    pub fn extract_text(&self, path: &Path) -> Result<OcrOutput> {
        let temp_dir = tempfile::tempdir()?;
        let output_prefix = temp_dir.path().join("page");

        tracing::info!(
            "🔎 Running OCR on {} (dpi={}, lang={})",
            path.display(),
            self.settings.dpi,
            self.settings.lang
        );

        let rendered = Command::new(self.pdftoppm_binary())
            .arg("-png")
            .arg("-r")
            .arg(self.settings.dpi.to_string())
            .arg(path)
            .arg(&output_prefix)
            .output()
            .map_err(|e| AuditError::OcrError {
                message: format!("Failed to run pdftoppm: {}", e),
            })?;

        if !rendered.status.success() {
            return Err(AuditError::OcrError {
                message: format!(
                    "pdftoppm failed: {}",
                    String::from_utf8_lossy(&rendered.stderr).trim()
                ),
            });
        }

        // pdftoppm 會補零編號 (page-01.png)，排序即為頁序
        let mut images: Vec<PathBuf> = std::fs::read_dir(temp_dir.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(AuditError::OcrError {
                message: "pdftoppm produced no images".to_string(),
            });
        }

        let mut chunks = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let output = Command::new(self.tesseract_binary())
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.settings.lang)
                .output()
                .map_err(|e| AuditError::OcrError {
                    message: format!("Failed to run tesseract on page {}: {}", i + 1, e),
                })?;

            if !output.status.success() {
                tracing::warn!(
                    "⚠️ tesseract reported an error on page {}: {}",
                    i + 1,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }

            chunks.push(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let text = chunks.join("\n").trim().to_string();
        tracing::debug!(
            "OCR finished for {}: {} pages, {} chars",
            path.display(),
            images.len(),
            text.chars().count()
        );

        Ok(OcrOutput {
            text,
            page_count: images.len(),
        })
    }
}

impl OcrBackend for OcrEngine {
    fn recognize(&self, path: &Path) -> Result<OcrOutput> {
        self.extract_text(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_resolution() {
        let engine = OcrEngine::new(OcrSettings::default());
        assert_eq!(engine.tesseract_binary(), PathBuf::from("tesseract"));
        assert!(engine
            .pdftoppm_binary()
            .to_string_lossy()
            .starts_with("pdftoppm"));

        let engine = OcrEngine::new(OcrSettings {
            poppler_path: Some("/opt/poppler/bin".to_string()),
            tesseract_cmd: Some("/opt/tesseract/tesseract".to_string()),
            ..OcrSettings::default()
        });
        assert!(engine.pdftoppm_binary().starts_with("/opt/poppler/bin"));
        assert_eq!(
            engine.tesseract_binary(),
            PathBuf::from("/opt/tesseract/tesseract")
        );
    }

    #[test]
    fn test_missing_tool_is_an_ocr_error() {
        let engine = OcrEngine::new(OcrSettings {
            poppler_path: Some("/nonexistent/poppler".to_string()),
            ..OcrSettings::default()
        });
        assert!(!engine.is_available());
        let err = engine.extract_text(Path::new("label.pdf")).unwrap_err();
        assert!(matches!(err, AuditError::OcrError { .. }));
    }
}
