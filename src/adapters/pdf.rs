//! PDF text extraction with OCR fallback for scanned documents.

use crate::adapters::ocr::{OcrBackend, OcrEngine};
use crate::domain::model::{ExtractedText, ExtractionMethod, OcrSettings};
use crate::domain::ports::TextExtractor;
use crate::utils::error::{AuditError, Result};
use lopdf::Document;
use std::path::Path;

/// Embedded text of every page, in page order, joined with newlines.
pub fn extract_embedded_text(path: &Path) -> Result<(String, usize)> {
    match extract_with_lopdf(path) {
        Ok(result) => Ok(result),
        Err(lopdf_error) => {
            tracing::debug!(
                "lopdf could not read {}: {}; trying pdf-extract",
                path.display(),
                lopdf_error
            );
            let text = pdf_extract::extract_text(path).map_err(|e| AuditError::PdfError {
                path: path.display().to_string(),
                message: format!("lopdf: {}; pdf-extract: {}", lopdf_error, e),
            })?;
            // pdf-extract 不保留頁面邊界
            Ok((text.trim().to_string(), 1))
        }
    }
}

fn extract_with_lopdf(path: &Path) -> std::result::Result<(String, usize), lopdf::Error> {
    let doc = Document::load(path)?;
    let pages = doc.get_pages();

    let mut chunks = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        let page_text = doc.extract_text(&[*page_number]).unwrap_or_else(|e| {
            tracing::debug!("No text on page {} of {}: {}", page_number, path.display(), e);
            String::new()
        });
        chunks.push(page_text);
    }

    Ok((chunks.join("\n").trim().to_string(), pages.len()))
}

pub struct PdfTextExtractor<O: OcrBackend = OcrEngine> {
    settings: OcrSettings,
    ocr: O,
}

impl PdfTextExtractor {
    pub fn new(settings: OcrSettings) -> Self {
        Self {
            ocr: OcrEngine::new(settings.clone()),
            settings,
        }
    }
}

impl<O: OcrBackend> PdfTextExtractor<O> {
    pub fn with_ocr(settings: OcrSettings, ocr: O) -> Self {
        Self { settings, ocr }
    }

    fn run_ocr(&self, path: &Path) -> Result<ExtractedText> {
        let output = self.ocr.recognize(path)?;
        Ok(ExtractedText {
            text: output.text,
            method: ExtractionMethod::Ocr,
            page_count: output.page_count,
        })
    }

    /// Decide between the embedded text and OCR.
    ///
    /// OCR runs when the embedded text is shorter than `min_chars` or could not
    /// be read at all. A failed OCR keeps the embedded text; if there was none,
    /// the original extraction error is returned.
    pub fn resolve_text(
        &self,
        path: &Path,
        embedded: Result<(String, usize)>,
    ) -> Result<ExtractedText> {
        let settings = &self.settings;

        match embedded {
            Ok((text, page_count)) => {
                let chars = text.chars().count();
                if chars >= settings.min_chars || !settings.enabled {
                    return Ok(ExtractedText {
                        text,
                        method: ExtractionMethod::Text,
                        page_count,
                    });
                }

                tracing::info!(
                    "📷 {} has only {} chars of embedded text, falling back to OCR",
                    path.display(),
                    chars
                );
                match self.run_ocr(path) {
                    Ok(extracted) => Ok(extracted),
                    Err(e) => {
                        tracing::warn!(
                            "⚠️ OCR failed for {}, keeping embedded text: {}",
                            path.display(),
                            e
                        );
                        Ok(ExtractedText {
                            text,
                            method: ExtractionMethod::Text,
                            page_count,
                        })
                    }
                }
            }
            Err(e) if settings.enabled => {
                tracing::warn!(
                    "⚠️ Embedded text extraction failed for {}, trying OCR: {}",
                    path.display(),
                    e
                );
                self.run_ocr(path).map_err(|ocr_error| {
                    tracing::debug!("OCR also failed for {}: {}", path.display(), ocr_error);
                    e
                })
            }
            Err(e) => Err(e),
        }
    }
}

impl<O: OcrBackend> TextExtractor for PdfTextExtractor<O> {
    fn extract_text(&self, path: &Path) -> Result<ExtractedText> {
        self.resolve_text(path, extract_embedded_text(path))
    }
}
