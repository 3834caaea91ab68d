use crate::domain::model::OcrSettings;
use crate::domain::ports::ConfigProvider;
use crate::domain::services::report::SUPPORTED_FORMATS;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{
    validate_allowed_values, validate_existing_file, validate_non_empty_string, validate_path,
    validate_positive_number, validate_range, Validate,
};

/// Fully resolved settings for one audit run, after merging file and CLI values.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditSettings {
    pub inputs: Vec<String>,
    pub regulation_file: Option<String>,
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compress: bool,
    pub concurrent_files: usize,
    pub ocr: OcrSettings,
    pub monitor: bool,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            regulation_file: None,
            output_path: "./output".to_string(),
            output_formats: vec!["csv".to_string(), "json".to_string()],
            compress: true,
            concurrent_files: 4,
            ocr: OcrSettings::default(),
            monitor: false,
        }
    }
}

impl Validate for AuditSettings {
    fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(AuditError::MissingConfigError {
                field: "audit.inputs".to_string(),
            });
        }
        for input in &self.inputs {
            validate_path("audit.inputs", input)?;
        }

        if let Some(regulation) = &self.regulation_file {
            validate_existing_file("audit.regulation", regulation)?;
        }

        validate_path("load.output_path", &self.output_path)?;
        if self.output_formats.is_empty() {
            return Err(AuditError::MissingConfigError {
                field: "load.output_formats".to_string(),
            });
        }
        validate_allowed_values("load.output_formats", &self.output_formats, SUPPORTED_FORMATS)?;

        validate_positive_number("audit.concurrent_files", self.concurrent_files, 1)?;

        validate_range("ocr.dpi", self.ocr.dpi, 72, 1200)?;
        validate_non_empty_string("ocr.lang", &self.ocr.lang)?;
        if let Some(dir) = &self.ocr.poppler_path {
            validate_path("ocr.poppler_path", dir)?;
        }
        if let Some(cmd) = &self.ocr.tesseract_cmd {
            validate_path("ocr.tesseract_cmd", cmd)?;
        }

        Ok(())
    }
}

impl ConfigProvider for AuditSettings {
    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn regulation_file(&self) -> Option<&str> {
        self.regulation_file.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn compress_output(&self) -> bool {
        self.compress
    }

    fn concurrent_files(&self) -> usize {
        self.concurrent_files
    }

    fn ocr_settings(&self) -> OcrSettings {
        self.ocr.clone()
    }
}
