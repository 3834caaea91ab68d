use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid pattern: {0}")]
    RegexError(#[from] regex::Error),

    #[error("PDF extraction failed for {path}: {message}")]
    PdfError { path: String, message: String },

    #[error("OCR failed: {message}")]
    OcrError { message: String },

    #[error("No PDF files found in inputs: {inputs}")]
    NoInputFiles { inputs: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Extraction,
    Output,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AuditError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AuditError::ConfigValidationError { .. }
            | AuditError::InvalidConfigValueError { .. }
            | AuditError::MissingConfigError { .. }
            | AuditError::TomlError(_)
            | AuditError::RegexError(_) => ErrorCategory::Configuration,
            AuditError::NoInputFiles { .. } => ErrorCategory::Input,
            AuditError::PdfError { .. } | AuditError::OcrError { .. } => ErrorCategory::Extraction,
            AuditError::ZipError(_) | AuditError::CsvError(_) | AuditError::SerializationError(_) => {
                ErrorCategory::Output
            }
            AuditError::ProcessingError { .. } => ErrorCategory::Processing,
            AuditError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Extraction => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Processing => {
                ErrorSeverity::High
            }
            ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AuditError::PdfError { .. } => {
                "Check that the file is a valid, unencrypted PDF; scanned files need OCR enabled"
            }
            AuditError::OcrError { .. } => {
                "Install poppler-utils and tesseract-ocr, or point --poppler-path / --tesseract-cmd at them"
            }
            AuditError::NoInputFiles { .. } => {
                "Pass PDF files or directories containing .pdf files with --input"
            }
            AuditError::TomlError(_) => "Make sure the file is valid TOML",
            AuditError::RegexError(_) => "Check the pattern syntax in the configuration",
            AuditError::MissingConfigError { .. } => {
                "Provide the missing value on the command line or in the config file"
            }
            AuditError::ConfigValidationError { .. } | AuditError::InvalidConfigValueError { .. } => {
                "Review the configuration values and try again"
            }
            AuditError::ZipError(_) | AuditError::CsvError(_) | AuditError::SerializationError(_) => {
                "Check that the output directory is writable and has free space"
            }
            AuditError::IoError(_) => "Check file paths and permissions",
            AuditError::ProcessingError { .. } => {
                "Re-run with --verbose to see which file caused the problem"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AuditError::PdfError { path, .. } => format!("Could not read PDF '{}'", path),
            AuditError::OcrError { .. } => "OCR tools are unavailable or failed".to_string(),
            AuditError::NoInputFiles { .. } => "No PDF files to audit".to_string(),
            AuditError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            AuditError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            AuditError::ConfigValidationError { field, message } => {
                format!("Invalid setting '{}': {}", field, message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
