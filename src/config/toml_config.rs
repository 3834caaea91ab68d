use crate::config::settings::AuditSettings;
use crate::utils::error::{AuditError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Run configuration file. Every section is optional; missing values fall back
/// to [`AuditSettings::default`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub audit: AuditSection,
    #[serde(default)]
    pub ocr: OcrSection,
    #[serde(default)]
    pub load: LoadSection,
    #[serde(default)]
    pub monitoring: MonitoringSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSection {
    #[serde(default)]
    pub inputs: Vec<String>,
    pub regulation: Option<String>,
    pub concurrent_files: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrSection {
    pub enabled: Option<bool>,
    pub min_chars: Option<usize>,
    pub dpi: Option<u32>,
    pub lang: Option<String>,
    pub poppler_path: Option<String>,
    pub tesseract_cmd: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadSection {
    pub output_path: Option<String>,
    pub output_formats: Option<Vec<String>>,
    pub compress: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringSection {
    #[serde(default)]
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AuditError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PDF_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }

    pub fn into_settings(self) -> AuditSettings {
        let defaults = AuditSettings::default();
        let ocr_defaults = defaults.ocr.clone();

        AuditSettings {
            inputs: self.audit.inputs,
            regulation_file: self.audit.regulation,
            output_path: self.load.output_path.unwrap_or(defaults.output_path),
            output_formats: self.load.output_formats.unwrap_or(defaults.output_formats),
            compress: self.load.compress.unwrap_or(defaults.compress),
            concurrent_files: self
                .audit
                .concurrent_files
                .unwrap_or(defaults.concurrent_files),
            ocr: crate::domain::model::OcrSettings {
                enabled: self.ocr.enabled.unwrap_or(ocr_defaults.enabled),
                min_chars: self.ocr.min_chars.unwrap_or(ocr_defaults.min_chars),
                dpi: self.ocr.dpi.unwrap_or(ocr_defaults.dpi),
                lang: self.ocr.lang.unwrap_or(ocr_defaults.lang),
                poppler_path: self.ocr.poppler_path,
                tesseract_cmd: self.ocr.tesseract_cmd,
            },
            monitor: self.monitoring.enabled,
        }
    }
}
