use crate::config::settings::AuditSettings;
use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::Parser;

/// Command line flags. Anything left unset falls back to the `--config` file,
/// then to the built-in defaults.
#[derive(Debug, Clone, Parser)]
#[command(name = "label-audit")]
#[command(about = "Extract ingredient lists from product PDFs and check them against a regulation")]
pub struct CliConfig {
    /// PDF files or directories containing PDFs
    #[arg(short, long = "input", value_delimiter = ',')]
    pub inputs: Vec<String>,

    /// Regulation file (TOML) with prohibited and restricted substances
    #[arg(short, long)]
    pub regulation: Option<String>,

    /// Run configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long)]
    pub output_path: Option<String>,

    /// Report formats: csv, tsv, json
    #[arg(long, value_delimiter = ',')]
    pub formats: Option<Vec<String>>,

    /// Write report files individually instead of one ZIP archive
    #[arg(long)]
    pub no_compress: bool,

    #[arg(long)]
    pub concurrent_files: Option<usize>,

    /// Never run OCR, even for scanned documents
    #[arg(long)]
    pub no_ocr: bool,

    /// Run OCR when embedded text is shorter than this many characters
    #[arg(long)]
    pub ocr_min_chars: Option<usize>,

    /// Tesseract language(s), e.g. "spa+eng"
    #[arg(long)]
    pub ocr_lang: Option<String>,

    #[arg(long)]
    pub ocr_dpi: Option<u32>,

    /// Directory containing pdftoppm
    #[arg(long)]
    pub poppler_path: Option<String>,

    /// Path to the tesseract executable
    #[arg(long)]
    pub tesseract_cmd: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory after each stage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    /// List the PDFs that would be processed and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with code 4 when any product is non-compliant
    #[arg(long)]
    pub strict: bool,
}

impl CliConfig {
    /// Merge flags over the config file (if any) over defaults.
    pub fn resolve(&self) -> Result<AuditSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)?.into_settings()
            }
            None => AuditSettings::default(),
        };

        // 應用命令列覆蓋設定
        if !self.inputs.is_empty() {
            settings.inputs = self.inputs.clone();
        }
        if let Some(regulation) = &self.regulation {
            settings.regulation_file = Some(regulation.clone());
        }
        if let Some(output_path) = &self.output_path {
            settings.output_path = output_path.clone();
        }
        if let Some(formats) = &self.formats {
            settings.output_formats = formats.iter().map(|f| f.trim().to_lowercase()).collect();
        }
        if self.no_compress {
            settings.compress = false;
        }
        if let Some(n) = self.concurrent_files {
            settings.concurrent_files = n;
        }
        if self.no_ocr {
            settings.ocr.enabled = false;
        }
        if let Some(min_chars) = self.ocr_min_chars {
            settings.ocr.min_chars = min_chars;
        }
        if let Some(lang) = &self.ocr_lang {
            settings.ocr.lang = lang.clone();
        }
        if let Some(dpi) = self.ocr_dpi {
            settings.ocr.dpi = dpi;
        }
        if let Some(dir) = &self.poppler_path {
            settings.ocr.poppler_path = Some(dir.clone());
        }
        if let Some(cmd) = &self.tesseract_cmd {
            settings.ocr.tesseract_cmd = Some(cmd.clone());
        }
        if self.monitor {
            settings.monitor = true;
        }

        Ok(settings)
    }
}
