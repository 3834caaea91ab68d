use serde::{Deserialize, Serialize};
use std::fmt;

/// How the text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Text,
    Ocr,
    None,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractionMethod::Text => "text",
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::None => "none",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub method: ExtractionMethod,
    pub page_count: usize,
}

/// Which strategy found the ingredient list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientSource {
    Inline,
    Table,
    None,
}

impl fmt::Display for IngredientSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IngredientSource::Inline => "inline",
            IngredientSource::Table => "table",
            IngredientSource::None => "none",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    /// Percentage, when the document states one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concentration: Option<f64>,
}

impl IngredientEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cas: None,
            concentration: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientList {
    pub source: IngredientSource,
    /// The list as one cleaned, comma separated string.
    pub joined: String,
    pub entries: Vec<IngredientEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ProductStatus {
    Ok,
    NoIngredients,
    Failed(String),
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductStatus::Ok => f.write_str("ok"),
            ProductStatus::NoIngredients => f.write_str("no_ingredients"),
            ProductStatus::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// One row of the normalized product table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub file_name: String,
    pub source_path: String,
    pub ingredients: Option<String>,
    pub entries: Vec<IngredientEntry>,
    pub source: IngredientSource,
    pub extraction: ExtractionMethod,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub text: String,
    pub status: ProductStatus,
}

impl ProductRecord {
    pub fn failed(file_name: String, source_path: String, message: String) -> Self {
        Self {
            file_name,
            source_path,
            ingredients: None,
            entries: Vec::new(),
            source: IngredientSource::None,
            extraction: ExtractionMethod::None,
            text: String::new(),
            status: ProductStatus::Failed(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    ExtractionFailed,
    MissingIngredientList,
    ProhibitedSubstance,
    ConcentrationExceeded,
    MissingWarning,
}

impl FindingKind {
    pub fn severity(self) -> Severity {
        match self {
            FindingKind::ExtractionFailed => Severity::Low,
            FindingKind::MissingWarning => Severity::Medium,
            FindingKind::MissingIngredientList | FindingKind::ConcentrationExceeded => {
                Severity::High
            }
            FindingKind::ProhibitedSubstance => Severity::Critical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::ExtractionFailed => "extraction_failed",
            FindingKind::MissingIngredientList => "missing_ingredient_list",
            FindingKind::ProhibitedSubstance => "prohibited_substance",
            FindingKind::ConcentrationExceeded => "concentration_exceeded",
            FindingKind::MissingWarning => "missing_warning",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub file_name: String,
    /// Path of the document as given, unique within a run.
    pub source_path: String,
    pub kind: FindingKind,
    pub severity: Severity,
    pub substance: Option<String>,
    pub detail: String,
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Compliant,
    NonCompliant,
    Unverified,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Compliant => "compliant",
            Verdict::NonCompliant => "non_compliant",
            Verdict::Unverified => "unverified",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAssessment {
    pub product: ProductRecord,
    pub verdict: Verdict,
}

/// Output of the analysis stage, consumed by the report stage.
#[derive(Debug, Clone)]
pub struct AuditResult {
    pub assessments: Vec<ProductAssessment>,
    pub findings: Vec<Finding>,
    pub regulation_name: Option<String>,
    pub regulation_version: Option<String>,
}

impl AuditResult {
    pub fn count(&self, verdict: Verdict) -> usize {
        self.assessments
            .iter()
            .filter(|a| a.verdict == verdict)
            .count()
    }

    pub fn findings_for<'a>(
        &'a self,
        product: &'a ProductRecord,
    ) -> impl Iterator<Item = &'a Finding> {
        self.findings
            .iter()
            .filter(move |f| f.source_path == product.source_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub output_path: String,
    pub products: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub unverified: usize,
    pub findings: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrSettings {
    pub enabled: bool,
    pub min_chars: usize,
    pub dpi: u32,
    pub lang: String,
    pub poppler_path: Option<String>,
    pub tesseract_cmd: Option<String>,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            min_chars: 40,
            dpi: 300,
            lang: "eng".to_string(),
            poppler_path: None,
            tesseract_cmd: None,
        }
    }
}
