use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A regulation expressed as data: prohibited and restricted substances plus
/// labeling requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regulation {
    pub regulation: RegulationInfo,
    #[serde(default)]
    pub labeling: LabelingRules,
    #[serde(default)]
    pub prohibited: Vec<SubstanceRule>,
    #[serde(default)]
    pub restricted: Vec<SubstanceRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulationInfo {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelingRules {
    #[serde(default = "default_true")]
    pub require_ingredient_list: bool,
}

impl Default for LabelingRules {
    fn default() -> Self {
        Self {
            require_ingredient_list: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstanceRule {
    pub name: String,
    pub cas: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Maximum concentration in the finished product, percent.
    pub max_concentration: Option<f64>,
    /// Text that must appear on the label when the substance is present.
    pub required_warning: Option<String>,
    pub reference: Option<String>,
}

impl Regulation {
    /// 從 TOML 檔案載入法規
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let regulation = Self::from_toml_str(&content)?;
        tracing::info!(
            "📜 Loaded regulation '{}' from {} ({} prohibited, {} restricted)",
            regulation.regulation.name,
            path.display(),
            regulation.prohibited.len(),
            regulation.restricted.len()
        );
        Ok(regulation)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let regulation: Regulation = toml::from_str(content)?;
        regulation.validate()?;
        Ok(regulation)
    }
}

impl Validate for Regulation {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("regulation.name", &self.regulation.name)?;

        let cas_format = Regex::new(r"^\d{2,7}-\d{2}-\d$")?;

        let lists = [("prohibited", &self.prohibited), ("restricted", &self.restricted)];
        for (list_name, rules) in lists {
            for (i, rule) in rules.iter().enumerate() {
                let field = format!("{}[{}]", list_name, i);
                validate_non_empty_string(&format!("{}.name", field), &rule.name)?;

                if let Some(cas) = &rule.cas {
                    if !cas_format.is_match(cas.trim()) {
                        return Err(AuditError::InvalidConfigValueError {
                            field: format!("{}.cas", field),
                            value: cas.clone(),
                            reason: "CAS number must look like 7732-18-5".to_string(),
                        });
                    }
                }

                if let Some(max) = rule.max_concentration {
                    validate_range(&format!("{}.max_concentration", field), max, 0.0, 100.0)?;
                }
            }
        }

        Ok(())
    }
}
