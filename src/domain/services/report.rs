use crate::domain::model::{AuditResult, Finding, ProductAssessment, Verdict};
use crate::utils::error::{AuditError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;

pub const SUPPORTED_FORMATS: &[&str] = &["csv", "tsv", "json"];

const PRODUCT_HEADERS: &[&str] = &[
    "file_name",
    "verdict",
    "ingredient_source",
    "extraction",
    "status",
    "ingredients",
    "source_path",
];
const FINDING_HEADERS: &[&str] = &[
    "file_name",
    "kind",
    "severity",
    "substance",
    "reference",
    "detail",
    "source_path",
];
const NON_COMPLIANT_HEADERS: &[&str] = &["file_name", "findings", "kinds", "source_path"];

/// One rendered report file, ready to be zipped or written.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub generated_at: String,
    pub regulation: Option<String>,
    pub regulation_version: Option<String>,
    pub products: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub unverified: usize,
    pub findings: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: ReportSummary,
    products: &'a [ProductAssessment],
    findings: &'a [Finding],
}

pub fn summarize(result: &AuditResult, generated_at: DateTime<Utc>) -> ReportSummary {
    ReportSummary {
        generated_at: generated_at.to_rfc3339(),
        regulation: result.regulation_name.clone(),
        regulation_version: result.regulation_version.clone(),
        products: result.assessments.len(),
        compliant: result.count(Verdict::Compliant),
        non_compliant: result.count(Verdict::NonCompliant),
        unverified: result.count(Verdict::Unverified),
        findings: result.findings.len(),
    }
}

fn render_table(headers: &[&str], rows: &[Vec<String>], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }

    writer.into_inner().map_err(|e| AuditError::ProcessingError {
        message: format!("Failed to flush report table: {}", e),
    })
}

fn product_rows(result: &AuditResult) -> Vec<Vec<String>> {
    result
        .assessments
        .iter()
        .map(|a| {
            let p = &a.product;
            vec![
                p.file_name.clone(),
                a.verdict.to_string(),
                p.source.to_string(),
                p.extraction.to_string(),
                p.status.to_string(),
                p.ingredients.clone().unwrap_or_default(),
                p.source_path.clone(),
            ]
        })
        .collect()
}

fn finding_rows(result: &AuditResult) -> Vec<Vec<String>> {
    result
        .findings
        .iter()
        .map(|f| {
            vec![
                f.file_name.clone(),
                f.kind.to_string(),
                f.severity.to_string(),
                f.substance.clone().unwrap_or_default(),
                f.reference.clone().unwrap_or_default(),
                f.detail.clone(),
                f.source_path.clone(),
            ]
        })
        .collect()
}

fn non_compliant_rows(result: &AuditResult) -> Vec<Vec<String>> {
    result
        .assessments
        .iter()
        .filter(|a| a.verdict == Verdict::NonCompliant)
        .map(|a| {
            let findings: Vec<&Finding> = result.findings_for(&a.product).collect();
            let mut seen = HashSet::new();
            let kinds: Vec<&str> = findings
                .iter()
                .map(|f| f.kind.as_str())
                .filter(|kind| seen.insert(*kind))
                .collect();
            vec![
                a.product.file_name.clone(),
                findings.len().to_string(),
                kinds.join(";"),
                a.product.source_path.clone(),
            ]
        })
        .collect()
}

/// Reporte: render the audit into the requested formats.
pub fn render_report(
    result: &AuditResult,
    formats: &[String],
    generated_at: DateTime<Utc>,
) -> Result<Vec<ReportFile>> {
    let mut files = Vec::new();

    let tables = [
        ("products", PRODUCT_HEADERS, product_rows(result)),
        ("findings", FINDING_HEADERS, finding_rows(result)),
        ("non_compliant", NON_COMPLIANT_HEADERS, non_compliant_rows(result)),
    ];

    for format in formats {
        match format.as_str() {
            "csv" | "tsv" => {
                let delimiter = if format == "csv" { b',' } else { b'\t' };
                for (name, headers, rows) in &tables {
                    files.push(ReportFile {
                        name: format!("{}.{}", name, format),
                        contents: render_table(headers, rows, delimiter)?,
                    });
                }
            }
            "json" => {
                let report = JsonReport {
                    summary: summarize(result, generated_at),
                    products: &result.assessments,
                    findings: &result.findings,
                };
                files.push(ReportFile {
                    name: "report.json".to_string(),
                    contents: serde_json::to_vec_pretty(&report)?,
                });
            }
            other => {
                return Err(AuditError::InvalidConfigValueError {
                    field: "load.output_formats".to_string(),
                    value: other.to_string(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        SUPPORTED_FORMATS.join(", ")
                    ),
                });
            }
        }
    }

    Ok(files)
}
