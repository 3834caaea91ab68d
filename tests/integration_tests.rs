use anyhow::Result;
use label_audit::domain::model::{ExtractedText, ExtractionMethod, OcrSettings};
use label_audit::domain::ports::TextExtractor;
use label_audit::{AuditEngine, AuditError, AuditSettings, CompliancePipeline, LocalStorage};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

const REGULATION: &str = r#"
[regulation]
name = "Reglamento (CE) 1223/2009"
version = "2024-01"

[[prohibited]]
name = "HYDROQUINONE"
cas = "123-31-9"
reference = "Annex II/1339"

[[restricted]]
name = "SALICYLIC ACID"
cas = "69-72-7"
max_concentration = 2.0
required_warning = "Not to be used for children under 3 years of age"
reference = "Annex III/98"
"#;

const LABEL_OK: &str = "PURIFYING SCRUB 125 ml
Ingredients: Aqua, Sodium Chloride, Glycerin,
Parfum (Fragrance), Citric Acid.
Made in Italy";

const LABEL_PROHIBITED: &str = "BUTTERFLY 14 ml
INGREDIENTES: AQUA, ALCOHOL DENAT., HYDROQUINONE, PARFUM
Modo de empleo: aplicar sobre la piel";

const FORMULA_OVER_LIMIT: &str = "FORMULA TONE SOFTENER
No. INCI name CAS No. %
1 AQUA 7732-18-5 90,00
2 SALICYLIC ACID 69-72-7 2,50
3 GLYCERIN 56-81-5 7,50
Total 100,00";

/// Returns canned text keyed by file name, like a PDF with an embedded text layer.
struct CannedExtractor {
    texts: HashMap<String, String>,
}

impl TextExtractor for CannedExtractor {
    fn extract_text(&self, path: &Path) -> label_audit::Result<ExtractedText> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.texts
            .get(&name)
            .map(|text| ExtractedText {
                text: text.clone(),
                method: ExtractionMethod::Text,
                page_count: 1,
            })
            .ok_or_else(|| AuditError::PdfError {
                path: name,
                message: "invalid file header".to_string(),
            })
    }
}

struct Fixture {
    _input_dir: TempDir,
    output_dir: TempDir,
    settings: AuditSettings,
    extractor: CannedExtractor,
}

fn fixture(documents: &[(&str, Option<&str>)]) -> Result<Fixture> {
    let input_dir = TempDir::new()?;
    let output_dir = TempDir::new()?;

    let mut texts = HashMap::new();
    for (name, text) in documents {
        std::fs::write(input_dir.path().join(name), b"%PDF-1.4")?;
        if let Some(text) = text {
            texts.insert(name.to_string(), text.to_string());
        }
    }

    let regulation_path = input_dir.path().join("regulation.toml");
    std::fs::write(&regulation_path, REGULATION)?;

    let settings = AuditSettings {
        inputs: vec![input_dir.path().to_string_lossy().to_string()],
        regulation_file: Some(regulation_path.to_string_lossy().to_string()),
        output_path: output_dir.path().to_string_lossy().to_string(),
        output_formats: vec!["csv".to_string(), "tsv".to_string(), "json".to_string()],
        ocr: OcrSettings {
            enabled: false,
            ..OcrSettings::default()
        },
        ..AuditSettings::default()
    };

    Ok(Fixture {
        _input_dir: input_dir,
        output_dir,
        settings,
        extractor: CannedExtractor { texts },
    })
}

fn read_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> Result<String> {
    let mut content = String::new();
    archive.by_name(name)?.read_to_string(&mut content)?;
    Ok(content)
}

#[tokio::test]
async fn test_end_to_end_audit_to_zip() -> Result<()> {
    let f = fixture(&[
        ("COM-PURIFYING SCRUB.pdf", Some(LABEL_OK)),
        ("033465 OO BUTTERFLY Etiqueta.pdf", Some(LABEL_PROHIBITED)),
        ("TBH Tone softener.pdf", Some(FORMULA_OVER_LIMIT)),
        ("scan.pdf", Some("")),
        ("corrupt.pdf", None),
    ])?;
    let output_dir = f.output_dir.path().to_path_buf();

    let storage = LocalStorage::new(f.settings.output_path.clone());
    let pipeline = CompliancePipeline::new(storage, f.settings, f.extractor)?;
    let engine = AuditEngine::new_with_monitoring(pipeline, false);

    let summary = engine.run().await?;
    assert_eq!(summary.products, 5);
    assert_eq!(summary.compliant, 1);
    // prohibited label, over-limit formula, scan without ingredient list
    assert_eq!(summary.non_compliant, 3);
    assert_eq!(summary.unverified, 1);
    assert!(summary.output_path.ends_with("compliance_report.zip"));

    let zip_path = output_dir.join("compliance_report.zip");
    assert!(zip_path.exists());
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(std::fs::read(&zip_path)?))?;

    let names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).map(|f| f.name().to_string()))
        .collect::<std::result::Result<_, _>>()?;
    for expected in [
        "products.csv",
        "findings.csv",
        "non_compliant.csv",
        "products.tsv",
        "findings.tsv",
        "non_compliant.tsv",
        "report.json",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {}", expected);
    }

    let products = read_entry(&mut archive, "products.csv")?;
    assert!(products.contains(
        "COM-PURIFYING SCRUB.pdf,compliant,inline,text,ok,\"Aqua, Sodium Chloride, Glycerin, Parfum (Fragrance), Citric Acid\""
    ));
    assert!(products.contains("TBH Tone softener.pdf,non_compliant,table,text,ok,\"AQUA, SALICYLIC ACID, GLYCERIN\""));
    assert!(products.contains("corrupt.pdf,unverified,none,none,"));

    let findings = read_entry(&mut archive, "findings.csv")?;
    assert!(findings.contains("033465 OO BUTTERFLY Etiqueta.pdf,prohibited_substance,critical,HYDROQUINONE,Annex II/1339"));
    assert!(findings.contains("TBH Tone softener.pdf,concentration_exceeded,high,SALICYLIC ACID"));
    assert!(findings.contains("TBH Tone softener.pdf,missing_warning,medium,SALICYLIC ACID"));
    assert!(findings.contains("scan.pdf,missing_ingredient_list,high"));
    assert!(findings.contains("corrupt.pdf,extraction_failed,low"));

    let non_compliant = read_entry(&mut archive, "non_compliant.csv")?;
    assert!(non_compliant.contains("TBH Tone softener.pdf,2,concentration_exceeded;missing_warning"));
    assert!(!non_compliant.contains("COM-PURIFYING SCRUB.pdf"));
    assert!(!non_compliant.contains("corrupt.pdf"));

    let report: serde_json::Value = serde_json::from_str(&read_entry(&mut archive, "report.json")?)?;
    assert_eq!(report["summary"]["regulation"], "Reglamento (CE) 1223/2009");
    assert_eq!(report["summary"]["regulation_version"], "2024-01");
    assert_eq!(report["summary"]["products"], 5);
    assert_eq!(report["summary"]["findings"], 5);

    Ok(())
}

#[tokio::test]
async fn test_uncompressed_report_files() -> Result<()> {
    let mut f = fixture(&[("label.pdf", Some(LABEL_OK))])?;
    f.settings.compress = false;
    f.settings.output_formats = vec!["csv".to_string()];
    let output_dir = f.output_dir.path().to_path_buf();

    let storage = LocalStorage::new(f.settings.output_path.clone());
    let pipeline = CompliancePipeline::new(storage, f.settings, f.extractor)?;
    let summary = AuditEngine::new(pipeline).run().await?;

    assert_eq!(summary.compliant, 1);
    assert!(output_dir.join("products.csv").exists());
    assert!(output_dir.join("findings.csv").exists());
    assert!(output_dir.join("non_compliant.csv").exists());
    assert!(!output_dir.join("compliance_report.zip").exists());
    assert!(!output_dir.join("report.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_missing_regulation_file_fails_fast() -> Result<()> {
    let mut f = fixture(&[("label.pdf", Some(LABEL_OK))])?;
    f.settings.regulation_file = Some("/nonexistent/regulation.toml".to_string());

    let storage = LocalStorage::new(f.settings.output_path.clone());
    let result = CompliancePipeline::new(storage, f.settings, f.extractor);
    assert!(matches!(result, Err(AuditError::IoError(_))));

    Ok(())
}

#[tokio::test]
async fn test_empty_input_directory() -> Result<()> {
    let mut f = fixture(&[])?;
    let empty = TempDir::new()?;
    f.settings.inputs = vec![empty.path().to_string_lossy().to_string()];

    let storage = LocalStorage::new(f.settings.output_path.clone());
    let pipeline = CompliancePipeline::new(storage, f.settings, f.extractor)?;
    let err = AuditEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, AuditError::NoInputFiles { .. }));

    Ok(())
}
