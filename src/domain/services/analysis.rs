use crate::config::regulation::{LabelingRules, Regulation, SubstanceRule};
use crate::domain::model::{
    AuditResult, Finding, FindingKind, IngredientEntry, ProductAssessment, ProductRecord,
    ProductStatus, Verdict,
};
use std::collections::{HashMap, HashSet};

/// Uppercase, collapse whitespace, trim list punctuation and footnote stars.
pub fn normalize_name(name: &str) -> String {
    let upper = name.to_uppercase();
    let collapsed = upper.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| matches!(c, ' ' | '.' | ',' | ';' | '*'))
        .to_string()
}

fn split_parenthetical(name: &str) -> Option<(String, String)> {
    let open = name.find('(')?;
    let close = name.rfind(')')?;
    if close <= open {
        return None;
    }
    let outer = format!("{} {}", &name[..open], &name[close + 1..]);
    let inner = name[open + 1..close].to_string();
    Some((outer, inner))
}

/// Names an ingredient may be known by: `AQUA/WATER` gives both parts,
/// `PARFUM (FRAGRANCE)` gives `PARFUM` and `FRAGRANCE`.
pub fn name_variants(name: &str) -> Vec<String> {
    let whole = normalize_name(name);
    let mut candidates = vec![whole.clone()];

    if let Some((outer, inner)) = split_parenthetical(&whole) {
        candidates.push(outer);
        candidates.push(inner);
    }

    let mut slash_parts = Vec::new();
    for candidate in &candidates {
        if candidate.contains('(') || !candidate.contains('/') {
            continue;
        }
        slash_parts.extend(candidate.split('/').map(str::to_string));
    }
    candidates.extend(slash_parts);

    let mut seen = HashSet::new();
    candidates
        .iter()
        .map(|c| normalize_name(c))
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RuleList {
    Prohibited,
    Restricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RuleRef {
    list: RuleList,
    index: usize,
}

/// Lookup tables from normalized names, aliases and CAS numbers to rules.
pub struct RegulationIndex<'a> {
    regulation: &'a Regulation,
    by_name: HashMap<String, Vec<RuleRef>>,
    by_cas: HashMap<String, Vec<RuleRef>>,
}

impl<'a> RegulationIndex<'a> {
    pub fn new(regulation: &'a Regulation) -> Self {
        let mut by_name: HashMap<String, Vec<RuleRef>> = HashMap::new();
        let mut by_cas: HashMap<String, Vec<RuleRef>> = HashMap::new();

        let lists = [
            (RuleList::Prohibited, &regulation.prohibited),
            (RuleList::Restricted, &regulation.restricted),
        ];
        for (list, rules) in lists {
            for (index, rule) in rules.iter().enumerate() {
                let rule_ref = RuleRef { list, index };
                for name in std::iter::once(&rule.name).chain(rule.aliases.iter()) {
                    by_name.entry(normalize_name(name)).or_default().push(rule_ref);
                }
                if let Some(cas) = &rule.cas {
                    by_cas.entry(cas.trim().to_string()).or_default().push(rule_ref);
                }
            }
        }

        Self {
            regulation,
            by_name,
            by_cas,
        }
    }

    fn rule(&self, rule_ref: RuleRef) -> &'a SubstanceRule {
        match rule_ref.list {
            RuleList::Prohibited => &self.regulation.prohibited[rule_ref.index],
            RuleList::Restricted => &self.regulation.restricted[rule_ref.index],
        }
    }

    fn lookup(&self, entry: &IngredientEntry) -> Vec<RuleRef> {
        let mut found = Vec::new();
        for variant in name_variants(&entry.name) {
            if let Some(refs) = self.by_name.get(&variant) {
                found.extend(refs.iter().copied());
            }
        }
        if let Some(refs) = entry.cas.as_ref().and_then(|cas| self.by_cas.get(cas.trim())) {
            found.extend(refs.iter().copied());
        }

        let mut seen = HashSet::new();
        found.retain(|r| seen.insert(*r));
        found
    }
}

fn finding(
    product: &ProductRecord,
    kind: FindingKind,
    substance: Option<&str>,
    detail: String,
    reference: Option<&str>,
) -> Finding {
    Finding {
        file_name: product.file_name.clone(),
        source_path: product.source_path.clone(),
        kind,
        severity: kind.severity(),
        substance: substance.map(str::to_string),
        detail,
        reference: reference.map(str::to_string),
    }
}

/// Check one product against the regulation. Without an index only the
/// structural checks run.
pub fn analyze_product(
    product: &ProductRecord,
    index: Option<&RegulationIndex<'_>>,
    labeling: &LabelingRules,
) -> Vec<Finding> {
    if let ProductStatus::Failed(message) = &product.status {
        return vec![finding(
            product,
            FindingKind::ExtractionFailed,
            None,
            format!("Document could not be processed: {}", message),
            None,
        )];
    }

    let mut findings = Vec::new();

    if product.entries.is_empty() && labeling.require_ingredient_list {
        findings.push(finding(
            product,
            FindingKind::MissingIngredientList,
            None,
            "No ingredient list found in the document".to_string(),
            None,
        ));
    }

    let Some(index) = index else {
        return findings;
    };

    let product_text = normalize_text(&product.text);
    let mut reported: HashSet<(RuleRef, FindingKind)> = HashSet::new();

    for entry in &product.entries {
        for rule_ref in index.lookup(entry) {
            let rule = index.rule(rule_ref);
            let reference = rule.reference.as_deref();

            match rule_ref.list {
                RuleList::Prohibited => {
                    if reported.insert((rule_ref, FindingKind::ProhibitedSubstance)) {
                        findings.push(finding(
                            product,
                            FindingKind::ProhibitedSubstance,
                            Some(rule.name.as_str()),
                            format!("'{}' is a prohibited substance", entry.name),
                            reference,
                        ));
                    }
                }
                RuleList::Restricted => {
                    if let (Some(max), Some(actual)) = (rule.max_concentration, entry.concentration)
                    {
                        if actual > max
                            && reported.insert((rule_ref, FindingKind::ConcentrationExceeded))
                        {
                            findings.push(finding(
                                product,
                                FindingKind::ConcentrationExceeded,
                                Some(rule.name.as_str()),
                                format!(
                                    "'{}' at {}% exceeds the {}% limit",
                                    entry.name, actual, max
                                ),
                                reference,
                            ));
                        }
                    }

                    if let Some(warning) = &rule.required_warning {
                        if !product_text.contains(&normalize_text(warning))
                            && reported.insert((rule_ref, FindingKind::MissingWarning))
                        {
                            findings.push(finding(
                                product,
                                FindingKind::MissingWarning,
                                Some(rule.name.as_str()),
                                format!("Required warning not found: \"{}\"", warning),
                                reference,
                            ));
                        }
                    }
                }
            }
        }
    }

    findings
}

/// `checked` is false when no regulation was loaded: nothing vouches for the
/// ingredients then.
fn verdict_for(product: &ProductRecord, findings: &[Finding], checked: bool) -> Verdict {
    if matches!(product.status, ProductStatus::Failed(_)) {
        return Verdict::Unverified;
    }
    if findings
        .iter()
        .any(|f| f.kind != FindingKind::ExtractionFailed)
    {
        return Verdict::NonCompliant;
    }
    if product.entries.is_empty() || !checked {
        return Verdict::Unverified;
    }
    Verdict::Compliant
}

/// Análisis: assess every product, keeping input order.
pub fn analyze(products: Vec<ProductRecord>, regulation: Option<&Regulation>) -> AuditResult {
    let index = regulation.map(RegulationIndex::new);
    let default_labeling = LabelingRules::default();
    let labeling = regulation.map(|r| &r.labeling).unwrap_or(&default_labeling);

    if regulation.is_none() {
        tracing::warn!("⚠️ No regulation loaded, only structural checks will run");
    }

    let mut assessments = Vec::with_capacity(products.len());
    let mut all_findings = Vec::new();

    for product in products {
        let findings = analyze_product(&product, index.as_ref(), labeling);
        let verdict = verdict_for(&product, &findings, index.is_some());

        if verdict == Verdict::NonCompliant {
            tracing::info!(
                "🚩 {} is non-compliant ({} findings)",
                product.file_name,
                findings.len()
            );
        }

        all_findings.extend(findings);
        assessments.push(ProductAssessment { product, verdict });
    }

    AuditResult {
        assessments,
        findings: all_findings,
        regulation_name: regulation.map(|r| r.regulation.name.clone()),
        regulation_version: regulation.and_then(|r| r.regulation.version.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExtractionMethod, IngredientSource};

    fn regulation() -> Regulation {
        Regulation::from_toml_str(
            r#"
[regulation]
name = "Test regulation"
version = "1"

[[prohibited]]
name = "HYDROQUINONE"
cas = "123-31-9"
reference = "Annex II/1339"

[[restricted]]
name = "SALICYLIC ACID"
aliases = ["ACIDO SALICILICO"]
max_concentration = 2.0
required_warning = "Not to be used for children under 3 years of age"
reference = "Annex III/98"
"#,
        )
        .unwrap()
    }

    fn product(file_name: &str, entries: Vec<IngredientEntry>, text: &str) -> ProductRecord {
        ProductRecord {
            file_name: file_name.to_string(),
            source_path: format!("./pdfs/{}", file_name),
            ingredients: if entries.is_empty() {
                None
            } else {
                Some(
                    entries
                        .iter()
                        .map(|e| e.name.clone())
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            },
            entries,
            source: IngredientSource::Inline,
            extraction: ExtractionMethod::Text,
            text: text.to_string(),
            status: ProductStatus::Ok,
        }
    }

    #[test]
    fn test_name_variants() {
        assert_eq!(
            name_variants("aqua/water/eau"),
            vec!["AQUA/WATER/EAU", "AQUA", "WATER", "EAU"]
        );
        assert_eq!(
            name_variants("Parfum (Fragrance)"),
            vec!["PARFUM (FRAGRANCE)", "PARFUM", "FRAGRANCE"]
        );
        assert_eq!(name_variants(" glycerin* "), vec!["GLYCERIN"]);
    }

    #[test]
    fn test_compliant_product() {
        let regulation = regulation();
        let result = analyze(
            vec![product(
                "ok.pdf",
                vec![IngredientEntry::named("Aqua"), IngredientEntry::named("Glycerin")],
                "",
            )],
            Some(&regulation),
        );
        assert!(result.findings.is_empty());
        assert_eq!(result.assessments[0].verdict, Verdict::Compliant);
        assert_eq!(result.regulation_version.as_deref(), Some("1"));
    }

    #[test]
    fn test_prohibited_by_cas_reported_once() {
        let regulation = regulation();
        let entries = vec![
            IngredientEntry {
                name: "TECHNICAL NAME".to_string(),
                cas: Some("123-31-9".to_string()),
                concentration: Some(1.0),
            },
            IngredientEntry::named("Hydroquinone"),
        ];
        let result = analyze(vec![product("bad.pdf", entries, "")], Some(&regulation));
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].kind, FindingKind::ProhibitedSubstance);
        assert_eq!(result.findings[0].reference.as_deref(), Some("Annex II/1339"));
        assert_eq!(result.assessments[0].verdict, Verdict::NonCompliant);
    }

    #[test]
    fn test_restricted_concentration_and_warning() {
        let regulation = regulation();
        let entries = vec![IngredientEntry {
            name: "Acido Salicilico".to_string(),
            cas: None,
            concentration: Some(2.5),
        }];
        let findings = analyze_product(
            &product("peel.pdf", entries.clone(), "Keep away from eyes"),
            Some(&RegulationIndex::new(&regulation)),
            &regulation.labeling,
        );
        let kinds: Vec<_> = findings.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![FindingKind::ConcentrationExceeded, FindingKind::MissingWarning]
        );

        // 警語存在（大小寫與換行不同）且濃度合規
        let mut ok_entries = entries;
        ok_entries[0].concentration = Some(1.5);
        let findings = analyze_product(
            &product(
                "peel.pdf",
                ok_entries,
                "NOT TO BE USED FOR CHILDREN\nunder 3 years of age",
            ),
            Some(&RegulationIndex::new(&regulation)),
            &regulation.labeling,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_missing_list_and_failed_extraction() {
        let regulation = regulation();
        let mut failed = product("broken.pdf", vec![], "");
        failed.status = ProductStatus::Failed("not a PDF".to_string());

        let result = analyze(
            vec![product("empty.pdf", vec![], "Logo"), failed],
            Some(&regulation),
        );
        assert_eq!(result.findings[0].kind, FindingKind::MissingIngredientList);
        assert_eq!(result.findings[1].kind, FindingKind::ExtractionFailed);
        assert_eq!(result.assessments[0].verdict, Verdict::NonCompliant);
        assert_eq!(result.assessments[1].verdict, Verdict::Unverified);
        assert_eq!(result.count(Verdict::NonCompliant), 1);
    }

    #[test]
    fn test_without_regulation_only_structural_checks() {
        let result = analyze(
            vec![
                product("a.pdf", vec![IngredientEntry::named("HYDROQUINONE")], ""),
                product("b.pdf", vec![], ""),
            ],
            None,
        );
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].source_path, "./pdfs/b.pdf");
        assert_eq!(result.assessments[0].verdict, Verdict::Unverified);
        assert_eq!(result.assessments[1].verdict, Verdict::NonCompliant);
        assert_eq!(result.count(Verdict::Compliant), 0);
        assert!(result.regulation_name.is_none());
    }
}
