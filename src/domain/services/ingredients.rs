//! Ingredient list extraction from the plain text of a label or formula sheet.
//!
//! Two strategies, tried in order:
//! 1. inline lists such as `Ingredients: AQUA, GLYCERIN, ...` (EN / ES / FR);
//! 2. INCI tables, one ingredient per row, optionally with CAS number and %.

use crate::domain::model::{
    ExtractedText, IngredientEntry, IngredientList, IngredientSource, ProductRecord, ProductStatus,
};
use crate::utils::error::Result;
use regex::Regex;
use std::collections::HashSet;

const INLINE_PATTERNS: &[&str] = &[
    r"(?is)\bingredients?\b\s*[:\-]\s*(.+)",
    r"(?is)\bingredients/ingr[ée]dients\b\s*[:\-]\s*(.+)",
    r"(?is)\bingredientes\b\s*[:\-]\s*(.+)",
    r"(?is)\bingredientes/ingredients\b\s*[:\-]\s*(.+)",
];

// 清單之後常見的段落開頭，遇到就截斷
const INLINE_STOP_MARKERS: &[&str] = &[
    r"(?i)\nmanufactured by",
    r"(?i)\nmade in",
    r"(?i)\nwarning",
    r"(?i)\nwww\.",
    r"(?i)\nkeep out of reach",
    r"(?i)\nuso t[oó]pico",
    r"(?i)\nmodo de empleo",
    r"(?i)\nmode d'emploi",
    r"(?i)\nkey ingredients",
    r"(?i)\ningredientes principales",
];

const TABLE_HEADERS: &[&str] = &[
    r"(?i)INGREDIENTES/INGREDIENTS\s*\(INCI\)",
    r"(?i)INGREDIENTE\s+INCI",
    r"(?i)Lista de ingredientes",
    r"(?i)No\.\s*INCI name\s*CAS No\.",
];

const TABLE_STOP_MARKERS: &[&str] = &[
    r"(?i)\nTotal\b",
    r"(?i)\nTotal %",
    r"(?i)\nRangos de concentración",
    r"(?i)\nREGULACI[ÓO]N COSMETICA",
    r"(?i)\nAN[ÁA]LISIS",
    r"(?i)\n2\.\s*Fragrance/Perfume",
];

const MIN_TABLE_NAME_CHARS: usize = 3;

/// Normalize whitespace and strip trailing list punctuation.
pub fn clean_ingredients_string(s: &str) -> String {
    let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | ';' | ',' | '.'))
        .to_string()
}

/// Split an inline list on `,` / `;` outside parentheses and brackets.
pub fn split_ingredient_list(list: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut current = String::new();

    for c in list.chars() {
        match c {
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' | ';' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .iter()
        .map(|p| clean_ingredients_string(p))
        .filter(|p| !p.is_empty())
        .collect()
}

fn earliest_match(patterns: &[Regex], haystack: &str) -> usize {
    patterns
        .iter()
        .filter_map(|re| re.find(haystack))
        .map(|m| m.start())
        .min()
        .unwrap_or(haystack.len())
}

// Python-style splitlines: PDF text often carries form feeds between pages.
fn split_lines(block: &str) -> impl Iterator<Item = &str> {
    block.split(|c: char| {
        matches!(
            c,
            '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
        )
    })
}

/// Compiled patterns for both extraction strategies. Build once, share across workers.
#[derive(Debug, Clone)]
pub struct IngredientParser {
    inline_patterns: Vec<Regex>,
    inline_stops: Vec<Regex>,
    table_headers: Vec<Regex>,
    table_stops: Vec<Regex>,
    inci_label: Regex,
    row_number: Regex,
    cas_number: Regex,
    decimal: Regex,
    csp: Regex,
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(Into::into))
        .collect()
}

impl IngredientParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            inline_patterns: compile_all(INLINE_PATTERNS)?,
            inline_stops: compile_all(INLINE_STOP_MARKERS)?,
            table_headers: compile_all(TABLE_HEADERS)?,
            table_stops: compile_all(TABLE_STOP_MARKERS)?,
            inci_label: Regex::new(r"(?i)^%?\s*INCI\b")?,
            row_number: Regex::new(r"^\s*\d+[\.\-]?\s+")?,
            cas_number: Regex::new(r"\s(\d{2,7}-\d{2}-\d)\b")?,
            decimal: Regex::new(r"\s(\d+[.,]\d+)")?,
            csp: Regex::new(r"(?i)\sc\.s\.p\.")?,
        })
    }

    /// Extract an inline list such as `INGREDIENTES: AQUA, ...`.
    pub fn extract_inline_ingredients(&self, text: &str) -> Option<String> {
        if text.is_empty() {
            return None;
        }

        for pattern in &self.inline_patterns {
            let Some(after) = pattern.captures(text).and_then(|c| c.get(1)) else {
                continue;
            };
            let after = after.as_str();
            let cut = earliest_match(&self.inline_stops, after);

            let ingredients = clean_ingredients_string(&after[..cut]);
            if !ingredients.is_empty() {
                return Some(ingredients);
            }
        }

        None
    }

    /// Parse one INCI table row: `3. GLYCERIN 56-81-5 4,50`.
    ///
    /// The name ends at the CAS number, else at the first decimal number, else
    /// at `c.s.p.`, else it is the whole row. The concentration is the first
    /// decimal number after the name or CAS number.
    pub fn parse_table_line(&self, line: &str) -> Option<IngredientEntry> {
        if line.trim().is_empty() {
            return None;
        }

        let line = self.row_number.replacen(line, 1, "");

        let (name_end, cas, tail_start) = if let Some(caps) = self.cas_number.captures(&line) {
            let whole = caps.get(0)?;
            (
                whole.start(),
                caps.get(1).map(|m| m.as_str().to_string()),
                whole.end(),
            )
        } else if let Some(m) = self.decimal.find(&line) {
            (m.start(), None, m.start())
        } else if let Some(m) = self.csp.find(&line) {
            (m.start(), None, line.len())
        } else {
            (line.len(), None, line.len())
        };

        let name = line[..name_end].trim();
        if name.is_empty() {
            return None;
        }

        let concentration = self
            .decimal
            .captures(&line[tail_start..])
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok());

        Some(IngredientEntry {
            name: name.to_string(),
            cas,
            concentration,
        })
    }

    pub fn extract_name_from_line(&self, line: &str) -> Option<String> {
        self.parse_table_line(line).map(|entry| entry.name)
    }

    /// All table rows under every known header, de-duplicated by name in order.
    pub fn extract_table_rows(&self, text: &str) -> Vec<IngredientEntry> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut rows = Vec::new();

        for header in &self.table_headers {
            let Some(m) = header.find(text) else {
                continue;
            };

            let block = &text[m.end()..];
            let block = &block[..earliest_match(&self.table_stops, block)];

            for raw_line in split_lines(block) {
                let line = raw_line.trim();
                if line.is_empty() {
                    continue;
                }
                if header.is_match(line) || self.inci_label.is_match(line) {
                    continue;
                }

                let Some(entry) = self.parse_table_line(line) else {
                    continue;
                };
                if entry.name.chars().count() < MIN_TABLE_NAME_CHARS {
                    continue;
                }

                rows.push(entry);
            }
        }

        let mut seen = HashSet::new();
        rows.retain(|entry| seen.insert(entry.name.clone()));
        rows
    }

    pub fn extract_table_ingredients(&self, text: &str) -> Option<String> {
        let rows = self.extract_table_rows(text);
        if rows.is_empty() {
            return None;
        }
        Some(
            rows.iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// Inline first, table as fallback.
    pub fn extract_ingredients(&self, text: &str) -> Option<IngredientList> {
        if let Some(joined) = self.extract_inline_ingredients(text) {
            let entries = split_ingredient_list(&joined)
                .into_iter()
                .map(IngredientEntry::named)
                .collect();
            return Some(IngredientList {
                source: IngredientSource::Inline,
                joined,
                entries,
            });
        }

        let rows = self.extract_table_rows(text);
        if rows.is_empty() {
            return None;
        }
        let joined = rows
            .iter()
            .map(|r| r.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Some(IngredientList {
            source: IngredientSource::Table,
            joined,
            entries: rows,
        })
    }

    /// Build the product table row for one document.
    pub fn normalize_document(
        &self,
        file_name: String,
        source_path: String,
        extracted: ExtractedText,
    ) -> ProductRecord {
        let list = self.extract_ingredients(&extracted.text);

        let (ingredients, entries, source, status) = match list {
            Some(list) => (
                Some(list.joined),
                list.entries,
                list.source,
                ProductStatus::Ok,
            ),
            None => (
                None,
                Vec::new(),
                IngredientSource::None,
                ProductStatus::NoIngredients,
            ),
        };

        tracing::debug!(
            "{}: {} ingredients via {} ({} text, {} pages)",
            file_name,
            entries.len(),
            source,
            extracted.method,
            extracted.page_count
        );

        ProductRecord {
            file_name,
            source_path,
            ingredients,
            entries,
            source,
            extraction: extracted.method,
            text: extracted.text,
            status,
        }
    }
}
