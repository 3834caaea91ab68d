use label_audit::domain::model::IngredientSource;
use label_audit::domain::services::ingredients::{
    clean_ingredients_string, split_ingredient_list, IngredientParser,
};

// Text layouts seen in real label and formula sheets.

const MULTILINGUAL_BOX: &str = "LACABINE AMPOLLAS FACIALES x10 EYE CONTOUR
INGREDIENTES/INGREDIENTS: AQUA, GLYCERIN, SODIUM HYALURONATE,
CAFFEINE, PHENOXYETHANOL.
Uso tópico. Modo de empleo: aplicar por la mañana.
www.lacabine.es";

const CONDITIONER_FORMULA: &str = "FORMULA TK COLOR STAY CONDITIONER
INGREDIENTES/INGREDIENTS (INCI)
INCI
1. AQUA 7732-18-5 c.s.p.
2. CETEARYL ALCOHOL 67762-27-0 4,000
3. BEHENTRIMONIUM CHLORIDE 17301-53-0 1,200
4. PARFUM 0,500
Total 100%
REGULACIÓN COSMETICA
1. HYDROQUINONE 123-31-9 1,0";

const QUANTITATIVE_SHEET: &str = "FORM GO BUTTERFLY Cuantitativa
Lista de ingredientes
AQUA 75,5
ALCOHOL DENAT. 20,0
\x0c
PARFUM 4,5
Rangos de concentración
AQUA 0-100";

#[test]
fn test_multilingual_box_uses_inline_strategy() {
    let parser = IngredientParser::new().unwrap();
    let list = parser.extract_ingredients(MULTILINGUAL_BOX).unwrap();

    assert_eq!(list.source, IngredientSource::Inline);
    assert_eq!(
        list.joined,
        "AQUA, GLYCERIN, SODIUM HYALURONATE, CAFFEINE, PHENOXYETHANOL"
    );
    assert_eq!(list.entries.len(), 5);
    assert!(list.entries.iter().all(|e| e.concentration.is_none()));
}

#[test]
fn test_conditioner_formula_table_stops_before_regulation_section() {
    let parser = IngredientParser::new().unwrap();
    let list = parser.extract_ingredients(CONDITIONER_FORMULA).unwrap();

    assert_eq!(list.source, IngredientSource::Table);
    assert_eq!(
        list.joined,
        "AQUA, CETEARYL ALCOHOL, BEHENTRIMONIUM CHLORIDE, PARFUM"
    );

    let aqua = &list.entries[0];
    assert_eq!(aqua.cas.as_deref(), Some("7732-18-5"));
    assert_eq!(aqua.concentration, None);

    let cetearyl = &list.entries[1];
    assert_eq!(cetearyl.cas.as_deref(), Some("67762-27-0"));
    assert_eq!(cetearyl.concentration, Some(4.0));

    let parfum = &list.entries[3];
    assert_eq!(parfum.cas, None);
    assert_eq!(parfum.concentration, Some(0.5));
}

#[test]
fn test_quantitative_sheet_handles_page_breaks() {
    let parser = IngredientParser::new().unwrap();
    assert_eq!(
        parser.extract_table_ingredients(QUANTITATIVE_SHEET).as_deref(),
        Some("AQUA, ALCOHOL DENAT., PARFUM")
    );
}

#[test]
fn test_text_without_any_list() {
    let parser = IngredientParser::new().unwrap();
    assert!(parser.extract_ingredients("").is_none());
    assert!(parser
        .extract_ingredients("Artwork v.0419\nPantone 7621 C\nDieline 14 ml")
        .is_none());
}

#[test]
fn test_cleaning_helpers() {
    assert_eq!(
        clean_ingredients_string("\n AQUA ,  GLYCERIN;; "),
        "AQUA , GLYCERIN"
    );
    assert_eq!(
        split_ingredient_list("AQUA; GLYCERIN, CI 77891 (TITANIUM DIOXIDE, MICA)"),
        vec!["AQUA", "GLYCERIN", "CI 77891 (TITANIUM DIOXIDE, MICA)"]
    );
}
