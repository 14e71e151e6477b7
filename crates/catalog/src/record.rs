use serde::{Deserialize, Serialize};

/// Column layout of the workshop's catalog spreadsheets.
///
/// These indices are an external data contract tied to the layout of the
/// source files; they must be kept exactly as the files are laid out, not
/// reinterpreted.
pub(crate) mod columns {
    /// Raw product-code cell; rows with an empty cell here are dropped.
    pub const PRODUCT_CODE: usize = 0;
    pub const FRAME_TYPE: usize = 1;
    pub const FRAME_SIZE: usize = 2;
    /// Workshop reference, e.g. "050612 - GAELLE 80"; the product code is the
    /// text before " - ".
    pub const WORKSHOP_REFERENCE: usize = 9;
    pub const FRAME_NAME: usize = 14;
    pub const GLASS: usize = 17;
    pub const RAISER: usize = 18;
    pub const EASEL: usize = 19;
    pub const EASEL_POSSIBLE: usize = 20;
    pub const HOUSE_DESCRIPTION: usize = 30;
    pub const PURCHASE_COST: usize = 32;
}

/// One catalog row, normalized.
///
/// (category, product_code) is the natural key but uniqueness is not
/// enforced: duplicate rows become duplicate records. Records are recreated
/// fresh on every read and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_category: String,
    pub commercial_name: String,
    pub frame_size: String,
    pub purchase_cost: Option<f64>,
    pub product_code: String,
    pub frame_type: String,
    pub frame_name: String,
    pub has_glass: bool,
    pub has_raiser: bool,
    pub has_easel: bool,
    pub easel_possible: bool,
    pub workshop_reference: String,
    pub house_description: String,
}

/// Build a record from one spreadsheet row, or `None` when the row does not
/// describe a sellable product.
///
/// A record is emitted only when the product code and frame size are both
/// non-empty and the commercial name resolves to something other than "nan".
pub(crate) fn record_from_row(category: &str, row: &csv::StringRecord) -> Option<ProductRecord> {
    let cell = |idx: usize| row.get(idx).unwrap_or("").trim();

    let workshop_reference = cell(columns::WORKSHOP_REFERENCE);
    let product_code = code_from_reference(workshop_reference);
    let frame_type = cell(columns::FRAME_TYPE);
    let frame_size = cell(columns::FRAME_SIZE);
    let frame_name = cell(columns::FRAME_NAME);

    if product_code.is_empty() || frame_size.is_empty() {
        return None;
    }

    let commercial_name = commercial_name(frame_name, frame_type, frame_size);
    if commercial_name.is_empty() || commercial_name == "nan" {
        return None;
    }

    Some(ProductRecord {
        product_category: category.to_string(),
        commercial_name,
        frame_size: frame_size.to_string(),
        purchase_cost: parse_cost(cell(columns::PURCHASE_COST)),
        product_code: product_code.to_string(),
        frame_type: frame_type.to_string(),
        frame_name: frame_name.to_string(),
        has_glass: parse_flag(cell(columns::GLASS)),
        has_raiser: parse_flag(cell(columns::RAISER)),
        has_easel: parse_flag(cell(columns::EASEL)),
        easel_possible: parse_flag(cell(columns::EASEL_POSSIBLE)),
        workshop_reference: workshop_reference.to_string(),
        house_description: cell(columns::HOUSE_DESCRIPTION).to_string(),
    })
}

/// Product code = text before " - " in the workshop reference, else the whole
/// cell.
fn code_from_reference(reference: &str) -> &str {
    match reference.split_once(" - ") {
        Some((code, _)) => code.trim(),
        None => reference,
    }
}

/// Commercial name is "{frame_name} {size}", falling back to the frame type
/// when the name cell is blank or the literal "nan".
fn commercial_name(frame_name: &str, frame_type: &str, frame_size: &str) -> String {
    let base = if frame_name.is_empty() || frame_name == "nan" {
        frame_type
    } else {
        frame_name
    };
    format!("{base} {frame_size}").trim().to_string()
}

/// Binary flag cell: "1"/"1.0" style values are true, anything else false.
fn parse_flag(cell: &str) -> bool {
    cell.parse::<f64>().map(|v| v != 0.0).unwrap_or(false)
}

/// Purchase cost cell; accepts a comma decimal separator, `None` when absent
/// or unparsable.
fn parse_cost(cell: &str) -> Option<f64> {
    if cell.is_empty() || cell == "nan" {
        return None;
    }
    cell.replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with(cells: &[(usize, &str)]) -> csv::StringRecord {
        let mut fields = vec![String::new(); 33];
        for &(idx, value) in cells {
            fields[idx] = value.to_string();
        }
        csv::StringRecord::from(fields)
    }

    #[test]
    fn builds_record_from_complete_row() {
        let row = row_with(&[
            (columns::PRODUCT_CODE, "050612"),
            (columns::FRAME_TYPE, "CLASSIQUE"),
            (columns::FRAME_SIZE, "50*61"),
            (columns::WORKSHOP_REFERENCE, "050612 - GAELLE 80"),
            (columns::FRAME_NAME, "GAELLE"),
            (columns::GLASS, "1"),
            (columns::EASEL_POSSIBLE, "1.0"),
            (columns::HOUSE_DESCRIPTION, "Cadre doré"),
            (columns::PURCHASE_COST, "12,50"),
        ]);

        let record = record_from_row("DORURE", &row).unwrap();
        assert_eq!(record.product_category, "DORURE");
        assert_eq!(record.product_code, "050612");
        assert_eq!(record.commercial_name, "GAELLE 50*61");
        assert_eq!(record.workshop_reference, "050612 - GAELLE 80");
        assert_eq!(record.purchase_cost, Some(12.5));
        assert!(record.has_glass);
        assert!(!record.has_raiser);
        assert!(record.easel_possible);
        assert_eq!(record.house_description, "Cadre doré");
    }

    #[test]
    fn missing_code_or_size_emits_nothing() {
        let no_code = row_with(&[(columns::FRAME_SIZE, "50*61"), (columns::FRAME_NAME, "GAELLE")]);
        assert!(record_from_row("X", &no_code).is_none());

        let no_size = row_with(&[
            (columns::WORKSHOP_REFERENCE, "050612 - GAELLE"),
            (columns::FRAME_NAME, "GAELLE"),
        ]);
        assert!(record_from_row("X", &no_size).is_none());
    }

    #[test]
    fn commercial_name_falls_back_to_frame_type() {
        assert_eq!(commercial_name("", "CLASSIQUE", "50*61"), "CLASSIQUE 50*61");
        assert_eq!(commercial_name("nan", "CLASSIQUE", "50*61"), "CLASSIQUE 50*61");
        assert_eq!(commercial_name("GAELLE", "CLASSIQUE", "50*61"), "GAELLE 50*61");
    }

    #[test]
    fn never_emits_a_bare_nan_name() {
        let row = row_with(&[
            (columns::WORKSHOP_REFERENCE, "050612"),
            (columns::FRAME_SIZE, "nan"),
            (columns::FRAME_NAME, "nan"),
            (columns::FRAME_TYPE, ""),
        ]);
        // Name resolves to "nan" (empty type + "nan" size); row is dropped.
        assert!(record_from_row("X", &row).is_none());
    }

    #[test]
    fn code_is_extracted_from_workshop_reference() {
        assert_eq!(code_from_reference("050612 - GAELLE 80"), "050612");
        assert_eq!(code_from_reference("050612DC"), "050612DC");
        assert_eq!(code_from_reference(""), "");
    }

    #[test]
    fn short_rows_yield_no_record() {
        let row = csv::StringRecord::from(vec!["050612", "CLASSIQUE"]);
        assert!(record_from_row("X", &row).is_none());
    }
}
