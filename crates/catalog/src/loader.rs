//! Directory scan and per-file row extraction.
//!
//! Failure policy: a bad row is logged and skipped, never aborting the rest
//! of its file; a bad file is logged and skipped, never aborting the rest of
//! the batch. Only an unreadable directory is an error to the caller.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::record::{columns, record_from_row, ProductRecord};
use crate::CatalogError;

/// Leading rows of every catalog file that carry header decoration, not data.
pub const HEADER_ROWS: usize = 3;

const CATALOG_EXTENSION: &str = "csv";

/// Load every product from every catalog file in `dir`.
pub fn load_directory(dir: &Path) -> Result<Vec<ProductRecord>, CatalogError> {
    let mut products = Vec::new();
    for (path, category) in catalog_files(dir)? {
        match load_file(&path, &category) {
            Ok(mut records) => {
                debug!(category = %category, count = records.len(), "catalog file loaded");
                products.append(&mut records);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable catalog file");
            }
        }
    }
    Ok(products)
}

/// Category names present in `dir`: one per catalog file, the file stem.
pub fn list_categories(dir: &Path) -> Result<Vec<String>, CatalogError> {
    Ok(catalog_files(dir)?
        .into_iter()
        .map(|(_, category)| category)
        .collect())
}

/// Path of the catalog file backing `category`, if it exists.
pub fn category_file(dir: &Path, category: &str) -> Option<PathBuf> {
    let path = dir.join(format!("{category}.{CATALOG_EXTENSION}"));
    path.is_file().then_some(path)
}

/// Load one catalog file. Skips the header block, drops rows missing the
/// product-code cell, and builds a record per remaining valid row.
pub fn load_file(path: &Path, category: &str) -> Result<Vec<ProductRecord>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| CatalogError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        })?;

    let mut products = Vec::new();
    for (index, result) in reader.records().enumerate().skip(HEADER_ROWS) {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!(path = %path.display(), row = index, error = %err, "skipping unparsable row");
                continue;
            }
        };
        if row
            .get(columns::PRODUCT_CODE)
            .unwrap_or("")
            .trim()
            .is_empty()
        {
            continue;
        }
        if let Some(record) = record_from_row(category, &row) {
            products.push(record);
        }
    }
    Ok(products)
}

/// Catalog files in `dir`, sorted by name for deterministic output.
fn catalog_files(dir: &Path) -> Result<Vec<(PathBuf, String)>, CatalogError> {
    let entries = fs::read_dir(dir).map_err(|source| CatalogError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_catalog = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(CATALOG_EXTENSION));
        if !path.is_file() || !is_catalog {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!(path = %path.display(), "skipping catalog file with non-UTF-8 name");
            continue;
        };
        files.push((path.clone(), stem.to_string()));
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// A data row with the contract's 33 columns populated at the positions
    /// the loader reads.
    fn data_row(code: &str, frame_type: &str, size: &str, reference: &str, name: &str) -> String {
        let mut cells = vec![String::new(); 33];
        cells[columns::PRODUCT_CODE] = code.to_string();
        cells[columns::FRAME_TYPE] = frame_type.to_string();
        cells[columns::FRAME_SIZE] = size.to_string();
        cells[columns::WORKSHOP_REFERENCE] = reference.to_string();
        cells[columns::FRAME_NAME] = name.to_string();
        cells[columns::PURCHASE_COST] = "10.0".to_string();
        cells.join(",")
    }

    fn write_catalog(dir: &Path, category: &str, rows: &[String]) {
        let mut file = fs::File::create(dir.join(format!("{category}.csv"))).unwrap();
        for _ in 0..HEADER_ROWS {
            writeln!(file, "{}", vec![""; 33].join(",")).unwrap();
        }
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
    }

    #[test]
    fn loads_valid_rows_and_drops_incomplete_ones() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            dir.path(),
            "DORURE",
            &[
                data_row("050612", "CLASSIQUE", "50*61", "050612 - GAELLE 80", "GAELLE"),
                // missing product-code cell: dropped before field mapping
                data_row("", "CLASSIQUE", "50*61", "050613 - ANDREA", "ANDREA"),
                // missing frame size: no record
                data_row("050614", "CLASSIQUE", "", "050614 - LOUIS", "LOUIS"),
            ],
        );

        let products = load_directory(dir.path()).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_code, "050612");
        assert_eq!(products[0].product_category, "DORURE");
    }

    #[test]
    fn header_rows_are_never_data() {
        let dir = tempfile::tempdir().unwrap();
        // Header decoration that would parse as a product if not skipped.
        let header = data_row("HDR", "T", "1*1", "HDR - X", "X");
        let mut file = fs::File::create(dir.path().join("CAT.csv")).unwrap();
        for _ in 0..HEADER_ROWS {
            writeln!(file, "{header}").unwrap();
        }
        writeln!(
            file,
            "{}",
            data_row("050612", "CLASSIQUE", "50*61", "050612 - GAELLE", "GAELLE")
        )
        .unwrap();
        drop(file);

        let products = load_directory(dir.path()).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_code, "050612");
    }

    #[test]
    fn non_catalog_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "not a catalog").unwrap();
        write_catalog(
            dir.path(),
            "CAT",
            &[data_row("1", "T", "2*3", "1 - A", "A")],
        );

        assert_eq!(list_categories(dir.path()).unwrap(), vec!["CAT"]);
    }

    #[test]
    fn categories_are_sorted_file_stems() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "ZINC", &[]);
        write_catalog(dir.path(), "ARGENT", &[]);
        assert_eq!(
            list_categories(dir.path()).unwrap(),
            vec!["ARGENT", "ZINC"]
        );
    }

    #[test]
    fn unreadable_directory_is_an_error() {
        let err = load_directory(Path::new("/nonexistent/frameshop-data")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn category_file_requires_exact_stem() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(dir.path(), "DORURE", &[]);
        assert!(category_file(dir.path(), "DORURE").is_some());
        assert!(category_file(dir.path(), "ARGENT").is_none());
    }
}
