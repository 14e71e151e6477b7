//! Read-side queries over the catalog directory.
//!
//! All operations are pure functions over the loaded record set; every call
//! re-reads the source files.

use std::path::{Path, PathBuf};

use crate::loader;
use crate::record::ProductRecord;
use crate::CatalogError;

/// Stateless catalog reader bound to a data directory.
#[derive(Debug, Clone)]
pub struct CatalogService {
    data_dir: PathBuf,
}

impl CatalogService {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Every record from every category file.
    pub fn all_products(&self) -> Result<Vec<ProductRecord>, CatalogError> {
        loader::load_directory(&self.data_dir)
    }

    /// Distinct categories: one per catalog file present.
    pub fn categories(&self) -> Result<Vec<String>, CatalogError> {
        loader::list_categories(&self.data_dir)
    }

    /// Records of one category, re-reading only that category's file.
    ///
    /// `CategoryNotFound` when no file with that stem exists; an existing
    /// file with no valid rows yields an empty list instead.
    pub fn products_for_category(&self, category: &str) -> Result<Vec<ProductRecord>, CatalogError> {
        let Some(path) = loader::category_file(&self.data_dir, category) else {
            return Err(CatalogError::CategoryNotFound(category.to_string()));
        };
        loader::load_file(&path, category)
    }

    /// Distinct frame sizes across the whole catalog, sorted.
    pub fn sizes(&self) -> Result<Vec<String>, CatalogError> {
        Ok(available_sizes(&self.all_products()?))
    }

    /// Distinct frame sizes restricted to one category.
    ///
    /// An unknown category yields an empty list, not an error: the filter
    /// runs over the full record set.
    pub fn sizes_for_category(&self, category: &str) -> Result<Vec<String>, CatalogError> {
        let products = self.all_products()?;
        let filtered: Vec<ProductRecord> = products
            .into_iter()
            .filter(|p| p.product_category == category)
            .collect();
        Ok(available_sizes(&filtered))
    }
}

/// Distinct frame sizes present in `products`, sorted ascending by
/// (width, height) parsed from the "W*H" form.
///
/// A malformed size sorts first as (0, 0); ties break on the raw string so
/// the order is deterministic.
pub fn available_sizes(products: &[ProductRecord]) -> Vec<String> {
    let mut sizes: Vec<String> = products
        .iter()
        .filter(|p| !p.frame_size.is_empty())
        .map(|p| p.frame_size.clone())
        .collect();
    sizes.sort();
    sizes.dedup();
    sizes.sort_by(|a, b| size_sort_key(a).cmp(&size_sort_key(b)).then_with(|| a.cmp(b)));
    sizes
}

/// (width, height) of a "W*H" size string; (0, 0) when it does not parse.
fn size_sort_key(size: &str) -> (u64, u64) {
    let Some((width, height)) = size.split_once('*') else {
        return (0, 0);
    };
    match (width.trim().parse(), height.trim().parse()) {
        (Ok(w), Ok(h)) => (w, h),
        _ => (0, 0),
    }
}
