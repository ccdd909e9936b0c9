//! Pricing Sheets - One Tab per Product
//!
//! A tab is a JSON object of `key -> number | string` stored as
//! `<tab>.json` (see [`Product::tab`]). A product without a tab prices from
//! its literal defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::config::ConfigSnapshot;
use crate::error::QuoteError;
use crate::products::Product;

/// Registry of loaded product tabs.
#[derive(Debug, Clone, Default)]
pub struct SheetRegistry {
    tabs: BTreeMap<Product, ConfigSnapshot>,
    empty: ConfigSnapshot,
}

impl SheetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `<tab>.json` in `dir`. A missing directory yields an empty
    /// registry; files whose stem is not a product tab are skipped.
    pub fn load_from_dir(dir: &Path) -> Result<Self, QuoteError> {
        let mut registry = Self::new();
        if !dir.exists() {
            debug!(dir = %dir.display(), "Sheets directory not found, using built-in defaults");
            return Ok(registry);
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |e| e != "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(product) = Product::from_tab(stem) else {
                warn!(file = %path.display(), "Skipping file that is not a product tab");
                continue;
            };

            let content = fs::read_to_string(&path)?;
            let snapshot = ConfigSnapshot::from_json_str(&content).map_err(|source| QuoteError::SheetParse {
                tab: stem.to_string(),
                source,
            })?;
            debug!(tab = stem, keys = snapshot.len(), "Loaded pricing tab");
            registry.tabs.insert(product, snapshot);
        }

        Ok(registry)
    }

    pub fn register(&mut self, product: Product, snapshot: ConfigSnapshot) {
        self.tabs.insert(product, snapshot);
    }

    /// The product's tab, or an empty snapshot when none was loaded.
    pub fn tab(&self, product: Product) -> &ConfigSnapshot {
        self.tabs.get(&product).unwrap_or(&self.empty)
    }

    pub fn has_tab(&self, product: Product) -> bool {
        self.tabs.contains_key(&product)
    }

    pub fn loaded(&self) -> impl Iterator<Item = Product> + '_ {
        self.tabs.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_tab_is_empty() {
        let registry = SheetRegistry::new();
        assert!(registry.tab(Product::Banner).is_empty());
        assert!(!registry.has_tab(Product::Banner));
    }

    #[test]
    fn test_register_replaces_tab() {
        let mut registry = SheetRegistry::new();
        registry.register(Product::Yard, ConfigSnapshot::new().with("Tier_1_Qty", 10.0));
        registry.register(Product::Yard, ConfigSnapshot::new().with("Tier_1_Qty", 25.0));
        assert_eq!(registry.tab(Product::Yard).num("Tier_1_Qty", 0.0), 25.0);
        assert_eq!(registry.loaded().collect::<Vec<_>>(), vec![Product::Yard]);
    }

    #[test]
    fn test_missing_dir_is_not_an_error() {
        let registry = SheetRegistry::load_from_dir(Path::new("/nonexistent/sheets")).unwrap();
        assert_eq!(registry.loaded().count(), 0);
    }
}
