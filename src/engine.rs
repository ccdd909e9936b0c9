//! Quote Engine - Single Entry Point
//!
//! `quote` always runs validation first. Product engines are only reached
//! with a request that has no error-level violations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::QuoteError;
use crate::hashing::{compute_job_hash, compute_quote_hash};
use crate::products::{Product, QuoteRequest};
use crate::quote::Quote;
use crate::sheets::SheetRegistry;
use crate::validation::{ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

/// A quote plus everything needed to reproduce and audit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotedJob {
    pub id: String,
    pub product: Product,
    pub engine_version: String,
    pub created_at: DateTime<Utc>,
    /// Fingerprint of (request, tab, engine version).
    pub job_hash: String,
    /// Fingerprint of the computed quote.
    pub quote_hash: String,
    pub validation: ValidationResult,
    pub quote: Quote,
}

/// Row of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product: Product,
    pub name: String,
    pub tab: String,
    /// False when the product prices from built-in defaults only.
    pub has_tab: bool,
    pub keys: usize,
}

pub struct QuoteEngine {
    sheets: SheetRegistry,
    validator: Validator,
}

impl QuoteEngine {
    pub fn new(sheets: SheetRegistry) -> Self {
        Self {
            sheets,
            validator: Validator::new(),
        }
    }

    pub fn sheets(&self) -> &SheetRegistry {
        &self.sheets
    }

    pub fn list_products(&self) -> Vec<ProductSummary> {
        Product::ALL
            .into_iter()
            .map(|product| ProductSummary {
                product,
                name: product.display_name().to_string(),
                tab: product.tab().to_string(),
                has_tab: self.sheets.has_tab(product),
                keys: self.sheets.tab(product).len(),
            })
            .collect()
    }

    /// This is the ONLY validation entry point.
    pub fn validate(&self, request: &QuoteRequest) -> ValidationResult {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        self.validator.validate(request)
    }

    /// Prices a request against its product tab.
    pub fn quote(&self, request: &QuoteRequest) -> Result<QuotedJob, QuoteError> {
        let product = request.product();

        let validation = self.validate(request);
        if !validation.valid {
            let summary = validation.error_summary();
            warn!(product = %product, violations = %summary, "Quote request rejected");
            return Err(QuoteError::InvalidRequest(summary));
        }

        let tab = self.sheets.tab(product);
        let quote = request.quote(tab);
        if !quote.retail.grand_total.is_finite() || !quote.cost.total.is_finite() {
            warn!(
                product = %product,
                retail = quote.retail.grand_total,
                cost = quote.cost.total,
                "Quote is not finite, check the pricing tab for malformed values"
            );
        }

        let job_hash = compute_job_hash(request, tab, ENGINE_VERSION)?;
        let quote_hash = compute_quote_hash(&quote)?;

        info!(
            product = %product,
            qty = request.qty(),
            grand_total = quote.retail.grand_total,
            cost_total = quote.cost.total,
            job_hash = %job_hash,
            "Quote computed"
        );

        Ok(QuotedJob {
            id: Uuid::new_v4().to_string(),
            product,
            engine_version: ENGINE_VERSION.to_string(),
            created_at: Utc::now(),
            job_hash,
            quote_hash,
            validation,
            quote,
        })
    }
}

impl Default for QuoteEngine {
    fn default() -> Self {
        Self::new(SheetRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSnapshot;

    fn request(json: &str) -> QuoteRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_quote_uses_registered_tab() {
        let mut sheets = SheetRegistry::new();
        sheets.register(Product::Yard, ConfigSnapshot::new().with("Retail_Price_Sign_SS", 20.0));
        let engine = QuoteEngine::new(sheets);

        let job = engine.quote(&request(r#"{"product": "yard", "qty": 10}"#)).unwrap();
        assert_eq!(job.quote.retail.print_total, 200.0);
        assert_eq!(job.product, Product::Yard);
        assert_eq!(job.engine_version, ENGINE_VERSION);
        assert_eq!(job.job_hash.len(), 64);
    }

    #[test]
    fn test_invalid_request_is_rejected() {
        let err = QuoteEngine::default()
            .quote(&request(r#"{"product": "pvc", "width": 24, "height": 18, "qty": 0}"#))
            .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidRequest(_)));
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn test_warnings_travel_with_the_quote() {
        let job = QuoteEngine::default()
            .quote(&request(r#"{"product": "banner", "width": 120, "height": 72, "qty": 1}"#))
            .unwrap();
        assert!(job.validation.valid);
        assert_eq!(job.validation.violations.len(), 1);
        assert!(job.quote.retail.is_oversize);
    }

    #[test]
    fn test_product_listing() {
        let mut sheets = SheetRegistry::new();
        sheets.register(Product::Acm, ConfigSnapshot::new().with("Retail_Min_Order", 60.0));
        let listing = QuoteEngine::new(sheets).list_products();
        assert_eq!(listing.len(), Product::ALL.len());
        assert!(listing[0].has_tab);
        assert_eq!(listing[0].keys, 1);
        assert!(!listing[1].has_tab);
    }
}
