//! SignQuote Core - Sign Shop Quoting Engine
//!
//! Every product is priced twice, independently:
//! 1. Retail: what the customer is quoted (rate tables, brackets, fees,
//!    volume breaks, shop minimum).
//! 2. Hard cost: what the shop spends (materials, ink, machine and labor
//!    time, waste, risk buffer).
//!
//! Engines are pure functions of (request, pricing tab). [`QuoteEngine`]
//! is the audited entry point.

pub mod config;
pub mod sheets;
pub mod tiers;
pub mod bracket;
pub mod stock;
pub mod print;
pub mod cost;
pub mod retail;
pub mod quote;
pub mod products;
pub mod validation;
pub mod hashing;
pub mod engine;
pub mod error;

pub use config::{ConfigSnapshot, ConfigValue};
pub use sheets::SheetRegistry;
pub use products::{Product, QuoteRequest};
pub use quote::{CostBreakdown, LineItem, Metrics, PricingBasis, Quote, RetailBreakdown, TierLogEntry};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};
pub use hashing::{canonical_json, compute_job_hash, compute_quote_hash};
pub use engine::{ProductSummary, QuoteEngine, QuotedJob};
pub use error::QuoteError;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
