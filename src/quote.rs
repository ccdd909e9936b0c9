//! Quote Result Types
//!
//! Every product engine returns the same shape: a retail side (what the
//! customer pays), a cost side (what the shop spends) and derived metrics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::products::Product;
use crate::stock::StockOutcome;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub product: Product,
    pub retail: RetailBreakdown,
    pub cost: CostBreakdown,
    pub metrics: Metrics,
}

impl Quote {
    pub fn new(product: Product, retail: RetailBreakdown, cost: CostBreakdown) -> Self {
        let metrics = Metrics::from_totals(retail.grand_total, cost.total);
        Self { product, retail, cost, metrics }
    }
}

/// Where the base price came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingBasis {
    /// Fixed standard-size bracket. Shop minimum is waived.
    Bracket { label: String },
    #[default]
    AreaCurve,
    /// Flat per-area material rate.
    FlatRate,
    /// Quantity price table.
    PriceTier,
}

impl PricingBasis {
    pub fn is_bracket(&self) -> bool {
        matches!(self, PricingBasis::Bracket { .. })
    }
}

/// One row of the quantity-break table shown next to a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierLogEntry {
    pub quantity: f64,
    #[serde(default)]
    pub discount: f64,
    pub base_rate: f64,
    pub unit_price: f64,
}

/// Priced row of a multi-panel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub material: String,
    pub qty: u32,
    pub width: f64,
    pub height: f64,
    /// Printed area for the whole order.
    pub sq_ft: f64,
    pub retail: f64,
    /// Printed webs after seaming.
    pub seam_panels: u32,
    pub included: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetailBreakdown {
    pub unit_price: f64,
    /// Per-sq-ft (or per-unit) base before discount, for display.
    pub base_rate: f64,
    pub print_total: f64,
    pub router_fee: f64,
    pub setup_fee: f64,
    pub design_fee: f64,
    /// Product-specific finishing and hardware charges.
    pub adders: BTreeMap<String, f64>,
    pub grand_total: f64,
    pub min_order: f64,
    pub is_min_applied: bool,
    pub basis: PricingBasis,
    pub tiers: Vec<TierLogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_label: Option<String>,
    /// Price table returned zero: needs a hand-built quote.
    #[serde(default)]
    pub is_custom: bool,
    /// Exceeds in-house production width.
    #[serde(default)]
    pub is_oversize: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<LineItem>,
}

impl RetailBreakdown {
    pub fn adders_total(&self) -> f64 {
        self.adders.values().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub total: f64,
    pub subtotal: f64,
    /// Named cost lines summing to `subtotal`.
    pub breakdown: BTreeMap<String, f64>,
    /// Quantities behind the costs (hours, sheets, sq ft).
    pub details: BTreeMap<String, f64>,
    pub waste_pct: f64,
    pub risk_pct: f64,
    pub risk_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<StockOutcome>,
    #[serde(default)]
    pub oversized: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// `(retail - cost) / retail`; absent when retail is zero.
    pub margin: Option<f64>,
}

impl Metrics {
    pub fn from_totals(retail_total: f64, cost_total: f64) -> Self {
        let margin = if retail_total == 0.0 {
            None
        } else {
            Some((retail_total - cost_total) / retail_total)
        };
        Self { margin }
    }
}
