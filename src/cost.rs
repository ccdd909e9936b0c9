//! Cost Model - Hard Cost Ledger
//!
//! Engines post named cost lines (material, ink, machine, labor) into a
//! ledger, then close it with the product's waste and risk factors.

use std::collections::BTreeMap;

use crate::quote::CostBreakdown;
use crate::stock::StockOutcome;

/// Minutes to hours.
pub fn hours(minutes: f64) -> f64 {
    minutes / 60.0
}

#[derive(Debug, Clone, Default)]
pub struct CostLedger {
    lines: BTreeMap<String, f64>,
    details: BTreeMap<String, f64>,
    subtotal: f64,
    stock: Option<StockOutcome>,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts a cost line. Posting the same name twice accumulates.
    pub fn add(&mut self, name: &str, amount: f64) -> f64 {
        *self.lines.entry(name.to_string()).or_insert(0.0) += amount;
        self.subtotal += amount;
        amount
    }

    /// Records a non-monetary quantity (hours, sheets, sq ft).
    pub fn detail(&mut self, name: &str, value: f64) {
        self.details.insert(name.to_string(), value);
    }

    pub fn attach_stock(&mut self, stock: StockOutcome) {
        self.stock = Some(stock);
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    /// Closes the ledger. `waste_factor` is only reported here (engines fold
    /// waste into their material lines); the risk buffer
    /// `subtotal * (risk_factor - 1)` is added to reach the total.
    pub fn finish(self, waste_factor: f64, risk_factor: f64) -> CostBreakdown {
        let risk_cost = self.subtotal * (risk_factor - 1.0);
        let oversized = self.stock.as_ref().is_some_and(StockOutcome::is_oversized);
        CostBreakdown {
            total: self.subtotal + risk_cost,
            subtotal: self.subtotal,
            breakdown: self.lines,
            details: self.details,
            waste_pct: (waste_factor - 1.0) * 100.0,
            risk_pct: (risk_factor - 1.0) * 100.0,
            risk_cost,
            stock: self.stock,
            oversized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_accumulate_into_subtotal() {
        let mut ledger = CostLedger::new();
        ledger.add("material", 10.0);
        ledger.add("labor", 5.0);
        ledger.add("labor", 2.5);
        let cost = ledger.finish(1.2, 1.0);
        assert_eq!(cost.subtotal, 17.5);
        assert_eq!(cost.total, 17.5);
        assert_eq!(cost.breakdown["labor"], 7.5);
        assert_eq!(cost.risk_cost, 0.0);
        assert!((cost.waste_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_buffer_added_to_total() {
        let mut ledger = CostLedger::new();
        ledger.add("material", 100.0);
        let cost = ledger.finish(1.0, 1.10);
        assert!((cost.risk_cost - 10.0).abs() < 1e-9);
        assert!((cost.total - 110.0).abs() < 1e-9);
        assert!((cost.risk_pct - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_hours() {
        assert_eq!(hours(90.0), 1.5);
    }
}
