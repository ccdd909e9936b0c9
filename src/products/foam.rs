//! 3/16" foam core boards. Shear cut only, no setup fee.

use serde::{Deserialize, Serialize};

use crate::config::ConfigSnapshot;
use crate::cost::{hours, CostLedger};
use crate::print::{sq_ft, JobOptions, Sides, STANDARD_SHEET_SQ_FT};
use crate::products::Product;
use crate::quote::{CostBreakdown, Quote, RetailBreakdown};
use crate::retail::{apply_shop_minimum, design_fee, price_board};
use crate::tiers::{AreaCurve, TierDefault};

const FOAM_CURVE: [TierDefault; 4] = [
    TierDefault::capped(3.99, 8.33).with_floor(25.0),
    TierDefault::capped(15.99, 8.00),
    TierDefault::capped(31.99, 7.00),
    TierDefault::open(6.00),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoamInput {
    pub width: f64,
    pub height: f64,
    pub qty: u32,
    #[serde(default)]
    pub sides: Sides,
    #[serde(flatten)]
    pub job: JobOptions,
}

pub fn quote(input: &FoamInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::Foam, retail(input, cfg), cost(input, cfg))
}

fn retail(input: &FoamInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let qty = f64::from(input.qty);
    let curve = AreaCurve::probe(cfg, "FOM3", &FOAM_CURVE);
    let board = price_board(cfg, "FOM316", &curve, input.sides, input.width, input.height, qty);

    let print_total = board.unit * qty;
    let design_fee = design_fee(cfg, 45.0, &input.job, false);
    let min_order = if board.basis.is_bracket() { 0.0 } else { cfg.num("Retail_Min_Order", 50.0) };
    let min = apply_shop_minimum(print_total + design_fee, min_order);

    RetailBreakdown {
        unit_price: print_total / qty,
        base_rate: board.base_rate,
        print_total,
        design_fee,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis: board.basis,
        tiers: board.tiers,
        ..Default::default()
    }
}

fn cost(input: &FoamInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let qty = f64::from(input.qty);
    let sides = input.sides.count();
    let total_sq_ft = sq_ft(input.width, input.height) * qty;
    let waste = cfg.num("Waste_Factor", 1.15);
    let rate_op = cfg.num("Rate_Operator", 25.0);

    let mut ledger = CostLedger::new();
    ledger.add(
        "substrate",
        total_sq_ft / STANDARD_SHEET_SQ_FT * cfg.num("Cost_Stock_316_4x8", 13.86) * waste,
    );
    ledger.add("ink", total_sq_ft * cfg.num("Cost_Ink_Latex", 0.16) * sides);
    ledger.add("print_prepress", hours(cfg.num("Time_Prepress_Print", 10.0)) * rate_op);
    ledger.add(
        "print_setup",
        hours(cfg.num("Time_Setup_Printer", 5.0) + cfg.num("Time_Handling", 5.0)) * rate_op,
    );

    // Boards feed two-up across the bed.
    let print_hrs = (total_sq_ft / 2.0) / cfg.num("Machine_Speed_LF_Hr", 25.0) * sides;
    ledger.add("print_labor", print_hrs * rate_op * cfg.num("Labor_Attendance_Ratio", 0.10));
    ledger.add("print_machine", print_hrs * cfg.num("Rate_Machine_Flatbed", 10.0));

    let cut_mins = cfg.num("Time_Shear_Setup", 5.0) + qty * cfg.num("Time_Shear_Cut", 1.0);
    ledger.add("cut_labor", hours(cut_mins) * cfg.num("Rate_Shop_Labor", 20.0));

    ledger.detail("total_sq_ft", total_sq_ft);
    ledger.detail("print_hours", print_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.05))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(width: f64, height: f64, qty: u32) -> FoamInput {
        FoamInput { width, height, qty, sides: Sides::Single, job: JobOptions::default() }
    }

    #[test]
    fn test_curve_tiers_and_minimum() {
        // 2 sq ft floors to 25, below the 50 minimum.
        let q = quote(&board(12.0, 24.0, 1), &ConfigSnapshot::new());
        assert_eq!(q.retail.print_total, 25.0);
        assert!(q.retail.is_min_applied);
        assert_eq!(q.retail.setup_fee, 0.0);

        // 8 sq ft at 8.00.
        let q = quote(&board(24.0, 48.0, 1), &ConfigSnapshot::new());
        assert_eq!(q.retail.base_rate, 8.0);
        assert_eq!(q.retail.print_total, 64.0);
        assert!(!q.retail.is_min_applied);
    }

    #[test]
    fn test_bracket_pricing() {
        let cfg = ConfigSnapshot::new().with("RET_FOM316_2436_SS_1", 30.0);
        let q = quote(&board(20.0, 30.0, 1), &cfg);
        assert!(q.retail.basis.is_bracket());
        assert_eq!(q.retail.grand_total, 30.0);
    }

    #[test]
    fn test_default_volume_break() {
        let q = quote(&board(24.0, 48.0, 10), &ConfigSnapshot::new());
        assert!((q.retail.print_total - 64.0 * 0.95 * 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_substrate_is_per_area_with_waste() {
        let q = quote(&board(48.0, 96.0, 1), &ConfigSnapshot::new());
        assert!((q.cost.breakdown["substrate"] - 13.86 * 1.15).abs() < 1e-9);
    }
}
