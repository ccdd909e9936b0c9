//! Expanded PVC signs, with optional laminate and rounded corners.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigSnapshot;
use crate::cost::{hours, CostLedger};
use crate::print::{sq_ft, CutShape, JobOptions, Sides, STANDARD_SHEET_SQ_FT};
use crate::products::{default_true, Product};
use crate::quote::{CostBreakdown, Quote, RetailBreakdown};
use crate::retail::{apply_shop_minimum, design_fee, price_board, router_fee};
use crate::tiers::{AreaCurve, TierDefault};

/// Share of the print price taken off when the sign ships unlaminated.
const UNLAMINATED_DEDUCTION: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PvcThickness {
    #[default]
    #[serde(rename = "3mm")]
    ThreeMm,
    #[serde(rename = "6mm")]
    SixMm,
}

impl PvcThickness {
    fn code(self) -> &'static str {
        match self {
            PvcThickness::ThreeMm => "PVC3",
            PvcThickness::SixMm => "PVC6",
        }
    }

    /// T1 carries only the per-sign floor.
    fn curve(self, cfg: &ConfigSnapshot) -> AreaCurve {
        const THREE: [TierDefault; 4] = [
            TierDefault::floor_only(33.0),
            TierDefault::capped(5.99, 13.20),
            TierDefault::capped(11.99, 8.40),
            TierDefault::open(7.80),
        ];
        const SIX: [TierDefault; 4] = [
            TierDefault::floor_only(33.0),
            TierDefault::capped(5.99, 22.00),
            TierDefault::capped(11.99, 14.00),
            TierDefault::open(13.00),
        ];
        match self {
            PvcThickness::ThreeMm => AreaCurve::probe(cfg, self.code(), &THREE),
            PvcThickness::SixMm => AreaCurve::probe(cfg, self.code(), &SIX),
        }
    }

    fn sheet_cost(self, cfg: &ConfigSnapshot) -> f64 {
        match self {
            PvcThickness::ThreeMm => cfg.num("Cost_Stock_3mm_4x8", 29.09),
            PvcThickness::SixMm => cfg.num("Cost_Stock_6mm_4x8", 58.37),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PvcInput {
    pub width: f64,
    pub height: f64,
    pub qty: u32,
    #[serde(default)]
    pub sides: Sides,
    #[serde(default)]
    pub thickness: PvcThickness,
    #[serde(default)]
    pub shape: CutShape,
    #[serde(default = "default_true")]
    pub laminate: bool,
    #[serde(default)]
    pub rounded_corners: bool,
    #[serde(flatten)]
    pub job: JobOptions,
}

pub fn quote(input: &PvcInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::Pvc, retail(input, cfg), cost(input, cfg))
}

fn retail(input: &PvcInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let qty = f64::from(input.qty);
    let curve = input.thickness.curve(cfg);
    let mut board = price_board(
        cfg,
        input.thickness.code(),
        &curve,
        input.sides,
        input.width,
        input.height,
        qty,
    );

    let gross_print = board.unit * qty;
    let mut adders = BTreeMap::new();
    let deduction = if input.laminate { 0.0 } else { gross_print * UNLAMINATED_DEDUCTION };
    if deduction > 0.0 {
        adders.insert("no_laminate".to_string(), -deduction);
    }
    let print_total = gross_print - deduction;

    let router_fee = router_fee(cfg, input.shape);
    let design_fee = design_fee(cfg, 45.0, &input.job, false);
    let min_order = if board.basis.is_bracket() { 0.0 } else { cfg.num("Retail_Min_Order", 50.0) };
    let min = apply_shop_minimum(print_total + router_fee + design_fee, min_order);
    board.amortize(router_fee);

    RetailBreakdown {
        unit_price: (print_total + router_fee) / qty,
        base_rate: board.base_rate,
        print_total,
        router_fee,
        design_fee,
        adders,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis: board.basis,
        tiers: board.tiers,
        ..Default::default()
    }
}

fn cost(input: &PvcInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let qty = f64::from(input.qty);
    let sides = input.sides.count();
    let total_sq_ft = sq_ft(input.width, input.height) * qty;
    let waste = cfg.num("Waste_Factor", 1.15);
    let attendance = cfg.num("Labor_Attendance_Ratio", 0.10);
    let rate_op = cfg.num("Rate_Operator", 25.0);
    let rate_cnc = cfg.num("Rate_CNC_Labor", 25.0);

    let mut ledger = CostLedger::new();
    ledger.add(
        "substrate",
        total_sq_ft / STANDARD_SHEET_SQ_FT * input.thickness.sheet_cost(cfg) * waste,
    );
    ledger.add("ink", total_sq_ft * cfg.num("Cost_Ink_Latex", 0.16) * sides);
    ledger.add("print_prepress", hours(cfg.num("Time_Prepress_Print", 10.0)) * rate_op);
    ledger.add(
        "print_setup",
        hours(cfg.num("Time_Setup_Printer", 5.0) + cfg.num("Time_Handling", 5.0)) * rate_op,
    );

    let print_hrs = (total_sq_ft / 2.0) / cfg.num("Machine_Speed_LF_Hr", 25.0) * sides;
    ledger.add("print_labor", print_hrs * rate_op * attendance);
    ledger.add("print_machine", print_hrs * cfg.num("Rate_Machine_Flatbed", 10.0));

    let cut_hrs = match input.shape {
        CutShape::Rectangle => {
            let round_mins = if input.rounded_corners {
                cfg.num("Time_Round_Setup", 5.0) + qty * 4.0 * cfg.num("Time_Round_Corner", 0.5)
            } else {
                0.0
            };
            let hrs = hours(cfg.num("Time_Shear_Setup", 5.0) + qty * cfg.num("Time_Shear_Cut", 1.0) + round_mins);
            ledger.add("cut_labor", hrs * cfg.num("Rate_Shop_Labor", 20.0));
            hrs
        }
        CutShape::Easy | CutShape::Complex => {
            ledger.add("cnc_prepress", hours(cfg.num("Time_Prepress_CNC", 15.0)) * rate_cnc);
            ledger.add("cnc_setup", hours(cfg.num("Time_Setup_CNC", 10.0)) * rate_cnc);
            let per_sq_ft = if input.shape == CutShape::Easy {
                cfg.num("Time_CNC_Easy_SqFt", 1.0)
            } else {
                cfg.num("Time_CNC_Complex_SqFt", 2.0)
            };
            let hrs = hours(total_sq_ft * per_sq_ft);
            ledger.add("cut_machine", hrs * cfg.num("Rate_Machine_CNC", 10.0));
            ledger.add("cut_labor", hrs * rate_cnc * attendance);
            hrs
        }
    };

    ledger.detail("total_sq_ft", total_sq_ft);
    ledger.detail("print_hours", print_hrs);
    ledger.detail("cut_hours", cut_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.05))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(width: f64, height: f64, qty: u32) -> PvcInput {
        PvcInput {
            width,
            height,
            qty,
            sides: Sides::Single,
            thickness: PvcThickness::ThreeMm,
            shape: CutShape::Rectangle,
            laminate: true,
            rounded_corners: false,
            job: JobOptions::default(),
        }
    }

    #[test]
    fn test_rate_less_first_row_only_floors() {
        // 1 sq ft matches T2 at 13.20 and floors to 33.
        let q = quote(&sign(12.0, 12.0, 1), &ConfigSnapshot::new());
        assert_eq!(q.retail.base_rate, 13.20);
        assert_eq!(q.retail.print_total, 33.0);
        assert!(q.retail.is_min_applied);
    }

    #[test]
    fn test_mid_tier_rate() {
        // 8 sq ft at 8.40.
        let q = quote(&sign(24.0, 48.0, 1), &ConfigSnapshot::new());
        assert_eq!(q.retail.base_rate, 8.40);
        assert!((q.retail.print_total - 67.2).abs() < 1e-9);
    }

    #[test]
    fn test_unlaminated_deduction() {
        let mut input = sign(24.0, 48.0, 1);
        input.laminate = false;
        let q = quote(&input, &ConfigSnapshot::new());
        assert!((q.retail.print_total - 67.2 * 0.9).abs() < 1e-9);
        assert!((q.retail.adders["no_laminate"] + 6.72).abs() < 1e-9);
    }

    #[test]
    fn test_rounded_corners_add_shear_time() {
        let plain = quote(&sign(12.0, 12.0, 4), &ConfigSnapshot::new());
        let mut input = sign(12.0, 12.0, 4);
        input.rounded_corners = true;
        let rounded = quote(&input, &ConfigSnapshot::new());
        // 5 setup + 4 * 4 * 0.5 = 13 extra minutes at 20/h.
        let extra = rounded.cost.breakdown["cut_labor"] - plain.cost.breakdown["cut_labor"];
        assert!((extra - 13.0 / 60.0 * 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_cnc_branch_costs() {
        let mut input = sign(24.0, 24.0, 2);
        input.shape = CutShape::Complex;
        let q = quote(&input, &ConfigSnapshot::new());
        let hrs = 8.0 * 2.0 / 60.0;
        assert!((q.cost.breakdown["cut_machine"] - hrs * 10.0).abs() < 1e-9);
        assert!((q.cost.breakdown["cut_labor"] - hrs * 25.0 * 0.10).abs() < 1e-9);
        assert!(q.cost.breakdown.contains_key("cnc_prepress"));
    }
}
