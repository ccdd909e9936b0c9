//! Coroplast (corrugated plastic) signs.

use serde::{Deserialize, Serialize};

use crate::config::ConfigSnapshot;
use crate::cost::{hours, CostLedger};
use crate::print::{sq_ft, CutShape, JobOptions, Sides, STANDARD_SHEET_SQ_FT};
use crate::products::Product;
use crate::quote::{CostBreakdown, Quote, RetailBreakdown};
use crate::retail::{apply_shop_minimum, design_fee, price_board, router_fee, setup_fee};
use crate::tiers::{AreaCurve, TierDefault};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoroThickness {
    #[default]
    #[serde(rename = "4mm")]
    FourMm,
    #[serde(rename = "10mm")]
    TenMm,
}

impl CoroThickness {
    fn code(self) -> &'static str {
        match self {
            CoroThickness::FourMm => "COR4",
            CoroThickness::TenMm => "COR10",
        }
    }

    fn curve(self, cfg: &ConfigSnapshot) -> AreaCurve {
        const FOUR: [TierDefault; 4] = [
            TierDefault::capped(3.99, 8.33).with_floor(25.0),
            TierDefault::capped(15.99, 7.00),
            TierDefault::capped(31.99, 6.00),
            TierDefault::open(5.00),
        ];
        const TEN: [TierDefault; 4] = [
            TierDefault::capped(3.99, 25.00).with_floor(75.0),
            TierDefault::capped(15.99, 21.00),
            TierDefault::capped(31.99, 18.00),
            TierDefault::open(15.00),
        ];
        match self {
            CoroThickness::FourMm => AreaCurve::probe(cfg, self.code(), &FOUR),
            CoroThickness::TenMm => AreaCurve::probe(cfg, self.code(), &TEN),
        }
    }

    fn sheet_cost(self, cfg: &ConfigSnapshot) -> f64 {
        match self {
            CoroThickness::FourMm => cfg.num("Cost_Stock_4mm_4x8", 8.40),
            CoroThickness::TenMm => cfg.num("Cost_Stock_10mm_4x8", 33.49),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoroplastInput {
    pub width: f64,
    pub height: f64,
    pub qty: u32,
    #[serde(default)]
    pub sides: Sides,
    #[serde(default)]
    pub thickness: CoroThickness,
    #[serde(default)]
    pub shape: CutShape,
    #[serde(flatten)]
    pub job: JobOptions,
}

pub fn quote(input: &CoroplastInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::Coroplast, retail(input, cfg), cost(input, cfg))
}

fn retail(input: &CoroplastInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
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

    let print_total = board.unit * qty;
    let router_fee = router_fee(cfg, input.shape);
    let setup_fee = setup_fee(cfg, 15.0, &input.job);
    let design_fee = design_fee(cfg, 45.0, &input.job, false);

    let min_order = if board.basis.is_bracket() { 0.0 } else { cfg.num("Retail_Min_Order", 50.0) };
    let min = apply_shop_minimum(print_total + router_fee + setup_fee + design_fee, min_order);
    board.amortize(router_fee);

    RetailBreakdown {
        unit_price: (print_total + router_fee) / qty,
        base_rate: board.base_rate,
        print_total,
        router_fee,
        setup_fee,
        design_fee,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis: board.basis,
        tiers: board.tiers,
        ..Default::default()
    }
}

fn cost(input: &CoroplastInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let qty = f64::from(input.qty);
    let sides = input.sides.count();
    let total_sq_ft = sq_ft(input.width, input.height) * qty;
    let waste = cfg.num("Waste_Factor", 1.10);
    let rate_op = cfg.num("Rate_Operator", 25.0);
    let rate_cnc = cfg.num("Rate_CNC_Labor", 25.0);

    let mut ledger = CostLedger::new();

    let raw = ledger.add("blanks", input.thickness.sheet_cost(cfg) / STANDARD_SHEET_SQ_FT * total_sq_ft);
    ledger.add("waste", raw * (waste - 1.0));
    ledger.add("ink", total_sq_ft * sides * cfg.num("Cost_Ink_Latex", 0.16));

    let cut_hrs = match input.shape {
        CutShape::Rectangle => {
            ledger.add("cut_setup", hours(cfg.num("Time_Shear_Setup", 5.0)) * rate_op);
            let hrs = hours(qty * 2.0 * cfg.num("Time_Shear_Cut", 1.0));
            ledger.add("cut_labor", hrs * rate_op);
            hrs
        }
        CutShape::Easy | CutShape::Complex => {
            ledger.add("cut_setup", hours(cfg.num("Time_Setup_CNC", 10.0)) * rate_cnc);
            let per_sq_ft = if input.shape == CutShape::Complex {
                cfg.num("Time_CNC_Complex_SqFt", 2.0)
            } else {
                cfg.num("Time_CNC_Easy_SqFt", 1.0)
            };
            let hrs = hours(total_sq_ft * per_sq_ft);
            ledger.add("cut_labor", hrs * rate_cnc);
            ledger.add("cut_machine", hrs * cfg.num("Rate_Machine_CNC", 35.0));
            hrs
        }
    };

    let setup_mins = cfg.num("Time_Setup_Job", 15.0) + cfg.num("Time_Handling", 4.0);
    ledger.add("print_setup", hours(setup_mins) * rate_op);

    let print_hrs = (input.height / 12.0) * qty / cfg.num("Machine_Speed_LF_Hr", 25.0) * sides;
    ledger.add("print_labor", print_hrs * rate_op * cfg.num("Labor_Attendance_Ratio", 0.10));
    ledger.add("print_machine", print_hrs * cfg.num("Rate_Machine_Flatbed", 45.0));

    ledger.detail("total_sq_ft", total_sq_ft);
    ledger.detail("print_hours", print_hrs);
    ledger.detail("cut_hours", cut_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.05))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::PricingBasis;

    fn sign(qty: u32) -> CoroplastInput {
        CoroplastInput {
            width: 24.0,
            height: 18.0,
            qty,
            sides: Sides::Single,
            thickness: CoroThickness::FourMm,
            shape: CutShape::Rectangle,
            job: JobOptions::default(),
        }
    }

    fn bracket_sheet() -> ConfigSnapshot {
        ConfigSnapshot::new()
            .with("RET_COR4_1824_SS_1", 12.0)
            .with("RET_COR4_1824_SS_10", 9.0)
            .with("RET_COR4_2436_SS_1", 20.0)
    }

    #[test]
    fn test_bracket_waives_minimum() {
        let q = quote(&sign(1), &bracket_sheet());
        assert_eq!(q.retail.basis, PricingBasis::Bracket { label: "18x24".into() });
        assert_eq!(q.retail.min_order, 0.0);
        assert!(!q.retail.is_min_applied);
        // 12 + 15 setup.
        assert_eq!(q.retail.grand_total, 27.0);
    }

    #[test]
    fn test_bracket_break_at_first_tier() {
        let cfg = bracket_sheet();
        assert_eq!(quote(&sign(9), &cfg).retail.print_total, 108.0);
        assert_eq!(quote(&sign(10), &cfg).retail.print_total, 90.0);
    }

    #[test]
    fn test_curve_with_floor_and_minimum() {
        // 3 sq ft * 8.33 = 24.99 floors to 25; + 15 setup = 40 < 50.
        let q = quote(&sign(1), &ConfigSnapshot::new());
        assert_eq!(q.retail.basis, PricingBasis::AreaCurve);
        assert_eq!(q.retail.print_total, 25.0);
        assert!(q.retail.is_min_applied);
        assert_eq!(q.retail.grand_total, 50.0);
    }

    #[test]
    fn test_ten_mm_curve() {
        let mut input = sign(2);
        input.thickness = CoroThickness::TenMm;
        input.width = 48.0;
        input.height = 24.0;
        // 8 sq ft at 21 = 168 per sign.
        let q = quote(&input, &ConfigSnapshot::new());
        assert_eq!(q.retail.base_rate, 21.0);
        assert!((q.retail.print_total - 336.0).abs() < 1e-9);
    }

    #[test]
    fn test_router_fee_amortized_in_tier_log() {
        let mut input = sign(1);
        input.shape = CutShape::Easy;
        let q = quote(&input, &ConfigSnapshot::new());
        assert_eq!(q.retail.router_fee, 30.0);
        assert!((q.retail.tiers[0].unit_price - 55.0).abs() < 1e-9);
        assert!((q.retail.unit_price - 55.0).abs() < 1e-9);
        assert!(q.cost.breakdown.contains_key("cut_machine"));
    }

    #[test]
    fn test_cost_waste_line_and_risk() {
        let q = quote(&sign(10), &ConfigSnapshot::new());
        let blanks = q.cost.breakdown["blanks"];
        assert!((blanks - 8.40 / 32.0 * 30.0).abs() < 1e-9);
        assert!((q.cost.breakdown["waste"] - blanks * 0.10).abs() < 1e-9);
        assert!((q.cost.total - q.cost.subtotal * 1.05).abs() < 1e-9);
    }
}
