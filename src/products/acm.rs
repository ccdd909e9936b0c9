//! ACM (aluminium composite) panels.
//!
//! Retail follows a per-thickness area curve. Cost runs the stock yield
//! optimizer over the configured sheet sizes and models a flatbed pass plus
//! shear or CNC finishing.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ConfigSnapshot;
use crate::cost::{hours, CostLedger};
use crate::print::{sq_ft, CutShape, JobOptions, Sides, FLATBED_BED_WIDTH_IN};
use crate::products::{default_true, Product};
use crate::quote::{CostBreakdown, PricingBasis, Quote, RetailBreakdown, TierLogEntry};
use crate::retail::{apply_shop_minimum, design_fee, double_sided_multiplier, router_fee, setup_fee};
use crate::stock::{select_stock, SizeLimit, StockSheet};
use crate::tiers::{AreaCurve, TierDefault, VolumeColumn, VolumeTiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcmThickness {
    #[default]
    #[serde(rename = "3mm")]
    ThreeMm,
    #[serde(rename = "6mm")]
    SixMm,
}

const ACM3_CURVE: [TierDefault; 4] = [
    TierDefault::capped(2.99, 24.0).with_floor(25.0),
    TierDefault::capped(5.99, 18.0),
    TierDefault::capped(11.99, 14.0),
    TierDefault::open(12.0),
];

const ACM6_CURVE: [TierDefault; 4] = [
    TierDefault::capped(2.99, 32.0).with_floor(35.0),
    TierDefault::capped(5.99, 24.0),
    TierDefault::capped(11.99, 19.0),
    TierDefault::open(16.0),
];

/// (size id, width, height, default sheet cost)
const STOCK_3MM: [(&str, f64, f64, f64); 3] = [
    ("4x8", 48.0, 96.0, 52.09),
    ("4x10", 48.0, 120.0, 69.44),
    ("5x10", 60.0, 120.0, 75.75),
];

const STOCK_6MM: [(&str, f64, f64, f64); 2] = [
    ("4x8", 48.0, 96.0, 78.50),
    ("5x10", 60.0, 120.0, 112.00),
];

impl AcmThickness {
    fn code(self) -> &'static str {
        match self {
            AcmThickness::ThreeMm => "3mm",
            AcmThickness::SixMm => "6mm",
        }
    }

    fn curve(self, cfg: &ConfigSnapshot) -> AreaCurve {
        match self {
            AcmThickness::ThreeMm => AreaCurve::probe(cfg, "ACM3", &ACM3_CURVE),
            AcmThickness::SixMm => AreaCurve::probe(cfg, "ACM6", &ACM6_CURVE),
        }
    }

    fn stock(self, cfg: &ConfigSnapshot) -> Vec<StockSheet> {
        let sizes: &[(&str, f64, f64, f64)] = match self {
            AcmThickness::ThreeMm => &STOCK_3MM,
            AcmThickness::SixMm => &STOCK_6MM,
        };
        sizes
            .iter()
            .map(|&(id, w, h, cost)| {
                StockSheet::new(
                    id,
                    cfg.num(&format!("Stock_{}_W", id), w),
                    cfg.num(&format!("Stock_{}_H", id), h),
                    cfg.num(&format!("Cost_Stock_{}_{}", self.code(), id), cost),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcmColor {
    #[default]
    #[serde(alias = "white")]
    White,
    #[serde(alias = "black")]
    Black,
    #[serde(alias = "brushed")]
    Brushed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcmInput {
    pub width: f64,
    pub height: f64,
    pub qty: u32,
    #[serde(default)]
    pub sides: Sides,
    #[serde(default)]
    pub thickness: AcmThickness,
    #[serde(default)]
    pub color: AcmColor,
    #[serde(default)]
    pub shape: CutShape,
    #[serde(default = "default_true")]
    pub laminate: bool,
    #[serde(flatten)]
    pub job: JobOptions,
}

pub fn quote(input: &AcmInput, cfg: &ConfigSnapshot) -> Quote {
    let mut retail = retail(input, cfg);
    let cost = cost(input, cfg);
    retail.is_oversize = cost.oversized;
    Quote::new(Product::Acm, retail, cost)
}

fn retail(input: &AcmInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let qty = f64::from(input.qty);
    let unit_sq_ft = sq_ft(input.width, input.height);

    let (base_rate, mut unit_base) = match input.thickness.curve(cfg).resolve(unit_sq_ft) {
        Some(hit) => (hit.rate, hit.price(unit_sq_ft)),
        None => (0.0, 0.0),
    };

    if input.sides.is_double() {
        unit_base *= double_sided_multiplier(cfg);
    }
    if input.color == AcmColor::Black && input.thickness == AcmThickness::SixMm {
        unit_base *= cfg.num("Retail_Adder_Black_Mult", 2.0);
    }

    let volume = VolumeTiers::probe(cfg, VolumeColumn::Discount, &[]);
    let discount = volume.discount_for(qty);
    let tiers = volume
        .tiers
        .iter()
        .map(|t| TierLogEntry {
            quantity: t.threshold,
            discount: t.value,
            base_rate: unit_base,
            unit_price: unit_base * (1.0 - t.value),
        })
        .collect();

    let print_total = unit_base * (1.0 - discount) * qty;
    let router_fee = router_fee(cfg, input.shape);
    let setup_fee = setup_fee(cfg, 25.0, &input.job);
    let design_fee = design_fee(cfg, 45.0, &input.job, true);

    let raw = print_total + router_fee + setup_fee + design_fee;
    let min = apply_shop_minimum(raw, cfg.num("Retail_Min_Order", 50.0));

    RetailBreakdown {
        unit_price: min.grand_total / qty,
        base_rate,
        print_total,
        router_fee,
        setup_fee,
        design_fee,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis: PricingBasis::AreaCurve,
        tiers,
        ..Default::default()
    }
}

/// Parts per flatbed row and the feed length each row consumes.
fn flatbed_feed(width: f64, height: f64) -> (f64, f64) {
    let across_w = (FLATBED_BED_WIDTH_IN / width).floor();
    let across_h = (FLATBED_BED_WIDTH_IN / height).floor();
    if across_w > 0.0 && across_w >= across_h {
        (across_w, height)
    } else if across_h > 0.0 {
        (across_h, width)
    } else {
        (0.0, 0.0)
    }
}

fn cost(input: &AcmInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let qty = f64::from(input.qty);
    let sides = input.sides.count();
    let total_sq_ft = sq_ft(input.width, input.height) * qty;
    let waste = cfg.num("Waste_Factor", 1.20);
    let rate_op = cfg.num("Rate_Operator", 25.0);

    let mut ledger = CostLedger::new();

    let limit = SizeLimit {
        max_short: cfg.num("Constraint_Max_W", 60.0),
        max_long: cfg.num("Constraint_Max_H", 120.0),
    };
    let stock = select_stock(
        input.width,
        input.height,
        input.qty,
        &input.thickness.stock(cfg),
        cfg.num("Constraint_Margin", 0.0),
        limit,
    );
    if stock.is_oversized() {
        warn!(width = input.width, height = input.height, "ACM part is oversized, sheet cost omitted");
    }
    ledger.add("material", stock.total_cost() * waste);
    ledger.detail("sheets", f64::from(stock.sheets_needed()));
    ledger.attach_stock(stock);

    ledger.add("ink", total_sq_ft * cfg.num("Cost_Ink_Latex", 0.16) * sides);
    if input.laminate {
        ledger.add("laminate", total_sq_ft * cfg.num("Cost_Lam_SqFt", 0.36) * waste);
    }

    let (per_row, feed) = flatbed_feed(input.width, input.height);
    let rows = (qty / if per_row > 0.0 { per_row } else { 1.0 }).ceil();
    let print_hrs = (rows * feed / 12.0) / cfg.num("Speed_Print_LF", 25.0) * sides;
    ledger.add("print_machine", print_hrs * cfg.num("Rate_Machine_Flatbed", 45.0));

    let cut_hrs = match input.shape {
        CutShape::Rectangle => {
            hours(cfg.num("Time_Shear_Base", 5.0) + qty * cfg.num("Time_Shear_Add", 3.0))
        }
        CutShape::Easy | CutShape::Complex => {
            let per_unit = if input.shape == CutShape::Easy { 3.0 } else { 8.0 };
            let hrs = hours(qty * per_unit);
            ledger.add("cut_machine", hrs * cfg.num("Rate_Machine_CNC", 35.0));
            hrs
        }
    };

    let op_hrs = print_hrs * cfg.num("Labor_Attendance_Ratio", 1.0)
        + cut_hrs
        + hours(cfg.num("Time_Handling", 5.0));
    ledger.add("operator", op_hrs * rate_op);
    ledger.add("setup", hours(cfg.num("Time_Setup_Job", 10.0)) * rate_op);

    ledger.detail("total_sq_ft", total_sq_ft);
    ledger.detail("print_hours", print_hrs);
    ledger.detail("cut_hours", cut_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(width: f64, height: f64, qty: u32) -> AcmInput {
        AcmInput {
            width,
            height,
            qty,
            sides: Sides::Single,
            thickness: AcmThickness::ThreeMm,
            color: AcmColor::White,
            shape: CutShape::Rectangle,
            laminate: true,
            job: JobOptions::default(),
        }
    }

    #[test]
    fn test_default_sheet_scenario() {
        let q = quote(&sign(24.0, 18.0, 5), &ConfigSnapshot::new());

        // 3 sq ft lands in T2 at 18/sq ft.
        assert_eq!(q.retail.base_rate, 18.0);
        assert!((q.retail.print_total - 270.0).abs() < 1e-9);
        assert!((q.retail.grand_total - 295.0).abs() < 1e-9);
        assert!(!q.retail.is_min_applied);

        let sel = q.cost.stock.as_ref().unwrap().selection().unwrap();
        assert_eq!(sel.sheet_id, "4x8");
        assert_eq!(sel.sheets_needed, 1);
        assert!((q.cost.breakdown["material"] - 52.09 * 1.2).abs() < 1e-9);
        assert!(q.metrics.margin.unwrap() > 0.0);
    }

    #[test]
    fn test_small_sign_hits_floor_and_minimum() {
        let q = quote(&sign(12.0, 12.0, 1), &ConfigSnapshot::new());
        // 1 sq ft * 24 = 24 < 25 floor; + 25 setup = 50 = minimum.
        assert!((q.retail.print_total - 25.0).abs() < 1e-9);
        assert!(!q.retail.is_min_applied);

        let cfg = ConfigSnapshot::new().with("Retail_Fee_Setup", 0.0);
        let q = quote(&sign(12.0, 12.0, 1), &cfg);
        assert!(q.retail.is_min_applied);
        assert_eq!(q.retail.grand_total, 50.0);
    }

    #[test]
    fn test_double_sided_then_black_multiplier() {
        let mut input = sign(24.0, 18.0, 1);
        input.thickness = AcmThickness::SixMm;
        input.sides = Sides::Double;
        input.color = AcmColor::Black;
        let q = quote(&input, &ConfigSnapshot::new());
        // 3 * 24 = 72, * 1.5 = 108, * 2 = 216.
        assert!((q.retail.print_total - 216.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_discount_and_tier_log() {
        let cfg = ConfigSnapshot::new()
            .with("Tier_1_Qty", 10.0)
            .with("Tier_1_Disc", 0.10);
        let q = quote(&sign(24.0, 18.0, 10), &cfg);
        assert!((q.retail.print_total - 54.0 * 0.9 * 10.0).abs() < 1e-9);
        assert_eq!(q.retail.tiers.len(), 1);
        assert!((q.retail.tiers[0].unit_price - 48.6).abs() < 1e-9);
    }

    #[test]
    fn test_oversized_part_flags_both_sides() {
        let q = quote(&sign(61.0, 100.0, 1), &ConfigSnapshot::new());
        assert!(q.cost.oversized);
        assert!(q.retail.is_oversize);
        assert_eq!(q.cost.breakdown["material"], 0.0);
        assert!(q.cost.total >= 0.0);
    }

    #[test]
    fn test_cnc_adds_machine_line() {
        let mut input = sign(24.0, 18.0, 5);
        input.shape = CutShape::Complex;
        let q = quote(&input, &ConfigSnapshot::new());
        assert_eq!(q.retail.router_fee, 50.0);
        let cut_hrs = 5.0 * 8.0 / 60.0;
        assert!((q.cost.breakdown["cut_machine"] - cut_hrs * 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_flatbed_feed_prefers_more_across() {
        assert_eq!(flatbed_feed(24.0, 18.0), (2.0, 18.0));
        assert_eq!(flatbed_feed(48.0, 30.0), (2.0, 48.0));
        assert_eq!(flatbed_feed(70.0, 70.0), (0.0, 0.0));
    }
}
