//! Acrylic signs: UV flatbed print on cast acrylic, optional CNC routing,
//! paint fill and standoff hardware.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigSnapshot;
use crate::cost::{hours, CostLedger};
use crate::print::{sq_ft, CutShape, JobOptions, STANDARD_SHEET_SQ_FT};
use crate::products::Product;
use crate::quote::{CostBreakdown, PricingBasis, Quote, RetailBreakdown, TierLogEntry};
use crate::retail::{apply_shop_minimum, at_least, design_fee, router_fee, setup_fee};
use crate::tiers::{AreaCurve, TierDefault, VolumeColumn, VolumeTiers};

/// Sheet thickness. Accepts fractional or decimal labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcrylicThickness {
    #[default]
    #[serde(rename = "0.25", alias = "1/4")]
    Quarter,
    #[serde(rename = "0.5", alias = "1/2")]
    Half,
    #[serde(rename = "0.75", alias = "3/4")]
    ThreeQuarter,
    #[serde(rename = "1", alias = "1.0")]
    One,
}

impl AcrylicThickness {
    /// Key fragment shared by the curve and stock keys.
    fn code(self) -> &'static str {
        match self {
            AcrylicThickness::Quarter => "14",
            AcrylicThickness::Half => "12",
            AcrylicThickness::ThreeQuarter => "34",
            AcrylicThickness::One => "1IN",
        }
    }

    fn curve_defaults(self) -> &'static [TierDefault] {
        const QUARTER: [TierDefault; 3] = [
            TierDefault::capped(10.0, 40.0),
            TierDefault::capped(20.0, 35.0),
            TierDefault::open(30.0),
        ];
        const HALF: [TierDefault; 2] = [TierDefault::capped(10.0, 45.0), TierDefault::open(40.0)];
        const THREE_QUARTER: [TierDefault; 2] = [TierDefault::capped(10.0, 55.0), TierDefault::open(50.0)];
        const ONE: [TierDefault; 2] = [TierDefault::capped(10.0, 60.0), TierDefault::open(55.0)];
        match self {
            AcrylicThickness::Quarter => &QUARTER,
            AcrylicThickness::Half => &HALF,
            AcrylicThickness::ThreeQuarter => &THREE_QUARTER,
            AcrylicThickness::One => &ONE,
        }
    }

    /// Default 4x8 sheet cost: (white, clear).
    fn sheet_costs(self) -> (f64, f64) {
        match self {
            AcrylicThickness::Quarter => (133.27, 120.55),
            AcrylicThickness::Half => (294.24, 277.01),
            AcrylicThickness::ThreeQuarter => (424.69, 424.17),
            AcrylicThickness::One => (541.76, 496.71),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcrylicColor {
    #[default]
    Clear,
    White,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrintMethod {
    /// Single first-surface pass.
    #[default]
    #[serde(rename = "standard")]
    FirstSurface,
    /// Reverse print with a white flood.
    #[serde(rename = "direct_white")]
    SecondSurface,
    /// Color, blockout, color.
    #[serde(rename = "direct_3layer")]
    ThreeLayer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcrylicInput {
    pub width: f64,
    pub height: f64,
    pub qty: u32,
    #[serde(default)]
    pub thickness: AcrylicThickness,
    #[serde(default)]
    pub color: AcrylicColor,
    #[serde(default)]
    pub method: PrintMethod,
    #[serde(default)]
    pub shape: CutShape,
    #[serde(default)]
    pub paint: bool,
    #[serde(default)]
    pub standoffs: bool,
    #[serde(default = "default_standoff_count")]
    pub standoff_count: u32,
    #[serde(flatten)]
    pub job: JobOptions,
}

fn default_standoff_count() -> u32 {
    4
}

impl AcrylicInput {
    /// Black is only stocked in 1/4"; thicker black quotes as white.
    pub fn effective_color(&self) -> AcrylicColor {
        match (self.color, self.thickness) {
            (AcrylicColor::Black, t) if t != AcrylicThickness::Quarter => AcrylicColor::White,
            (c, _) => c,
        }
    }

    fn hardware_units(&self) -> f64 {
        if self.standoffs {
            f64::from(self.standoff_count) * f64::from(self.qty)
        } else {
            0.0
        }
    }
}

pub fn quote(input: &AcrylicInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::Acrylic, retail(input, cfg), cost(input, cfg))
}

fn retail(input: &AcrylicInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let qty = f64::from(input.qty);
    let total_sq_ft = sq_ft(input.width, input.height) * qty;
    let t = input.thickness;

    let curve = AreaCurve::probe(cfg, &format!("ACR_{}", t.code()), t.curve_defaults());
    let mut base_rate = curve.resolve(total_sq_ft).map_or(0.0, |hit| hit.rate);
    base_rate += match input.method {
        PrintMethod::FirstSurface => 0.0,
        PrintMethod::SecondSurface => cfg.num("Retail_Adder_2ndSurf", 5.0),
        PrintMethod::ThreeLayer => cfg.num("Retail_Adder_Blockout", 8.0),
    };

    let volume = VolumeTiers::probe(cfg, VolumeColumn::Discount, &[]);
    let discount = volume.discount_for(qty);
    let print_total = base_rate * (1.0 - discount) * total_sq_ft;

    let mut adders = BTreeMap::new();
    if input.paint {
        adders.insert(
            "paint".to_string(),
            cfg.num("Retail_Fee_Paint_Setup", 65.0) + total_sq_ft * cfg.num("Retail_Adder_Paint_SqFt", 20.0),
        );
    }
    if input.standoffs {
        adders.insert(
            "standoffs".to_string(),
            input.hardware_units() * cfg.num("Retail_Price_Standoff", 8.0),
        );
    }
    let adders_total: f64 = adders.values().sum();

    let router_fee = router_fee(cfg, input.shape);
    let setup_fee = setup_fee(cfg, 25.0, &input.job);
    let design_fee = design_fee(cfg, 45.0, &input.job, false);
    let fees = adders_total + router_fee + setup_fee + design_fee;
    let min_order = cfg.num("Retail_Min_Order", 75.0);
    let min = apply_shop_minimum(print_total + fees, min_order);

    // Each row shows the whole-order unit price had that break applied.
    let tiers = volume
        .tiers
        .iter()
        .map(|row| {
            let rate = base_rate * (1.0 - row.value);
            let total = at_least(rate * total_sq_ft + fees, min_order);
            TierLogEntry {
                quantity: row.threshold,
                discount: row.value,
                base_rate: rate,
                unit_price: total / row.threshold,
            }
        })
        .collect();

    RetailBreakdown {
        unit_price: min.grand_total / qty,
        base_rate,
        print_total,
        router_fee,
        setup_fee,
        design_fee,
        adders,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis: PricingBasis::AreaCurve,
        tiers,
        ..Default::default()
    }
}

fn cost(input: &AcrylicInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let qty = f64::from(input.qty);
    let total_sq_ft = sq_ft(input.width, input.height) * qty;
    let t = input.thickness;
    let waste = cfg.num("Waste_Factor", 1.25);
    let attendance = cfg.num("Labor_Attendance_Ratio", 0.10);
    let rate_op = cfg.num("Rate_Operator", 25.0);
    let rate_cnc = cfg.num("Rate_CNC_Labor", 25.0);

    let mut ledger = CostLedger::new();

    let (white_cost, clear_cost) = t.sheet_costs();
    let sheet_cost = if input.effective_color() == AcrylicColor::White {
        cfg.num(&format!("Cost_Stock_{}_4x8_W", t.code()), white_cost)
    } else {
        cfg.num(&format!("Cost_Stock_{}_4x8_C", t.code()), clear_cost)
    };
    let sheets = (total_sq_ft / STANDARD_SHEET_SQ_FT).ceil();
    let raw = ledger.add("substrate", sheets * sheet_cost);
    ledger.add("waste", raw * (waste - 1.0));
    ledger.add("ink", total_sq_ft * cfg.num("Cost_Ink_Latex", 0.16) * waste);

    ledger.add("print_prepress", hours(cfg.num("Time_Prepress_Print", 10.0)) * rate_op);
    ledger.add("print_setup", hours(cfg.num("Time_Setup_Printer", 5.0)) * rate_op);

    let speed = match input.method {
        PrintMethod::FirstSurface => cfg.num("Speed_Print_1st", 18.0),
        PrintMethod::SecondSurface => cfg.num("Speed_Print_White", 6.0),
        PrintMethod::ThreeLayer => cfg.num("Speed_Print_3Layer", 3.1),
    };
    let run_hrs = total_sq_ft / speed;
    ledger.add("print_machine", run_hrs * cfg.num("Rate_Machine_Flatbed", 10.0));
    ledger.add("print_labor", run_hrs * rate_op * attendance);

    let cut_hrs = match input.shape {
        CutShape::Rectangle => {
            let hrs = hours(total_sq_ft * 0.5);
            ledger.add("cut_labor", hrs * rate_op);
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

    if input.standoffs {
        ledger.add("hardware", input.hardware_units() * cfg.num("Cost_Standoff", 2.54));
    }

    ledger.detail("sheets", sheets);
    ledger.detail("total_sq_ft", total_sq_ft);
    ledger.detail("print_hours", run_hrs);
    ledger.detail("cut_hours", cut_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.10))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(width: f64, height: f64, qty: u32) -> AcrylicInput {
        AcrylicInput {
            width,
            height,
            qty,
            thickness: AcrylicThickness::Quarter,
            color: AcrylicColor::Clear,
            method: PrintMethod::FirstSurface,
            shape: CutShape::Rectangle,
            paint: false,
            standoffs: false,
            standoff_count: 4,
            job: JobOptions::default(),
        }
    }

    #[test]
    fn test_thickness_labels_normalize() {
        let t: AcrylicThickness = serde_json::from_str(r#""1/2""#).unwrap();
        assert_eq!(t, AcrylicThickness::Half);
        let t: AcrylicThickness = serde_json::from_str(r#""0.75""#).unwrap();
        assert_eq!(t, AcrylicThickness::ThreeQuarter);
    }

    #[test]
    fn test_curve_on_order_area() {
        // 2 x 6 sq ft = 12 sq ft order, past T1 (10) into T2 at 35.
        let q = quote(&panel(24.0, 36.0, 2), &ConfigSnapshot::new());
        assert_eq!(q.retail.base_rate, 35.0);
        assert!((q.retail.print_total - 420.0).abs() < 1e-9);
        assert!((q.retail.grand_total - 445.0).abs() < 1e-9);
    }

    #[test]
    fn test_method_adder_is_additive() {
        let mut input = panel(24.0, 18.0, 1);
        input.method = PrintMethod::ThreeLayer;
        let q = quote(&input, &ConfigSnapshot::new());
        assert_eq!(q.retail.base_rate, 48.0);
    }

    #[test]
    fn test_black_only_in_quarter_inch() {
        let mut input = panel(24.0, 18.0, 1);
        input.color = AcrylicColor::Black;
        assert_eq!(input.effective_color(), AcrylicColor::Black);
        input.thickness = AcrylicThickness::Half;
        assert_eq!(input.effective_color(), AcrylicColor::White);

        let q = quote(&input, &ConfigSnapshot::new());
        assert!((q.cost.breakdown["substrate"] - 294.24).abs() < 1e-9);
    }

    #[test]
    fn test_standoffs_priced_and_costed_per_unit() {
        let mut input = panel(12.0, 12.0, 3);
        input.standoffs = true;
        let q = quote(&input, &ConfigSnapshot::new());
        assert_eq!(q.retail.adders["standoffs"], 96.0);
        assert!((q.cost.breakdown["hardware"] - 12.0 * 2.54).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_and_waste_line() {
        let q = quote(&panel(6.0, 6.0, 1), &ConfigSnapshot::new());
        assert!(q.retail.is_min_applied);
        assert_eq!(q.retail.grand_total, 75.0);

        let raw = q.cost.breakdown["substrate"];
        assert!((q.cost.breakdown["waste"] - raw * 0.25).abs() < 1e-9);
        assert!((q.cost.risk_cost - q.cost.subtotal * 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_tier_log_uses_threshold_quantity() {
        let cfg = ConfigSnapshot::new().with("Tier_1_Qty", 5.0).with("Tier_1_Disc", 0.1);
        let q = quote(&panel(24.0, 18.0, 5), &cfg);
        let row = &q.retail.tiers[0];
        assert!((row.base_rate - 31.5).abs() < 1e-9);
        // 15 sq ft at T2 35 * 0.9 = 472.5 + 25 setup over 5.
        assert!((row.unit_price - 99.5).abs() < 1e-9);
    }
}
