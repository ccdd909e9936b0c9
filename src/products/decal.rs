//! Printed decals and stickers.
//!
//! Cost follows the roll through three stages (print, laminate, cut and
//! weed) with optional pre-mask tape on top.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigSnapshot;
use crate::cost::{hours, CostLedger};
use crate::print::{perimeter_lf, sq_ft, JobOptions, PLOTTER_ATTENDANCE};
use crate::products::{default_true, Product};
use crate::quote::{CostBreakdown, PricingBasis, Quote, RetailBreakdown, TierLogEntry};
use crate::retail::{apply_shop_minimum, at_least, design_fee, setup_fee};
use crate::tiers::{VolumeColumn, VolumeTiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecalFilm {
    /// Calendered.
    #[default]
    Cal,
    Cast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecalCut {
    /// Hand-trimmed square edges.
    #[default]
    Square,
    #[serde(rename = "Contour Simple", alias = "ContourSimple")]
    ContourSimple,
    #[serde(rename = "Contour Complex", alias = "ContourComplex")]
    ContourComplex,
}

impl DecalCut {
    fn is_contour(self) -> bool {
        self != DecalCut::Square
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecalInput {
    pub width: f64,
    pub height: f64,
    pub qty: u32,
    #[serde(default)]
    pub material: DecalFilm,
    #[serde(default = "default_true")]
    pub laminate: bool,
    #[serde(default)]
    pub cut: DecalCut,
    #[serde(default)]
    pub mask: bool,
    #[serde(flatten)]
    pub job: JobOptions,
}

pub fn quote(input: &DecalInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::Decal, retail(input, cfg), cost(input, cfg))
}

/// Finishing adders for `area` sq ft printed at `print` dollars:
/// (contour, weed, mask).
fn finishing(input: &DecalInput, cfg: &ConfigSnapshot, print: f64, area: f64) -> (f64, f64, f64) {
    let contour = if input.cut.is_contour() {
        print * cfg.num("Retail_Cut_Contour_Add", 0.25)
    } else {
        0.0
    };
    let weed = if input.cut == DecalCut::ContourComplex {
        area * cfg.num("Retail_Weed_Complex", 2.50)
    } else {
        0.0
    };
    let mask = if input.mask { area * cfg.num("Retail_Adder_Mask_SqFt", 1.00) } else { 0.0 };
    (contour, weed, mask)
}

fn retail(input: &DecalInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let qty = f64::from(input.qty);
    let unit_sq_ft = sq_ft(input.width, input.height);
    let base_rate = match input.material {
        DecalFilm::Cast => cfg.num("Retail_Price_Cast_SqFt", 14.0),
        DecalFilm::Cal => cfg.num("Retail_Price_Cal_SqFt", 8.0),
    };

    let volume = VolumeTiers::probe(cfg, VolumeColumn::Discount, &[]);
    let total_sq_ft = unit_sq_ft * qty;
    let print_total = base_rate * (1.0 - volume.discount_for(qty)) * total_sq_ft;
    let (contour, weed, mask) = finishing(input, cfg, print_total, total_sq_ft);

    let mut adders = BTreeMap::new();
    for (name, amount) in [("contour_cut", contour), ("complex_weeding", weed), ("pre_mask", mask)] {
        if amount > 0.0 {
            adders.insert(name.to_string(), amount);
        }
    }

    let setup_fee = setup_fee(cfg, 15.0, &input.job);
    let design_fee = design_fee(cfg, 45.0, &input.job, false);
    let min_order = cfg.num("Retail_Min_Order", 35.0);
    let finish_total = contour + weed + mask;
    let min = apply_shop_minimum(print_total + finish_total + setup_fee + design_fee, min_order);

    let tiers = volume
        .tiers
        .iter()
        .map(|t| {
            let rate = base_rate * (1.0 - t.value);
            let area = unit_sq_ft * t.threshold;
            let print = rate * area;
            let (c, w, m) = finishing(input, cfg, print, area);
            let total = at_least(print + c + w + m + setup_fee + design_fee, min_order);
            TierLogEntry { quantity: t.threshold, discount: t.value, base_rate: rate, unit_price: total / t.threshold }
        })
        .collect();

    RetailBreakdown {
        unit_price: (print_total + finish_total) / qty,
        base_rate,
        print_total,
        setup_fee,
        design_fee,
        adders,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis: PricingBasis::FlatRate,
        tiers,
        ..Default::default()
    }
}

fn cost(input: &DecalInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let qty = f64::from(input.qty);
    let total_sq_ft = sq_ft(input.width, input.height) * qty;
    let waste = cfg.num("Waste_Factor", 1.20);
    let rate_op = cfg.num("Rate_Operator", 25.0);
    let rate_shop = cfg.num("Rate_Shop_Labor", 20.0);
    let cast = input.material == DecalFilm::Cast;

    let mut ledger = CostLedger::new();

    let vinyl_rate = if cast { cfg.num("Cost_Vin_Cast", 1.30) } else { cfg.num("Cost_Vin_Cal", 0.21) };
    ledger.add("vinyl", total_sq_ft * vinyl_rate * waste);
    if input.laminate {
        let lam_rate = if cast { cfg.num("Cost_Lam_Cast", 0.96) } else { cfg.num("Cost_Lam_Cal", 0.36) };
        ledger.add("laminate", total_sq_ft * lam_rate * waste);
    }
    ledger.add("ink", total_sq_ft * cfg.num("Cost_Ink_Latex", 0.16));
    ledger.add("setup", hours(cfg.num("Time_Setup_Job", 15.0)) * rate_op);

    // Stage 1: print
    let print_hrs = total_sq_ft / cfg.num("Speed_Print_Roll", 150.0);
    ledger.add("print_labor", print_hrs * rate_op * cfg.num("Labor_Attendance_Ratio", 0.10));
    ledger.add("print_machine", print_hrs * cfg.num("Rate_Machine_Print", 5.0));

    // Stage 2: laminate, fully attended
    let lam_hrs = if input.laminate { total_sq_ft / cfg.num("Speed_Lam_Roll", 300.0) } else { 0.0 };
    if input.laminate {
        ledger.add("laminate_labor", lam_hrs * rate_shop);
    }

    // Stage 3: cut and weed
    let cut_hrs = if input.cut.is_contour() {
        let hrs = total_sq_ft / cfg.num("Speed_Cut_Graphtec", 50.0);
        ledger.add("cut_machine", hrs * cfg.num("Rate_Machine_Cut", 5.0));
        ledger.add("cut_labor", hrs * rate_op * PLOTTER_ATTENDANCE);
        let weed_mins = if input.cut == DecalCut::ContourComplex {
            cfg.num("Time_Weed_Complex", 8.0)
        } else {
            cfg.num("Time_Weed_Simple", 2.0)
        };
        ledger.add("weeding", hours(total_sq_ft * weed_mins) * rate_shop);
        hrs
    } else {
        let perim = perimeter_lf(input.width, input.height) * qty;
        let hrs = hours(perim * cfg.num("Time_Cut_Hand", 0.25));
        ledger.add("cut_labor", hrs * rate_shop);
        hrs
    };

    if input.mask {
        ledger.add("transfer_tape", total_sq_ft * cfg.num("Cost_Transfer_Tape", 0.15) * waste);
        ledger.add("masking", hours(total_sq_ft * cfg.num("Time_Mask_SqFt", 1.0)) * rate_shop);
    }

    ledger.detail("total_sq_ft", total_sq_ft);
    ledger.detail("print_hours", print_hrs);
    ledger.detail("laminate_hours", lam_hrs);
    ledger.detail("cut_hours", cut_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.05))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decal(cut: DecalCut) -> DecalInput {
        DecalInput {
            width: 12.0,
            height: 12.0,
            qty: 10,
            material: DecalFilm::Cal,
            laminate: true,
            cut,
            mask: false,
            job: JobOptions::default(),
        }
    }

    #[test]
    fn test_square_cut_has_no_finishing_adders() {
        let q = quote(&decal(DecalCut::Square), &ConfigSnapshot::new());
        assert!((q.retail.print_total - 80.0).abs() < 1e-9);
        assert!(q.retail.adders.is_empty());
        assert!((q.retail.grand_total - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_contour_markup_and_complex_weed() {
        let q = quote(&decal(DecalCut::ContourComplex), &ConfigSnapshot::new());
        assert!((q.retail.adders["contour_cut"] - 20.0).abs() < 1e-9);
        assert!((q.retail.adders["complex_weeding"] - 25.0).abs() < 1e-9);
        assert!((q.retail.unit_price - 12.5).abs() < 1e-9);
        assert!(q.cost.breakdown.contains_key("cut_machine"));
    }

    #[test]
    fn test_mask_retail_and_cost() {
        let mut input = decal(DecalCut::Square);
        input.mask = true;
        let q = quote(&input, &ConfigSnapshot::new());
        assert!((q.retail.adders["pre_mask"] - 10.0).abs() < 1e-9);
        assert!((q.cost.breakdown["transfer_tape"] - 10.0 * 0.15 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_unlaminated_skips_laminate_stage() {
        let mut input = decal(DecalCut::Square);
        input.laminate = false;
        let q = quote(&input, &ConfigSnapshot::new());
        assert!(!q.cost.breakdown.contains_key("laminate"));
        assert_eq!(q.cost.details["laminate_hours"], 0.0);
    }

    #[test]
    fn test_cut_labels_parse() {
        let cut: DecalCut = serde_json::from_str(r#""Contour Complex""#).unwrap();
        assert_eq!(cut, DecalCut::ContourComplex);
    }
}
