//! Vinyl banners: roll-fed latex print with hems, grommets, pole pockets and
//! wind slits. Standard 13oz sizes can carry fixed yield-box prices.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::bracket::lookup_exact_feet;
use crate::config::ConfigSnapshot;
use crate::cost::{hours, CostLedger};
use crate::print::{perimeter_lf, sq_ft, JobOptions, Sides};
use crate::products::{default_true, Product};
use crate::quote::{CostBreakdown, PricingBasis, Quote, RetailBreakdown, TierLogEntry};
use crate::retail::{apply_shop_minimum, at_least, design_fee, setup_fee};
use crate::tiers::{AreaCurve, TierDefault, VolumeColumn, VolumeTiers};

/// Quantity at which the yield-box `_10` price applies.
const YIELD_BOX_BREAK_QTY: f64 = 10.0;

/// Hem allowance added to each edge of the production size.
const HEM_ALLOWANCE_IN: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BannerMaterial {
    #[default]
    #[serde(rename = "13oz")]
    Scrim13,
    #[serde(rename = "15oz")]
    Blockout15,
    #[serde(rename = "18oz")]
    Blockout18,
    #[serde(rename = "Mesh", alias = "mesh")]
    Mesh,
}

impl BannerMaterial {
    pub fn label(self) -> &'static str {
        match self {
            BannerMaterial::Scrim13 => "13oz Scrim",
            BannerMaterial::Blockout15 => "15oz Smooth Blockout",
            BannerMaterial::Blockout18 => "18oz Heavy Blockout",
            BannerMaterial::Mesh => "8oz Mesh",
        }
    }

    fn media_cost(self, cfg: &ConfigSnapshot) -> f64 {
        match self {
            BannerMaterial::Scrim13 => cfg.num("Cost_Media_13oz", 0.26),
            BannerMaterial::Blockout15 => cfg.num("Cost_Media_15oz", 0.46),
            BannerMaterial::Blockout18 => cfg.num("Cost_Media_18oz", 0.39),
            BannerMaterial::Mesh => cfg.num("Cost_Media_Mesh", 0.33),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BannerInput {
    pub width: f64,
    pub height: f64,
    pub qty: u32,
    #[serde(default)]
    pub sides: Sides,
    #[serde(default)]
    pub material: BannerMaterial,
    #[serde(default = "default_true")]
    pub hems: bool,
    #[serde(default = "default_true")]
    pub grommets: bool,
    #[serde(default)]
    pub pockets: bool,
    #[serde(default)]
    pub wind_slits: bool,
    #[serde(flatten)]
    pub job: JobOptions,
}

impl BannerInput {
    /// Linear feet of pole pocket per banner (top and bottom).
    fn pocket_lf(&self) -> f64 {
        (self.width / 12.0) * 2.0
    }
}

pub fn quote(input: &BannerInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::Banner, retail(input, cfg), cost(input, cfg))
}

/// Narrow 13oz rate or the `BAN13` curve from T2 onwards.
fn scrim_rate(cfg: &ConfigSnapshot, short_edge: f64, unit_sq_ft: f64) -> f64 {
    if short_edge <= 12.0 {
        return cfg.num("BAN13_T1_Rate", 6.50);
    }
    let curve = AreaCurve::probe_from(
        cfg,
        "BAN13",
        2,
        &[TierDefault::capped(10.0, 6.00), TierDefault::open(5.00)],
    );
    curve.resolve(unit_sq_ft).map_or(0.0, |hit| hit.rate)
}

fn retail(input: &BannerInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let qty = f64::from(input.qty);
    let unit_sq_ft = sq_ft(input.width, input.height);
    let short = input.width.min(input.height);
    let long = input.width.max(input.height);
    let is_oversize = short > cfg.num("Constraint_Max_Width_Inhouse", 62.0);
    if is_oversize {
        info!(short_edge = short, "Banner exceeds in-house width");
    }

    let pocket_rate = cfg.num("Retail_Fin_PolePkt_LF", 3.00);
    let slit_rate = cfg.num("Retail_Price_WindSlits_SqFt", 1.00);
    let finishing_for = |q: f64| -> (f64, f64) {
        let pockets = if input.pockets { input.pocket_lf() * q * pocket_rate } else { 0.0 };
        let slits = if input.wind_slits { unit_sq_ft * q * slit_rate } else { 0.0 };
        (pockets, slits)
    };

    let setup_fee = setup_fee(cfg, 15.0, &input.job);
    let design_fee = design_fee(cfg, 45.0, &input.job, false);

    let yield_box = match input.material {
        BannerMaterial::Scrim13 => lookup_exact_feet(cfg, "BAN", input.sides, short, long),
        _ => None,
    };

    // (quantity, discount, per-sq-ft rate, per-banner print price) rows.
    let mut rows: Vec<(f64, f64, f64, f64)> = Vec::new();
    let (base_rate, print_total, basis) = match &yield_box {
        Some(hit) => {
            let rate = hit.price_1 / unit_sq_ft;
            rows.push((1.0, 0.0, rate, hit.price_1));
            rows.push((YIELD_BOX_BREAK_QTY, 0.0, rate, hit.price_10));
            (
                rate,
                hit.unit_price(qty, YIELD_BOX_BREAK_QTY) * qty,
                PricingBasis::Bracket { label: hit.label.clone() },
            )
        }
        None => {
            let mut rate = match input.material {
                BannerMaterial::Scrim13 => scrim_rate(cfg, short, unit_sq_ft),
                BannerMaterial::Blockout15 => cfg.num("Retail_Price_Base_15oz", 6.50),
                BannerMaterial::Blockout18 => cfg.num("Retail_Price_Base_18oz", 8.00),
                BannerMaterial::Mesh => cfg.num("Retail_Price_Base_Mesh", 7.00),
            };
            if input.sides.is_double() {
                rate += cfg.num("Retail_Adder_DS_SqFt", 3.00);
            }
            let volume = VolumeTiers::probe(cfg, VolumeColumn::Discount, &[]);
            for t in &volume.tiers {
                rows.push((t.threshold, t.value, rate * (1.0 - t.value), rate * (1.0 - t.value) * unit_sq_ft));
            }
            let discount = volume.discount_for(qty);
            let basis = match input.material {
                BannerMaterial::Scrim13 => PricingBasis::AreaCurve,
                _ => PricingBasis::FlatRate,
            };
            (rate, rate * (1.0 - discount) * unit_sq_ft * qty, basis)
        }
    };

    let min_order = if basis.is_bracket() { 0.0 } else { cfg.num("Retail_Min_Order", 50.0) };

    let (pockets, slits) = finishing_for(qty);
    let mut adders = BTreeMap::new();
    if input.pockets {
        adders.insert("pole_pockets".to_string(), pockets);
    }
    if input.wind_slits {
        adders.insert("wind_slits".to_string(), slits);
    }

    let min = apply_shop_minimum(print_total + pockets + slits + setup_fee + design_fee, min_order);

    let tiers = rows
        .into_iter()
        .map(|(q, discount, rate, unit_print)| {
            let (p, s) = finishing_for(q);
            let total = at_least(unit_print * q + p + s + setup_fee + design_fee, min_order);
            TierLogEntry { quantity: q, discount, base_rate: rate, unit_price: total / q }
        })
        .collect();

    RetailBreakdown {
        unit_price: (print_total + pockets + slits) / qty,
        base_rate,
        print_total,
        setup_fee,
        design_fee,
        adders,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis,
        tiers,
        material_label: Some(input.material.label().to_string()),
        is_oversize,
        ..Default::default()
    }
}

fn cost(input: &BannerInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let qty = f64::from(input.qty);
    let sides = input.sides.count();
    let allowance = if input.hems { HEM_ALLOWANCE_IN } else { 0.0 };
    let prod_sq_ft = sq_ft(input.width + allowance, input.height + allowance) * qty;
    let finished_sq_ft = sq_ft(input.width, input.height) * qty;
    let perim = perimeter_lf(input.width, input.height) * qty;
    let waste = cfg.num("Waste_Factor", 1.15);
    let rate_op = cfg.num("Rate_Operator", 25.0);

    let mut ledger = CostLedger::new();

    let media_rate = input.material.media_cost(cfg);
    ledger.add("media", prod_sq_ft * media_rate * waste);
    ledger.add("ink", prod_sq_ft * cfg.num("Cost_Ink_Latex", 0.16) * sides);

    if input.hems {
        ledger.add("hem_tape", perim * cfg.num("Cost_Hem_Tape", 0.08) * waste);
    }
    let grommet_count = if input.grommets {
        (perim / 2.0).ceil().max(4.0 * qty)
    } else {
        0.0
    };
    if input.grommets {
        ledger.add("grommets", grommet_count * cfg.num("Cost_Grommet", 0.13) * waste);
    }

    let setup_mins = cfg.num("Time_Setup_Job", 15.0) + cfg.num("Time_Handling", 2.0);
    ledger.add("setup", hours(setup_mins) * rate_op);

    let print_hrs = prod_sq_ft / cfg.num("Speed_Print_Roll", 150.0) * sides;
    ledger.add("print_labor", print_hrs * rate_op * cfg.num("Labor_Attendance_Ratio", 0.10));
    ledger.add("print_machine", print_hrs * cfg.num("Rate_Machine_Print", 5.0));

    let mut finish_mins = perim * 0.25;
    if input.hems {
        finish_mins += perim * 0.5;
    }
    finish_mins += grommet_count;
    if input.wind_slits {
        finish_mins += finished_sq_ft * 0.1;
    }
    if input.pockets {
        finish_mins += input.pocket_lf() * qty * 2.0;
    }
    let finish_hrs = hours(finish_mins);
    ledger.add("finishing", finish_hrs * cfg.num("Rate_Shop_Labor", 20.0));

    ledger.detail("media_rate", media_rate);
    ledger.detail("production_sq_ft", prod_sq_ft);
    ledger.detail("grommets", grommet_count);
    ledger.detail("print_hours", print_hrs);
    ledger.detail("finish_hours", finish_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.05))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banner(width: f64, height: f64, qty: u32) -> BannerInput {
        BannerInput {
            width,
            height,
            qty,
            sides: Sides::Single,
            material: BannerMaterial::Scrim13,
            hems: true,
            grommets: true,
            pockets: false,
            wind_slits: false,
            job: JobOptions::default(),
        }
    }

    fn yield_box_sheet() -> ConfigSnapshot {
        ConfigSnapshot::new()
            .with("RET_BAN_0306_SS_1", 54.0)
            .with("RET_BAN_0306_SS_10", 45.0)
    }

    #[test]
    fn test_yield_box_price_and_break() {
        let q = quote(&banner(36.0, 72.0, 2), &yield_box_sheet());
        assert_eq!(q.retail.basis, PricingBasis::Bracket { label: "3'x6'".into() });
        assert_eq!(q.retail.print_total, 108.0);
        assert_eq!(q.retail.min_order, 0.0);

        let q = quote(&banner(36.0, 72.0, 10), &yield_box_sheet());
        assert_eq!(q.retail.print_total, 450.0);
        assert_eq!(q.retail.tiers.len(), 2);
    }

    #[test]
    fn test_yield_box_rounds_up_to_feet() {
        let q = quote(&banner(30.0, 70.0, 1), &yield_box_sheet());
        assert!(q.retail.basis.is_bracket());
    }

    #[test]
    fn test_curve_fallback_and_narrow_rate() {
        // 12 x 48 is narrow: 4 sq ft at 6.50.
        let q = quote(&banner(12.0, 48.0, 1), &ConfigSnapshot::new());
        assert_eq!(q.retail.base_rate, 6.50);

        // 24 x 48 = 8 sq ft lands in T2.
        let q = quote(&banner(24.0, 48.0, 1), &ConfigSnapshot::new());
        assert_eq!(q.retail.base_rate, 6.00);

        // 48 x 96 = 32 sq ft falls to the open tier.
        let q = quote(&banner(48.0, 96.0, 1), &ConfigSnapshot::new());
        assert_eq!(q.retail.base_rate, 5.00);
        assert!((q.retail.print_total - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_other_materials_add_double_sided_rate() {
        let mut input = banner(36.0, 72.0, 1);
        input.material = BannerMaterial::Blockout18;
        input.sides = Sides::Double;
        let q = quote(&input, &yield_box_sheet());
        assert_eq!(q.retail.basis, PricingBasis::FlatRate);
        assert_eq!(q.retail.base_rate, 11.0);
        assert_eq!(q.retail.material_label.as_deref(), Some("18oz Heavy Blockout"));
    }

    #[test]
    fn test_finishing_adders() {
        let mut input = banner(36.0, 72.0, 2);
        input.pockets = true;
        input.wind_slits = true;
        let q = quote(&input, &ConfigSnapshot::new());
        // 6 lf of pocket per banner * 2 * $3.
        assert!((q.retail.adders["pole_pockets"] - 36.0).abs() < 1e-9);
        assert!((q.retail.adders["wind_slits"] - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_grommet_floor_of_four_per_banner() {
        let q = quote(&banner(12.0, 12.0, 3), &ConfigSnapshot::new());
        assert_eq!(q.cost.details["grommets"], 12.0);
        let q = quote(&banner(48.0, 96.0, 1), &ConfigSnapshot::new());
        assert_eq!(q.cost.details["grommets"], 12.0);
    }

    #[test]
    fn test_oversize_flag() {
        let q = quote(&banner(72.0, 120.0, 1), &ConfigSnapshot::new());
        assert!(q.retail.is_oversize);
        assert!(!quote(&banner(60.0, 120.0, 1), &ConfigSnapshot::new()).retail.is_oversize);
    }

    #[test]
    fn test_hems_grow_production_area() {
        let q = quote(&banner(34.0, 70.0, 1), &ConfigSnapshot::new());
        assert!((q.cost.details["production_sq_ft"] - 36.0 * 72.0 / 144.0).abs() < 1e-9);
    }
}
