//! Interior wall wraps: smooth wall film, textured wall film or window perf,
//! optionally installed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigSnapshot;
use crate::cost::CostLedger;
use crate::print::sq_ft;
use crate::products::Product;
use crate::quote::{CostBreakdown, PricingBasis, Quote, RetailBreakdown, TierLogEntry};
use crate::retail::apply_shop_minimum;
use crate::tiers::{VolumeColumn, VolumeTiers};

const WALL_VOLUME: [(f64, f64); 2] = [(3.0, 0.05), (5.0, 0.10)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallMedia {
    /// GF 226 smooth wall film.
    #[default]
    Smooth,
    /// 3M IJ8624 for textured walls.
    Textured,
    /// Window perf, any open ratio.
    #[serde(alias = "perf_5050", alias = "perf_7030", alias = "perf5050", alias = "perf7030")]
    Perf,
}

impl WallMedia {
    /// (print retail, install retail) per sq ft.
    fn retail_rates(self, cfg: &ConfigSnapshot) -> (f64, f64) {
        match self {
            WallMedia::Textured => (
                cfg.num("Retail_Price_Wall_Text_SqFt", 15.0),
                cfg.num("Retail_Install_Wall_Text_SqFt", 5.0),
            ),
            WallMedia::Perf => (
                cfg.num("Retail_Price_Perf_SqFt", 12.0),
                cfg.num("Retail_Install_Wall_Smooth_SqFt", 3.0),
            ),
            WallMedia::Smooth => (
                cfg.num("Retail_Price_Wall_Smooth_SqFt", 10.0),
                cfg.num("Retail_Install_Wall_Smooth_SqFt", 3.0),
            ),
        }
    }

    fn media_cost(self, cfg: &ConfigSnapshot) -> f64 {
        match self {
            WallMedia::Smooth => cfg.num("Cost_Wall_Smooth_SqFt", 0.55),
            WallMedia::Textured => cfg.num("Cost_Wall_Textured_SqFt", 1.10),
            WallMedia::Perf => cfg.num("Cost_Vinyl_Perf", 0.65),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallPanel {
    #[serde(alias = "w")]
    pub width: f64,
    #[serde(alias = "h")]
    pub height: f64,
    #[serde(default)]
    pub material: WallMedia,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallInput {
    /// Copies of the full panel set.
    pub qty: u32,
    pub panels: Vec<WallPanel>,
    #[serde(default)]
    pub install: bool,
}

pub fn quote(input: &WallInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::Wall, retail(input, cfg), cost(input, cfg))
}

fn retail(input: &WallInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let qty = f64::from(input.qty);
    let mut gross_print = 0.0;
    let mut install = 0.0;

    for panel in &input.panels {
        let area = sq_ft(panel.width, panel.height) * qty;
        let (print_rate, install_rate) = panel.material.retail_rates(cfg);
        gross_print += print_rate * area;
        if input.install {
            install += install_rate * area;
        }
    }

    let volume = VolumeTiers::probe(cfg, VolumeColumn::Discount, &WALL_VOLUME);
    let print_total = gross_print * (1.0 - volume.discount_for(qty));
    let tiers = volume
        .tiers
        .iter()
        .map(|t| TierLogEntry {
            quantity: t.threshold,
            discount: t.value,
            base_rate: gross_print,
            unit_price: gross_print * (1.0 - t.value),
        })
        .collect();

    let mut adders = BTreeMap::new();
    if input.install {
        adders.insert("installation".to_string(), install);
    }

    let min = apply_shop_minimum(print_total + install, cfg.num("Retail_Min_Order", 150.0));

    RetailBreakdown {
        unit_price: min.grand_total / qty,
        base_rate: input.panels.first().map_or(0.0, |p| p.material.retail_rates(cfg).0),
        print_total,
        adders,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis: PricingBasis::FlatRate,
        tiers,
        ..Default::default()
    }
}

fn cost(input: &WallInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let qty = f64::from(input.qty);
    let waste = cfg.num("Waste_Factor", 1.15);
    let laminate = cfg.num("Cost_Lam_Wall", 0.36);

    let mut ledger = CostLedger::new();
    let mut total_sq_ft = 0.0;
    for panel in &input.panels {
        let area = sq_ft(panel.width, panel.height) * qty;
        ledger.add("media", area * panel.material.media_cost(cfg) * waste);
        ledger.add("laminate", area * laminate * waste);
        total_sq_ft += area;
    }
    ledger.add("ink", total_sq_ft * cfg.num("Cost_Ink_Latex", 0.16));

    let print_hrs = total_sq_ft / cfg.num("Speed_Print_Roll", 150.0);
    ledger.add(
        "print_labor",
        print_hrs * cfg.num("Rate_Operator", 25.0) * cfg.num("Labor_Attendance_Ratio", 0.10),
    );
    ledger.add("print_machine", print_hrs * cfg.num("Rate_Machine_Print", 5.0));

    let install_hrs = if input.install { total_sq_ft / cfg.num("Speed_Install_Wall", 20.0) } else { 0.0 };
    if input.install {
        ledger.add("install_labor", install_hrs * cfg.num("Rate_Install", 32.0));
    }

    ledger.detail("total_sq_ft", total_sq_ft);
    ledger.detail("print_hours", print_hrs);
    ledger.detail("install_hours", install_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.05))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mural(material: WallMedia, qty: u32, install: bool) -> WallInput {
        WallInput { qty, panels: vec![WallPanel { width: 120.0, height: 96.0, material }], install }
    }

    #[test]
    fn test_material_rates() {
        // 80 sq ft.
        let smooth = quote(&mural(WallMedia::Smooth, 1, false), &ConfigSnapshot::new());
        assert!((smooth.retail.print_total - 800.0).abs() < 1e-9);
        let textured = quote(&mural(WallMedia::Textured, 1, true), &ConfigSnapshot::new());
        assert!((textured.retail.print_total - 1200.0).abs() < 1e-9);
        assert!((textured.retail.adders["installation"] - 400.0).abs() < 1e-9);
        assert!((textured.retail.grand_total - 1600.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_volume_breaks() {
        let q = quote(&mural(WallMedia::Smooth, 3, false), &ConfigSnapshot::new());
        assert!((q.retail.print_total - 2400.0 * 0.95).abs() < 1e-9);
        let q = quote(&mural(WallMedia::Smooth, 5, false), &ConfigSnapshot::new());
        assert!((q.retail.print_total - 4000.0 * 0.90).abs() < 1e-9);
        assert_eq!(q.retail.tiers.len(), 2);
    }

    #[test]
    fn test_minimum_on_small_wall() {
        let mut input = mural(WallMedia::Smooth, 1, false);
        input.panels[0].width = 24.0;
        input.panels[0].height = 24.0;
        let q = quote(&input, &ConfigSnapshot::new());
        assert!(q.retail.is_min_applied);
        assert_eq!(q.retail.grand_total, 150.0);
    }

    #[test]
    fn test_install_cost_only_when_installed() {
        let plain = quote(&mural(WallMedia::Smooth, 1, false), &ConfigSnapshot::new());
        assert!(!plain.cost.breakdown.contains_key("install_labor"));
        let installed = quote(&mural(WallMedia::Smooth, 1, true), &ConfigSnapshot::new());
        assert!((installed.cost.breakdown["install_labor"] - 4.0 * 32.0).abs() < 1e-9);
        assert!(installed.cost.total > 0.0);
    }

    #[test]
    fn test_perf_variants_parse() {
        let m: WallMedia = serde_json::from_str(r#""perf_5050""#).unwrap();
        assert_eq!(m, WallMedia::Perf);
    }
}
