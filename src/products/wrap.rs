//! Vehicle wraps.
//!
//! A wrap is a list of panels (sides, hood, rear windows) each printed on
//! cast wrap film, window perf or as a spot decal. `qty` is the fleet size:
//! every panel is produced once per vehicle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigSnapshot;
use crate::cost::CostLedger;
use crate::print::{sq_ft, JobOptions};
use crate::products::Product;
use crate::quote::{CostBreakdown, LineItem, PricingBasis, Quote, RetailBreakdown, TierLogEntry};
use crate::retail::{apply_shop_minimum, design_fee};
use crate::tiers::{VolumeColumn, VolumeTiers};

/// Widest printable web in inches.
const MAX_WEB_IN: f64 = 52.0;
/// Overlap between adjacent printed webs in inches.
const SEAM_OVERLAP_IN: f64 = 1.0;
/// Spot graphics install in half the time of full coverage.
const DECAL_INSTALL_SHARE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMaterial {
    #[default]
    Wrap,
    Perf,
    Decal,
}

impl WrapMaterial {
    pub fn as_str(self) -> &'static str {
        match self {
            WrapMaterial::Wrap => "wrap",
            WrapMaterial::Perf => "perf",
            WrapMaterial::Decal => "decal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleComplexity {
    /// Flat sides, box trucks.
    #[default]
    Simple,
    /// Deep channels and compound curves.
    Complex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapPanel {
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_line_qty")]
    pub qty: u32,
    #[serde(alias = "w")]
    pub width: f64,
    #[serde(alias = "h")]
    pub height: f64,
    #[serde(default)]
    pub material: WrapMaterial,
    /// Perf thrown in at no charge.
    #[serde(default)]
    pub included: bool,
}

fn default_label() -> String {
    "Section".to_string()
}

fn default_line_qty() -> u32 {
    1
}

impl WrapPanel {
    /// Printed area across the whole fleet.
    fn area(&self, fleet: f64) -> f64 {
        sq_ft(self.width, self.height) * f64::from(self.qty) * fleet
    }

    /// Printed webs needed to cover this line, seamed with a 1in overlap.
    pub fn seam_panels(&self) -> u32 {
        let short = self.width.min(self.height);
        let per_piece = if short <= MAX_WEB_IN {
            1.0
        } else {
            ((short - SEAM_OVERLAP_IN) / (MAX_WEB_IN - SEAM_OVERLAP_IN)).ceil()
        };
        (per_piece as u32).saturating_mul(self.qty)
    }

    /// Area the installers are paid on.
    fn install_area(&self, fleet: f64) -> f64 {
        match self.material {
            WrapMaterial::Decal => self.area(fleet) * DECAL_INSTALL_SHARE,
            WrapMaterial::Wrap | WrapMaterial::Perf => self.area(fleet),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapInput {
    /// Number of vehicles.
    pub qty: u32,
    pub panels: Vec<WrapPanel>,
    #[serde(default)]
    pub complexity: VehicleComplexity,
    #[serde(flatten)]
    pub job: JobOptions,
}

pub fn quote(input: &WrapInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::Wrap, retail(input, cfg), cost(input, cfg))
}

fn retail(input: &WrapInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let fleet = f64::from(input.qty);
    let wrap_rate = cfg.num("Retail_Price_Wrap_SqFt", 15.0);
    let perf_rate = cfg.num("Retail_Price_Perf_SqFt", 12.0);
    let decal_rate = cfg.num("Retail_Price_Decal_SqFt", 14.0);

    let mut gross_print = 0.0;
    let mut install_area = 0.0;
    let mut line_items = Vec::with_capacity(input.panels.len());
    for panel in &input.panels {
        let rate = match panel.material {
            WrapMaterial::Wrap => wrap_rate,
            WrapMaterial::Perf if panel.included => 0.0,
            WrapMaterial::Perf => perf_rate,
            WrapMaterial::Decal => decal_rate,
        };
        let area = panel.area(fleet);
        gross_print += rate * area;
        install_area += panel.install_area(fleet);
        line_items.push(LineItem {
            label: panel.label.clone(),
            material: panel.material.as_str().to_string(),
            qty: panel.qty,
            width: panel.width,
            height: panel.height,
            sq_ft: area,
            retail: rate * area,
            seam_panels: panel.seam_panels(),
            included: panel.included,
        });
    }

    let install_base = cfg.num("Retail_Price_Install_Simple", 5.0);
    let install_rate = match input.complexity {
        VehicleComplexity::Complex => install_base * cfg.num("Retail_Mult_Complex", 2.5),
        VehicleComplexity::Simple => install_base,
    };
    let install = install_area * install_rate;

    let volume = VolumeTiers::probe(cfg, VolumeColumn::Discount, &[]);
    let print_total = gross_print * (1.0 - volume.discount_for(fleet));
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
    adders.insert("installation".to_string(), install);

    let design_fee = design_fee(cfg, 85.0, &input.job, true);
    let min = apply_shop_minimum(print_total + install + design_fee, cfg.num("Retail_Min_Order", 150.0));

    RetailBreakdown {
        unit_price: min.grand_total / fleet,
        base_rate: wrap_rate,
        print_total,
        design_fee,
        adders,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis: PricingBasis::FlatRate,
        tiers,
        line_items,
        ..Default::default()
    }
}

fn cost(input: &WrapInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let fleet = f64::from(input.qty);
    let waste = cfg.num("Waste_Factor", 1.25);
    let cast = cfg.num("Cost_Vin_Vehicle", 1.30) + cfg.num("Cost_Lam_Vehicle", 0.96);
    let perf = cfg.num("Cost_Vinyl_Perf", 0.65) + cfg.num("Cost_Lam_Perf", 0.25);

    let mut total_sq_ft = 0.0;
    let mut install_area = 0.0;
    let mut seams = 0;
    let mut ledger = CostLedger::new();

    for panel in &input.panels {
        let area = panel.area(fleet);
        let media = match panel.material {
            WrapMaterial::Wrap | WrapMaterial::Decal => cast,
            WrapMaterial::Perf => perf,
        };
        ledger.add("materials", media * area * waste);
        total_sq_ft += area;
        install_area += panel.install_area(fleet);
        seams = panel.seam_panels().saturating_add(seams);
    }

    ledger.add("ink", total_sq_ft * cfg.num("Cost_Ink_Latex", 0.16) * waste);

    let print_hrs = total_sq_ft / cfg.num("Speed_Print_Roll", 150.0);
    let lam_hrs = total_sq_ft / cfg.num("Speed_Lam_Roll", 300.0);
    let run_hrs = print_hrs + lam_hrs;
    ledger.add(
        "print_labor",
        run_hrs * cfg.num("Rate_Operator", 25.0) * cfg.num("Labor_Attendance_Ratio", 0.10),
    );
    ledger.add("machine", run_hrs * cfg.num("Rate_Machine_Print", 5.0));

    let install_speed = match input.complexity {
        VehicleComplexity::Complex => cfg.num("Speed_Install_Vehicle", 10.0) * 0.5,
        VehicleComplexity::Simple => cfg.num("Speed_Install_Vehicle", 10.0),
    };
    let install_hrs = install_area / install_speed;
    ledger.add("install_labor", install_hrs * cfg.num("Rate_Install", 32.0));

    ledger.detail("total_sq_ft", total_sq_ft);
    ledger.detail("install_sq_ft", install_area);
    ledger.detail("print_hours", print_hrs);
    ledger.detail("laminate_hours", lam_hrs);
    ledger.detail("install_hours", install_hrs);
    ledger.detail("seam_panels", f64::from(seams));

    ledger.finish(waste, cfg.num("Factor_Risk", 1.10))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(width: f64, height: f64, material: WrapMaterial) -> WrapPanel {
        WrapPanel { label: "Driver Side".into(), qty: 1, width, height, material, included: false }
    }

    fn van(panels: Vec<WrapPanel>) -> WrapInput {
        WrapInput { qty: 1, panels, complexity: VehicleComplexity::Simple, job: JobOptions::default() }
    }

    #[test]
    fn test_seam_count() {
        assert_eq!(panel(120.0, 52.0, WrapMaterial::Wrap).seam_panels(), 1);
        // 60in short edge needs two 52in webs.
        assert_eq!(panel(120.0, 60.0, WrapMaterial::Wrap).seam_panels(), 2);
        let mut line = panel(200.0, 104.0, WrapMaterial::Wrap);
        line.qty = 2;
        assert_eq!(line.seam_panels(), 6);
    }

    #[test]
    fn test_included_perf_is_free_but_installed() {
        let mut perf = panel(36.0, 24.0, WrapMaterial::Perf);
        perf.included = true;
        let q = quote(&van(vec![panel(144.0, 60.0, WrapMaterial::Wrap), perf]), &ConfigSnapshot::new());
        // 60 sq ft of wrap at 15; perf adds 6 sq ft of install only.
        assert!((q.retail.print_total - 900.0).abs() < 1e-9);
        assert!((q.retail.adders["installation"] - 66.0 * 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_complex_vehicle_install() {
        let mut input = van(vec![panel(144.0, 60.0, WrapMaterial::Decal)]);
        input.complexity = VehicleComplexity::Complex;
        let q = quote(&input, &ConfigSnapshot::new());
        // Decals install at half area: 30 sq ft at 12.5.
        assert!((q.retail.adders["installation"] - 375.0).abs() < 1e-9);
        // 30 sq ft at 5 sq ft/h and 32/h.
        assert!((q.cost.breakdown["install_labor"] - 6.0 * 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_fleet_discount_applies_to_print_only() {
        let cfg = ConfigSnapshot::new().with("Tier_1_Qty", 3.0).with("Tier_1_Disc", 0.10);
        let mut input = van(vec![panel(144.0, 60.0, WrapMaterial::Wrap)]);
        input.qty = 3;
        let q = quote(&input, &cfg);
        assert!((q.retail.print_total - 2700.0 * 0.9).abs() < 1e-9);
        assert!((q.retail.adders["installation"] - 900.0).abs() < 1e-9);
        assert_eq!(q.retail.tiers[0].base_rate, 2700.0);
    }

    #[test]
    fn test_design_fee_per_file_and_minimum() {
        let mut input = van(vec![panel(12.0, 12.0, WrapMaterial::Decal)]);
        input.job.include_design = true;
        input.job.files = 2;
        let q = quote(&input, &ConfigSnapshot::new());
        assert_eq!(q.retail.design_fee, 170.0);
        assert!(!q.retail.is_min_applied);

        let q = quote(&van(vec![panel(12.0, 12.0, WrapMaterial::Decal)]), &ConfigSnapshot::new());
        assert!(q.retail.is_min_applied);
        assert_eq!(q.retail.grand_total, 150.0);
    }

    #[test]
    fn test_cost_materials_and_risk() {
        let q = quote(&van(vec![panel(144.0, 60.0, WrapMaterial::Perf)]), &ConfigSnapshot::new());
        assert!((q.cost.breakdown["materials"] - 60.0 * 0.90 * 1.25).abs() < 1e-9);
        assert!((q.cost.total - q.cost.subtotal * 1.10).abs() < 1e-9);
    }

    #[test]
    fn test_line_items_itemize_each_panel() {
        let mut perf = panel(48.0, 24.0, WrapMaterial::Perf);
        perf.label = "Rear Glass".into();
        perf.included = true;
        let mut sides = panel(192.0, 60.0, WrapMaterial::Wrap);
        sides.qty = 2;
        let mut input = van(vec![sides, perf]);
        input.qty = 2;

        let items = quote(&input, &ConfigSnapshot::new()).retail.line_items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "Driver Side");
        assert_eq!(items[0].material, "wrap");
        assert!((items[0].sq_ft - 320.0).abs() < 1e-9);
        assert!((items[0].retail - 4800.0).abs() < 1e-9);
        assert_eq!(items[0].seam_panels, 4);
        assert_eq!(items[1].label, "Rear Glass");
        assert!(items[1].included);
        assert_eq!(items[1].retail, 0.0);
        assert_eq!(items[1].seam_panels, 1);
    }

    #[test]
    fn test_panel_shorthand_fields() {
        let p: WrapPanel = serde_json::from_str(r#"{"w": 120, "h": 60, "material": "perf"}"#).unwrap();
        assert_eq!(p.qty, 1);
        assert_eq!(p.label, "Section");
        assert_eq!(p.material, WrapMaterial::Perf);
    }
}
