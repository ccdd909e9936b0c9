//! Cut vinyl lettering: plotter-cut, weeded and masked.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ConfigSnapshot;
use crate::cost::{hours, CostLedger};
use crate::print::{sq_ft, JobOptions, PLOTTER_ATTENDANCE};
use crate::products::Product;
use crate::quote::{CostBreakdown, PricingBasis, Quote, RetailBreakdown, TierLogEntry};
use crate::retail::{apply_shop_minimum, at_least, design_fee, setup_fee};
use crate::tiers::{VolumeColumn, VolumeTiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VinylFilm {
    /// Oracal 751.
    #[default]
    Flat,
    /// Oracal 951.
    Vehicle,
    /// Oracal 8500 translucent.
    #[serde(rename = "Backlit_8500")]
    Backlit8500,
    /// Oracal 8800 translucent.
    #[serde(rename = "Backlit_8800")]
    Backlit8800,
}

impl VinylFilm {
    fn series(self) -> &'static str {
        match self {
            VinylFilm::Flat => "751",
            VinylFilm::Vehicle => "951",
            VinylFilm::Backlit8500 => "8500",
            VinylFilm::Backlit8800 => "8800",
        }
    }

    pub fn label(self) -> String {
        format!("Oracal {}", self.series())
    }

    /// (retail per sq ft, raw cost per sq ft)
    fn rates(self, cfg: &ConfigSnapshot) -> (f64, f64) {
        let (retail, cost) = match self {
            VinylFilm::Flat => (18.0, 0.95),
            VinylFilm::Vehicle => (22.0, 1.25),
            VinylFilm::Backlit8500 => (20.0, 1.25),
            VinylFilm::Backlit8800 => (25.0, 1.60),
        };
        (
            cfg.num(&format!("Retail_Price_{}", self.series()), retail),
            cfg.num(&format!("Cost_Vinyl_{}", self.series()), cost),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeedComplexity {
    #[default]
    Simple,
    Complex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutVinylInput {
    pub width: f64,
    pub height: f64,
    pub qty: u32,
    #[serde(default)]
    pub material: VinylFilm,
    #[serde(default)]
    pub complexity: WeedComplexity,
    #[serde(flatten)]
    pub job: JobOptions,
}

pub fn quote(input: &CutVinylInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::CutVinyl, retail(input, cfg), cost(input, cfg))
}

fn retail(input: &CutVinylInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let qty = f64::from(input.qty);
    let unit_sq_ft = sq_ft(input.width, input.height);
    let (base_rate, _) = input.material.rates(cfg);
    let weed_rate = match input.complexity {
        WeedComplexity::Complex => cfg.num("Retail_Weed_Complex_Add", 5.00),
        WeedComplexity::Simple => 0.0,
    };

    let volume = VolumeTiers::probe(cfg, VolumeColumn::Discount, &[]);
    let print_total = base_rate * (1.0 - volume.discount_for(qty)) * unit_sq_ft * qty;
    let weeding = unit_sq_ft * qty * weed_rate;

    let mut adders = BTreeMap::new();
    if weeding > 0.0 {
        adders.insert("complex_weeding".to_string(), weeding);
    }

    let setup_fee = setup_fee(cfg, 15.0, &input.job);
    let design_fee = design_fee(cfg, 60.0, &input.job, false);
    let min_order = cfg.num("Retail_Min_Order", 45.0);
    let min = apply_shop_minimum(print_total + weeding + setup_fee + design_fee, min_order);

    let tiers = volume
        .tiers
        .iter()
        .map(|t| {
            let rate = base_rate * (1.0 - t.value);
            let area = unit_sq_ft * t.threshold;
            let total = at_least(rate * area + area * weed_rate + setup_fee + design_fee, min_order);
            TierLogEntry { quantity: t.threshold, discount: t.value, base_rate: rate, unit_price: total / t.threshold }
        })
        .collect();

    RetailBreakdown {
        unit_price: (print_total + weeding) / qty,
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
        material_label: Some(input.material.label()),
        ..Default::default()
    }
}

fn cost(input: &CutVinylInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let total_sq_ft = sq_ft(input.width, input.height) * f64::from(input.qty);
    let (_, vinyl_rate) = input.material.rates(cfg);
    let waste = cfg.num("Waste_Factor", 1.20);
    let rate_op = cfg.num("Rate_Operator", 25.0);
    let rate_shop = cfg.num("Rate_Shop_Labor", 20.0);

    let mut ledger = CostLedger::new();
    ledger.add("vinyl", total_sq_ft * vinyl_rate * waste);
    ledger.add("transfer_tape", total_sq_ft * cfg.num("Cost_Transfer_Tape", 0.15) * waste);
    ledger.add("setup", hours(cfg.num("Time_Setup_Job", 15.0)) * rate_op);

    let cut_hrs = total_sq_ft / cfg.num("Speed_Cut_Graphtec", 50.0);
    ledger.add("cut_machine", cut_hrs * cfg.num("Rate_Machine_Cut", 5.0));
    ledger.add("cut_labor", cut_hrs * rate_op * PLOTTER_ATTENDANCE);

    let weed_mins = match input.complexity {
        WeedComplexity::Complex => cfg.num("Time_Weed_Complex", 10.0),
        WeedComplexity::Simple => cfg.num("Time_Weed_Simple", 2.0),
    };
    let weed_hrs = hours(total_sq_ft * weed_mins);
    ledger.add("weeding", weed_hrs * rate_shop);
    ledger.add("masking", hours(total_sq_ft * cfg.num("Time_Mask_SqFt", 1.0)) * rate_shop);

    ledger.detail("total_sq_ft", total_sq_ft);
    ledger.detail("cut_hours", cut_hrs);
    ledger.detail("weed_hours", weed_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.05))
}
