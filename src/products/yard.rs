//! 24x18 coroplast yard signs, sold off a quantity price table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::config::ConfigSnapshot;
use crate::cost::{hours, CostLedger};
use crate::print::{sq_ft, JobOptions, Sides};
use crate::products::Product;
use crate::quote::{CostBreakdown, PricingBasis, Quote, RetailBreakdown, TierLogEntry};
use crate::retail::{apply_shop_minimum, design_fee, setup_fee};
use crate::tiers::{VolumeColumn, VolumeTiers};

pub const YARD_SIGN_WIDTH_IN: f64 = 24.0;
pub const YARD_SIGN_HEIGHT_IN: f64 = 18.0;

/// Feed length of one bed load in linear feet.
const FEED_LF_PER_LOAD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YardInput {
    pub qty: u32,
    #[serde(default)]
    pub sides: Sides,
    /// H-stake per sign.
    #[serde(default, alias = "has_stakes")]
    pub stakes: bool,
    #[serde(flatten)]
    pub job: JobOptions,
}

pub fn quote(input: &YardInput, cfg: &ConfigSnapshot) -> Quote {
    Quote::new(Product::Yard, retail(input, cfg), cost(input, cfg))
}

fn retail(input: &YardInput, cfg: &ConfigSnapshot) -> RetailBreakdown {
    let qty = f64::from(input.qty);
    let base_ss = cfg.num("Retail_Price_Sign_SS", 15.0);
    let ds_adder = if input.sides.is_double() { cfg.num("Retail_Price_Sign_DS", 3.0) } else { 0.0 };
    let stake = if input.stakes { cfg.num("Retail_Price_Stake", 2.50) } else { 0.0 };

    let table = VolumeTiers::probe(cfg, VolumeColumn::Price, &[]);
    let applied = table.resolve(qty).map_or(base_ss, |t| t.value);
    let is_custom = applied == 0.0;
    if is_custom {
        info!(qty = input.qty, "Yard sign price table returned zero, custom quote required");
    }

    let tiers = table
        .tiers
        .iter()
        .map(|t| TierLogEntry {
            quantity: t.threshold,
            discount: if base_ss > 0.0 { 1.0 - t.value / base_ss } else { 0.0 },
            base_rate: t.value,
            unit_price: t.value + ds_adder + stake,
        })
        .collect();

    let print_total = (applied + ds_adder) * qty;
    let stakes_total = stake * qty;
    let mut adders = BTreeMap::new();
    if input.stakes {
        adders.insert("stakes".to_string(), stakes_total);
    }

    let setup_fee = setup_fee(cfg, 15.0, &input.job);
    let design_fee = design_fee(cfg, 45.0, &input.job, true);
    let min = apply_shop_minimum(
        print_total + stakes_total + setup_fee + design_fee,
        cfg.num("Retail_Min_Order", 75.0),
    );

    RetailBreakdown {
        unit_price: (print_total + stakes_total) / qty,
        base_rate: applied,
        print_total,
        setup_fee,
        design_fee,
        adders,
        grand_total: min.grand_total,
        min_order: min.min_order,
        is_min_applied: min.is_min_applied,
        basis: PricingBasis::PriceTier,
        tiers,
        is_custom,
        ..Default::default()
    }
}

fn cost(input: &YardInput, cfg: &ConfigSnapshot) -> CostBreakdown {
    let qty = f64::from(input.qty);
    let sides = input.sides.count();
    let waste = cfg.num("Waste_Factor", 1.05);
    let rate_op = cfg.num("Rate_Operator", 25.0);

    let blank = if qty >= cfg.num("Bulk_Qty_Trigger", 1100.0) {
        cfg.num("Cost_Blank_Bulk", 0.79)
    } else {
        cfg.num("Cost_Blank_Standard", 0.91)
    };

    let mut ledger = CostLedger::new();
    ledger.add("blanks", blank * waste * qty);

    let ink_sq_ft = sq_ft(YARD_SIGN_WIDTH_IN, YARD_SIGN_HEIGHT_IN) * sides * qty;
    ledger.add("ink", ink_sq_ft * cfg.num("Cost_Ink_Base", 0.16));
    if input.stakes {
        ledger.add("stakes", cfg.num("Cost_Stake", 0.65) * qty);
    }

    let loads_per_hr = cfg.num("Printer_Bed_Capacity", 3.0) * cfg.num("Machine_Speed_LF_Hr", 25.0);
    let run_hrs = FEED_LF_PER_LOAD / loads_per_hr * sides * qty;
    ledger.add("print_machine", run_hrs * cfg.num("Rate_Machine", 45.0));
    ledger.add("print_labor", run_hrs * rate_op);

    let setup_mins = cfg.num("Time_Setup_Base", 15.0) + cfg.num("Time_Setup_Adder", 2.0) * input.job.file_count();
    let setup_hrs = hours(setup_mins);
    ledger.add("setup", setup_hrs * rate_op);

    ledger.detail("blanks", qty);
    ledger.detail("ink_sq_ft", ink_sq_ft);
    ledger.detail("run_hours", run_hrs);
    ledger.detail("setup_hours", setup_hrs);

    ledger.finish(waste, cfg.num("Factor_Risk", 1.0))
}
