//! Tier Resolution - Area Curves and Volume Discounts
//!
//! Both tables live in the pricing sheet as sparse numbered keys
//! (`ACM3_T1_Max`, `ACM3_T2_Max`, ... / `Tier_1_Qty`, `Tier_2_Qty`, ...).
//! They are decoded once into ordered rows by a bounded probe, then resolved.

use serde::{Deserialize, Serialize};

use crate::config::ConfigSnapshot;

/// Upper bound on numbered rows read from a sheet.
pub const MAX_TIER_PROBE: usize = 64;

/// Literal fallback for one area-curve row.
#[derive(Debug, Clone, Copy)]
pub struct TierDefault {
    pub max: Option<f64>,
    pub rate: Option<f64>,
    pub min: Option<f64>,
}

impl TierDefault {
    /// Row priced at `rate` up to `max` sq ft.
    pub const fn capped(max: f64, rate: f64) -> Self {
        Self { max: Some(max), rate: Some(rate), min: None }
    }

    /// Open-ended catch-all row.
    pub const fn open(rate: f64) -> Self {
        Self { max: None, rate: Some(rate), min: None }
    }

    /// Row that only carries a price floor and never matches by itself.
    pub const fn floor_only(min: f64) -> Self {
        Self { max: None, rate: None, min: Some(min) }
    }

    pub const fn with_floor(self, min: f64) -> Self {
        Self { max: self.max, rate: self.rate, min: Some(min) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaTier {
    pub index: usize,
    pub max: Option<f64>,
    pub rate: Option<f64>,
    pub min: Option<f64>,
}

/// Rate picked from an area curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaRate {
    pub tier: usize,
    pub rate: f64,
    /// Floor carried by the matched row, 0 when it has none.
    pub min: f64,
}

impl AreaRate {
    /// `rate * value`, raised to the row's floor.
    pub fn price(&self, value: f64) -> f64 {
        crate::retail::at_least(self.rate * value, self.min)
    }
}

/// Ascending per-area price schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaCurve {
    pub prefix: String,
    pub tiers: Vec<AreaTier>,
}

impl AreaCurve {
    /// Reads `<prefix>_T1_*` onwards.
    pub fn probe(cfg: &ConfigSnapshot, prefix: &str, defaults: &[TierDefault]) -> Self {
        Self::probe_from(cfg, prefix, 1, defaults)
    }

    /// Reads `<prefix>_T<first>_*` onwards. `defaults[0]` describes row `first`.
    ///
    /// A sheet that prices any row of this curve owns it outright: rows are
    /// read while any of `_Max`, `_Rate`, `_Min` is present and the first
    /// empty index ends the curve. `defaults` only apply when the sheet has
    /// no `_Rate` key for the prefix.
    pub fn probe_from(
        cfg: &ConfigSnapshot,
        prefix: &str,
        first: usize,
        defaults: &[TierDefault],
    ) -> Self {
        let key = |index: usize, field: &str| format!("{}_T{}_{}", prefix, index, field);
        let sheet_priced = (first..first + MAX_TIER_PROBE).any(|index| cfg.contains(&key(index, "Rate")));

        let tiers = if sheet_priced {
            (first..first + MAX_TIER_PROBE)
                .map(|index| AreaTier {
                    index,
                    max: cfg.opt_num(&key(index, "Max")),
                    rate: cfg.opt_num(&key(index, "Rate")),
                    min: cfg.opt_num(&key(index, "Min")),
                })
                .take_while(|t| t.max.is_some() || t.rate.is_some() || t.min.is_some())
                .collect()
        } else {
            defaults
                .iter()
                .enumerate()
                .map(|(offset, d)| AreaTier { index: first + offset, max: d.max, rate: d.rate, min: d.min })
                .collect()
        };

        Self { prefix: prefix.to_string(), tiers }
    }

    /// First priced row whose max is >= `value`; the last priced row is the
    /// catch-all. Rows without a max are open-ended.
    pub fn resolve(&self, value: f64) -> Option<AreaRate> {
        let priced: Vec<&AreaTier> = self.tiers.iter().filter(|t| t.rate.is_some()).collect();

        let hit = priced
            .iter()
            .find(|t| t.max.map_or(true, |max| value <= max))
            .or_else(|| priced.last())?;

        Some(AreaRate {
            tier: hit.index,
            rate: hit.rate.unwrap_or(0.0),
            min: hit.min.unwrap_or(0.0),
        })
    }

    /// Floor declared on the first row, used by products with a single
    /// per-sign minimum.
    pub fn first_floor(&self) -> Option<f64> {
        self.tiers.first().and_then(|t| t.min)
    }
}

/// Which column of the volume table a product reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeColumn {
    /// `Tier_<n>_Disc`: fractional discount.
    Discount,
    /// `Tier_<n>_Price`: replacement unit price.
    Price,
}

impl VolumeColumn {
    fn suffix(self) -> &'static str {
        match self {
            VolumeColumn::Discount => "Disc",
            VolumeColumn::Price => "Price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeTier {
    pub index: usize,
    pub threshold: f64,
    pub value: f64,
}

/// Quantity-break table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeTiers {
    pub tiers: Vec<VolumeTier>,
}

impl VolumeTiers {
    /// Reads `Tier_<n>_Qty` with the chosen value column. `defaults` are
    /// `(threshold, value)` rows that exist even when the sheet omits them.
    /// A present threshold with an absent value reads as 0.
    pub fn probe(cfg: &ConfigSnapshot, column: VolumeColumn, defaults: &[(f64, f64)]) -> Self {
        let mut tiers = Vec::new();

        for n in 1..=MAX_TIER_PROBE {
            let default = defaults.get(n - 1);
            let threshold = match cfg.opt_num(&format!("Tier_{}_Qty", n)).or(default.map(|d| d.0)) {
                Some(q) => q,
                None => break,
            };
            let value = cfg.num(
                &format!("Tier_{}_{}", n, column.suffix()),
                default.map_or(0.0, |d| d.1),
            );
            tiers.push(VolumeTier { index: n, threshold, value });
        }

        Self { tiers }
    }

    /// Highest threshold that `qty` reaches (inclusive). Equal thresholds
    /// resolve to the later row.
    pub fn resolve(&self, qty: f64) -> Option<&VolumeTier> {
        self.tiers
            .iter()
            .filter(|t| qty >= t.threshold)
            .fold(None, |best: Option<&VolumeTier>, t| match best {
                Some(b) if b.threshold > t.threshold => Some(b),
                _ => Some(t),
            })
    }

    /// Discount fraction for `qty`, 0 when no row qualifies.
    pub fn discount_for(&self, qty: f64) -> f64 {
        self.resolve(qty).map_or(0.0, |t| t.value)
    }

    pub fn first_threshold(&self) -> Option<f64> {
        self.tiers.first().map(|t| t.threshold)
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
