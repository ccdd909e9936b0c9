//! Bounding-Box Rate Lookup
//!
//! Pre-negotiated fixed prices for standard sizes, stored as
//! `RET_<CODE>_<SSLL>_<SS|DS>_1` (qty 1) and `..._10` (qty break). The first
//! two digits of the size code are the short edge, the rest the long edge.

use serde::{Deserialize, Serialize};

use crate::config::ConfigSnapshot;
use crate::print::Sides;

/// A standard size that contains the requested part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub key: String,
    pub short: f64,
    pub long: f64,
    pub price_1: f64,
    pub price_10: f64,
    pub label: String,
}

impl BracketMatch {
    /// Unit price for `qty`; the qty-10 column applies from `break_qty` up.
    pub fn unit_price(&self, qty: f64, break_qty: f64) -> f64 {
        if qty >= break_qty {
            self.price_10
        } else {
            self.price_1
        }
    }
}

fn price_10_for(cfg: &ConfigSnapshot, key_1: &str, price_1: f64) -> f64 {
    let key_10 = format!("{}0", key_1);
    cfg.opt_num(&key_10)
        .filter(|p| *p != 0.0 && !p.is_nan())
        .unwrap_or(price_1)
}

/// Splits a size code like `1824` into (18, 24).
fn parse_size_code(code: &str) -> Option<(f64, f64)> {
    if code.len() < 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let short: u32 = code[..2].parse().ok()?;
    let long: u32 = code[2..].parse().ok()?;
    Some((f64::from(short), f64::from(long)))
}

/// Tightest bracket containing a `req_short` x `req_long` inch part.
///
/// Scans every key of the tab. Among containing brackets the smallest area
/// wins; on equal area the lexicographically first key is kept, since tabs
/// are stored key-sorted.
pub fn lookup_bracket(
    cfg: &ConfigSnapshot,
    code: &str,
    sides: Sides,
    req_short: f64,
    req_long: f64,
) -> Option<BracketMatch> {
    let prefix = format!("RET_{}_", code);
    let suffix = format!("_{}_1", sides.code());
    let mut best: Option<(f64, BracketMatch)> = None;

    for key in cfg.keys() {
        if !key.starts_with(&prefix) || !key.ends_with(&suffix) || key.len() < prefix.len() + suffix.len() {
            continue;
        }
        let size_code = &key[prefix.len()..key.len() - suffix.len()];
        let Some((short, long)) = parse_size_code(size_code) else {
            continue;
        };
        let area = short * long;
        let fits = req_short <= short && req_long <= long;
        let tighter = best.as_ref().map_or(true, |(best_area, _)| area < *best_area);

        if fits && tighter {
            let price_1 = cfg.num(key, 0.0);
            best = Some((
                area,
                BracketMatch {
                    key: key.to_string(),
                    short,
                    long,
                    price_1,
                    price_10: price_10_for(cfg, key, price_1),
                    label: format!("{}x{}", short, long),
                },
            ));
        }
    }

    best.map(|(_, m)| m)
}

/// Exact yield-box lookup on whole-foot sizes (`RET_BAN_0306_SS_1`).
///
/// Part edges are rounded up to the next foot before forming the key.
pub fn lookup_exact_feet(
    cfg: &ConfigSnapshot,
    code: &str,
    sides: Sides,
    req_short_in: f64,
    req_long_in: f64,
) -> Option<BracketMatch> {
    let short_ft = (req_short_in / 12.0).ceil();
    let long_ft = (req_long_in / 12.0).ceil();
    let key = format!("RET_{}_{:02}{:02}_{}_1", code, short_ft, long_ft, sides.code());

    let price_1 = cfg.opt_num(&key)?;
    Some(BracketMatch {
        price_10: price_10_for(cfg, &key, price_1),
        key,
        short: short_ft,
        long: long_ft,
        price_1,
        label: format!("{}'x{}'", short_ft, long_ft),
    })
}
