//! Retail Model - Fees, Discounts and the Shop Minimum

use tracing::debug;

use crate::bracket::lookup_bracket;
use crate::config::ConfigSnapshot;
use crate::print::{sq_ft, CutShape, JobOptions, Sides};
use crate::quote::{PricingBasis, TierLogEntry};
use crate::tiers::{AreaCurve, VolumeColumn, VolumeTiers};

/// `value` raised to `floor`. NaN values stay NaN.
pub fn at_least(value: f64, floor: f64) -> f64 {
    if value < floor { floor } else { value }
}

/// Outcome of the shop-minimum check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShopMinimum {
    pub grand_total: f64,
    pub min_order: f64,
    pub is_min_applied: bool,
}

/// Raises `raw_total` to `min_order`. Bracket-priced quotes pass 0.
pub fn apply_shop_minimum(raw_total: f64, min_order: f64) -> ShopMinimum {
    let is_min_applied = raw_total < min_order;
    if is_min_applied {
        debug!(raw_total, min_order, "Shop minimum applied");
    }
    ShopMinimum {
        grand_total: at_least(raw_total, min_order),
        min_order,
        is_min_applied,
    }
}

/// `Retail_Fee_Setup`, charged once or once per file.
pub fn setup_fee(cfg: &ConfigSnapshot, default: f64, opts: &JobOptions) -> f64 {
    let base = cfg.num("Retail_Fee_Setup", default);
    if opts.setup_per_file { base * opts.file_count() } else { base }
}

/// `Retail_Fee_Design` when design is included. Some products bill it per file.
pub fn design_fee(cfg: &ConfigSnapshot, default: f64, opts: &JobOptions, per_file: bool) -> f64 {
    if !opts.include_design {
        return 0.0;
    }
    let base = cfg.num("Retail_Fee_Design", default);
    if per_file { base * opts.file_count() } else { base }
}

/// Flat CNC routing fee keyed by cut complexity.
pub fn router_fee(cfg: &ConfigSnapshot, shape: CutShape) -> f64 {
    match shape {
        CutShape::Rectangle => 0.0,
        CutShape::Easy => cfg.num("Retail_Fee_Router_Easy", 30.0),
        CutShape::Complex => cfg.num("Retail_Fee_Router_Hard", 50.0),
    }
}

/// Multiplier for printing the second face.
pub fn double_sided_multiplier(cfg: &ConfigSnapshot) -> f64 {
    1.0 + cfg.num("Retail_Adder_DS_Mult", 0.5)
}

/// Per-board print price for rigid boards sold by the piece.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardPrint {
    /// Per-board price after the quantity break.
    pub unit: f64,
    /// Per-sq-ft rate, for display.
    pub base_rate: f64,
    pub basis: PricingBasis,
    pub tiers: Vec<TierLogEntry>,
}

impl BoardPrint {
    /// Spreads a per-order fee over each tier row's quantity.
    pub fn amortize(&mut self, order_fee: f64) {
        for row in &mut self.tiers {
            row.unit_price = (row.unit_price * row.quantity + order_fee) / row.quantity;
        }
    }
}

/// Prices one board of `width` x `height`.
///
/// A containing `RET_<code>_...` bracket wins, its `_10` price applying from
/// the first volume threshold. Otherwise the area curve rate is floored at
/// the curve's first-row minimum, the double-sided multiplier applied after
/// the floor, and the volume discount applied last.
pub fn price_board(
    cfg: &ConfigSnapshot,
    bracket_code: &str,
    curve: &AreaCurve,
    sides: Sides,
    width: f64,
    height: f64,
    qty: f64,
) -> BoardPrint {
    let volume = VolumeTiers::probe(cfg, VolumeColumn::Discount, &[(10.0, 0.05)]);
    let break_qty = volume.first_threshold().unwrap_or(10.0);
    let unit_sq_ft = sq_ft(width, height);

    if let Some(hit) = lookup_bracket(cfg, bracket_code, sides, width.min(height), width.max(height)) {
        let row = |quantity: f64, price: f64| TierLogEntry {
            quantity,
            discount: 0.0,
            base_rate: price,
            unit_price: price,
        };
        return BoardPrint {
            unit: hit.unit_price(qty, break_qty),
            base_rate: hit.price_1 / unit_sq_ft,
            tiers: vec![row(1.0, hit.price_1), row(break_qty, hit.price_10)],
            basis: PricingBasis::Bracket { label: hit.label },
        };
    }

    let rate = curve.resolve(unit_sq_ft).map_or(0.0, |hit| hit.rate);
    let mut board = at_least(rate * unit_sq_ft, curve.first_floor().unwrap_or(0.0));
    if sides.is_double() {
        board *= double_sided_multiplier(cfg);
    }

    let mut tiers = vec![TierLogEntry { quantity: 1.0, discount: 0.0, base_rate: board, unit_price: board }];
    tiers.extend(volume.tiers.iter().map(|t| TierLogEntry {
        quantity: t.threshold,
        discount: t.value,
        base_rate: board,
        unit_price: board * (1.0 - t.value),
    }));

    BoardPrint {
        unit: board * (1.0 - volume.discount_for(qty)),
        base_rate: rate,
        basis: PricingBasis::AreaCurve,
        tiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_applied_below_floor() {
        let m = apply_shop_minimum(30.0, 50.0);
        assert!(m.is_min_applied);
        assert_eq!(m.grand_total, 50.0);
    }

    #[test]
    fn test_minimum_not_applied_at_floor() {
        let m = apply_shop_minimum(50.0, 50.0);
        assert!(!m.is_min_applied);
        assert_eq!(m.grand_total, 50.0);
    }

    #[test]
    fn test_zero_minimum_for_brackets() {
        let m = apply_shop_minimum(12.0, 0.0);
        assert!(!m.is_min_applied);
        assert_eq!(m.grand_total, 12.0);
    }

    #[test]
    fn test_nan_is_not_masked() {
        assert!(at_least(f64::NAN, 50.0).is_nan());
    }

    #[test]
    fn test_setup_and_design_per_file() {
        let cfg = ConfigSnapshot::new();
        let opts = JobOptions { files: 3, setup_per_file: true, include_design: true };
        assert_eq!(setup_fee(&cfg, 15.0, &opts), 45.0);
        assert_eq!(design_fee(&cfg, 45.0, &opts, false), 45.0);
        assert_eq!(design_fee(&cfg, 85.0, &opts, true), 255.0);
        assert_eq!(design_fee(&cfg, 45.0, &JobOptions::default(), true), 0.0);
    }

    fn board_curve(cfg: &ConfigSnapshot) -> AreaCurve {
        use crate::tiers::TierDefault;
        AreaCurve::probe(
            cfg,
            "COR4",
            &[
                TierDefault::capped(3.99, 8.33).with_floor(25.0),
                TierDefault::capped(15.99, 7.0),
                TierDefault::open(5.0),
            ],
        )
    }

    #[test]
    fn test_board_bracket_uses_break_price() {
        let cfg = ConfigSnapshot::new()
            .with("RET_COR4_1824_SS_1", 18.0)
            .with("RET_COR4_1824_SS_10", 15.0);
        let curve = board_curve(&cfg);
        let one = price_board(&cfg, "COR4", &curve, Sides::Single, 24.0, 18.0, 9.0);
        assert_eq!(one.unit, 18.0);
        assert!(one.basis.is_bracket());
        let ten = price_board(&cfg, "COR4", &curve, Sides::Single, 24.0, 18.0, 10.0);
        assert_eq!(ten.unit, 15.0);
    }

    #[test]
    fn test_board_curve_floor_before_double_sided() {
        let cfg = ConfigSnapshot::new();
        let curve = board_curve(&cfg);
        // 1 sq ft * 8.33 floors to 25, then * 1.5.
        let board = price_board(&cfg, "COR4", &curve, Sides::Double, 12.0, 12.0, 1.0);
        assert_eq!(board.unit, 37.5);
        assert_eq!(board.tiers.len(), 2);

        let mut bulk = price_board(&cfg, "COR4", &curve, Sides::Double, 12.0, 12.0, 10.0);
        assert!((bulk.unit - 37.5 * 0.95).abs() < 1e-9);
        bulk.amortize(50.0);
        assert!((bulk.tiers[0].unit_price - 87.5).abs() < 1e-9);
        assert!((bulk.tiers[1].unit_price - (37.5 * 0.95 + 5.0)).abs() < 1e-9);
    }

    #[test]
    fn test_router_fee_by_shape() {
        let cfg = ConfigSnapshot::new().with("Retail_Fee_Router_Hard", 65.0);
        assert_eq!(router_fee(&cfg, CutShape::Rectangle), 0.0);
        assert_eq!(router_fee(&cfg, CutShape::Easy), 30.0);
        assert_eq!(router_fee(&cfg, CutShape::Complex), 65.0);
    }
}
