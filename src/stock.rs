//! Stock Yield Optimizer
//!
//! Picks the cheapest stock sheet for a run of identical rectangular parts.
//! Only the two cardinal orientations are considered; parts are laid out in a
//! simple grid.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Candidate stock sheet, dimensions in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSheet {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub cost: f64,
}

impl StockSheet {
    pub fn new(id: &str, width: f64, height: f64, cost: f64) -> Self {
        Self { id: id.to_string(), width, height, cost }
    }
}

/// Absolute printable/shippable ceiling. The short part edge is checked
/// against `max_short`, the long edge against `max_long`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeLimit {
    pub max_short: f64,
    pub max_long: f64,
}

impl SizeLimit {
    pub fn admits(&self, width: f64, height: f64) -> bool {
        width.min(height) <= self.max_short && width.max(height) <= self.max_long
    }
}

/// Grid placement on one sheet, for the nesting diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub columns: u64,
    pub rows: u64,
    /// Part turned 90 degrees relative to the request.
    pub rotated: bool,
    pub per_sheet: u64,
    /// Parts on the final (possibly partial) sheet.
    pub last_sheet_count: u64,
    /// Trim waste of the final sheet, 0..1.
    pub last_sheet_waste: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSelection {
    pub sheet_id: String,
    pub sheet_width: f64,
    pub sheet_height: f64,
    pub sheet_cost: f64,
    pub sheets_needed: u32,
    pub total_cost: f64,
    pub layout: SheetLayout,
}

/// Result of the optimizer. `Oversized` is the single no-fit sentinel: the
/// part exceeds the size ceiling or fits no candidate sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StockOutcome {
    Fitted(StockSelection),
    Oversized { label: String },
}

pub const OVERSIZED_LABEL: &str = "OVERSIZED";

impl StockOutcome {
    fn oversized() -> Self {
        StockOutcome::Oversized { label: OVERSIZED_LABEL.to_string() }
    }

    pub fn is_oversized(&self) -> bool {
        matches!(self, StockOutcome::Oversized { .. })
    }

    /// Sheet cost of the selection; zero for the oversized sentinel.
    pub fn total_cost(&self) -> f64 {
        match self {
            StockOutcome::Fitted(s) => s.total_cost,
            StockOutcome::Oversized { .. } => 0.0,
        }
    }

    pub fn sheets_needed(&self) -> u32 {
        match self {
            StockOutcome::Fitted(s) => s.sheets_needed,
            StockOutcome::Oversized { .. } => 0,
        }
    }

    pub fn selection(&self) -> Option<&StockSelection> {
        match self {
            StockOutcome::Fitted(s) => Some(s),
            StockOutcome::Oversized { .. } => None,
        }
    }
}

/// Most parts counted along one sheet edge. Keeps `columns * rows` inside u64.
const MAX_EDGE_COUNT: u64 = u32::MAX as u64;

/// Parts per sheet in each orientation: (as requested, rotated).
fn grid_fits(eff_w: f64, eff_h: f64, part_w: f64, part_h: f64) -> ((u64, u64), (u64, u64)) {
    let count = |span: f64, part: f64| -> u64 {
        if part > 0.0 && span >= part {
            ((span / part).floor() as u64).min(MAX_EDGE_COUNT)
        } else {
            0
        }
    };
    let upright = (count(eff_w, part_w), count(eff_h, part_h));
    let turned = (count(eff_w, part_h), count(eff_h, part_w));
    (upright, turned)
}

/// Cheapest sheet for `qty` parts of `part_w` x `part_h`.
///
/// `margin` is an unprintable border removed from every sheet edge. A
/// candidate yielding zero parts is skipped; on an exact cost tie the
/// earlier candidate is kept.
pub fn select_stock(
    part_w: f64,
    part_h: f64,
    qty: u32,
    candidates: &[StockSheet],
    margin: f64,
    limit: SizeLimit,
) -> StockOutcome {
    if !limit.admits(part_w, part_h) {
        debug!(part_w, part_h, ?limit, "Part exceeds absolute size ceiling");
        return StockOutcome::oversized();
    }

    let mut best: Option<StockSelection> = None;

    for sheet in candidates {
        let eff_w = sheet.width - margin * 2.0;
        let eff_h = sheet.height - margin * 2.0;
        let ((up_c, up_r), (rot_c, rot_r)) = grid_fits(eff_w, eff_h, part_w, part_h);
        let (columns, rows, rotated) = if rot_c * rot_r > up_c * up_r {
            (rot_c, rot_r, true)
        } else {
            (up_c, up_r, false)
        };
        let per_sheet = columns * rows;
        if per_sheet == 0 {
            continue;
        }

        let parts = u64::from(qty);
        let sheets = parts.div_ceil(per_sheet);
        let sheets_needed = u32::try_from(sheets).unwrap_or(qty);
        let total_cost = f64::from(sheets_needed) * sheet.cost;
        if best.as_ref().is_some_and(|b| total_cost >= b.total_cost) {
            continue;
        }

        let last_sheet_count = parts.saturating_sub(sheets.saturating_sub(1).saturating_mul(per_sheet));
        let used = last_sheet_count as f64 * part_w * part_h;
        let last_sheet_waste = 1.0 - used / (sheet.width * sheet.height);

        best = Some(StockSelection {
            sheet_id: sheet.id.clone(),
            sheet_width: sheet.width,
            sheet_height: sheet.height,
            sheet_cost: sheet.cost,
            sheets_needed,
            total_cost,
            layout: SheetLayout {
                columns,
                rows,
                rotated,
                per_sheet,
                last_sheet_count,
                last_sheet_waste,
            },
        });
    }

    match best {
        Some(selection) => StockOutcome::Fitted(selection),
        None => {
            debug!(part_w, part_h, candidates = candidates.len(), "No stock sheet fits part");
            StockOutcome::oversized()
        }
    }
}
