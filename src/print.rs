//! Print Process Vocabulary
//!
//! Shared enums and physical constants used by every product engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Square inches in a square foot.
pub const SQ_IN_PER_SQ_FT: f64 = 144.0;

/// Area of a standard 4x8 sheet in square feet.
pub const STANDARD_SHEET_SQ_FT: f64 = 32.0;

/// Usable flatbed width in inches.
pub const FLATBED_BED_WIDTH_IN: f64 = 64.0;

/// Operator attendance while the vinyl plotter runs.
pub const PLOTTER_ATTENDANCE: f64 = 0.25;

/// Area of a `width` x `height` inch part in square feet.
pub fn sq_ft(width: f64, height: f64) -> f64 {
    (width * height) / SQ_IN_PER_SQ_FT
}

/// Perimeter of a `width` x `height` inch part in linear feet.
pub fn perimeter_lf(width: f64, height: f64) -> f64 {
    ((width + height) * 2.0) / 12.0
}

/// Printed faces. Serialized as the number 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum Sides {
    #[default]
    Single,
    Double,
}

impl Sides {
    pub fn count(self) -> f64 {
        match self {
            Sides::Single => 1.0,
            Sides::Double => 2.0,
        }
    }

    pub fn is_double(self) -> bool {
        self == Sides::Double
    }

    /// Code used in bracket keys (`SS` / `DS`).
    pub fn code(self) -> &'static str {
        match self {
            Sides::Single => "SS",
            Sides::Double => "DS",
        }
    }
}

impl TryFrom<u8> for Sides {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Sides::Single),
            2 => Ok(Sides::Double),
            other => Err(format!("sides must be 1 or 2, got {}", other)),
        }
    }
}

impl From<Sides> for u8 {
    fn from(s: Sides) -> u8 {
        match s {
            Sides::Single => 1,
            Sides::Double => 2,
        }
    }
}

/// Cut path for rigid substrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CutShape {
    /// Straight shear / table-saw cut.
    #[default]
    Rectangle,
    /// Simple CNC route.
    #[serde(alias = "CNC Simple", alias = "easy")]
    Easy,
    /// Detailed CNC route.
    #[serde(alias = "CNC Complex", alias = "complex")]
    Complex,
}

impl CutShape {
    pub fn is_routed(self) -> bool {
        self != CutShape::Rectangle
    }
}

impl fmt::Display for CutShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CutShape::Rectangle => "Rectangle",
            CutShape::Easy => "Easy",
            CutShape::Complex => "Complex",
        };
        f.write_str(s)
    }
}

/// Per-job artwork options shared by most products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOptions {
    /// Number of distinct artwork files.
    #[serde(default = "default_files")]
    pub files: u32,
    /// Charge the setup fee once per file.
    #[serde(default)]
    pub setup_per_file: bool,
    /// Include the design fee.
    #[serde(default)]
    pub include_design: bool,
}

fn default_files() -> u32 { 1 }

impl Default for JobOptions {
    fn default() -> Self {
        Self { files: 1, setup_per_file: false, include_design: false }
    }
}

impl JobOptions {
    pub fn file_count(&self) -> f64 {
        f64::from(self.files)
    }
}
