//! Product Engines
//!
//! One module per product line. Each exposes an input record and a pure
//! `quote(&Input, &ConfigSnapshot) -> Quote`; [`QuoteRequest`] is the tagged
//! union the engine boundary dispatches on.

pub mod acm;
pub mod acrylic;
pub mod banner;
pub mod coroplast;
pub mod cut_vinyl;
pub mod decal;
pub mod foam;
pub mod pvc;
pub mod wall;
pub mod wrap;
pub mod yard;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigSnapshot;
use crate::print::JobOptions;
use crate::quote::Quote;

/// Product line, also the name of its pricing tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Acm,
    Acrylic,
    Banner,
    Coroplast,
    CutVinyl,
    Decal,
    Foam,
    Pvc,
    Wrap,
    Wall,
    Yard,
}

impl Product {
    pub const ALL: [Product; 11] = [
        Product::Acm,
        Product::Acrylic,
        Product::Banner,
        Product::Coroplast,
        Product::CutVinyl,
        Product::Decal,
        Product::Foam,
        Product::Pvc,
        Product::Wrap,
        Product::Wall,
        Product::Yard,
    ];

    /// File stem of the product's pricing tab.
    pub fn tab(self) -> &'static str {
        match self {
            Product::Acm => "acm",
            Product::Acrylic => "acrylic",
            Product::Banner => "banner",
            Product::Coroplast => "coroplast",
            Product::CutVinyl => "cut_vinyl",
            Product::Decal => "decal",
            Product::Foam => "foam",
            Product::Pvc => "pvc",
            Product::Wrap => "wrap",
            Product::Wall => "wall",
            Product::Yard => "yard",
        }
    }

    pub fn from_tab(stem: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.tab() == stem)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Product::Acm => "ACM Signs",
            Product::Acrylic => "Acrylic Signs",
            Product::Banner => "Vinyl Banners",
            Product::Coroplast => "Coroplast Signs",
            Product::CutVinyl => "Cut Vinyl Lettering",
            Product::Decal => "Decals",
            Product::Foam => "Foam Core Boards",
            Product::Pvc => "PVC Signs",
            Product::Wrap => "Vehicle Wraps",
            Product::Wall => "Wall Wraps",
            Product::Yard => "Yard Signs",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tab())
    }
}

/// A quote request for any product, tagged by `"product"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "product", rename_all = "snake_case")]
pub enum QuoteRequest {
    Acm(acm::AcmInput),
    Acrylic(acrylic::AcrylicInput),
    Banner(banner::BannerInput),
    Coroplast(coroplast::CoroplastInput),
    CutVinyl(cut_vinyl::CutVinylInput),
    Decal(decal::DecalInput),
    Foam(foam::FoamInput),
    Pvc(pvc::PvcInput),
    Wrap(wrap::WrapInput),
    Wall(wall::WallInput),
    Yard(yard::YardInput),
}

impl QuoteRequest {
    pub fn product(&self) -> Product {
        match self {
            QuoteRequest::Acm(_) => Product::Acm,
            QuoteRequest::Acrylic(_) => Product::Acrylic,
            QuoteRequest::Banner(_) => Product::Banner,
            QuoteRequest::Coroplast(_) => Product::Coroplast,
            QuoteRequest::CutVinyl(_) => Product::CutVinyl,
            QuoteRequest::Decal(_) => Product::Decal,
            QuoteRequest::Foam(_) => Product::Foam,
            QuoteRequest::Pvc(_) => Product::Pvc,
            QuoteRequest::Wrap(_) => Product::Wrap,
            QuoteRequest::Wall(_) => Product::Wall,
            QuoteRequest::Yard(_) => Product::Yard,
        }
    }

    /// Ordered quantity (vehicles for wraps, panel sets for walls).
    pub fn qty(&self) -> u32 {
        match self {
            QuoteRequest::Acm(i) => i.qty,
            QuoteRequest::Acrylic(i) => i.qty,
            QuoteRequest::Banner(i) => i.qty,
            QuoteRequest::Coroplast(i) => i.qty,
            QuoteRequest::CutVinyl(i) => i.qty,
            QuoteRequest::Decal(i) => i.qty,
            QuoteRequest::Foam(i) => i.qty,
            QuoteRequest::Pvc(i) => i.qty,
            QuoteRequest::Wrap(i) => i.qty,
            QuoteRequest::Wall(i) => i.qty,
            QuoteRequest::Yard(i) => i.qty,
        }
    }

    /// Artwork options, absent for wall wraps.
    pub fn job(&self) -> Option<&JobOptions> {
        match self {
            QuoteRequest::Acm(i) => Some(&i.job),
            QuoteRequest::Acrylic(i) => Some(&i.job),
            QuoteRequest::Banner(i) => Some(&i.job),
            QuoteRequest::Coroplast(i) => Some(&i.job),
            QuoteRequest::CutVinyl(i) => Some(&i.job),
            QuoteRequest::Decal(i) => Some(&i.job),
            QuoteRequest::Foam(i) => Some(&i.job),
            QuoteRequest::Pvc(i) => Some(&i.job),
            QuoteRequest::Wrap(i) => Some(&i.job),
            QuoteRequest::Wall(_) => None,
            QuoteRequest::Yard(i) => Some(&i.job),
        }
    }

    /// Runs the product engine against its tab. Never fails.
    pub fn quote(&self, cfg: &ConfigSnapshot) -> Quote {
        match self {
            QuoteRequest::Acm(input) => acm::quote(input, cfg),
            QuoteRequest::Acrylic(input) => acrylic::quote(input, cfg),
            QuoteRequest::Banner(input) => banner::quote(input, cfg),
            QuoteRequest::Coroplast(input) => coroplast::quote(input, cfg),
            QuoteRequest::CutVinyl(input) => cut_vinyl::quote(input, cfg),
            QuoteRequest::Decal(input) => decal::quote(input, cfg),
            QuoteRequest::Foam(input) => foam::quote(input, cfg),
            QuoteRequest::Pvc(input) => pvc::quote(input, cfg),
            QuoteRequest::Wrap(input) => wrap::quote(input, cfg),
            QuoteRequest::Wall(input) => wall::quote(input, cfg),
            QuoteRequest::Yard(input) => yard::quote(input, cfg),
        }
    }
}

pub(crate) fn default_true() -> bool {
    true
}
