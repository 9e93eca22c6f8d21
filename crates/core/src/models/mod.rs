//! Shared domain models.

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;

/// Fraction of the price awarded as gold points.
pub const GOLD_RATE: f64 = 0.10;

/// A single owned Nintendo Switch game.
///
/// Instances only come out of [`SwitchGame::new`], so a value in hand always
/// has a non-blank name and a non-negative price and space. Gold points are
/// derived once from the price and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SwitchGame {
    name: String,
    release_year: i32,
    price: f64,
    gold_points: u64,
    space: f64,
    is_digital: bool,
}

impl SwitchGame {
    /// Validate the inputs and build a record.
    ///
    /// Checks run in the order name, price, space and stop at the first
    /// failure. The name is stored as given; only its trimmed form must be
    /// non-empty. The release year is not checked here.
    pub fn new(
        name: impl Into<String>,
        release_year: i32,
        price: f64,
        space: f64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::blank_name());
        }
        if !is_non_negative(price) {
            return Err(ValidationError::negative_price());
        }
        if !is_non_negative(space) {
            return Err(ValidationError::negative_space());
        }

        Ok(Self {
            name,
            release_year,
            price,
            gold_points: gold_points_for(price),
            space,
            is_digital: false,
        })
    }

    /// Mark the game as a digital (or physical) copy.
    pub fn with_digital(mut self, is_digital: bool) -> Self {
        self.is_digital = is_digital;
        self
    }

    /// Title of the game.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Year the game was released.
    pub fn release_year(&self) -> i32 {
        self.release_year
    }

    /// Price paid, or the MSRP.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Storage the game consumes.
    pub fn space(&self) -> f64 {
        self.space
    }

    /// Whether this is a digital copy.
    pub fn is_digital(&self) -> bool {
        self.is_digital
    }

    /// Gold points earned for the purchase.
    pub fn gold_points(&self) -> u64 {
        self.gold_points
    }

    /// Short one-line summary, e.g. `Mario Kart 8 (2017) - $59.99`.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SwitchGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - ${}", self.name, self.release_year, self.price)
    }
}

/// Gold points for a price: 10% rounded half-to-even to a whole number.
pub fn gold_points_for(price: f64) -> u64 {
    // float-to-int `as` saturates, so huge prices clamp instead of wrapping
    (GOLD_RATE * price).round_ties_even() as u64
}

// NaN and infinities fail too; JSON has no encoding for them.
fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
