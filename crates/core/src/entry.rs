//! Headless form boundary: raw text in, validated record out.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::{
    catalog::{GameCatalog, SaveFormat},
    error::{CatalogError, EntryError, ValidationError},
    models::SwitchGame,
};

/// Raw text of one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryForm {
    /// Game title as typed.
    pub name: String,
    /// Selected release year.
    pub release_year: String,
    /// Price as typed.
    pub price: String,
    /// Storage space as typed.
    pub space: String,
    /// Digital copy toggle.
    pub is_digital: bool,
}

/// Outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// `describe()` of the new record.
    pub summary: String,
    /// Gold points earned by the new record.
    pub gold_points: u64,
}

/// Parse and validate a submission without storing it.
///
/// Price and space must parse as numbers and the year as an integer before
/// the record itself is validated.
pub fn parse_entry(form: &EntryForm) -> Result<SwitchGame, EntryError> {
    let price = parse_number(&form.price).ok_or_else(ValidationError::price_not_a_number)?;
    let space = parse_number(&form.space).ok_or_else(ValidationError::space_not_a_number)?;
    let release_year =
        form.release_year
            .trim()
            .parse::<i32>()
            .map_err(|source| EntryError::ReleaseYear {
                input: form.release_year.clone(),
                source,
            })?;

    let game = SwitchGame::new(form.name.as_str(), release_year, price, space)?;
    Ok(game.with_digital(form.is_digital))
}

/// Headless entry point: validate four text fields into a record.
///
/// Returns the record together with its summary and gold points and leaves
/// storage to the caller. Front ends that keep a catalog use
/// [`Library::submit`], which runs the same checks and appends on success.
pub fn submit(
    name: &str,
    release_year: &str,
    price: &str,
    space: &str,
) -> Result<(SwitchGame, Receipt), EntryError> {
    let form = EntryForm {
        name: name.to_string(),
        release_year: release_year.to_string(),
        price: price.to_string(),
        space: space.to_string(),
        is_digital: false,
    };
    let game = parse_entry(&form)?;
    let receipt = receipt_for(&game);
    Ok((game, receipt))
}

fn receipt_for(game: &SwitchGame) -> Receipt {
    Receipt {
        summary: game.describe(),
        gold_points: game.gold_points(),
    }
}

fn parse_number(input: &str) -> Option<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Owns the catalog for one running front end.
///
/// Created once at startup; records only ever get appended.
#[derive(Debug, Default)]
pub struct Library {
    catalog: GameCatalog,
}

impl Library {
    /// Start with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access for rendering.
    pub fn catalog(&self) -> &GameCatalog {
        &self.catalog
    }

    /// Validate a submission and append it to the catalog.
    pub fn submit(&mut self, form: &EntryForm) -> Result<Receipt, EntryError> {
        let game = match parse_entry(form) {
            Ok(game) => game,
            Err(err) => {
                debug!(field = ?err.field(), %err, "Entry rejected");
                return Err(err);
            }
        };
        let receipt = receipt_for(&game);
        info!(
            summary = %receipt.summary,
            gold_points = receipt.gold_points,
            digital = game.is_digital(),
            "Game added"
        );
        self.catalog.add(game);
        Ok(receipt)
    }

    /// Persist the whole catalog to `path`.
    pub fn save(&self, path: impl AsRef<Path>, format: SaveFormat) -> Result<(), CatalogError> {
        self.catalog.save(path, format).inspect_err(|err| {
            warn!(%err, "Saving catalog failed");
        })
    }
}
