//! Error types shared by the record, catalog and entry layers.

use std::{fmt, io, num::ParseIntError, path::PathBuf};

use thiserror::Error;

/// Identifies the input a validation failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The game's title.
    Name,
    /// The price paid for the game.
    Price,
    /// The storage space the game requires.
    Space,
}

impl Field {
    /// Stable identifier used when routing an error to an input control.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Price => "Price",
            Field::Space => "Space",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected input, tagged with the field responsible for it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Which input is at fault.
    pub field: Field,
    /// Human-readable explanation, suitable for a status line.
    pub message: String,
}

impl ValidationError {
    /// Build an error for `field` with the given message.
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn blank_name() -> Self {
        Self::new(Field::Name, "The game name cannot be blank.")
    }

    pub(crate) fn negative_price() -> Self {
        Self::new(Field::Price, "Game price must not be negative.")
    }

    pub(crate) fn negative_space() -> Self {
        Self::new(Field::Space, "Game's space must not be negative.")
    }

    pub(crate) fn price_not_a_number() -> Self {
        Self::new(Field::Price, "Price must be a number")
    }

    pub(crate) fn space_not_a_number() -> Self {
        Self::new(Field::Space, "Space required must be a number")
    }
}

/// Failure of a form submission.
#[derive(Error, Debug)]
pub enum EntryError {
    /// A field did not parse or did not pass validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The release year text is not an integer.
    #[error("release year {input:?} is not a whole number")]
    ReleaseYear {
        /// The text that failed to parse.
        input: String,
        /// Underlying parse failure.
        #[source]
        source: ParseIntError,
    },
}

impl EntryError {
    /// The field to highlight, when the failure belongs to one.
    pub fn field(&self) -> Option<Field> {
        match self {
            EntryError::Invalid(err) => Some(err.field),
            EntryError::ReleaseYear { .. } => None,
        }
    }
}

/// Failure while writing a catalog out.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The records could not be encoded as JSON.
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The destination could not be created or written.
    #[error("failed to write catalog to {}: {source}", path.display())]
    Io {
        /// Destination path of the failed write.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}
