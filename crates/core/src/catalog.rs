//! In-memory game list and its file persistence.

use std::{
    fmt,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    slice,
};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::CatalogError, models::SwitchGame};

/// On-disk representation used by [`GameCatalog::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    /// One JSON array holding every record.
    #[default]
    Json,
    /// One summary line per record.
    Text,
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveFormat::Json => f.write_str("json"),
            SaveFormat::Text => f.write_str("text"),
        }
    }
}

/// Ordered, append-only collection of games.
#[derive(Debug, Clone, Default)]
pub struct GameCatalog {
    games: Vec<SwitchGame>,
}

impl GameCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Duplicates are allowed.
    pub fn add(&mut self, game: SwitchGame) {
        self.games.push(game);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// True when nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Records in insertion order.
    pub fn games(&self) -> &[SwitchGame] {
        &self.games
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, SwitchGame> {
        self.games.iter()
    }

    /// Most recently added record.
    pub fn last(&self) -> Option<&SwitchGame> {
        self.games.last()
    }

    /// Encode every record as a single-line JSON array.
    pub fn serialize(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string(&self.games)?)
    }

    /// One `describe()` line per record, each newline-terminated.
    pub fn to_text(&self) -> String {
        self.games
            .iter()
            .map(|game| format!("{game}\n"))
            .collect()
    }

    /// Write the whole catalog to `path`, replacing any previous contents.
    ///
    /// The payload is encoded before the file is touched, so an encoding
    /// failure leaves the destination as it was.
    pub fn save(&self, path: impl AsRef<Path>, format: SaveFormat) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let payload = match format {
            SaveFormat::Json => {
                let mut line = self.serialize()?;
                line.push('\n');
                line
            }
            SaveFormat::Text => self.to_text(),
        };

        let io_error = |source: io::Error| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(payload.as_bytes()).map_err(io_error)?;
        writer.flush().map_err(io_error)?;

        info!(path = %path.display(), games = self.games.len(), %format, "Catalog saved");
        Ok(())
    }
}

impl<'a> IntoIterator for &'a GameCatalog {
    type Item = &'a SwitchGame;
    type IntoIter = slice::Iter<'a, SwitchGame>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
