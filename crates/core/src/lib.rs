#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Switch game library.
//!
//! This crate hosts the validated game record, the append-only catalog
//! and its persistence, the text-in/record-out entry boundary, and the
//! configuration used by the terminal UI and any future frontends.

pub mod catalog;
pub mod config;
pub mod entry;
pub mod error;
pub mod models;
pub mod years;

pub use catalog::{GameCatalog, SaveFormat};
pub use config::AppConfig;
pub use entry::{parse_entry, submit, EntryForm, Library, Receipt};
pub use error::{CatalogError, EntryError, Field, ValidationError};
pub use models::SwitchGame;
