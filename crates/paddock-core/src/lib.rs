//! Core types for the Paddock F1 results pipeline.
//!
//! Domain model, entity resolution and the position merger. No HTTP or
//! database code lives here; source adapters and storage backends depend on
//! this crate, not the other way round.

pub mod error;
pub mod model;
pub mod resolve;
pub mod row;
pub mod standings;
pub mod store;

pub use error::{Error, Result};
pub use model::UNKNOWN;
