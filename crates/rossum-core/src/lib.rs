//! Core types and configuration for the Rossum island ecosystem simulation.

pub mod config;
pub mod error;
pub mod types;

pub use config::{SimParams, SpeciesParams, TerrainTable};
pub use error::{Error, Result};
pub use types::*;
