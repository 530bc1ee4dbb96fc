//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed terrain map, raised once at island construction.
    #[error("invalid map: {0}")]
    InvalidMap(String),

    /// Population targeting an inaccessible cell or carrying bad attributes.
    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    /// Unknown parameter name or a value outside its legal bounds.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Species tag not recognized in a population record.
    #[error("unknown species: {0}")]
    UnknownSpecies(String),
}
