//! Shared type definitions for the simulation.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Animal species tag. All life-cycle behavior is shared; species only
/// selects the parameter table and the feeding operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];
}

impl FromStr for Species {
    type Err = Error;

    /// Parse a species tag, case-normalized ("herbivore" == "Herbivore").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("herbivore") {
            Ok(Species::Herbivore)
        } else if s.eq_ignore_ascii_case("carnivore") {
            Ok(Species::Carnivore)
        } else {
            Err(Error::UnknownSpecies(s.to_string()))
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Herbivore => write!(f, "Herbivore"),
            Species::Carnivore => write!(f, "Carnivore"),
        }
    }
}

/// Terrain kind of a habitat cell. Determines accessibility and the
/// fodder ceiling; Water is inaccessible and never holds animals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Lowland,
    Highland,
    Desert,
    Water,
}

impl Terrain {
    /// Map a single map character to a terrain kind.
    pub fn from_code(c: char) -> Option<Terrain> {
        match c {
            'L' => Some(Terrain::Lowland),
            'H' => Some(Terrain::Highland),
            'D' => Some(Terrain::Desert),
            'W' => Some(Terrain::Water),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Terrain::Lowland => 'L',
            Terrain::Highland => 'H',
            Terrain::Desert => 'D',
            Terrain::Water => 'W',
        }
    }

    pub fn is_accessible(&self) -> bool {
        *self != Terrain::Water
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terrain::Lowland => write!(f, "Lowland"),
            Terrain::Highland => write!(f, "Highland"),
            Terrain::Desert => write!(f, "Desert"),
            Terrain::Water => write!(f, "Water"),
        }
    }
}

/// Zero-based (row, column) grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The four orthogonal neighbors that stay inside a `rows` x `cols`
    /// grid. Interior cells always get all four; diagonals never appear.
    pub fn orthogonal_neighbors(&self, rows: usize, cols: usize) -> Vec<Coord> {
        let mut out = Vec::with_capacity(4);
        if self.row > 0 {
            out.push(Coord::new(self.row - 1, self.col));
        }
        if self.row + 1 < rows {
            out.push(Coord::new(self.row + 1, self.col));
        }
        if self.col > 0 {
            out.push(Coord::new(self.row, self.col - 1));
        }
        if self.col + 1 < cols {
            out.push(Coord::new(self.row, self.col + 1));
        }
        out
    }
}

/// One animal record in a population batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalSpec {
    /// Species tag, case-normalized on input.
    pub species: String,
    pub age: u32,
    pub weight: f64,
}

/// A batch of animals targeting one cell. The location is 1-based, as
/// supplied by callers; the island converts it to a zero-based `Coord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationEntry {
    pub location: (usize, usize),
    pub animals: Vec<AnimalSpec>,
}
