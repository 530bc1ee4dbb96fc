//! The island grid: terrain validation, population placement, the
//! grid-wide migration phase, and aggregate reporting.

use crate::animal::Animal;
use crate::cell::Cell;
use rand::seq::SliceRandom;
use rand::Rng;
use rossum_core::{Coord, Error, PopulationEntry, Result, SimParams, Species, Terrain};
use serde::Serialize;

/// Flat per-species attribute samples across the whole grid, consumed by
/// external reporting (histograms).
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttributeSamples {
    pub fitness: Vec<f64>,
    pub weight: Vec<f64>,
    pub age: Vec<u32>,
}

/// A rectangular, Water-bordered grid of habitat cells. Cells are created
/// once at construction and never added or removed.
#[derive(Debug, Clone)]
pub struct Island {
    cells: Vec<Cell>,
    rows: usize,
    cols: usize,
}

impl Island {
    /// Build an island from a terrain map string, one row per line.
    ///
    /// Every row must have the same length, every character must be one of
    /// `L`, `H`, `D`, `W`, and the entire border must be Water.
    pub fn from_map(map: &str) -> Result<Self> {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(Error::InvalidMap("the map has no rows".to_string()));
        }

        let rows = lines.len();
        let cols = lines[0].chars().count();
        let mut cells = Vec::with_capacity(rows * cols);

        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(Error::InvalidMap(
                    "all rows of the map must have the same length".to_string(),
                ));
            }
            for (col, c) in line.chars().enumerate() {
                let terrain = Terrain::from_code(c).ok_or_else(|| {
                    Error::InvalidMap(format!("unknown terrain character '{c}'"))
                })?;
                let on_border = row == 0 || row == rows - 1 || col == 0 || col == cols - 1;
                if on_border && terrain != Terrain::Water {
                    return Err(Error::InvalidMap(
                        "the island must be surrounded by water".to_string(),
                    ));
                }
                cells.push(Cell::new(terrain));
            }
        }

        Ok(Self { cells, rows, cols })
    }

    /// (row count, column count).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        if self.in_bounds(coord) {
            Some(&self.cells[self.index(coord)])
        } else {
            None
        }
    }

    pub fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        if self.in_bounds(coord) {
            let idx = self.index(coord);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Iterate all cells with their coordinates, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (self.coord_of(idx), cell))
    }

    fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    fn index(&self, coord: Coord) -> usize {
        coord.row * self.cols + coord.col
    }

    fn coord_of(&self, idx: usize) -> Coord {
        Coord::new(idx / self.cols, idx % self.cols)
    }

    /// Place population batches by their 1-based locations.
    pub fn add_population(
        &mut self,
        entries: &[PopulationEntry],
        params: &SimParams,
    ) -> Result<()> {
        for entry in entries {
            let (row, col) = entry.location;
            if row == 0 || col == 0 || row > self.rows || col > self.cols {
                return Err(Error::InvalidPlacement(format!(
                    "location ({row}, {col}) is outside the island"
                )));
            }
            let coord = Coord::new(row - 1, col - 1);
            let idx = self.index(coord);
            self.cells[idx].place_animals(&entry.animals, params)?;
        }
        Ok(())
    }

    /// Run one full annual cycle: each phase completes across the whole
    /// grid before the next begins.
    pub fn annual_cycle(&mut self, params: &SimParams, rng: &mut impl Rng) {
        for cell in self.cells.iter_mut().filter(|c| c.is_active()) {
            cell.feed(params, rng);
        }
        for cell in self.cells.iter_mut().filter(|c| c.is_active()) {
            cell.procreate(params, rng);
        }
        self.migrate(params, rng);
        for cell in self.cells.iter_mut().filter(|c| c.is_active()) {
            cell.age_population(params);
        }
        for cell in self.cells.iter_mut().filter(|c| c.is_active()) {
            cell.lose_weight(params);
        }
        for cell in self.cells.iter_mut().filter(|c| c.is_active()) {
            cell.remove_dead(params, rng);
        }
    }

    /// Migration phase, collect-then-apply: every move is decided from the
    /// pre-migration populations, then all moves land at once, so the
    /// outcome does not depend on grid traversal order.
    ///
    /// Each willing animal draws one of its cell's four orthogonal
    /// neighbors uniformly; it moves only if the drawn cell is accessible.
    /// Animals are evaluated once per cycle, and the migrated flag is
    /// reset after the phase completes.
    pub fn migrate(&mut self, params: &SimParams, rng: &mut impl Rng) {
        let mut moves: Vec<(usize, Species, Animal)> = Vec::new();

        for idx in 0..self.cells.len() {
            if !self.cells[idx].is_active() {
                continue;
            }
            let neighbors: Vec<(usize, bool)> = self
                .coord_of(idx)
                .orthogonal_neighbors(self.rows, self.cols)
                .into_iter()
                .map(|coord| {
                    let n = self.index(coord);
                    (n, self.cells[n].is_accessible())
                })
                .collect();

            for species in Species::ALL {
                let sp = params.species(species);
                let pop = self.cells[idx].population_mut(species);
                let mut staying = Vec::with_capacity(pop.len());
                for mut animal in pop.drain(..) {
                    if !animal.migrated && animal.wants_to_migrate(sp, rng) {
                        if let Some(&(dest, accessible)) = neighbors.choose(rng) {
                            if accessible {
                                animal.migrated = true;
                                moves.push((dest, species, animal));
                                continue;
                            }
                        }
                    }
                    staying.push(animal);
                }
                *pop = staying;
            }
        }

        for (dest, species, animal) in moves {
            self.cells[dest].population_mut(species).push(animal);
        }

        for cell in &mut self.cells {
            for species in Species::ALL {
                for animal in cell.population_mut(species).iter_mut() {
                    animal.migrated = false;
                }
            }
        }
    }

    /// Total population of one species across the grid.
    pub fn num_animals(&self, species: Species) -> usize {
        self.cells.iter().map(|cell| cell.count(species)).sum()
    }

    /// Total population across both species.
    pub fn num_animals_total(&self) -> usize {
        self.cells.iter().map(Cell::population_count).sum()
    }

    /// Per-cell population counts for one species, row-major.
    pub fn population_matrix(&self, species: Species) -> Vec<Vec<u32>> {
        let mut matrix = vec![vec![0u32; self.cols]; self.rows];
        for (coord, cell) in self.cells() {
            matrix[coord.row][coord.col] = cell.count(species) as u32;
        }
        matrix
    }

    /// Flat fitness/weight/age samples for one species across the grid.
    pub fn attribute_samples(&self, species: Species) -> AttributeSamples {
        let mut samples = AttributeSamples::default();
        for cell in &self.cells {
            for animal in cell.population(species) {
                samples.fitness.push(animal.fitness);
                samples.weight.push(animal.weight);
                samples.age.push(animal.age);
            }
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rossum_core::AnimalSpec;

    const CROSS_MAP: &str = "WWWWW
                             WWLWW
                             WLLLW
                             WWLWW
                             WWWWW";

    fn herb_entry(location: (usize, usize), n: usize) -> PopulationEntry {
        PopulationEntry {
            location,
            animals: (0..n)
                .map(|_| AnimalSpec {
                    species: "Herbivore".to_string(),
                    age: 5,
                    weight: 40.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_valid_map_dimensions() {
        let island = Island::from_map(CROSS_MAP).unwrap();
        assert_eq!(island.dimensions(), (5, 5));
        let center = island.cell(Coord::new(2, 2)).unwrap();
        assert_eq!(center.terrain, Terrain::Lowland);
    }

    #[test]
    fn test_unequal_rows_rejected() {
        let err = Island::from_map("WWW\nWLW\nWWWW");
        assert!(matches!(err, Err(Error::InvalidMap(_))));
    }

    #[test]
    fn test_non_water_border_rejected() {
        let err = Island::from_map("WWW\nWLL\nWWW");
        assert!(matches!(err, Err(Error::InvalidMap(_))));
    }

    #[test]
    fn test_unknown_terrain_rejected() {
        let err = Island::from_map("WWW\nWXW\nWWW");
        assert!(matches!(err, Err(Error::InvalidMap(_))));
    }

    #[test]
    fn test_add_population_bounds_and_water() {
        let params = SimParams::default();
        let mut island = Island::from_map(CROSS_MAP).unwrap();

        island
            .add_population(&[herb_entry((3, 3), 5)], &params)
            .unwrap();
        assert_eq!(island.num_animals(Species::Herbivore), 5);

        // 1-based (1, 1) is the water border.
        assert!(island
            .add_population(&[herb_entry((1, 1), 1)], &params)
            .is_err());
        assert!(island
            .add_population(&[herb_entry((0, 3), 1)], &params)
            .is_err());
        assert!(island
            .add_population(&[herb_entry((6, 3), 1)], &params)
            .is_err());
    }

    #[test]
    fn test_migration_conserves_population_and_stays_orthogonal() {
        let mut params = SimParams::default();
        params.herbivore.mu = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut island = Island::from_map(CROSS_MAP).unwrap();
        island
            .add_population(&[herb_entry((3, 3), 200)], &params)
            .unwrap();

        let center = Coord::new(2, 2);
        let allowed: Vec<Coord> = {
            let mut v = center.orthogonal_neighbors(5, 5);
            v.push(center);
            v
        };

        for _ in 0..10 {
            island.migrate(&params, &mut rng);
            assert_eq!(island.num_animals(Species::Herbivore), 200);
            for (coord, cell) in island.cells() {
                if cell.population_count() > 0 {
                    assert!(cell.is_accessible(), "animals landed in water at {coord:?}");
                    // The cross shape keeps every legal destination within
                    // one orthogonal step of the center.
                    assert!(
                        allowed.contains(&coord),
                        "animals reached {coord:?}, outside the cross"
                    );
                }
            }
        }
    }

    #[test]
    fn test_migration_spreads_willing_animals() {
        let mut params = SimParams::default();
        params.herbivore.mu = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut island = Island::from_map(CROSS_MAP).unwrap();
        island
            .add_population(&[herb_entry((3, 3), 200)], &params)
            .unwrap();

        island.migrate(&params, &mut rng);
        // Willing, fit animals should overwhelmingly leave the center.
        let left_behind = island.cell(Coord::new(2, 2)).unwrap().population_count();
        assert!(left_behind < 100, "only {left_behind} of 200 moved");
    }

    #[test]
    fn test_reporting_matrix_and_samples_agree() {
        let params = SimParams::default();
        let mut island = Island::from_map(CROSS_MAP).unwrap();
        island
            .add_population(&[herb_entry((3, 3), 7), herb_entry((2, 3), 4)], &params)
            .unwrap();

        let matrix = island.population_matrix(Species::Herbivore);
        let matrix_total: u32 = matrix.iter().flatten().sum();
        assert_eq!(matrix_total, 11);
        assert_eq!(matrix[2][2], 7);
        assert_eq!(matrix[1][2], 4);

        let samples = island.attribute_samples(Species::Herbivore);
        assert_eq!(samples.fitness.len(), 11);
        assert_eq!(samples.weight.len(), 11);
        assert_eq!(samples.age.len(), 11);
        assert!(samples.fitness.iter().all(|f| (0.0..=1.0).contains(f)));

        assert!(island
            .attribute_samples(Species::Carnivore)
            .fitness
            .is_empty());
    }
}
