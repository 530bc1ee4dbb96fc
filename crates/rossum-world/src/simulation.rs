//! Simulation facade: owns the island, the live parameter tables, and the
//! seeded random source, and drives annual cycles.

use crate::island::{AttributeSamples, Island};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rossum_core::{Error, PopulationEntry, Result, SimParams, Species, Terrain};
use std::collections::HashMap;
use tracing::{debug, info};

/// One simulation run. The parameter tables live here and are passed by
/// reference into every life-cycle computation, so an update between
/// cycles takes effect for all existing and future animals.
pub struct Simulation {
    island: Island,
    params: SimParams,
    rng: ChaCha8Rng,
    year: u64,
}

impl Simulation {
    /// Build an island from a terrain map, place the initial population,
    /// and seed the random source.
    pub fn new(map: &str, initial_pop: &[PopulationEntry], seed: u64) -> Result<Self> {
        let params = SimParams::default();
        let mut island = Island::from_map(map)?;
        island.add_population(initial_pop, &params)?;

        Ok(Self {
            island,
            params,
            rng: ChaCha8Rng::seed_from_u64(seed),
            year: 0,
        })
    }

    /// Run the given number of annual cycles.
    pub fn simulate(&mut self, num_years: u64) {
        info!(
            years = num_years,
            start_year = self.year,
            population = self.island.num_animals_total(),
            "starting simulation"
        );

        for _ in 0..num_years {
            self.year += 1;
            self.island.annual_cycle(&self.params, &mut self.rng);

            debug!(
                year = self.year,
                herbivores = self.island.num_animals(Species::Herbivore),
                carnivores = self.island.num_animals(Species::Carnivore),
                "annual cycle complete"
            );
            if self.year % 100 == 0 {
                self.log_population_snapshot();
            }
        }

        self.log_population_snapshot();
    }

    fn log_population_snapshot(&self) {
        info!(
            year = self.year,
            herbivores = self.island.num_animals(Species::Herbivore),
            carnivores = self.island.num_animals(Species::Carnivore),
            "population snapshot"
        );
    }

    /// Years simulated so far.
    pub fn year(&self) -> u64 {
        self.year
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Add more population mid-run, by 1-based location.
    pub fn add_population(&mut self, entries: &[PopulationEntry]) -> Result<()> {
        self.island.add_population(entries, &self.params)
    }

    /// Update the parameter table of one species. The species tag is
    /// case-normalized; the batch is atomic.
    pub fn set_animal_parameters(
        &mut self,
        species: &str,
        updates: &HashMap<String, f64>,
    ) -> Result<()> {
        let species: Species = species.parse()?;
        self.params.species_mut(species).apply(updates)
    }

    /// Update the fodder ceiling of one terrain kind, by map code.
    pub fn set_landscape_parameters(
        &mut self,
        code: char,
        updates: &HashMap<String, f64>,
    ) -> Result<()> {
        let terrain = Terrain::from_code(code)
            .ok_or_else(|| Error::InvalidParameter(format!("unknown terrain code '{code}'")))?;
        self.params.terrain.apply(terrain, updates)
    }

    /// Total animal count on the island.
    pub fn num_animals(&self) -> usize {
        self.island.num_animals_total()
    }

    /// Per-species totals.
    pub fn num_animals_per_species(&self) -> HashMap<Species, usize> {
        Species::ALL
            .into_iter()
            .map(|species| (species, self.island.num_animals(species)))
            .collect()
    }

    /// Per-cell population counts for one species, row-major.
    pub fn population_matrix(&self, species: Species) -> Vec<Vec<u32>> {
        self.island.population_matrix(species)
    }

    /// Flat fitness/weight/age samples for one species.
    pub fn attribute_samples(&self, species: Species) -> AttributeSamples {
        self.island.attribute_samples(species)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rossum_core::AnimalSpec;

    const MAP: &str = "WWWW
                       WLHW
                       WLLW
                       WWWW";

    fn herb_entry(location: (usize, usize), n: usize) -> PopulationEntry {
        PopulationEntry {
            location,
            animals: (0..n)
                .map(|_| AnimalSpec {
                    species: "herbivore".to_string(),
                    age: 5,
                    weight: 20.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_invalid_map_fails_construction() {
        let err = Simulation::new("WWW\nWLW\nWLW", &[], 1);
        assert!(matches!(err, Err(Error::InvalidMap(_))));
    }

    #[test]
    fn test_herbivores_persist_on_lowland() {
        let mut sim = Simulation::new(MAP, &[herb_entry((2, 2), 50)], 123456).unwrap();
        sim.simulate(20);
        assert_eq!(sim.year(), 20);
        assert!(sim.num_animals() > 0, "herbivores went extinct on lowland");
        assert_eq!(
            sim.num_animals_per_species()[&Species::Carnivore],
            0,
            "carnivores appeared from nowhere"
        );
    }

    #[test]
    fn test_same_seed_reproduces_run() {
        let mut a = Simulation::new(MAP, &[herb_entry((2, 2), 30)], 99).unwrap();
        let mut b = Simulation::new(MAP, &[herb_entry((2, 2), 30)], 99).unwrap();
        a.simulate(15);
        b.simulate(15);
        assert_eq!(a.num_animals(), b.num_animals());
        assert_eq!(
            a.population_matrix(Species::Herbivore),
            b.population_matrix(Species::Herbivore)
        );
    }

    #[test]
    fn test_parameter_updates_are_live() {
        let mut sim = Simulation::new(MAP, &[herb_entry((2, 2), 10)], 5).unwrap();
        let updates: HashMap<String, f64> = [("F".to_string(), 25.0)].into_iter().collect();
        sim.set_animal_parameters("HERBIVORE", &updates).unwrap();
        assert_eq!(sim.params().herbivore.f, 25.0);

        let f_max: HashMap<String, f64> = [("f_max".to_string(), 0.0)].into_iter().collect();
        sim.set_landscape_parameters('L', &f_max).unwrap();
        assert_eq!(sim.params().terrain.f_max(Terrain::Lowland), 0.0);

        assert!(sim.set_landscape_parameters('W', &f_max).is_err());
        assert!(sim.set_animal_parameters("Sheep", &updates).is_err());
    }

    #[test]
    fn test_add_population_mid_run() {
        let mut sim = Simulation::new(MAP, &[herb_entry((2, 2), 20)], 11).unwrap();
        sim.simulate(5);

        let carnivores = PopulationEntry {
            location: (3, 2),
            animals: (0..4)
                .map(|_| AnimalSpec {
                    species: "Carnivore".to_string(),
                    age: 3,
                    weight: 30.0,
                })
                .collect(),
        };
        sim.add_population(&[carnivores]).unwrap();
        assert_eq!(sim.num_animals_per_species()[&Species::Carnivore], 4);

        sim.simulate(5);
        assert_eq!(sim.year(), 10);
    }

    #[test]
    fn test_reporting_surface_is_consistent() {
        let mut sim = Simulation::new(MAP, &[herb_entry((2, 2), 25)], 17).unwrap();
        sim.simulate(10);

        let herb_total = sim.num_animals_per_species()[&Species::Herbivore];
        let matrix_total: u32 = sim
            .population_matrix(Species::Herbivore)
            .iter()
            .flatten()
            .sum();
        assert_eq!(matrix_total as usize, herb_total);

        let samples = sim.attribute_samples(Species::Herbivore);
        assert_eq!(samples.fitness.len(), herb_total);
        assert!(samples.fitness.iter().all(|f| (0.0..=1.0).contains(f)));
        assert_eq!(sim.num_animals(), herb_total);
    }
}
