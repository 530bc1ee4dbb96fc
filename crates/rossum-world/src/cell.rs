//! A habitat cell: terrain, fodder stock, and the two resident
//! populations, with the cell-local annual phases.

use crate::animal::Animal;
use rand::seq::SliceRandom;
use rand::Rng;
use rossum_core::{AnimalSpec, Error, Result, SimParams, Species, Terrain};
use serde::{Deserialize, Serialize};

/// One grid cell. Population order carries no long-term meaning; the
/// feeding phase reshuffles and re-sorts it every cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub terrain: Terrain,
    pub fodder: f64,
    pub herbivores: Vec<Animal>,
    pub carnivores: Vec<Animal>,
}

impl Cell {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            fodder: 0.0,
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn is_accessible(&self) -> bool {
        self.terrain.is_accessible()
    }

    /// Whether the annual phases run here: accessible and inhabited.
    pub fn is_active(&self) -> bool {
        self.is_accessible() && self.population_count() > 0
    }

    pub fn population(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    pub(crate) fn population_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn count(&self, species: Species) -> usize {
        self.population(species).len()
    }

    pub fn population_count(&self) -> usize {
        self.herbivores.len() + self.carnivores.len()
    }

    /// Validate and place a batch of animal records into this cell.
    pub fn place_animals(&mut self, animals: &[AnimalSpec], params: &SimParams) -> Result<()> {
        if !self.is_accessible() {
            return Err(Error::InvalidPlacement(format!(
                "animals cannot be placed on {}",
                self.terrain
            )));
        }
        for spec in animals {
            let species: Species = spec.species.parse()?;
            if !spec.weight.is_finite() || spec.weight <= 0.0 {
                return Err(Error::InvalidPlacement(format!(
                    "{} weight must be positive, got {}",
                    species, spec.weight
                )));
            }
            let animal = Animal::new(species, spec.age, spec.weight, params.species(species));
            self.population_mut(species).push(animal);
        }
        Ok(())
    }

    /// Feeding phase: fodder regrows to the terrain ceiling, herbivores
    /// graze in a freshly shuffled order, then carnivores hunt in
    /// descending fitness order through the herbivores sorted ascending.
    pub fn feed(&mut self, params: &SimParams, rng: &mut impl Rng) {
        self.fodder = params.terrain.f_max(self.terrain);

        let herb_params = params.species(Species::Herbivore);
        self.herbivores.shuffle(rng);
        for herb in &mut self.herbivores {
            self.fodder -= herb.graze(self.fodder, herb_params);
        }

        self.herbivores
            .sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        self.carnivores
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let carn_params = params.species(Species::Carnivore);
        let mut prey = std::mem::take(&mut self.herbivores);
        for carn in &mut self.carnivores {
            prey = carn.hunt(prey, carn_params, rng);
        }
        self.herbivores = prey;
    }

    /// Procreation phase: the per-species head count is captured before
    /// any births, and newborns join the population only after every
    /// existing animal has had its attempt.
    pub fn procreate(&mut self, params: &SimParams, rng: &mut impl Rng) {
        for species in Species::ALL {
            let sp = params.species(species);
            let pop = self.population_mut(species);
            let num_in_cell = pop.len();
            let mut newborns = Vec::new();
            for parent in pop.iter_mut() {
                if let Some(newborn) = parent.give_birth(num_in_cell, sp, rng) {
                    newborns.push(newborn);
                }
            }
            pop.append(&mut newborns);
        }
    }

    /// Aging phase: every animal grows one year older.
    pub fn age_population(&mut self, params: &SimParams) {
        for species in Species::ALL {
            let sp = params.species(species);
            for animal in self.population_mut(species).iter_mut() {
                animal.grow_older(sp);
            }
        }
    }

    /// Weight-loss phase: every animal pays its metabolic cost.
    pub fn lose_weight(&mut self, params: &SimParams) {
        for species in Species::ALL {
            let sp = params.species(species);
            for animal in self.population_mut(species).iter_mut() {
                animal.lose_weight(sp);
            }
        }
    }

    /// Death phase: evaluate every animal and drop the dead.
    pub fn remove_dead(&mut self, params: &SimParams, rng: &mut impl Rng) {
        for species in Species::ALL {
            let sp = params.species(species);
            self.population_mut(species)
                .retain(|animal| !animal.dies(sp, rng));
        }
    }
}
