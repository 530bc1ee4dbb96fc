//! A single animal: age, weight, derived fitness, and the probabilistic
//! life-cycle operations driven by its species parameter table.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use rossum_core::{Species, SpeciesParams};
use serde::{Deserialize, Serialize};

/// One organism. Fitness is derived from age and weight and recomputed
/// immediately after every mutation of either; it is 0 whenever the
/// weight is 0 or below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animal {
    pub species: Species,
    pub age: u32,
    pub weight: f64,
    pub fitness: f64,
    /// Set when the animal moves during a migration phase; reset at the
    /// end of the phase so each animal moves at most once per cycle.
    pub(crate) migrated: bool,
}

impl Animal {
    pub fn new(species: Species, age: u32, weight: f64, params: &SpeciesParams) -> Self {
        Self {
            species,
            age,
            weight,
            fitness: compute_fitness(age, weight, params),
            migrated: false,
        }
    }

    /// A newborn: age 0, weight drawn from the species birth-weight
    /// Gaussian.
    pub fn newborn(species: Species, params: &SpeciesParams, rng: &mut impl Rng) -> Self {
        let weight = match Normal::new(params.w_birth, params.sigma_birth) {
            Ok(dist) => dist.sample(rng),
            // sigma_birth is validated non-negative, so this only guards
            // against a non-finite table; fall back to the mean.
            Err(_) => params.w_birth,
        };
        Self::new(species, 0, weight, params)
    }

    /// Recompute the cached fitness from current age and weight.
    pub fn update_fitness(&mut self, params: &SpeciesParams) {
        self.fitness = compute_fitness(self.age, self.weight, params);
    }

    /// Age by one year.
    pub fn grow_older(&mut self, params: &SpeciesParams) {
        self.age += 1;
        self.update_fitness(params);
    }

    /// Annual metabolic weight loss: `weight -= eta * weight`.
    pub fn lose_weight(&mut self, params: &SpeciesParams) {
        self.weight -= params.eta * self.weight;
        self.update_fitness(params);
    }

    /// Gain weight from consumed food: `weight += beta * consumed`.
    pub fn gain_weight(&mut self, consumed: f64, params: &SpeciesParams) {
        self.weight += params.beta * consumed;
        self.update_fitness(params);
    }

    /// Whether the animal dies this year. Certain at zero or negative
    /// weight, otherwise a draw against `omega * (1 - fitness)`.
    pub fn dies(&self, params: &SpeciesParams, rng: &mut impl Rng) -> bool {
        if self.weight <= 0.0 {
            return true;
        }
        rng.gen::<f64>() < params.omega * (1.0 - self.fitness)
    }

    /// Whether the animal wants to migrate this year, with probability
    /// `mu * fitness`. Pure predicate; the island applies the move.
    pub fn wants_to_migrate(&self, params: &SpeciesParams, rng: &mut impl Rng) -> bool {
        rng.gen::<f64>() < params.mu * self.fitness
    }

    /// Attempt to give birth, given the number of same-species animals in
    /// the cell (captured before any births this cycle).
    ///
    /// A successful birth costs the parent `xi * newborn.weight`; if that
    /// loss would reach the parent's own weight, or the drawn newborn
    /// weight is not positive, the birth is abandoned and the parent is
    /// left untouched.
    pub fn give_birth(
        &mut self,
        num_in_cell: usize,
        params: &SpeciesParams,
        rng: &mut impl Rng,
    ) -> Option<Animal> {
        if num_in_cell < 2 {
            return None;
        }
        if self.weight < params.zeta * (params.w_birth + params.sigma_birth) {
            return None;
        }
        let p = (params.gamma * self.fitness * (num_in_cell - 1) as f64).min(1.0);
        if rng.gen::<f64>() >= p {
            return None;
        }

        let newborn = Animal::newborn(self.species, params, rng);
        let loss = params.xi * newborn.weight;
        if loss < self.weight && newborn.weight > 0.0 {
            self.weight -= loss;
            self.update_fitness(params);
            Some(newborn)
        } else {
            None
        }
    }

    /// Graze on the cell's fodder: consume up to the satiation quota `F`,
    /// or whatever remains. Returns the amount consumed; 0 if the cell is
    /// bare, in which case nothing is mutated.
    pub fn graze(&mut self, available_fodder: f64, params: &SpeciesParams) -> f64 {
        if available_fodder <= 0.0 {
            return 0.0;
        }
        let consumed = available_fodder.min(params.f);
        self.gain_weight(consumed, params);
        consumed
    }

    /// Hunt through a prey list sorted ascending by fitness, returning the
    /// survivors.
    ///
    /// The ascending sort is load-bearing: once this predator fails the
    /// fitness comparison against one prey it fails against all remaining
    /// prey, so the scan stops there. A fitness gap of `delta_phi_max` or
    /// more kills outright without a draw; such a kill does not count
    /// toward satiation and adds no weight. A partial bite that would
    /// exceed the quota gains exactly the remainder and ends the hunt,
    /// with the bitten prey dead.
    pub fn hunt(
        &mut self,
        prey: Vec<Animal>,
        params: &SpeciesParams,
        rng: &mut impl Rng,
    ) -> Vec<Animal> {
        let Some(delta_phi_max) = params.delta_phi_max else {
            return prey;
        };

        let mut eaten = 0.0;
        let mut survivors = Vec::with_capacity(prey.len());
        let mut remaining = prey.into_iter();

        while let Some(victim) = remaining.next() {
            if self.fitness <= victim.fitness {
                survivors.push(victim);
                survivors.extend(remaining);
                return survivors;
            }

            let gap = self.fitness - victim.fitness;
            if gap < delta_phi_max {
                let p = gap / delta_phi_max;
                if rng.gen::<f64>() < p && eaten < params.f {
                    if eaten + victim.weight < params.f {
                        self.gain_weight(victim.weight, params);
                        eaten += victim.weight;
                    } else {
                        self.gain_weight(params.f - eaten, params);
                        survivors.extend(remaining);
                        return survivors;
                    }
                } else {
                    survivors.push(victim);
                }
            }
            // gap >= delta_phi_max: certain kill, victim dropped.
        }

        survivors
    }
}

fn compute_fitness(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    let age_term = 1.0 / (1.0 + (params.phi_age * (age as f64 - params.a_half)).exp());
    let weight_term = 1.0 / (1.0 + (-params.phi_weight * (weight - params.w_half)).exp());
    age_term * weight_term
}
