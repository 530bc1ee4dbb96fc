//! Parameter tables for species and terrain.
//!
//! Parameter tables are explicit configuration state owned by the
//! simulation and passed by reference into every life-cycle computation.
//! All animals of a species share one live table, so an update takes
//! effect for every subsequent computation.

use crate::error::{Error, Result};
use crate::types::{Species, Terrain};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Life-cycle parameters for one species.
///
/// Updates arrive as name/value batches through [`SpeciesParams::apply`];
/// the legal names are the fields below, with `F` for the satiation quota
/// and `DeltaPhiMax` legal only for the predator species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    /// Mean of the Gaussian birth-weight distribution.
    pub w_birth: f64,
    /// Standard deviation of the birth-weight distribution.
    pub sigma_birth: f64,
    /// Weight gained per unit of food consumed.
    pub beta: f64,
    /// Annual metabolic weight-loss fraction, in [0, 1].
    pub eta: f64,
    /// Age at which the age sigmoid crosses one half.
    pub a_half: f64,
    /// Steepness of the age sigmoid.
    pub phi_age: f64,
    /// Weight at which the weight sigmoid crosses one half.
    pub w_half: f64,
    /// Steepness of the weight sigmoid.
    pub phi_weight: f64,
    /// Migration propensity; move probability is `mu * fitness`.
    pub mu: f64,
    /// Birth propensity; see [`SpeciesParams::apply`] for bounds.
    pub gamma: f64,
    /// Minimum-weight factor for giving birth.
    pub zeta: f64,
    /// Fraction of newborn weight lost by the parent at birth.
    pub xi: f64,
    /// Death propensity; death probability is `omega * (1 - fitness)`.
    pub omega: f64,
    /// Satiation quota: maximum food mass consumed in one feeding phase.
    pub f: f64,
    /// Fitness gap beyond which a predator kills with certainty.
    /// `None` for species that do not hunt.
    pub delta_phi_max: Option<f64>,
}

impl SpeciesParams {
    /// Default herbivore table.
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            f: 10.0,
            delta_phi_max: None,
        }
    }

    /// Default carnivore table.
    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            f: 50.0,
            delta_phi_max: Some(10.0),
        }
    }

    /// Apply a batch of named updates.
    ///
    /// The whole batch is validated before any value is written, so a
    /// failing key leaves the table unmodified. Values must be finite and
    /// non-negative; `w_birth` must be nonzero and `eta` at most 1.
    pub fn apply(&mut self, updates: &HashMap<String, f64>) -> Result<()> {
        for (name, &value) in updates {
            self.validate(name, value)?;
        }
        for (name, &value) in updates {
            self.set(name, value);
        }
        Ok(())
    }

    fn validate(&self, name: &str, value: f64) -> Result<()> {
        if !self.is_legal_name(name) {
            return Err(Error::InvalidParameter(format!(
                "unknown parameter name '{name}'"
            )));
        }
        if !value.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "'{name}' must be a finite number"
            )));
        }
        if value < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "'{name}' must be non-negative"
            )));
        }
        if name == "w_birth" && value == 0.0 {
            return Err(Error::InvalidParameter(
                "'w_birth' cannot be zero".to_string(),
            ));
        }
        if name == "eta" && value > 1.0 {
            return Err(Error::InvalidParameter(
                "'eta' must be in the interval [0, 1]".to_string(),
            ));
        }
        Ok(())
    }

    fn is_legal_name(&self, name: &str) -> bool {
        matches!(
            name,
            "w_birth"
                | "sigma_birth"
                | "beta"
                | "eta"
                | "a_half"
                | "phi_age"
                | "w_half"
                | "phi_weight"
                | "mu"
                | "gamma"
                | "zeta"
                | "xi"
                | "omega"
                | "F"
        ) || (name == "DeltaPhiMax" && self.delta_phi_max.is_some())
    }

    fn set(&mut self, name: &str, value: f64) {
        match name {
            "w_birth" => self.w_birth = value,
            "sigma_birth" => self.sigma_birth = value,
            "beta" => self.beta = value,
            "eta" => self.eta = value,
            "a_half" => self.a_half = value,
            "phi_age" => self.phi_age = value,
            "w_half" => self.w_half = value,
            "phi_weight" => self.phi_weight = value,
            "mu" => self.mu = value,
            "gamma" => self.gamma = value,
            "zeta" => self.zeta = value,
            "xi" => self.xi = value,
            "omega" => self.omega = value,
            "F" => self.f = value,
            "DeltaPhiMax" => self.delta_phi_max = Some(value),
            _ => {}
        }
    }
}

/// Fodder ceilings per terrain kind. Water carries no fodder and its
/// ceiling cannot be changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainTable {
    pub lowland_f_max: f64,
    pub highland_f_max: f64,
    pub desert_f_max: f64,
}

impl Default for TerrainTable {
    fn default() -> Self {
        Self {
            lowland_f_max: 800.0,
            highland_f_max: 300.0,
            desert_f_max: 0.0,
        }
    }
}

impl TerrainTable {
    /// Fodder ceiling for a terrain kind. Always 0 for Water.
    pub fn f_max(&self, terrain: Terrain) -> f64 {
        match terrain {
            Terrain::Lowland => self.lowland_f_max,
            Terrain::Highland => self.highland_f_max,
            Terrain::Desert => self.desert_f_max,
            Terrain::Water => 0.0,
        }
    }

    /// Apply a batch of named updates for one terrain kind. Only `f_max`
    /// is legal; the batch is validated before any value is written.
    pub fn apply(&mut self, terrain: Terrain, updates: &HashMap<String, f64>) -> Result<()> {
        if terrain == Terrain::Water {
            return Err(Error::InvalidParameter(
                "Water has no fodder parameters".to_string(),
            ));
        }
        for (name, &value) in updates {
            if name != "f_max" {
                return Err(Error::InvalidParameter(format!(
                    "unknown parameter name '{name}', the only terrain parameter is 'f_max'"
                )));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidParameter(
                    "'f_max' must be a non-negative finite number".to_string(),
                ));
            }
        }
        if let Some(&value) = updates.get("f_max") {
            match terrain {
                Terrain::Lowland => self.lowland_f_max = value,
                Terrain::Highland => self.highland_f_max = value,
                Terrain::Desert => self.desert_f_max = value,
                Terrain::Water => unreachable!(),
            }
        }
        Ok(())
    }
}

/// All live configuration for one simulation: one table per species plus
/// the terrain fodder ceilings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub terrain: TerrainTable,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            terrain: TerrainTable::default(),
        }
    }
}

impl SimParams {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    pub fn species_mut(&mut self, species: Species) -> &mut SpeciesParams {
        match species {
            Species::Herbivore => &mut self.herbivore,
            Species::Carnivore => &mut self.carnivore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn batch(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_default_tables() {
        let params = SimParams::default();
        assert_eq!(params.herbivore.f, 10.0);
        assert_eq!(params.carnivore.f, 50.0);
        assert_eq!(params.carnivore.delta_phi_max, Some(10.0));
        assert_eq!(params.herbivore.delta_phi_max, None);
        assert_eq!(params.terrain.f_max(Terrain::Lowland), 800.0);
        assert_eq!(params.terrain.f_max(Terrain::Highland), 300.0);
        assert_eq!(params.terrain.f_max(Terrain::Desert), 0.0);
        assert_eq!(params.terrain.f_max(Terrain::Water), 0.0);
    }

    #[test]
    fn test_unknown_parameter_name() {
        let mut p = SpeciesParams::herbivore();
        assert!(p.apply(&batch(&[("bogus", 1.0)])).is_err());
    }

    #[test]
    fn test_negative_value_rejected() {
        let mut p = SpeciesParams::herbivore();
        assert!(p.apply(&batch(&[("beta", -0.1)])).is_err());
        assert!(p.apply(&batch(&[("omega", f64::NAN)])).is_err());
    }

    #[test]
    fn test_species_specific_bounds() {
        let mut p = SpeciesParams::herbivore();
        assert!(p.apply(&batch(&[("w_birth", 0.0)])).is_err());
        assert!(p.apply(&batch(&[("eta", 1.5)])).is_err());
        assert!(p.apply(&batch(&[("eta", 1.0)])).is_ok());
    }

    #[test]
    fn test_delta_phi_max_only_for_predators() {
        let mut herb = SpeciesParams::herbivore();
        assert!(herb.apply(&batch(&[("DeltaPhiMax", 5.0)])).is_err());

        let mut carn = SpeciesParams::carnivore();
        carn.apply(&batch(&[("DeltaPhiMax", 5.0)])).unwrap();
        assert_eq!(carn.delta_phi_max, Some(5.0));
    }

    #[test]
    fn test_batch_is_atomic() {
        let mut p = SpeciesParams::herbivore();
        let before = p.clone();
        let result = p.apply(&batch(&[("beta", 2.0), ("bogus", 1.0)]));
        assert!(result.is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn test_terrain_updates() {
        let mut table = TerrainTable::default();
        table
            .apply(Terrain::Lowland, &batch(&[("f_max", 500.0)]))
            .unwrap();
        assert_eq!(table.f_max(Terrain::Lowland), 500.0);

        assert!(table
            .apply(Terrain::Water, &batch(&[("f_max", 100.0)]))
            .is_err());
        assert!(table
            .apply(Terrain::Desert, &batch(&[("fodder", 100.0)]))
            .is_err());
        assert!(table
            .apply(Terrain::Desert, &batch(&[("f_max", -1.0)]))
            .is_err());
    }

    #[test]
    fn test_params_serialization() {
        let params = SimParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: SimParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }

    proptest! {
        #[test]
        fn legal_updates_always_land(value in 0.0f64..1e6) {
            let mut p = SpeciesParams::carnivore();
            p.apply(&batch(&[("beta", value)])).unwrap();
            prop_assert_eq!(p.beta, value);
        }
    }
}
