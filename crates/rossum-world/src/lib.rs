//! Population-dynamics engine for the Rossum island ecosystem.
//!
//! Two species live on a bounded, water-bordered grid and evolve through
//! discrete annual cycles of feeding, procreation, migration, aging,
//! weight loss, and death.

pub mod animal;
pub mod cell;
pub mod island;
pub mod simulation;

pub use animal::Animal;
pub use cell::Cell;
pub use island::{AttributeSamples, Island};
pub use simulation::Simulation;
