//! Core simulation data structures for the collision simulator.
//!
//! `Simulation` owns the particle set and advances it one frame per `step()`;
//! `collision` holds the pairwise elastic resolution it applies.

pub mod collision;
pub mod particle;
pub mod sim;

pub use particle::{Kind, Particle, Reactant, SpeedClass};
pub use sim::Simulation;
