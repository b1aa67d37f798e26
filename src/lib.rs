//! 2D elastic particle collision simulator for interactive teaching slides.
//!
//! - [`core::Simulation`] owns the particles and advances them one frame per
//!   `step()`: integration with wall reflection, then sequential pairwise
//!   elastic collision resolution.
//! - [`render::render`] draws a simulation onto any [`render::Surface`];
//!   [`render::PixelSurface`] is the bundled CPU raster.
//! - [`host`] wires controls to a simulation and runs the cancellable frame loop.
//! - With the `python` feature the crate builds a `collisim` extension module.

pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod render;

#[cfg(feature = "python")]
mod python;

pub use crate::config::{Config, DisplayConfig, SimConfig};
pub use crate::core::Simulation;
pub use crate::error::{Error, Result};
