use crate::error::{Error, Result};

/// Fixed spatial dimension (2D).
pub const DIM: usize = 2;

/// Two-level speed classification used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedClass {
    /// Speed at or below the threshold.
    #[default]
    Slow,
    /// Speed strictly above the threshold.
    Fast,
}

impl SpeedClass {
    /// Classify a speed magnitude against `threshold`.
    #[inline]
    pub fn classify(speed: f64, threshold: f64) -> Self {
        if speed > threshold {
            SpeedClass::Fast
        } else {
            SpeedClass::Slow
        }
    }
}

/// Tag carried by the two tracer particles of the cage-effect scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reactant {
    A,
    B,
}

/// What a particle represents in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kind {
    /// Ordinary gas/solvent particle, coloured by speed class.
    #[default]
    Solvent,
    /// Tracer particle drawn in a fixed colour with a heavy outline.
    Reactant(Reactant),
}

/// A circular particle in D=2.
///
/// Fields:
/// - `r`: position [x, y]
/// - `v`: velocity [vx, vy], displacement per frame
/// - `radius`: disc radius (> 0), immutable after construction
/// - `mass`: particle mass (> 0)
/// - `kind`: solvent or tagged reactant
/// - `class`: speed class as of the last integration
#[derive(Debug, Clone)]
pub struct Particle {
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
    radius: f64,
    /// Mass (> 0).
    pub mass: f64,
    /// Scene role.
    pub kind: Kind,
    /// Derived speed class, refreshed every step.
    pub class: SpeedClass,
}

impl Particle {
    /// Create a new particle after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `radius` or `mass` is non-positive or any component is NaN/inf.
    pub fn new(r: [f64; DIM], v: [f64; DIM], radius: f64, mass: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !mass.is_finite() || mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !r.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        Ok(Self {
            r,
            v,
            radius,
            mass,
            kind: Kind::Solvent,
            class: SpeedClass::Slow,
        })
    }

    /// Builder-style kind override.
    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind;
        self
    }

    /// Disc radius.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Speed magnitude |v|.
    #[inline]
    pub fn speed(&self) -> f64 {
        self.v[0].hypot(self.v[1])
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let vsq: f64 = self.v.iter().map(|&c| c * c).sum();
        0.5 * self.mass * vsq
    }

    /// Recompute the derived speed class.
    #[inline]
    pub fn reclassify(&mut self, threshold: f64) {
        self.class = SpeedClass::classify(self.speed(), threshold);
    }

    /// Set velocity (validated as finite).
    pub fn set_velocity(&mut self, v: [f64; DIM]) -> Result<()> {
        if !v.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        self.v = v;
        Ok(())
    }
}
