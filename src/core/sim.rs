use crate::config::{validate_speed, SimConfig};
use crate::core::collision::resolve_pair;
use crate::core::particle::{Kind, Reactant, SpeedClass, DIM};
use crate::core::Particle;
use crate::error::Result;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::TAU;

/// Simulation domain: a fixed-timestep 2D box `[0, width] x [0, height]` with
/// reflecting walls.
///
/// One call to [`Simulation::step`] is one frame: every particle moves by its
/// velocity, bounces off the walls, and then every overlapping pair is resolved
/// as an elastic collision. Pairs are visited in collection order (`i < j`) and
/// resolved sequentially, so a particle touching several others is resolved
/// against each partner using the state left by the previous pair.
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    pub particles: Vec<Particle>,
    rng: StdRng,
    frame: u64,
}

impl Simulation {
    /// Create a new simulation seeded from `config`.
    ///
    /// `seed` makes placement and headings reproducible; `None` draws a seed
    /// from the thread RNG. The same RNG is reused by later re-seeds.
    pub fn new(config: SimConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };
        let particles = spawn(&config, &mut rng)?;
        log::info!(
            "seeded {} particles in {}x{} at speed {}",
            particles.len(),
            config.width,
            config.height,
            config.speed
        );
        Ok(Self {
            config,
            particles,
            rng,
            frame: 0,
        })
    }

    /// Replace the whole particle collection with `count` fresh particles of
    /// magnitude `speed` inside `width x height`.
    ///
    /// Everything is validated first; on error the current state is untouched.
    pub fn initialize(&mut self, count: usize, speed: f64, width: f64, height: f64) -> Result<()> {
        let config = SimConfig {
            count,
            speed,
            width,
            height,
            ..self.config.clone()
        };
        self.reseed_with(config)
    }

    /// Re-seed with a new particle count, keeping speed and bounds.
    pub fn reseed(&mut self, count: usize) -> Result<()> {
        self.initialize(count, self.config.speed, self.config.width, self.config.height)
    }

    /// Re-seed into new bounds; current particles are discarded.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        self.initialize(self.config.count, self.config.speed, width, height)
    }

    /// Re-seed from a complete configuration (e.g. switching presets).
    pub fn reseed_with(&mut self, config: SimConfig) -> Result<()> {
        config.validate()?;
        let particles = spawn(&config, &mut self.rng)?;
        log::info!(
            "re-seeded {} particles in {}x{} at speed {}",
            particles.len(),
            config.width,
            config.height,
            config.speed
        );
        self.particles = particles;
        self.config = config;
        self.frame = 0;
        Ok(())
    }

    /// Rescale every velocity to magnitude `speed`, keeping its direction.
    ///
    /// A particle at rest has no direction; it is sent along +x.
    pub fn reconfigure_speed(&mut self, speed: f64) -> Result<()> {
        validate_speed(speed)?;
        let threshold = self.config.fast_threshold;
        for p in &mut self.particles {
            let mag = p.speed();
            if mag > 0.0 {
                p.v = [p.v[0] / mag * speed, p.v[1] / mag * speed];
            } else {
                p.v = [speed, 0.0];
            }
            p.reclassify(threshold);
        }
        log::debug!("speed {} -> {}", self.config.speed, speed);
        self.config.speed = speed;
        Ok(())
    }

    /// Advance one frame: integrate and bounce, then resolve collisions.
    pub fn step(&mut self) {
        self.integrate();
        if self.config.collisions {
            self.resolve_collisions();
        }
        self.frame += 1;
    }

    /// Configuration the current particle set was seeded from.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// World bounds `[width, height]`.
    pub fn bounds(&self) -> [f64; DIM] {
        [self.config.width, self.config.height]
    }

    /// Configured speed magnitude.
    pub fn speed(&self) -> f64 {
        self.config.speed
    }

    /// Number of particles, reactants included.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Frames stepped since the last (re-)seed.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.r).collect()
    }

    /// Velocities as a Vec of fixed-size arrays.
    pub fn velocities(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.v).collect()
    }

    /// Compute total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Share of particles currently classified as fast.
    pub fn fast_fraction(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        let fast = self
            .particles
            .iter()
            .filter(|p| p.class == SpeedClass::Fast)
            .count();
        fast as f64 / self.particles.len() as f64
    }

    // ============ Internal helpers ============

    fn integrate(&mut self) {
        let extent = self.bounds();
        let threshold = self.config.fast_threshold;
        for p in &mut self.particles {
            let radius = p.radius();
            for k in 0..DIM {
                p.r[k] += p.v[k];
                if p.r[k] - radius < 0.0 || p.r[k] + radius > extent[k] {
                    p.v[k] = -p.v[k];
                }
            }
            contain(p, extent);
            p.reclassify(threshold);
        }
    }

    fn resolve_collisions(&mut self) {
        let extent = self.bounds();
        let n = self.particles.len();
        for i in 0..n {
            let (head, tail) = self.particles.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                if resolve_pair(a, b) {
                    contain(a, extent);
                    contain(b, extent);
                }
            }
        }
    }
}

// ============ Utility helpers ============

/// Clamp a particle's centre into `[radius, extent - radius]` on both axes.
#[inline]
fn contain(p: &mut Particle, extent: [f64; DIM]) {
    let radius = p.radius();
    for (rk, &l) in p.r.iter_mut().zip(extent.iter()) {
        *rk = rk.clamp(radius, l - radius);
    }
}

fn heading(rng: &mut StdRng, speed: f64) -> [f64; DIM] {
    let (sin, cos) = rng.random_range(0.0..TAU).sin_cos();
    [cos * speed, sin * speed]
}

/// Uniform placement in `[radius, L - radius]` per axis, uniform heading.
/// Spawned particles may overlap; ordinary collision resolution separates them.
fn spawn(config: &SimConfig, rng: &mut StdRng) -> Result<Vec<Particle>> {
    let extent = [config.width, config.height];
    let extra = if config.reactants.is_some() { 2 } else { 0 };
    let mut particles = Vec::with_capacity(config.count + extra);

    for _ in 0..config.count {
        let mut r = [0.0_f64; DIM];
        for (r_k, &l) in r.iter_mut().zip(extent.iter()) {
            *r_k = rng.random_range(config.radius..=l - config.radius);
        }
        let v = heading(rng, config.speed);
        let mut p = Particle::new(r, v, config.radius, config.mass)?;
        p.reclassify(config.fast_threshold);
        particles.push(p);
    }

    if let Some(re) = &config.reactants {
        let centre = [config.width / 2.0, config.height / 2.0];
        for (tag, dx) in [(Reactant::A, -re.offset), (Reactant::B, re.offset)] {
            let v = heading(rng, config.speed);
            let mut p = Particle::new([centre[0] + dx, centre[1]], v, re.radius, config.mass)?
                .with_kind(Kind::Reactant(tag));
            contain(&mut p, extent);
            p.reclassify(config.fast_threshold);
            particles.push(p);
        }
    }

    Ok(particles)
}
