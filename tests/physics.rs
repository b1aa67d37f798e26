use collisim::config::{SimConfig, DEFAULT_WIDTH};
use collisim::core::Simulation;
use collisim::error::Result;

const TOL: f64 = 1e-9;

fn demo(count: usize, speed: f64, width: f64, height: f64) -> SimConfig {
    SimConfig {
        count,
        speed,
        ..SimConfig::collision_demo(width)
    }
    .with_bounds(width, height)
}

fn assert_contained(sim: &Simulation) {
    let [w, h] = sim.bounds();
    for (i, p) in sim.particles.iter().enumerate() {
        let r = p.radius();
        assert!(
            p.r[0] >= r && p.r[0] <= w - r && p.r[1] >= r && p.r[1] <= h - r,
            "particle {i} escaped: {:?} (radius {r}, bounds {w}x{h})",
            p.r
        );
    }
}

/// Every particle stays inside the walls after every frame, including a
/// crowded box where separation pushes particles against the walls.
#[test]
fn boundary_containment_over_many_frames() -> Result<()> {
    for (seed, count, speed) in [(1u64, 30usize, 3.0), (2, 120, 6.0), (3, 60, 25.0)] {
        let mut sim = Simulation::new(demo(count, speed, 200.0, 120.0), Some(seed))?;
        assert_contained(&sim);
        for _ in 0..500 {
            sim.step();
            assert_contained(&sim);
        }
    }
    Ok(())
}

#[test]
fn liquid_preset_stays_contained() -> Result<()> {
    let mut sim = Simulation::new(SimConfig::cage_liquid(DEFAULT_WIDTH), Some(44))?;
    for _ in 0..200 {
        sim.step();
    }
    assert_contained(&sim);
    assert_eq!(sim.num_particles(), 302);
    Ok(())
}

/// A particle touching the left wall and moving into it bounces back.
#[test]
fn reflection_at_wall() -> Result<()> {
    let mut sim = Simulation::new(demo(1, 1.0, 100.0, 100.0), Some(9))?;
    sim.particles[0].r = [5.0, 50.0];
    sim.particles[0].v = [-1.0, 0.0];
    sim.step();
    assert_eq!(sim.particles[0].v[0], 1.0);
    assert!(sim.particles[0].r[0] >= 5.0);
    Ok(())
}

/// Equal-mass head-on collision fully exchanges velocities.
#[test]
fn head_on_exchange() -> Result<()> {
    let v = 1.5;
    let mut sim = Simulation::new(demo(2, v, 200.0, 100.0), Some(10))?;
    sim.particles[0].r = [90.0, 50.0];
    sim.particles[0].v = [v, 0.0];
    sim.particles[1].r = [98.0, 50.0];
    sim.particles[1].v = [-v, 0.0];
    sim.step();
    let (a, b) = (&sim.particles[0], &sim.particles[1]);
    assert!((a.v[0] + v).abs() < TOL && a.v[1].abs() < TOL, "a.v = {:?}", a.v);
    assert!((b.v[0] - v).abs() < TOL && b.v[1].abs() < TOL, "b.v = {:?}", b.v);
    Ok(())
}

/// Collisions only redistribute kinetic energy, and with walls that merely
/// flip signs the total is conserved frame after frame.
#[test]
fn total_energy_conserved() -> Result<()> {
    let mut sim = Simulation::new(demo(80, 3.0, 300.0, 200.0), Some(12345))?;
    let e0 = sim.kinetic_energy();
    for _ in 0..400 {
        sim.step();
    }
    let e1 = sim.kinetic_energy();
    let rel = ((e1 - e0) / e0).abs();
    assert!(rel < 1e-9, "relative energy drift {rel} (E0={e0}, E1={e1})");
    Ok(())
}

/// A lone overlapping pair in open space is fully separated in one frame.
#[test]
fn no_sustained_overlap_for_resolved_pair() -> Result<()> {
    let mut sim = Simulation::new(demo(2, 0.0, 200.0, 200.0), Some(13))?;
    sim.particles[0].r = [100.0, 100.0];
    sim.particles[0].v = [0.3, 0.1];
    sim.particles[1].r = [103.0, 104.0];
    sim.particles[1].v = [-0.2, -0.4];
    sim.step();
    let (a, b) = (&sim.particles[0], &sim.particles[1]);
    let d = (b.r[0] - a.r[0]).hypot(b.r[1] - a.r[1]);
    assert!(d >= a.radius() + b.radius() - TOL, "distance {d}");
    Ok(())
}

#[test]
fn reseed_yields_requested_count() -> Result<()> {
    let mut sim = Simulation::new(demo(10, 2.0, 400.0, 300.0), Some(14))?;
    for n in [1usize, 7, 64, 200] {
        sim.reseed(n)?;
        assert_eq!(sim.num_particles(), n);
        sim.reconfigure_speed(5.0)?;
        assert_eq!(sim.num_particles(), n);
    }
    Ok(())
}

#[test]
fn speed_rescale_preserves_direction() -> Result<()> {
    let mut sim = Simulation::new(demo(50, 2.0, 400.0, 300.0), Some(15))?;
    for _ in 0..20 {
        sim.step();
    }
    let headings: Vec<f64> = sim.particles.iter().map(|p| p.v[1].atan2(p.v[0])).collect();
    sim.reconfigure_speed(7.5)?;
    for (p, before) in sim.particles.iter().zip(headings) {
        assert!((p.v[1].atan2(p.v[0]) - before).abs() < TOL);
        assert!((p.speed() - 7.5).abs() < TOL);
    }
    Ok(())
}

/// Pair order is fixed by collection order, so identical seeds replay identically.
#[test]
fn runs_are_reproducible() -> Result<()> {
    let config = demo(40, 4.0, 150.0, 150.0);
    let mut a = Simulation::new(config.clone(), Some(77))?;
    let mut b = Simulation::new(config, Some(77))?;
    for _ in 0..250 {
        a.step();
        b.step();
    }
    assert_eq!(a.positions(), b.positions());
    assert_eq!(a.velocities(), b.velocities());
    Ok(())
}
