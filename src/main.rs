//! collisim CLI - run a collision scene headless and export the last frame

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use collisim::config::{Config, SimConfig, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use collisim::host::{self, Animation, SimHandle};
use collisim::render::PixelSurface;
use collisim::Simulation;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Speed-coloured collision demo
    Collision,
    /// Cage effect, gas phase
    Gas,
    /// Cage effect, liquid phase
    Liquid,
}

#[derive(Parser)]
#[command(name = "collisim")]
#[command(about = "2D elastic particle collision simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file (overrides the preset)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in scene
    #[arg(long, value_enum, default_value = "collision")]
    preset: Preset,

    /// Canvas width
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: f64,

    /// Canvas height
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: f64,

    /// Particle count override
    #[arg(long)]
    count: Option<usize>,

    /// Speed override
    #[arg(long)]
    speed: Option<f64>,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Frames to simulate headless
    #[arg(long, default_value_t = 300)]
    frames: u64,

    /// Run the real-time frame loop for this many seconds instead of a fixed frame count
    #[arg(long)]
    realtime: Option<f64>,

    /// Where to write the final frame
    #[arg(long, short, default_value = "frame.png")]
    output: PathBuf,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let sim = match cli.preset {
                Preset::Collision => SimConfig::collision_demo(cli.width),
                Preset::Gas => SimConfig::cage_gas(cli.width),
                Preset::Liquid => SimConfig::cage_liquid(cli.width),
            };
            Config {
                simulation: sim.with_bounds(cli.width, cli.height),
                ..Config::default()
            }
        }
    };
    if let Some(count) = cli.count {
        config.simulation.count = count;
    }
    if let Some(speed) = cli.speed {
        config.simulation.speed = speed;
    }
    config
        .simulation
        .validate()
        .context("Invalid simulation parameters")?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let sim = Simulation::new(config.simulation.clone(), cli.seed)
        .context("Failed to seed simulation")?;
    let surface = PixelSurface::for_bounds(sim.bounds())?;
    let handle = SimHandle::new(sim);
    let e0 = handle.with(|s| s.kinetic_energy())?;
    let mut animation = Animation::new(handle.clone(), surface, config.display.background);

    match cli.realtime {
        Some(secs) => {
            if !(secs.is_finite() && secs > 0.0) {
                anyhow::bail!("--realtime must be a positive number of seconds");
            }
            let run_for = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("--realtime {secs} is out of range"))?;
            let interval = config
                .display
                .frame_interval()
                .context("Invalid display settings")?;
            let running = host::start(animation, interval)?;
            std::thread::sleep(run_for);
            animation = running.stop().context("Frame loop did not shut down cleanly")?;
        }
        None => {
            for _ in 0..cli.frames {
                animation.tick().context("Render failed")?;
            }
        }
    }
    if animation.ticks() == 0 {
        animation.redraw().context("Render failed")?;
    }

    let (frames, particles, e1, fast) = handle.with(|s| {
        (s.frame(), s.num_particles(), s.kinetic_energy(), s.fast_fraction())
    })?;
    log::info!("kinetic energy {e0:.3} -> {e1:.3}, {:.0}% fast", fast * 100.0);

    animation
        .surface()
        .save_png(&cli.output)
        .with_context(|| format!("Failed to save {}", cli.output.display()))?;
    println!(
        "Simulated {} frames of {} particles, wrote {}",
        frames,
        particles,
        cli.output.display()
    );
    Ok(())
}
