//! Simulation and display configuration.
//!
//! Configuration comes from one of the built-in presets or from a TOML file:
//!
//! ```toml
//! [simulation]
//! count = 40
//! speed = 3.0
//! width = 640.0
//!
//! [display]
//! fps = 60.0
//! ```
//!
//! Every field has a default, so a file only needs to name what it changes.
//! Nothing here is trusted until [`SimConfig::validate`] has accepted it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Canvas height fixed by the slide layout.
pub const DEFAULT_HEIGHT: f64 = 300.0;

/// Container width used when the host has not measured one yet.
pub const DEFAULT_WIDTH: f64 = 600.0;

/// Straight (non-premultiplied) RGBA colour.
pub type Rgba = [u8; 4];

const BLUE_400: Rgba = [0x60, 0xa5, 0xfa, 0xff];
const RED_500: Rgba = [0xef, 0x44, 0x44, 0xff];
const BLUE_500: Rgba = [0x3b, 0x82, 0xf6, 0xff];
const SLATE_500: [u8; 3] = [100, 116, 139];

/// Colours used for solvent particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Fill for particles at or below the speed threshold.
    pub slow: Rgba,
    /// Fill for particles above the speed threshold.
    pub fast: Rgba,
    /// One-pixel outline; `None` or a fully transparent colour draws none.
    pub outline: Option<Rgba>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            slow: BLUE_400,
            fast: RED_500,
            outline: Some([255, 255, 255, 51]),
        }
    }
}

impl Palette {
    /// Single translucent slate fill regardless of speed.
    fn slate(alpha: u8) -> Self {
        let [r, g, b] = SLATE_500;
        Self {
            slow: [r, g, b, alpha],
            fast: [r, g, b, alpha],
            outline: None,
        }
    }
}

/// The two tagged tracer particles of the cage-effect scenes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactantConfig {
    /// Radius of both reactants.
    pub radius: f64,
    /// Horizontal distance of each reactant from the canvas centre.
    pub offset: f64,
    /// Fill of reactant A (placed left of centre).
    pub color_a: Rgba,
    /// Fill of reactant B (placed right of centre).
    pub color_b: Rgba,
}

impl Default for ReactantConfig {
    fn default() -> Self {
        Self {
            radius: 6.0,
            offset: 20.0,
            color_a: RED_500,
            color_b: BLUE_500,
        }
    }
}

/// Parameters one simulation is seeded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of solvent particles (>= 1).
    pub count: usize,
    /// Initial speed magnitude, in units per frame (finite, >= 0).
    pub speed: f64,
    /// Radius of every solvent particle (> 0).
    pub radius: f64,
    /// Mass of every particle (> 0).
    pub mass: f64,
    /// World width; must fit a particle diameter.
    pub width: f64,
    /// World height; must fit a particle diameter.
    pub height: f64,
    /// Speeds strictly above this are classified as fast.
    pub fast_threshold: f64,
    /// Resolve pairwise collisions each step.
    pub collisions: bool,
    /// Solvent colours.
    pub palette: Palette,
    /// Optional reactant pair added on top of `count`.
    pub reactants: Option<ReactantConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::collision_demo(DEFAULT_WIDTH)
    }
}

impl SimConfig {
    /// Speed-coloured collision demo: every particle collides with every other.
    pub fn collision_demo(width: f64) -> Self {
        Self {
            count: 30,
            speed: 3.0,
            radius: 5.0,
            mass: 1.0,
            width,
            height: DEFAULT_HEIGHT,
            fast_threshold: 4.0,
            collisions: true,
            palette: Palette::default(),
            reactants: None,
        }
    }

    /// Cage effect, gas phase: sparse, fast, particles pass through each other.
    pub fn cage_gas(width: f64) -> Self {
        Self {
            count: 50,
            speed: 3.0,
            radius: 4.0,
            collisions: false,
            palette: Palette::slate(26),
            reactants: Some(ReactantConfig::default()),
            ..Self::collision_demo(width)
        }
    }

    /// Cage effect, liquid phase: dense, slow, full pairwise collision.
    pub fn cage_liquid(width: f64) -> Self {
        Self {
            count: 300,
            speed: 0.5,
            radius: 6.0,
            collisions: true,
            palette: Palette::slate(77),
            reactants: Some(ReactantConfig {
                radius: 8.0,
                ..ReactantConfig::default()
            }),
            ..Self::collision_demo(width)
        }
    }

    /// Check every parameter; callers run this before touching live state.
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::InvalidParam("count must be > 0".into()));
        }
        validate_speed(self.speed)?;
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidParam("radius must be finite and > 0".into()));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::InvalidParam("mass must be finite and > 0".into()));
        }
        if !self.fast_threshold.is_finite() || self.fast_threshold < 0.0 {
            return Err(Error::InvalidParam(
                "fast_threshold must be finite and >= 0".into(),
            ));
        }
        let mut largest = self.radius;
        if let Some(re) = &self.reactants {
            if !re.radius.is_finite() || re.radius <= 0.0 {
                return Err(Error::InvalidParam(
                    "reactant radius must be finite and > 0".into(),
                ));
            }
            if !re.offset.is_finite() {
                return Err(Error::InvalidParam("reactant offset must be finite".into()));
            }
            largest = largest.max(re.radius);
        }
        validate_bounds(self.width, self.height, largest)
    }

    /// Copy of this config with new bounds.
    pub fn with_bounds(&self, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..self.clone()
        }
    }
}

/// Speeds must be finite and non-negative.
pub(crate) fn validate_speed(speed: f64) -> Result<()> {
    if !speed.is_finite() || speed < 0.0 {
        return Err(Error::InvalidParam(format!(
            "speed must be finite and >= 0, got {speed}"
        )));
    }
    Ok(())
}

fn validate_bounds(width: f64, height: f64, radius: f64) -> Result<()> {
    for (name, extent) in [("width", width), ("height", height)] {
        if !extent.is_finite() || extent <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "{name} must be finite and > 0, got {extent}"
            )));
        }
        if extent < 2.0 * radius {
            return Err(Error::InvalidParam(format!(
                "{name} {extent} cannot fit a particle of radius {radius}"
            )));
        }
    }
    Ok(())
}

/// Frame pacing and surface clearing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target ticks per second of the frame loop.
    pub fps: f64,
    /// Colour the surface is cleared to before each frame.
    pub background: Rgba,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: 60.0,
            background: [0, 0, 0, 0],
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<()> {
        self.frame_interval().map(|_| ())
    }

    /// Time budget of one tick at the target frame rate.
    ///
    /// Fails when `fps` is not a positive number or is so small that the
    /// interval does not fit a [`Duration`].
    pub fn frame_interval(&self) -> Result<Duration> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "fps must be finite and > 0, got {}",
                self.fps
            )));
        }
        Duration::try_from_secs_f64(1.0 / self.fps).map_err(|e| {
            Error::InvalidParam(format!("fps {} gives no usable frame interval: {e}", self.fps))
        })
    }
}

/// Top-level config file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.simulation.validate()?;
        config.display.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }
}
