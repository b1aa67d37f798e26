use numpy::ndarray::{Array2, Array3};
use numpy::{IntoPyArray, PyArray2, PyArray3};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{Config, SimConfig, DEFAULT_HEIGHT};
use crate::core::Simulation;
use crate::render::{render, PixelSurface};

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn preset_config(name: &str, width: f64) -> PyResult<SimConfig> {
    match name {
        "collision" => Ok(SimConfig::collision_demo(width)),
        "gas" => Ok(SimConfig::cage_gas(width)),
        "liquid" => Ok(SimConfig::cage_liquid(width)),
        other => Err(py_err(format!(
            "unknown preset '{other}' (expected collision, gas or liquid)"
        ))),
    }
}

/// Python-facing wrapper around one simulation and its raster surface.
///
/// API:
/// - __new__(preset="collision", width=600.0, height=300.0, count=None, speed=None, seed=None)
/// - step(frames=1)
/// - set_count(n) / set_speed(s) / resize(width, height)
/// - render() -> np.ndarray, shape (H, W, 4), dtype=uint8
/// - get_positions() / get_velocities() -> np.ndarray, shape (N, 2)
#[pyclass]
pub struct CollisionSim {
    sim: Simulation,
    surface: PixelSurface,
    background: [u8; 4],
}

#[pymethods]
impl CollisionSim {
    /// Seed a simulation from a named preset, optionally overriding count and speed.
    ///
    /// Errors: raises ValueError on an unknown preset or invalid parameters.
    #[new]
    #[pyo3(signature = (preset="collision", width=600.0, height=DEFAULT_HEIGHT, count=None, speed=None, seed=None))]
    fn new(
        preset: &str,
        width: f64,
        height: f64,
        count: Option<usize>,
        speed: Option<f64>,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let mut config = preset_config(preset, width)?.with_bounds(width, height);
        if let Some(n) = count {
            config.count = n;
        }
        if let Some(s) = speed {
            config.speed = s;
        }
        let config = Config {
            simulation: config,
            ..Config::default()
        };
        Self::build(config, seed)
    }

    /// Build from a TOML config file.
    #[staticmethod]
    #[pyo3(signature = (path, seed=None))]
    fn from_config(path: &str, seed: Option<u64>) -> PyResult<Self> {
        let config = Config::load(path).map_err(py_err)?;
        Self::build(config, seed)
    }

    /// Advance `frames` frames (releases the GIL during computation).
    #[pyo3(signature = (frames=1))]
    fn step(&mut self, py: Python<'_>, frames: usize) {
        let sim = &mut self.sim;
        py.detach(|| {
            for _ in 0..frames {
                sim.step();
            }
        })
    }

    /// Re-seed with `count` particles.
    fn set_count(&mut self, count: usize) -> PyResult<()> {
        self.sim.reseed(count).map_err(py_err)
    }

    /// Rescale all velocities to `speed`, keeping directions.
    fn set_speed(&mut self, speed: f64) -> PyResult<()> {
        self.sim.reconfigure_speed(speed).map_err(py_err)
    }

    /// Re-seed into new bounds and resize the raster to match.
    fn resize(&mut self, width: f64, height: f64) -> PyResult<()> {
        let surface = PixelSurface::for_bounds([width, height]).map_err(py_err)?;
        self.sim.resize(width, height).map_err(py_err)?;
        self.surface = surface;
        Ok(())
    }

    /// Draw the current state and return it as an (H, W, 4) uint8 array.
    fn render<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyArray3<u8>>> {
        render(&self.sim, &mut self.surface, self.background).map_err(py_err)?;
        let (w, h) = self.surface.image().dimensions();
        let shape = (h as usize, w as usize, 4);
        let arr = Array3::from_shape_vec(shape, self.surface.as_raw().to_vec()).map_err(py_err)?;
        Ok(arr.into_pyarray(py))
    }

    /// Save the last rendered frame as PNG.
    fn save_png(&self, path: &str) -> PyResult<()> {
        self.surface.save_png(path).map_err(py_err)
    }

    /// Return positions as a NumPy array of shape (N, 2), dtype=float64.
    fn get_positions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        to_array(self.sim.positions()).into_pyarray(py)
    }

    /// Return velocities as a NumPy array of shape (N, 2), dtype=float64.
    fn get_velocities<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        to_array(self.sim.velocities()).into_pyarray(py)
    }

    #[getter]
    fn num_particles(&self) -> usize {
        self.sim.num_particles()
    }

    #[getter]
    fn frame(&self) -> u64 {
        self.sim.frame()
    }

    fn kinetic_energy(&self) -> f64 {
        self.sim.kinetic_energy()
    }

    fn fast_fraction(&self) -> f64 {
        self.sim.fast_fraction()
    }
}

impl CollisionSim {
    fn build(config: Config, seed: Option<u64>) -> PyResult<Self> {
        config.display.validate().map_err(py_err)?;
        let sim = Simulation::new(config.simulation, seed).map_err(py_err)?;
        let surface = PixelSurface::for_bounds(sim.bounds()).map_err(py_err)?;
        Ok(Self {
            sim,
            surface,
            background: config.display.background,
        })
    }
}

fn to_array(rows: Vec<[f64; 2]>) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((rows.len(), 2));
    for (i, row) in rows.into_iter().enumerate() {
        arr[[i, 0]] = row[0];
        arr[[i, 1]] = row[1];
    }
    arr
}

/// The collisim Python module entry point.
#[pymodule]
fn collisim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<CollisionSim>()?;
    Ok(())
}
