//! Drawing the simulation onto a 2D surface.
//!
//! [`render`] is a pure function of the simulation state: it clears the
//! surface and draws every particle as a filled disc with an optional outline.
//! It never mutates the simulation and can be called any number of times
//! between steps.

mod raster;

pub use raster::PixelSurface;

use crate::config::{ReactantConfig, Rgba, SimConfig};
use crate::core::{Kind, Particle, Reactant, SpeedClass, Simulation};
use crate::error::{Error, Result};

/// Largest surface edge, in pixels, that [`surface_size`] accepts.
pub const MAX_SURFACE_EXTENT: u32 = 16_384;

/// Outline drawn around reactant particles.
const REACTANT_OUTLINE: (f64, Rgba) = (2.0, [255, 255, 255, 255]);

/// A 2D drawing target in the same units as particle coordinates.
///
/// Every call may fail with [`crate::error::Error::RenderTarget`] when the
/// target has gone away; callers stop drawing on the first failure.
pub trait Surface {
    /// Pixel dimensions `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Reallocate to `width x height` pixels after the world was resized.
    /// Fixed-size targets keep their size.
    fn resize(&mut self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }

    /// Fill the whole surface with `color`, replacing what was there.
    fn clear(&mut self, color: Rgba) -> Result<()>;

    /// Alpha-blend a filled disc.
    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgba) -> Result<()>;

    /// Alpha-blend a ring of the given line `width` centred on `radius`.
    fn stroke_circle(&mut self, center: [f64; 2], radius: f64, width: f64, color: Rgba)
        -> Result<()>;
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        (**self).resize(width, height)
    }

    fn clear(&mut self, color: Rgba) -> Result<()> {
        (**self).clear(color)
    }

    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgba) -> Result<()> {
        (**self).fill_circle(center, radius, color)
    }

    fn stroke_circle(&mut self, center: [f64; 2], radius: f64, width: f64, color: Rgba)
        -> Result<()> {
        (**self).stroke_circle(center, radius, width, color)
    }
}

/// Pixel size covering world bounds `[width, height]`, rounded up.
pub fn surface_size(bounds: [f64; 2]) -> Result<(u32, u32)> {
    let [w, h] = bounds;
    let max = MAX_SURFACE_EXTENT as f64;
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(Error::InvalidParam(format!(
            "surface bounds must be finite and > 0, got {w}x{h}"
        )));
    }
    if w > max || h > max {
        return Err(Error::InvalidParam(format!(
            "surface bounds {w}x{h} exceed {MAX_SURFACE_EXTENT} pixels per side"
        )));
    }
    Ok((w.ceil() as u32, h.ceil() as u32))
}

/// Fill and optional `(width, colour)` outline of one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Rgba,
    pub outline: Option<(f64, Rgba)>,
}

/// Resolve how a particle is drawn under `config`.
pub fn style_of(p: &Particle, config: &SimConfig) -> Style {
    match p.kind {
        Kind::Solvent => Style {
            fill: match p.class {
                SpeedClass::Slow => config.palette.slow,
                SpeedClass::Fast => config.palette.fast,
            },
            outline: config
                .palette
                .outline
                .filter(|c| c[3] > 0)
                .map(|c| (1.0, c)),
        },
        Kind::Reactant(tag) => {
            let re = config.reactants.unwrap_or_default();
            Style {
                fill: reactant_fill(&re, tag),
                outline: Some(REACTANT_OUTLINE),
            }
        }
    }
}

fn reactant_fill(re: &ReactantConfig, tag: Reactant) -> Rgba {
    match tag {
        Reactant::A => re.color_a,
        Reactant::B => re.color_b,
    }
}

/// Clear `surface` to `background` and draw every particle of `sim`.
pub fn render<S: Surface + ?Sized>(sim: &Simulation, surface: &mut S, background: Rgba) -> Result<()> {
    surface.clear(background)?;
    for p in &sim.particles {
        let style = style_of(p, sim.config());
        surface.fill_circle(p.r, p.radius(), style.fill)?;
        if let Some((width, color)) = style.outline {
            surface.stroke_circle(p.r, p.radius(), width, color)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_WIDTH;
    use crate::error::Error;

    /// Records draw calls instead of rasterising them.
    #[derive(Default)]
    struct Recorder {
        clears: usize,
        fills: Vec<([f64; 2], f64, Rgba)>,
        strokes: usize,
    }

    impl Surface for Recorder {
        fn size(&self) -> (u32, u32) {
            (600, 300)
        }
        fn clear(&mut self, _color: Rgba) -> Result<()> {
            self.clears += 1;
            self.fills.clear();
            self.strokes = 0;
            Ok(())
        }
        fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgba) -> Result<()> {
            self.fills.push((center, radius, color));
            Ok(())
        }
        fn stroke_circle(&mut self, _: [f64; 2], _: f64, _: f64, _: Rgba) -> Result<()> {
            self.strokes += 1;
            Ok(())
        }
    }

    struct Gone;

    impl Surface for Gone {
        fn size(&self) -> (u32, u32) {
            (0, 0)
        }
        fn clear(&mut self, _: Rgba) -> Result<()> {
            Err(Error::RenderTarget("canvas removed".into()))
        }
        fn fill_circle(&mut self, _: [f64; 2], _: f64, _: Rgba) -> Result<()> {
            Ok(())
        }
        fn stroke_circle(&mut self, _: [f64; 2], _: f64, _: f64, _: Rgba) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn draws_every_particle_once_per_frame() -> Result<()> {
        let sim = Simulation::new(SimConfig::collision_demo(DEFAULT_WIDTH), Some(4))?;
        let mut rec = Recorder::default();
        render(&sim, &mut rec, [0, 0, 0, 0])?;
        render(&sim, &mut rec, [0, 0, 0, 0])?;
        assert_eq!(rec.clears, 2);
        assert_eq!(rec.fills.len(), sim.num_particles());
        assert_eq!(rec.strokes, sim.num_particles());
        for (p, (c, r, _)) in sim.particles.iter().zip(&rec.fills) {
            assert_eq!(p.r, *c);
            assert_eq!(p.radius(), *r);
        }
        Ok(())
    }

    #[test]
    fn fill_follows_speed_class() -> Result<()> {
        let config = SimConfig::collision_demo(DEFAULT_WIDTH);
        let mut p = Particle::new([10.0, 10.0], [1.0, 0.0], 5.0, 1.0)?;
        p.reclassify(config.fast_threshold);
        assert_eq!(style_of(&p, &config).fill, config.palette.slow);
        p.v = [5.0, 0.0];
        p.reclassify(config.fast_threshold);
        assert_eq!(style_of(&p, &config).fill, config.palette.fast);
        Ok(())
    }

    #[test]
    fn reactants_get_heavy_outline() -> Result<()> {
        let config = SimConfig::cage_liquid(DEFAULT_WIDTH);
        let p = Particle::new([10.0, 10.0], [0.0, 0.0], 8.0, 1.0)?.with_kind(Kind::Reactant(Reactant::B));
        let style = style_of(&p, &config);
        assert_eq!(style.outline, Some(REACTANT_OUTLINE));
        assert_eq!(style.fill, config.reactants.unwrap_or_default().color_b);
        Ok(())
    }

    #[test]
    fn missing_target_reports_error() -> Result<()> {
        let sim = Simulation::new(SimConfig::collision_demo(DEFAULT_WIDTH), Some(4))?;
        let err = render(&sim, &mut Gone, [0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::RenderTarget(_)));
        Ok(())
    }
}
