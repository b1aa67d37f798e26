use super::{surface_size, Surface};
use crate::config::Rgba;
use crate::error::{Error, Result};
use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// CPU raster surface backed by an [`RgbaImage`].
///
/// Pixel `(x, y)` covers `[x, x+1) x [y, y+1)` in world units; a pixel is
/// painted when its centre falls inside the shape. Colours are blended with
/// straight-alpha source-over.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    image: RgbaImage,
    attached: bool,
}

impl PixelSurface {
    /// Transparent surface of `width x height` pixels.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParam(format!(
                "surface must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
            attached: true,
        })
    }

    /// Surface sized to cover world bounds `[width, height]`.
    pub fn for_bounds(bounds: [f64; 2]) -> Result<Self> {
        let (w, h) = surface_size(bounds)?;
        Self::new(w, h)
    }

    /// Mark the target as gone; every later draw call fails.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Colour at `(x, y)`, if inside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Encode the current frame as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.attached {
            Ok(())
        } else {
            Err(Error::RenderTarget("pixel surface detached".into()))
        }
    }

    /// Blend `color` into every pixel whose centre satisfies `inside(dist)`,
    /// `dist` being the centre's distance to `center`, within `reach` of it.
    fn paint(&mut self, center: [f64; 2], reach: f64, color: Rgba, inside: impl Fn(f64) -> bool) {
        if color[3] == 0 || !(reach.is_finite() && reach > 0.0) {
            return;
        }
        let (w, h) = self.image.dimensions();
        let x0 = (center[0] - reach).floor().max(0.0) as u32;
        let y0 = (center[1] - reach).floor().max(0.0) as u32;
        let x1 = ((center[0] + reach).ceil().max(0.0) as u32).min(w);
        let y1 = ((center[1] + reach).ceil().max(0.0) as u32).min(h);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f64 + 0.5 - center[0];
                let dy = y as f64 + 0.5 - center[1];
                if inside(dx.hypot(dy)) {
                    let px = self.image.get_pixel_mut(x, y);
                    px.0 = blend_over(px.0, color);
                }
            }
        }
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.check()?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidParam(format!(
                "surface must be non-empty, got {width}x{height}"
            )));
        }
        self.image = RgbaImage::new(width, height);
        Ok(())
    }

    fn clear(&mut self, color: Rgba) -> Result<()> {
        self.check()?;
        for px in self.image.pixels_mut() {
            px.0 = color;
        }
        Ok(())
    }

    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Rgba) -> Result<()> {
        self.check()?;
        self.paint(center, radius, color, |d| d <= radius);
        Ok(())
    }

    fn stroke_circle(
        &mut self,
        center: [f64; 2],
        radius: f64,
        width: f64,
        color: Rgba,
    ) -> Result<()> {
        self.check()?;
        let half = width / 2.0;
        self.paint(center, radius + half, color, |d| (d - radius).abs() <= half);
        Ok(())
    }
}

/// Straight-alpha source-over compositing.
fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for k in 0..3 {
        let c = (src[k] as f32 * sa + dst[k] as f32 * da * (1.0 - sa)) / out_a;
        out[k] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_surface_rejected() {
        assert!(PixelSurface::new(0, 300).is_err());
        assert!(PixelSurface::for_bounds([f64::NAN, 300.0]).is_err());
    }

    #[test]
    fn for_bounds_rounds_up() -> Result<()> {
        let s = PixelSurface::for_bounds([640.5, 300.0])?;
        assert_eq!(s.size(), (641, 300));
        Ok(())
    }

    #[test]
    fn oversized_bounds_rejected() {
        let err = PixelSurface::for_bounds([1e12, 300.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));
        assert!(err.to_string().contains("exceed"), "{err}");
        assert!(PixelSurface::for_bounds([600.0, 1e12]).is_err());
    }

    #[test]
    fn resize_reallocates() -> Result<()> {
        let mut s = PixelSurface::new(600, 300)?;
        s.clear([1, 2, 3, 255])?;
        s.resize(320, 200)?;
        assert_eq!(s.size(), (320, 200));
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
        assert!(s.resize(0, 200).is_err());
        Ok(())
    }

    #[test]
    fn opaque_fill_covers_centre_not_corner() -> Result<()> {
        let mut s = PixelSurface::new(20, 20)?;
        s.fill_circle([10.0, 10.0], 5.0, [255, 0, 0, 255])?;
        assert_eq!(s.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(s.pixel(16, 10), Some([0, 0, 0, 0]));
        Ok(())
    }

    #[test]
    fn stroke_leaves_interior_empty() -> Result<()> {
        let mut s = PixelSurface::new(30, 30)?;
        s.stroke_circle([15.0, 15.0], 8.0, 2.0, [255, 255, 255, 255])?;
        assert_eq!(s.pixel(15, 15), Some([0, 0, 0, 0]));
        // pixel centre (22.5, 15.5) sits ~7.5 from the centre, on the ring
        assert_eq!(s.pixel(22, 15), Some([255, 255, 255, 255]));
        Ok(())
    }

    #[test]
    fn translucent_fill_blends_over_background() -> Result<()> {
        let mut s = PixelSurface::new(4, 4)?;
        s.clear([0, 0, 0, 255])?;
        s.fill_circle([2.0, 2.0], 3.0, [255, 255, 255, 51])?;
        let [r, g, b, a] = s.pixel(1, 1).unwrap_or_default();
        assert_eq!(a, 255);
        assert_eq!(r, 51);
        assert_eq!((g, b), (51, 51));
        Ok(())
    }

    #[test]
    fn circles_clip_at_edges() -> Result<()> {
        let mut s = PixelSurface::new(10, 10)?;
        s.fill_circle([0.0, 0.0], 4.0, [0, 0, 255, 255])?;
        s.fill_circle([12.0, 12.0], 4.0, [0, 0, 255, 255])?;
        assert_eq!(s.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(s.pixel(9, 9), Some([0, 0, 255, 255]));
        Ok(())
    }

    #[test]
    fn detached_surface_fails() -> Result<()> {
        let mut s = PixelSurface::new(4, 4)?;
        s.detach();
        assert!(!s.is_attached());
        let err = s.clear([0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::RenderTarget(_)));
        Ok(())
    }
}
