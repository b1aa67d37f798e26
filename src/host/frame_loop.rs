use crate::config::{Rgba, SimConfig};
use crate::core::Simulation;
use crate::error::{Error, Result};
use crate::render::{render, surface_size, Surface};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A control change coming from the host page.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Count slider moved: re-seed with this many particles.
    Count(usize),
    /// Speed slider moved: rescale existing velocities.
    Speed(f64),
    /// Container resized: re-seed into the new bounds.
    Resize { width: f64, height: f64 },
    /// Scene switched (e.g. gas/liquid toggle): re-seed from a new config.
    Reseed(SimConfig),
}

/// Shared, lock-protected simulation.
///
/// The frame loop and the host controls go through the same mutex, so a
/// re-seed or speed change always lands between two ticks, never inside one.
#[derive(Debug, Clone)]
pub struct SimHandle {
    inner: Arc<Mutex<Simulation>>,
}

impl SimHandle {
    pub fn new(sim: Simulation) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sim)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Simulation>> {
        self.inner.lock().map_err(|_| Error::Poisoned("simulation"))
    }

    /// Run `f` with exclusive access to the simulation.
    pub fn with<R>(&self, f: impl FnOnce(&mut Simulation) -> R) -> Result<R> {
        let mut sim = self.lock()?;
        Ok(f(&mut sim))
    }

    /// Apply a host control change. Invalid values leave the state untouched.
    pub fn apply(&self, event: ControlEvent) -> Result<()> {
        let mut sim = self.lock()?;
        match event {
            ControlEvent::Count(count) => sim.reseed(count),
            ControlEvent::Speed(speed) => sim.reconfigure_speed(speed),
            ControlEvent::Resize { width, height } => sim.resize(width, height),
            ControlEvent::Reseed(config) => sim.reseed_with(config),
        }
    }
}

/// One visualization's tick driver: a simulation plus the surface it draws on.
///
/// A tick is `step()` then `render()` under a single lock. When the surface
/// fails, the failure is logged once and the animation halts; later ticks
/// return an error without touching the simulation.
#[derive(Debug)]
pub struct Animation<S> {
    sim: SimHandle,
    surface: S,
    background: Rgba,
    halted: bool,
    ticks: u64,
}

impl<S: Surface> Animation<S> {
    pub fn new(sim: SimHandle, surface: S, background: Rgba) -> Self {
        Self {
            sim,
            surface,
            background,
            halted: false,
            ticks: 0,
        }
    }

    /// Advance one frame and draw it.
    pub fn tick(&mut self) -> Result<()> {
        if self.halted {
            return Err(Error::RenderTarget("animation halted".into()));
        }
        let sim = self.sim.clone();
        let mut guard = sim.lock()?;
        guard.step();
        self.ticks += 1;
        self.draw(&guard)
    }

    /// Draw the current state without stepping.
    pub fn redraw(&mut self) -> Result<()> {
        if self.halted {
            return Err(Error::RenderTarget("animation halted".into()));
        }
        let sim = self.sim.clone();
        let guard = sim.lock()?;
        self.draw(&guard)
    }

    fn draw(&mut self, sim: &Simulation) -> Result<()> {
        let drawn = self
            .fit_surface(sim)
            .and_then(|()| render(sim, &mut self.surface, self.background));
        if let Err(e) = drawn {
            log::error!("render target failed, halting animation: {e}");
            self.halted = true;
            return Err(e);
        }
        Ok(())
    }

    /// Follow a world resize (e.g. [`ControlEvent::Resize`]) with the surface.
    fn fit_surface(&mut self, sim: &Simulation) -> Result<()> {
        let (w, h) = surface_size(sim.bounds())?;
        if self.surface.size() != (w, h) {
            log::debug!("resizing surface to {w}x{h}");
            self.surface.resize(w, h)?;
        }
        Ok(())
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Ticks run since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn handle(&self) -> &SimHandle {
        &self.sim
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

/// Handle to a running frame loop; see [`start`].
#[derive(Debug)]
pub struct LoopHandle<S> {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Animation<S>>>,
}

/// Run `animation` on its own thread, one tick every `interval`.
///
/// The loop exits when [`LoopHandle::stop`] is called or the first time a
/// tick fails (render target gone, poisoned lock).
pub fn start<S>(mut animation: Animation<S>, interval: Duration) -> Result<LoopHandle<S>>
where
    S: Surface + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let thread = thread::Builder::new()
        .name("collisim-frame".into())
        .spawn(move || {
            log::info!("frame loop started ({:?} per tick)", interval);
            while !flag.load(Ordering::Acquire) {
                let began = Instant::now();
                if animation.tick().is_err() {
                    break;
                }
                if let Some(rest) = interval.checked_sub(began.elapsed()) {
                    spin_sleep::sleep(rest);
                }
            }
            log::info!("frame loop exited after {} ticks", animation.ticks());
            animation
        })?;
    Ok(LoopHandle {
        stop,
        thread: Some(thread),
    })
}

impl<S> LoopHandle<S> {
    /// Whether the loop thread is still ticking.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop scheduling ticks and wait for the in-flight one to finish.
    ///
    /// No tick runs after this returns. The animation is handed back so the
    /// host can inspect the last frame or start it again.
    pub fn stop(mut self) -> Result<Animation<S>> {
        self.stop.store(true, Ordering::Release);
        match self.thread.take() {
            Some(t) => t.join().map_err(|_| Error::Poisoned("frame loop panicked")),
            None => Err(Error::Poisoned("frame loop already joined")),
        }
    }
}

impl<S> Drop for LoopHandle<S> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}
