use super::frame_loop::{self, Animation, LoopHandle, SimHandle};
use crate::config::Config;
use crate::core::Simulation;
use crate::error::{Error, Result};
use crate::render::Surface;
use std::collections::BTreeMap;

enum Slot<S> {
    Idle(Animation<S>),
    Running(LoopHandle<S>),
}

struct Entry<S> {
    handle: SimHandle,
    display: crate::config::DisplayConfig,
    slot: Slot<S>,
}

/// Explicit registry of the visualizations a host page wants.
///
/// The host registers each visualization by name together with the surface it
/// draws on; nothing is discovered implicitly. Every entry owns its own
/// simulation and frame loop, so one failing surface halts only its own loop.
pub struct Stage<S> {
    entries: BTreeMap<String, Entry<S>>,
}

impl<S> Default for Stage<S> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<S: Surface + Send + 'static> Stage<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a visualization. Fails on a duplicate name or invalid config.
    pub fn register(
        &mut self,
        name: &str,
        config: Config,
        surface: S,
        seed: Option<u64>,
    ) -> Result<SimHandle> {
        if self.entries.contains_key(name) {
            return Err(Error::InvalidParam(format!(
                "visualization '{name}' is already registered"
            )));
        }
        config.display.validate()?;
        let sim = Simulation::new(config.simulation, seed)?;
        let handle = SimHandle::new(sim);
        let animation = Animation::new(handle.clone(), surface, config.display.background);
        log::info!("registered visualization '{name}'");
        self.entries.insert(
            name.to_owned(),
            Entry {
                handle: handle.clone(),
                display: config.display,
                slot: Slot::Idle(animation),
            },
        );
        Ok(handle)
    }

    /// Names of every registered visualization, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Control handle of a registered visualization.
    pub fn handle(&self, name: &str) -> Option<SimHandle> {
        self.entries.get(name).map(|e| e.handle.clone())
    }

    /// Whether `name` has a live frame loop.
    pub fn is_running(&self, name: &str) -> bool {
        matches!(
            self.entries.get(name).map(|e| &e.slot),
            Some(Slot::Running(h)) if h.is_running()
        )
    }

    /// Start the frame loop of `name`; starting a running entry is a no-op.
    ///
    /// If the loop thread cannot be spawned the entry is dropped.
    pub fn start(&mut self, name: &str) -> Result<()> {
        let interval = match self.entries.get(name) {
            Some(entry) => entry.display.frame_interval()?,
            None => return Err(unknown(name)),
        };
        let mut entry = self.take(name)?;
        if let Slot::Idle(animation) = entry.slot {
            entry.slot = Slot::Running(frame_loop::start(animation, interval)?);
        }
        self.entries.insert(name.to_owned(), entry);
        Ok(())
    }

    /// Stop the frame loop of `name` and keep its animation for later use.
    ///
    /// An entry whose loop panicked is dropped.
    pub fn stop(&mut self, name: &str) -> Result<()> {
        let mut entry = self.take(name)?;
        if let Slot::Running(handle) = entry.slot {
            entry.slot = Slot::Idle(handle.stop()?);
        }
        self.entries.insert(name.to_owned(), entry);
        Ok(())
    }

    pub fn start_all(&mut self) -> Result<()> {
        let names: Vec<String> = self.entries.keys().cloned().collect();
        for name in names {
            self.start(&name)?;
        }
        Ok(())
    }

    /// Stop every loop; the first failure is reported after all were stopped.
    pub fn stop_all(&mut self) -> Result<()> {
        let names: Vec<String> = self.entries.keys().cloned().collect();
        let mut first_err = None;
        for name in names {
            if let Err(e) = self.stop(&name) {
                log::warn!("stopping '{name}' failed: {e}");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Borrow the surface of a stopped visualization.
    pub fn surface(&self, name: &str) -> Option<&S> {
        match &self.entries.get(name)?.slot {
            Slot::Idle(animation) => Some(animation.surface()),
            Slot::Running(_) => None,
        }
    }

    /// Drive one tick of a stopped visualization by hand.
    pub fn tick(&mut self, name: &str) -> Result<()> {
        match self.entries.get_mut(name).map(|e| &mut e.slot) {
            Some(Slot::Idle(animation)) => animation.tick(),
            Some(Slot::Running(_)) => Err(Error::InvalidParam(format!(
                "visualization '{name}' is driven by its frame loop"
            ))),
            None => Err(unknown(name)),
        }
    }

    fn take(&mut self, name: &str) -> Result<Entry<S>> {
        self.entries.remove(name).ok_or_else(|| unknown(name))
    }
}

fn unknown(name: &str) -> Error {
    Error::InvalidParam(format!("no visualization named '{name}'"))
}
