use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core, its render surfaces and host glue.
///
/// Each variant carries enough context to be actionable. `step()` never produces
/// one of these on a validated simulation; they surface at configuration and
/// render boundaries only.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter (count, speed, bounds, radius, mass, ...).
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// The drawing surface is missing, detached or rejected a draw call.
    #[error("render target unavailable: {0}")]
    RenderTarget(String),

    /// A shared simulation lock was poisoned by a panicking holder.
    #[error("lock poisoned: {0}")]
    Poisoned(&'static str),

    /// Malformed TOML configuration.
    #[error(transparent)]
    Config(#[from] toml::de::Error),

    /// Encoding or saving a rendered frame failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Propagated I/O errors (config files, frame exports).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
