//! Simulation engine
//!
//! Owns every entity collection and drives one frame at a time:
//!   director → player + weapons → monsters + contact → projectiles →
//!   pickups → collision → cleanup → run-mode transitions.
//!
//! Hosts talk to it through [`Simulation`] directly, or through
//! [`HordePlugin`] inside a bevy app.

pub mod collision;
pub mod config;
pub mod plugin;
pub mod pool;
pub mod simulation;

pub use config::{AssetTable, ConfigError, DropConfig, SimConfig};
pub use plugin::{HordePlugin, PresentationQueue, SimulationResource};
pub use pool::{Entity, EntityId, EntityPool};
pub use simulation::Simulation;

/// Presentation callbacks issued in the wrong run mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    #[error("no upgrade prompt is open")]
    NotChoosingUpgrade,
    #[error("choice {index} out of range ({available} offered)")]
    ChoiceOutOfRange { index: usize, available: usize },
    #[error("run is still in progress")]
    RunNotOver,
}
