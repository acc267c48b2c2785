//! Horde Core - Wave-Survival Combat Simulation
//!
//! Deterministic, frame-stepped core of a top-down "survive the horde"
//! action game:
//! - Entity arenas (player, monsters, projectiles, pickups)
//! - Spawn director with time-based intensity
//! - Auto-firing weapons, including fusions of two maxed-enough weapons
//! - XP, level-ups and the upgrade choice pool
//! - Equipment affixes, rarity rolls and stat aggregation
//! - Bevy plugin and a headless Monte-Carlo balance runner
//!
//! Rendering, audio and asset loading live outside; the core talks to them
//! through [`fx::Frontend`].

pub mod balance;
pub mod constants;
pub mod director;
pub mod engine;
pub mod equipment;
pub mod fx;
pub mod gameflow;
pub mod input;
pub mod logging;
pub mod math;
pub mod monster;
pub mod pickup;
pub mod player;
pub mod progression;
pub mod projectile;
pub mod weapons;

pub use engine::{HordePlugin, SimConfig, SimError, Simulation};
pub use fx::{Effect, Frontend, HeadlessFrontend, RecordingFrontend, VisualHandle, VisualKind};
pub use gameflow::{HudSnapshot, RunMode, RunSummary};
pub use input::{Action, InputState};
