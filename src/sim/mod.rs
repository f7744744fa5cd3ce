//! Gameplay simulation
//!
//! Everything here is plain arithmetic over owned state:
//! - One tick per call, no wall-clock time
//! - Seeded RNG only
//! - No rendering, audio or storage dependencies

pub mod consts;
pub mod events;
pub mod obstacle;
pub mod particles;
pub mod player;
pub mod world;

pub use events::{Cue, GameEvent};
pub use obstacle::{Hitbox, Obstacle, ObstacleField, ObstacleKind, hits};
pub use particles::{Burst, Particle, Particles};
pub use player::Player;
pub use world::{GameConfig, Mode, Snapshot, World};
