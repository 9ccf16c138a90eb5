//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

pub mod boss;
pub mod components;
pub mod ghost;
pub mod motion;
pub mod player;
pub mod power;
pub mod stage;
pub mod targeting;

pub use self::boss::*;
pub use self::components::*;
pub use self::ghost::*;
pub use self::motion::{Body, Position, Velocity};
pub use self::player::*;
pub use self::power::*;
pub use self::stage::*;
pub use self::targeting::*;
