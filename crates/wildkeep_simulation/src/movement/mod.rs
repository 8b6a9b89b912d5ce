//! Movement domain - выходы локомоции и препятствия
//!
//! Содержит:
//! - MovementSpeed (скорость движения/поворота, конфиг)
//! - Locomotion (желаемая velocity на этот тик - intent для движка)
//! - AnimationFlags (walking/attacking для внешнего animation player)
//! - ObstacleField (сферы-препятствия для reactive raycasts)
//! - integrate_locomotion (velocity → Transform, headless)

pub mod components;
pub mod obstacles;
pub mod systems;

pub use components::*;
pub use obstacles::*;
pub use systems::*;
