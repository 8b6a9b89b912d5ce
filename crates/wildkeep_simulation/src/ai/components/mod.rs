//! AI components

pub mod behavior;
pub mod flight;
pub mod follow;
pub mod wander;

#[cfg(test)]
mod follow_tests;

// Re-export all components
pub use behavior::*;
pub use flight::*;
pub use follow::*;
pub use wander::*;
