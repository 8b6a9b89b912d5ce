//! AI systems (strategic layer logic)

pub mod behavior;
pub mod follow;
pub mod locomotion;
pub mod reactions;

// Re-export all systems
pub use behavior::*;
pub use follow::*;
pub use locomotion::*;
pub use reactions::*;
