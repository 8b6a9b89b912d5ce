//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: категория актора (player/ally/hostile) и здоровье
//!
//! Остальные компоненты живут рядом со своими системами
//! (combat, movement, ai, boundary) и ре-экспортируются из lib.rs.

pub mod actor;

pub use actor::*;
