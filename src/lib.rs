//! Core of a fixed-rate arcade shooter: a ship defends the bottom of the
//! panel against a descending roster of missile-firing aliens.
//!
//! The simulation ([`session`], [`engine`]) is single-threaded and
//! deterministic given its random source.  Everything slow (sound, storage,
//! the intro) goes through [`executor`] and comes back to the tick thread as
//! data.

pub mod alien;
pub mod collaborators;
pub mod config;
pub mod effects;
pub mod engine;
pub mod entities;
pub mod error;
pub mod executor;
pub mod formation;
pub mod game;
pub mod geometry;
pub mod launch;
pub mod records;
pub mod route;
pub mod session;
pub mod spaceship;
pub mod store;
pub mod waves;

pub use error::{GameError, Result};
