//! Kindle Core - Foundational types for the Kindle particle engine
//!
//! This crate provides the core types that all other Kindle crates depend on:
//! - `ParticleId`, `EmitterId`, `ListenerId` - Identifiers handed out by a scoped `IdSequence`
//! - `Vec3`, `Color` - Spatial and color types
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{KindleError, Result};
pub use id::{EmitterId, IdSequence, ListenerId, ParticleId};
pub use types::{Color, Vec3};
