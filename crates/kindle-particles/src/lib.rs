//! Kindle Particles - pooled particle simulation engine
//!
//! Provides frame-stepped particle simulation with:
//! - An identity-keyed object pool that recycles particles across frames
//! - Composable behaviours with their own lifespan and energy decay
//! - Emitters that spawn on a rate schedule (single burst or continuous)
//!   and integrate their particles
//! - A top-level `System` with a synchronous lifecycle event bus and a
//!   renderer boundary that can pack GPU instance data
//! - Declarative scene descriptions in TOML or JSON

pub mod behaviour;
pub mod body;
pub mod easing;
pub mod emitter;
pub mod event;
pub mod initializer;
pub mod integrator;
pub mod particle;
pub mod pool;
pub mod rand;
pub mod rate;
pub mod render;
pub mod scene;
pub mod span;
pub mod system;
pub mod zone;

pub use behaviour::{Behaviour, BehaviourKind, BehaviourState};
pub use body::{Body, Kinematic};
pub use easing::Easing;
pub use emitter::Emitter;
pub use event::{EventDispatcher, EventKind, SystemEvent};
pub use initializer::{initialize_particle, Initializer, InitializerKind};
pub use integrator::Integrator;
pub use particle::{Particle, ParticleFactory};
pub use pool::{Factory, Pool, PoolKey, Pooled};
pub use rate::Rate;
pub use render::{InstanceRenderer, ParticleInstance, Renderer};
pub use scene::{SceneDesc, SceneFormat};
pub use span::{ColorSpan, Span};
pub use system::{EmitHooks, System, SystemContext};
pub use zone::Zone;
