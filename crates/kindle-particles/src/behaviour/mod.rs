//! Behaviours: bounded-lifetime mutation strategies applied every tick
//!
//! A behaviour is attached to a particle (each particle owns its own copy)
//! or to an emitter. On every tick it is energized against its target's
//! age/life ratio and then mutates the target.

mod collision;
mod color;
mod drift;
mod force;
mod rotate;
mod scalar;
mod spring;

pub use collision::Collision;
pub use color::ColorTween;
pub use drift::RandomDrift;
pub use force::{Force, Gravity};
pub use rotate::{Rotate, RotateStyle};
pub use scalar::{Alpha, Scale};
pub use spring::Spring;

use crate::body::{sanitize_life, Body};
use crate::easing::{decay, Easing};
use crate::particle::Particle;
use crate::pool::Pooled;
use crate::rand::ParticleRng;
use std::fmt;

/// Tag identifying a behaviour variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviourKind {
    Force,
    Gravity,
    Spring,
    Collision,
    RandomDrift,
    Alpha,
    Scale,
    Color,
    Rotate,
}

/// Lifespan and decay bookkeeping every behaviour carries
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviourState {
    pub life: f32,
    pub age: f32,
    pub energy: f32,
    pub dead: bool,
    pub enabled: bool,
    pub easing: Easing,
}

impl Default for BehaviourState {
    fn default() -> Self {
        Self {
            life: f32::INFINITY,
            age: 0.0,
            energy: 1.0,
            dead: false,
            enabled: true,
            easing: Easing::Linear,
        }
    }
}

impl BehaviourState {
    /// `life` of `None` (or NaN) means the behaviour never expires.
    /// Unknown easing names fall back to linear.
    pub fn new(life: Option<f32>, easing: &str) -> Self {
        Self {
            life: life.map_or(f32::INFINITY, sanitize_life),
            easing: Easing::from_name(easing),
            ..Self::default()
        }
    }

    /// Back to a fresh state, keeping life and easing
    pub fn reset(&mut self) {
        self.age = 0.0;
        self.energy = 1.0;
        self.dead = false;
    }

    /// Advance by `time`. Once `age` reaches `life` the behaviour is dead with
    /// zero energy and stays that way. Otherwise energy follows the *target's*
    /// age/life ratio, so a short-lived behaviour fades out before its target.
    pub fn energize(&mut self, target: &Body, time: f32) {
        if self.dead {
            return;
        }
        self.age += time;
        if self.age >= self.life {
            self.energy = 0.0;
            self.dead = true;
        } else {
            self.energy = decay(self.easing, target.age, target.life);
        }
    }
}

/// Particles that come after the one being updated, for behaviours that
/// interact with other particles of the same emitter.
pub struct Neighbours<'a> {
    rest: &'a mut [Pooled<Particle>],
}

impl<'a> Neighbours<'a> {
    pub fn new(rest: &'a mut [Pooled<Particle>]) -> Self {
        Self { rest }
    }

    /// No neighbours, e.g. when a behaviour runs on an emitter
    pub fn none() -> Self {
        Self {
            rest: Default::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> + '_ {
        self.rest.iter_mut().map(|p| &mut p.body)
    }
}

/// A mutation strategy with its own lifespan and energy curve.
///
/// Implementors provide `mutate`; `apply_behaviour` and `energize` have
/// shared default behaviour. Variants should call `energize` at the top of
/// `mutate` and return early once the state reports `dead`.
pub trait Behaviour: fmt::Debug {
    fn kind(&self) -> BehaviourKind;

    fn state(&self) -> &BehaviourState;

    fn state_mut(&mut self) -> &mut BehaviourState;

    fn clone_box(&self) -> Box<dyn Behaviour>;

    /// One-time setup when attached; may write into `target.endpoints`
    fn initialize(&mut self, _target: &mut Body, _rng: &mut ParticleRng) {}

    fn mutate(&mut self, target: &mut Body, time: f32, index: usize, peers: &mut Neighbours<'_>);

    fn apply_behaviour(
        &mut self,
        target: &mut Body,
        time: f32,
        index: usize,
        peers: &mut Neighbours<'_>,
    ) {
        if !self.state().enabled {
            return;
        }
        self.mutate(target, time, index, peers);
    }

    fn energize(&mut self, target: &Body, time: f32) {
        self.state_mut().energize(target, time);
    }

    fn is_dead(&self) -> bool {
        self.state().dead
    }
}

impl Clone for Box<dyn Behaviour> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
