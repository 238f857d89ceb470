//! The simulated particle: kinematic body plus the behaviours that drive it

use crate::behaviour::{Behaviour, BehaviourKind, Neighbours};
use crate::body::{Body, Kinematic};
use crate::pool::Factory;
use crate::rand::ParticleRng;
use kindle_core::{EmitterId, IdSequence, ParticleId};
use std::cell::RefCell;
use std::fmt;

/// A pooled, reusable entity.
///
/// Lifecycle: created by the pool, initialized and handed behaviours by its
/// emitter, mutated by [`Particle::update`] every tick, marked dead by
/// [`Particle::destroy`], and wiped by [`Particle::reset`] before the emitter
/// returns it to the pool.
#[derive(Default)]
pub struct Particle {
    pub id: ParticleId,
    pub body: Body,
    behaviours: Vec<Box<dyn Behaviour>>,
    /// Emitter that spawned this particle, if it is still attached
    pub parent: Option<EmitterId>,
    /// Position in the parent's live list at creation time
    pub index: usize,
}

impl Particle {
    pub fn new(id: ParticleId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Advance by `time` seconds. `peers` are the parent's particles after
    /// this one, for behaviours that look at neighbours.
    pub fn update(&mut self, time: f32, index: usize, peers: &mut Neighbours<'_>) {
        if self.body.sleep {
            return;
        }
        self.body.age += time;
        // reverse order, matching how behaviours are removed
        for behaviour in self.behaviours.iter_mut().rev() {
            behaviour.apply_behaviour(&mut self.body, time, index, peers);
        }
        if self.body.is_expired() {
            self.destroy();
        } else {
            self.body.update_energy();
        }
    }

    /// Mark dead. The particle stays in its emitter's list until reaped.
    pub fn destroy(&mut self) {
        self.behaviours.clear();
        self.body.energy = 0.0;
        self.body.dead = true;
        self.parent = None;
    }

    /// Back to the state of a freshly constructed particle, keeping the id
    pub fn reset(&mut self) -> &mut Self {
        self.body.reset();
        self.behaviours.clear();
        self.parent = None;
        self.index = 0;
        self
    }

    /// Attach a copy of `behaviour` and let it initialize against this body
    pub fn add_behaviour(&mut self, behaviour: &dyn Behaviour, rng: &mut ParticleRng) {
        let mut own = behaviour.clone_box();
        own.initialize(&mut self.body, rng);
        self.behaviours.push(own);
    }

    pub fn add_behaviours(&mut self, behaviours: &[Box<dyn Behaviour>], rng: &mut ParticleRng) {
        for behaviour in behaviours {
            self.add_behaviour(behaviour.as_ref(), rng);
        }
    }

    /// Drop every behaviour of the given kind. Returns how many were removed.
    pub fn remove_behaviour(&mut self, kind: BehaviourKind) -> usize {
        let before = self.behaviours.len();
        self.behaviours.retain(|b| b.kind() != kind);
        before - self.behaviours.len()
    }

    pub fn remove_all_behaviours(&mut self) {
        self.behaviours.clear();
    }

    pub fn behaviours(&self) -> &[Box<dyn Behaviour>] {
        &self.behaviours
    }
}

impl Kinematic for Particle {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl fmt::Debug for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("age", &self.body.age)
            .field("life", &self.body.life)
            .field("dead", &self.body.dead)
            .field("behaviours", &self.behaviours.len())
            .finish()
    }
}

/// Builds particles with ids from its own sequence. Ids survive recycling,
/// so each distinct id corresponds to one allocation.
#[derive(Debug, Default)]
pub struct ParticleFactory {
    ids: RefCell<IdSequence>,
}

impl ParticleFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Factory<Particle> for ParticleFactory {
    fn construct(&self) -> Option<Particle> {
        let id = ParticleId::next(&mut self.ids.borrow_mut());
        Some(Particle::new(id))
    }
}
