//! Emitter: a kinematic body that spawns, integrates and reaps particles

use crate::behaviour::{Behaviour, BehaviourKind, Neighbours};
use crate::body::{Body, Kinematic};
use crate::event::{EventDispatcher, EventKind, SystemEvent};
use crate::initializer::{initialize_particle, Initializer, InitializerKind};
use crate::integrator::Integrator;
use crate::particle::Particle;
use crate::pool::Pooled;
use crate::rand::ParticleRng;
use crate::rate::Rate;
use crate::system::SystemContext;
use kindle_core::{EmitterId, ListenerId, Result};
use std::fmt;

/// Time budget handed to the rate for a single-tick burst, large enough to
/// fire any interval.
const BURST_BUDGET: f32 = 99_999.0;

/// Velocity attenuation applied when none is configured
pub const DEFAULT_DAMPING: f32 = 0.006;

/// Spawns particles on a [`Rate`] schedule and owns them until they die.
///
/// Schedule states: idle (`is_emitting` false), emitting, then dead once
/// `total_emit_times` runs out or the emitter's own life elapses. A dead
/// emitter keeps updating until its last particle has been reaped, and only
/// then finalizes (clears its setup and reports `EmitterDead` once).
pub struct Emitter {
    pub id: EmitterId,
    pub body: Body,
    particles: Vec<Pooled<Particle>>,
    initializers: Vec<Initializer>,
    /// Templates copied onto every spawned particle
    behaviours: Vec<Box<dyn Behaviour>>,
    /// Applied to the emitter's own body
    emitter_behaviours: Vec<Box<dyn Behaviour>>,

    pub rate: Rate,
    current_emit_time: f32,
    total_emit_times: f32,
    is_emitting: bool,

    /// Fraction of velocity lost per step
    pub damping: f32,
    pub integrator: Integrator,
    /// Offset spawned particles by the emitter's position and motion
    pub bind_emitter: bool,
    /// Also deliver particle events to this emitter's own listeners
    pub bind_event: bool,
    /// Slot in the owning system's emitter list
    pub index: usize,

    dispatcher: EventDispatcher,
    on_dead: Vec<Box<dyn FnMut(EmitterId)>>,
    finalized: bool,
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            id: EmitterId::default(),
            body: Body::default(),
            particles: Vec::new(),
            initializers: Vec::new(),
            behaviours: Vec::new(),
            emitter_behaviours: Vec::new(),
            rate: Rate::default(),
            current_emit_time: 0.0,
            total_emit_times: -1.0,
            is_emitting: false,
            damping: DEFAULT_DAMPING,
            integrator: Integrator::Euler,
            bind_emitter: true,
            bind_event: false,
            index: 0,
            dispatcher: EventDispatcher::new(),
            on_dead: Vec::new(),
            finalized: false,
        }
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(rate: Rate) -> Self {
        Self {
            rate,
            ..Self::default()
        }
    }

    // --- schedule ---

    /// Arm the schedule. `total_emit_times` is a duration in seconds, except
    /// that exactly 1 means a single-tick burst (and forces `life` to 1).
    /// NaN for either argument means infinite.
    pub fn emit(&mut self, total_emit_times: f32, life: f32) {
        self.current_emit_time = 0.0;
        self.total_emit_times = if total_emit_times.is_nan() {
            f32::INFINITY
        } else {
            total_emit_times
        };
        if total_emit_times == 1.0 {
            self.body.life = 1.0;
        } else {
            self.body.set_life(life);
        }
        self.rate.init();
        self.is_emitting = true;
    }

    /// Arm the schedule with the values already configured through
    /// [`Emitter::set_total_emit_times`] and [`Emitter::set_life`]. Unset or
    /// non-positive values mean infinite; a configured burst gets a life of
    /// 1 as with [`Emitter::emit`]. No-op while already emitting.
    pub fn emit_configured(&mut self) {
        if self.is_emitting {
            return;
        }
        self.current_emit_time = 0.0;
        if !(self.total_emit_times > 0.0) {
            self.total_emit_times = f32::INFINITY;
        }
        if self.total_emit_times == 1.0 {
            self.body.life = 1.0;
        } else if !(self.body.life > 0.0) {
            self.body.life = f32::INFINITY;
        }
        self.rate.init();
        self.is_emitting = true;
    }

    pub fn set_total_emit_times(&mut self, total_emit_times: f32) {
        self.total_emit_times = if total_emit_times.is_nan() {
            f32::INFINITY
        } else {
            total_emit_times
        };
    }

    pub fn set_life(&mut self, life: f32) {
        self.body.set_life(life);
    }

    /// Stop spawning. Live particles carry on until they die.
    pub fn stop_emit(&mut self) {
        self.total_emit_times = -1.0;
        self.current_emit_time = 0.0;
        self.is_emitting = false;
    }

    /// Mark every live particle dead; they are reaped on the next update
    pub fn kill_all_particles(&mut self) {
        for particle in &mut self.particles {
            particle.body.dead = true;
        }
    }

    pub fn is_emitting(&self) -> bool {
        self.is_emitting
    }

    pub fn total_emit_times(&self) -> f32 {
        self.total_emit_times
    }

    pub fn current_emit_time(&self) -> f32 {
        self.current_emit_time
    }

    pub fn is_dead(&self) -> bool {
        self.body.dead
    }

    /// True once the emitter has died and drained, and reported it
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    // --- per-tick ---

    pub fn update(&mut self, time: f32, ctx: &mut SystemContext<'_>) -> Result<()> {
        if self.finalized || (!self.is_emitting && self.particles.is_empty()) {
            return Ok(());
        }

        self.body.age += time;
        if self.body.dead || self.body.is_expired() {
            self.destroy();
        }
        if self.is_emitting {
            self.generate(time, ctx)?;
        }
        self.integrate(time, ctx);
        self.reap(ctx);
        self.update_emitter_behaviours(time);

        if self.body.dead && self.particles.is_empty() {
            self.finalize();
        }
        log::trace!("{} live={} t={}", self.id, self.particles.len(), self.body.age);
        Ok(())
    }

    /// Spawn whatever the schedule allows for this tick
    pub fn generate(&mut self, time: f32, ctx: &mut SystemContext<'_>) -> Result<()> {
        if self.total_emit_times == 1.0 {
            let count = self.rate.value(BURST_BUDGET, ctx.rng);
            for _ in 0..count {
                self.create_particle(ctx)?;
            }
            self.total_emit_times = 0.0;
            return Ok(());
        }

        self.current_emit_time += time;
        if self.current_emit_time < self.total_emit_times {
            let count = self.rate.value(time, ctx.rng);
            for _ in 0..count {
                self.create_particle(ctx)?;
            }
        }
        Ok(())
    }

    /// Acquire a particle from the pool, set it up and make it live
    pub fn create_particle(&mut self, ctx: &mut SystemContext<'_>) -> Result<()> {
        let mut particle = ctx.pool.get(ctx.factory)?;
        initialize_particle(self, &mut *particle, &self.initializers, ctx.rng);
        particle.add_behaviours(&self.behaviours, ctx.rng);
        particle.parent = Some(self.id);
        particle.index = self.particles.len();

        let event = SystemEvent::ParticleCreated(&*particle);
        ctx.notify(&event);
        if self.bind_event {
            self.dispatcher.dispatch(&event);
        }
        self.particles.push(particle);
        Ok(())
    }

    /// Step the emitter's own body, then every particle (behaviours first,
    /// then motion), newest first.
    pub fn integrate(&mut self, time: f32, ctx: &mut SystemContext<'_>) {
        let damping = 1.0 - self.damping;
        self.integrator.integrate(&mut self.body, time, damping);

        for i in (0..self.particles.len()).rev() {
            let (head, rest) = self.particles.split_at_mut(i + 1);
            let particle = &mut head[i];
            particle.update(time, i, &mut Neighbours::new(rest));
            self.integrator.integrate(&mut particle.body, time, damping);

            let event = SystemEvent::ParticleUpdate(&**particle);
            ctx.notify(&event);
            if self.bind_event {
                self.dispatcher.dispatch(&event);
            }
        }
    }

    /// Return dead particles to the pool, newest first
    fn reap(&mut self, ctx: &mut SystemContext<'_>) {
        let mut i = self.particles.len();
        while i > 0 {
            i -= 1;
            if !self.particles[i].body.dead {
                continue;
            }
            let mut particle = self.particles.remove(i);
            let event = SystemEvent::ParticleDead(&*particle);
            ctx.notify(&event);
            if self.bind_event {
                self.dispatcher.dispatch(&event);
            }
            particle.reset();
            ctx.pool.expire(particle);

            if self.particles.is_empty() {
                ctx.notify(&SystemEvent::SystemUpdate(self.id));
            }
        }
    }

    fn update_emitter_behaviours(&mut self, time: f32) {
        if self.body.sleep {
            return;
        }
        for (i, behaviour) in self.emitter_behaviours.iter_mut().enumerate().rev() {
            behaviour.apply_behaviour(&mut self.body, time, i, &mut Neighbours::none());
        }
    }

    /// Kill the emitter. Finalization waits until every particle is reaped.
    pub fn destroy(&mut self) {
        self.body.dead = true;
        self.body.energy = 0.0;
        self.total_emit_times = -1.0;
        if self.particles.is_empty() {
            self.finalize();
        }
    }

    fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        self.is_emitting = false;
        self.remove_all_initializers();
        self.remove_all_behaviours();
        self.emitter_behaviours.clear();

        self.dispatcher.dispatch(&SystemEvent::EmitterDead(self.id));
        for callback in &mut self.on_dead {
            callback(self.id);
        }
        self.on_dead.clear();
        log::debug!("{} finalized", self.id);
    }

    // --- setup ---

    pub fn add_initializer(&mut self, initializer: Initializer) {
        self.initializers.push(initializer);
    }

    pub fn add_initializers(&mut self, initializers: impl IntoIterator<Item = Initializer>) {
        self.initializers.extend(initializers);
    }

    /// Returns how many initializers of `kind` were removed
    pub fn remove_initializer(&mut self, kind: InitializerKind) -> usize {
        let before = self.initializers.len();
        self.initializers.retain(|i| i.kind() != kind);
        before - self.initializers.len()
    }

    pub fn remove_all_initializers(&mut self) {
        self.initializers.clear();
    }

    pub fn initializers(&self) -> &[Initializer] {
        &self.initializers
    }

    /// Attach to every particle spawned from now on
    pub fn add_behaviour(&mut self, behaviour: Box<dyn Behaviour>) {
        self.behaviours.push(behaviour);
    }

    pub fn add_behaviours(&mut self, behaviours: impl IntoIterator<Item = Box<dyn Behaviour>>) {
        self.behaviours.extend(behaviours);
    }

    /// Remove a particle behaviour kind from the templates and from every
    /// live particle
    pub fn remove_behaviour(&mut self, kind: BehaviourKind) -> usize {
        let before = self.behaviours.len();
        self.behaviours.retain(|b| b.kind() != kind);
        for particle in &mut self.particles {
            particle.remove_behaviour(kind);
        }
        before - self.behaviours.len()
    }

    pub fn remove_all_behaviours(&mut self) {
        self.behaviours.clear();
        for particle in &mut self.particles {
            particle.remove_all_behaviours();
        }
    }

    pub fn behaviours(&self) -> &[Box<dyn Behaviour>] {
        &self.behaviours
    }

    /// Attach a behaviour to the emitter's own body
    pub fn add_emitter_behaviour(&mut self, mut behaviour: Box<dyn Behaviour>, rng: &mut ParticleRng) {
        behaviour.initialize(&mut self.body, rng);
        self.emitter_behaviours.push(behaviour);
    }

    pub fn remove_emitter_behaviour(&mut self, kind: BehaviourKind) -> usize {
        let before = self.emitter_behaviours.len();
        self.emitter_behaviours.retain(|b| b.kind() != kind);
        before - self.emitter_behaviours.len()
    }

    pub fn emitter_behaviours(&self) -> &[Box<dyn Behaviour>] {
        &self.emitter_behaviours
    }

    // --- particles ---

    pub fn particles(&self) -> &[Pooled<Particle>] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Drop every particle without returning it to a pool
    pub(crate) fn drop_particles(&mut self) {
        self.particles.clear();
    }

    // --- events ---

    /// Called once when the emitter finalizes
    pub fn add_on_emitter_dead<F>(&mut self, callback: F)
    where
        F: FnMut(EmitterId) + 'static,
    {
        self.on_dead.push(Box::new(callback));
    }

    /// Listen on this emitter's own dispatcher. Particle events only arrive
    /// here when `bind_event` is set; `EmitterDead` always does.
    pub fn add_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&SystemEvent<'_>) + 'static,
    {
        self.dispatcher.add_listener(kind, callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.dispatcher.remove_listener(id)
    }
}

impl Kinematic for Emitter {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("particles", &self.particles.len())
            .field("is_emitting", &self.is_emitting)
            .field("total_emit_times", &self.total_emit_times)
            .field("current_emit_time", &self.current_emit_time)
            .field("dead", &self.body.dead)
            .field("finalized", &self.finalized)
            .finish()
    }
}
