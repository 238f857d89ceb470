//! Top-level orchestrator: owns the pool, the emitters and the event bus

use crate::emitter::Emitter;
use crate::event::{EventDispatcher, EventKind, SystemEvent};
use crate::particle::{Particle, ParticleFactory};
use crate::pool::{Factory, Pool};
use crate::rand::ParticleRng;
use crate::render::Renderer;
use futures::channel::oneshot;
use futures::future::{self, FutureExt};
use kindle_core::{EmitterId, IdSequence, ListenerId, Result};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

/// Seed used by [`System::new`]
pub const DEFAULT_SEED: u32 = 0xDEAD_BEEF;

/// Shared state an emitter needs while it updates: where particles come
/// from, where they go back to, and who hears about it.
pub struct SystemContext<'a> {
    pub pool: &'a mut Pool<Particle>,
    pub factory: &'a Rc<dyn Factory<Particle>>,
    pub rng: &'a mut ParticleRng,
    pub dispatcher: &'a mut EventDispatcher,
    pub renderers: &'a [Rc<RefCell<dyn Renderer>>],
}

impl SystemContext<'_> {
    pub fn notify(&mut self, event: &SystemEvent<'_>) {
        broadcast(self.dispatcher, self.renderers, event);
    }
}

fn broadcast(
    dispatcher: &mut EventDispatcher,
    renderers: &[Rc<RefCell<dyn Renderer>>],
    event: &SystemEvent<'_>,
) {
    dispatcher.dispatch(event);
    for renderer in renderers {
        let mut renderer = renderer.borrow_mut();
        match *event {
            SystemEvent::ParticleCreated(p) => renderer.on_particle_created(p),
            SystemEvent::ParticleUpdate(p) => renderer.on_particle_update(p),
            SystemEvent::ParticleDead(p) => renderer.on_particle_dead(p),
            SystemEvent::SystemUpdate(id) => renderer.on_system_update(id),
            _ => {}
        }
    }
}

/// Callbacks for [`System::emit`]
#[derive(Default)]
pub struct EmitHooks {
    /// Runs once when emission starts
    pub on_start: Option<Box<dyn FnOnce()>>,
    /// Runs once per emitter as it finishes; infinite emitters finish at once
    pub on_end: Option<Box<dyn FnMut()>>,
}

/// Steps a set of emitters that share one particle pool.
pub struct System {
    pool: Pool<Particle>,
    factory: Rc<dyn Factory<Particle>>,
    emitters: Vec<Emitter>,
    renderers: Vec<Rc<RefCell<dyn Renderer>>>,
    dispatcher: EventDispatcher,
    rng: ParticleRng,
    emitter_ids: IdSequence,
    can_update: bool,
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl System {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u32) -> Self {
        Self::with_factory(Rc::new(ParticleFactory::new()), seed)
    }

    /// Use a custom particle factory for the pool
    pub fn with_factory(factory: Rc<dyn Factory<Particle>>, seed: u32) -> Self {
        Self {
            pool: Pool::new(),
            factory,
            emitters: Vec::new(),
            renderers: Vec::new(),
            dispatcher: EventDispatcher::new(),
            rng: ParticleRng::new(seed),
            emitter_ids: IdSequence::new(),
            can_update: true,
        }
    }

    // --- emitters ---

    /// Take ownership of `emitter`, assigning its id and index
    pub fn add_emitter(&mut self, mut emitter: Emitter) -> EmitterId {
        let id = EmitterId::next(&mut self.emitter_ids);
        emitter.id = id;
        emitter.index = self.emitters.len();
        self.emitters.push(emitter);
        self.dispatcher.dispatch(&SystemEvent::EmitterAdded(id));
        log::debug!("added {id}");
        id
    }

    /// Detach an emitter. Returns `None` if it does not belong to this system.
    pub fn remove_emitter(&mut self, id: EmitterId) -> Option<Emitter> {
        let index = self.emitters.iter().position(|e| e.id == id)?;
        Some(self.detach(index))
    }

    fn detach(&mut self, index: usize) -> Emitter {
        let emitter = self.emitters.remove(index);
        for (i, e) in self.emitters.iter_mut().enumerate().skip(index) {
            e.index = i;
        }
        self.dispatcher
            .dispatch(&SystemEvent::EmitterRemoved(emitter.id));
        log::debug!("removed {}", emitter.id);
        emitter
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters.iter().find(|e| e.id == id)
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters.iter_mut().find(|e| e.id == id)
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    // --- tick ---

    /// Advance every emitter by `delta` seconds, newest first. Emitters that
    /// have died and drained are removed.
    ///
    /// A failing emitter does not stop the tick: the rest are still stepped
    /// and `SystemUpdateAfter` is still sent. The first error is returned.
    pub fn update(&mut self, delta: f32) -> Result<()> {
        if !self.can_update {
            return Ok(());
        }

        let mut first_error = None;
        if delta > 0.0 {
            let mut i = self.emitters.len();
            while i > 0 {
                i -= 1;
                let finalized = {
                    let mut ctx = SystemContext {
                        pool: &mut self.pool,
                        factory: &self.factory,
                        rng: &mut self.rng,
                        dispatcher: &mut self.dispatcher,
                        renderers: &self.renderers,
                    };
                    let emitter = &mut self.emitters[i];
                    if let Err(e) = emitter.update(delta, &mut ctx) {
                        log::warn!("{} failed to update: {e}", emitter.id);
                        first_error.get_or_insert(e);
                    }
                    if emitter.particle_count() > 0 {
                        ctx.notify(&SystemEvent::SystemUpdate(emitter.id));
                    }
                    emitter.is_finalized()
                };
                if finalized {
                    let id = self.emitters[i].id;
                    self.dispatcher.dispatch(&SystemEvent::EmitterDead(id));
                    self.detach(i);
                }
            }
        }

        self.dispatcher.dispatch(&SystemEvent::SystemUpdateAfter);
        log::trace!("tick {delta}: {} live particle(s)", self.count());
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Start every emitter with its configured schedule.
    ///
    /// `on_start` runs once. Emitters with infinite life are considered done
    /// right away (`on_end` runs for each immediately); the returned future
    /// completes once every finite emitter has died. An emitter dropped
    /// before it dies is logged and skipped, not treated as an error.
    pub fn emit(&mut self, hooks: EmitHooks) -> impl Future<Output = ()> + 'static {
        let EmitHooks { on_start, on_end } = hooks;
        let on_end = Rc::new(RefCell::new(on_end));
        if let Some(on_start) = on_start {
            on_start();
        }

        let mut pending = Vec::new();
        for emitter in &mut self.emitters {
            emitter.emit_configured();
            if emitter.body.life.is_infinite() {
                run_on_end(&on_end);
                continue;
            }
            let (tx, rx) = oneshot::channel::<()>();
            let mut tx = Some(tx);
            let on_end = Rc::clone(&on_end);
            emitter.add_on_emitter_dead(move |_| {
                if let Some(tx) = tx.take() {
                    let _ = tx.send(());
                }
                run_on_end(&on_end);
            });
            let id = emitter.id;
            pending.push(rx.map(move |result| (id, result)));
        }

        future::join_all(pending).map(|results| {
            for (id, result) in results {
                if result.is_err() {
                    log::warn!("{id} was dropped before it finished emitting");
                }
            }
        })
    }

    /// Tear everything down. Live particles are dropped, not pooled.
    pub fn destroy(&mut self) {
        self.can_update = false;
        for emitter in &mut self.emitters {
            emitter.destroy();
            emitter.drop_particles();
        }
        for renderer in &self.renderers {
            renderer.borrow_mut().destroy();
        }
        self.renderers.clear();
        self.emitters.clear();
        self.pool.destroy();
        self.can_update = true;
        log::debug!("system destroyed");
    }

    // --- queries ---

    /// Live particles across all emitters
    pub fn count(&self) -> usize {
        self.emitters.iter().map(Emitter::particle_count).sum()
    }

    pub fn particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.emitters
            .iter()
            .flat_map(|e| e.particles().iter().map(|p| &**p))
    }

    pub fn pool(&self) -> &Pool<Particle> {
        &self.pool
    }

    /// Random source used for spawning; also handy for initializing
    /// emitter behaviours before adding them.
    pub fn rng_mut(&mut self) -> &mut ParticleRng {
        &mut self.rng
    }

    pub fn can_update(&self) -> bool {
        self.can_update
    }

    // --- subscribers ---

    pub fn add_renderer(&mut self, renderer: Rc<RefCell<dyn Renderer>>) {
        self.renderers.push(renderer);
    }

    /// Returns false if `renderer` was not registered
    pub fn remove_renderer(&mut self, renderer: &Rc<RefCell<dyn Renderer>>) -> bool {
        let target = Rc::as_ptr(renderer) as *const ();
        let before = self.renderers.len();
        self.renderers
            .retain(|r| Rc::as_ptr(r) as *const () != target);
        self.renderers.len() != before
    }

    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    pub fn add_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&SystemEvent<'_>) + 'static,
    {
        self.dispatcher.add_listener(kind, callback)
    }

    pub fn add_listener_all<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&SystemEvent<'_>) + 'static,
    {
        self.dispatcher.add_listener_all(callback)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.dispatcher.remove_listener(id)
    }
}

fn run_on_end(on_end: &Rc<RefCell<Option<Box<dyn FnMut()>>>>) {
    if let Some(callback) = on_end.borrow_mut().as_mut() {
        callback();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initializer::Initializer;
    use crate::rate::Rate;
    use crate::render::InstanceRenderer;
    use crate::span::Span;
    use std::cell::Cell;

    fn emitter(per_tick: f32, particle_life: f32) -> Emitter {
        let mut e = Emitter::with_rate(Rate::per_tick(per_tick));
        e.add_initializer(Initializer::Life(Span::fixed(particle_life)));
        e
    }

    fn record(system: &mut System) -> Rc<RefCell<Vec<EventKind>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        system.add_listener_all(move |e| sink.borrow_mut().push(e.kind()));
        seen
    }

    #[test]
    fn add_and_remove_emitters() {
        let mut system = System::new();
        let seen = record(&mut system);
        let a = system.add_emitter(Emitter::new());
        let b = system.add_emitter(Emitter::new());
        let c = system.add_emitter(Emitter::new());
        assert_ne!(a, b);

        let removed = system.remove_emitter(a).unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(system.emitter(b).unwrap().index, 0);
        assert_eq!(system.emitter(c).unwrap().index, 1);
        assert!(system.remove_emitter(a).is_none());
        assert_eq!(
            *seen.borrow(),
            vec![
                EventKind::EmitterAdded,
                EventKind::EmitterAdded,
                EventKind::EmitterAdded,
                EventKind::EmitterRemoved,
            ]
        );
    }

    #[test]
    fn update_steps_every_emitter() {
        let mut system = System::new();
        let a = system.add_emitter(emitter(2.0, 10.0));
        let b = system.add_emitter(emitter(3.0, 10.0));
        for id in [a, b] {
            system.emitter_mut(id).unwrap().emit(f32::INFINITY, f32::INFINITY);
        }
        system.update(0.1).unwrap();
        system.update(0.1).unwrap();
        assert_eq!(system.count(), 10);
        assert_eq!(system.particles().count(), 10);
    }

    #[test]
    fn zero_delta_only_reports_after() {
        let mut system = System::new();
        let id = system.add_emitter(emitter(2.0, 10.0));
        system.emitter_mut(id).unwrap().emit(f32::INFINITY, f32::INFINITY);
        let seen = record(&mut system);
        system.update(0.0).unwrap();
        assert_eq!(system.count(), 0);
        assert_eq!(*seen.borrow(), vec![EventKind::SystemUpdateAfter]);
    }

    struct Inert;

    impl Factory<Particle> for Inert {}

    #[test]
    fn failing_emitter_does_not_cut_the_tick_short() {
        let mut system = System::with_factory(Rc::new(Inert), 1);
        let a = system.add_emitter(emitter(2.0, 10.0));
        let b = system.add_emitter(emitter(2.0, 10.0));
        for id in [a, b] {
            system.emitter_mut(id).unwrap().emit(f32::INFINITY, f32::INFINITY);
        }
        let seen = record(&mut system);

        let err = system.update(1.0).unwrap_err();
        assert!(matches!(err, kindle_core::KindleError::UnsupportedFactory(_)));
        for id in [a, b] {
            assert_eq!(system.emitter(id).unwrap().body.age, 1.0);
        }
        assert_eq!(seen.borrow().last(), Some(&EventKind::SystemUpdateAfter));
        assert_eq!(system.count(), 0);
    }

    #[test]
    fn system_update_is_reported_per_busy_emitter() {
        let mut system = System::new();
        let a = system.add_emitter(emitter(1.0, 10.0));
        system.add_emitter(emitter(1.0, 10.0));
        system.emitter_mut(a).unwrap().emit(f32::INFINITY, f32::INFINITY);

        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        system.add_listener(EventKind::SystemUpdate, move |_| sink.set(sink.get() + 1));
        system.update(0.1).unwrap();
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn particles_are_recycled_across_emitters() {
        let mut system = System::new();
        let a = system.add_emitter(emitter(4.0, 0.15));
        system.emitter_mut(a).unwrap().emit(f32::INFINITY, f32::INFINITY);
        for _ in 0..10 {
            system.update(0.1).unwrap();
        }
        // at most two generations are ever alive at once
        assert!(system.pool().created() <= 8);
    }

    #[test]
    fn finished_emitters_are_removed() {
        let mut system = System::new();
        let seen = record(&mut system);
        let id = system.add_emitter(emitter(2.0, 0.05));
        system.emitter_mut(id).unwrap().emit(1.0, f32::NAN);

        for _ in 0..20 {
            system.update(0.1).unwrap();
        }
        assert!(system.emitter(id).is_none());
        assert!(system.emitters().is_empty());
        let seen = seen.borrow();
        let dead = seen.iter().filter(|k| **k == EventKind::EmitterDead).count();
        assert_eq!(dead, 1);
        assert!(seen.contains(&EventKind::EmitterRemoved));
    }

    #[test]
    fn renderers_mirror_live_particles() {
        let mut system = System::new();
        let renderer = Rc::new(RefCell::new(InstanceRenderer::new()));
        system.add_renderer(renderer.clone());
        let id = system.add_emitter(emitter(3.0, 0.25));
        system.emitter_mut(id).unwrap().emit(f32::INFINITY, f32::INFINITY);

        for _ in 0..5 {
            system.update(0.1).unwrap();
            assert_eq!(renderer.borrow().len(), system.count());
        }
        assert!(renderer.borrow().frames() > 0);

        let handle: Rc<RefCell<dyn Renderer>> = renderer.clone();
        assert!(system.remove_renderer(&handle));
        assert!(!system.remove_renderer(&handle));
    }

    #[test]
    fn emit_resolves_when_finite_emitters_die() {
        let mut system = System::new();
        let finite = system.add_emitter(emitter(2.0, 0.05));
        system.emitter_mut(finite).unwrap().set_total_emit_times(0.2);
        system.emitter_mut(finite).unwrap().set_life(0.3);
        system.add_emitter(emitter(1.0, 0.05));

        let started = Rc::new(Cell::new(0));
        let ended = Rc::new(Cell::new(0));
        let (s, e) = (Rc::clone(&started), Rc::clone(&ended));
        let mut done = system
            .emit(EmitHooks {
                on_start: Some(Box::new(move || s.set(s.get() + 1))),
                on_end: Some(Box::new(move || e.set(e.get() + 1))),
            })
            .boxed_local();

        assert_eq!(started.get(), 1);
        // the infinite emitter ends immediately
        assert_eq!(ended.get(), 1);
        assert!((&mut done).now_or_never().is_none());

        for _ in 0..10 {
            system.update(0.1).unwrap();
        }
        assert_eq!(ended.get(), 2);
        assert!(done.now_or_never().is_some());
    }

    #[test]
    fn emit_survives_dropped_emitters() {
        let mut system = System::new();
        let id = system.add_emitter(emitter(1.0, 10.0));
        system.emitter_mut(id).unwrap().set_life(5.0);
        let done = system.emit(EmitHooks::default());
        system.update(0.1).unwrap();
        system.destroy();
        futures::executor::block_on(done);
    }

    #[test]
    fn destroy_clears_everything() {
        let mut system = System::new();
        let renderer = Rc::new(RefCell::new(InstanceRenderer::new()));
        system.add_renderer(renderer.clone());
        let id = system.add_emitter(emitter(5.0, 10.0));
        system.emitter_mut(id).unwrap().emit(f32::INFINITY, f32::INFINITY);
        system.update(0.1).unwrap();
        assert_eq!(renderer.borrow().len(), 5);

        system.destroy();
        assert!(system.emitters().is_empty());
        assert_eq!(system.count(), 0);
        assert_eq!(system.renderer_count(), 0);
        assert_eq!(system.pool().free_count(), 0);
        assert!(renderer.borrow().is_empty());
        assert!(system.can_update());
    }
}
