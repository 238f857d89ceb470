//! Synchronous lifecycle notifications

use crate::particle::Particle;
use kindle_core::{EmitterId, IdSequence, ListenerId};

/// Which lifecycle transition an event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ParticleCreated,
    ParticleUpdate,
    ParticleDead,
    SystemUpdate,
    SystemUpdateAfter,
    EmitterAdded,
    EmitterRemoved,
    EmitterDead,
}

/// A lifecycle event. Particle events borrow the particle for the
/// duration of the dispatch only.
#[derive(Debug, Clone, Copy)]
pub enum SystemEvent<'a> {
    ParticleCreated(&'a Particle),
    ParticleUpdate(&'a Particle),
    ParticleDead(&'a Particle),
    /// An emitter still has (or has just run out of) live particles
    SystemUpdate(EmitterId),
    /// End of a `System::update` tick
    SystemUpdateAfter,
    EmitterAdded(EmitterId),
    EmitterRemoved(EmitterId),
    EmitterDead(EmitterId),
}

impl SystemEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            SystemEvent::ParticleCreated(_) => EventKind::ParticleCreated,
            SystemEvent::ParticleUpdate(_) => EventKind::ParticleUpdate,
            SystemEvent::ParticleDead(_) => EventKind::ParticleDead,
            SystemEvent::SystemUpdate(_) => EventKind::SystemUpdate,
            SystemEvent::SystemUpdateAfter => EventKind::SystemUpdateAfter,
            SystemEvent::EmitterAdded(_) => EventKind::EmitterAdded,
            SystemEvent::EmitterRemoved(_) => EventKind::EmitterRemoved,
            SystemEvent::EmitterDead(_) => EventKind::EmitterDead,
        }
    }

    /// The particle this event is about, if any
    pub fn particle(&self) -> Option<&Particle> {
        match self {
            SystemEvent::ParticleCreated(p)
            | SystemEvent::ParticleUpdate(p)
            | SystemEvent::ParticleDead(p) => Some(p),
            _ => None,
        }
    }
}

pub type Listener = Box<dyn FnMut(&SystemEvent<'_>)>;

struct Registration {
    id: ListenerId,
    /// `None` listens to everything
    kind: Option<EventKind>,
    callback: Listener,
}

/// Minimal pub/sub. Listeners run synchronously, in registration order,
/// inside the call that produced the event.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Registration>,
    ids: IdSequence,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to one kind of event
    pub fn add_listener<F>(&mut self, kind: EventKind, callback: F) -> ListenerId
    where
        F: FnMut(&SystemEvent<'_>) + 'static,
    {
        self.register(Some(kind), Box::new(callback))
    }

    /// Listen to every event
    pub fn add_listener_all<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut(&SystemEvent<'_>) + 'static,
    {
        self.register(None, Box::new(callback))
    }

    fn register(&mut self, kind: Option<EventKind>, callback: Listener) -> ListenerId {
        let id = ListenerId::next(&mut self.ids);
        self.listeners.push(Registration { id, kind, callback });
        id
    }

    /// Returns false if `id` was not registered
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| r.id != id);
        self.listeners.len() != before
    }

    pub fn remove_all_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn has_listener(&self, kind: EventKind) -> bool {
        self.listeners
            .iter()
            .any(|r| r.kind.map_or(true, |k| k == kind))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn dispatch(&mut self, event: &SystemEvent<'_>) {
        let kind = event.kind();
        for registration in &mut self.listeners {
            if registration.kind.map_or(true, |k| k == kind) {
                (registration.callback)(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<EventKind>>>, impl FnMut(&SystemEvent<'_>) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |e: &SystemEvent<'_>| sink.borrow_mut().push(e.kind()))
    }

    #[test]
    fn filters_by_kind() {
        let mut dispatcher = EventDispatcher::new();
        let (seen, listener) = recorder();
        dispatcher.add_listener(EventKind::EmitterDead, listener);

        dispatcher.dispatch(&SystemEvent::SystemUpdateAfter);
        dispatcher.dispatch(&SystemEvent::EmitterDead(EmitterId(1)));
        assert_eq!(*seen.borrow(), vec![EventKind::EmitterDead]);
    }

    #[test]
    fn catch_all_sees_everything_in_order() {
        let mut dispatcher = EventDispatcher::new();
        let (seen, listener) = recorder();
        dispatcher.add_listener_all(listener);

        let p = Particle::default();
        dispatcher.dispatch(&SystemEvent::ParticleCreated(&p));
        dispatcher.dispatch(&SystemEvent::ParticleDead(&p));
        dispatcher.dispatch(&SystemEvent::SystemUpdateAfter);
        assert_eq!(
            *seen.borrow(),
            vec![
                EventKind::ParticleCreated,
                EventKind::ParticleDead,
                EventKind::SystemUpdateAfter
            ]
        );
    }

    #[test]
    fn removed_listener_is_silent() {
        let mut dispatcher = EventDispatcher::new();
        let (seen, listener) = recorder();
        let id = dispatcher.add_listener_all(listener);
        assert!(dispatcher.has_listener(EventKind::ParticleUpdate));
        assert!(dispatcher.remove_listener(id));
        assert!(!dispatcher.remove_listener(id));
        dispatcher.dispatch(&SystemEvent::SystemUpdateAfter);
        assert!(seen.borrow().is_empty());
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn remove_all_listeners_silences_every_kind() {
        let mut dispatcher = EventDispatcher::new();
        let (seen, listener) = recorder();
        dispatcher.add_listener(EventKind::EmitterAdded, listener);
        let (seen_all, listener_all) = recorder();
        dispatcher.add_listener_all(listener_all);
        assert_eq!(dispatcher.len(), 2);

        dispatcher.remove_all_listeners();
        assert!(dispatcher.is_empty());
        dispatcher.dispatch(&SystemEvent::EmitterAdded(EmitterId(2)));
        assert!(seen.borrow().is_empty());
        assert!(seen_all.borrow().is_empty());
    }

    #[test]
    fn particle_accessor() {
        let p = Particle::default();
        assert!(SystemEvent::ParticleUpdate(&p).particle().is_some());
        assert!(SystemEvent::EmitterAdded(EmitterId(1)).particle().is_none());
    }
}
