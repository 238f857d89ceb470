//! Identifiers for particles, emitters and event listeners

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic counter that hands out raw identifiers.
///
/// Each `System` (and each pool factory) owns its own sequence, so ids are
/// unique within one simulation and start over when a new one is created.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSequence {
    /// Create a sequence whose first id is 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next raw id
    pub fn next_raw(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Identity of one pooled particle. Stable across recycling.
#[derive(Clone, Copy, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleId(pub u64);

/// Identity of an emitter within its owning system
#[derive(Clone, Copy, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmitterId(pub u64);

/// Handle returned when registering an event listener
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct ListenerId(pub u64);

impl ParticleId {
    pub fn next(seq: &mut IdSequence) -> Self {
        Self(seq.next_raw())
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl EmitterId {
    pub fn next(seq: &mut IdSequence) -> Self {
        Self(seq.next_raw())
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl ListenerId {
    pub fn next(seq: &mut IdSequence) -> Self {
        Self(seq.next_raw())
    }
}

impl fmt::Debug for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticleId({})", self.0)
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "particle_{}", self.0)
    }
}

impl fmt::Debug for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmitterId({})", self.0)
    }
}

impl fmt::Display for EmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "emitter_{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_are_independent() {
        let mut a = IdSequence::new();
        let mut b = IdSequence::new();
        let first = ParticleId::next(&mut a);
        let second = ParticleId::next(&mut a);
        assert!(second.0 > first.0);
        assert_eq!(ParticleId::next(&mut b), first);
    }

    #[test]
    fn test_display() {
        assert_eq!(ParticleId(7).to_string(), "particle_7");
        assert_eq!(EmitterId(3).to_string(), "emitter_3");
    }
}
