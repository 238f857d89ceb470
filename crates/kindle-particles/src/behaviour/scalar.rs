//! Alpha and scale interpolators

use super::{Behaviour, BehaviourKind, BehaviourState, Neighbours};
use crate::body::Body;
use crate::rand::ParticleRng;
use crate::span::Span;

/// Sample a (start, end) pair; a missing end repeats the start
fn sample_pair(a: &Span, b: Option<&Span>, rng: &mut ParticleRng) -> (f32, f32) {
    let start = a.value(rng);
    let end = b.map_or(start, |b| b.value(rng));
    (start, end)
}

/// Blend from `start` (energy 1) to `end` (energy 0)
fn blend((start, end): (f32, f32), energy: f32) -> f32 {
    end + (start - end) * energy
}

/// Fades `alpha` from `a` to `b` over the target's life
#[derive(Debug, Clone)]
pub struct Alpha {
    pub a: Span,
    pub b: Option<Span>,
    state: BehaviourState,
}

impl Alpha {
    pub fn new(a: Span, b: Option<Span>, life: Option<f32>, easing: &str) -> Self {
        Self {
            a,
            b,
            state: BehaviourState::new(life, easing),
        }
    }
}

impl Behaviour for Alpha {
    fn kind(&self) -> BehaviourKind {
        BehaviourKind::Alpha
    }

    fn state(&self) -> &BehaviourState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BehaviourState {
        &mut self.state
    }

    fn clone_box(&self) -> Box<dyn Behaviour> {
        Box::new(self.clone())
    }

    fn initialize(&mut self, target: &mut Body, rng: &mut ParticleRng) {
        target.endpoints.alpha = Some(sample_pair(&self.a, self.b.as_ref(), rng));
    }

    fn mutate(&mut self, target: &mut Body, time: f32, _index: usize, _peers: &mut Neighbours<'_>) {
        self.energize(target, time);
        if self.state.dead {
            return;
        }
        if let Some(pair) = target.endpoints.alpha {
            let alpha = blend(pair, self.state.energy);
            target.alpha = if alpha < 0.002 { 0.0 } else { alpha };
        }
    }
}

/// Scales from `a` to `b` over the target's life
#[derive(Debug, Clone)]
pub struct Scale {
    pub a: Span,
    pub b: Option<Span>,
    state: BehaviourState,
}

impl Scale {
    pub fn new(a: Span, b: Option<Span>, life: Option<f32>, easing: &str) -> Self {
        Self {
            a,
            b,
            state: BehaviourState::new(life, easing),
        }
    }
}

impl Behaviour for Scale {
    fn kind(&self) -> BehaviourKind {
        BehaviourKind::Scale
    }

    fn state(&self) -> &BehaviourState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut BehaviourState {
        &mut self.state
    }

    fn clone_box(&self) -> Box<dyn Behaviour> {
        Box::new(self.clone())
    }

    fn initialize(&mut self, target: &mut Body, rng: &mut ParticleRng) {
        target.endpoints.scale = Some(sample_pair(&self.a, self.b.as_ref(), rng));
    }

    fn mutate(&mut self, target: &mut Body, time: f32, _index: usize, _peers: &mut Neighbours<'_>) {
        self.energize(target, time);
        if self.state.dead {
            return;
        }
        if let Some(pair) = target.endpoints.scale {
            let scale = blend(pair, self.state.energy);
            target.scale = if scale < 0.0001 { 0.0 } else { scale };
        }
    }
}
