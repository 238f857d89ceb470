//! Random acceleration kicks

use super::{Behaviour, BehaviourKind, BehaviourState, Neighbours};
use crate::body::Body;
use crate::rand::ParticleRng;
use kindle_core::Vec3;

/// Every `delay` seconds, adds a random acceleration within `±drift` per axis
#[derive(Debug, Clone)]
pub struct RandomDrift {
    pub drift: Vec3,
    pub delay: f32,
    elapsed: f32,
    rng: ParticleRng,
    state: BehaviourState,
}

impl RandomDrift {
    pub fn new(drift: Vec3, delay: f32, life: Option<f32>, easing: &str) -> Self {
        Self {
            drift,
            delay,
            elapsed: 0.0,
            rng: ParticleRng::new(1),
            state: BehaviourState::new(life, easing),
        }
    }
}

impl Behaviour for RandomDrift {
    fn kind(&self) -> BehaviourKind {
        BehaviourKind::RandomDrift
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

    fn initialize(&mut self, _target: &mut Body, rng: &mut ParticleRng) {
        self.rng = ParticleRng::new(rng.next_u32());
        self.elapsed = 0.0;
    }

    fn mutate(&mut self, target: &mut Body, time: f32, _index: usize, _peers: &mut Neighbours<'_>) {
        self.energize(target, time);
        if self.state.dead {
            return;
        }

        self.elapsed += time;
        if self.elapsed < self.delay {
            return;
        }
        self.elapsed = 0.0;
        target.acceleration += Vec3::new(
            self.rng.range(-self.drift.x, self.drift.x),
            self.rng.range(-self.drift.y, self.drift.y),
            self.rng.range(-self.drift.z, self.drift.z),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kicks_only_after_delay() {
        let mut drift = RandomDrift::new(Vec3::new(5.0, 5.0, 0.0), 0.1, None, "linear");
        let mut body = Body::new();
        drift.initialize(&mut body, &mut ParticleRng::new(3));

        drift.apply_behaviour(&mut body, 0.05, 0, &mut Neighbours::none());
        assert_eq!(body.acceleration, Vec3::ZERO);

        drift.apply_behaviour(&mut body, 0.06, 0, &mut Neighbours::none());
        assert!(body.acceleration.x.abs() <= 5.0);
        assert!(body.acceleration.y.abs() <= 5.0);
        assert_eq!(body.acceleration.z, 0.0);
        assert_ne!(body.acceleration, Vec3::ZERO);
    }
}
