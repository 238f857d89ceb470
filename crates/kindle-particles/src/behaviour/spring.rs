//! Pull toward a fixed point

use super::{Behaviour, BehaviourKind, BehaviourState, Neighbours};
use crate::body::Body;
use kindle_core::Vec3;

/// Corrects velocity in proportion to the offset from `point`, then damps
/// it by `friction`.
#[derive(Debug, Clone)]
pub struct Spring {
    pub point: Vec3,
    pub spring: f32,
    pub friction: f32,
    state: BehaviourState,
}

impl Spring {
    pub fn new(point: Vec3, spring: f32, friction: f32, life: Option<f32>, easing: &str) -> Self {
        Self {
            point,
            spring,
            friction,
            state: BehaviourState::new(life, easing),
        }
    }
}

impl Behaviour for Spring {
    fn kind(&self) -> BehaviourKind {
        BehaviourKind::Spring
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

    fn mutate(&mut self, target: &mut Body, time: f32, _index: usize, _peers: &mut Neighbours<'_>) {
        self.energize(target, time);
        if self.state.dead {
            return;
        }
        target.velocity += (self.point - target.position) * self.spring;
        target.velocity *= self.friction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulls_toward_point() {
        let mut spring = Spring::new(Vec3::new(10.0, 0.0, 0.0), 0.1, 1.0, None, "linear");
        let mut body = Body::new();
        spring.apply_behaviour(&mut body, 0.016, 0, &mut Neighbours::none());
        assert!((body.velocity.x - 1.0).abs() < 1e-6);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn friction_damps_velocity() {
        let mut spring = Spring::new(Vec3::ZERO, 0.0, 0.5, None, "linear");
        let mut body = Body::new();
        body.velocity = Vec3::new(4.0, 0.0, 0.0);
        spring.apply_behaviour(&mut body, 0.016, 0, &mut Neighbours::none());
        assert!((body.velocity.x - 2.0).abs() < 1e-6);
    }
}
