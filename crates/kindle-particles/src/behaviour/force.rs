//! Constant acceleration contributions

use super::{Behaviour, BehaviourKind, BehaviourState, Neighbours};
use crate::body::Body;
use kindle_core::Vec3;

/// Adds a constant vector to the target's acceleration every tick
#[derive(Debug, Clone)]
pub struct Force {
    pub force: Vec3,
    state: BehaviourState,
}

impl Force {
    pub fn new(force: Vec3, life: Option<f32>, easing: &str) -> Self {
        Self {
            force,
            state: BehaviourState::new(life, easing),
        }
    }
}

impl Behaviour for Force {
    fn kind(&self) -> BehaviourKind {
        BehaviourKind::Force
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
        target.acceleration += self.force;
    }
}

/// Downward force of magnitude `g` along -Y
#[derive(Debug, Clone)]
pub struct Gravity {
    force: Force,
}

impl Gravity {
    pub fn new(g: f32, life: Option<f32>, easing: &str) -> Self {
        Self {
            force: Force::new(Vec3::new(0.0, -g, 0.0), life, easing),
        }
    }

    pub fn g(&self) -> f32 {
        -self.force.force.y
    }
}

impl Behaviour for Gravity {
    fn kind(&self) -> BehaviourKind {
        BehaviourKind::Gravity
    }

    fn state(&self) -> &BehaviourState {
        self.force.state()
    }

    fn state_mut(&mut self) -> &mut BehaviourState {
        self.force.state_mut()
    }

    fn clone_box(&self) -> Box<dyn Behaviour> {
        Box::new(self.clone())
    }

    fn mutate(&mut self, target: &mut Body, time: f32, index: usize, peers: &mut Neighbours<'_>) {
        self.force.mutate(target, time, index, peers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_accumulates_into_acceleration() {
        let mut force = Force::new(Vec3::new(1.0, 2.0, 0.0), None, "linear");
        let mut body = Body::new();
        force.apply_behaviour(&mut body, 0.1, 0, &mut Neighbours::none());
        force.apply_behaviour(&mut body, 0.1, 0, &mut Neighbours::none());
        assert_eq!(body.acceleration, Vec3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn expired_force_stops_contributing() {
        let mut force = Force::new(Vec3::UP, Some(0.15), "linear");
        let mut body = Body::new();
        force.apply_behaviour(&mut body, 0.1, 0, &mut Neighbours::none());
        force.apply_behaviour(&mut body, 0.1, 0, &mut Neighbours::none());
        force.apply_behaviour(&mut body, 0.1, 0, &mut Neighbours::none());
        assert_eq!(body.acceleration, Vec3::UP);
        assert!(force.is_dead());
    }

    #[test]
    fn gravity_points_down() {
        let mut gravity = Gravity::new(9.8, None, "linear");
        assert!((gravity.g() - 9.8).abs() < 1e-6);
        let mut body = Body::new();
        gravity.apply_behaviour(&mut body, 0.016, 0, &mut Neighbours::none());
        assert!((body.acceleration.y + 9.8).abs() < 1e-6);
        assert_eq!(gravity.kind(), BehaviourKind::Gravity);
    }
}
