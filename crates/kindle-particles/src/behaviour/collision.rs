//! Pairwise proximity repulsion

use super::{Behaviour, BehaviourKind, BehaviourState, Neighbours};
use crate::body::Body;

/// Pushes overlapping particles apart.
///
/// Checks the target against every later particle of the same emitter, so a
/// full pass costs O(n²) per tick. Overlap is measured against the sum of
/// both radii; the separation is split evenly, or by inverse mass share
/// when `use_mass` is set.
#[derive(Debug, Clone)]
pub struct Collision {
    pub use_mass: bool,
    state: BehaviourState,
}

impl Collision {
    pub fn new(use_mass: bool, life: Option<f32>, easing: &str) -> Self {
        Self {
            use_mass,
            state: BehaviourState::new(life, easing),
        }
    }

    fn share(&self, a: &Body, b: &Body) -> f32 {
        if self.use_mass {
            b.mass / (a.mass + b.mass)
        } else {
            0.5
        }
    }
}

impl Behaviour for Collision {
    fn kind(&self) -> BehaviourKind {
        BehaviourKind::Collision
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

    fn mutate(&mut self, target: &mut Body, time: f32, _index: usize, peers: &mut Neighbours<'_>) {
        self.energize(target, time);
        if self.state.dead {
            return;
        }

        for other in peers.bodies_mut() {
            let delta = other.position - target.position;
            let length_sq = delta.length_squared();
            let reach = target.radius + other.radius;
            if length_sq > reach * reach {
                continue;
            }

            let overlap = reach - length_sq.sqrt() + 0.5;
            let own_share = self.share(target, other);
            let other_share = self.share(other, target);
            let dir = delta.normalized();
            target.position -= dir * (overlap * own_share);
            other.position += dir * (overlap * other_share);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;
    use crate::pool::{Factory, Pool, Pooled};
    use kindle_core::{ParticleId, Vec3};
    use std::rc::Rc;

    struct Fresh;

    impl Factory<Particle> for Fresh {
        fn construct(&self) -> Option<Particle> {
            Some(Particle::new(ParticleId(0)))
        }
    }

    fn particle_at(pool: &mut Pool<Particle>, x: f32, radius: f32, mass: f32) -> Pooled<Particle> {
        let factory: Rc<dyn Factory<Particle>> = Rc::new(Fresh);
        let mut p = pool.get(&factory).unwrap();
        p.body.position = Vec3::new(x, 0.0, 0.0);
        p.body.radius = radius;
        p.body.mass = mass;
        p
    }

    #[test]
    fn overlapping_bodies_separate_evenly() {
        let mut pool = Pool::new();
        let mut target = Body::new();
        target.radius = 1.0;
        let mut rest = vec![particle_at(&mut pool, 1.0, 1.0, 1.0)];

        let mut collision = Collision::new(false, None, "linear");
        collision.apply_behaviour(&mut target, 0.016, 0, &mut Neighbours::new(&mut rest));

        // overlap = 2 - 1 + 0.5, split in half
        assert!((target.position.x + 0.75).abs() < 1e-5);
        assert!((rest[0].body.position.x - 1.75).abs() < 1e-5);
    }

    #[test]
    fn distant_bodies_are_untouched() {
        let mut pool = Pool::new();
        let mut target = Body::new();
        target.radius = 1.0;
        let mut rest = vec![particle_at(&mut pool, 5.0, 1.0, 1.0)];

        let mut collision = Collision::new(false, None, "linear");
        collision.apply_behaviour(&mut target, 0.016, 0, &mut Neighbours::new(&mut rest));
        assert_eq!(target.position, Vec3::ZERO);
        assert_eq!(rest[0].body.position.x, 5.0);
    }

    #[test]
    fn heavier_body_moves_less() {
        let mut pool = Pool::new();
        let mut target = Body::new();
        target.radius = 1.0;
        target.mass = 3.0;
        let mut rest = vec![particle_at(&mut pool, 1.0, 1.0, 1.0)];

        let mut collision = Collision::new(true, None, "linear");
        collision.apply_behaviour(&mut target, 0.016, 0, &mut Neighbours::new(&mut rest));

        let moved_target = target.position.x.abs();
        let moved_other = rest[0].body.position.x - 1.0;
        assert!(moved_target < moved_other);
    }
}
