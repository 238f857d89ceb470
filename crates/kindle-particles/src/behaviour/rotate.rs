//! Rotation behaviour

use super::{Behaviour, BehaviourKind, BehaviourState, Neighbours};
use crate::body::Body;
use crate::rand::ParticleRng;
use crate::span::Span;
use kindle_core::Vec3;

/// How a sampled rotation is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotateStyle {
    /// Set once when attached
    Set,
    /// Ease toward the sampled rotation, faster while energy is high
    To,
    /// Spin by the sampled rotation per second
    #[default]
    Add,
}

impl RotateStyle {
    pub fn from_name(name: &str) -> Self {
        match name {
            "set" | "same" => RotateStyle::Set,
            "to" => RotateStyle::To,
            _ => RotateStyle::Add,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rotate {
    pub x: Span,
    pub y: Span,
    pub z: Span,
    pub style: RotateStyle,
    state: BehaviourState,
}

impl Rotate {
    pub fn new(
        x: Span,
        y: Span,
        z: Span,
        style: RotateStyle,
        life: Option<f32>,
        easing: &str,
    ) -> Self {
        Self {
            x,
            y,
            z,
            style,
            state: BehaviourState::new(life, easing),
        }
    }
}

impl Behaviour for Rotate {
    fn kind(&self) -> BehaviourKind {
        BehaviourKind::Rotate
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
        let sampled = Vec3::new(self.x.value(rng), self.y.value(rng), self.z.value(rng));
        target.endpoints.rotation = Some(sampled);
        if self.style == RotateStyle::Set {
            target.rotation = sampled;
        }
    }

    fn mutate(&mut self, target: &mut Body, time: f32, _index: usize, _peers: &mut Neighbours<'_>) {
        self.energize(target, time);
        if self.state.dead {
            return;
        }
        let Some(sampled) = target.endpoints.rotation else {
            return;
        };
        match self.style {
            RotateStyle::Set => {}
            RotateStyle::To => {
                let step = (sampled - target.rotation) * self.state.energy;
                target.rotation += step;
            }
            RotateStyle::Add => target.rotation += sampled * time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotate(style: RotateStyle) -> Rotate {
        Rotate::new(
            Span::fixed(1.0),
            Span::fixed(0.0),
            Span::fixed(2.0),
            style,
            None,
            "linear",
        )
    }

    #[test]
    fn set_applies_on_initialize() {
        let mut rng = ParticleRng::new(1);
        let mut r = rotate(RotateStyle::Set);
        let mut body = Body::new();
        r.initialize(&mut body, &mut rng);
        assert_eq!(body.rotation, Vec3::new(1.0, 0.0, 2.0));
        r.apply_behaviour(&mut body, 1.0, 0, &mut Neighbours::none());
        assert_eq!(body.rotation, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn add_spins_per_second() {
        let mut rng = ParticleRng::new(1);
        let mut r = rotate(RotateStyle::Add);
        let mut body = Body::new();
        r.initialize(&mut body, &mut rng);
        r.apply_behaviour(&mut body, 0.5, 0, &mut Neighbours::none());
        r.apply_behaviour(&mut body, 0.5, 0, &mut Neighbours::none());
        assert!((body.rotation.x - 1.0).abs() < 1e-6);
        assert!((body.rotation.z - 2.0).abs() < 1e-6);
    }

    #[test]
    fn to_moves_toward_target() {
        let mut rng = ParticleRng::new(1);
        let mut r = rotate(RotateStyle::To);
        let mut body = Body::new();
        body.set_life(2.0);
        r.initialize(&mut body, &mut rng);
        body.age = 1.0;
        r.apply_behaviour(&mut body, 0.1, 0, &mut Neighbours::none());
        assert!((body.rotation.x - 0.5).abs() < 1e-6);
        assert!((body.rotation.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn style_names() {
        assert_eq!(RotateStyle::from_name("set"), RotateStyle::Set);
        assert_eq!(RotateStyle::from_name("to"), RotateStyle::To);
        assert_eq!(RotateStyle::from_name("anything"), RotateStyle::Add);
    }
}
