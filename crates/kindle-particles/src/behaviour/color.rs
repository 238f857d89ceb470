//! Color interpolator

use super::{Behaviour, BehaviourKind, BehaviourState, Neighbours};
use crate::body::Body;
use crate::rand::ParticleRng;
use crate::span::ColorSpan;

/// Shifts rgb from `a` to `b` over the target's life. Alpha is left to
/// [`super::Alpha`].
#[derive(Debug, Clone)]
pub struct ColorTween {
    pub a: ColorSpan,
    pub b: Option<ColorSpan>,
    state: BehaviourState,
}

impl ColorTween {
    pub fn new(a: ColorSpan, b: Option<ColorSpan>, life: Option<f32>, easing: &str) -> Self {
        Self {
            a,
            b,
            state: BehaviourState::new(life, easing),
        }
    }
}

impl Behaviour for ColorTween {
    fn kind(&self) -> BehaviourKind {
        BehaviourKind::Color
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
        let start = self.a.value(rng);
        let end = match &self.b {
            Some(b) => b.value(rng),
            None => start,
        };
        target.endpoints.color = Some((start, end));
    }

    fn mutate(&mut self, target: &mut Body, time: f32, _index: usize, _peers: &mut Neighbours<'_>) {
        self.energize(target, time);
        if self.state.dead {
            return;
        }
        if let Some((start, end)) = target.endpoints.color {
            let rgb = end.lerp_rgb(&start, self.state.energy);
            target.color.r = rgb.r;
            target.color.g = rgb.g;
            target.color.b = rgb.b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindle_core::Color;

    #[test]
    fn blends_rgb_by_energy() {
        let mut rng = ParticleRng::new(1);
        let mut tween = ColorTween::new(
            ColorSpan::Fixed(Color::RED),
            Some(ColorSpan::Fixed(Color::BLUE)),
            None,
            "linear",
        );
        let mut body = Body::new();
        body.set_life(2.0);
        body.alpha = 0.3;
        tween.initialize(&mut body, &mut rng);

        body.age = 1.0;
        tween.apply_behaviour(&mut body, 0.1, 0, &mut Neighbours::none());
        assert!((body.color.r - 0.5).abs() < 1e-6);
        assert!((body.color.b - 0.5).abs() < 1e-6);
        assert_eq!(body.color.g, 0.0);
        assert!((body.alpha - 0.3).abs() < 1e-6);
    }

    #[test]
    fn single_color_is_held() {
        let mut rng = ParticleRng::new(1);
        let mut tween = ColorTween::new(ColorSpan::Fixed(Color::BLUE), None, None, "linear");
        let mut body = Body::new();
        body.set_life(2.0);
        tween.initialize(&mut body, &mut rng);
        body.age = 1.5;
        tween.apply_behaviour(&mut body, 0.1, 0, &mut Neighbours::none());
        assert_eq!(body.color, Color::BLUE);
    }
}
