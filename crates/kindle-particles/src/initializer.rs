//! One-time setup steps run on each particle as it is spawned

use crate::emitter::Emitter;
use crate::particle::Particle;
use crate::rand::ParticleRng;
use crate::span::{ColorSpan, Span};
use crate::zone::Zone;
use kindle_core::Vec3;

/// Kind tag, used to remove initializers from an emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitializerKind {
    Life,
    Mass,
    Radius,
    Position,
    Velocity,
    Alpha,
    Scale,
    Color,
}

/// A setup step applied once, before behaviours are attached.
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Life(Span),
    Mass(Span),
    Radius(Span),
    Position(Zone),
    /// `speed` along a random direction within `spread` degrees of `direction`
    Velocity {
        speed: Span,
        direction: Vec3,
        spread: f32,
    },
    Alpha(Span),
    Scale(Span),
    Color(ColorSpan),
}

impl Initializer {
    pub fn kind(&self) -> InitializerKind {
        match self {
            Initializer::Life(_) => InitializerKind::Life,
            Initializer::Mass(_) => InitializerKind::Mass,
            Initializer::Radius(_) => InitializerKind::Radius,
            Initializer::Position(_) => InitializerKind::Position,
            Initializer::Velocity { .. } => InitializerKind::Velocity,
            Initializer::Alpha(_) => InitializerKind::Alpha,
            Initializer::Scale(_) => InitializerKind::Scale,
            Initializer::Color(_) => InitializerKind::Color,
        }
    }

    pub fn init(&self, particle: &mut Particle, rng: &mut ParticleRng) {
        let body = &mut particle.body;
        match self {
            Initializer::Life(span) => body.set_life(span.value(rng)),
            Initializer::Mass(span) => body.mass = span.value(rng),
            Initializer::Radius(span) => body.radius = span.value(rng),
            Initializer::Position(zone) => body.position = zone.position(rng),
            Initializer::Velocity {
                speed,
                direction,
                spread,
            } => {
                let dir = rng.cone_direction(*direction, *spread);
                body.velocity = dir * speed.value(rng);
            }
            Initializer::Alpha(span) => body.alpha = span.value(rng),
            Initializer::Scale(span) => body.scale = span.value(rng),
            Initializer::Color(span) => {
                let c = span.value(rng);
                body.color.r = c.r;
                body.color.g = c.g;
                body.color.b = c.b;
            }
        }
    }
}

/// Run `initializers` in order, then carry the emitter's motion over to the
/// particle when the emitter is bound.
pub fn initialize_particle(
    emitter: &Emitter,
    particle: &mut Particle,
    initializers: &[Initializer],
    rng: &mut ParticleRng,
) {
    for initializer in initializers {
        initializer.init(particle, rng);
    }
    if emitter.bind_emitter {
        let body = &mut particle.body;
        body.position += emitter.body.position;
        body.velocity += emitter.body.velocity;
        body.acceleration += emitter.body.acceleration;
    }
}
