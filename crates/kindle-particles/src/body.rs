//! Kinematic and lifespan state shared by particles and emitters

use crate::easing::{decay, Easing};
use kindle_core::{Color, Vec3};

/// Previous-tick snapshot of the kinematic vectors
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
}

/// Interpolation endpoints computed once when a behaviour is attached and
/// read back on every tick. One slot per interpolating behaviour kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Endpoints {
    /// (start, end) alpha
    pub alpha: Option<(f32, f32)>,
    /// (start, end) scale
    pub scale: Option<(f32, f32)>,
    /// (start, end) rgb
    pub color: Option<(Color, Color)>,
    /// Sampled rotation target or per-second rotation rate
    pub rotation: Option<Vec3>,
}

impl Endpoints {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything a particle and an emitter have in common: motion, lifespan
/// and the scratch values behaviours write to.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub old: Snapshot,

    pub age: f32,
    /// Never NaN; see [`Body::set_life`]
    pub life: f32,
    /// 1 when fresh, decays toward 0 as `age` approaches `life`
    pub energy: f32,
    pub dead: bool,
    /// A sleeping body neither ages nor runs behaviours
    pub sleep: bool,
    pub easing: Easing,

    pub alpha: f32,
    pub color: Color,
    pub scale: f32,
    pub rotation: Vec3,
    pub radius: f32,
    pub mass: f32,

    pub endpoints: Endpoints,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            old: Snapshot::default(),
            age: 0.0,
            life: f32::INFINITY,
            energy: 1.0,
            dead: false,
            sleep: false,
            easing: Easing::Linear,
            alpha: 1.0,
            color: Color::WHITE,
            scale: 1.0,
            rotation: Vec3::ZERO,
            radius: 10.0,
            mass: 1.0,
            endpoints: Endpoints::default(),
        }
    }
}

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore construction-time defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set the lifespan; NaN becomes infinite
    pub fn set_life(&mut self, life: f32) {
        self.life = sanitize_life(life);
    }

    /// Recompute `energy` from `age / life` through this body's easing
    pub fn update_energy(&mut self) {
        self.energy = decay(self.easing, self.age, self.life);
    }

    /// True once `age` has reached `life`
    pub fn is_expired(&self) -> bool {
        self.age >= self.life
    }
}

/// Coerce an invalid lifespan to +∞
pub fn sanitize_life(life: f32) -> f32 {
    if life.is_nan() {
        f32::INFINITY
    } else {
        life
    }
}

/// Shared access to the kinematic state of a particle or an emitter.
pub trait Kinematic {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
}

impl Kinematic for Body {
    fn body(&self) -> &Body {
        self
    }

    fn body_mut(&mut self) -> &mut Body {
        self
    }
}
