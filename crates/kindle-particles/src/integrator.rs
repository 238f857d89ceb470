//! Numerical integration of a body's motion

use crate::body::Body;
use serde::{Deserialize, Serialize};

/// Integration scheme applied by an emitter to itself and its particles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Semi-implicit Euler:
    ///
    /// ```text
    /// a  = a / mass            (when mass > 0)
    /// v' = (v + a * t) * damping
    /// p' = p + v' * t
    /// ```
    ///
    /// `damping` scales the whole velocity, not only the acceleration term.
    #[default]
    Euler,
}

impl Integrator {
    /// Step `body` by `time`. `damping` is the fraction of velocity kept
    /// each step. Acceleration is consumed and cleared.
    pub fn integrate(&self, body: &mut Body, time: f32, damping: f32) {
        if body.sleep {
            return;
        }
        match self {
            Integrator::Euler => euler(body, time, damping),
        }
    }
}

fn euler(body: &mut Body, time: f32, damping: f32) {
    body.old.position = body.position;
    body.old.velocity = body.velocity;
    body.old.acceleration = body.acceleration;

    if body.mass > 0.0 {
        body.acceleration /= body.mass;
    }
    body.velocity += body.acceleration * time;
    body.velocity *= damping;
    body.position += body.velocity * time;
    body.acceleration.clear();
}
