//! Deterministic xorshift32 random source

use kindle_core::Vec3;

/// Deterministic random source shared by spans, zones and initializers.
#[derive(Debug, Clone)]
pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // 24 bits keep the result strictly below 1.0 after the f32 cast
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Index in [0, len); 0 when `len` is 0
    pub fn index(&mut self, len: usize) -> usize {
        ((self.next_f32() * len as f32) as usize).min(len.saturating_sub(1))
    }

    /// Unit vector drawn uniformly from the sphere
    pub fn random_direction(&mut self) -> Vec3 {
        // Marsaglia (1972)
        loop {
            let x = self.range(-1.0, 1.0);
            let y = self.range(-1.0, 1.0);
            let s = x * x + y * y;
            if s < 1.0 {
                let factor = 2.0 * (1.0 - s).sqrt();
                return Vec3::new(x * factor, y * factor, 1.0 - 2.0 * s);
            }
        }
    }

    /// Unit vector within `angle_deg` of `base_dir`. Zero spread returns the
    /// normalized base; 180 or more covers the whole sphere.
    pub fn cone_direction(&mut self, base_dir: Vec3, angle_deg: f32) -> Vec3 {
        if angle_deg <= 0.0 {
            return base_dir.normalized();
        }
        if angle_deg >= 180.0 {
            return self.random_direction();
        }

        let cos_angle = angle_deg.to_radians().cos();

        // cos(theta) uniform over the cap gives uniform area coverage
        let cos_theta = self.range(cos_angle, 1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let phi = self.range(0.0, std::f32::consts::TAU);

        let local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        rotate_to_basis(base_dir, local)
    }
}

/// Map a +Z-centred direction onto the frame whose forward axis is `forward`
fn rotate_to_basis(forward: Vec3, local: Vec3) -> Vec3 {
    let fwd = if forward.length_squared() < 1e-20 {
        Vec3::UP
    } else {
        forward.normalized()
    };
    let up = if fwd.y.abs() > 0.99 {
        Vec3::new(1.0, 0.0, 0.0)
    } else {
        Vec3::UP
    };
    let right = up.cross(&fwd).normalized();
    let actual_up = fwd.cross(&right);

    right * local.x + actual_up * local.y + fwd * local.z
}
