//! Spatial samplers used to seed particle positions

use crate::rand::ParticleRng;
use kindle_core::Vec3;

/// A region that yields random positions.
#[derive(Debug, Clone, PartialEq)]
pub enum Zone {
    /// Always the same point
    Point(Vec3),
    /// Uniform along the segment `a`..`b`
    Line { a: Vec3, b: Vec3 },
    /// Uniform on the surface, or within the volume, of a sphere
    Sphere {
        center: Vec3,
        radius: f32,
        surface: bool,
    },
    /// Uniform inside an axis-aligned box of full extents `size`
    Box { center: Vec3, size: Vec3 },
}

impl Default for Zone {
    fn default() -> Self {
        Zone::Point(Vec3::ZERO)
    }
}

impl Zone {
    /// A fixed point at (x, y, z). The legacy point zone copied `x` into
    /// `y` and `z`; that is not reproduced here.
    pub fn point(x: f32, y: f32, z: f32) -> Self {
        Zone::Point(Vec3::new(x, y, z))
    }

    pub fn position(&self, rng: &mut ParticleRng) -> Vec3 {
        match self {
            Zone::Point(p) => *p,
            Zone::Line { a, b } => a.lerp(*b, rng.next_f32()),
            Zone::Sphere {
                center,
                radius,
                surface,
            } => {
                let dir = rng.random_direction();
                let r = if *surface {
                    *radius
                } else {
                    // cube root keeps the volume density uniform
                    radius * rng.next_f32().cbrt()
                };
                *center + dir * r
            }
            Zone::Box { center, size } => {
                let offset = Vec3::new(
                    rng.range(-0.5, 0.5) * size.x,
                    rng.range(-0.5, 0.5) * size.y,
                    rng.range(-0.5, 0.5) * size.z,
                );
                *center + offset
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_keeps_every_axis() {
        let mut rng = ParticleRng::new(1);
        assert_eq!(Zone::point(1.0, 2.0, 3.0).position(&mut rng), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn line_stays_on_segment() {
        let mut rng = ParticleRng::new(2);
        let zone = Zone::Line {
            a: Vec3::ZERO,
            b: Vec3::new(10.0, 0.0, 0.0),
        };
        for _ in 0..100 {
            let p = zone.position(&mut rng);
            assert!((0.0..=10.0).contains(&p.x));
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn sphere_surface_and_volume() {
        let mut rng = ParticleRng::new(3);
        let center = Vec3::new(5.0, 0.0, 0.0);
        let surface = Zone::Sphere {
            center,
            radius: 2.0,
            surface: true,
        };
        let volume = Zone::Sphere {
            center,
            radius: 2.0,
            surface: false,
        };
        for _ in 0..100 {
            let d = (surface.position(&mut rng) - center).length();
            assert!((d - 2.0).abs() < 1e-4);
            assert!((volume.position(&mut rng) - center).length() <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn box_within_extents() {
        let mut rng = ParticleRng::new(4);
        let zone = Zone::Box {
            center: Vec3::ZERO,
            size: Vec3::new(2.0, 4.0, 6.0),
        };
        for _ in 0..200 {
            let p = zone.position(&mut rng);
            assert!(p.x.abs() <= 1.0 && p.y.abs() <= 2.0 && p.z.abs() <= 3.0);
        }
    }
}
