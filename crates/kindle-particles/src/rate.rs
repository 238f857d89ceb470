//! Emission rate: how many particles to spawn for a slice of elapsed time

use crate::rand::ParticleRng;
use crate::span::Span;

/// Spawns `count` particles every `interval` seconds.
///
/// Elapsed time accumulates across ticks, so intervals longer than a frame
/// still fire. A `count` whose upper bound is exactly 1 spawns 0 or 1
/// particles at random, which gives sub-integer rates.
#[derive(Debug, Clone)]
pub struct Rate {
    pub count: Span,
    pub interval: Span,
    start_time: f32,
    next_time: Option<f32>,
}

impl Rate {
    pub fn new(count: Span, interval: Span) -> Self {
        Self {
            count,
            interval,
            start_time: 0.0,
            next_time: None,
        }
    }

    /// Spawn `count` particles on every tick
    pub fn per_tick(count: f32) -> Self {
        Self::new(Span::fixed(count), Span::fixed(0.0))
    }

    /// Restart the interval timer
    pub fn init(&mut self) {
        self.start_time = 0.0;
        self.next_time = None;
    }

    /// Number of particles due after another `time` seconds
    pub fn value(&mut self, time: f32, rng: &mut ParticleRng) -> usize {
        self.start_time += time;
        let next_time = match self.next_time {
            Some(t) => t,
            None => {
                let t = self.interval.value(rng);
                self.next_time = Some(t);
                t
            }
        };

        if self.start_time < next_time {
            return 0;
        }

        self.start_time = 0.0;
        self.next_time = Some(self.interval.value(rng));

        if self.count.upper() == 1.0 {
            usize::from(self.count.value(rng) > 0.5)
        } else {
            self.count.value_int(rng).max(0) as usize
        }
    }
}

impl Default for Rate {
    fn default() -> Self {
        Self::new(Span::fixed(1.0), Span::fixed(0.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_tick_fires_every_call() {
        let mut rng = ParticleRng::new(1);
        let mut rate = Rate::per_tick(5.0);
        for _ in 0..4 {
            assert_eq!(rate.value(1.0 / 60.0, &mut rng), 5);
        }
    }

    #[test]
    fn interval_accumulates_across_ticks() {
        let mut rng = ParticleRng::new(1);
        let mut rate = Rate::new(Span::fixed(2.0), Span::fixed(0.1));
        assert_eq!(rate.value(0.04, &mut rng), 0);
        assert_eq!(rate.value(0.04, &mut rng), 0);
        assert_eq!(rate.value(0.04, &mut rng), 2);
        assert_eq!(rate.value(0.04, &mut rng), 0);
    }

    #[test]
    fn large_budget_returns_count() {
        let mut rng = ParticleRng::new(9);
        let mut rate = Rate::new(Span::fixed(12.0), Span::fixed(0.5));
        assert_eq!(rate.value(99_999.0, &mut rng), 12);
    }

    #[test]
    fn unit_upper_bound_is_stochastic() {
        let mut rng = ParticleRng::new(21);
        let mut rate = Rate::new(Span::range(0.0, 1.0), Span::fixed(0.0));
        let mut total = 0;
        for _ in 0..1000 {
            let n = rate.value(0.016, &mut rng);
            assert!(n <= 1);
            total += n;
        }
        assert!(total > 300 && total < 700, "got {total}");
    }

    #[test]
    fn init_restarts_timer() {
        let mut rng = ParticleRng::new(1);
        let mut rate = Rate::new(Span::fixed(1.0), Span::fixed(1.0));
        assert_eq!(rate.value(0.5, &mut rng), 0);
        rate.init();
        assert_eq!(rate.value(0.5, &mut rng), 0);
        assert_eq!(rate.value(0.5, &mut rng), 1);
    }
}
