//! Value samplers: a fixed value, a random value in a range, or a random pick from a set

use crate::rand::ParticleRng;
use kindle_core::{Color, KindleError, Result};

/// Samples a scalar each time it is asked for a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    Fixed(f32),
    /// Uniform in `[a, b)`
    Range { a: f32, b: f32 },
    /// Uniform in `[center - spread, center + spread)`
    Centered { center: f32, spread: f32 },
    /// One element of a set. An empty set samples as 0; [`Span::set`]
    /// rejects one up front.
    Set(Vec<f32>),
}

impl Span {
    pub fn fixed(value: f32) -> Self {
        Span::Fixed(value)
    }

    pub fn range(a: f32, b: f32) -> Self {
        Span::Range { a, b }
    }

    pub fn centered(center: f32, spread: f32) -> Self {
        Span::Centered { center, spread }
    }

    /// A random pick from `values`. Fails on an empty set.
    pub fn set(values: Vec<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(KindleError::InvalidSpan("value set is empty".into()));
        }
        Ok(Span::Set(values))
    }

    pub fn value(&self, rng: &mut ParticleRng) -> f32 {
        match self {
            Span::Fixed(v) => *v,
            Span::Range { a, b } => rng.range(*a, *b),
            Span::Centered { center, spread } => center + rng.range(-1.0, 1.0) * spread,
            Span::Set(values) => values.get(rng.index(values.len())).copied().unwrap_or(0.0),
        }
    }

    /// Integer sample. Ranges draw from `[a, b)`, everything else is floored.
    pub fn value_int(&self, rng: &mut ParticleRng) -> i64 {
        match self {
            Span::Range { a, b } => (a + rng.next_f32() * (b - a)).floor() as i64,
            _ => self.value(rng).floor() as i64,
        }
    }

    /// Largest value this span can produce
    pub fn upper(&self) -> f32 {
        match self {
            Span::Fixed(v) => *v,
            Span::Range { a, b } => a.max(*b),
            Span::Centered { center, spread } => center + spread.abs(),
            Span::Set(values) if values.is_empty() => 0.0,
            Span::Set(values) => values.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::Fixed(0.0)
    }
}

impl From<f32> for Span {
    fn from(v: f32) -> Self {
        Span::Fixed(v)
    }
}

/// Samples a color.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpan {
    Fixed(Color),
    /// An empty set samples as white
    Set(Vec<Color>),
    /// Uniformly random rgb
    Random,
}

impl ColorSpan {
    /// A random pick from `colors`. Fails on an empty set.
    pub fn set(colors: Vec<Color>) -> Result<Self> {
        if colors.is_empty() {
            return Err(KindleError::InvalidSpan("color set is empty".into()));
        }
        Ok(ColorSpan::Set(colors))
    }

    /// Parse `"#rrggbb"` or the keyword `"random"`
    pub fn parse(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("random") {
            return Ok(ColorSpan::Random);
        }
        Color::parse_hex(s)
            .map(ColorSpan::Fixed)
            .ok_or_else(|| KindleError::InvalidSpan(format!("bad color '{s}'")))
    }

    pub fn value(&self, rng: &mut ParticleRng) -> Color {
        match self {
            ColorSpan::Fixed(c) => *c,
            ColorSpan::Set(colors) => colors
                .get(rng.index(colors.len()))
                .copied()
                .unwrap_or_default(),
            ColorSpan::Random => Color::new(rng.next_f32(), rng.next_f32(), rng.next_f32(), 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_is_constant() {
        let mut rng = ParticleRng::new(1);
        let span = Span::fixed(3.5);
        for _ in 0..10 {
            assert_eq!(span.value(&mut rng), 3.5);
        }
        assert_eq!(span.value_int(&mut rng), 3);
    }

    #[test]
    fn range_stays_in_bounds() {
        let mut rng = ParticleRng::new(2);
        let span = Span::range(1.0, 3.0);
        for _ in 0..500 {
            let v = span.value(&mut rng);
            assert!((1.0..3.0).contains(&v));
            let i = span.value_int(&mut rng);
            assert!(i == 1 || i == 2);
        }
    }

    #[test]
    fn centered_spreads_both_ways() {
        let mut rng = ParticleRng::new(3);
        let span = Span::centered(10.0, 2.0);
        for _ in 0..500 {
            let v = span.value(&mut rng);
            assert!((8.0..12.0).contains(&v));
        }
        assert_eq!(span.upper(), 12.0);
    }

    #[test]
    fn set_picks_members() {
        let mut rng = ParticleRng::new(4);
        let span = Span::set(vec![1.0, 5.0, 9.0]).unwrap();
        for _ in 0..100 {
            let v = span.value(&mut rng);
            assert!(v == 1.0 || v == 5.0 || v == 9.0);
        }
        assert_eq!(span.upper(), 9.0);
    }

    #[test]
    fn empty_sets_are_rejected() {
        assert!(matches!(Span::set(vec![]), Err(KindleError::InvalidSpan(_))));
        assert!(matches!(ColorSpan::set(vec![]), Err(KindleError::InvalidSpan(_))));
    }

    #[test]
    fn empty_sets_built_directly_sample_defaults() {
        let mut rng = ParticleRng::new(5);
        let span = Span::Set(Vec::new());
        assert_eq!(span.value(&mut rng), 0.0);
        assert_eq!(span.value_int(&mut rng), 0);
        assert_eq!(span.upper(), 0.0);
        assert_eq!(ColorSpan::Set(Vec::new()).value(&mut rng), Color::WHITE);
    }

    #[test]
    fn color_span_parse() {
        assert_eq!(ColorSpan::parse("#ff0000").unwrap(), ColorSpan::Fixed(Color::RED));
        assert_eq!(ColorSpan::parse("Random").unwrap(), ColorSpan::Random);
        assert!(ColorSpan::parse("not a color").is_err());
    }
}
