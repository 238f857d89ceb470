//! Declarative scene description (TOML or JSON) and the builder that turns
//! it into a ready [`System`]

use crate::behaviour::{
    Alpha, Behaviour, Collision, ColorTween, Force, Gravity, RandomDrift, Rotate, RotateStyle,
    Scale, Spring,
};
use crate::emitter::{Emitter, DEFAULT_DAMPING};
use crate::initializer::Initializer;
use crate::rand::ParticleRng;
use crate::rate::Rate;
use crate::span::{ColorSpan, Span};
use crate::system::{System, DEFAULT_SEED};
use crate::zone::Zone;
use kindle_core::{Color, KindleError, Result, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Text format of a scene description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    Toml,
    Json,
}

impl SceneFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(SceneFormat::Toml),
            Some("json") => Ok(SceneFormat::Json),
            _ => Err(KindleError::UnknownSceneFormat(path.display().to_string())),
        }
    }
}

/// Root of a scene file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneDesc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(default)]
    pub emitters: Vec<EmitterDesc>,
}

impl SceneDesc {
    pub fn parse(content: &str, format: SceneFormat) -> Result<Self> {
        let scene = match format {
            SceneFormat::Toml => toml::from_str(content)?,
            SceneFormat::Json => serde_json::from_str(content)?,
        };
        Ok(scene)
    }

    /// Load from disk, choosing the format by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = SceneFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Build a system with every emitter added but not yet started
    pub fn build(&self) -> Result<System> {
        let seed = self.seed.unwrap_or(DEFAULT_SEED);
        let mut system = System::with_seed(seed);
        for desc in &self.emitters {
            let emitter = desc.build(system.rng_mut())?;
            system.add_emitter(emitter);
        }
        Ok(system)
    }
}

/// One emitter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterDesc {
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub velocity: [f32; 3],
    #[serde(default = "default_damping")]
    pub damping: f32,
    #[serde(default)]
    pub rate: RateDesc,
    /// Emission duration in seconds; 1 is a single burst. Omitted = forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emit_times: Option<f32>,
    /// Omitted = infinite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life: Option<f32>,
    #[serde(default)]
    pub bind_event: bool,
    #[serde(default = "default_true")]
    pub bind_emitter: bool,
    #[serde(default)]
    pub initializers: Vec<InitializerDesc>,
    #[serde(default)]
    pub behaviours: Vec<BehaviourDesc>,
    #[serde(default)]
    pub emitter_behaviours: Vec<BehaviourDesc>,
}

fn default_damping() -> f32 {
    DEFAULT_DAMPING
}

fn default_true() -> bool {
    true
}

impl EmitterDesc {
    /// `rng` seeds behaviours attached to the emitter itself
    pub fn build(&self, rng: &mut ParticleRng) -> Result<Emitter> {
        let mut emitter = Emitter::with_rate(self.rate.build()?);
        emitter.body.position = Vec3::from_array(self.position);
        emitter.body.velocity = Vec3::from_array(self.velocity);
        emitter.damping = self.damping;
        emitter.bind_event = self.bind_event;
        emitter.bind_emitter = self.bind_emitter;
        if let Some(times) = self.emit_times {
            emitter.set_total_emit_times(times);
        }
        if let Some(life) = self.life {
            emitter.set_life(life);
        }

        let initializers = self
            .initializers
            .iter()
            .map(InitializerDesc::build)
            .collect::<Result<Vec<_>>>()?;
        emitter.add_initializers(initializers);

        for desc in &self.behaviours {
            emitter.add_behaviour(desc.build()?);
        }
        for desc in &self.emitter_behaviours {
            emitter.add_emitter_behaviour(desc.build()?, rng);
        }
        Ok(emitter)
    }
}

/// `count` particles every `interval` seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateDesc {
    pub count: SpanDesc,
    #[serde(default = "default_interval")]
    pub interval: SpanDesc,
}

fn default_interval() -> SpanDesc {
    SpanDesc::Fixed(0.1)
}

impl Default for RateDesc {
    fn default() -> Self {
        Self {
            count: SpanDesc::Fixed(1.0),
            interval: default_interval(),
        }
    }
}

impl RateDesc {
    pub fn build(&self) -> Result<Rate> {
        Ok(Rate::new(self.count.build()?, self.interval.build()?))
    }
}

/// A number, a `[a, b]` range, or `{ set = [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpanDesc {
    Fixed(f32),
    Range([f32; 2]),
    Set { set: Vec<f32> },
}

impl Default for SpanDesc {
    fn default() -> Self {
        SpanDesc::Fixed(0.0)
    }
}

impl SpanDesc {
    pub fn build(&self) -> Result<Span> {
        match self {
            SpanDesc::Fixed(v) => Ok(Span::fixed(*v)),
            SpanDesc::Range([a, b]) => Ok(Span::range(*a, *b)),
            SpanDesc::Set { set } => Span::set(set.clone()),
        }
    }
}

/// `"#rrggbb"`, `"random"`, or a list of hex colors to pick from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorDesc {
    One(String),
    Set(Vec<String>),
}

impl ColorDesc {
    pub fn build(&self) -> Result<ColorSpan> {
        match self {
            ColorDesc::One(s) => ColorSpan::parse(s),
            ColorDesc::Set(list) => {
                let colors = list
                    .iter()
                    .map(|s| {
                        Color::parse_hex(s)
                            .ok_or_else(|| KindleError::InvalidSpan(format!("bad color '{s}'")))
                    })
                    .collect::<Result<Vec<_>>>()?;
                ColorSpan::set(colors)
            }
        }
    }
}

/// Spatial sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ZoneDesc {
    Point {
        #[serde(default)]
        at: [f32; 3],
    },
    Line {
        a: [f32; 3],
        b: [f32; 3],
    },
    Sphere {
        #[serde(default)]
        center: [f32; 3],
        radius: f32,
        #[serde(default)]
        surface: bool,
    },
    Box {
        #[serde(default)]
        center: [f32; 3],
        size: [f32; 3],
    },
}

impl ZoneDesc {
    pub fn build(&self) -> Zone {
        match self {
            ZoneDesc::Point { at } => Zone::Point(Vec3::from_array(*at)),
            ZoneDesc::Line { a, b } => Zone::Line {
                a: Vec3::from_array(*a),
                b: Vec3::from_array(*b),
            },
            ZoneDesc::Sphere {
                center,
                radius,
                surface,
            } => Zone::Sphere {
                center: Vec3::from_array(*center),
                radius: *radius,
                surface: *surface,
            },
            ZoneDesc::Box { center, size } => Zone::Box {
                center: Vec3::from_array(*center),
                size: Vec3::from_array(*size),
            },
        }
    }
}

/// Setup step, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InitializerDesc {
    Life {
        value: SpanDesc,
    },
    Mass {
        value: SpanDesc,
    },
    Radius {
        value: SpanDesc,
    },
    Position {
        zone: ZoneDesc,
    },
    Velocity {
        speed: SpanDesc,
        #[serde(default = "default_direction")]
        direction: [f32; 3],
        #[serde(default)]
        spread: f32,
    },
    Alpha {
        value: SpanDesc,
    },
    Scale {
        value: SpanDesc,
    },
    Color {
        value: ColorDesc,
    },
}

fn default_direction() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

impl InitializerDesc {
    pub fn build(&self) -> Result<Initializer> {
        let init = match self {
            InitializerDesc::Life { value } => Initializer::Life(value.build()?),
            InitializerDesc::Mass { value } => Initializer::Mass(value.build()?),
            InitializerDesc::Radius { value } => Initializer::Radius(value.build()?),
            InitializerDesc::Position { zone } => Initializer::Position(zone.build()),
            InitializerDesc::Velocity {
                speed,
                direction,
                spread,
            } => Initializer::Velocity {
                speed: speed.build()?,
                direction: Vec3::from_array(*direction),
                spread: *spread,
            },
            InitializerDesc::Alpha { value } => Initializer::Alpha(value.build()?),
            InitializerDesc::Scale { value } => Initializer::Scale(value.build()?),
            InitializerDesc::Color { value } => Initializer::Color(value.build()?),
        };
        Ok(init)
    }
}

/// A behaviour plus the lifespan and easing every behaviour accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviourDesc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<String>,
    #[serde(flatten)]
    pub kind: BehaviourKindDesc,
}

/// Variant-specific parameters, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviourKindDesc {
    Force {
        force: [f32; 3],
    },
    Gravity {
        g: f32,
    },
    Spring {
        point: [f32; 3],
        #[serde(default = "default_spring")]
        spring: f32,
        #[serde(default = "default_friction")]
        friction: f32,
    },
    Collision {
        #[serde(default)]
        use_mass: bool,
    },
    RandomDrift {
        drift: [f32; 3],
        #[serde(default = "default_drift_delay")]
        delay: f32,
    },
    Alpha {
        a: SpanDesc,
        #[serde(default)]
        b: Option<SpanDesc>,
    },
    Scale {
        a: SpanDesc,
        #[serde(default)]
        b: Option<SpanDesc>,
    },
    Color {
        a: ColorDesc,
        #[serde(default)]
        b: Option<ColorDesc>,
    },
    Rotate {
        #[serde(default)]
        x: SpanDesc,
        #[serde(default)]
        y: SpanDesc,
        #[serde(default)]
        z: SpanDesc,
        #[serde(default)]
        style: Option<String>,
    },
}

fn default_spring() -> f32 {
    0.01
}

fn default_friction() -> f32 {
    1.0
}

fn default_drift_delay() -> f32 {
    0.03
}

impl BehaviourDesc {
    pub fn build(&self) -> Result<Box<dyn Behaviour>> {
        let life = self.life;
        let easing = self.easing.as_deref().unwrap_or("linear");
        let behaviour: Box<dyn Behaviour> = match &self.kind {
            BehaviourKindDesc::Force { force } => {
                Box::new(Force::new(Vec3::from_array(*force), life, easing))
            }
            BehaviourKindDesc::Gravity { g } => Box::new(Gravity::new(*g, life, easing)),
            BehaviourKindDesc::Spring {
                point,
                spring,
                friction,
            } => Box::new(Spring::new(
                Vec3::from_array(*point),
                *spring,
                *friction,
                life,
                easing,
            )),
            BehaviourKindDesc::Collision { use_mass } => {
                Box::new(Collision::new(*use_mass, life, easing))
            }
            BehaviourKindDesc::RandomDrift { drift, delay } => Box::new(RandomDrift::new(
                Vec3::from_array(*drift),
                *delay,
                life,
                easing,
            )),
            BehaviourKindDesc::Alpha { a, b } => Box::new(Alpha::new(
                a.build()?,
                b.as_ref().map(SpanDesc::build).transpose()?,
                life,
                easing,
            )),
            BehaviourKindDesc::Scale { a, b } => Box::new(Scale::new(
                a.build()?,
                b.as_ref().map(SpanDesc::build).transpose()?,
                life,
                easing,
            )),
            BehaviourKindDesc::Color { a, b } => Box::new(ColorTween::new(
                a.build()?,
                b.as_ref().map(ColorDesc::build).transpose()?,
                life,
                easing,
            )),
            BehaviourKindDesc::Rotate { x, y, z, style } => Box::new(Rotate::new(
                x.build()?,
                y.build()?,
                z.build()?,
                style
                    .as_deref()
                    .map_or(RotateStyle::default(), RotateStyle::from_name),
                life,
                easing,
            )),
        };
        Ok(behaviour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::BehaviourKind;
    use crate::easing::Easing;
    use crate::initializer::InitializerKind;
    use crate::system::EmitHooks;

    const FOUNTAIN: &str = r##"
seed = 7

[[emitters]]
position = [0.0, 1.0, 0.0]
emit_times = 2.0
life = 3.0
rate = { count = [4, 6], interval = 0.05 }

[[emitters.initializers]]
type = "life"
value = [0.5, 1.0]

[[emitters.initializers]]
type = "position"
zone = { shape = "sphere", radius = 0.5 }

[[emitters.initializers]]
type = "velocity"
speed = 4
spread = 20

[[emitters.initializers]]
type = "color"
value = ["#ff8800", "#ffcc00"]

[[emitters.behaviours]]
type = "gravity"
g = 9.8

[[emitters.behaviours]]
type = "alpha"
a = 1
b = 0
easing = "easeOutQuad"

[[emitters.behaviours]]
type = "scale"
a = { set = [1.0, 2.0] }
life = 0.5

[[emitters.emitter_behaviours]]
type = "rotate"
y = 1.0
style = "add"
"##;

    #[test]
    fn parses_toml_scene() {
        let scene = SceneDesc::parse(FOUNTAIN, SceneFormat::Toml).unwrap();
        assert_eq!(scene.seed, Some(7));
        let e = &scene.emitters[0];
        assert_eq!(e.position, [0.0, 1.0, 0.0]);
        assert_eq!(e.rate.count, SpanDesc::Range([4.0, 6.0]));
        assert_eq!(e.rate.interval, SpanDesc::Fixed(0.05));
        assert_eq!(e.initializers.len(), 4);
        assert_eq!(e.behaviours.len(), 3);
        assert_eq!(e.behaviours[1].easing.as_deref(), Some("easeOutQuad"));
        assert_eq!(e.behaviours[2].life, Some(0.5));
        assert_eq!(
            e.behaviours[2].kind,
            BehaviourKindDesc::Scale {
                a: SpanDesc::Set { set: vec![1.0, 2.0] },
                b: None,
            }
        );
        assert!(e.bind_emitter);
        assert_eq!(e.damping, DEFAULT_DAMPING);
    }

    #[test]
    fn builds_configured_emitters() {
        let scene = SceneDesc::parse(FOUNTAIN, SceneFormat::Toml).unwrap();
        let system = scene.build().unwrap();
        let emitter = &system.emitters()[0];
        assert_eq!(emitter.body.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(emitter.total_emit_times(), 2.0);
        assert_eq!(emitter.body.life, 3.0);
        assert_eq!(emitter.initializers()[1].kind(), InitializerKind::Position);
        let kinds: Vec<_> = emitter.behaviours().iter().map(|b| b.kind()).collect();
        assert_eq!(
            kinds,
            vec![BehaviourKind::Gravity, BehaviourKind::Alpha, BehaviourKind::Scale]
        );
        assert_eq!(emitter.behaviours()[1].state().easing, Easing::EaseOutQuad);
        assert_eq!(emitter.emitter_behaviours()[0].kind(), BehaviourKind::Rotate);
        assert!(emitter.body.endpoints.rotation.is_some());
    }

    #[test]
    fn built_scene_runs_to_completion() {
        let scene = SceneDesc::parse(FOUNTAIN, SceneFormat::Toml).unwrap();
        let mut system = scene.build().unwrap();
        let done = system.emit(EmitHooks::default());
        let mut peak = 0;
        for _ in 0..300 {
            system.update(1.0 / 60.0).unwrap();
            peak = peak.max(system.count());
        }
        assert!(peak > 0);
        assert!(system.emitters().is_empty());
        futures::executor::block_on(done);
    }

    #[test]
    fn parses_json_scene() {
        let json = r##"{
            "emitters": [{
                "emit_times": 1,
                "rate": { "count": 10 },
                "initializers": [
                    { "type": "mass", "value": 2 },
                    { "type": "position", "zone": { "shape": "box", "size": [1, 1, 1] } }
                ],
                "behaviours": [
                    { "type": "spring", "point": [0, 0, 0] },
                    { "type": "color", "a": "random", "b": "#000000", "life": 2 },
                    { "type": "collision", "use_mass": true },
                    { "type": "random_drift", "drift": [1, 1, 0] },
                    { "type": "force", "force": [1, 0, 0] }
                ]
            }]
        }"##;
        let scene = SceneDesc::parse(json, SceneFormat::Json).unwrap();
        let system = scene.build().unwrap();
        let emitter = &system.emitters()[0];
        assert_eq!(emitter.total_emit_times(), 1.0);
        assert_eq!(emitter.behaviours().len(), 5);
        assert_eq!(emitter.behaviours()[1].state().life, 2.0);
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(
            SceneDesc::parse("emitters = 3", SceneFormat::Toml),
            Err(KindleError::SceneParse(_))
        ));
        assert!(matches!(
            SceneDesc::parse("{", SceneFormat::Json),
            Err(KindleError::SceneParse(_))
        ));

        let empty_set = r#"
[[emitters]]
rate = { count = { set = [] } }
"#;
        let scene = SceneDesc::parse(empty_set, SceneFormat::Toml).unwrap();
        assert!(matches!(scene.build(), Err(KindleError::InvalidSpan(_))));

        let bad_color = r#"
[[emitters]]
[[emitters.initializers]]
type = "color"
value = "purple-ish"
"#;
        let scene = SceneDesc::parse(bad_color, SceneFormat::Toml).unwrap();
        assert!(matches!(scene.build(), Err(KindleError::InvalidSpan(_))));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SceneFormat::from_path(Path::new("a.toml")).unwrap(), SceneFormat::Toml);
        assert_eq!(SceneFormat::from_path(Path::new("a.json")).unwrap(), SceneFormat::Json);
        assert!(matches!(
            SceneFormat::from_path(Path::new("a.yaml")),
            Err(KindleError::UnknownSceneFormat(_))
        ));
    }
}
