//! Scene validation command

use anyhow::Result;
use kindle_particles::SceneDesc;

pub fn run(scene: &str) -> Result<()> {
    let system = match SceneDesc::load(scene).and_then(|desc| desc.build()) {
        Ok(system) => system,
        Err(e) => {
            eprintln!("✗ {}: {}", scene, e);
            std::process::exit(1);
        }
    };

    println!("✓ {} is valid", scene);
    for emitter in system.emitters() {
        let schedule = match emitter.total_emit_times() {
            t if t == 1.0 => "burst".to_string(),
            t if t > 0.0 && t.is_finite() => format!("{t}s"),
            _ => "continuous".to_string(),
        };
        let life = if emitter.body.life.is_finite() {
            format!("{}s", emitter.body.life)
        } else {
            "infinite".to_string()
        };
        println!(
            "  {}  schedule={}  life={}  initializers={}  behaviours={}  emitter_behaviours={}",
            emitter.id,
            schedule,
            life,
            emitter.initializers().len(),
            emitter.behaviours().len(),
            emitter.emitter_behaviours().len(),
        );
    }
    Ok(())
}
