//! Headless scene runner

use anyhow::{Context, Result};
use futures::FutureExt;
use kindle_particles::{EmitHooks, InstanceRenderer, Renderer, SceneDesc};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct RunArgs {
    pub scene: String,
    pub frames: u32,
    pub dt: f32,
    pub report_every: u32,
    pub seed: Option<u32>,
}

pub fn run(args: RunArgs) -> Result<()> {
    if !(args.dt > 0.0) {
        anyhow::bail!("--dt must be positive, got {}", args.dt);
    }

    let mut desc = SceneDesc::load(&args.scene)
        .with_context(|| format!("Failed to load scene '{}'", args.scene))?;
    if args.seed.is_some() {
        desc.seed = args.seed;
    }
    let mut system = desc.build()?;

    let renderer = Rc::new(RefCell::new(InstanceRenderer::new()));
    let handle: Rc<RefCell<dyn Renderer>> = renderer.clone();
    system.add_renderer(handle);

    let finished = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&finished);
    let mut done = system
        .emit(EmitHooks {
            on_start: None,
            on_end: Some(Box::new(move || counter.set(counter.get() + 1))),
        })
        .boxed_local();

    println!(
        "Running '{}': {} emitter(s), {} frame(s) at dt={}",
        args.scene,
        system.emitters().len(),
        args.frames,
        args.dt
    );

    let report_every = args.report_every.max(1);
    let mut peak = 0;
    let mut completed_at = None;
    for frame in 1..=args.frames {
        system.update(args.dt)?;
        peak = peak.max(system.count());

        if completed_at.is_none() && (&mut done).now_or_never().is_some() {
            completed_at = Some(frame);
        }

        if frame % report_every == 0 {
            println!(
                "  frame {:>6}  t={:>8.3}s  emitters={:<3} live={:<6} pooled={:<6} created={:<6} instances={}",
                frame,
                frame as f32 * args.dt,
                system.emitters().len(),
                system.count(),
                system.pool().free_count(),
                system.pool().created(),
                renderer.borrow().len(),
            );
        }
    }

    println!();
    println!("Peak live particles: {}", peak);
    println!("Emitters finished:   {}", finished.get());
    match completed_at {
        Some(frame) => println!("All finite emitters done at frame {}", frame),
        None => println!("Emission still running after {} frame(s)", args.frames),
    }

    system.destroy();
    Ok(())
}
