//! Renderer boundary: subscribers that mirror simulation state elsewhere

use crate::particle::Particle;
use bytemuck::{Pod, Zeroable};
use kindle_core::{EmitterId, ParticleId};
use std::collections::HashMap;

/// Receives particle lifecycle notifications from a [`crate::System`].
///
/// All methods default to no-ops so a renderer only implements what it
/// mirrors.
pub trait Renderer {
    fn on_particle_created(&mut self, _particle: &Particle) {}

    fn on_particle_update(&mut self, _particle: &Particle) {}

    fn on_particle_dead(&mut self, _particle: &Particle) {}

    fn on_system_update(&mut self, _emitter: EmitterId) {}

    /// Called when the owning system is torn down
    fn destroy(&mut self) {}
}

/// GPU instance data for one particle.
/// 48 bytes, three rows of vec4.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// xyz = position, w = scale * radius
    pub pos_size: [f32; 4],
    /// rgb, a = alpha
    pub color: [f32; 4],
    /// xyz = rotation, w = energy
    pub rotation: [f32; 4],
}

impl ParticleInstance {
    pub fn from_particle(p: &Particle) -> Self {
        let b = &p.body;
        Self {
            pos_size: [b.position.x, b.position.y, b.position.z, b.scale * b.radius],
            color: [b.color.r, b.color.g, b.color.b, b.alpha],
            rotation: [b.rotation.x, b.rotation.y, b.rotation.z, b.energy],
        }
    }
}

/// Keeps a contiguous instance buffer of every live particle, ready to be
/// uploaded for an instanced draw. Dead particles are swap-removed.
#[derive(Debug, Default)]
pub struct InstanceRenderer {
    instances: Vec<ParticleInstance>,
    /// Owner of each slot, parallel to `instances`
    owners: Vec<ParticleId>,
    slots: HashMap<ParticleId, usize>,
    frames: u64,
}

impl InstanceRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// Instance buffer as raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of `SYSTEM_UPDATE` notifications seen
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn get(&self, id: ParticleId) -> Option<&ParticleInstance> {
        self.slots.get(&id).map(|&i| &self.instances[i])
    }

    fn write(&mut self, particle: &Particle) {
        let instance = ParticleInstance::from_particle(particle);
        match self.slots.get(&particle.id) {
            Some(&i) => self.instances[i] = instance,
            None => {
                self.slots.insert(particle.id, self.instances.len());
                self.instances.push(instance);
                self.owners.push(particle.id);
            }
        }
    }
}

impl Renderer for InstanceRenderer {
    fn on_particle_created(&mut self, particle: &Particle) {
        self.write(particle);
    }

    fn on_particle_update(&mut self, particle: &Particle) {
        self.write(particle);
    }

    fn on_particle_dead(&mut self, particle: &Particle) {
        let Some(i) = self.slots.remove(&particle.id) else {
            return;
        };
        self.instances.swap_remove(i);
        self.owners.swap_remove(i);
        // The former last slot now lives at `i`
        if let Some(&moved) = self.owners.get(i) {
            self.slots.insert(moved, i);
        }
    }

    fn on_system_update(&mut self, _emitter: EmitterId) {
        self.frames += 1;
    }

    fn destroy(&mut self) {
        self.instances.clear();
        self.owners.clear();
        self.slots.clear();
    }
}
