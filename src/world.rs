use std::sync::Arc;

use glam::Vec3;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};

use crate::scene::{BodyKind, Scene};

/// Simulated rigid-body state of a prop. The actual integration runs in
/// the external physics collaborator; this mirrors the knobs gameplay
/// logic is allowed to turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub kind: BodyKind,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub ccd_enabled: bool,
    pub ccd_radius: f32,
    pub active: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            kind: BodyKind::None,
            mass: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            restitution: 0.0,
            friction: 0.5,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            ccd_enabled: false,
            ccd_radius: 0.0,
            active: true,
        }
    }
}

/// A live scene object. Destroyed props stay in the store (for final
/// state reports) but stop answering lookups and spatial queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub half_extents: Vec3,
    pub body: RigidBody,
    pub material: Option<String>,
    pub disposable: bool,
    pub alive: bool,
}

/// Thread-safe container mirroring the mutable state of the room.
#[derive(Debug, Default)]
pub struct World {
    props: Arc<RwLock<Vec<Prop>>>,
}

impl Clone for World {
    fn clone(&self) -> Self {
        Self {
            props: Arc::clone(&self.props),
        }
    }
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the world from a parsed scene, camera objects excluded.
    pub fn from_scene(scene: &Scene) -> Self {
        let props = scene
            .objects
            .iter()
            .filter(|object| object.object_type != "camera")
            .map(|object| Prop {
                name: object.name.clone(),
                position: object.position,
                rotation: object.rotation,
                half_extents: object.half_extents,
                body: RigidBody {
                    kind: object.body,
                    mass: object.mass,
                    ..RigidBody::default()
                },
                material: object.material.clone(),
                disposable: object.disposable,
                alive: true,
            })
            .collect();
        Self {
            props: Arc::new(RwLock::new(props)),
        }
    }

    /// Returns a snapshot of every stored prop, destroyed ones included.
    pub fn snapshot(&self) -> Vec<Prop> {
        self.props.read().clone()
    }

    /// Returns a clone of the requested live prop.
    pub fn get(&self, name: &str) -> Option<Prop> {
        self.props
            .read()
            .iter()
            .find(|prop| prop.alive && prop.name == name)
            .cloned()
    }

    pub fn is_alive(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<Vec3> {
        self.get(name).map(|prop| prop.position)
    }

    /// Applies a mutation to the requested live prop.
    pub fn update<F, R>(&self, name: &str, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut Prop) -> R,
    {
        let mut guard = self.props.write();
        let prop = guard
            .iter_mut()
            .find(|prop| prop.alive && prop.name == name)?;
        Some(updater(prop))
    }

    pub fn set_position(&self, name: &str, position: Vec3) -> bool {
        self.update(name, |prop| prop.position = position).is_some()
    }

    /// Moves a prop and resets its accumulated velocities, the way the
    /// physics collaborator treats a teleport.
    pub fn teleport(&self, name: &str, position: Vec3) -> bool {
        self.update(name, |prop| {
            prop.position = position;
            prop.body.linear_velocity = Vec3::ZERO;
            prop.body.angular_velocity = Vec3::ZERO;
        })
        .is_some()
    }

    pub fn set_body_kind(&self, name: &str, kind: BodyKind) -> bool {
        self.update(name, |prop| prop.body.kind = kind).is_some()
    }

    /// Applies an instantaneous impulse, scaled by mass.
    pub fn apply_impulse(&self, name: &str, impulse: Vec3) -> bool {
        self.update(name, |prop| {
            let mass = prop.body.mass.max(f32::EPSILON);
            prop.body.linear_velocity += impulse / mass;
            prop.body.active = true;
        })
        .is_some()
    }

    /// Swaps the visual material. Returns false when the prop is gone;
    /// callers skip the visual change and continue.
    pub fn set_material(&self, name: &str, material: &str) -> bool {
        self.update(name, |prop| prop.material = Some(material.to_string()))
            .is_some()
    }

    /// Removes a prop from play. Further lookups and queries ignore it.
    pub fn destroy(&self, name: &str) -> bool {
        self.update(name, |prop| prop.alive = false).is_some()
    }

    pub(crate) fn props(&self) -> RwLockReadGuard<'_, Vec<Prop>> {
        self.props.read()
    }
}
