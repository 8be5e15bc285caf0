use glam::{Vec2, Vec3};
use log::debug;

use crate::camera::Camera;
use crate::scene::BodyKind;
use crate::spatial::SpatialQuery;
use crate::world::World;

/// Tuning for the drag controller. Defaults match the shipped feel.
#[derive(Debug, Clone)]
pub struct DragParams {
    /// Capsule radius for the volumetric placement check.
    pub collision_radius: f32,
    /// Extra clearance applied when resolving a penetration.
    pub safety_margin: f32,
    /// Clearance kept from obstacles while following the pointer.
    pub move_margin: f32,
    /// Clearance kept from obstacles while scrolling in depth.
    pub scroll_margin: f32,
    /// Ray thickness for the scroll obstruction check.
    pub scroll_ray_radius: f32,
    /// World units of depth per wheel unit.
    pub wheel_sensitivity: f32,
    /// Swept-sphere radius while the body is carried kinematically.
    pub ccd_radius: f32,
    pub min_depth: f32,
    pub max_depth: f32,
    pub release_mass: f32,
    pub release_linear_damping: f32,
    pub release_angular_damping: f32,
    pub release_restitution: f32,
    pub release_friction: f32,
}

impl Default for DragParams {
    fn default() -> Self {
        Self {
            collision_radius: 0.7,
            safety_margin: 0.4,
            move_margin: 0.1,
            scroll_margin: 0.3,
            scroll_ray_radius: 0.5,
            wheel_sensitivity: 0.1,
            ccd_radius: 0.2,
            min_depth: 0.2,
            max_depth: 10.0,
            release_mass: 10.0,
            release_linear_damping: 0.5,
            release_angular_damping: 0.8,
            release_restitution: 0.2,
            release_friction: 0.7,
        }
    }
}

/// Live drag state for one carried entity.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub entity: String,
    /// Distance from the camera at which the entity is carried.
    pub depth: f32,
    /// Grab-point offset so the entity does not snap to the pointer.
    pub offset: Vec3,
}

#[derive(Debug, Clone)]
struct PathHit {
    entity: String,
    safe_position: Vec3,
}

/// Pointer-driven carry of whitelisted props: pick on press, follow the
/// pointer at a fixed camera depth, scroll to change that depth, drop
/// into free physics on release.
#[derive(Debug, Default)]
pub struct DragController {
    params: DragParams,
    whitelist: Vec<String>,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(params: DragParams) -> Self {
        Self {
            params,
            whitelist: Vec::new(),
            session: None,
        }
    }

    pub fn params(&self) -> &DragParams {
        &self.params
    }

    /// Replaces the set of entities the player may currently pick up.
    pub fn set_whitelist(&mut self, names: impl IntoIterator<Item = String>) {
        self.whitelist = names.into_iter().collect();
    }

    pub fn whitelist(&self) -> &[String] {
        &self.whitelist
    }

    pub fn remove_from_whitelist(&mut self, name: &str) {
        self.whitelist.retain(|entry| entry != name);
    }

    pub fn dragged(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.entity.as_str())
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Drops the session without touching the body, for entities that
    /// leave the world mid-drag.
    pub fn forget(&mut self, name: &str) {
        if self.dragged() == Some(name) {
            self.session = None;
        }
    }

    /// Attempts to start a drag from a pointer press. The pick ray must
    /// hit a whitelisted entity first; anything else eats the click.
    pub fn try_pick(&mut self, world: &World, camera: &Camera, screen: Vec2) -> Option<String> {
        if self.session.is_some() {
            return None;
        }
        let (from, to) = camera.pick_ray(screen);
        let hit = world.raycast_first(from, to, None, 0.0)?;
        if !self.whitelist.iter().any(|name| *name == hit.entity) {
            debug!("pick ignored, {} is not grabbable", hit.entity);
            return None;
        }
        let position = world.position(&hit.entity)?;

        let depth = camera.distance_to(position);
        let offset = position - camera.screen_to_world(screen, depth);
        world.update(&hit.entity, |prop| {
            prop.body.kind = BodyKind::Kinematic;
            prop.body.ccd_enabled = true;
            prop.body.ccd_radius = self.params.ccd_radius;
            prop.body.linear_velocity = Vec3::ZERO;
            prop.body.angular_velocity = Vec3::ZERO;
        });
        debug!("picked {} at depth {depth:.2}", hit.entity);
        self.session = Some(DragSession {
            entity: hit.entity.clone(),
            depth,
            offset,
        });
        Some(hit.entity)
    }

    /// Follows the pointer, stopping short of anything in the way.
    pub fn update_drag(&mut self, world: &World, camera: &Camera, screen: Vec2) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(current) = world.position(&session.entity) else {
            return;
        };
        let desired = camera.screen_to_world(screen, session.depth) + session.offset;

        let target = match self.path_collision(
            world,
            &session.entity,
            current,
            desired,
            0.0,
            self.params.move_margin,
        ) {
            Some(hit) => hit.safe_position,
            None => desired,
        };
        world.teleport(&session.entity, target);
    }

    /// Moves the carry depth along the pointer ray. Obstructions clamp
    /// the depth to just in front of the obstacle.
    pub fn scroll(&mut self, world: &World, camera: &Camera, screen: Vec2, delta: f32) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let proposed = (session.depth + delta * self.params.wheel_sensitivity)
            .clamp(self.params.min_depth, self.params.max_depth);
        let Some(current) = world.position(&session.entity) else {
            return;
        };
        let desired = camera.screen_to_world(screen, proposed) + session.offset;

        let hit = {
            let entity = session.entity.clone();
            path_collision_impl(
                world,
                &entity,
                current,
                desired,
                self.params.scroll_ray_radius,
                self.params.scroll_margin,
            )
        };
        match hit {
            Some(hit) => {
                session.depth = camera.distance_to(hit.safe_position);
                world.teleport(&session.entity, hit.safe_position);
                debug!(
                    "scroll blocked by {}, depth clamped to {:.2}",
                    hit.entity, session.depth
                );
            }
            None => {
                session.depth = proposed;
                world.teleport(&session.entity, desired);
            }
        }
    }

    /// Ends the drag and hands the entity to free physics with the
    /// standard drop body, regardless of what it was before the pick.
    pub fn release(&mut self, world: &World) -> Option<String> {
        let session = self.session.take()?;
        world.update(&session.entity, |prop| {
            prop.body.kind = BodyKind::Dynamic;
            prop.body.mass = self.params.release_mass;
            prop.body.linear_damping = self.params.release_linear_damping;
            prop.body.angular_damping = self.params.release_angular_damping;
            prop.body.restitution = self.params.release_restitution;
            prop.body.friction = self.params.release_friction;
            prop.body.linear_velocity = Vec3::ZERO;
            prop.body.angular_velocity = Vec3::ZERO;
            prop.body.ccd_enabled = false;
            prop.body.active = true;
        });
        debug!("released {}", session.entity);
        Some(session.entity)
    }

    fn path_collision(
        &self,
        world: &World,
        entity: &str,
        from: Vec3,
        to: Vec3,
        radius: f32,
        margin: f32,
    ) -> Option<PathHit> {
        path_collision_impl(world, entity, from, to, radius, margin)
    }

    /// Stricter placement for infrequent checks: a capsule sweep catches
    /// the glancing contacts the per-frame ray misses. Overlaps push the
    /// target out along each separation; a clean sweep still gets the
    /// ray as a secondary guard.
    pub fn strict_placement(&self, world: &World, from: Vec3, desired: Vec3) -> Vec3 {
        let exclude = self.dragged();
        let overlaps =
            world.overlap_capsule(from, desired, self.params.collision_radius, exclude);
        if !overlaps.is_empty() {
            let mut adjusted = desired;
            for overlap in &overlaps {
                let away = adjusted - overlap.point;
                let away = if away.length_squared() > f32::EPSILON {
                    away.normalize()
                } else {
                    Vec3::Y
                };
                let depth = self.params.collision_radius + overlap.distance;
                adjusted += away * (depth + self.params.safety_margin);
            }
            return adjusted;
        }
        match world.raycast_first(from, desired, exclude, 0.0) {
            Some(hit) => hit.point + hit.normal * self.params.safety_margin,
            None => desired,
        }
    }
}

fn path_collision_impl(
    world: &World,
    entity: &str,
    from: Vec3,
    to: Vec3,
    radius: f32,
    margin: f32,
) -> Option<PathHit> {
    let hit = world.raycast_first(from, to, Some(entity), radius)?;
    Some(PathHit {
        safe_position: hit.point + hit.normal * margin,
        entity: hit.entity,
    })
}
