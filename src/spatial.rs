use glam::Vec3;

use crate::scene::BodyKind;
use crate::world::{Prop, World};

/// Nearest intersection reported by a ray query.
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub entity: String,
}

/// A body overlapping a swept capsule.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapHit {
    pub entity: String,
    pub point: Vec3,
    pub distance: f32,
}

/// Ray-cast / volume-overlap primitives against the physical scene.
///
/// Best effort: thin or fast geometry may slip through both query kinds;
/// callers treat that as a physical approximation, not an error.
pub trait SpatialQuery {
    /// Casts a segment and returns the nearest hit. `radius` expands the
    /// target volumes for a volumetric ray; `exclude` skips one entity.
    fn raycast_first(
        &self,
        from: Vec3,
        to: Vec3,
        exclude: Option<&str>,
        radius: f32,
    ) -> Option<RayHit>;

    /// Sweeps a capsule from `start` to `end` and reports every
    /// overlapping body.
    fn overlap_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        exclude: Option<&str>,
    ) -> Vec<OverlapHit>;
}

fn has_collider(prop: &Prop) -> bool {
    prop.alive && prop.body.kind != BodyKind::None && prop.half_extents != Vec3::ZERO
}

/// Segment / axis-aligned box intersection. Returns the entry parameter
/// in `[0, 1]` and the entry-face normal. Segments starting inside the
/// box report no hit.
fn segment_box(from: Vec3, dir: Vec3, center: Vec3, half: Vec3) -> Option<(f32, Vec3)> {
    let origin = (from - center).to_array();
    let dir = dir.to_array();
    let half = half.to_array();

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0usize;

    for axis in 0..3 {
        if dir[axis].abs() < 1e-8 {
            if origin[axis].abs() > half[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[axis];
        let mut t0 = (-half[axis] - origin[axis]) * inv;
        let mut t1 = (half[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            enter_axis = axis;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 || t_enter > 1.0 {
        return None;
    }

    let mut normal = [0.0f32; 3];
    normal[enter_axis] = -dir[enter_axis].signum();
    Some((t_enter, Vec3::from_array(normal)))
}

impl SpatialQuery for World {
    fn raycast_first(
        &self,
        from: Vec3,
        to: Vec3,
        exclude: Option<&str>,
        radius: f32,
    ) -> Option<RayHit> {
        let dir = to - from;
        if dir.length_squared() < 1e-12 {
            return None;
        }

        let mut nearest: Option<(f32, RayHit)> = None;
        for prop in self.props().iter() {
            if !has_collider(prop) || exclude == Some(prop.name.as_str()) {
                continue;
            }
            let half = prop.half_extents + Vec3::splat(radius);
            let Some((t, normal)) = segment_box(from, dir, prop.position, half) else {
                continue;
            };
            if nearest.as_ref().map_or(true, |(best, _)| t < *best) {
                nearest = Some((
                    t,
                    RayHit {
                        point: from + dir * t,
                        normal,
                        entity: prop.name.clone(),
                    },
                ));
            }
        }
        nearest.map(|(_, hit)| hit)
    }

    fn overlap_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        exclude: Option<&str>,
    ) -> Vec<OverlapHit> {
        let axis = end - start;
        let axis_len_sq = axis.length_squared();

        let mut hits = Vec::new();
        for prop in self.props().iter() {
            if !has_collider(prop) || exclude == Some(prop.name.as_str()) {
                continue;
            }
            let t = if axis_len_sq < 1e-12 {
                0.0
            } else {
                ((prop.position - start).dot(axis) / axis_len_sq).clamp(0.0, 1.0)
            };
            let on_axis = start + axis * t;
            let lo = prop.position - prop.half_extents;
            let hi = prop.position + prop.half_extents;
            let closest = on_axis.clamp(lo, hi);
            let distance = on_axis.distance(closest);
            if distance <= radius {
                hits.push(OverlapHit {
                    entity: prop.name.clone(),
                    point: closest,
                    distance,
                });
            }
        }
        hits
    }
}
