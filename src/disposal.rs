use glam::Vec3;
use log::{info, warn};

use crate::drag::DragController;
use crate::scene::Scene;
use crate::world::World;

/// Cosmetic feedback seam for disposal. The embedder spawns the actual
/// particle burst; headless runs log it.
pub trait FxSink {
    fn burst(&self, position: Vec3);
}

#[derive(Debug, Default)]
pub struct LogFxSink;

impl FxSink for LogFxSink {
    fn burst(&self, position: Vec3) {
        info!("fx burst at {position}");
    }
}

/// Watches disposable items and removes any that ends up inside the
/// receptacle volume, whether it was dropped, nudged or thrown there.
#[derive(Debug)]
pub struct DisposalCheck {
    items: Vec<String>,
    receptacle: String,
}

impl DisposalCheck {
    pub fn new(receptacle: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            items,
            receptacle: receptacle.into(),
        }
    }

    /// Wires the check up from the scene: the first receptacle object
    /// plus every disposable prop. Scenes without a receptacle get no
    /// disposal pass.
    pub fn from_scene(scene: &Scene) -> Option<Self> {
        let Some(receptacle) = scene
            .objects
            .iter()
            .find(|object| object.object_type == "receptacle")
        else {
            warn!("scene has no receptacle, disposal disabled");
            return None;
        };
        let items = scene
            .objects
            .iter()
            .filter(|object| object.disposable)
            .map(|object| object.name.clone())
            .collect();
        Some(Self::new(receptacle.name.clone(), items))
    }

    /// Items still in play.
    pub fn remaining(&self, world: &World) -> usize {
        self.items
            .iter()
            .filter(|item| world.is_alive(item))
            .count()
    }

    /// One containment pass. Disposed items leave the world and the
    /// drag whitelist so a mid-drag disposal cannot strand a session.
    pub fn tick(&self, world: &World, drag: &mut DragController, fx: &dyn FxSink) {
        let Some(receptacle) = world.get(&self.receptacle) else {
            return;
        };
        for item in &self.items {
            let Some(position) = world.position(item) else {
                continue;
            };
            let delta = position - receptacle.position;
            let inside = delta.abs().cmple(receptacle.half_extents).all();
            if !inside {
                continue;
            }
            info!("{item} disposed of");
            fx.burst(position);
            world.destroy(item);
            drag.remove_from_whitelist(item);
            drag.forget(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::drag::{DragController, DragParams};

    #[derive(Debug, Default, Clone)]
    struct MemoryFxSink {
        bursts: Arc<Mutex<Vec<Vec3>>>,
    }

    impl FxSink for MemoryFxSink {
        fn burst(&self, position: Vec3) {
            self.bursts.lock().push(position);
        }
    }

    fn scene() -> Scene {
        Scene::from_xml(
            r#"<scene>
                <object>
                    <name>bin</name>
                    <type>receptacle</type>
                    <position>2.5 0.4 0</position>
                    <halfExtents>0.5 0.4 0.5</halfExtents>
                </object>
                <object>
                    <name>wrapper</name>
                    <position>-2 0.15 0.5</position>
                    <halfExtents>0.12 0.12 0.12</halfExtents>
                    <body>dynamic</body>
                    <disposable>true</disposable>
                </object>
                <object>
                    <name>keepsake</name>
                    <position>0 0.15 0.5</position>
                    <halfExtents>0.12 0.12 0.12</halfExtents>
                    <body>dynamic</body>
                </object>
            </scene>"#,
        )
        .unwrap()
    }

    #[test]
    fn item_inside_the_receptacle_is_destroyed_with_a_burst() {
        let scene = scene();
        let world = World::from_scene(&scene);
        let check = DisposalCheck::from_scene(&scene).unwrap();
        let mut drag = DragController::new(DragParams::default());
        drag.set_whitelist(["wrapper".to_string()]);
        let fx = MemoryFxSink::default();

        check.tick(&world, &mut drag, &fx);
        assert!(world.is_alive("wrapper"));
        assert_eq!(check.remaining(&world), 1);

        world.teleport("wrapper", Vec3::new(2.5, 0.4, 0.0));
        check.tick(&world, &mut drag, &fx);
        assert!(!world.is_alive("wrapper"));
        assert_eq!(check.remaining(&world), 0);
        assert_eq!(fx.bursts.lock().len(), 1);
        assert!(drag.whitelist().is_empty());
    }

    #[test]
    fn containment_requires_every_axis() {
        let scene = scene();
        let world = World::from_scene(&scene);
        let check = DisposalCheck::from_scene(&scene).unwrap();
        let mut drag = DragController::new(DragParams::default());
        let fx = MemoryFxSink::default();

        // above the opening, not inside
        world.teleport("wrapper", Vec3::new(2.5, 1.5, 0.0));
        check.tick(&world, &mut drag, &fx);
        assert!(world.is_alive("wrapper"));
    }

    #[test]
    fn non_disposable_props_are_never_collected() {
        let scene = scene();
        let world = World::from_scene(&scene);
        let check = DisposalCheck::from_scene(&scene).unwrap();
        let mut drag = DragController::new(DragParams::default());
        let fx = MemoryFxSink::default();

        world.teleport("keepsake", Vec3::new(2.5, 0.4, 0.0));
        check.tick(&world, &mut drag, &fx);
        assert!(world.is_alive("keepsake"));
        assert!(fx.bursts.lock().is_empty());
    }

    #[test]
    fn scene_without_receptacle_disables_the_check() {
        let scene = Scene::from_xml(
            "<scene><object><name>lone</name><disposable>true</disposable></object></scene>",
        )
        .unwrap();
        assert!(DisposalCheck::from_scene(&scene).is_none());
    }
}
