//! Seeded stress worlds for the probe.

use glam::Vec3;
use rand::Rng;
use tracing::info;
use worldreach_core::{scoped_rng, InteractionKind, ObjectCategory, SimTick};
use worldreach_physics::Aabb;
use worldreach_world::{InteractionManager, InteractiveObject};

const SCATTER_DOMAIN: u64 = 0x7363_6174_7465_72;

/// Primary kind a scattered object of `category` offers.
fn primary_for(category: ObjectCategory) -> InteractionKind {
    match category {
        ObjectCategory::Resource => InteractionKind::Gather,
        ObjectCategory::Container => InteractionKind::Loot,
        ObjectCategory::Furniture | ObjectCategory::Door => InteractionKind::Use,
        ObjectCategory::Npc => InteractionKind::Talk,
        ObjectCategory::Vehicle => InteractionKind::Mount,
        ObjectCategory::Weapon
        | ObjectCategory::Armor
        | ObjectCategory::Trigger
        | ObjectCategory::Decoration => InteractionKind::Examine,
    }
}

/// Scatter `count` objects on the ground plane within `half_extent` of the origin.
///
/// The same `seed` always produces the same world. Returns the number added.
pub fn scatter_world(
    manager: &mut InteractionManager,
    count: usize,
    seed: u64,
    half_extent: f32,
) -> usize {
    let mut rng = scoped_rng(seed, SCATTER_DOMAIN, SimTick::ZERO);
    let half_extent = half_extent.abs().max(1.0);
    let mut added = 0;

    for i in 0..count {
        let category = ObjectCategory::ALL[rng.gen_range(0..ObjectCategory::ALL.len())];
        let position = Vec3::new(
            rng.gen_range(-half_extent..half_extent),
            0.0,
            rng.gen_range(-half_extent..half_extent),
        );
        let size = Vec3::new(
            rng.gen_range(0.5..2.0),
            rng.gen_range(0.5..3.0),
            rng.gen_range(0.5..2.0),
        );
        let object = InteractiveObject::new(
            format!("{}_{i:06}", category.as_str()),
            category,
            position,
            Aabb::from_center_size(position + Vec3::Y * size.y * 0.5, size),
            primary_for(category),
        )
        .with_interaction_radius(rng.gen_range(1.5..4.0));

        if manager.add_object(object).is_ok() {
            added += 1;
        }
    }

    info!(added, seed, half_extent, "scattered stress world");
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(manager: &InteractionManager) -> Vec<String> {
        let mut ids: Vec<_> = manager.iter().map(|(_, o)| o.id.to_string()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn same_seed_same_world() {
        let mut a = InteractionManager::default();
        let mut b = InteractionManager::default();
        assert_eq!(scatter_world(&mut a, 200, 7, 100.0), 200);
        assert_eq!(scatter_world(&mut b, 200, 7, 100.0), 200);
        assert_eq!(ids(&a), ids(&b));

        for (_, object) in a.iter() {
            let twin = b.get(b.handle_of(&object.id).unwrap()).unwrap();
            assert_eq!(object.position(), twin.position());
        }
    }

    #[test]
    fn scattered_objects_stay_inside_extent() {
        let mut manager = InteractionManager::default();
        scatter_world(&mut manager, 100, 3, 50.0);
        assert!(manager
            .iter()
            .all(|(_, o)| o.position().x.abs() <= 50.0 && o.position().z.abs() <= 50.0));
        assert!(manager
            .iter()
            .all(|(_, o)| o.bounds().min.y == 0.0 && o.bounds().is_well_formed()));
    }
}
