//! Nearest-hit raycasting against object collision boxes.

use glam::Vec3;
use worldreach_physics::{aabb_face_normal, ray_aabb_intersection, Ray};

use crate::{InteractiveObject, ObjectArena, ObjectHandle, SpatialGrid};

/// Result of a raycast. Recomputed per query, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance along the ray to the hit, or the max distance on a miss.
    pub distance: f32,
    /// World-space hit point (end of the ray on a miss).
    pub point: Vec3,
    /// Outward normal of the struck face (`Vec3::ZERO` on a miss).
    pub normal: Vec3,
    /// The struck object.
    pub object: Option<ObjectHandle>,
}

impl RayHit {
    /// A miss reaching `max_distance` along `ray`.
    pub fn miss(ray: &Ray, max_distance: f32) -> Self {
        Self {
            distance: max_distance,
            point: ray.point_at(max_distance),
            normal: Vec3::ZERO,
            object: None,
        }
    }

    /// Whether an object was hit.
    pub fn is_hit(&self) -> bool {
        self.object.is_some()
    }
}

/// Nearest interactable box hit by `ray` among `candidates`, closer than `max_distance`.
///
/// Entries behind the origin (including boxes containing it) are skipped. On equal
/// distances the earlier candidate wins.
pub fn nearest_hit<'a, I>(ray: &Ray, max_distance: f32, candidates: I) -> RayHit
where
    I: IntoIterator<Item = (ObjectHandle, &'a InteractiveObject)>,
{
    let mut best = RayHit::miss(ray, max_distance);
    if ray.is_degenerate() {
        return best;
    }

    for (handle, object) in candidates {
        if !object.is_interactable() {
            continue;
        }
        let Some((t_min, _)) = ray_aabb_intersection(ray, object.bounds()) else {
            continue;
        };
        if t_min > 0.0 && t_min < best.distance {
            let point = ray.point_at(t_min);
            best = RayHit {
                distance: t_min,
                point,
                normal: aabb_face_normal(object.bounds(), point, ray.direction),
                object: Some(handle),
            };
        }
    }
    best
}

/// Cast from `origin` along `direction`, gathering candidates from `index`
/// within `max_distance` of the origin.
pub fn raycast(
    index: &SpatialGrid,
    objects: &ObjectArena,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> RayHit {
    let ray = Ray::new(origin, direction);
    if ray.is_degenerate() || max_distance.is_nan() || max_distance <= 0.0 {
        return RayHit::miss(&ray, max_distance);
    }

    let candidates = index.query(origin, max_distance);
    nearest_hit(
        &ray,
        max_distance,
        candidates.into_iter().filter_map(|handle| {
            let object = objects.get(handle)?;
            (object.position().distance(origin) <= max_distance).then_some((handle, object))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use worldreach_core::{InteractionKind, ObjectCategory};
    use worldreach_physics::Aabb;

    fn boxed(id: &str, center: Vec3) -> InteractiveObject {
        InteractiveObject::new(
            id,
            ObjectCategory::Decoration,
            center,
            Aabb::from_center_size(center, Vec3::ONE),
            InteractionKind::Examine,
        )
    }

    fn world(objects: Vec<InteractiveObject>) -> (ObjectArena, SpatialGrid, Vec<ObjectHandle>) {
        let mut arena = ObjectArena::new();
        let mut grid = SpatialGrid::new(10.0);
        let mut handles = Vec::new();
        for object in objects {
            let position = object.position();
            let handle = arena.insert(object).unwrap();
            grid.insert(handle, position);
            handles.push(handle);
        }
        (arena, grid, handles)
    }

    #[test]
    fn nearest_of_two_boxes_wins() {
        let (arena, grid, hs) = world(vec![
            boxed("far", Vec3::new(8.0, 0.0, 0.0)),
            boxed("near", Vec3::new(4.0, 0.0, 0.0)),
        ]);
        let hit = raycast(&grid, &arena, Vec3::ZERO, Vec3::X, 10.0);
        assert!(hit.is_hit());
        assert_eq!(hit.object, Some(hs[1]));
        assert!((hit.distance - 3.5).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::NEG_X);
        assert!((hit.point - Vec3::new(3.5, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn miss_reports_max_distance() {
        let (arena, grid, _) = world(vec![boxed("side", Vec3::new(0.0, 0.0, 5.0))]);
        let hit = raycast(&grid, &arena, Vec3::ZERO, Vec3::X, 10.0);
        assert!(!hit.is_hit());
        assert_eq!(hit.distance, 10.0);
        assert_eq!(hit.object, None);
    }

    #[test]
    fn facing_away_never_hits() {
        let (arena, grid, _) = world(vec![
            boxed("a", Vec3::new(4.0, 0.0, 0.0)),
            boxed("b", Vec3::new(6.0, 1.0, 0.0)),
        ]);
        let hit = raycast(&grid, &arena, Vec3::ZERO, Vec3::NEG_X, 10.0);
        assert!(!hit.is_hit());
    }

    #[test]
    fn objects_beyond_max_distance_are_ignored() {
        let (arena, grid, _) = world(vec![boxed("far", Vec3::new(12.0, 0.0, 0.0))]);
        assert!(!raycast(&grid, &arena, Vec3::ZERO, Vec3::X, 10.0).is_hit());
        assert!(raycast(&grid, &arena, Vec3::ZERO, Vec3::X, 20.0).is_hit());
    }

    #[test]
    fn non_interactable_boxes_are_transparent() {
        let (arena, grid, hs) = world(vec![
            boxed("ghost", Vec3::new(3.0, 0.0, 0.0)).with_interactable(false),
            boxed("solid", Vec3::new(6.0, 0.0, 0.0)),
        ]);
        let hit = raycast(&grid, &arena, Vec3::ZERO, Vec3::X, 10.0);
        assert_eq!(hit.object, Some(hs[1]));
    }

    #[test]
    fn origin_inside_box_skips_that_box() {
        let (arena, grid, hs) = world(vec![
            boxed("around", Vec3::ZERO),
            boxed("ahead", Vec3::new(5.0, 0.0, 0.0)),
        ]);
        let hit = raycast(&grid, &arena, Vec3::ZERO, Vec3::X, 10.0);
        assert_eq!(hit.object, Some(hs[1]));
    }

    #[test]
    fn zero_direction_is_a_no_op_ray() {
        let (arena, grid, _) = world(vec![boxed("a", Vec3::new(1.0, 0.0, 0.0))]);
        let hit = raycast(&grid, &arena, Vec3::ZERO, Vec3::ZERO, 10.0);
        assert!(!hit.is_hit());
        assert_eq!(hit.distance, 10.0);
    }

    #[test]
    fn unnormalized_direction_reports_world_distance() {
        let (arena, grid, _) = world(vec![boxed("a", Vec3::new(4.0, 0.0, 0.0))]);
        let hit = raycast(&grid, &arena, Vec3::ZERO, Vec3::new(25.0, 0.0, 0.0), 10.0);
        assert!((hit.distance - 3.5).abs() < 1e-5);
    }
}
