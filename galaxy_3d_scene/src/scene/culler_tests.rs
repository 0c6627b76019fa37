use glam::Vec3;
use crate::bounds::{BoundingVolume, AABB};
use crate::scene::{OctreePartition, SceneElement};
use super::*;

fn sphere_at(center: Vec3, element_type: ElementType) -> SceneElement {
    SceneElement::new()
        .with_translation(center)
        .with_local_bounds(BoundingVolume::sphere(Vec3::ZERO, 1.0).unwrap())
        .with_type(element_type)
}

/// Scene with an octree, three renderables (front, behind, side) and one
/// light in front of the default view.
fn populated() -> (Scene, [SceneElementKey; 4]) {
    let mut scene = Scene::new();
    let region = AABB::new(Vec3::splat(-64.0), Vec3::splat(64.0)).unwrap();
    scene.add_partition(OctreePartition::new(region, 3).unwrap().with_priority(1));

    let front = scene.add_element(sphere_at(Vec3::new(0.0, 0.0, -10.0), ElementType::RENDERABLE));
    let behind = scene.add_element(sphere_at(Vec3::new(0.0, 0.0, 10.0), ElementType::RENDERABLE));
    let side = scene.add_element(sphere_at(Vec3::new(40.0, 0.0, -5.0), ElementType::RENDERABLE));
    let light = scene.add_element(sphere_at(Vec3::new(0.0, 2.0, -10.0), ElementType::LIGHT));
    scene.update(0.0).unwrap();
    (scene, [front, behind, side, light])
}

fn sorted(keys: &[SceneElementKey]) -> Vec<SceneElementKey> {
    let mut keys = keys.to_vec();
    keys.sort();
    keys
}

// ============================================================================
// BruteForceCuller
// ============================================================================

#[test]
fn test_brute_force_returns_all_of_type() {
    let (mut scene, [front, behind, side, light]) = populated();
    let mut view = View::new();

    let render_view = BruteForceCuller::new().cull(&mut scene, &mut view, ElementType::RENDERABLE);
    assert_eq!(sorted(render_view.visible_elements()), sorted(&[front, behind, side]));
    assert!(scene.element(behind).unwrap().is_potentially_visible());
    assert!(!scene.element(light).unwrap().is_potentially_visible());
}

// ============================================================================
// FrustumCuller
// ============================================================================

#[test]
fn test_frustum_culler_keeps_visible_only() {
    let (mut scene, [front, behind, side, light]) = populated();
    let mut view = View::new();

    let mut culler = FrustumCuller::new();
    let render_view = culler.cull(&mut scene, &mut view, ElementType::RENDERABLE);
    assert_eq!(render_view.visible_elements(), &[front]);
    assert_eq!(render_view.visible_count(), 1);
    assert_eq!(*render_view.view_matrix(), view.view_matrix());
    assert_eq!(*render_view.projection_matrix(), view.projection_matrix());

    assert!(scene.element(front).unwrap().is_potentially_visible());
    for hidden in [behind, side, light] {
        assert!(!scene.element(hidden).unwrap().is_potentially_visible());
    }
}

#[test]
fn test_frustum_culler_follows_view() {
    let (mut scene, [_, behind, _, light]) = populated();
    let mut view = View::new();
    let mut culler = FrustumCuller::new();

    view.look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), Vec3::Y).unwrap();
    let render_view = culler.cull(&mut scene, &mut view, ElementType::RENDERABLE);
    assert_eq!(render_view.visible_elements(), &[behind]);

    view.look_at(Vec3::ZERO, Vec3::new(0.0, 2.0, -10.0), Vec3::Y).unwrap();
    let render_view = culler.cull(&mut scene, &mut view, ElementType::LIGHT);
    assert_eq!(render_view.visible_elements(), &[light]);
}

#[test]
fn test_visibility_reset_by_update() {
    let (mut scene, [front, ..]) = populated();
    let mut view = View::new();
    FrustumCuller::new().cull(&mut scene, &mut view, ElementType::empty());
    assert!(scene.element(front).unwrap().is_potentially_visible());

    scene.update(0.016).unwrap();
    assert!(!scene.element(front).unwrap().is_potentially_visible());
}
