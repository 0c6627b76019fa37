use glam::{Mat4, Vec3, Vec4};
use crate::bounds::AABB;
use crate::error::Error;
use crate::math::Transform;
use super::*;

/// Camera at (0, 0, 5) looking at the origin, 90° FOV, near 0.1, far 100.
fn test_frustum() -> Frustum {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    Frustum::from_view_projection(&(projection * view))
}

fn aabb(min: Vec3, max: Vec3) -> AABB {
    AABB { min, max }
}

// ============================================================================
// Frustum::from_view_projection
// ============================================================================

#[test]
fn test_frustum_planes_are_normalized() {
    let frustum = test_frustum();
    for plane in &frustum.planes {
        assert!((plane.truncate().length() - 1.0).abs() < 1e-4);
    }
    assert_eq!(frustum.active, PlaneMask::all());
}

#[test]
fn test_frustum_from_orthographic_projection() {
    let projection = Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0);
    let frustum = Frustum::from_view_projection(&projection);

    assert!(frustum.contains_point(Vec3::new(9.0, -9.0, -50.0)));
    assert!(!frustum.contains_point(Vec3::new(11.0, 0.0, -50.0)));
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 1.0)));
}

#[test]
fn test_infinite_projection_disables_far_plane() {
    let projection = Mat4::perspective_infinite_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1);
    let frustum = Frustum::from_view_projection(&projection);

    assert!(!frustum.active.contains(PlaneMask::FAR));
    let hint = PlaneHint::new();
    let (result, _) = frustum.classify_sphere(Vec3::new(0.0, 0.0, -1.0e6), 1.0, PlaneMask::empty(), &hint);
    assert_eq!(result, FrustumTest::Inside);
}

#[test]
fn test_plane_index_out_of_range() {
    let frustum = test_frustum();
    assert!(frustum.plane(PLANE_FAR).is_ok());
    assert!(matches!(frustum.plane(6), Err(Error::InvalidArgument(_))));
    assert!(matches!(frustum.distance(6, Vec3::ZERO), Err(Error::InvalidArgument(_))));
    assert!(matches!(PlaneMask::plane(6), Err(Error::InvalidArgument(_))));
    assert!(PlaneMask::plane(usize::MAX).is_err());
}

#[test]
fn test_distance_matches_plane() {
    let frustum = test_frustum();
    let point = Vec3::new(0.5, -0.25, -3.0);
    for index in 0..PLANE_COUNT {
        let plane = frustum.plane(index).unwrap();
        let expected = plane.truncate().dot(point) + plane.w;
        assert_eq!(frustum.distance(index, point).unwrap(), expected);
    }
}

#[test]
fn test_from_planes_rejects_zero_normal() {
    let mut planes = test_frustum().planes;
    planes[PLANE_TOP] = Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert!(matches!(
        Frustum::from_planes(planes, PlaneMask::all()),
        Err(Error::Arithmetic(_))
    ));
    // Inactive planes may be degenerate
    assert!(Frustum::from_planes(planes, PlaneMask::all() - PlaneMask::TOP).is_ok());
}

// ============================================================================
// Sphere classification
// ============================================================================

#[test]
fn test_sphere_outside_all_planes() {
    let frustum = test_frustum();
    let hint = PlaneHint::new();
    let (result, _) = frustum.classify_sphere(Vec3::splat(1000.0), 1.0, PlaneMask::empty(), &hint);
    assert_eq!(result, FrustumTest::Outside);
}

#[test]
fn test_point_sphere_at_focus_is_inside() {
    let frustum = test_frustum();
    let hint = PlaneHint::new();
    let (result, mask) = frustum.classify_sphere(Vec3::ZERO, 0.0, PlaneMask::empty(), &hint);
    assert_eq!(result, FrustumTest::Inside);
    assert_eq!(mask, PlaneMask::all());
}

#[test]
fn test_shrinking_inside_sphere_stays_inside() {
    let frustum = test_frustum();
    let hint = PlaneHint::new();
    for radius in [3.0, 2.0, 1.0, 0.5, 0.0] {
        let (result, _) = frustum.classify_sphere(Vec3::ZERO, radius, PlaneMask::empty(), &hint);
        assert_eq!(result, FrustumTest::Inside, "radius {}", radius);
    }
}

#[test]
fn test_straddling_sphere_intersects() {
    let frustum = test_frustum();
    let hint = PlaneHint::new();
    // Side planes are ~3.54 away from the origin
    let (result, mask) = frustum.classify_sphere(Vec3::ZERO, 4.0, PlaneMask::empty(), &hint);
    assert_eq!(result, FrustumTest::Intersect);
    assert!(mask.contains(PlaneMask::NEAR | PlaneMask::FAR));
    assert!(!mask.contains(PlaneMask::LEFT));
}

#[test]
fn test_incoming_mask_skips_planes() {
    let frustum = test_frustum();
    let hint = PlaneHint::new();
    // Every plane claimed by the parent: nothing left to reject
    let (result, mask) = frustum.classify_sphere(Vec3::splat(1000.0), 1.0, PlaneMask::all(), &hint);
    assert_eq!(result, FrustumTest::Inside);
    assert_eq!(mask, PlaneMask::all());
}

#[test]
fn test_rejecting_plane_is_remembered() {
    let frustum = test_frustum();
    let hint = PlaneHint::new();

    let (result, _) = frustum.classify_sphere(Vec3::new(100.0, 0.0, 0.0), 1.0, PlaneMask::empty(), &hint);
    assert_eq!(result, FrustumTest::Outside);
    assert_eq!(hint.get(), Some(PLANE_RIGHT));

    // Between the eye and the near plane: the hinted plane does not reject,
    // the near plane does
    let (result, _) = frustum.classify_sphere(Vec3::new(0.0, 0.0, 4.95), 0.01, PlaneMask::empty(), &hint);
    assert_eq!(result, FrustumTest::Outside);
    assert_eq!(hint.get(), Some(PLANE_NEAR));

    hint.clear();
    assert_eq!(hint.get(), None);
}

#[test]
fn test_hint_does_not_change_result() {
    let frustum = test_frustum();
    let centers = [
        Vec3::ZERO,
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(-40.0, 2.0, -10.0),
        Vec3::new(0.0, 0.0, -120.0),
    ];
    for center in centers {
        let expected = frustum.classify_sphere(center, 1.5, PlaneMask::empty(), &PlaneHint::new());
        for plane in 0..PLANE_COUNT {
            let hint = PlaneHint::new();
            hint.set(plane);
            let with_hint = frustum.classify_sphere(center, 1.5, PlaneMask::empty(), &hint);
            assert_eq!(with_hint.0, expected.0);
        }
    }
}

// ============================================================================
// AABB tests
// ============================================================================

#[test]
fn test_aabb_inside_frustum() {
    let frustum = test_frustum();
    let b = aabb(Vec3::splat(-1.0), Vec3::splat(1.0));
    assert!(frustum.intersects_aabb(&b));
    let (result, _) = frustum.classify_aabb(&b, PlaneMask::empty(), &PlaneHint::new());
    assert_eq!(result, FrustumTest::Inside);
}

#[test]
fn test_aabb_behind_camera() {
    let frustum = test_frustum();
    let b = aabb(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 12.0));
    assert!(!frustum.intersects_aabb(&b));
    let (result, _) = frustum.classify_aabb(&b, PlaneMask::empty(), &PlaneHint::new());
    assert_eq!(result, FrustumTest::Outside);
}

#[test]
fn test_aabb_beyond_far_plane() {
    let frustum = test_frustum();
    let b = aabb(Vec3::new(-1.0, -1.0, -200.0), Vec3::new(1.0, 1.0, -180.0));
    assert!(!frustum.intersects_aabb(&b));
}

#[test]
fn test_aabb_intersecting_frustum_boundary() {
    let projection = Mat4::orthographic_rh(-5.0, 5.0, -5.0, 5.0, 0.1, 100.0);
    let frustum = Frustum::from_view_projection(&projection);

    // Straddles the right boundary at x = 5
    let b = aabb(Vec3::new(4.0, 0.0, -10.0), Vec3::new(6.0, 1.0, -5.0));
    assert!(frustum.intersects_aabb(&b));
    let (result, mask) = frustum.classify_aabb(&b, PlaneMask::empty(), &PlaneHint::new());
    assert_eq!(result, FrustumTest::Intersect);
    assert!(!mask.contains(PlaneMask::RIGHT));
    assert!(mask.contains(PlaneMask::LEFT));
}

// ============================================================================
// Transformation
// ============================================================================

#[test]
fn test_transformed_matches_moved_camera() {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
    let at_origin = Frustum::from_view_projection(&projection);
    let moved = at_origin
        .transformed(&Transform::from_translation(Vec3::new(0.0, 0.0, 5.0)))
        .unwrap();
    let expected = test_frustum();

    for (a, b) in moved.planes.iter().zip(expected.planes.iter()) {
        assert!((*a - *b).length() < 1e-4, "{:?} vs {:?}", a, b);
    }
}

#[test]
fn test_plane_constants() {
    assert_eq!(PLANE_LEFT, 0);
    assert_eq!(PLANE_RIGHT, 1);
    assert_eq!(PLANE_BOTTOM, 2);
    assert_eq!(PLANE_TOP, 3);
    assert_eq!(PLANE_NEAR, 4);
    assert_eq!(PLANE_FAR, 5);
    assert_eq!(PlaneMask::plane(PLANE_FAR).unwrap(), PlaneMask::FAR);
}
