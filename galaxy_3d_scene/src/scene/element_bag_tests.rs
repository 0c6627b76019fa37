use glam::{Mat4, Vec3};
use slotmap::SlotMap;
use crate::bounds::BoundingVolume;
use crate::camera::Frustum;
use super::*;

type Elements = SlotMap<SceneElementKey, SceneElement>;

/// Box looking down -Z: x, y in [-10, 10], depth in [0.1, 100].
fn box_frustum() -> Frustum {
    Frustum::from_view_projection(&Mat4::orthographic_rh(-10.0, 10.0, -10.0, 10.0, 0.1, 100.0))
}

fn add(elements: &mut Elements, center: Vec3, element_type: ElementType) -> SceneElementKey {
    let mut element = SceneElement::new()
        .with_translation(center)
        .with_local_bounds(BoundingVolume::sphere(Vec3::ZERO, 1.0).unwrap())
        .with_type(element_type);
    element.update(None, 0.0, false);
    elements.insert(element)
}

fn sorted(mut keys: Vec<SceneElementKey>) -> Vec<SceneElementKey> {
    keys.sort();
    keys
}

// ============================================================================
// Spatial predicates
// ============================================================================

#[test]
fn test_frustum_matches() {
    let mut elements = Elements::with_key();
    let inside = add(&mut elements, Vec3::new(0.0, 0.0, -50.0), ElementType::empty());
    let straddling = add(&mut elements, Vec3::new(10.0, 0.0, -50.0), ElementType::empty());
    let outside = add(&mut elements, Vec3::new(30.0, 0.0, -50.0), ElementType::empty());
    let unbounded = elements.insert(SceneElement::new());

    let frustum = box_frustum();
    assert!(frustum_matches(&elements[inside], &frustum));
    assert!(frustum_matches(&elements[straddling], &frustum));
    assert!(!frustum_matches(&elements[outside], &frustum));
    assert!(frustum_matches(&elements[unbounded], &frustum));
}

#[test]
fn test_rejecting_plane_is_remembered() {
    let mut elements = Elements::with_key();
    let behind = add(&mut elements, Vec3::new(0.0, 0.0, 50.0), ElementType::empty());

    assert!(!frustum_matches(&elements[behind], &box_frustum()));
    assert!(elements[behind].plane_hint().get().is_some());
}

#[test]
fn test_volume_matches() {
    let mut elements = Elements::with_key();
    let near = add(&mut elements, Vec3::new(2.0, 0.0, 0.0), ElementType::empty());
    let far = add(&mut elements, Vec3::new(9.0, 0.0, 0.0), ElementType::empty());
    let unbounded = elements.insert(SceneElement::new());

    let volume = BoundingVolume::sphere(Vec3::ZERO, 1.5).unwrap();
    assert!(volume_matches(&elements[near], &volume));
    assert!(!volume_matches(&elements[far], &volume));
    assert!(volume_matches(&elements[unbounded], &volume));
}

// ============================================================================
// ElementBag
// ============================================================================

#[test]
fn test_bag_insert_remove() {
    let mut elements = Elements::with_key();
    let keys: Vec<_> = (0..5).map(|_| elements.insert(SceneElement::new())).collect();

    let mut bag = ElementBag::new();
    for &key in &keys {
        assert!(bag.insert(key));
    }
    assert!(!bag.insert(keys[0]));
    assert_eq!(bag.len(), 5);

    assert!(bag.remove(keys[1]));
    assert!(!bag.remove(keys[1]));
    assert!(!bag.contains(keys[1]));
    assert_eq!(bag.len(), 4);

    // Swap-remove keeps the remaining positions valid
    assert!(bag.remove(keys[0]));
    assert!(bag.remove(keys[4]));
    assert!(bag.contains(keys[2]) && bag.contains(keys[3]));
    assert_eq!(sorted(bag.keys().to_vec()), sorted(vec![keys[2], keys[3]]));
}

#[test]
fn test_bag_drain() {
    let mut elements = Elements::with_key();
    let a = elements.insert(SceneElement::new());
    let b = elements.insert(SceneElement::new());

    let mut bag = ElementBag::new();
    bag.insert(a);
    bag.insert(b);
    assert_eq!(sorted(bag.drain()), sorted(vec![a, b]));
    assert!(bag.is_empty());
    assert!(bag.insert(a));
}

// ============================================================================
// TypeIndex
// ============================================================================

#[test]
fn test_type_index_add_fills_from_existing_keys() {
    let mut elements = Elements::with_key();
    let light = add(&mut elements, Vec3::ZERO, ElementType::LIGHT);
    let both = add(&mut elements, Vec3::ZERO, ElementType::LIGHT | ElementType::RENDERABLE);
    let mesh = add(&mut elements, Vec3::ZERO, ElementType::RENDERABLE);
    let keys = [light, both, mesh];

    let mut index = TypeIndex::new();
    assert!(index.add(ElementType::LIGHT, &keys, &elements));
    assert!(!index.add(ElementType::LIGHT, &keys, &elements));
    assert!(!index.add(ElementType::empty(), &keys, &elements));

    let set = index.get(ElementType::LIGHT).unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&light) && set.contains(&both));
    assert!(index.get(ElementType::RENDERABLE).is_none());
    assert_eq!(index.types().collect::<Vec<_>>(), vec![ElementType::LIGHT]);
}

#[test]
fn test_type_index_insert_key_drops_stale_entries() {
    let mut elements = Elements::with_key();
    let key = add(&mut elements, Vec3::ZERO, ElementType::LIGHT);

    let mut index = TypeIndex::new();
    index.add(ElementType::LIGHT, &[], &elements);
    index.add(ElementType::SOUND, &[], &elements);

    index.insert_key(key, ElementType::LIGHT);
    assert!(index.get(ElementType::LIGHT).unwrap().contains(&key));

    index.insert_key(key, ElementType::SOUND);
    assert!(!index.get(ElementType::LIGHT).unwrap().contains(&key));
    assert!(index.get(ElementType::SOUND).unwrap().contains(&key));

    index.remove_key(key);
    assert!(index.get(ElementType::SOUND).unwrap().is_empty());
    assert!(index.remove(ElementType::SOUND));
    assert!(!index.contains(ElementType::SOUND));
}

// ============================================================================
// IndexedBag
// ============================================================================

#[test]
fn test_indexed_query_matches_unindexed() {
    let mut elements = Elements::with_key();
    let types = [ElementType::LIGHT, ElementType::RENDERABLE, ElementType::LIGHT | ElementType::SOUND];
    let mut bag = IndexedBag::new();
    for i in 0..30 {
        let center = Vec3::new(i as f32 - 15.0, 0.0, -20.0);
        let key = add(&mut elements, center, types[i % types.len()]);
        bag.insert(key, &elements[key]);
    }

    let frustum = box_frustum();
    let run = |bag: &IndexedBag, filter| {
        let mut results = Vec::new();
        bag.query(filter, &elements, &mut results, |element| frustum_matches(element, &frustum));
        sorted(results)
    };

    let plain = run(&bag, ElementType::LIGHT);
    assert!(!plain.is_empty());

    assert!(bag.add_index(ElementType::LIGHT, &elements));
    assert!(bag.has_index(ElementType::LIGHT));
    assert_eq!(run(&bag, ElementType::LIGHT), plain);
    assert!(bag.remove_index(ElementType::LIGHT));
    assert_eq!(run(&bag, ElementType::LIGHT), plain);
}

#[test]
fn test_indexed_query_rechecks_retyped_element() {
    let mut elements = Elements::with_key();
    let key = add(&mut elements, Vec3::new(0.0, 0.0, -20.0), ElementType::LIGHT);

    let mut bag = IndexedBag::new();
    bag.insert(key, &elements[key]);
    bag.add_index(ElementType::LIGHT, &elements);

    // Type changed without a refresh: the index is stale but results are not
    elements[key].set_element_type(ElementType::SOUND);
    let mut results = Vec::new();
    bag.query(ElementType::LIGHT, &elements, &mut results, |_| true);
    assert!(results.is_empty());
}

#[test]
fn test_indexed_bag_clear() {
    let mut elements = Elements::with_key();
    let key = add(&mut elements, Vec3::ZERO, ElementType::LIGHT);

    let mut bag = IndexedBag::new();
    bag.insert(key, &elements[key]);
    bag.add_index(ElementType::LIGHT, &elements);

    assert_eq!(bag.clear(), vec![key]);
    assert!(bag.bag().is_empty());
    assert!(!bag.has_index(ElementType::LIGHT));
    assert!(!bag.remove(key));
}
