//! Scene index: the collaborator that enumerates intersection candidates.
//!
//! The pointer never owns scene objects. It only asks a [`SceneIndex`] for the
//! candidates that pass the configured filter, whether an object still exists,
//! and how far along a ray an object (with its descendants) is hit.
//! [`SceneGraph`] is a small reference implementation used by the host and
//! by tests.

use crate::config::IntersectionFilter;
use crate::geometry::{Shape, Transform};
use glam::{Affine3A, Quat, Vec3};
use raypoint_core::{ObjectId, Ray};
use std::collections::{BTreeSet, HashMap};

/// What an intersection filter can see about a candidate.
pub trait Intersectable {
    /// Object identity.
    fn id(&self) -> ObjectId;
    /// Human-readable name.
    fn name(&self) -> &str;
    /// Whether the object carries the given eligibility flag.
    fn has_flag(&self, flag: &str) -> bool;
}

/// Queries the pointer performs against the scene each tick.
pub trait SceneIndex {
    /// Visit every object accepted by `filter`, in traversal order.
    ///
    /// The order must be stable between calls while the scene is unchanged;
    /// it decides ties between equidistant hits.
    fn for_each_candidate(&self, filter: &IntersectionFilter, visit: &mut dyn FnMut(ObjectId));

    /// Whether `id` is still part of the scene.
    fn contains(&self, id: ObjectId) -> bool;

    /// Nearest positive hit distance on `id` or any of its descendants.
    fn intersect(&self, id: ObjectId, ray: &Ray) -> Option<f32>;
}

/// A node in a [`SceneGraph`].
#[derive(Debug, Clone)]
pub struct SceneObject {
    id: ObjectId,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    /// Display name.
    pub name: String,
    /// Placement relative to the parent.
    pub transform: Transform,
    /// Geometry, if the object is hit-testable itself.
    pub shape: Option<Shape>,
    /// Eligibility flags read by intersection filters (e.g. `"clickable"`).
    pub flags: BTreeSet<String>,
}

impl SceneObject {
    /// New object with no geometry at the parent origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId(0),
            parent: None,
            children: Vec::new(),
            name: name.into(),
            transform: Transform::default(),
            shape: None,
            flags: BTreeSet::new(),
        }
    }

    /// Attach geometry.
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Set the local translation.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.translation = position;
        self
    }

    /// Set the local rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Set the local scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Add an eligibility flag.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Parent object, if any.
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }
}

impl Intersectable for SceneObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}

/// Arena-backed scene hierarchy.
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: HashMap<ObjectId, SceneObject>,
    roots: Vec<ObjectId>,
    next_id: u64,
}

impl SceneGraph {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, mut object: SceneObject, parent: Option<ObjectId>) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        object.id = id;
        object.parent = parent;
        object.children.clear();
        self.objects.insert(id, object);
        id
    }

    /// Add a top-level object.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = self.allocate(object, None);
        self.roots.push(id);
        id
    }

    /// Add `object` under `parent`. Returns `None` if the parent is unknown.
    pub fn add_child(&mut self, parent: ObjectId, object: SceneObject) -> Option<ObjectId> {
        if !self.objects.contains_key(&parent) {
            return None;
        }
        let id = self.allocate(object, Some(parent));
        if let Some(parent) = self.objects.get_mut(&parent) {
            parent.children.push(id);
        }
        Some(id)
    }

    /// Remove an object and its whole subtree. Returns `false` if unknown.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(parent) = self.objects.get(&id).map(|object| object.parent) else {
            return false;
        };
        match parent {
            Some(parent) => {
                if let Some(parent) = self.objects.get_mut(&parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(removed) = self.objects.remove(&next) {
                pending.extend(removed.children);
            }
        }
        true
    }

    /// Look up an object.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Look up an object for mutation.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// First object with the given name, in traversal order.
    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        let mut found = None;
        self.traverse(|object| {
            if found.is_none() && object.name == name {
                found = Some(object.id);
            }
        });
        found
    }

    /// Number of objects in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Compose local transforms from the root down to `id`.
    pub fn world_transform(&self, id: ObjectId) -> Option<Affine3A> {
        let mut object = self.objects.get(&id)?;
        let mut world = object.transform.to_affine();
        while let Some(parent) = object.parent {
            object = self.objects.get(&parent)?;
            world = object.transform.to_affine() * world;
        }
        Some(world)
    }

    /// Depth-first, pre-order walk over every object.
    pub fn traverse(&self, mut visit: impl FnMut(&SceneObject)) {
        let mut stack: Vec<ObjectId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(object) = self.objects.get(&id) {
                visit(object);
                stack.extend(object.children.iter().rev().copied());
            }
        }
    }

    fn intersect_subtree(&self, id: ObjectId, parent_world: Affine3A, ray: &Ray) -> Option<f32> {
        let object = self.objects.get(&id)?;
        let world = parent_world * object.transform.to_affine();

        let own = object.shape.and_then(|shape| shape.intersect(&world, ray));
        object
            .children
            .iter()
            .filter_map(|child| self.intersect_subtree(*child, world, ray))
            .chain(own)
            .min_by(f32::total_cmp)
    }
}

impl SceneIndex for SceneGraph {
    fn for_each_candidate(&self, filter: &IntersectionFilter, visit: &mut dyn FnMut(ObjectId)) {
        self.traverse(|object| {
            if filter.accepts(object) {
                visit(object.id);
            }
        });
    }

    fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    fn intersect(&self, id: ObjectId, ray: &Ray) -> Option<f32> {
        let object = self.objects.get(&id)?;
        let parent_world = match object.parent {
            Some(parent) => self.world_transform(parent)?,
            None => Affine3A::IDENTITY,
        };
        self.intersect_subtree(id, parent_world, ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(scene: &SceneGraph, filter: &IntersectionFilter) -> Vec<String> {
        let mut out = Vec::new();
        scene.for_each_candidate(filter, &mut |id| {
            out.push(scene.get(id).unwrap().name.clone());
        });
        out
    }

    #[test]
    fn traversal_is_depth_first_in_insertion_order() {
        let mut scene = SceneGraph::new();
        let a = scene.add(SceneObject::new("a"));
        let b = scene.add(SceneObject::new("b"));
        scene.add_child(a, SceneObject::new("a1")).unwrap();
        scene.add_child(a, SceneObject::new("a2")).unwrap();
        scene.add_child(b, SceneObject::new("b1")).unwrap();

        assert_eq!(
            names(&scene, &IntersectionFilter::all()),
            vec!["a", "a1", "a2", "b", "b1"]
        );
    }

    #[test]
    fn filter_selects_flagged_objects() {
        let mut scene = SceneGraph::new();
        scene.add(SceneObject::new("floor"));
        scene.add(SceneObject::new("cube").with_flag("clickable"));

        assert_eq!(
            names(&scene, &IntersectionFilter::flag("clickable")),
            vec!["cube"]
        );
    }

    #[test]
    fn remove_drops_whole_subtree() {
        let mut scene = SceneGraph::new();
        let parent = scene.add(SceneObject::new("parent"));
        let child = scene.add_child(parent, SceneObject::new("child")).unwrap();
        let other = scene.add(SceneObject::new("other"));

        assert!(scene.remove(parent));
        assert!(!scene.contains(parent));
        assert!(!scene.contains(child));
        assert!(scene.contains(other));
        assert_eq!(scene.len(), 1);
        assert!(!scene.remove(parent));
    }

    #[test]
    fn add_child_to_unknown_parent_fails() {
        let mut scene = SceneGraph::new();
        assert!(scene
            .add_child(ObjectId(99), SceneObject::new("orphan"))
            .is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn descendant_geometry_counts_for_parent() {
        let mut scene = SceneGraph::new();
        let group = scene.add(SceneObject::new("group").with_position(Vec3::new(0.0, 0.0, -5.0)));
        scene
            .add_child(
                group,
                SceneObject::new("part")
                    .with_shape(Shape::cube(1.0))
                    .with_position(Vec3::new(0.0, 0.0, 1.0)),
            )
            .unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = scene.intersect(group, &ray).unwrap();
        // Part sits at z = -4, front face at z = -3.5.
        assert!((hit - 3.5).abs() < 1e-4);
    }

    #[test]
    fn world_transform_composes_parents() {
        let mut scene = SceneGraph::new();
        let parent = scene.add(
            SceneObject::new("parent")
                .with_position(Vec3::new(1.0, 0.0, 0.0))
                .with_scale(Vec3::splat(2.0)),
        );
        let child = scene
            .add_child(parent, SceneObject::new("child").with_position(Vec3::Y))
            .unwrap();

        let world = scene.world_transform(child).unwrap();
        let origin = world.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn find_by_name_returns_first_match() {
        let mut scene = SceneGraph::new();
        let first = scene.add(SceneObject::new("cube"));
        scene.add(SceneObject::new("cube"));
        assert_eq!(scene.find_by_name("cube"), Some(first));
        assert_eq!(scene.find_by_name("missing"), None);
    }
}
