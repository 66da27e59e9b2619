//! Scene world: hecs storage plus the per-frame transform pass

use std::rc::Rc;

use glam::Mat4;
use hecs::Entity;

use super::components::{Name, Node};
use super::hierarchy::{Children, Parent};
use crate::core::{GeometryDesc, PropagationStats, Scene, SceneConfig, SceneError};
use crate::geometry::{Aabb, ArtifactSource, Geometry, Raycast};
use crate::transform::{LocalTransform, WorldTransformCache};
use crate::upload::UploadTarget;

/// A node hit by a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    /// Distance along the world-space ray to the node's bounds
    pub distance: f32,
}

/// Borrowed view of one node, walkable by upload discovery
#[derive(Clone, Copy)]
pub struct NodeRef<'w> {
    world: &'w hecs::World,
    pub entity: Entity,
}

impl<'w> NodeRef<'w> {
    /// The node's transform state
    pub fn node(&self) -> Option<hecs::Ref<'w, Node>> {
        self.world.get::<&Node>(self.entity).ok()
    }

    /// The node's name, if it has one
    pub fn name(&self) -> Option<hecs::Ref<'w, Name>> {
        self.world.get::<&Name>(self.entity).ok()
    }
}

impl UploadTarget for NodeRef<'_> {
    fn children(&self) -> Vec<Self> {
        self.world
            .get::<&Children>(self.entity)
            .map(|children| {
                children
                    .iter()
                    .map(|&entity| NodeRef { world: self.world, entity })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Scene graph containing all nodes and their hierarchy
pub struct SceneWorld {
    /// The underlying hecs world
    pub inner: hecs::World,
    track_bounds: bool,
}

impl SceneWorld {
    /// Create an empty world with default settings
    pub fn new() -> Self {
        Self::with_config(&SceneConfig::default())
    }

    /// Create an empty world
    pub fn with_config(config: &SceneConfig) -> Self {
        Self {
            inner: hecs::World::new(),
            track_bounds: config.track_bounds,
        }
    }

    /// Build a world from a scene description
    ///
    /// # Errors
    ///
    /// Returns an error if a node's parent does not precede it
    pub fn from_scene(scene: &Scene, config: &SceneConfig) -> Result<(Self, Vec<Entity>), SceneError> {
        scene.validate()?;

        let mut world = Self::with_config(config);
        let mut entities = Vec::with_capacity(scene.nodes.len());
        for desc in &scene.nodes {
            let local = LocalTransform::from_parts(desc.position, desc.rotation, desc.scale);
            let mut node = Node::new(local);
            node.geometry = desc.geometry.as_ref().map(|g| match g {
                GeometryDesc::Cuboid { min, max } => Geometry::cuboid(*min, *max),
                GeometryDesc::Vertices(vertices) => Geometry::new(vertices.clone()),
            });

            let entity = match &desc.name {
                Some(name) => world.inner.spawn((node, Name::new(name.as_str()))),
                None => world.inner.spawn((node,)),
            };
            if let Some(parent) = desc.parent {
                world.attach(entities[parent], entity);
            }
            entities.push(entity);
        }

        log::info!(
            "Instantiated scene '{}' with {} nodes",
            scene.name,
            entities.len()
        );
        Ok((world, entities))
    }

    /// Spawn a root node
    pub fn spawn_node(&mut self, name: impl Into<String>, local: LocalTransform) -> Entity {
        self.inner.spawn((Node::new(local), Name::new(name)))
    }

    /// Make `child` a child of `parent`, detaching it from any previous parent
    ///
    /// Returns `false` if either entity is missing, or if the link would
    /// create a cycle.
    pub fn attach(&mut self, parent: Entity, child: Entity) -> bool {
        if parent == child || !self.inner.contains(parent) || !self.inner.contains(child) {
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach {child:?} under its own descendant {parent:?}");
            return false;
        }

        self.detach(child);
        let _ = self.inner.insert_one(child, Parent(parent));
        if let Ok(mut children) = self.inner.get::<&mut Children>(parent) {
            children.add(child);
            return true;
        }
        let mut children = Children::default();
        children.add(child);
        let _ = self.inner.insert_one(parent, children);
        true
    }

    /// Detach `child` from its parent; it becomes a root
    pub fn detach(&mut self, child: Entity) {
        let Ok(Parent(parent)) = self.inner.remove_one::<Parent>(child) else {
            return;
        };
        if let Ok(mut children) = self.inner.get::<&mut Children>(parent) {
            children.remove(child);
        }
    }

    /// Despawn a node and its whole subtree
    pub fn despawn_recursive(&mut self, entity: Entity) {
        self.detach(entity);
        let mut stack = vec![entity];
        while let Some(current) = stack.pop() {
            if let Ok(children) = self.inner.get::<&Children>(current) {
                stack.extend(children.iter().copied());
            }
            let _ = self.inner.despawn(current);
        }
    }

    fn is_ancestor(&self, ancestor: Entity, mut entity: Entity) -> bool {
        while let Ok(parent) = self.inner.get::<&Parent>(entity) {
            entity = parent.entity();
            if entity == ancestor {
                return true;
            }
        }
        false
    }

    /// Get a node's parent
    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        self.inner.get::<&Parent>(entity).ok().map(|p| p.entity())
    }

    /// Mutable access to a node's local transform
    pub fn local_mut(&mut self, entity: Entity) -> Option<hecs::RefMut<'_, Node>> {
        self.inner.get::<&mut Node>(entity).ok()
    }

    /// Attach or replace a node's geometry
    pub fn set_geometry(&mut self, entity: Entity, geometry: Option<Geometry>) -> bool {
        match self.inner.get::<&mut Node>(entity) {
            Ok(mut node) => {
                node.geometry = geometry;
                true
            }
            Err(_) => false,
        }
    }

    /// World matrix from the last propagation
    pub fn world_matrix(&self, entity: Entity) -> Option<Mat4> {
        self.inner.get::<&Node>(entity).ok()?.world_matrix()
    }

    /// World-space bounds from the last propagation
    pub fn world_bounds(&self, entity: Entity) -> Option<Aabb> {
        self.inner.get::<&Node>(entity).ok()?.world_bounds()
    }

    /// Borrow a node for upload discovery
    pub fn node_ref(&self, entity: Entity) -> NodeRef<'_> {
        NodeRef {
            world: &self.inner,
            entity,
        }
    }

    /// Nodes without a parent, ordered by entity index
    pub fn roots(&self) -> Vec<Entity> {
        let mut roots: Vec<Entity> = self
            .inner
            .query::<(&Node, Option<&Parent>)>()
            .iter()
            .filter(|(_, (_, parent))| parent.is_none())
            .map(|(entity, _)| entity)
            .collect();
        roots.sort_unstable_by_key(|e| e.id());
        roots
    }

    /// Look up a node by name
    pub fn find(&self, name: &str) -> Option<Entity> {
        self.inner
            .query::<&Name>()
            .iter()
            .find(|(_, n)| n.0 == name)
            .map(|(entity, _)| entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    // -------------------------------------------------------------------------
    // Per-frame passes
    // -------------------------------------------------------------------------

    /// Bring every world transform (and bounds) up to date
    ///
    /// Depth-first from the roots; roots compose with the shared identity
    /// transform. Nodes whose parent and local are both unchanged skip all
    /// matrix work.
    pub fn propagate(&mut self) -> PropagationStats {
        let mut stats = PropagationStats::default();

        let root = Rc::new(WorldTransformCache::identity().clone());
        let mut stack: Vec<(Entity, Rc<WorldTransformCache>)> = self
            .roots()
            .into_iter()
            .rev()
            .map(|e| (e, Rc::clone(&root)))
            .collect();

        while let Some((entity, parent_world)) = stack.pop() {
            let has_children = self
                .inner
                .get::<&Children>(entity)
                .is_ok_and(|children| !children.is_empty());

            // Children share one snapshot of this node's world cache
            let shared = {
                let Ok(mut node) = self.inner.get::<&mut Node>(entity) else {
                    continue;
                };
                let Node {
                    local,
                    world,
                    geometry,
                    bounds,
                    ..
                } = &mut *node;

                stats.visited += 1;
                let world = parent_world.resolve_child_cache(world, local);
                if world.was_updated() {
                    stats.recomputed += 1;
                } else {
                    stats.skipped += 1;
                }

                if self.track_bounds
                    && world
                        .resolve_child_bounds(bounds, geometry.as_ref())
                        .is_some_and(|b| b.was_updated())
                {
                    stats.bounds_updated += 1;
                }
                has_children.then(|| Rc::new(world.clone()))
            };

            if let (Some(shared), Ok(children)) = (shared, self.inner.get::<&Children>(entity)) {
                stack.extend(children.iter().rev().map(|&c| (c, Rc::clone(&shared))));
            }
        }

        log::trace!("Propagated transforms: {}", stats.format_stats());
        stats
    }

    /// Intersect a world-space ray with every node's geometry bounds
    ///
    /// Each node's ray is brought into its local space through the cached
    /// inverse. Nodes without valid geometry or a world transform are
    /// skipped. Hits are sorted nearest first.
    pub fn raycast(&mut self, raycast: &Raycast) -> Vec<RayHit> {
        let mut hits = Vec::new();
        for (entity, node) in self.inner.query_mut::<&mut Node>() {
            let Node {
                world,
                geometry,
                raycast: slot,
                ..
            } = node;

            let (Some(world), Some(geometry)) = (world.as_mut(), geometry.as_ref()) else {
                *slot = None;
                continue;
            };
            let Some(local_bounds) = geometry.local_bounds().filter(|_| geometry.is_valid()) else {
                *slot = None;
                continue;
            };

            let local_ray = world
                .resolve_child_raycast(slot, Some(raycast))
                .and_then(|computed| computed.value().copied());
            if let Some(distance) = local_ray.and_then(|ray| local_bounds.intersect_ray(&ray)) {
                hits.push(RayHit { entity, distance });
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        log::debug!("Raycast hit {} nodes", hits.len());
        hits
    }
}

impl Default for SceneWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SceneNode, Versioned};
    use crate::geometry::Ray;
    use glam::{Quat, Vec3};

    fn chain() -> (SceneWorld, Entity, Entity, Entity) {
        let mut world = SceneWorld::new();
        let a = world.spawn_node("a", LocalTransform::from_position(Vec3::X));
        let b = world.spawn_node("b", LocalTransform::from_position(Vec3::Y));
        let c = world.spawn_node("c", LocalTransform::from_position(Vec3::Z));
        assert!(world.attach(a, b));
        assert!(world.attach(b, c));
        (world, a, b, c)
    }

    #[test]
    fn test_propagate_composes_chain() {
        let (mut world, a, b, c) = chain();
        let stats = world.propagate();

        assert_eq!(stats.visited, 3);
        assert_eq!(stats.recomputed, 3);
        assert_eq!(world.world_matrix(a).unwrap().w_axis.truncate(), Vec3::X);
        assert_eq!(world.world_matrix(b).unwrap().w_axis.truncate(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(world.world_matrix(c).unwrap().w_axis.truncate(), Vec3::ONE);
    }

    #[test]
    fn test_second_pass_skips_everything() {
        let (mut world, ..) = chain();
        world.propagate();
        let stats = world.propagate();

        assert_eq!(stats.visited, 3);
        assert_eq!(stats.recomputed, 0);
        assert_eq!(stats.skipped, 3);
    }

    #[test]
    fn test_change_propagates_to_descendants_only() {
        let (mut world, a, b, c) = chain();
        world.propagate();

        world.local_mut(b).unwrap().local.set_position(Vec3::new(0.0, 5.0, 0.0));
        let stats = world.propagate();

        assert_eq!(stats.recomputed, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(world.world_matrix(a).unwrap().w_axis.truncate(), Vec3::X);
        assert_eq!(world.world_matrix(c).unwrap().w_axis.truncate(), Vec3::new(1.0, 5.0, 1.0));
    }

    #[test]
    fn test_reparent_forces_recompute() {
        let (mut world, a, _b, c) = chain();
        world.propagate();
        let version_before = world.inner.get::<&Node>(c).unwrap().world().unwrap().version();

        assert!(world.attach(a, c));
        let stats = world.propagate();
        assert_eq!(stats.recomputed, 1);

        let node = world.inner.get::<&Node>(c).unwrap();
        assert_eq!(node.world().unwrap().version(), version_before + 1);
        assert_eq!(node.world_matrix().unwrap().w_axis.truncate(), Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_detached_node_becomes_root() {
        let (mut world, _a, b, c) = chain();
        world.propagate();
        let version_before = world.inner.get::<&Node>(c).unwrap().world().unwrap().version();

        world.detach(c);
        assert_eq!(world.parent(c), None);
        assert!(world.roots().contains(&c));
        assert!(world.inner.get::<&Children>(b).unwrap().is_empty());

        let stats = world.propagate();
        assert_eq!(stats.visited, 3);
        assert_eq!(stats.recomputed, 1);

        let node = world.inner.get::<&Node>(c).unwrap();
        assert_eq!(node.world().unwrap().version(), version_before + 1);
        assert_eq!(node.world_matrix().unwrap().w_axis.truncate(), Vec3::Z);
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let (mut world, a, _b, c) = chain();
        assert!(!world.attach(c, a));
        assert!(!world.attach(a, a));
        assert_eq!(world.parent(a), None);
    }

    #[test]
    fn test_bounds_follow_transforms() {
        let mut world = SceneWorld::new();
        let parent = world.spawn_node("parent", LocalTransform::from_position(Vec3::new(10.0, 0.0, 0.0)));
        let child = world.spawn_node("child", LocalTransform::new());
        world.attach(parent, child);
        world.set_geometry(child, Some(Geometry::cuboid(Vec3::splat(-1.0), Vec3::splat(1.0))));

        let stats = world.propagate();
        assert_eq!(stats.bounds_updated, 1);
        assert_eq!(world.world_bounds(child).unwrap().center(), Vec3::new(10.0, 0.0, 0.0));

        assert_eq!(world.propagate().bounds_updated, 0);

        world.set_geometry(child, Some(Geometry::new(Vec::new())));
        world.propagate();
        assert!(world.world_bounds(child).is_none());
    }

    #[test]
    fn test_bounds_tracking_disabled() {
        let mut world = SceneWorld::with_config(&SceneConfig::default().with_track_bounds(false));
        let node = world.spawn_node("n", LocalTransform::new());
        world.set_geometry(node, Some(Geometry::cuboid(Vec3::ZERO, Vec3::ONE)));

        assert_eq!(world.propagate().bounds_updated, 0);
        assert!(world.world_bounds(node).is_none());
    }

    #[test]
    fn test_raycast_hits_sorted() {
        let mut world = SceneWorld::new();
        let near = world.spawn_node("near", LocalTransform::from_position(Vec3::new(0.0, 0.0, -5.0)));
        let far = world.spawn_node(
            "far",
            LocalTransform::from_parts(Vec3::new(0.0, 0.0, -20.0), Quat::from_rotation_y(0.3), Vec3::splat(2.0)),
        );
        let off = world.spawn_node("off", LocalTransform::from_position(Vec3::new(50.0, 0.0, 0.0)));
        let bare = world.spawn_node("bare", LocalTransform::new());
        for e in [near, far, off] {
            world.set_geometry(e, Some(Geometry::cuboid(Vec3::splat(-1.0), Vec3::splat(1.0))));
        }
        world.propagate();

        let raycast = Raycast::new(Ray::new(Vec3::ZERO, Vec3::NEG_Z));
        let hits = world.raycast(&raycast);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entity, near);
        assert!((hits[0].distance - 4.0).abs() < 1e-4);
        assert_eq!(hits[1].entity, far);
        assert!(hits.iter().all(|h| h.entity != bare && h.entity != off));
    }

    #[test]
    fn test_raycast_along_box_face() {
        let mut world = SceneWorld::new();
        let node = world.spawn_node("box", LocalTransform::from_position(Vec3::new(0.0, 0.0, -5.0)));
        world.set_geometry(node, Some(Geometry::cuboid(Vec3::ZERO, Vec3::ONE)));
        world.propagate();

        let raycast = Raycast::new(Ray::new(Vec3::new(0.0, 0.5, 0.0), Vec3::NEG_Z));
        let hits = world.raycast(&raycast);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, node);
        assert!((hits[0].distance - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_from_scene() {
        let mut scene = Scene::new("Demo");
        let root = scene.add_node(SceneNode::named("root", Vec3::new(0.0, 1.0, 0.0)));
        scene.add_node(
            SceneNode::named("box", Vec3::X)
                .with_parent(root)
                .with_cuboid(Vec3::ZERO, Vec3::ONE),
        );

        let (mut world, entities) = SceneWorld::from_scene(&scene, &SceneConfig::default()).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(world.find("box"), Some(entities[1]));
        assert_eq!(world.parent(entities[1]), Some(entities[0]));

        world.propagate();
        let bounds = world.world_bounds(entities[1]).unwrap();
        assert_eq!(bounds.min, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_node_ref_children() {
        let (world, a, b, c) = chain();
        let root = world.node_ref(a);

        let children = root.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].entity, b);
        assert_eq!(children[0].children()[0].entity, c);
        assert!(world.node_ref(c).children().is_empty());
        assert_eq!(root.name().unwrap().0, "a");
        assert_eq!(world.roots(), vec![a]);
    }

    #[test]
    fn test_despawn_recursive() {
        let (mut world, a, b, c) = chain();
        let other = world.spawn_node("other", LocalTransform::new());
        world.despawn_recursive(b);

        assert!(world.inner.contains(a));
        assert!(!world.inner.contains(b));
        assert!(!world.inner.contains(c));
        assert!(world.inner.contains(other));
        assert!(world.inner.get::<&Children>(a).unwrap().is_empty());
    }
}
