//! Scene description files
//!
//! Supports saving and loading node hierarchies in RON (Rusty Object Notation)
//! and JSON format. A description is instantiated into a live
//! [`SceneWorld`](crate::ecs::SceneWorld) with `SceneWorld::from_scene`.

use std::fs;
use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Geometry attached to a serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryDesc {
    /// Axis-aligned box between two corners
    Cuboid { min: Vec3, max: Vec3 },
    /// Explicit vertex list
    Vertices(Vec<Vec3>),
}

/// A serializable node with its local transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneNode {
    /// Optional node name
    pub name: Option<String>,
    /// Local position
    pub position: Vec3,
    /// Local rotation
    pub rotation: Quat,
    /// Local scale
    pub scale: Vec3,
    /// Index of the parent node; parents must precede their children
    pub parent: Option<usize>,
    /// Geometry used for bounds and raycasts
    pub geometry: Option<GeometryDesc>,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            name: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            parent: None,
            geometry: None,
        }
    }
}

impl SceneNode {
    /// Create a named node at a position
    #[must_use]
    pub fn named(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: Some(name.into()),
            position,
            ..Default::default()
        }
    }

    /// Set the parent index
    #[must_use]
    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Attach box geometry
    #[must_use]
    pub fn with_cuboid(mut self, min: Vec3, max: Vec3) -> Self {
        self.geometry = Some(GeometryDesc::Cuboid { min, max });
        self
    }
}

/// A serializable node hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name
    pub name: String,
    /// Scene version for compatibility
    pub version: u32,
    /// All nodes, parents before children
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// Create a new empty scene
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            nodes: Vec::new(),
        }
    }

    /// Add a node and return its index
    pub fn add_node(&mut self, node: SceneNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    /// Check that every parent index refers to an earlier node
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownParent`] for the first node whose parent
    /// is missing or not declared before it
    pub fn validate(&self) -> Result<(), SceneError> {
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent >= index {
                    return Err(SceneError::UnknownParent { node: index, parent });
                }
            }
        }
        Ok(())
    }

    /// Save the scene to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::Serialize(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| SceneError::Io(e.to_string()))?;
        Ok(())
    }

    /// Parse and validate a scene from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization or validation fails
    pub fn from_ron_str(source: &str) -> Result<Self, SceneError> {
        let scene: Scene =
            ron::from_str(source).map_err(|e| SceneError::Deserialize(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load a scene from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the scene to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let json_string =
            serde_json::to_string_pretty(self).map_err(|e| SceneError::Serialize(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| SceneError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::Io(e.to_string()))?;
        let scene: Scene = serde_json::from_str(&content)
            .map_err(|e| SceneError::Deserialize(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Get the number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the scene is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Errors that can occur during scene operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
    /// A node names a parent that does not precede it
    UnknownParent { node: usize, parent: usize },
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
            Self::UnknownParent { node, parent } => {
                write!(f, "Node {node} refers to parent {parent}, which does not precede it")
            }
        }
    }
}

impl std::error::Error for SceneError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Scene {
        let mut scene = Scene::new("Test Scene");
        let root = scene.add_node(SceneNode::named("Root", Vec3::new(1.0, 2.0, 3.0)));
        scene.add_node(
            SceneNode::named("Crate", Vec3::X)
                .with_parent(root)
                .with_cuboid(Vec3::splat(-0.5), Vec3::splat(0.5)),
        );
        scene
    }

    #[test]
    fn test_scene_serialization_ron() {
        let scene = sample();

        let ron_str =
            ron::ser::to_string_pretty(&scene, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("Crate"));

        let loaded = Scene::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded.name, "Test Scene");
        assert_eq!(loaded.nodes, scene.nodes);
    }

    #[test]
    fn test_scene_serialization_json() {
        let scene = sample();
        let json_str = serde_json::to_string(&scene).unwrap();

        let loaded: Scene = serde_json::from_str(&json_str).unwrap();
        assert_eq!(loaded.node_count(), 2);
        assert_eq!(loaded.nodes[1].parent, Some(0));
        assert!(loaded.nodes[1].geometry.is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let scene = Scene::from_ron_str(
            r#"(name: "Sparse", version: 1, nodes: [(name: Some("a")), (parent: Some(0))])"#,
        )
        .unwrap();
        assert_eq!(scene.nodes[0].scale, Vec3::ONE);
        assert_eq!(scene.nodes[1].rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_forward_parent_rejected() {
        let mut scene = Scene::new("Broken");
        scene.add_node(SceneNode::default().with_parent(1));
        scene.add_node(SceneNode::default());

        assert_eq!(
            scene.validate(),
            Err(SceneError::UnknownParent { node: 0, parent: 1 })
        );
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("scene_transform_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_save_load_files() {
        let scene = sample();

        let ron_path = temp_path("roundtrip.ron");
        scene.save_ron(&ron_path).unwrap();
        let from_ron = Scene::load_ron(&ron_path);
        let _ = fs::remove_file(&ron_path);
        assert_eq!(from_ron.unwrap().nodes, scene.nodes);

        let json_path = temp_path("roundtrip.json");
        scene.save_json(&json_path).unwrap();
        let from_json = Scene::load_json(&json_path);
        let _ = fs::remove_file(&json_path);
        let from_json = from_json.unwrap();
        assert_eq!(from_json.name, "Test Scene");
        assert_eq!(from_json.nodes, scene.nodes);
    }

    #[test]
    fn test_load_json_rejects_forward_parent() {
        let mut scene = Scene::new("Broken");
        scene.add_node(SceneNode::default().with_parent(1));
        scene.add_node(SceneNode::default());

        let path = temp_path("forward_parent.json");
        scene.save_json(&path).unwrap();
        let result = Scene::load_json(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(
            result.unwrap_err(),
            SceneError::UnknownParent { node: 0, parent: 1 }
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Scene::load_ron("/nonexistent/scene.ron").unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
