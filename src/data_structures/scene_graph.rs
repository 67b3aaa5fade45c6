//! Scene graph and hierarchical scene organization.
//!
//! A scene is a tree of named [`SceneNode`]s. Each node owns its children and
//! optionally one typed payload: a geometry, a light or a camera. Nodes without
//! a payload only group their children. Geometry payloads are where textures
//! enter the scene; the tree itself never loads anything, but it can collect
//! the textures below a node and request them up front.

use cgmath::{Deg, Matrix4, Vector3};

use crate::data_structures::texture::TextureAsset;

/// Renderable geometry and the textures its material samples.
#[derive(Clone, Debug)]
pub struct Geometry {
    pub mesh: String,
    pub textures: Vec<TextureAsset>,
}

impl Geometry {
    pub fn new(mesh: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            textures: Vec::new(),
        }
    }

    pub fn with_texture(mut self, texture: TextureAsset) -> Self {
        self.textures.push(texture);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Directional,
    Spot,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vector3<f32>,
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            color: Vector3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
        }
    }
}

/// Perspective camera parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub fovy: Deg<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fovy: Deg(45.0),
            aspect: 16.0 / 9.0,
            znear: 0.1,
            zfar: 100.0,
        }
    }
}

impl Camera {
    pub fn projection(&self) -> Matrix4<f32> {
        cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// What a node carries besides its children.
#[derive(Clone, Debug)]
pub enum ScenePayload {
    Geometry(Geometry),
    Light(Light),
    Camera(Camera),
}

impl From<Geometry> for ScenePayload {
    fn from(geometry: Geometry) -> Self {
        Self::Geometry(geometry)
    }
}

impl From<Light> for ScenePayload {
    fn from(light: Light) -> Self {
        Self::Light(light)
    }
}

impl From<Camera> for ScenePayload {
    fn from(camera: Camera) -> Self {
        Self::Camera(camera)
    }
}

/// A named node owning an ordered list of children.
#[derive(Debug, Default)]
pub struct SceneNode {
    name: String,
    children: Vec<SceneNode>,
    payload: Option<ScenePayload>,
}

impl SceneNode {
    /// An empty grouping node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            payload: None,
        }
    }

    pub fn with_payload(name: impl Into<String>, payload: impl Into<ScenePayload>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            payload: Some(payload.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_payload(&self) -> Option<&ScenePayload> {
        self.payload.as_ref()
    }

    pub fn get_payload_mut(&mut self) -> Option<&mut ScenePayload> {
        self.payload.as_mut()
    }

    /// Replace the payload, returning the previous one.
    pub fn set_payload(&mut self, payload: Option<ScenePayload>) -> Option<ScenePayload> {
        std::mem::replace(&mut self.payload, payload)
    }

    /// Append `child` after the existing children and return it for further building.
    pub fn add_child(&mut self, child: SceneNode) -> &mut SceneNode {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn get_children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn get_children_mut(&mut self) -> &mut Vec<SceneNode> {
        &mut self.children
    }

    pub fn remove_child(&mut self, idx: usize) -> Option<SceneNode> {
        (idx < self.children.len()).then(|| self.children.remove(idx))
    }

    /// Depth-first, pre-order traversal starting with `self`.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Number of nodes in this subtree, `self` included.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// The first node in pre-order named `name`.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        self.iter().find(|node| node.name == name)
    }

    /// Every distinct texture referenced by a geometry in this subtree, in traversal order.
    pub fn textures(&self) -> Vec<TextureAsset> {
        let mut textures: Vec<TextureAsset> = Vec::new();
        for node in self.iter() {
            let Some(ScenePayload::Geometry(geometry)) = &node.payload else {
                continue;
            };
            for texture in &geometry.textures {
                if !textures.iter().any(|seen| seen.ptr_eq(texture)) {
                    textures.push(texture.clone());
                }
            }
        }
        textures
    }

    /// Start loading every texture in this subtree. Returns how many loads were launched.
    pub fn request_textures(&self) -> usize {
        self.textures()
            .iter()
            .filter(|texture| texture.request_load())
            .count()
    }
}

// Children are released with an explicit stack so that arbitrarily deep
// trees cannot overflow the call stack.
impl Drop for SceneNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a SceneNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a SceneNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a SceneNode {
    type Item = &'a SceneNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
