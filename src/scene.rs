use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Rigid-body kind of a scene object. `None` means the object has no
/// physics body at all (trigger volumes, decor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    #[default]
    None,
    Static,
    Kinematic,
    Dynamic,
}

impl BodyKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "none" => Self::None,
            "static" => Self::Static,
            "kinematic" => Self::Kinematic,
            "dynamic" => Self::Dynamic,
            _ => return None,
        };
        Some(kind)
    }
}

/// Startup description of the playable room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Parses the scene XML produced by the authoring tools.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut objects = Vec::new();

        for node in document.descendants().filter(|n| n.has_tag_name("object")) {
            let mut object = SceneObject::default();
            object.name = required_text(&node, "name")?;
            object.object_type = optional_text(&node, "type").unwrap_or_else(|| "prop".to_string());
            object.position = parse_vec3(optional_text(&node, "position"), object.position)?;
            object.rotation = parse_vec3(optional_text(&node, "rotation"), object.rotation)?;
            object.scale = parse_vec3(optional_text(&node, "scale"), object.scale)?;
            object.half_extents =
                parse_vec3(optional_text(&node, "halfExtents"), object.half_extents)?;
            object.body = parse_body(optional_text(&node, "body"), &object.name)?;
            object.mass = parse_f32(optional_text(&node, "mass"), object.mass)?;
            object.fov = parse_f32(optional_text(&node, "fov"), object.fov)?;
            object.material = optional_text(&node, "material");
            object.disposable = parse_bool(optional_text(&node, "disposable"), false)?;
            objects.push(object);
        }

        Ok(Self { objects })
    }

    /// The camera object, when the scene declares one.
    pub fn camera(&self) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.object_type == "camera")
    }
}

/// Scene object as described by the authoring tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub half_extents: Vec3,
    #[serde(default)]
    pub body: BodyKind,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default)]
    pub disposable: bool,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            object_type: String::new(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            half_extents: Vec3::ZERO,
            body: BodyKind::None,
            mass: default_mass(),
            fov: default_fov(),
            material: None,
            disposable: false,
        }
    }
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_mass() -> f32 {
    1.0
}

fn default_fov() -> f32 {
    60.0
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut numbers = value
        .split_whitespace()
        .filter_map(|component| component.parse::<f32>().ok());
    let x = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let y = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    let z = numbers
        .next()
        .ok_or_else(|| anyhow!("vector is missing components"))?;
    Ok(Vec3::new(x, y, z))
}

fn parse_body(value: Option<String>, object: &str) -> Result<BodyKind> {
    match value {
        Some(value) => BodyKind::from_name(&value)
            .ok_or_else(|| anyhow!("object {object} has unknown body kind `{value}`")),
        None => Ok(BodyKind::None),
    }
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(anyhow!("failed to parse bool: `{other}`")),
        None => Ok(default),
    }
}
