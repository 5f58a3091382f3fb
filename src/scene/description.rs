//! Declarative scene tree. The tree is built from [`SceneConfig`] once and
//! then consumed in dependency order: the physics world exists before any
//! body is added to it, and the isosurface settings exist before blobs are
//! registered with the field.
use anyhow::{bail, Result};
use bevy::prelude::*;
use rand::Rng;

use crate::core::components::Blob;
use crate::core::config::{CameraConfig, SceneConfig, SpawnRange, TransmissionConfig};
use crate::field::FieldSettings;
use crate::physics::{
    wall_specs, BodyHandle, BodySpec, ColliderShape, PhysicsSettings, PhysicsWorld,
};
use crate::surface::ExtractSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct MetaballNode {
    pub position: Vec3,
    pub strength: f32,
    pub subtract: f32,
    /// Linear RGB.
    pub color: Vec3,
    pub float: bool,
    pub collider_radius: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentNode {
    pub path: String,
    pub intensity: f32,
    pub face_size: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Background(Color),
    AmbientLight { intensity: f32 },
    Environment(EnvironmentNode),
    Camera(CameraConfig),
    Physics {
        settings: PhysicsSettings,
        drift_strength: f32,
        children: Vec<SceneNode>,
    },
    Walls,
    IsoSurface {
        field: FieldSettings,
        extract: ExtractSettings,
        material: TransmissionConfig,
        children: Vec<SceneNode>,
    },
    Metaball(MetaballNode),
    Pointer { radius: f32 },
}

impl SceneNode {
    fn children(&self) -> &[SceneNode] {
        match self {
            SceneNode::Physics { children, .. } | SceneNode::IsoSurface { children, .. } => {
                children
            }
            _ => &[],
        }
    }
}

/// Everything the physics side of the scene produced.
pub struct PhysicsScene {
    pub world: PhysicsWorld,
    pub drift_strength: f32,
    pub field: FieldSettings,
    pub extract: ExtractSettings,
    pub blobs: Vec<(Blob, BodyHandle)>,
    pub pointer: Option<BodyHandle>,
    pub walls: Vec<BodyHandle>,
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SceneDescription {
    pub roots: Vec<SceneNode>,
}

impl SceneDescription {
    pub fn from_config(cfg: &SceneConfig, rng: &mut impl Rng) -> Self {
        let b = &cfg.blobs;
        let color = srgb_to_linear(b.color);
        let mut surface_children: Vec<SceneNode> = (0..b.count)
            .map(|_| {
                SceneNode::Metaball(MetaballNode {
                    position: Vec3::new(sample(rng, &b.x_range), sample(rng, &b.y_range), b.z),
                    strength: b.strength,
                    subtract: b.subtract,
                    color,
                    float: b.float,
                    collider_radius: b.collider_radius,
                    restitution: b.restitution,
                    linear_damping: b.linear_damping,
                    angular_damping: b.angular_damping,
                })
            })
            .collect();
        if cfg.pointer.enabled {
            surface_children.push(SceneNode::Pointer {
                radius: cfg.pointer.collider_radius,
            });
        }

        let s = &cfg.surface;
        let iso_surface = SceneNode::IsoSurface {
            field: FieldSettings {
                resolution: s.resolution,
                half_extent: s.half_extent,
                bias: s.bias,
                clamp_max: s.clamp_max,
                colors: s.enable_colors,
            },
            extract: ExtractSettings {
                isolation: s.isolation,
                max_triangles: s.max_triangles,
                colors: s.enable_colors,
                // The transmission mask is only sampled on meshes with UV_0.
                uvs: s.enable_uvs || cfg.material.buffer.is_active(),
            },
            material: cfg.material.clone(),
            children: surface_children,
        };

        let mut physics_children = vec![iso_surface];
        if cfg.physics.walls {
            physics_children.push(SceneNode::Walls);
        }

        let mut roots = vec![
            SceneNode::Background(Color::srgb(
                cfg.background[0],
                cfg.background[1],
                cfg.background[2],
            )),
            SceneNode::AmbientLight {
                intensity: cfg.lighting.ambient_intensity,
            },
            SceneNode::Camera(cfg.camera.clone()),
            SceneNode::Physics {
                settings: PhysicsSettings::from(&cfg.physics),
                drift_strength: b.drift_strength,
                children: physics_children,
            },
        ];
        let env = &cfg.lighting.environment;
        if let Some(path) = env.path.as_ref().filter(|_| env.face_size > 0) {
            roots.push(SceneNode::Environment(EnvironmentNode {
                path: path.clone(),
                intensity: env.intensity,
                face_size: env.face_size,
            }));
        }
        Self { roots }
    }

    /// Depth-first pre-order walk over every node.
    pub fn walk(&self) -> impl Iterator<Item = &SceneNode> {
        let mut stack: Vec<&SceneNode> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev());
            Some(node)
        })
    }

    pub fn background(&self) -> Option<Color> {
        self.walk().find_map(|n| match n {
            SceneNode::Background(c) => Some(*c),
            _ => None,
        })
    }

    pub fn ambient_intensity(&self) -> Option<f32> {
        self.walk().find_map(|n| match n {
            SceneNode::AmbientLight { intensity } => Some(*intensity),
            _ => None,
        })
    }

    pub fn camera(&self) -> Option<&CameraConfig> {
        self.walk().find_map(|n| match n {
            SceneNode::Camera(c) => Some(c),
            _ => None,
        })
    }

    pub fn environment(&self) -> Option<&EnvironmentNode> {
        self.walk().find_map(|n| match n {
            SceneNode::Environment(e) => Some(e),
            _ => None,
        })
    }

    pub fn surface_material(&self) -> Option<&TransmissionConfig> {
        self.walk().find_map(|n| match n {
            SceneNode::IsoSurface { material, .. } => Some(material),
            _ => None,
        })
    }

    /// Build the physics world and register every body. Blobs and the
    /// pointer must sit under an `IsoSurface`, which must sit under `Physics`.
    pub fn instantiate_physics(&self) -> Result<PhysicsScene> {
        let mut scene: Option<PhysicsScene> = None;
        for node in &self.roots {
            match node {
                SceneNode::Physics {
                    settings,
                    drift_strength,
                    children,
                } => {
                    if scene.is_some() {
                        bail!("scene contains more than one Physics node");
                    }
                    let mut built = PhysicsScene {
                        world: PhysicsWorld::new(*settings),
                        drift_strength: *drift_strength,
                        field: FieldSettings::default(),
                        extract: ExtractSettings::default(),
                        blobs: Vec::new(),
                        pointer: None,
                        walls: Vec::new(),
                    };
                    let mut surfaces = 0;
                    for child in children {
                        match child {
                            SceneNode::Walls => {
                                for spec in wall_specs() {
                                    built.walls.push(built.world.add_body(&spec));
                                }
                            }
                            SceneNode::IsoSurface {
                                field,
                                extract,
                                children,
                                ..
                            } => {
                                surfaces += 1;
                                built.field = *field;
                                built.extract = *extract;
                                for member in children {
                                    add_surface_member(&mut built, member)?;
                                }
                            }
                            other => bail!("{} cannot be a child of Physics", node_name(other)),
                        }
                    }
                    if surfaces > 1 {
                        bail!("scene contains {surfaces} IsoSurface nodes; only one is supported");
                    }
                    scene = Some(built);
                }
                SceneNode::Metaball(_)
                | SceneNode::Pointer { .. }
                | SceneNode::Walls
                | SceneNode::IsoSurface { .. } => {
                    bail!("{} must be nested under Physics", node_name(node));
                }
                _ => {}
            }
        }
        match scene {
            Some(scene) => Ok(scene),
            None => bail!("scene has no Physics node"),
        }
    }
}

fn add_surface_member(scene: &mut PhysicsScene, node: &SceneNode) -> Result<()> {
    match node {
        SceneNode::Metaball(m) => {
            let spec = BodySpec::dynamic(ColliderShape::Sphere {
                radius: m.collider_radius,
            })
            .with_translation(m.position)
            .with_restitution(m.restitution)
            .with_damping(m.linear_damping, m.angular_damping);
            let handle = scene.world.add_body(&spec);
            scene.blobs.push((
                Blob {
                    strength: m.strength,
                    subtract: m.subtract,
                    color: m.color,
                    float: m.float,
                },
                handle,
            ));
        }
        SceneNode::Pointer { radius } => {
            if scene.pointer.is_some() {
                bail!("scene contains more than one Pointer node");
            }
            let spec = BodySpec::kinematic(ColliderShape::Sphere { radius: *radius });
            scene.pointer = Some(scene.world.add_body(&spec));
        }
        other => bail!("{} cannot be a child of IsoSurface", node_name(other)),
    }
    Ok(())
}

fn node_name(node: &SceneNode) -> &'static str {
    match node {
        SceneNode::Background(_) => "Background",
        SceneNode::AmbientLight { .. } => "AmbientLight",
        SceneNode::Environment(_) => "Environment",
        SceneNode::Camera(_) => "Camera",
        SceneNode::Physics { .. } => "Physics",
        SceneNode::Walls => "Walls",
        SceneNode::IsoSurface { .. } => "IsoSurface",
        SceneNode::Metaball(_) => "Metaball",
        SceneNode::Pointer { .. } => "Pointer",
    }
}

fn sample(rng: &mut impl Rng, range: &SpawnRange<f32>) -> f32 {
    if range.max > range.min {
        rng.gen_range(range.min..range.max)
    } else {
        range.min
    }
}

fn srgb_to_linear(c: [f32; 3]) -> Vec3 {
    let l = Color::srgb(c[0], c[1], c[2]).to_linear();
    Vec3::new(l.red, l.green, l.blue)
}
