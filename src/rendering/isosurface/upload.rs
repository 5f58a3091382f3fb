//! Hands the extracted [`SurfaceMesh`] to the GPU mesh asset.
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::view::NoFrustumCulling;

use crate::core::components::SurfaceVisual;
use crate::rendering::materials::materials::transmission_material;
use crate::rendering::render_texture::TransmissionBuffer;
use crate::scene::SceneDescription;
use crate::surface::{SurfaceExtractor, SurfaceMesh};

/// Whether vertex colours from the extractor reach the material.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SurfaceVertexColors(pub bool);

/// Copy `surface` into `mesh`, replacing every attribute and the index buffer.
pub fn write_surface_mesh(mesh: &mut Mesh, surface: &SurfaceMesh, vertex_colors: bool) {
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, surface.positions.clone());
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, surface.normals.clone());
    if vertex_colors && surface.colors.len() == surface.positions.len() {
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, surface.colors.clone());
    } else {
        mesh.remove_attribute(Mesh::ATTRIBUTE_COLOR);
    }
    if surface.uvs.len() == surface.positions.len() && !surface.uvs.is_empty() {
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, surface.uvs.clone());
    } else {
        mesh.remove_attribute(Mesh::ATTRIBUTE_UV_0);
    }
    mesh.insert_indices(Indices::U32(surface.indices.clone()));
}

pub fn new_surface_mesh(surface: &SurfaceMesh, vertex_colors: bool) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    write_surface_mesh(&mut mesh, surface, vertex_colors);
    mesh
}

/// Spawn the (initially hidden) surface entity. The mesh asset is created on
/// the first non-empty extraction.
pub fn spawn_surface_visual(
    mut commands: Commands,
    description: Res<SceneDescription>,
    buffer: Option<Res<TransmissionBuffer>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(cfg) = description.surface_material() else {
        return;
    };
    let mask = buffer.map(|b| b.image.clone());
    let material = materials.add(transmission_material(cfg, mask));
    commands.insert_resource(SurfaceVertexColors(cfg.vertex_colors));
    commands.spawn((
        Name::new("Isosurface"),
        SurfaceVisual,
        MeshMaterial3d(material),
        Transform::default(),
        Visibility::Hidden,
        NoFrustumCulling,
    ));
}

pub fn upload_surface_mesh(
    mut commands: Commands,
    extractor: Option<Res<SurfaceExtractor>>,
    colors: Option<Res<SurfaceVertexColors>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut q_visual: Query<(Entity, &mut Visibility, Option<&Mesh3d>), With<SurfaceVisual>>,
) {
    let Some(extractor) = extractor else { return };
    let vertex_colors = colors.is_none_or(|c| c.0);
    let surface = extractor.mesh();
    for (entity, mut visibility, mesh3d) in &mut q_visual {
        if surface.is_empty() {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        }
        match mesh3d.and_then(|m| meshes.get_mut(&m.0)) {
            Some(mesh) => write_surface_mesh(mesh, surface, vertex_colors),
            None => {
                let handle = meshes.add(new_surface_mesh(surface, vertex_colors));
                commands.entity(entity).insert(Mesh3d(handle));
            }
        }
        visibility.set_if_neq(Visibility::Inherited);
    }
}
