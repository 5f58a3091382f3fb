// This file is part of Blob Lamp.
// Copyright (C) 2025 Adam and contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Isosurface extraction over a [`FieldAccumulator`] grid.
use bevy::prelude::*;

use crate::field::FieldAccumulator;
use crate::surface::tables::{corner_offset, edge_axis, CASES, EDGES};

const NO_VERTEX: u32 = u32::MAX;

/// Indexed triangle list rebuilt every frame. Attribute vectors are parallel.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Empty unless colours are enabled.
    pub colors: Vec<[f32; 4]>,
    /// Empty unless UVs are enabled.
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.colors.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractSettings {
    pub isolation: f32,
    pub max_triangles: usize,
    pub colors: bool,
    pub uvs: bool,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            isolation: 80.0,
            max_triangles: 10_000,
            colors: true,
            uvs: false,
        }
    }
}

/// Owns the output mesh and the per-edge vertex cache; both are reused between frames.
#[derive(Resource, Debug, Clone, Default)]
pub struct SurfaceExtractor {
    settings: ExtractSettings,
    mesh: SurfaceMesh,
    /// Vertex index per grid edge (`grid index * 3 + axis`), `NO_VERTEX` when unused.
    edge_vertices: Vec<u32>,
    truncated: bool,
}

impl SurfaceExtractor {
    pub fn new(settings: ExtractSettings) -> Self {
        Self {
            settings,
            ..default()
        }
    }

    pub fn settings(&self) -> &ExtractSettings {
        &self.settings
    }

    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    /// Whether the last extraction stopped at the triangle budget.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// March every cell (z, then y, then x) and rebuild the mesh.
    ///
    /// Degenerate inputs (fewer than two samples per axis, zero budget) give
    /// an empty mesh. Once the budget is reached the remaining cells are
    /// skipped, so the output is always a prefix of the unbounded result.
    pub fn extract(&mut self, field: &FieldAccumulator) -> &SurfaceMesh {
        self.mesh.clear();
        self.truncated = false;
        let grid = field.grid();
        let n = grid.resolution();
        if n < 2 || self.settings.max_triangles == 0 {
            return &self.mesh;
        }
        self.edge_vertices.clear();
        self.edge_vertices.resize(n * n * n * 3, NO_VERTEX);

        let iso = self.settings.isolation;
        'cells: for z in 0..n - 1 {
            for y in 0..n - 1 {
                for x in 0..n - 1 {
                    let mut mask = 0u8;
                    for corner in 0..8u8 {
                        let (dx, dy, dz) = corner_offset(corner);
                        if grid.value(x + dx, y + dy, z + dz) >= iso {
                            mask |= 1 << corner;
                        }
                    }
                    for tri in CASES.triangles(mask) {
                        if self.mesh.triangle_count() >= self.settings.max_triangles {
                            self.truncated = true;
                            break 'cells;
                        }
                        for &edge in tri {
                            let v = self.edge_vertex(field, (x, y, z), edge);
                            self.mesh.indices.push(v);
                        }
                    }
                }
            }
        }
        &self.mesh
    }

    /// Vertex on cell edge `edge`, created on first use. Always interpolated
    /// from the lower grid point so neighbouring cells produce the same vertex.
    fn edge_vertex(
        &mut self,
        field: &FieldAccumulator,
        cell: (usize, usize, usize),
        edge: u8,
    ) -> u32 {
        let grid = field.grid();
        let (a, _) = EDGES[edge as usize];
        let (ox, oy, oz) = corner_offset(a);
        let p = (cell.0 + ox, cell.1 + oy, cell.2 + oz);
        let axis = edge_axis(edge);
        let key = grid.index(p.0, p.1, p.2) * 3 + axis;
        if self.edge_vertices[key] != NO_VERTEX {
            return self.edge_vertices[key];
        }
        let q = match axis {
            0 => (p.0 + 1, p.1, p.2),
            1 => (p.0, p.1 + 1, p.2),
            _ => (p.0, p.1, p.2 + 1),
        };

        let va = grid.value(p.0, p.1, p.2);
        let vb = grid.value(q.0, q.1, q.2);
        let t = if (vb - va).abs() > f32::EPSILON {
            ((self.settings.isolation - va) / (vb - va)).clamp(0.0, 1.0)
        } else {
            0.5
        };

        let wa = field.grid_to_world(p.0, p.1, p.2);
        let wb = field.grid_to_world(q.0, q.1, q.2);
        let position = wa.lerp(wb, t);

        // Field grows toward blob centres; the outward normal is the negated gradient.
        let ga = grid.gradient(p.0, p.1, p.2);
        let gb = grid.gradient(q.0, q.1, q.2);
        let mut normal = -(ga.lerp(gb, t)).normalize_or_zero();
        if normal == Vec3::ZERO {
            normal = Vec3::Y;
        }

        let index = self.mesh.positions.len() as u32;
        self.mesh.positions.push(position.to_array());
        self.mesh.normals.push(normal.to_array());
        if self.settings.colors {
            let c = grid
                .color(p.0, p.1, p.2)
                .lerp(grid.color(q.0, q.1, q.2), t);
            self.mesh.colors.push([c.x, c.y, c.z, 1.0]);
        }
        if self.settings.uvs {
            let h = field.settings().half_extent;
            self.mesh.uvs.push([
                (position.x / h + 1.0) * 0.5,
                (position.z / h + 1.0) * 0.5,
            ]);
        }
        self.edge_vertices[key] = index;
        index
    }
}
