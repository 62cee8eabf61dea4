//! CPU-side vertex data.
//!
//! [`Geometry`] is plain attribute arrays, independent of any GPU device. It is
//! built once, optionally gets its second UV channel, and is then turned into
//! [`ModelVertex`]es for upload (see [`crate::data_structures::model::Mesh`]).

use std::f32::consts::PI;

use cgmath::{InnerSpace, Vector2, Vector3, Zero};

use crate::data_structures::model::ModelVertex;

#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Primary UV channel, origin bottom-left.
    pub uvs: Vec<[f32; 2]>,
    /// Second UV channel, read by ambient occlusion maps.
    pub uv2: Option<Vec<[f32; 2]>>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// A UV sphere centred at the origin.
    ///
    /// Vertices form a `(width_segments + 1) x (height_segments + 1)` grid. The
    /// seam column is duplicated so UVs wrap cleanly, pole vertices get their u
    /// shifted by half a segment, and the degenerate triangles touching a pole
    /// are left out.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut geometry = Geometry::default();

        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(height_segments as usize + 1);
        let mut index = 0;
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };
            let mut row = Vec::with_capacity(width_segments as usize + 1);
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * 2.0 * PI;
                let theta = v * PI;
                let position = [
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                ];
                let normal = Vector3::from(position);
                let normal = if normal.is_zero() {
                    Vector3::unit_y()
                } else {
                    normal.normalize()
                };
                geometry.positions.push(position);
                geometry.normals.push(normal.into());
                geometry.uvs.push([u + u_offset, 1.0 - v]);
                row.push(index);
                index += 1;
            }
            grid.push(row);
        }

        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if iy != 0 {
                    geometry.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    geometry.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        geometry
    }

    /// Reuses the primary UV channel as the second channel.
    pub fn set_uv2_from_uv(&mut self) {
        self.uv2 = Some(self.uvs.clone());
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Per-vertex tangent and bitangent derived from the UV layout.
    ///
    /// Triangles with a degenerate UV mapping don't contribute. Tangents are made
    /// orthogonal to the vertex normal; vertices without usable triangles get an
    /// arbitrary basis perpendicular to the normal.
    pub fn tangents(&self) -> Vec<([f32; 3], [f32; 3])> {
        let mut tangents = vec![Vector3::<f32>::zero(); self.positions.len()];
        let mut bitangents = vec![Vector3::<f32>::zero(); self.positions.len()];

        for c in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (c[0] as usize, c[1] as usize, c[2] as usize);
            let pos0 = Vector3::from(self.positions[i0]);
            let pos1 = Vector3::from(self.positions[i1]);
            let pos2 = Vector3::from(self.positions[i2]);
            let uv0 = Vector2::from(self.uvs[i0]);
            let uv1 = Vector2::from(self.uvs[i1]);
            let uv2 = Vector2::from(self.uvs[i2]);

            let delta_pos1 = pos1 - pos0;
            let delta_pos2 = pos2 - pos0;
            let delta_uv1 = uv1 - uv0;
            let delta_uv2 = uv2 - uv0;

            let det = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r;
            let bitangent = (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * r;
            for i in [i0, i1, i2] {
                tangents[i] += tangent;
                bitangents[i] += bitangent;
            }
        }

        self.normals
            .iter()
            .zip(tangents)
            .zip(bitangents)
            .map(|((normal, tangent), bitangent)| {
                let normal = Vector3::from(*normal);
                let tangent = tangent - normal * normal.dot(tangent);
                let tangent = if tangent.magnitude2() > f32::EPSILON {
                    tangent.normalize()
                } else {
                    any_perpendicular(normal)
                };
                let mut bitangent_out = normal.cross(tangent);
                // keep the orientation of the UV mapping
                if bitangent_out.dot(bitangent) < 0.0 {
                    bitangent_out = -bitangent_out;
                }
                (tangent.into(), bitangent_out.into())
            })
            .collect()
    }

    /// Interleaved vertices ready for upload.
    ///
    /// wgpu samples textures with a top-left origin, so `v` is flipped here.
    pub fn vertices(&self) -> Vec<ModelVertex> {
        let flip = |uv: &[f32; 2]| [uv[0], 1.0 - uv[1]];
        self.tangents()
            .into_iter()
            .enumerate()
            .map(|(i, (tangent, bitangent))| ModelVertex {
                position: self.positions[i],
                tex_coords: flip(&self.uvs[i]),
                tex_coords2: self
                    .uv2
                    .as_ref()
                    .and_then(|uv2| uv2.get(i))
                    .map_or([0.0; 2], flip),
                normal: self.normals[i],
                tangent,
                bitangent,
            })
            .collect()
    }
}

fn any_perpendicular(normal: Vector3<f32>) -> Vector3<f32> {
    let axis = if normal.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    (axis - normal * normal.dot(axis)).normalize()
}
