//! Per-node transforms as they are handed to the vertex shader.

use cgmath::{One, Rotation3, SquareMatrix};

use crate::data_structures::model;

/// Position, rotation (as quaternion) and scale of one drawn mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transform.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Replaces the rotation by one of `angle` radians around +Y.
    pub fn set_rotation_y(&mut self, angle: f32) {
        self.rotation = cgmath::Quaternion::from_angle_y(cgmath::Rad(angle));
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        let world_matrix = self.to_matrix();
        InstanceRaw {
            model: world_matrix.into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
            handedness: world_matrix.determinant().signum(),
        }
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    handedness: f32,
}

/**
 * Stride layout: the 4x4 model matrix takes four vec4 slots, the 3x3 normal
 * matrix three vec3 slots, followed by the handedness scalar.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
            8 => Float32x4,
            9 => Float32x3,
            10 => Float32x3,
            11 => Float32x3,
            12 => Float32,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // advance once per instance, not per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Vector3, Vector4};

    use super::*;

    #[test]
    fn rotation_y_turns_x_into_minus_z() {
        let mut instance = Instance::from(Vector3::new(2.0, -2.0, 0.0));
        instance.set_rotation_y(std::f32::consts::FRAC_PI_2);
        let p = instance.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 2.0).abs() < 1e-5);
        assert!((p.y + 2.0).abs() < 1e-5);
        assert!((p.z + 1.0).abs() < 1e-5);
    }

    #[test]
    fn raw_layout_matches_descriptor() {
        use model::Vertex;
        assert_eq!(InstanceRaw::desc().array_stride, 26 * 4);
        assert_eq!(Instance::new().to_raw().handedness, 1.0);
    }
}
