use wgpu::util::DeviceExt;

pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl std::fmt::Debug for LightResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightResources").field("uniform", &self.uniform).finish()
    }
}

/// One ambient term and one directional light.
///
/// The directional light shines from `directional_position` toward the origin,
/// colours are pre-multiplied by their intensity.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub ambient_color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    pub directional_position: [f32; 3],
    _padding2: u32,
    pub directional_color: [f32; 3],
    _padding3: u32,
}

impl LightUniform {
    pub fn new(
        ambient: [f32; 3],
        ambient_intensity: f32,
        directional: [f32; 3],
        directional_intensity: f32,
        directional_position: [f32; 3],
    ) -> Self {
        let scale = |c: [f32; 3], i: f32| [c[0] * i, c[1] * i, c[2] * i];
        Self {
            ambient_color: scale(ambient, ambient_intensity),
            _padding: 0,
            directional_position,
            _padding2: 0,
            directional_color: scale(directional, directional_intensity),
            _padding3: 0,
        }
    }
}

impl Default for LightUniform {
    /// White ambient light at full intensity plus a white directional light from (1, 1, 2).
    fn default() -> Self {
        Self::new([1.0; 3], 1.0, [1.0; 3], 1.0, [1.0, 1.0, 2.0])
    }
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lights() {
        let light = LightUniform::default();
        assert_eq!(light.ambient_color, [1.0; 3]);
        assert_eq!(light.directional_position, [1.0, 1.0, 2.0]);
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
    }

    #[test]
    fn intensity_scales_colour() {
        let light = LightUniform::new([1.0, 0.5, 0.0], 0.5, [1.0; 3], 2.0, [0.0, 1.0, 0.0]);
        assert_eq!(light.ambient_color, [0.5, 0.25, 0.0]);
        assert_eq!(light.directional_color, [2.0; 3]);
    }
}
