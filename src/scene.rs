//! A flat scene: materials plus a list of mesh nodes.
//!
//! Nodes share meshes through `Rc` and refer to materials by index, so one
//! uploaded sphere serves every material in the showcase.

use std::rc::Rc;

use anyhow::*;
use wgpu::util::DeviceExt;

use crate::data_structures::{
    instance::Instance,
    material::StandardMaterial,
    model::{DrawMesh, Mesh},
};

pub struct MeshNode {
    pub mesh: Rc<Mesh>,
    pub material: usize,
    pub instance: Instance,
    instance_buffer: wgpu::Buffer,
}

impl MeshNode {
    pub fn new(device: &wgpu::Device, mesh: Rc<Mesh>, material: usize, instance: Instance) -> Self {
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Instance Buffer", mesh.name)),
            contents: bytemuck::cast_slice(&[instance.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            mesh,
            material,
            instance,
            instance_buffer,
        }
    }

    pub fn set_rotation_y(&mut self, angle: f32) {
        self.instance.set_rotation_y(angle);
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&[self.instance.to_raw()]));
    }
}

#[derive(Default)]
pub struct Scene {
    materials: Vec<StandardMaterial>,
    nodes: Vec<MeshNode>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index nodes use to refer to `material`.
    pub fn add_material(&mut self, material: StandardMaterial) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn materials(&self) -> &[StandardMaterial] {
        &self.materials
    }

    /// Place `mesh` at `position`, drawn with the material at index `material`.
    pub fn add(
        &mut self,
        device: &wgpu::Device,
        mesh: Rc<Mesh>,
        material: usize,
        position: cgmath::Vector3<f32>,
    ) -> Result<usize> {
        ensure!(
            material < self.materials.len(),
            "material index {} out of range ({} materials)",
            material,
            self.materials.len()
        );
        self.nodes.push(MeshNode::new(device, mesh, material, Instance::from(position)));
        Ok(self.nodes.len() - 1)
    }

    pub fn nodes(&self) -> &[MeshNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [MeshNode] {
        &mut self.nodes
    }

    /// Set the rotation around +Y of every node.
    pub fn spin_all(&mut self, angle: f32) {
        self.nodes.iter_mut().for_each(|node| node.set_rotation_y(angle));
    }

    pub fn write_to_buffers(&self, queue: &wgpu::Queue) {
        self.nodes.iter().for_each(|node| node.write_to_buffer(queue));
    }

    /// Record one draw per node. The caller sets the pipeline.
    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    ) {
        for node in &self.nodes {
            let material = &self.materials[node.material];
            render_pass.set_vertex_buffer(1, node.instance_buffer.slice(..));
            render_pass.draw_mesh_instanced(
                &node.mesh,
                &material.bind_group,
                0..1,
                camera_bind_group,
                light_bind_group,
            );
        }
    }
}
