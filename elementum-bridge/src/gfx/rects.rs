//! Instanced rectangle pipeline for widget fills, outlines and the canvas
//! border. Rects are collected during painting and uploaded once per frame
//! into a buffer that only grows.

use elementum_core::{Bounds, Rgba};
use wgpu::{Buffer, BufferUsages, Device, Queue, RenderPass, RenderPipeline, TextureFormat};

const INITIAL_CAPACITY: usize = 256;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct RectInstance {
    /// left, top, right, bottom
    rect: [f32; 4],
    color: [f32; 4],
}

impl RectInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4];
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Screen {
    resolution: [f32; 2],
    _pad: [f32; 2],
}

fn instance_buffer(device: &Device, capacity: usize) -> Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("rect-instances"),
        size: (capacity * std::mem::size_of::<RectInstance>()) as u64,
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub struct RectPipeline {
    pipeline: RenderPipeline,
    screen: Buffer,
    screen_bind_group: wgpu::BindGroup,
    instances: Buffer,
    capacity: usize,
    pending: Vec<RectInstance>,
}

impl RectPipeline {
    pub fn new(device: &Device, format: TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("rects.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("rects.wgsl").into()),
        });

        let screen = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("rect-screen"),
            size: std::mem::size_of::<Screen>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("rect-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("rect-bg"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("rect-pl"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("rect-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<RectInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &RectInstance::ATTRIBS,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            cache: None,
            multiview_mask: None,
        });

        Self {
            pipeline,
            screen,
            screen_bind_group,
            instances: instance_buffer(device, INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            pending: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn fill(&mut self, bounds: Bounds, color: Rgba) {
        if bounds.is_empty() || color.a <= 0.0 {
            return;
        }
        self.pending.push(RectInstance {
            rect: [bounds.left, bounds.top, bounds.right, bounds.bottom],
            color: [color.r, color.g, color.b, color.a],
        });
    }

    /// Outline inside `bounds`, at least one pixel thick.
    pub fn outline(&mut self, bounds: Bounds, width: f32, color: Rgba) {
        let w = width.max(1.0);
        let Bounds { top, left, right, bottom } = bounds;
        for edge in [
            Bounds::new(top, left, right, top + w),
            Bounds::new(bottom - w, left, right, bottom),
            Bounds::new(top + w, left, left + w, bottom - w),
            Bounds::new(top + w, right - w, right, bottom - w),
        ] {
            self.fill(edge, color);
        }
    }

    /// Uploads the collected rects. Call before the render pass begins.
    pub fn prepare(&mut self, device: &Device, queue: &Queue, viewport: [u32; 2]) {
        let screen = Screen {
            resolution: [viewport[0] as f32, viewport[1] as f32],
            _pad: [0.0; 2],
        };
        queue.write_buffer(&self.screen, 0, bytemuck::bytes_of(&screen));

        if self.pending.len() > self.capacity {
            self.capacity = self.pending.len().next_power_of_two();
            self.instances = instance_buffer(device, self.capacity);
            tracing::debug!(capacity = self.capacity, "rect buffer grown");
        }
        if !self.pending.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&self.pending));
        }
    }

    pub fn render(&self, pass: &mut RenderPass<'_>) {
        if self.pending.is_empty() {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.screen_bind_group, &[]);
        pass.set_vertex_buffer(0, self.instances.slice(..));
        pass.draw(0..6, 0..self.pending.len() as u32);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
