//! GPU Resource Manager
//!
//! Mirrors registry resources on the GPU and owns the per-frame buffers
//! shared by several passes.
//!
//! | Cache        | Key                          | Invalidated by                    |
//! |--------------|------------------------------|-----------------------------------|
//! | meshes       | `MeshHandle`                 | revision change or removal        |
//! | textures     | `(path, ColorSpace)`         | no live material binds the path   |
//! | materials    | `MaterialHandle`             | change of the bound texture paths |
//!
//! The light, shadow-matrix and object buffers grow by doubling. Each
//! reallocation bumps [`ResourceManager::buffer_generation`] so that passes
//! holding bind groups over them know to rebuild.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::assets::load_texture_or_placeholder;
use crate::registry::{MaterialHandle, MeshHandle, ResourceRegistry};
use crate::renderer::core::gpu::{GpuMesh, GpuTexture, GrowableBuffer};
use crate::renderer::core::uniforms::{
    CameraUniforms, GpuLight, MaterialUniforms, ObjectUniforms, ShadowViewUniforms,
    aligned_stride,
};
use crate::resources::{ColorSpace, Material, TextureData, TextureKind};

/// GPU state of one material.
struct GpuMaterial {
    /// First texture path of each kind, in [`TextureKind::ALL`] order.
    bound_paths: [Option<PathBuf>; 4],
    uniforms: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct ResourceManager {
    // === Camera ===
    camera_layout: wgpu::BindGroupLayout,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    // === Per-draw objects ===
    object_layout: wgpu::BindGroupLayout,
    object_buffer: GrowableBuffer,
    object_bind_group: wgpu::BindGroup,
    object_stride: u64,

    // === Lights & shadows ===
    light_buffer: GrowableBuffer,
    shadow_matrix_buffer: GrowableBuffer,
    shadow_view_buffer: GrowableBuffer,
    shadow_view_layout: wgpu::BindGroupLayout,
    shadow_view_bind_group: wgpu::BindGroup,
    light_count: u32,
    buffer_generation: u64,

    // === Registry mirrors ===
    meshes: FxHashMap<MeshHandle, GpuMesh>,
    textures: FxHashMap<(PathBuf, ColorSpace), GpuTexture>,
    placeholders: FxHashMap<TextureKind, GpuTexture>,
    material_layout: wgpu::BindGroupLayout,
    material_sampler: wgpu::Sampler,
    materials: FxHashMap<MaterialHandle, GpuMaterial>,
}

impl ResourceManager {
    #[must_use]
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        // ====================================================================
        // Camera
        // ====================================================================
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Layout"),
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
        });
        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera BindGroup"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // ====================================================================
        // Objects (dynamic offset)
        // ====================================================================
        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let object_stride = aligned_stride(std::mem::size_of::<ObjectUniforms>() as u64, alignment);
        let object_layout = dynamic_uniform_layout::<ObjectUniforms>(device, "Object Layout");
        let object_buffer = GrowableBuffer::new(
            device,
            "Object Uniforms",
            wgpu::BufferUsages::UNIFORM,
            object_stride * 64,
        );
        let object_bind_group = dynamic_uniform_bind_group::<ObjectUniforms>(
            device,
            "Object BindGroup",
            &object_layout,
            object_buffer.buffer(),
        );

        // ====================================================================
        // Lights & shadow views
        // ====================================================================
        let light_buffer = GrowableBuffer::new(
            device,
            "Light Storage",
            wgpu::BufferUsages::STORAGE,
            std::mem::size_of::<GpuLight>() as u64 * 16,
        );
        let shadow_matrix_buffer = GrowableBuffer::new(
            device,
            "Shadow Matrices",
            wgpu::BufferUsages::STORAGE,
            64 * 16,
        );
        let shadow_view_stride =
            aligned_stride(std::mem::size_of::<ShadowViewUniforms>() as u64, alignment);
        let shadow_view_layout =
            dynamic_uniform_layout::<ShadowViewUniforms>(device, "Shadow View Layout");
        let shadow_view_buffer = GrowableBuffer::new(
            device,
            "Shadow View Uniforms",
            wgpu::BufferUsages::UNIFORM,
            shadow_view_stride * 16,
        );
        let shadow_view_bind_group = dynamic_uniform_bind_group::<ShadowViewUniforms>(
            device,
            "Shadow View BindGroup",
            &shadow_view_layout,
            shadow_view_buffer.buffer(),
        );

        // ====================================================================
        // Materials
        // ====================================================================
        let material_layout = create_material_layout(device);
        let material_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let placeholders = TextureKind::ALL
            .iter()
            .map(|&kind| (kind, GpuTexture::upload(device, queue, &TextureData::placeholder(kind))))
            .collect();

        Self {
            camera_layout,
            camera_buffer,
            camera_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_stride,
            light_buffer,
            shadow_matrix_buffer,
            shadow_view_buffer,
            shadow_view_layout,
            shadow_view_bind_group,
            light_count: 0,
            buffer_generation: 0,
            meshes: FxHashMap::default(),
            textures: FxHashMap::default(),
            placeholders,
            material_layout,
            material_sampler,
            materials: FxHashMap::default(),
        }
    }

    // ========================================================================
    // Per-frame uploads
    // ========================================================================

    pub fn write_camera(&self, queue: &wgpu::Queue, uniforms: &CameraUniforms) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Uploads per-draw data, one `object_stride`-aligned slot per entry.
    pub fn write_objects(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, objects: &[ObjectUniforms]) {
        let bytes = pack_strided(objects, self.object_stride);
        if self.object_buffer.write(device, queue, &bytes) {
            self.object_bind_group = dynamic_uniform_bind_group::<ObjectUniforms>(
                device,
                "Object BindGroup",
                &self.object_layout,
                self.object_buffer.buffer(),
            );
            self.buffer_generation += 1;
        }
    }

    /// Uploads the light table and the shadow matrices read by the lighting
    /// pass, plus one dynamic slot per shadow view for the shadow pass.
    pub fn write_lights(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        lights: &[GpuLight],
        shadow_matrices: &[glam::Mat4],
        shadow_views: &[ShadowViewUniforms],
    ) {
        self.light_count = lights.len() as u32;

        // Storage bindings may not be empty; keep at least one element.
        let light_bytes: Vec<u8> = if lights.is_empty() {
            bytemuck::bytes_of(&GpuLight::zeroed_light()).to_vec()
        } else {
            bytemuck::cast_slice(lights).to_vec()
        };
        let mut grew = self.light_buffer.write(device, queue, &light_bytes);
        grew |= self
            .shadow_matrix_buffer
            .write(device, queue, bytemuck::cast_slice(shadow_matrices));

        let stride = aligned_stride(
            std::mem::size_of::<ShadowViewUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment,
        );
        if self
            .shadow_view_buffer
            .write(device, queue, &pack_strided(shadow_views, stride))
        {
            self.shadow_view_bind_group = dynamic_uniform_bind_group::<ShadowViewUniforms>(
                device,
                "Shadow View BindGroup",
                &self.shadow_view_layout,
                self.shadow_view_buffer.buffer(),
            );
            grew = true;
        }
        if grew {
            self.buffer_generation += 1;
        }
    }

    // ========================================================================
    // Registry sync
    // ========================================================================

    /// Uploads new meshes, re-uploads meshes whose revision changed and
    /// drops buffers of removed meshes.
    pub fn sync_meshes(&mut self, device: &wgpu::Device, registry: &ResourceRegistry) {
        self.meshes
            .retain(|handle, gpu| registry.try_mesh(*handle).is_some_and(|m| m.revision() == gpu.revision));

        for (handle, mesh) in registry.meshes() {
            if !self.meshes.contains_key(&handle) {
                log::debug!("Uploading {handle} ({} indices)", mesh.index_count());
                self.meshes
                    .insert(handle, GpuMesh::upload(device, mesh, &mesh.name));
            }
        }
    }

    /// Refreshes material uniforms and rebuilds bind groups whose texture
    /// set changed.
    pub fn sync_materials(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, registry: &ResourceRegistry) {
        self.materials
            .retain(|handle, _| registry.try_material(*handle).is_some());

        for (handle, material) in registry.materials() {
            let bound_paths = bound_paths(material);
            let stale = self
                .materials
                .get(&handle)
                .is_none_or(|gpu| gpu.bound_paths != bound_paths);

            if stale {
                let gpu = self.create_material(device, queue, &material.name, bound_paths);
                self.materials.insert(handle, gpu);
            }

            if let Some(gpu) = self.materials.get(&handle) {
                queue.write_buffer(
                    &gpu.uniforms,
                    0,
                    bytemuck::bytes_of(&MaterialUniforms::from(material)),
                );
            }
        }

        // Bind groups keep their views alive, so unreferenced textures can go.
        let live = referenced_textures(self.materials.values().map(|gpu| &gpu.bound_paths));
        let before = self.textures.len();
        self.textures.retain(|key, _| live.contains(key));
        if self.textures.len() != before {
            log::debug!("Evicted {} unused texture(s)", before - self.textures.len());
        }
    }

    fn create_material(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        bound_paths: [Option<PathBuf>; 4],
    ) -> GpuMaterial {
        for (kind, path) in TextureKind::ALL.iter().zip(&bound_paths) {
            if let Some(path) = path {
                self.ensure_texture(device, queue, path, *kind);
            }
        }

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(name),
            size: std::mem::size_of::<MaterialUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let views: Vec<&wgpu::TextureView> = TextureKind::ALL
            .iter()
            .zip(&bound_paths)
            .map(|(kind, path)| self.texture_view(path.as_deref(), *kind))
            .collect();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(views[0]),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(views[1]),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(views[2]),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(views[3]),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(&self.material_sampler),
                },
            ],
        });

        GpuMaterial {
            bound_paths,
            uniforms,
            bind_group,
        }
    }

    fn ensure_texture(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, path: &Path, kind: TextureKind) {
        let key = (path.to_path_buf(), ColorSpace::for_kind(kind));
        if self.textures.contains_key(&key) {
            return;
        }
        let data = load_texture_or_placeholder(path, kind);
        self.textures.insert(key, GpuTexture::upload(device, queue, &data));
    }

    fn texture_view(&self, path: Option<&Path>, kind: TextureKind) -> &wgpu::TextureView {
        let placeholder = &self.placeholders[&kind].view;
        let Some(path) = path else {
            return placeholder;
        };
        self.textures
            .get(&(path.to_path_buf(), ColorSpace::for_kind(kind)))
            .map_or(placeholder, |t| &t.view)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn mesh(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(&handle)
    }

    #[must_use]
    pub fn material_bind_group(&self, handle: MaterialHandle) -> Option<&wgpu::BindGroup> {
        self.materials.get(&handle).map(|m| &m.bind_group)
    }

    #[must_use]
    pub fn camera_layout(&self) -> &wgpu::BindGroupLayout {
        &self.camera_layout
    }

    #[must_use]
    pub fn camera_buffer(&self) -> &wgpu::Buffer {
        &self.camera_buffer
    }

    #[must_use]
    pub fn camera_bind_group(&self) -> &wgpu::BindGroup {
        &self.camera_bind_group
    }

    #[must_use]
    pub fn object_layout(&self) -> &wgpu::BindGroupLayout {
        &self.object_layout
    }

    #[must_use]
    pub fn object_bind_group(&self) -> &wgpu::BindGroup {
        &self.object_bind_group
    }

    /// Dynamic offset of object slot `index`.
    #[must_use]
    pub fn object_offset(&self, index: u32) -> u32 {
        (u64::from(index) * self.object_stride) as u32
    }

    #[must_use]
    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    #[must_use]
    pub fn shadow_view_layout(&self) -> &wgpu::BindGroupLayout {
        &self.shadow_view_layout
    }

    #[must_use]
    pub fn shadow_view_bind_group(&self) -> &wgpu::BindGroup {
        &self.shadow_view_bind_group
    }

    /// Dynamic offset of shadow view `index`.
    #[must_use]
    pub fn shadow_view_offset(&self, device: &wgpu::Device, index: u32) -> u32 {
        let stride = aligned_stride(
            std::mem::size_of::<ShadowViewUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment,
        );
        (u64::from(index) * stride) as u32
    }

    #[must_use]
    pub fn light_buffer(&self) -> &wgpu::Buffer {
        self.light_buffer.buffer()
    }

    #[must_use]
    pub fn shadow_matrix_buffer(&self) -> &wgpu::Buffer {
        self.shadow_matrix_buffer.buffer()
    }

    #[must_use]
    pub fn light_count(&self) -> u32 {
        self.light_count
    }

    #[must_use]
    pub fn buffer_generation(&self) -> u64 {
        self.buffer_generation
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

/// Texture cache keys bound by any of `materials`.
fn referenced_textures<'a>(
    materials: impl Iterator<Item = &'a [Option<PathBuf>; 4]>,
) -> FxHashSet<(PathBuf, ColorSpace)> {
    let mut keys = FxHashSet::default();
    for bound_paths in materials {
        for (kind, path) in TextureKind::ALL.iter().zip(bound_paths) {
            if let Some(path) = path {
                keys.insert((path.clone(), ColorSpace::for_kind(*kind)));
            }
        }
    }
    keys
}

impl GpuLight {
    fn zeroed_light() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

fn bound_paths(material: &Material) -> [Option<PathBuf>; 4] {
    TextureKind::ALL.map(|kind| {
        if material.is_color {
            None
        } else {
            material.first_texture(kind).map(Path::to_path_buf)
        }
    })
}

/// Copies `items` into a byte vector with one `stride`-sized slot each.
fn pack_strided<T: bytemuck::Pod>(items: &[T], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let size = std::mem::size_of::<T>();
    let mut bytes = vec![0u8; items.len() * stride];
    for (i, item) in items.iter().enumerate() {
        bytes[i * stride..i * stride + size].copy_from_slice(bytemuck::bytes_of(item));
    }
    bytes
}

fn dynamic_uniform_layout<T>(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
            },
            count: None,
        }],
    })
}

fn dynamic_uniform_bind_group<T>(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
            }),
        }],
    })
}

fn create_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Material Layout"),
        entries: &[
            // Binding 0: MaterialUniforms
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            // Binding 1-4: diffuse, specular, normal, height
            texture_entry(1),
            texture_entry(2),
            texture_entry(3),
            texture_entry(4),
            // Binding 5: Sampler
            wgpu::BindGroupLayoutEntry {
                binding: 5,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MaterialTexture;

    #[test]
    fn strided_packing_places_each_item_on_its_slot() {
        let items = [1.0f32, 2.0, 3.0];
        let bytes = pack_strided(&items, 256);
        assert_eq!(bytes.len(), 768);
        assert_eq!(&bytes[256..260], bytemuck::bytes_of(&2.0f32));
        assert!(bytes[4..256].iter().all(|b| *b == 0));
    }

    #[test]
    fn referenced_textures_keep_colour_space_per_kind() {
        let material = Material::textured([
            MaterialTexture::new(TextureKind::Diffuse, "brick.png"),
            MaterialTexture::new(TextureKind::Normal, "brick_n.png"),
        ]);
        let colour = Material::color();
        let (a, b) = (bound_paths(&material), bound_paths(&colour));

        let keys = referenced_textures([&a, &b].into_iter());
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&(PathBuf::from("brick.png"), ColorSpace::for_kind(TextureKind::Diffuse))));
        assert!(keys.contains(&(PathBuf::from("brick_n.png"), ColorSpace::for_kind(TextureKind::Normal))));

        assert!(referenced_textures(std::iter::once(&b)).is_empty());
    }

    #[test]
    fn color_materials_bind_no_textures() {
        let mut material = Material::textured([MaterialTexture::new(TextureKind::Diffuse, "a.png")]);
        assert_eq!(bound_paths(&material)[0].as_deref(), Some(Path::new("a.png")));
        material.is_color = true;
        assert!(bound_paths(&material).iter().all(Option::is_none));
    }
}
