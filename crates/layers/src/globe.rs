//! The globe body itself.

use std::f32::consts::{PI, TAU};

use gpu::{GeometryHandle, GpuBackend, GpuError, Material, MaterialHandle, MeshData, MeshVertex};
use scene::SceneGraph;
use scene::components::{Drawable, Layer};
use scene::entity::NodeId;

use crate::symbology::GLOBE_STYLE;

const LAT_SEGMENTS: u32 = 32;
const LNG_SEGMENTS: u32 = 64;

/// UV sphere centred at the origin, poles on the Y axis.
pub fn sphere_mesh(radius: f32, lat_segments: u32, lng_segments: u32) -> MeshData {
    let lat_segments = lat_segments.max(2);
    let lng_segments = lng_segments.max(3);
    let mut vertices = Vec::with_capacity(((lat_segments + 1) * (lng_segments + 1)) as usize);
    for i in 0..=lat_segments {
        let phi = PI * i as f32 / lat_segments as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for j in 0..=lng_segments {
            let theta = TAU * j as f32 / lng_segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let normal = [-sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
            vertices.push(MeshVertex::new(
                [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                normal,
            ));
        }
    }

    let row = lng_segments + 1;
    let mut indices = Vec::with_capacity((lat_segments * lng_segments * 6) as usize);
    for i in 0..lat_segments {
        for j in 0..lng_segments {
            let a = i * row + j;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    MeshData::triangles(vertices, indices)
}

#[derive(Debug)]
pub struct GlobeBody {
    node: NodeId,
    geometry: GeometryHandle,
    material: MaterialHandle,
}

impl GlobeBody {
    pub fn build(graph: &mut SceneGraph, gpu: &mut dyn GpuBackend) -> Result<Self, GpuError> {
        let geometry = gpu.upload_geometry(&sphere_mesh(
            GLOBE_STYLE.radius() as f32,
            LAT_SEGMENTS,
            LNG_SEGMENTS,
        ))?;
        let material = match gpu.create_material(&Material::opaque(GLOBE_STYLE.color)) {
            Ok(material) => material,
            Err(err) => {
                gpu.release_geometry(geometry)?;
                return Err(err);
            }
        };
        let node = graph.spawn(Layer::Globe);
        graph.set_drawable(node, Drawable::new(geometry, material));
        Ok(Self {
            node,
            geometry,
            material,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn dispose(self, graph: &mut SceneGraph, gpu: &mut dyn GpuBackend) -> Result<(), GpuError> {
        graph.despawn(self.node);
        let geometry = gpu.release_geometry(self.geometry);
        let material = gpu.release_material(self.material);
        geometry.and(material)
    }
}
