use crate::backend::{GpuBackend, GpuError};
use crate::mesh::MeshData;
use crate::pool::GeometryHandle;

pub const MARKER_CORE_RADIUS: f32 = 0.012;
pub const MARKER_LARGE_CORE_RADIUS: f32 = 0.018;
pub const MARKER_INNER_RING: (f32, f32) = (0.02, 0.026);
pub const MARKER_OUTER_RING: (f32, f32) = (0.032, 0.037);
const SEGMENTS: u32 = 24;

/// Marker geometry uploaded once and shared by every marker overlay.
///
/// Overlays reference these handles but never release them; only
/// [`SharedGeometries::release`] at viewer teardown does.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedGeometries {
    pub marker_core: GeometryHandle,
    pub large_core: GeometryHandle,
    pub inner_ring: GeometryHandle,
    pub outer_ring: GeometryHandle,
}

impl SharedGeometries {
    pub fn create(gpu: &mut dyn GpuBackend) -> Result<Self, GpuError> {
        Ok(Self {
            marker_core: gpu.upload_geometry(&MeshData::disc(MARKER_CORE_RADIUS, SEGMENTS))?,
            large_core: gpu.upload_geometry(&MeshData::disc(MARKER_LARGE_CORE_RADIUS, SEGMENTS))?,
            inner_ring: gpu.upload_geometry(&MeshData::annulus(
                MARKER_INNER_RING.0,
                MARKER_INNER_RING.1,
                SEGMENTS,
            ))?,
            outer_ring: gpu.upload_geometry(&MeshData::annulus(
                MARKER_OUTER_RING.0,
                MARKER_OUTER_RING.1,
                SEGMENTS,
            ))?,
        })
    }

    pub fn handles(&self) -> [GeometryHandle; 4] {
        [
            self.marker_core,
            self.large_core,
            self.inner_ring,
            self.outer_ring,
        ]
    }

    pub fn contains(&self, handle: GeometryHandle) -> bool {
        self.handles().contains(&handle)
    }

    pub fn release(self, gpu: &mut dyn GpuBackend) -> Result<(), GpuError> {
        for handle in self.handles() {
            gpu.release_geometry(handle)?;
        }
        Ok(())
    }
}
