use tracing::{debug, warn};

use crate::context::SurfaceState;
use crate::material::Material;
use crate::mesh::{MeshData, Primitive};
use crate::pool::{GeometryHandle, MaterialHandle, ResourcePool};

#[derive(Debug, Clone, PartialEq)]
pub enum GpuError {
    ContextLost,
    UnknownGeometry(GeometryHandle),
    UnknownMaterial(MaterialHandle),
    EmptyMesh,
}

impl std::fmt::Display for GpuError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuError::ContextLost => write!(f, "rendering context lost"),
            GpuError::UnknownGeometry(h) => write!(f, "unknown or released geometry {:?}", h.0),
            GpuError::UnknownMaterial(h) => write!(f, "unknown or released material {:?}", h.0),
            GpuError::EmptyMesh => write!(f, "mesh has no vertices"),
        }
    }
}

impl std::error::Error for GpuError {}

/// One draw: geometry, material and a column-major model matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCall {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub model: [[f32; 4]; 4],
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameSubmission {
    pub view_proj: [[f32; 4]; 4],
    pub draws: Vec<DrawCall>,
}

/// Upload, release and draw. Implemented by a real graphics device in the host
/// and by [`HeadlessBackend`] everywhere else.
pub trait GpuBackend {
    fn upload_geometry(&mut self, mesh: &MeshData) -> Result<GeometryHandle, GpuError>;
    fn release_geometry(&mut self, handle: GeometryHandle) -> Result<(), GpuError>;
    fn create_material(&mut self, material: &Material) -> Result<MaterialHandle, GpuError>;
    fn update_material(
        &mut self,
        handle: MaterialHandle,
        material: &Material,
    ) -> Result<(), GpuError>;
    fn release_material(&mut self, handle: MaterialHandle) -> Result<(), GpuError>;
    fn submit(&mut self, frame: &FrameSubmission) -> Result<(), GpuError>;
    fn surface_state(&self) -> SurfaceState;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    pub primitive: Primitive,
    pub vertex_count: usize,
    pub vertex_bytes: usize,
    pub index_count: usize,
    pub index_bytes: usize,
}

/// In-memory backend: tracks resources and records submissions.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    geometries: ResourcePool<GeometryRecord>,
    materials: ResourcePool<Material>,
    frames_submitted: u64,
    last_frame: FrameSubmission,
    lost: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the device dropping the surface.
    pub fn lose_context(&mut self) {
        self.lost = true;
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn geometry(&self, handle: GeometryHandle) -> Option<&GeometryRecord> {
        self.geometries.get(handle.0)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0)
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    pub fn last_frame(&self) -> &FrameSubmission {
        &self.last_frame
    }

    fn ensure_live(&self) -> Result<(), GpuError> {
        if self.lost {
            Err(GpuError::ContextLost)
        } else {
            Ok(())
        }
    }
}

impl GpuBackend for HeadlessBackend {
    fn upload_geometry(&mut self, mesh: &MeshData) -> Result<GeometryHandle, GpuError> {
        self.ensure_live()?;
        if mesh.vertices.is_empty() {
            return Err(GpuError::EmptyMesh);
        }
        let record = GeometryRecord {
            primitive: mesh.primitive,
            vertex_count: mesh.vertices.len(),
            vertex_bytes: mesh.vertex_bytes().len(),
            index_count: mesh.indices.len(),
            index_bytes: mesh.index_bytes().len(),
        };
        let handle = GeometryHandle(self.geometries.insert(record));
        debug!(?handle, vertices = mesh.vertices.len(), "uploaded geometry");
        Ok(handle)
    }

    // Releases stay valid after context loss so teardown can still balance
    // the books.
    fn release_geometry(&mut self, handle: GeometryHandle) -> Result<(), GpuError> {
        match self.geometries.remove(handle.0) {
            Some(_) => Ok(()),
            None => {
                warn!(?handle, "release of unknown geometry");
                Err(GpuError::UnknownGeometry(handle))
            }
        }
    }

    fn create_material(&mut self, material: &Material) -> Result<MaterialHandle, GpuError> {
        self.ensure_live()?;
        Ok(MaterialHandle(self.materials.insert(*material)))
    }

    fn update_material(
        &mut self,
        handle: MaterialHandle,
        material: &Material,
    ) -> Result<(), GpuError> {
        self.ensure_live()?;
        let slot = self
            .materials
            .get_mut(handle.0)
            .ok_or(GpuError::UnknownMaterial(handle))?;
        *slot = *material;
        Ok(())
    }

    fn release_material(&mut self, handle: MaterialHandle) -> Result<(), GpuError> {
        match self.materials.remove(handle.0) {
            Some(_) => Ok(()),
            None => {
                warn!(?handle, "release of unknown material");
                Err(GpuError::UnknownMaterial(handle))
            }
        }
    }

    fn submit(&mut self, frame: &FrameSubmission) -> Result<(), GpuError> {
        self.ensure_live()?;
        for draw in &frame.draws {
            if !self.geometries.contains(draw.geometry.0) {
                return Err(GpuError::UnknownGeometry(draw.geometry));
            }
            if !self.materials.contains(draw.material.0) {
                return Err(GpuError::UnknownMaterial(draw.material));
            }
        }
        self.frames_submitted += 1;
        self.last_frame = frame.clone();
        Ok(())
    }

    fn surface_state(&self) -> SurfaceState {
        if self.lost {
            SurfaceState::Lost
        } else {
            SurfaceState::Active
        }
    }
}
