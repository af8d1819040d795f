use std::f32::consts::TAU;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    Triangles,
    LineStrip,
    LineLoop,
    Points,
}

/// CPU-side geometry ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub primitive: Primitive,
    pub vertices: Vec<MeshVertex>,
    /// Empty for non-indexed primitives.
    pub indices: Vec<u32>,
}

const LOCAL_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

impl MeshData {
    pub fn triangles(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        Self {
            primitive: Primitive::Triangles,
            vertices,
            indices,
        }
    }

    /// Filled disc in the local XY plane facing +Z.
    pub fn disc(radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity(segments as usize + 1);
        vertices.push(MeshVertex::new([0.0, 0.0, 0.0], LOCAL_NORMAL));
        for i in 0..segments {
            let a = TAU * i as f32 / segments as f32;
            vertices.push(MeshVertex::new(
                [radius * a.cos(), radius * a.sin(), 0.0],
                LOCAL_NORMAL,
            ));
        }
        let mut indices = Vec::with_capacity(segments as usize * 3);
        for i in 0..segments {
            indices.extend_from_slice(&[0, 1 + i, 1 + (i + 1) % segments]);
        }
        Self::triangles(vertices, indices)
    }

    /// Flat annulus in the local XY plane facing +Z.
    pub fn annulus(inner: f32, outer: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::with_capacity(segments as usize * 2);
        for i in 0..segments {
            let a = TAU * i as f32 / segments as f32;
            let (s, c) = a.sin_cos();
            vertices.push(MeshVertex::new([inner * c, inner * s, 0.0], LOCAL_NORMAL));
            vertices.push(MeshVertex::new([outer * c, outer * s, 0.0], LOCAL_NORMAL));
        }
        let mut indices = Vec::with_capacity(segments as usize * 6);
        for i in 0..segments {
            let a = 2 * i;
            let b = 2 * ((i + 1) % segments);
            indices.extend_from_slice(&[a, a + 1, b + 1, a, b + 1, b]);
        }
        Self::triangles(vertices, indices)
    }

    pub fn polyline(points: &[[f32; 3]], closed: bool) -> Self {
        Self::unindexed(
            if closed {
                Primitive::LineLoop
            } else {
                Primitive::LineStrip
            },
            points,
        )
    }

    pub fn points(points: &[[f32; 3]]) -> Self {
        Self::unindexed(Primitive::Points, points)
    }

    fn unindexed(primitive: Primitive, points: &[[f32; 3]]) -> Self {
        Self {
            primitive,
            vertices: points
                .iter()
                .map(|p| MeshVertex::new(*p, unit_or_up(*p)))
                .collect(),
            indices: Vec::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        match self.primitive {
            Primitive::Triangles => self.indices.len() / 3,
            _ => 0,
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Sphere-surface normal for a point on a globe centred at the origin.
pub fn unit_or_up(p: [f32; 3]) -> [f32; 3] {
    let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
    if len > f32::EPSILON {
        [p[0] / len, p[1] / len, p[2] / len]
    } else {
        [0.0, 1.0, 0.0]
    }
}
