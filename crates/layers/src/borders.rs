//! Country outlines drawn as closed line loops just above the globe.

use formats::topology::CountryPolygon;
use foundation::math::to_surface_point;
use gpu::{GeometryHandle, GpuBackend, GpuError, Material, MaterialHandle, MeshData};
use scene::SceneGraph;
use scene::components::{Drawable, Layer};
use scene::entity::NodeId;
use tracing::debug;

use crate::symbology::BORDER_STYLE;

#[derive(Debug)]
pub struct BorderOverlay {
    nodes: Vec<NodeId>,
    geometries: Vec<GeometryHandle>,
    material: MaterialHandle,
}

impl BorderOverlay {
    pub fn build(
        countries: &[CountryPolygon],
        graph: &mut SceneGraph,
        gpu: &mut dyn GpuBackend,
    ) -> Result<Self, GpuError> {
        let material = gpu.create_material(&Material::translucent(
            BORDER_STYLE.color,
            BORDER_STYLE.opacity,
        ))?;
        let mut overlay = Self {
            nodes: Vec::new(),
            geometries: Vec::new(),
            material,
        };
        let radius = BORDER_STYLE.radius();

        for country in countries {
            for ring in &country.rings {
                let points: Vec<[f32; 3]> = ring
                    .iter()
                    .map(|p| to_surface_point(p[0], p[1], radius).to_f32())
                    .collect();
                let geometry = match gpu.upload_geometry(&MeshData::polyline(&points, true)) {
                    Ok(handle) => handle,
                    Err(err) => {
                        if let Err(cleanup) = overlay.dispose(graph, gpu) {
                            debug!(%cleanup, "partial border cleanup incomplete");
                        }
                        return Err(err);
                    }
                };
                let node = graph.spawn(Layer::Borders);
                graph.set_drawable(node, Drawable::new(geometry, material));
                overlay.geometries.push(geometry);
                overlay.nodes.push(node);
            }
        }

        debug!(
            countries = countries.len(),
            rings = overlay.nodes.len(),
            "border overlay built"
        );
        Ok(overlay)
    }

    pub fn ring_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn dispose(self, graph: &mut SceneGraph, gpu: &mut dyn GpuBackend) -> Result<(), GpuError> {
        let mut first_err = None;
        for node in self.nodes {
            graph.despawn(node);
        }
        for geometry in self.geometries {
            if let Err(err) = gpu.release_geometry(geometry) {
                first_err.get_or_insert(err);
            }
        }
        if let Err(err) = gpu.release_material(self.material) {
            first_err.get_or_insert(err);
        }
        first_err.map_or(Ok(()), Err)
    }
}
