//! Territory-control overlay for one frontline snapshot.
//!
//! Polygons are ear-clipped in lng/lat space, then every vertex is projected
//! onto a shell just above the globe. Fills sit on `FRONTLINE_FILL_STYLE`,
//! outlines, lines and points on the slightly higher `FRONTLINE_LINE_STYLE`.
//! Nothing here is shared, so [`FrontlineOverlay::dispose`] frees everything.

use formats::features::{FrontlineFeature, FrontlineSnapshot, Geometry, Position};
use foundation::math::to_surface_point;
use gpu::{
    GeometryHandle, GpuBackend, GpuError, Material, MaterialHandle, MeshData, MeshVertex, Rgb,
    unit_or_up,
};
use scene::SceneGraph;
use scene::components::{Drawable, Layer};
use scene::entity::NodeId;
use tracing::{debug, warn};

use crate::symbology::{FRONTLINE_FILL_STYLE, FRONTLINE_LINE_STYLE, SidePalette};
use crate::triangulate::{Triangulation, TriangulationError, triangulate_polygon};

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub side: String,
    pub color: Rgb,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontlineStats {
    pub polygons: usize,
    pub lines: usize,
    pub points: usize,
    pub triangles: usize,
    pub skipped: Vec<SkippedFeature>,
    /// Features already dropped while parsing the snapshot.
    pub rejected_records: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Part {
    Fill,
    Line,
}

/// Fill and line materials for one side drawn in one colour.
#[derive(Debug, Clone)]
struct SideMaterials {
    side: String,
    color: Rgb,
    fill: MaterialHandle,
    line: MaterialHandle,
}

/// Meshes for one feature before upload.
#[derive(Debug, Default)]
struct FeatureMeshes {
    parts: Vec<(Part, MeshData)>,
    polygons: usize,
    lines: usize,
    points: usize,
    triangles: usize,
}

#[derive(Debug, Default)]
pub struct FrontlineOverlay {
    date: String,
    nodes: Vec<NodeId>,
    geometries: Vec<GeometryHandle>,
    materials: Vec<MaterialHandle>,
    legend: Vec<LegendEntry>,
    stats: FrontlineStats,
}

impl FrontlineOverlay {
    /// Features that cannot be triangulated are skipped and recorded in
    /// [`FrontlineStats::skipped`]. A GPU failure discards the partial overlay.
    pub fn build(
        snapshot: &FrontlineSnapshot,
        graph: &mut SceneGraph,
        gpu: &mut dyn GpuBackend,
    ) -> Result<Self, GpuError> {
        let mut overlay = Self {
            date: snapshot.date.clone(),
            stats: FrontlineStats {
                rejected_records: snapshot.rejected.len(),
                ..FrontlineStats::default()
            },
            ..Self::default()
        };
        let mut palette = SidePalette::new();
        let mut side_materials: Vec<SideMaterials> = Vec::new();

        for (index, feature) in snapshot.features.iter().enumerate() {
            // Colours are assigned in order of first appearance, rendered or not.
            let palette_color = palette.color_for(&feature.side);
            let meshes = match feature_meshes(feature) {
                Ok(meshes) => meshes,
                Err(reason) => {
                    warn!(date = %snapshot.date, index, side = %feature.side, %reason, "skipping frontline feature");
                    overlay.stats.skipped.push(SkippedFeature { index, reason });
                    continue;
                }
            };
            let color = feature
                .color
                .as_deref()
                .and_then(Rgb::parse_hex)
                .unwrap_or(palette_color);

            if let Err(err) =
                overlay.upload_feature(feature, color, meshes, &mut side_materials, graph, gpu)
            {
                warn!(date = %snapshot.date, index, %err, "frontline build failed; discarding partial overlay");
                if let Err(cleanup) = overlay.dispose(graph, gpu) {
                    debug!(%cleanup, "partial overlay cleanup incomplete");
                }
                return Err(err);
            }
        }

        debug!(
            date = %overlay.date,
            polygons = overlay.stats.polygons,
            lines = overlay.stats.lines,
            points = overlay.stats.points,
            triangles = overlay.stats.triangles,
            skipped = overlay.stats.skipped.len(),
            "frontline overlay built"
        );
        Ok(overlay)
    }

    fn upload_feature(
        &mut self,
        feature: &FrontlineFeature,
        color: Rgb,
        meshes: FeatureMeshes,
        side_materials: &mut Vec<SideMaterials>,
        graph: &mut SceneGraph,
        gpu: &mut dyn GpuBackend,
    ) -> Result<(), GpuError> {
        let existing = side_materials
            .iter()
            .find(|m| m.side == feature.side && m.color == color);
        let (fill, line) = match existing {
            Some(m) => (m.fill, m.line),
            None => {
                let fill = gpu.create_material(&Material::translucent(
                    color,
                    FRONTLINE_FILL_STYLE.opacity,
                ))?;
                self.materials.push(fill);
                let line = gpu.create_material(&Material::translucent(
                    color,
                    FRONTLINE_LINE_STYLE.opacity,
                ))?;
                self.materials.push(line);
                side_materials.push(SideMaterials {
                    side: feature.side.clone(),
                    color,
                    fill,
                    line,
                });
                (fill, line)
            }
        };
        // Legend keeps the first rendered colour of each side.
        if !self.legend.iter().any(|e| e.side == feature.side) {
            self.legend.push(LegendEntry {
                side: feature.side.clone(),
                color,
                label: side_label(&feature.side),
            });
        }

        for (part, mesh) in &meshes.parts {
            let geometry = gpu.upload_geometry(mesh)?;
            self.geometries.push(geometry);
            let material = match part {
                Part::Fill => fill,
                Part::Line => line,
            };
            let node = graph.spawn(Layer::Frontlines);
            graph.set_drawable(node, Drawable::new(geometry, material));
            self.nodes.push(node);
        }

        self.stats.polygons += meshes.polygons;
        self.stats.lines += meshes.lines;
        self.stats.points += meshes.points;
        self.stats.triangles += meshes.triangles;
        Ok(())
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// One entry per side, in order of first rendered appearance.
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    pub fn stats(&self) -> &FrontlineStats {
        &self.stats
    }

    pub fn node_count(&self) -> usize {
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
        for material in self.materials {
            if let Err(err) = gpu.release_material(material) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// `"armed_forces"` -> `"Armed forces"`.
fn side_label(side: &str) -> String {
    let spaced = side.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn feature_meshes(feature: &FrontlineFeature) -> Result<FeatureMeshes, String> {
    let mut out = FeatureMeshes::default();
    match &feature.geometry {
        Geometry::Polygon(rings) => add_polygon(&mut out, rings)?,
        Geometry::MultiPolygon(polygons) => {
            for (i, rings) in polygons.iter().enumerate() {
                add_polygon(&mut out, rings).map_err(|reason| format!("polygon {i}: {reason}"))?;
            }
        }
        Geometry::LineString(line) => add_line(&mut out, line)?,
        Geometry::MultiLineString(lines) => {
            for line in lines {
                add_line(&mut out, line)?;
            }
        }
        Geometry::Point(p) => add_points(&mut out, std::slice::from_ref(p))?,
        Geometry::MultiPoint(points) => add_points(&mut out, points)?,
    }
    if out.parts.is_empty() {
        return Err(format!("{} has no drawable parts", feature.geometry.kind()));
    }
    Ok(out)
}

fn add_polygon(out: &mut FeatureMeshes, rings: &[Vec<Position>]) -> Result<(), String> {
    let tri = triangulate_polygon(rings).map_err(|e: TriangulationError| e.to_string())?;
    out.triangles += tri.triangle_count();
    out.parts.push((Part::Fill, fill_mesh(&tri)));
    let outline = project_all(tri.outer_ring(), FRONTLINE_LINE_STYLE.radius());
    out.parts.push((Part::Line, MeshData::polyline(&outline, true)));
    out.polygons += 1;
    Ok(())
}

fn add_line(out: &mut FeatureMeshes, line: &[Position]) -> Result<(), String> {
    let pts = finite_points(line);
    if pts.len() < 2 {
        return Err("line has fewer than 2 valid points".to_string());
    }
    let projected = project_all(&pts, FRONTLINE_LINE_STYLE.radius());
    out.parts.push((Part::Line, MeshData::polyline(&projected, false)));
    out.lines += 1;
    Ok(())
}

fn add_points(out: &mut FeatureMeshes, points: &[Position]) -> Result<(), String> {
    let pts = finite_points(points);
    if pts.is_empty() {
        return Err("no valid points".to_string());
    }
    let projected = project_all(&pts, FRONTLINE_LINE_STYLE.radius());
    out.parts.push((Part::Line, MeshData::points(&projected)));
    out.points += pts.len();
    Ok(())
}

fn finite_points(points: &[Position]) -> Vec<Position> {
    points
        .iter()
        .copied()
        .filter(|p| p[0].is_finite() && p[1].is_finite())
        .collect()
}

fn project_all(points: &[Position], radius: f64) -> Vec<[f32; 3]> {
    points
        .iter()
        .map(|p| to_surface_point(p[0], p[1], radius).to_f32())
        .collect()
}

fn fill_mesh(tri: &Triangulation) -> MeshData {
    let vertices = project_all(&tri.vertices, FRONTLINE_FILL_STYLE.radius())
        .into_iter()
        .map(|p| MeshVertex::new(p, unit_or_up(p)))
        .collect();
    MeshData::triangles(vertices, tri.indices.clone())
}

#[cfg(test)]
mod tests {
    use super::{FrontlineOverlay, side_label};
    use crate::symbology::{FRONTLINE_FILL_STYLE, SidePalette};
    use formats::features::{FrontlineFeature, FrontlineSnapshot, Geometry, Position};
    use gpu::{HeadlessBackend, Primitive, Rgb};
    use pretty_assertions::assert_eq;
    use scene::SceneGraph;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Position> {
        vec![
            [x0, y0],
            [x0 + size, y0],
            [x0 + size, y0 + size],
            [x0, y0 + size],
            [x0, y0],
        ]
    }

    fn feature(side: &str, color: Option<&str>, geometry: Geometry) -> FrontlineFeature {
        FrontlineFeature {
            side: side.to_string(),
            color: color.map(str::to_string),
            geometry,
        }
    }

    fn snapshot(features: Vec<FrontlineFeature>) -> FrontlineSnapshot {
        FrontlineSnapshot {
            date: "2022-03-01".to_string(),
            features,
            rejected: vec![7],
        }
    }

    #[test]
    fn bad_polygons_are_skipped_and_the_rest_render() {
        let bow_tie = vec![[0.0, 0.0], [3.0, 2.0], [3.0, 0.0], [0.0, 1.0], [0.0, 0.0]];
        let snap = snapshot(vec![
            feature(
                "north",
                None,
                Geometry::Polygon(vec![square(30.0, 45.0, 4.0), square(31.0, 46.0, 1.0)]),
            ),
            feature("south", None, Geometry::Polygon(vec![bow_tie])),
            feature(
                "south",
                None,
                Geometry::LineString(vec![[30.0, 44.0], [34.0, 44.5], [35.0, 44.0]]),
            ),
            feature("north", None, Geometry::MultiPoint(vec![[31.0, 47.0], [32.0, 47.5]])),
        ]);
        let mut gpu = HeadlessBackend::new();
        let mut graph = SceneGraph::new();
        let overlay = FrontlineOverlay::build(&snap, &mut graph, &mut gpu).expect("build");

        let stats = overlay.stats();
        assert_eq!(stats.polygons, 1);
        assert_eq!(stats.lines, 1);
        assert_eq!(stats.points, 2);
        // 4x4 square with a 1x1 hole: 8 vertices, 8 triangles.
        assert_eq!(stats.triangles, 8);
        assert_eq!(stats.skipped.len(), 1);
        assert_eq!(stats.skipped[0].index, 1);
        assert_eq!(stats.rejected_records, 1);

        // fill + outline, line, points
        assert_eq!(overlay.node_count(), 4);
        assert_eq!(gpu.live_geometries(), 4);
        assert_eq!(gpu.live_materials(), 4);

        let sides: Vec<_> = overlay.legend().iter().map(|e| e.side.as_str()).collect();
        assert_eq!(sides, vec!["north", "south"]);

        overlay.dispose(&mut graph, &mut gpu).expect("dispose");
        assert_eq!(gpu.live_geometries(), 0);
        assert_eq!(gpu.live_materials(), 0);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn a_skipped_polygon_leaves_nothing_behind() {
        let bow_tie = vec![[0.0, 0.0], [3.0, 2.0], [3.0, 0.0], [0.0, 1.0], [0.0, 0.0]];
        let snap = snapshot(vec![feature("south", None, Geometry::Polygon(vec![bow_tie]))]);
        let mut gpu = HeadlessBackend::new();
        let mut graph = SceneGraph::new();
        let overlay = FrontlineOverlay::build(&snap, &mut graph, &mut gpu).expect("build");

        assert_eq!(overlay.stats().triangles, 0);
        assert_eq!(overlay.stats().polygons, 0);
        assert_eq!(overlay.stats().skipped.len(), 1);
        assert_eq!(overlay.node_count(), 0);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(gpu.live_geometries(), 0);
        assert_eq!(gpu.live_materials(), 0);
        assert!(overlay.legend().is_empty());
    }

    #[test]
    fn fill_vertices_sit_on_the_fill_shell() {
        let snap = snapshot(vec![feature(
            "north",
            None,
            Geometry::Polygon(vec![square(10.0, 10.0, 2.0)]),
        )]);
        let mut gpu = HeadlessBackend::new();
        let mut graph = SceneGraph::new();
        let overlay = FrontlineOverlay::build(&snap, &mut graph, &mut gpu).expect("build");

        let frame = graph.drawables();
        let fill = gpu.geometry(frame[0].3.geometry).expect("fill");
        assert_eq!(fill.primitive, Primitive::Triangles);
        assert_eq!(fill.vertex_count, 4);
        let outline = gpu.geometry(frame[1].3.geometry).expect("outline");
        assert_eq!(outline.primitive, Primitive::LineLoop);
        assert!(FRONTLINE_FILL_STYLE.radius() > 1.0);
        overlay.dispose(&mut graph, &mut gpu).expect("dispose");
    }

    #[test]
    fn override_colors_apply_per_feature_and_the_legend_keeps_the_first() {
        let snap = snapshot(vec![
            feature("blue_side", Some("#0000ff"), Geometry::Point([0.0, 0.0])),
            feature("blue_side", Some("#ff0000"), Geometry::Point([1.0, 1.0])),
            feature("blue_side", Some("#0000ff"), Geometry::Point([1.5, 1.5])),
            feature("other", Some("not a colour"), Geometry::Point([2.0, 2.0])),
        ]);
        let mut gpu = HeadlessBackend::new();
        let mut graph = SceneGraph::new();
        let overlay = FrontlineOverlay::build(&snap, &mut graph, &mut gpu).expect("build");

        let colors: Vec<Rgb> = overlay
            .nodes
            .iter()
            .map(|&node| {
                let drawable = graph.drawable(node).expect("drawable");
                gpu.material(drawable.material).expect("material").color
            })
            .collect();
        let mut palette = SidePalette::new();
        palette.color_for("blue_side");
        let other = palette.color_for("other");
        assert_eq!(
            colors,
            vec![
                Rgb::from_u32(0x0000ff),
                Rgb::from_u32(0xff0000),
                Rgb::from_u32(0x0000ff),
                other,
            ]
        );
        // blue and red for blue_side, palette colour for other; fill + line each
        assert_eq!(gpu.live_materials(), 6);

        let legend = overlay.legend();
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[0].color, Rgb::from_u32(0x0000ff));
        assert_eq!(legend[0].label, "Blue side");
        assert_eq!(legend[1].color, other);
        overlay.dispose(&mut graph, &mut gpu).expect("dispose");
        assert_eq!(gpu.live_materials(), 0);
    }

    #[test]
    fn lost_context_discards_the_partial_overlay() {
        let snap = snapshot(vec![feature(
            "north",
            None,
            Geometry::Polygon(vec![square(0.0, 0.0, 1.0)]),
        )]);
        let mut gpu = HeadlessBackend::new();
        gpu.lose_context();
        let mut graph = SceneGraph::new();
        assert!(FrontlineOverlay::build(&snap, &mut graph, &mut gpu).is_err());
        assert_eq!(graph.node_count(), 0);
        assert_eq!(gpu.live_materials(), 0);
    }

    #[test]
    fn labels_are_humanized() {
        assert_eq!(side_label("armed_forces"), "Armed forces");
        assert_eq!(side_label(""), "");
    }
}
