//! Conflict markers: one core disc plus rings per conflict, laid tangent to
//! the globe, with a pulsing inner ring.

use std::f64::consts::TAU;

use formats::records::GlobeConflict;
use foundation::ids::ConflictId;
use foundation::math::{tangent_frame, to_surface_point};
use gpu::{
    GeometryHandle, GpuBackend, GpuError, MARKER_CORE_RADIUS, MARKER_LARGE_CORE_RADIUS, Material,
    MaterialHandle, Rgb, SharedGeometries,
};
use rand::Rng;
use scene::SceneGraph;
use scene::components::{Drawable, Layer, PickTarget, Transform};
use scene::entity::NodeId;
use tracing::{debug, warn};

use crate::symbology::{HIGHLIGHT_COLOR, MARKER_STYLE, type_color};

/// Pulse angular rate in radians per second.
const PULSE_RATE: f64 = 2.5;
const PULSE_SCALE_AMPLITUDE: f64 = 0.18;
/// Fraction of the base opacity kept at the bottom of a pulse.
const PULSE_OPACITY_FLOOR: f32 = 0.35;
const INNER_RING_OPACITY: f32 = 0.8;
const OUTER_RING_OPACITY: f32 = 0.55;
/// Pick radius relative to the drawn core radius.
const PICK_SLACK: f64 = 2.0;

/// Phase offset and base state of one pulsing ring.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseEntry {
    pub conflict: ConflictId,
    pub phase: f64,
    pub node: NodeId,
    pub material: MaterialHandle,
    pub base_material: Material,
    pub base_transform: Transform,
}

impl PulseEntry {
    /// Ring scale and opacity at `time_s`.
    pub fn sample(&self, time_s: f64) -> (f64, f32) {
        let wave = (time_s * PULSE_RATE + self.phase).sin();
        let scale = self.base_transform.scale * (1.0 + PULSE_SCALE_AMPLITUDE * wave);
        let t = ((wave + 1.0) * 0.5) as f32;
        let opacity =
            self.base_material.opacity * (PULSE_OPACITY_FLOOR + (1.0 - PULSE_OPACITY_FLOOR) * t);
        (scale, opacity)
    }
}

/// Scene nodes and materials for one conflict.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGroup {
    pub conflict: ConflictId,
    /// Core first, then the inner ring, then the outer ring when highlighted.
    pub nodes: Vec<NodeId>,
    /// Owned by this group; released on dispose.
    pub materials: Vec<MaterialHandle>,
    pub highlighted: bool,
    haystack: String,
}

impl MarkerGroup {
    pub fn core(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }
}

/// Case-insensitive substring filter over conflict name, type and
/// participant names. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerFilter {
    needle: String,
}

impl MarkerFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches_text(&self, haystack: &str) -> bool {
        self.needle.is_empty() || haystack.contains(&self.needle)
    }

    pub fn matches(&self, conflict: &GlobeConflict) -> bool {
        self.matches_text(&search_text(conflict))
    }
}

fn search_text(conflict: &GlobeConflict) -> String {
    let mut text = format!("{}\n{}", conflict.name, conflict.conflict_type);
    for p in &conflict.participants {
        text.push('\n');
        text.push_str(&p.name);
    }
    text.to_lowercase()
}

/// All markers for one year. Rebuilt wholesale when the year changes.
///
/// Shared marker geometry is only referenced; [`MarkerOverlay::dispose`]
/// releases the per-marker materials and scene nodes and nothing else.
#[derive(Debug, Default)]
pub struct MarkerOverlay {
    groups: Vec<MarkerGroup>,
    pulses: Vec<PulseEntry>,
}

impl MarkerOverlay {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds markers for `conflicts`. Conflicts with an invalid position are
    /// skipped; a GPU failure tears down what was built so far.
    pub fn build<R: Rng + ?Sized>(
        conflicts: &[GlobeConflict],
        shared: &SharedGeometries,
        graph: &mut SceneGraph,
        gpu: &mut dyn GpuBackend,
        rng: &mut R,
    ) -> Result<Self, GpuError> {
        let mut overlay = Self {
            groups: Vec::with_capacity(conflicts.len()),
            pulses: Vec::with_capacity(conflicts.len()),
        };
        for conflict in conflicts {
            if !conflict.position.is_valid() {
                warn!(conflict = %conflict.id, lat = conflict.position.lat, lng = conflict.position.lng, "skipping marker with invalid position");
                continue;
            }
            if let Err(err) = overlay.add_marker(conflict, shared, graph, gpu, rng) {
                warn!(conflict = %conflict.id, %err, "marker build failed; discarding partial overlay");
                if let Err(cleanup) = overlay.dispose(graph, gpu) {
                    debug!(%cleanup, "partial overlay cleanup incomplete");
                }
                return Err(err);
            }
        }
        debug!(
            markers = overlay.groups.len(),
            highlighted = overlay.groups.iter().filter(|g| g.highlighted).count(),
            "marker overlay built"
        );
        Ok(overlay)
    }

    fn add_marker<R: Rng + ?Sized>(
        &mut self,
        conflict: &GlobeConflict,
        shared: &SharedGeometries,
        graph: &mut SceneGraph,
        gpu: &mut dyn GpuBackend,
        rng: &mut R,
    ) -> Result<(), GpuError> {
        let highlighted = conflict.has_frontlines;
        let color = marker_color(conflict);
        let (lat, lng) = (conflict.position.lat, conflict.position.lng);
        let scale = f64::from(conflict.intensity.scale());
        let base = Transform::translate(to_surface_point(lng, lat, MARKER_STYLE.radius()))
            .with_rotation(tangent_frame(lng, lat))
            .with_scale(scale);

        let group_i = self.groups.len();
        self.groups.push(MarkerGroup {
            conflict: conflict.id,
            nodes: Vec::with_capacity(3),
            materials: Vec::with_capacity(3),
            highlighted,
            haystack: search_text(conflict),
        });

        let (core_geometry, core_radius) = if highlighted {
            (shared.large_core, MARKER_LARGE_CORE_RADIUS)
        } else {
            (shared.marker_core, MARKER_CORE_RADIUS)
        };
        let core = self.spawn_part(
            group_i,
            graph,
            gpu,
            core_geometry,
            Material::opaque(color),
            base,
        )?;
        graph.set_pick_target(
            core,
            PickTarget {
                conflict: conflict.id,
                radius: f64::from(core_radius) * scale * PICK_SLACK,
            },
        );

        let ring_material = Material::translucent(color, INNER_RING_OPACITY);
        let ring = self.spawn_part(group_i, graph, gpu, shared.inner_ring, ring_material, base)?;
        if let Some(material) = self.groups[group_i].materials.last().copied() {
            self.pulses.push(PulseEntry {
                conflict: conflict.id,
                phase: rng.random_range(0.0..TAU),
                node: ring,
                material,
                base_material: ring_material,
                base_transform: base,
            });
        }

        if highlighted {
            self.spawn_part(
                group_i,
                graph,
                gpu,
                shared.outer_ring,
                Material::translucent(HIGHLIGHT_COLOR, OUTER_RING_OPACITY),
                base,
            )?;
        }
        Ok(())
    }

    fn spawn_part(
        &mut self,
        group_i: usize,
        graph: &mut SceneGraph,
        gpu: &mut dyn GpuBackend,
        geometry: GeometryHandle,
        material: Material,
        transform: Transform,
    ) -> Result<NodeId, GpuError> {
        let material = gpu.create_material(&material)?;
        let node = graph.spawn(Layer::Markers);
        graph.set_transform(node, transform);
        graph.set_drawable(node, Drawable::new(geometry, material));
        let group = &mut self.groups[group_i];
        group.materials.push(material);
        group.nodes.push(node);
        Ok(node)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[MarkerGroup] {
        &self.groups
    }

    pub fn group(&self, conflict: ConflictId) -> Option<&MarkerGroup> {
        self.groups.iter().find(|g| g.conflict == conflict)
    }

    pub fn pulses(&self) -> &[PulseEntry] {
        &self.pulses
    }

    /// Advances every pulse to `time_s`.
    pub fn animate(
        &self,
        graph: &mut SceneGraph,
        gpu: &mut dyn GpuBackend,
        time_s: f64,
    ) -> Result<(), GpuError> {
        for pulse in &self.pulses {
            let (scale, opacity) = pulse.sample(time_s);
            graph.set_transform(pulse.node, pulse.base_transform.with_scale(scale));
            gpu.update_material(pulse.material, &pulse.base_material.with_opacity(opacity))?;
        }
        Ok(())
    }

    /// Shows matching groups, hides the rest; returns the matching ids in
    /// build order.
    pub fn apply_filter(&self, graph: &mut SceneGraph, filter: &MarkerFilter) -> Vec<ConflictId> {
        let mut matching = Vec::new();
        for group in &self.groups {
            let shown = filter.matches_text(&group.haystack);
            for node in &group.nodes {
                graph.set_visible(*node, shown);
            }
            if shown {
                matching.push(group.conflict);
            }
        }
        matching
    }

    /// Releases every owned material and scene node. Keeps going past
    /// failures and reports the first one.
    pub fn dispose(self, graph: &mut SceneGraph, gpu: &mut dyn GpuBackend) -> Result<(), GpuError> {
        let mut first_err = None;
        for group in self.groups {
            for node in group.nodes {
                graph.despawn(node);
            }
            for material in group.materials {
                if let Err(err) = gpu.release_material(material) {
                    first_err.get_or_insert(err);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Marker core colour for a conflict, as [`MarkerOverlay::build`] picks it.
pub fn marker_color(conflict: &GlobeConflict) -> Rgb {
    if conflict.has_frontlines {
        HIGHLIGHT_COLOR
    } else {
        type_color(&conflict.conflict_type)
    }
}

#[cfg(test)]
mod tests {
    use super::{MarkerFilter, MarkerOverlay, marker_color};
    use crate::symbology::{HIGHLIGHT_COLOR, type_color};
    use formats::records::{GlobeConflict, Intensity, Participant};
    use foundation::ids::ConflictId;
    use foundation::math::LatLng;
    use foundation::time::YearSpan;
    use gpu::{
        FrameSubmission, GeometryHandle, GpuBackend, GpuError, HeadlessBackend, Material,
        MaterialHandle, MeshData, SharedGeometries, SurfaceState,
    };
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use scene::SceneGraph;
    use std::f64::consts::TAU;

    fn conflict(id: u64, name: &str, kind: &str, has_frontlines: bool) -> GlobeConflict {
        GlobeConflict {
            id: ConflictId(id),
            name: name.to_string(),
            span: YearSpan::new(1990, 2000),
            position: LatLng::new(10.0 * id as f64, 20.0),
            conflict_type: kind.to_string(),
            intensity: Intensity::Medium,
            participants: vec![Participant {
                name: "Northern Rebels".to_string(),
                side: Some("a".to_string()),
            }],
            has_frontlines,
            frontline_id: has_frontlines.then_some(id),
        }
    }

    fn setup() -> (HeadlessBackend, SharedGeometries, SceneGraph) {
        let mut gpu = HeadlessBackend::new();
        let shared = SharedGeometries::create(&mut gpu).expect("shared");
        (gpu, shared, SceneGraph::new())
    }

    #[test]
    fn frontline_conflicts_get_the_highlight_treatment() {
        let (mut gpu, shared, mut graph) = setup();
        let conflicts = [
            conflict(1, "Plain", "civil_war", false),
            conflict(2, "Tracked", "civil_war", true),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let overlay =
            MarkerOverlay::build(&conflicts, &shared, &mut graph, &mut gpu, &mut rng).expect("build");

        let plain = overlay.group(ConflictId(1)).expect("plain");
        assert!(!plain.highlighted);
        assert_eq!(plain.nodes.len(), 2);
        let core = graph.drawable(plain.nodes[0]).expect("core");
        assert_eq!(core.geometry, shared.marker_core);
        assert_eq!(gpu.material(core.material).map(|m| m.color), Some(type_color("civil_war")));

        let tracked = overlay.group(ConflictId(2)).expect("tracked");
        assert!(tracked.highlighted);
        assert_eq!(tracked.nodes.len(), 3);
        let core = graph.drawable(tracked.nodes[0]).expect("core");
        assert_eq!(core.geometry, shared.large_core);
        assert_eq!(gpu.material(core.material).map(|m| m.color), Some(HIGHLIGHT_COLOR));
        let outer = graph.drawable(tracked.nodes[2]).expect("outer");
        assert_eq!(outer.geometry, shared.outer_ring);
        assert_eq!(marker_color(&conflicts[1]), HIGHLIGHT_COLOR);
    }

    #[test]
    fn dispose_releases_owned_resources_but_not_shared_geometry() {
        let (mut gpu, shared, mut graph) = setup();
        let conflicts = [
            conflict(1, "A", "interstate", false),
            conflict(2, "B", "coup", true),
        ];
        let mut rng = StdRng::seed_from_u64(2);
        let overlay =
            MarkerOverlay::build(&conflicts, &shared, &mut graph, &mut gpu, &mut rng).expect("build");
        assert_eq!(gpu.live_materials(), 5);
        assert_eq!(graph.node_count(), 5);
        assert_eq!(overlay.pulses().len(), 2);

        overlay.dispose(&mut graph, &mut gpu).expect("dispose");
        assert_eq!(gpu.live_materials(), 0);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(gpu.live_geometries(), 4);
        for handle in shared.handles() {
            assert!(gpu.geometry(handle).is_some());
        }
    }

    #[test]
    fn seeded_phases_are_reproducible_and_in_range() {
        let conflicts: Vec<_> = (1..=5).map(|i| conflict(i, "X", "coup", false)).collect();
        let phases = |seed| {
            let (mut gpu, shared, mut graph) = setup();
            let mut rng = StdRng::seed_from_u64(seed);
            let overlay = MarkerOverlay::build(&conflicts, &shared, &mut graph, &mut gpu, &mut rng)
                .expect("build");
            overlay.pulses().iter().map(|p| p.phase).collect::<Vec<_>>()
        };
        let a = phases(42);
        assert_eq!(a, phases(42));
        assert!(a.iter().all(|p| (0.0..TAU).contains(p)));
    }

    #[test]
    fn pulse_stays_within_its_envelope() {
        let (mut gpu, shared, mut graph) = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let overlay = MarkerOverlay::build(
            &[conflict(1, "A", "coup", false)],
            &shared,
            &mut graph,
            &mut gpu,
            &mut rng,
        )
        .expect("build");
        let pulse = overlay.pulses()[0].clone();
        for step in 0..50 {
            let t = step as f64 * 0.1;
            overlay.animate(&mut graph, &mut gpu, t).expect("animate");
            let scale = graph.transform(pulse.node).expect("ring").scale;
            assert!(scale > 0.8 && scale < 1.2, "scale {scale}");
            let opacity = gpu.material(pulse.material).expect("material").opacity;
            assert!(opacity > 0.0 && opacity <= pulse.base_material.opacity);
        }
    }

    #[test]
    fn filter_toggles_group_visibility() {
        let (mut gpu, shared, mut graph) = setup();
        let mut conflicts = vec![
            conflict(1, "Border War", "interstate", false),
            conflict(2, "Quiet Coup", "coup", false),
        ];
        conflicts[1].participants.clear();
        let mut rng = StdRng::seed_from_u64(4);
        let overlay =
            MarkerOverlay::build(&conflicts, &shared, &mut graph, &mut gpu, &mut rng).expect("build");

        let hits = overlay.apply_filter(&mut graph, &MarkerFilter::new("  REBELS "));
        assert_eq!(hits, vec![ConflictId(1)]);
        let hidden = overlay.group(ConflictId(2)).expect("group");
        assert!(hidden.nodes.iter().all(|n| !graph.is_visible(*n)));

        assert!(overlay.apply_filter(&mut graph, &MarkerFilter::new("nothing")).is_empty());
        let all = overlay.apply_filter(&mut graph, &MarkerFilter::new(""));
        assert_eq!(all.len(), 2);
        assert!(MarkerFilter::new("coup").matches(&conflicts[1]));
    }

    /// Refuses material creation after a fixed budget.
    struct BudgetBackend {
        inner: HeadlessBackend,
        materials_left: usize,
    }

    impl GpuBackend for BudgetBackend {
        fn upload_geometry(&mut self, mesh: &MeshData) -> Result<GeometryHandle, GpuError> {
            self.inner.upload_geometry(mesh)
        }
        fn release_geometry(&mut self, handle: GeometryHandle) -> Result<(), GpuError> {
            self.inner.release_geometry(handle)
        }
        fn create_material(&mut self, material: &Material) -> Result<MaterialHandle, GpuError> {
            if self.materials_left == 0 {
                return Err(GpuError::ContextLost);
            }
            self.materials_left -= 1;
            self.inner.create_material(material)
        }
        fn update_material(
            &mut self,
            handle: MaterialHandle,
            material: &Material,
        ) -> Result<(), GpuError> {
            self.inner.update_material(handle, material)
        }
        fn release_material(&mut self, handle: MaterialHandle) -> Result<(), GpuError> {
            self.inner.release_material(handle)
        }
        fn submit(&mut self, frame: &FrameSubmission) -> Result<(), GpuError> {
            self.inner.submit(frame)
        }
        fn surface_state(&self) -> SurfaceState {
            self.inner.surface_state()
        }
    }

    #[test]
    fn failed_build_leaves_nothing_behind() {
        let mut gpu = BudgetBackend {
            inner: HeadlessBackend::new(),
            materials_left: 3,
        };
        let shared = SharedGeometries::create(&mut gpu).expect("shared");
        let mut graph = SceneGraph::new();
        let conflicts = [conflict(1, "A", "coup", false), conflict(2, "B", "coup", false)];
        let mut rng = StdRng::seed_from_u64(5);

        let result = MarkerOverlay::build(&conflicts, &shared, &mut graph, &mut gpu, &mut rng);
        assert_eq!(result.err(), Some(GpuError::ContextLost));
        assert_eq!(gpu.inner.live_materials(), 0);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(gpu.inner.live_geometries(), 4);
    }

    #[test]
    fn invalid_positions_are_skipped() {
        let (mut gpu, shared, mut graph) = setup();
        let mut bad = conflict(1, "Nowhere", "coup", false);
        bad.position = LatLng::new(120.0, 0.0);
        let mut rng = StdRng::seed_from_u64(6);
        let overlay = MarkerOverlay::build(
            &[bad, conflict(2, "Somewhere", "coup", false)],
            &shared,
            &mut graph,
            &mut gpu,
            &mut rng,
        )
        .expect("build");
        assert_eq!(overlay.len(), 1);
        assert!(overlay.group(ConflictId(1)).is_none());
    }
}
