//! `GlobeViewer`: owns the scene and drives it one frame at a time.
//!
//! The host calls [`GlobeViewer::frame`] from its animation callback, forwards
//! pointer input, performs the fetches returned by
//! [`GlobeViewer::next_fetch`] and reports them back. Everything the UI needs
//! to react to comes out of [`GlobeViewer::drain_events`].

use std::sync::Arc;

use formats::borders::BorderAtlas;
use formats::features::FrontlineSnapshot;
use formats::records::{ConflictRecord, FrontlineRegistry, GlobeConflict, build_globe_conflicts};
use formats::topology::{CountryPolygon, DecodeReport, decode_countries_str};
use foundation::ids::ConflictId;
use foundation::math::{GLOBE_RADIUS, surface_point_to_lat_lng};
use foundation::time::Time;
use gpu::{GpuBackend, SharedGeometries, SurfaceContext, SurfaceState};
use layers::{BorderOverlay, FrontlineOverlay, GlobeBody, MarkerFilter, MarkerOverlay};
use rand::SeedableRng;
use rand::rngs::StdRng;
use runtime::{Debounce, EventBus, Frame, Stamped};
use scene::SceneGraph;
use scene::camera::Camera;
use scene::components::Layer;
use scene::picking::{Ray, intersect_globe, pick_marker};
use scene::render::Renderer;
use scene::spatial::CountryLocator;
use streaming::{Completion, FetchError, LoadState, Pipeline, Request};
use tracing::{debug, info, warn};

use crate::animation::Animator;
use crate::config::GlobeConfig;
use crate::error::GlobeError;
use crate::events::{DataRequest, Dataset, FrontlineKey, GlobeEvent, NavigationTarget, Tooltip};
use crate::interaction::{PointerAction, PointerTracker};
use crate::state::{Dirty, FrontlineSelection, RenderState};
use crate::timeline::Timeline;

/// What a frame produced for the view state. Applied through the
/// input-facing paths after the frame is submitted.
#[derive(Debug, Default)]
struct FrameOutputs {
    resized: Option<(u32, u32)>,
    conflicts: Option<(i32, Arc<Vec<GlobeConflict>>)>,
    snapshot: Option<(FrontlineKey, Arc<FrontlineSnapshot>)>,
    year_steps: u32,
}

pub struct GlobeViewer<B: GpuBackend> {
    config: GlobeConfig,
    gpu: B,
    surface: SurfaceContext,
    graph: SceneGraph,
    camera: Camera,
    shared: SharedGeometries,
    body: GlobeBody,
    atlas: BorderAtlas,
    border_vintage: Option<i32>,
    borders: Option<BorderOverlay>,
    countries: Arc<[CountryPolygon]>,
    locator: CountryLocator,
    markers: Option<MarkerOverlay>,
    frontlines: Option<FrontlineOverlay>,
    registry: FrontlineRegistry,
    years: Pipeline<i32, Vec<GlobeConflict>>,
    frontline_data: Pipeline<FrontlineKey, FrontlineSnapshot>,
    state: RenderState,
    dirty: Dirty,
    animator: Animator,
    timeline: Timeline,
    pointer: PointerTracker,
    resize: Debounce<(u32, u32)>,
    hovered: Option<ConflictId>,
    rng: StdRng,
    events: EventBus<GlobeEvent>,
    frame: Frame,
    conflict_load: LoadState,
    frontline_load: LoadState,
}

impl<B: GpuBackend> GlobeViewer<B> {
    pub fn new(
        config: GlobeConfig,
        mut gpu: B,
        width: u32,
        height: u32,
        now: Time,
    ) -> Result<Self, GlobeError> {
        config.validate()?;
        if gpu.surface_state() == SurfaceState::Lost {
            return Err(GlobeError::SurfaceLost);
        }

        let mut graph = SceneGraph::new();
        let shared = SharedGeometries::create(&mut gpu)?;
        let body = match GlobeBody::build(&mut graph, &mut gpu) {
            Ok(body) => body,
            Err(err) => {
                if let Err(cleanup) = shared.release(&mut gpu) {
                    debug!(%cleanup, "shared geometry cleanup incomplete");
                }
                return Err(err.into());
            }
        };

        let surface = SurfaceContext::new(width, height);
        let animator = Animator::new(config.camera.clone());
        let camera = Camera::new(
            animator.distance(),
            config.camera.fov_y_deg.to_radians(),
            surface.aspect(),
        );
        let rng = match config.pulse_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let initial_year = config.timeline.initial_year;
        let countries: Arc<[CountryPolygon]> = Vec::new().into();

        let mut viewer = Self {
            gpu,
            surface,
            graph,
            camera,
            shared,
            body,
            atlas: BorderAtlas::new(),
            border_vintage: None,
            borders: None,
            locator: CountryLocator::new(&countries),
            countries,
            markers: None,
            frontlines: None,
            registry: FrontlineRegistry::default(),
            years: Pipeline::new(config.cache.years()),
            frontline_data: Pipeline::new(config.cache.frontlines()),
            state: RenderState::new(initial_year, (width.max(1), height.max(1))),
            dirty: Dirty::all(),
            animator,
            timeline: Timeline::new(&config.timeline),
            pointer: PointerTracker::new(config.interaction.drag_threshold_px),
            resize: Debounce::new(config.interaction.resize_debounce_s),
            hovered: None,
            rng,
            events: EventBus::new(),
            frame: Frame::first(now),
            conflict_load: LoadState::Idle,
            frontline_load: LoadState::Idle,
            config,
        };
        viewer.change_year(initial_year, now);
        info!(year = initial_year, width, height, "globe viewer ready");
        Ok(viewer)
    }

    // ----- per-frame loop -----

    /// Advances animation and data by one frame and submits it.
    ///
    /// Once the surface is lost every call returns [`GlobeError::SurfaceLost`].
    pub fn frame(&mut self, now: Time, dt_s: f64) -> Result<(), GlobeError> {
        if self.surface.is_lost() {
            return Err(GlobeError::SurfaceLost);
        }
        if self.gpu.surface_state() == SurfaceState::Lost {
            self.surface_lost();
            return Err(GlobeError::SurfaceLost);
        }
        self.frame = Frame::new(self.frame.index + 1, dt_s, now);
        let mut outputs = FrameOutputs::default();
        match self.run_frame(now, self.frame.dt_s, &mut outputs) {
            Err(GlobeError::SurfaceLost) => {
                self.surface_lost();
                Err(GlobeError::SurfaceLost)
            }
            result => {
                self.apply_frame_outputs(outputs, now);
                result
            }
        }
    }

    /// Reads the view state, never writes it.
    fn run_frame(
        &mut self,
        now: Time,
        dt_s: f64,
        outputs: &mut FrameOutputs,
    ) -> Result<(), GlobeError> {
        outputs.resized = self.resize.poll(now);
        outputs.conflicts = self.years.poll(now);
        outputs.snapshot = self.frontline_data.poll(now);

        self.animator.step(dt_s, self.pointer.is_dragging());
        self.graph.set_orientation(self.animator.orientation());
        self.camera.distance = self.animator.distance();

        self.sync_scene()?;
        if let Some(markers) = &self.markers {
            markers.animate(&mut self.graph, &mut self.gpu, now.0)?;
        }
        let submission = Renderer::collect(&self.graph, &self.camera);
        self.gpu.submit(&submission)?;

        outputs.year_steps = self.timeline.advance(dt_s);
        Ok(())
    }

    fn apply_frame_outputs(&mut self, outputs: FrameOutputs, now: Time) {
        if let Some((width, height)) = outputs.resized {
            self.apply_resize(width, height);
        }
        if let Some((year, conflicts)) = outputs.conflicts {
            self.deliver_conflicts(year, conflicts);
        }
        if let Some((key, snapshot)) = outputs.snapshot {
            self.deliver_snapshot(&key, snapshot);
        }
        self.emit_load_state(Dataset::Conflicts);
        self.emit_load_state(Dataset::Frontlines);

        // Playback goes through the same path as the scrubber.
        if outputs.year_steps > 0 {
            let next = self.timeline.step_year(self.state.year, outputs.year_steps);
            self.change_year(next, now);
        }
    }

    fn apply_resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.camera.aspect = self.surface.aspect();
        self.state.viewport = self.surface.size();
        debug!(width, height, "viewport resized");
    }

    /// Ignored unless `year` is still the selected year.
    fn deliver_conflicts(&mut self, year: i32, conflicts: Arc<Vec<GlobeConflict>>) {
        if year == self.state.year {
            self.state.set_conflicts(year, conflicts);
            self.dirty.markers = true;
        }
    }

    /// Ignored unless `key` is still the open frontline date.
    fn deliver_snapshot(&mut self, key: &FrontlineKey, snapshot: Arc<FrontlineSnapshot>) {
        if self.state.frontline.as_ref().map(FrontlineSelection::key).as_ref() == Some(key) {
            self.state.set_snapshot(Some(snapshot));
            self.dirty.frontlines = true;
        }
    }

    fn clear_snapshot(&mut self) {
        self.state.set_snapshot(None);
        self.dirty.frontlines = true;
    }

    fn sync_scene(&mut self) -> Result<(), GlobeError> {
        let dirty = std::mem::take(&mut self.dirty);
        if !dirty.any() {
            return Ok(());
        }
        if dirty.borders {
            self.sync_borders()?;
        }
        if dirty.markers {
            self.rebuild_markers()?;
        }
        if dirty.frontlines {
            self.rebuild_frontlines()?;
        }
        if dirty.filter || (dirty.markers && !self.state.filter.is_empty()) {
            self.apply_filter();
        }
        if dirty.layers {
            for layer in Layer::ALL {
                self.graph
                    .set_layer_visible(layer, self.state.layers.get(layer));
            }
        }
        Ok(())
    }

    fn sync_borders(&mut self) -> Result<(), GlobeError> {
        let Some((vintage, countries)) = self.atlas.for_year(self.state.year) else {
            return Ok(());
        };
        if self.border_vintage == Some(vintage) {
            return Ok(());
        }
        if let Some(old) = self.borders.take() {
            old.dispose(&mut self.graph, &mut self.gpu)?;
        }
        let overlay = BorderOverlay::build(&countries, &mut self.graph, &mut self.gpu)?;
        info!(vintage, countries = countries.len(), rings = overlay.ring_count(), "borders switched");
        self.locator = CountryLocator::new(&countries);
        self.countries = countries;
        self.border_vintage = Some(vintage);
        self.borders = Some(overlay);
        Ok(())
    }

    fn rebuild_markers(&mut self) -> Result<(), GlobeError> {
        if let Some(old) = self.markers.take() {
            old.dispose(&mut self.graph, &mut self.gpu)?;
        }
        self.hovered = None;
        let overlay = MarkerOverlay::build(
            &self.state.conflicts,
            &self.shared,
            &mut self.graph,
            &mut self.gpu,
            &mut self.rng,
        )?;
        debug!(year = ?self.state.conflicts_year, markers = overlay.len(), "markers rebuilt");
        self.markers = Some(overlay);
        Ok(())
    }

    fn rebuild_frontlines(&mut self) -> Result<(), GlobeError> {
        if let Some(old) = self.frontlines.take() {
            old.dispose(&mut self.graph, &mut self.gpu)?;
        }
        let legend = match self.state.snapshot.clone() {
            Some(snapshot) => {
                let overlay = FrontlineOverlay::build(&snapshot, &mut self.graph, &mut self.gpu)?;
                let legend = overlay.legend().to_vec();
                self.frontlines = Some(overlay);
                legend
            }
            None => Vec::new(),
        };
        self.emit(GlobeEvent::Legend(legend));
        Ok(())
    }

    fn apply_filter(&mut self) {
        let Some(markers) = &self.markers else {
            return;
        };
        let matches = markers.apply_filter(&mut self.graph, &self.state.filter);
        self.emit(GlobeEvent::FilterMatches(matches));
    }

    // ----- surface -----

    /// The drawing surface is gone for good: stop all per-frame work and
    /// notify the host once.
    pub fn surface_lost(&mut self) {
        if !self.surface.mark_lost() {
            return;
        }
        self.years.cancel_all();
        self.frontline_data.cancel_all();
        self.resize.cancel();
        self.pointer.cancel();
        warn!(frame = self.frame.index, "rendering surface lost; frame loop halted");
        self.emit(GlobeEvent::SurfaceLost);
    }

    pub fn is_halted(&self) -> bool {
        self.surface.is_lost()
    }

    /// Applied after the resize debounce elapses.
    pub fn resize(&mut self, width: u32, height: u32, now: Time) {
        if !self.is_halted() {
            self.resize.schedule(now, (width, height));
        }
    }

    // ----- data -----

    /// Decodes a border topology and registers it as the vintage effective
    /// from `year`.
    pub fn load_borders(&mut self, year: i32, topology: &str) -> Result<DecodeReport, GlobeError> {
        let decoded = decode_countries_str(topology)?;
        self.insert_borders(year, decoded.countries);
        Ok(decoded.report)
    }

    pub fn insert_borders(&mut self, year: i32, countries: Vec<CountryPolygon>) {
        self.atlas.insert(year, countries);
        self.border_vintage = None;
        self.dirty.borders = true;
    }

    /// Conflicts built after this call link to frontline datasets through it.
    pub fn set_frontline_registry(&mut self, registry: FrontlineRegistry) {
        self.registry = registry;
    }

    /// Next fetch the host should perform; year data first.
    pub fn next_fetch(&mut self) -> Option<DataRequest> {
        if self.is_halted() {
            return None;
        }
        if let Some(cmd) = self.years.next_fetch() {
            return Some(DataRequest::Conflicts {
                request: cmd.request,
                year: cmd.key,
            });
        }
        self.frontline_data
            .next_fetch()
            .map(|cmd| DataRequest::Frontlines {
                request: cmd.request,
                key: cmd.key,
            })
    }

    pub fn complete_conflicts(
        &mut self,
        request: Request,
        result: Result<Vec<ConflictRecord>, FetchError>,
    ) -> Completion<i32, Vec<GlobeConflict>> {
        let present_year = self.config.timeline.present_year;
        let registry = &self.registry;
        let completion = self.years.complete(request, result, |year, records| {
            Ok(build_globe_conflicts(&records, *year, present_year, registry))
        });
        if let Completion::Delivered(year, conflicts) = &completion {
            self.deliver_conflicts(*year, conflicts.clone());
        }
        self.emit_load_state(Dataset::Conflicts);
        completion
    }

    /// `payload` is the raw GeoJSON FeatureCollection for the key's date.
    pub fn complete_frontlines(
        &mut self,
        request: Request,
        result: Result<String, FetchError>,
    ) -> Completion<FrontlineKey, FrontlineSnapshot> {
        let completion = self.frontline_data.complete(request, result, |key, payload| {
            FrontlineSnapshot::from_geojson_str(&key.date, &payload)
                .map_err(|e| FetchError::Decode(e.to_string()))
        });
        if let Completion::Delivered(key, snapshot) = &completion {
            self.deliver_snapshot(key, snapshot.clone());
        }
        self.emit_load_state(Dataset::Frontlines);
        completion
    }

    // ----- timeline -----

    /// Scrubber input; clamped to the configured range.
    pub fn set_year(&mut self, year: i32, now: Time) {
        if self.is_halted() {
            return;
        }
        let year = self.timeline.clamp_year(year);
        self.timeline.restart_clock();
        self.change_year(year, now);
    }

    fn change_year(&mut self, year: i32, now: Time) {
        if self.years.selected() == Some(&year) {
            return;
        }
        let year_changed = self.state.year != year;
        self.state.year = year;
        self.dirty.borders = true;
        if year_changed {
            self.emit(GlobeEvent::YearChanged(year));
        }

        let (min, max) = self.timeline.range();
        let adjacent = [year - 1, year + 1]
            .into_iter()
            .filter(|y| (min..=max).contains(y))
            .collect();
        if let Some(conflicts) = self.years.select(year, adjacent, now) {
            self.deliver_conflicts(year, conflicts);
        }
        self.emit_load_state(Dataset::Conflicts);
    }

    pub fn play(&mut self) {
        self.timeline.play();
    }

    pub fn pause(&mut self) {
        self.timeline.pause();
    }

    pub fn toggle_play(&mut self) -> bool {
        if self.timeline.is_playing() {
            self.timeline.pause();
        } else {
            self.timeline.play();
        }
        self.timeline.is_playing()
    }

    /// Returns `false` for multipliers that are not configured.
    pub fn set_speed(&mut self, speed: f64) -> bool {
        self.timeline.set_speed(speed)
    }

    // ----- frontlines -----

    /// Opens a conflict's frontline dataset at its latest date.
    pub fn open_frontlines(&mut self, conflict: u64, dates: Vec<String>, now: Time) -> bool {
        let Some(latest) = dates.last().cloned() else {
            return false;
        };
        let same_conflict = self.state.frontline.as_ref().map(|s| s.conflict) == Some(conflict);
        self.state.frontline = Some(FrontlineSelection {
            conflict,
            dates,
            date: String::new(),
        });
        if !same_conflict {
            self.clear_snapshot();
        }
        self.select_frontline_date(&latest, now)
    }

    /// Returns `false` if no dataset is open or it has no such date.
    pub fn select_frontline_date(&mut self, date: &str, now: Time) -> bool {
        let Some(selection) = self.state.frontline.as_mut() else {
            return false;
        };
        if !selection.dates.iter().any(|d| d == date) {
            return false;
        }
        selection.date = date.to_string();
        let key = selection.key();
        let adjacent = selection.adjacent();
        if let Some(snapshot) = self.frontline_data.select(key.clone(), adjacent, now) {
            self.deliver_snapshot(&key, snapshot);
        }
        self.emit_load_state(Dataset::Frontlines);
        true
    }

    pub fn close_frontlines(&mut self) {
        self.frontline_data.cancel_all();
        self.state.frontline = None;
        self.clear_snapshot();
    }

    // ----- view controls -----

    pub fn set_layer_visible(&mut self, layer: Layer, visible: bool) {
        self.state.layers.set(layer, visible);
        self.dirty.layers = true;
    }

    pub fn set_filter(&mut self, query: &str) {
        self.state.filter = MarkerFilter::new(query);
        self.dirty.filter = true;
    }

    pub fn fly_to(&mut self, lat: f64, lng: f64, distance: Option<f64>) {
        self.animator.fly_to(lat, lng, distance);
    }

    pub fn reset_view(&mut self) {
        self.animator.reset();
    }

    /// Positive deltas zoom out.
    pub fn wheel(&mut self, delta: f64) {
        if !self.is_halted() {
            self.animator.wheel(delta);
        }
    }

    // ----- pointer -----

    pub fn pointer_down(&mut self, x_px: f64, y_px: f64) {
        if !self.is_halted() {
            self.pointer.down(x_px, y_px);
        }
    }

    pub fn pointer_move(&mut self, x_px: f64, y_px: f64) {
        if self.is_halted() {
            return;
        }
        match self.pointer.moved(x_px, y_px) {
            PointerAction::Drag { dx_px, dy_px } => {
                self.animator.drag(dx_px, dy_px);
                self.set_hovered(None, x_px, y_px);
            }
            PointerAction::Hover { x_px, y_px } => {
                let hit = self
                    .screen_ray(x_px, y_px)
                    .and_then(|ray| pick_marker(&self.graph, ray))
                    .map(|hit| hit.conflict);
                self.set_hovered(hit, x_px, y_px);
            }
            PointerAction::Click { .. } | PointerAction::None => {}
        }
    }

    /// Returns the navigation target if the release was a click on
    /// something.
    pub fn pointer_up(&mut self, x_px: f64, y_px: f64) -> Option<NavigationTarget> {
        if self.is_halted() {
            return None;
        }
        match self.pointer.up(x_px, y_px) {
            PointerAction::Click { x_px, y_px } => self.click(x_px, y_px),
            _ => None,
        }
    }

    pub fn pointer_leave(&mut self) {
        self.pointer.cancel();
        self.set_hovered(None, 0.0, 0.0);
    }

    /// Markers win over the globe surface; a surface hit is de-rotated into
    /// globe coordinates and resolved to a country.
    fn click(&mut self, x_px: f64, y_px: f64) -> Option<NavigationTarget> {
        let ray = self.screen_ray(x_px, y_px)?;
        let target = match pick_marker(&self.graph, ray) {
            Some(hit) => NavigationTarget::Conflict(hit.conflict),
            None => {
                let world = intersect_globe(ray, GLOBE_RADIUS)?;
                let local = self.graph.orientation().inverse_rotate(world);
                let at = surface_point_to_lat_lng(local);
                let country = self.locator.locate(&self.countries, [at.lng, at.lat])?;
                NavigationTarget::Country(country.id.clone())
            }
        };
        debug!(?target, "click");
        self.emit(GlobeEvent::Navigate(target.clone()));
        Some(target)
    }

    fn set_hovered(&mut self, conflict: Option<ConflictId>, x_px: f64, y_px: f64) {
        if self.hovered == conflict {
            return;
        }
        self.hovered = conflict;
        let tooltip = conflict.map(|id| Tooltip {
            conflict: id,
            name: self
                .state
                .conflicts
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            x_px,
            y_px,
        });
        self.emit(GlobeEvent::Tooltip(tooltip));
    }

    fn screen_ray(&self, x_px: f64, y_px: f64) -> Option<Ray> {
        let (width, height) = self.surface.size();
        self.camera
            .screen_ray(x_px, y_px, f64::from(width), f64::from(height))
    }

    // ----- events -----

    fn emit(&mut self, event: GlobeEvent) {
        self.events.emit(self.frame, event);
    }

    fn emit_load_state(&mut self, dataset: Dataset) {
        let (current, last) = match dataset {
            Dataset::Conflicts => (self.years.load_state().clone(), &mut self.conflict_load),
            Dataset::Frontlines => (
                self.frontline_data.load_state().clone(),
                &mut self.frontline_load,
            ),
        };
        if *last == current {
            return;
        }
        *last = current.clone();
        self.emit(GlobeEvent::LoadState {
            dataset,
            state: current,
        });
    }

    pub fn drain_events(&mut self) -> Vec<Stamped<GlobeEvent>> {
        self.events.drain()
    }

    // ----- accessors -----

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn gpu(&self) -> &B {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut B {
        &mut self.gpu
    }

    pub fn markers(&self) -> Option<&MarkerOverlay> {
        self.markers.as_ref()
    }

    pub fn frontlines(&self) -> Option<&FrontlineOverlay> {
        self.frontlines.as_ref()
    }

    pub fn border_vintage(&self) -> Option<i32> {
        self.border_vintage
    }

    pub fn countries(&self) -> &[CountryPolygon] {
        &self.countries
    }

    pub fn frame_index(&self) -> u64 {
        self.frame.index
    }

    pub fn conflict_cache_len(&self) -> usize {
        self.years.cache().len()
    }

    pub fn frontline_cache_len(&self) -> usize {
        self.frontline_data.cache().len()
    }

    /// Releases every overlay, the globe body and the shared marker geometry,
    /// cancels outstanding timers and fetches, and hands the backend back.
    pub fn teardown(mut self) -> B {
        self.years.cancel_all();
        self.frontline_data.cancel_all();
        self.resize.cancel();

        let mut failures = 0usize;
        if let Some(markers) = self.markers.take() {
            if let Err(err) = markers.dispose(&mut self.graph, &mut self.gpu) {
                warn!(%err, "marker teardown incomplete");
                failures += 1;
            }
        }
        if let Some(frontlines) = self.frontlines.take() {
            if let Err(err) = frontlines.dispose(&mut self.graph, &mut self.gpu) {
                warn!(%err, "frontline teardown incomplete");
                failures += 1;
            }
        }
        if let Some(borders) = self.borders.take() {
            if let Err(err) = borders.dispose(&mut self.graph, &mut self.gpu) {
                warn!(%err, "border teardown incomplete");
                failures += 1;
            }
        }
        if let Err(err) = self.body.dispose(&mut self.graph, &mut self.gpu) {
            warn!(%err, "globe body teardown incomplete");
            failures += 1;
        }
        if let Err(err) = self.shared.release(&mut self.gpu) {
            warn!(%err, "shared geometry teardown incomplete");
            failures += 1;
        }
        info!(frames = self.frame.index, failures, "globe viewer torn down");
        self.gpu
    }
}
