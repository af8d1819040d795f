//! Drives a full viewer against the headless backend.

use formats::records::{parse_conflict_records, parse_frontline_dates};
use foundation::ids::{ConflictId, CountryId};
use foundation::time::Time;
use globe::{
    DataRequest, Dataset, FrontlineKey, GlobeConfig, GlobeError, GlobeEvent, GlobeViewer,
    NavigationTarget,
};
use gpu::HeadlessBackend;
use pretty_assertions::assert_eq;
use streaming::{Completion, FetchError, LoadState};

const STEP: f64 = 1.0 / 60.0;

// One 20° square country with its corner at (0, 0).
const SQUARE: &str = r#"{
    "type": "Topology",
    "transform": { "scale": [1, 1], "translate": [0, 0] },
    "arcs": [[[0, 0], [20, 0], [0, 20], [-20, 0], [0, -20]]],
    "objects": {
        "countries": {
            "type": "GeometryCollection",
            "geometries": [
                { "type": "Polygon", "id": "SQ", "properties": { "name": "Square" }, "arcs": [[0]] }
            ]
        }
    }
}"#;

const CONFLICTS: &str = r#"[
    { "id": 1, "name": "Northern War", "start_date": "1985-01-01",
      "lat": 40.0, "lng": 100.0, "conflict_type": "interstate", "intensity": "high",
      "participants": [{ "name": "Aland" }] },
    { "id": 2, "name": "Southern Dispute", "start_date": "1991-06-01", "end_date": "1991-12-01",
      "lat": -30.0, "lng": -60.0 }
]"#;

const FRONTLINE: &str = r##"{
    "type": "FeatureCollection",
    "features": [
        { "type": "Feature", "properties": { "controlled_by": "North" },
          "geometry": { "type": "Polygon",
                        "coordinates": [[[30, 40], [32, 40], [32, 42], [30, 42], [30, 40]]] } },
        { "type": "Feature", "properties": { "controlled_by": "South", "color": "#00ff00" },
          "geometry": { "type": "LineString", "coordinates": [[30, 39], [32, 39]] } }
    ]
}"##;

fn config() -> GlobeConfig {
    let mut config = GlobeConfig {
        pulse_seed: Some(1),
        ..GlobeConfig::default()
    };
    config.timeline.min_year = 1990;
    config.timeline.max_year = 1992;
    config.timeline.initial_year = 1990;
    config.camera.auto_rotate = false;
    config
}

struct Harness {
    viewer: GlobeViewer<HeadlessBackend>,
    t: f64,
}

impl Harness {
    fn new(config: GlobeConfig) -> Self {
        let viewer = GlobeViewer::new(config, HeadlessBackend::new(), 800, 600, Time(0.0))
            .expect("viewer");
        Self { viewer, t: 0.0 }
    }

    fn now(&self) -> Time {
        Time(self.t)
    }

    fn run(&mut self, seconds: f64) {
        let frames = (seconds / STEP).round() as usize;
        for _ in 0..frames {
            self.t += STEP;
            self.viewer.frame(Time(self.t), STEP).expect("frame");
        }
    }

    /// Answers every queued conflict fetch from `CONFLICTS`.
    fn serve_conflicts(&mut self) -> Vec<i32> {
        let mut years = Vec::new();
        while let Some(request) = self.viewer.next_fetch() {
            match request {
                DataRequest::Conflicts { request, year } => {
                    years.push(year);
                    let records = parse_conflict_records(CONFLICTS)
                        .map(|parsed| parsed.records)
                        .map_err(|e| FetchError::Decode(e.to_string()));
                    self.viewer.complete_conflicts(request, records);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        years
    }

    fn events(&mut self) -> Vec<GlobeEvent> {
        self.viewer
            .drain_events()
            .into_iter()
            .map(|e| e.event)
            .collect()
    }

    fn click(&mut self, x_px: f64, y_px: f64) -> Option<NavigationTarget> {
        self.viewer.pointer_down(x_px, y_px);
        self.viewer.pointer_up(x_px, y_px)
    }
}

#[test]
fn initial_year_is_requested_after_the_debounce() {
    let mut h = Harness::new(config());
    assert!(h.viewer.next_fetch().is_none());
    h.run(0.5);
    match h.viewer.next_fetch() {
        Some(DataRequest::Conflicts { year, .. }) => assert_eq!(year, 1990),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn lost_backend_or_bad_config_refuses_to_start() {
    let mut gpu = HeadlessBackend::new();
    gpu.lose_context();
    assert!(matches!(
        GlobeViewer::new(config(), gpu, 800, 600, Time(0.0)),
        Err(GlobeError::SurfaceLost)
    ));

    let mut bad = config();
    bad.timeline.initial_year = 2000;
    assert!(matches!(
        GlobeViewer::new(bad, HeadlessBackend::new(), 800, 600, Time(0.0)),
        Err(GlobeError::Config(_))
    ));
}

#[test]
fn year_data_drives_the_markers() {
    let mut h = Harness::new(config());
    h.run(0.5);
    assert_eq!(h.serve_conflicts(), vec![1990]);
    h.run(STEP);
    let markers = h.viewer.markers().expect("markers");
    assert_eq!(markers.len(), 1);
    assert!(markers.group(ConflictId(1)).is_some());

    let events = h.events();
    assert!(events.contains(&GlobeEvent::LoadState {
        dataset: Dataset::Conflicts,
        state: LoadState::Loading,
    }));
    assert!(events.contains(&GlobeEvent::LoadState {
        dataset: Dataset::Conflicts,
        state: LoadState::Ready,
    }));

    h.viewer.set_year(1991, h.now());
    h.run(0.5);
    assert_eq!(h.serve_conflicts(), vec![1991]);
    h.run(STEP);
    assert_eq!(h.viewer.markers().map(|m| m.len()), Some(2));
    assert!(h.events().contains(&GlobeEvent::YearChanged(1991)));

    // Back to a cached year: no fetch, markers swap on the next frame.
    h.viewer.set_year(1990, h.now());
    assert!(h.viewer.next_fetch().is_none());
    h.run(STEP);
    assert_eq!(h.viewer.markers().map(|m| m.len()), Some(1));
    assert_eq!(h.viewer.conflict_cache_len(), 2);
}

#[test]
fn late_answer_for_an_abandoned_year_is_dropped() {
    let mut h = Harness::new(config());
    h.run(0.5);
    let Some(DataRequest::Conflicts { request: first, year: 1990 }) = h.viewer.next_fetch() else {
        panic!("expected the 1990 fetch");
    };

    h.viewer.set_year(1991, h.now());
    h.run(0.5);
    let Some(DataRequest::Conflicts { request: second, year: 1991 }) = h.viewer.next_fetch() else {
        panic!("expected the 1991 fetch");
    };

    let records = parse_conflict_records(CONFLICTS).expect("records").records;
    let late = h.viewer.complete_conflicts(first, Ok(records.clone()));
    assert!(matches!(late, Completion::Stale));
    assert_eq!(h.viewer.state().conflicts_year, None);
    assert_eq!(h.viewer.conflict_cache_len(), 0);

    let current = h.viewer.complete_conflicts(second, Ok(records));
    assert!(matches!(current, Completion::Delivered(1991, _)));
    h.run(STEP);
    assert_eq!(h.viewer.state().conflicts_year, Some(1991));
    assert_eq!(h.viewer.markers().map(|m| m.len()), Some(2));
    assert_eq!(h.viewer.conflict_cache_len(), 1);

    // 1990 never reached the cache, so going back fetches it again.
    h.viewer.set_year(1990, h.now());
    h.run(0.5);
    assert!(matches!(
        h.viewer.next_fetch(),
        Some(DataRequest::Conflicts { year: 1990, .. })
    ));
}

#[test]
fn failed_fetch_is_reported_and_leaves_markers_alone() {
    let mut h = Harness::new(config());
    h.run(0.5);
    let Some(DataRequest::Conflicts { request, .. }) = h.viewer.next_fetch() else {
        panic!("expected a conflict fetch");
    };
    let completion = h
        .viewer
        .complete_conflicts(request, Err(FetchError::Status(503)));
    assert!(matches!(completion, Completion::Failed(FetchError::Status(503))));
    assert!(h.events().iter().any(|e| matches!(
        e,
        GlobeEvent::LoadState { dataset: Dataset::Conflicts, state: LoadState::Failed(_) }
    )));
    h.run(STEP);
    assert_eq!(h.viewer.markers().map(|m| m.len()), Some(0));
}

#[test]
fn playback_wraps_through_the_range() {
    let mut h = Harness::new(config());
    h.events();
    h.viewer.play();
    h.run(4.5);
    let years: Vec<i32> = h
        .events()
        .into_iter()
        .filter_map(|e| match e {
            GlobeEvent::YearChanged(y) => Some(y),
            _ => None,
        })
        .collect();
    assert_eq!(years, vec![1991, 1992, 1990, 1991]);

    assert!(!h.viewer.toggle_play());
    h.run(2.0);
    assert_eq!(h.viewer.state().year, 1991);
}

#[test]
fn clicks_resolve_countries_then_markers() {
    let mut h = Harness::new(config());
    let report = h.viewer.load_borders(1990, SQUARE).expect("borders");
    assert_eq!(report.skipped_records, 0);

    h.viewer.fly_to(10.0, 10.0, None);
    h.run(5.0);
    assert_eq!(h.viewer.border_vintage(), Some(1990));
    assert_eq!(
        h.click(400.0, 300.0),
        Some(NavigationTarget::Country(CountryId::new("SQ")))
    );
    // Off the globe entirely.
    assert_eq!(h.click(0.0, 0.0), None);

    h.serve_conflicts();
    h.viewer.fly_to(40.0, 100.0, None);
    h.run(5.0);
    assert_eq!(
        h.click(400.0, 300.0),
        Some(NavigationTarget::Conflict(ConflictId(1)))
    );
    assert!(h
        .events()
        .contains(&GlobeEvent::Navigate(NavigationTarget::Conflict(ConflictId(1)))));

    // Open ocean with no country or marker under the pointer.
    h.viewer.fly_to(-45.0, -150.0, None);
    h.run(5.0);
    assert_eq!(h.click(400.0, 300.0), None);
}

#[test]
fn hovering_a_marker_shows_and_hides_the_tooltip() {
    let mut h = Harness::new(config());
    h.run(0.5);
    h.serve_conflicts();
    h.viewer.fly_to(40.0, 100.0, None);
    h.run(5.0);
    h.events();

    h.viewer.pointer_move(400.0, 300.0);
    h.viewer.pointer_move(401.0, 300.0);
    h.viewer.pointer_move(0.0, 0.0);
    h.viewer.pointer_move(400.0, 300.0);
    h.viewer.pointer_leave();
    let tooltips: Vec<_> = h
        .events()
        .into_iter()
        .filter_map(|e| match e {
            GlobeEvent::Tooltip(t) => Some(t.map(|t| (t.conflict, t.name))),
            _ => None,
        })
        .collect();
    let northern = Some((ConflictId(1), "Northern War".to_string()));
    assert_eq!(tooltips, vec![northern.clone(), None, northern, None]);
}

#[test]
fn drag_rotates_without_clicking() {
    let mut h = Harness::new(config());
    let before = h.viewer.animator().orientation();
    h.viewer.pointer_down(400.0, 300.0);
    h.viewer.pointer_move(460.0, 300.0);
    assert_eq!(h.viewer.pointer_up(460.0, 300.0), None);
    assert_ne!(h.viewer.animator().orientation(), before);

    h.viewer.wheel(500.0);
    h.run(2.0);
    assert!(h.viewer.camera().distance > 3.0);
    h.viewer.reset_view();
    h.run(3.0);
    assert!((h.viewer.camera().distance - 3.0).abs() < 1e-9);
    assert!(h.viewer.animator().is_auto_rotating());
}

#[test]
fn filter_hides_markers_and_reports_matches() {
    let mut config = config();
    config.timeline.initial_year = 1991;
    let mut h = Harness::new(config);
    h.run(0.5);
    h.serve_conflicts();
    h.run(STEP);
    h.events();

    h.viewer.set_filter("  ALAND ");
    h.run(STEP);
    assert!(h
        .events()
        .contains(&GlobeEvent::FilterMatches(vec![ConflictId(1)])));
    let markers = h.viewer.markers().expect("markers");
    let hidden = markers.group(ConflictId(2)).and_then(|g| g.core()).expect("core");
    let shown = markers.group(ConflictId(1)).and_then(|g| g.core()).expect("core");
    assert!(!h.viewer.graph().is_visible(hidden));
    assert!(h.viewer.graph().is_visible(shown));

    h.viewer.set_filter("");
    h.run(STEP);
    assert!(h
        .events()
        .contains(&GlobeEvent::FilterMatches(vec![ConflictId(1), ConflictId(2)])));
}

#[test]
fn frontlines_load_switch_and_close() {
    let mut h = Harness::new(config());
    let dates = parse_frontline_dates(r#"[{ "date": "2022-02-01" }, { "date": "2022-01-01" }]"#)
        .expect("dates");
    assert!(h.viewer.open_frontlines(9, dates, h.now()));

    let Some(DataRequest::Frontlines { request, key }) = h.viewer.next_fetch() else {
        panic!("expected a frontline fetch");
    };
    assert_eq!(key, FrontlineKey::new(9, "2022-02-01"));
    let completion = h.viewer.complete_frontlines(request, Ok(FRONTLINE.to_string()));
    assert!(matches!(completion, Completion::Delivered(..)));
    h.run(STEP);
    let overlay = h.viewer.frontlines().expect("overlay");
    assert_eq!(overlay.date(), "2022-02-01");
    assert_eq!(overlay.legend().len(), 2);
    assert!(h
        .events()
        .iter()
        .any(|e| matches!(e, GlobeEvent::Legend(l) if l.len() == 2)));

    // A failed date keeps the last good overlay on screen.
    assert!(h.viewer.select_frontline_date("2022-01-01", h.now()));
    let Some(DataRequest::Frontlines { request, key }) = h.viewer.next_fetch() else {
        panic!("expected a frontline fetch");
    };
    assert_eq!(key.date, "2022-01-01");
    let completion = h
        .viewer
        .complete_frontlines(request, Ok("{ not json".to_string()));
    assert!(matches!(completion, Completion::Failed(FetchError::Decode(_))));
    h.run(STEP);
    assert_eq!(h.viewer.frontlines().map(|f| f.date()), Some("2022-02-01"));

    assert!(!h.viewer.select_frontline_date("1999-01-01", h.now()));
    assert_eq!(h.viewer.frontline_cache_len(), 1);

    h.viewer.close_frontlines();
    h.run(STEP);
    assert!(h.viewer.frontlines().is_none());
    assert!(h.events().contains(&GlobeEvent::Legend(Vec::new())));
}

#[test]
fn resize_is_debounced() {
    let mut h = Harness::new(config());
    h.viewer.resize(1000, 500, h.now());
    h.run(0.1);
    assert_eq!(h.viewer.state().viewport, (800, 600));
    h.run(0.2);
    assert_eq!(h.viewer.state().viewport, (1000, 500));
    assert_eq!(h.viewer.camera().aspect, 2.0);
}

#[test]
fn surface_loss_halts_once_and_teardown_releases_everything() {
    let mut h = Harness::new(config());
    h.viewer.load_borders(1990, SQUARE).expect("borders");
    h.run(0.5);
    h.serve_conflicts();
    h.run(STEP);
    assert!(h.viewer.gpu().live_geometries() > 0);
    let submitted = h.viewer.gpu().frames_submitted();

    h.viewer.gpu_mut().lose_context();
    for _ in 0..2 {
        h.t += STEP;
        assert!(matches!(
            h.viewer.frame(Time(h.t), STEP),
            Err(GlobeError::SurfaceLost)
        ));
    }
    h.viewer.surface_lost();
    assert!(h.viewer.is_halted());
    assert!(h.viewer.next_fetch().is_none());
    assert_eq!(h.click(400.0, 300.0), None);
    assert_eq!(h.viewer.gpu().frames_submitted(), submitted);
    let lost = h
        .events()
        .into_iter()
        .filter(|e| *e == GlobeEvent::SurfaceLost)
        .count();
    assert_eq!(lost, 1);

    let gpu = h.viewer.teardown();
    assert_eq!(gpu.live_geometries(), 0);
    assert_eq!(gpu.live_materials(), 0);
}

#[test]
fn teardown_without_loss_releases_everything() {
    let mut h = Harness::new(config());
    h.run(0.5);
    h.serve_conflicts();
    assert!(h.viewer.open_frontlines(9, vec!["2022-02-01".to_string()], h.now()));
    if let Some(DataRequest::Frontlines { request, .. }) = h.viewer.next_fetch() {
        h.viewer.complete_frontlines(request, Ok(FRONTLINE.to_string()));
    }
    h.run(STEP);
    assert!(h.viewer.frontlines().is_some());

    let gpu = h.viewer.teardown();
    assert_eq!(gpu.live_geometries(), 0);
    assert_eq!(gpu.live_materials(), 0);
}
