use std::cell::RefCell;

use gloo_net::http::Request;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use foundation::ids::FrameId;
use formats::{PointCloud, PoseLoad, SearchHit};
use gpu::collect_render_frame;
use runtime::debounce::Debouncer;
use runtime::sequence::SearchSequence;
use runtime::status::{StatusBus, StatusRegion};
use scene::highlight::{apply_search_results, reset_highlight};
use scene::intrinsics::DEFAULT_FRUSTUM_SCALE;
use scene::{
    Frustum, FrustumGeometry, FrustumRegistry, HighlightPalette, HoverState, PinholeIntrinsics,
};
use settings::{
    InMemorySettingsStore, LocalStorageSettingsStore, SettingsStore, THEME_STORAGE_KEY,
    ThemePreference,
};

mod orbit_controller;
use orbit_controller::OrbitController;

mod wgpu;
use wgpu::{SceneVertex, WgpuContext};

/// Quiet window between keystrokes before a search is issued.
const SEARCH_DEBOUNCE_MS: f64 = 300.0;

const CANVAS_ID: &str = "viewer-canvas";
const RESULT_GRID_ID: &str = "search-results";

#[derive(Debug)]
enum ViewerSettingsStore {
    Local(LocalStorageSettingsStore),
    Memory(InMemorySettingsStore),
}

impl ViewerSettingsStore {
    fn new() -> Self {
        match LocalStorageSettingsStore::new(THEME_STORAGE_KEY) {
            Ok(s) => ViewerSettingsStore::Local(s),
            Err(_) => ViewerSettingsStore::Memory(InMemorySettingsStore::new()),
        }
    }
}

impl SettingsStore for ViewerSettingsStore {
    fn load_theme(&self) -> Result<Option<ThemePreference>, settings::SettingsError> {
        match self {
            ViewerSettingsStore::Local(s) => s.load_theme(),
            ViewerSettingsStore::Memory(s) => s.load_theme(),
        }
    }

    fn save_theme(&mut self, theme: ThemePreference) -> Result<(), settings::SettingsError> {
        match self {
            ViewerSettingsStore::Local(s) => s.save_theme(theme),
            ViewerSettingsStore::Memory(s) => s.save_theme(theme),
        }
    }
}

struct ViewerState {
    registry: FrustumRegistry,
    hover: HoverState,
    palette: HighlightPalette,
    point_cloud: Option<PointCloud>,
    debouncer: Debouncer<String>,
    sequence: SearchSequence,
    status: StatusBus,
    theme: ThemePreference,
    settings: ViewerSettingsStore,
    controller: OrbitController,
    wgpu: Option<WgpuContext>,
    canvas_width: f64,
    canvas_height: f64,
    last_tick_ms: Option<f64>,
    scene_dirty: bool,
    /// Keeps result-card event closures alive until the grid is rebuilt.
    card_closures: Vec<Closure<dyn FnMut()>>,
}

impl ViewerState {
    fn new() -> Self {
        Self {
            registry: FrustumRegistry::new(),
            hover: HoverState::new(),
            palette: HighlightPalette::default(),
            point_cloud: None,
            debouncer: Debouncer::trailing(SEARCH_DEBOUNCE_MS),
            sequence: SearchSequence::new(),
            status: StatusBus::new(),
            theme: ThemePreference::default(),
            settings: ViewerSettingsStore::new(),
            controller: OrbitController::new(),
            wgpu: None,
            canvas_width: 1280.0,
            canvas_height: 720.0,
            last_tick_ms: None,
            scene_dirty: false,
            card_closures: Vec::new(),
        }
    }
}

thread_local! {
    static STATE: RefCell<ViewerState> = RefCell::new(ViewerState::new());
}

/// Safe TLS access helper that returns a default on teardown instead of
/// panicking.
fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&RefCell<ViewerState>) -> R,
    R: Default,
{
    STATE.try_with(f).unwrap_or_default()
}

fn scene_clear_color(theme: ThemePreference) -> ::wgpu::Color {
    if theme.is_dark() {
        ::wgpu::Color {
            r: 0.02,
            g: 0.02,
            b: 0.035,
            a: 1.0,
        }
    } else {
        ::wgpu::Color {
            r: 0.93,
            g: 0.94,
            b: 0.96,
            a: 1.0,
        }
    }
}

fn status_element_id(region: StatusRegion) -> &'static str {
    match region {
        StatusRegion::SearchResults => "search-status",
        StatusRegion::Viewer => "viewer-status",
    }
}

fn console_warn(msg: &str) {
    web_sys::console::warn_1(&JsValue::from_str(msg));
}

fn console_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    Ok(())
}

/// One-time startup: theme, 3D context, and the two data loads.
#[wasm_bindgen]
pub fn init_viewer() {
    let theme = with_state(|state| {
        let mut s = state.borrow_mut();
        if let Ok(Some(stored)) = s.settings.load_theme() {
            s.theme = stored;
        }
        s.theme
    });
    if let Err(err) = apply_theme_to_document(theme) {
        console_warn(&format!("theme init error: {:?}", err));
    }

    spawn_local(async move {
        if let Err(err) = init_wgpu_inner().await {
            console_error(&format!("wgpu init error: {:?}", err));
            with_state(|state| {
                state
                    .borrow_mut()
                    .status
                    .set(StatusRegion::Viewer, "3D view unavailable");
            });
        }
    });

    load_point_cloud();
    load_frustums();
}

async fn init_wgpu_inner() -> Result<(), JsValue> {
    let mut ctx = wgpu::init_wgpu_from_canvas_id(CANVAS_ID).await?;
    let theme = with_state(|state| state.borrow().theme);
    wgpu::set_clear_color(&mut ctx, scene_clear_color(theme));

    with_state(|state| {
        let mut s = state.borrow_mut();
        s.wgpu = Some(ctx);
        s.scene_dirty = true;
    });
    render_scene()
}

/// Per-frame tick, driven by requestAnimationFrame.
///
/// Polls the search debouncer, updates the camera damping state, flushes
/// status text, re-uploads scene buffers when highlight state changed, and
/// renders. Errors are contained per step so the loop never stops.
#[wasm_bindgen]
pub fn advance_frame(now_ms: f64) -> Result<(), JsValue> {
    if let Some(term) = with_state(|state| state.borrow_mut().debouncer.poll(now_ms)) {
        start_search(term);
    }

    with_state(|state| {
        let mut s = state.borrow_mut();
        let dt = match s.last_tick_ms {
            Some(prev) => ((now_ms - prev) / 1000.0).clamp(0.0, 0.1),
            None => 1.0 / 60.0,
        };
        s.last_tick_ms = Some(now_ms);
        s.controller.update(dt);
    });

    if let Err(err) = flush_status() {
        console_warn(&format!("status flush error: {:?}", err));
    }
    sync_scene_buffers();
    render_scene()
}

#[wasm_bindgen]
pub fn resize_viewer(width: f64, height: f64) {
    with_state(|state| {
        let mut s = state.borrow_mut();
        s.canvas_width = width;
        s.canvas_height = height;
        if let Some(ctx) = &mut s.wgpu {
            wgpu::resize_wgpu(ctx, width as u32, height as u32);
        }
    });
    let _ = render_scene();
}

/// Orbit the camera. Intended usage: call with pointer delta in pixels.
#[wasm_bindgen]
pub fn camera_orbit(delta_x_px: f64, delta_y_px: f64) -> Result<(), JsValue> {
    with_state(|state| {
        state.borrow_mut().controller.orbit(delta_x_px, delta_y_px);
    });
    render_scene()
}

/// Pan the camera target. Intended usage: call with pointer delta in pixels.
#[wasm_bindgen]
pub fn camera_pan(delta_x_px: f64, delta_y_px: f64) -> Result<(), JsValue> {
    with_state(|state| {
        state.borrow_mut().controller.pan(delta_x_px, delta_y_px);
    });
    render_scene()
}

/// Zoom (dolly) in/out. Intended usage: call with wheel deltaY.
#[wasm_bindgen]
pub fn camera_zoom(wheel_delta_y: f64) -> Result<(), JsValue> {
    with_state(|state| {
        state.borrow_mut().controller.zoom(wheel_delta_y);
    });
    render_scene()
}

/// Keystroke entry point for the search box; the debouncer collapses bursts
/// so only the last keystroke in the window issues a request.
#[wasm_bindgen]
pub fn on_search_input(value: String) {
    let now_ms = js_sys::Date::now();
    if let Some(term) = with_state(|state| state.borrow_mut().debouncer.submit(now_ms, value)) {
        start_search(term);
    }
}

#[wasm_bindgen]
pub fn toggle_theme() -> Result<(), JsValue> {
    let next = with_state(|state| {
        let mut s = state.borrow_mut();
        let next = s.theme.toggled();
        s.theme = next;
        if let Err(err) = s.settings.save_theme(next) {
            console_warn(&format!("failed to persist theme: {err}"));
        }
        next
    });
    apply_theme_to_document(next)
}

fn apply_theme_to_document(theme: ThemePreference) -> Result<(), JsValue> {
    let document = document()?;
    if let Some(body) = document.body() {
        body.class_list()
            .toggle_with_force("dark-mode", theme.is_dark())?;
    }

    with_state(|state| {
        let mut s = state.borrow_mut();
        if let Some(ctx) = &mut s.wgpu {
            wgpu::set_clear_color(ctx, scene_clear_color(theme));
        }
    });
    render_scene()
}

fn start_search(raw_term: String) {
    let term = raw_term.trim().to_string();

    if term.is_empty() {
        with_state(|state| {
            let mut s = state.borrow_mut();
            let palette = s.palette;
            let ViewerState {
                registry,
                hover,
                status,
                scene_dirty,
                ..
            } = &mut *s;
            hover.leave(registry);
            reset_highlight(registry, &palette);
            status.clear(StatusRegion::SearchResults);
            *scene_dirty = true;
        });
        if let Err(err) = clear_result_grid() {
            console_warn(&format!("failed to clear result grid: {:?}", err));
        }
        return;
    }

    let Some(generation) = with_state(|state| Some(state.borrow_mut().sequence.issue())) else {
        return;
    };

    spawn_local(async move {
        let outcome = fetch_search(&term).await;

        // A newer search was issued while this one was in flight; its
        // response must not touch the DOM or the highlight state.
        if !with_state(|state| state.borrow().sequence.is_latest(generation)) {
            return;
        }

        match outcome {
            Ok(hits) => {
                with_state(|state| {
                    let mut s = state.borrow_mut();
                    let palette = s.palette;
                    let pairs: Vec<(FrameId, f64)> = hits
                        .iter()
                        .map(|hit| (hit.frame_id.clone(), hit.score))
                        .collect();
                    let ViewerState {
                        registry,
                        hover,
                        status,
                        scene_dirty,
                        ..
                    } = &mut *s;
                    hover.leave(registry);
                    apply_search_results(registry, &pairs, &palette);
                    status.clear(StatusRegion::SearchResults);
                    *scene_dirty = true;
                });
                if let Err(err) = rebuild_result_grid(&hits) {
                    console_error(&format!("failed to build result grid: {:?}", err));
                }
            }
            Err(msg) => {
                // Observed behavior: a failed search leaves the previous
                // highlight in place; only the result area reports it.
                console_warn(&format!("search '{term}' failed: {msg}"));
                with_state(|state| {
                    state
                        .borrow_mut()
                        .status
                        .set(StatusRegion::SearchResults, format!("Search failed: {msg}"));
                });
            }
        }
    });
}

fn load_frustums() {
    spawn_local(async move {
        match fetch_frame_poses().await {
            Ok(load) => {
                if load.skipped > 0 {
                    console_warn(&format!(
                        "skipped {} malformed pose records",
                        load.skipped
                    ));
                }
                with_state(|state| {
                    let mut s = state.borrow_mut();
                    let intrinsics = PinholeIntrinsics::default();
                    let default_color = s.palette.default_color;
                    for record in &load.records {
                        let cam_to_world = record.world_to_cam().inverse();
                        let geometry = FrustumGeometry::from_pose(
                            &intrinsics,
                            &cam_to_world,
                            DEFAULT_FRUSTUM_SCALE,
                        );
                        s.registry
                            .insert(&record.image_id, Frustum::new(geometry, default_color));
                    }
                    s.scene_dirty = true;
                });
            }
            Err(msg) => {
                console_error(&format!("pose fetch failed: {msg}"));
                with_state(|state| {
                    state.borrow_mut().status.set(
                        StatusRegion::Viewer,
                        format!("Failed to load camera poses: {msg}"),
                    );
                });
            }
        }
    });
}

fn load_point_cloud() {
    spawn_local(async move {
        match fetch_point_cloud().await {
            Ok(mut cloud) => {
                cloud.recenter();
                with_state(|state| {
                    let mut s = state.borrow_mut();
                    s.point_cloud = Some(cloud);
                    s.scene_dirty = true;
                });
            }
            Err(msg) => {
                console_error(&format!("point cloud fetch failed: {msg}"));
                with_state(|state| {
                    state.borrow_mut().status.set(
                        StatusRegion::Viewer,
                        format!("Failed to load point cloud: {msg}"),
                    );
                });
            }
        }
    });
}

fn hover_enter(key: &str) {
    with_state(|state| {
        let mut s = state.borrow_mut();
        let hover_color = s.palette.hover;
        let ViewerState {
            registry,
            hover,
            scene_dirty,
            ..
        } = &mut *s;
        hover.enter(registry, key, hover_color);
        *scene_dirty = true;
    });
}

fn hover_leave() {
    with_state(|state| {
        let mut s = state.borrow_mut();
        let ViewerState {
            registry,
            hover,
            scene_dirty,
            ..
        } = &mut *s;
        hover.leave(registry);
        *scene_dirty = true;
    });
}

fn sync_scene_buffers() {
    with_state(|state| {
        let mut s = state.borrow_mut();
        if !s.scene_dirty {
            return;
        }
        let ViewerState {
            registry,
            point_cloud,
            wgpu: wgpu_ctx,
            scene_dirty,
            ..
        } = &mut *s;
        // Stay dirty until the context exists; startup loads can finish first.
        let Some(ctx) = wgpu_ctx else { return };

        let frame = collect_render_frame(point_cloud.as_ref(), registry);
        let points: Vec<SceneVertex> = frame
            .points
            .positions
            .iter()
            .zip(&frame.points.colors)
            .map(|(p, c)| SceneVertex {
                position: *p,
                color: *c,
            })
            .collect();
        let lines: Vec<SceneVertex> = frame
            .lines
            .positions
            .iter()
            .zip(&frame.lines.colors)
            .map(|(p, c)| SceneVertex {
                position: *p,
                color: *c,
            })
            .collect();

        wgpu::set_point_vertices(ctx, &points);
        wgpu::set_line_vertices(ctx, &lines);
        *scene_dirty = false;
    });
}

fn render_scene() -> Result<(), JsValue> {
    with_state(|state| {
        let s = state.borrow();
        if let Some(ctx) = &s.wgpu {
            let view_proj = s.controller.view_proj(s.canvas_width, s.canvas_height);
            let _ = wgpu::render(ctx, view_proj);
        }
    });
    Ok(())
}

fn flush_status() -> Result<(), JsValue> {
    let changes: Vec<(&'static str, Option<String>)> = with_state(|state| {
        let mut s = state.borrow_mut();
        [StatusRegion::SearchResults, StatusRegion::Viewer]
            .into_iter()
            .filter_map(|region| {
                s.status
                    .take_change(region)
                    .map(|message| (status_element_id(region), message))
            })
            .collect()
    });
    if changes.is_empty() {
        return Ok(());
    }

    let document = document()?;
    for (element_id, message) in changes {
        if let Some(element) = document.get_element_by_id(element_id) {
            element.set_text_content(message.as_deref());
        }
    }
    Ok(())
}

// ── DOM: result grid ────────────────────────────────────────────────────────

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn clear_result_grid() -> Result<(), JsValue> {
    let document = document()?;
    if let Some(grid) = document.get_element_by_id(RESULT_GRID_ID) {
        grid.set_inner_html("");
    }
    with_state(|state| state.borrow_mut().card_closures.clear());
    Ok(())
}

/// Rebuild the grid: one card per hit, in server order. A broken frame image
/// degrades only its own card; hover highlights the matching frustum.
fn rebuild_result_grid(hits: &[SearchHit]) -> Result<(), JsValue> {
    let document = document()?;
    let grid = document
        .get_element_by_id(RESULT_GRID_ID)
        .ok_or_else(|| JsValue::from_str("missing search-results element"))?;
    grid.set_inner_html("");

    let mut closures: Vec<Closure<dyn FnMut()>> = Vec::with_capacity(hits.len() * 3);
    for hit in hits {
        let key = hit.frame_id.as_str().to_string();

        let card = document.create_element("div")?;
        card.set_class_name("result-card");

        let img = document
            .create_element("img")?
            .dyn_into::<web_sys::HtmlImageElement>()?;
        img.set_src(&format!("/frame/{}", hit.frame_id));
        img.set_alt(&format!("frame {}", hit.frame_id));

        let fallback_card = card.clone();
        let fallback_key = key.clone();
        let onerror = Closure::<dyn FnMut()>::new(move || {
            fallback_card.set_inner_html("");
            fallback_card
                .set_text_content(Some(&format!("frame {fallback_key}: image unavailable")));
            let _ = fallback_card.class_list().add_1("result-card-error");
        });
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        closures.push(onerror);

        let caption = document.create_element("div")?;
        caption.set_class_name("result-caption");
        caption.set_text_content(Some(&format!("frame {} ({:.3})", hit.frame_id, hit.score)));

        card.append_child(&img)?;
        card.append_child(&caption)?;

        let enter_key = key.clone();
        let enter = Closure::<dyn FnMut()>::new(move || hover_enter(&enter_key));
        card.add_event_listener_with_callback("mouseenter", enter.as_ref().unchecked_ref())?;
        closures.push(enter);

        let leave = Closure::<dyn FnMut()>::new(move || hover_leave());
        card.add_event_listener_with_callback("mouseleave", leave.as_ref().unchecked_ref())?;
        closures.push(leave);

        grid.append_child(&card)?;
    }

    // Dropping the previous batch invalidates callbacks on the removed cards.
    with_state(move |state| state.borrow_mut().card_closures = closures);
    Ok(())
}

// ── Fetch helpers ───────────────────────────────────────────────────────────

async fn fetch_search(term: &str) -> Result<Vec<SearchHit>, String> {
    let encoded = String::from(js_sys::encode_uri_component(term));
    let url = format!("/search?term={encoded}");
    let resp = Request::get(&url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let text = resp.text().await.map_err(|e| e.to_string())?;
    formats::parse_search_response(&text).map_err(|e| e.to_string())
}

async fn fetch_frame_poses() -> Result<PoseLoad, String> {
    let resp = Request::get("/frame_poses")
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let text = resp.text().await.map_err(|e| e.to_string())?;
    formats::parse_frame_poses(&text).map_err(|e| e.to_string())
}

async fn fetch_point_cloud() -> Result<PointCloud, String> {
    let resp = Request::get("/pointcloud")
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let bytes = resp.binary().await.map_err(|e| e.to_string())?;
    formats::parse_ply(&bytes).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::{ViewerSettingsStore, scene_clear_color, status_element_id};
    use runtime::status::StatusRegion;
    use settings::{SettingsStore, ThemePreference};

    #[test]
    fn themes_map_to_distinct_clear_colors() {
        let dark = scene_clear_color(ThemePreference::Dark);
        let light = scene_clear_color(ThemePreference::Light);
        assert!(light.r > dark.r);
        assert!(light.g > dark.g);
        assert!(light.b > dark.b);
    }

    #[test]
    fn status_regions_map_to_fixed_elements() {
        assert_eq!(status_element_id(StatusRegion::SearchResults), "search-status");
        assert_eq!(status_element_id(StatusRegion::Viewer), "viewer-status");
    }

    #[test]
    fn settings_store_falls_back_to_memory_off_wasm() {
        // Off the browser, localStorage is unavailable; the fallback still
        // persists within the process.
        let mut store = ViewerSettingsStore::new();
        assert!(matches!(store, ViewerSettingsStore::Memory(_)));
        store.save_theme(ThemePreference::Dark).unwrap();
        assert_eq!(store.load_theme().unwrap(), Some(ThemePreference::Dark));
    }
}
