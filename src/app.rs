/*
 * Application Module
 *
 * This module defines the nannou host for the backdrop: a window standing in
 * for the page, an egui panel standing in for the page around the canvas,
 * and the signal sources (hero visibility, theme) the backdrop observes.
 *
 * The backdrop runs its fixed-rate frame from update() into a recorded
 * canvas; view() replays the last recorded canvas every host frame, so
 * skipped simulation frames leave the previous image on screen like a
 * browser canvas does.
 *
 * Keys (when the panel does not have focus):
 * - S: toggle hero heading in view (scatter / respawn)
 * - T: cycle theme
 * - V: toggle tab visibility
 * - N: navigate (tear down and remount)
 * - D: toggle debug overlay
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::colour::Theme;
use crate::debug::DebugInfo;
use crate::lifecycle::{navigate, Backdrop, Container};
use crate::params::FlockParams;
use crate::renderer::{NannouSurface, RecordingSurface, Surface};
use crate::signals::{SignalHub, VisibilitySource};
use crate::ui::{self, PageState};

const DEFAULT_CONFIG_PATH: &str = "boids_backdrop.json";

// Main model for the application
pub struct Model {
    pub backdrop: Option<Backdrop>,
    pub params: FlockParams,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    pub page: PageState,
    pub trigger: Arc<SignalHub<bool>>,
    pub theme: Arc<SignalHub<Theme>>,
    // Class list of the page's root element; the theme switcher writes it
    pub root_classes: String,
    // Last completed simulation frame, and the buffer the next one is drawn into
    pub canvas: RecordingSurface,
    scratch: RecordingSurface,
    config_path: PathBuf,
}

// Load parameters from the path given on the command line, if any
fn load_params(path: Option<&PathBuf>) -> FlockParams {
    let Some(path) = path else {
        return FlockParams::default();
    };

    match FlockParams::load_from_disk(path) {
        Ok(params) => {
            info!(path = %path.display(), "loaded flock config");
            params
        }
        Err(err) => {
            warn!(path = %path.display(), error = %format!("{err:#}"), "using default flock config");
            FlockParams::default()
        }
    }
}

fn container_for(app: &App) -> Container {
    let rect = app.window_rect();
    Container { width: rect.w(), height: rect.h() }
}

// Tear down whatever is mounted and mount against the current page state
fn remount(model: &mut Model, container: Container) {
    let trigger = model
        .page
        .has_hero
        .then(|| Arc::clone(&model.trigger) as Arc<VisibilitySource>);

    navigate(
        &mut model.backdrop,
        Some(container),
        trigger,
        model.theme.clone(),
        model.params.clone(),
    );

    if let Some(backdrop) = model.backdrop.as_mut() {
        backdrop.set_document_visible(model.page.document_visible);
    }
    model.canvas.reset();
}

fn save_config(model: &Model) {
    match model.params.save_to_disk(&model.config_path) {
        Ok(()) => info!(path = %model.config_path.display(), "saved flock config"),
        Err(err) => warn!(path = %model.config_path.display(), error = %format!("{err:#}"), "could not save flock config"),
    }
}

// Initialize the model
pub fn model(app: &App) -> Model {
    // Get the primary monitor's dimensions
    let monitor = app.primary_monitor().expect("Failed to get primary monitor");
    let monitor_size = monitor.size();

    // Calculate window size based on monitor size (80% of monitor size)
    let window_width = monitor_size.width as f32 * 0.8;
    let window_height = monitor_size.height as f32 * 0.8;

    let window_id = app
        .new_window()
        .title("Boids Backdrop")
        .size(window_width as u32, window_height as u32)
        .view(view)
        .resized(resized)
        .key_pressed(key_pressed)
        .raw_event(raw_window_event)
        .build()
        .expect("Failed to build window");

    let window = app.window(window_id).expect("Window was just created");
    let egui = Egui::from_window(&window);

    let cli_path = std::env::args().nth(1).map(PathBuf::from);
    let params = load_params(cli_path.as_ref());
    let config_path = cli_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let page = PageState::default();
    let trigger = SignalHub::new(page.hero_visible);
    let root_classes = page.theme.class_name();
    let theme = SignalHub::new(Theme::from_class_list(&root_classes).unwrap_or_default());

    let mut model = Model {
        backdrop: None,
        params,
        egui,
        debug_info: DebugInfo::default(),
        page,
        trigger,
        theme,
        root_classes,
        canvas: RecordingSurface::new(),
        scratch: RecordingSurface::new(),
        config_path,
    };

    let rect = window.rect();
    remount(&mut model, Container { width: rect.w(), height: rect.h() });
    model
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    let actions = ui::update_ui(&mut model.egui, &mut model.params, &mut model.page, &model.debug_info);

    // Forward page state into the sources the backdrop observes; unchanged
    // values do not notify
    model.trigger.set(model.page.hero_visible);
    model.root_classes = model.page.theme.class_name();
    model.theme.set(Theme::from_class_list(&model.root_classes).unwrap_or_default());

    if actions.changes.any_changed {
        if let Some(backdrop) = model.backdrop.as_mut() {
            backdrop.set_params(model.params.clone());
        }
    }

    if actions.save_config {
        save_config(model);
    }

    if actions.navigate {
        remount(model, container_for(app));
    }

    let Some(backdrop) = model.backdrop.as_mut() else {
        model.debug_info.phase = "unmounted";
        return;
    };

    backdrop.set_document_visible(model.page.document_visible);

    model.scratch.reset();
    if let Some(stats) = backdrop.frame(Instant::now(), &mut model.scratch) {
        model.debug_info.record(stats);
        if !stats.skipped {
            std::mem::swap(&mut model.canvas, &mut model.scratch);
        }
    }
    model.debug_info.phase = backdrop.simulation().phase().name();
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();

    let mut surface = NannouSurface::new(&draw, window_rect, model.page.theme.background_colour());
    surface.clear();
    model.canvas.replay(&mut surface);

    if model.params.show_debug {
        let boids_len = model.backdrop.as_ref().map_or(0, |b| b.simulation().boids().len());
        ui::draw_debug_info(&draw, &model.debug_info, window_rect, boids_len);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        warn!(?err, "failed to render frame");
    }

    // Draw the egui UI
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        warn!(?err, "failed to render ui");
    }
}

pub fn resized(_app: &App, model: &mut Model, size: Vec2) {
    if let Some(backdrop) = model.backdrop.as_mut() {
        backdrop.resize(size.x, size.y);
    }
    model.canvas.reset();
}

pub fn key_pressed(app: &App, model: &mut Model, key: Key) {
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }

    match key {
        Key::S => model.page.hero_visible = !model.page.hero_visible,
        Key::T => model.page.theme = model.page.theme.next(),
        Key::V => model.page.document_visible = !model.page.document_visible,
        Key::N => remount(model, container_for(app)),
        Key::D => model.params.show_debug = !model.params.show_debug,
        _ => {}
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
