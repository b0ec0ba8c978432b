/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. Besides tuning the flock live, the panel stands in for
 * the page around the backdrop: whether the hero heading is in view, whether
 * the tab is visible, which theme is active, and page navigation.
 * Parameter change detection is handled by the FlockParams struct.
 */

use nannou_egui::{egui, Egui};

use crate::colour::Theme;
use crate::debug::DebugInfo;
use crate::params::{FlockParams, ParamChanges};

/// The page signals the panel controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub has_hero: bool,
    pub hero_visible: bool,
    pub document_visible: bool,
    pub theme: Theme,
}

impl Default for PageState {
    fn default() -> Self {
        Self { has_hero: true, hero_visible: true, document_visible: true, theme: Theme::default() }
    }
}

/// What the user asked for this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiActions {
    pub changes: ParamChanges,
    pub navigate: bool,
    pub save_config: bool,
}

// Update the UI and report parameter changes and button presses
pub fn update_ui(
    egui: &mut Egui,
    params: &mut FlockParams,
    page: &mut PageState,
    debug_info: &DebugInfo,
) -> UiActions {
    let mut actions = UiActions::default();

    // Take a snapshot of current parameter values for change detection
    params.take_snapshot();

    let ctx = egui.begin_frame();

    egui::Window::new("Backdrop Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Page", |ui| {
                ui.checkbox(&mut page.hero_visible, "Hero heading in view");
                ui.checkbox(&mut page.document_visible, "Tab visible");
                egui::ComboBox::from_label("Theme")
                    .selected_text(page.theme.label())
                    .show_ui(ui, |ui| {
                        for theme in Theme::ALL {
                            ui.selectable_value(&mut page.theme, theme, theme.label());
                        }
                    });
                ui.checkbox(&mut page.has_hero, "Next page has a hero heading");
                if ui.button("Navigate (remount)").clicked() {
                    actions.navigate = true;
                }
            });

            ui.collapsing("Flock", |ui| {
                ui.add(egui::Slider::new(&mut params.population, FlockParams::get_population_range()).text("Population"));
                ui.add(egui::Slider::new(&mut params.max_speed, FlockParams::get_max_speed_range()).text("Max Speed"));
                ui.add(egui::Slider::new(&mut params.max_force, FlockParams::get_max_force_range()).text("Max Force"));
                ui.add(egui::Slider::new(&mut params.perception_radius, FlockParams::get_radius_range()).text("Perception Radius"));
                ui.add(egui::Slider::new(&mut params.separation_weight, FlockParams::get_weight_range()).text("Separation Weight"));
                ui.add(egui::Slider::new(&mut params.alignment_weight, FlockParams::get_weight_range()).text("Alignment Weight"));
                ui.add(egui::Slider::new(&mut params.cohesion_weight, FlockParams::get_weight_range()).text("Cohesion Weight"));
            });

            ui.collapsing("Network & Scatter", |ui| {
                ui.add(egui::Slider::new(&mut params.network_max_connections, FlockParams::get_connections_range()).text("Connections"));
                ui.add(egui::Slider::new(&mut params.scatter_intensity, 0.0..=1.0).text("Scatter Intensity"));
                ui.add(egui::Slider::new(&mut params.scatter_speed_boost, FlockParams::get_scatter_boost_range()).text("Scatter Boost"));
                ui.add(egui::Slider::new(&mut params.respawn_fade_ms, FlockParams::get_respawn_fade_range()).text("Respawn Fade (ms)"));
            });

            ui.collapsing("Performance", |ui| {
                ui.checkbox(&mut params.enable_spatial_grid, "Enable Spatial Grid");

                ui.separator();

                ui.label(format!("FPS: {:.1}", debug_info.fps));
                ui.label(format!("Frame time: {:.2} ms", debug_info.frame_time.as_secs_f64() * 1000.0));
                ui.label(format!("Phase: {}", debug_info.phase));
                ui.label(format!("Boids drawn: {}", debug_info.drawn_boids));
                ui.label(format!("Network lines: {}", debug_info.links));
                ui.label(format!(
                    "Frames run / skipped: {} / {}",
                    debug_info.simulation_frames, debug_info.skipped_frames
                ));
            });

            ui.checkbox(&mut params.show_debug, "Show Debug Overlay");
            if ui.button("Save Config").clicked() {
                actions.save_config = true;
            }
        });

    actions.changes = params.detect_changes();
    actions
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect, boids_len: usize) {
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 220.0;
    let panel_height = line_height * 5.0 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.right() - panel_width + margin;
    let text_y = window_rect.top() - margin;

    let debug_texts = [
        format!("FPS: {:.1}", debug_info.fps),
        format!("Phase: {}", debug_info.phase),
        format!("Boids: {} ({} drawn)", boids_len, debug_info.drawn_boids),
        format!("Lines: {}", debug_info.links),
        format!("Skipped: {}", debug_info.skipped_frames),
    ];

    for (i, text) in debug_texts.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        // Position the text with a fixed offset from the left edge
        draw.text(text)
            .x_y(text_x + 70.0, y)
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}
