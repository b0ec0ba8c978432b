/*
 * Flock Parameters Module
 *
 * This module defines the FlockParams struct that holds every tunable of the
 * backdrop: population tiers, steering limits and weights, appearance, the
 * scatter/respawn timing and the frame rate. Defaults match the values the
 * site ships with. Parameters can be loaded from a JSON file, are clamped to
 * sane ranges on load, and can be adjusted live through the UI, which uses the
 * snapshot methods below for change detection.
 */

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockParams {
    // Population
    pub population: usize,
    pub population_mobile: usize,
    pub mobile_breakpoint: f32,

    // Behaviour
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub perception_radius: f32,
    pub max_speed: f32,
    pub max_force: f32,

    // Appearance
    pub boid_size: f32,
    pub boid_width: f32,
    pub boid_length: f32,
    pub boid_indent: f32,
    pub network_opacity: f32,
    pub network_max_connections: usize,
    pub network_range_multiplier: f32,

    // Centre fade (keeps the content column readable)
    pub centre_clear_zone: f32,
    pub centre_min_opacity: f32,

    // Scatter
    pub scatter_intensity: f32, // 0 = no edge seeking, 1 = edge seeking only
    pub scatter_force: f32,
    pub scatter_speed_boost: f32,
    pub scatter_fade_distance: f32,
    pub exit_margin: f32,

    // Respawn
    pub respawn_fade_ms: u64,

    // Loop
    pub frame_rate: f32,
    pub enable_spatial_grid: bool,
    pub seed: Option<u64>,
    pub show_debug: bool,

    // Appearance override: a CSS colour used instead of the theme's rule colour
    pub rule_colour: Option<String>,

    // Change detection state for the UI, never persisted
    #[serde(skip)]
    pub previous_values: Option<ParamSnapshot>,
}

/// The live-tunable subset, compared frame to frame by the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSnapshot {
    population: usize,
    separation_weight: f32,
    alignment_weight: f32,
    cohesion_weight: f32,
    perception_radius: f32,
    max_speed: f32,
    max_force: f32,
    network_max_connections: usize,
    scatter_intensity: f32,
    scatter_speed_boost: f32,
    respawn_fade_ms: u64,
    enable_spatial_grid: bool,
    show_debug: bool,
}

/// What changed between the last snapshot and now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamChanges {
    pub population_changed: bool,
    pub any_changed: bool,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            population: 80,
            population_mobile: 50,
            mobile_breakpoint: 768.0,
            separation_weight: 3.8,
            alignment_weight: 1.6,
            cohesion_weight: 0.8,
            perception_radius: 70.0,
            max_speed: 3.2,
            max_force: 0.12,
            boid_size: 6.5,
            boid_width: 1.15,
            boid_length: 1.7,
            boid_indent: 0.2,
            network_opacity: 0.33,
            network_max_connections: 3,
            network_range_multiplier: 2.5,
            centre_clear_zone: 360.0,
            centre_min_opacity: 0.1,
            scatter_intensity: 0.5,
            scatter_force: 0.7,
            scatter_speed_boost: 4.5,
            scatter_fade_distance: 300.0,
            exit_margin: 50.0,
            respawn_fade_ms: 5000,
            frame_rate: 30.0,
            enable_spatial_grid: false,
            seed: None,
            show_debug: false,
            rule_colour: None,
            previous_values: None,
        }
    }
}

impl FlockParams {
    /// Population tier for a viewport of the given width.
    pub fn population_for_width(&self, width: f32) -> usize {
        if width < self.mobile_breakpoint {
            self.population_mobile
        } else {
            self.population
        }
    }

    pub fn scatter_speed_limit(&self) -> f32 {
        self.max_speed * self.scatter_speed_boost
    }

    pub fn network_range(&self) -> f32 {
        self.perception_radius * self.network_range_multiplier
    }

    pub fn respawn_fade(&self) -> Duration {
        Duration::from_millis(self.respawn_fade_ms)
    }

    // Non-positive or NaN rates run at 1 fps
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.frame_rate.max(1.0))
    }

    pub fn load_from_disk(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading flock config {}", path.display()))?;
        let mut params: Self = serde_json::from_str(&data)
            .with_context(|| format!("parsing flock config {}", path.display()))?;
        params.sanitize();
        Ok(params)
    }

    pub fn save_to_disk(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing flock config {}", path.display()))?;
        Ok(())
    }

    // Clamp every field into the range the simulation can run with
    pub fn sanitize(&mut self) {
        self.population = self.population.clamp(0, *Self::get_population_range().end());
        self.population_mobile = self.population_mobile.clamp(0, *Self::get_population_range().end());
        self.mobile_breakpoint = self.mobile_breakpoint.max(0.0);
        self.separation_weight = self.separation_weight.clamp(0.0, 10.0);
        self.alignment_weight = self.alignment_weight.clamp(0.0, 10.0);
        self.cohesion_weight = self.cohesion_weight.clamp(0.0, 10.0);
        self.perception_radius = self.perception_radius.clamp(1.0, 500.0);
        self.max_speed = self.max_speed.clamp(0.1, 50.0);
        self.max_force = self.max_force.clamp(0.001, 10.0);
        self.boid_size = self.boid_size.clamp(0.5, 50.0);
        self.network_opacity = self.network_opacity.clamp(0.0, 1.0);
        self.network_max_connections = self.network_max_connections.min(16);
        self.network_range_multiplier = self.network_range_multiplier.clamp(0.0, 10.0);
        self.centre_clear_zone = self.centre_clear_zone.max(0.0);
        self.centre_min_opacity = self.centre_min_opacity.clamp(0.0, 1.0);
        self.scatter_intensity = self.scatter_intensity.clamp(0.0, 1.0);
        self.scatter_force = self.scatter_force.clamp(0.001, 10.0);
        self.scatter_speed_boost = self.scatter_speed_boost.clamp(1.0, 20.0);
        self.scatter_fade_distance = self.scatter_fade_distance.max(1.0);
        self.exit_margin = self.exit_margin.max(0.0);
        self.frame_rate = self.frame_rate.clamp(1.0, 240.0);
    }

    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self) {
        self.previous_values = Some(self.snapshot());
    }

    // Compare against the last snapshot; nothing has changed if there is none
    pub fn detect_changes(&self) -> ParamChanges {
        match &self.previous_values {
            Some(prev) => {
                let current = self.snapshot();
                ParamChanges {
                    population_changed: current.population != prev.population,
                    any_changed: current != *prev,
                }
            }
            None => ParamChanges::default(),
        }
    }

    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            population: self.population,
            separation_weight: self.separation_weight,
            alignment_weight: self.alignment_weight,
            cohesion_weight: self.cohesion_weight,
            perception_radius: self.perception_radius,
            max_speed: self.max_speed,
            max_force: self.max_force,
            network_max_connections: self.network_max_connections,
            scatter_intensity: self.scatter_intensity,
            scatter_speed_boost: self.scatter_speed_boost,
            respawn_fade_ms: self.respawn_fade_ms,
            enable_spatial_grid: self.enable_spatial_grid,
            show_debug: self.show_debug,
        }
    }

    // Get parameter ranges for UI sliders
    pub fn get_population_range() -> std::ops::RangeInclusive<usize> {
        0..=2000
    }

    pub fn get_max_speed_range() -> std::ops::RangeInclusive<f32> {
        0.5..=10.0
    }

    pub fn get_max_force_range() -> std::ops::RangeInclusive<f32> {
        0.01..=1.0
    }

    pub fn get_weight_range() -> std::ops::RangeInclusive<f32> {
        0.0..=5.0
    }

    pub fn get_radius_range() -> std::ops::RangeInclusive<f32> {
        10.0..=200.0
    }

    pub fn get_connections_range() -> std::ops::RangeInclusive<usize> {
        0..=8
    }

    pub fn get_scatter_boost_range() -> std::ops::RangeInclusive<f32> {
        1.0..=10.0
    }

    pub fn get_respawn_fade_range() -> std::ops::RangeInclusive<u64> {
        100..=10_000
    }
}
