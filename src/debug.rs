/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains frame metrics
 * and backdrop state to be displayed in the UI.
 *
 * Includes metrics for:
 * - FPS (frames per second) of the host loop
 * - Frame time
 * - Simulation frames run vs skipped
 * - Boids drawn and network lines in the last frame
 * - Current scatter/respawn phase
 */

use std::time::Duration;

use crate::flock::FrameStats;

// Debug information to display
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub simulation_frames: u64,
    pub skipped_frames: u64,
    pub drawn_boids: usize,
    pub links: usize,
    pub phase: &'static str,
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time: Duration::ZERO,
            simulation_frames: 0,
            skipped_frames: 0,
            drawn_boids: 0,
            links: 0,
            phase: "unmounted",
        }
    }
}

impl DebugInfo {
    // Fold in the result of one simulation frame
    pub fn record(&mut self, stats: FrameStats) {
        if stats.skipped {
            self.skipped_frames += 1;
        } else {
            self.simulation_frames += 1;
            self.drawn_boids = stats.drawn_boids;
            self.links = stats.links;
        }
    }
}
