/*
 * Boids Backdrop - Module Definitions
 *
 * This file defines the module structure for the flocking backdrop.
 * The simulation core (boid, flock, network, lifecycle) draws through the
 * Surface trait and never touches the window directly; app and ui host it
 * in a nannou window.
 */

// Re-export key components for easier access
pub use boid::Boid;
pub use colour::{Rgb, Theme};
pub use debug::DebugInfo;
pub use flock::{FrameStats, Phase, Simulation};
pub use lifecycle::{navigate, Backdrop, Container, FramePacer};
pub use params::FlockParams;
pub use renderer::{NannouSurface, RecordingSurface, Surface};
pub use signals::{SignalHub, SignalSource, ThemeSource, VisibilitySource};
pub use spatial_grid::SpatialGrid;
pub use app::Model;

// Define modules
pub mod boid;
pub mod colour;
pub mod flock;
pub mod lifecycle;
pub mod network;
pub mod params;
pub mod renderer;
pub mod signals;
pub mod spatial_grid;
pub mod debug;
pub mod app;
pub mod ui;
