/*
 * Boids Backdrop
 *
 * Desktop host for the flocking backdrop. A window stands in for the page and
 * a control panel stands in for the page around the canvas: scroll the hero
 * heading out of view to scatter the flock, back into view to respawn it.
 *
 * Usage: boids_backdrop [config.json]
 * Log verbosity is controlled with RUST_LOG (default "info").
 */

use boids_backdrop::app;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    nannou::app(app::model)
        .update(app::update)
        .run();
}
