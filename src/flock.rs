/*
 * Flock Module
 *
 * The Simulation struct is the whole simulation context for one page view:
 * the boids, the render colour, the scatter/respawn phase and the canvas
 * size. It is an explicit value owned by the lifecycle layer and passed into
 * every frame, never shared global state.
 *
 * Phases:
 *   Flocking   -> Scattering   when the trigger leaves the viewport
 *   Scattering -> Exited       once every boid has left the canvas
 *   Scattering | Exited -> Respawning  when the trigger comes back
 *   Respawning -> Flocking     when the fade-in completes
 *   Respawning -> Scattering   if the trigger leaves again mid fade
 *
 * While Exited a frame does nothing at all.
 */

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::boid::Boid;
use crate::colour::{Rgb, Theme};
use crate::network::network_links;
use crate::params::FlockParams;
use crate::renderer::{draw_boid, draw_network, Surface};
use crate::spatial_grid::SpatialGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Flocking,
    Scattering,
    Exited,
    Respawning { started_at: Instant },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Flocking => "flocking",
            Phase::Scattering => "scattering",
            Phase::Exited => "exited",
            Phase::Respawning { .. } => "respawning",
        }
    }
}

/// What a single frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub skipped: bool,
    pub drawn_boids: usize,
    pub links: usize,
}

pub struct Simulation {
    boids: Vec<Boid>,
    params: FlockParams,
    colour: Rgb,
    theme: Theme,
    phase: Phase,
    all_exited: bool,
    width: f32,
    height: f32,
    rng: StdRng,
    grid: Option<SpatialGrid>,
}

impl Simulation {
    /// New flock sized for the viewport width, spread over the canvas.
    pub fn new(params: FlockParams, width: f32, height: f32) -> Self {
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let population = params.population_for_width(width);
        let boids = (0..population)
            .map(|_| Boid::random(&mut rng, width, height, &params))
            .collect();

        debug!(population, width, height, "flock created");

        let colour = resolve_colour(Theme::default(), &params);

        Self {
            boids,
            params,
            colour,
            theme: Theme::default(),
            phase: Phase::Flocking,
            all_exited: false,
            width,
            height,
            rng,
            grid: None,
        }
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn params(&self) -> &FlockParams {
        &self.params
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn all_exited(&self) -> bool {
        self.all_exited
    }

    pub fn colour(&self) -> Rgb {
        self.colour
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.colour = resolve_colour(theme, &self.params);
        debug!(%theme, colour = %self.colour, "flock colour updated");
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Update the canvas size. Boids are not moved; out-of-bounds ones wrap
    /// or exit on the next step. Scatter targets follow their edge so they
    /// stay outside the new canvas.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.grid = None;

        let margin = self.params.exit_margin;
        for boid in self.boids.iter_mut().filter(|b| b.is_scattering) {
            boid.reproject_target(width, height, margin);
        }
    }

    /// Swap in new parameters, growing or shrinking the flock if the
    /// population tier changed.
    pub fn set_params(&mut self, params: FlockParams) {
        let population = params.population_for_width(self.width);
        self.params = params;
        self.colour = resolve_colour(self.theme, &self.params);

        if population < self.boids.len() {
            self.boids.truncate(population);
        } else {
            let scattering = matches!(self.phase, Phase::Scattering | Phase::Exited);
            while self.boids.len() < population {
                let mut boid = Boid::random(&mut self.rng, self.width, self.height, &self.params);
                if scattering {
                    boid.start_scatter(self.width, self.height, self.params.exit_margin);
                }
                self.boids.push(boid);
            }
        }
        if self.phase == Phase::Exited && !self.boids.iter().all(Boid::has_exited) {
            self.phase = Phase::Scattering;
            self.all_exited = false;
        }
        self.grid = None;
    }

    /// Send every boid towards its nearest edge. No-op unless flocking or
    /// respawning.
    pub fn trigger_scatter(&mut self) {
        match self.phase {
            Phase::Flocking | Phase::Respawning { .. } => {
                for boid in &mut self.boids {
                    boid.start_scatter(self.width, self.height, self.params.exit_margin);
                }
                self.phase = Phase::Scattering;
                self.all_exited = false;
                info!(boids = self.boids.len(), "scatter");
            }
            Phase::Scattering | Phase::Exited => {}
        }
    }

    /// Reset every boid to a random interior point and start fading in.
    /// No-op unless scattering or exited.
    pub fn trigger_respawn(&mut self, now: Instant) {
        match self.phase {
            Phase::Scattering | Phase::Exited => {
                for boid in &mut self.boids {
                    boid.reset(&mut self.rng, self.width, self.height, &self.params);
                }
                self.phase = Phase::Respawning { started_at: now };
                self.all_exited = false;
                info!(boids = self.boids.len(), "respawn");
            }
            Phase::Flocking | Phase::Respawning { .. } => {}
        }
    }

    /// Advance one frame without drawing.
    pub fn step(&mut self, now: Instant) -> FrameStats {
        self.advance(now, None)
    }

    /// Advance one frame and draw it.
    pub fn tick(&mut self, now: Instant, surface: &mut dyn Surface) -> FrameStats {
        self.advance(now, Some(surface))
    }

    fn advance(&mut self, now: Instant, mut surface: Option<&mut dyn Surface>) -> FrameStats {
        // Everything is off screen and nothing is coming back yet
        if self.phase == Phase::Exited {
            return FrameStats { skipped: true, ..FrameStats::default() };
        }

        let mut stats = FrameStats::default();

        if let Some(surface) = surface.as_deref_mut() {
            surface.clear();
        }

        if let Phase::Respawning { started_at } = self.phase {
            let progress = fade_progress(now.saturating_duration_since(started_at), self.params.respawn_fade());
            for boid in &mut self.boids {
                boid.opacity = progress;
            }
            if progress >= 1.0 {
                self.phase = Phase::Flocking;
                debug!("respawn complete");
            }
        }

        // Neighbour forces read the flock as it was at the start of the frame
        let snapshot = self.boids.clone();

        if self.params.enable_spatial_grid {
            let stale = self
                .grid
                .as_ref()
                .map_or(true, |g| g.cell_size != self.params.perception_radius.max(1.0));
            if stale {
                self.grid = Some(SpatialGrid::new(self.params.perception_radius, self.width, self.height));
            }
            if let Some(grid) = self.grid.as_mut() {
                grid.rebuild(&snapshot);
            }
        }

        let params = &self.params;
        let grid = if params.enable_spatial_grid { self.grid.as_ref() } else { None };

        for boid in self.boids.iter_mut() {
            match grid {
                Some(grid) => {
                    // Index order keeps the force sums identical to brute force
                    let mut nearby = grid.nearby_indices(boid.position);
                    nearby.sort_unstable();
                    boid.flock(nearby.iter().map(|&j| &snapshot[j]), params);
                }
                None => boid.flock(&snapshot, params),
            }
            boid.update(params, self.width, self.height);
            boid.wrap_edges(self.width, self.height);

            if let Some(surface) = surface.as_deref_mut() {
                if draw_boid(surface, boid, self.colour, params, self.width) {
                    stats.drawn_boids += 1;
                }
            }
        }

        // Lines are pointless for boids on their way out
        let scattering = self.phase == Phase::Scattering;
        if let Some(surface) = surface.as_deref_mut() {
            if !scattering {
                let links = network_links(&self.boids, params, self.width);
                draw_network(surface, &self.boids, &links, self.colour);
                stats.links = links.len();
            }
        }

        if scattering {
            self.all_exited = self.boids.iter().all(Boid::has_exited);
            if self.all_exited {
                self.phase = Phase::Exited;
                info!("all boids exited");
            }
        }

        stats
    }
}

// Theme rule colour, unless the config names a colour of its own
fn resolve_colour(theme: Theme, params: &FlockParams) -> Rgb {
    match params.rule_colour.as_deref() {
        Some(css) => Rgb::parse_css_or_fallback(css),
        None => theme.rule_colour(),
    }
}

// Fraction of the respawn fade completed, clamped to 1
fn fade_progress(elapsed: Duration, fade: Duration) -> f32 {
    if fade.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / fade.as_secs_f32()).min(1.0)
}
