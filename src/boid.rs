/*
 * Boid Module
 *
 * This module defines the Boid struct and its behavior.
 * Each boid follows three main rules while flocking:
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 *
 * While scattering, the flocking forces are blended with a force that seeks a
 * fixed point just beyond the nearest canvas edge. The boid fades out as it
 * approaches that edge and is marked as exited once it has left the canvas.
 *
 * Positions are canvas pixels: origin top-left, y pointing down.
 */

use std::f32::consts::TAU;

use nannou::prelude::*;
use rand::distributions::Open01;
use rand::Rng;

use crate::params::FlockParams;

/// Canvas edge a scattering boid leaves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Point beyond a canvas edge that a scattering boid steers towards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetEdge {
    pub side: EdgeSide,
    pub point: Point2,
    pub distance: f32,
}

impl TargetEdge {
    fn new(side: EdgeSide, from: Point2, width: f32, height: f32, margin: f32) -> Self {
        let point = match side {
            EdgeSide::Top => pt2(from.x, -margin),
            EdgeSide::Bottom => pt2(from.x, height + margin),
            EdgeSide::Left => pt2(-margin, from.y),
            EdgeSide::Right => pt2(width + margin, from.y),
        };
        Self { side, point, distance: from.distance(point) }
    }
}

#[derive(Debug, Clone)]
pub struct Boid {
    pub position: Point2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub opacity: f32,
    pub is_scattering: bool,
    target_edge: Option<TargetEdge>,
    has_exited: bool,
}

// Scale a vector to the given length; zero stays zero
#[inline]
fn with_magnitude(v: Vec2, magnitude: f32) -> Vec2 {
    let length = v.length();
    if length > 0.0 {
        v * (magnitude / length)
    } else {
        Vec2::ZERO
    }
}

// Cap a vector's length
#[inline]
fn limit(v: Vec2, max: f32) -> Vec2 {
    let length_squared = v.length_squared();
    if length_squared > max * max {
        v * (max / length_squared.sqrt())
    } else {
        v
    }
}

// Random heading with a speed between 1 and max_speed
fn random_velocity<R: Rng + ?Sized>(rng: &mut R, max_speed: f32) -> Vec2 {
    let angle = rng.gen::<f32>() * TAU;
    let low = max_speed.min(1.0);
    let speed = low + rng.gen::<f32>() * (max_speed - low);
    vec2(angle.cos(), angle.sin()) * speed
}

// Uniform point strictly inside the canvas
fn random_position<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32) -> Point2 {
    let fx: f32 = rng.sample(Open01);
    let fy: f32 = rng.sample(Open01);
    pt2(fx * width, fy * height)
}

impl Boid {
    pub fn new(position: Point2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec2::ZERO,
            opacity: 1.0,
            is_scattering: false,
            target_edge: None,
            has_exited: false,
        }
    }

    // Spawn at a random position inside the canvas, fully visible
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: f32, height: f32, params: &FlockParams) -> Self {
        let position = random_position(rng, width, height);
        let velocity = random_velocity(rng, params.max_speed);
        Self::new(position, velocity)
    }

    pub fn target_edge(&self) -> Option<TargetEdge> {
        self.target_edge
    }

    pub fn has_exited(&self) -> bool {
        self.has_exited
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    pub fn heading(&self) -> f32 {
        self.velocity.y.atan2(self.velocity.x)
    }

    // Apply a force to the boid
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    // Reynolds seek: steer towards a target position
    pub fn seek(&self, target: Point2, params: &FlockParams) -> Vec2 {
        let desired = with_magnitude(target - self.position, params.max_speed);
        limit(desired - self.velocity, params.max_force)
    }

    // Steer away from boids closer than half the perception radius
    pub fn separation<'a, I>(&self, neighbours: I, params: &FlockParams) -> Vec2
    where
        I: IntoIterator<Item = &'a Boid>,
    {
        let radius = params.perception_radius / 2.0;
        let mut steering = Vec2::ZERO;
        let mut count = 0;

        for other in neighbours {
            let d = self.position.distance(other.position);
            if d > 0.0 && d < radius {
                // Pointing away from the neighbour, weighted by distance
                steering += with_magnitude(self.position - other.position, 1.0) / d;
                count += 1;
            }
        }

        if count > 0 {
            steering /= count as f32;
            steering = with_magnitude(steering, params.max_speed) - self.velocity;
            steering = limit(steering, params.max_force);
        }

        steering
    }

    // Steer towards the average heading of neighbours
    pub fn alignment<'a, I>(&self, neighbours: I, params: &FlockParams) -> Vec2
    where
        I: IntoIterator<Item = &'a Boid>,
    {
        let mut sum = Vec2::ZERO;
        let mut count = 0;

        for other in neighbours {
            let d = self.position.distance(other.position);
            if d > 0.0 && d < params.perception_radius {
                sum += other.velocity;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }

        sum /= count as f32;
        limit(with_magnitude(sum, params.max_speed) - self.velocity, params.max_force)
    }

    // Steer towards the average position of neighbours
    pub fn cohesion<'a, I>(&self, neighbours: I, params: &FlockParams) -> Vec2
    where
        I: IntoIterator<Item = &'a Boid>,
    {
        let mut sum = Vec2::ZERO;
        let mut count = 0;

        for other in neighbours {
            let d = self.position.distance(other.position);
            if d > 0.0 && d < params.perception_radius {
                sum += other.position;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }

        self.seek(sum / count as f32, params)
    }

    /// Accumulate the weighted flocking forces, blended with edge seeking
    /// while scattering.
    pub fn flock<'a, I>(&mut self, neighbours: I, params: &FlockParams)
    where
        I: IntoIterator<Item = &'a Boid>,
        I::IntoIter: Clone,
    {
        let neighbours = neighbours.into_iter();
        let separation = self.separation(neighbours.clone(), params) * params.separation_weight;
        let alignment = self.alignment(neighbours.clone(), params) * params.alignment_weight;
        let cohesion = self.cohesion(neighbours, params) * params.cohesion_weight;

        let mut force = separation + alignment + cohesion;

        if self.is_scattering {
            let intensity = params.scatter_intensity;
            force = force * (1.0 - intensity) + self.scatter_force(params) * intensity;
        }

        self.apply_force(force);
    }

    // Edge-seeking steering, zero once exited
    pub fn scatter_force(&self, params: &FlockParams) -> Vec2 {
        match self.target_edge {
            Some(target) if !self.has_exited => {
                let desired = with_magnitude(target.point - self.position, params.scatter_speed_limit());
                limit(desired - self.velocity, params.scatter_force)
            }
            _ => Vec2::ZERO,
        }
    }

    /// Begin scattering towards the nearest canvas edge. The side is fixed
    /// here; only a canvas resize moves the point along with that edge.
    /// Calling this while already scattering does nothing.
    pub fn start_scatter(&mut self, width: f32, height: f32, margin: f32) {
        if self.is_scattering {
            return;
        }
        self.is_scattering = true;
        self.has_exited = false;

        let sides = [EdgeSide::Top, EdgeSide::Bottom, EdgeSide::Left, EdgeSide::Right];
        self.target_edge = sides
            .iter()
            .map(|&side| TargetEdge::new(side, self.position, width, height, margin))
            .fold(None, |nearest: Option<TargetEdge>, edge| match nearest {
                Some(n) if n.distance <= edge.distance => Some(n),
                _ => Some(edge),
            });
    }

    /// Move the target onto the resized canvas, keeping the side that was
    /// chosen and the coordinate along it.
    pub fn reproject_target(&mut self, width: f32, height: f32, margin: f32) {
        if self.has_exited {
            return;
        }
        if let Some(target) = self.target_edge {
            let mut edge = TargetEdge::new(target.side, target.point, width, height, margin);
            edge.distance = self.position.distance(edge.point);
            self.target_edge = Some(edge);
        }
    }

    // Update the boid's position based on its velocity and acceleration
    pub fn update(&mut self, params: &FlockParams, width: f32, height: f32) {
        self.velocity += self.acceleration;

        // Faster movement is allowed during scatter
        let speed_limit = if self.is_scattering {
            params.scatter_speed_limit()
        } else {
            params.max_speed
        };
        self.velocity = limit(self.velocity, speed_limit);

        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;

        if self.is_scattering {
            self.update_scatter_state(params, width, height);
        }
    }

    // Fade towards the edge and detect leaving the canvas
    fn update_scatter_state(&mut self, params: &FlockParams, width: f32, height: f32) {
        if self.has_exited {
            return;
        }

        let dist_to_edge = self
            .position
            .x
            .min(width - self.position.x)
            .min(self.position.y)
            .min(height - self.position.y);

        if dist_to_edge < params.scatter_fade_distance {
            self.opacity = (dist_to_edge / params.scatter_fade_distance).clamp(0.0, 1.0);
        }

        let margin = params.exit_margin;
        if self.position.x < -margin
            || self.position.x > width + margin
            || self.position.y < -margin
            || self.position.y > height + margin
        {
            self.has_exited = true;
            self.opacity = 0.0;
        }
    }

    // Wrap around the canvas edges (only when not scattering)
    pub fn wrap_edges(&mut self, width: f32, height: f32) {
        if self.is_scattering {
            return;
        }

        if self.position.x > width {
            self.position.x = 0.0;
        } else if self.position.x < 0.0 {
            self.position.x = width;
        }

        if self.position.y > height {
            self.position.y = 0.0;
        } else if self.position.y < 0.0 {
            self.position.y = height;
        }
    }

    /// Re-enter at a random interior point, invisible, ready to fade in.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R, width: f32, height: f32, params: &FlockParams) {
        self.position = random_position(rng, width, height);
        self.velocity = random_velocity(rng, params.max_speed);
        self.acceleration = Vec2::ZERO;
        self.opacity = 0.0;
        self.is_scattering = false;
        self.target_edge = None;
        self.has_exited = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn boid_at(x: f32, y: f32) -> Boid {
        Boid::new(pt2(x, y), Vec2::ZERO)
    }

    #[test]
    fn no_neighbours_means_no_force() {
        let params = FlockParams::default();
        let boid = boid_at(100.0, 100.0);
        let far = boid_at(500.0, 500.0);
        let neighbours = [boid.clone(), far];
        assert_eq!(boid.separation(&neighbours, &params), Vec2::ZERO);
        assert_eq!(boid.alignment(&neighbours, &params), Vec2::ZERO);
        assert_eq!(boid.cohesion(&neighbours, &params), Vec2::ZERO);
    }

    #[test]
    fn separation_pushes_away_and_is_limited() {
        let params = FlockParams::default();
        let boid = boid_at(100.0, 100.0);
        let neighbours = [boid_at(110.0, 100.0)];
        let force = boid.separation(&neighbours, &params);
        assert!(force.x < 0.0);
        assert!(force.y.abs() < 1e-6);
        assert!(force.length() <= params.max_force + 1e-5);
    }

    #[test]
    fn separation_ignores_boids_beyond_half_radius() {
        let params = FlockParams::default();
        let boid = boid_at(100.0, 100.0);
        // Inside the perception radius but outside half of it
        let neighbours = [boid_at(150.0, 100.0)];
        assert_eq!(boid.separation(&neighbours, &params), Vec2::ZERO);
        assert!(boid.cohesion(&neighbours, &params).x > 0.0);
    }

    #[test]
    fn alignment_matches_neighbour_heading() {
        let params = FlockParams::default();
        let boid = boid_at(100.0, 100.0);
        let neighbours = [Boid::new(pt2(120.0, 100.0), vec2(0.0, 2.0))];
        let force = boid.alignment(&neighbours, &params);
        assert!(force.y > 0.0);
        assert!(force.x.abs() < 1e-6);
        assert!(force.length() <= params.max_force + 1e-5);
    }

    #[test]
    fn seek_is_limited_to_max_force() {
        let params = FlockParams::default();
        let boid = Boid::new(pt2(0.0, 0.0), vec2(-3.0, 0.0));
        let force = boid.seek(pt2(100.0, 0.0), &params);
        assert!(force.x > 0.0);
        assert!((force.length() - params.max_force).abs() < 1e-5);
    }

    #[test]
    fn start_scatter_picks_nearest_edge() {
        let params = FlockParams::default();
        let cases = [
            ((400.0, 20.0), (400.0, -params.exit_margin)),
            ((400.0, 590.0), (400.0, 600.0 + params.exit_margin)),
            ((10.0, 300.0), (-params.exit_margin, 300.0)),
            ((780.0, 300.0), (800.0 + params.exit_margin, 300.0)),
        ];
        for ((x, y), (tx, ty)) in cases {
            let mut boid = boid_at(x, y);
            boid.start_scatter(800.0, 600.0, params.exit_margin);
            let target = boid.target_edge().unwrap();
            assert_eq!(target.point, pt2(tx, ty), "boid at ({x}, {y})");
        }
    }

    #[test]
    fn start_scatter_twice_keeps_first_target() {
        let mut boid = boid_at(30.0, 300.0);
        boid.start_scatter(800.0, 600.0, 50.0);
        let first = boid.target_edge();
        boid.position = pt2(790.0, 300.0);
        boid.start_scatter(800.0, 600.0, 50.0);
        assert_eq!(boid.target_edge(), first);
    }

    #[test]
    fn reproject_follows_the_chosen_edge() {
        let mut boid = boid_at(780.0, 300.0);
        boid.start_scatter(800.0, 600.0, 50.0);
        assert_eq!(boid.target_edge().unwrap().side, EdgeSide::Right);

        boid.reproject_target(1600.0, 1200.0, 50.0);
        let target = boid.target_edge().unwrap();
        assert_eq!(target.side, EdgeSide::Right);
        assert_eq!(target.point, pt2(1650.0, 300.0));
        assert!((target.distance - 870.0).abs() < 1e-3);

        // Shrinking pulls the bottom target up with the edge
        let mut low = boid_at(400.0, 590.0);
        low.start_scatter(800.0, 600.0, 50.0);
        low.reproject_target(800.0, 400.0, 50.0);
        assert_eq!(low.target_edge().unwrap().point, pt2(400.0, 450.0));
    }

    #[test]
    fn scatter_force_points_at_target() {
        let params = FlockParams::default();
        let mut boid = boid_at(400.0, 20.0);
        boid.start_scatter(800.0, 600.0, params.exit_margin);
        let force = boid.scatter_force(&params);
        assert!(force.y < 0.0);
        assert!(force.length() <= params.scatter_force + 1e-5);
    }

    #[test]
    fn fades_near_edge_and_exits_past_margin() {
        let params = FlockParams::default();
        let mut boid = Boid::new(pt2(400.0, 160.0), vec2(0.0, -10.0));
        boid.start_scatter(800.0, 600.0, params.exit_margin);

        boid.update(&params, 800.0, 600.0);
        assert!((boid.opacity - 150.0 / 300.0).abs() < 1e-4);
        assert!(!boid.has_exited());

        boid.position = pt2(400.0, -49.0);
        boid.update(&params, 800.0, 600.0);
        assert!(boid.has_exited());
        assert_eq!(boid.opacity, 0.0);
        assert_eq!(boid.scatter_force(&params), Vec2::ZERO);
    }

    #[test]
    fn update_clamps_speed_per_mode() {
        let params = FlockParams::default();
        let mut boid = Boid::new(pt2(400.0, 300.0), vec2(3.0, 0.0));
        boid.apply_force(vec2(50.0, 0.0));
        boid.update(&params, 800.0, 600.0);
        assert!(boid.velocity.length() <= params.max_speed + 1e-4);
        assert_eq!(boid.acceleration, Vec2::ZERO);

        boid.start_scatter(800.0, 600.0, params.exit_margin);
        boid.apply_force(vec2(50.0, 0.0));
        boid.update(&params, 800.0, 600.0);
        assert!(boid.velocity.length() > params.max_speed);
        assert!(boid.velocity.length() <= params.scatter_speed_limit() + 1e-4);
    }

    #[test]
    fn wraps_only_when_flocking() {
        let mut boid = boid_at(801.0, -1.0);
        boid.wrap_edges(800.0, 600.0);
        assert_eq!(boid.position, pt2(0.0, 600.0));

        let mut scattering = boid_at(801.0, -1.0);
        scattering.start_scatter(800.0, 600.0, 50.0);
        scattering.wrap_edges(800.0, 600.0);
        assert_eq!(scattering.position, pt2(801.0, -1.0));
    }

    #[test]
    fn reset_clears_scatter_state() {
        let params = FlockParams::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut boid = boid_at(-100.0, 300.0);
        boid.start_scatter(800.0, 600.0, params.exit_margin);
        boid.update(&params, 800.0, 600.0);
        assert!(boid.has_exited());

        boid.reset(&mut rng, 800.0, 600.0, &params);
        assert!(!boid.is_scattering);
        assert!(!boid.has_exited());
        assert_eq!(boid.target_edge(), None);
        assert_eq!(boid.opacity, 0.0);
        assert!(boid.position.x > 0.0 && boid.position.x < 800.0);
        assert!(boid.position.y > 0.0 && boid.position.y < 600.0);
        let speed = boid.velocity.length();
        assert!(speed >= 1.0 - 1e-4 && speed <= params.max_speed + 1e-4);
    }
}
