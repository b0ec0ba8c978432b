/*
 * Network Module
 *
 * Selection of the connection lines drawn between nearby boids. Each visible
 * boid links to at most `network_max_connections` of its closest visible
 * neighbours inside the network range. A line's opacity falls off linearly
 * with distance and is scaled by both endpoints' own opacity, so fading boids
 * fade their lines too.
 *
 * Also home to the centre-column fade, which dims boids and lines near the
 * vertical centre of the screen where the page content sits.
 */

use crate::boid::Boid;
use crate::params::FlockParams;

/// A line from one boid to one of its nearest neighbours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: usize,
    pub to: usize,
    pub distance: f32,
    pub opacity: f32,
}

/// Opacity multiplier for something at `x` on a screen `screen_width` wide:
/// `centre_min_opacity` inside the clear zone, rising linearly to 1 at the
/// screen edges.
pub fn centre_opacity_factor(x: f32, screen_width: f32, params: &FlockParams) -> f32 {
    let centre_x = screen_width / 2.0;
    let distance_from_centre = (x - centre_x).abs();

    if distance_from_centre <= params.centre_clear_zone {
        return params.centre_min_opacity;
    }

    let max_distance_beyond_zone = centre_x - params.centre_clear_zone;
    if max_distance_beyond_zone <= 0.0 {
        // Screen narrower than the clear zone
        return 1.0;
    }

    let factor = ((distance_from_centre - params.centre_clear_zone) / max_distance_beyond_zone).min(1.0);
    params.centre_min_opacity + factor * (1.0 - params.centre_min_opacity)
}

// Compute the network for the current flock
pub fn network_links(boids: &[Boid], params: &FlockParams, screen_width: f32) -> Vec<Link> {
    let max_range = params.network_range();
    let mut links = Vec::new();
    let mut nearby: Vec<(usize, f32)> = Vec::new();

    if params.network_max_connections == 0 || max_range <= 0.0 {
        return links;
    }

    for (i, boid) in boids.iter().enumerate() {
        if !boid.is_visible() {
            continue;
        }

        nearby.clear();
        for (j, other) in boids.iter().enumerate() {
            if i == j || !other.is_visible() {
                continue;
            }
            let d = boid.position.distance(other.position);
            if d < max_range {
                nearby.push((j, d));
            }
        }

        nearby.sort_by(|a, b| a.1.total_cmp(&b.1));

        let boid_factor = centre_opacity_factor(boid.position.x, screen_width, params);

        for &(j, distance) in nearby.iter().take(params.network_max_connections) {
            let other = &boids[j];
            let other_factor = centre_opacity_factor(other.position.x, screen_width, params);
            let falloff = params.network_opacity * (1.0 - distance / max_range);
            let opacity = falloff * boid.opacity * other.opacity * boid_factor * other_factor;

            if opacity > 0.0 {
                links.push(Link { from: i, to: j, distance, opacity });
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use nannou::prelude::*;

    fn boid_at(x: f32, y: f32, opacity: f32) -> Boid {
        let mut boid = Boid::new(pt2(x, y), Vec2::ZERO);
        boid.opacity = opacity;
        boid
    }

    // Centre fade disabled so opacities are easy to reason about
    fn flat_params() -> FlockParams {
        FlockParams { centre_min_opacity: 1.0, ..FlockParams::default() }
    }

    #[test]
    fn centre_factor_profile() {
        let params = FlockParams::default();
        let width = 1920.0;
        assert_eq!(centre_opacity_factor(960.0, width, &params), 0.1);
        assert_eq!(centre_opacity_factor(960.0 - 360.0, width, &params), 0.1);
        assert!((centre_opacity_factor(0.0, width, &params) - 1.0).abs() < 1e-6);
        assert!((centre_opacity_factor(1920.0, width, &params) - 1.0).abs() < 1e-6);

        let halfway = 960.0 + 360.0 + 300.0;
        assert!((centre_opacity_factor(halfway, width, &params) - 0.55).abs() < 1e-5);

        // Narrow screen: everything is inside the clear zone
        assert_eq!(centre_opacity_factor(10.0, 600.0, &params), 0.1);
    }

    #[test]
    fn caps_connections_and_picks_closest() {
        let params = flat_params();
        let mut boids = vec![boid_at(100.0, 100.0, 1.0)];
        for k in 1..=6 {
            boids.push(boid_at(100.0 + 10.0 * k as f32, 100.0, 1.0));
        }

        let links = network_links(&boids, &params, 1920.0);
        for i in 0..boids.len() {
            assert!(links.iter().filter(|l| l.from == i).count() <= params.network_max_connections);
        }

        let from_first: Vec<usize> = links.iter().filter(|l| l.from == 0).map(|l| l.to).collect();
        assert_eq!(from_first, vec![1, 2, 3]);
    }

    #[test]
    fn opacity_falls_off_with_distance() {
        let params = flat_params();
        let range = params.network_range();
        let boids = vec![boid_at(0.0, 0.0, 1.0), boid_at(range / 2.0, 0.0, 0.5)];
        let links = network_links(&boids, &params, 1920.0);
        assert_eq!(links.len(), 2);
        let expected = params.network_opacity * 0.5 * 0.5;
        assert!((links[0].opacity - expected).abs() < 1e-5);
    }

    #[test]
    fn out_of_range_is_not_linked() {
        let params = flat_params();
        let range = params.network_range();
        let boids = vec![boid_at(0.0, 0.0, 1.0), boid_at(range + 1.0, 0.0, 1.0)];
        assert!(network_links(&boids, &params, 1920.0).is_empty());
    }

    #[test]
    fn invisible_boids_are_never_linked() {
        let params = flat_params();
        let boids = vec![
            boid_at(100.0, 100.0, 1.0),
            boid_at(110.0, 100.0, 0.0),
            boid_at(120.0, 100.0, 1.0),
        ];
        let links = network_links(&boids, &params, 1920.0);
        assert!(!links.is_empty());
        assert!(links.iter().all(|l| l.from != 1 && l.to != 1));
    }
}
