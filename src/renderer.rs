/*
 * Renderer Module
 *
 * This module handles the drawing side of the backdrop. The simulation only
 * ever talks to a Surface, a minimal set of drawing commands, so it can draw
 * into a nannou window or into a recording used by tests and benchmarks.
 *
 * Boids are drawn as small paper aeroplanes pointing along their velocity,
 * network lines as thin strokes. Both are filled with the theme colour at an
 * alpha that already includes fade and centre-column dimming.
 */

use nannou::prelude::*;

use crate::boid::Boid;
use crate::colour::Rgb;
use crate::network::{centre_opacity_factor, Link};
use crate::params::FlockParams;

pub const LINE_WEIGHT: f32 = 0.5;

/// Drawing commands in canvas pixels (origin top-left, y down).
pub trait Surface {
    fn clear(&mut self);
    fn fill_polygon(&mut self, points: &[Point2], colour: Rgb, alpha: f32);
    fn line(&mut self, start: Point2, end: Point2, weight: f32, colour: Rgb, alpha: f32);
}

// Paper aeroplane outline around the boid, rotated to its heading
pub fn boid_glyph(boid: &Boid, params: &FlockParams) -> [Point2; 4] {
    let size = params.boid_size;
    let half_width = size * params.boid_width;
    let length = size * params.boid_length;
    let indent = size * params.boid_indent;

    let local = [
        pt2(length, 0.0),                // nose
        pt2(-length, -half_width),       // top wing
        pt2(-length + indent, 0.0),      // tail indent
        pt2(-length, half_width),        // bottom wing
    ];

    let (sin, cos) = boid.heading().sin_cos();
    local.map(|p| pt2(p.x * cos - p.y * sin, p.x * sin + p.y * cos) + boid.position)
}

// Draw one boid; returns whether anything was drawn
pub fn draw_boid(surface: &mut dyn Surface, boid: &Boid, colour: Rgb, params: &FlockParams, screen_width: f32) -> bool {
    if !boid.is_visible() {
        return false;
    }

    let alpha = boid.opacity * centre_opacity_factor(boid.position.x, screen_width, params);
    if alpha <= 0.0 {
        return false;
    }

    surface.fill_polygon(&boid_glyph(boid, params), colour, alpha);
    true
}

pub fn draw_network(surface: &mut dyn Surface, boids: &[Boid], links: &[Link], colour: Rgb) {
    for link in links {
        surface.line(boids[link.from].position, boids[link.to].position, LINE_WEIGHT, colour, link.opacity);
    }
}

/// Surface backed by a nannou `Draw`, mapping canvas pixels onto the window
/// (centre origin, y up).
pub struct NannouSurface<'a> {
    draw: &'a Draw,
    window_rect: Rect,
    background: Rgb,
}

impl<'a> NannouSurface<'a> {
    pub fn new(draw: &'a Draw, window_rect: Rect, background: Rgb) -> Self {
        Self { draw, window_rect, background }
    }

    #[inline]
    fn to_window(&self, p: Point2) -> Point2 {
        pt2(self.window_rect.left() + p.x, self.window_rect.top() - p.y)
    }
}

fn to_rgba(colour: Rgb, alpha: f32) -> Rgba {
    rgba(
        colour.r as f32 / 255.0,
        colour.g as f32 / 255.0,
        colour.b as f32 / 255.0,
        alpha.clamp(0.0, 1.0),
    )
}

impl Surface for NannouSurface<'_> {
    fn clear(&mut self) {
        self.draw.background().color(to_rgba(self.background, 1.0));
    }

    fn fill_polygon(&mut self, points: &[Point2], colour: Rgb, alpha: f32) {
        let points: Vec<Point2> = points.iter().map(|&p| self.to_window(p)).collect();
        self.draw.polygon().color(to_rgba(colour, alpha)).points(points);
    }

    fn line(&mut self, start: Point2, end: Point2, weight: f32, colour: Rgb, alpha: f32) {
        self.draw
            .line()
            .start(self.to_window(start))
            .end(self.to_window(end))
            .weight(weight)
            .color(to_rgba(colour, alpha));
    }
}

/// A drawn primitive, as captured by `RecordingSurface`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Polygon { points: Vec<Point2>, colour: Rgb, alpha: f32 },
    Line { start: Point2, end: Point2, weight: f32, colour: Rgb, alpha: f32 },
}

/// Headless surface that records every command.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polygon_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Polygon { .. })).count()
    }

    pub fn line_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Line { .. })).count()
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }

    // Draw the recorded frame again onto another surface
    pub fn replay(&self, target: &mut dyn Surface) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear => target.clear(),
                DrawCommand::Polygon { points, colour, alpha } => target.fill_polygon(points, *colour, *alpha),
                DrawCommand::Line { start, end, weight, colour, alpha } => {
                    target.line(*start, *end, *weight, *colour, *alpha)
                }
            }
        }
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_polygon(&mut self, points: &[Point2], colour: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Polygon { points: points.to_vec(), colour, alpha });
    }

    fn line(&mut self, start: Point2, end: Point2, weight: f32, colour: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Line { start, end, weight, colour, alpha });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_points_along_velocity() {
        let params = FlockParams::default();
        let boid = Boid::new(pt2(100.0, 100.0), vec2(0.0, 2.0));
        let glyph = boid_glyph(&boid, &params);
        let nose = glyph[0];
        let length = params.boid_size * params.boid_length;
        assert!((nose.x - 100.0).abs() < 1e-4);
        assert!((nose.y - (100.0 + length)).abs() < 1e-4);
    }

    #[test]
    fn invisible_boid_is_not_drawn() {
        let params = FlockParams::default();
        let mut surface = RecordingSurface::new();
        let mut boid = Boid::new(pt2(10.0, 10.0), vec2(1.0, 0.0));
        boid.opacity = 0.0;
        assert!(!draw_boid(&mut surface, &boid, Rgb::FALLBACK, &params, 1920.0));
        assert!(surface.commands.is_empty());
    }

    #[test]
    fn alpha_includes_centre_fade() {
        let params = FlockParams::default();
        let mut surface = RecordingSurface::new();
        let boid = Boid::new(pt2(960.0, 10.0), vec2(1.0, 0.0));
        assert!(draw_boid(&mut surface, &boid, Rgb::FALLBACK, &params, 1920.0));
        match &surface.commands[0] {
            DrawCommand::Polygon { points, alpha, .. } => {
                assert_eq!(points.len(), 4);
                assert!((alpha - params.centre_min_opacity).abs() < 1e-6);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn replay_reproduces_commands() {
        let params = FlockParams::default();
        let mut recorded = RecordingSurface::new();
        recorded.clear();
        draw_boid(&mut recorded, &Boid::new(pt2(50.0, 50.0), vec2(1.0, 0.0)), Rgb::FALLBACK, &params, 1920.0);

        let mut copy = RecordingSurface::new();
        recorded.replay(&mut copy);
        assert_eq!(copy.commands, recorded.commands);
    }

    #[test]
    fn network_lines_use_link_opacity() {
        let mut surface = RecordingSurface::new();
        let boids = vec![
            Boid::new(pt2(0.0, 0.0), Vec2::ZERO),
            Boid::new(pt2(10.0, 0.0), Vec2::ZERO),
        ];
        let links = [Link { from: 0, to: 1, distance: 10.0, opacity: 0.25 }];
        draw_network(&mut surface, &boids, &links, Rgb::FALLBACK);
        assert_eq!(surface.line_count(), 1);
        assert_eq!(
            surface.commands[0],
            DrawCommand::Line {
                start: pt2(0.0, 0.0),
                end: pt2(10.0, 0.0),
                weight: LINE_WEIGHT,
                colour: Rgb::FALLBACK,
                alpha: 0.25,
            }
        );
    }
}
