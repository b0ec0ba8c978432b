/*
 * Colour Module
 *
 * Theme palette and colour conversion for the backdrop. Boids and network
 * lines are drawn in the active theme's rule colour. The palette is defined
 * in OKLCH and converted to sRGB here; custom colour values can also be
 * parsed from CSS colour strings.
 */

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Used whenever a colour can't be resolved.
    pub const FALLBACK: Rgb = Rgb::new(50, 50, 50);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert an OKLCH colour (lightness 0..1, chroma, hue in degrees).
    pub fn from_oklch(l: f32, c: f32, h: f32) -> Self {
        let hue = h.to_radians();
        let a = c * hue.cos();
        let b = c * hue.sin();

        let l_ = l + 0.396_337_78 * a + 0.215_803_76 * b;
        let m_ = l - 0.105_561_35 * a - 0.063_854_17 * b;
        let s_ = l - 0.089_484_18 * a - 1.291_485_5 * b;

        let (l3, m3, s3) = (l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_);

        let r = 4.076_741_7 * l3 - 3.307_711_6 * m3 + 0.230_969_94 * s3;
        let g = -1.268_438 * l3 + 2.609_757_4 * m3 - 0.341_319_38 * s3;
        let b = -0.004_196_086_3 * l3 - 0.703_418_6 * m3 + 1.707_614_7 * s3;

        Self::new(encode_srgb(r), encode_srgb(g), encode_srgb(b))
    }

    /// Parse `#rgb`, `#rrggbb`, `rgb()`/`rgba()` and `oklch()` values.
    pub fn parse_css(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return parse_hex(hex);
        }

        let (name, args) = value.strip_suffix(')')?.split_once('(')?;
        // Alpha is ignored; opacity comes from the simulation
        let args = args.split('/').next()?;
        let parts: Vec<&str> = args
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        match name.trim().to_ascii_lowercase().as_str() {
            "rgb" | "rgba" if parts.len() >= 3 => {
                let channel = |p: &str| -> Option<u8> {
                    let v = match p.strip_suffix('%') {
                        Some(pct) => pct.parse::<f32>().ok()? / 100.0 * 255.0,
                        None => p.parse::<f32>().ok()?,
                    };
                    Some(v.round().clamp(0.0, 255.0) as u8)
                };
                Some(Self::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
            }
            "oklch" if parts.len() >= 3 => {
                let l = match parts[0].strip_suffix('%') {
                    Some(pct) => pct.parse::<f32>().ok()? / 100.0,
                    None => parts[0].parse::<f32>().ok()?,
                };
                let c = parts[1].parse::<f32>().ok()?;
                let h = parts[2].trim_end_matches("deg").parse::<f32>().ok()?;
                Some(Self::from_oklch(l, c, h))
            }
            _ => None,
        }
    }

    pub fn parse_css_or_fallback(value: &str) -> Self {
        Self::parse_css(value).unwrap_or_else(|| {
            debug!(value, "unparsable colour value, using fallback");
            Self::FALLBACK
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// Linear light to gamma-encoded 8-bit channel
fn encode_srgb(linear: f32) -> u8 {
    let x = linear.clamp(0.0, 1.0);
    let encoded = if x <= 0.003_130_8 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round().clamp(0.0, 255.0) as u8
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(Rgb::new(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 => Some(Rgb::new(pair(0)?, pair(2)?, pair(4)?)),
        _ => None,
    }
}

/// Site colour theme. The active theme is carried as a `theme-<id>` class on
/// the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Steel,
    Purple,
    Charcoal,
    Teal,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Steel, Theme::Purple, Theme::Charcoal, Theme::Teal];

    pub fn id(self) -> &'static str {
        match self {
            Theme::Steel => "steel",
            Theme::Purple => "purple",
            Theme::Charcoal => "charcoal",
            Theme::Teal => "teal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Steel => "STEEL GREY + WARM CREAM",
            Theme::Purple => "DARK PURPLE + GOLD",
            Theme::Charcoal => "WARM CHARCOAL + OFF-WHITE",
            Theme::Teal => "DARK TEAL + CORAL",
        }
    }

    pub fn class_name(self) -> String {
        format!("theme-{}", self.id())
    }

    pub fn from_id(id: &str) -> Option<Theme> {
        Theme::ALL.into_iter().find(|t| t.id() == id)
    }

    /// First `theme-*` class naming a known theme.
    pub fn from_class_list(classes: &str) -> Option<Theme> {
        classes
            .split_whitespace()
            .filter_map(|class| class.strip_prefix("theme-"))
            .find_map(Theme::from_id)
    }

    /// Next theme in switcher order.
    pub fn next(self) -> Theme {
        let i = Theme::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Theme::ALL[(i + 1) % Theme::ALL.len()]
    }

    // (l, c, h) for background and rule
    fn palette(self) -> ((f32, f32, f32), (f32, f32, f32)) {
        match self {
            Theme::Steel => ((0.2293, 0.009, 255.6), (0.359, 0.0095, 260.72)),
            Theme::Purple => ((0.227, 0.0199, 303.08), (0.3369, 0.0255, 304.52)),
            Theme::Charcoal => ((0.2478, 0.0, 0.0), (0.3715, 0.0, 0.0)),
            Theme::Teal => ((0.2239, 0.0239, 195.58), (0.3243, 0.0378, 195.45)),
        }
    }

    pub fn background_colour(self) -> Rgb {
        let (l, c, h) = self.palette().0;
        Rgb::from_oklch(l, c, h)
    }

    /// Colour the flock is drawn in.
    pub fn rule_colour(self) -> Rgb {
        let (l, c, h) = self.palette().1;
        Rgb::from_oklch(l, c, h)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: Rgb, expected: (u8, u8, u8)) -> bool {
        let d = |a: u8, b: u8| (a as i16 - b as i16).abs() <= 1;
        d(actual.r, expected.0) && d(actual.g, expected.1) && d(actual.b, expected.2)
    }

    #[test]
    fn oklch_extremes() {
        assert_eq!(Rgb::from_oklch(1.0, 0.0, 0.0), Rgb::new(255, 255, 255));
        assert_eq!(Rgb::from_oklch(0.0, 0.0, 0.0), Rgb::new(0, 0, 0));
    }

    #[test]
    fn theme_rule_colours() {
        assert!(close(Theme::Steel.rule_colour(), (58, 61, 66)));
        assert!(close(Theme::Purple.rule_colour(), (58, 52, 66)));
        assert!(close(Theme::Charcoal.rule_colour(), (64, 64, 64)));
        assert!(close(Theme::Teal.rule_colour(), (26, 58, 58)));
    }

    #[test]
    fn theme_background_colours() {
        assert!(close(Theme::Steel.background_colour(), (26, 29, 33)));
        assert!(close(Theme::Charcoal.background_colour(), (33, 33, 33)));
        assert!(close(Theme::Teal.background_colour(), (13, 31, 31)));
    }

    #[test]
    fn parses_css_forms() {
        assert_eq!(Rgb::parse_css("#fff"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::parse_css(" #3a3d42 "), Some(Rgb::new(0x3a, 0x3d, 0x42)));
        assert_eq!(Rgb::parse_css("rgb(10, 20, 30)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(Rgb::parse_css("rgba(10 20 30 / 0.5)"), Some(Rgb::new(10, 20, 30)));
        assert_eq!(Rgb::parse_css("rgb(100%, 0%, 50%)"), Some(Rgb::new(255, 0, 128)));
        assert!(close(Rgb::parse_css("oklch(0.3715 0 0)").unwrap(), (64, 64, 64)));
        assert!(close(Rgb::parse_css("oklch(37.15% 0 0deg)").unwrap(), (64, 64, 64)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Rgb::parse_css(""), None);
        assert_eq!(Rgb::parse_css("#12345"), None);
        assert_eq!(Rgb::parse_css("#zzzzzz"), None);
        assert_eq!(Rgb::parse_css("hsl(1, 2%, 3%)"), None);
        assert_eq!(Rgb::parse_css("rgb(1, 2)"), None);
        assert_eq!(Rgb::parse_css_or_fallback("var(--rule)"), Rgb::FALLBACK);
    }

    #[test]
    fn theme_from_classes() {
        assert_eq!(Theme::from_class_list("js theme-teal dark"), Some(Theme::Teal));
        assert_eq!(Theme::from_class_list("theme-unknown theme-purple"), Some(Theme::Purple));
        assert_eq!(Theme::from_class_list("no-theme here"), None);
        assert_eq!(Theme::Charcoal.class_name(), "theme-charcoal");
    }

    #[test]
    fn cycles_through_all_themes() {
        let mut theme = Theme::Steel;
        for expected in [Theme::Purple, Theme::Charcoal, Theme::Teal, Theme::Steel] {
            theme = theme.next();
            assert_eq!(theme, expected);
        }
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(Rgb::new(58, 61, 66).to_string(), "#3a3d42");
    }
}
