//! Color palettes: 256-entry lookup tables and the value-to-color mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use coverage_common::CoverageError;
use grid_processor::ValueExtent;

/// Number of entries in every palette.
pub const PALETTE_SIZE: usize = 256;

/// Brightness factor of marker outlines relative to their fill.
pub const STROKE_FACTOR: f64 = 0.7;

/// Name of the palette selected when nothing else is configured.
pub const DEFAULT_PALETTE: &str = "blues";

/// An opaque RGB color. Serialized as "#rrggbb".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse "#rrggbb" or "rrggbb".
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Linear interpolation towards `other`, rounded per channel.
    pub fn lerp(&self, other: &Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Outline color for point markers.
    pub fn stroke(&self) -> Rgb {
        let dim = |c: u8| (c as f64 * STROKE_FACTOR).round() as u8;
        Rgb::new(dim(self.r), dim(self.g), dim(self.b))
    }

    pub fn to_rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s).ok_or_else(|| format!("invalid color '{}'", s))
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

/// Palette index for `value` under `extent`.
///
/// `floor((255 + 0.9999) * (value - min) / (max - min))`, clamped to
/// `[0, 255]`. A degenerate extent maps everything to 0. Returns `None` for
/// a non-finite value.
#[inline]
pub fn palette_index(value: f64, extent: &ValueExtent) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    let span = extent.max - extent.min;
    if span == 0.0 || !span.is_finite() {
        return Some(0);
    }
    let scaled = ((255.0 + 0.9999) * (value - extent.min) / span).floor();
    Some(scaled.clamp(0.0, 255.0) as u8)
}

/// A named 256-entry color lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    name: String,
    colors: Vec<Rgb>,
}

impl Palette {
    /// Expand color keys into 256 entries by linear interpolation across
    /// equally spaced segments. A single key yields a constant palette.
    pub fn linear(name: impl Into<String>, keys: &[Rgb]) -> Result<Self, CoverageError> {
        let name = name.into();
        let colors = match keys {
            [] => {
                return Err(CoverageError::invalid_parameter(
                    "palette",
                    format!("palette '{}' has no color keys", name),
                ))
            }
            [only] => vec![*only; PALETTE_SIZE],
            _ => {
                let segments = keys.len() - 1;
                (0..PALETTE_SIZE)
                    .map(|i| {
                        let pos = i as f64 / (PALETTE_SIZE - 1) as f64 * segments as f64;
                        let seg = (pos.floor() as usize).min(segments - 1);
                        keys[seg].lerp(&keys[seg + 1], pos - seg as f64)
                    })
                    .collect()
            }
        };
        Ok(Self { name, colors })
    }

    /// Like [`Palette::linear`] with "#rrggbb" keys.
    pub fn from_hex_keys(name: impl Into<String>, keys: &[&str]) -> Result<Self, CoverageError> {
        let name = name.into();
        let parsed = keys
            .iter()
            .map(|k| {
                Rgb::from_hex(k).ok_or_else(|| {
                    CoverageError::invalid_parameter("palette", format!("bad color key '{}'", k))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::linear(name, &parsed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    #[inline]
    pub fn color(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }

    /// Color of `value` under `extent`, `None` for a non-finite value.
    #[inline]
    pub fn color_for(&self, value: f64, extent: &ValueExtent) -> Option<Rgb> {
        palette_index(value, extent).map(|i| self.color(i))
    }
}

/// Named palettes. Owned by whoever selects the active palette; there is no
/// global registry.
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    palettes: BTreeMap<String, Palette>,
}

impl PaletteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in palettes: gray, grayinv, rainbow and the ColorBrewer
    /// sequential schemes blues, greens, reds, GnBu, YlGnBu.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, keys) in BUILTIN_PALETTES {
            if let Ok(palette) = Palette::from_hex_keys(*name, keys) {
                registry.add(palette);
            }
        }
        registry
    }

    /// Add or replace a palette under its own name.
    pub fn add(&mut self, palette: Palette) {
        self.palettes.insert(palette.name.clone(), palette);
    }

    pub fn get(&self, name: &str) -> Result<&Palette, CoverageError> {
        self.palettes
            .get(name)
            .ok_or_else(|| CoverageError::PaletteNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.palettes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }
}

const BUILTIN_PALETTES: &[(&str, &[&str])] = &[
    ("gray", &["#FFFFFF", "#000000"]),
    ("grayinv", &["#000000", "#FFFFFF"]),
    ("rainbow", &["#0000FF", "#00FFFF", "#00FF00", "#FFFF00", "#FF0000"]),
    (
        "blues",
        &["#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c", "#08306b"],
    ),
    (
        "greens",
        &["#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c", "#00441b"],
    ),
    (
        "reds",
        &["#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15", "#67000d"],
    ),
    (
        "GnBu",
        &["#f7fcf0", "#e0f3db", "#ccebc5", "#a8ddb5", "#7bccc4", "#4eb3d3", "#2b8cbe", "#0868ac", "#084081"],
    ),
    (
        "YlGnBu",
        &["#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494", "#081d58"],
    ),
];

/// Legend contents for one parameter layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub title: String,
    pub uom: Option<String>,
    /// Palette extent formatted with two decimals.
    pub low: String,
    pub high: String,
    pub colors: Vec<Rgb>,
}

impl Legend {
    pub fn new(title: impl Into<String>, uom: Option<String>, palette: &Palette, extent: &ValueExtent) -> Self {
        Self {
            title: title.into(),
            uom,
            low: format!("{:.2}", extent.min),
            high: format!("{:.2}", extent.max),
            colors: palette.colors().to_vec(),
        }
    }

    /// Vertical color strip, high values on top, as RGBA bytes.
    pub fn render_strip(&self, width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        let n = self.colors.len();
        for row in 0..height {
            let frac = if height > 1 {
                1.0 - row as f64 / (height - 1) as f64
            } else {
                1.0
            };
            let idx = ((frac * (n.saturating_sub(1)) as f64).round() as usize).min(n.saturating_sub(1));
            let rgba = self.colors.get(idx).map(Rgb::to_rgba).unwrap_or([0, 0, 0, 0]);
            for _ in 0..width {
                pixels.extend_from_slice(&rgba);
            }
        }
        pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse() {
        assert_eq!(Rgb::from_hex("#08306b"), Some(Rgb::new(8, 48, 107)));
        assert_eq!(Rgb::from_hex("FFFFFF"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
    }

    #[test]
    fn test_linear_expansion_endpoints() {
        let p = Palette::from_hex_keys("gray", &["#FFFFFF", "#000000"]).unwrap();
        assert_eq!(p.colors().len(), PALETTE_SIZE);
        assert_eq!(p.color(0), Rgb::new(255, 255, 255));
        assert_eq!(p.color(255), Rgb::new(0, 0, 0));
        assert_eq!(p.color(128), Rgb::new(127, 127, 127));
    }

    #[test]
    fn test_multi_segment_passes_through_keys() {
        let p = Palette::from_hex_keys("rgb", &["#FF0000", "#00FF00", "#0000FF"]).unwrap();
        assert_eq!(p.color(0), Rgb::new(255, 0, 0));
        assert_eq!(p.color(255), Rgb::new(0, 0, 255));
        // index 127.5 would be the exact middle key; neighbors are close to green
        assert!(p.color(127).g > 250 && p.color(128).g > 250);
    }

    #[test]
    fn test_palette_index_formula() {
        let e = ValueExtent::new(0.0, 10.0);
        assert_eq!(palette_index(0.0, &e), Some(0));
        assert_eq!(palette_index(10.0, &e), Some(255));
        assert_eq!(palette_index(5.0, &e), Some(127));
        assert_eq!(palette_index(-3.0, &e), Some(0));
        assert_eq!(palette_index(1e9, &e), Some(255));
        assert_eq!(palette_index(f64::NAN, &e), None);
        assert_eq!(palette_index(4.2, &ValueExtent::new(4.2, 4.2)), Some(0));
    }

    #[test]
    fn test_stroke_color() {
        assert_eq!(Rgb::new(100, 200, 10).stroke(), Rgb::new(70, 140, 7));
        assert_eq!(Rgb::new(0, 0, 0).stroke(), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_registry_defaults() {
        let reg = PaletteRegistry::with_defaults();
        assert_eq!(reg.len(), 8);
        let blues = reg.get(DEFAULT_PALETTE).unwrap();
        assert_eq!(blues.color(0).to_hex(), "#f7fbff");
        assert_eq!(blues.color(255).to_hex(), "#08306b");
        assert!(matches!(reg.get("viridis"), Err(CoverageError::PaletteNotFound(_))));
        assert!(reg.names().any(|n| n == "YlGnBu"));
    }

    #[test]
    fn test_legend_strip() {
        let p = Palette::from_hex_keys("gray", &["#FFFFFF", "#000000"]).unwrap();
        let legend = Legend::new("Temperature", Some("K".into()), &p, &ValueExtent::new(271.15, 300.0));
        assert_eq!(legend.low, "271.15");
        assert_eq!(legend.high, "300.00");
        let strip = legend.render_strip(2, 3);
        assert_eq!(strip.len(), 2 * 3 * 4);
        assert_eq!(&strip[0..4], &[0, 0, 0, 255]);
        assert_eq!(&strip[16..20], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_rgb_serde_as_hex() {
        let json = serde_json::to_string(&Rgb::new(8, 48, 107)).unwrap();
        assert_eq!(json, "\"#08306b\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(8, 48, 107));
        assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
    }
}
