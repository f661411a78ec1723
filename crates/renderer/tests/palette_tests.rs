//! Palette registry, value scaling and legends.

use grid_processor::ValueExtent;
use renderer::{palette_index, Legend, Palette, PaletteRegistry, Rgb, DEFAULT_PALETTE};

#[test]
fn test_every_builtin_palette_has_256_entries() {
    let registry = PaletteRegistry::with_defaults();
    for name in ["gray", "grayinv", "rainbow", "blues", "greens", "reds", "GnBu", "YlGnBu"] {
        let palette = registry.get(name).unwrap();
        assert_eq!(palette.colors().len(), 256, "{}", name);
    }
    assert!(registry.get(DEFAULT_PALETTE).is_ok());
}

#[test]
fn test_endpoints_map_to_first_and_last_keys() {
    let registry = PaletteRegistry::with_defaults();
    let rainbow = registry.get("rainbow").unwrap();
    let extent = ValueExtent::new(271.15, 303.15);
    assert_eq!(rainbow.color_for(271.15, &extent), Some(Rgb::new(0, 0, 255)));
    assert_eq!(rainbow.color_for(303.15, &extent), Some(Rgb::new(255, 0, 0)));
}

#[test]
fn test_scaling_is_monotonic() {
    let extent = ValueExtent::new(-2.0, 30.0);
    let mut last = 0u8;
    for i in 0..=320 {
        let v = -2.0 + i as f64 * 0.1;
        let idx = palette_index(v, &extent).unwrap();
        assert!(idx >= last, "index fell at {}", v);
        last = idx;
    }
    assert_eq!(last, 255);
}

#[test]
fn test_custom_palette_replaces_builtin() {
    let mut registry = PaletteRegistry::with_defaults();
    let count = registry.len();
    registry.add(Palette::from_hex_keys("blues", &["#000000", "#0000ff"]).unwrap());
    assert_eq!(registry.len(), count);
    assert_eq!(registry.get("blues").unwrap().color(255), Rgb::new(0, 0, 255));
    assert!(Palette::from_hex_keys("bad", &["#00000g"]).is_err());
    assert!(Palette::linear("empty", &[]).is_err());
}

#[test]
fn test_legend_serializes() {
    let registry = PaletteRegistry::with_defaults();
    let legend = Legend::new(
        "Sea temperature",
        Some("K".to_string()),
        registry.get("gray").unwrap(),
        &ValueExtent::new(270.0, 305.5),
    );
    let json = serde_json::to_value(&legend).unwrap();
    assert_eq!(json["low"], "270.00");
    assert_eq!(json["high"], "305.50");
    assert_eq!(json["colors"][0], "#ffffff");
    assert_eq!(json["colors"].as_array().unwrap().len(), 256);
}
