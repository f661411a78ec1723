//! Integration tests for tile rasterization across projections and domains.

use coverage_common::{BoundingBox, TileCoord};
use grid_processor::{viewport_extent, InterpolationMethod, ParameterRange, ValueExtent};
use projection::{Geographic, LambertConformal, MapProjection, WebMercator};
use renderer::{render_tile, render_tile_with, GridSource, Palette, PaletteRegistry, RasterPath, RenderStyle};
use test_utils::{
    assert_pixels_eq, bbox, create_global_domain, create_index_values, create_regional_domain, create_sst_range,
    punch_holes,
};

fn blues() -> Palette {
    PaletteRegistry::with_defaults().get("blues").unwrap().clone()
}

fn assert_paths_identical(source: &GridSource<'_>, projection: &dyn MapProjection, tiles: &[TileCoord]) {
    let palette = blues();
    for method in InterpolationMethod::ALL {
        let style = RenderStyle {
            projection,
            palette: &palette,
            interpolation: method,
        };
        for tile in tiles {
            let req = tile.request(128);
            let generic = render_tile_with(source, &style, &req, RasterPath::Generic);
            let fast = render_tile_with(source, &style, &req, RasterPath::Separable);
            assert_pixels_eq!(generic.pixels(), fast.pixels(), 128);
        }
    }
}

// ============================================================================
// Generic vs separable equivalence
// ============================================================================

#[test]
fn test_global_sst_mercator_paths_identical() {
    let domain = create_global_domain(2.5);
    let range = create_sst_range(&domain);
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: range.palette_extent(),
    };
    let tiles = [
        TileCoord::new(0, 0, 0),
        TileCoord::new(1, 0, 1),
        TileCoord::new(2, 3, 1),
        TileCoord::new(4, 15, 7),
    ];
    assert_paths_identical(&source, &WebMercator, &tiles);
}

#[test]
fn test_regional_with_holes_geographic_paths_identical() {
    let domain = create_regional_domain(bbox::NORTH_ATLANTIC, 41, 31);
    let mut values = create_index_values(41, 31);
    punch_holes(&mut values, 7);
    let range = ParameterRange::new(&domain, values).unwrap();
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: range.palette_extent(),
    };
    let tiles = [TileCoord::new(1, 0, 0), TileCoord::new(2, 1, 0), TileCoord::new(3, 3, 2)];
    assert_paths_identical(&source, &Geographic, &tiles);
}

#[test]
fn test_pacific_360_domain_paths_identical() {
    let domain = create_regional_domain(bbox::PACIFIC_360, 33, 17);
    let range = create_sst_range(&domain);
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: range.palette_extent(),
    };
    // tiles on both sides of the antimeridian at zoom 2
    let tiles = [TileCoord::new(2, 0, 1), TileCoord::new(2, 3, 1), TileCoord::new(2, 3, 2)];
    assert_paths_identical(&source, &WebMercator, &tiles);
}

// ============================================================================
// Coverage and wrapping
// ============================================================================

#[test]
fn test_regional_domain_leaves_outside_transparent() {
    let domain = create_regional_domain(bbox::NORTH_ATLANTIC, 41, 31);
    let range = create_sst_range(&domain);
    let palette = blues();
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: range.palette_extent(),
    };
    let style = RenderStyle {
        projection: &WebMercator,
        palette: &palette,
        interpolation: InterpolationMethod::NearestNeighbor,
    };
    let img = render_tile(&source, &style, &TileCoord::new(0, 0, 0).request(256));

    // lon -40, lat 30 lies inside; lon 100, lat 30 and lon -40, lat -30 do not
    let inside = WebMercator.project(30.0, -40.0, 0);
    let east = WebMercator.project(30.0, 100.0, 0);
    let south = WebMercator.project(-30.0, -40.0, 0);
    let alpha = |(x, y): (f64, f64)| img.pixel(x as u32, y as u32).unwrap()[3];
    assert_eq!(alpha(inside), 255);
    assert_eq!(alpha(east), 0);
    assert_eq!(alpha(south), 0);
}

#[test]
fn test_pacific_360_domain_renders_west_of_antimeridian() {
    let domain = create_regional_domain(bbox::PACIFIC_360, 33, 17);
    let range = create_sst_range(&domain);
    let palette = blues();
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: range.palette_extent(),
    };
    let style = RenderStyle {
        projection: &WebMercator,
        palette: &palette,
        interpolation: InterpolationMethod::NearestNeighbor,
    };
    let img = render_tile(&source, &style, &TileCoord::new(0, 0, 0).request(256));

    // -100 wraps to 260, inside 120..280; 0 wraps to 0, outside
    let (x, y) = WebMercator.project(0.0, -100.0, 0);
    assert_eq!(img.pixel(x as u32, y as u32).unwrap()[3], 255);
    let (x, y) = WebMercator.project(0.0, 0.0, 0);
    assert_eq!(img.pixel(x as u32, y as u32).unwrap()[3], 0);
}

#[test]
fn test_missing_values_are_transparent() {
    let domain = create_global_domain(10.0);
    let range = ParameterRange::new(&domain, vec![None; domain.value_count()]).unwrap();
    let palette = blues();
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: Some(ValueExtent::new(0.0, 1.0)),
    };
    for method in InterpolationMethod::ALL {
        let style = RenderStyle {
            projection: &WebMercator,
            palette: &palette,
            interpolation: method,
        };
        let img = render_tile(&source, &style, &TileCoord::new(1, 1, 1).request(64));
        assert!(img.is_fully_transparent(), "{}", method);
    }
}

#[test]
fn test_fov_extent_changes_colors() {
    let domain = create_global_domain(5.0);
    let mut range = create_sst_range(&domain);
    let palette = blues();
    let style = RenderStyle {
        projection: &WebMercator,
        palette: &palette,
        interpolation: InterpolationMethod::NearestNeighbor,
    };
    let req = TileCoord::new(2, 2, 1).request(64);

    let global = {
        let source = GridSource {
            domain: &domain,
            slice: range.slice(0, 0).unwrap(),
            extent: range.palette_extent(),
        };
        render_tile(&source, &style, &req)
    };

    let view = BoundingBox::new(0.0, 0.0, 90.0, 66.0);
    let fov = viewport_extent(&domain, &range, 0, 0, &view).unwrap();
    assert!(fov.is_some());
    range.set_palette_extent(fov);
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: range.palette_extent(),
    };
    let local = render_tile(&source, &style, &req);
    assert_ne!(global, local);
}

#[test]
fn test_lambert_renders_conus() {
    let domain = create_regional_domain(BoundingBox::new(-130.0, 20.0, -60.0, 55.0), 71, 36);
    let range = create_sst_range(&domain);
    let palette = blues();
    let lambert = LambertConformal::north_america();
    let source = GridSource {
        domain: &domain,
        slice: range.slice(0, 0).unwrap(),
        extent: range.palette_extent(),
    };
    let style = RenderStyle {
        projection: &lambert,
        palette: &palette,
        interpolation: InterpolationMethod::InverseDistanceWeighted,
    };
    let img = render_tile(&source, &style, &TileCoord::new(0, 0, 0).request(256));
    // the projection origin maps to the world center
    assert_eq!(img.pixel(128, 128).unwrap()[3], 255);
    assert!(!img.is_fully_transparent());
}
