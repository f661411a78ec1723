//! Common test fixtures: bounding boxes and coverage documents.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use coverage_common::crs::CRS84_URI;

/// Common bounding box definitions for testing.
pub mod bbox {
    use coverage_common::BoundingBox;

    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: BoundingBox = BoundingBox {
        min_lon: -180.0,
        min_lat: -90.0,
        max_lon: 180.0,
        max_lat: 90.0,
    };

    /// North Atlantic
    pub const NORTH_ATLANTIC: BoundingBox = BoundingBox {
        min_lon: -80.0,
        min_lat: 0.0,
        max_lon: 0.0,
        max_lat: 60.0,
    };

    /// Pacific domain declared in 0..360 longitudes
    pub const PACIFIC_360: BoundingBox = BoundingBox {
        min_lon: 120.0,
        min_lat: -40.0,
        max_lon: 280.0,
        max_lat: 40.0,
    };

    /// Crosses the antimeridian without re-wrapping (unsupported)
    pub const STRADDLING: BoundingBox = BoundingBox {
        min_lon: 160.0,
        min_lat: -50.0,
        max_lon: -140.0,
        max_lat: 50.0,
    };
}

/// Parameter id used by the fixture documents.
pub const FIXTURE_PARAM: &str = "TEMP";

/// A 4 x 3 grid coverage with one time step and two depths.
///
/// Values are `depth_index * 100 + row * 10 + col`; the cell at row 2,
/// col 3 of the first depth is missing.
pub fn grid_coverage_json() -> Value {
    let mut values: Vec<Value> = Vec::new();
    for z in 0..2 {
        for row in 0..3 {
            for col in 0..4 {
                if z == 0 && row == 2 && col == 3 {
                    values.push(Value::Null);
                } else {
                    values.push(json!((z * 100 + row * 10 + col) as f64));
                }
            }
        }
    }
    json!({
        "type": "Coverage",
        "domain": {
            "type": "Grid",
            "crs": CRS84_URI,
            "x": [-30.0, -20.0, -10.0, 0.0],
            "y": [10.0, 20.0, 30.0],
            "bbox": [-30.0, 10.0, 0.0, 30.0],
            "time": ["2015-06-01T00:00:00Z"],
            "vertical": [5.0, 50.0]
        },
        "rangeType": {
            FIXTURE_PARAM: { "title": "Sea temperature", "uom": "degC" }
        },
        "range": {
            FIXTURE_PARAM: { "values": values }
        }
    })
}

/// The grid coverage with its range replaced by a reference to `range_id`.
pub fn lazy_grid_coverage_json(range_id: &str) -> Value {
    let mut doc = grid_coverage_json();
    doc["range"][FIXTURE_PARAM] = json!({ "id": range_id });
    doc
}

/// The range document referenced by [`lazy_grid_coverage_json`].
pub fn grid_range_json() -> Value {
    grid_coverage_json()["range"][FIXTURE_PARAM].clone()
}

/// Three profiles: two carry the fixture parameter, one only salinity.
pub fn profile_collection_json() -> Value {
    json!([
        {
            "type": "Coverage",
            "domain": { "type": "Profile", "x": -20.0, "y": 45.0, "z": [5.0, 10.0], "t": "2015-06-01T06:00:00Z" },
            "rangeType": { FIXTURE_PARAM: { "title": "Sea temperature", "uom": "degC" } },
            "range": { FIXTURE_PARAM: { "values": [12.5, 11.0] } }
        },
        {
            "type": "Coverage",
            "domain": { "type": "Profile", "x": -35.5, "y": 20.0, "z": [5.0, 10.0], "t": "2015-06-02T06:00:00Z" },
            "rangeType": { FIXTURE_PARAM: { "title": "Sea temperature", "uom": "degC" } },
            "range": { FIXTURE_PARAM: { "values": [24.0, null] } }
        },
        {
            "type": "Coverage",
            "domain": { "type": "Profile", "x": 10.0, "y": 0.0, "z": [5.0], "t": "2015-06-03T06:00:00Z" },
            "rangeType": { "PSAL": { "title": "Salinity", "uom": "psu" } },
            "range": { "PSAL": { "values": [35.1] } }
        }
    ])
}

/// Write `doc` as JSON to `dir/name`.
pub fn write_json(dir: &Path, name: &str, doc: &Value) -> std::io::Result<()> {
    fs::write(dir.join(name), serde_json::to_vec_pretty(doc)?)
}

/// A temporary directory holding:
///
/// - `grid.json`: inline grid coverage
/// - `lazy.json`: grid coverage whose range is in `lazy_range.json`
/// - `lazy_range.json`
/// - `profiles.json`: profile collection
pub fn fixture_dir() -> std::io::Result<TempDir> {
    let dir = tempfile::tempdir()?;
    write_json(dir.path(), "grid.json", &grid_coverage_json())?;
    write_json(dir.path(), "lazy.json", &lazy_grid_coverage_json("lazy_range.json"))?;
    write_json(dir.path(), "lazy_range.json", &grid_range_json())?;
    write_json(dir.path(), "profiles.json", &profile_collection_json())?;
    Ok(dir)
}
