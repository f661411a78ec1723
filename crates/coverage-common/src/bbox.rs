//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};

/// A longitude/latitude bounding box in degrees.
///
/// Serialized as the four-element array `[lonMin, latMin, lonMax, latMax]`
/// used by coverage documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Parse a "west,south,east,north" string.
    pub fn from_csv(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut values = [0.0; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }
        Ok(values.into())
    }

    /// Longitude span in degrees. Negative when the box straddles the antimeridian.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// True when the west edge lies east of the east edge, i.e. the box
    /// crosses the antimeridian without being re-wrapped.
    pub fn straddles_antimeridian(&self) -> bool {
        self.min_lon > self.max_lon
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat
    }

    /// Inclusive containment test on both axes.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        self.contains_lon(lon) && self.contains_lat(lat)
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.min_lon, b.min_lat, b.max_lon, b.max_lat]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bbox format: {0}. Expected 'west,south,east,north'")]
    InvalidFormat(String),

    #[error("Invalid number in bbox: {0}")]
    InvalidNumber(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        let bbox = BoundingBox::from_csv("-125.0, 24.0,-66.0,50.0").unwrap();
        assert_eq!(bbox.min_lon, -125.0);
        assert_eq!(bbox.min_lat, 24.0);
        assert_eq!(bbox.max_lon, -66.0);
        assert_eq!(bbox.max_lat, 50.0);
    }

    #[test]
    fn test_straddles_antimeridian() {
        assert!(BoundingBox::new(170.0, -10.0, -170.0, 10.0).straddles_antimeridian());
        assert!(!BoundingBox::new(-180.0, -90.0, 180.0, 90.0).straddles_antimeridian());
    }

    #[test]
    fn test_serde_array_form() {
        let bbox: BoundingBox = serde_json::from_str("[0.5, -1, 20, 30.25]").unwrap();
        assert_eq!(bbox, BoundingBox::new(0.5, -1.0, 20.0, 30.25));
        assert_eq!(serde_json::to_string(&bbox).unwrap(), "[0.5,-1.0,20.0,30.25]");
    }
}
