//! Coordinate reference systems accepted for coverage domains.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CoverageError;

/// Canonical URI of the OGC CRS84 geographic CRS (lon/lat axis order).
pub const CRS84_URI: &str = "http://www.opengis.net/def/crs/OGC/1.3/CRS84";

/// Domain CRS. Only geographic CRS84 is supported; anything else is
/// rejected when a domain is constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    #[default]
    Crs84,
}

impl Crs {
    /// Parse a CRS identifier.
    ///
    /// Accepts:
    /// - "http://www.opengis.net/def/crs/OGC/1.3/CRS84"
    /// - "CRS:84" / "OGC:CRS84" (case-insensitive)
    pub fn parse(s: &str) -> Result<Self, CoverageError> {
        let trimmed = s.trim();
        if trimmed == CRS84_URI {
            return Ok(Crs::Crs84);
        }
        match trimmed.to_uppercase().as_str() {
            "CRS:84" | "OGC:CRS84" | "CRS84" => Ok(Crs::Crs84),
            _ => Err(CoverageError::UnsupportedCoordinateSystem(s.to_string())),
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Crs::Crs84 => CRS84_URI,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs84_forms() {
        assert_eq!(Crs::parse(CRS84_URI).unwrap(), Crs::Crs84);
        assert_eq!(Crs::parse("crs:84").unwrap(), Crs::Crs84);
        assert_eq!(Crs::parse("OGC:CRS84").unwrap(), Crs::Crs84);
    }

    #[test]
    fn test_rejects_lat_lon_order_crs() {
        let err = Crs::parse("EPSG:4326").unwrap_err();
        assert!(matches!(err, CoverageError::UnsupportedCoordinateSystem(ref s) if s == "EPSG:4326"));
    }
}
