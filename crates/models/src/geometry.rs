//! WKT codec for zone polygons.
//!
//! Zones are persisted as WKT text; PostGIS derives the indexed geometry from
//! it, and in-process code works with `geo` types.

use geo::{coord, LineString, MultiPolygon, Polygon};
use wkt::{ToWkt, TryFromWkt};

use crate::errors::ModelError;

pub fn to_wkt(mpoly: &MultiPolygon<f64>) -> String {
    mpoly.wkt_string()
}

/// Parse `MULTIPOLYGON` text; a bare `POLYGON` is promoted to a one-member multipolygon.
pub fn from_wkt(text: &str) -> Result<MultiPolygon<f64>, ModelError> {
    match MultiPolygon::<f64>::try_from_wkt_str(text) {
        Ok(mp) => Ok(mp),
        Err(multi_err) => Polygon::<f64>::try_from_wkt_str(text)
            .map(|p| MultiPolygon::new(vec![p]))
            .map_err(|_| ModelError::field("mpoly", format!("invalid WKT multipolygon: {multi_err}"))),
    }
}

/// Axis-aligned rectangle as a single-polygon multipolygon.
pub fn rectangle(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> MultiPolygon<f64> {
    let ring = LineString::from(vec![
        coord! { x: min_lon, y: min_lat },
        coord! { x: max_lon, y: min_lat },
        coord! { x: max_lon, y: max_lat },
        coord! { x: min_lon, y: max_lat },
        coord! { x: min_lon, y: min_lat },
    ]);
    MultiPolygon::new(vec![Polygon::new(ring, vec![])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wkt_round_trip_keeps_geometry() {
        let mp = rectangle(30.0, 50.0, 31.0, 51.0);
        let text = to_wkt(&mp);
        assert!(text.starts_with("MULTIPOLYGON"));
        assert_eq!(from_wkt(&text).unwrap(), mp);
    }

    #[test]
    fn bare_polygon_is_promoted() {
        let mp = from_wkt("POLYGON((0 0,1 0,1 1,0 1,0 0))").unwrap();
        assert_eq!(mp.0.len(), 1);
    }

    #[test]
    fn garbage_is_a_field_error() {
        match from_wkt("POINT(") {
            Err(ModelError::Validation(e)) => assert!(e.contains("mpoly")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
