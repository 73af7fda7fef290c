// ===============================
// src/zones.rs
// ===============================
//
// Zone Store: three immutable delivery-zone polygons loaded once at
// startup from GeoJSON. Loading failure is the only fatal error in the
// pipeline — without geometry there is nothing to classify against.
//
use geo::{Geometry, Intersects, MultiPolygon, Point};
use geojson::GeoJson;
use thiserror::Error;

use crate::domain::{ZoneFlags, ZoneKind};

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        source: geojson::Error,
    },
    #[error("{path}: expected a Polygon or MultiPolygon geometry")]
    NotAreal { path: String },
}

/// One named zone geometry. Immutable after load; `contains` is pure,
/// so it can be queried from any number of tasks without locking.
#[derive(Debug, Clone)]
pub struct ZonePolygon {
    kind: ZoneKind,
    geometry: MultiPolygon<f64>,
}

impl ZonePolygon {
    pub fn load(kind: ZoneKind, path: &str) -> Result<Self, GeometryError> {
        let raw = std::fs::read_to_string(path).map_err(|source| GeometryError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_geojson(kind, &raw, path)
    }

    pub fn from_geojson(kind: ZoneKind, raw: &str, path: &str) -> Result<Self, GeometryError> {
        let parsed: GeoJson = raw.parse().map_err(|source| GeometryError::Parse {
            path: path.to_string(),
            source,
        })?;

        let value = match parsed {
            GeoJson::Geometry(g) => Some(g.value),
            GeoJson::Feature(f) => f.geometry.map(|g| g.value),
            GeoJson::FeatureCollection(fc) => fc
                .features
                .into_iter()
                .find_map(|f| f.geometry)
                .map(|g| g.value),
        };
        let value = value.ok_or_else(|| GeometryError::NotAreal {
            path: path.to_string(),
        })?;

        let geometry = match Geometry::<f64>::try_from(value).ok() {
            Some(Geometry::Polygon(p)) => Some(MultiPolygon(vec![p])),
            Some(Geometry::MultiPolygon(mp)) => Some(mp),
            _ => None,
        }
        .ok_or_else(|| GeometryError::NotAreal {
            path: path.to_string(),
        })?;

        Ok(Self { kind, geometry })
    }

    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// Point-in-polygon membership, boundary inclusive: a point exactly
    /// on an edge or vertex counts as inside. `Intersects` (rather than
    /// `Contains`) gives that semantics for point vs. polygon.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.geometry.intersects(&Point::new(lon, lat))
    }
}

/// The three zones, loaded once and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ZoneStore {
    pub sdd: ZonePolygon,
    pub ndd_near: ZonePolygon,
    pub ndd_far: ZonePolygon,
}

impl ZoneStore {
    pub fn load(sdd_path: &str, ndd_near_path: &str, ndd_far_path: &str) -> Result<Self, GeometryError> {
        Ok(Self {
            sdd: ZonePolygon::load(ZoneKind::Sdd, sdd_path)?,
            ndd_near: ZonePolygon::load(ZoneKind::NddNear, ndd_near_path)?,
            ndd_far: ZonePolygon::load(ZoneKind::NddFar, ndd_far_path)?,
        })
    }

    pub fn get(&self, kind: ZoneKind) -> &ZonePolygon {
        match kind {
            ZoneKind::Sdd     => &self.sdd,
            ZoneKind::NddNear => &self.ndd_near,
            ZoneKind::NddFar  => &self.ndd_far,
        }
    }

    /// Membership of one drop-off point in all three zones.
    pub fn flags_for(&self, lon: f64, lat: f64) -> ZoneFlags {
        ZoneFlags {
            sdd_zone: self.sdd.contains(lon, lat),
            near_ndd_zone: self.ndd_near.contains(lon, lat),
            far_ndd_zone: self.ndd_far.contains(lon, lat),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const UNIT_SQUARE: &str = r#"{
        "type": "Polygon",
        "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
    }"#;

    pub(crate) fn square(kind: ZoneKind) -> ZonePolygon {
        ZonePolygon::from_geojson(kind, UNIT_SQUARE, "inline").unwrap()
    }

    /// Square store used by classifier / report tests: all three zones
    /// share the same geometry.
    pub(crate) fn square_store() -> ZoneStore {
        ZoneStore {
            sdd: square(ZoneKind::Sdd),
            ndd_near: square(ZoneKind::NddNear),
            ndd_far: square(ZoneKind::NddFar),
        }
    }

    #[test]
    fn interior_point_is_inside() {
        assert!(square(ZoneKind::Sdd).contains(5.0, 5.0));
    }

    #[test]
    fn far_outside_point_is_outside() {
        assert!(!square(ZoneKind::Sdd).contains(120.0, -45.0));
    }

    #[test]
    fn boundary_points_count_as_inside() {
        let zone = square(ZoneKind::Sdd);
        assert!(zone.contains(0.0, 5.0), "edge point");
        assert!(zone.contains(0.0, 0.0), "vertex");
    }

    #[test]
    fn multipolygon_checks_every_part() {
        let raw = r#"{
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]],
                [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 6.0], [5.0, 5.0]]]
            ]
        }"#;
        let zone = ZonePolygon::from_geojson(ZoneKind::NddFar, raw, "inline").unwrap();
        assert!(zone.contains(0.5, 0.5));
        assert!(zone.contains(5.5, 5.5));
        assert!(!zone.contains(3.0, 3.0));
    }

    #[test]
    fn feature_wrapper_is_accepted() {
        let raw = format!(
            r#"{{"type": "Feature", "properties": {{}}, "geometry": {}}}"#,
            UNIT_SQUARE
        );
        let zone = ZonePolygon::from_geojson(ZoneKind::NddNear, &raw, "inline").unwrap();
        assert!(zone.contains(1.0, 1.0));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = ZonePolygon::from_geojson(ZoneKind::Sdd, "{not json", "bad.json");
        assert!(matches!(err, Err(GeometryError::Parse { .. })));
    }

    #[test]
    fn non_areal_geometry_is_rejected() {
        let raw = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        let err = ZonePolygon::from_geojson(ZoneKind::Sdd, raw, "point.json");
        assert!(matches!(err, Err(GeometryError::NotAreal { .. })));
    }

    #[test]
    fn missing_file_is_rejected() {
        let err = ZonePolygon::load(ZoneKind::Sdd, "/no/such/zone.json");
        assert!(matches!(err, Err(GeometryError::Read { .. })));
    }
}
