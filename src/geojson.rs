use crate::bbox::BBox;
use geo::{BoundingRect, GeometryCollection};
use geojson::{FeatureCollection, GeoJson};

// Parse a GeoJSON document (any of Geometry, Feature or FeatureCollection) into a geometry collection
pub fn parse_geometry_collection(contents: &[u8]) -> Result<GeometryCollection<f64>, String> {
    let geojson_str =
        std::str::from_utf8(contents).map_err(|e| format!("File is not valid UTF-8: {e}"))?;

    let geojson: GeoJson = geojson_str
        .parse()
        .map_err(|e| format!("Invalid GeoJSON: {e}"))?;

    geojson::quick_collection(&geojson).map_err(|e| format!("Unsupported geometry: {e}"))
}

pub fn compute_bbox(collection: &GeometryCollection<f64>) -> Option<BBox> {
    collection.bounding_rect().map(BBox::from)
}

pub fn parse_feature_collection(contents: &[u8]) -> Result<FeatureCollection, String> {
    let geojson_str =
        std::str::from_utf8(contents).map_err(|e| format!("Output is not valid UTF-8: {e}"))?;

    match geojson_str
        .parse::<GeoJson>()
        .map_err(|e| format!("Invalid GeoJSON: {e}"))?
    {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => {
            Err("GeoJSON is not a feature collection".into())
        }
    }
}
