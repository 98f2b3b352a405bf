use crate::{
    bbox::BBox,
    gcp::{Gcp, GcpId},
};
use geo::Coord;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value, feature::Id};

pub const INPUT_X_PROPERTY: &str = "input_x";
pub const INPUT_Y_PROPERTY: &str = "input_y";

/// What the session needs from the map it draws on.
pub trait MapDisplay {
    /// Currently visible `[west, south, east, north]`, `None` until the map is ready.
    fn viewport_bounds(&self) -> Option<BBox>;

    fn set_gcp_markers(&mut self, markers: FeatureCollection);

    /// Moves a single marker without touching the rest of the layer.
    fn move_gcp_marker(&mut self, id: GcpId, position: Coord<f64>);

    fn set_referenced(&mut self, referenced: &FeatureCollection);

    /// Toggles the map's own drag-to-pan.
    fn set_drag_pan(&mut self, enabled: bool);

    /// The text field holding the `-gcp` flags.
    fn set_gcp_flags(&mut self, flags: &str);

    /// Non-blocking status of the last conversion, `None` when it succeeded.
    fn set_conversion_error(&mut self, error: Option<&str>);

    /// Blocking notice to the user.
    fn notify(&mut self, message: &str);
}

/// One point per GCP at its output position, carrying the input position as properties.
pub fn gcp_markers(gcps: &[Gcp]) -> FeatureCollection {
    let features = gcps
        .iter()
        .map(|gcp| {
            let mut properties = JsonObject::new();

            properties.insert(INPUT_X_PROPERTY.into(), gcp.input.x.into());
            properties.insert(INPUT_Y_PROPERTY.into(), gcp.input.y.into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![gcp.output.x, gcp.output.y]))),
                id: Some(Id::Number(gcp.id.into())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Id of a marker feature produced by [`gcp_markers`].
pub fn marker_id(feature: &Feature) -> Option<GcpId> {
    match &feature.id {
        Some(Id::Number(number)) => number.as_u64().and_then(|id| GcpId::try_from(id).ok()),
        _ => None,
    }
}
