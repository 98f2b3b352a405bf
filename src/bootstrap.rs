use crate::{
    bbox::BBox,
    gcp::{self, Gcp},
    geojson::{compute_bbox, parse_geometry_collection},
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BootstrapError {
    #[error("Map not initialized")]
    NoViewport,

    #[error("Error reading input: {0}")]
    InvalidInput(String),

    #[error("Input contains no coordinates")]
    EmptyInput,

    #[error("Input bounds {0} have zero width or height")]
    DegenerateInput(BBox),

    #[error("Map viewport {0} is empty or not finite")]
    DegenerateViewport(BBox),
}

/// Four GCPs pinning the corners of the input's bounding box (SW, SE, NE, NW)
/// to a box of the same aspect ratio centered in the viewport.
pub fn compute_default_gcps(
    contents: &[u8],
    viewport: Option<BBox>,
) -> Result<Vec<Gcp>, BootstrapError> {
    let viewport = viewport.ok_or(BootstrapError::NoViewport)?;

    let collection = parse_geometry_collection(contents).map_err(BootstrapError::InvalidInput)?;

    let input_bbox = compute_bbox(&collection).ok_or(BootstrapError::EmptyInput)?;

    log::debug!("Input bbox {input_bbox}, viewport {viewport}");

    gcps_for_bounds(&input_bbox, &viewport)
}

pub fn gcps_for_bounds(input: &BBox, viewport: &BBox) -> Result<Vec<Gcp>, BootstrapError> {
    if input.is_degenerate() {
        return Err(BootstrapError::DegenerateInput(*input));
    }

    if viewport.is_degenerate() {
        return Err(BootstrapError::DegenerateViewport(*viewport));
    }

    let output = input.fit_into(viewport);

    Ok(gcp::from_pairs(input.corners().into_iter().zip(output.corners())))
}
