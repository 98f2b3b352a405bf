use crate::{bbox::BBox, display::MapDisplay, gcp::GcpId};
use geo::Coord;
use geojson::FeatureCollection;

/// A "map" that reports to the log. The viewport is fixed at startup.
#[derive(Debug)]
pub struct TerminalDisplay {
    viewport: Option<BBox>,
    flags: String,
}

impl TerminalDisplay {
    pub fn new(viewport: Option<BBox>) -> Self {
        Self {
            viewport,
            flags: String::new(),
        }
    }

    /// Last `-gcp` flags shown.
    pub fn flags(&self) -> &str {
        &self.flags
    }
}

impl MapDisplay for TerminalDisplay {
    fn viewport_bounds(&self) -> Option<BBox> {
        self.viewport
    }

    fn set_gcp_markers(&mut self, markers: FeatureCollection) {
        log::debug!("{} GCP markers", markers.features.len());
    }

    fn move_gcp_marker(&mut self, id: GcpId, position: Coord<f64>) {
        log::debug!("GCP #{id} at {}, {}", position.x, position.y);
    }

    fn set_referenced(&mut self, referenced: &FeatureCollection) {
        log::info!("Showing {} referenced features", referenced.features.len());
    }

    fn set_drag_pan(&mut self, enabled: bool) {
        log::trace!("Drag pan {}", if enabled { "on" } else { "off" });
    }

    fn set_gcp_flags(&mut self, flags: &str) {
        log::info!("ogr2ogr {flags}");

        self.flags = flags.to_string();
    }

    fn set_conversion_error(&mut self, error: Option<&str>) {
        if let Some(error) = error {
            log::error!("{error}");
        }
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
