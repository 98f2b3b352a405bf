use clap::Parser;
use geo::{Coord, coord};
use georef_editor::{
    bbox::BBox,
    mercator::Camera,
    translate::{ConvertOptions, TransformMethod},
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Input GeoJSON file in arbitrary (non-geographic) coordinates
    #[arg(long)]
    pub input_file: PathBuf,

    /// Output GeoJSON file [default: <input>_referenced.geojson next to the input]
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Replace the output file if it exists
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    /// Map viewport as west,south,east,north; overrides the camera options
    #[arg(long, allow_hyphen_values = true)]
    pub viewport: Option<BBox>,

    /// Map center as lon,lat
    #[arg(long, value_parser = parse_lon_lat, default_value = "133.995,34.3196", allow_hyphen_values = true)]
    pub center: Coord<f64>,

    /// Map zoom level
    #[arg(long, default_value_t = 5.0)]
    pub zoom: f64,

    /// Map width in pixels
    #[arg(long, default_value_t = 1024, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Map height in pixels
    #[arg(long, default_value_t = 768, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Map tile size in pixels
    #[arg(long, default_value_t = 512)]
    pub tile_size: u16,

    /// Initial GCPs as ogr2ogr flags, replacing the default ones, e.g. "-gcp 0 0 133.9 34.3 -gcp ..."
    #[arg(long, allow_hyphen_values = true)]
    pub gcps: Option<String>,

    /// Polynomial order of the transformation [default: chosen from the number of GCPs]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3), conflicts_with = "tps")]
    pub order: Option<u8>,

    /// Use thin plate spline transformation
    #[arg(long, default_value_t = false)]
    pub tps: bool,

    /// Edit GCPs with commands read from standard input
    #[arg(long, default_value_t = false)]
    pub interactive: bool,

    /// Debug
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    pub fn camera(&self) -> Camera {
        Camera {
            center: self.center,
            zoom: self.zoom,
            width: self.width,
            height: self.height,
            tile_size: self.tile_size,
        }
    }

    pub fn viewport_bounds(&self) -> BBox {
        self.viewport.unwrap_or_else(|| self.camera().bounds())
    }

    pub fn convert_options(&self) -> ConvertOptions {
        let method = if self.tps {
            Some(TransformMethod::ThinPlateSpline)
        } else {
            self.order.map(TransformMethod::Polynomial)
        };

        ConvertOptions { method }
    }
}

fn parse_lon_lat(s: &str) -> Result<Coord<f64>, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("Expected lon,lat, got \"{s}\""))?;

    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .ok_or_else(|| format!("Invalid number \"{value}\""))
    };

    Ok(coord! { x: parse(lon)?, y: parse(lat)? })
}
