use crate::bbox::BBox;
use geo::{Coord, coord};
use std::f64::consts::PI;

pub const WEB_MERCATOR_EXTENT: f64 = 20_037_508.342_789_244;

const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

pub fn lon_lat_to_meters(lon_lat: Coord<f64>) -> Coord<f64> {
    let lat = lon_lat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    coord! {
        x: lon_lat.x * WEB_MERCATOR_EXTENT / 180.0,
        y: ((90.0 + lat) * PI / 360.0).tan().ln() * WEB_MERCATOR_EXTENT / PI,
    }
}

pub fn meters_to_lon_lat(meters: Coord<f64>) -> Coord<f64> {
    coord! {
        x: meters.x / WEB_MERCATOR_EXTENT * 180.0,
        y: (2.0 * (meters.y / WEB_MERCATOR_EXTENT * PI).exp().atan() - PI / 2.0).to_degrees(),
    }
}

/// Map camera: what the map shows at a given center and zoom in a window of
/// `width` x `height` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Coord<f64>,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    pub tile_size: u16,
}

impl Camera {
    /// Size of a screen pixel in EPSG:3857 meters.
    pub fn pixel_size(&self) -> f64 {
        let total_pixels = f64::from(self.tile_size) * self.zoom.exp2();

        (2.0 * WEB_MERCATOR_EXTENT) / total_pixels
    }

    /// Visible bounds in lon/lat.
    pub fn bounds(&self) -> BBox {
        let center = lon_lat_to_meters(self.center);
        let pixel_size = self.pixel_size();

        let half_width = (f64::from(self.width) / 2.0 * pixel_size).min(WEB_MERCATOR_EXTENT);
        let half_height = f64::from(self.height) / 2.0 * pixel_size;

        let south_west = meters_to_lon_lat(coord! {
            x: center.x - half_width,
            y: (center.y - half_height).max(-WEB_MERCATOR_EXTENT),
        });

        let north_east = meters_to_lon_lat(coord! {
            x: center.x + half_width,
            y: (center.y + half_height).min(WEB_MERCATOR_EXTENT),
        });

        BBox::from_wsen(south_west.x, south_west.y, north_east.x, north_east.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn meters_round_trip() {
        let lon_lat = coord! { x: 133.995, y: 34.3196 };
        let back = meters_to_lon_lat(lon_lat_to_meters(lon_lat));

        assert_close(back.x, lon_lat.x);
        assert_close(back.y, lon_lat.y);
    }

    #[test]
    fn zoom_zero_tile_covers_world() {
        let camera = Camera {
            center: coord! { x: 0.0, y: 0.0 },
            zoom: 0.0,
            width: 512,
            height: 512,
            tile_size: 512,
        };

        let bounds = camera.bounds();

        assert_close(bounds.min_x, -180.0);
        assert_close(bounds.max_x, 180.0);
        assert_close(bounds.min_y, -MAX_LATITUDE);
        assert_close(bounds.max_y, MAX_LATITUDE);
    }

    #[test]
    fn bounds_are_centered_horizontally() {
        let camera = Camera {
            center: coord! { x: 133.995, y: 34.3196 },
            zoom: 5.0,
            width: 1024,
            height: 768,
            tile_size: 512,
        };

        let bounds = camera.bounds();

        assert_close(bounds.center().x, 133.995);
        assert!(bounds.min_y < 34.3196 && bounds.max_y > 34.3196);
        assert!(bounds.width() > 0.0 && bounds.height() > 0.0);
    }
}
