use geo::{Coord, Rect, coord};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BBox {
    /// Build from `[west, south, east, north]` ordering.
    pub const fn from_wsen(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            min_x: west,
            max_x: east,
            min_y: south,
            max_y: north,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Coord<f64> {
        coord! {
            x: (self.min_x + self.max_x) / 2.0,
            y: (self.min_y + self.max_y) / 2.0,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width() / self.height()
    }

    /// Zero or negative extent, or a NaN or infinite bound.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());

        !(finite && self.width() > 0.0 && self.height() > 0.0)
    }

    /// Corners in SW, SE, NE, NW order.
    pub fn corners(&self) -> [Coord<f64>; 4] {
        [
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
            coord! { x: self.min_x, y: self.max_y },
        ]
    }

    /// Largest box with the aspect ratio of `self` that fits into `target`,
    /// centered on `target`'s center.
    pub fn fit_into(&self, target: &BBox) -> BBox {
        let scale = if self.aspect_ratio() > target.aspect_ratio() {
            target.width() / self.width()
        } else {
            target.height() / self.height()
        };

        let center = target.center();

        let half_width = self.width() * scale / 2.0;
        let half_height = self.height() * scale / 2.0;

        BBox {
            min_x: center.x - half_width,
            max_x: center.x + half_width,
            min_y: center.y - half_height,
            max_y: center.y + half_height,
        }
    }
}

impl From<Rect<f64>> for BBox {
    fn from(rect: Rect<f64>) -> Self {
        Self {
            min_x: rect.min().x,
            max_x: rect.max().x,
            min_y: rect.min().y,
            max_y: rect.max().y,
        }
    }
}

impl Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Parses `west,south,east,north`.
impl FromStr for BBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .ok_or_else(|| format!("Invalid number \"{part}\""))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let [west, south, east, north] = parts[..] else {
            return Err(format!("Expected west,south,east,north, got {} values", parts.len()));
        };

        if west >= east || south >= north {
            return Err("Bounds must satisfy west < east and south < north".into());
        }

        Ok(Self::from_wsen(west, south, east, north))
    }
}
