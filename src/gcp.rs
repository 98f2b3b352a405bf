use geo::Coord;
use serde::Serialize;
use std::fmt::Display;

pub type GcpId = u32;

/// A correspondence between a point in the input file's own coordinate space
/// and a geographic (lon/lat) location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gcp {
    pub id: GcpId,
    pub input: Coord<f64>,
    pub output: Coord<f64>,
}

impl Gcp {
    pub fn with_output(&self, output: Coord<f64>) -> Self {
        Self { output, ..*self }
    }
}

impl Display for Gcp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} ({}, {}) -> ({}, {})",
            self.id, self.input.x, self.input.y, self.output.x, self.output.y
        )
    }
}

/// Assigns ids `0..n` in iteration order.
pub fn from_pairs(pairs: impl IntoIterator<Item = (Coord<f64>, Coord<f64>)>) -> Vec<Gcp> {
    pairs
        .into_iter()
        .zip(0..)
        .map(|((input, output), id)| Gcp { id, input, output })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn ids_follow_creation_order() {
        let gcps = from_pairs([
            (coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 20.0 }),
            (coord! { x: 1.0, y: 0.0 }, coord! { x: 11.0, y: 20.0 }),
            (coord! { x: 1.0, y: 1.0 }, coord! { x: 11.0, y: 21.0 }),
        ]);

        assert_eq!(gcps.iter().map(|gcp| gcp.id).collect::<Vec<_>>(), [0, 1, 2]);
        assert_eq!(gcps[2].input, coord! { x: 1.0, y: 1.0 });
    }

    #[test]
    fn with_output_keeps_input() {
        let gcp = Gcp {
            id: 3,
            input: coord! { x: 5.0, y: 6.0 },
            output: coord! { x: 7.0, y: 8.0 },
        };

        let moved = gcp.with_output(coord! { x: 1.5, y: -2.5 });

        assert_eq!(moved.id, 3);
        assert_eq!(moved.input, gcp.input);
        assert_eq!(moved.output, coord! { x: 1.5, y: -2.5 });
        assert_eq!(moved.to_string(), "#3 (5, 6) -> (1.5, -2.5)");
    }
}
