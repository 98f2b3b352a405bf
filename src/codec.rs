//! Text form of a GCP set, as accepted by `ogr2ogr`:
//! `-gcp <input x> <input y> <output x> <output y>` repeated once per point.

use crate::gcp::{self, Gcp};
use geo::coord;
use thiserror::Error;

pub const GCP_FLAG: &str = "-gcp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("-gcp #{group} expects 4 values, got {found}")]
    MissingValues { group: usize, found: usize },

    #[error("-gcp #{group}: \"{value}\" is not a finite number")]
    InvalidNumber { group: usize, value: String },
}

/// Flag arguments for `gcps`, in set order.
pub fn to_args(gcps: &[Gcp]) -> Vec<String> {
    gcps.iter()
        .flat_map(|gcp| {
            [
                GCP_FLAG.to_string(),
                gcp.input.x.to_string(),
                gcp.input.y.to_string(),
                gcp.output.x.to_string(),
                gcp.output.y.to_string(),
            ]
        })
        .collect()
}

pub fn encode(gcps: &[Gcp]) -> String {
    to_args(gcps).join(" ")
}

/// Parses every `-gcp` group in `text`, assigning ids by position. Tokens outside
/// of groups are skipped, text without groups is the empty set. Any malformed
/// group fails the whole decode.
pub fn decode(text: &str) -> Result<Vec<Gcp>, CodecError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let mut pairs = Vec::new();

    let mut i = 0;

    while i < tokens.len() {
        if tokens[i] != GCP_FLAG {
            log::debug!("Skipping token \"{}\"", tokens[i]);

            i += 1;

            continue;
        }

        let group = pairs.len();

        let values = &tokens[i + 1..tokens.len().min(i + 5)];

        let numbers = values
            .iter()
            .map(|value| parse_number(group, value))
            .collect::<Result<Vec<_>, _>>()?;

        let [in_x, in_y, out_x, out_y] = numbers[..] else {
            return Err(CodecError::MissingValues {
                group,
                found: numbers.len(),
            });
        };

        pairs.push((coord! { x: in_x, y: in_y }, coord! { x: out_x, y: out_y }));

        i += 5;
    }

    Ok(gcp::from_pairs(pairs))
}

fn parse_number(group: usize, value: &str) -> Result<f64, CodecError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| CodecError::InvalidNumber {
            group,
            value: value.to_string(),
        })
}
