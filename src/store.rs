use crate::{
    codec::{self, CodecError},
    gcp::{Gcp, GcpId},
};
use geo::Coord;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No GCP with id {0}")]
    UnknownId(GcpId),
}

/// The current GCP set plus the one it replaced.
///
/// Every mutation saves the current set as the undo snapshot before applying
/// itself, and only once it is known to succeed. There is a single snapshot,
/// so undo reaches back one step at most.
#[derive(Debug, Default)]
pub struct GcpStore {
    current: Vec<Gcp>,
    previous: Option<Vec<Gcp>>,
}

impl GcpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gcps(&self) -> &[Gcp] {
        &self.current
    }

    pub fn snapshot(&self) -> Option<&[Gcp]> {
        self.previous.as_deref()
    }

    pub fn reset(&mut self, gcps: Vec<Gcp>) {
        self.previous = Some(std::mem::replace(&mut self.current, gcps));
    }

    pub fn update_output(&mut self, id: GcpId, output: Coord<f64>) -> Result<(), StoreError> {
        let index = self
            .current
            .iter()
            .position(|gcp| gcp.id == id)
            .ok_or(StoreError::UnknownId(id))?;

        self.previous = Some(self.current.clone());

        self.current[index] = self.current[index].with_output(output);

        Ok(())
    }

    pub fn import_from_text(&mut self, text: &str) -> Result<(), CodecError> {
        let gcps = codec::decode(text)?;

        self.reset(gcps);

        Ok(())
    }

    /// Restores the snapshot. Returns `false` when there is nothing to restore
    /// or the snapshot is already current.
    pub fn undo(&mut self) -> bool {
        match &self.previous {
            Some(previous) if *previous != self.current => {
                self.current = previous.clone();

                true
            }
            _ => false,
        }
    }
}
