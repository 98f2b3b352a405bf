use crate::gcp::GcpId;
use geo::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(GcpId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    /// A marker was grabbed; map panning must be suppressed.
    Started(GcpId),
    /// Display-only position update while dragging.
    Preview { id: GcpId, position: Coord<f64> },
    /// The gesture ended; the position becomes the GCP's output.
    Commit { id: GcpId, position: Coord<f64> },
}

/// Pointer gestures on GCP markers. One marker at a time.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// `marker` is the GCP under the pointer, if any.
    pub fn pointer_down(&mut self, marker: Option<GcpId>) -> Option<DragEffect> {
        match (self.state, marker) {
            (DragState::Idle, Some(id)) => {
                self.state = DragState::Dragging(id);

                Some(DragEffect::Started(id))
            }
            (DragState::Dragging(current), _) => {
                log::debug!("Ignoring pointer down while dragging #{current}");

                None
            }
            (DragState::Idle, None) => None,
        }
    }

    pub fn pointer_move(&mut self, position: Coord<f64>) -> Option<DragEffect> {
        match self.state {
            DragState::Dragging(id) => Some(DragEffect::Preview { id, position }),
            DragState::Idle => None,
        }
    }

    pub fn pointer_up(&mut self, position: Coord<f64>) -> Option<DragEffect> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(id) => Some(DragEffect::Commit { id, position }),
            DragState::Idle => None,
        }
    }
}
