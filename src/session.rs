use crate::{
    bootstrap::{BootstrapError, compute_default_gcps},
    codec::{self, CodecError},
    controller::{DragController, DragEffect},
    display::{MapDisplay, gcp_markers},
    export::Export,
    gcp::{Gcp, GcpId},
    input::{InputFile, UnsupportedFile},
    pipeline::{Outcome, Pipeline},
    store::{GcpStore, StoreError},
};
use geo::Coord;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    UnsupportedFile(#[from] UnsupportedFile),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error("Invalid GCP flags: {0}")]
    Flags(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No input file loaded")]
    NoInput,

    #[error("No referenced GeoJSON available yet")]
    NoOutput,

    #[error("Error serializing GeoJSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One editing session: the map it draws on, the input file, its GCPs and
/// the derived output. All methods run on the thread owning the session.
pub struct Session<D: MapDisplay> {
    display: D,
    store: GcpStore,
    pipeline: Pipeline,
    drag: DragController,
    input: Option<InputFile>,
}

impl<D: MapDisplay> Session<D> {
    pub fn new(display: D, pipeline: Pipeline) -> Self {
        Self {
            display,
            store: GcpStore::new(),
            pipeline,
            drag: DragController::new(),
            input: None,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn gcps(&self) -> &[Gcp] {
        self.store.gcps()
    }

    pub fn input(&self) -> Option<&InputFile> {
        self.input.as_ref()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Accepts a dropped file and pins its bounds into the current viewport.
    /// Nothing changes if the file is rejected.
    pub fn drop_file(
        &mut self,
        name: impl Into<String>,
        contents: impl Into<Arc<[u8]>>,
    ) -> Result<(), SessionError> {
        let loaded = InputFile::new(name, contents)
            .map_err(SessionError::from)
            .and_then(|file| {
                let gcps = compute_default_gcps(file.contents(), self.display.viewport_bounds())?;

                Ok((file, gcps))
            });

        let (file, gcps) = self.report(loaded)?;

        log::info!("Loaded {}", file.name());

        self.input = Some(file);

        self.store.reset(gcps);

        self.gcps_changed();

        Ok(())
    }

    /// Recomputes the default GCPs of the loaded file for the current viewport.
    pub fn reset_gcps(&mut self) -> Result<(), SessionError> {
        let gcps = self
            .input
            .as_ref()
            .ok_or(SessionError::NoInput)
            .and_then(|file| {
                Ok(compute_default_gcps(
                    file.contents(),
                    self.display.viewport_bounds(),
                )?)
            });

        let gcps = self.report(gcps)?;

        self.store.reset(gcps);

        self.gcps_changed();

        Ok(())
    }

    /// Replaces the GCPs with those parsed from `-gcp` flags.
    pub fn submit_gcp_flags(&mut self, text: &str) -> Result<(), SessionError> {
        let imported = self.store.import_from_text(text).map_err(SessionError::from);

        self.report(imported)?;

        self.gcps_changed();

        Ok(())
    }

    /// Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.store.undo() {
            return false;
        }

        self.gcps_changed();

        true
    }

    pub fn pointer_down(&mut self, marker: Option<GcpId>) {
        if let Some(DragEffect::Started(id)) = self.drag.pointer_down(marker) {
            log::debug!("Dragging GCP #{id}");

            self.display.set_drag_pan(false);
        }
    }

    pub fn pointer_move(&mut self, position: Coord<f64>) {
        if let Some(DragEffect::Preview { id, position }) = self.drag.pointer_move(position) {
            self.display.move_gcp_marker(id, position);
        }
    }

    pub fn pointer_up(&mut self, position: Coord<f64>) -> Result<(), SessionError> {
        let Some(DragEffect::Commit { id, position }) = self.drag.pointer_up(position) else {
            return Ok(());
        };

        self.display.set_drag_pan(true);

        let updated = self
            .store
            .update_output(id, position)
            .map_err(SessionError::from);

        if let Err(e) = self.report(updated) {
            // drop the preview position
            self.display.set_gcp_markers(gcp_markers(self.store.gcps()));

            return Err(e);
        }

        self.gcps_changed();

        Ok(())
    }

    /// Shows whatever conversion finished since the last call.
    pub fn poll(&mut self) -> Option<Outcome> {
        let outcome = self.pipeline.poll();

        self.show_outcome(outcome.as_ref());

        outcome
    }

    /// Blocks until the latest conversion finished and shows it.
    pub fn wait(&mut self) -> Option<Outcome> {
        let outcome = self.pipeline.wait();

        self.show_outcome(outcome.as_ref());

        outcome
    }

    pub fn export(&self) -> Result<Export, SessionError> {
        let input = self.input.as_ref().ok_or(SessionError::NoInput)?;

        let output = self.pipeline.output().ok_or(SessionError::NoOutput)?;

        Ok(Export {
            file_name: input.referenced_name(),
            contents: serde_json::to_string(output)?,
        })
    }

    fn show_outcome(&mut self, outcome: Option<&Outcome>) {
        match outcome {
            Some(Outcome::Updated) => {
                if let Some(output) = self.pipeline.output() {
                    self.display.set_referenced(output);
                }

                self.display.set_conversion_error(None);
            }
            Some(Outcome::Failed(e)) => {
                self.display.set_conversion_error(Some(&e.to_string()));
            }
            None => {}
        }
    }

    fn gcps_changed(&mut self) {
        let gcps = self.store.gcps();

        self.display.set_gcp_markers(gcp_markers(gcps));

        self.display.set_gcp_flags(&codec::encode(gcps));

        if let Some(input) = &self.input {
            self.pipeline.invalidate(input, gcps);
        }
    }

    fn report<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(e) = &result {
            log::debug!("Reported: {e}");

            self.display.notify(&e.to_string());
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bbox::BBox,
        display::tests::RecordingDisplay,
        pipeline::tests::{TagConverter, tag_of},
        translate::{ConvertOptions, Converter},
    };
    use geo::coord;
    use std::sync::atomic::Ordering;

    const RECTANGLE: &[u8] = br#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": { "id": 1 },
            "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 5], [0, 5], [0, 0]]] }
        }]
    }"#;

    fn session_with(
        converter: TagConverter,
        viewport: Option<BBox>,
    ) -> (Session<RecordingDisplay>, Arc<TagConverter>) {
        let converter = Arc::new(converter);

        let display = RecordingDisplay {
            viewport,
            ..RecordingDisplay::default()
        };

        let pipeline = Pipeline::new(
            Arc::clone(&converter) as Arc<dyn Converter>,
            ConvertOptions::default(),
        );

        (Session::new(display, pipeline), converter)
    }

    fn loaded_session() -> (Session<RecordingDisplay>, Arc<TagConverter>) {
        let (mut session, converter) = session_with(
            TagConverter::default(),
            Some(BBox::from_wsen(130.0, 30.0, 140.0, 40.0)),
        );

        session.drop_file("parcels.geojson", RECTANGLE.to_vec()).unwrap();

        session.wait();

        (session, converter)
    }

    fn calls(converter: &TagConverter) -> usize {
        converter.calls.load(Ordering::SeqCst)
    }

    #[test]
    fn drop_bootstraps_and_converts() {
        let (session, converter) = loaded_session();

        assert_eq!(session.gcps().len(), 4);
        assert_eq!(session.gcps()[0].output, coord! { x: 130.0, y: 32.5 });

        let display = session.display();

        assert_eq!(display.flags, codec::encode(session.gcps()));
        assert_eq!(display.marker_position(2), Some(vec![140.0, 37.5]));
        assert_eq!(
            display.referenced.as_ref().and_then(tag_of),
            Some(display.flags.as_str())
        );
        assert_eq!(calls(&converter), 1);
    }

    #[test]
    fn wrong_extension_is_rejected_without_changes() {
        let (mut session, converter) = session_with(
            TagConverter::default(),
            Some(BBox::from_wsen(130.0, 30.0, 140.0, 40.0)),
        );

        assert!(matches!(
            session.drop_file("parcels.json", RECTANGLE.to_vec()),
            Err(SessionError::UnsupportedFile(_))
        ));

        assert_eq!(session.display().notices.len(), 1);
        assert!(session.input().is_none());
        assert!(session.gcps().is_empty());
        assert_eq!(calls(&converter), 0);
    }

    #[test]
    fn drop_before_map_is_ready_is_ignored() {
        let (mut session, converter) = session_with(TagConverter::default(), None);

        assert!(matches!(
            session.drop_file("parcels.geojson", RECTANGLE.to_vec()),
            Err(SessionError::Bootstrap(BootstrapError::NoViewport))
        ));

        assert_eq!(session.display().notices, ["Map not initialized"]);
        assert!(session.input().is_none());
        assert!(session.gcps().is_empty());
        assert!(!session.pipeline().is_pending());
        assert_eq!(calls(&converter), 0);
    }

    #[test]
    fn drag_previews_then_commits_once() {
        let (mut session, converter) = loaded_session();

        let before = session.gcps().to_vec();

        session.pointer_down(Some(1));

        for step in 1..=3 {
            session.pointer_move(coord! { x: 140.0 + f64::from(step), y: 32.5 });
        }

        assert_eq!(session.display().marker_updates, 3);
        assert_eq!(session.display().marker_position(1), Some(vec![143.0, 32.5]));
        assert_eq!(session.gcps(), before);
        assert_eq!(calls(&converter), 1);

        session.pointer_up(coord! { x: 144.0, y: 33.0 }).unwrap();

        assert_eq!(session.display().drag_pan, [false, true]);
        assert_eq!(session.gcps()[1].output, coord! { x: 144.0, y: 33.0 });
        assert_eq!(session.gcps()[1].input, before[1].input);
        assert_eq!(session.gcps()[0], before[0]);

        session.wait();

        assert_eq!(calls(&converter), 2);
        assert_eq!(
            session.display().referenced.as_ref().and_then(tag_of),
            Some(codec::encode(session.gcps()).as_str())
        );
    }

    #[test]
    fn pointer_up_without_drag_changes_nothing() {
        let (mut session, converter) = loaded_session();

        session.pointer_down(None);
        session.pointer_up(coord! { x: 0.0, y: 0.0 }).unwrap();

        assert!(session.display().drag_pan.is_empty());
        assert!(!session.pipeline().is_pending());
        assert_eq!(calls(&converter), 1);
    }

    #[test]
    fn dragging_unknown_marker_reports_and_restores_markers() {
        let (mut session, _) = loaded_session();

        let before = session.gcps().to_vec();

        session.pointer_down(Some(9));
        session.pointer_move(coord! { x: 1.0, y: 1.0 });

        assert!(matches!(
            session.pointer_up(coord! { x: 1.0, y: 1.0 }),
            Err(SessionError::Store(StoreError::UnknownId(9)))
        ));

        assert_eq!(session.gcps(), before);
        assert_eq!(session.display().notices, ["No GCP with id 9"]);
        assert!(!session.pipeline().is_pending());
    }

    #[test]
    fn undo_restores_previous_gcps_once() {
        let (mut session, converter) = loaded_session();

        let bootstrapped = session.gcps().to_vec();

        session.pointer_down(Some(0));
        session.pointer_up(coord! { x: 129.0, y: 31.0 }).unwrap();
        session.wait();

        assert!(session.undo());
        assert_eq!(session.gcps(), bootstrapped);
        assert_eq!(session.display().flags, codec::encode(&bootstrapped));

        assert!(!session.undo());

        session.wait();

        assert_eq!(calls(&converter), 3);
    }

    #[test]
    fn malformed_flags_leave_gcps_untouched() {
        let (mut session, converter) = loaded_session();

        let before = session.gcps().to_vec();
        let flags = session.display().flags.clone();

        assert!(matches!(
            session.submit_gcp_flags("-gcp 1 2 3"),
            Err(SessionError::Flags(CodecError::MissingValues { .. }))
        ));

        assert_eq!(session.gcps(), before);
        assert_eq!(session.display().flags, flags);
        assert_eq!(session.display().notices.len(), 1);
        assert_eq!(calls(&converter), 1);
    }

    #[test]
    fn submitted_flags_replace_gcps_and_convert() {
        let (mut session, _) = loaded_session();

        session
            .submit_gcp_flags("-gcp 0 0 135 35 -gcp 10 0 136 35 -gcp 10 5 136 36")
            .unwrap();

        assert_eq!(session.gcps().len(), 3);
        assert_eq!(
            session.display().flags,
            "-gcp 0 0 135 35 -gcp 10 0 136 35 -gcp 10 5 136 36"
        );

        session.wait();

        assert_eq!(
            session.display().referenced.as_ref().and_then(tag_of),
            Some("-gcp 0 0 135 35 -gcp 10 0 136 35 -gcp 10 5 136 36")
        );
    }

    #[test]
    fn flags_without_file_only_update_gcps() {
        let (mut session, converter) = session_with(TagConverter::default(), None);

        session.submit_gcp_flags("-gcp 1 2 3 4").unwrap();

        assert_eq!(session.gcps().len(), 1);
        assert!(!session.pipeline().is_pending());
        assert_eq!(calls(&converter), 0);
    }

    #[test]
    fn reset_requires_file_and_restores_defaults() {
        let (mut session, _) = session_with(
            TagConverter::default(),
            Some(BBox::from_wsen(130.0, 30.0, 140.0, 40.0)),
        );

        assert!(matches!(session.reset_gcps(), Err(SessionError::NoInput)));

        session.drop_file("parcels.geojson", RECTANGLE.to_vec()).unwrap();

        let defaults = session.gcps().to_vec();

        session.pointer_down(Some(3));
        session.pointer_up(coord! { x: 0.0, y: 0.0 }).unwrap();

        session.display_mut().viewport = Some(BBox::from_wsen(0.0, 0.0, 20.0, 20.0));

        session.reset_gcps().unwrap();

        assert_ne!(session.gcps(), defaults);
        assert_eq!(session.gcps()[0].output, coord! { x: 0.0, y: 5.0 });
    }

    #[test]
    fn failed_conversion_keeps_output() {
        let (mut session, _) = session_with(
            TagConverter::failing_on("-gcp 0 0 1 1"),
            Some(BBox::from_wsen(130.0, 30.0, 140.0, 40.0)),
        );

        session.drop_file("parcels.geojson", RECTANGLE.to_vec()).unwrap();
        session.wait();

        let referenced = session.display().referenced.clone();

        assert!(referenced.is_some());

        session.submit_gcp_flags("-gcp 0 0 1 1").unwrap();

        assert!(matches!(session.wait(), Some(Outcome::Failed(_))));
        assert_eq!(session.display().referenced, referenced);
        assert!(session.display().conversion_error.is_some());
        assert!(session.export().is_ok());
    }

    #[test]
    fn export_uses_referenced_name() {
        let (session, _) = loaded_session();

        let export = session.export().unwrap();

        assert_eq!(export.file_name, "parcels_referenced.geojson");
        assert!(export.contents.contains("\"FeatureCollection\""));
    }

    #[test]
    fn export_requires_output() {
        let (session, _) = session_with(TagConverter::default(), None);

        assert!(matches!(session.export(), Err(SessionError::NoInput)));
    }
}
