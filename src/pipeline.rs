use crate::{
    gcp::Gcp,
    input::InputFile,
    translate::{ConvertError, ConvertOptions, Converter},
};
use geojson::FeatureCollection;
use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::Instant,
};

struct Job {
    generation: u64,
    input: InputFile,
    args: Vec<String>,
}

struct Completion {
    generation: u64,
    result: Result<FeatureCollection, ConvertError>,
}

#[derive(Debug)]
pub enum Outcome {
    /// The latest run finished and its collection is now the output.
    Updated,
    /// The latest run failed, the previous output is kept.
    Failed(ConvertError),
}

/// Re-runs the conversion on a worker thread every time it is invalidated.
///
/// Runs are numbered. A finished run is only applied if no other run was
/// started after it, so an older run finishing late never replaces the result
/// of a newer one. Runs still queued behind a newer one are skipped.
pub struct Pipeline {
    options: ConvertOptions,
    generation: u64,
    pending: bool,
    jobs: Sender<Job>,
    rx: Receiver<Completion>,
    output: Option<FeatureCollection>,
    error: Option<String>,
}

impl Pipeline {
    pub fn new(converter: Arc<dyn Converter>, options: ConvertOptions) -> Self {
        let (jobs, job_rx) = mpsc::channel();

        let (tx, rx) = mpsc::channel();

        thread::spawn(move || run_worker(converter.as_ref(), &job_rx, &tx));

        Self {
            options,
            generation: 0,
            pending: false,
            jobs,
            rx,
            output: None,
            error: None,
        }
    }

    pub fn output(&self) -> Option<&FeatureCollection> {
        self.output.as_ref()
    }

    /// Message of the last failed run, cleared by the next successful one.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the latest started run has not reported back yet.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Queues a run for `input` and `gcps`, superseding any run in flight.
    pub fn invalidate(&mut self, input: &InputFile, gcps: &[Gcp]) -> u64 {
        self.generation += 1;

        let generation = self.generation;

        let args = self.options.build_args(gcps);

        log::debug!(
            "Queueing conversion #{generation} of {}: {}",
            input.name(),
            args.join(" ")
        );

        let job = Job {
            generation,
            input: input.clone(),
            args,
        };

        self.pending = self.jobs.send(job).is_ok();

        if !self.pending {
            log::error!("Conversion worker is gone, #{generation} not started");
        }

        generation
    }

    /// Applies finished runs without blocking.
    pub fn poll(&mut self) -> Option<Outcome> {
        let mut outcome = None;

        while let Ok(completion) = self.rx.try_recv() {
            if let Some(applied) = self.apply(completion) {
                outcome = Some(applied);
            }
        }

        outcome
    }

    /// Blocks until the latest started run has finished.
    pub fn wait(&mut self) -> Option<Outcome> {
        while self.pending {
            let Ok(completion) = self.rx.recv() else {
                log::error!("Conversion worker is gone");

                self.pending = false;

                break;
            };

            if let Some(applied) = self.apply(completion) {
                return Some(applied);
            }
        }

        None
    }

    fn apply(&mut self, completion: Completion) -> Option<Outcome> {
        let Completion { generation, result } = completion;

        if generation != self.generation {
            log::debug!(
                "Discarding stale conversion #{generation}, latest is #{}",
                self.generation
            );

            return None;
        }

        self.pending = false;

        match result {
            Ok(collection) => {
                log::info!("Referenced {} features", collection.features.len());

                self.output = Some(collection);

                self.error = None;

                Some(Outcome::Updated)
            }
            Err(e) => {
                log::warn!("Conversion #{generation} failed: {e}");

                self.error = Some(e.to_string());

                Some(Outcome::Failed(e))
            }
        }
    }
}

/// Converts queued jobs one at a time until the pipeline is dropped.
fn run_worker(converter: &dyn Converter, jobs: &Receiver<Job>, tx: &Sender<Completion>) {
    while let Ok(mut job) = jobs.recv() {
        while let Ok(newer) = jobs.try_recv() {
            log::debug!("Skipping superseded conversion #{}", job.generation);

            job = newer;
        }

        let Job {
            generation,
            input,
            args,
        } = job;

        let instant = Instant::now();

        let result = converter.convert(&input, &args);

        log::debug!(
            "Conversion #{generation} finished in {} ms",
            instant.elapsed().as_millis()
        );

        if tx.send(Completion { generation, result }).is_err() {
            log::debug!("Pipeline dropped before conversion #{generation} finished");

            return;
        }
    }
}
