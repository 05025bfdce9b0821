//! A fixed-size pool of OCR worker slots.
//!
//! Each slot owns one recognizer.  While a slot is busy, it belongs to the
//! thread doing the recognition, and when that thread is done, it sends the
//! slot back over a bounded channel.  Waiting on that channel is what limits
//! us to `capacity` recognitions at once.

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info, trace};
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crate::aggregate::{RecognitionResult, ResultAggregator};
use crate::errors::{display_chain, Error, Result};
use crate::recognizer::{Recognizer, RecognizerFactory};
use crate::source::SubtitleUnit;

/// A single worker slot, and the recognizer it owns.
pub(crate) struct WorkerSlot<R> {
    id: usize,
    recognizer: R,
}

/// A pool of up to `capacity` worker slots.  Slots are created on demand
/// and then reused until the pool is finished.
pub(crate) struct SlotPool<F: RecognizerFactory> {
    factory: F,
    capacity: usize,
    verbose: bool,
    /// The most recent task launched on each slot, indexed by slot ID.  A
    /// slot has an entry here as soon as it is created.
    tasks: Vec<Option<JoinHandle<()>>>,
    /// Idle slots are returned here.
    free_tx: Sender<WorkerSlot<F::Recognizer>>,
    free_rx: Receiver<WorkerSlot<F::Recognizer>>,
    results: ResultAggregator,
}

impl<F: RecognizerFactory> SlotPool<F> {
    /// Create a new pool.  A `capacity` of 1 means that all recognition will
    /// happen synchronously in `submit`.
    pub(crate) fn new(factory: F, capacity: usize, verbose: bool) -> SlotPool<F> {
        let capacity = capacity.max(1);
        let (free_tx, free_rx) = bounded(capacity);
        SlotPool {
            factory,
            capacity,
            verbose,
            tasks: Vec::with_capacity(capacity),
            free_tx,
            free_rx,
            results: ResultAggregator::new(),
        }
    }

    /// How many slots have we created?
    pub(crate) fn slot_count(&self) -> usize {
        self.tasks.len()
    }

    /// Recognize `unit` on the next available slot, waiting for one if
    /// necessary.  Only recognizer setup failures are reported here;
    /// recognition failures become results with no text.
    pub(crate) fn submit(&mut self, unit: SubtitleUnit) -> Result<()> {
        let slot = self.acquire()?;
        if self.capacity == 1 {
            run_task(slot, unit, &self.results, &self.free_tx, self.verbose);
            return Ok(());
        }

        let id = slot.id;
        let results = self.results.clone();
        let free_tx = self.free_tx.clone();
        let verbose = self.verbose;
        let handle = thread::Builder::new()
            .name(format!("ocr-slot-{}", id))
            .spawn(move || run_task(slot, unit, &results, &free_tx, verbose))
            .map_err(|source| Error::SpawnWorker { slot: id, source })?;
        self.tasks[id] = Some(handle);
        Ok(())
    }

    /// Get a slot, either by creating a new one or by waiting for a busy one
    /// to finish.
    fn acquire(&mut self) -> Result<WorkerSlot<F::Recognizer>> {
        if self.tasks.len() < self.capacity {
            let id = self.tasks.len();
            debug!("initializing OCR for slot {}", id);
            let recognizer = self.factory.create(id)?;
            self.tasks.push(None);
            return Ok(WorkerSlot { id, recognizer });
        }

        trace!("waiting for a free OCR slot");
        let slot = self
            .free_rx
            .recv()
            .map_err(|_| Error::PoolClosed {})?;
        self.join(slot.id);
        Ok(slot)
    }

    /// Wait for the last task launched on slot `id`, if any.
    fn join(&mut self, id: usize) {
        if let Some(handle) = self.tasks[id].take() {
            if handle.join().is_err() {
                error!("OCR worker for slot {} crashed", id);
            }
        }
    }

    /// Wait for all running tasks, shut down every recognizer, and return
    /// all our results in the order they finished.
    pub(crate) fn finish(mut self) -> Vec<RecognitionResult> {
        for id in 0..self.tasks.len() {
            self.join(id);
        }
        let SlotPool {
            free_tx,
            free_rx,
            results,
            ..
        } = self;
        drop(free_tx);
        for slot in free_rx.try_iter() {
            debug!("shutting down OCR for slot {}", slot.id);
            drop(slot);
        }
        results.into_results()
    }
}

/// Recognize `unit` using `slot`, record the result, and return the slot to
/// the pool.
fn run_task<R: Recognizer>(
    mut slot: WorkerSlot<R>,
    unit: SubtitleUnit,
    results: &ResultAggregator,
    free_tx: &Sender<WorkerSlot<R>>,
    verbose: bool,
) {
    let result = recognize(&mut slot, unit, verbose);
    results.push(result);
    if free_tx.send(slot).is_err() {
        trace!("OCR pool is gone, dropping slot");
    }
}

/// Run the recognizer in `slot` on `unit`.  This always returns a result,
/// even if recognition fails, so that no subtitle goes missing.
pub(crate) fn recognize<R: Recognizer>(
    slot: &mut WorkerSlot<R>,
    unit: SubtitleUnit,
    verbose: bool,
) -> RecognitionResult {
    let SubtitleUnit {
        sequence_index,
        start,
        end,
        bitmap,
    } = unit;
    let recognizer = &mut slot.recognizer;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| recognizer.recognize(&bitmap)));
    drop(bitmap);

    let text = match outcome {
        Ok(Ok(text)) => {
            let text = text.trim_end().to_owned();
            if verbose {
                info!("{} Text: {}", sequence_index, text);
            } else {
                debug!("{} Text: {}", sequence_index, text);
            }
            Some(text)
        }
        Ok(Err(err)) => {
            error!("OCR failed for {}: {}", sequence_index, display_chain(&err));
            None
        }
        Err(_) => {
            error!("OCR failed for {}: recognizer panicked", sequence_index);
            None
        }
    };
    RecognitionResult {
        sequence_index,
        start,
        end,
        text,
    }
}
