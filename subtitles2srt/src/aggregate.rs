//! Collecting recognition results from our workers.

use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;

use crate::time::Pts;

/// The result of recognizing a single subtitle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionResult {
    /// The sequence number of the subtitle, starting at 1.
    pub sequence_index: u32,
    /// When the subtitle appears.
    pub start: Pts,
    /// When the subtitle disappears, if known.
    pub end: Option<Pts>,
    /// The recognized text, or `None` if recognition failed.
    pub text: Option<String>,
}

/// A collection of results shared between all our workers.  Results arrive
/// in whatever order the workers finish.
///
/// Cloning a `ResultAggregator` gives another handle to the same results.
#[derive(Clone, Debug, Default)]
pub struct ResultAggregator {
    results: Arc<Mutex<Vec<RecognitionResult>>>,
}

impl ResultAggregator {
    /// Create an empty aggregator.
    pub fn new() -> ResultAggregator {
        ResultAggregator::default()
    }

    /// Add a result.  The lock is only held while we append.
    pub fn push(&self, result: RecognitionResult) {
        self.results.lock().push(result);
    }

    /// How many results have we collected so far?
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    /// Have we collected any results yet?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take all the results, in the order they arrived.  This should only
    /// be called once every worker has finished.
    pub fn into_results(self) -> Vec<RecognitionResult> {
        match Arc::try_unwrap(self.results) {
            Ok(results) => results.into_inner(),
            // Somebody else still has a handle, so leave them an empty list.
            Err(shared) => mem::take(&mut *shared.lock()),
        }
    }
}
