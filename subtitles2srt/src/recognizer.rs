//! The interface to our text recognizer.

use crate::bitmap::Bitmap;
use crate::errors::Result;

/// A text recognizer, such as an OCR engine.
///
/// Recognizers are expensive to set up, so each worker slot creates one
/// recognizer and reuses it for every image processed by that slot.  A
/// recognizer is only ever used by one thread at a time, but it may move
/// between threads, so it must be `Send`.  Any cleanup should happen in
/// `Drop`, which runs once all work is finished.
pub trait Recognizer: Send + 'static {
    /// Recognize the text in `bitmap`, which contains dark text on a light
    /// background.  Trailing whitespace in the result is ignored.
    fn recognize(&mut self, bitmap: &Bitmap) -> Result<String>;
}

/// Creates and initializes one `Recognizer` per worker slot.
pub trait RecognizerFactory {
    /// The type of recognizer we create.
    type Recognizer: Recognizer;

    /// Create a recognizer for the worker slot `slot`.  Any error here
    /// aborts the entire conversion.
    fn create(&self, slot: usize) -> Result<Self::Recognizer>;
}

impl<F, R> RecognizerFactory for F
where
    F: Fn(usize) -> Result<R>,
    R: Recognizer,
{
    type Recognizer = R;

    fn create(&self, slot: usize) -> Result<R> {
        self(slot)
    }
}
