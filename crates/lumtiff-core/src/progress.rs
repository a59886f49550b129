//! Progress reporting for long-running codec operations.
//!
//! Decoders and encoders report a maximum once (the number of scanlines or
//! strips) and then a step after each unit of work. Any `FnMut(ProgressEvent)`
//! closure works as a sink:
//!
//! ```rust
//! use lumtiff_core::{Progress, ProgressEvent};
//!
//! let mut events = Vec::new();
//! let mut sink = |e: ProgressEvent| events.push(e);
//! sink.set_maximum(2);
//! sink.step(1);
//! sink.step(2);
//! assert_eq!(events.len(), 3);
//! ```

/// A single progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Total number of work units.
    Maximum(u32),
    /// Number of units completed so far.
    Step(u32),
}

/// Receiver for progress notifications.
///
/// Both methods default to doing nothing.
pub trait Progress {
    /// Announces the total number of work units.
    fn set_maximum(&mut self, _maximum: u32) {}

    /// Reports how many work units are complete.
    fn step(&mut self, _done: u32) {}
}

/// Progress sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

impl<F: FnMut(ProgressEvent)> Progress for F {
    fn set_maximum(&mut self, maximum: u32) {
        self(ProgressEvent::Maximum(maximum));
    }

    fn step(&mut self, done: u32) {
        self(ProgressEvent::Step(done));
    }
}
