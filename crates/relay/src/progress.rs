//! Upload progress reporting

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::io;
use std::sync::Arc;

/// Receives the fraction of a transfer completed so far, in `[0.0, 1.0]`.
///
/// Values never decrease within one transfer. Reporting is advisory: a sink
/// that ignores every call does not change the outcome of the transfer.
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

/// Sink that discards every report
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64) {}
}

/// Fraction of `total` covered by `done`, clamped to 1.0. Empty transfers are complete.
pub fn fraction(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 1.0;
    }
    (done as f64 / total as f64).min(1.0)
}

/// Report progress to `sink` as each chunk of `stream` passes through
pub fn track<S>(
    stream: S,
    total: u64,
    sink: Arc<dyn ProgressSink>,
) -> impl Stream<Item = io::Result<Bytes>> + Send + Sync + 'static
where
    S: Stream<Item = io::Result<Bytes>> + Send + Sync + 'static,
{
    let mut done = 0u64;
    stream.map(move |chunk| {
        if let Ok(bytes) = &chunk {
            done += bytes.len() as u64;
            sink.report(fraction(done, total));
        }
        chunk
    })
}
