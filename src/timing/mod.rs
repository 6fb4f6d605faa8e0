// Wall-clock timing for closures and futures.
//
// Wrappers are transparent: arguments and return values pass through
// unchanged, with one log line per successful completion. A callable
// that panics (or a future dropped mid-flight) produces no record.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tracing::{debug, info};


/// Run `f` and return its output together with the elapsed wall-clock time.
pub fn measure_sync<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let output = f();
    (output, start.elapsed())
}

/// Run `f`, log how long it took, and return its output unchanged.
///
/// Emits `<name> executed in <duration>` at info level. If `f` panics,
/// the panic propagates and nothing is logged.
pub fn time_sync<T>(name: &str, f: impl FnOnce() -> T) -> T {
    crate::logging::ensure();
    debug!("starting {}", name);
    let (output, elapsed) = measure_sync(f);
    info!("{} executed in {:.3?}", name, elapsed);
    output
}

/// Wrap a future so it resolves to its output and the elapsed time.
///
/// Timing starts on the first poll, not at construction, and includes
/// all time spent suspended. Dropping the future before completion
/// discards the measurement.
pub fn measure<F: Future>(future: F) -> Measured<F> {
    Measured {
        future,
        start: None,
    }
}

/// Await `future`, log how long it took, and return its output unchanged.
///
/// Elapsed time spans first poll to final completion, inclusive of all
/// suspended time. Cancellation propagates; a cancelled invocation logs
/// nothing.
pub async fn time_async<F: Future>(name: &str, future: F) -> F::Output {
    crate::logging::ensure();
    debug!("starting {}", name);
    let (output, elapsed) = measure(future).await;
    info!("{} executed in {:.3?}", name, elapsed);
    output
}

/// Future returned by [`measure`].
pub struct Measured<F> {
    future: F,
    start: Option<Instant>,
}

impl<F: Future> Future for Measured<F> {
    type Output = (F::Output, Duration);

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Safety: the inner future is never moved after pinning; these
        // projections are the only access to it.
        let this = unsafe { self.get_unchecked_mut() };

        let start = *this.start.get_or_insert_with(Instant::now);

        match unsafe { Pin::new_unchecked(&mut this.future) }.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(output) => Poll::Ready((output, start.elapsed())),
        }
    }
}
