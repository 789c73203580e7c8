use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use tracing::{trace, warn};

use super::Shared;

/// Number of threads invoking handlers for one execution.
pub(super) fn pool_size(handlers: usize, limit: Option<NonZeroUsize>) -> usize {
    let available = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let mut size = handlers.min(available);
    if let Some(limit) = limit {
        size = size.min(limit.get());
    }
    size
}

/// Invoke every handler once, spreading the invocations over a bounded set of
/// scoped threads. The calling thread takes part, so the work completes even if
/// no helper thread can be spawned.
pub(super) fn run_handlers(shared: &Shared) {
    let size = pool_size(shared.handlers.len(), shared.worker_limit);
    if size == 0 {
        return;
    }
    let next = AtomicUsize::new(0);

    thread::scope(|scope| {
        for worker in 1..size {
            let next = &next;
            let spawned = thread::Builder::new()
                .name(format!("flint-query-{}-{worker}", shared.id))
                .spawn_scoped(scope, move || drain(shared, next));
            if let Err(err) = spawned {
                warn!(query_id = shared.id, error = %err, "failed to spawn query worker");
                break;
            }
        }
        drain(shared, &next);
    });
}

fn drain(shared: &Shared, next: &AtomicUsize) {
    loop {
        let index = next.fetch_add(1, Ordering::Relaxed);
        let Some(handler) = shared.handlers.get(index) else {
            break;
        };

        let (query, canceller) = shared.canceller.branch();
        let started = Instant::now();
        let outcome = guarded(handler.id(), || handler.handle_query(&query));
        let elapsed = started.elapsed();
        trace!(
            query_id = shared.id,
            handler = handler.id(),
            micros = elapsed.as_micros() as u64,
            "handler returned"
        );

        let matches = outcome.ok().map(|()| canceller.take_matches());
        shared.record(handler.id(), elapsed, matches);
    }
}

/// Run one extension callback, turning errors and panics into a logged
/// failure.
pub(crate) fn guarded<F>(extension_id: &str, callback: F) -> Result<(), ()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => {
            warn!(extension = extension_id, error = %err, "extension failed");
            Err(())
        }
        Err(payload) => {
            warn!(
                extension = extension_id,
                panic = panic_message(payload.as_ref()),
                "extension panicked"
            );
            Err(())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
