//! The blocking-offload bridge.
//!
//! Every public [`crate::client::Client`] operation blocks the calling OS
//! thread until the request completes. A host whose own execution model is
//! cooperative (fibers, an async runtime's worker pool) needs a way to run
//! that blocking call off whatever thread is driving its own scheduler, the
//! way a Ruby extension releases the GVL around a blocking C call
//! (`rb_thread_call_without_gvl`) so other Ruby threads/fibers keep running
//! while one waits on I/O.
//!
//! This core has no host-specific scheduler to release a lock for, so it
//! expresses the same contract as a trait: implement [`BlockingRunner`] to
//! hand the blocking closure to whatever offload primitive your host uses.
//! [`DirectRunner`] — calling the closure inline, on the caller's own
//! thread — is the only implementation shipped here.

/// Runs a blocking closure to completion, returning its result.
///
/// Implementations may run `f` on a dedicated OS thread and block the
/// caller on a channel/condvar, matching whatever their host's cooperative
/// scheduler needs to keep servicing other work. This core never creates or
/// joins such a thread itself.
pub trait BlockingRunner: Send + Sync {
    fn run<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R;
}

/// Invokes the closure inline on the calling thread. Correct for any host
/// that does not need to keep a scheduler alive while a request blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectRunner;

impl BlockingRunner for DirectRunner {
    fn run<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        f()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_runner_executes_inline_and_returns_value() {
        let runner = DirectRunner;
        let result = runner.run(|| 1 + 1);
        assert_eq!(result, 2);
    }
}
