//! Reactor capability boundary.
//!
//! Defines the contract a socket-callback-driven event loop would implement
//! to drive the multiplexed backend without a dedicated poller thread. Only
//! the trait is defined here — no adapter ships with this core, and the
//! shipped [`crate::backend::multi::MultiBackend`] drives itself with its
//! own thread via `curl_multi_poll` rather than consuming this trait. A
//! future reactor-driven multi backend would hold a `Box<dyn Reactor>` and
//! forward libcurl's `CURLMOPT_SOCKETFUNCTION`/`CURLMOPT_TIMERFUNCTION`
//! callbacks through `io_subscribe`/`timer_start`.

use std::os::unix::io::RawFd;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventMask: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
    }
}

pub type SubscriptionHandle = u64;
pub type TimerHandle = u64;

pub type IoCallback = Box<dyn Fn(RawFd, EventMask) + Send + Sync>;
pub type TimerCallback = Box<dyn Fn() + Send + Sync>;

/// An external event loop capable of driving libcurl's multi interface via
/// socket readiness and timer callbacks instead of polling.
pub trait Reactor: Send + Sync {
    fn io_subscribe(&self, fd: RawFd, events: EventMask, cb: IoCallback) -> SubscriptionHandle;
    fn io_update(&self, handle: SubscriptionHandle, events: EventMask);
    fn io_unsubscribe(&self, handle: SubscriptionHandle);
    fn timer_start(&self, delay_ms: u64, cb: TimerCallback) -> TimerHandle;
    fn timer_cancel(&self, handle: TimerHandle);
}
