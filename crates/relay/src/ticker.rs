//! This module contains the [CaptureTicker], the serialized worker
//! that drives the whole capture side of the pipeline: sample the
//! source, run the transform, publish to the mailbox, request a
//! render.
//!
//! The worker is a single thread, so successive ticks (and the
//! synchronous processing call inside each one) can never overlap. A
//! slow transform delays subsequent ticks instead of parallelizing
//! them; the effective capture rate degrades gracefully under load.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::bridge::ProcessingBridge;
use crate::mailbox::FrameMailbox;
use crate::source::ImageSource;

/// The default tick interval (~10 Hz), matching the cadence the
/// capture side samples the preview at.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Receives "new content is available" signals from the capture
/// worker. Must be callable from any thread; the engine backs this
/// with an event-loop proxy, tests back it with a counter.
pub trait RenderNotifier: Send + Sync + 'static {
    fn request_render(&self);
}

/// A fixed-interval capture driver running on its own worker thread.
///
/// Ticking stops only on [stop](Self::stop) (or drop, which stops
/// too). Stopping is idempotent: the first call signals the worker,
/// joins it, and drops the [ImageSource] (releasing the device exactly
/// once); later calls are no-ops.
pub struct CaptureTicker {
    stop: Arc<StopSignal>,
    stopped: AtomicBool,
    worker: Option<JoinHandle<()>>,
}

impl CaptureTicker {
    /// Spawn the worker thread and start ticking immediately.
    pub fn spawn(
        source: impl ImageSource,
        bridge: ProcessingBridge,
        mailbox: Arc<FrameMailbox>,
        notifier: Arc<dyn RenderNotifier>,
        interval: Duration,
    ) -> Self {
        let stop = Arc::new(StopSignal::default());

        let worker = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || run_worker(source, bridge, mailbox, notifier, interval, stop))
        };

        log::info!("Capture ticker started (interval {interval:?}).");

        Self {
            stop,
            stopped: AtomicBool::new(false),
            worker: Some(worker),
        }
    }

    /// Stop ticking and release the source. Idempotent; the first call
    /// joins the worker (letting an in-flight tick finish), later
    /// calls return immediately.
    pub fn stop(&mut self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        self.stop.raise();

        if let Some(worker) = self.worker.take() {
            _ = worker.join();
        }

        log::info!("Capture ticker stopped.");
    }
}

/// Stopping on drop means an owner can never leak the worker thread or
/// the device the source holds.
impl Drop for CaptureTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A raisable one-way flag the worker can sleep against, so `stop()`
/// cancels a pending tick immediately instead of waiting out the
/// interval.
#[derive(Default)]
struct StopSignal {
    raised: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    fn raise(&self) {
        *self.raised.lock().expect(POISON_MSG) = true;
        self.condvar.notify_all();
    }

    /// Block until `deadline` or until the signal is raised. Returns
    /// true if the signal was raised.
    fn raised_before(&self, deadline: Instant) -> bool {
        let mut raised = self.raised.lock().expect(POISON_MSG);

        loop {
            if *raised {
                return true;
            }

            let now = Instant::now();
            if now >= deadline {
                return false;
            }

            (raised, _) = self
                .condvar
                .wait_timeout(raised, deadline - now)
                .expect(POISON_MSG);
        }
    }
}

fn run_worker(
    mut source: impl ImageSource,
    bridge: ProcessingBridge,
    mailbox: Arc<FrameMailbox>,
    notifier: Arc<dyn RenderNotifier>,
    interval: Duration,
    stop: Arc<StopSignal>,
) {
    let mut next_tick = Instant::now();

    loop {
        if stop.raised_before(next_tick) {
            break;
        }

        tick(&mut source, &bridge, &mailbox, &*notifier);

        // Fixed-interval deadline scheduling. If the tick overran the
        // interval (slow transform), re-base on now: the next tick
        // fires as soon as possible but never concurrently.
        next_tick = Instant::now().max(next_tick + interval);
    }

    // The worker owns the source; dropping it here releases the
    // underlying device exactly once.
    drop(source);
}

/// One capture tick. Every fault is local to the tick: it logs, leaves
/// the mailbox untouched, and lets the next tick try again.
fn tick(
    source: &mut impl ImageSource,
    bridge: &ProcessingBridge,
    mailbox: &FrameMailbox,
    notifier: &dyn RenderNotifier,
) {
    if !source.is_ready() {
        log::debug!("Tick skipped: source not ready.");
        return;
    }

    let Some(raw) = source.sample() else {
        log::debug!("Tick skipped: source produced no frame.");
        return;
    };

    // The bridge logs its own failures.
    let Some(processed) = bridge.process(&raw) else {
        return;
    };

    mailbox.publish(processed);
    notifier.request_render();
}

const POISON_MSG: &str = "A thread panicked while holding the stop signal.";

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::bridge::{TransformError, TransformOutput};
    use crate::frame::RgbaFrame;

    /// Counts renders requested; stands in for the event-loop proxy.
    #[derive(Default)]
    struct CountingNotifier(AtomicUsize);

    impl RenderNotifier for CountingNotifier {
        fn request_render(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Always-ready source producing 2x2 frames, counting samples and
    /// (via the shared counter) drops.
    struct CountingSource {
        samples: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
    }

    impl ImageSource for CountingSource {
        fn is_ready(&self) -> bool {
            true
        }

        fn sample(&mut self) -> Option<RgbaFrame> {
            self.samples.fetch_add(1, Ordering::Relaxed);
            Some(RgbaFrame::from_fill(2, 2, [50, 50, 50, 255]))
        }
    }

    impl Drop for CountingSource {
        fn drop(&mut self) {
            self.releases.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn identity_bridge() -> ProcessingBridge {
        ProcessingBridge::new(|data: &[u8], width: u32, height: u32| {
            Ok(TransformOutput {
                width,
                height,
                data: data.to_vec(),
            })
        })
    }

    #[test]
    fn failing_transform_never_touches_the_mailbox() {
        let samples = Arc::new(AtomicUsize::new(0));
        let mailbox = Arc::new(FrameMailbox::new());

        let mut ticker = CaptureTicker::spawn(
            CountingSource {
                samples: Arc::clone(&samples),
                releases: Arc::new(AtomicUsize::new(0)),
            },
            ProcessingBridge::new(
                |_: &[u8], _: u32, _: u32| -> Result<TransformOutput, TransformError> {
                    Err(TransformError::Failed("always fails".into()))
                },
            ),
            Arc::clone(&mailbox),
            Arc::new(CountingNotifier::default()),
            Duration::from_millis(10),
        );

        // Let at least 5 ticks happen.
        while samples.load(Ordering::Relaxed) < 5 {
            thread::sleep(Duration::from_millis(5));
        }
        ticker.stop();

        assert!(samples.load(Ordering::Relaxed) >= 5);
        assert!(mailbox.take_if_available().is_none());
    }

    #[test]
    fn ticks_at_the_configured_cadence() {
        let samples = Arc::new(AtomicUsize::new(0));
        let notifier = Arc::new(CountingNotifier::default());
        let mailbox = Arc::new(FrameMailbox::new());

        let mut ticker = CaptureTicker::spawn(
            CountingSource {
                samples: Arc::clone(&samples),
                releases: Arc::new(AtomicUsize::new(0)),
            },
            identity_bridge(),
            Arc::clone(&mailbox),
            Arc::clone(&notifier) as Arc<dyn RenderNotifier>,
            Duration::from_millis(100),
        );

        thread::sleep(Duration::from_secs(1));
        ticker.stop();

        // 1 second at 100ms with an instantaneous transform: 10 +/- 1
        // ticks (the first fires immediately, scheduling jitter can
        // add or drop one).
        let ticks = samples.load(Ordering::Relaxed);
        assert!((9..=11).contains(&ticks), "expected 10 +/- 1, got {ticks}");

        // Every successful tick requested a render.
        assert_eq!(notifier.0.load(Ordering::Relaxed), ticks);
    }

    #[test]
    fn slow_transforms_are_never_run_concurrently() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let calls = Arc::new(AtomicUsize::new(0));

        let bridge = {
            let in_flight = Arc::clone(&in_flight);
            let max_in_flight = Arc::clone(&max_in_flight);
            let calls = Arc::clone(&calls);

            // A transform that takes 5x the tick interval.
            ProcessingBridge::new(move |data: &[u8], width: u32, height: u32| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(50));
                in_flight.fetch_sub(1, Ordering::SeqCst);
                calls.fetch_add(1, Ordering::SeqCst);

                Ok(TransformOutput {
                    width,
                    height,
                    data: data.to_vec(),
                })
            })
        };

        let mut ticker = CaptureTicker::spawn(
            CountingSource {
                samples: Arc::new(AtomicUsize::new(0)),
                releases: Arc::new(AtomicUsize::new(0)),
            },
            bridge,
            Arc::new(FrameMailbox::new()),
            Arc::new(CountingNotifier::default()),
            Duration::from_millis(10),
        );

        thread::sleep(Duration::from_millis(300));
        ticker.stop();

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);

        // Tick count over T is bounded by T / max(interval, duration),
        // plus slack for the in-flight tick stop() waits out.
        assert!(calls.load(Ordering::SeqCst) <= 300 / 50 + 1);
    }

    #[test]
    fn stop_is_idempotent_and_releases_the_source_once() {
        let releases = Arc::new(AtomicUsize::new(0));

        let mut ticker = CaptureTicker::spawn(
            CountingSource {
                samples: Arc::new(AtomicUsize::new(0)),
                releases: Arc::clone(&releases),
            },
            identity_bridge(),
            Arc::new(FrameMailbox::new()),
            Arc::new(CountingNotifier::default()),
            Duration::from_millis(10),
        );

        ticker.stop();
        ticker.stop();
        assert_eq!(releases.load(Ordering::Relaxed), 1);

        // Drop after explicit stop must not release again.
        drop(ticker);
        assert_eq!(releases.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn not_ready_sources_are_skipped_without_sampling() {
        struct NeverReady(Arc<AtomicUsize>);

        impl ImageSource for NeverReady {
            fn is_ready(&self) -> bool {
                false
            }

            fn sample(&mut self) -> Option<RgbaFrame> {
                self.0.fetch_add(1, Ordering::Relaxed);
                None
            }
        }

        let sample_calls = Arc::new(AtomicUsize::new(0));
        let mailbox = Arc::new(FrameMailbox::new());

        let mut ticker = CaptureTicker::spawn(
            NeverReady(Arc::clone(&sample_calls)),
            identity_bridge(),
            Arc::clone(&mailbox),
            Arc::new(CountingNotifier::default()),
            Duration::from_millis(5),
        );

        thread::sleep(Duration::from_millis(50));
        ticker.stop();

        assert_eq!(sample_calls.load(Ordering::Relaxed), 0);
        assert!(mailbox.take_if_available().is_none());
    }
}
