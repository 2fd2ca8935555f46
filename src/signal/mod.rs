//! Signal handling for interrupting a run (SIGINT/SIGTERM)
//!
//! On the first signal the interrupt flag is raised. The polling loop checks
//! it between describe calls and unwinds through the normal failure path:
//! cancel the remote job, download outputs, tear down staging.
//!
//! On a second signal the process exits immediately with
//! `EXIT_CODE_CANCELLED`, skipping cleanup.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Exit code for interrupted runs
pub const EXIT_CODE_CANCELLED: i32 = 80;

/// Granularity at which sleeps notice an interrupt
pub const INTERRUPT_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Signal handler state
#[derive(Debug, Default)]
pub struct SignalState {
    /// First signal received
    interrupted: AtomicBool,
    /// Signal count (for tracking double-SIGINT)
    signal_count: AtomicU8,
}

impl SignalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    pub fn signal_count(&self) -> u8 {
        self.signal_count.load(Ordering::SeqCst)
    }

    /// Record a signal and return the action to take
    pub fn handle_signal(&self) -> SignalAction {
        let count = self.signal_count.fetch_add(1, Ordering::SeqCst);

        match count {
            0 => {
                self.interrupted.store(true, Ordering::SeqCst);
                SignalAction::Interrupt
            }
            1 => SignalAction::ImmediateExit,
            _ => SignalAction::Ignore,
        }
    }

    /// Sleep for `duration`, waking early on interrupt.
    ///
    /// Returns true if the run has been interrupted.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_interrupted() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(INTERRUPT_CHECK_INTERVAL.min(deadline - now));
        }
    }
}

/// Action to take after receiving a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// First signal: interrupt the run
    Interrupt,
    /// Second signal: exit without cleanup
    ImmediateExit,
    /// Third+ signal: ignore
    Ignore,
}

/// Installs process signal handlers that feed a `SignalState`
pub struct SignalHandler {
    state: Arc<SignalState>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::with_state(Arc::new(SignalState::new()))
    }

    pub fn with_state(state: Arc<SignalState>) -> Self {
        Self { state }
    }

    pub fn state(&self) -> Arc<SignalState> {
        Arc::clone(&self.state)
    }

    /// Install the handlers. Must be called once at program startup.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let state = Arc::clone(&self.state);
        ctrlc::set_handler(move || match state.handle_signal() {
            SignalAction::Interrupt => {
                eprintln!("\nReceived interrupt, cancelling job and cleaning up...");
            }
            SignalAction::ImmediateExit => {
                eprintln!("\nReceived second interrupt, exiting immediately...");
                std::process::exit(EXIT_CODE_CANCELLED);
            }
            SignalAction::Ignore => {}
        })
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}
