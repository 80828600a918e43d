use crate::error::{AsarPickError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative Ctrl+C handling for the extraction pipeline.
///
/// The pipeline polls `check_shutdown` between steps, so an interrupt
/// lands on a step boundary instead of mid-copy. A second Ctrl+C skips
/// the cooperation and exits on the spot.
pub struct GracefulShutdown {
    cancelled: Arc<AtomicBool>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        ctrlc::set_handler(move || {
            if flag.swap(true, Ordering::SeqCst) {
                eprintln!("\n💀 Force quitting");
                std::process::exit(1);
            }
            eprintln!("\n🛑 Stopping after the current step... (Ctrl+C again to force quit)");
        })
        .map_err(|e| AsarPickError::Config {
            message: format!("Failed to install Ctrl+C handler: {}", e),
        })?;

        Ok(Self { cancelled })
    }

    /// Handler registration is process-global, so tests use a detached flag.
    pub fn new_for_test() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Cancelled` once an interrupt has been seen.
    pub fn check_shutdown(&self) -> Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(AsarPickError::Cancelled);
        }
        Ok(())
    }

    pub fn request_shutdown(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_flag_round_trip() {
        let shutdown = GracefulShutdown::new_for_test();

        assert!(shutdown.is_running());
        assert!(shutdown.check_shutdown().is_ok());

        shutdown.request_shutdown();
        assert!(!shutdown.is_running());
        assert!(shutdown.check_shutdown().is_err());

        shutdown.reset();
        assert!(shutdown.is_running());
        assert!(shutdown.check_shutdown().is_ok());
    }

    #[test]
    fn test_check_shutdown_reports_cancelled() {
        let shutdown = GracefulShutdown::new_for_test();
        shutdown.request_shutdown();

        let error = shutdown.check_shutdown().unwrap_err();
        assert!(matches!(error, AsarPickError::Cancelled));
    }
}
