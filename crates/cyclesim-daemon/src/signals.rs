//! Cooperative cancellation for the realtime run loop.
//!
//! A shared, atomically-updated flag that the main loop polls between
//! cycles. This workspace denies `unsafe_code`, so the handler uses
//! `ctrlc::set_handler` flipping an `Arc<AtomicBool>` rather than a raw
//! signal registration; `Engine::run_realtime` already accepts that flag
//! as its cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Install a `Ctrl-C` (`SIGINT`) handler that flips the returned flag.
///
/// The flag starts `false`; a signal sets it `true` exactly once. Callers
/// pass the returned `Arc` straight to [`cyclesim_runtime::Engine::run_realtime`].
pub fn install_cancel_handler() -> anyhow::Result<Arc<AtomicBool>> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        info!("interrupt received, finishing the current cycle and stopping");
        flag.store(true, Ordering::Relaxed);
    })?;
    Ok(cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_unset() {
        let cancel = Arc::new(AtomicBool::new(false));
        assert!(!cancel.load(Ordering::Relaxed));
    }
}
