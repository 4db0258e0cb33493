use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one operation in flight.
///
/// Re-entrant attempts are refused, not queued.
#[derive(Debug, Default)]
pub struct FlightGate {
    busy: AtomicBool,
}

impl FlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate. `None` when another operation holds it.
    pub fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FlightGuard { gate: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Holds the gate until dropped.
#[derive(Debug)]
pub struct FlightGuard<'a> {
    gate: &'a FlightGate,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_refused() {
        let gate = FlightGate::new();
        let guard = gate.try_begin();
        assert!(guard.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_begin().is_none());

        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn test_released_on_early_return() {
        fn failing(gate: &FlightGate) -> Result<(), &'static str> {
            let _guard = gate.try_begin().ok_or("busy")?;
            Err("remote failure")
        }

        let gate = FlightGate::new();
        assert_eq!(failing(&gate), Err("remote failure"));
        assert!(!gate.is_busy());
    }
}
