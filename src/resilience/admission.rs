use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Point-in-time view of a command's in-flight budget.
#[derive(Debug, Clone)]
pub struct InflightSnapshot {
    pub max: usize,
    pub available: usize,
    pub in_use: usize,
}

/// Bounds the number of concurrently executing requests for one command.
///
/// Acquisition is fail-fast: there is no queue, and a rejected caller gets
/// the backpressure immediately. The returned [`AdmissionPermit`] releases
/// the slot on drop, so every exit path (success, failure, timeout,
/// cancellation, panic unwind) gives the slot back exactly once.
pub struct AdmissionController {
    max: usize,
    inflight: Arc<Semaphore>,
}

/// RAII guard for one admitted request.
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionController {
    pub fn new(max_concurrent: usize) -> Self {
        let max = max_concurrent.max(1);
        Self {
            max,
            inflight: Arc::new(Semaphore::new(max)),
        }
    }

    /// Claim a slot if one is free; never waits.
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        self.inflight
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionPermit { _permit: permit })
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn snapshot(&self) -> InflightSnapshot {
        let available = self.inflight.available_permits();
        InflightSnapshot {
            max: self.max,
            available,
            in_use: self.max.saturating_sub(available),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_up_to_max() {
        let ctl = AdmissionController::new(3);

        let permits: Vec<_> = (0..3).filter_map(|_| ctl.try_acquire()).collect();
        assert_eq!(permits.len(), 3);

        // Fourth is rejected, no waiting.
        assert!(ctl.try_acquire().is_none());

        let snap = ctl.snapshot();
        assert_eq!(snap.max, 3);
        assert_eq!(snap.in_use, 3);
        assert_eq!(snap.available, 0);
    }

    #[test]
    fn test_drop_releases_exactly_once() {
        let ctl = AdmissionController::new(1);

        let permit = ctl.try_acquire().unwrap();
        assert!(ctl.try_acquire().is_none());

        drop(permit);
        assert_eq!(ctl.snapshot().in_use, 0);
        assert!(ctl.try_acquire().is_some());
    }

    #[test]
    fn test_zero_max_clamped_to_one() {
        let ctl = AdmissionController::new(0);
        assert_eq!(ctl.max(), 1);
        assert!(ctl.try_acquire().is_some());
    }

    #[test]
    fn test_release_on_panic_unwind() {
        let ctl = Arc::new(AdmissionController::new(1));

        let ctl2 = ctl.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _permit = ctl2.try_acquire().unwrap();
            panic!("boom");
        }));
        assert!(result.is_err());

        // The permit was dropped during unwind.
        assert_eq!(ctl.snapshot().in_use, 0);
    }
}
