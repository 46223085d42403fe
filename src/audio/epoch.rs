use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Counter shared between the channel handle and its audio thread. Every
/// command that overtakes a pending play request advances it; the audio
/// thread compares the epoch a play request was issued under with the
/// current one before starting output.
#[derive(Clone, Debug, Default)]
pub struct LoadEpoch {
    current: Arc<AtomicU64>,
}

impl LoadEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    pub fn snapshot(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    pub fn is_current(&self, snapshot: u64) -> bool {
        self.snapshot() == snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::LoadEpoch;

    #[test]
    fn advancing_invalidates_older_snapshots() {
        let epoch = LoadEpoch::new();
        let issued = epoch.snapshot();
        assert!(epoch.is_current(issued));

        let clone = epoch.clone();
        clone.advance();
        assert!(!epoch.is_current(issued));
        assert!(epoch.is_current(clone.snapshot()));
    }
}
